//! Score functions - per-user mapping from domain elements to utility in [0, 1].
//!
//! Both variants share [`ElementScores`], which keeps the element list and
//! tracks the best and worst element incrementally. Discrete functions keep
//! elements in insertion order; continuous functions keep control points
//! sorted by value and interpolate linearly between them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

use super::domain::{DomainValue, ELEMENT_EPSILON};

/// Which score function variant a domain requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreFunctionKind {
    Discrete,
    Continuous,
}

impl fmt::Display for ScoreFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreFunctionKind::Discrete => write!(f, "discrete"),
            ScoreFunctionKind::Continuous => write!(f, "continuous"),
        }
    }
}

/// Element type stored in an [`ElementScores`] table.
pub(crate) trait ElementKey: Clone + fmt::Debug {
    fn same_element(&self, other: &Self) -> bool;

    /// Position at which a new element is inserted.
    fn insertion_point(existing: &[(Self, f64)], _element: &Self) -> usize {
        existing.len()
    }
}

impl ElementKey for DomainValue {
    fn same_element(&self, other: &Self) -> bool {
        DomainValue::same_element(self, other)
    }
}

impl ElementKey for f64 {
    fn same_element(&self, other: &Self) -> bool {
        (self - other).abs() <= ELEMENT_EPSILON
    }

    fn insertion_point(existing: &[(Self, f64)], element: &Self) -> usize {
        existing.partition_point(|(value, _)| value < element)
    }
}

/// Element table with incremental best/worst tracking.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementScores<K> {
    entries: Vec<(K, f64)>,
    best: Option<usize>,
    worst: Option<usize>,
}

impl<K: ElementKey> ElementScores<K> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            best: None,
            worst: None,
        }
    }

    pub(crate) fn from_entries(entries: Vec<(K, f64)>) -> Self {
        let mut scores = Self::new();
        for (element, score) in entries {
            scores.set(element, score);
        }
        scores
    }

    pub(crate) fn entries(&self) -> &[(K, f64)] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn index_of(&self, element: &K) -> Option<usize> {
        self.entries.iter().position(|(e, _)| e.same_element(element))
    }

    pub(crate) fn get(&self, element: &K) -> Option<f64> {
        self.index_of(element).map(|i| self.entries[i].1)
    }

    pub(crate) fn best(&self) -> Option<&K> {
        self.best.map(|i| &self.entries[i].0)
    }

    pub(crate) fn worst(&self) -> Option<&K> {
        self.worst.map(|i| &self.entries[i].0)
    }

    pub(crate) fn best_score(&self) -> Option<f64> {
        self.best.map(|i| self.entries[i].1)
    }

    pub(crate) fn worst_score(&self) -> Option<f64> {
        self.worst.map(|i| self.entries[i].1)
    }

    /// Sets the score of an element, inserting it when absent.
    pub(crate) fn set(&mut self, element: K, score: f64) {
        match self.index_of(&element) {
            Some(index) => {
                let previous = self.entries[index].1;
                self.entries[index].1 = score;
                self.update_best_and_worst(index, previous, score);
            }
            None => {
                let index = K::insertion_point(&self.entries, &element);
                self.entries.insert(index, (element, score));
                self.shift_extremes_after_insert(index);
                self.update_best_and_worst(index, score, score);
            }
        }
    }

    fn shift_extremes_after_insert(&mut self, index: usize) {
        for slot in [&mut self.best, &mut self.worst] {
            if let Some(current) = slot {
                if *current >= index {
                    *current += 1;
                }
            }
        }
    }

    /// Linear scan; the first element holding the maximum score wins.
    pub(crate) fn find_best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, (_, score)) in self.entries.iter().enumerate() {
            if best.map_or(true, |b| *score > self.entries[b].1) {
                best = Some(i);
            }
        }
        best
    }

    /// Linear scan; the first element holding the minimum score wins.
    pub(crate) fn find_worst(&self) -> Option<usize> {
        let mut worst: Option<usize> = None;
        for (i, (_, score)) in self.entries.iter().enumerate() {
            if worst.map_or(true, |w| *score < self.entries[w].1) {
                worst = Some(i);
            }
        }
        worst
    }

    /// Re-scans only when the changed element held a title and lost it.
    fn update_best_and_worst(&mut self, changed: usize, previous: f64, score: f64) {
        match self.best {
            None => self.best = Some(changed),
            Some(best) if best == changed => {
                if score < previous {
                    self.best = self.find_best();
                }
            }
            Some(best) => {
                if score > self.entries[best].1 {
                    self.best = Some(changed);
                }
            }
        }

        match self.worst {
            None => self.worst = Some(changed),
            Some(worst) if worst == changed => {
                if score > previous {
                    self.worst = self.find_worst();
                }
            }
            Some(worst) => {
                if score < self.entries[worst].1 {
                    self.worst = Some(changed);
                }
            }
        }
    }

    /// Removes an element, re-deriving best/worst if it held either title.
    pub(crate) fn remove(&mut self, element: &K) -> Option<f64> {
        let index = self.index_of(element)?;
        let (_, score) = self.entries.remove(index);

        let lost_title = self.best == Some(index) || self.worst == Some(index);
        if lost_title {
            self.best = self.find_best();
            self.worst = self.find_worst();
        } else {
            for slot in [&mut self.best, &mut self.worst] {
                if let Some(current) = slot {
                    if *current > index {
                        *current -= 1;
                    }
                }
            }
        }
        Some(score)
    }

    /// Linearly remaps every score so worst -> 0 and best -> 1.
    pub(crate) fn rescale(&mut self) -> Result<(), DomainError> {
        let (max, min) = match (self.best_score(), self.worst_score()) {
            (Some(max), Some(min)) => (max, min),
            _ => {
                return Err(DomainError::new(
                    ErrorCode::DegenerateObjective,
                    "Cannot rescale a score function without elements",
                ))
            }
        };
        let range = max - min;
        if range.abs() <= f64::EPSILON {
            return Err(DomainError::new(
                ErrorCode::DegenerateObjective,
                "Best and worst elements have equal scores; nothing to discriminate",
            )
            .with_detail("score", max.to_string()));
        }
        for (_, score) in self.entries.iter_mut() {
            *score = (*score - min) / range;
        }
        Ok(())
    }
}

fn check_score(score: f64) -> Result<(), DomainError> {
    if !(0.0..=1.0).contains(&score) {
        return Err(ValidationError::out_of_range("score", 0.0, 1.0, score).into());
    }
    Ok(())
}

fn check_mutable(immutable: bool) -> Result<(), DomainError> {
    if immutable {
        return Err(DomainError::validation(
            "score_function",
            "Score function is immutable",
        ));
    }
    Ok(())
}

/// Serialized entry of a score function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementScore<K> {
    pub element: K,
    pub score: f64,
}

/// Score function over a finite (categorical or interval) domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DiscreteData", into = "DiscreteData")]
pub struct DiscreteScoreFunction {
    scores: ElementScores<DomainValue>,
    immutable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscreteData {
    element_scores: Vec<ElementScore<DomainValue>>,
    #[serde(default)]
    immutable: bool,
}

impl From<DiscreteData> for DiscreteScoreFunction {
    fn from(data: DiscreteData) -> Self {
        Self {
            scores: ElementScores::from_entries(
                data.element_scores
                    .into_iter()
                    .map(|e| (e.element, e.score))
                    .collect(),
            ),
            immutable: data.immutable,
        }
    }
}

impl From<DiscreteScoreFunction> for DiscreteData {
    fn from(function: DiscreteScoreFunction) -> Self {
        Self {
            element_scores: function
                .scores
                .entries
                .into_iter()
                .map(|(element, score)| ElementScore { element, score })
                .collect(),
            immutable: function.immutable,
        }
    }
}

impl DiscreteScoreFunction {
    /// Creates an empty discrete score function.
    pub fn new() -> Self {
        Self {
            scores: ElementScores::new(),
            immutable: false,
        }
    }

    /// Inserts an element without validation. Used when building defaults.
    pub(crate) fn insert_element(&mut self, element: DomainValue, score: f64) {
        self.scores.set(element, score);
    }
}

impl Default for DiscreteScoreFunction {
    fn default() -> Self {
        Self::new()
    }
}

/// Score function over a continuous domain, sampled at control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ContinuousData", into = "ContinuousData")]
pub struct ContinuousScoreFunction {
    min_domain_value: f64,
    max_domain_value: f64,
    scores: ElementScores<f64>,
    immutable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContinuousData {
    min_domain_value: f64,
    max_domain_value: f64,
    element_scores: Vec<ElementScore<f64>>,
    #[serde(default)]
    immutable: bool,
}

impl From<ContinuousData> for ContinuousScoreFunction {
    fn from(data: ContinuousData) -> Self {
        Self {
            min_domain_value: data.min_domain_value,
            max_domain_value: data.max_domain_value,
            scores: ElementScores::from_entries(
                data.element_scores
                    .into_iter()
                    .map(|e| (e.element, e.score))
                    .collect(),
            ),
            immutable: data.immutable,
        }
    }
}

impl From<ContinuousScoreFunction> for ContinuousData {
    fn from(function: ContinuousScoreFunction) -> Self {
        Self {
            min_domain_value: function.min_domain_value,
            max_domain_value: function.max_domain_value,
            element_scores: function
                .scores
                .entries
                .into_iter()
                .map(|(element, score)| ElementScore { element, score })
                .collect(),
            immutable: function.immutable,
        }
    }
}

impl ContinuousScoreFunction {
    /// Creates a continuous score function with no control points.
    pub fn new(min_domain_value: f64, max_domain_value: f64) -> Self {
        Self {
            min_domain_value,
            max_domain_value,
            scores: ElementScores::new(),
            immutable: false,
        }
    }

    pub fn min_domain_value(&self) -> f64 {
        self.min_domain_value
    }

    pub fn max_domain_value(&self) -> f64 {
        self.max_domain_value
    }

    pub(crate) fn insert_control_point(&mut self, value: f64, score: f64) {
        self.scores.set(value, score);
    }

    fn check_in_domain(&self, value: f64) -> Result<(), DomainError> {
        if value < self.min_domain_value - ELEMENT_EPSILON
            || value > self.max_domain_value + ELEMENT_EPSILON
        {
            return Err(DomainError::new(
                ErrorCode::OutOfDomain,
                format!(
                    "{} is outside [{}, {}]",
                    value, self.min_domain_value, self.max_domain_value
                ),
            ));
        }
        Ok(())
    }

    /// Interpolates linearly between the two nearest control points.
    fn interpolate(&self, value: f64) -> Result<f64, DomainError> {
        self.check_in_domain(value)?;
        if let Some(score) = self.scores.get(&value) {
            return Ok(score);
        }
        let points = self.scores.entries();
        let upper = points.partition_point(|(x, _)| *x < value);
        if upper == 0 || upper == points.len() {
            return Err(DomainError::new(
                ErrorCode::OutOfDomain,
                format!("{} is outside the span of the control points", value),
            ));
        }
        let (x0, y0) = points[upper - 1];
        let (x1, y1) = points[upper];
        Ok(y0 + (value - x0) * (y1 - y0) / (x1 - x0))
    }
}

/// Per-objective, per-user mapping from outcome value to utility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScoreFunction {
    Discrete(DiscreteScoreFunction),
    Continuous(ContinuousScoreFunction),
}

impl ScoreFunction {
    pub fn kind(&self) -> ScoreFunctionKind {
        match self {
            ScoreFunction::Discrete(_) => ScoreFunctionKind::Discrete,
            ScoreFunction::Continuous(_) => ScoreFunctionKind::Continuous,
        }
    }

    pub fn is_immutable(&self) -> bool {
        match self {
            ScoreFunction::Discrete(f) => f.immutable,
            ScoreFunction::Continuous(f) => f.immutable,
        }
    }

    pub fn set_immutable(&mut self, immutable: bool) {
        match self {
            ScoreFunction::Discrete(f) => f.immutable = immutable,
            ScoreFunction::Continuous(f) => f.immutable = immutable,
        }
    }

    /// Sets an element's score and updates best/worst incrementally.
    ///
    /// # Errors
    /// - `ValidationFailed` when the score is outside [0, 1] or the function is immutable
    /// - `OutOfDomain` when a continuous control point lies outside the domain
    /// - `IncompatibleScoreFunction` when a categorical value is set on a continuous function
    pub fn set_element_score(&mut self, element: &DomainValue, score: f64) -> Result<(), DomainError> {
        check_score(score)?;
        match self {
            ScoreFunction::Discrete(f) => {
                check_mutable(f.immutable)?;
                f.scores.set(element.clone(), score);
            }
            ScoreFunction::Continuous(f) => {
                check_mutable(f.immutable)?;
                let value = numeric_element(element)?;
                f.check_in_domain(value)?;
                f.scores.set(value, score);
            }
        }
        Ok(())
    }

    /// Returns the score of an element.
    ///
    /// Continuous functions interpolate between control points.
    pub fn get_score(&self, element: &DomainValue) -> Result<f64, DomainError> {
        match self {
            ScoreFunction::Discrete(f) => f.scores.get(element).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UnknownElement,
                    format!("'{}' has no score", element),
                )
            }),
            ScoreFunction::Continuous(f) => f.interpolate(numeric_element(element)?),
        }
    }

    /// Returns all explicitly scored elements (control points for continuous).
    pub fn get_all_elements(&self) -> Vec<DomainValue> {
        self.element_scores().into_iter().map(|(e, _)| e).collect()
    }

    /// Returns `(element, score)` pairs in element order.
    pub fn element_scores(&self) -> Vec<(DomainValue, f64)> {
        match self {
            ScoreFunction::Discrete(f) => f.scores.entries().to_vec(),
            ScoreFunction::Continuous(f) => f
                .scores
                .entries()
                .iter()
                .map(|(x, s)| (DomainValue::Number(*x), *s))
                .collect(),
        }
    }

    pub fn element_count(&self) -> usize {
        match self {
            ScoreFunction::Discrete(f) => f.scores.len(),
            ScoreFunction::Continuous(f) => f.scores.len(),
        }
    }

    /// Tracked best element.
    pub fn best_element(&self) -> Option<DomainValue> {
        match self {
            ScoreFunction::Discrete(f) => f.scores.best().cloned(),
            ScoreFunction::Continuous(f) => f.scores.best().map(|x| DomainValue::Number(*x)),
        }
    }

    /// Tracked worst element.
    pub fn worst_element(&self) -> Option<DomainValue> {
        match self {
            ScoreFunction::Discrete(f) => f.scores.worst().cloned(),
            ScoreFunction::Continuous(f) => f.scores.worst().map(|x| DomainValue::Number(*x)),
        }
    }

    /// Full linear scan for the best element.
    pub fn find_best_element(&self) -> Option<DomainValue> {
        let (index, elements) = match self {
            ScoreFunction::Discrete(f) => (f.scores.find_best(), self.get_all_elements()),
            ScoreFunction::Continuous(f) => (f.scores.find_best(), self.get_all_elements()),
        };
        index.map(|i| elements[i].clone())
    }

    /// Full linear scan for the worst element.
    pub fn find_worst_element(&self) -> Option<DomainValue> {
        let (index, elements) = match self {
            ScoreFunction::Discrete(f) => (f.scores.find_worst(), self.get_all_elements()),
            ScoreFunction::Continuous(f) => (f.scores.find_worst(), self.get_all_elements()),
        };
        index.map(|i| elements[i].clone())
    }

    /// Removes an element, returning its former score.
    pub fn remove_element(&mut self, element: &DomainValue) -> Result<Option<f64>, DomainError> {
        match self {
            ScoreFunction::Discrete(f) => {
                check_mutable(f.immutable)?;
                Ok(f.scores.remove(element))
            }
            ScoreFunction::Continuous(f) => {
                check_mutable(f.immutable)?;
                Ok(f.scores.remove(&numeric_element(element)?))
            }
        }
    }

    /// Remaps scores so that score(best) = 1 and score(worst) = 0.
    ///
    /// # Errors
    /// `DegenerateObjective` when best and worst scores are equal. Scores are
    /// left untouched on failure.
    pub fn rescale(&mut self) -> Result<(), DomainError> {
        match self {
            ScoreFunction::Discrete(f) => f.scores.rescale(),
            ScoreFunction::Continuous(f) => f.scores.rescale(),
        }
    }

    /// Deep value copy used for undo records.
    pub fn get_memento(&self) -> ScoreFunction {
        self.clone()
    }
}

fn numeric_element(element: &DomainValue) -> Result<f64, DomainError> {
    element.as_number().ok_or_else(|| {
        DomainError::new(
            ErrorCode::IncompatibleScoreFunction,
            format!("Continuous score function cannot score '{}'", element),
        )
    })
}
