//! Objective domains - the set of outcome values an objective can take.
//!
//! Domains are immutable once built, so mementos share them structurally
//! instead of deep-copying.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

use super::score_function::{
    ContinuousScoreFunction, DiscreteScoreFunction, ScoreFunction, ScoreFunctionKind,
};

/// Tolerance used when comparing numeric domain elements.
pub const ELEMENT_EPSILON: f64 = 1e-9;

/// A single outcome value of an alternative on a primitive objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    Number(f64),
    Category(String),
}

impl DomainValue {
    /// Creates a categorical value.
    pub fn category(label: impl Into<String>) -> Self {
        DomainValue::Category(label.into())
    }

    /// Returns the numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DomainValue::Number(n) => Some(*n),
            DomainValue::Category(_) => None,
        }
    }

    /// Returns true if both values name the same element.
    pub fn same_element(&self, other: &DomainValue) -> bool {
        match (self, other) {
            (DomainValue::Number(a), DomainValue::Number(b)) => (a - b).abs() <= ELEMENT_EPSILON,
            (DomainValue::Category(a), DomainValue::Category(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        DomainValue::Number(value)
    }
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        DomainValue::Category(value.to_string())
    }
}

impl fmt::Display for DomainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainValue::Number(n) => write!(f, "{}", n),
            DomainValue::Category(c) => write!(f, "{}", c),
        }
    }
}

/// Finite set of discrete labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoricalData")]
pub struct CategoricalDomain {
    elements: Vec<String>,
    ordered: bool,
}

#[derive(Deserialize)]
struct CategoricalData {
    elements: Vec<String>,
    #[serde(default)]
    ordered: bool,
}

impl TryFrom<CategoricalData> for CategoricalDomain {
    type Error = ValidationError;

    fn try_from(data: CategoricalData) -> Result<Self, Self::Error> {
        Self::new(data.elements, data.ordered)
    }
}

impl CategoricalDomain {
    /// Creates a categorical domain, rejecting empty or duplicate labels.
    pub fn new(elements: Vec<String>, ordered: bool) -> Result<Self, ValidationError> {
        if elements.is_empty() {
            return Err(ValidationError::empty_field("categorical elements"));
        }
        for (i, element) in elements.iter().enumerate() {
            if elements[..i].contains(element) {
                return Err(ValidationError::duplicate("categorical element", element.clone()));
            }
        }
        Ok(Self { elements, ordered })
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }
}

/// Most elements an interval domain may enumerate.
pub const MAX_INTERVAL_ELEMENTS: usize = 10_000;

/// Regularly spaced numeric steps between `min` and `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IntervalData")]
pub struct IntervalDomain {
    min: f64,
    max: f64,
    interval: f64,
}

#[derive(Deserialize)]
struct IntervalData {
    min: f64,
    max: f64,
    interval: f64,
}

impl TryFrom<IntervalData> for IntervalDomain {
    type Error = ValidationError;

    fn try_from(data: IntervalData) -> Result<Self, Self::Error> {
        Self::new(data.min, data.max, data.interval)
    }
}

impl IntervalDomain {
    /// Creates an interval domain of at most [`MAX_INTERVAL_ELEMENTS`] elements.
    pub fn new(min: f64, max: f64, interval: f64) -> Result<Self, ValidationError> {
        if !(interval > 0.0) || !interval.is_finite() {
            return Err(ValidationError::invalid_format(
                "interval",
                "step must be positive and finite",
            ));
        }
        if !(min <= max) || !min.is_finite() || !max.is_finite() {
            return Err(ValidationError::out_of_range("min", f64::MIN, max, min));
        }
        let domain = Self { min, max, interval };
        match domain.step_count() {
            Some(steps) if steps < MAX_INTERVAL_ELEMENTS => Ok(domain),
            _ => Err(ValidationError::invalid_format(
                "interval",
                format!("step is too small for [{}, {}]", min, max),
            )),
        }
    }

    fn step_count(&self) -> Option<usize> {
        let steps = ((self.max - self.min) / self.interval + ELEMENT_EPSILON).floor();
        (steps.is_finite() && steps >= 0.0 && steps < MAX_INTERVAL_ELEMENTS as f64).then(|| steps as usize)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Returns `min, min + interval, ...` up to and including `max`.
    ///
    /// Empty when the step count is not representable.
    pub fn elements(&self) -> Vec<f64> {
        let Some(steps) = self.step_count() else {
            return Vec::new();
        };
        (0..=steps)
            .map(|i| self.min + i as f64 * self.interval)
            .collect()
    }
}

/// Dense real range `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContinuousData")]
pub struct ContinuousDomain {
    min: f64,
    max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
}

#[derive(Deserialize)]
struct ContinuousData {
    min: f64,
    max: f64,
    #[serde(default)]
    unit: Option<String>,
}

impl TryFrom<ContinuousData> for ContinuousDomain {
    type Error = ValidationError;

    fn try_from(data: ContinuousData) -> Result<Self, Self::Error> {
        Self::new(data.min, data.max, data.unit)
    }
}

impl ContinuousDomain {
    /// Creates a continuous domain.
    pub fn new(min: f64, max: f64, unit: Option<String>) -> Result<Self, ValidationError> {
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(ValidationError::out_of_range("min", f64::MIN, max, min));
        }
        Ok(Self { min, max, unit })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Returns true if `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min - ELEMENT_EPSILON && value <= self.max + ELEMENT_EPSILON
    }
}

/// The valid element set of a primitive objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Domain {
    Categorical(CategoricalDomain),
    Interval(IntervalDomain),
    Continuous(ContinuousDomain),
}

impl Domain {
    /// Categorical and interval domains are scored element by element.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, Domain::Continuous(_))
    }

    /// Returns the explicit element list of a discrete domain.
    ///
    /// Continuous domains return an empty list.
    pub fn discrete_elements(&self) -> Vec<DomainValue> {
        match self {
            Domain::Categorical(d) => d
                .elements()
                .iter()
                .map(|e| DomainValue::Category(e.clone()))
                .collect(),
            Domain::Interval(d) => d.elements().into_iter().map(DomainValue::Number).collect(),
            Domain::Continuous(_) => Vec::new(),
        }
    }

    /// Returns the score function kind this domain requires.
    pub fn score_function_kind(&self) -> ScoreFunctionKind {
        if self.is_discrete() {
            ScoreFunctionKind::Discrete
        } else {
            ScoreFunctionKind::Continuous
        }
    }

    /// Returns true if `function` is a legal score function for this domain.
    pub fn accepts(&self, function: &ScoreFunction) -> bool {
        self.score_function_kind() == function.kind()
    }

    /// Builds a linear increasing score function over the domain.
    ///
    /// Discrete domains space scores evenly in element order; continuous
    /// domains get control points at `min -> 0` and `max -> 1`.
    pub fn default_score_function(&self) -> ScoreFunction {
        match self {
            Domain::Continuous(d) => {
                let mut function = ContinuousScoreFunction::new(d.min(), d.max());
                function.insert_control_point(d.min(), 0.0);
                function.insert_control_point(d.max(), 1.0);
                ScoreFunction::Continuous(function)
            }
            _ => {
                let elements = self.discrete_elements();
                let count = elements.len();
                let mut function = DiscreteScoreFunction::new();
                for (i, element) in elements.into_iter().enumerate() {
                    let score = if count == 1 {
                        1.0
                    } else {
                        i as f64 / (count - 1) as f64
                    };
                    function.insert_element(element, score);
                }
                ScoreFunction::Discrete(function)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_domain_generates_inclusive_steps() {
        let domain = IntervalDomain::new(0.0, 10.0, 2.5).unwrap();
        assert_eq!(domain.elements(), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn interval_domain_rejects_non_positive_step() {
        assert!(IntervalDomain::new(0.0, 10.0, 0.0).is_err());
        assert!(IntervalDomain::new(0.0, 10.0, -1.0).is_err());
        assert!(IntervalDomain::new(0.0, 1e12, 1e-12).is_err());
        assert!(IntervalDomain::new(0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn json_goes_through_the_constructors() {
        let zero_step = r#"{"type":"interval","min":0,"max":10,"interval":0}"#;
        assert!(serde_json::from_str::<Domain>(zero_step).is_err());
        let empty_range = r#"{"type":"continuous","min":5,"max":5}"#;
        assert!(serde_json::from_str::<Domain>(empty_range).is_err());
        let duplicates = r#"{"type":"categorical","elements":["low","low"]}"#;
        assert!(serde_json::from_str::<Domain>(duplicates).is_err());

        let valid = r#"{"type":"interval","min":0,"max":2,"interval":1}"#;
        let domain: Domain = serde_json::from_str(valid).unwrap();
        assert_eq!(domain.discrete_elements().len(), 3);
    }

    #[test]
    fn continuous_domain_rejects_empty_range() {
        assert!(ContinuousDomain::new(5.0, 5.0, None).is_err());
        assert!(ContinuousDomain::new(0.0, 1.0, Some("kg".into())).is_ok());
    }

    #[test]
    fn categorical_domain_rejects_duplicates() {
        let result = CategoricalDomain::new(vec!["low".into(), "low".into()], true);
        assert!(matches!(result, Err(ValidationError::Duplicate { .. })));
    }

    #[test]
    fn numeric_values_compare_with_tolerance() {
        let a = DomainValue::Number(0.1 + 0.2);
        let b = DomainValue::Number(0.3);
        assert!(a.same_element(&b));
        assert!(!a.same_element(&DomainValue::category("0.3")));
    }

    #[test]
    fn domain_value_deserializes_untagged() {
        let n: DomainValue = serde_json::from_str("42.5").unwrap();
        let c: DomainValue = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(n.as_number(), Some(42.5));
        assert!(c.same_element(&DomainValue::category("red")));
    }

    #[test]
    fn default_discrete_function_is_linear_in_element_order() {
        let domain = Domain::Categorical(
            CategoricalDomain::new(vec!["low".into(), "mid".into(), "high".into()], true).unwrap(),
        );
        let function = domain.default_score_function();
        assert_eq!(function.get_score(&"low".into()).unwrap(), 0.0);
        assert_eq!(function.get_score(&"mid".into()).unwrap(), 0.5);
        assert_eq!(function.get_score(&"high".into()).unwrap(), 1.0);
    }

    #[test]
    fn default_continuous_function_spans_domain() {
        let domain = Domain::Continuous(ContinuousDomain::new(0.0, 100.0, None).unwrap());
        let function = domain.default_score_function();
        assert!(domain.accepts(&function));
        assert!((function.get_score(&DomainValue::Number(25.0)).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn domain_rejects_score_function_of_wrong_kind() {
        let continuous = Domain::Continuous(ContinuousDomain::new(0.0, 1.0, None).unwrap());
        let discrete = Domain::Interval(IntervalDomain::new(0.0, 2.0, 1.0).unwrap());
        assert!(!continuous.accepts(&discrete.default_score_function()));
        assert!(!discrete.accepts(&continuous.default_score_function()));
    }
}
