//! Objective hierarchy - evaluation criteria arranged as a tree.
//!
//! The tree is stored as an id-keyed arena with explicit parent and ordered
//! child links. It serializes as a nested list so external parsers can build
//! it naturally.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ObjectiveId, ValidationError};

use super::domain::Domain;
use super::score_function::ScoreFunction;

const DEFAULT_COLOR: &str = "#4a90d9";

/// Leaf objective, scored directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveObjective {
    pub id: ObjectiveId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub domain: Domain,
    pub default_score_function: ScoreFunction,
}

impl PrimitiveObjective {
    /// Creates a primitive objective with the domain's linear default score function.
    pub fn new(id: ObjectiveId, name: impl Into<String>, domain: Domain) -> Self {
        let default_score_function = domain.default_score_function();
        Self {
            id,
            name: name.into(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            domain,
            default_score_function,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Decomposable objective. Its children live in the owning [`ObjectiveTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct AbstractObjective {
    pub id: ObjectiveId,
    pub name: String,
    pub description: String,
}

impl AbstractObjective {
    pub fn new(id: ObjectiveId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
        }
    }
}

/// An evaluation criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    Abstract(AbstractObjective),
    Primitive(PrimitiveObjective),
}

impl Objective {
    pub fn id(&self) -> &ObjectiveId {
        match self {
            Objective::Abstract(o) => &o.id,
            Objective::Primitive(o) => &o.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Objective::Abstract(o) => &o.name,
            Objective::Primitive(o) => &o.name,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Objective::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveObjective> {
        match self {
            Objective::Primitive(o) => Some(o),
            Objective::Abstract(_) => None,
        }
    }
}

/// Nested, serde-friendly form of an objective subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "objectiveType", rename_all = "lowercase")]
pub enum ObjectiveSpec {
    #[serde(rename_all = "camelCase")]
    Abstract {
        id: ObjectiveId,
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        sub_objectives: Vec<ObjectiveSpec>,
    },
    #[serde(rename_all = "camelCase")]
    Primitive {
        id: ObjectiveId,
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default = "default_color")]
        color: String,
        domain: Domain,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_score_function: Option<ScoreFunction>,
    },
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq)]
struct ObjectiveNode {
    objective: Objective,
    parent: Option<ObjectiveId>,
    children: Vec<ObjectiveId>,
}

/// The objective hierarchy of a chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ObjectiveSpec>", into = "Vec<ObjectiveSpec>")]
pub struct ObjectiveTree {
    nodes: HashMap<ObjectiveId, ObjectiveNode>,
    roots: Vec<ObjectiveId>,
}

impl TryFrom<Vec<ObjectiveSpec>> for ObjectiveTree {
    type Error = DomainError;

    fn try_from(specs: Vec<ObjectiveSpec>) -> Result<Self, Self::Error> {
        ObjectiveTree::from_specs(specs)
    }
}

impl From<ObjectiveTree> for Vec<ObjectiveSpec> {
    fn from(tree: ObjectiveTree) -> Self {
        tree.to_specs()
    }
}

impl ObjectiveTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from nested root specs, rejecting duplicate ids.
    pub fn from_specs(specs: Vec<ObjectiveSpec>) -> Result<Self, DomainError> {
        let mut tree = Self::new();
        for spec in specs {
            tree.insert_spec(None, spec)?;
        }
        Ok(tree)
    }

    fn insert_spec(&mut self, parent: Option<&ObjectiveId>, spec: ObjectiveSpec) -> Result<(), DomainError> {
        match spec {
            ObjectiveSpec::Abstract {
                id,
                name,
                description,
                sub_objectives,
            } => {
                let objective = Objective::Abstract(AbstractObjective {
                    id: id.clone(),
                    name,
                    description,
                });
                self.add_objective(parent, objective)?;
                for child in sub_objectives {
                    self.insert_spec(Some(&id), child)?;
                }
            }
            ObjectiveSpec::Primitive {
                id,
                name,
                description,
                color,
                domain,
                default_score_function,
            } => {
                let default_score_function =
                    default_score_function.unwrap_or_else(|| domain.default_score_function());
                if !domain.accepts(&default_score_function) {
                    return Err(ValidationError::invalid_format(
                        "default_score_function",
                        format!("{} function does not fit domain of '{}'", default_score_function.kind(), name),
                    )
                    .into());
                }
                let objective = Objective::Primitive(PrimitiveObjective {
                    id,
                    name,
                    description,
                    color,
                    domain,
                    default_score_function,
                });
                self.add_objective(parent, objective)?;
            }
        }
        Ok(())
    }

    /// Converts back into nested root specs.
    pub fn to_specs(&self) -> Vec<ObjectiveSpec> {
        self.roots.iter().filter_map(|id| self.spec_for(id)).collect()
    }

    fn spec_for(&self, id: &ObjectiveId) -> Option<ObjectiveSpec> {
        let node = self.nodes.get(id)?;
        Some(match &node.objective {
            Objective::Abstract(o) => ObjectiveSpec::Abstract {
                id: o.id.clone(),
                name: o.name.clone(),
                description: o.description.clone(),
                sub_objectives: node
                    .children
                    .iter()
                    .filter_map(|child| self.spec_for(child))
                    .collect(),
            },
            Objective::Primitive(o) => ObjectiveSpec::Primitive {
                id: o.id.clone(),
                name: o.name.clone(),
                description: o.description.clone(),
                color: o.color.clone(),
                domain: o.domain.clone(),
                default_score_function: Some(o.default_score_function.clone()),
            },
        })
    }

    // ───────────────────────────────────────────────────────────────
    // Mutators
    // ───────────────────────────────────────────────────────────────

    /// Appends an objective under `parent`, or as a new root when `None`.
    pub fn add_objective(&mut self, parent: Option<&ObjectiveId>, objective: Objective) -> Result<(), DomainError> {
        let id = objective.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(ValidationError::duplicate("objective id", id.as_str()).into());
        }
        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or_else(|| DomainError::unknown_objective(parent_id.as_str()))?;
                if parent_node.objective.is_primitive() {
                    return Err(DomainError::validation(
                        "parent",
                        format!("Primitive objective '{}' cannot have children", parent_id),
                    ));
                }
                parent_node.children.push(id.clone());
            }
            None => self.roots.push(id.clone()),
        }
        self.nodes.insert(
            id,
            ObjectiveNode {
                objective,
                parent: parent.cloned(),
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Removes an objective and its whole subtree. Returns the removed ids in pre-order.
    pub fn remove_objective(&mut self, id: &ObjectiveId) -> Result<Vec<ObjectiveId>, DomainError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| DomainError::unknown_objective(id.as_str()))?
            .parent
            .clone();
        let removed = self.subtree_ids(id);
        self.sibling_list_mut(parent.as_ref()).retain(|sibling| sibling != id);
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }
        Ok(removed)
    }

    /// Moves an objective to `new_index` within its sibling list.
    pub fn move_objective(&mut self, id: &ObjectiveId, new_index: usize) -> Result<(), DomainError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| DomainError::unknown_objective(id.as_str()))?
            .parent
            .clone();
        let siblings = self.sibling_list_mut(parent.as_ref());
        let current = siblings
            .iter()
            .position(|sibling| sibling == id)
            .ok_or_else(|| DomainError::unknown_objective(id.as_str()))?;
        if new_index >= siblings.len() {
            return Err(ValidationError::out_of_range(
                "new_index",
                0.0,
                (siblings.len() - 1) as f64,
                new_index as f64,
            )
            .into());
        }
        let moved = siblings.remove(current);
        siblings.insert(new_index, moved);
        Ok(())
    }

    fn sibling_list_mut(&mut self, parent: Option<&ObjectiveId>) -> &mut Vec<ObjectiveId> {
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(node) => &mut node.children,
            None => &mut self.roots,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    pub fn roots(&self) -> &[ObjectiveId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &ObjectiveId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &ObjectiveId) -> Option<&Objective> {
        self.nodes.get(id).map(|node| &node.objective)
    }

    /// Looks up an objective by display name.
    ///
    /// # Errors
    /// `UnknownObjective` when no objective carries `name`.
    pub fn get_by_name(&self, name: &str) -> Result<&Objective, DomainError> {
        self.all_objectives()
            .into_iter()
            .find(|o| o.name() == name)
            .ok_or_else(|| DomainError::unknown_objective(name))
    }

    pub fn parent(&self, id: &ObjectiveId) -> Option<&ObjectiveId> {
        self.nodes.get(id).and_then(|node| node.parent.as_ref())
    }

    /// Ordered children; empty for primitives and unknown ids.
    pub fn children(&self, id: &ObjectiveId) -> &[ObjectiveId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// The ordered sibling list containing `id` (itself included).
    pub fn siblings(&self, id: &ObjectiveId) -> &[ObjectiveId] {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None if self.contains(id) => &self.roots,
            None => &[],
        }
    }

    /// Distance from the root level; roots have depth 0.
    pub fn depth(&self, id: &ObjectiveId) -> Option<usize> {
        let mut node = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent.as_ref().and_then(|p| self.nodes.get(p)) {
            depth += 1;
            node = parent;
        }
        Some(depth)
    }

    /// Height of the subtree below `id`: 0 for primitives and empty abstract objectives.
    pub fn max_depth_of_children(&self, id: &ObjectiveId) -> usize {
        self.children(id)
            .iter()
            .map(|child| 1 + self.max_depth_of_children(child))
            .max()
            .unwrap_or(0)
    }

    /// Every objective in pre-order.
    pub fn all_objectives(&self) -> Vec<&Objective> {
        self.all_objective_ids()
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Every objective id in pre-order.
    pub fn all_objective_ids(&self) -> Vec<ObjectiveId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_preorder(root, &mut out);
        }
        out
    }

    /// Primitive objectives in pre-order. This is the row order of the chart.
    pub fn all_primitive_objectives(&self) -> Vec<&PrimitiveObjective> {
        self.all_objectives()
            .into_iter()
            .filter_map(Objective::as_primitive)
            .collect()
    }

    pub fn primitive_ids(&self) -> Vec<ObjectiveId> {
        self.all_primitive_objectives()
            .into_iter()
            .map(|o| o.id.clone())
            .collect()
    }

    /// Primitive objectives below `id` (or `id` itself when primitive).
    pub fn primitive_descendants(&self, id: &ObjectiveId) -> Vec<ObjectiveId> {
        self.subtree_ids(id)
            .into_iter()
            .filter(|d| self.get(d).map_or(false, Objective::is_primitive))
            .collect()
    }

    /// Desired row index per primitive objective id.
    pub fn primitive_index_map(&self) -> HashMap<ObjectiveId, usize> {
        self.primitive_ids()
            .into_iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect()
    }

    fn subtree_ids(&self, id: &ObjectiveId) -> Vec<ObjectiveId> {
        let mut out = Vec::new();
        self.collect_preorder(id, &mut out);
        out
    }

    fn collect_preorder(&self, id: &ObjectiveId, out: &mut Vec<ObjectiveId>) {
        if let Some(node) = self.nodes.get(id) {
            out.push(id.clone());
            for child in &node.children {
                self.collect_preorder(child, out);
            }
        }
    }
}
