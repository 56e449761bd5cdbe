//! User - one participant's preferences over the chart.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::score_function_map::ScoreFunctionMap;
use super::weight_map::WeightMap;

/// A participant with their own weights and score functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    username: String,
    #[serde(default)]
    pub color: Option<String>,
    pub weight_map: WeightMap,
    pub score_function_map: ScoreFunctionMap,
}

impl User {
    /// Creates a user, rejecting an empty username.
    pub fn new(
        username: impl Into<String>,
        weight_map: WeightMap,
        score_function_map: ScoreFunctionMap,
    ) -> Result<Self, ValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(ValidationError::empty_field("username"));
        }
        Ok(Self {
            username,
            color: None,
            weight_map,
            score_function_map,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
