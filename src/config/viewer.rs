//! Chart viewer configuration

use serde::Deserialize;

use crate::domain::layout::ViewOrientation;

use super::error::ValidationError;

/// How charts are laid out and how interactions move weight.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ViewerConfig {
    /// Row layout direction
    #[serde(default)]
    pub orientation: ViewOrientation,

    /// Total weight capacity shared by the root objectives
    #[serde(default = "default_weight_total")]
    pub weight_total: f64,

    /// Externally supplied identity used to pick the current user
    #[serde(default)]
    pub current_username: Option<String>,

    /// Fraction of the weight total moved by one pump click
    #[serde(default = "default_pump_step")]
    pub pump_step: f64,

    /// Extent of one alternative column along the drag axis
    #[serde(default = "default_alternative_extent")]
    pub alternative_extent: f64,
}

impl ViewerConfig {
    /// Weight moved by one pump click.
    pub fn pump_amount(&self) -> f64 {
        self.pump_step * self.weight_total
    }

    pub fn with_current_username(mut self, username: impl Into<String>) -> Self {
        self.current_username = Some(username.into());
        self
    }

    pub fn with_orientation(mut self, orientation: ViewOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Validate viewer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.weight_total > 0.0 && self.weight_total.is_finite()) {
            return Err(ValidationError::InvalidWeightTotal(self.weight_total));
        }
        if !(self.pump_step > 0.0 && self.pump_step <= 1.0) {
            return Err(ValidationError::InvalidPumpStep(self.pump_step));
        }
        if !(self.alternative_extent > 0.0 && self.alternative_extent.is_finite()) {
            return Err(ValidationError::InvalidAlternativeExtent(self.alternative_extent));
        }
        if matches!(&self.current_username, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::BlankUsername);
        }
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            orientation: ViewOrientation::default(),
            weight_total: default_weight_total(),
            current_username: None,
            pump_step: default_pump_step(),
            alternative_extent: default_alternative_extent(),
        }
    }
}

fn default_weight_total() -> f64 {
    1.0
}

fn default_pump_step() -> f64 {
    0.01
}

fn default_alternative_extent() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_config_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.orientation, ViewOrientation::Vertical);
        assert_eq!(config.weight_total, 1.0);
        assert_eq!(config.pump_step, 0.01);
        assert!(config.current_username.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pump_amount_scales_with_total() {
        let config = ViewerConfig {
            weight_total: 2.0,
            pump_step: 0.05,
            ..ViewerConfig::default()
        };
        assert!((config.pump_amount() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_total() {
        let config = ViewerConfig {
            weight_total: 0.0,
            ..ViewerConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWeightTotal(0.0)));
    }

    #[test]
    fn test_rejects_pump_step_out_of_range() {
        let config = ViewerConfig {
            pump_step: 1.5,
            ..ViewerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPumpStep(_))));
    }

    #[test]
    fn test_rejects_blank_username() {
        let config = ViewerConfig::default().with_current_username("  ");
        assert_eq!(config.validate(), Err(ValidationError::BlankUsername));
    }
}
