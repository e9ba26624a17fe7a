//! Table and physics configuration
//!
//! Loaded from JSON by the headless runner; every field falls back to the
//! reference table when omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// Simulation parameters fixed for the lifetime of a table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Playing area width (short side, x axis), meters
    pub table_width: f32,
    /// Playing area height (long side, y axis), meters
    pub table_height: f32,
    /// Rolling friction coefficient (dimensionless)
    pub friction_coefficient: f32,
    /// Duration of one tick, seconds
    pub tick_duration: f32,
    /// Gravitational acceleration, m/s²
    pub gravity: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            table_width: TABLE_WIDTH,
            table_height: TABLE_HEIGHT,
            friction_coefficient: COEFF_FRICTION,
            tick_duration: TICK_DURATION,
            gravity: GRAVITY,
        }
    }
}

impl SimConfig {
    /// Config for the given table and timing, standard gravity
    pub fn new(
        table_width: f32,
        table_height: f32,
        friction_coefficient: f32,
        tick_duration: f32,
    ) -> Self {
        Self {
            table_width,
            table_height,
            friction_coefficient,
            tick_duration,
            ..Self::default()
        }
    }

    /// Speed lost per second of rolling
    #[inline]
    pub fn deceleration(&self) -> f32 {
        self.friction_coefficient * self.gravity
    }

    /// Check that the values describe a buildable table
    pub fn validate(&self) -> SimResult<()> {
        positive("table_width", self.table_width)?;
        positive("table_height", self.table_height)?;
        positive("tick_duration", self.tick_duration)?;
        non_negative("friction_coefficient", self.friction_coefficient)?;
        non_negative("gravity", self.gravity)?;

        // Both corner cut-outs plus their banks must fit on each rail
        let min_width = 2.0 * (CORNER_CUT + BANK_WIDTH);
        if self.table_width <= min_width {
            return Err(SimError::invalid_config(format!(
                "table_width {} leaves no main cushion (needs > {min_width})",
                self.table_width
            )));
        }
        // Each half of a long rail holds a corner cut, a side pocket half gap
        // and two banks
        let min_height = 2.0 * (CORNER_CUT + SIDE_POCKET_HALF_GAP + 2.0 * BANK_WIDTH);
        if self.table_height <= min_height {
            return Err(SimError::invalid_config(format!(
                "table_height {} leaves no main cushion (needs > {min_height})",
                self.table_height
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

fn positive(name: &str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_config(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_config(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            SimConfig::new(0.0, TABLE_HEIGHT, 0.2, 0.01),
            SimConfig::new(TABLE_WIDTH, -1.0, 0.2, 0.01),
            SimConfig::new(TABLE_WIDTH, TABLE_HEIGHT, -0.1, 0.01),
            SimConfig::new(TABLE_WIDTH, TABLE_HEIGHT, 0.2, 0.0),
            SimConfig::new(TABLE_WIDTH, TABLE_HEIGHT, f32::NAN, 0.01),
            SimConfig::new(0.2, TABLE_HEIGHT, 0.2, 0.01),
            SimConfig::new(TABLE_WIDTH, 0.4, 0.2, 0.01),
        ];
        for config in &bad {
            assert!(
                matches!(config.validate(), Err(SimError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "friction_coefficient": 0.1 }"#).unwrap();
        assert_eq!(config.friction_coefficient, 0.1);
        assert_eq!(config.table_width, TABLE_WIDTH);
        assert_eq!(config.tick_duration, TICK_DURATION);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(SimError::Parse(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "tick_duration": -1.0 }"#),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig::new(1.0, 2.0, 0.15, 0.005);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<SimConfig>(&json).unwrap(), config);
    }
}
