use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{
    ABSENCE_RESET_MS, DEBOUNCE_MS, EYE_OPEN_THRESHOLD, MAX_BLINK_DURATION_MS,
    MIN_BLINK_DURATION_MS, NORMAL_RATE_MAX, NORMAL_RATE_MIN, SIMULTANEITY_WINDOW_MS,
    STABILITY_THRESHOLD, WINDOW_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeEdgeParams {
    pub open_threshold: f32,
    /// Hysteresis lower bound. `None` keeps a single threshold.
    pub close_threshold: Option<f32>,
}

impl Default for EyeEdgeParams {
    fn default() -> Self {
        Self {
            open_threshold: EYE_OPEN_THRESHOLD,
            close_threshold: None,
        }
    }
}

impl EyeEdgeParams {
    pub fn effective_close_threshold(&self) -> f32 {
        self.close_threshold.unwrap_or(self.open_threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub simultaneity_window_ms: u64,
    pub debounce_ms: u64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            min_duration_ms: MIN_BLINK_DURATION_MS,
            max_duration_ms: MAX_BLINK_DURATION_MS,
            simultaneity_window_ms: SIMULTANEITY_WINDOW_MS,
            debounce_ms: DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityParams {
    pub threshold: u32,
    pub absence_reset_ms: u64,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self {
            threshold: STABILITY_THRESHOLD,
            absence_reset_ms: ABSENCE_RESET_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    pub window_ms: u64,
    pub normal_rate_min: u32,
    pub normal_rate_max: u32,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            window_ms: WINDOW_MS,
            normal_rate_min: NORMAL_RATE_MIN,
            normal_rate_max: NORMAL_RATE_MAX,
        }
    }
}

/// Every tunable of the engine. Missing JSON fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkEngineConfig {
    pub eye: EyeEdgeParams,
    pub classifier: ClassifierParams,
    pub stability: StabilityParams,
    pub window: WindowParams,
}

impl BlinkEngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("eye.open_threshold", self.eye.open_threshold)?;
        if let Some(close) = self.eye.close_threshold {
            check_unit("eye.close_threshold", close)?;
            if close > self.eye.open_threshold {
                return Err(ConfigError::InvertedHysteresis {
                    open: self.eye.open_threshold,
                    close,
                });
            }
        }

        let c = &self.classifier;
        if c.min_duration_ms > c.max_duration_ms {
            return Err(ConfigError::InvertedDurationBounds {
                min: c.min_duration_ms,
                max: c.max_duration_ms,
            });
        }

        if self.stability.threshold == 0 {
            return Err(ConfigError::Zero("stability.threshold"));
        }
        if self.window.window_ms == 0 {
            return Err(ConfigError::Zero("window.window_ms"));
        }
        if self.window.normal_rate_min > self.window.normal_rate_max {
            return Err(ConfigError::InvertedRateRange {
                min: self.window.normal_rate_min,
                max: self.window.normal_rate_max,
            });
        }

        Ok(())
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = BlinkEngineConfig::default();
        assert_eq!(config.eye.open_threshold, 0.3);
        assert_eq!(config.eye.effective_close_threshold(), 0.3);
        assert_eq!(config.classifier.min_duration_ms, 80);
        assert_eq!(config.classifier.max_duration_ms, 500);
        assert_eq!(config.classifier.simultaneity_window_ms, 100);
        assert_eq!(config.classifier.debounce_ms, 200);
        assert_eq!(config.stability.threshold, 5);
        assert_eq!(config.stability.absence_reset_ms, 1000);
        assert_eq!(config.window.window_ms, 60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: BlinkEngineConfig =
            serde_json::from_str(r#"{"classifier":{"debounce_ms":150}}"#).unwrap();
        assert_eq!(config.classifier.debounce_ms, 150);
        assert_eq!(config.classifier.min_duration_ms, 80);
        assert_eq!(config.window.window_ms, 60_000);
    }

    #[test]
    fn test_rejects_inverted_hysteresis() {
        let mut config = BlinkEngineConfig::default();
        config.eye.close_threshold = Some(0.4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedHysteresis {
                open: 0.3,
                close: 0.4
            })
        );

        config.eye.close_threshold = Some(0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let mut config = BlinkEngineConfig::default();
        config.classifier.min_duration_ms = 600;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedDurationBounds { .. })
        ));

        let mut config = BlinkEngineConfig::default();
        config.eye.open_threshold = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));

        let mut config = BlinkEngineConfig::default();
        config.stability.threshold = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero("stability.threshold"))
        );
    }
}
