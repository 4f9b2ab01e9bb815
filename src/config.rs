//! Session configuration
//!
//! Timing, layout and replay parameters shared by the animation producer,
//! the random generators and the history controller.

use thiserror::Error;

/// Errors raised while validating a [`SessionConfig`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter is out of its valid range.
    #[error("invalid session configuration: {0}")]
    InvalidConfiguration(String),
}

/// Configuration parameters for an animation session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Duration of "show" steps (comparisons, reveals, fades, array inserts).
    pub step_duration_ms: f64,
    /// Duration of pure state-change steps.
    pub instant_duration_ms: f64,
    /// Speed of moving steps, in pixels per millisecond.
    pub move_speed: f64,
    /// Frame rate hint for renderers driving [`crate::Session::tick`].
    pub frames_per_second: u32,
    /// Width of the layout surface.
    pub width: f64,
    /// Height of the layout surface.
    pub height: f64,
    /// Chain into the next history entry when a timeline finishes.
    pub continuous: bool,
    /// Seed for the random tree and heap generators (`None` draws from entropy).
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            step_duration_ms: 650.0,
            instant_duration_ms: 1.0,
            move_speed: 0.25,
            frames_per_second: 50,
            width: 800.0,
            height: 600.0,
            continuous: true,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Set the show-step duration.
    pub fn with_step_duration(mut self, millis: f64) -> Result<Self, ConfigError> {
        self.step_duration_ms = millis;
        self.validate()?;
        Ok(self)
    }

    /// Set the move speed in pixels per millisecond.
    pub fn with_move_speed(mut self, speed: f64) -> Result<Self, ConfigError> {
        self.move_speed = speed;
        self.validate()?;
        Ok(self)
    }

    /// Set the layout surface size.
    pub fn with_surface(mut self, width: f64, height: f64) -> Result<Self, ConfigError> {
        self.width = width;
        self.height = height;
        self.validate()?;
        Ok(self)
    }

    /// Set the frame rate hint.
    pub fn with_frames_per_second(mut self, fps: u32) -> Result<Self, ConfigError> {
        self.frames_per_second = fps;
        self.validate()?;
        Ok(self)
    }

    /// Enable or disable continuous chaining.
    pub fn with_continuous(mut self, enabled: bool) -> Self {
        self.continuous = enabled;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Milliseconds between frames at the configured rate.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.frames_per_second.max(1))
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("step duration", self.step_duration_ms),
            ("instant duration", self.instant_duration_ms),
            ("move speed", self.move_speed),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "{name} must be > 0 (got {value})"
                )));
            }
        }
        if self.frames_per_second == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "frames per second must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step_duration_ms, 650.0);
        assert_eq!(config.frame_interval_ms(), 20.0);
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let err = SessionConfig::default().with_move_speed(0.0).unwrap_err();
        assert!(err.to_string().contains("move speed"));
    }

    #[test]
    fn test_rejects_nan_duration() {
        assert!(SessionConfig::default()
            .with_step_duration(f64::NAN)
            .is_err());
    }

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::default()
            .with_seed(7)
            .with_continuous(false)
            .with_surface(1024.0, 768.0)
            .unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(!config.continuous);
        assert_eq!(config.width, 1024.0);
    }
}
