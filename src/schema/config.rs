//! Configuration types for streamline engine parameters.

use serde::{Deserialize, Serialize};

use super::{ColorStop, spectrum_stops};

fn default_color_resolution() -> usize {
    100
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamlineConfig {
    /// Number of particles in the pool.
    pub particle_count: usize,
    /// Upper bound on a particle's lifetime, in ticks. Also the trail buffer length.
    pub max_age_limit: usize,
    /// Portion of the maximum age spent fading a trail out (exclusive 0.0-1.0).
    pub fade_out_fraction: f32,
    /// Scale applied to sampled vectors when advancing a trail head.
    pub velocity_factor: f32,
    /// Magnitude mapped to the first color stop.
    pub magnitude_min: f32,
    /// Magnitude mapped to the last color stop.
    pub magnitude_max: f32,
    /// Color ramp stops.
    #[serde(default = "spectrum_stops")]
    pub color_stops: Vec<ColorStop>,
    /// Number of lookup table buckets (table holds resolution + 1 entries).
    #[serde(default = "default_color_resolution")]
    pub color_resolution: usize,
    /// How vertex colors are drawn from the ramp.
    #[serde(default)]
    pub color_sampling: ColorSampling,
    /// Axis convention of exported render positions.
    #[serde(default)]
    pub render_axes: RenderAxes,
}

impl Default for StreamlineConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            max_age_limit: 200,
            fade_out_fraction: 0.1,
            velocity_factor: 0.1,
            magnitude_min: 0.0,
            magnitude_max: 1.0,
            color_stops: spectrum_stops(),
            color_resolution: default_color_resolution(),
            color_sampling: ColorSampling::default(),
            render_axes: RenderAxes::default(),
        }
    }
}

/// Ramp evaluation strategy for vertex colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSampling {
    /// Interpolate between bracketing stops for every vertex.
    #[default]
    Interpolated,
    /// Read the nearest bucket of the precomputed lookup table.
    Bucketed,
}

/// Axis convention for positions handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderAxes {
    /// Field axes unchanged: (x, y, z).
    Native,
    /// Field Z becomes the renderer's vertical axis: (x, z, y).
    #[default]
    SwapYZ,
}

impl StreamlineConfig {
    /// Number of frames a trail spends fading out before reset.
    ///
    /// Never less than one, so an advecting head always has a free vertex slot.
    #[inline]
    pub fn fade_out_frames(&self) -> usize {
        fade_out_frames(self.max_age_limit, self.fade_out_fraction)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::InvalidParticleCount);
        }
        if self.max_age_limit == 0 {
            return Err(ConfigError::InvalidMaxAge);
        }
        if !(self.fade_out_fraction > 0.0 && self.fade_out_fraction < 1.0) {
            return Err(ConfigError::InvalidFadeOutFraction(self.fade_out_fraction));
        }
        if !self.velocity_factor.is_finite() {
            return Err(ConfigError::InvalidVelocityFactor(self.velocity_factor));
        }
        if !self.magnitude_min.is_finite()
            || !self.magnitude_max.is_finite()
            || self.magnitude_max < self.magnitude_min
        {
            return Err(ConfigError::InvalidMagnitudeRange {
                min: self.magnitude_min,
                max: self.magnitude_max,
            });
        }
        Ok(())
    }
}

/// `round(max_age_limit * fraction)`, clamped to at least one frame.
#[inline]
pub fn fade_out_frames(max_age_limit: usize, fraction: f32) -> usize {
    ((max_age_limit as f32 * fraction).round() as usize).max(1)
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Particle count must be non-zero")]
    InvalidParticleCount,
    #[error("Maximum age must be non-zero")]
    InvalidMaxAge,
    #[error("Fade-out fraction must lie strictly between 0 and 1, got {0}")]
    InvalidFadeOutFraction(f32),
    #[error("Velocity factor must be finite, got {0}")]
    InvalidVelocityFactor(f32),
    #[error("Magnitude range [{min}, {max}] is not a finite, ordered interval")]
    InvalidMagnitudeRange { min: f32, max: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = StreamlineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.fade_out_frames(), 20);
    }

    #[test]
    fn test_fade_out_frames_floor() {
        assert_eq!(fade_out_frames(4, 0.1), 1);
        assert_eq!(fade_out_frames(200, 0.25), 50);
        assert_eq!(fade_out_frames(1, 0.9), 1);
    }

    #[test]
    fn test_validate_rejects_invalid() {
        let base = StreamlineConfig::default();

        let config = StreamlineConfig {
            particle_count: 0,
            ..base.clone()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParticleCount)
        ));

        let config = StreamlineConfig {
            max_age_limit: 0,
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxAge)));

        for fraction in [0.0, 1.0, -0.5, f32::NAN] {
            let config = StreamlineConfig {
                fade_out_fraction: fraction,
                ..base.clone()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidFadeOutFraction(_))
            ));
        }

        let config = StreamlineConfig {
            magnitude_min: 2.0,
            magnitude_max: 1.0,
            ..base
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMagnitudeRange { .. })
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let json = r#"{
            "particle_count": 50,
            "max_age_limit": 40,
            "fade_out_fraction": 0.2,
            "velocity_factor": 0.5,
            "magnitude_min": 0.0,
            "magnitude_max": 3.0
        }"#;
        let config: StreamlineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.color_stops.len(), 8);
        assert_eq!(config.color_resolution, 100);
        assert_eq!(config.color_sampling, ColorSampling::Interpolated);
        assert_eq!(config.render_axes, RenderAxes::SwapYZ);
        assert_eq!(config.fade_out_frames(), 8);
    }
}
