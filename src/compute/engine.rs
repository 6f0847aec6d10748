//! Streamline engine - Owns the particle pool and drives the per-frame update.
//!
//! The engine is frame-driven: a render loop calls [`StreamlineEngine::tick`]
//! once per displayed frame and then reads each trail's buffers. Nothing here
//! runs on its own timer or thread.

use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{
    ColorSampling, ColorStop, ConfigError, FieldFile, RampError, StreamlineConfig,
};

use super::{ColorRamp, FieldError, StepParams, Trail, Vec3, VectorField};

/// Streamline particle advection engine.
///
/// Generic over its random source so tests can inject a seeded generator.
pub struct StreamlineEngine<R: Rng = StdRng> {
    config: StreamlineConfig,
    field: Arc<VectorField>,
    /// Current ramp snapshot; swapped wholesale on reconfiguration.
    ramp: Arc<ColorRamp>,
    trails: Vec<Trail>,
    /// Per-trail flags marking resets done in the current tick.
    reset_flags: Vec<bool>,
    rng: R,
    frame: u64,
}

impl StreamlineEngine<StdRng> {
    /// Create an engine seeded from system entropy.
    pub fn new(field: Arc<VectorField>, config: StreamlineConfig) -> Result<Self, EngineError> {
        Self::with_rng(field, config, StdRng::from_entropy())
    }

    /// Create an engine with a deterministic random seed.
    pub fn seeded(
        field: Arc<VectorField>,
        config: StreamlineConfig,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::with_rng(field, config, StdRng::seed_from_u64(seed))
    }

    /// Build the field from a parsed file and create an engine over it.
    ///
    /// A magnitude range supplied by the file overrides the config's.
    pub fn from_file(file: &FieldFile, mut config: StreamlineConfig) -> Result<Self, EngineError> {
        if let Some(min) = file.min {
            config.magnitude_min = min;
        }
        if let Some(max) = file.max {
            config.magnitude_max = max;
        }
        let field = VectorField::from_file(file)?;
        Self::new(Arc::new(field), config)
    }
}

impl<R: Rng> StreamlineEngine<R> {
    /// Validate configuration, build the color ramp and seed the pool.
    pub fn with_rng(
        field: Arc<VectorField>,
        config: StreamlineConfig,
        mut rng: R,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let ramp = ColorRamp::new(config.color_stops.clone(), config.color_resolution)?;

        if config.magnitude_min == config.magnitude_max {
            warn!(
                "Empty magnitude range [{}, {}]: every vertex takes the first stop color",
                config.magnitude_min, config.magnitude_max
            );
        }

        let trails = seed_pool(&field, &config, &mut rng, config.particle_count);
        let (y_len, x_len, z_len) = field.dims();
        info!(
            "Streamline engine: {} particles over {}x{}x{} field ({} valid cells)",
            trails.len(),
            x_len,
            y_len,
            z_len,
            field.valid_cells().len()
        );

        Ok(Self {
            reset_flags: vec![false; trails.len()],
            config,
            field,
            ramp: Arc::new(ramp),
            trails,
            rng,
            frame: 0,
        })
    }

    /// Advance every trail one lifecycle step.
    ///
    /// Expired trails are reset first, in pool order, since resets draw from
    /// the shared random source. All other trails then advance independently.
    pub fn tick(&mut self) {
        let fade_out_frames = self.config.fade_out_frames();
        let max_age_limit = self.config.max_age_limit;
        let field = &*self.field;

        for (trail, reset) in self.trails.iter_mut().zip(self.reset_flags.iter_mut()) {
            *reset = trail.is_expired();
            if *reset {
                trail.reset(field, max_age_limit, fade_out_frames, &mut self.rng);
            }
        }

        let params = StepParams {
            field,
            ramp: &self.ramp,
            sampling: self.config.color_sampling,
            velocity_factor: self.config.velocity_factor,
            magnitude_min: self.config.magnitude_min,
            magnitude_max: self.config.magnitude_max,
            fade_out_frames,
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.trails
                .par_iter_mut()
                .zip(self.reset_flags.par_iter())
                .filter(|(_, reset)| !**reset)
                .for_each(|(trail, _)| trail.advance(&params));
        }

        #[cfg(target_arch = "wasm32")]
        {
            for (trail, reset) in self.trails.iter_mut().zip(&self.reset_flags) {
                if !*reset {
                    trail.advance(&params);
                }
            }
        }

        self.frame += 1;
    }

    /// Run the given number of ticks.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Set the advection scale. Already placed points are not rescaled.
    pub fn set_velocity_factor(&mut self, velocity_factor: f32) -> Result<(), ConfigError> {
        if !velocity_factor.is_finite() {
            return Err(ConfigError::InvalidVelocityFactor(velocity_factor));
        }
        debug!("Velocity factor {} -> {}", self.config.velocity_factor, velocity_factor);
        self.config.velocity_factor = velocity_factor;
        Ok(())
    }

    /// Set the age limit. In-flight trails keep their lifetime; each picks up
    /// the new limit at its next reset.
    pub fn set_max_age_limit(&mut self, max_age_limit: usize) -> Result<(), ConfigError> {
        if max_age_limit == 0 {
            return Err(ConfigError::InvalidMaxAge);
        }
        debug!("Max age {} -> {}", self.config.max_age_limit, max_age_limit);
        self.config.max_age_limit = max_age_limit;
        Ok(())
    }

    /// Set the magnitude range mapped onto the color ramp.
    pub fn set_magnitude_range(&mut self, min: f32, max: f32) -> Result<(), ConfigError> {
        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(ConfigError::InvalidMagnitudeRange { min, max });
        }
        debug!("Magnitude range [{}, {}]", min, max);
        self.config.magnitude_min = min;
        self.config.magnitude_max = max;
        Ok(())
    }

    /// Rebuild the pool with exactly `count` freshly seeded trails.
    pub fn set_particle_count(&mut self, count: usize) -> Result<(), ConfigError> {
        if count == 0 {
            return Err(ConfigError::InvalidParticleCount);
        }
        self.trails = seed_pool(&self.field, &self.config, &mut self.rng, count);
        self.reset_flags = vec![false; count];
        self.config.particle_count = count;
        info!("Rebuilt particle pool with {} trails", count);
        Ok(())
    }

    /// Replace the color ramp. Trails are untouched; the next tick uses the new ramp.
    pub fn set_color_ramp(&mut self, stops: Vec<ColorStop>) -> Result<(), RampError> {
        let ramp = ColorRamp::new(stops, self.config.color_resolution)?;
        debug!("Color ramp rebuilt with {} stops", ramp.stops().len());
        self.config.color_stops = ramp.stops().to_vec();
        self.ramp = Arc::new(ramp);
        Ok(())
    }

    pub fn set_color_sampling(&mut self, sampling: ColorSampling) {
        self.config.color_sampling = sampling;
    }

    /// Release the pool's buffers. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.trails.capacity() > 0 {
            debug!("Disposing {} trails", self.trails.len());
        }
        self.trails = Vec::new();
        self.reset_flags = Vec::new();
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.trails.is_empty()
    }

    #[inline]
    pub fn config(&self) -> &StreamlineConfig {
        &self.config
    }

    #[inline]
    pub fn field(&self) -> &Arc<VectorField> {
        &self.field
    }

    /// Current ramp snapshot.
    #[inline]
    pub fn ramp(&self) -> &Arc<ColorRamp> {
        &self.ramp
    }

    #[inline]
    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    /// Live vertices of one trail in the configured renderer axes.
    pub fn render_positions(&self, index: usize) -> Option<Vec<Vec3>> {
        self.trails
            .get(index)
            .map(|trail| trail.render_positions(self.config.render_axes))
    }

    #[inline]
    pub fn fade_out_frames(&self) -> usize {
        self.config.fade_out_frames()
    }

    /// Ticks run so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn seed_pool<R: Rng + ?Sized>(
    field: &VectorField,
    config: &StreamlineConfig,
    rng: &mut R,
    count: usize,
) -> Vec<Trail> {
    let fade_out_frames = config.fade_out_frames();
    (0..count)
        .map(|_| Trail::seeded(field, config.max_age_limit, fade_out_frames, rng))
        .collect()
}

/// Engine construction errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid color ramp: {0}")]
    Ramp(#[from] RampError),
    #[error(transparent)]
    Field(#[from] FieldError),
}
