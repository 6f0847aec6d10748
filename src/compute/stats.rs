//! Pool statistics for monitoring.

use rand::Rng;

use super::{Phase, StreamlineEngine};

/// Snapshot of the particle pool.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EngineStats {
    pub particles: usize,
    pub seeding: usize,
    pub advecting: usize,
    pub fading_out: usize,
    pub expired: usize,
    /// Sum of draw ranges across the pool.
    pub live_vertices: usize,
    pub mean_age: f32,
    pub mean_lifetime: f32,
}

impl EngineStats {
    /// Compute statistics from the engine's current pool.
    pub fn from_engine<R: Rng>(engine: &StreamlineEngine<R>) -> Self {
        let fade_out_frames = engine.fade_out_frames();
        let mut stats = Self {
            particles: engine.trails().len(),
            ..Default::default()
        };
        if stats.particles == 0 {
            return stats;
        }

        let mut age_sum = 0usize;
        let mut lifetime_sum = 0usize;
        for trail in engine.trails() {
            match trail.phase(fade_out_frames) {
                Phase::Seeding => stats.seeding += 1,
                Phase::Advecting => stats.advecting += 1,
                Phase::FadingOut => stats.fading_out += 1,
                Phase::Expired => stats.expired += 1,
            }
            stats.live_vertices += trail.draw_range();
            age_sum += trail.age();
            lifetime_sum += trail.lifetime();
        }
        stats.mean_age = age_sum as f32 / stats.particles as f32;
        stats.mean_lifetime = lifetime_sum as f32 / stats.particles as f32;
        stats
    }
}
