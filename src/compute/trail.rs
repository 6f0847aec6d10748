//! Single particle trail and its lifecycle.
//!
//! A trail moves through four phases:
//!
//! ```text
//! Seeding (age = 0) -> Advecting -> FadingOut -> Expired -> reset -> Seeding
//! ```
//!
//! While advecting, each tick samples the field at the head, appends the next
//! point and colors the sampled vertex by magnitude. Leaving the field (or
//! landing on an absent cell) jumps straight to fading out. Fading shrinks
//! every live vertex's alpha to zero over the remaining frames, after which
//! the engine resets the trail at a fresh random cell.

use rand::Rng;

use crate::schema::{ColorSampling, RenderAxes, Rgba};

use super::{ColorRamp, Vec3, VectorField, to_render_space};

/// Lifecycle phase of a trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Freshly placed, nothing drawn yet.
    Seeding,
    /// Following the field and growing.
    Advecting,
    /// Frozen in place, opacity decaying.
    FadingOut,
    /// Reached its lifetime; reset on the next tick.
    Expired,
}

/// Per-tick parameters shared read-only by every trail.
#[derive(Clone, Copy)]
pub struct StepParams<'a> {
    pub field: &'a VectorField,
    pub ramp: &'a ColorRamp,
    pub sampling: ColorSampling,
    pub velocity_factor: f32,
    pub magnitude_min: f32,
    pub magnitude_max: f32,
    pub fade_out_frames: usize,
}

impl StepParams<'_> {
    #[inline]
    fn color(&self, magnitude: f32) -> Rgba {
        match self.sampling {
            ColorSampling::Interpolated => {
                self.ramp
                    .color_for(magnitude, self.magnitude_min, self.magnitude_max)
            }
            ColorSampling::Bucketed => {
                self.ramp
                    .lookup(magnitude, self.magnitude_min, self.magnitude_max)
            }
        }
    }
}

/// One particle: its vertex buffers, age and randomized lifetime.
#[derive(Debug, Clone)]
pub struct Trail {
    positions: Vec<Vec3>,
    colors: Vec<Rgba>,
    age: usize,
    lifetime: usize,
    draw_range: usize,
}

impl Trail {
    /// Create a trail already reset at a random valid cell.
    pub fn seeded<R: Rng + ?Sized>(
        field: &VectorField,
        max_age_limit: usize,
        fade_out_frames: usize,
        rng: &mut R,
    ) -> Self {
        let mut trail = Self {
            positions: Vec::new(),
            colors: Vec::new(),
            age: 0,
            lifetime: 0,
            draw_range: 0,
        };
        trail.reset(field, max_age_limit, fade_out_frames, rng);
        trail
    }

    /// Restart at a random valid cell with a fresh lifetime in
    /// `[fade_out_frames, max_age_limit]`.
    ///
    /// Buffers are resized here, so a changed age limit applies from the next reset.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        field: &VectorField,
        max_age_limit: usize,
        fade_out_frames: usize,
        rng: &mut R,
    ) {
        let slots = max_age_limit.max(1);
        self.positions.resize(slots, [0.0; 3]);
        self.colors.clear();
        self.colors.resize(slots, [1.0; 4]);

        self.age = 0;
        self.lifetime = rng.gen_range(fade_out_frames.min(slots)..=slots);
        self.draw_range = 0;

        let start = field.cell_position(field.pick_random_valid_cell(rng));
        self.positions[0] = start;
        if let Some(second) = self.positions.get_mut(1) {
            *second = start;
        }
    }

    /// Current phase given the fade-out length.
    pub fn phase(&self, fade_out_frames: usize) -> Phase {
        if self.age >= self.lifetime {
            Phase::Expired
        } else if self.age == 0 {
            Phase::Seeding
        } else if self.age < self.lifetime.saturating_sub(fade_out_frames) {
            Phase::Advecting
        } else {
            Phase::FadingOut
        }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Advance one advecting or fading step. Expired trails are left for the
    /// engine to reset.
    pub fn advance(&mut self, params: &StepParams) {
        if self.is_expired() {
            return;
        }
        if self.age < self.lifetime.saturating_sub(params.fade_out_frames) {
            self.advect(params);
        } else {
            self.fade();
        }
    }

    fn advect(&mut self, params: &StepParams) {
        let head = self.positions[self.age];
        self.age += 1;

        let sample = params
            .field
            .sample(head)
            .filter(|_| self.age < self.positions.len());
        let Some([u, v, w]) = sample else {
            // Left the domain: skip ahead to fading out.
            let fade_start = self.lifetime.saturating_sub(params.fade_out_frames);
            self.age = fade_start.max(self.age);
            return;
        };

        let vf = params.velocity_factor;
        self.positions[self.age] = [head[0] + u * vf, head[1] + v * vf, head[2] + w * vf];

        // The sampled vertex takes the color of the vector found there.
        let magnitude = (u * u + v * v + w * w).sqrt();
        let [r, g, b, _] = params.color(magnitude);
        let sampled = &mut self.colors[self.age - 1];
        sampled[0] = r;
        sampled[1] = g;
        sampled[2] = b;

        // Opacity falls off from 1 at the newest drawn vertex toward 0 at the tail.
        let age = self.age as f32;
        for (c, color) in self.colors[..self.age].iter_mut().enumerate() {
            let rank = (c + 1) as f32 / age;
            color[3] = (1.0 - 1.0 / (rank * rank)).exp();
        }

        self.draw_range = self.age;
    }

    fn fade(&mut self) {
        self.age += 1;
        let remaining = self.lifetime.saturating_sub(self.age);
        for color in &mut self.colors[..self.draw_range] {
            color[3] = if remaining == 0 {
                0.0
            } else {
                (color[3] - color[3] / remaining as f32).max(0.0)
            };
        }
    }

    #[inline]
    pub fn age(&self) -> usize {
        self.age
    }

    #[inline]
    pub fn lifetime(&self) -> usize {
        self.lifetime
    }

    /// Number of leading vertices the renderer should draw.
    #[inline]
    pub fn draw_range(&self) -> usize {
        self.draw_range
    }

    /// Full vertex buffer in field space, including slots past the draw range.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Vertices inside the draw range.
    #[inline]
    pub fn live_positions(&self) -> &[Vec3] {
        &self.positions[..self.draw_range]
    }

    #[inline]
    pub fn live_colors(&self) -> &[Rgba] {
        &self.colors[..self.draw_range]
    }

    /// Positions as a flat `[x, y, z, x, y, z, ...]` slice for buffer upload.
    #[inline]
    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as a flat `[r, g, b, a, ...]` slice for buffer upload.
    #[inline]
    pub fn color_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Live vertices mapped into a renderer's axis convention.
    pub fn render_positions(&self, axes: RenderAxes) -> Vec<Vec3> {
        self.live_positions()
            .iter()
            .map(|&p| to_render_space(p, axes))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_lifetime(&mut self, lifetime: usize) {
        self.lifetime = lifetime;
    }
}
