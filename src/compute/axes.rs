//! Field-to-renderer coordinate adapter.
//!
//! The engine works in field coordinates throughout. This is the single place
//! where axes are remapped for a renderer.

use crate::schema::RenderAxes;

use super::Vec3;

/// Map a field-space point into the renderer's axis convention.
#[inline]
pub fn to_render_space(p: Vec3, axes: RenderAxes) -> Vec3 {
    match axes {
        RenderAxes::Native => p,
        RenderAxes::SwapYZ => [p[0], p[2], p[1]],
    }
}
