//! Magnitude to color mapping.
//!
//! A ramp is a piecewise-linear function from normalized magnitude to RGB,
//! defined by ordered [`ColorStop`]s. Each ramp also carries a precomputed
//! lookup table of `resolution + 1` buckets for the cheap bucketed path.

use crate::schema::{ColorStop, RampError, Rgba, validate_stops};

/// Returned for undefined magnitudes.
pub const TRANSPARENT_WHITE: Rgba = [1.0, 1.0, 1.0, 0.0];

/// Immutable color ramp with its lookup table.
///
/// Replaced wholesale on reconfiguration, never edited in place.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
    lookup: Vec<Rgba>,
}

impl ColorRamp {
    /// Validate stops and build the lookup table.
    ///
    /// Bucket `b` holds the color at normalized value `b / (resolution - 1)`;
    /// the final bucket lies past 1 and so repeats the last stop.
    pub fn new(stops: Vec<ColorStop>, resolution: usize) -> Result<Self, RampError> {
        if resolution < 2 {
            return Err(RampError::InvalidResolution(resolution));
        }
        validate_stops(&stops)?;

        let top = (resolution - 1) as f32;
        let lookup = (0..=resolution)
            .map(|b| color_between(&stops, b as f32, 0.0, top))
            .collect();

        Ok(Self { stops, lookup })
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Number of interpolation steps (the table holds one more entry).
    #[inline]
    pub fn resolution(&self) -> usize {
        self.lookup.len() - 1
    }

    /// Precomputed bucket colors.
    #[inline]
    pub fn table(&self) -> &[Rgba] {
        &self.lookup
    }

    /// Interpolated color for a magnitude within `[min, max]`.
    ///
    /// NaN maps to [`TRANSPARENT_WHITE`]; values past either end take that end's
    /// stop color; an empty range (`min == max`) yields the first stop.
    #[inline]
    pub fn color_for(&self, magnitude: f32, min: f32, max: f32) -> Rgba {
        color_between(&self.stops, magnitude, min, max)
    }

    /// Bucketed color from the lookup table, same edge rules as [`Self::color_for`].
    pub fn lookup(&self, magnitude: f32, min: f32, max: f32) -> Rgba {
        if magnitude.is_nan() {
            return TRANSPARENT_WHITE;
        }
        if max == min {
            return self.lookup[0];
        }
        let loc = ((magnitude - min) / (max - min)).clamp(0.0, 1.0);
        let top = self.resolution() - 1;
        let bucket = (loc * top as f32 + 0.5).floor() as usize;
        self.lookup[bucket.min(self.resolution())]
    }
}

fn color_between(stops: &[ColorStop], value: f32, min: f32, max: f32) -> Rgba {
    if value.is_nan() {
        return TRANSPARENT_WHITE;
    }
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if value > max {
        return last.rgba();
    }
    if value < min || max == min {
        return first.rgba();
    }

    let span = max - min;
    let loc = (value - min) / span;

    // A magnitude on a stop up to rounding takes that stop's exact color. The
    // rounding in `loc` grows with the range's offset relative to its width.
    let tolerance = 4.0 * f32::EPSILON * (1.0 + min.abs().max(max.abs()) / span);
    if let Some(stop) = stops
        .iter()
        .find(|stop| (loc - stop.position).abs() <= tolerance)
    {
        return stop.rgba();
    }

    // Last pair whose span contains loc, so a loc sitting on a stop starts that stop's span.
    let index = stops
        .windows(2)
        .rposition(|pair| loc >= pair[0].position && loc <= pair[1].position)
        .unwrap_or(0);
    let (lo, hi) = (stops[index], stops[index + 1]);
    let f = (loc - lo.position) / (hi.position - lo.position);

    [
        lo.color[0] * (1.0 - f) + hi.color[0] * f,
        lo.color[1] * (1.0 - f) + hi.color[1] * f,
        lo.color[2] * (1.0 - f) + hi.color[2] * f,
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::spectrum_stops;
    use proptest::prelude::*;

    fn test_ramp() -> ColorRamp {
        let stops = vec![
            ColorStop::from_hex("#000000", 0.0).unwrap(),
            ColorStop::from_hex("#ff0000", 0.25).unwrap(),
            ColorStop::from_hex("#00ff80", 0.5).unwrap(),
            ColorStop::from_hex("#ffffff", 1.0).unwrap(),
        ];
        ColorRamp::new(stops, 100).unwrap()
    }

    #[test]
    fn test_exact_at_stops() {
        let ramp = test_ramp();
        let spectrum = ColorRamp::new(spectrum_stops(), 100).unwrap();
        // Ranges whose stop magnitudes do not divide evenly in binary.
        let ranges = [(1.0, 3.0), (0.3, 7.1), (0.0, 0.7), (10.0, 11.3), (0.0, 1.0)];
        for ramp in [&ramp, &spectrum] {
            for (min, max) in ranges {
                for stop in ramp.stops() {
                    let magnitude = stop.position * (max - min) + min;
                    assert_eq!(
                        ramp.color_for(magnitude, min, max),
                        stop.rgba(),
                        "stop at {} over [{min}, {max}]",
                        stop.position
                    );
                }
            }
        }
    }

    #[test]
    fn test_interpolates_between_stops() {
        let ramp = test_ramp();
        // Halfway between #00ff80 at 0.5 and white at 1.0.
        let c = ramp.color_for(0.75, 0.0, 1.0);
        assert!((c[0] - 0.5).abs() < 1e-6);
        assert!((c[1] - 1.0).abs() < 1e-6);
        assert!((c[2] - (128.0 / 255.0 + 1.0) / 2.0).abs() < 1e-6);
        assert_eq!(c[3], 1.0);
    }

    #[test]
    fn test_edge_rules() {
        let ramp = test_ramp();
        assert_eq!(ramp.color_for(f32::NAN, 0.0, 1.0), TRANSPARENT_WHITE);
        assert_eq!(ramp.color_for(7.0, 0.0, 1.0), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(ramp.color_for(-7.0, 0.0, 1.0), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_range_guard() {
        let ramp = test_ramp();
        let c = ramp.color_for(5.0, 5.0, 5.0);
        assert_eq!(c, ramp.stops()[0].rgba());
        assert!(c.iter().all(|v| v.is_finite()));
        assert_eq!(ramp.lookup(5.0, 5.0, 5.0), ramp.stops()[0].rgba());
    }

    #[test]
    fn test_lookup_table() {
        let ramp = test_ramp();
        assert_eq!(ramp.resolution(), 100);
        assert_eq!(ramp.table().len(), 101);
        assert_eq!(ramp.table()[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ramp.table()[99], [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(ramp.table()[100], [1.0, 1.0, 1.0, 1.0]);

        assert_eq!(ramp.lookup(f32::NAN, 0.0, 1.0), TRANSPARENT_WHITE);
        assert_eq!(ramp.lookup(2.0, 0.0, 1.0), ramp.table()[99]);
        assert_eq!(ramp.lookup(-2.0, 0.0, 1.0), ramp.table()[0]);

        for b in [0usize, 10, 33, 50, 98] {
            let v = b as f32 / 99.0;
            let from_table = ramp.lookup(v, 0.0, 1.0);
            let direct = ramp.color_for(v, 0.0, 1.0);
            for ch in 0..4 {
                assert!((from_table[ch] - direct[ch]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_invalid_ramps() {
        assert!(matches!(
            ColorRamp::new(spectrum_stops(), 1),
            Err(RampError::InvalidResolution(1))
        ));
        let stops = vec![ColorStop::from_hex("#000000", 0.0).unwrap()];
        assert!(matches!(
            ColorRamp::new(stops, 100),
            Err(RampError::TooFewStops(1))
        ));
    }

    proptest! {
        #[test]
        fn prop_colors_in_unit_range(magnitude in -10.0f32..10.0, min in -5.0f32..0.0, span in 0.0f32..5.0) {
            let ramp = ColorRamp::new(spectrum_stops(), 100).unwrap();
            let c = ramp.color_for(magnitude, min, min + span);
            for ch in c {
                prop_assert!((0.0..=1.0).contains(&ch));
            }
            prop_assert_eq!(c[3], 1.0);
        }

        #[test]
        fn prop_exact_at_stops(min in -100.0f32..100.0, span in 0.1f32..100.0) {
            let ramp = ColorRamp::new(spectrum_stops(), 100).unwrap();
            let max = min + span;
            for stop in ramp.stops() {
                let magnitude = stop.position * (max - min) + min;
                prop_assert_eq!(ramp.color_for(magnitude, min, max), stop.rgba());
            }
        }
    }
}
