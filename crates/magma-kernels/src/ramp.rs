//! Piecewise-linear heat-to-colour table.

use magma_core::{ConfigError, Rgb};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One entry of a [`ColorRamp`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RampStop {
    /// Heat value at which this colour applies exactly.
    pub threshold: f32,
    /// Colour at `threshold`.
    pub color: Rgb,
}

impl RampStop {
    /// Create a stop.
    pub const fn new(threshold: f32, color: Rgb) -> Self {
        Self { threshold, color }
    }
}

/// Ordered list of heat thresholds and colours.
///
/// Heat between two stops blends linearly; heat below the first stop
/// takes the first colour and heat above the last takes the last colour.
/// Stops are validated so that luminance never decreases with heat.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    stops: SmallVec<[RampStop; 8]>,
}

impl ColorRamp {
    /// Validate and build a ramp.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyRamp`] for no stops.
    /// - [`ConfigError::OutOfRange`] for a non-finite threshold or colour.
    /// - [`ConfigError::RampNotIncreasing`] if thresholds are not strictly
    ///   increasing.
    /// - [`ConfigError::RampNotMonotonic`] if a stop is darker than the
    ///   one before it.
    pub fn new(stops: &[RampStop]) -> Result<Self, ConfigError> {
        if stops.is_empty() {
            return Err(ConfigError::EmptyRamp);
        }
        for (index, stop) in stops.iter().enumerate() {
            if !stop.threshold.is_finite() {
                return Err(ConfigError::out_of_range(
                    "ramp.threshold",
                    stop.threshold.into(),
                    "finite",
                ));
            }
            if !stop.color.is_finite() {
                return Err(ConfigError::out_of_range(
                    "ramp.color",
                    f64::NAN,
                    "finite components",
                ));
            }
            if index == 0 {
                continue;
            }
            let previous = stops[index - 1];
            if stop.threshold <= previous.threshold {
                return Err(ConfigError::RampNotIncreasing {
                    index,
                    previous: previous.threshold,
                    threshold: stop.threshold,
                });
            }
            if stop.color.luminance() < previous.color.luminance() {
                return Err(ConfigError::RampNotMonotonic { index });
            }
        }
        Ok(Self {
            stops: SmallVec::from_slice(stops),
        })
    }

    /// The default molten table: black through deep red, orange and
    /// yellow to near-white.
    pub fn molten() -> Self {
        Self {
            stops: SmallVec::from_slice(&Self::MOLTEN),
        }
    }

    /// Stops of [`ColorRamp::molten`].
    pub const MOLTEN: [RampStop; 6] = [
        RampStop::new(0.0, Rgb::new(0.0, 0.0, 0.0)),
        RampStop::new(0.15, Rgb::new(0.25, 0.02, 0.0)),
        RampStop::new(0.4, Rgb::new(0.7, 0.08, 0.0)),
        RampStop::new(0.8, Rgb::new(1.0, 0.35, 0.0)),
        RampStop::new(1.5, Rgb::new(1.0, 0.75, 0.1)),
        RampStop::new(3.0, Rgb::new(1.0, 0.95, 0.7)),
    ];

    /// Colour for heat `h`.
    pub fn color_at(&self, h: f32) -> Rgb {
        let first = self.stops[0];
        if !(h > first.threshold) {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if h <= hi.threshold {
                let t = (h - lo.threshold) / (hi.threshold - lo.threshold);
                return lo.color.lerp(hi.color, t);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// Threshold of the last stop; heat above it clips to the last colour.
    pub fn max_threshold(&self) -> f32 {
        self.stops[self.stops.len() - 1].threshold
    }

    /// The validated stops, in threshold order.
    pub fn stops(&self) -> &[RampStop] {
        &self.stops
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::molten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grey(threshold: f32, level: f32) -> RampStop {
        RampStop::new(threshold, Rgb::new(level, level, level))
    }

    #[test]
    fn molten_table_is_valid() {
        assert_eq!(ColorRamp::new(&ColorRamp::MOLTEN).unwrap(), ColorRamp::molten());
        assert_eq!(ColorRamp::molten().max_threshold(), 3.0);
    }

    #[test]
    fn empty_ramp_rejected() {
        assert_eq!(ColorRamp::new(&[]).unwrap_err(), ConfigError::EmptyRamp);
    }

    #[test]
    fn equal_thresholds_rejected() {
        let err = ColorRamp::new(&[grey(0.0, 0.0), grey(0.5, 0.2), grey(0.5, 0.4)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RampNotIncreasing {
                index: 2,
                previous: 0.5,
                threshold: 0.5
            }
        );
    }

    #[test]
    fn darkening_stop_rejected() {
        let err = ColorRamp::new(&[grey(0.0, 0.5), grey(1.0, 0.2)]).unwrap_err();
        assert_eq!(err, ConfigError::RampNotMonotonic { index: 1 });
    }

    #[test]
    fn nan_threshold_rejected() {
        assert!(ColorRamp::new(&[grey(f32::NAN, 0.0)]).is_err());
    }

    #[test]
    fn clips_below_and_above() {
        let ramp = ColorRamp::new(&[grey(1.0, 0.2), grey(2.0, 0.8)]).unwrap();
        assert_eq!(ramp.color_at(0.0), Rgb::new(0.2, 0.2, 0.2));
        assert_eq!(ramp.color_at(5.0), Rgb::new(0.8, 0.8, 0.8));
    }

    #[test]
    fn interpolates_between_stops() {
        let ramp = ColorRamp::new(&[grey(0.0, 0.0), grey(2.0, 1.0)]).unwrap();
        let c = ramp.color_at(0.5);
        assert!((c.r - 0.25).abs() < 1e-6);
    }

    #[test]
    fn exact_stop_returns_stop_colour() {
        let ramp = ColorRamp::molten();
        let c = ramp.color_at(0.8);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 0.35).abs() < 1e-6);
    }

    #[test]
    fn single_stop_ramp_is_constant() {
        let ramp = ColorRamp::new(&[grey(0.5, 0.3)]).unwrap();
        assert_eq!(ramp.color_at(0.0), ramp.color_at(10.0));
    }

    proptest! {
        #[test]
        fn molten_luminance_non_decreasing(a in 0.0f32..4.0, b in 0.0f32..4.0) {
            let ramp = ColorRamp::molten();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                ramp.color_at(lo).luminance() <= ramp.color_at(hi).luminance() + 1e-5
            );
        }

        #[test]
        fn output_stays_within_stop_bounds(h in -1.0f32..10.0) {
            let c = ColorRamp::molten().color_at(h);
            prop_assert!(c.is_finite());
            prop_assert!((0.0..=1.0).contains(&c.r));
            prop_assert!((0.0..=1.0).contains(&c.g));
            prop_assert!((0.0..=1.0).contains(&c.b));
        }
    }

    fn colour() -> impl Strategy<Value = Rgb> {
        (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(r, g, b)| Rgb::new(r, g, b))
    }

    fn any_stops() -> impl Strategy<Value = Vec<RampStop>> {
        prop::collection::vec(
            (-2.0f32..5.0, colour()).prop_map(|(t, c)| RampStop::new(t, c)),
            1..8,
        )
    }

    /// Stops with increasing thresholds and colours sorted by luminance.
    fn valid_stops() -> impl Strategy<Value = Vec<RampStop>> {
        prop::collection::vec((0.01f32..1.0, colour()), 1..8).prop_map(|mut entries| {
            entries.sort_by(|a, b| a.1.luminance().total_cmp(&b.1.luminance()));
            let mut threshold = -0.5;
            entries
                .into_iter()
                .map(|(step, c)| {
                    threshold += step;
                    RampStop::new(threshold, c)
                })
                .collect()
        })
    }

    /// First violation in table order, checked the same way for every
    /// stop pair.
    fn first_violation(stops: &[RampStop]) -> Option<ConfigError> {
        stops.windows(2).enumerate().find_map(|(i, pair)| {
            let index = i + 1;
            if pair[1].threshold <= pair[0].threshold {
                Some(ConfigError::RampNotIncreasing {
                    index,
                    previous: pair[0].threshold,
                    threshold: pair[1].threshold,
                })
            } else if pair[1].color.luminance() < pair[0].color.luminance() {
                Some(ConfigError::RampNotMonotonic { index })
            } else {
                None
            }
        })
    }

    proptest! {
        #[test]
        fn arbitrary_ramps_accepted_only_when_ordered(
            stops in any_stops(),
            a in -3.0f32..6.0,
            b in -3.0f32..6.0,
        ) {
            match (ColorRamp::new(&stops), first_violation(&stops)) {
                (Ok(ramp), None) => {
                    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                    prop_assert!(
                        ramp.color_at(lo).luminance() <= ramp.color_at(hi).luminance() + 1e-5
                    );
                }
                (Err(err), Some(expected)) => prop_assert_eq!(err, expected),
                (got, expected) => {
                    prop_assert!(false, "got {:?}, expected violation {:?}", got, expected);
                }
            }
        }

        #[test]
        fn ordered_ramps_are_accepted_and_monotone(
            stops in valid_stops(),
            a in -1.0f32..8.0,
            b in -1.0f32..8.0,
        ) {
            let ramp = ColorRamp::new(&stops);
            prop_assert!(ramp.is_ok(), "rejected {:?}: {:?}", stops, ramp);
            let ramp = ramp.unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                ramp.color_at(lo).luminance() <= ramp.color_at(hi).luminance() + 1e-5
            );
        }
    }
}
