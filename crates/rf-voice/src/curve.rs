//! Fade Curve Types
//!
//! Progress-to-gain mappings used while a channel fades in or out.
//! Every curve rises from 0.0 at progress 0 to 1.0 at progress 1;
//! fade-outs use the inverted value.

use serde::{Deserialize, Serialize};
use std::f32::consts::{E, FRAC_PI_2};

/// Preset fade curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FadeCurve {
    /// Linear interpolation (constant rate)
    #[default]
    Linear = 0,
    /// Logarithmic curve (fast start, slow end) - 3dB
    Log3 = 1,
    /// Quarter sine
    Sine = 2,
    /// Logarithmic curve (fast start, slow end) - 1dB
    Log1 = 3,
    /// Inverse S-curve (fast start/end, slow middle)
    InvSCurve = 4,
    /// S-curve (slow start/end, fast middle)
    SCurve = 5,
    /// Exponential curve (slow start, fast end) - 1dB
    Exp1 = 6,
    /// Exponential curve (slow start, fast end) - 3dB
    Exp3 = 7,
}

impl FadeCurve {
    /// All presets, in index order
    pub const ALL: [FadeCurve; 8] = [
        FadeCurve::Linear,
        FadeCurve::Log3,
        FadeCurve::Sine,
        FadeCurve::Log1,
        FadeCurve::InvSCurve,
        FadeCurve::SCurve,
        FadeCurve::Exp1,
        FadeCurve::Exp3,
    ];

    /// Convert from u8 index (unknown indices fall back to `Linear`)
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(FadeCurve::Linear)
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::Log3 => "Log3",
            FadeCurve::Sine => "Sine",
            FadeCurve::Log1 => "Log1",
            FadeCurve::InvSCurve => "InvSCurve",
            FadeCurve::SCurve => "SCurve",
            FadeCurve::Exp1 => "Exp1",
            FadeCurve::Exp3 => "Exp3",
        }
    }

    /// Evaluate curve at position t (0.0 - 1.0)
    ///
    /// Returns value in range 0.0 - 1.0
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,

            // y = ln(1 + t*3) / ln(4)
            FadeCurve::Log3 => (1.0 + t * 3.0).ln() / 4.0_f32.ln(),

            // y = sin(t * π/2)
            FadeCurve::Sine => (t * FRAC_PI_2).sin(),

            // y = ln(1 + t) / ln(2)
            FadeCurve::Log1 => (1.0 + t).ln() / 2.0_f32.ln(),

            FadeCurve::InvSCurve => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }

            // Cubic
            FadeCurve::SCurve => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            // y = (e^t - 1) / (e - 1)
            FadeCurve::Exp1 => (E.powf(t) - 1.0) / (E - 1.0),

            // y = (e^(t*3) - 1) / (e^3 - 1)
            FadeCurve::Exp3 => (E.powf(t * 3.0) - 1.0) / (E.powi(3) - 1.0),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEYFRAME CURVE
// ═══════════════════════════════════════════════════════════════════════════════

/// One point of a [`KeyframeCurve`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Progress (0.0 - 1.0)
    pub time: f32,
    /// Curve value at `time`
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Hand-authored curve, piecewise linear between keyframes
///
/// Keys are kept sorted by time. Before the first key the first value
/// holds, after the last key the last value holds. An empty curve
/// evaluates as linear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl KeyframeCurve {
    pub fn new(keys: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut keys: Vec<Keyframe> = keys
            .into_iter()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight ramp from (0,0) to (1,1)
    pub fn linear() -> Self {
        Self::new([Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; exists because t < last.time
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value + (b.value - a.value) * ((t - a.time) / span)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FADE SHAPE
// ═══════════════════════════════════════════════════════════════════════════════

/// Fade evaluator attached to an asset (one for fade-in, one for fade-out)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FadeShape {
    Preset(FadeCurve),
    Keyframes(KeyframeCurve),
}

impl Default for FadeShape {
    fn default() -> Self {
        FadeShape::Preset(FadeCurve::Linear)
    }
}

impl From<FadeCurve> for FadeShape {
    fn from(curve: FadeCurve) -> Self {
        FadeShape::Preset(curve)
    }
}

impl From<KeyframeCurve> for FadeShape {
    fn from(curve: KeyframeCurve) -> Self {
        FadeShape::Keyframes(curve)
    }
}

impl FadeShape {
    /// Rising value at progress t, clamped to 0.0 - 1.0
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let value = match self {
            FadeShape::Preset(curve) => curve.evaluate(t),
            FadeShape::Keyframes(curve) => curve.evaluate(t),
        };
        value.clamp(0.0, 1.0)
    }

    /// Gain multiplier while fading in
    #[inline]
    pub fn fade_in(&self, t: f32) -> f32 {
        self.evaluate(t)
    }

    /// Gain multiplier while fading out (1.0 → 0.0)
    #[inline]
    pub fn fade_out(&self, t: f32) -> f32 {
        1.0 - self.evaluate(t)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_boundaries() {
        for curve in FadeCurve::ALL {
            assert!((curve.evaluate(0.0) - 0.0).abs() < 0.001, "{:?} at 0.0", curve);
            assert!((curve.evaluate(1.0) - 1.0).abs() < 0.001, "{:?} at 1.0", curve);

            let mid = curve.evaluate(0.5);
            assert!(mid > 0.0 && mid < 1.0, "{:?} at 0.5 = {}", curve, mid);
        }
    }

    #[test]
    fn test_curve_monotonic() {
        for curve in FadeCurve::ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let t = i as f32 / 100.0;
                let val = curve.evaluate(t);
                assert!(val >= prev - 0.0001, "{:?}: {} < {} at t={}", curve, val, prev, t);
                prev = val;
            }
        }
    }

    #[test]
    fn test_out_of_range_progress_is_clamped() {
        assert_eq!(FadeCurve::Linear.evaluate(-1.0), 0.0);
        assert_eq!(FadeCurve::Linear.evaluate(3.0), 1.0);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(FadeCurve::from_index(0), FadeCurve::Linear);
        assert_eq!(FadeCurve::from_index(5), FadeCurve::SCurve);
        assert_eq!(FadeCurve::from_index(255), FadeCurve::Linear);
    }

    #[test]
    fn test_keyframe_interpolation() {
        let curve = KeyframeCurve::new([
            Keyframe::new(1.0, 1.0),
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 0.8),
        ]);

        // Sorted on construction
        assert_eq!(curve.keys()[1].time, 0.5);

        assert!((curve.evaluate(0.25) - 0.4).abs() < 0.001);
        assert!((curve.evaluate(0.5) - 0.8).abs() < 0.001);
        assert!((curve.evaluate(0.75) - 0.9).abs() < 0.001);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_keyframe_holds_outside_keys() {
        let curve = KeyframeCurve::new([Keyframe::new(0.2, 0.1), Keyframe::new(0.6, 0.7)]);
        assert_eq!(curve.evaluate(0.0), 0.1);
        assert_eq!(curve.evaluate(0.9), 0.7);
    }

    #[test]
    fn test_empty_keyframe_curve_is_linear() {
        let curve = KeyframeCurve::default();
        assert!((curve.evaluate(0.3) - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_shape_clamps_overshoot() {
        let shape = FadeShape::from(KeyframeCurve::new([
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 1.5),
            Keyframe::new(1.0, 1.0),
        ]));
        assert_eq!(shape.fade_in(0.5), 1.0);
        assert_eq!(shape.fade_out(0.5), 0.0);
    }

    #[test]
    fn test_fade_out_inverts() {
        let shape = FadeShape::default();
        assert!((shape.fade_out(0.0) - 1.0).abs() < 0.001);
        assert!((shape.fade_out(0.25) - 0.75).abs() < 0.001);
        assert!(shape.fade_out(1.0).abs() < 0.001);
    }
}
