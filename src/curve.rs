//! Response curves used to reshape noise and mask values.
//!
//! The generator only needs a unary `f32 -> f32` mapping, so any closure works. [`Curve`]
//! is the serializable keyframe form loaded from terrain files.

use serde::{Deserialize, Serialize};

/// A caller-supplied mapping applied pointwise during height synthesis.
pub trait ResponseCurve: Send + Sync {
    fn evaluate(&self, t: f32) -> f32;
}

impl<F> ResponseCurve for F
where
    F: Fn(f32) -> f32 + Send + Sync,
{
    fn evaluate(&self, t: f32) -> f32 {
        self(t)
    }
}

#[derive(Deserialize)]
struct RawCurve {
    keys: Vec<(f32, f32)>,
}

impl From<RawCurve> for Curve {
    fn from(raw: RawCurve) -> Self {
        Curve::from_keys(raw.keys)
    }
}

/// Piecewise-linear curve through `(time, value)` keyframes.
///
/// Inputs outside the key range clamp to the first/last value. An empty curve is 0 everywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCurve")]
pub struct Curve {
    keys: Vec<(f32, f32)>,
}

impl Curve {
    /// Build from keyframes in any order. Keys with non-finite times are dropped.
    pub fn from_keys(keys: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut keys: Vec<(f32, f32)> = keys.into_iter().filter(|(t, _)| t.is_finite()).collect();
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// `f(t) = t` over [-1, 1], the natural domain of the height curve.
    pub fn identity() -> Self {
        Self::from_keys([(-1.0, -1.0), (1.0, 1.0)])
    }

    /// `f(t) = t` over [0, 1], the natural domain of the influence curve.
    pub fn unit_ramp() -> Self {
        Self::from_keys([(0.0, 0.0), (1.0, 1.0)])
    }

    pub fn constant(value: f32) -> Self {
        Self::from_keys([(0.0, value)])
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        let i = self.keys.partition_point(|k| k.0 <= t);
        if i == 0 || i >= self.keys.len() {
            // Only reachable for NaN input
            return first.1;
        }
        let (t0, v0) = self.keys[i - 1];
        let (t1, v1) = self.keys[i];
        let dt = t1 - t0;
        if dt <= 0.0 {
            return v1;
        }
        v0 + (v1 - v0) * ((t - t0) / dt)
    }
}

impl ResponseCurve for Curve {
    fn evaluate(&self, t: f32) -> f32 {
        Curve::evaluate(self, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_curve() {
        let curve = Curve::identity();
        for &t in &[-1.0, -0.5, 0.0, 0.3, 1.0] {
            assert!((curve.evaluate(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clamps_outside_keys() {
        let curve = Curve::from_keys([(1.0, 4.0), (0.0, 2.0)]);
        assert_eq!(curve.evaluate(-5.0), 2.0);
        assert_eq!(curve.evaluate(5.0), 4.0);
        assert_eq!(curve.evaluate(0.5), 3.0);
    }

    #[test]
    fn test_degenerate_curves() {
        assert_eq!(Curve::from_keys(Vec::<(f32, f32)>::new()).evaluate(0.7), 0.0);
        assert_eq!(Curve::constant(3.0).evaluate(-100.0), 3.0);
        assert_eq!(Curve::identity().evaluate(f32::NAN), -1.0);
    }

    #[test]
    fn test_closures_are_curves() {
        fn apply(curve: &dyn ResponseCurve, t: f32) -> f32 {
            curve.evaluate(t)
        }
        assert_eq!(apply(&|t: f32| t * 2.0, 1.5), 3.0);
        assert_eq!(apply(&Curve::unit_ramp(), 0.25), 0.25);
    }

    #[test]
    fn test_deserialize_sorts_keys() {
        let curve: Curve = serde_json::from_str(r#"{ "keys": [[1.0, 1.0], [0.0, 0.0]] }"#)
            .expect("valid curve");
        assert_eq!(curve.keys()[0], (0.0, 0.0));
        assert_eq!(curve.evaluate(0.5), 0.5);
    }
}
