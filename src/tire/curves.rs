// ==============================================================================
// curves.rs: TUNING CURVES OVER NORMALIZED SPEED
// ------------------------------------------------------------------------------
// Both curves take n in [0, 1]:
// - TorqueCurve: n = |car speed| / top speed, returns the fraction of engine
//   strength still available.
// - GripBlend: n = |lateral speed| / grip threshold, returns the blend
//   parameter between slow grip (0) and fast grip (1).
//
// Table variants are piecewise-linear over [n, value] pairs and hold their end
// values outside the covered range. Table values lie in [0, 1] and blend
// tables never decrease. Custom variants are code-only and clamped to [0, 1].
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::tire::types::clamp01;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TorqueCurve {
    /// `1 - n`
    #[default]
    Linear,
    /// `clamp01((sqrt(n) + 0.5) * (1 - n^2))`, peaks around n = 0.4.
    Tapered,
    /// `clamp01(bias - n)`, full strength until `n > bias - 1`.
    Offset { bias: f32 },
    Table { points: Vec<[f32; 2]> },
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

impl TorqueCurve {
    pub fn eval(&self, normalized_speed: f32) -> f32 {
        let n = clamp01(normalized_speed);
        match self {
            TorqueCurve::Linear => 1.0 - n,
            TorqueCurve::Tapered => clamp01((n.sqrt() + 0.5) * (1.0 - n * n)),
            TorqueCurve::Offset { bias } => clamp01(bias - n),
            TorqueCurve::Table { points } => clamp01(table_lookup(points, n)),
            TorqueCurve::Custom(f) => clamp01(f(n)),
        }
    }

    pub(crate) fn check(&self) -> Result<(), &'static str> {
        match self {
            TorqueCurve::Offset { bias } if !bias.is_finite() => Err("bias must be finite"),
            TorqueCurve::Table { points } => check_table(points).and_then(|_| check_unit_values(points)),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GripBlend {
    /// `t = n`
    #[default]
    Linear,
    /// `t = n^2 (3 - 2n)`
    Smoothstep,
    Table { points: Vec<[f32; 2]> },
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

impl GripBlend {
    pub fn eval(&self, normalized_speed: f32) -> f32 {
        let n = clamp01(normalized_speed);
        match self {
            GripBlend::Linear => n,
            GripBlend::Smoothstep => n * n * (3.0 - 2.0 * n),
            GripBlend::Table { points } => clamp01(table_lookup(points, n)),
            GripBlend::Custom(f) => clamp01(f(n)),
        }
    }

    pub(crate) fn check(&self) -> Result<(), &'static str> {
        match self {
            GripBlend::Table { points } => {
                check_table(points)?;
                check_unit_values(points)?;
                // grip may only move from slow toward fast as the slide grows
                if points.windows(2).any(|w| w[1][1] < w[0][1]) {
                    return Err("blend values must not decrease");
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn table_lookup(points: &[[f32; 2]], n: f32) -> f32 {
    let Some(&[x0, y0]) = points.first() else {
        return 0.0;
    };
    if n <= x0 {
        return y0;
    }

    for pair in points.windows(2) {
        let ([xa, ya], [xb, yb]) = (pair[0], pair[1]);
        if n <= xb {
            let t = (n - xa) / (xb - xa);
            return ya + (yb - ya) * t;
        }
    }

    points[points.len() - 1][1]
}

fn check_table(points: &[[f32; 2]]) -> Result<(), &'static str> {
    if points.len() < 2 {
        return Err("needs at least two points");
    }
    if points.iter().flatten().any(|v| !v.is_finite()) {
        return Err("points must be finite");
    }
    if points.iter().any(|[x, _]| !(0.0..=1.0).contains(x)) {
        return Err("speeds must lie in [0, 1]");
    }
    if points.windows(2).any(|w| w[1][0] <= w[0][0]) {
        return Err("speeds must be strictly increasing");
    }
    Ok(())
}

fn check_unit_values(points: &[[f32; 2]]) -> Result<(), &'static str> {
    if points.iter().any(|[_, y]| !(0.0..=1.0).contains(y)) {
        return Err("values must lie in [0, 1]");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tapered_curve_is_half_strength_at_standstill_and_zero_at_top_speed() {
        assert_relative_eq!(TorqueCurve::Tapered.eval(0.0), 0.5);
        assert_relative_eq!(TorqueCurve::Tapered.eval(1.0), 0.0);
        assert!(TorqueCurve::Tapered.eval(0.4) > TorqueCurve::Tapered.eval(0.0));
    }

    #[test]
    fn offset_curve_holds_full_strength_at_low_speed() {
        let curve = TorqueCurve::Offset { bias: 1.25 };
        assert_relative_eq!(curve.eval(0.1), 1.0);
        assert_relative_eq!(curve.eval(1.0), 0.25);
    }

    #[test]
    fn table_interpolates_and_holds_ends() {
        let curve = TorqueCurve::Table {
            points: vec![[0.2, 1.0], [0.6, 0.5], [1.0, 0.0]],
        };
        assert_relative_eq!(curve.eval(0.0), 1.0);
        assert_relative_eq!(curve.eval(0.4), 0.75);
        assert_relative_eq!(curve.eval(0.8), 0.25);
        assert_relative_eq!(curve.eval(2.0), 0.0);
    }

    #[test]
    fn table_validation_rejects_unsorted_speeds() {
        let curve = GripBlend::Table {
            points: vec![[0.5, 0.0], [0.5, 1.0]],
        };
        assert!(curve.check().is_err());
        assert!(GripBlend::Table { points: vec![[0.0, 0.0]] }.check().is_err());
    }

    #[test]
    fn blend_table_that_falls_back_is_refused() {
        let curve = GripBlend::Table {
            points: vec![[0.0, 0.0], [0.5, 1.0], [1.0, 0.0]],
        };
        assert!(curve.check().is_err());

        let rising = GripBlend::Table {
            points: vec![[0.0, 0.0], [0.5, 0.2], [1.0, 1.0]],
        };
        assert!(rising.check().is_ok());
    }

    #[test]
    fn table_values_outside_unit_range_are_refused() {
        let blend = GripBlend::Table {
            points: vec![[0.0, 0.0], [1.0, 1.5]],
        };
        assert!(blend.check().is_err());

        let torque = TorqueCurve::Table {
            points: vec![[0.0, 2.0], [1.0, 0.0]],
        };
        assert!(torque.check().is_err());
    }

    #[test]
    fn custom_torque_never_exceeds_full_strength() {
        let curve = TorqueCurve::Custom(|n| 4.0 - n);
        assert_relative_eq!(curve.eval(0.5), 1.0);
        assert_relative_eq!(TorqueCurve::Custom(|_| -1.0).eval(0.5), 0.0);
    }

    #[test]
    fn custom_blend_is_clamped() {
        let blend = GripBlend::Custom(|n| n * 3.0);
        assert_relative_eq!(blend.eval(0.5), 1.0);
    }

    #[test]
    fn smoothstep_is_monotonic() {
        let mut last = 0.0;
        for i in 0..=20 {
            let t = GripBlend::Smoothstep.eval(i as f32 / 20.0);
            assert!(t >= last);
            last = t;
        }
    }
}
