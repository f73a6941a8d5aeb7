/// Easing curves applied to local animation progress.
///
/// The generator contract names more curves than it defines: `linear`,
/// `easeInOut`, `bounce`, `elastic` and friends all resolve to the same
/// smooth-step cubic, and only `easeIn`/`easeOut` have their own shape.
/// That collapse is part of the observable contract, so unknown names map
/// to [`Easing::SmoothStep`] rather than erroring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    EaseIn,
    EaseOut,
    #[default]
    SmoothStep,
}

impl Easing {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("easeIn") => Easing::EaseIn,
            Some("easeOut") => Easing::EaseOut,
            _ => Easing::SmoothStep,
        }
    }

    /// Maps progress `t` (clamped to [0, 1]) through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::SmoothStep => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 3] = [Easing::EaseIn, Easing::EaseOut, Easing::SmoothStep];

    #[test]
    fn endpoints_are_exact() {
        for ease in ALL {
            assert_eq!(ease.apply(0.0), 0.0, "{ease:?} at 0");
            assert_eq!(ease.apply(1.0), 1.0, "{ease:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        for ease in ALL {
            assert_eq!(ease.apply(-2.5), 0.0);
            assert_eq!(ease.apply(7.0), 1.0);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for ease in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = ease.apply(i as f64 / 100.0);
                assert!(v >= prev - 1e-12, "{ease:?} dipped at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn smooth_step_midpoint_is_half() {
        assert_eq!(Easing::SmoothStep.apply(0.5), 0.5);
    }

    #[test]
    fn unnamed_curves_collapse_to_smooth_step() {
        for name in ["linear", "easeInOut", "bounce", "elastic", "back", "nope"] {
            assert_eq!(Easing::from_name(Some(name)), Easing::SmoothStep);
        }
        assert_eq!(Easing::from_name(None), Easing::SmoothStep);
        assert_eq!(Easing::from_name(Some("easeIn")), Easing::EaseIn);
        assert_eq!(Easing::from_name(Some("easeOut")), Easing::EaseOut);
    }
}
