/// Normalized easing curves, evaluated on `t` clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingCurve {
    Linear,
    /// Smoothstep ease-in-out, the default shape for door fades.
    EaseInOut,
    /// Always the given value; handy for pinning a parameter in tests.
    Constant(f32),
}

impl EasingCurve {
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => t,
            EasingCurve::EaseInOut => t * t * (3.0 - 2.0 * t),
            EasingCurve::Constant(value) => value.clamp(0.0, 1.0),
        }
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        EasingCurve::EaseInOut
    }
}
