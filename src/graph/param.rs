use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

/// Static description of a node parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl ParamSpec {
    pub const fn new(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self { name, default, min, max }
    }
}

/// A knob: written from the control path, read once per block by the node.
#[derive(Debug)]
pub struct Param {
    spec: &'static ParamSpec,
    value: AtomicF32,
}

impl Param {
    pub fn new(spec: &'static ParamSpec) -> Self {
        Self {
            spec,
            value: AtomicF32::new(spec.default),
        }
    }

    pub fn spec(&self) -> &'static ParamSpec {
        self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Store `value` clamped into range. Non-finite values are ignored and
    /// return `false`.
    pub fn set(&self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.value
            .store(value.clamp(self.spec.min, self.spec.max), Ordering::Relaxed);
        true
    }

    pub fn reset(&self) {
        self.value.store(self.spec.default, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GAIN: ParamSpec = ParamSpec::new("gain", 0.5, 0.0, 2.0);

    #[test]
    fn starts_at_default_and_clamps() {
        let param = Param::new(&GAIN);
        assert_eq!(param.get(), 0.5);

        assert!(param.set(5.0));
        assert_eq!(param.get(), 2.0);

        assert!(param.set(-1.0));
        assert_eq!(param.get(), 0.0);
    }

    #[test]
    fn rejects_non_finite() {
        let param = Param::new(&GAIN);
        assert!(!param.set(f32::NAN));
        assert!(!param.set(f32::INFINITY));
        assert_eq!(param.get(), 0.5);
    }
}
