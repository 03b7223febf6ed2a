use rand::Rng;

/// Source of offsets for random joke selection.
pub trait OffsetPicker: Send + Sync + 'static {
    /// Returns an offset in `[0, upper)`. `upper` is always positive.
    fn pick(&self, upper: u64) -> u64;
}

/// Uniform picker backed by the thread-local RNG. Not cryptographically strong.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngPicker;

impl OffsetPicker for ThreadRngPicker {
    fn pick(&self, upper: u64) -> u64 {
        rand::rng().random_range(0..upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_within_bounds() {
        let picker = ThreadRngPicker;
        for upper in 1..50 {
            assert!(picker.pick(upper) < upper);
        }
        assert_eq!(picker.pick(1), 0);
    }
}
