use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniform randomness for every gameplay decision.
///
/// `GameState` owns one boxed source for the whole session so tests can
/// swap in a scripted sequence.
pub trait RandomSource: std::fmt::Debug {
    /// Uniform value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f32;
        (min + (self.next_f32() * span).floor() as i32).min(max)
    }

    fn bool(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }
}

#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl RandomSource for Rng {
    fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }
}

pub fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_sequence() {
        let mut a = Rng::new(77);
        let mut b = Rng::new(77);
        for _ in 0..64 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn int_stays_inside_inclusive_range() {
        let mut rng = Rng::new(3);
        let mut seen = [false; 4];
        for _ in 0..1_000 {
            let value = rng.int(0, 3);
            assert!((0..=3).contains(&value));
            seen[value as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn pick_index_handles_tiny_lengths() {
        let mut rng = Rng::new(9);
        assert_eq!(rng.pick_index(0), 0);
        assert_eq!(rng.pick_index(1), 0);
        for _ in 0..200 {
            assert!(rng.pick_index(5) < 5);
        }
    }
}
