use rand::Rng;

use crate::usecase::contracts::RandomSource;

/// Draws from the calling thread's generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Maps a draw in `[0, 1)` onto an index below `len`.
pub fn index_from_draw(draw: f64, len: usize) -> usize {
    let index = (draw * len as f64).floor() as usize;
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_in_unit_interval() {
        let random = ThreadRandom;
        for _ in 0..1000 {
            let draw = random.next_f64();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn test_index_from_draw() {
        assert_eq!(index_from_draw(0.0, 4), 0);
        assert_eq!(index_from_draw(0.49, 4), 1);
        assert_eq!(index_from_draw(0.99, 4), 3);
        assert_eq!(index_from_draw(1.0, 4), 3);
        assert_eq!(index_from_draw(0.5, 1), 0);
    }
}
