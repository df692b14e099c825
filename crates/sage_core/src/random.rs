//! crates/sage_core/src/random.rs
//!
//! Randomness used by a play session: the deck shuffle and game codes.

use crate::domain::{GameId, GAME_ID_DIGITS};
use crate::error::PlayError;
use rand::Rng;

/// Backward Fisher-Yates pass: every permutation is equally likely.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Returns a decimal string of exactly `digits` digits, without a leading zero.
pub fn random_digits<R: Rng + ?Sized>(rng: &mut R, digits: u32) -> Result<String, PlayError> {
    if !(1..=19).contains(&digits) {
        return Err(PlayError::InvalidDigitCount(digits));
    }
    let low = 10u64.pow(digits - 1);
    // 10^19 still fits in a u64.
    let high = 10u64.pow(digits) - 1;
    Ok(rng.random_range(low..=high).to_string())
}

impl GameId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, PlayError> {
        let code = random_digits(rng, GAME_ID_DIGITS)?;
        GameId::parse(&code).ok_or(PlayError::InvalidDigitCount(GAME_ID_DIGITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn shuffle_keeps_every_element() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle_in_place(&mut rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_of_empty_and_single_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle_in_place(&mut rng, &mut empty);
        assert!(empty.is_empty());

        let mut single = vec!['x'];
        shuffle_in_place(&mut rng, &mut single);
        assert_eq!(single, vec!['x']);
    }

    #[test]
    fn shuffle_is_roughly_uniform_over_permutations() {
        let mut rng = StdRng::seed_from_u64(42);
        let runs = 60_000;
        let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
        for _ in 0..runs {
            let mut items = vec![0u8, 1, 2];
            shuffle_in_place(&mut rng, &mut items);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        let expected = runs as f64 / 6.0;
        for (perm, count) in counts {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "{:?} seen {} times", perm, count);
        }
    }

    #[test]
    fn six_digit_codes_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..5_000 {
            let code = random_digits(&mut rng, 6).unwrap();
            assert_eq!(code.len(), 6);
            let value: u64 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn digit_count_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(random_digits(&mut rng, 1).unwrap().len(), 1);
        assert_eq!(random_digits(&mut rng, 19).unwrap().len(), 19);
        assert!(matches!(
            random_digits(&mut rng, 0),
            Err(PlayError::InvalidDigitCount(0))
        ));
        assert!(matches!(
            random_digits(&mut rng, 20),
            Err(PlayError::InvalidDigitCount(20))
        ));
    }

    #[test]
    fn generated_game_ids_are_six_digits() {
        let mut rng = StdRng::seed_from_u64(11);
        let id = GameId::generate(&mut rng).unwrap();
        assert_eq!(id.as_str().len(), 6);
        assert!(!id.as_str().starts_with('0'));
    }
}
