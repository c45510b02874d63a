//! Roll encoding and dice categorizers.
//!
//! A [`Roll`] is an unordered multiset of 0..=5 dice packed into a decimal
//! integer: digit `d` (ones place = face 1) holds the number of dice showing
//! face `d`. `[1, 1, 2, 3, 6]` encodes as `100_112`. Permutations of the same
//! dice share one key, and every valid key is at most `500_000`.

use std::fmt;

use crate::constants::{NUM_DICE, NUM_FACES};

/// 10^(face-1) for faces 1..=6, index 0 unused.
const FACE_PLACE: [u32; 7] = [0, 1, 10, 100, 1_000, 10_000, 100_000];

/// n! for n in 0..=5.
const FACTORIAL: [u32; 6] = [1, 1, 2, 6, 24, 120];

/// 6^n for n in 0..=5.
const POW6: [u32; 6] = [1, 6, 36, 216, 1_296, 7_776];

/// Multiset of dice, keyed by per-face counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Roll(u32);

impl Roll {
    /// No dice held.
    pub const EMPTY: Roll = Roll(0);

    /// Encode dice values (each in 1..=6) as a roll key.
    pub fn from_dice(dice: &[u32]) -> Roll {
        debug_assert!(dice.len() <= NUM_DICE as usize, "too many dice: {:?}", dice);
        let key = dice
            .iter()
            .map(|&face| {
                debug_assert!((1..=NUM_FACES).contains(&face), "bad face {}", face);
                FACE_PLACE[face as usize]
            })
            .sum();
        Roll(key)
    }

    /// Build a roll from per-face counts, `counts[0]` = number of ones.
    pub fn from_counts(counts: &[u32; 6]) -> Roll {
        Roll(
            counts
                .iter()
                .enumerate()
                .map(|(i, &n)| n * FACE_PLACE[i + 1])
                .sum(),
        )
    }

    /// Decode a raw key, rejecting keys that are not a multiset of at most five dice.
    pub fn from_key(key: u32) -> Option<Roll> {
        if key as usize >= crate::constants::MAX_ROLL {
            return None;
        }
        let roll = Roll(key);
        if roll.num_dice() <= NUM_DICE {
            Some(roll)
        } else {
            None
        }
    }

    /// The integer key.
    #[inline(always)]
    pub const fn key(self) -> u32 {
        self.0
    }

    /// Number of dice showing `face`.
    #[inline(always)]
    pub fn count_of(self, face: u32) -> u32 {
        (self.0 / FACE_PLACE[face as usize]) % 10
    }

    /// Per-face counts; index 0 is unused, `counts[f]` = count of face `f`.
    pub fn face_counts(self) -> [u32; 7] {
        let mut counts = [0u32; 7];
        let mut key = self.0;
        for face in 1..=NUM_FACES as usize {
            counts[face] = key % 10;
            key /= 10;
        }
        counts
    }

    /// Total number of dice.
    pub fn num_dice(self) -> u32 {
        let mut total = 0;
        let mut key = self.0;
        while key > 0 {
            total += key % 10;
            key /= 10;
        }
        total
    }

    /// This roll with one more die showing `face`.
    #[inline(always)]
    pub fn with_die(self, face: u32) -> Roll {
        Roll(self.0 + FACE_PLACE[face as usize])
    }

    /// Whether every die of `other` is also present in `self`.
    pub fn contains(self, other: Roll) -> bool {
        (1..=NUM_FACES).all(|f| self.count_of(f) >= other.count_of(f))
    }

    /// Dice of `self` not in `held`. `held` must be contained in `self`.
    #[inline(always)]
    pub fn without(self, held: Roll) -> Roll {
        debug_assert!(self.contains(held), "{} does not contain {}", self, held);
        Roll(self.0 - held.0)
    }

    /// Dice values in ascending order.
    pub fn dice(self) -> Vec<u32> {
        let counts = self.face_counts();
        (1..=NUM_FACES)
            .flat_map(|f| std::iter::repeat(f).take(counts[f as usize] as usize))
            .collect()
    }

    /// Some face appears at least `n` times.
    pub fn has_n_of_a_kind(self, n: u32) -> bool {
        let mut key = self.0;
        while key > 0 {
            if key % 10 >= n {
                return true;
            }
            key /= 10;
        }
        false
    }

    /// Every face present appears exactly two or three times.
    pub fn is_full_house(self) -> bool {
        let mut key = self.0;
        while key > 0 {
            let n = key % 10;
            if n != 0 && n != 2 && n != 3 {
                return false;
            }
            key /= 10;
        }
        true
    }

    /// At least `n` consecutive faces are present, scanning 1..=6.
    pub fn has_n_in_a_row(self, n: u32) -> bool {
        let mut run = 0;
        for face in 1..=NUM_FACES {
            if self.count_of(face) > 0 {
                run += 1;
                if run >= n {
                    return true;
                }
            } else {
                run = 0;
            }
        }
        false
    }

    pub fn is_yahtzee(self) -> bool {
        self.has_n_of_a_kind(5)
    }

    /// Sum of pips over all dice.
    pub fn sum_of_dice(self) -> u32 {
        let counts = self.face_counts();
        (1..=NUM_FACES).map(|f| f * counts[f as usize]).sum()
    }

    /// Probability of rolling exactly this multiset with `num_dice()` fair dice.
    ///
    /// multinomial(n; counts) / 6^n = n! / (c1! * ... * c6!) / 6^n
    pub fn probability(self) -> f64 {
        let counts = self.face_counts();
        let n = self.num_dice() as usize;
        let denom: u32 = counts[1..].iter().map(|&c| FACTORIAL[c as usize]).product();
        (FACTORIAL[n] / denom) as f64 / POW6[n] as f64
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dice())
    }
}
