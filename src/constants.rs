//! Game constants and key-space sizes.
//!
//! - 13 categories: six upper (Ones..Sixes) and seven lower (Three of a Kind..Yahtzee)
//! - Roll keys: decimal digit `d` (ones place = face 1) holds the count of face `d`
//! - Game-state keys: bits 0..12 filled categories, bit 13 bonus eligibility,
//!   `100_000 * upper_total` in the high-order field
//!
//! These are fixed rules, not runtime parameters.

/// Number of dice in a full roll.
pub const NUM_DICE: u32 = 5;

/// Number of faces per die.
pub const NUM_FACES: u32 = 6;

/// Number of scoring categories.
pub const CATEGORY_COUNT: usize = 13;

/// Number of upper-section categories (one per face).
pub const UPPER_CATEGORY_COUNT: usize = 6;

/// Largest valid roll key (five sixes) plus one.
pub const MAX_ROLL: usize = 500_000 + 1;

/// Distinct multisets of 0..=5 dice: 1+6+21+56+126+252 = 462.
pub const NUM_ROLLS: usize = 462;

/// Distinct completed (5-die) rolls: C(10,5) = 252.
pub const NUM_COMPLETED_ROLLS: usize = 252;

/// Non-zero entries of the hold → completion table: Σ over completed rolls
/// of Π(count_f + 1), the number of holds each roll offers.
pub const KEEP_TABLE_NNZ: usize = 4368;

/// Game-state keys are strictly below this bound.
pub const MAX_GAME_STATE: usize = 6_400_000;

/// Low 13 bits: one per category.
pub const CATEGORIES_MASK: u32 = (1 << CATEGORY_COUNT) - 1;

/// Mask of the six upper-section category bits.
pub const UPPER_CATEGORIES_MASK: u32 = (1 << UPPER_CATEGORY_COUNT) - 1;

/// Bit set once a five-of-a-kind has been scored for points.
pub const BONUS_BIT: u32 = 13;

/// Multiplier of the upper-section total in the game-state key.
pub const UPPER_TOTAL_MULTIPLIER: u32 = 100_000;

/// Upper-section total at which the upper bonus is awarded; totals are capped here.
pub const UPPER_BONUS_THRESHOLD: u32 = 63;

/// Upper-section bonus.
pub const UPPER_BONUS: i32 = 35;

/// Bonus for each five-of-a-kind after the first one scored for points.
pub const YAHTZEE_BONUS: i32 = 100;

pub const FULL_HOUSE_SCORE: i32 = 25;
pub const SMALL_STRAIGHT_SCORE: i32 = 30;
pub const LARGE_STRAIGHT_SCORE: i32 = 40;
pub const YAHTZEE_SCORE: i32 = 50;

/// Category indices, used as bit positions in the game-state key.
pub const CATEGORY_ONES: usize = 0;
pub const CATEGORY_TWOS: usize = 1;
pub const CATEGORY_THREES: usize = 2;
pub const CATEGORY_FOURS: usize = 3;
pub const CATEGORY_FIVES: usize = 4;
pub const CATEGORY_SIXES: usize = 5;
pub const CATEGORY_THREE_OF_A_KIND: usize = 6;
pub const CATEGORY_FOUR_OF_A_KIND: usize = 7;
pub const CATEGORY_FULL_HOUSE: usize = 8;
pub const CATEGORY_SMALL_STRAIGHT: usize = 9;
pub const CATEGORY_LARGE_STRAIGHT: usize = 10;
pub const CATEGORY_CHANCE: usize = 11;
pub const CATEGORY_YAHTZEE: usize = 12;

/// Human-readable category names.
pub const CATEGORY_NAMES: [&str; CATEGORY_COUNT] = [
    "Ones",
    "Twos",
    "Threes",
    "Fours",
    "Fives",
    "Sixes",
    "Three of a Kind",
    "Four of a Kind",
    "Full House",
    "Small Straight",
    "Large Straight",
    "Chance",
    "Yahtzee",
];

/// Whether `category` belongs to the upper section.
#[inline(always)]
pub fn is_upper_category(category: usize) -> bool {
    category < UPPER_CATEGORY_COUNT
}
