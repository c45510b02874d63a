//! Yahtzee scoring rules: s(r, c) and the successor function n(S, r, c).
//!
//! [`calculate_category_score`] is the raw category value with no bonuses.
//! [`fill_category`] applies a full turn: marks the category, tracks the
//! capped upper total and awards the upper bonus, the repeated-Yahtzee bonus
//! and the joker values.

use crate::constants::*;
use crate::dice_mechanics::Roll;
use crate::types::GameState;

/// Compute s(r, c): the score for placing a 5-dice roll in the given category.
///
/// Each category tests only its own shape; a roll that fails it scores 0.
pub fn calculate_category_score(roll: Roll, category: usize) -> i32 {
    match category {
        CATEGORY_ONES | CATEGORY_TWOS | CATEGORY_THREES | CATEGORY_FOURS | CATEGORY_FIVES
        | CATEGORY_SIXES => {
            let face = category as u32 + 1;
            (face * roll.count_of(face)) as i32
        }
        CATEGORY_THREE_OF_A_KIND => n_of_a_kind_score(roll, 3),
        CATEGORY_FOUR_OF_A_KIND => n_of_a_kind_score(roll, 4),
        CATEGORY_FULL_HOUSE => {
            if roll.is_full_house() {
                FULL_HOUSE_SCORE
            } else {
                0
            }
        }
        CATEGORY_SMALL_STRAIGHT => {
            if roll.has_n_in_a_row(4) {
                SMALL_STRAIGHT_SCORE
            } else {
                0
            }
        }
        CATEGORY_LARGE_STRAIGHT => {
            if roll.has_n_in_a_row(5) {
                LARGE_STRAIGHT_SCORE
            } else {
                0
            }
        }
        CATEGORY_CHANCE => roll.sum_of_dice() as i32,
        CATEGORY_YAHTZEE => {
            if roll.is_yahtzee() {
                YAHTZEE_SCORE
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Sum of all dice if some face appears at least `n` times, else 0.
fn n_of_a_kind_score(roll: Roll, n: u32) -> i32 {
    if roll.has_n_of_a_kind(n) {
        roll.sum_of_dice() as i32
    } else {
        0
    }
}

/// Fixed value a joker earns in full house or either straight.
fn joker_score(category: usize) -> Option<i32> {
    match category {
        CATEGORY_FULL_HOUSE => Some(FULL_HOUSE_SCORE),
        CATEGORY_SMALL_STRAIGHT => Some(SMALL_STRAIGHT_SCORE),
        CATEGORY_LARGE_STRAIGHT => Some(LARGE_STRAIGHT_SCORE),
        _ => None,
    }
}

/// Compute successor upper total: m' = min(m + u(r, c), 63).
///
/// u(r, c) = s(r, c) for upper categories, 0 otherwise.
pub fn update_upper_score(upper_total: u32, category: usize, score: i32) -> u32 {
    if is_upper_category(category) {
        (upper_total + score as u32).min(UPPER_BONUS_THRESHOLD)
    } else {
        upper_total
    }
}

/// Score `roll` in `category` from `state`. Returns the successor state and
/// the points earned this turn, bonuses included.
///
/// - A nonzero Yahtzee sets the bonus-eligibility bit.
/// - Upper categories add to the upper total while it is below 63; crossing
///   63 caps the total and earns the upper bonus.
/// - From a bonus-eligible state, a five-of-a-kind scored in full house or a
///   straight counts as that category's fixed value (joker), and any nonzero
///   placement of a five-of-a-kind earns the repeated-Yahtzee bonus.
pub fn fill_category(state: GameState, roll: Roll, category: usize) -> (GameState, i32) {
    fill_category_with_score(state, roll, category, calculate_category_score(roll, category))
}

/// [`fill_category`] with the raw category value s(r, c) already known.
#[inline]
pub fn fill_category_with_score(
    state: GameState,
    roll: Roll,
    category: usize,
    raw_score: i32,
) -> (GameState, i32) {
    debug_assert!(
        !state.is_category_filled(category),
        "category {} already filled in {}",
        CATEGORY_NAMES[category],
        state
    );
    debug_assert_eq!(roll.num_dice(), NUM_DICE, "incomplete roll {}", roll);

    let repeated_yahtzee = state.is_bonus_eligible() && roll.is_yahtzee();
    let mut value = raw_score;
    if repeated_yahtzee {
        if let Some(joker) = joker_score(category) {
            value = joker;
        }
    }

    let mut new_state = state.with_category_filled(category);
    if category == CATEGORY_YAHTZEE && value != 0 {
        new_state = new_state.with_bonus_eligible();
    }

    let mut delta = value;
    let upper_total = state.upper_total();
    if is_upper_category(category) && upper_total < UPPER_BONUS_THRESHOLD {
        let new_upper = update_upper_score(upper_total, category, value);
        new_state = new_state.with_upper_total(new_upper);
        if new_upper >= UPPER_BONUS_THRESHOLD {
            delta += UPPER_BONUS;
        }
    }

    if repeated_yahtzee && value != 0 {
        delta += YAHTZEE_BONUS;
    }

    (new_state, delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(dice: &[u32]) -> Roll {
        Roll::from_dice(dice)
    }

    #[test]
    fn test_upper_section() {
        assert_eq!(calculate_category_score(roll(&[1, 1, 1, 1, 1]), CATEGORY_ONES), 5);
        assert_eq!(calculate_category_score(roll(&[6, 6, 6, 6, 6]), CATEGORY_SIXES), 30);
        assert_eq!(calculate_category_score(roll(&[1, 2, 3, 4, 5]), CATEGORY_ONES), 1);
        assert_eq!(calculate_category_score(roll(&[3, 3, 4, 5, 6]), CATEGORY_THREES), 6);
        assert_eq!(calculate_category_score(roll(&[4, 4, 4, 4, 4]), CATEGORY_FOURS), 20);
        assert_eq!(calculate_category_score(roll(&[5, 5, 5, 1, 2]), CATEGORY_FIVES), 15);
        assert_eq!(calculate_category_score(roll(&[5, 5, 5, 1, 2]), CATEGORY_SIXES), 0);
    }

    #[test]
    fn test_n_of_a_kind() {
        assert_eq!(
            calculate_category_score(roll(&[2, 2, 2, 4, 5]), CATEGORY_THREE_OF_A_KIND),
            15
        );
        assert_eq!(
            calculate_category_score(roll(&[4, 4, 4, 4, 2]), CATEGORY_FOUR_OF_A_KIND),
            18
        );
        assert_eq!(
            calculate_category_score(roll(&[1, 2, 3, 4, 5]), CATEGORY_THREE_OF_A_KIND),
            0
        );
        assert_eq!(
            calculate_category_score(roll(&[3, 3, 3, 4, 5]), CATEGORY_FOUR_OF_A_KIND),
            0
        );
    }

    #[test]
    fn test_five_sixes() {
        let sixes = roll(&[6, 6, 6, 6, 6]);
        assert_eq!(calculate_category_score(sixes, CATEGORY_SIXES), 30);
        assert_eq!(calculate_category_score(sixes, CATEGORY_YAHTZEE), 50);
        assert_eq!(calculate_category_score(sixes, CATEGORY_CHANCE), 30);
        assert_eq!(calculate_category_score(sixes, CATEGORY_THREE_OF_A_KIND), 30);
        assert_eq!(calculate_category_score(sixes, CATEGORY_FOUR_OF_A_KIND), 30);
        assert_eq!(calculate_category_score(sixes, CATEGORY_FULL_HOUSE), 0);
        assert_eq!(calculate_category_score(sixes, CATEGORY_SMALL_STRAIGHT), 0);
    }

    #[test]
    fn test_no_fallthrough() {
        // Failing a lower category never scores as chance.
        let junk = roll(&[1, 1, 3, 5, 6]);
        for cat in [
            CATEGORY_THREE_OF_A_KIND,
            CATEGORY_FOUR_OF_A_KIND,
            CATEGORY_FULL_HOUSE,
            CATEGORY_SMALL_STRAIGHT,
            CATEGORY_LARGE_STRAIGHT,
            CATEGORY_YAHTZEE,
        ] {
            assert_eq!(calculate_category_score(junk, cat), 0, "{}", CATEGORY_NAMES[cat]);
        }
        assert_eq!(calculate_category_score(junk, CATEGORY_CHANCE), 16);
    }

    #[test]
    fn test_straights() {
        assert_eq!(calculate_category_score(roll(&[1, 2, 3, 4, 6]), CATEGORY_SMALL_STRAIGHT), 30);
        assert_eq!(calculate_category_score(roll(&[3, 4, 5, 6, 3]), CATEGORY_SMALL_STRAIGHT), 30);
        assert_eq!(calculate_category_score(roll(&[2, 3, 4, 5, 6]), CATEGORY_LARGE_STRAIGHT), 40);
        assert_eq!(calculate_category_score(roll(&[2, 3, 4, 5, 6]), CATEGORY_SMALL_STRAIGHT), 30);
        assert_eq!(calculate_category_score(roll(&[1, 2, 3, 4, 6]), CATEGORY_LARGE_STRAIGHT), 0);
        assert_eq!(calculate_category_score(roll(&[1, 2, 4, 5, 6]), CATEGORY_SMALL_STRAIGHT), 0);
    }

    #[test]
    fn test_full_house_and_chance() {
        assert_eq!(calculate_category_score(roll(&[2, 2, 3, 3, 3]), CATEGORY_FULL_HOUSE), 25);
        assert_eq!(calculate_category_score(roll(&[2, 2, 3, 3, 4]), CATEGORY_FULL_HOUSE), 0);
        assert_eq!(calculate_category_score(roll(&[3, 4, 1, 5, 6]), CATEGORY_CHANCE), 19);
    }

    #[test]
    fn test_update_upper_score() {
        assert_eq!(update_upper_score(0, CATEGORY_ONES, 5), 5);
        assert_eq!(update_upper_score(10, CATEGORY_SIXES, 30), 40);
        assert_eq!(update_upper_score(60, CATEGORY_FIVES, 30), 63);
        assert_eq!(update_upper_score(10, CATEGORY_CHANCE, 12), 10);
        assert_eq!(update_upper_score(63, CATEGORY_ONES, 5), 63);
    }

    #[test]
    fn test_fill_upper_bonus() {
        let state = GameState::new(0, false, 60);
        let (next, delta) = fill_category(state, roll(&[5, 1, 2, 3, 4]), CATEGORY_FIVES);
        assert_eq!(next.upper_total(), 63);
        assert!(next.is_category_filled(CATEGORY_FIVES));
        assert_eq!(delta, 5 + UPPER_BONUS);

        // Below the threshold: no bonus.
        let (next, delta) = fill_category(state, roll(&[1, 1, 2, 3, 4]), CATEGORY_TWOS);
        assert_eq!(next.upper_total(), 62);
        assert_eq!(delta, 2);

        // Already at the cap: total and bonus untouched.
        let capped = GameState::new(1 << CATEGORY_SIXES, false, 63);
        let (next, delta) = fill_category(capped, roll(&[4, 4, 4, 1, 2]), CATEGORY_FOURS);
        assert_eq!(next.upper_total(), 63);
        assert_eq!(delta, 12);
    }

    #[test]
    fn test_fill_upper_keeps_other_categories_open() {
        let (next, delta) = fill_category(GameState::EMPTY, roll(&[1, 2, 3, 4, 5]), CATEGORY_ONES);
        assert_eq!(delta, 1);
        assert_eq!(next.upper_total(), 1);
        assert_eq!(next.filled(), 1 << CATEGORY_ONES);
        assert_eq!(next.open_categories().count(), CATEGORY_COUNT - 1);

        let (next, _) = fill_category(next, roll(&[6, 6, 6, 2, 2]), CATEGORY_YAHTZEE);
        assert_eq!(next.upper_total(), 1);
        assert_eq!(next.filled(), (1 << CATEGORY_ONES) | (1 << CATEGORY_YAHTZEE));
        assert!(!next.is_bonus_eligible());

        let (next, _) = fill_category(
            GameState::new(1 << CATEGORY_SIXES, false, 30),
            roll(&[2, 2, 2, 2, 2]),
            CATEGORY_YAHTZEE,
        );
        assert!(next.is_bonus_eligible());
        assert_eq!(next.upper_total(), 30);
        assert_eq!(next.num_filled(), 2);
    }

    #[test]
    fn test_fill_yahtzee_sets_bonus_bit() {
        let (next, delta) = fill_category(GameState::EMPTY, roll(&[3, 3, 3, 3, 3]), CATEGORY_YAHTZEE);
        assert!(next.is_bonus_eligible());
        assert_eq!(delta, 50);

        let (next, delta) = fill_category(GameState::EMPTY, roll(&[3, 3, 3, 3, 2]), CATEGORY_YAHTZEE);
        assert!(next.is_category_filled(CATEGORY_YAHTZEE));
        assert!(!next.is_bonus_eligible());
        assert_eq!(delta, 0);
    }

    #[test]
    fn test_joker_rule() {
        let eligible = GameState::new(1 << CATEGORY_YAHTZEE, true, 0);
        let yahtzee = roll(&[2, 2, 2, 2, 2]);

        let (next, delta) = fill_category(eligible, yahtzee, CATEGORY_FULL_HOUSE);
        assert_eq!(delta, 25 + 100);
        assert!(next.is_bonus_eligible());
        assert!(next.is_category_filled(CATEGORY_FULL_HOUSE));

        assert_eq!(fill_category(eligible, yahtzee, CATEGORY_SMALL_STRAIGHT).1, 30 + 100);
        assert_eq!(fill_category(eligible, yahtzee, CATEGORY_LARGE_STRAIGHT).1, 40 + 100);
        assert_eq!(fill_category(eligible, yahtzee, CATEGORY_CHANCE).1, 10 + 100);
        assert_eq!(fill_category(eligible, yahtzee, CATEGORY_TWOS).1, 10 + 100);
        // Zero placement earns no bonus.
        assert_eq!(fill_category(eligible, yahtzee, CATEGORY_SIXES).1, 0);
    }

    #[test]
    fn test_no_joker_without_eligibility() {
        // Yahtzee scratched: no bonus, no joker.
        let scratched = GameState::new(1 << CATEGORY_YAHTZEE, false, 0);
        let yahtzee = roll(&[2, 2, 2, 2, 2]);
        assert_eq!(fill_category(scratched, yahtzee, CATEGORY_FULL_HOUSE).1, 0);
        assert_eq!(fill_category(scratched, yahtzee, CATEGORY_CHANCE).1, 10);

        // Eligible, but the roll is not a five-of-a-kind.
        let eligible = GameState::new(1 << CATEGORY_YAHTZEE, true, 0);
        assert_eq!(fill_category(eligible, roll(&[2, 2, 2, 3, 3]), CATEGORY_FULL_HOUSE).1, 25);
        assert_eq!(fill_category(eligible, roll(&[2, 2, 2, 3, 4]), CATEGORY_FULL_HOUSE).1, 0);
    }
}
