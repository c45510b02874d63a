//! Phase 0: Precompute all static lookup tables.
//!
//! The orchestrator [`precompute_lookup_tables`] runs the sub-steps in dependency order:
//!
//! 1. **Roll enumeration**: every multiset of 0..=5 dice (462 keeps) and the
//!    252 completed rolls, with reverse lookups from roll key
//! 2. **Category scores**: s(r, c) for every completed roll and category
//! 3. **Dice set probabilities**: P(⊥ → r) for each completed roll
//! 4. **Keep table**: sparse P(k → r) rows and the holds offered by each roll
//! 5. **Reachability**: which (upper_mask, upper_total) pairs can occur

use std::time::Instant;

use log::info;

use crate::constants::*;
use crate::dice_mechanics::Roll;
use crate::game_mechanics::calculate_category_score;
use crate::types::YahtzeeContext;

/// Enumerate every roll key whose digits sum to at most 5, in ascending key order.
///
/// Fills `all_keeps`/`keep_index` with all of them and
/// `all_dice_sets`/`dice_set_index` with the completed ones.
pub fn build_all_rolls(ctx: &mut YahtzeeContext) {
    ctx.all_keeps.clear();
    ctx.all_dice_sets.clear();
    for key in 0..MAX_ROLL as u32 {
        let roll = match Roll::from_key(key) {
            Some(r) => r,
            None => continue,
        };
        ctx.keep_index[key as usize] = ctx.all_keeps.len() as u16;
        ctx.all_keeps.push(roll);
        if roll.num_dice() == NUM_DICE {
            ctx.dice_set_index[key as usize] = ctx.all_dice_sets.len() as u16;
            ctx.all_dice_sets.push(roll);
        }
    }
    debug_assert_eq!(ctx.all_keeps.len(), NUM_ROLLS);
    debug_assert_eq!(ctx.all_dice_sets.len(), NUM_COMPLETED_ROLLS);
}

/// Precompute s(r, c) for every completed roll and all 13 categories.
pub fn precompute_category_scores(ctx: &mut YahtzeeContext) {
    ctx.precomputed_scores = ctx
        .all_dice_sets
        .iter()
        .map(|&roll| {
            let mut scores = [0i32; CATEGORY_COUNT];
            for (cat, score) in scores.iter_mut().enumerate() {
                *score = calculate_category_score(roll, cat);
            }
            scores
        })
        .collect();
}

/// Precompute P(⊥ → r) = 5! / (c1! ... c6!) / 6^5 for every completed roll.
pub fn precompute_dice_set_probabilities(ctx: &mut YahtzeeContext) {
    ctx.dice_set_probabilities = ctx.all_dice_sets.iter().map(|r| r.probability()).collect();
}

/// Every partial roll obtained by keeping, for each face independently,
/// 0..=count of the dice showing it.
fn enumerate_holds(roll: Roll) -> Vec<Roll> {
    let counts = roll.face_counts();
    let mut holds = vec![Roll::EMPTY];
    for face in 1..=NUM_FACES {
        let mut next = Vec::with_capacity(holds.len() * (counts[face as usize] as usize + 1));
        for &held in &holds {
            let mut h = held;
            next.push(h);
            for _ in 0..counts[face as usize] {
                h = h.with_die(face);
                next.push(h);
            }
        }
        holds = next;
    }
    holds
}

/// Build the keep table.
///
/// **Rows.** For each keep K and completed roll T ⊇ K, the transition
/// probability is that of rolling T − K with the 5 − |K| free dice:
///   P(K → T) = n! / (d1! ... d6!) / 6^n
/// where n = 5 − |K| and di is the number of re-rolled dice showing face i.
/// Each row sums to 1; the row of a completed roll holds just itself.
///
/// **Holds.** For each completed roll, the keep index of every distinct hold
/// (per-face counts, so no two holds of one roll coincide).
pub fn precompute_keep_table(ctx: &mut YahtzeeContext) {
    let kt = &mut ctx.keep_table;
    kt.vals.clear();
    kt.cols.clear();

    for (kid, &keep) in ctx.all_keeps.iter().enumerate() {
        kt.row_start[kid] = kt.vals.len() as u32;
        for (ds, &target) in ctx.all_dice_sets.iter().enumerate() {
            if !target.contains(keep) {
                continue;
            }
            kt.vals.push(target.without(keep).probability());
            kt.cols.push(ds as u16);
        }
    }
    kt.row_start[NUM_ROLLS] = kt.vals.len() as u32;

    kt.hold_ids.clear();
    for (ds, &roll) in ctx.all_dice_sets.iter().enumerate() {
        kt.hold_start[ds] = kt.hold_ids.len() as u32;
        for held in enumerate_holds(roll) {
            kt.hold_ids.push(ctx.keep_index[held.key() as usize]);
        }
    }
    kt.hold_start[NUM_COMPLETED_ROLLS] = kt.hold_ids.len() as u32;

    info!(
        "    Keep table: {} keeps, {} nnz, avg {:.1} holds/roll",
        NUM_ROLLS,
        kt.vals.len(),
        kt.hold_ids.len() as f64 / NUM_COMPLETED_ROLLS as f64
    );
}

/// Reachability pruning over the six upper categories.
///
/// A pair (mask, m) is reachable if some assignment of upper-category scores
/// (k × face, k ∈ 0..=5, for each face in mask) sums to exactly m. Upper total
/// 63 means "≥ 63": all exact sums 63..=105 are OR'd together.
pub fn precompute_reachability(ctx: &mut YahtzeeContext) {
    const MAX_UPPER_SUM: usize = 105;

    // exact[n][mask]
    let mut exact = vec![[false; 64]; MAX_UPPER_SUM + 1];
    exact[0][0] = true;

    // Add one face at a time
    for face in 1..=6usize {
        let bit = 1 << (face - 1);
        for n in (0..=MAX_UPPER_SUM).rev() {
            for mask in 0..64usize {
                if mask & bit == 0 || exact[n][mask] {
                    continue;
                }
                let prev_mask = mask ^ bit;
                let hit = (0..=NUM_DICE as usize)
                    .map(|k| k * face)
                    .take_while(|&contrib| contrib <= n)
                    .any(|contrib| exact[n - contrib][prev_mask]);
                exact[n][mask] = hit;
            }
        }
    }

    let cap = UPPER_BONUS_THRESHOLD as usize;
    ctx.reachable = [[false; 64]; 64];
    for mask in 0..64usize {
        for n in 0..cap {
            ctx.reachable[mask][n] = exact[n][mask];
        }
        ctx.reachable[mask][cap] = (cap..=MAX_UPPER_SUM).any(|n| exact[n][mask]);
    }

    let reachable_count = ctx.reachable.iter().flatten().filter(|&&r| r).count();
    info!(
        "    Reachable upper pairs: {} / {} ({:.1}% pruned)",
        reachable_count,
        64 * 64,
        100.0 * (1.0 - reachable_count as f64 / (64.0 * 64.0))
    );
}

/// Phase 0 orchestrator: build all static lookup tables in dependency order.
pub fn precompute_lookup_tables(ctx: &mut YahtzeeContext) {
    info!("=== Phase 0: Precompute Lookup Tables ===");
    let phase0_start = Instant::now();

    macro_rules! timed {
        ($label:expr, $body:expr) => {{
            let t0 = Instant::now();
            $body;
            let dt = t0.elapsed().as_secs_f64() * 1000.0;
            info!("  {:<42} {:>8.3} ms", $label, dt);
        }};
    }

    timed!("Roll enumeration (462 / 252)", build_all_rolls(ctx));
    timed!("Category scores", precompute_category_scores(ctx));
    timed!(
        "Dice set probabilities",
        precompute_dice_set_probabilities(ctx)
    );
    timed!("Keep table", precompute_keep_table(ctx));
    timed!("Reachability pruning", precompute_reachability(ctx));

    let total = phase0_start.elapsed().as_secs_f64() * 1000.0;
    info!("  {:<42} {:>8.3} ms", "TOTAL Phase 0", total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NO_INDEX;

    fn make_ctx() -> Box<YahtzeeContext> {
        YahtzeeContext::precomputed()
    }

    #[test]
    fn test_context_creation() {
        let ctx = make_ctx();
        assert_eq!(ctx.all_keeps.len(), NUM_ROLLS);
        assert_eq!(ctx.all_dice_sets.len(), NUM_COMPLETED_ROLLS);
        assert_eq!(ctx.all_keeps[0], Roll::EMPTY);
        assert_eq!(ctx.all_dice_sets[0], Roll::from_dice(&[1, 1, 1, 1, 1]));
        assert_eq!(ctx.all_dice_sets[251], Roll::from_dice(&[6, 6, 6, 6, 6]));
        assert_eq!(ctx.precomputed_scores[0][CATEGORY_ONES], 5);
        assert_eq!(ctx.precomputed_scores[0][CATEGORY_TWOS], 0);
        assert_eq!(ctx.precomputed_scores[0][CATEGORY_YAHTZEE], 50);
        assert_eq!(ctx.precomputed_scores[251][CATEGORY_SIXES], 30);
        assert_eq!(ctx.precomputed_scores[251][CATEGORY_CHANCE], 30);

        let prob_sum: f64 = ctx.dice_set_probabilities.iter().sum();
        assert!((prob_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_252_dice_sets() {
        let ctx = make_ctx();
        for (i, roll) in ctx.all_dice_sets.iter().enumerate() {
            assert_eq!(roll.num_dice(), 5);
            assert_eq!(ctx.dice_set_index[roll.key() as usize] as usize, i);
        }
        for w in ctx.all_dice_sets.windows(2) {
            assert!(w[0].key() < w[1].key());
        }
        assert_eq!(ctx.dice_set_index[Roll::from_dice(&[1, 2]).key() as usize], NO_INDEX);
    }

    #[test]
    fn test_keep_table_row_sums() {
        let ctx = make_ctx();
        let kt = &ctx.keep_table;
        assert_eq!(kt.vals.len(), KEEP_TABLE_NNZ);
        for kid in 0..NUM_ROLLS {
            let sum: f64 = kt.row(kid).map(|(_, p)| p).sum();
            assert!((sum - 1.0).abs() < 1e-12, "keep row {} sums to {}", kid, sum);
        }
    }

    #[test]
    fn test_empty_keep_matches_dice_set_probabilities() {
        let ctx = make_ctx();
        let row: Vec<(usize, f64)> = ctx.keep_table.row(0).collect();
        assert_eq!(row.len(), NUM_COMPLETED_ROLLS);
        for (ds, p) in row {
            assert!((p - ctx.dice_set_probabilities[ds]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_completions() {
        let ctx = make_ctx();
        let full = Roll::from_dice(&[1, 2, 3, 4, 5]);
        assert_eq!(ctx.completions(full).collect::<Vec<_>>(), vec![full]);

        // Four held dice: one free die, six outcomes.
        let held = Roll::from_dice(&[6, 6, 6, 6]);
        let completions: Vec<Roll> = ctx.completions(held).collect();
        assert_eq!(completions.len(), 6);
        assert!(completions.iter().all(|c| c.contains(held)));

        assert_eq!(ctx.completions(Roll::EMPTY).count(), NUM_COMPLETED_ROLLS);
        // C(6+3-1, 3) = 56 ways to roll three free dice.
        assert_eq!(ctx.completions(Roll::from_dice(&[2, 5])).count(), 56);
    }

    #[test]
    fn test_holds() {
        let ctx = make_ctx();
        assert_eq!(ctx.holds(Roll::from_dice(&[1, 1, 1, 1, 1])).count(), 6);
        assert_eq!(ctx.holds(Roll::from_dice(&[1, 2, 3, 4, 5])).count(), 32);
        assert_eq!(ctx.holds(Roll::from_dice(&[2, 2, 3, 3, 3])).count(), 12);

        let roll = Roll::from_dice(&[2, 2, 3, 5, 5]);
        let holds: Vec<Roll> = ctx.holds(roll).collect();
        assert!(holds.contains(&Roll::EMPTY));
        assert!(holds.contains(&roll));
        assert!(holds.iter().all(|h| roll.contains(*h)));
        let mut keys: Vec<u32> = holds.iter().map(|h| h.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), holds.len());
    }

    #[test]
    fn test_probability() {
        let ctx = make_ctx();
        let p = ctx.probability(Roll::from_dice(&[6, 6, 6, 6, 6]));
        assert!((p - 1.0 / 7776.0).abs() < 1e-15);
        let p = ctx.probability(Roll::from_dice(&[1, 1, 2, 2, 3]));
        assert!((p - 30.0 / 7776.0).abs() < 1e-15);
    }

    #[test]
    fn test_reachability() {
        let ctx = make_ctx();
        assert!(ctx.reachable[0][0]);
        assert!(!ctx.reachable[0][1]);
        assert!(!ctx.reachable[0][63]);
        assert!(ctx.reachable[1][0]);
        assert!(ctx.reachable[1][5]);
        assert!(!ctx.reachable[1][6]);
        assert!(ctx.reachable[0x20][0]);
        assert!(ctx.reachable[0x20][6]);
        assert!(ctx.reachable[0x20][30]);
        assert!(!ctx.reachable[0x20][1]);
        assert!(!ctx.reachable[0x20][7]);
        assert!(ctx.reachable[0x3F][63]);
        assert!(ctx.reachable[0x1F][63]);
        assert!(!ctx.reachable[0x0F][63]);
    }
}
