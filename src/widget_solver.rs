//! SOLVE_WIDGET: the expected value of one turn-start state.
//!
//! A turn is a fixed sequence of chance and decision nodes:
//!
//! ```text
//! FirstRoll → FirstHold → SecondRoll → SecondHold → ThirdRoll → CategoryChoice
//! ```
//!
//! Backward induction evaluates the stages in reverse, alternating between two
//! buffers:
//!
//! | Stage | Node | Writes |
//! |---|---|---|
//! | `CategoryChoice` | decision | `roll_values[r] = max_c s(r,c) + E(n(S,r,c))` |
//! | `ThirdRoll` | chance | `hold_values[k] = Σ P(k→r) · roll_values[r]` |
//! | `SecondHold` | decision | `roll_values[r] = max_{k ⊆ r} hold_values[k]` |
//! | `SecondRoll` | chance | `hold_values[k] = Σ P(k→r) · roll_values[r]` |
//! | `FirstHold` | decision | `roll_values[r] = max_{k ⊆ r} hold_values[k]` |
//! | `FirstRoll` | chance | `E(S) = Σ P(⊥→r) · roll_values[r]` |
//!
//! Every roll and every hold is evaluated once per stage, so subtrees shared
//! between rolls are never recomputed. The buffers belong to one state and
//! are overwritten by the next.

use std::fmt;

use crate::constants::*;
use crate::game_mechanics::fill_category_with_score;
use crate::types::{GameState, YahtzeeContext};

/// One node layer of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnStage {
    FirstRoll,
    FirstHold,
    SecondRoll,
    SecondHold,
    ThirdRoll,
    CategoryChoice,
}

impl TurnStage {
    /// Stages in the order they are played.
    pub const PLAY_ORDER: [TurnStage; 6] = [
        TurnStage::FirstRoll,
        TurnStage::FirstHold,
        TurnStage::SecondRoll,
        TurnStage::SecondHold,
        TurnStage::ThirdRoll,
        TurnStage::CategoryChoice,
    ];

    /// The stage that follows this one in play, `None` after the category choice.
    pub fn next(self) -> Option<TurnStage> {
        match self {
            TurnStage::FirstRoll => Some(TurnStage::FirstHold),
            TurnStage::FirstHold => Some(TurnStage::SecondRoll),
            TurnStage::SecondRoll => Some(TurnStage::SecondHold),
            TurnStage::SecondHold => Some(TurnStage::ThirdRoll),
            TurnStage::ThirdRoll => Some(TurnStage::CategoryChoice),
            TurnStage::CategoryChoice => None,
        }
    }

    /// Chance nodes average over dice outcomes; the rest maximize.
    pub fn is_chance(self) -> bool {
        matches!(
            self,
            TurnStage::FirstRoll | TurnStage::SecondRoll | TurnStage::ThirdRoll
        )
    }
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnStage::FirstRoll => "first roll",
            TurnStage::FirstHold => "first hold",
            TurnStage::SecondRoll => "second roll",
            TurnStage::SecondHold => "second hold",
            TurnStage::ThirdRoll => "third roll",
            TurnStage::CategoryChoice => "category choice",
        };
        f.write_str(name)
    }
}

/// Per-state scratch space, reusable across states.
///
/// Allocate one per worker to avoid a heap allocation per state.
pub struct TurnBuffers {
    /// Value of each completed roll at the current decision stage.
    pub roll_values: Vec<f64>,
    /// Value of each keep at the current chance stage.
    pub hold_values: Vec<f64>,
}

impl Default for TurnBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnBuffers {
    pub fn new() -> Self {
        Self {
            roll_values: vec![0.0; NUM_COMPLETED_ROLLS],
            hold_values: vec![0.0; NUM_ROLLS],
        }
    }
}

/// Compute E(S) for a non-terminal state.
///
/// `successor_value` returns E(S') for every state reachable by filling one
/// open category; each such state has strictly more categories filled.
pub fn compute_expected_state_value<F>(
    ctx: &YahtzeeContext,
    state: GameState,
    bufs: &mut TurnBuffers,
    mut successor_value: F,
) -> f64
where
    F: FnMut(GameState) -> f64,
{
    debug_assert!(!state.is_game_over(), "terminal state {}", state);

    let mut stage = TurnStage::CategoryChoice;
    loop {
        match stage {
            TurnStage::CategoryChoice => {
                best_category_values(ctx, state, &mut bufs.roll_values, &mut successor_value)
            }
            TurnStage::ThirdRoll | TurnStage::SecondRoll => {
                expected_hold_values(ctx, &bufs.roll_values, &mut bufs.hold_values)
            }
            TurnStage::SecondHold | TurnStage::FirstHold => {
                best_hold_values(ctx, &bufs.hold_values, &mut bufs.roll_values)
            }
            TurnStage::FirstRoll => return expected_first_roll(ctx, &bufs.roll_values),
        }
        stage = previous_stage(stage);
    }
}

/// Walk the play order backwards.
fn previous_stage(stage: TurnStage) -> TurnStage {
    TurnStage::PLAY_ORDER
        .iter()
        .copied()
        .find(|s| s.next() == Some(stage))
        .unwrap_or(TurnStage::FirstRoll)
}

/// CategoryChoice: E(S, r) = max_{c open} [s'(S,r,c) + E(n(S,r,c))] for every final roll,
/// where s' includes every bonus the placement earns.
#[inline]
fn best_category_values<F>(
    ctx: &YahtzeeContext,
    state: GameState,
    roll_values: &mut [f64],
    successor_value: &mut F,
) where
    F: FnMut(GameState) -> f64,
{
    for (ds, (&roll, scores)) in ctx
        .all_dice_sets
        .iter()
        .zip(&ctx.precomputed_scores)
        .enumerate()
    {
        let mut best_val = f64::NEG_INFINITY;
        for c in state.open_categories() {
            let (next, delta) = fill_category_with_score(state, roll, c, scores[c]);
            let val = delta as f64 + successor_value(next);
            if val > best_val {
                best_val = val;
            }
        }
        roll_values[ds] = best_val;
    }
}

/// Chance stage: value of each hold = Σ P(k→r) · roll_values[r].
#[inline]
fn expected_hold_values(ctx: &YahtzeeContext, roll_values: &[f64], hold_values: &mut [f64]) {
    let kt = &ctx.keep_table;
    for (kid, hold_value) in hold_values.iter_mut().enumerate() {
        *hold_value = kt.row(kid).map(|(ds, p)| p * roll_values[ds]).sum();
    }
}

/// Decision stage: value of each roll = max over its holds. Keeping all five
/// dice is one of the holds, so a roll is never worth less than standing on it.
#[inline]
fn best_hold_values(ctx: &YahtzeeContext, hold_values: &[f64], roll_values: &mut [f64]) {
    let kt = &ctx.keep_table;
    for (ds, roll_value) in roll_values.iter_mut().enumerate() {
        *roll_value = kt
            .holds(ds)
            .iter()
            .map(|&kid| hold_values[kid as usize])
            .fold(f64::NEG_INFINITY, f64::max);
    }
}

/// FirstRoll: E(S) = Σ P(⊥→r) · roll_values[r].
#[inline]
fn expected_first_roll(ctx: &YahtzeeContext, roll_values: &[f64]) -> f64 {
    ctx.dice_set_probabilities
        .iter()
        .zip(roll_values)
        .map(|(p, v)| p * v)
        .sum()
}
