//! Backward induction: compute E_table[S] for every state reachable from the
//! empty scorecard.
//!
//! Filling a category always sets one more category bit, so states form a DAG
//! stratified into 14 levels by the number of filled categories. Two
//! schedulers walk it, both built on
//! [`crate::widget_solver::compute_expected_state_value`] and therefore
//! producing identical values:
//!
//! - [`expected_value`]: memoized recursion from the requested state. Solving
//!   the empty scorecard visits, and caches, every reachable state.
//! - [`compute_all_state_values`]: level by level from 12 filled categories
//!   down to 0. Each level is parallelized with rayon `par_iter`; a state only
//!   reads successors one level up, which the previous level completed.
//!
//! Terminal states (all 13 filled) are worth 0 and are never stored.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::constants::*;
use crate::types::{GameState, StateValues, YahtzeeContext, UNSET};
use crate::widget_solver::{compute_expected_state_value, TurnBuffers};

/// Number of DAG levels (0..=13 filled categories).
const NUM_LEVELS: usize = CATEGORY_COUNT + 1;

/// How the state DAG is traversed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheduler {
    /// Single-threaded memoized recursion from the empty scorecard.
    Recursive,
    /// Parallel evaluation one level at a time.
    #[default]
    Levels,
}

impl FromStr for Scheduler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recursive" => Ok(Scheduler::Recursive),
            "levels" => Ok(Scheduler::Levels),
            other => Err(format!(
                "unknown scheduler '{}' (expected 'recursive' or 'levels')",
                other
            )),
        }
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::Recursive => f.write_str("recursive"),
            Scheduler::Levels => f.write_str("levels"),
        }
    }
}

/// Solve every state reachable from the empty scorecard with `scheduler`.
pub fn solve(ctx: &YahtzeeContext, scheduler: Scheduler) -> StateValues {
    let start = Instant::now();
    let mut cache = StateValues::new();
    let ev = match scheduler {
        Scheduler::Recursive => expected_value(ctx, &mut cache, GameState::EMPTY),
        Scheduler::Levels => {
            compute_levels(ctx, &mut cache, 0);
            cache.get(GameState::EMPTY).unwrap_or(0.0)
        }
    };
    info!(
        "Expected score: {:.4} ({} scheduler, {} states, {:.2}s)",
        ev,
        scheduler,
        cache.num_computed(),
        start.elapsed().as_secs_f64()
    );
    cache
}

/// E(S): expected remaining score from `state` under optimal play.
///
/// Returns 0 for terminal states, the cached value if present, and otherwise
/// solves the turn, recursing into successor states, and caches the result.
pub fn expected_value(ctx: &YahtzeeContext, cache: &mut StateValues, state: GameState) -> f64 {
    let mut scratch = RecursionScratch::default();
    expected_value_inner(ctx, cache, state, &mut scratch)
}

/// Buffers and counters shared by one recursive solve.
///
/// A frame borrows a [`TurnBuffers`] for the duration of its turn and returns
/// it afterwards, so the pool never grows past the recursion depth.
#[derive(Default)]
struct RecursionScratch {
    pool: Vec<TurnBuffers>,
    computed: usize,
}

fn expected_value_inner(
    ctx: &YahtzeeContext,
    cache: &mut StateValues,
    state: GameState,
    scratch: &mut RecursionScratch,
) -> f64 {
    if state.is_game_over() {
        return 0.0;
    }
    if let Some(value) = cache.get(state) {
        return value;
    }

    let mut bufs = scratch.pool.pop().unwrap_or_default();
    let value = compute_expected_state_value(ctx, state, &mut bufs, |next| {
        expected_value_inner(ctx, cache, next, scratch)
    });
    scratch.pool.push(bufs);
    cache.set(state, value);

    scratch.computed += 1;
    debug!("E({}) = {:.6}", state, value);
    if scratch.computed % 10_000 == 0 {
        info!(
            "{} states computed, current: {} = {:.4}",
            scratch.computed,
            state.key(),
            value
        );
    }
    value
}

/// Every reachable non-terminal state with `num_filled` categories filled, in ascending key order.
///
/// The upper total must be achievable with the filled upper categories; the
/// bonus bit appears only alongside a filled Yahtzee.
pub fn states_at_level(ctx: &YahtzeeContext, num_filled: u32) -> Vec<GameState> {
    let mut states = Vec::new();
    if num_filled as usize >= CATEGORY_COUNT {
        return states;
    }
    for upper_total in 0..=UPPER_BONUS_THRESHOLD {
        for bonus in [false, true] {
            for filled in 0..=CATEGORIES_MASK {
                if filled.count_ones() != num_filled {
                    continue;
                }
                if bonus && filled & (1 << CATEGORY_YAHTZEE) == 0 {
                    continue;
                }
                let state = GameState::new(filled, bonus, upper_total);
                if ctx.is_reachable(state) {
                    states.push(state);
                }
            }
        }
    }
    states
}

/// Progress tracker for the level loop.
struct ComputeProgress {
    total_states: usize,
    completed_states: usize,
    start_time: Instant,
    states_per_level: [usize; NUM_LEVELS],
    time_per_level: [f64; NUM_LEVELS],
}

impl ComputeProgress {
    fn new(levels: &[Vec<GameState>]) -> Self {
        let mut states_per_level = [0; NUM_LEVELS];
        for (level, states) in levels.iter().enumerate() {
            states_per_level[level] = states.len();
        }
        Self {
            total_states: states_per_level.iter().sum(),
            completed_states: 0,
            start_time: Instant::now(),
            states_per_level,
            time_per_level: [0.0; NUM_LEVELS],
        }
    }

    fn finish_level(&mut self, level: usize, level_secs: f64) {
        self.completed_states += self.states_per_level[level];
        self.time_per_level[level] = level_secs;
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let pct = self.completed_states as f64 / self.total_states.max(1) as f64 * 100.0;
        info!(
            "Level {:2} completed in {:.2}s ({:.0} states/s) | {}/{} states ({:.1}%) | elapsed {:.1}s",
            level,
            level_secs,
            self.states_per_level[level] as f64 / level_secs.max(1e-9),
            self.completed_states,
            self.total_states,
            pct,
            elapsed
        );
    }

    fn print_summary(&self) {
        info!("Level | States  | Time (s) | Rate (states/s)");
        for level in (0..NUM_LEVELS).rev() {
            let t = self.time_per_level[level];
            if t > 0.0 {
                info!(
                    "  {:2}  | {:7} | {:8.2} | {:8.0}",
                    level,
                    self.states_per_level[level],
                    t,
                    self.states_per_level[level] as f64 / t
                );
            }
        }
        info!(
            "Total: {} states in {:.2}s",
            self.completed_states,
            self.start_time.elapsed().as_secs_f64()
        );
    }
}

/// Compute E_table[S] for all reachable states with the level scheduler.
pub fn compute_all_state_values(ctx: &YahtzeeContext) -> StateValues {
    let mut cache = StateValues::new();
    compute_levels(ctx, &mut cache, 0);
    cache
}

/// Solve levels 12 down to `lowest_level` into `cache`.
///
/// Every level above `lowest_level` is solved first, so the states of
/// `lowest_level` end up fully resolved.
pub fn compute_levels(ctx: &YahtzeeContext, cache: &mut StateValues, lowest_level: u32) {
    let levels: Vec<Vec<GameState>> = (0..NUM_LEVELS as u32)
        .map(|level| {
            if level >= lowest_level {
                states_at_level(ctx, level)
            } else {
                Vec::new()
            }
        })
        .collect();
    let mut progress = ComputeProgress::new(&levels);

    info!("=== Starting State Value Computation ===");
    info!("Total states to compute: {}", progress.total_states);
    for (level, states) in levels.iter().enumerate() {
        if !states.is_empty() {
            info!("  Level {:2}: {:7} states", level, states.len());
        }
    }

    for level in (lowest_level as usize..CATEGORY_COUNT).rev() {
        let level_start = Instant::now();
        let states = &levels[level];

        let sv = cache.as_slice();
        let results: Vec<f64> = states
            .par_iter()
            .map_init(TurnBuffers::new, |bufs, &state| {
                compute_expected_state_value(ctx, state, bufs, |next| {
                    if next.is_game_over() {
                        return 0.0;
                    }
                    let v = sv[next.index()];
                    debug_assert!(v != UNSET, "successor {} of {} not computed", next, state);
                    v
                })
            })
            .collect();

        // Barrier: the whole level is written before the next one reads it.
        for (&state, &value) in states.iter().zip(&results) {
            cache.set(state, value);
        }

        progress.finish_level(level, level_start.elapsed().as_secs_f64());
    }

    info!("=== Computation Complete ===");
    progress.print_summary();
}
