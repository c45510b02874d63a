//! # Yahtzee — Optimal Expected Score Table
//!
//! Computes the optimal expected remaining score for every reachable
//! scorecard of solitaire Yahtzee using **backward induction** over a DAG of
//! game states.
//!
//! ## Algorithm overview
//!
//! | Phase | Rust module | Description |
//! |-------|-------------|-------------|
//! | 0 | [`phase0_tables`] | Enumerate the 462 rolls and 252 completed rolls, score every (roll, category) pair, build the hold → completion table and its probabilities |
//! | 1 | [`phase0_tables::precompute_reachability`] | Find which (upper mask, upper total) pairs can occur |
//! | 2 | [`state_computation`] | Backward induction from 12 filled categories down to 0 (or memoized recursion from the empty scorecard) |
//!
//! Each turn-start state is solved by [`widget_solver::compute_expected_state_value`],
//! which walks the six turn stages (three rolls, two holds, one category
//! choice) in reverse with two ping-pong buffers.
//!
//! ## Encodings
//!
//! - A roll key stores the count of face `d` in decimal digit `d - 1`
//!   (five sixes = 500000); see [`dice_mechanics::Roll`].
//! - A game-state key stores the filled categories in bits 0..12, the
//!   five-of-a-kind bonus flag in bit 13 and `100_000 * upper_total` above
//!   them (upper total capped at 63); see [`types::GameState`].
//!
//! ## Rules
//!
//! - Upper bonus: +35 once the upper section reaches 63.
//! - Repeat five-of-a-kind: +100 for every nonzero placement once a
//!   five-of-a-kind has been scored for points.
//! - Joker: in that situation Full House, Small Straight and Large Straight
//!   score their fixed values (25/30/40) for a five-of-a-kind.
//!
//! The table is written by [`storage::save_state_values`] as
//! `<key>\t<value>` lines.

#![allow(clippy::needless_range_loop)]

pub mod constants;
pub mod dice_mechanics;
pub mod env_config;
pub mod error;
pub mod game_mechanics;
pub mod phase0_tables;
pub mod state_computation;
pub mod storage;
pub mod types;
pub mod widget_solver;
