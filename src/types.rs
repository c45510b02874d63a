//! Scorecard encoding and the state-value cache.
//!
//! A [`GameState`] packs a scorecard S = (C, f, m) into one integer key:
//! - `C`: bits 0..12, one per category, set once filled
//! - `f`: bit 13, set once a five-of-a-kind has been scored for points
//!   (only ever set together with the Yahtzee bit)
//! - `m`: `100_000 * m` with m ∈ [0, 63], the upper-section total capped at
//!   the bonus threshold
//!
//! Every key is below [`MAX_GAME_STATE`], so the E_table[S] cache is a flat
//! directly-indexed array.

use std::fmt;

use crate::constants::*;
use crate::dice_mechanics::Roll;

/// Scorecard key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameState(u32);

impl GameState {
    /// The empty scorecard.
    pub const EMPTY: GameState = GameState(0);

    /// Build a key from its three fields.
    pub fn new(filled: u32, bonus_eligible: bool, upper_total: u32) -> GameState {
        debug_assert!(filled <= CATEGORIES_MASK, "filled mask {:#x} out of range", filled);
        debug_assert!(upper_total <= UPPER_BONUS_THRESHOLD, "upper total {}", upper_total);
        debug_assert!(
            !bonus_eligible || filled & (1 << CATEGORY_YAHTZEE) != 0,
            "bonus without a filled Yahtzee"
        );
        let bonus = if bonus_eligible { 1 << BONUS_BIT } else { 0 };
        GameState::from_fields(filled | bonus, upper_total)
    }

    /// `low` holds the category and bonus bits; the upper total sits above it
    /// in decimal, so the two fields are combined by addition.
    #[inline(always)]
    const fn from_fields(low: u32, upper_total: u32) -> GameState {
        GameState(low + upper_total * UPPER_TOTAL_MULTIPLIER)
    }

    /// Category and bonus bits, without the upper-total field.
    #[inline(always)]
    const fn low_bits(self) -> u32 {
        self.0 % UPPER_TOTAL_MULTIPLIER
    }

    /// Decode a raw key, rejecting keys no scorecard encodes to.
    pub fn from_key(key: u32) -> Option<GameState> {
        if key as usize >= MAX_GAME_STATE {
            return None;
        }
        let low = key % UPPER_TOTAL_MULTIPLIER;
        if low >= 1 << (BONUS_BIT + 1) {
            return None;
        }
        let state = GameState(key);
        if state.is_bonus_eligible() && !state.is_category_filled(CATEGORY_YAHTZEE) {
            return None;
        }
        Some(state)
    }

    #[inline(always)]
    pub const fn key(self) -> u32 {
        self.0
    }

    /// Position in the flat value cache.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Bitmask of filled categories.
    #[inline(always)]
    pub fn filled(self) -> u32 {
        self.low_bits() & CATEGORIES_MASK
    }

    #[inline(always)]
    pub fn is_category_filled(self, category: usize) -> bool {
        self.low_bits() & (1 << category) != 0
    }

    /// All 13 categories filled.
    #[inline(always)]
    pub fn is_game_over(self) -> bool {
        self.filled() == CATEGORIES_MASK
    }

    #[inline(always)]
    pub fn is_bonus_eligible(self) -> bool {
        self.low_bits() & (1 << BONUS_BIT) != 0
    }

    /// Upper-section total, capped at 63.
    #[inline(always)]
    pub fn upper_total(self) -> u32 {
        self.0 / UPPER_TOTAL_MULTIPLIER
    }

    /// Number of filled categories (the DAG level of this state).
    #[inline(always)]
    pub fn num_filled(self) -> u32 {
        self.filled().count_ones()
    }

    /// Open categories in ascending index order.
    pub fn open_categories(self) -> impl Iterator<Item = usize> {
        (0..CATEGORY_COUNT).filter(move |&c| !self.is_category_filled(c))
    }

    #[inline(always)]
    pub fn with_category_filled(self, category: usize) -> GameState {
        GameState::from_fields(self.low_bits() | (1 << category), self.upper_total())
    }

    #[inline(always)]
    pub fn with_bonus_eligible(self) -> GameState {
        GameState::from_fields(self.low_bits() | (1 << BONUS_BIT), self.upper_total())
    }

    /// Replace the upper-section total field.
    #[inline(always)]
    pub fn with_upper_total(self, upper_total: u32) -> GameState {
        debug_assert!(upper_total <= UPPER_BONUS_THRESHOLD);
        GameState::from_fields(self.low_bits(), upper_total)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open: Vec<&str> = self.open_categories().map(|c| CATEGORY_NAMES[c]).collect();
        write!(
            f,
            "{{key: {}, open: {:?}, bonus eligible: {}, upper: {}}}",
            self.0,
            open,
            self.is_bonus_eligible(),
            self.upper_total()
        )
    }
}

/// Marker for a cache slot that has not been computed. Valid values are never negative.
pub const UNSET: f64 = -1.0;

/// E_table[S]: expected remaining score under optimal play, indexed by game-state key.
///
/// Written once per slot during a solve, read-only afterwards.
pub struct StateValues {
    values: Vec<f64>,
}

impl Default for StateValues {
    fn default() -> Self {
        Self::new()
    }
}

impl StateValues {
    /// A cache with every slot unset (~51 MB).
    pub fn new() -> Self {
        Self {
            values: vec![UNSET; MAX_GAME_STATE],
        }
    }

    /// Cached value, `None` if not yet computed.
    #[inline(always)]
    pub fn get(&self, state: GameState) -> Option<f64> {
        let v = self.values[state.index()];
        if v == UNSET {
            None
        } else {
            Some(v)
        }
    }

    #[inline(always)]
    pub fn set(&mut self, state: GameState, value: f64) {
        debug_assert!(value >= 0.0 && value.is_finite(), "bad value {}", value);
        self.values[state.index()] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Computed entries in ascending key order.
    pub fn iter_computed(&self) -> impl Iterator<Item = (GameState, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != UNSET)
            .map(|(i, &v)| (GameState(i as u32), v))
    }

    pub fn num_computed(&self) -> usize {
        self.values.iter().filter(|&&v| v != UNSET).count()
    }
}

/// Marker for a roll key with no dense index.
pub const NO_INDEX: u16 = u16::MAX;

/// Hold → completion transition table in CSR (Compressed Sparse Row) form.
///
/// A "keep" is any multiset of 0..=5 dice set aside before re-rolling; there
/// are 462 of them. Row `k` lists every completed roll reachable by rolling the
/// remaining `5 - |k|` dice, with the probability of the re-rolled dice.
///
/// Layout:
/// - `vals[row_start[k]..row_start[k+1]]`: P(k → r)
/// - `cols[row_start[k]..row_start[k+1]]`: dice-set index of r
/// - `hold_ids[hold_start[ds]..hold_start[ds+1]]`: keep index of every hold
///   offered by dice set `ds`, from "re-roll everything" to "keep all five"
pub struct KeepTable {
    pub vals: Vec<f64>,
    pub cols: Vec<u16>,
    pub row_start: Vec<u32>,
    pub hold_ids: Vec<u16>,
    pub hold_start: Vec<u32>,
}

impl Default for KeepTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeepTable {
    pub fn new() -> Self {
        Self {
            vals: Vec::with_capacity(KEEP_TABLE_NNZ),
            cols: Vec::with_capacity(KEEP_TABLE_NNZ),
            row_start: vec![0; NUM_ROLLS + 1],
            hold_ids: Vec::with_capacity(KEEP_TABLE_NNZ),
            hold_start: vec![0; NUM_COMPLETED_ROLLS + 1],
        }
    }

    /// `(dice set, probability)` pairs for keep `kid`.
    #[inline(always)]
    pub fn row(&self, kid: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.row_start[kid] as usize;
        let end = self.row_start[kid + 1] as usize;
        self.cols[start..end]
            .iter()
            .zip(&self.vals[start..end])
            .map(|(&c, &p)| (c as usize, p))
    }

    /// Keep indices of the holds available from dice set `ds`.
    #[inline(always)]
    pub fn holds(&self, ds: usize) -> &[u16] {
        &self.hold_ids[self.hold_start[ds] as usize..self.hold_start[ds + 1] as usize]
    }
}

/// All precomputed tables, built once by
/// [`crate::phase0_tables::precompute_lookup_tables`] and read-only afterwards.
///
/// Two dense index spaces sit over roll keys:
/// - keep index 0..462: every roll of 0..=5 dice (`all_keeps`)
/// - dice-set index 0..252: every completed roll (`all_dice_sets`)
///
/// Both are in ascending key order.
pub struct YahtzeeContext {
    /// Every multiset of 0..=5 dice.
    pub all_keeps: Vec<Roll>,
    /// Roll key → keep index, [`NO_INDEX`] for invalid keys.
    pub keep_index: Vec<u16>,
    /// R_{5,6}: every completed roll.
    pub all_dice_sets: Vec<Roll>,
    /// Roll key → dice-set index, [`NO_INDEX`] unless the key is a completed roll.
    pub dice_set_index: Vec<u16>,
    /// P(⊥ → r) for each completed roll.
    pub dice_set_probabilities: Vec<f64>,
    /// s(r, c) for each completed roll and category.
    pub precomputed_scores: Vec<[i32; CATEGORY_COUNT]>,
    pub keep_table: KeepTable,
    /// reachable[upper_mask][m]: some assignment of the upper categories in
    /// `upper_mask` sums to m (m = 63 means at least 63).
    pub reachable: [[bool; 64]; 64],
}

impl Default for YahtzeeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl YahtzeeContext {
    /// Empty tables; fill with [`crate::phase0_tables::precompute_lookup_tables`].
    pub fn new() -> Self {
        Self {
            all_keeps: Vec::with_capacity(NUM_ROLLS),
            keep_index: vec![NO_INDEX; MAX_ROLL],
            all_dice_sets: Vec::with_capacity(NUM_COMPLETED_ROLLS),
            dice_set_index: vec![NO_INDEX; MAX_ROLL],
            dice_set_probabilities: Vec::with_capacity(NUM_COMPLETED_ROLLS),
            precomputed_scores: Vec::with_capacity(NUM_COMPLETED_ROLLS),
            keep_table: KeepTable::new(),
            reachable: [[false; 64]; 64],
        }
    }

    /// Build a context with every table filled.
    pub fn precomputed() -> Box<Self> {
        let mut ctx = Box::new(Self::new());
        crate::phase0_tables::precompute_lookup_tables(&mut ctx);
        ctx
    }

    /// Every completed roll reachable by re-rolling the dice not in `held`.
    pub fn completions(&self, held: Roll) -> impl Iterator<Item = Roll> + '_ {
        let kid = self.keep_index[held.key() as usize];
        debug_assert_ne!(kid, NO_INDEX, "invalid hold {}", held.key());
        self.keep_table
            .row(kid as usize)
            .map(move |(ds, _)| self.all_dice_sets[ds])
    }

    /// Every partial roll obtainable by setting aside a subset of `roll`.
    pub fn holds(&self, roll: Roll) -> impl Iterator<Item = Roll> + '_ {
        let ds = self.dice_set_index[roll.key() as usize];
        debug_assert_ne!(ds, NO_INDEX, "not a completed roll: {}", roll.key());
        self.keep_table
            .holds(ds as usize)
            .iter()
            .map(move |&kid| self.all_keeps[kid as usize])
    }

    /// P(⊥ → r) for a completed roll.
    pub fn probability(&self, roll: Roll) -> f64 {
        let ds = self.dice_set_index[roll.key() as usize];
        debug_assert_ne!(ds, NO_INDEX, "not a completed roll: {}", roll.key());
        self.dice_set_probabilities[ds as usize]
    }

    /// Whether the upper total of `state` is consistent with its filled upper categories.
    #[inline(always)]
    pub fn is_reachable(&self, state: GameState) -> bool {
        let upper_mask = (state.filled() & UPPER_CATEGORIES_MASK) as usize;
        self.reachable[upper_mask][state.upper_total() as usize]
    }
}
