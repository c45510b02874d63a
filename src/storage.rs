//! Text export of the E_table state values.
//!
//! One line per computed state with a nonzero value, ascending by key:
//!
//! ```text
//! <game-state key>\t<expected value>
//! ```
//!
//! Values are written with `f64`'s shortest round-trip representation, so
//! [`load_state_values`] reproduces the exported cache exactly.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use log::info;

use crate::error::StorageError;
use crate::types::{GameState, StateValues};

/// Write every computed, nonzero state value to `path`. Returns the number of lines written.
pub fn save_state_values(values: &StateValues, path: &Path) -> Result<usize, StorageError> {
    let start = Instant::now();
    let create_err = |source| StorageError::Create {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(create_err)?;
    }
    let file = File::create(path).map_err(create_err)?;

    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(file);
    let mut written = 0usize;
    for (state, value) in values.iter_computed() {
        if state.is_game_over() || value == 0.0 {
            continue;
        }
        writeln!(out, "{}\t{}", state.key(), value).map_err(write_err)?;
        written += 1;
    }
    out.flush().map_err(write_err)?;

    info!(
        "Saved {} state values to {} in {:.2}s",
        written,
        path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(written)
}

/// Read a table written by [`save_state_values`] into a fresh cache.
pub fn load_state_values(path: &Path) -> Result<StateValues, StorageError> {
    let start = Instant::now();
    let read_err = |source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(read_err)?);

    let mut values = StateValues::new();
    let mut loaded = 0usize;
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(read_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let parse_err = |reason: String| StorageError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            reason,
        };
        let (key, value) = line
            .split_once('\t')
            .ok_or_else(|| parse_err("expected '<key>\\t<value>'".to_string()))?;
        let state = key
            .parse::<u32>()
            .ok()
            .and_then(GameState::from_key)
            .ok_or_else(|| parse_err(format!("invalid game-state key '{}'", key)))?;
        let value = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| parse_err(format!("invalid value '{}'", value)))?;
        values.set(state, value);
        loaded += 1;
    }

    info!(
        "Loaded {} state values from {} in {:.2}s",
        loaded,
        path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("yahtzee-storage-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_save_and_load() {
        let mut values = StateValues::new();
        let a = GameState::new(1 << CATEGORY_CHANCE, false, 0);
        let b = GameState::new(1 << CATEGORY_YAHTZEE, true, 0);
        let c = GameState::new(1 << CATEGORY_SIXES, false, 30);
        values.set(c, 12.345678901234567);
        values.set(a, 70.0 / 3.0);
        values.set(b, 0.0);

        let path = temp_path("round_trip.txt");
        let written = save_state_values(&values, &path).unwrap();
        assert_eq!(written, 2);

        let text = fs::read_to_string(&path).unwrap();
        let keys: Vec<u32> = text
            .lines()
            .map(|l| l.split('\t').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(keys, vec![a.key(), c.key()]);

        let loaded = load_state_values(&path).unwrap();
        assert_eq!(loaded.get(a), Some(70.0 / 3.0));
        assert_eq!(loaded.get(c), Some(12.345678901234567));
        assert_eq!(loaded.get(b), None);
        assert_eq!(loaded.num_computed(), 2);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unwritable_path() {
        let dir = temp_path("not_a_file");
        fs::create_dir_all(&dir).unwrap();
        let err = save_state_values(&StateValues::new(), &dir).unwrap_err();
        assert!(matches!(err, StorageError::Create { .. }));
    }

    #[test]
    fn test_load_rejects_bad_lines() {
        let path = temp_path("bad.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "2048\t23.3\n16384\t1.0\n").unwrap();
        match load_state_values(&path) {
            Err(StorageError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other.map(|v| v.num_computed())),
        }
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_state_values(&temp_path("missing.txt"));
        assert!(matches!(result, Err(StorageError::Read { .. })));
    }
}
