//! Number loading
//!
//! Reads whitespace-separated real numbers from a file or any reader into an
//! ordered `Vec<f64>`. The reduction core never sees malformed input.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Smallest dataset the CLI accepts.
pub const MIN_INPUT_LEN: usize = 2;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to open the file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read input: {0}")]
    Read(#[from] std::io::Error),

    #[error("The file must contain real numbers (token {position}: '{token}')")]
    Malformed { token: String, position: usize },
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Load every number in the file at `path`.
pub fn load_numbers(path: impl AsRef<Path>) -> LoadResult<Vec<f64>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let numbers = parse_numbers(BufReader::new(file))?;
    tracing::debug!(target: "loader", "loaded {} numbers from {}", numbers.len(), path.display());
    Ok(numbers)
}

/// Parse every whitespace-separated token from `reader` as an `f64`.
///
/// `position` in [`LoadError::Malformed`] is the 1-based token index.
pub fn parse_numbers(mut reader: impl Read) -> LoadResult<Vec<f64>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    text.split_ascii_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<f64>().map_err(|_| LoadError::Malformed {
                token: token.to_string(),
                position: i + 1,
            })
        })
        .collect()
}
