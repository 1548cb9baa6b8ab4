//! Layout engine for resolving placement commands into coordinates
//!
//! A [`Session`] takes commands one at a time, resolves each against the
//! elements already placed, and appends the result to an immutable log. The
//! finished log is a [`Drawing`] that a rendering backend can export.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod labels;
pub mod shapes;
pub mod transform;
pub mod types;

pub use command::{Command, DotSpec, Endpoint, LabelSpec, MarkerEnd, PlaceCommand, Start};
pub use config::SessionConfig;
pub use engine::Session;
pub use error::LayoutError;
pub use transform::Transform;
pub use types::*;

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// Find similar names within a maximum edit distance, closest first
fn find_similar<'a>(
    names: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = names
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            if dist <= max_distance && dist > 0 {
                Some((dist, name))
            } else {
                None
            }
        })
        .collect();

    // Name breaks ties so suggestions do not depend on map order
    candidates.sort();
    candidates
        .into_iter()
        .map(|(_, name)| name.to_string())
        .take(3)
        .collect()
}
