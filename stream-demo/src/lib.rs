//! Small programs written as lazy-streams pipelines.
//!
//! Each function builds one pipeline and forces just enough of it to
//! produce its answer.

use std::fs;
use std::path::Path;

use lazy_streams::{
    Pipe, PipelineError, drop, filter, gseq, items, mapmethod, reduce, reduce_from, repeatcall,
    takewhile,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type Result<T> = std::result::Result<T, DemoError>;

/// The first `count` partial sums of `1 + ratio + ratio^2 + ...`.
pub fn partial_sums(ratio: f64, count: usize) -> Result<Vec<f64>> {
    let sums = gseq(&[ratio])?
        .pipe(reduce(|a: f64, b: f64| a + b))
        .pipe(items(count));
    debug!(ratio, count = sums.len(), "partial sums computed");
    Ok(sums)
}

type Point = [i64; 2];

const ORIGIN: Point = [0, 0];
const DIRECTIONS: [Point; 4] = [[0, 1], [1, 0], [0, -1], [-1, 0]];

/// Outcome of one random walk on the integer grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// Steps taken to get back to the origin, if it happened within the
    /// step limit.
    pub returned_after: Option<usize>,
    /// Position furthest from the origin, by Euclidean distance.
    pub farthest: Point,
}

/// Walk from the origin in random unit steps until the walk comes back or
/// `max_steps` have been taken.
pub fn random_walk(seed: u64, max_steps: usize) -> WalkReport {
    let mut rng = StdRng::seed_from_u64(seed);
    let step = move |directions: &[Point; 4]| {
        directions.choose(&mut rng).copied().unwrap_or(ORIGIN)
    };

    // the scan emits the origin first; drop it so the walk can end there
    let away: Vec<Point> = repeatcall(step, DIRECTIONS)
        .pipe(reduce_from(|a: Point, b: Point| [a[0] + b[0], a[1] + b[1]], ORIGIN))
        .pipe(drop(1))
        .pipe(takewhile(|p: &Point| *p != ORIGIN))
        .pipe(items(max_steps));

    let returned_after = (away.len() < max_steps).then_some(away.len() + 1);
    let farthest = away
        .iter()
        .copied()
        .max_by_key(|[x, y]| x * x + y * y)
        .unwrap_or(ORIGIN);

    info!(seed, ?returned_after, ?farthest, "walk finished");
    WalkReport {
        returned_after,
        farthest,
    }
}

/// Lines of the file at `path` containing `pattern`, with surrounding
/// whitespace removed.
pub fn grep_lines(path: &Path, pattern: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| DemoError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    let total = lines.len();

    let pattern = pattern.to_string();
    let matched = lines
        .pipe(filter(move |line: &String| line.contains(&pattern)))
        .pipe(mapmethod("strip", Vec::new()))
        .map(|stripped| {
            stripped.map(|value| match value {
                Value::String(line) => line,
                other => other.to_string(),
            })
        })
        .collect::<std::result::Result<Vec<String>, PipelineError>>()?;

    debug!(total, matched = matched.len(), "lines filtered");
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_sums() {
        assert_eq!(partial_sums(0.5, 4).unwrap(), vec![1.0, 1.5, 1.75, 1.875]);
        assert!(partial_sums(0.5, 0).unwrap().is_empty());
    }

    #[test]
    fn test_partial_sums_integral_ratio() {
        assert_eq!(partial_sums(2.0, 5).unwrap(), vec![1.0, 3.0, 7.0, 15.0, 31.0]);
    }

    #[test]
    fn test_walk_cannot_return_in_one_step() {
        let report = random_walk(7, 1);
        assert_eq!(report.returned_after, None);
        let [x, y] = report.farthest;
        assert_eq!(x.abs() + y.abs(), 1);
    }

    #[test]
    fn test_walk_return_is_even() {
        for seed in 0..20 {
            let report = random_walk(seed, 500);
            if let Some(steps) = report.returned_after {
                assert!(steps >= 2);
                assert_eq!(steps % 2, 0);
            }
        }
    }

    #[test]
    fn test_walk_is_reproducible() {
        assert_eq!(random_walk(42, 200), random_walk(42, 200));
    }

    #[test]
    fn test_grep_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  foo 1").unwrap();
        writeln!(file, "bar").unwrap();
        writeln!(file, "\tfoo 2  ").unwrap();
        file.flush().unwrap();

        let found = grep_lines(file.path(), "foo").unwrap();
        assert_eq!(found, vec!["foo 1", "foo 2"]);
    }

    #[test]
    fn test_grep_no_match() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "alpha\nbeta").unwrap();
        file.flush().unwrap();

        assert!(grep_lines(file.path(), "gamma").unwrap().is_empty());
    }

    #[test]
    fn test_grep_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = grep_lines(&dir.path().join("absent.txt"), "x").unwrap_err();
        assert!(matches!(err, DemoError::Io { .. }));
    }
}
