//! Input/result series kept length-aligned for the chart.

use std::fmt;
use std::sync::Arc;

/// One result position: either a value reported by the server or not yet
/// known. Unknown is distinct from zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Sample {
    Known(f64),
    #[default]
    Unknown,
}

impl Sample {
    pub fn value(&self) -> Option<f64> {
        match self {
            Sample::Known(v) => Some(*v),
            Sample::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Sample::Known(_))
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Known(v) => write!(f, "{v}"),
            Sample::Unknown => f.write_str("?"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Immutable view of both series. `result.len() == input.len()` always.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesSnapshot {
    pub input: Vec<f64>,
    pub result: Vec<Sample>,
}

impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        (1..=self.input.len()).map(|i| format!("Item {i}")).collect()
    }

    pub fn known_results(&self) -> usize {
        self.result.iter().filter(|s| s.is_known()).count()
    }

    /// Largest magnitude across both series, for chart scaling
    pub fn max_magnitude(&self) -> f64 {
        self.input
            .iter()
            .copied()
            .chain(self.result.iter().filter_map(Sample::value))
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// Owner of the paired series. Every mutation swaps in a whole new
/// snapshot, so readers never see input and result of different lengths.
#[derive(Debug, Clone, Default)]
pub struct SeriesSynchronizer {
    current: Arc<SeriesSnapshot>,
    revision: u64,
}

impl SeriesSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the input series and reset every result to unknown.
    pub fn set_input(&mut self, values: Vec<f64>) {
        let result = vec![Sample::Unknown; values.len()];
        self.current = Arc::new(SeriesSnapshot {
            input: values,
            result,
        });
        self.revision += 1;
    }

    /// Replace the result series if it lines up with the current input.
    pub fn set_result(&mut self, values: Vec<f64>) -> Result<(), SeriesError> {
        let expected = self.current.input.len();
        if values.len() != expected {
            return Err(SeriesError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }

        self.current = Arc::new(SeriesSnapshot {
            input: self.current.input.clone(),
            result: values.into_iter().map(Sample::Known).collect(),
        });
        self.revision += 1;
        Ok(())
    }

    pub fn snapshot(&self) -> Arc<SeriesSnapshot> {
        Arc::clone(&self.current)
    }

    /// Bumped on every applied mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
