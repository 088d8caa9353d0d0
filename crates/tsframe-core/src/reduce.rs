//! Reductions shared by resampling, rolling windows and grouping.

use serde::{Deserialize, Serialize};

/// How missing values inside a reduction are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Any missing input makes the result missing.
    #[default]
    Propagate,
    /// Missing inputs are ignored.
    Skip,
}

/// A reduction of many values to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Sum of values.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Number of non-missing values.
    Count,
    /// First value.
    First,
    /// Last value.
    Last,
    /// Median value.
    Median,
    /// Sample standard deviation (n - 1 denominator).
    Std,
}

impl Reduction {
    /// The value of this reduction over no input, if it has one.
    ///
    /// Only `Sum` (0) and `Count` (0) have an identity; every other
    /// reduction of nothing is undefined.
    #[must_use]
    pub const fn identity(&self) -> Option<f64> {
        match self {
            Self::Sum | Self::Count => Some(0.0),
            _ => None,
        }
    }

    /// Reduces `values`.
    ///
    /// `Count` always reports the number of non-missing values. Every other
    /// reduction returns `None` when it sees a missing value under
    /// [`MissingPolicy::Propagate`], or when nothing is left to reduce.
    #[must_use]
    pub fn apply<I>(&self, values: I, missing: MissingPolicy) -> Option<f64>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut observed = Vec::new();
        let mut saw_missing = false;
        for value in values {
            match value {
                Some(v) => observed.push(v),
                None => saw_missing = true,
            }
        }

        if *self == Self::Count {
            return Some(observed.len() as f64);
        }
        if (saw_missing && missing == MissingPolicy::Propagate) || observed.is_empty() {
            return None;
        }

        let n = observed.len() as f64;
        match self {
            Self::Sum => Some(observed.iter().sum()),
            Self::Mean => Some(observed.iter().sum::<f64>() / n),
            Self::Min => observed.iter().copied().reduce(f64::min),
            Self::Max => observed.iter().copied().reduce(f64::max),
            Self::First => observed.first().copied(),
            Self::Last => observed.last().copied(),
            Self::Median => {
                observed.sort_by(f64::total_cmp);
                let mid = observed.len() / 2;
                if observed.len() % 2 == 0 {
                    Some((observed[mid - 1] + observed[mid]) / 2.0)
                } else {
                    Some(observed[mid])
                }
            }
            Self::Std => {
                if observed.len() < 2 {
                    return None;
                }
                let mean = observed.iter().sum::<f64>() / n;
                let ss: f64 = observed.iter().map(|v| (v - mean).powi(2)).sum();
                Some((ss / (n - 1.0)).sqrt())
            }
            Self::Count => Some(n),
        }
    }
}
