//! Observed / to-predict split.
//!
//! Trips with a port risk assessment form the observed (training) segment;
//! every other trip is scored by the model. The two segments are a strict
//! complement of the input rows.

/// Row indices of the two segments, each in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub observed: Vec<usize>,
    pub unobserved: Vec<usize>,
}

impl Partition {
    /// Total number of partitioned rows.
    pub fn len(&self) -> usize {
        self.observed.len() + self.unobserved.len()
    }

    /// Whether no rows were partitioned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the segments cover `0..n_rows` exactly once.
    pub fn is_complement_of(&self, n_rows: usize) -> bool {
        let mut seen = vec![false; n_rows];
        for &row in self.observed.iter().chain(&self.unobserved) {
            if row >= n_rows || seen[row] {
                return false;
            }
            seen[row] = true;
        }
        seen.into_iter().all(|s| s)
    }
}

/// Split rows by a predicate into observed and unobserved segments.
pub fn partition<T>(rows: &[T], mut is_observed: impl FnMut(&T) -> bool) -> Partition {
    let mut out = Partition::default();
    for (i, row) in rows.iter().enumerate() {
        if is_observed(row) {
            out.observed.push(i);
        } else {
            out.unobserved.push(i);
        }
    }
    out
}
