//! Unique-path bookkeeping for TreeSHAP.
//!
//! A path holds one element per distinct feature split on between the root
//! and the current node. `pweight` is the permutation weight of subsets of
//! each size; element 0 is a placeholder for the root.

/// Feature index of the root placeholder element.
pub(super) const ROOT_FEATURE: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct PathElement {
    pub feature: usize,
    /// Fraction of zero paths (feature absent) flowing through this branch.
    pub zero_fraction: f64,
    /// Fraction of one paths (feature present) flowing through this branch.
    pub one_fraction: f64,
    pub pweight: f64,
}

impl Default for PathElement {
    fn default() -> Self {
        Self {
            feature: ROOT_FEATURE,
            zero_fraction: 0.0,
            one_fraction: 0.0,
            pweight: 0.0,
        }
    }
}

/// Buffer length needed for trees of the given depth.
pub(super) fn path_buffer_len(max_depth: usize) -> usize {
    let maxd = max_depth + 2;
    maxd * (maxd + 1) / 2
}

/// Append a split to `path[..=depth]`, updating permutation weights.
pub(super) fn extend_path(path: &mut [PathElement], depth: usize, zero_fraction: f64, one_fraction: f64, feature: usize) {
    path[depth] = PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if depth == 0 { 1.0 } else { 0.0 },
    };
    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / denom;
        path[i].pweight = zero_fraction * path[i].pweight * (depth - i) as f64 / denom;
    }
}

/// Remove element `index` from `path[..=depth]`, undoing [`extend_path`].
pub(super) fn unwind_path(path: &mut [PathElement], depth: usize, index: usize) {
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (depth - i) as f64 / denom;
        } else {
            path[i].pweight = path[i].pweight * denom / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight of the path with element `index` removed,
/// without modifying it.
pub(super) fn unwound_path_sum(path: &[PathElement], depth: usize, index: usize) -> f64 {
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * (depth - i) as f64 / denom;
        } else if zero_fraction != 0.0 {
            total += path[i].pweight / zero_fraction / ((depth - i) as f64 / denom);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unwind_reverses_extend() {
        let mut path = vec![PathElement::default(); 8];
        extend_path(&mut path, 0, 1.0, 1.0, ROOT_FEATURE);
        extend_path(&mut path, 1, 0.4, 1.0, 3);
        let snapshot = path[..2].to_vec();

        extend_path(&mut path, 2, 0.7, 0.0, 5);
        unwind_path(&mut path, 2, 2);

        for (a, b) in path[..2].iter().zip(&snapshot) {
            assert_eq!(a.feature, b.feature);
            assert_abs_diff_eq!(a.pweight, b.pweight, epsilon = 1e-12);
        }
    }

    #[test]
    fn unwound_sum_matches_unwind() {
        let mut path = vec![PathElement::default(); 8];
        extend_path(&mut path, 0, 1.0, 1.0, ROOT_FEATURE);
        extend_path(&mut path, 1, 0.4, 1.0, 3);
        extend_path(&mut path, 2, 0.7, 0.0, 5);

        let sum = unwound_path_sum(&path, 2, 1);
        let mut unwound = path.clone();
        unwind_path(&mut unwound, 2, 1);
        let expected: f64 = unwound[..2].iter().map(|e| e.pweight).sum();
        assert_abs_diff_eq!(sum, expected, epsilon = 1e-12);
    }

    #[test]
    fn buffer_len_grows_quadratically() {
        assert_eq!(path_buffer_len(0), 3);
        assert_eq!(path_buffer_len(10), 78);
    }
}
