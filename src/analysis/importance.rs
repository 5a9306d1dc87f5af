//! Grouped interaction importance.

use ndarray::Array2;
use serde::Serialize;

use super::Summary;
use crate::explainability::ShapInteractionValues;
use crate::features::{FeatureGroup, FeatureLayout};

/// One row of the importance table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceRow {
    pub feature_1: String,
    pub feature_2: String,
    pub mean: f64,
    pub sd: f64,
    pub se: f64,
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
}

/// Unordered group pairs `(a, b)` with `a <= b`, in layout order.
pub fn group_pairs(n_groups: usize) -> Vec<(usize, usize)> {
    (0..n_groups).flat_map(|a| (a..n_groups).map(move |b| (a, b))).collect()
}

/// Interaction mass of every group pair for every row.
///
/// Returns `[n_rows, n_pairs]` with pairs ordered as [`group_pairs`]; each
/// entry is the sum of the `[a-columns × b-columns]` block of that row.
pub fn group_pair_sums(shap: &ShapInteractionValues, groups: &[FeatureGroup]) -> Array2<f64> {
    let pairs = group_pairs(groups.len());
    Array2::from_shape_fn((shap.n_samples(), pairs.len()), |(row, p)| {
        let (a, b) = pairs[p];
        shap.block_sum(row, groups[a].columns.clone(), groups[b].columns.clone())
    })
}

/// Summary of `|block sum|` over all rows, per group pair.
///
/// `sd` and `se` use the sample (n − 1) denominator.
pub fn importance_table(shap: &ShapInteractionValues, layout: &FeatureLayout) -> Vec<ImportanceRow> {
    let groups = layout.groups();
    let sums = group_pair_sums(shap, groups);

    group_pairs(groups.len())
        .into_iter()
        .zip(sums.columns())
        .filter_map(|((a, b), column)| {
            let magnitudes: Vec<f64> = column.iter().map(|v| v.abs()).collect();
            let s = Summary::compute(&magnitudes, 1)?;
            Some(ImportanceRow {
                feature_1: groups[a].name.clone(),
                feature_2: groups[b].name.clone(),
                mean: s.mean,
                sd: s.sd,
                se: s.se,
                lower: s.lower,
                upper: s.upper,
                n: s.n,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CategoricalRow, FeatureGroupSpec, OneHotEncoder};
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;

    fn layout() -> FeatureLayout {
        let specs = vec![FeatureGroupSpec::one_hot("flag", Some("flag")), FeatureGroupSpec::one_hot("tas", Some("tas"))];
        let rows = vec![
            CategoricalRow::new().level("a").level("short"),
            CategoricalRow::new().level("b").level("long"),
        ];
        OneHotEncoder::fit(specs, &rows).unwrap().layout().clone()
    }

    #[test]
    fn pairs_with_replacement() {
        assert_eq!(group_pairs(3), vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]);
        assert!(group_pairs(0).is_empty());
    }

    #[test]
    fn block_sums_per_pair() {
        let layout = layout();
        // 4 columns: flag_a, flag_b, tas_long, tas_short
        let values = Array3::from_shape_fn((1, 4, 4), |(_, i, j)| (i * 4 + j) as f64);
        let shap = ShapInteractionValues::new(values, 0.0);
        let sums = group_pair_sums(&shap, layout.groups());
        // flag×flag: 0+1+4+5
        assert_abs_diff_eq!(sums[[0, 0]], 10.0);
        // flag×tas: 2+3+6+7
        assert_abs_diff_eq!(sums[[0, 1]], 18.0);
        // tas×tas: 10+11+14+15
        assert_abs_diff_eq!(sums[[0, 2]], 50.0);
    }

    #[test]
    fn importance_uses_magnitudes() {
        let layout = layout();
        let mut values = Array3::zeros((2, 4, 4));
        values[[0, 0, 0]] = -2.0;
        values[[1, 1, 1]] = 4.0;
        let shap = ShapInteractionValues::new(values, 0.0);
        let table = importance_table(&shap, &layout);

        assert_eq!(table.len(), 3);
        let flag = &table[0];
        assert_eq!((flag.feature_1.as_str(), flag.feature_2.as_str()), ("flag", "flag"));
        assert_abs_diff_eq!(flag.mean, 3.0);
        assert_abs_diff_eq!(flag.sd, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(flag.se, 1.0, epsilon = 1e-12);
        assert_eq!(flag.n, 2);
        assert_abs_diff_eq!(table[2].mean, 0.0);
    }
}
