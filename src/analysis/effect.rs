//! Directional effect of levels and level pairs.
//!
//! Columns of a one-hot group are mutually exclusive, so their interaction
//! mass is summed over the whole group ("label" = group); each multi-hot
//! column is its own label.

use std::ops::Range;

use serde::Serialize;

use super::Summary;
use crate::data::FeatureMatrix;
use crate::explainability::ShapInteractionValues;
use crate::features::{FeatureLayout, GroupKind};

/// Columns whose interaction mass is attributed to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectLabel {
    pub name: String,
    pub columns: Range<usize>,
}

/// One row of the effect table. `feature_2` is empty for single levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectRow {
    pub feature_1: String,
    pub feature_2: Option<String>,
    pub mean: f64,
    pub sd: f64,
    pub se: f64,
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
}

/// Label of every column.
pub fn effect_labels(layout: &FeatureLayout) -> Vec<EffectLabel> {
    let names = layout.column_names();
    layout
        .groups()
        .iter()
        .flat_map(|group| {
            group.columns.clone().map(move |c| match group.kind {
                GroupKind::OneHot => EffectLabel { name: group.name.clone(), columns: group.columns.clone() },
                GroupKind::MultiHot => EffectLabel { name: names[c].clone(), columns: c..c + 1 },
            })
        })
        .collect()
}

/// Effect of each level (solo) and each compatible pair of levels (combo).
///
/// For the rows where the level(s) are present:
/// - solo `c`: `block(l, l)`,
/// - combo `(c1, c2)`: `block(l1, l1) + block(l2, l2) + 2·block(l1, l2)`.
///
/// `mean`, `lower` and `upper` are shifted by `base` (the mean prediction);
/// `sd` uses the population denominator, `se` the sample one. Entries backed
/// by one row or none are omitted. Solo rows come first, then pairs, both in
/// column order.
pub fn effect_table(
    shap: &ShapInteractionValues,
    features: &FeatureMatrix,
    layout: &FeatureLayout,
    base: f64,
) -> Vec<EffectRow> {
    debug_assert_eq!(shap.n_samples(), features.n_rows());
    let labels = effect_labels(layout);
    let names = layout.column_names();
    let n_cols = labels.len().min(shap.n_features());
    let block = |row: usize, a: &EffectLabel, b: &EffectLabel| shap.block_sum(row, a.columns.clone(), b.columns.clone());

    let mut table = Vec::new();

    for c in 0..n_cols {
        let label = &labels[c];
        let values: Vec<f64> = features.active_rows(c).into_iter().map(|row| block(row, label, label)).collect();
        if let Some(row) = effect_row(&values, base, names[c].clone(), None) {
            table.push(row);
        }
    }

    for c1 in 0..n_cols {
        for c2 in c1 + 1..n_cols {
            if layout.are_exclusive(c1, c2) {
                continue;
            }
            let (l1, l2) = (&labels[c1], &labels[c2]);
            let values: Vec<f64> = (0..features.n_rows())
                .filter(|&row| features.is_active(row, c1) && features.is_active(row, c2))
                .map(|row| block(row, l1, l1) + block(row, l2, l2) + 2.0 * block(row, l1, l2))
                .collect();
            if let Some(row) = effect_row(&values, base, names[c1].clone(), Some(names[c2].clone())) {
                table.push(row);
            }
        }
    }

    table
}

fn effect_row(values: &[f64], base: f64, feature_1: String, feature_2: Option<String>) -> Option<EffectRow> {
    if values.len() <= 1 {
        return None;
    }
    let s = Summary::compute(values, 0)?.shifted(base);
    Some(EffectRow {
        feature_1,
        feature_2,
        mean: s.mean,
        sd: s.sd,
        se: s.se,
        lower: s.lower,
        upper: s.upper,
        n: s.n,
    })
}
