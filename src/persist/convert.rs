//! Conversion between runtime types and schema types.
//!
//! Runtime → schema conversions are infallible (`From`); schema → runtime
//! conversions validate (`TryFrom`).

use super::error::PersistError;
use super::schema::{
    EvalHistorySchema, ForestSchema, GBDTConfigSchema, GBDTModelSchema, ModelMetaSchema, TreeSchema,
    VerbositySchema,
};
use crate::model::{GBDTConfig, GBDTModel, ModelMeta};
use crate::repr::gbdt::{Forest, Tree};
use crate::training::{EvalHistory, Verbosity};

// =============================================================================
// Meta
// =============================================================================

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        Self {
            num_features: meta.n_features,
            feature_names: meta.feature_names.clone(),
            objective_name: meta.objective.clone(),
            train_metric: meta.train_metric,
        }
    }
}

impl TryFrom<ModelMetaSchema> for ModelMeta {
    type Error = PersistError;

    fn try_from(schema: ModelMetaSchema) -> Result<Self, Self::Error> {
        if let Some(names) = &schema.feature_names {
            if names.len() != schema.num_features {
                return Err(PersistError::Validation(format!(
                    "{} feature names for {} features",
                    names.len(),
                    schema.num_features
                )));
            }
        }
        Ok(Self {
            feature_names: schema.feature_names,
            n_features: schema.num_features,
            objective: schema.objective_name,
            train_metric: schema.train_metric,
        })
    }
}

// =============================================================================
// Tree / Forest
// =============================================================================

impl From<&Tree> for TreeSchema {
    fn from(tree: &Tree) -> Self {
        let (split_indices, thresholds, left, right, default_left, is_leaf, leaf_values) = tree.arrays();
        Self {
            num_nodes: tree.n_nodes() as u32,
            split_indices: split_indices.to_vec(),
            thresholds: thresholds.iter().map(|&t| t as f64).collect(),
            // Leaves carry no children
            children_left: left.iter().zip(is_leaf).map(|(&c, &leaf)| if leaf { 0 } else { c }).collect(),
            children_right: right.iter().zip(is_leaf).map(|(&c, &leaf)| if leaf { 0 } else { c }).collect(),
            default_left: default_left.to_vec(),
            leaf_values: leaf_values.to_vec(),
            gains: tree.gains().map(<[f64]>::to_vec),
            covers: tree.covers().map(<[f64]>::to_vec),
        }
    }
}

impl TryFrom<TreeSchema> for Tree {
    type Error = PersistError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        let is_leaf: Vec<bool> = schema.children_left.iter().map(|&left| left == 0).collect();
        let mut tree = Tree::new(
            schema.split_indices,
            schema.thresholds.into_iter().map(|t| t as f32).collect(),
            schema.children_left,
            schema.children_right,
            schema.default_left,
            is_leaf,
            schema.leaf_values,
        );
        if let Some(gains) = schema.gains {
            tree = tree.with_gains(gains);
        }
        if let Some(covers) = schema.covers {
            tree = tree.with_covers(covers);
        }
        if tree.n_nodes() != schema.num_nodes as usize {
            return Err(PersistError::Validation(format!(
                "tree declares {} nodes but has {}",
                schema.num_nodes,
                tree.n_nodes()
            )));
        }
        tree.validate().map_err(|e| PersistError::Validation(e.to_string()))?;
        Ok(tree)
    }
}

impl From<&Forest> for ForestSchema {
    fn from(forest: &Forest) -> Self {
        Self {
            base_score: forest.base_score(),
            trees: forest.trees().map(TreeSchema::from).collect(),
        }
    }
}

impl TryFrom<ForestSchema> for Forest {
    type Error = PersistError;

    fn try_from(schema: ForestSchema) -> Result<Self, Self::Error> {
        let mut forest = Forest::new(schema.base_score);
        for tree in schema.trees {
            forest.push_tree(Tree::try_from(tree)?);
        }
        forest.validate().map_err(|e| PersistError::Validation(e.to_string()))?;
        Ok(forest)
    }
}

// =============================================================================
// Config
// =============================================================================

impl From<Verbosity> for VerbositySchema {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Silent => Self::Silent,
            Verbosity::Warning => Self::Warning,
            Verbosity::Info => Self::Info,
            Verbosity::Debug => Self::Debug,
        }
    }
}

impl From<VerbositySchema> for Verbosity {
    fn from(v: VerbositySchema) -> Self {
        match v {
            VerbositySchema::Silent => Self::Silent,
            VerbositySchema::Warning => Self::Warning,
            VerbositySchema::Info => Self::Info,
            VerbositySchema::Debug => Self::Debug,
        }
    }
}

impl From<&GBDTConfig> for GBDTConfigSchema {
    fn from(c: &GBDTConfig) -> Self {
        Self {
            n_trees: c.n_trees,
            learning_rate: c.learning_rate,
            max_depth: c.max_depth,
            min_child_weight: c.min_child_weight,
            lambda: c.lambda,
            min_gain: c.min_gain,
            colsample_bytree: c.colsample_bytree,
            seed: c.seed,
            verbosity: c.verbosity.into(),
            log_every: c.log_every,
        }
    }
}

impl TryFrom<GBDTConfigSchema> for GBDTConfig {
    type Error = PersistError;

    fn try_from(s: GBDTConfigSchema) -> Result<Self, Self::Error> {
        GBDTConfig::builder()
            .n_trees(s.n_trees)
            .learning_rate(s.learning_rate)
            .max_depth(s.max_depth)
            .min_child_weight(s.min_child_weight)
            .lambda(s.lambda)
            .min_gain(s.min_gain)
            .colsample_bytree(s.colsample_bytree)
            .seed(s.seed)
            .verbosity(s.verbosity.into())
            .log_every(s.log_every)
            .build()
            .map_err(|e| PersistError::Validation(e.to_string()))
    }
}

// =============================================================================
// Model
// =============================================================================

impl From<&GBDTModel> for GBDTModelSchema {
    fn from(model: &GBDTModel) -> Self {
        let history = model.eval_history();
        Self {
            meta: model.meta().into(),
            config: model.config().into(),
            forest: model.forest().into(),
            history: (!history.is_empty()).then(|| EvalHistorySchema {
                metric: history.metric.clone(),
                values: history.values.clone(),
            }),
        }
    }
}

impl TryFrom<GBDTModelSchema> for GBDTModel {
    type Error = PersistError;

    fn try_from(schema: GBDTModelSchema) -> Result<Self, Self::Error> {
        let meta = ModelMeta::try_from(schema.meta)?;
        let forest = Forest::try_from(schema.forest)?;
        if forest.n_features_used() > meta.n_features {
            return Err(PersistError::Validation(format!(
                "forest splits on feature {} but the model has {} features",
                forest.n_features_used() - 1,
                meta.n_features
            )));
        }
        let config = GBDTConfig::try_from(schema.config)?;
        let history = schema
            .history
            .map(|h| EvalHistory { metric: h.metric, values: h.values })
            .unwrap_or_default();
        Ok(GBDTModel::from_parts(forest, meta, config, history))
    }
}
