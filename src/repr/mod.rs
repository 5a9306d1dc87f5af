//! Canonical model representations.
//!
//! Runtime structures shared by training, inference, explainability and
//! persistence. Only tree ensembles are represented.

pub mod gbdt;
