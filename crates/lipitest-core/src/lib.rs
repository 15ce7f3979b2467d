//! lipitest-core — round-trip transliteration scoring engine.
//!
//! This crate holds the comparison algorithms (edit distance, sequence
//! alignment, similarity, character classification and loss analysis), the
//! provider trait, the evaluation engine and the data model that the rest of
//! the lipitest workspace builds on.

pub mod align;
pub mod atomic;
pub mod classify;
pub mod compare;
pub mod corpus;
pub mod dataset;
pub mod edit_distance;
pub mod engine;
pub mod error;
pub mod loss;
pub mod model;
pub mod report;
pub mod script;
pub mod similarity;
pub mod statistics;
pub mod traits;
