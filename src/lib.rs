//! Trust aggregation engine
//!
//! Given a `Subject` identifier (an AI agent, a code repository, a wallet, a
//! social handle, or a published skill), the pipeline resolves its identity
//! cohort, fans out to pluggable signal providers, fuses the results with
//! Subjective Logic, and returns a bounded trust score, confidence, risk
//! bucket, and machine-actionable recommendation.

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod providers;
pub mod result;
pub mod scoring;
pub mod signal;
pub mod subject;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{ConstructOptions, EvaluationContext, Pipeline};
pub use result::TrustResult;
pub use subject::{Subject, SubjectKey, SubjectType};
