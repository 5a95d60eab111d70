//! The case-authoring pipeline: deterministic structure generation,
//! narrative enrichment, and the two offline checkers.

pub mod builder;
pub mod generator;
pub mod rng;
pub mod templates;
pub mod validator;
pub mod verifier;

#[cfg(test)]
pub mod test_support;

pub use builder::{BuildConfig, BuildError, BuildStage, CaseBuilder};
pub use validator::{Severity, ValidationIssue};
pub use verifier::{verify, VerifyReport};
