//! Test harness for the exchange model.
//!
//! Shared fixtures, tolerance-aware model comparison and pass/fail oracles
//! used by integration tests across the workspace.
//!
//! # Key Components
//!
//! - [`fixtures`]: reference scenarios built through the public API
//! - [`assertions`]: model equivalence and validity checks with diagnostics
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`report`]: structured text model descriptions
//! - [`helpers`]: error type, reference constructors, profile builders,
//!   round-trip drivers

pub mod assertions;
pub mod fixtures;
pub mod helpers;
pub mod oracle;
pub mod report;

pub use assertions::{assert_models_equivalent, model_differences};
pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::ModelReport;
