//! Shared types and computations for the Field Report platform
//!
//! This crate contains the report models, the monitoring metrics and
//! recommendation engine, and the payload normalizer shared between the
//! backend, the browser (via WASM), and other components of the system.

pub mod analysis;
pub mod knowledge;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod recommendation;
pub mod types;
pub mod validation;

pub use analysis::*;
pub use knowledge::*;
pub use metrics::*;
pub use models::*;
pub use normalize::{declared_id, declared_title, detect_kind, normalize_report, NormalizeError};
pub use recommendation::*;
pub use types::*;
pub use validation::*;
