//! # Iggy
//!
//! Turns Terraform state into InSpec compliance content.
//!
//! A state snapshot describes every provisioned resource with its type, id and
//! flattened attributes. Iggy derives two things from it:
//!
//! - **Profile bindings**: resources tagged with `iggy_name_<n>` /
//!   `iggy_url_<n>` name an external InSpec profile to run against them.
//! - **Generated controls**: every resource with a matching InSpec resource
//!   gets a control asserting that it exists and that its known properties
//!   still hold the values recorded in the state.
//!
//! ## Quick Start
//!
//! ```ignore
//! use iggy::diagnostics::TracingDiagnostics;
//! use iggy::inspec::Catalog;
//! use iggy::terraform::{ControlGenerator, StateDocument};
//!
//! let doc = StateDocument::load("terraform.tfstate", &TracingDiagnostics)?;
//! let catalog = Catalog::builtin();
//! let controls = ControlGenerator::new(&catalog, &TracingDiagnostics)
//!     .generate(&doc, doc.path())?;
//!
//! for control in &controls {
//!     print!("{}", control.to_ruby());
//! }
//! ```

pub mod diagnostics;
mod error;
pub mod inspec;
pub mod observability;
pub mod terraform;

/// Version recorded in generated control descriptions
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports
pub use error::{ErrorKind, IggyError, Result};
