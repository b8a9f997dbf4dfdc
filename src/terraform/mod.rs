//! Terraform state interpretation
//!
//! Two independent pipelines share one loaded [`StateDocument`]:
//!
//! - [`extract`] reads profile tags from the first module and returns
//!   [`ProfileBindings`]. A tag on an unsupported resource type is an error.
//! - [`ControlGenerator`] turns every resource with a known InSpec resource
//!   type into a [`Control`](crate::inspec::Control). Unknown types are skipped.
//!
//! # Usage
//!
//! ```ignore
//! use iggy::diagnostics::TracingDiagnostics;
//! use iggy::inspec::Catalog;
//! use iggy::terraform::{extract, ControlGenerator, StateDocument};
//!
//! let doc = StateDocument::load("terraform.tfstate", &TracingDiagnostics)?;
//!
//! for (key, binding) in extract(&doc, &TracingDiagnostics)? {
//!     println!("{}: {}", key, binding.exec_command());
//! }
//!
//! let catalog = Catalog::builtin();
//! let controls = ControlGenerator::new(&catalog, &TracingDiagnostics)
//!     .generate(&doc, doc.path())?;
//! ```
//!
//! # State format
//!
//! ```text
//! { "modules": [ { "resources": { "<handle>": {
//!     "type": "aws_instance",
//!     "primary": { "id": "i-...", "attributes": { "<dotted.key>": "<string>" } }
//! } } } ] }
//! ```

mod extract;
mod generate;
mod state;

pub use extract::{
    extract, ProfileBinding, ProfileBindings, DEFAULT_VPC_AZ, TAG_NAME_PREFIX, TAG_URL_PREFIX,
};
pub use generate::{generate, ControlGenerator, GENERATED_IMPACT};
pub use state::{Attributes, Module, Primary, Resource, ResourceTable, StateDocument};
