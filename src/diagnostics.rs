//! Diagnostic events emitted while interpreting state documents
//!
//! Pipelines report what they matched and skipped through a [`Diagnostics`]
//! sink handed to them by the caller. The default sink forwards to `tracing`,
//! so the CLI controls verbosity with the usual `RUST_LOG` filter.
//!
//! ```ignore
//! use iggy::diagnostics::TracingDiagnostics;
//! use iggy::terraform::{StateDocument, extract};
//!
//! let doc = StateDocument::load("terraform.tfstate", &TracingDiagnostics)?;
//! let bindings = extract(&doc, &TracingDiagnostics)?;
//! ```

use std::path::PathBuf;

/// A single observation made by a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A state document was read and parsed
    DocumentLoaded { path: PathBuf, bytes: usize },

    /// An attribute matched the profile tag convention
    TagMatched { handle: String, attribute: String },

    /// A profile binding was recorded under `key`
    BindingExtracted { key: String, binding_type: String },

    /// A raw resource type was translated through the catalog
    TypeTranslated { from: String, to: String },

    /// A resource type has a matching InSpec resource
    ResourceMatched { resource_type: String, resource_id: String },

    /// A resource type has no matching InSpec resource
    ResourceSkipped { resource_type: String },

    /// An attribute is a known property of the resource type
    PropertyMatched { resource_type: String, property: String },

    /// An attribute is not a known property of the resource type
    PropertySkipped { resource_type: String, property: String },

    /// Generation finished
    ControlsGenerated { count: usize },
}

/// Sink for [`DiagnosticEvent`]s
pub trait Diagnostics {
    fn record(&self, event: &DiagnosticEvent);
}

/// Forwards events to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::DocumentLoaded { path, bytes } => {
                tracing::debug!(path = %path.display(), bytes, "Loaded state document");
            }
            DiagnosticEvent::TagMatched { handle, attribute } => {
                tracing::debug!(%handle, %attribute, "Matched profile tag");
            }
            DiagnosticEvent::BindingExtracted { key, binding_type } => {
                tracing::debug!(%key, %binding_type, "Extracted profile binding");
            }
            DiagnosticEvent::TypeTranslated { from, to } => {
                tracing::debug!(%from, %to, "Translated resource type");
            }
            DiagnosticEvent::ResourceMatched {
                resource_type,
                resource_id,
            } => {
                tracing::debug!(%resource_type, %resource_id, "Resource type matched");
            }
            DiagnosticEvent::ResourceSkipped { resource_type } => {
                tracing::debug!(%resource_type, "Resource type skipped");
            }
            DiagnosticEvent::PropertyMatched {
                resource_type,
                property,
            } => {
                tracing::debug!(%resource_type, %property, "Property matched");
            }
            DiagnosticEvent::PropertySkipped {
                resource_type,
                property,
            } => {
                tracing::trace!(%resource_type, %property, "Property skipped");
            }
            DiagnosticEvent::ControlsGenerated { count } => {
                tracing::debug!(count, "Generated controls");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, _event: &DiagnosticEvent) {}
}
