//! InSpec control generation
//!
//! Walks every resource of every module in document order. A resource whose
//! type (after catalog translation) names a known InSpec resource gets one
//! control: an existence check, then one equality check per attribute that
//! the InSpec resource exposes as a property. Unknown types are skipped
//! without error.

use std::path::{Path, PathBuf};

use super::state::{Resource, StateDocument};
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::error::Result;
use crate::inspec::{Assertion, Control, Describe, ResourceCatalog};
use crate::VERSION;

/// Impact assigned to every generated control
pub const GENERATED_IMPACT: f64 = 1.0;

/// Builds controls for the resources of a state document
pub struct ControlGenerator<'c> {
    catalog: &'c dyn ResourceCatalog,
    diagnostics: &'c dyn Diagnostics,
}

impl<'c> ControlGenerator<'c> {
    pub fn new(catalog: &'c dyn ResourceCatalog, diagnostics: &'c dyn Diagnostics) -> Self {
        Self {
            catalog,
            diagnostics,
        }
    }

    /// Generate controls for every recognized resource
    ///
    /// `source_path` is recorded (made absolute) in each control description.
    pub fn generate(&self, doc: &StateDocument, source_path: &Path) -> Result<Vec<Control>> {
        let source = absolute(source_path);
        let table = doc.resources()?;

        let mut controls = Vec::new();
        for module in table.modules() {
            let module = module?;
            for resource in module.resources() {
                if let Some(control) = self.control_for(resource, &source)? {
                    controls.push(control);
                }
            }
        }

        self.diagnostics.record(&DiagnosticEvent::ControlsGenerated {
            count: controls.len(),
        });
        Ok(controls)
    }

    /// Resolve the InSpec type for a raw Terraform type
    pub fn resolve_type<'a>(&'a self, raw_type: &'a str) -> &'a str {
        match self.catalog.translate(raw_type) {
            Some(translated) => {
                self.diagnostics.record(&DiagnosticEvent::TypeTranslated {
                    from: raw_type.to_string(),
                    to: translated.to_string(),
                });
                translated
            }
            None => raw_type,
        }
    }

    /// Build the control for one resource, `None` if its type is unknown
    ///
    /// The `primary` record is only read once the type is known to the
    /// catalog, so the body of a skipped resource is never validated.
    fn control_for(&self, resource: &Resource<'_>, source: &Path) -> Result<Option<Control>> {
        let resource_type = self.resolve_type(resource.resource_type());

        if !self.catalog.is_known(resource_type) {
            self.diagnostics.record(&DiagnosticEvent::ResourceSkipped {
                resource_type: resource_type.to_string(),
            });
            return Ok(None);
        }

        let primary = resource.primary()?;
        let id = primary.id();
        self.diagnostics.record(&DiagnosticEvent::ResourceMatched {
            resource_type: resource_type.to_string(),
            resource_id: id.to_string(),
        });

        let name = format!("{}::{}", resource_type, id);
        let mut control = Control::new(name.clone(), format!("Iggy {}", name), GENERATED_IMPACT);
        control.set_description(format!(
            "{} from the source file {}\nGenerated by Iggy v{}",
            name,
            source.display(),
            VERSION
        ));

        let mut describe = Describe::new(resource_type, id);
        describe.add(Assertion::Exist);

        for (attr, value) in primary.attributes().iter() {
            if self.catalog.has_property(resource_type, attr) {
                self.diagnostics.record(&DiagnosticEvent::PropertyMatched {
                    resource_type: resource_type.to_string(),
                    property: attr.to_string(),
                });
                describe.add(Assertion::Eq {
                    property: attr.to_string(),
                    expected: value.to_string(),
                });
            } else {
                self.diagnostics.record(&DiagnosticEvent::PropertySkipped {
                    resource_type: resource_type.to_string(),
                    property: attr.to_string(),
                });
            }
        }

        control.add_describe(describe);
        Ok(Some(control))
    }
}

/// Generate controls with a one-off generator
pub fn generate(
    doc: &StateDocument,
    source_path: &Path,
    catalog: &dyn ResourceCatalog,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<Control>> {
    ControlGenerator::new(catalog, diagnostics).generate(doc, source_path)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
