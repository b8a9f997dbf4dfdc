//! Terraform state document loading and the resource view over it
//!
//! Loading only checks that the input is a regular file holding valid JSON.
//! Structural checks happen when a pipeline walks the [`ResourceTable`]:
//! `modules` when the table is built, `resources` and each resource `type`
//! when a module is visited, and `primary`, `id` and `attributes` only when
//! a resource's [`Primary`] record is requested.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::error::{IggyError, Result};

/// A parsed Terraform state snapshot
///
/// The document is immutable once loaded and can be shared read-only
/// between pipelines.
#[derive(Debug, Clone)]
pub struct StateDocument {
    /// Where the document came from (used in diagnostics and control descriptions)
    path: PathBuf,

    /// Parsed JSON, object key order preserved
    root: Value,
}

impl StateDocument {
    /// Load a state document from a file path
    pub fn load(path: impl AsRef<Path>, diagnostics: &dyn Diagnostics) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(IggyError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| IggyError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = Self::from_slice(&bytes, path)?;
        diagnostics.record(&DiagnosticEvent::DocumentLoaded {
            path: path.to_path_buf(),
            bytes: bytes.len(),
        });
        Ok(doc)
    }

    /// Parse a state document from raw bytes
    pub fn from_slice(bytes: &[u8], path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = serde_json::from_slice(bytes).map_err(|e| IggyError::MalformedDocument {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// Parse a state document from a JSON string
    pub fn from_json(content: &str, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_slice(content.as_bytes(), path)
    }

    /// Source path of this document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw parsed JSON
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Build the resource view, checking the top-level `modules` shape
    pub fn resources(&self) -> Result<ResourceTable<'_>> {
        ResourceTable::new(self)
    }
}

/// Read-only view over the modules and resources of a [`StateDocument`]
#[derive(Debug, Clone, Copy)]
pub struct ResourceTable<'a> {
    path: &'a Path,
    modules: &'a [Value],
}

impl<'a> ResourceTable<'a> {
    /// Create a view, requiring a non-empty `modules` array at the root
    pub fn new(doc: &'a StateDocument) -> Result<Self> {
        let path = doc.path();
        let root = doc
            .root()
            .as_object()
            .ok_or_else(|| IggyError::schema(path, "modules", "document root is not an object"))?;

        let modules = root
            .get("modules")
            .ok_or_else(|| IggyError::schema(path, "modules", "document root has no modules"))?
            .as_array()
            .ok_or_else(|| IggyError::schema(path, "modules", "modules is not an array"))?;

        if modules.is_empty() {
            return Err(IggyError::schema(path, "modules", "modules array is empty"));
        }

        Ok(Self {
            path,
            modules: modules.as_slice(),
        })
    }

    /// Number of modules in the document
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Validate and return the module at `index`
    pub fn module(&self, index: usize) -> Result<Module<'a>> {
        let value = self.modules.get(index).ok_or_else(|| {
            IggyError::schema(
                self.path,
                "modules",
                format!("module {} does not exist", index),
            )
        })?;
        Module::parse(self.path, index, value)
    }

    /// Validate and return every module in document order
    pub fn modules(&self) -> impl Iterator<Item = Result<Module<'a>>> + '_ {
        (0..self.modules.len()).map(move |index| self.module(index))
    }
}

/// One module of the state document
#[derive(Debug, Clone)]
pub struct Module<'a> {
    index: usize,
    resources: Vec<Resource<'a>>,
}

impl<'a> Module<'a> {
    fn parse(path: &'a Path, index: usize, value: &'a Value) -> Result<Self> {
        let context = format!("module {}", index);
        let resources = value
            .as_object()
            .ok_or_else(|| IggyError::schema(path, "modules", format!("{} is not an object", context)))?
            .get("resources")
            .ok_or_else(|| IggyError::schema(path, "resources", context.clone()))?
            .as_object()
            .ok_or_else(|| {
                IggyError::schema(path, "resources", format!("{}: resources is not an object", context))
            })?;

        let resources = resources
            .iter()
            .map(|(handle, value)| Resource::parse(path, index, handle, value))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { index, resources })
    }

    /// Position of this module in the document
    pub fn index(&self) -> usize {
        self.index
    }

    /// Resources in document order
    pub fn resources(&self) -> &[Resource<'a>] {
        &self.resources
    }

    /// Look up a resource by its handle (e.g. `aws_instance.web`)
    pub fn get(&self, handle: &str) -> Option<&Resource<'a>> {
        self.resources.iter().find(|r| r.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// A single provisioned resource
///
/// Only the resource `type` is checked when the module is built. The
/// `primary` record is validated by [`Resource::primary`], so a pipeline
/// that skips a resource never trips over its body.
#[derive(Debug, Clone)]
pub struct Resource<'a> {
    path: &'a Path,
    module: usize,
    handle: &'a str,
    resource_type: &'a str,
    body: &'a Map<String, Value>,
}

impl<'a> Resource<'a> {
    fn parse(path: &'a Path, module: usize, handle: &'a str, value: &'a Value) -> Result<Self> {
        let missing = |field: &str| {
            IggyError::schema(path, field, format!("module {}, resource {}", module, handle))
        };

        let body = value.as_object().ok_or_else(|| missing("resources"))?;
        let resource_type = body
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("type"))?;

        Ok(Self {
            path,
            module,
            handle,
            resource_type,
            body,
        })
    }

    /// Resource handle, unique within its module
    pub fn handle(&self) -> &'a str {
        self.handle
    }

    /// Provider resource type (e.g. `aws_instance`)
    pub fn resource_type(&self) -> &'a str {
        self.resource_type
    }

    /// Validate and return the `primary` record (id and attributes)
    pub fn primary(&self) -> Result<Primary<'a>> {
        let context = format!("module {}, resource {}", self.module, self.handle);
        let missing = |field: &str| IggyError::schema(self.path, field, context.clone());

        let primary = self
            .body
            .get("primary")
            .and_then(Value::as_object)
            .ok_or_else(|| missing("primary"))?;

        let id = primary
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("id"))?;

        let attributes = primary
            .get("attributes")
            .and_then(Value::as_object)
            .ok_or_else(|| missing("attributes"))?;

        Ok(Primary {
            id,
            attributes: Attributes::parse(self.path, &context, attributes)?,
        })
    }
}

/// The `primary` record of a resource
#[derive(Debug, Clone)]
pub struct Primary<'a> {
    id: &'a str,
    attributes: Attributes<'a>,
}

impl<'a> Primary<'a> {
    /// Primary id
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// Flattened attribute table
    pub fn attributes(&self) -> &Attributes<'a> {
        &self.attributes
    }
}

/// Flat attribute table with dotted keys such as `tags.Name`
#[derive(Debug, Clone, Default)]
pub struct Attributes<'a> {
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> Attributes<'a> {
    fn parse(path: &Path, context: &str, map: &'a Map<String, Value>) -> Result<Self> {
        let entries = map
            .iter()
            .map(|(key, value)| {
                value.as_str().map(|v| (key.as_str(), v)).ok_or_else(|| {
                    IggyError::schema(
                        path,
                        format!("attributes.{}", key),
                        format!("{}: attribute value is not a string", context),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Value of an attribute, if present
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Attributes in document order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
