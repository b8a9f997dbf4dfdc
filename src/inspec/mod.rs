//! InSpec-side data: the resource catalog and the control object model

pub mod catalog;
mod control;

pub use catalog::{Catalog, ResourceCatalog};
pub use control::{
    ruby_string, Assertion, AssertionTuple, Control, Describe, Qualifier, DEFAULT_DESCRIPTION,
};
