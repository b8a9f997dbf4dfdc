//! InSpec control object model
//!
//! Just enough of InSpec's control structure to build generated controls,
//! serialize them as JSON and render them as Ruby control files.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Key of the default description
pub const DEFAULT_DESCRIPTION: &str = "default";

/// A compliance control bound to one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    /// Control id (e.g. `aws_vpc::vpc-0a1b2c`)
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Descriptions keyed by label; `default` is rendered as `desc`
    pub descriptions: BTreeMap<String, String>,

    /// Impact between 0.0 and 1.0
    pub impact: f64,

    /// Assertion groups
    pub describes: Vec<Describe>,
}

impl Control {
    pub fn new(id: impl Into<String>, title: impl Into<String>, impact: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            descriptions: BTreeMap::new(),
            impact,
            describes: Vec::new(),
        }
    }

    /// Set the default description
    pub fn set_description(&mut self, text: impl Into<String>) {
        self.descriptions
            .insert(DEFAULT_DESCRIPTION.to_string(), text.into());
    }

    /// The default description, if set
    pub fn description(&self) -> Option<&str> {
        self.descriptions.get(DEFAULT_DESCRIPTION).map(String::as_str)
    }

    pub fn add_describe(&mut self, describe: Describe) {
        self.describes.push(describe);
    }

    /// All assertions flattened to their tuple form, in order
    pub fn assertion_tuples(&self) -> Vec<AssertionTuple<'_>> {
        self.describes
            .iter()
            .flat_map(|d| d.assertions.iter().map(move |a| a.tuple(&d.qualifier)))
            .collect()
    }

    /// Render as an InSpec Ruby control block
    pub fn to_ruby(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "control {} do", ruby_string(&self.id));
        let _ = writeln!(out, "  title {}", ruby_string(&self.title));
        for (label, text) in &self.descriptions {
            if label == DEFAULT_DESCRIPTION {
                let _ = writeln!(out, "  desc {}", ruby_string(text));
            } else {
                let _ = writeln!(out, "  desc {}, {}", ruby_string(label), ruby_string(text));
            }
        }
        let _ = writeln!(out, "  impact {:?}", self.impact);
        for describe in &self.describes {
            out.push_str(&describe.to_ruby("  "));
        }
        out.push_str("end\n");
        out
    }
}

/// The InSpec resource a describe block targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub resource_type: String,
    pub resource_id: String,
}

/// A `describe` block: one qualifier and its assertions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Describe {
    pub qualifier: Qualifier,
    pub assertions: Vec<Assertion>,
}

impl Describe {
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            qualifier: Qualifier {
                resource_type: resource_type.into(),
                resource_id: resource_id.into(),
            },
            assertions: Vec::new(),
        }
    }

    pub fn add(&mut self, assertion: Assertion) {
        self.assertions.push(assertion);
    }

    fn to_ruby(&self, indent: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}describe {}({}) do",
            indent,
            self.qualifier.resource_type,
            ruby_string(&self.qualifier.resource_id)
        );
        for assertion in &self.assertions {
            let line = match assertion {
                Assertion::Exist => "it { should exist }".to_string(),
                Assertion::Eq { property, expected } => format!(
                    "its({}) {{ should eq {} }}",
                    ruby_string(property),
                    ruby_string(expected)
                ),
            };
            let _ = writeln!(out, "{}  {}", indent, line);
        }
        let _ = writeln!(out, "{}end", indent);
        out
    }
}

/// A single check inside a describe block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "matcher", rename_all = "snake_case")]
pub enum Assertion {
    /// The resource exists
    Exist,

    /// A property equals the expected value
    Eq { property: String, expected: String },
}

impl Assertion {
    /// Flatten into the `(type, id, name, operator, expected)` shape
    pub fn tuple<'a>(&'a self, qualifier: &'a Qualifier) -> AssertionTuple<'a> {
        let (name, operator, expected) = match self {
            Self::Exist => ("exist", None, None),
            Self::Eq { property, expected } => {
                (property.as_str(), Some("eq"), Some(expected.as_str()))
            }
        };
        AssertionTuple {
            qualifier_type: &qualifier.resource_type,
            qualifier_id: &qualifier.resource_id,
            name,
            operator,
            expected,
        }
    }
}

/// Flat view of one assertion as consumed by control runners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssertionTuple<'a> {
    pub qualifier_type: &'a str,
    pub qualifier_id: &'a str,
    pub name: &'a str,
    pub operator: Option<&'a str>,
    pub expected: Option<&'a str>,
}

/// Quote a string as a Ruby double-quoted literal
pub fn ruby_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '#' if chars.peek() == Some(&'{') => out.push_str("\\#"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
