//! Profile binding extraction
//!
//! Resources in the first module can name InSpec profiles through tags:
//!
//! ```text
//! tags.iggy_name_<name> = <anything>
//! tags.iggy_url_<name>  = <profile url>
//! ```
//!
//! Each `iggy_name_` tag yields one [`ProfileBinding`] keyed by
//! `<resource id>:<name>`. Only `aws_vpc*` and `aws_instance*` types can
//! carry a binding; a tag on any other type is an error because the operator
//! asked for something that cannot be honored.

use std::collections::BTreeMap;

use serde::Serialize;

use super::state::{Primary, Resource, StateDocument};
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::error::{IggyError, Result};

/// Attribute prefix marking a profile name tag
pub const TAG_NAME_PREFIX: &str = "tags.iggy_name_";

/// Attribute prefix of the companion profile URL tag
pub const TAG_URL_PREFIX: &str = "tags.iggy_url_";

/// Availability zone label recorded on VPC bindings
pub const DEFAULT_VPC_AZ: &str = "us-west-2";

/// Extraction result, keyed by `<resource id>:<name>`
pub type ProfileBindings = BTreeMap<String, ProfileBinding>;

/// Where and how to run an externally referenced InSpec profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ProfileBinding {
    /// Profile runs against the AWS API for a VPC
    #[serde(rename = "aws_vpc")]
    AwsVpc { az: String, url: Option<String> },

    /// Profile runs over SSH against an instance
    #[serde(rename = "aws_instance")]
    AwsInstance {
        public_ip: Option<String>,
        key_name: Option<String>,
        url: Option<String>,
    },
}

impl ProfileBinding {
    /// Resource type label of this binding
    pub fn binding_type(&self) -> &'static str {
        match self {
            Self::AwsVpc { .. } => "aws_vpc",
            Self::AwsInstance { .. } => "aws_instance",
        }
    }

    /// Profile URL, if the companion tag was present
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::AwsVpc { url, .. } | Self::AwsInstance { url, .. } => url.as_deref(),
        }
    }

    /// The `inspec exec` invocation for this binding
    pub fn exec_command(&self) -> String {
        let url = self.url().unwrap_or("<profile-url>");
        match self {
            Self::AwsVpc { az, .. } => format!("inspec exec {} -t aws://{}", url, az),
            Self::AwsInstance {
                public_ip,
                key_name,
                ..
            } => {
                let mut cmd = format!(
                    "inspec exec {} -t ssh://{}",
                    url,
                    public_ip.as_deref().unwrap_or("<public-ip>")
                );
                if let Some(key) = key_name {
                    cmd.push_str(" -i ");
                    cmd.push_str(key);
                }
                cmd
            }
        }
    }
}

/// Collect profile bindings from the first module of `doc`
pub fn extract(doc: &StateDocument, diagnostics: &dyn Diagnostics) -> Result<ProfileBindings> {
    let table = doc.resources()?;
    let module = table.module(0)?;

    let mut bindings = ProfileBindings::new();
    for resource in module.resources() {
        let primary = resource.primary()?;
        for (attr, _) in primary.attributes().iter() {
            let Some(name) = attr.strip_prefix(TAG_NAME_PREFIX) else {
                continue;
            };
            diagnostics.record(&DiagnosticEvent::TagMatched {
                handle: resource.handle().to_string(),
                attribute: attr.to_string(),
            });

            if name.is_empty() {
                return Err(IggyError::schema(
                    doc.path(),
                    attr,
                    format!("resource {}: profile tag has no name", resource.handle()),
                ));
            }

            let url = primary
                .attributes()
                .get(&format!("{}{}", TAG_URL_PREFIX, name))
                .map(str::to_string);

            let binding = bind(doc, resource, &primary, url)?;
            let key = format!("{}:{}", primary.id(), name);
            diagnostics.record(&DiagnosticEvent::BindingExtracted {
                key: key.clone(),
                binding_type: binding.binding_type().to_string(),
            });
            // Last write wins on a repeated key
            bindings.insert(key, binding);
        }
    }

    Ok(bindings)
}

fn bind(
    doc: &StateDocument,
    resource: &Resource<'_>,
    primary: &Primary<'_>,
    url: Option<String>,
) -> Result<ProfileBinding> {
    let resource_type = resource.resource_type();

    // Prefix match on purpose: subtypes such as aws_vpc_peering bind like aws_vpc
    if resource_type.starts_with("aws_vpc") {
        Ok(ProfileBinding::AwsVpc {
            az: DEFAULT_VPC_AZ.to_string(),
            url,
        })
    } else if resource_type.starts_with("aws_instance") {
        let attrs = primary.attributes();
        Ok(ProfileBinding::AwsInstance {
            public_ip: attrs.get("public_ip").map(str::to_string),
            key_name: attrs.get("key_name").map(str::to_string),
            url,
        })
    } else {
        Err(IggyError::UnsupportedResource {
            path: doc.path().to_path_buf(),
            resource_id: primary.id().to_string(),
            resource_type: resource_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::RecordingDiagnostics;
    use crate::diagnostics::NoopDiagnostics;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn doc_with(resources: serde_json::Value) -> StateDocument {
        let state = json!({ "version": 3, "modules": [ { "path": ["root"], "resources": resources } ] });
        StateDocument::from_json(&state.to_string(), "terraform.tfstate").unwrap()
    }

    #[test]
    fn test_no_tags_yields_empty_map() {
        let doc = doc_with(json!({
            "aws_instance.web": {
                "type": "aws_instance",
                "primary": { "id": "i-1", "attributes": { "tags.Name": "web", "public_ip": "1.2.3.4" } }
            }
        }));
        assert!(extract(&doc, &NoopDiagnostics).unwrap().is_empty());
    }

    #[test]
    fn test_instance_binding() {
        let doc = doc_with(json!({
            "aws_instance.web": {
                "type": "aws_instance",
                "primary": {
                    "id": "i-0abc",
                    "attributes": {
                        "tags.iggy_name_foo": "x",
                        "tags.iggy_url_foo": "http://u",
                        "public_ip": "1.2.3.4",
                        "key_name": "k"
                    }
                }
            }
        }));

        let bindings = extract(&doc, &NoopDiagnostics).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(
            bindings["i-0abc:foo"],
            ProfileBinding::AwsInstance {
                public_ip: Some("1.2.3.4".to_string()),
                key_name: Some("k".to_string()),
                url: Some("http://u".to_string()),
            }
        );
    }

    #[test]
    fn test_vpc_binding_prefix_match_and_missing_url() {
        let doc = doc_with(json!({
            "aws_vpc_peering_connection.peer": {
                "type": "aws_vpc_peering_connection",
                "primary": { "id": "pcx-1", "attributes": { "tags.iggy_name_net": "baseline" } }
            }
        }));

        let bindings = extract(&doc, &NoopDiagnostics).unwrap();
        assert_eq!(
            bindings["pcx-1:net"],
            ProfileBinding::AwsVpc {
                az: "us-west-2".to_string(),
                url: None,
            }
        );
    }

    #[test]
    fn test_multiple_tags_on_one_resource() {
        let doc = doc_with(json!({
            "aws_vpc.main": {
                "type": "aws_vpc",
                "primary": {
                    "id": "vpc-1",
                    "attributes": {
                        "tags.iggy_name_cis": "cis",
                        "tags.iggy_url_cis": "https://example.com/cis.tar.gz",
                        "tags.iggy_name_net": "net",
                        "tags.iggy_url_net": "https://example.com/net.tar.gz"
                    }
                }
            }
        }));

        let sink = RecordingDiagnostics::default();
        let bindings = extract(&doc, &sink).unwrap();
        let keys: Vec<_> = bindings.keys().cloned().collect();
        assert_eq!(keys, vec!["vpc-1:cis", "vpc-1:net"]);
        assert_eq!(bindings["vpc-1:net"].url(), Some("https://example.com/net.tar.gz"));

        let extracted = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, DiagnosticEvent::BindingExtracted { .. }))
            .count();
        assert_eq!(extracted, 2);
    }

    #[test]
    fn test_unsupported_type_is_fatal() {
        let doc = doc_with(json!({
            "aws_instance.web": {
                "type": "aws_instance",
                "primary": { "id": "i-1", "attributes": { "tags.iggy_name_a": "a" } }
            },
            "aws_s3_bucket.logs": {
                "type": "aws_s3_bucket",
                "primary": { "id": "logs-bucket", "attributes": { "tags.iggy_name_b": "b" } }
            }
        }));

        let err = extract(&doc, &NoopDiagnostics).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedResource);
        match err {
            IggyError::UnsupportedResource {
                path,
                resource_id,
                resource_type,
            } => {
                assert_eq!(path.to_str(), Some("terraform.tfstate"));
                assert_eq!(resource_id, "logs-bucket");
                assert_eq!(resource_type, "aws_s3_bucket");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_only_first_module_consulted() {
        let state = json!({
            "modules": [
                { "resources": {} },
                { "resources": {
                    "aws_s3_bucket.b": {
                        "type": "aws_s3_bucket",
                        "primary": { "id": "b", "attributes": { "tags.iggy_name_x": "x" } }
                    }
                } }
            ]
        });
        let doc = StateDocument::from_json(&state.to_string(), "s.tfstate").unwrap();
        assert!(extract(&doc, &NoopDiagnostics).unwrap().is_empty());
    }

    #[test]
    fn test_url_tag_alone_is_ignored() {
        let doc = doc_with(json!({
            "aws_s3_bucket.b": {
                "type": "aws_s3_bucket",
                "primary": { "id": "b", "attributes": { "tags.iggy_url_x": "http://u" } }
            }
        }));
        assert!(extract(&doc, &NoopDiagnostics).unwrap().is_empty());
    }

    #[test]
    fn test_empty_tag_name_rejected() {
        let doc = doc_with(json!({
            "aws_vpc.main": {
                "type": "aws_vpc",
                "primary": { "id": "vpc-1", "attributes": { "tags.iggy_name_": "oops" } }
            }
        }));
        assert_eq!(
            extract(&doc, &NoopDiagnostics).unwrap_err().kind(),
            ErrorKind::InvalidSchema
        );
    }

    #[test]
    fn test_untagged_resource_without_primary_rejected() {
        let doc = doc_with(json!({
            "aws_vpc.main": {
                "type": "aws_vpc",
                "primary": { "id": "vpc-1", "attributes": { "tags.iggy_name_cis": "cis" } }
            },
            "null_resource.x": { "type": "null_resource" }
        }));
        let err = extract(&doc, &NoopDiagnostics).unwrap_err();
        assert!(matches!(err, IggyError::InvalidSchema { ref field, .. } if field == "primary"));
    }

    #[test]
    fn test_exec_commands() {
        let vpc = ProfileBinding::AwsVpc {
            az: DEFAULT_VPC_AZ.to_string(),
            url: Some("https://example.com/p.tar.gz".to_string()),
        };
        assert_eq!(
            vpc.exec_command(),
            "inspec exec https://example.com/p.tar.gz -t aws://us-west-2"
        );

        let node = ProfileBinding::AwsInstance {
            public_ip: Some("1.2.3.4".to_string()),
            key_name: Some("deploy".to_string()),
            url: Some("https://example.com/linux".to_string()),
        };
        assert_eq!(
            node.exec_command(),
            "inspec exec https://example.com/linux -t ssh://1.2.3.4 -i deploy"
        );

        let bare = ProfileBinding::AwsInstance {
            public_ip: None,
            key_name: None,
            url: None,
        };
        assert_eq!(bare.exec_command(), "inspec exec <profile-url> -t ssh://<public-ip>");
    }

    #[test]
    fn test_binding_json_shape() {
        let mut bindings = ProfileBindings::new();
        bindings.insert(
            "vpc-1:cis".to_string(),
            ProfileBinding::AwsVpc {
                az: DEFAULT_VPC_AZ.to_string(),
                url: Some("u".to_string()),
            },
        );
        let value = serde_json::to_value(&bindings).unwrap();
        assert_eq!(
            value,
            json!({ "vpc-1:cis": { "type": "aws_vpc", "az": "us-west-2", "url": "u" } })
        );
    }
}
