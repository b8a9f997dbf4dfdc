//! InSpec resource catalog
//!
//! The control generator needs three lookups: a translation table from raw
//! Terraform resource types to InSpec resource names, the set of InSpec
//! resources that can be asserted, and the properties each one exposes.
//! [`ResourceCatalog`] is the seam; [`Catalog`] is the bundled
//! implementation, optionally extended from a YAML/JSON file.
//!
//! # Catalog file format
//!
//! ```yaml
//! translations:
//!   aws_instance: aws_ec2_instance
//! resources:
//!   aws_ec2_instance:
//!     - instance_type
//!     - key_name
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IggyError, Result};

/// Lookup tables consumed by the control generator
pub trait ResourceCatalog {
    /// Logical InSpec type for a raw Terraform type, when one is registered
    fn translate(&self, raw_type: &str) -> Option<&str>;

    /// Whether an InSpec resource exists for this (translated) type
    fn is_known(&self, resource_type: &str) -> bool;

    /// Properties that can be asserted on this (translated) type
    fn properties_for(&self, resource_type: &str) -> Option<&BTreeSet<String>>;

    /// Whether `property` is assertable on `resource_type`
    fn has_property(&self, resource_type: &str, property: &str) -> bool {
        self.properties_for(resource_type)
            .map(|props| props.contains(property))
            .unwrap_or(false)
    }
}

/// Translation and property tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Raw Terraform type -> InSpec resource name
    #[serde(default)]
    pub translations: BTreeMap<String, String>,

    /// InSpec resource name -> assertable properties
    #[serde(default)]
    pub resources: BTreeMap<String, BTreeSet<String>>,
}

impl Catalog {
    /// The bundled AWS tables
    pub fn builtin() -> Self {
        let translations = aws::TRANSLATIONS
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        let resources = aws::RESOURCES
            .iter()
            .map(|res| {
                (
                    res.name.to_string(),
                    res.properties.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();

        Self {
            translations,
            resources,
        }
    }

    /// Load a catalog file (YAML, or JSON since YAML is a superset)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| IggyError::catalog(format!("failed to read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| IggyError::catalog(format!("{}: {}", path.display(), e)))
    }

    /// Parse a catalog from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| IggyError::catalog(e.to_string()))
    }

    /// Overlay `other` onto this catalog
    ///
    /// Translations from `other` replace existing ones. Property sets are
    /// unioned, so a file can add properties without restating the builtin ones.
    pub fn merge(mut self, other: Catalog) -> Self {
        self.translations.extend(other.translations);
        for (name, props) in other.resources {
            self.resources.entry(name).or_default().extend(props);
        }
        self
    }

    /// Number of known InSpec resources
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

impl ResourceCatalog for Catalog {
    fn translate(&self, raw_type: &str) -> Option<&str> {
        self.translations.get(raw_type).map(String::as_str)
    }

    fn is_known(&self, resource_type: &str) -> bool {
        self.resources.contains_key(resource_type)
    }

    fn properties_for(&self, resource_type: &str) -> Option<&BTreeSet<String>> {
        self.resources.get(resource_type)
    }
}

/// Bundled AWS resource definitions
pub mod aws {
    /// An InSpec AWS resource and the Terraform attribute names it can assert
    #[derive(Debug, Clone, Copy)]
    pub struct ResourceDef {
        pub name: &'static str,
        pub properties: &'static [&'static str],
    }

    /// Terraform types whose InSpec resource has a different name
    pub const TRANSLATIONS: &[(&str, &str)] = &[
        ("aws_instance", "aws_ec2_instance"),
        ("aws_default_vpc", "aws_vpc"),
        ("aws_default_subnet", "aws_subnet"),
        ("aws_default_security_group", "aws_security_group"),
        ("aws_default_route_table", "aws_route_table"),
        ("aws_lb", "aws_alb"),
    ];

    pub const RESOURCES: &[ResourceDef] = &[
        ResourceDef {
            name: "aws_alb",
            properties: &["arn", "dns_name", "internal", "load_balancer_type", "name", "vpc_id", "zone_id"],
        },
        ResourceDef {
            name: "aws_cloudtrail_trail",
            properties: &["home_region", "kms_key_id", "s3_bucket_name", "trail_arn"],
        },
        ResourceDef {
            name: "aws_cloudwatch_log_group",
            properties: &["kms_key_id", "log_group_name", "retention_in_days"],
        },
        ResourceDef {
            name: "aws_ebs_volume",
            properties: &["availability_zone", "encrypted", "iops", "kms_key_id", "size", "snapshot_id"],
        },
        ResourceDef {
            name: "aws_ec2_instance",
            properties: &[
                "ami",
                "availability_zone",
                "ebs_optimized",
                "iam_instance_profile",
                "instance_type",
                "key_name",
                "monitoring",
                "private_ip",
                "public_ip",
                "subnet_id",
                "tenancy",
            ],
        },
        ResourceDef {
            name: "aws_elb",
            properties: &["dns_name", "internal", "name", "source_security_group_id", "zone_id"],
        },
        ResourceDef {
            name: "aws_iam_role",
            properties: &["arn", "create_date", "description", "name", "path", "unique_id"],
        },
        ResourceDef {
            name: "aws_iam_user",
            properties: &["arn", "name", "path", "unique_id"],
        },
        ResourceDef {
            name: "aws_internet_gateway",
            properties: &["vpc_id"],
        },
        ResourceDef {
            name: "aws_route_table",
            properties: &["vpc_id"],
        },
        ResourceDef {
            name: "aws_s3_bucket",
            properties: &["acl", "bucket", "bucket_domain_name", "region"],
        },
        ResourceDef {
            name: "aws_security_group",
            properties: &["description", "name", "owner_id", "vpc_id"],
        },
        ResourceDef {
            name: "aws_sns_topic",
            properties: &["arn", "display_name", "name"],
        },
        ResourceDef {
            name: "aws_subnet",
            properties: &[
                "assign_ipv6_address_on_creation",
                "availability_zone",
                "cidr_block",
                "map_public_ip_on_launch",
                "vpc_id",
            ],
        },
        ResourceDef {
            name: "aws_vpc",
            properties: &[
                "cidr_block",
                "default_network_acl_id",
                "default_route_table_id",
                "default_security_group_id",
                "dhcp_options_id",
                "instance_tenancy",
                "main_route_table_id",
            ],
        },
    ];
}
