//! Metadata structures for BOM documents and components.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `CycloneDX` specification version of the emitted document
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum SpecVersion {
    #[serde(rename = "1.4")]
    V1_4,
    #[default]
    #[serde(rename = "1.5")]
    V1_5,
    #[serde(rename = "1.6")]
    V1_6,
}

impl SpecVersion {
    /// Version string as written into `specVersion`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
            Self::V1_6 => "1.6",
        }
    }

    /// XML namespace of this version
    #[must_use]
    pub const fn xml_namespace(&self) -> &'static str {
        match self {
            Self::V1_4 => "http://cyclonedx.org/schema/bom/1.4",
            Self::V1_5 => "http://cyclonedx.org/schema/bom/1.5",
            Self::V1_6 => "http://cyclonedx.org/schema/bom/1.6",
        }
    }

    /// `metadata.lifecycles` was introduced in 1.5
    #[must_use]
    pub fn supports_lifecycles(&self) -> bool {
        *self >= Self::V1_5
    }

    /// Tools as `{components: [...]}` instead of a legacy array, since 1.5
    #[must_use]
    pub fn supports_tool_components(&self) -> bool {
        *self >= Self::V1_5
    }

    /// `component.evidence.licenses` was introduced in 1.5
    #[must_use]
    pub fn supports_license_evidence(&self) -> bool {
        *self >= Self::V1_5
    }

    /// License `acknowledgement` was introduced in 1.6
    #[must_use]
    pub fn supports_license_acknowledgement(&self) -> bool {
        *self >= Self::V1_6
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.4" => Ok(Self::V1_4),
            "1.5" => Ok(Self::V1_5),
            "1.6" => Ok(Self::V1_6),
            other => Err(format!(
                "Unsupported CycloneDX version '{other}'. Valid options: 1.4, 1.5, 1.6"
            )),
        }
    }
}

/// Component type classification
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ComponentType {
    #[default]
    Application,
    Framework,
    Library,
    Container,
    Platform,
    OperatingSystem,
    Device,
    DeviceDriver,
    Firmware,
    File,
}

impl ComponentType {
    /// Name as used in `CycloneDX` documents
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Framework => "framework",
            Self::Library => "library",
            Self::Container => "container",
            Self::Platform => "platform",
            Self::OperatingSystem => "operating-system",
            Self::Device => "device",
            Self::DeviceDriver => "device-driver",
            Self::Firmware => "firmware",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "application" => Ok(Self::Application),
            "framework" => Ok(Self::Framework),
            "library" => Ok(Self::Library),
            "container" => Ok(Self::Container),
            "platform" => Ok(Self::Platform),
            "operating-system" => Ok(Self::OperatingSystem),
            "device" => Ok(Self::Device),
            "device-driver" => Ok(Self::DeviceDriver),
            "firmware" => Ok(Self::Firmware),
            "file" => Ok(Self::File),
            other => Err(format!("Unknown component type '{other}'")),
        }
    }
}

/// Organization/supplier information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Organization {
    /// Organization name
    pub name: Option<String>,
    /// Contact URLs
    pub urls: Vec<String>,
    /// Contacts at the organization
    pub contacts: Vec<Contact>,
}

impl Organization {
    /// Create a new organization with just a name
    #[must_use]
    pub const fn new(name: String) -> Self {
        Self {
            name: Some(name),
            urls: Vec::new(),
            contacts: Vec::new(),
        }
    }
}

/// Contact information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Contact {
    /// Contact name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
}

/// Free-form name/value property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A tool that took part in producing the BOM
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tool {
    /// npm scope or vendor
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
}

/// Lifecycle phase recorded in `metadata.lifecycles`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecyclePhase {
    Design,
    PreBuild,
    Build,
    PostBuild,
    Operations,
    Discovery,
    Decommission,
}

impl LifecyclePhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::PreBuild => "pre-build",
            Self::Build => "build",
            Self::PostBuild => "post-build",
            Self::Operations => "operations",
            Self::Discovery => "discovery",
            Self::Decommission => "decommission",
        }
    }
}

/// External reference type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalRefType {
    Website,
    Vcs,
    IssueTracker,
}

impl ExternalRefType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Vcs => "vcs",
            Self::IssueTracker => "issue-tracker",
        }
    }
}

/// External reference of a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    pub ref_type: ExternalRefType,
    pub url: String,
    pub comment: Option<String>,
}
