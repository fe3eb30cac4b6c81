//! `CycloneDX` JSON output.

use super::{BomSerializer, OutputFormat};
use crate::error::{Result, SbomError, SerializeErrorKind};
use crate::model::{Bom, BomComponent, License, Organization, SpecVersion, Tool};
use chrono::SecondsFormat;
use serde::Serialize;

/// Renders a [`Bom`] as `CycloneDX` JSON.
#[derive(Debug, Clone, Copy)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl BomSerializer for JsonSerializer {
    fn serialize(&self, bom: &Bom) -> Result<String> {
        let document = JsonBom::from_bom(bom);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        rendered.map_err(|e| {
            SbomError::serialize("CycloneDX JSON", SerializeErrorKind::Json(e.to_string()))
        })
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonBom<'a> {
    #[serde(rename = "$schema")]
    schema: String,
    bom_format: &'static str,
    spec_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    serial_number: Option<&'a str>,
    version: u32,
    metadata: JsonMetadata<'a>,
    components: Vec<JsonComponent<'a>>,
    dependencies: Vec<JsonDependency<'a>>,
}

#[derive(Serialize)]
struct JsonMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lifecycles: Vec<JsonLifecycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<JsonTools<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<JsonComponent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<JsonOrganization<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<JsonProperty<'a>>,
}

#[derive(Serialize)]
struct JsonLifecycle {
    phase: &'static str,
}

/// Tools as the 1.4 array or the 1.5+ `{components: [...]}` object
#[derive(Serialize)]
#[serde(untagged)]
enum JsonTools<'a> {
    Legacy(Vec<JsonLegacyTool<'a>>),
    Components { components: Vec<JsonToolComponent<'a>> },
}

#[derive(Serialize)]
struct JsonLegacyTool<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonToolComponent<'a> {
    #[serde(rename = "type")]
    type_: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonComponent<'a> {
    #[serde(rename = "type")]
    type_: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<JsonLicenseChoice<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<JsonExternalReference<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence: Option<JsonEvidence<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonLicenseChoice<'a> {
    License {
        license: JsonLicense<'a>,
    },
    Expression {
        expression: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        acknowledgement: Option<String>,
    },
}

#[derive(Serialize)]
struct JsonLicense<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<JsonAttachedText<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    acknowledgement: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonAttachedText<'a> {
    content_type: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct JsonExternalReference<'a> {
    #[serde(rename = "type")]
    type_: &'static str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonEvidence<'a> {
    licenses: Vec<JsonLicenseChoice<'a>>,
}

#[derive(Serialize)]
struct JsonOrganization<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    url: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contact: Vec<JsonContact<'a>>,
}

#[derive(Serialize)]
struct JsonContact<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonProperty<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDependency<'a> {
    #[serde(rename = "ref")]
    ref_: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<&'a str>,
}

impl<'a> JsonBom<'a> {
    fn from_bom(bom: &'a Bom) -> Self {
        let spec = bom.spec_version;
        let meta = &bom.metadata;

        let lifecycles = if spec.supports_lifecycles() {
            meta.lifecycles
                .iter()
                .map(|phase| JsonLifecycle {
                    phase: phase.as_str(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            schema: format!("http://cyclonedx.org/schema/bom-{spec}.schema.json"),
            bom_format: "CycloneDX",
            spec_version: spec.as_str(),
            serial_number: bom.serial_number.as_deref(),
            version: bom.version,
            metadata: JsonMetadata {
                timestamp: meta
                    .timestamp
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
                lifecycles,
                tools: json_tools(&meta.tools, spec),
                component: meta.component.as_ref().map(|c| JsonComponent::new(c, spec)),
                supplier: meta.supplier.as_ref().map(JsonOrganization::new),
                properties: meta
                    .properties
                    .iter()
                    .map(|p| JsonProperty {
                        name: &p.name,
                        value: &p.value,
                    })
                    .collect(),
            },
            components: bom
                .components
                .values()
                .map(|c| JsonComponent::new(c, spec))
                .collect(),
            dependencies: bom
                .dependencies
                .iter()
                .map(|(bom_ref, deps)| JsonDependency {
                    ref_: bom_ref,
                    depends_on: deps.iter().map(String::as_str).collect(),
                })
                .collect(),
        }
    }
}

fn json_tools(tools: &[Tool], spec: SpecVersion) -> Option<JsonTools<'_>> {
    if tools.is_empty() {
        return None;
    }
    Some(if spec.supports_tool_components() {
        JsonTools::Components {
            components: tools
                .iter()
                .map(|t| JsonToolComponent {
                    type_: "application",
                    group: t.group.as_deref(),
                    name: &t.name,
                    version: t.version.as_deref(),
                })
                .collect(),
        }
    } else {
        JsonTools::Legacy(
            tools
                .iter()
                .map(|t| JsonLegacyTool {
                    vendor: t.group.as_deref(),
                    name: &t.name,
                    version: t.version.as_deref(),
                })
                .collect(),
        )
    })
}

impl<'a> JsonComponent<'a> {
    fn new(component: &'a BomComponent, spec: SpecVersion) -> Self {
        let evidence = (spec.supports_license_evidence() && !component.license_evidence.is_empty())
            .then(|| JsonEvidence {
                licenses: component
                    .license_evidence
                    .iter()
                    .map(|l| JsonLicenseChoice::new(l, spec))
                    .collect(),
            });

        Self {
            type_: component.component_type.as_str(),
            bom_ref: &component.bom_ref,
            author: component.author.as_deref(),
            group: component.group.as_deref(),
            name: &component.name,
            version: component.version.as_deref(),
            description: component.description.as_deref(),
            licenses: component
                .licenses
                .iter()
                .map(|l| JsonLicenseChoice::new(l, spec))
                .collect(),
            purl: component.purl.as_deref(),
            external_references: component
                .external_refs
                .iter()
                .map(|r| JsonExternalReference {
                    type_: r.ref_type.as_str(),
                    url: &r.url,
                    comment: r.comment.as_deref(),
                })
                .collect(),
            evidence,
        }
    }
}

impl<'a> JsonLicenseChoice<'a> {
    fn new(license: &'a License, spec: SpecVersion) -> Self {
        let acknowledgement = license
            .acknowledgement()
            .filter(|_| spec.supports_license_acknowledgement())
            .map(|a| a.to_string());

        match license {
            License::Spdx { id, .. } => Self::License {
                license: JsonLicense {
                    id: Some(id.as_str()),
                    name: None,
                    text: None,
                    acknowledgement,
                },
            },
            License::Expression { expression, .. } => Self::Expression {
                expression,
                acknowledgement,
            },
            License::Named { name, text, .. } => Self::License {
                license: JsonLicense {
                    id: None,
                    name: Some(name.as_str()),
                    text: text.as_ref().map(|t| JsonAttachedText {
                        content_type: &t.content_type,
                        content: &t.content,
                    }),
                    acknowledgement,
                },
            },
        }
    }
}

impl<'a> JsonOrganization<'a> {
    fn new(org: &'a Organization) -> Self {
        Self {
            name: org.name.as_deref(),
            url: org.urls.iter().map(String::as_str).collect(),
            contact: org
                .contacts
                .iter()
                .map(|c| JsonContact {
                    name: c.name.as_deref(),
                    email: c.email.as_deref(),
                    phone: c.phone.as_deref(),
                })
                .collect(),
        }
    }
}
