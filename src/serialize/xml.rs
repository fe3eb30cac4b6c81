//! `CycloneDX` XML output, written event by event with `quick-xml`.

use super::{BomSerializer, OutputFormat};
use crate::error::{Result, SbomError, SerializeErrorKind};
use crate::model::{Bom, BomComponent, License, Organization, SpecVersion, Tool};
use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;

/// Renders a [`Bom`] as `CycloneDX` XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer;

impl XmlSerializer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BomSerializer for XmlSerializer {
    fn serialize(&self, bom: &Bom) -> Result<String> {
        let mut out = XmlOut::new();
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let version = bom.version.to_string();
        let mut attrs = vec![("xmlns", bom.spec_version.xml_namespace())];
        if let Some(serial) = &bom.serial_number {
            attrs.push(("serialNumber", serial.as_str()));
        }
        attrs.push(("version", version.as_str()));
        out.start("bom", &attrs)?;

        write_metadata(&mut out, bom)?;

        out.start("components", &[])?;
        for component in bom.components.values() {
            write_component(&mut out, component, bom.spec_version)?;
        }
        out.end("components")?;

        out.start("dependencies", &[])?;
        for (bom_ref, deps) in &bom.dependencies {
            if deps.is_empty() {
                out.empty("dependency", &[("ref", bom_ref.as_str())])?;
                continue;
            }
            out.start("dependency", &[("ref", bom_ref.as_str())])?;
            for dep in deps {
                out.empty("dependency", &[("ref", dep.as_str())])?;
            }
            out.end("dependency")?;
        }
        out.end("dependencies")?;

        out.end("bom")?;
        out.finish()
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Xml
    }
}

fn write_metadata(out: &mut XmlOut, bom: &Bom) -> Result<()> {
    let meta = &bom.metadata;
    let spec = bom.spec_version;
    out.start("metadata", &[])?;

    if let Some(timestamp) = meta.timestamp {
        out.text_element("timestamp", &timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))?;
    }

    if spec.supports_lifecycles() && !meta.lifecycles.is_empty() {
        out.start("lifecycles", &[])?;
        for phase in &meta.lifecycles {
            out.start("lifecycle", &[])?;
            out.text_element("phase", phase.as_str())?;
            out.end("lifecycle")?;
        }
        out.end("lifecycles")?;
    }

    if !meta.tools.is_empty() {
        write_tools(out, &meta.tools, spec)?;
    }

    if let Some(component) = &meta.component {
        write_component(out, component, spec)?;
    }

    if let Some(supplier) = &meta.supplier {
        write_organization(out, "supplier", supplier)?;
    }

    if !meta.properties.is_empty() {
        out.start("properties", &[])?;
        for property in &meta.properties {
            out.start("property", &[("name", property.name.as_str())])?;
            out.text(&property.value)?;
            out.end("property")?;
        }
        out.end("properties")?;
    }

    out.end("metadata")
}

fn write_tools(out: &mut XmlOut, tools: &[Tool], spec: SpecVersion) -> Result<()> {
    out.start("tools", &[])?;
    if spec.supports_tool_components() {
        out.start("components", &[])?;
        for tool in tools {
            out.start("component", &[("type", "application")])?;
            out.opt_element("group", tool.group.as_deref())?;
            out.text_element("name", &tool.name)?;
            out.opt_element("version", tool.version.as_deref())?;
            out.end("component")?;
        }
        out.end("components")?;
    } else {
        for tool in tools {
            out.start("tool", &[])?;
            out.opt_element("vendor", tool.group.as_deref())?;
            out.text_element("name", &tool.name)?;
            out.opt_element("version", tool.version.as_deref())?;
            out.end("tool")?;
        }
    }
    out.end("tools")
}

fn write_component(out: &mut XmlOut, component: &BomComponent, spec: SpecVersion) -> Result<()> {
    out.start(
        "component",
        &[
            ("type", component.component_type.as_str()),
            ("bom-ref", component.bom_ref.as_str()),
        ],
    )?;
    out.opt_element("author", component.author.as_deref())?;
    out.opt_element("group", component.group.as_deref())?;
    out.text_element("name", &component.name)?;
    out.opt_element("version", component.version.as_deref())?;
    out.opt_element("description", component.description.as_deref())?;

    if !component.licenses.is_empty() {
        write_licenses(out, &component.licenses, spec)?;
    }

    out.opt_element("purl", component.purl.as_deref())?;

    if !component.external_refs.is_empty() {
        out.start("externalReferences", &[])?;
        for reference in &component.external_refs {
            out.start("reference", &[("type", reference.ref_type.as_str())])?;
            out.text_element("url", &reference.url)?;
            out.opt_element("comment", reference.comment.as_deref())?;
            out.end("reference")?;
        }
        out.end("externalReferences")?;
    }

    if spec.supports_license_evidence() && !component.license_evidence.is_empty() {
        out.start("evidence", &[])?;
        write_licenses(out, &component.license_evidence, spec)?;
        out.end("evidence")?;
    }

    out.end("component")
}

fn write_licenses(out: &mut XmlOut, licenses: &[License], spec: SpecVersion) -> Result<()> {
    out.start("licenses", &[])?;
    for license in licenses {
        let ack = license
            .acknowledgement()
            .filter(|_| spec.supports_license_acknowledgement())
            .map(|a| a.to_string());
        let attrs: Vec<(&str, &str)> = ack
            .as_deref()
            .map(|a| vec![("acknowledgement", a)])
            .unwrap_or_default();

        match license {
            License::Spdx { id, .. } => {
                out.start("license", &attrs)?;
                out.text_element("id", id)?;
                out.end("license")?;
            }
            License::Expression { expression, .. } => {
                out.start("expression", &attrs)?;
                out.text(expression)?;
                out.end("expression")?;
            }
            License::Named { name, text, .. } => {
                out.start("license", &attrs)?;
                out.text_element("name", name)?;
                if let Some(text) = text {
                    out.start("text", &[("content-type", text.content_type.as_str())])?;
                    out.text(&text.content)?;
                    out.end("text")?;
                }
                out.end("license")?;
            }
        }
    }
    out.end("licenses")
}

fn write_organization(out: &mut XmlOut, tag: &str, org: &Organization) -> Result<()> {
    out.start(tag, &[])?;
    out.opt_element("name", org.name.as_deref())?;
    for url in &org.urls {
        out.text_element("url", url)?;
    }
    for contact in &org.contacts {
        out.start("contact", &[])?;
        out.opt_element("name", contact.name.as_deref())?;
        out.opt_element("email", contact.email.as_deref())?;
        out.opt_element("phone", contact.phone.as_deref())?;
        out.end("contact")?;
    }
    out.end(tag)
}

/// Thin wrapper so every write maps its error the same way.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.event(Event::Start(start))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.event(Event::Empty(start))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    fn opt_element(&mut self, name: &str, text: Option<&str>) -> Result<()> {
        match text {
            Some(text) => self.text_element(name, text),
            None => Ok(()),
        }
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(xml_error)
    }
}

fn xml_error(e: impl Display) -> SbomError {
    SbomError::serialize("CycloneDX XML", SerializeErrorKind::Xml(e.to_string()))
}
