//! BOM serialization.
//!
//! Two formats are supported:
//! - JSON: `CycloneDX` JSON, also used for the `.well-known/sbom` copy
//! - XML: `CycloneDX` XML
//!
//! Output formats are named by string in configuration; [`parse_formats`]
//! validates them all before anything is written.

mod json;
mod xml;

pub use json::JsonSerializer;
pub use xml::XmlSerializer;

use crate::error::{Result, SbomError};
use crate::model::Bom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A serialization format with a registered serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `CycloneDX` JSON
    Json,
    /// `CycloneDX` XML
    Xml,
}

impl OutputFormat {
    /// File extension, without the dot
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// MIME type of the rendered document
    #[must_use]
    pub const fn media_type(&self) -> &'static str {
        match self {
            Self::Json => "application/vnd.cyclonedx+json",
            Self::Xml => "application/vnd.cyclonedx+xml",
        }
    }

    /// Serializer for this format
    #[must_use]
    pub fn serializer(&self) -> Box<dyn BomSerializer> {
        match self {
            Self::Json => Box::new(JsonSerializer::new()),
            Self::Xml => Box::new(XmlSerializer::new()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = SbomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(SbomError::UnsupportedOutputFormat(s.to_string())),
        }
    }
}

/// Renders a [`Bom`] in one format
pub trait BomSerializer: Send + Sync {
    /// Render the whole document
    fn serialize(&self, bom: &Bom) -> Result<String>;

    /// The format this serializer produces
    fn format(&self) -> OutputFormat;
}

/// Serializer registered under `name`.
///
/// # Errors
///
/// [`SbomError::UnsupportedOutputFormat`] if no serializer has that name.
pub fn serializer_for(name: &str) -> Result<Box<dyn BomSerializer>> {
    name.parse::<OutputFormat>().map(|format| format.serializer())
}

/// Parse every configured format name, failing on the first unknown one.
pub fn parse_formats<S: AsRef<str>>(names: &[S]) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::with_capacity(names.len());
    for name in names {
        let format: OutputFormat = name.as_ref().parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}
