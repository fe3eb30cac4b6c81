//! License data structures and SPDX expression handling.
//!
//! Uses the `spdx` crate to decide how a manifest's `license` string is
//! represented in the BOM: a single SPDX id, a compound SPDX expression, or a
//! free-form named license.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a license was established for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseAcknowledgement {
    /// Stated by the package author in its manifest
    Declared,
    /// Established by analysis (e.g. license files found on disk)
    Concluded,
}

impl fmt::Display for LicenseAcknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared => write!(f, "declared"),
            Self::Concluded => write!(f, "concluded"),
        }
    }
}

/// Text attached to a named license, e.g. the contents of a `LICENSE` file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachedText {
    /// MIME type of the content
    pub content_type: String,
    /// The text itself
    pub content: String,
}

impl AttachedText {
    /// Plain-text attachment
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            content: content.into(),
        }
    }
}

/// A license entry of a BOM component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum License {
    /// A single SPDX license identifier
    Spdx {
        id: String,
        acknowledgement: Option<LicenseAcknowledgement>,
    },
    /// A compound SPDX license expression
    Expression {
        expression: String,
        acknowledgement: Option<LicenseAcknowledgement>,
    },
    /// A license that is not expressible in SPDX terms
    Named {
        name: String,
        text: Option<AttachedText>,
        acknowledgement: Option<LicenseAcknowledgement>,
    },
}

impl License {
    /// Classify a declared license string.
    ///
    /// Exact SPDX ids win, then strict SPDX expressions; anything else is kept
    /// as a named license so no information is lost.
    #[must_use]
    pub fn from_declared(value: &str) -> Self {
        let value = value.trim();
        let acknowledgement = Some(LicenseAcknowledgement::Declared);

        if spdx::license_id(value).is_some() {
            return Self::Spdx {
                id: value.to_string(),
                acknowledgement,
            };
        }

        if is_spdx_expression(value) {
            return Self::Expression {
                expression: value.to_string(),
                acknowledgement,
            };
        }

        Self::Named {
            name: value.to_string(),
            text: None,
            acknowledgement,
        }
    }

    /// Named license carrying the text of a license file
    pub fn file_evidence(file: impl fmt::Display, text: impl Into<String>) -> Self {
        Self::Named {
            name: format!("file: {file}"),
            text: Some(AttachedText::plain(text)),
            acknowledgement: None,
        }
    }

    /// The acknowledgement, if any
    #[must_use]
    pub const fn acknowledgement(&self) -> Option<LicenseAcknowledgement> {
        match self {
            Self::Spdx {
                acknowledgement, ..
            }
            | Self::Expression {
                acknowledgement, ..
            }
            | Self::Named {
                acknowledgement, ..
            } => *acknowledgement,
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spdx { id, .. } => write!(f, "{id}"),
            Self::Expression { expression, .. } => write!(f, "{expression}"),
            Self::Named { name, .. } => write!(f, "{name}"),
        }
    }
}

/// Validate an SPDX expression using the spdx crate.
///
/// Strict mode only: lax parsing would rewrite things like "Apache2" and we
/// want the BOM to carry exactly what the author wrote.
fn is_spdx_expression(expr: &str) -> bool {
    if expr.is_empty() || expr.contains("NOASSERTION") || expr.contains("NONE") {
        return false;
    }
    spdx::Expression::parse_mode(expr, spdx::ParseMode::STRICT).is_ok()
}
