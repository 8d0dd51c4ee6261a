//! Curation Types
//!
//! Wire formats of the two curated files and the normalised entry both
//! reduce to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::evidence::{CuratedSignal, Side};

// ============================================================================
// WIRE FORMATS
// ============================================================================

/// `{"data": [...]}` catalog with human side labels
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimpleCatalog {
    #[serde(default)]
    pub data: Vec<SimpleEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimpleEntry {
    pub name: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "modId")]
    pub mod_id: Option<String>,
    pub source: Option<String>,
    pub observations: Option<String>,
}

impl SimpleEntry {
    /// Labels are case-sensitive; anything else is UNKNOWN
    pub fn side(&self) -> Side {
        match self.side.as_deref().map(str::trim) {
            Some("Client") => Side::ClientOnly,
            Some("Server") => Side::ServerOnly,
            Some("Universal") => Side::Universal,
            _ => Side::Unknown,
        }
    }
}

/// One record of the scanned list format
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RichEntry {
    pub mod_name: Option<String>,
    pub page_url: Option<String>,
    pub source: Option<String>,
    pub classification: Option<String>,
    pub confidence: f64,
    pub reason: Vec<ReasonEntry>,
    pub scanned_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonEntry {
    pub label: String,
    pub snippet: String,
}

impl fmt::Display for ReasonEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.snippet)
    }
}

impl RichEntry {
    /// Last non-empty segment of the page url, else a slug of the name
    pub fn mod_id(&self) -> Option<String> {
        let from_url = self
            .page_url
            .as_deref()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
            .map(|seg| seg.trim().to_lowercase())
            .filter(|seg| !seg.is_empty());

        from_url.or_else(|| self.mod_name.as_deref().map(slugify).filter(|s| !s.is_empty()))
    }

    pub fn side(&self) -> Side {
        self.classification.as_deref().map(Side::parse).unwrap_or(Side::Unknown)
    }

    pub fn reason_summary(&self) -> String {
        if self.reason.is_empty() {
            return "No specific reason provided".to_string();
        }
        self.reason.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("; ")
    }
}

/// Lower-case, non `[a-z0-9_]` to `_`, runs collapsed, edges trimmed
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

// ============================================================================
// NORMALISED ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedEntry {
    pub mod_id: String,
    pub name: String,
    pub side: Side,
    pub confidence: f64,
    /// Where the entry came from (`catalog`, `runtime_override`, ...)
    pub source: String,
    pub summary: String,
    pub scanned_at: Option<String>,
}

impl CuratedEntry {
    pub fn to_signal(&self) -> CuratedSignal {
        CuratedSignal {
            side: self.side,
            confidence: self.confidence,
            summary: self.summary.clone(),
        }
    }
}

impl fmt::Display for CuratedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} (confidence: {:.2}) - {}",
            self.name, self.mod_id, self.side, self.confidence, self.summary
        )
    }
}
