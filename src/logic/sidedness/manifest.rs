//! Mod metadata readers
//!
//! `META-INF/neoforge.mods.toml`, `META-INF/mods.toml` and `fabric.mod.json`
//! are read only for the mod id, dependency ids and an explicit dist
//! declaration. Loader metadata is loosely structured, so lookups are
//! pattern based rather than full TOML parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::rules::Dist;

pub const NEOFORGE_MODS_TOML: &str = "META-INF/neoforge.mods.toml";
pub const FORGE_MODS_TOML: &str = "META-INF/mods.toml";
pub const FABRIC_MOD_JSON: &str = "fabric.mod.json";

static MOD_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"modId\s*=\s*"([^"]+)""#).unwrap());
static DIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"dist\s*=\s*"(CLIENT|DEDICATED_SERVER)""#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManifestKind {
    NeoForgeToml,
    ForgeToml,
    FabricJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestInfo {
    pub kind: ManifestKind,
    pub mod_id: Option<String>,
    pub dependencies: Vec<String>,
    pub declared_dist: Option<Dist>,
}

/// Parse a `mods.toml` body. Ids before the first `[[dependencies` table
/// name the mod itself; later ones are dependencies.
pub fn parse_mods_toml(content: &str, kind: ManifestKind) -> ManifestInfo {
    let (head, tail) = match content.find("[[dependencies") {
        Some(pos) => content.split_at(pos),
        None => (content, ""),
    };

    let mod_id = MOD_ID_RE
        .captures(head)
        .map(|c| c[1].trim().to_lowercase());

    let mut dependencies: Vec<String> = MOD_ID_RE
        .captures_iter(tail)
        .map(|c| c[1].trim().to_lowercase())
        .filter(|id| Some(id) != mod_id.as_ref())
        .collect();
    dependencies.sort();
    dependencies.dedup();

    let declared_dist = DIST_RE
        .captures(head)
        .and_then(|c| Dist::from_constant(&c[1]));

    ManifestInfo { kind, mod_id, dependencies, declared_dist }
}

/// Parse `fabric.mod.json`. Unparseable JSON yields None.
pub fn parse_fabric_json(content: &str) -> Option<ManifestInfo> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;

    let mod_id = value
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_lowercase());

    let mut dependencies: Vec<String> = value
        .get("depends")
        .and_then(|v| v.as_object())
        .map(|deps| deps.keys().map(|k| k.to_lowercase()).collect())
        .unwrap_or_default();
    dependencies.sort();

    let declared_dist = match value.get("environment").and_then(|v| v.as_str()) {
        Some("client") => Some(Dist::Client),
        Some("server") => Some(Dist::DedicatedServer),
        _ => None,
    };

    Some(ManifestInfo {
        kind: ManifestKind::FabricJson,
        mod_id,
        dependencies,
        declared_dist,
    })
}
