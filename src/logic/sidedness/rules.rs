//! Side rules: curated namespaces, side-declaring annotations and the
//! symbols that query or declare the running distribution.

use serde::{Deserialize, Serialize};

use crate::logic::bytecode::Annotation;

// ============================================================================
// DIST
// ============================================================================

/// Physical distribution a module is built for or a host runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dist {
    Client,
    DedicatedServer,
}

impl Dist {
    /// Enum constant name used by the loader (`Dist.CLIENT`)
    pub fn from_constant(constant: &str) -> Option<Self> {
        match constant {
            "CLIENT" => Some(Dist::Client),
            "DEDICATED_SERVER" => Some(Dist::DedicatedServer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dist::Client => "client",
            Dist::DedicatedServer => "server",
        }
    }
}

// ============================================================================
// NAMESPACES
// ============================================================================

/// Packages that only exist in the client distribution (dotted form)
pub const CLIENT_ONLY_PREFIXES: &[&str] = &[
    "net.minecraft.client",
    "net.neoforged.neoforge.client",
    "net.minecraftforge.client",
    "com.mojang.blaze3d",
];

/// Packages that only make sense on a dedicated server (dotted form)
pub const SERVER_ONLY_PREFIXES: &[&str] = &[
    "net.minecraft.server.dedicated",
    "net.minecraft.server.commands",
    "net.minecraft.server.level",
    "net.minecraft.server.players",
];

/// Side affinity of an internal class name. Client prefixes win.
pub fn namespace_affinity(internal_name: &str) -> Option<Dist> {
    if CLIENT_ONLY_PREFIXES.iter().any(|p| has_dotted_prefix(internal_name, p)) {
        return Some(Dist::Client);
    }
    if SERVER_ONLY_PREFIXES.iter().any(|p| has_dotted_prefix(internal_name, p)) {
        return Some(Dist::DedicatedServer);
    }
    None
}

/// `a/b/C` starts with `a.b` without allocating the dotted form
fn has_dotted_prefix(internal_name: &str, dotted_prefix: &str) -> bool {
    let name = internal_name.as_bytes();
    let prefix = dotted_prefix.as_bytes();
    name.len() >= prefix.len()
        && name
            .iter()
            .zip(prefix)
            .all(|(n, p)| if *n == b'/' { *p == b'.' } else { n == p })
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

pub const SIDED_ANNOTATIONS: &[&str] = &[
    "Lnet/neoforged/api/distmarker/OnlyIn;",
    "Lnet/minecraftforge/api/distmarker/OnlyIn;",
    "Lnet/neoforged/bus/api/EventBusSubscriber;",
    "Lnet/minecraftforge/eventbus/api/EventBusSubscriber;",
    "Lnet/neoforged/fml/common/EventBusSubscriber;",
];

/// Dists declared by a side-declaring annotation through its `value`
/// element, either directly or as an array. Empty for anything else.
pub fn declared_dists(annotation: &Annotation) -> Vec<Dist> {
    if !SIDED_ANNOTATIONS.contains(&annotation.descriptor.as_str()) {
        return Vec::new();
    }
    annotation
        .enum_values("value")
        .filter(|(ty, _)| ty.contains("Dist"))
        .filter_map(|(_, constant)| Dist::from_constant(constant))
        .collect()
}

// ============================================================================
// DIST CHECKS & DISPLAY TEST
// ============================================================================

/// (owner simple name, member) pairs that read the running distribution
const DIST_QUERIES: &[(&str, &str)] = &[
    ("FMLEnvironment", "dist"),
    ("FMLEnvironment", "getDist"),
    ("FMLLoader", "getDist"),
];

pub fn is_dist_query(owner: &str, member: &str) -> bool {
    DIST_QUERIES
        .iter()
        .any(|(o, m)| *m == member && simple_name(owner) == *o)
}

pub fn is_display_test_registration(owner: &str, member: &str) -> bool {
    member == "registerExtensionPoint" && simple_name(owner) == "ModLoadingContext"
}

pub const IGNORE_SERVER_ONLY: &str = "IGNORESERVERONLY";

/// Field read of `NetworkConstants.IGNORESERVERONLY`
pub fn is_ignore_server_only_field(owner: &str, member: &str) -> bool {
    member == IGNORE_SERVER_ONLY && simple_name(owner) == "NetworkConstants"
}

fn simple_name(internal_name: &str) -> &str {
    internal_name.rsplit('/').next().unwrap_or(internal_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::bytecode::ElementValue;

    #[test]
    fn test_namespace_affinity() {
        assert_eq!(namespace_affinity("net/minecraft/client/Minecraft"), Some(Dist::Client));
        assert_eq!(namespace_affinity("com/mojang/blaze3d/systems/RenderSystem"), Some(Dist::Client));
        assert_eq!(namespace_affinity("net/minecraft/server/level/ServerLevel"), Some(Dist::DedicatedServer));
        assert_eq!(namespace_affinity("net/minecraft/server/MinecraftServer"), None);
        assert_eq!(namespace_affinity("net/minecraft/world/level/Level"), None);
        assert_eq!(namespace_affinity("net"), None);
    }

    #[test]
    fn test_declared_dists_requires_sided_annotation() {
        let dist = ElementValue::Enum {
            type_descriptor: "Lnet/neoforged/api/distmarker/Dist;".to_string(),
            constant: "CLIENT".to_string(),
        };
        let sided = Annotation {
            descriptor: "Lnet/minecraftforge/api/distmarker/OnlyIn;".to_string(),
            elements: vec![("value".to_string(), dist.clone())],
            visible: false,
        };
        assert_eq!(declared_dists(&sided), vec![Dist::Client]);

        let other = Annotation {
            descriptor: "Lcom/example/Marker;".to_string(),
            elements: vec![("value".to_string(), dist)],
            visible: true,
        };
        assert!(declared_dists(&other).is_empty());
    }

    #[test]
    fn test_dist_queries_and_display_test() {
        assert!(is_dist_query("net/neoforged/fml/loading/FMLEnvironment", "dist"));
        assert!(is_dist_query("net/minecraftforge/fml/loading/FMLLoader", "getDist"));
        assert!(!is_dist_query("net/neoforged/fml/loading/FMLEnvironment", "production"));
        assert!(is_display_test_registration("net/neoforged/fml/ModLoadingContext", "registerExtensionPoint"));
        assert!(is_ignore_server_only_field("net/minecraftforge/network/NetworkConstants", "IGNORESERVERONLY"));
    }
}
