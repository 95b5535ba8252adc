//! Static lookup tables: subject roster, display names and per-class mirrors.
//!
//! Loaded once from TOML and validated before any crawler starts:
//!
//! ```toml
//! roster = ["101", "102"]
//!
//! [names]
//! "101" = "Hero One"
//!
//! [[servers.art]]
//! name = "sea"
//! url = "https://cdn-sea.example/art/##ID##.jpg"
//!
//! [placeholders]
//! joystick = "$ID$"
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::models::{AssetClass, ServerEndpoint, Subject};

/// Display name used when a subject has no entry in the name table
pub const UNKNOWN_NAME: &str = "Unknown Hero";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    roster: Vec<Subject>,
    #[serde(default)]
    names: HashMap<String, String>,
    #[serde(default)]
    servers: HashMap<AssetClass, Vec<ServerEndpoint>>,
    #[serde(default)]
    placeholders: HashMap<AssetClass, String>,
}

/// Ordered fallback list of mirrors for one asset class
#[derive(Debug, Clone)]
pub struct EndpointList {
    pub placeholder: String,
    pub servers: Vec<ServerEndpoint>,
}

#[derive(Debug, Clone)]
struct ClassEndpoints {
    art: EndpointList,
    label: EndpointList,
    joystick: EndpointList,
    frame: EndpointList,
}

/// Validated, immutable catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    roster: Vec<Subject>,
    names: HashMap<String, String>,
    endpoints: ClassEndpoints,
}

impl Catalog {
    /// Reads and validates a catalog file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_toml_str(&content)?;

        tracing::info!(
            "Loaded catalog from {}: {} subjects, {} names",
            path.display(),
            catalog.roster.len(),
            catalog.names.len()
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Builds a catalog from already-parsed parts, applying the same validation.
    pub fn new(
        roster: Vec<Subject>,
        names: HashMap<String, String>,
        servers: HashMap<AssetClass, Vec<ServerEndpoint>>,
    ) -> Result<Self, ConfigError> {
        Self::from_file(CatalogFile {
            roster,
            names,
            servers,
            placeholders: HashMap::new(),
        })
    }

    fn from_file(mut file: CatalogFile) -> Result<Self, ConfigError> {
        if file.roster.is_empty() {
            return Err(ConfigError::Invalid("roster is empty".to_string()));
        }

        let mut seen = HashSet::new();
        file.roster.retain(|subject| {
            let fresh = seen.insert(subject.clone());
            if !fresh {
                tracing::warn!("Duplicate subject {} in roster, ignoring", subject);
            }
            fresh
        });

        let mut take = |class: AssetClass| -> Result<EndpointList, ConfigError> {
            let placeholder = file
                .placeholders
                .remove(&class)
                .unwrap_or_else(|| class.default_placeholder().to_string());
            let servers = file.servers.remove(&class).unwrap_or_default();
            validate_endpoints(class, &placeholder, &servers)?;
            Ok(EndpointList {
                placeholder,
                servers,
            })
        };

        let endpoints = ClassEndpoints {
            art: take(AssetClass::Art)?,
            label: take(AssetClass::Label)?,
            joystick: take(AssetClass::Joystick)?,
            frame: take(AssetClass::Frame)?,
        };

        Ok(Self {
            roster: file.roster,
            names: file.names,
            endpoints,
        })
    }

    pub fn roster(&self) -> &[Subject] {
        &self.roster
    }

    pub fn endpoints(&self, class: AssetClass) -> &EndpointList {
        match class {
            AssetClass::Art => &self.endpoints.art,
            AssetClass::Label => &self.endpoints.label,
            AssetClass::Joystick => &self.endpoints.joystick,
            AssetClass::Frame => &self.endpoints.frame,
        }
    }

    /// Display name for a subject id, or [`UNKNOWN_NAME`]
    pub fn display_name(&self, subject: &str) -> &str {
        self.names
            .get(subject)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Display name for an arbitrary identifier, keyed by its 3-character
    /// subject prefix.
    pub fn display_name_for_id(&self, id: &str) -> &str {
        let prefix: String = id.chars().take(3).collect();
        self.display_name(&prefix)
    }
}

fn validate_endpoints(
    class: AssetClass,
    placeholder: &str,
    servers: &[ServerEndpoint],
) -> Result<(), ConfigError> {
    if placeholder.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "empty placeholder for {}",
            class
        )));
    }

    if servers.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "no servers configured for {}",
            class
        )));
    }

    for server in servers {
        if server.name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "server without a name in {} list",
                class
            )));
        }
        if !server.url.contains(placeholder) {
            return Err(ConfigError::Invalid(format!(
                "{} server {} url does not contain {}",
                class, server.name, placeholder
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r###"
roster = ["abc", "def", "abc"]

[names]
abc = "Alpha"

[[servers.art]]
name = "sea"
url = "https://sea.example/art/##ID##.jpg"

[[servers.art]]
name = "eu"
url = "https://eu.example/art/##ID##.jpg"

[[servers.label]]
name = "sea"
url = "https://sea.example/label/##ID##.png"

[[servers.joytick]]
name = "sea"
url = "https://sea.example/joy/$ID$.jpg"

[[servers.frame]]
name = "sea"
url = "https://sea.example/frame/##ID##.png"
"###;

    #[test]
    fn test_parse_catalog_keeps_server_order() {
        let catalog = Catalog::from_toml_str(CATALOG).unwrap();

        assert_eq!(
            catalog.roster(),
            &[Subject::new("abc"), Subject::new("def")]
        );
        let art = catalog.endpoints(AssetClass::Art);
        assert_eq!(art.placeholder, "##ID##");
        let names: Vec<_> = art.servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sea", "eu"]);
        assert_eq!(catalog.endpoints(AssetClass::Joystick).placeholder, "$ID$");
    }

    #[test]
    fn test_display_name_falls_back_to_unknown() {
        let catalog = Catalog::from_toml_str(CATALOG).unwrap();

        assert_eq!(catalog.display_name("abc"), "Alpha");
        assert_eq!(catalog.display_name("def"), UNKNOWN_NAME);
        assert_eq!(catalog.display_name_for_id("abc07"), "Alpha");
    }

    #[test]
    fn test_missing_class_servers_is_rejected() {
        let content = CATALOG.replace("[[servers.frame]]", "[[servers.unused_frame]]");
        // Unknown class keys fail to parse.
        assert!(Catalog::from_toml_str(&content).is_err());

        let content: String = CATALOG
            .split("[[servers.frame]]")
            .next()
            .unwrap_or_default()
            .to_string();
        let err = Catalog::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("no servers configured for frame"));
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let content = CATALOG.replace("/label/##ID##.png", "/label/static.png");
        let err = Catalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let err = Catalog::new(vec![], HashMap::new(), HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("roster is empty"));
    }
}
