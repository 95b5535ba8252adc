use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Kind of asset being enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Character skin art
    Art,
    /// Skin name label
    Label,
    /// Joystick icon
    #[serde(alias = "joytick")]
    Joystick,
    /// Avatar frame
    Frame,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Art,
        AssetClass::Label,
        AssetClass::Joystick,
        AssetClass::Frame,
    ];

    /// Directory name under the data root
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Art => "art",
            Self::Label => "label",
            Self::Joystick => "joystick",
            Self::Frame => "frame",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Art | Self::Joystick => "jpg",
            Self::Label | Self::Frame => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension() {
            "png" => "image/png",
            _ => "image/jpeg",
        }
    }

    /// Token replaced by the identifier in server URL templates
    pub fn default_placeholder(&self) -> &'static str {
        match self {
            Self::Joystick => "$ID$",
            _ => "##ID##",
        }
    }

    /// Older deployments kept joysticks under `joytick/`
    pub fn legacy_dir(&self) -> Option<&'static str> {
        match self {
            Self::Joystick => Some("joytick"),
            _ => None,
        }
    }

    /// Whether files are grouped in one directory per subject
    pub fn has_subject_dir(&self) -> bool {
        matches!(self, Self::Art | Self::Label)
    }

    /// Whether notifications carry the subject's display name
    pub fn has_display_name(&self) -> bool {
        matches!(self, Self::Art | Self::Label)
    }

    pub fn channel(&self) -> notify::Channel {
        match self {
            Self::Art => notify::Channel::Art,
            Self::Label => notify::Channel::Label,
            Self::Joystick => notify::Channel::Joystick,
            Self::Frame => notify::Channel::Frame,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown asset class: {0}")]
pub struct UnknownAssetClass(pub String);

impl FromStr for AssetClass {
    type Err = UnknownAssetClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "art" => Ok(Self::Art),
            "label" => Ok(Self::Label),
            "joystick" | "joytick" => Ok(Self::Joystick),
            "frame" => Ok(Self::Frame),
            _ => Err(UnknownAssetClass(s.to_string())),
        }
    }
}

/// Character (or other entity) owning a family of assets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One mirror hosting assets under a templated URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub name: String,
    pub url: String,
}

impl ServerEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Substitutes `id` for `placeholder` in the URL template.
    pub fn resolve(&self, placeholder: &str, id: &str) -> String {
        self.url.replace(placeholder, id)
    }
}

/// Asset returned by the first server that answered
#[derive(Debug, Clone)]
pub struct FoundAsset {
    pub server: String,
    pub source_url: String,
    pub bytes: Vec<u8>,
}

/// Result of probing every server for one identifier
#[derive(Debug, Clone)]
pub enum ProbeResult {
    NotFound,
    Found(FoundAsset),
}

impl ProbeResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// An asset discovered during a scan pass
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryRecord {
    pub id: String,
    pub source_url: String,
    pub server: String,
    pub found_at: DateTime<Utc>,
}

/// Summary of one scan pass over a class
#[derive(Debug, Clone)]
pub struct PassReport {
    pub class: AssetClass,
    pub started_at: DateTime<Utc>,
    pub discoveries: Vec<DiscoveryRecord>,
}
