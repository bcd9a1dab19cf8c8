//! Glue-boundary data types.
//!
//! The surrounding application supplies two inputs: a *tailor catalog*
//! describing every selectable layer category, and an optional *saved
//! avatar state* restoring a previous configuration. Both arrive as JSON;
//! saved states may additionally arrive in the compact serialized pair
//! form the dirty-check uses (see [`SavedAvatar::parse`]).
//!
//! Saved states accumulated over time come in two shapes: a legacy form
//! where a component is a bare dressing-name string, and the current form
//! where it is a settings object. The shape difference is absorbed here,
//! once, at the deserialization boundary; nothing deeper in the pipeline
//! branches on it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};

/// Key of the base color entry in the serialized pair form.
pub(crate) const BASE_COLOR_KEY: &str = "base_color";

// ============================================================================
// Tailor Catalog
// ============================================================================

/// Static configuration of one tailor, as listed in the catalog.
///
/// The JSON form uses kebab-case for the ordering keys and defaults
/// matching the catalog generator: clearable, unflipped, `ui-order` 0,
/// `z-index` 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorConfig {
    pub name: String,

    /// Paint order in the composite; lower draws first.
    #[serde(rename = "z-index", default = "default_z_index")]
    pub z_index: i32,

    /// Position in selector layouts; unrelated to paint order.
    #[serde(rename = "ui-order", default)]
    pub ui_order: i32,

    /// Whether a synthetic blank dressing is offered at index 0.
    #[serde(default = "default_true")]
    pub allow_clear: bool,

    /// Whether the layer is mirrored about the canvas's vertical axis.
    #[serde(default)]
    pub flip_x: bool,

    /// Where the asset bundle for this tailor's dressings lives.
    #[serde(default)]
    pub asset_path: String,

    #[serde(default)]
    pub dressings: Vec<DressingConfig>,
}

/// One selectable dressing within a tailor's catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DressingConfig {
    pub name: String,
}

impl TailorConfig {
    /// Creates a config with the generator's defaults.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            asset_path: name.clone(),
            name,
            z_index: default_z_index(),
            ui_order: 0,
            allow_clear: true,
            flip_x: false,
            dressings: Vec::new(),
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_ui_order(mut self, ui_order: i32) -> Self {
        self.ui_order = ui_order;
        self
    }

    pub fn with_allow_clear(mut self, allow_clear: bool) -> Self {
        self.allow_clear = allow_clear;
        self
    }

    pub fn with_flip_x(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    pub fn with_dressings<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dressings
            .extend(names.into_iter().map(|name| DressingConfig {
                name: name.into(),
            }));
        self
    }
}

fn default_z_index() -> i32 {
    100
}

fn default_true() -> bool {
    true
}

/// Parses a catalog from JSON and sorts it into composite insertion order
/// (ascending z-index).
pub fn load_catalog(json: &str) -> Result<Vec<TailorConfig>> {
    let mut tailors: Vec<TailorConfig> = serde_json::from_str(json)?;
    tailors.sort_by_key(|tailor| tailor.z_index);
    Ok(tailors)
}

// ============================================================================
// Saved Avatar State
// ============================================================================

/// A persisted avatar configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedAvatar {
    #[serde(default)]
    pub components: BTreeMap<String, ComponentState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<Color>,
}

/// One tailor's saved entry: either the legacy bare dressing name or the
/// current settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentState {
    Name(String),
    Settings(ComponentSettings),
}

impl ComponentState {
    /// The saved dressing name, regardless of shape.
    pub fn dressing_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Settings(settings) => settings.dressing_name.as_deref(),
        }
    }
}

/// Current-form saved settings for one tailor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dressing_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_color: Option<Color>,
}

// Legacy names carried over from earlier releases. The rename table is
// explicit, not inferred.
const DEPRECATED_COMPONENTS: &[&str] = &["body-fill", "head-fill"];
const RENAMED_TAILORS: &[(&str, &str)] = &[("body-stroke", "body"), ("head-stroke", "head")];
const RENAMED_DRESSINGS: &[(&str, &str)] = &[("body_stroke", "body"), ("head_stroke", "head")];

impl SavedAvatar {
    /// Parses a saved state from either supported text form, auto-detected:
    /// JSON, or the serialized `tailor=dressing&...` pair list.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with('{') {
            Self::from_json(trimmed)
        } else {
            Self::from_serialized(trimmed)
        }
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::state(e.to_string()))
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::state(e.to_string()))
    }

    /// Parses the serialized pair form produced by the dirty-check:
    /// URL-encoded `tailor=dressing` pairs joined with `&`, plus a
    /// `base_color` entry.
    pub fn from_serialized(input: &str) -> Result<Self> {
        let mut avatar = SavedAvatar::default();
        for pair in input.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::state(format!("expected key=value, got '{pair}'")))?;
            let key = urlencoding::decode(key).map_err(|e| Error::state(e.to_string()))?;
            let value = urlencoding::decode(value).map_err(|e| Error::state(e.to_string()))?;
            if key == BASE_COLOR_KEY {
                avatar.base_color = Some(Color::from_hex(&value)?);
            } else {
                avatar
                    .components
                    .insert(key.into_owned(), ComponentState::Name(value.into_owned()));
            }
        }
        Ok(avatar)
    }

    /// Normalizes the saved components into current-form settings keyed by
    /// current tailor names.
    ///
    /// Deprecated entries are dropped, renamed tailors and dressings are
    /// translated, bare-string entries become settings objects, and the
    /// saved base color (which legacy states carried outside the component)
    /// is attached to the base tailor's legacy entry.
    pub fn normalized(&self, base_tailor: &str) -> BTreeMap<String, ComponentSettings> {
        let mut out = BTreeMap::new();
        for (key, value) in &self.components {
            if DEPRECATED_COMPONENTS.contains(&key.as_str()) {
                continue;
            }
            let key = rename(RENAMED_TAILORS, key);
            let settings = match value {
                ComponentState::Name(name) => {
                    let mut settings = ComponentSettings {
                        dressing_name: Some(rename(RENAMED_DRESSINGS, name).to_string()),
                        ..ComponentSettings::default()
                    };
                    if key == base_tailor {
                        settings.color = self.base_color;
                    }
                    settings
                }
                ComponentState::Settings(settings) => settings.clone(),
            };
            out.insert(key.to_string(), settings);
        }
        out
    }
}

fn rename<'a>(table: &'static [(&'static str, &'static str)], name: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

// ============================================================================
// Tests
// ============================================================================
