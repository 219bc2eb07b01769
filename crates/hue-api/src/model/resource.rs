// ── Resource domain types ──
//
// Every attribute group is an `Option`: `None` means "not mentioned in this
// value". A full resource from the bulk endpoint carries every group that
// applies to its type; a patch from the event stream carries a subset.

use serde::{Deserialize, Serialize};

pub const TYPE_BRIDGE_HOME: &str = "bridge_home";
pub const TYPE_GROUPED_LIGHT: &str = "grouped_light";
pub const TYPE_LIGHT: &str = "light";
pub const TYPE_ZONE: &str = "zone";

/// Reference to the resource that owns this one (e.g. the device of a light).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub rid: String,
    #[serde(default)]
    pub rtype: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct On {
    #[serde(default)]
    pub on: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimming {
    /// Brightness percentage, 0.0 to 100.0.
    #[serde(default)]
    pub brightness: f64,
}

/// Transition parameters. `duration` is in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dynamics {
    #[serde(default)]
    pub duration: i64,
}

/// CIE 1931 chromaticity coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorXy {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<ColorXy>,
}

/// A CLIP v2 resource: identity plus independently-optional attribute groups.
///
/// The same type is used for authoritative state and for sparse patches;
/// see [`Merge`](super::Merge) for how a patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Opaque identifier assigned by the bridge. Empty only before assignment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Category tag, e.g. `"light"` or `"zone"`.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<On>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimming: Option<Dimming>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamics: Option<Dynamics>,
}

impl Resource {
    /// An empty resource carrying only identity, e.g. for registration.
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            ..Self::default()
        }
    }

    /// Human-readable name from the metadata group, if present.
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.name.as_str())
    }

    /// `Some(on)` if the on/off group is present.
    pub fn is_on(&self) -> Option<bool> {
        self.on.as_ref().map(|o| o.on)
    }

    /// Patch that switches the resource on.
    ///
    /// There is deliberately no `switch_off` counterpart: `on: false` is the
    /// zero value and is skipped by [`Merge`](super::Merge).
    pub fn switch_on() -> Self {
        Self {
            on: Some(On { on: true }),
            ..Self::default()
        }
    }

    /// Patch that sets the brightness percentage.
    pub fn with_brightness(brightness: f64) -> Self {
        Self {
            dimming: Some(Dimming { brightness }),
            ..Self::default()
        }
    }
}
