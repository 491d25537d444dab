//! Core types and constants for the module style compiler

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A module's merged attribute tree: field key -> value.
pub type AttributeTree = Map<String, Value>;

// Breakpoint widths
pub const TABLET_MAX_WIDTH: u32 = 980;
pub const PHONE_MAX_WIDTH: u32 = 767;

// Naming defaults
pub const DEFAULT_ANIMATION_PREFIX: &str = "tb4";
pub const DEFAULT_ID_PREFIX: &str = "tb4";

// Attribute keys with special handling
pub const ATTR_ANIMATION: &str = "animation";
pub const ATTR_CUSTOM_CSS: &str = "custom_css";
pub const ATTR_DESIGN: &str = "design";
pub const ATTR_ELEMENTS: &str = "elements";
pub const ATTR_VISIBILITY: &str = "visibility";
pub const ATTR_CSS_ID: &str = "css_id";
pub const ATTR_CSS_CLASS: &str = "css_class";

/// Viewport classes. `ALL` lists them from widest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Desktop,
    Tablet,
    Phone,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Desktop, Device::Tablet, Device::Phone];

    pub fn key(self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Tablet => "tablet",
            Device::Phone => "phone",
        }
    }

    /// Legacy module definitions spell the phone key `mobile`.
    pub fn alias(self) -> Option<&'static str> {
        match self {
            Device::Phone => Some("mobile"),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "desktop" => Some(Device::Desktop),
            "tablet" => Some(Device::Tablet),
            "phone" | "mobile" => Some(Device::Phone),
            _ => None,
        }
    }

    pub fn max_width(self) -> Option<u32> {
        self.breakpoint().max_width_px
    }

    /// Lookup order when this device has no value of its own. Always ends at desktop.
    pub fn fallback_chain(self) -> &'static [Device] {
        match self {
            Device::Phone => &[Device::Phone, Device::Tablet, Device::Desktop],
            Device::Tablet => &[Device::Tablet, Device::Desktop],
            Device::Desktop => &[Device::Desktop],
        }
    }

    /// The next wider device whose rules cascade into this one.
    pub fn wider(self) -> Option<Device> {
        match self {
            Device::Desktop => None,
            Device::Tablet => Some(Device::Desktop),
            Device::Phone => Some(Device::Tablet),
        }
    }

    pub fn breakpoint(self) -> Breakpoint {
        BREAKPOINTS[self as usize]
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named viewport-width threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub name: &'static str,
    pub max_width_px: Option<u32>,
}

impl Breakpoint {
    /// Media condition for rules that apply at or below this breakpoint.
    pub fn media_query(&self) -> Option<String> {
        self.max_width_px.map(|w| format!("(max-width: {}px)", w))
    }
}

pub const BREAKPOINTS: [Breakpoint; 3] = [
    Breakpoint { name: "desktop", max_width_px: None },
    Breakpoint { name: "tablet", max_width_px: Some(TABLET_MAX_WIDTH) },
    Breakpoint { name: "phone", max_width_px: Some(PHONE_MAX_WIDTH) },
];

/// Interaction state of a styleable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Normal,
    Hover,
}

impl State {
    pub const ALL: [State; 2] = [State::Normal, State::Hover];

    pub fn key(self) -> &'static str {
        match self {
            State::Normal => "normal",
            State::Hover => "hover",
        }
    }
}

/// Settings panel tab a field lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Content,
    Design,
    Advanced,
}

/// Structured field kinds understood by the field builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Spacing,
    Background,
    Border,
    BoxShadow,
    Transform,
    Transition,
    Position,
    Visibility,
    Animation,
    CustomCss,
}

impl FieldType {
    /// Kinds whose leaf value is an object of named sub-fields.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            FieldType::Spacing
                | FieldType::Background
                | FieldType::Border
                | FieldType::BoxShadow
                | FieldType::Transform
                | FieldType::Transition
                | FieldType::Position
                | FieldType::Visibility
                | FieldType::Animation
        )
    }
}

/// Output style of the serialized CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssFormat {
    /// One rule per line: `#id { a: b; c: d; }`
    #[default]
    Standard,
    /// No optional whitespace: `#id{a:b;c:d}`
    Compact,
}
