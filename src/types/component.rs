//! The Components v2 document tree.
//!
//! A [`Component`] is a closed sum over the eight node kinds the builder can
//! produce. On the wire each node is a flat JSON object carrying an integer
//! `type` tag; those tag values belong to Discord's API and must never be
//! renumbered. [`ActionRow`] and [`Container`] own their children directly,
//! so the tree can't contain shared nodes or cycles.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

use crate::types::id::ComponentId;
use crate::types::util::{is_false, ValueExt};

/// The ordered root-level sequence being edited.
pub type Document = Vec<Component>;

// ---------------------------------------------------------------------------
// Type tags
// ---------------------------------------------------------------------------

/// Integer component tags, as defined by the Discord API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum ComponentType {
    ActionRow = 1,
    Button = 2,
    StringSelect = 3,
    TextInput = 4,
    UserSelect = 5,
    RoleSelect = 6,
    MentionableSelect = 7,
    ChannelSelect = 8,
    // Components v2
    TextDisplay = 100,
    MediaGallery = 101,
    Separator = 102,
    Container = 103,
    Section = 104,
    Thumbnail = 105,
}

impl ComponentType {
    /// The kinds that have a [`Component`] variant.
    pub const SUPPORTED: [ComponentType; 8] = [
        ComponentType::TextDisplay,
        ComponentType::Button,
        ComponentType::StringSelect,
        ComponentType::ActionRow,
        ComponentType::Separator,
        ComponentType::Container,
        ComponentType::MediaGallery,
        ComponentType::Thumbnail,
    ];

    /// Look up a protocol tag.
    pub fn from_tag(tag: u64) -> Option<Self> {
        Some(match tag {
            1 => Self::ActionRow,
            2 => Self::Button,
            3 => Self::StringSelect,
            4 => Self::TextInput,
            5 => Self::UserSelect,
            6 => Self::RoleSelect,
            7 => Self::MentionableSelect,
            8 => Self::ChannelSelect,
            100 => Self::TextDisplay,
            101 => Self::MediaGallery,
            102 => Self::Separator,
            103 => Self::Container,
            104 => Self::Section,
            105 => Self::Thumbnail,
            _ => return None,
        })
    }

    /// The wire tag.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether this kind can be represented as a [`Component`].
    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }

    /// Buttons and select menus.
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::StringSelect
                | Self::UserSelect
                | Self::RoleSelect
                | Self::MentionableSelect
                | Self::ChannelSelect
        )
    }

    /// Kinds that own child components.
    pub fn is_container(self) -> bool {
        matches!(self, Self::ActionRow | Self::Container)
    }

    /// The variant name, e.g. `TextDisplay`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ActionRow => "ActionRow",
            Self::Button => "Button",
            Self::StringSelect => "StringSelect",
            Self::TextInput => "TextInput",
            Self::UserSelect => "UserSelect",
            Self::RoleSelect => "RoleSelect",
            Self::MentionableSelect => "MentionableSelect",
            Self::ChannelSelect => "ChannelSelect",
            Self::TextDisplay => "TextDisplay",
            Self::MediaGallery => "MediaGallery",
            Self::Separator => "Separator",
            Self::Container => "Container",
            Self::Section => "Section",
            Self::Thumbnail => "Thumbnail",
        }
    }

    /// Human-readable label shown in the component palette.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::ActionRow => "Action Row",
            Self::Button => "Button",
            Self::StringSelect => "Select Menu",
            Self::TextInput => "Text Input",
            Self::UserSelect => "User Select",
            Self::RoleSelect => "Role Select",
            Self::MentionableSelect => "Mentionable Select",
            Self::ChannelSelect => "Channel Select",
            Self::TextDisplay => "Text Display",
            Self::MediaGallery => "Media Gallery",
            Self::Separator => "Separator",
            Self::Container => "Container",
            Self::Section => "Section",
            Self::Thumbnail => "Thumbnail",
        }
    }

    /// Lowercase prefix used when minting ids.
    pub fn slug(self) -> &'static str {
        match self {
            Self::ActionRow => "actionrow",
            Self::Button => "button",
            Self::StringSelect => "select",
            Self::TextInput => "textinput",
            Self::UserSelect => "userselect",
            Self::RoleSelect => "roleselect",
            Self::MentionableSelect => "mentionableselect",
            Self::ChannelSelect => "channelselect",
            Self::TextDisplay => "text",
            Self::MediaGallery => "gallery",
            Self::Separator => "separator",
            Self::Container => "container",
            Self::Section => "section",
            Self::Thumbnail => "thumbnail",
        }
    }
}

/// Whether `tag` names a kind the builder can represent.
///
/// This is only the membership test; field limits are checked by
/// [`crate::validation::validate`].
pub fn is_known_type(tag: u64) -> bool {
    ComponentType::from_tag(tag).is_some_and(ComponentType::is_supported)
}

// ---------------------------------------------------------------------------
// Payload enums
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum ButtonStyle {
    #[default]
    Primary = 1,
    Secondary = 2,
    Success = 3,
    Danger = 4,
    Link = 5,
}

impl ButtonStyle {
    /// The discord.js enum member name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
            Self::Success => "Success",
            Self::Danger => "Danger",
            Self::Link => "Link",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum SeparatorSpacing {
    #[default]
    None = 0,
    Small = 1,
    Large = 2,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum ContainerAccent {
    #[default]
    None = 0,
    Primary = 1,
    Secondary = 2,
    Success = 3,
    Danger = 4,
}

// ---------------------------------------------------------------------------
// Node payloads
// ---------------------------------------------------------------------------

/// Emoji attached to a button or select option: a unicode name, or a
/// custom emoji snowflake (optionally animated).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDisplay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub style: ButtonStyle,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSelect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub custom_id: String,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

/// A row of up to five interactive components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SeparatorSpacing>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub divider: bool,
}

/// A boxed group of components with an optional accent bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<ContainerAccent>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub spoiler: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaGallery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub items: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(default)]
    pub url: String,
}

// ---------------------------------------------------------------------------
// The tagged union
// ---------------------------------------------------------------------------

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    ActionRow(ActionRow),
    Button(Button),
    StringSelect(StringSelect),
    TextDisplay(TextDisplay),
    MediaGallery(MediaGallery),
    Separator(Separator),
    Container(Container),
    Thumbnail(Thumbnail),
}

/// Errors converting loosely-typed JSON into a [`Component`].
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("component must be a JSON object")]
    NotAnObject,

    #[error("component is missing its `type` tag")]
    MissingType,

    #[error("component `type` must be an integer, got {0}")]
    InvalidTypeTag(Value),

    #[error("unknown component type {0}")]
    UnknownType(u64),

    #[error("malformed {kind:?} component: {source}")]
    Malformed {
        kind: ComponentType,
        #[source]
        source: serde_json::Error,
    },

    #[error("field `{0}` cannot be changed")]
    ImmutableField(&'static str),

    #[error("failed to serialize component: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ComponentError {
    /// `true` when the input isn't a component at all, as opposed to a
    /// recognised component with a bad payload.
    pub fn is_unrecognized(&self) -> bool {
        matches!(
            self,
            Self::NotAnObject | Self::MissingType | Self::InvalidTypeTag(_) | Self::UnknownType(_)
        )
    }
}

impl Component {
    /// The wire tag of this node.
    pub fn kind(&self) -> ComponentType {
        match self {
            Self::ActionRow(_) => ComponentType::ActionRow,
            Self::Button(_) => ComponentType::Button,
            Self::StringSelect(_) => ComponentType::StringSelect,
            Self::TextDisplay(_) => ComponentType::TextDisplay,
            Self::MediaGallery(_) => ComponentType::MediaGallery,
            Self::Separator(_) => ComponentType::Separator,
            Self::Container(_) => ComponentType::Container,
            Self::Thumbnail(_) => ComponentType::Thumbnail,
        }
    }

    /// The node's id, if it is addressable.
    pub fn id(&self) -> Option<&ComponentId> {
        match self {
            Self::ActionRow(c) => c.id.as_ref(),
            Self::Button(c) => c.id.as_ref(),
            Self::StringSelect(c) => c.id.as_ref(),
            Self::TextDisplay(c) => c.id.as_ref(),
            Self::MediaGallery(c) => c.id.as_ref(),
            Self::Separator(c) => c.id.as_ref(),
            Self::Container(c) => c.id.as_ref(),
            Self::Thumbnail(c) => c.id.as_ref(),
        }
    }

    fn id_slot(&mut self) -> &mut Option<ComponentId> {
        match self {
            Self::ActionRow(c) => &mut c.id,
            Self::Button(c) => &mut c.id,
            Self::StringSelect(c) => &mut c.id,
            Self::TextDisplay(c) => &mut c.id,
            Self::MediaGallery(c) => &mut c.id,
            Self::Separator(c) => &mut c.id,
            Self::Container(c) => &mut c.id,
            Self::Thumbnail(c) => &mut c.id,
        }
    }

    /// Whether `id` addresses this node.
    pub fn has_id(&self, id: &ComponentId) -> bool {
        self.id() == Some(id)
    }

    /// Builder-style id assignment for freshly constructed nodes.
    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        *self.id_slot() = Some(id.into());
        self
    }

    /// Mint an id if the node has none. Existing ids are never replaced.
    pub fn ensure_id(&mut self) -> &ComponentId {
        let prefix = self.kind().slug();
        self.id_slot()
            .get_or_insert_with(|| ComponentId::generate(prefix))
    }

    /// Child nodes of an [`ActionRow`] or [`Container`].
    pub fn children(&self) -> Option<&[Component]> {
        match self {
            Self::ActionRow(c) => Some(&c.components),
            Self::Container(c) => Some(&c.components),
            _ => None,
        }
    }

    /// Mutable access to the child list of an [`ActionRow`] or [`Container`].
    pub fn children_mut(&mut self) -> Option<&mut Vec<Component>> {
        match self {
            Self::ActionRow(c) => Some(&mut c.components),
            Self::Container(c) => Some(&mut c.components),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Button(_) | Self::StringSelect(_))
    }

    /// A deep copy in which every node of the subtree has a fresh id.
    pub fn with_fresh_ids(&self) -> Component {
        let mut copy = self.clone();
        copy.regenerate_ids();
        copy
    }

    /// A deep copy for duplication: the root id becomes
    /// `<id>_copy_<epoch-ms>_<seq>`, descendants get fresh ids.
    pub fn duplicate(&self) -> Component {
        let mut copy = self.with_fresh_ids();
        if let Some(original) = self.id() {
            *copy.id_slot() = Some(original.copy_of());
        }
        copy
    }

    fn regenerate_ids(&mut self) {
        let prefix = self.kind().slug();
        *self.id_slot() = Some(ComponentId::generate(prefix));
        if let Some(children) = self.children_mut() {
            for child in children {
                child.regenerate_ids();
            }
        }
    }

    /// Convert a loosely typed JSON node, dispatching on its `type` tag.
    pub fn try_from_value(value: Value) -> Result<Self, ComponentError> {
        let tag = match value.type_tag() {
            Some(tag) => tag,
            None if value.is_object() => return Err(ComponentError::MissingType),
            None => return Err(ComponentError::NotAnObject),
        };
        let raw = tag
            .as_u64()
            .ok_or_else(|| ComponentError::InvalidTypeTag(tag.clone()))?;
        let kind = ComponentType::from_tag(raw)
            .filter(|kind| kind.is_supported())
            .ok_or(ComponentError::UnknownType(raw))?;

        let malformed = |source| ComponentError::Malformed { kind, source };
        Ok(match kind {
            ComponentType::ActionRow => Self::ActionRow(value.deserialize_into().map_err(malformed)?),
            ComponentType::Button => Self::Button(value.deserialize_into().map_err(malformed)?),
            ComponentType::StringSelect => {
                Self::StringSelect(value.deserialize_into().map_err(malformed)?)
            }
            ComponentType::TextDisplay => {
                Self::TextDisplay(value.deserialize_into().map_err(malformed)?)
            }
            ComponentType::MediaGallery => {
                Self::MediaGallery(value.deserialize_into().map_err(malformed)?)
            }
            ComponentType::Separator => Self::Separator(value.deserialize_into().map_err(malformed)?),
            ComponentType::Container => Self::Container(value.deserialize_into().map_err(malformed)?),
            ComponentType::Thumbnail => Self::Thumbnail(value.deserialize_into().map_err(malformed)?),
            _ => return Err(ComponentError::UnknownType(raw)),
        })
    }

    /// The wire representation as a JSON value.
    pub fn to_value(&self) -> Result<Value, ComponentError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Shallow-merge `patch` into this node's wire fields and convert back.
    ///
    /// `id` and `type` may appear in the patch only with their current
    /// values.
    pub fn merge_patch(&self, patch: &Map<String, Value>) -> Result<Component, ComponentError> {
        let mut value = self.to_value()?;
        let Value::Object(fields) = &mut value else {
            return Err(ComponentError::NotAnObject);
        };

        for (key, new) in patch {
            match key.as_str() {
                "id" if fields.get("id") != Some(new) => {
                    return Err(ComponentError::ImmutableField("id"));
                }
                "type" if fields.get("type") != Some(new) => {
                    return Err(ComponentError::ImmutableField("type"));
                }
                _ => {
                    fields.insert(key.clone(), new.clone());
                }
            }
        }

        Component::try_from_value(value)
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    kind: ComponentType,
    #[serde(flatten)]
    inner: &'a T,
}

fn tagged<S: Serializer, T: Serialize>(
    serializer: S,
    kind: ComponentType,
    inner: &T,
) -> Result<S::Ok, S::Error> {
    Tagged { kind, inner }.serialize(serializer)
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::ActionRow(c) => tagged(serializer, kind, c),
            Self::Button(c) => tagged(serializer, kind, c),
            Self::StringSelect(c) => tagged(serializer, kind, c),
            Self::TextDisplay(c) => tagged(serializer, kind, c),
            Self::MediaGallery(c) => tagged(serializer, kind, c),
            Self::Separator(c) => tagged(serializer, kind, c),
            Self::Container(c) => tagged(serializer, kind, c),
            Self::Thumbnail(c) => tagged(serializer, kind, c),
        }
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Component::try_from_value(value).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
