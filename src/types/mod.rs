//! Wire types for Discord Components v2 messages.
//!
//! Everything that crosses the serialization boundary lives here: the
//! [`Component`] tree, its integer tag enums, the [`ComponentId`] newtype
//! and the [`DiscordMessage`] envelope. Integer tags are fixed by Discord's
//! API; the serde impls in [`component`] preserve them exactly.

/// The component tree and its payload types.
pub mod component;

/// Opaque component identifiers.
pub mod id;

/// Message envelope and flags.
pub mod message;

/// Helper constructors and palette defaults.
pub mod builders;

/// Extension traits on component lists.
pub mod ext;

/// Serde helpers.
pub(crate) mod util;

// ===========================================================================
// Convenience re-exports
// ===========================================================================
// The rest of the codebase does `use crate::types::*`.

pub use self::component::{
    is_known_type, ActionRow, Button, ButtonStyle, Component, ComponentError, ComponentType,
    Container, ContainerAccent, Document, Emoji, MediaGallery, MediaItem, SelectOption, Separator,
    SeparatorSpacing, StringSelect, TextDisplay, Thumbnail,
};
pub use self::ext::DocumentExt;
pub use self::id::ComponentId;
pub use self::message::{DiscordMessage, MessageFlags};

pub use self::builders::{
    action_row, button, container, create_default, link_button, media_gallery, media_item,
    select_option, separator, string_select, text_display, thumbnail, unicode_emoji,
};
