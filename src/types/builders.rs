//! Helper constructors for component nodes.
//!
//! Filling in a payload struct by hand means spelling out every optional
//! field; these helpers hide that and mint a fresh [`ComponentId`] for every
//! node they create, so the result is immediately addressable by the store.
//!
//! ```ignore
//! let message = vec![
//!     text_display("Pick one"),
//!     action_row(vec![
//!         button(ButtonStyle::Success, "Yes", "vote-yes"),
//!         button(ButtonStyle::Danger, "No", "vote-no"),
//!     ]),
//! ];
//! ```

use crate::types::component::{
    ActionRow, Button, ButtonStyle, Component, ComponentType, Container, ContainerAccent, Emoji,
    MediaGallery, MediaItem, SelectOption, Separator, SeparatorSpacing, StringSelect,
    TextDisplay, Thumbnail,
};
use crate::types::id::{random_suffix, ComponentId};

fn fresh(kind: ComponentType) -> Option<ComponentId> {
    Some(ComponentId::generate(kind.slug()))
}

/// A block of markdown text.
pub fn text_display(content: impl Into<String>) -> Component {
    Component::TextDisplay(TextDisplay {
        id: fresh(ComponentType::TextDisplay),
        content: content.into(),
    })
}

/// An interactive button. For link buttons use [`link_button`].
pub fn button(style: ButtonStyle, label: impl Into<String>, custom_id: impl Into<String>) -> Component {
    Component::Button(Button {
        id: fresh(ComponentType::Button),
        style,
        label: label.into(),
        custom_id: Some(custom_id.into()),
        url: None,
        disabled: false,
        emoji: None,
    })
}

/// A link button (style 5): no custom id, opens `url`.
pub fn link_button(label: impl Into<String>, url: impl Into<String>) -> Component {
    Component::Button(Button {
        id: fresh(ComponentType::Button),
        style: ButtonStyle::Link,
        label: label.into(),
        custom_id: None,
        url: Some(url.into()),
        disabled: false,
        emoji: None,
    })
}

/// A unicode emoji reference.
pub fn unicode_emoji(name: impl Into<String>) -> Emoji {
    Emoji {
        id: None,
        name: Some(name.into()),
        animated: false,
    }
}

/// A string select menu allowing a single choice.
pub fn string_select(
    custom_id: impl Into<String>,
    placeholder: impl Into<String>,
    options: Vec<SelectOption>,
) -> Component {
    Component::StringSelect(StringSelect {
        id: fresh(ComponentType::StringSelect),
        custom_id: custom_id.into(),
        options,
        placeholder: Some(placeholder.into()),
        min_values: Some(1),
        max_values: Some(1),
        disabled: false,
    })
}

pub fn select_option(label: impl Into<String>, value: impl Into<String>) -> SelectOption {
    SelectOption {
        label: label.into(),
        value: value.into(),
        ..Default::default()
    }
}

pub fn action_row(components: Vec<Component>) -> Component {
    Component::ActionRow(ActionRow {
        id: fresh(ComponentType::ActionRow),
        components,
    })
}

pub fn container(accent: Option<ContainerAccent>, components: Vec<Component>) -> Component {
    Component::Container(Container {
        id: fresh(ComponentType::Container),
        components,
        accent,
        spoiler: false,
    })
}

pub fn separator(spacing: SeparatorSpacing, divider: bool) -> Component {
    Component::Separator(Separator {
        id: fresh(ComponentType::Separator),
        spacing: Some(spacing),
        divider,
    })
}

pub fn media_item(url: impl Into<String>) -> MediaItem {
    MediaItem {
        url: url.into(),
        ..Default::default()
    }
}

pub fn media_gallery(items: Vec<MediaItem>) -> Component {
    Component::MediaGallery(MediaGallery {
        id: fresh(ComponentType::MediaGallery),
        items,
    })
}

pub fn thumbnail(url: impl Into<String>) -> Component {
    Component::Thumbnail(Thumbnail {
        id: fresh(ComponentType::Thumbnail),
        url: url.into(),
    })
}

// ===========================================================================
// Palette defaults
// ===========================================================================

/// The node the palette inserts for `kind`, or `None` for kinds the palette
/// doesn't offer.
pub fn create_default(kind: ComponentType) -> Option<Component> {
    let component = match kind {
        ComponentType::TextDisplay => text_display("New text display"),
        ComponentType::Button => button(
            ButtonStyle::Primary,
            "New Button",
            format!("btn-{}", random_suffix(8)),
        ),
        ComponentType::StringSelect => string_select(
            format!("select-{}", random_suffix(8)),
            "Choose an option",
            vec![
                select_option("Option 1", "opt1"),
                select_option("Option 2", "opt2"),
            ],
        ),
        ComponentType::Container => container(Some(ContainerAccent::Primary), Vec::new()),
        ComponentType::ActionRow => action_row(Vec::new()),
        ComponentType::Separator => separator(SeparatorSpacing::Small, false),
        ComponentType::MediaGallery => media_gallery(Vec::new()),
        ComponentType::Thumbnail => thumbnail("https://cdn.discordapp.com/embed/avatars/0.png"),
        _ => return None,
    };
    Some(component)
}

// ===========================================================================
// Tests
// ===========================================================================
