//! discord.js builder-chain generator.

use std::fmt::Display;

use super::{quote, Entry, Imports};
use crate::types::*;

/// Accumulates one `new XBuilder()` expression and its chained calls.
struct Chain {
    depth: usize,
    out: String,
}

impl Chain {
    fn new(builder: &str, depth: usize) -> Self {
        Self {
            depth,
            out: format!("{}new {builder}()", indent(depth)),
        }
    }

    fn call(&mut self, method: &str, args: impl Display) {
        self.out
            .push_str(&format!("\n{}.{method}({args})", indent(self.depth + 1)));
    }

    /// A call whose arguments each sit on their own line.
    fn call_list(&mut self, method: &str, items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        let chain = indent(self.depth + 1);
        self.out.push_str(&format!(
            "\n{chain}.{method}(\n{}\n{chain})",
            items.join(",\n")
        ));
    }

    fn finish(self) -> String {
        self.out
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn emoji_object(emoji: &Emoji) -> Option<String> {
    match (&emoji.id, &emoji.name) {
        (Some(id), name) => Some(format!(
            "{{ name: {}, id: {}{} }}",
            quote(name.as_deref().unwrap_or("emoji")),
            quote(id),
            if emoji.animated { ", animated: true" } else { "" }
        )),
        (None, Some(name)) => Some(quote(name)),
        (None, None) => None,
    }
}

fn option_object(option: &SelectOption) -> String {
    let mut fields = vec![
        format!("label: {}", quote(&option.label)),
        format!("value: {}", quote(&option.value)),
    ];
    if let Some(description) = &option.description {
        fields.push(format!("description: {}", quote(description)));
    }
    if let Some(emoji) = option.emoji.as_ref().and_then(emoji_object) {
        fields.push(format!("emoji: {emoji}"));
    }
    if option.default {
        fields.push("default: true".into());
    }
    format!("{{ {} }}", fields.join(", "))
}

fn media_object(item: &MediaItem) -> String {
    let mut fields = vec![format!("media: {{ url: {} }}", quote(&item.url))];
    if let Some(description) = &item.description {
        fields.push(format!("description: {}", quote(description)));
    }
    if item.spoiler {
        fields.push("spoiler: true".into());
    }
    format!("{{ {} }}", fields.join(", "))
}

/// Builder-chain source for one node at `depth` levels of indentation.
/// Referenced builder names are added to `imports`.
pub(crate) fn generate_component_code(component: &Component, imports: &mut Imports, depth: usize) -> String {
    let item_indent = indent(depth + 2);
    match component {
        Component::TextDisplay(text) => {
            imports.add("TextDisplayBuilder");
            let mut chain = Chain::new("TextDisplayBuilder", depth);
            chain.call("setContent", quote(&text.content));
            chain.finish()
        }
        Component::Button(button) => {
            imports.add("ButtonBuilder");
            imports.add("ButtonStyle");
            let mut chain = Chain::new("ButtonBuilder", depth);
            chain.call("setStyle", format!("ButtonStyle.{}", button.style.name()));
            chain.call("setLabel", quote(&button.label));
            if let Some(custom_id) = button.custom_id.as_deref().filter(|s| !s.is_empty()) {
                chain.call("setCustomId", quote(custom_id));
            }
            if let Some(url) = button.url.as_deref().filter(|s| !s.is_empty()) {
                chain.call("setURL", quote(url));
            }
            if let Some(emoji) = button.emoji.as_ref().and_then(emoji_object) {
                chain.call("setEmoji", emoji);
            }
            if button.disabled {
                chain.call("setDisabled", true);
            }
            chain.finish()
        }
        Component::StringSelect(select) => {
            imports.add("StringSelectMenuBuilder");
            let mut chain = Chain::new("StringSelectMenuBuilder", depth);
            let custom_id = if select.custom_id.is_empty() {
                "select"
            } else {
                &select.custom_id
            };
            chain.call("setCustomId", quote(custom_id));
            if let Some(placeholder) = select.placeholder.as_deref().filter(|s| !s.is_empty()) {
                chain.call("setPlaceholder", quote(placeholder));
            }
            if let Some(min) = select.min_values {
                chain.call("setMinValues", min);
            }
            if let Some(max) = select.max_values {
                chain.call("setMaxValues", max);
            }
            if select.disabled {
                chain.call("setDisabled", true);
            }
            let options = select
                .options
                .iter()
                .map(|option| format!("{item_indent}{}", option_object(option)))
                .collect();
            chain.call_list("addOptions", options);
            chain.finish()
        }
        Component::ActionRow(row) => {
            imports.add("ActionRowBuilder");
            let mut chain = Chain::new("ActionRowBuilder", depth);
            let children = row
                .components
                .iter()
                .map(|child| generate_component_code(child, imports, depth + 2))
                .collect();
            chain.call_list("addComponents", children);
            chain.finish()
        }
        Component::Container(container) => {
            imports.add("ContainerBuilder");
            let mut chain = Chain::new("ContainerBuilder", depth);
            if let Some(accent) = container.accent.filter(|a| *a != ContainerAccent::None) {
                chain.call("setAccent", accent as u8);
            }
            if container.spoiler {
                chain.call("setSpoiler", true);
            }
            let children = container
                .components
                .iter()
                .map(|child| generate_component_code(child, imports, depth + 2))
                .collect();
            chain.call_list("addComponents", children);
            chain.finish()
        }
        Component::Separator(separator) => {
            imports.add("SeparatorBuilder");
            let mut chain = Chain::new("SeparatorBuilder", depth);
            if let Some(spacing) = separator.spacing.filter(|s| *s != SeparatorSpacing::None) {
                chain.call("setSpacing", spacing as u8);
            }
            if separator.divider {
                chain.call("setDivider", true);
            }
            chain.finish()
        }
        Component::MediaGallery(gallery) => {
            imports.add("MediaGalleryBuilder");
            let mut chain = Chain::new("MediaGalleryBuilder", depth);
            let items = gallery
                .items
                .iter()
                .map(|item| format!("{item_indent}{}", media_object(item)))
                .collect();
            chain.call_list("addItems", items);
            chain.finish()
        }
        Component::Thumbnail(thumbnail) => {
            imports.add("ThumbnailBuilder");
            let mut chain = Chain::new("ThumbnailBuilder", depth);
            chain.call("setURL", quote(&thumbnail.url));
            chain.finish()
        }
    }
}

/// The root array body shared by the JavaScript and TypeScript outputs.
pub(crate) fn component_list(entries: &[Entry<'_>], imports: &mut Imports) -> String {
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Node(component) => generate_component_code(component, imports, 1),
            Entry::Unsupported(tag) => format!("  // Component type {tag} not yet supported"),
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

pub fn format_discord_js(entries: &[Entry<'_>]) -> String {
    let mut imports = Imports::default();
    let body = component_list(entries, &mut imports);
    format!(
        "import {{ {} }} from 'discord.js';\n\n\
         const components = [\n{body}\n];\n\n\
         await interaction.reply({{\n  components,\n  flags: MessageFlags.IsComponentsV2,\n}});",
        imports.with_message_flags()
    )
}
