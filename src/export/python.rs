//! discord.py output: the wire payload as Python dict literals.
//!
//! Independent of the discord.js generator, but the same tag dispatch.

use super::{quote, Entry};
use crate::types::*;

/// Ordered `"key": value` pairs of one Python dict literal.
#[derive(Default)]
struct PyDict(Vec<(&'static str, String)>);

impl PyDict {
    fn of_type(kind: ComponentType) -> Self {
        let mut dict = Self::default();
        dict.field("type", kind.tag());
        dict
    }

    fn field(&mut self, key: &'static str, value: impl ToString) {
        self.0.push((key, value.to_string()));
    }

    fn string(&mut self, key: &'static str, value: &str) {
        self.field(key, quote(value));
    }

    fn flag(&mut self, key: &'static str, set: bool) {
        if set {
            self.field(key, "True");
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn render(&self) -> String {
        let fields: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| format!("\"{key}\": {value}"))
            .collect();
        format!("{{{}}}", fields.join(", "))
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn emoji_dict(emoji: &Emoji) -> Option<String> {
    let mut dict = PyDict::default();
    if let Some(name) = &emoji.name {
        dict.string("name", name);
    }
    if let Some(id) = &emoji.id {
        dict.string("id", id);
    }
    dict.flag("animated", emoji.animated);
    (!dict.is_empty()).then(|| dict.render())
}

fn inline_list(items: impl IntoIterator<Item = String>) -> String {
    format!("[{}]", items.into_iter().collect::<Vec<_>>().join(", "))
}

fn children_list(children: &[Component], depth: usize) -> String {
    let rendered: Vec<String> = children
        .iter()
        .map(|child| generate_python_component(child, depth + 1))
        .collect();
    format!("[\n{}\n{}]", rendered.join(",\n"), indent(depth))
}

/// One node as an indented Python dict literal.
pub(crate) fn generate_python_component(component: &Component, depth: usize) -> String {
    let mut dict = PyDict::of_type(component.kind());
    match component {
        Component::TextDisplay(text) => dict.string("content", &text.content),
        Component::Button(button) => {
            dict.field("style", button.style as u8);
            dict.string("label", &button.label);
            if let Some(custom_id) = button.custom_id.as_deref().filter(|s| !s.is_empty()) {
                dict.string("custom_id", custom_id);
            }
            if let Some(url) = button.url.as_deref().filter(|s| !s.is_empty()) {
                dict.string("url", url);
            }
            if let Some(emoji) = button.emoji.as_ref().and_then(emoji_dict) {
                dict.field("emoji", emoji);
            }
            dict.flag("disabled", button.disabled);
        }
        Component::StringSelect(select) => {
            dict.string("custom_id", &select.custom_id);
            if let Some(placeholder) = &select.placeholder {
                dict.string("placeholder", placeholder);
            }
            if let Some(min) = select.min_values {
                dict.field("min_values", min);
            }
            if let Some(max) = select.max_values {
                dict.field("max_values", max);
            }
            dict.flag("disabled", select.disabled);
            let options = select.options.iter().map(|option| {
                let mut entry = PyDict::default();
                entry.string("label", &option.label);
                entry.string("value", &option.value);
                if let Some(description) = &option.description {
                    entry.string("description", description);
                }
                if let Some(emoji) = option.emoji.as_ref().and_then(emoji_dict) {
                    entry.field("emoji", emoji);
                }
                entry.flag("default", option.default);
                entry.render()
            });
            dict.field("options", inline_list(options));
        }
        Component::ActionRow(row) => {
            dict.field("components", children_list(&row.components, depth));
        }
        Component::Container(container) => {
            if let Some(accent) = container.accent.filter(|a| *a != ContainerAccent::None) {
                dict.field("accent", accent as u8);
            }
            dict.flag("spoiler", container.spoiler);
            if !container.components.is_empty() {
                dict.field("components", children_list(&container.components, depth));
            }
        }
        Component::Separator(separator) => {
            if let Some(spacing) = separator.spacing.filter(|s| *s != SeparatorSpacing::None) {
                dict.field("spacing", spacing as u8);
            }
            dict.flag("divider", separator.divider);
        }
        Component::MediaGallery(gallery) => {
            let items = gallery.items.iter().map(|item| {
                let mut entry = PyDict::default();
                entry.string("url", &item.url);
                if let Some(description) = &item.description {
                    entry.string("description", description);
                }
                entry.flag("spoiler", item.spoiler);
                entry.render()
            });
            dict.field("items", inline_list(items));
        }
        Component::Thumbnail(thumbnail) => dict.string("url", &thumbnail.url),
    }
    format!("{}{}", indent(depth), dict.render())
}

pub fn format_python(entries: &[Entry<'_>]) -> String {
    let body: Vec<String> = entries
        .iter()
        .map(|entry| match entry {
            Entry::Node(component) => generate_python_component(component, 1),
            Entry::Unsupported(tag) => format!("    # Component type {tag} not yet supported"),
        })
        .collect();
    format!(
        "from discord import ui, ButtonStyle\n\n\
         components = [\n{}\n]\n\n\
         await interaction.response.send_message(\n    components=components,\n    flags=discord.MessageFlags.is_components_v2\n)",
        body.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_dict_in_field_order() {
        let component = Component::Button(Button {
            style: ButtonStyle::Link,
            label: "Docs".into(),
            url: Some("https://discord.dev".into()),
            emoji: Some(Emoji {
                id: Some("42".into()),
                name: Some("book".into()),
                animated: true,
            }),
            ..Default::default()
        });
        assert_eq!(
            generate_python_component(&component, 1),
            r#"    {"type": 2, "style": 5, "label": "Docs", "url": "https://discord.dev", "emoji": {"name": "book", "id": "42", "animated": True}}"#
        );
    }

    #[test]
    fn whole_module_template() {
        let code = format_python(&[
            Entry::Node(&text_display("hi")),
            Entry::Unsupported("9999"),
        ]);
        assert_eq!(
            code,
            "from discord import ui, ButtonStyle\n\n\
             components = [\n    {\"type\": 100, \"content\": \"hi\"},\n    # Component type 9999 not yet supported\n]\n\n\
             await interaction.response.send_message(\n    components=components,\n    flags=discord.MessageFlags.is_components_v2\n)"
        );
    }

    #[test]
    fn children_nest_with_deeper_indent() {
        let row = action_row(vec![button(ButtonStyle::Primary, "A", "a")]);
        let code = generate_python_component(&row, 1);
        assert_eq!(
            code,
            "    {\"type\": 1, \"components\": [\n        {\"type\": 2, \"style\": 1, \"label\": \"A\", \"custom_id\": \"a\"}\n    ]}"
        );
    }

    #[test]
    fn container_accent_and_spoiler() {
        let mut boxed = container(Some(ContainerAccent::Danger), Vec::new());
        if let Component::Container(c) = &mut boxed {
            c.spoiler = true;
        }
        assert_eq!(
            generate_python_component(&boxed, 0),
            r#"{"type": 103, "accent": 4, "spoiler": True}"#
        );
    }
}
