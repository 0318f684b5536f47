//! Free-text search over the document's root nodes.

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Every piece of text a user might search a node by, space-joined.
///
/// Starts with the kind's name and descends into children, so a row matches
/// on the labels of its buttons.
pub fn searchable_text(component: &Component) -> String {
    let nested: Vec<String>;
    let mut parts: Vec<&str> = vec![component.kind().name()];
    match component {
        Component::TextDisplay(text) => parts.push(&text.content),
        Component::Button(button) => {
            parts.push(&button.label);
            parts.extend(button.custom_id.as_deref());
            parts.extend(button.url.as_deref());
        }
        Component::StringSelect(select) => {
            parts.extend(select.placeholder.as_deref());
            parts.push(&select.custom_id);
            for option in &select.options {
                parts.push(&option.label);
                parts.push(&option.value);
                parts.extend(option.description.as_deref());
            }
        }
        Component::ActionRow(_) | Component::Container(_) => {
            nested = component
                .children()
                .unwrap_or_default()
                .iter()
                .map(searchable_text)
                .collect();
            parts.extend(nested.iter().map(String::as_str));
        }
        Component::Separator(_) | Component::MediaGallery(_) | Component::Thumbnail(_) => {}
    }
    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}

/// Root nodes matching `query` (case-insensitive substring) and `kind`.
/// An empty query with no kind returns everything.
pub fn filter_components(components: &[Component], query: &str, kind: Option<ComponentType>) -> Document {
    let query = query.to_lowercase();
    components
        .iter()
        .filter(|c| kind.map_or(true, |kind| c.kind() == kind))
        .filter(|c| query.is_empty() || searchable_text(c).to_lowercase().contains(&query))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total: usize,
    pub filtered: usize,
    pub hidden: usize,
}

impl SearchStats {
    pub fn new(total: usize, filtered: usize) -> Self {
        Self {
            total,
            filtered,
            hidden: total.saturating_sub(filtered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        vec![
            text_display("Welcome aboard").with_id("intro"),
            action_row(vec![
                button(ButtonStyle::Primary, "Accept rules", "accept"),
                link_button("Docs", "https://discord.dev"),
            ])
            .with_id("row"),
            string_select(
                "pick",
                "Choose a role",
                vec![select_option("Artist", "artist")],
            )
            .with_id("menu"),
            separator(SeparatorSpacing::Small, true).with_id("sep"),
        ]
    }

    #[test]
    fn text_covers_children_and_options() {
        let doc = doc();
        let row = searchable_text(&doc[1]);
        assert!(row.starts_with("ActionRow Button Accept rules accept"));
        assert!(row.contains("https://discord.dev"));

        let menu = searchable_text(&doc[2]);
        assert_eq!(menu, "StringSelect Choose a role pick Artist artist");
        assert_eq!(searchable_text(&doc[3]), "Separator");
    }

    #[test]
    fn filters_case_insensitively() {
        let doc = doc();
        let hits = filter_components(&doc, "RULES", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id().map(ComponentId::as_str), Some("row"));

        // Kind names are searchable.
        assert_eq!(filter_components(&doc, "separator", None).len(), 1);
        assert!(filter_components(&doc, "nothing like this", None).is_empty());
    }

    #[test]
    fn kind_filter_alone_and_combined() {
        let doc = doc();
        assert_eq!(filter_components(&doc, "", None).len(), 4);
        assert_eq!(filter_components(&doc, "", Some(ComponentType::TextDisplay)).len(), 1);
        assert!(filter_components(&doc, "rules", Some(ComponentType::TextDisplay)).is_empty());
    }

    #[test]
    fn stats_count_hidden() {
        assert_eq!(
            SearchStats::new(4, 1),
            SearchStats {
                total: 4,
                filtered: 1,
                hidden: 3
            }
        );
    }
}
