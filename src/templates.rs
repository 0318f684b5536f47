//! Starter documents offered from the template picker.
//!
//! Every call builds the template anew so each insertion gets fresh ids.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::DocumentStore;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Basic,
    Advanced,
    Interactive,
    Media,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub components: Document,
}

impl Template {
    fn new(id: &str, name: &str, description: &str, category: TemplateCategory, components: Document) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            components,
        }
    }
}

pub const TEMPLATE_IDS: [&str; 4] = ["welcome-message", "announcement", "poll", "menu"];

fn welcome_message() -> Template {
    Template::new(
        "welcome-message",
        "Welcome Message",
        "Simple welcome message with button",
        TemplateCategory::Basic,
        vec![
            text_display("Welcome to our server! 👋"),
            separator(SeparatorSpacing::Small, true),
            action_row(vec![button(ButtonStyle::Primary, "Get Started", "welcome-start")]),
        ],
    )
}

fn announcement() -> Template {
    Template::new(
        "announcement",
        "Announcement",
        "Important announcement with accent",
        TemplateCategory::Basic,
        vec![container(
            Some(ContainerAccent::Primary),
            vec![
                text_display("📢 Important Announcement"),
                text_display("This is an important message for all members."),
            ],
        )],
    )
}

fn poll() -> Template {
    Template::new(
        "poll",
        "Simple Poll",
        "Poll with multiple choice buttons",
        TemplateCategory::Interactive,
        vec![
            text_display("📊 What is your favorite color?"),
            action_row(vec![
                button(ButtonStyle::Primary, "🔵 Blue", "poll-blue"),
                button(ButtonStyle::Success, "🟢 Green", "poll-green"),
                button(ButtonStyle::Danger, "🔴 Red", "poll-red"),
            ]),
        ],
    )
}

fn selection_menu() -> Template {
    let mut select = string_select(
        "menu-select",
        "Select an option",
        vec![
            select_option("Option 1", "opt1"),
            select_option("Option 2", "opt2"),
            select_option("Option 3", "opt3"),
        ],
    );
    // The menu template leaves the choice bounds to the platform defaults.
    if let Component::StringSelect(s) = &mut select {
        s.min_values = None;
        s.max_values = None;
    }
    Template::new(
        "menu",
        "Selection Menu",
        "Dropdown menu for options",
        TemplateCategory::Interactive,
        vec![text_display("Choose an option:"), action_row(vec![select])],
    )
}

pub fn all_templates() -> Vec<Template> {
    vec![welcome_message(), announcement(), poll(), selection_menu()]
}

pub fn get_template(id: &str) -> Option<Template> {
    match id {
        "welcome-message" => Some(welcome_message()),
        "announcement" => Some(announcement()),
        "poll" => Some(poll()),
        "menu" => Some(selection_menu()),
        _ => None,
    }
}

pub fn templates_by_category(category: TemplateCategory) -> Vec<Template> {
    all_templates()
        .into_iter()
        .filter(|t| t.category == category)
        .collect()
}

/// Append the template's nodes to the document as one undoable step.
/// `false` for an unknown template id.
pub fn apply_template(store: &mut DocumentStore, id: &str) -> bool {
    let Some(template) = get_template(id) else {
        return false;
    };
    debug!(template = id, count = template.components.len(), "applying template");
    let mut components = store.components().to_vec();
    components.extend(template.components);
    store.replace_all(components);
    true
}
