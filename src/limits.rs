//! Discord API limits for Components v2 messages.
//!
//! Single source of truth for every length and count ceiling the validator
//! enforces. Values come from the Discord API documentation.

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

pub const MESSAGE_CONTENT_LENGTH: usize = 2000;
pub const MESSAGE_EMBEDS: usize = 10;
pub const MESSAGE_COMPONENTS: usize = 5;

// ---------------------------------------------------------------------------
// Interactive components
// ---------------------------------------------------------------------------

pub const ACTION_ROW_COMPONENTS: usize = 5;
pub const SELECT_OPTIONS: usize = 25;
pub const BUTTON_LABEL_LENGTH: usize = 80;
pub const SELECT_PLACEHOLDER_LENGTH: usize = 150;
pub const SELECT_OPTION_LABEL_LENGTH: usize = 100;
pub const SELECT_OPTION_DESCRIPTION_LENGTH: usize = 100;
pub const SELECT_OPTION_VALUE_LENGTH: usize = 100;
pub const CUSTOM_ID_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Layout and content components
// ---------------------------------------------------------------------------

pub const TEXT_DISPLAY_CONTENT_LENGTH: usize = 4000;
pub const MEDIA_GALLERY_ITEMS: usize = 10;
pub const MEDIA_URL_LENGTH: usize = 2048;
pub const MEDIA_DESCRIPTION_LENGTH: usize = 200;
pub const CONTAINER_COMPONENTS: usize = 10;

// ---------------------------------------------------------------------------
// Messages surfaced to the editor
// ---------------------------------------------------------------------------

pub mod messages {
    use super::*;

    pub const INVALID_URL: &str = "Invalid URL format";
    pub const CUSTOM_ID_REQUIRED: &str = "Custom ID is required for interactive components";

    pub fn button_label_too_long() -> String {
        format!("Button label must be {BUTTON_LABEL_LENGTH} characters or less")
    }

    pub fn text_content_too_long() -> String {
        format!("Text content must be {TEXT_DISPLAY_CONTENT_LENGTH} characters or less")
    }

    pub fn too_many_select_options() -> String {
        format!("Select menu can have at most {SELECT_OPTIONS} options")
    }

    pub fn too_many_action_row_components() -> String {
        format!("Action row can have at most {ACTION_ROW_COMPONENTS} components")
    }

    pub fn too_many_container_components() -> String {
        format!("Container can have at most {CONTAINER_COMPONENTS} components")
    }

    pub fn too_many_media_items() -> String {
        format!("Media gallery can have at most {MEDIA_GALLERY_ITEMS} items")
    }

    pub fn custom_id_too_long() -> String {
        format!("Custom ID must be {CUSTOM_ID_LENGTH} characters or less")
    }

    /// Generic ceiling message for fields without a dedicated one.
    pub fn too_long(field: &str, limit: usize) -> String {
        format!("{field} must be {limit} characters or less")
    }
}
