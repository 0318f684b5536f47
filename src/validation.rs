//! Field-level validation against Discord's component limits.
//!
//! Validation is advisory: the store never calls it on write, so the editor
//! can hold momentarily invalid states (an empty label mid-typing). Every
//! violated constraint produces its own [`ValidationError`]; nothing
//! short-circuits on the first failure.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::limits::{self, messages};
use crate::types::*;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Closed set of validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    TooLong,
    InvalidUrl,
    TooMany,
    /// A payload or child of the wrong shape.
    InvalidType,
    /// `min_values`/`max_values` out of order or out of bounds.
    InvalidRange,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooLong => "too_long",
            Self::InvalidUrl => "invalid_url",
            Self::TooMany => "too_many",
            Self::InvalidType => "invalid_type",
            Self::InvalidRange => "invalid_range",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated constraint. `field` is a dotted path such as
/// `components.1.label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ErrorCode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// The errors reported for `field`.
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }
}

/// Result of [`validate_many`]. Nodes without an id are keyed
/// `component_<index>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchValidationResult {
    pub valid: bool,
    pub errors: BTreeMap<String, Vec<ValidationError>>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

struct Collector {
    prefix: String,
    errors: Vec<ValidationError>,
}

impl Collector {
    fn new() -> Self {
        Self {
            prefix: String::new(),
            errors: Vec::new(),
        }
    }

    fn path(&self, field: &str) -> String {
        match (self.prefix.is_empty(), field.is_empty()) {
            (true, _) => field.to_string(),
            (false, true) => self.prefix.clone(),
            (false, false) => format!("{}.{}", self.prefix, field),
        }
    }

    fn push(&mut self, field: &str, code: ErrorCode, message: impl Into<String>) {
        let field = self.path(field);
        self.errors.push(ValidationError {
            field,
            message: message.into(),
            code,
        });
    }

    fn max_len(&mut self, field: &str, value: &str, limit: usize, message: impl FnOnce() -> String) {
        if value.chars().count() > limit {
            self.push(field, ErrorCode::TooLong, message());
        }
    }

    fn url(&mut self, field: &str, value: &str) {
        if !validate_url(value) {
            self.push(field, ErrorCode::InvalidUrl, messages::INVALID_URL);
        }
        self.max_len(field, value, limits::MEDIA_URL_LENGTH, || {
            messages::too_long("URL", limits::MEDIA_URL_LENGTH)
        });
    }

    /// Run `f` with `segment` appended to the field prefix.
    fn nested(&mut self, segment: &str, f: impl FnOnce(&mut Self)) {
        let saved = self.prefix.clone();
        self.prefix = self.path(segment);
        f(self);
        self.prefix = saved;
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Check one node (and its children) against the limits.
pub fn validate(component: &Component) -> ValidationResult {
    let mut out = Collector::new();
    check_component(&mut out, component);
    ValidationResult::from_errors(out.errors)
}

/// Validate loosely typed JSON.
///
/// Returns `Err` when the input isn't a component at all (not an object,
/// no `type`, or a tag outside the supported set). A recognised tag with a
/// malformed payload is reported as an `invalid_type` error instead.
pub fn validate_value(value: &Value) -> Result<ValidationResult, ComponentError> {
    match Component::try_from_value(value.clone()) {
        Ok(component) => Ok(validate(&component)),
        Err(ComponentError::Malformed { source, .. }) => {
            Ok(ValidationResult::from_errors(vec![ValidationError {
                field: String::new(),
                message: source.to_string(),
                code: ErrorCode::InvalidType,
            }]))
        }
        Err(other) => Err(other),
    }
}

/// Validate every root node.
pub fn validate_many(components: &[Component]) -> BatchValidationResult {
    let mut result = BatchValidationResult::default();

    for (index, component) in components.iter().enumerate() {
        let checked = validate(component);
        if checked.valid {
            result.valid_count += 1;
        } else {
            result.invalid_count += 1;
            let key = component
                .id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("component_{index}"));
            result.errors.entry(key).or_default().extend(checked.errors);
        }
    }

    result.valid = result.invalid_count == 0;
    trace!(
        valid = result.valid_count,
        invalid = result.invalid_count,
        "validated components"
    );
    result
}

/// One-line summary for a status bar.
pub fn validation_summary(result: &BatchValidationResult) -> String {
    if result.valid {
        format!("All {} components are valid", result.valid_count)
    } else {
        format!(
            "{} valid, {} invalid components",
            result.valid_count, result.invalid_count
        )
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Strict URL parse. Relative references and empty strings are invalid.
pub fn validate_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

pub fn validate_custom_id(custom_id: &str) -> ValidationResult {
    let mut out = Collector::new();
    check_custom_id(&mut out, Some(custom_id), true);
    ValidationResult::from_errors(out.errors)
}

pub fn validate_button_label(label: &str) -> ValidationResult {
    let mut out = Collector::new();
    if label.is_empty() {
        out.push("label", ErrorCode::Required, "Button label is required");
    }
    out.max_len("label", label, limits::BUTTON_LABEL_LENGTH, messages::button_label_too_long);
    ValidationResult::from_errors(out.errors)
}

pub fn validate_text_content(content: &str) -> ValidationResult {
    let mut out = Collector::new();
    out.max_len(
        "content",
        content,
        limits::TEXT_DISPLAY_CONTENT_LENGTH,
        messages::text_content_too_long,
    );
    ValidationResult::from_errors(out.errors)
}

// ---------------------------------------------------------------------------
// Per-variant rules
// ---------------------------------------------------------------------------

fn check_component(out: &mut Collector, component: &Component) {
    match component {
        Component::TextDisplay(text) => {
            out.max_len(
                "content",
                &text.content,
                limits::TEXT_DISPLAY_CONTENT_LENGTH,
                messages::text_content_too_long,
            );
        }
        Component::Button(button) => check_button(out, button),
        Component::StringSelect(select) => check_select(out, select),
        Component::ActionRow(row) => {
            if row.components.len() > limits::ACTION_ROW_COMPONENTS {
                out.push(
                    "components",
                    ErrorCode::TooMany,
                    messages::too_many_action_row_components(),
                );
            }
            for (index, child) in row.components.iter().enumerate() {
                out.nested(&format!("components.{index}"), |out| {
                    if !child.is_interactive() {
                        out.push(
                            "",
                            ErrorCode::InvalidType,
                            "Action rows can only hold buttons and select menus",
                        );
                    }
                    check_component(out, child);
                });
            }
        }
        Component::Container(container) => {
            if container.components.len() > limits::CONTAINER_COMPONENTS {
                out.push(
                    "components",
                    ErrorCode::TooMany,
                    messages::too_many_container_components(),
                );
            }
            for (index, child) in container.components.iter().enumerate() {
                out.nested(&format!("components.{index}"), |out| {
                    if matches!(child, Component::Container(_)) {
                        out.push("", ErrorCode::InvalidType, "Containers cannot be nested");
                    }
                    check_component(out, child);
                });
            }
        }
        Component::MediaGallery(gallery) => {
            if gallery.items.is_empty() {
                out.push("items", ErrorCode::Required, "Media gallery needs at least one item");
            } else if gallery.items.len() > limits::MEDIA_GALLERY_ITEMS {
                out.push("items", ErrorCode::TooMany, messages::too_many_media_items());
            }
            for (index, item) in gallery.items.iter().enumerate() {
                out.nested(&format!("items.{index}"), |out| {
                    out.url("url", &item.url);
                    if let Some(description) = &item.description {
                        out.max_len("description", description, limits::MEDIA_DESCRIPTION_LENGTH, || {
                            messages::too_long("Description", limits::MEDIA_DESCRIPTION_LENGTH)
                        });
                    }
                });
            }
        }
        Component::Thumbnail(thumbnail) => out.url("url", &thumbnail.url),
        Component::Separator(_) => {}
    }
}

fn check_custom_id(out: &mut Collector, custom_id: Option<&str>, required: bool) {
    match custom_id {
        Some(id) if !id.is_empty() => {
            out.max_len("custom_id", id, limits::CUSTOM_ID_LENGTH, messages::custom_id_too_long);
        }
        _ if required => out.push("custom_id", ErrorCode::Required, messages::CUSTOM_ID_REQUIRED),
        _ => {}
    }
}

fn check_button(out: &mut Collector, button: &Button) {
    if button.label.is_empty() && button.emoji.is_none() {
        out.push("label", ErrorCode::Required, "Button needs a label or an emoji");
    }
    out.max_len(
        "label",
        &button.label,
        limits::BUTTON_LABEL_LENGTH,
        messages::button_label_too_long,
    );

    if button.style == ButtonStyle::Link {
        check_custom_id(out, button.custom_id.as_deref(), false);
        if button.url.is_none() {
            out.push("url", ErrorCode::Required, "Link buttons require a URL");
        }
    } else {
        check_custom_id(out, button.custom_id.as_deref(), true);
    }

    if let Some(url) = &button.url {
        if !validate_url(url) {
            out.push("url", ErrorCode::InvalidUrl, messages::INVALID_URL);
        }
    }
}

fn check_select(out: &mut Collector, select: &StringSelect) {
    check_custom_id(out, Some(&select.custom_id), true);

    if select.options.is_empty() {
        out.push("options", ErrorCode::Required, "Select menu needs at least one option");
    } else if select.options.len() > limits::SELECT_OPTIONS {
        out.push("options", ErrorCode::TooMany, messages::too_many_select_options());
    }

    for (index, option) in select.options.iter().enumerate() {
        out.nested(&format!("options.{index}"), |out| {
            if option.label.is_empty() {
                out.push("label", ErrorCode::Required, "Option label is required");
            }
            out.max_len("label", &option.label, limits::SELECT_OPTION_LABEL_LENGTH, || {
                messages::too_long("Option label", limits::SELECT_OPTION_LABEL_LENGTH)
            });
            if option.value.is_empty() {
                out.push("value", ErrorCode::Required, "Option value is required");
            }
            out.max_len("value", &option.value, limits::SELECT_OPTION_VALUE_LENGTH, || {
                messages::too_long("Option value", limits::SELECT_OPTION_VALUE_LENGTH)
            });
            if let Some(description) = &option.description {
                out.max_len(
                    "description",
                    description,
                    limits::SELECT_OPTION_DESCRIPTION_LENGTH,
                    || messages::too_long("Option description", limits::SELECT_OPTION_DESCRIPTION_LENGTH),
                );
            }
        });
    }

    if let Some(placeholder) = &select.placeholder {
        out.max_len("placeholder", placeholder, limits::SELECT_PLACEHOLDER_LENGTH, || {
            messages::too_long("Placeholder", limits::SELECT_PLACEHOLDER_LENGTH)
        });
    }

    let ceiling = limits::SELECT_OPTIONS as u8;
    if select.max_values.is_some_and(|max| max > ceiling) {
        out.push(
            "max_values",
            ErrorCode::InvalidRange,
            format!("max_values must be at most {ceiling}"),
        );
    }
    if let (Some(min), Some(max)) = (select.min_values, select.max_values) {
        if min > max {
            out.push(
                "min_values",
                ErrorCode::InvalidRange,
                "min_values cannot exceed max_values",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
