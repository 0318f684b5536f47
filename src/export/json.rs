//! Wire JSON: `{"components": [...], "flags": 128}`.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::types::*;

fn render(value: &impl Serialize, minify: bool) -> String {
    let rendered = if minify {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    // Components and `Value`s always serialize; an error here is a bug.
    rendered.unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize export");
        String::new()
    })
}

pub fn format_message(components: &[Component], minify: bool) -> String {
    let message = DiscordMessage::new(components.to_vec());
    render(&message, minify)
}

pub fn format_values(values: &[Value], minify: bool) -> String {
    let message = json!({
        "components": values,
        "flags": MessageFlags::IS_COMPONENTS_V2.bits(),
    });
    render(&message, minify)
}
