//! Export a component list as wire JSON or as source code.
//!
//! The code generators dispatch on the component's wire tag and keep a
//! de-duplicated, insertion-ordered set of the builder names they reference
//! so the emitted import line names each builder once. Entries that aren't
//! representable (an unknown `type` in loosely typed input) become a
//! comment in the generated code instead of failing the export.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::types::*;

pub mod discordjs;
pub mod json;
pub mod python;
pub mod typescript;

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "discord.js")]
    DiscordJs,
    #[serde(rename = "typescript")]
    TypeScript,
    #[serde(rename = "python")]
    Python,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Json,
        ExportFormat::DiscordJs,
        ExportFormat::TypeScript,
        ExportFormat::Python,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::DiscordJs => "discord.js",
            Self::TypeScript => "typescript",
            Self::Python => "python",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::DiscordJs => "js",
            Self::TypeScript => "ts",
            Self::Python => "py",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export format `{0}` (expected json, discord.js, typescript or python)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Compact JSON. Ignored by the code generators.
    #[serde(default)]
    pub minify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub content: String,
    pub format: ExportFormat,
    /// UTF-8 byte length of `content`.
    pub size: usize,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Export typed components.
pub fn export_components(components: &[Component], options: ExportOptions) -> ExportResult {
    let content = match options.format {
        ExportFormat::Json => json::format_message(components, options.minify),
        _ => {
            let entries: Vec<Entry<'_>> = components.iter().map(Entry::Node).collect();
            render_code(&entries, options.format)
        }
    };
    finish(content, options.format)
}

/// Export loosely typed JSON nodes. JSON output passes them through
/// untouched; code output comments out nodes that don't convert.
pub fn export_values(values: &[Value], options: ExportOptions) -> ExportResult {
    let content = match options.format {
        ExportFormat::Json => json::format_values(values, options.minify),
        _ => {
            let converted: Vec<Result<Component, String>> = values
                .iter()
                .map(|value| {
                    Component::try_from_value(value.clone()).map_err(|_| describe_tag(value))
                })
                .collect();
            let entries: Vec<Entry<'_>> = converted
                .iter()
                .map(|result| match result {
                    Ok(component) => Entry::Node(component),
                    Err(tag) => Entry::Unsupported(tag.as_str()),
                })
                .collect();
            render_code(&entries, options.format)
        }
    };
    finish(content, options.format)
}

fn render_code(entries: &[Entry<'_>], format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => String::new(),
        ExportFormat::DiscordJs => discordjs::format_discord_js(entries),
        ExportFormat::TypeScript => typescript::format_typescript(entries),
        ExportFormat::Python => python::format_python(entries),
    }
}

fn finish(content: String, format: ExportFormat) -> ExportResult {
    debug!(%format, bytes = content.len(), "exported components");
    ExportResult {
        size: content.len(),
        content,
        format,
    }
}

/// `<prefix>_<yyyy-mm-ddTHH-MM-SS>.<ext>` stamped with the current UTC time.
pub fn generate_filename(format: ExportFormat, prefix: &str) -> String {
    generate_filename_at(format, prefix, Utc::now())
}

pub fn generate_filename_at(format: ExportFormat, prefix: &str, at: DateTime<Utc>) -> String {
    format!(
        "{prefix}_{}.{}",
        at.format("%Y-%m-%dT%H-%M-%S"),
        format.file_extension()
    )
}

// ---------------------------------------------------------------------------
// Shared helpers for the generators
// ---------------------------------------------------------------------------

/// One root entry handed to a code generator.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Node(&'a Component),
    /// The offending `type` rendered for the comment.
    Unsupported(&'a str),
}

fn describe_tag(value: &Value) -> String {
    match value.get("type") {
        Some(tag) => tag.to_string(),
        None => "unknown".to_string(),
    }
}

/// A string literal valid in JavaScript, TypeScript and Python.
pub(crate) fn quote(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

/// Insertion-ordered set of imported names.
#[derive(Debug, Default)]
pub(crate) struct Imports(Vec<&'static str>);

impl Imports {
    pub(crate) fn add(&mut self, name: &'static str) {
        if !self.0.contains(&name) {
            self.0.push(name);
        }
    }

    /// `A, B, MessageFlags`
    pub(crate) fn with_message_flags(&self) -> String {
        let mut names = self.0.clone();
        names.push("MessageFlags");
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_names_round_trip() {
        for format in ExportFormat::ALL {
            assert_eq!(format.as_str().parse::<ExportFormat>(), Ok(format));
            let quoted = serde_json::to_string(&format).unwrap();
            assert_eq!(quoted, format!("\"{}\"", format.as_str()));
        }
        assert_eq!("Discord.JS".parse::<ExportFormat>(), Ok(ExportFormat::DiscordJs));
        assert!("yaml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn extensions() {
        let extensions: Vec<_> = ExportFormat::ALL.iter().map(|f| f.file_extension()).collect();
        assert_eq!(extensions, ["json", "js", "ts", "py"]);
    }

    #[test]
    fn filename_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            generate_filename_at(ExportFormat::Python, "components", at),
            "components_2024-03-09T14-05-07.py"
        );
        assert!(generate_filename(ExportFormat::Json, "msg").starts_with("msg_"));
    }

    #[test]
    fn size_counts_bytes() {
        let result = export_components(
            &[text_display("héllo")],
            ExportOptions {
                format: ExportFormat::Json,
                minify: true,
            },
        );
        assert_eq!(result.size, result.content.len());
        assert!(result.size > result.content.chars().count());
    }
}
