//! Import components from JSON text, discord.js source or files.
//!
//! Parsing yields loosely typed [`Value`]s. [`validate_components`] then
//! drops anything without a recognised `type` tag, converts the rest and
//! gives id-less roots a fresh id. The `import_*` functions run the whole
//! pipeline against a [`DocumentStore`] and never return `Err`: failures
//! come back as an [`ImportResult`] with `success == false`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::DocumentStore;
use crate::types::*;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON syntax")]
    InvalidSyntax(#[source] serde_json::Error),

    #[error("Invalid JSON format. Expected components array or Discord message object.")]
    InvalidFormat,

    #[error("No components found in Discord.js code")]
    NoComponentsInCode,

    #[error("Could not extract components from Discord.js code")]
    CodeExtraction(#[source] Box<ImportError>),

    #[error("Unsupported file format. Use .json, .js, or .ts files.")]
    UnsupportedFile,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Found {0} invalid components")]
    InvalidComponents(usize),

    #[error("component at index {index}: {source}")]
    Component {
        index: usize,
        #[source]
        source: ComponentError,
    },
}

// ===========================================================================
// Parsers
// ===========================================================================

/// Accepts a bare array or a `{ "components": [...] }` message object.
pub fn parse_json(text: &str) -> Result<Vec<Value>, ImportError> {
    let parsed: Value = serde_json::from_str(text).map_err(ImportError::InvalidSyntax)?;
    match parsed {
        Value::Array(components) => Ok(components),
        Value::Object(mut message) => match message.remove("components") {
            Some(Value::Array(components)) => Ok(components),
            _ => Err(ImportError::InvalidFormat),
        },
        _ => Err(ImportError::InvalidFormat),
    }
}

/// [`parse_json`] followed by strict conversion of every entry. This is the
/// inverse of the JSON export.
pub fn parse_components(text: &str) -> Result<Document, ImportError> {
    parse_json(text)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Component::try_from_value(value).map_err(|source| ImportError::Component { index, source })
        })
        .collect()
}

fn components_literal() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"components:\s*(\[[\s\S]*?\])").ok())
        .as_ref()
}

/// Best-effort extraction of a `components: [...]` array literal from
/// source text. The literal must itself be valid JSON and must not contain
/// a nested `]`; this is a regex, not a JavaScript parser.
pub fn parse_discord_js(code: &str) -> Result<Vec<Value>, ImportError> {
    let literal = components_literal()
        .and_then(|pattern| pattern.captures(code))
        .and_then(|captures| captures.get(1))
        .ok_or(ImportError::NoComponentsInCode)?;

    parse_json(literal.as_str()).map_err(|e| {
        warn!(error = %e, "failed to parse components literal");
        ImportError::CodeExtraction(Box::new(e))
    })
}

/// Dispatch on the file name: `.json` is JSON, `.js`/`.ts` is discord.js
/// source.
pub fn parse_file_contents(file_name: &str, text: &str) -> Result<Vec<Value>, ImportError> {
    if file_name.ends_with(".json") {
        parse_json(text)
    } else if file_name.ends_with(".js") || file_name.ends_with(".ts") {
        parse_discord_js(text)
    } else {
        Err(ImportError::UnsupportedFile)
    }
}

pub fn parse_file(path: &Path) -> Result<Vec<Value>, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    parse_file_contents(&name, &text)
}

// ===========================================================================
// Validation on import
// ===========================================================================

/// Membership test only: an object whose `type` is a buildable tag. Field
/// limits are not checked here.
pub fn is_valid_component(value: &Value) -> bool {
    value.is_object()
        && value
            .get("type")
            .and_then(Value::as_u64)
            .is_some_and(is_known_type)
}

/// Give the node a fresh id if it has none.
pub fn normalize_component(mut component: Component) -> Component {
    let has_id = component.id().is_some_and(|id| !id.as_str().is_empty());
    if !has_id {
        let prefix = component.kind().slug();
        component = component.with_id(ComponentId::generate(prefix));
    }
    component
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportValidation {
    pub valid: Document,
    pub invalid: Vec<Value>,
    pub warnings: Vec<String>,
}

pub fn validate_components(values: Vec<Value>) -> ImportValidation {
    let mut result = ImportValidation::default();

    for (index, value) in values.into_iter().enumerate() {
        let converted = if is_valid_component(&value) {
            Component::try_from_value(value.clone()).map_err(|e| {
                debug!(index, error = %e, "recognised component failed to convert");
            })
        } else {
            Err(())
        };

        match converted {
            Ok(component) => result.valid.push(normalize_component(component)),
            Err(()) => {
                warn!(index, "skipping invalid component");
                result.invalid.push(value);
                result
                    .warnings
                    .push(format!("Component at index {index} is invalid and was skipped"));
            }
        }
    }

    result
}

// ===========================================================================
// Import into a store
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Replace the document instead of appending.
    pub replace: bool,
    /// Filter and normalize before applying.
    pub validate: bool,
    /// With `validate`, apply the valid entries even if some were rejected.
    pub skip_invalid: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            replace: false,
            validate: true,
            skip_invalid: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub components: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ImportResult {
    fn failed(error: &ImportError, warnings: Vec<String>) -> Self {
        warn!(%error, "import failed");
        Self {
            success: false,
            components: Vec::new(),
            error: Some(error.to_string()),
            warnings,
        }
    }
}

fn apply(store: &mut DocumentStore, components: &Document, replace: bool) {
    if replace {
        store.replace_all(components.clone());
    } else {
        for component in components {
            store.add(component.clone());
        }
    }
}

/// Validate (per `options`) and apply already-parsed values to `store`.
pub fn process_import(store: &mut DocumentStore, values: Vec<Value>, options: ImportOptions) -> ImportResult {
    if !options.validate {
        let converted: Result<Document, ImportError> = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                Component::try_from_value(value).map_err(|source| ImportError::Component { index, source })
            })
            .collect();
        return match converted {
            Ok(components) => {
                apply(store, &components, options.replace);
                ImportResult {
                    success: true,
                    components,
                    ..Default::default()
                }
            }
            Err(e) => ImportResult::failed(&e, Vec::new()),
        };
    }

    let validation = validate_components(values);
    if !validation.invalid.is_empty() && !options.skip_invalid {
        let error = ImportError::InvalidComponents(validation.invalid.len());
        return ImportResult::failed(&error, validation.warnings);
    }

    apply(store, &validation.valid, options.replace);
    info!(
        imported = validation.valid.len(),
        skipped = validation.invalid.len(),
        replace = options.replace,
        "imported components"
    );
    ImportResult {
        success: true,
        components: validation.valid,
        error: None,
        warnings: validation.warnings,
    }
}

fn run(store: &mut DocumentStore, parsed: Result<Vec<Value>, ImportError>, options: ImportOptions) -> ImportResult {
    match parsed {
        Ok(values) => process_import(store, values, options),
        Err(e) => ImportResult::failed(&e, Vec::new()),
    }
}

pub fn import_json(store: &mut DocumentStore, text: &str, options: ImportOptions) -> ImportResult {
    run(store, parse_json(text), options)
}

pub fn import_discord_js(store: &mut DocumentStore, code: &str, options: ImportOptions) -> ImportResult {
    run(store, parse_discord_js(code), options)
}

pub fn import_file(store: &mut DocumentStore, path: &Path, options: ImportOptions) -> ImportResult {
    run(store, parse_file(path), options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
