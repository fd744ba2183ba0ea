//! Settings store backed by the `gsettings` command line tool.
//!
//! Values cross the process boundary in GVariant text form, e.g. `'zoom'`,
//! `uint32 5` or `true`. Writes are committed by `gsettings` itself, so
//! [`SettingsStore::sync`] has nothing to flush.

use std::path::PathBuf;
use std::process::Command;

use super::{ChangeCallback, SettingValue, SettingsError, SettingsStore, Subscribers};
use crate::platform::resolve_binary;

const GSETTINGS_BINARY: &str = "gsettings";

/// A settings namespace read and written through `gsettings`.
///
/// Subscribers are notified of writes made through this store only.
#[derive(Debug)]
pub struct GSettingsStore {
    schema: String,
    program: PathBuf,
    subscribers: Subscribers,
}

impl GSettingsStore {
    /// Creates a store for `schema`, locating the `gsettings` binary.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Command`] if `gsettings` cannot be found.
    pub fn new(schema: &str) -> Result<Self, SettingsError> {
        let program = resolve_binary(GSETTINGS_BINARY).map_err(|message| SettingsError::Command {
            command: GSETTINGS_BINARY.to_string(),
            message,
        })?;

        Ok(Self::with_program(schema, program))
    }

    /// Creates a store that runs `program` instead of looking up `gsettings`.
    #[must_use]
    pub fn with_program(schema: &str, program: impl Into<PathBuf>) -> Self {
        Self {
            schema: schema.to_string(),
            program: program.into(),
            subscribers: Subscribers::default(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, SettingsError> {
        let describe = || format!("{GSETTINGS_BINARY} {}", args.join(" "));

        let output = Command::new(&self.program).args(args).output().map_err(|err| {
            SettingsError::Command {
                command: describe(),
                message: err.to_string(),
            }
        })?;

        if !output.status.success() {
            return Err(SettingsError::Command {
                command: describe(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SettingsStore for GSettingsStore {
    fn schema(&self) -> &str { &self.schema }

    fn get(&self, key: &str) -> Option<SettingValue> {
        match self.run(&["get", &self.schema, key]) {
            Ok(output) => Some(parse_variant(&output)),
            Err(err) => {
                tracing::debug!(error = %err, "gsettings get failed");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: SettingValue) -> bool {
        let formatted = format_variant(&value);
        match self.run(&["set", &self.schema, key, &formatted]) {
            Ok(_) => {
                self.subscribers.notify(key, &value);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "gsettings set failed");
                false
            }
        }
    }

    fn reset(&mut self, key: &str) -> bool {
        match self.run(&["reset", &self.schema, key]) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "gsettings reset failed");
                false
            }
        }
    }

    fn is_writable(&self, key: &str) -> bool {
        self.run(&["writable", &self.schema, key])
            .is_ok_and(|output| output.trim() == "true")
    }

    fn subscribe(&mut self, key: &str, callback: ChangeCallback) {
        self.subscribers.add(key, callback);
    }

    fn sync(&mut self) -> Result<(), SettingsError> { Ok(()) }
}

/// Parses the GVariant text printed by `gsettings get`.
///
/// Booleans, 32-bit integers (with or without a type annotation) and strings
/// are recognized. Anything else is kept as its raw text.
#[must_use]
pub fn parse_variant(text: &str) -> SettingValue {
    let text = text.trim();

    match text {
        "true" => return SettingValue::Bool(true),
        "false" => return SettingValue::Bool(false),
        _ => {}
    }

    if let Some(unquoted) = unquote(text) {
        return SettingValue::Str(unquoted);
    }

    let number = ["int32 ", "uint32 ", "int16 ", "uint16 ", "byte "]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text);

    number.trim().parse::<i32>().map_or_else(|_| SettingValue::Str(text.to_string()), SettingValue::Int)
}

/// Formats a value as GVariant text for `gsettings set`.
#[must_use]
pub fn format_variant(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(value) => value.to_string(),
        SettingValue::Int(value) => value.to_string(),
        SettingValue::Str(value) => {
            let mut quoted = String::with_capacity(value.len() + 2);
            quoted.push('\'');
            for ch in value.chars() {
                if matches!(ch, '\'' | '\\') {
                    quoted.push('\\');
                }
                quoted.push(ch);
            }
            quoted.push('\'');
            quoted
        }
    }
}

/// Strips the quotes of a GVariant string literal and resolves its escapes.
fn unquote(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut output = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                output.push(escaped);
            }
        } else {
            output.push(ch);
        }
    }

    Some(output)
}
