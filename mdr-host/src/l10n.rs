//! Localization lookup

use std::collections::HashMap;

/// Maps a message key to a user-facing string, splicing `{0}`-style
/// arguments into the resolved template
pub trait Localizer {
    fn localize(&self, message: &str, args: &[&str]) -> String;
}

/// Replace `{0}`, `{1}`, .. with the positional arguments. Placeholders
/// without a matching argument stay as-is.
fn interpolate(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (index, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{index}}}"), arg);
    }
    result
}

/// Localizer that returns the key itself as the template
pub struct Passthrough;

impl Localizer for Passthrough {
    fn localize(&self, message: &str, args: &[&str]) -> String {
        interpolate(message, args)
    }
}

/// Localizer backed by a bundled translation table; unknown keys fall
/// back to the key itself
pub struct TableLocalizer {
    strings: HashMap<String, String>,
}

impl TableLocalizer {
    pub fn new(strings: HashMap<String, String>) -> Self {
        Self { strings }
    }
}

impl Localizer for TableLocalizer {
    fn localize(&self, message: &str, args: &[&str]) -> String {
        let template = self.strings.get(message).map_or(message, String::as_str);
        interpolate(template, args)
    }
}
