//! Source-to-destination field name resolution.

use crate::config::CopyConfig;

/// Resolves source field names against a [`CopyConfig`].
///
/// The rule is consulted first, then the mapping table, and the name is used
/// unchanged when neither produces a mapping.
#[derive(Clone, Copy, Debug)]
pub struct NameResolver<'a> {
    config: &'a CopyConfig,
}

impl<'a> NameResolver<'a> {
    /// Resolver reading from `config`.
    #[must_use]
    pub const fn new(config: &'a CopyConfig) -> Self {
        Self { config }
    }

    /// Destination name for `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        if let Some(mapped) = self.config.name_rule().and_then(|rule| rule(name)) {
            return mapped;
        }
        self.config
            .name_mappings()
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_owned())
    }

    /// Resolve `name` and look it up with `find`, retrying once with the
    /// title-cased name when the first lookup fails and the name qualifies.
    ///
    /// `find` returns the located item together with whether it is usable;
    /// an unusable first hit is only returned if the retry finds nothing.
    pub fn lookup<T>(
        &self,
        name: &str,
        mut find: impl FnMut(&str) -> Option<(T, bool)>,
    ) -> Option<(String, T, bool)> {
        let resolved = self.resolve(name);
        let first = find(&resolved);
        if matches!(first, Some((_, true))) {
            return first.map(|(item, usable)| (resolved, item, usable));
        }
        if needs_title_retry(&resolved) {
            let titled = title_case(&resolved);
            if titled != resolved {
                if let Some((item, usable)) = find(&titled) {
                    if usable || first.is_none() {
                        return Some((titled, item, usable));
                    }
                }
            }
        }
        first.map(|(item, usable)| (resolved, item, usable))
    }
}

/// Names starting lowercase or containing a hyphen get a title-case retry.
#[must_use]
pub fn needs_title_retry(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_lowercase) || name.contains('-')
}

/// Title-case the first letter of every word.
///
/// ASCII letters, digits, underscores and hyphens continue a word; other
/// ASCII characters and whitespace separate words. Non-ASCII letters and
/// digits continue a word. Each first letter maps to exactly one character,
/// so digraphs such as `ǆ` become `ǅ` and `ß` is left alone.
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev = ' ';
    for c in name.chars() {
        if is_separator(prev) {
            out.push(to_title(c));
        } else {
            out.push(c);
        }
        prev = c;
    }
    out
}

/// Single-character title case.
///
/// Only the Latin digraphs and the Greek letters with iota subscript have a
/// title form distinct from their upper case. Letters whose upper case
/// expands to several characters are kept.
fn to_title(c: char) -> char {
    let shifted = |code: u32| char::from_u32(code).unwrap_or(c);
    match c {
        '\u{01C4}'..='\u{01C6}' => '\u{01C5}',
        '\u{01C7}'..='\u{01C9}' => '\u{01C8}',
        '\u{01CA}'..='\u{01CC}' => '\u{01CB}',
        '\u{01F1}'..='\u{01F3}' => '\u{01F2}',
        '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
            shifted(u32::from(c) + 8)
        }
        '\u{1FB3}' => '\u{1FBC}',
        '\u{1FC3}' => '\u{1FCC}',
        '\u{1FF3}' => '\u{1FFC}',
        _ => {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => single,
                _ => c,
            }
        }
    }
}

fn is_separator(c: char) -> bool {
    if c.is_ascii() {
        return !(c.is_ascii_alphanumeric() || c == '_' || c == '-');
    }
    if c.is_alphanumeric() {
        return false;
    }
    c.is_whitespace()
}
