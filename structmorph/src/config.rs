//! Copy configuration.
//!
//! A [`CopyConfig`] is assembled with builder methods and handed to a
//! [`crate::Cloner`]. [`CopyConfig::global`] exposes the shared default used by
//! the free functions when no configuration is supplied.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Maps a source field name to a destination field name; `None` leaves the
/// name to the mapping table.
pub type NameRule = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Options steering a copy.
#[derive(Clone)]
pub struct CopyConfig {
    ignored_names: BTreeSet<String>,
    name_mappings: HashMap<String, String>,
    name_rule: Option<NameRule>,
    ignore_unexported_error: bool,
    zero_if_equals_from: bool,
    keep_if_from_is_nil: bool,
    keep_if_from_is_zero: bool,
    each_field_always: bool,
    visibility_override: bool,
}

static GLOBAL: LazyLock<CopyConfig> = LazyLock::new(CopyConfig::default);

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            ignored_names: BTreeSet::new(),
            name_mappings: HashMap::new(),
            name_rule: None,
            ignore_unexported_error: true,
            zero_if_equals_from: false,
            keep_if_from_is_nil: false,
            keep_if_from_is_zero: false,
            each_field_always: false,
            visibility_override: false,
        }
    }
}

impl CopyConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared default configuration.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Skip source fields whose names appear in `names`.
    #[must_use]
    pub fn with_ignored_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Rename source fields through a fixed table.
    #[must_use]
    pub fn with_name_mappings<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.name_mappings
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Rename source fields through a rule consulted before the table.
    #[must_use]
    pub fn with_name_rule(
        mut self,
        rule: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.name_rule = Some(Arc::new(rule));
        self
    }

    /// Silently skip private fields that cannot be written.
    #[must_use]
    pub const fn with_ignore_unexported_error(mut self, ignore: bool) -> Self {
        self.ignore_unexported_error = ignore;
        self
    }

    /// Zero destination fields whose value already equals the source.
    #[must_use]
    pub const fn with_zero_if_equals_from(mut self, enabled: bool) -> Self {
        self.zero_if_equals_from = enabled;
        self
    }

    /// Leave destination fields untouched when the source is nil or zero.
    #[must_use]
    pub const fn with_keep_if_from_is_nil_or_zero(mut self, nil: bool, zero: bool) -> Self {
        self.keep_if_from_is_nil = nil;
        self.keep_if_from_is_zero = zero;
        self
    }

    /// Copy every assignable field regardless of nil or zero state.
    #[must_use]
    pub const fn with_each_field_always(mut self, enabled: bool) -> Self {
        self.each_field_always = enabled;
        self
    }

    /// Treat private destination fields as writable.
    #[must_use]
    pub const fn with_visibility_override(mut self, enabled: bool) -> Self {
        self.visibility_override = enabled;
        self
    }

    /// Whether `name` is excluded from copying.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_names.contains(name)
    }

    /// Mapping table.
    #[must_use]
    pub const fn name_mappings(&self) -> &HashMap<String, String> {
        &self.name_mappings
    }

    /// Mapping rule.
    #[must_use]
    pub const fn name_rule(&self) -> Option<&NameRule> {
        self.name_rule.as_ref()
    }

    /// See [`CopyConfig::with_ignore_unexported_error`].
    #[must_use]
    pub const fn ignore_unexported_error(&self) -> bool {
        self.ignore_unexported_error
    }

    /// See [`CopyConfig::with_zero_if_equals_from`].
    #[must_use]
    pub const fn zero_if_equals_from(&self) -> bool {
        self.zero_if_equals_from
    }

    /// See [`CopyConfig::with_keep_if_from_is_nil_or_zero`].
    #[must_use]
    pub const fn keep_if_from_is_nil(&self) -> bool {
        self.keep_if_from_is_nil
    }

    /// See [`CopyConfig::with_keep_if_from_is_nil_or_zero`].
    #[must_use]
    pub const fn keep_if_from_is_zero(&self) -> bool {
        self.keep_if_from_is_zero
    }

    /// See [`CopyConfig::with_each_field_always`].
    #[must_use]
    pub const fn each_field_always(&self) -> bool {
        self.each_field_always
    }

    /// See [`CopyConfig::with_visibility_override`].
    #[must_use]
    pub const fn visibility_override(&self) -> bool {
        self.visibility_override
    }
}

impl fmt::Debug for CopyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyConfig")
            .field("ignored_names", &self.ignored_names)
            .field("name_mappings", &self.name_mappings)
            .field("name_rule", &self.name_rule.is_some())
            .field("ignore_unexported_error", &self.ignore_unexported_error)
            .field("zero_if_equals_from", &self.zero_if_equals_from)
            .field("keep_if_from_is_nil", &self.keep_if_from_is_nil)
            .field("keep_if_from_is_zero", &self.keep_if_from_is_zero)
            .field("each_field_always", &self.each_field_always)
            .field("visibility_override", &self.visibility_override)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for copy configuration defaults and builders.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn global_matches_defaults() {
        let global = CopyConfig::global();
        assert!(global.ignore_unexported_error());
        assert!(!global.zero_if_equals_from());
        assert!(!global.keep_if_from_is_nil());
        assert!(!global.keep_if_from_is_zero());
        assert!(!global.each_field_always());
        assert!(!global.visibility_override());
        assert!(global.name_mappings().is_empty());
        assert!(global.name_rule().is_none());
        assert!(std::ptr::eq(global, CopyConfig::global()));
    }

    #[rstest]
    fn builders_leave_the_original_untouched() {
        let base = CopyConfig::new();
        let tuned = base
            .clone()
            .with_ignored_names(["Secret"])
            .with_name_mappings([("Name", "Title")])
            .with_keep_if_from_is_nil_or_zero(true, false);
        assert!(tuned.is_ignored("Secret"));
        assert!(!base.is_ignored("Secret"));
        assert_eq!(
            tuned.name_mappings().get("Name").map(String::as_str),
            Some("Title")
        );
        assert!(tuned.keep_if_from_is_nil());
        assert!(!tuned.keep_if_from_is_zero());
    }

    #[rstest]
    fn debug_hides_the_rule_body() {
        let config = CopyConfig::new().with_name_rule(|name| Some(name.to_uppercase()));
        let rendered = format!("{config:?}");
        assert!(rendered.contains("name_rule: true"), "{rendered}");
    }
}
