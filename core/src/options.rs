//! Request filters for the joke endpoint.
//!
//! `RequestOptions` is immutable once built. All validation happens in
//! `RequestOptionsBuilder::build`, so a `RequestOptions` value can always be
//! turned into a query without failing.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigError;
use crate::types::{Category, Flag, Format, JokeType, Language};

/// Joke id filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRange {
    /// Exactly one joke id.
    Single(u32),
    /// Inclusive range, `start < end`.
    Between(u32, u32),
}

impl IdRange {
    /// Resolve the `(start, end)` pair used by the builder.
    ///
    /// A negative `start` disables the filter. `end == -1` or `end == start`
    /// selects a single id, otherwise `end` must be greater than `start`.
    pub fn from_bounds(start: i64, end: i64) -> Result<Option<Self>, ConfigError> {
        if start < 0 {
            return Ok(None);
        }
        let invalid = ConfigError::InvalidIdRange { start, end };
        let first = u32::try_from(start).map_err(|_| invalid.clone())?;
        if end == -1 || end == start {
            return Ok(Some(IdRange::Single(first)));
        }
        if end < start {
            return Err(invalid);
        }
        let last = u32::try_from(end).map_err(|_| invalid)?;
        Ok(Some(IdRange::Between(first, last)))
    }

    /// Wire form: `N` or `N-M`.
    pub fn to_param(self) -> String {
        match self {
            IdRange::Single(id) => id.to_string(),
            IdRange::Between(start, end) => format!("{start}-{end}"),
        }
    }
}

/// Filters for a joke request.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestOptions {
    categories: BTreeSet<Category>,
    language: Language,
    blacklist_flags: BTreeSet<Flag>,
    joke_type: JokeType,
    format: Format,
    contains: String,
    id_range: Option<IdRange>,
    amount: u32,
    safe: bool,
    auth: String,
    split_new_line: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            categories: BTreeSet::new(),
            language: Language::default(),
            blacklist_flags: BTreeSet::new(),
            joke_type: JokeType::default(),
            format: Format::default(),
            contains: String::new(),
            id_range: None,
            amount: 1,
            safe: false,
            auth: String::new(),
            split_new_line: false,
        }
    }
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("categories", &self.categories)
            .field("language", &self.language)
            .field("blacklist_flags", &self.blacklist_flags)
            .field("joke_type", &self.joke_type)
            .field("format", &self.format)
            .field("contains", &self.contains)
            .field("id_range", &self.id_range)
            .field("amount", &self.amount)
            .field("safe", &self.safe)
            .field("auth", &if self.auth.is_empty() { "" } else { "<redacted>" })
            .field("split_new_line", &self.split_new_line)
            .finish()
    }
}

impl RequestOptions {
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn blacklist_flags(&self) -> &BTreeSet<Flag> {
        &self.blacklist_flags
    }

    pub fn joke_type(&self) -> JokeType {
        self.joke_type
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn contains(&self) -> &str {
        &self.contains
    }

    pub fn id_range(&self) -> Option<IdRange> {
        self.id_range
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn safe(&self) -> bool {
        self.safe
    }

    /// Token sent in the `Authorization` header; empty means none.
    pub fn auth(&self) -> &str {
        &self.auth
    }

    /// Split single jokes on newlines after parsing. Never sent.
    pub fn split_new_line(&self) -> bool {
        self.split_new_line
    }
}

/// Staged builder for `RequestOptions`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
    id_bounds: Option<(i64, i64)>,
}

impl RequestOptionsBuilder {
    /// Add one category.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.options.categories.insert(category);
        self
    }

    /// Replace the category set.
    #[must_use]
    pub fn categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.options.categories = categories.into_iter().collect();
        self
    }

    #[must_use]
    pub fn language(mut self, language: Language) -> Self {
        self.options.language = language;
        self
    }

    /// Add one flag to the blacklist.
    #[must_use]
    pub fn blacklist_flag(mut self, flag: Flag) -> Self {
        self.options.blacklist_flags.insert(flag);
        self
    }

    /// Replace the blacklist.
    #[must_use]
    pub fn blacklist_flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.options.blacklist_flags = flags.into_iter().collect();
        self
    }

    #[must_use]
    pub fn joke_type(mut self, joke_type: JokeType) -> Self {
        self.options.joke_type = joke_type;
        self
    }

    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.options.format = format;
        self
    }

    /// Only return jokes containing this text.
    #[must_use]
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.options.contains = needle.into();
        self
    }

    /// Restrict joke ids, see `IdRange::from_bounds`. Checked in `build`.
    #[must_use]
    pub fn id_range(mut self, start: i64, end: i64) -> Self {
        self.id_bounds = Some((start, end));
        self
    }

    /// Number of jokes to request. Checked in `build`.
    #[must_use]
    pub fn amount(mut self, amount: u32) -> Self {
        self.options.amount = amount;
        self
    }

    #[must_use]
    pub fn safe(mut self, safe: bool) -> Self {
        self.options.safe = safe;
        self
    }

    #[must_use]
    pub fn auth(mut self, token: impl Into<String>) -> Self {
        self.options.auth = token.into();
        self
    }

    #[must_use]
    pub fn split_new_line(mut self, split: bool) -> Self {
        self.options.split_new_line = split;
        self
    }

    /// Validate and freeze the options.
    pub fn build(self) -> Result<RequestOptions, ConfigError> {
        let mut options = self.options;
        if options.amount == 0 {
            return Err(ConfigError::InvalidAmount(options.amount));
        }
        if let Some((start, end)) = self.id_bounds {
            options.id_range = IdRange::from_bounds(start, end)?;
        }
        Ok(options)
    }
}
