//! Purpose: Named date formats for parsing string fields into timestamps.
//! Exports: `DateFormat`, `FormatterRegistry`.
//! Role: Injected registry consulted by the keyed date accessor.
//! Invariants: Registration completes before mapping; afterwards the registry is only read.
//! Invariants: Custom patterns are compiled once, at construction.
//! Invariants: Lookup misses and parse failures are absent, never errors.

use std::collections::HashMap;

use time::format_description::OwnedFormatItem;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

/// A date-parsing format: one of the well-known formats or a compiled
/// `time` format description.
#[derive(Clone, Debug)]
pub enum DateFormat {
    Rfc3339,
    Rfc2822,
    Pattern(OwnedFormatItem),
}

impl DateFormat {
    /// Compile a custom format description, e.g.
    /// `"[year]-[month]-[day] [hour]:[minute]"`. An invalid description
    /// yields `None`, so an unparsable pattern can never be registered.
    pub fn pattern(description: &str) -> Option<Self> {
        time::format_description::parse_owned::<2>(description)
            .ok()
            .map(Self::Pattern)
    }

    /// Parse `text` into a timestamp. Patterns without an offset component
    /// are interpreted as UTC.
    pub fn parse(&self, text: &str) -> Option<OffsetDateTime> {
        match self {
            Self::Rfc3339 => OffsetDateTime::parse(text, &Rfc3339).ok(),
            Self::Rfc2822 => OffsetDateTime::parse(text, &Rfc2822).ok(),
            Self::Pattern(item) => OffsetDateTime::parse(text, item).ok().or_else(|| {
                PrimitiveDateTime::parse(text, item)
                    .ok()
                    .map(PrimitiveDateTime::assume_utc)
            }),
        }
    }
}

/// Keyed collection of date formats, built during initialization and then
/// lent immutably to every mapping context.
#[derive(Clone, Debug)]
pub struct FormatterRegistry {
    formats: HashMap<String, DateFormat>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: impl Into<String>, format: DateFormat) {
        self.formats.insert(key.into(), format);
    }

    pub fn lookup(&self, key: &str) -> Option<&DateFormat> {
        self.formats.get(key)
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
