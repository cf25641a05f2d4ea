//! Declarative `filter` blocks for collection data sources
//!
//! A data source that lists many objects accepts any number of
//! `filter { name = ..., values = [...], regex = ... }` blocks. Filters are
//! applied after the collection is fetched:
//!
//! - across filters the result is AND-ed: a record must satisfy every filter
//! - within one filter the values are OR-ed: any matching value is enough
//! - with `regex = true` each value is an (unanchored) regular expression
//! - a record that lacks the named attribute never satisfies the filter
//!
//! Only top-level attributes are addressed. Scalars are compared through their
//! string form; a list of scalars matches when any element does.

use crate::error::{Result, TfplugError};
use crate::schema::{AttributeBuilder, AttributeType, Block, NestedBlock, NestingMode};
use crate::types::{AttributePath, Dynamic, DynamicValue, Record};
use regex::Regex;

/// Name of the repeated block carrying filters in data source configuration
pub const FILTER_BLOCK: &str = "filter";

/// One caller supplied filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
    pub regex: bool,
}

impl Filter {
    /// Exact match against any of `values`
    pub fn exact<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            regex: false,
        }
    }

    /// Regular expression match against any of `patterns`
    pub fn regex<I, S>(name: &str, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            values: patterns.into_iter().map(Into::into).collect(),
            regex: true,
        }
    }

    /// Read every `filter` block out of a data source configuration.
    /// A missing or null block list yields no filters.
    pub fn from_config(config: &DynamicValue) -> Result<Vec<Filter>> {
        let blocks = match config.get(&AttributePath::new(FILTER_BLOCK)) {
            None | Some(Dynamic::Null) => return Ok(Vec::new()),
            Some(Dynamic::List(items)) => items,
            Some(other) => {
                return Err(TfplugError::TypeMismatch {
                    expected: "list".to_string(),
                    actual: other.type_name().to_string(),
                })
            }
        };

        blocks.iter().map(Filter::from_dynamic).collect()
    }

    fn from_dynamic(block: &Dynamic) -> Result<Filter> {
        let fields = block
            .as_map()
            .ok_or_else(|| TfplugError::InvalidFilter(format!("expected object, got {}", block.type_name())))?;

        let name = fields
            .get("name")
            .and_then(Dynamic::as_string)
            .cloned()
            .ok_or_else(|| TfplugError::InvalidFilter("'name' is required".to_string()))?;

        let values = match fields.get("values") {
            Some(Dynamic::List(items)) => items
                .iter()
                .map(|v| {
                    v.as_string().cloned().ok_or_else(|| {
                        TfplugError::InvalidFilter(format!(
                            "filter {:?}: values must be strings, got {}",
                            name,
                            v.type_name()
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(TfplugError::InvalidFilter(format!(
                    "filter {:?}: 'values' is required",
                    name
                )))
            }
        };

        let regex = fields
            .get("regex")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        Ok(Filter {
            name,
            values,
            regex,
        })
    }
}

/// Schema for the repeated `filter` block
pub fn filter_block() -> NestedBlock {
    NestedBlock {
        type_name: FILTER_BLOCK.to_string(),
        block: Block::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the attribute to filter on")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("values", AttributeType::list_of(AttributeType::String))
                    .description("Accepted values; a record passes when any one matches")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("regex", AttributeType::Bool)
                    .description("Treat values as regular expressions")
                    .optional()
                    .build(),
            ),
        nesting: NestingMode::Set,
    }
}

enum Matcher {
    Literal(Vec<String>),
    Patterns(Vec<Regex>),
}

struct CompiledFilter {
    name: String,
    matcher: Matcher,
}

impl CompiledFilter {
    fn accepts(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Literal(values) => values.iter().any(|v| v == candidate),
            Matcher::Patterns(patterns) => patterns.iter().any(|p| p.is_match(candidate)),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        match record.get(&self.name) {
            Some(Dynamic::List(items)) => items
                .iter()
                .filter_map(scalar_text)
                .any(|text| self.accepts(&text)),
            Some(value) => scalar_text(value).is_some_and(|text| self.accepts(&text)),
            None => false,
        }
    }
}

/// A validated set of filters, ready to run against records.
/// Compiling up front means a bad pattern fails the whole pass before any record is looked at.
pub struct FilterSet {
    filters: Vec<CompiledFilter>,
}

impl FilterSet {
    pub fn compile(filters: &[Filter]) -> Result<Self> {
        let filters = filters
            .iter()
            .map(|filter| {
                let matcher = if filter.regex {
                    let patterns = filter
                        .values
                        .iter()
                        .map(|pattern| {
                            Regex::new(pattern).map_err(|source| {
                                TfplugError::InvalidFilterPattern {
                                    name: filter.name.clone(),
                                    pattern: pattern.clone(),
                                    source,
                                }
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Matcher::Patterns(patterns)
                } else {
                    Matcher::Literal(filter.values.clone())
                };

                Ok(CompiledFilter {
                    name: filter.name.clone(),
                    matcher,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { filters })
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Keep the records that satisfy every filter, in their original order
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// String form of a scalar attribute; `None` for anything not comparable
fn scalar_text(value: &Dynamic) -> Option<String> {
    match value {
        Dynamic::String(s) => Some(s.clone()),
        Dynamic::Bool(b) => Some(b.to_string()),
        Dynamic::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
        Dynamic::Number(n) => Some(n.to_string()),
        Dynamic::Null | Dynamic::List(_) | Dynamic::Map(_) => None,
    }
}
