// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::FilterParseError;
use regex::Regex;
use std::{fmt, ops, sync::Arc};

/// Something that can be filtered by its description.
///
/// Implemented by test groups and test specs.
pub trait Described {
    /// Returns the human-readable description.
    fn description(&self) -> &str;
}

/// Matcher for a description.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Exact value.
    Equal(String),

    /// Simple contains test.
    Contains(String),

    /// Test against a regex that must match the entire input.
    Regex {
        /// The pattern as provided by the caller.
        pattern: String,

        /// The compiled pattern, anchored at both ends.
        regex: Regex,
    },
}

impl NameMatcher {
    /// Compiles `pattern` into a matcher that accepts a description only if the pattern matches
    /// the entire description, not just a substring of it.
    pub fn full_regex(pattern: &str) -> Result<Self, FilterParseError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|err| FilterParseError::new(pattern, err))?;
        Ok(Self::Regex {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    /// Returns true if the input is accepted by this matcher.
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Self::Equal(text) => text == input,
            Self::Contains(text) => input.contains(text.as_str()),
            Self::Regex { regex, .. } => regex.is_match(input),
        }
    }
}

impl PartialEq for NameMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Contains(s1), Self::Contains(s2)) => s1 == s2,
            (Self::Equal(s1), Self::Equal(s2)) => s1 == s2,
            (Self::Regex { pattern: p1, .. }, Self::Regex { pattern: p2, .. }) => p1 == p2,
            _ => false,
        }
    }
}

impl Eq for NameMatcher {}

impl fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal(text) => write!(f, "={text}"),
            Self::Contains(text) => write!(f, "~{text}"),
            Self::Regex { pattern, .. } => write!(f, "/{pattern}/"),
        }
    }
}

/// An arbitrary predicate wrapped into a [`Filter`].
pub struct Predicate<T: ?Sized> {
    f: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: ?Sized> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<T: ?Sized> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate { .. }")
    }
}

/// A filter over `T`.
///
/// Filters are pure values: evaluating one never mutates it, and a filter may be shared across
/// threads.
pub enum Filter<T: ?Sized> {
    /// Accepts everything.
    All,

    /// Accepts items whose description matches.
    Description(NameMatcher),

    /// Accepts items for which the predicate returns true.
    Predicate(Predicate<T>),

    /// Accepts every item not accepted by the inner filter.
    Not(Box<Filter<T>>),

    /// Accepts items accepted by every inner filter. Empty means everything.
    AllOf(Vec<Filter<T>>),

    /// Accepts items accepted by at least one inner filter. Empty means everything.
    AnyOf(Vec<Filter<T>>),
}

impl<T: ?Sized> Filter<T> {
    /// Creates a filter from an arbitrary predicate.
    pub fn predicate(f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Predicate { f: Arc::new(f) })
    }

    /// Creates a filter accepting items whose full description matches `pattern`.
    pub fn by_description(pattern: &str) -> Result<Self, FilterParseError> {
        Ok(Self::Description(NameMatcher::full_regex(pattern)?))
    }

    /// Creates a filter accepting items whose description is exactly `description`.
    pub fn description_equals(description: impl Into<String>) -> Self {
        Self::Description(NameMatcher::Equal(description.into()))
    }

    /// Creates a filter accepting items whose description contains `needle`.
    pub fn description_contains(needle: impl Into<String>) -> Self {
        Self::Description(NameMatcher::Contains(needle.into()))
    }

    /// Accepts an item only if every filter accepts it.
    ///
    /// An empty list accepts everything.
    pub fn all_of(filters: impl IntoIterator<Item = Filter<T>>) -> Self {
        Self::AllOf(filters.into_iter().collect())
    }

    /// Accepts an item if at least one filter accepts it.
    ///
    /// An empty list accepts everything: no filter narrows nothing.
    pub fn any_of(filters: impl IntoIterator<Item = Filter<T>>) -> Self {
        Self::AnyOf(filters.into_iter().collect())
    }

    /// Logical negation of `filter`.
    pub fn not(filter: Filter<T>) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Narrows this filter by `other`.
    ///
    /// `All` is the identity, and repeated calls flatten into a single [`Filter::AllOf`].
    pub fn and(self, other: Filter<T>) -> Self {
        match (self, other) {
            (Self::All, other) => other,
            (this, Self::All) => this,
            (Self::AllOf(mut filters), other) => {
                filters.push(other);
                Self::AllOf(filters)
            }
            (this, other) => Self::AllOf(vec![this, other]),
        }
    }

    /// Widens this filter by `other`.
    pub fn or(self, other: Filter<T>) -> Self {
        match (self, other) {
            (Self::AnyOf(mut filters), other) if !filters.is_empty() => {
                filters.push(other);
                Self::AnyOf(filters)
            }
            (this, other) => Self::AnyOf(vec![this, other]),
        }
    }

    /// Returns true if this filter accepts everything without evaluating anything.
    pub fn is_trivial(&self) -> bool {
        match self {
            Self::All => true,
            Self::AllOf(filters) => filters.iter().all(Self::is_trivial),
            Self::AnyOf(filters) => filters.is_empty() || filters.iter().any(Self::is_trivial),
            Self::Description(_) | Self::Predicate(_) | Self::Not(_) => false,
        }
    }
}

impl<T: Described + ?Sized> Filter<T> {
    /// Returns true if `item` is accepted by this filter.
    pub fn include(&self, item: &T) -> bool {
        match self {
            Self::All => true,
            Self::Description(matcher) => matcher.is_match(item.description()),
            Self::Predicate(predicate) => (predicate.f)(item),
            Self::Not(filter) => !filter.include(item),
            Self::AllOf(filters) => filters.iter().all(|filter| filter.include(item)),
            Self::AnyOf(filters) => {
                filters.is_empty() || filters.iter().any(|filter| filter.include(item))
            }
        }
    }
}

impl<T: ?Sized> Default for Filter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: ?Sized> Clone for Filter<T> {
    fn clone(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Description(matcher) => Self::Description(matcher.clone()),
            Self::Predicate(predicate) => Self::Predicate(predicate.clone()),
            Self::Not(filter) => Self::Not(filter.clone()),
            Self::AllOf(filters) => Self::AllOf(filters.clone()),
            Self::AnyOf(filters) => Self::AnyOf(filters.clone()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Description(matcher) => f.debug_tuple("Description").field(matcher).finish(),
            Self::Predicate(predicate) => predicate.fmt(f),
            Self::Not(filter) => f.debug_tuple("Not").field(filter).finish(),
            Self::AllOf(filters) => f.debug_tuple("AllOf").field(filters).finish(),
            Self::AnyOf(filters) => f.debug_tuple("AnyOf").field(filters).finish(),
        }
    }
}

impl<T: ?Sized> ops::Not for Filter<T> {
    type Output = Filter<T>;

    fn not(self) -> Self::Output {
        Filter::Not(Box::new(self))
    }
}
