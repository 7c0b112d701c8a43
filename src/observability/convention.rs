//! Observation conventions: naming and tag derivation for server exchanges.
//!
//! # Responsibilities
//! - Name the observation and give each exchange a contextual name
//! - Derive bounded low-cardinality tags (method, uri, status, exception, outcome)
//! - Derive the high-cardinality raw URL tag
//!
//! # Design Decisions
//! - Pure functions of an `ExchangeContext` with no failure path
//! - Every missing input falls back to a sentinel from `keys`
//! - Raw request data never reaches a low-cardinality tag value
//! - One helper per tag so alternate conventions can mix and match

use std::borrow::Cow;

use metrics::{IntoLabels, Label};

use crate::observability::context::ExchangeContext;
use crate::observability::keys;
use crate::observability::outcome::Outcome;

/// A single key/value pair attached to an observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    key: &'static str,
    value: Cow<'static, str>,
}

impl Tag {
    pub fn new(key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn to_label(&self) -> Label {
        match &self.value {
            Cow::Borrowed(v) => Label::new(self.key, *v),
            Cow::Owned(v) => Label::new(self.key, v.clone()),
        }
    }
}

/// Ordered tags, as emitted by a convention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the first tag with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|t| t.key == key).map(Tag::value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(Tag::key)
    }

    pub fn to_labels(&self) -> Vec<Label> {
        self.0.iter().map(Tag::to_label).collect()
    }
}

impl<const N: usize> From<[Tag; N]> for Tags {
    fn from(tags: [Tag; N]) -> Self {
        Self(tags.into())
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoLabels for &Tags {
    fn into_labels(self) -> Vec<Label> {
        self.to_labels()
    }
}

/// Naming and tagging policy for one kind of observation.
///
/// Implementations must be total: every context, however incomplete,
/// produces a name and tags.
pub trait ObservationConvention: Send + Sync {
    /// Name the observation is recorded under.
    fn name(&self) -> &str;

    /// Human-readable label for one exchange, e.g. `http get /users/{id}`.
    fn contextual_name(&self, ctx: &ExchangeContext) -> String;

    fn low_cardinality_tags(&self, ctx: &ExchangeContext) -> Tags;

    fn high_cardinality_tags(&self, ctx: &ExchangeContext) -> Tags;
}

/// Default convention for server request observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultServerRequestConvention {
    name: String,
}

impl DefaultServerRequestConvention {
    /// Convention named `http.server.requests`.
    pub fn new() -> Self {
        Self::with_name(keys::DEFAULT_OBSERVATION_NAME)
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for DefaultServerRequestConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationConvention for DefaultServerRequestConvention {
    fn name(&self) -> &str {
        &self.name
    }

    fn contextual_name(&self, ctx: &ExchangeContext) -> String {
        // Instrumentation always sets the carrier before asking for a name.
        let method = match ctx.carrier() {
            Some(carrier) => carrier.method.as_str().to_lowercase(),
            None => keys::UNKNOWN.to_lowercase(),
        };
        match ctx.route_pattern() {
            Some(pattern) => format!("http {method} {pattern}"),
            None => format!("http {method}"),
        }
    }

    fn low_cardinality_tags(&self, ctx: &ExchangeContext) -> Tags {
        Tags::from([
            method(ctx),
            uri(ctx),
            status(ctx),
            exception(ctx),
            outcome(ctx),
        ])
    }

    fn high_cardinality_tags(&self, ctx: &ExchangeContext) -> Tags {
        Tags::from([http_url(ctx)])
    }
}

/// `method`: upper-cased request method, or `UNKNOWN` without a carrier.
pub fn method(ctx: &ExchangeContext) -> Tag {
    match ctx.carrier() {
        Some(carrier) => Tag::new(keys::METHOD, carrier.method.as_str().to_uppercase()),
        None => Tag::new(keys::METHOD, keys::UNKNOWN),
    }
}

/// `status`: decimal status code, or `UNKNOWN` when aborted or not finalized.
pub fn status(ctx: &ExchangeContext) -> Tag {
    if ctx.is_aborted() {
        return Tag::new(keys::STATUS, keys::UNKNOWN);
    }
    match ctx.status_code() {
        Some(code) => Tag::new(keys::STATUS, code.as_u16().to_string()),
        None => Tag::new(keys::STATUS, keys::UNKNOWN),
    }
}

/// `uri`: matched route template, or a fixed bucket.
///
/// Priority: no carrier → `UNKNOWN`; empty pattern → `root`; pattern →
/// verbatim; unmatched 3xx → `REDIRECTION`; unmatched 404 → `NOT_FOUND`;
/// otherwise `UNKNOWN`.
pub fn uri(ctx: &ExchangeContext) -> Tag {
    if ctx.carrier().is_none() {
        return Tag::new(keys::URI, keys::UNKNOWN);
    }
    if let Some(pattern) = ctx.route_pattern() {
        if pattern.is_empty() {
            return Tag::new(keys::URI, keys::ROOT);
        }
        return Tag::new(keys::URI, pattern.to_string());
    }
    if let Some(code) = ctx.status_code() {
        if code.is_redirection() {
            return Tag::new(keys::URI, keys::REDIRECTION);
        }
        if code.as_u16() == 404 {
            return Tag::new(keys::URI, keys::NOT_FOUND);
        }
    }
    Tag::new(keys::URI, keys::UNKNOWN)
}

/// `exception`: simple type name of the captured error, falling back to the
/// qualified name when the simple one is blank; `NONE` without an error.
pub fn exception(ctx: &ExchangeContext) -> Tag {
    match ctx.error() {
        Some(error) if !error.simple_name.trim().is_empty() => {
            Tag::new(keys::EXCEPTION, error.simple_name.clone())
        }
        Some(error) => Tag::new(keys::EXCEPTION, error.type_name.clone()),
        None => Tag::new(keys::EXCEPTION, keys::NONE),
    }
}

/// `outcome`: status classification, or `UNKNOWN` when aborted or not finalized.
pub fn outcome(ctx: &ExchangeContext) -> Tag {
    if ctx.is_aborted() {
        return Tag::new(keys::OUTCOME, Outcome::Unknown.as_str());
    }
    let outcome = ctx
        .status_code()
        .map(Outcome::for_status)
        .unwrap_or(Outcome::Unknown);
    Tag::new(keys::OUTCOME, outcome.as_str())
}

/// `http.url`: raw request path, or `UNKNOWN` without a carrier.
pub fn http_url(ctx: &ExchangeContext) -> Tag {
    match ctx.carrier() {
        Some(carrier) => Tag::new(keys::HTTP_URL, carrier.path.clone()),
        None => Tag::new(keys::HTTP_URL, keys::UNKNOWN),
    }
}
