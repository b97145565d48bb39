//! `TaggedValue` type: a basic value with an optional semantic tag.
//!
//! Values are displayed in CBOR diagnostic notation, e.g. `1004("2019-12-10")`.

use std::fmt;

use num_bigint::BigInt;

/// Semantic tag refining the meaning of a value (e.g. "this text is a date").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u64);

impl Tag {
    /// RFC 8943 full-date: text in `yyyy-MM-dd` form.
    pub const FULL_DATE: Self = Self(1004);

    /// Create a tag from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The numeric tag value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Tag {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The basic kind of a value, ignoring its payload and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Arbitrary-precision signed integer.
    Integer,
    /// Unicode text.
    Text,
    /// `true` or `false`.
    Boolean,
    /// Ordered list of tagged values.
    Sequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "text"),
            Self::Boolean => write!(f, "boolean"),
            Self::Sequence => write!(f, "sequence"),
        }
    }
}

/// An untagged value.
///
/// `Sequence` only appears in query tokens (parameter and data-element
/// references) and never as an evaluation operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer value.
    Integer(BigInt),
    /// Text value.
    Text(String),
    /// Boolean value.
    Boolean(bool),
    /// Sequence of tagged values.
    Sequence(Vec<TaggedValue>),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Text(_) => ValueKind::Text,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Sequence(_) => ValueKind::Sequence,
        }
    }

    /// Returns the integer if this is an `Integer` variant.
    #[must_use]
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the text if this is a `Text` variant.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Boolean` variant.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the items if this is a `Sequence` variant.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[TaggedValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A value together with its optional semantic tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedValue {
    /// The untagged value.
    pub value: Value,
    /// Semantic tag, if any.
    pub tag: Option<Tag>,
}

impl TaggedValue {
    /// Wrap an untagged value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value, tag: None }
    }

    /// Integer value without a tag.
    #[must_use]
    pub fn integer(value: impl Into<BigInt>) -> Self {
        Self::new(Value::Integer(value.into()))
    }

    /// Text value without a tag.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(Value::Text(value.into()))
    }

    /// Boolean value without a tag.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::new(Value::Boolean(value))
    }

    /// Sequence value without a tag.
    #[must_use]
    pub fn sequence(items: impl IntoIterator<Item = TaggedValue>) -> Self {
        Self::new(Value::Sequence(items.into_iter().collect()))
    }

    /// Text value tagged as a full date. The text is taken as-is.
    #[must_use]
    pub fn date(value: impl Into<String>) -> Self {
        Self::text(value).with_tag(Tag::FULL_DATE)
    }

    /// Replace the semantic tag.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Returns the kind of the underlying value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

impl From<Value> for TaggedValue {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<BigInt> for TaggedValue {
    fn from(value: BigInt) -> Self {
        Self::integer(value)
    }
}

impl From<&str> for TaggedValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for TaggedValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{tag}({})", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}
