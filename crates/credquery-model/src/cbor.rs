//! CBOR wire boundary for queries, parameter tables and data-element tables.
//!
//! A query is a CBOR array of tagged items. The outermost tag of each item is
//! its role; operator items may nest a second tag directly underneath, naming
//! the semantic tag their operands must carry:
//!
//! ```text
//! [
//!   301(["a", 1004(1)]),                       parameter `a`, declared string, tag 1004
//!   301(["b", 1004(1)]),
//!   302(1004(0)),                              `<` over operands tagged 1004
//!   300(["org.iso.18013.5.1", "age_over_18"]), data element reference
//! ]
//! ```
//!
//! Plain values carry at most one tag. CBOR bignums (tags 2 and 3) are read as
//! integers and never surface as semantic tags.

use std::collections::{HashMap, HashSet};

use ciborium::Value as Cbor;
use ciborium::value::Integer;
use num_bigint::{BigInt, Sign};

use crate::error::CodecError;
use crate::tagged_value::{Tag, TaggedValue, Value};
use crate::token::{Query, QueryToken};

const BIGNUM_POSITIVE: u64 = 2;
const BIGNUM_NEGATIVE: u64 = 3;

/// Parameter table as found on the wire: parameter name to value.
pub type ParameterMap = HashMap<String, TaggedValue>;

/// Data-element table as found on the wire: namespace to element name to value.
pub type DataElementMap = HashMap<String, HashMap<String, TaggedValue>>;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a CBOR-encoded query.
pub fn decode_query(bytes: &[u8]) -> Result<Query, CodecError> {
    query_from_cbor(read(bytes)?)
}

/// Decode a single CBOR-encoded value.
pub fn decode_value(bytes: &[u8]) -> Result<TaggedValue, CodecError> {
    value_from_cbor(read(bytes)?)
}

/// Decode a CBOR map of parameter names to values.
pub fn decode_parameters(bytes: &[u8]) -> Result<ParameterMap, CodecError> {
    parameters_from_cbor(read(bytes)?)
}

/// Decode a CBOR map of namespaces to maps of element names to values.
pub fn decode_data_elements(bytes: &[u8]) -> Result<DataElementMap, CodecError> {
    data_elements_from_cbor(read(bytes)?)
}

/// Convert a CBOR array of tagged items into a query.
pub fn query_from_cbor(item: Cbor) -> Result<Query, CodecError> {
    match item {
        Cbor::Array(items) => items.into_iter().map(token_from_cbor).collect(),
        other => Err(unexpected("array of query tokens", &other)),
    }
}

/// Convert one CBOR item into a query token, splitting off the role tag and
/// the operand tag.
pub fn token_from_cbor(item: Cbor) -> Result<QueryToken, CodecError> {
    let (role_tag, inner) = split_tag(item);
    let (operand_tag, body) = split_tag(inner);
    Ok(QueryToken {
        role_tag,
        operand_tag: operand_tag.map(Tag::new),
        body: plain_value(body)?,
    })
}

/// Convert a CBOR item carrying at most one semantic tag into a tagged value.
pub fn value_from_cbor(item: Cbor) -> Result<TaggedValue, CodecError> {
    let (tag, inner) = split_tag(item);
    Ok(TaggedValue {
        value: plain_value(inner)?,
        tag: tag.map(Tag::new),
    })
}

/// Convert a CBOR map of text keys into a parameter table.
pub fn parameters_from_cbor(item: Cbor) -> Result<ParameterMap, CodecError> {
    text_map(item, "map of parameters")?
        .into_iter()
        .map(|(name, value)| value_from_cbor(value).map(|value| (name, value)))
        .collect()
}

/// Convert a nested CBOR map into a data-element table.
pub fn data_elements_from_cbor(item: Cbor) -> Result<DataElementMap, CodecError> {
    text_map(item, "map of namespaces")?
        .into_iter()
        .map(|(namespace, elements)| {
            parameters_from_cbor(elements).map(|elements| (namespace, elements))
        })
        .collect()
}

fn read(bytes: &[u8]) -> Result<Cbor, CodecError> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::Malformed(format!("{e:?}")))
}

/// Peel one non-bignum tag off `item`.
fn split_tag(item: Cbor) -> (Option<u64>, Cbor) {
    match item {
        Cbor::Tag(tag, inner) if !is_bignum(tag, &inner) => (Some(tag), *inner),
        other => (None, other),
    }
}

fn is_bignum(tag: u64, inner: &Cbor) -> bool {
    matches!(tag, BIGNUM_POSITIVE | BIGNUM_NEGATIVE) && matches!(inner, Cbor::Bytes(_))
}

/// Convert an item whose tags have already been peeled off.
fn plain_value(item: Cbor) -> Result<Value, CodecError> {
    match item {
        Cbor::Integer(n) => Ok(Value::Integer(BigInt::from(i128::from(n)))),
        Cbor::Text(s) => Ok(Value::Text(s)),
        Cbor::Bool(b) => Ok(Value::Boolean(b)),
        Cbor::Array(items) => items
            .into_iter()
            .map(value_from_cbor)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Cbor::Tag(tag, inner) => match (tag, *inner) {
            (BIGNUM_POSITIVE, Cbor::Bytes(bytes)) => {
                Ok(Value::Integer(BigInt::from_bytes_be(Sign::Plus, &bytes)))
            }
            (BIGNUM_NEGATIVE, Cbor::Bytes(bytes)) => Ok(Value::Integer(
                BigInt::from(-1) - BigInt::from_bytes_be(Sign::Plus, &bytes),
            )),
            (tag, _) => Err(CodecError::NestedTag { tag }),
        },
        other => Err(CodecError::Unsupported {
            kind: describe(&other),
        }),
    }
}

fn text_map(item: Cbor, expected: &'static str) -> Result<Vec<(String, Cbor)>, CodecError> {
    let entries = match item {
        Cbor::Map(entries) => entries,
        other => return Err(unexpected(expected, &other)),
    };

    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .map(|(key, value)| {
            let key = match key {
                Cbor::Text(key) => key,
                other => return Err(unexpected("text map key", &other)),
            };
            if !seen.insert(key.clone()) {
                return Err(CodecError::DuplicateKey { key });
            }
            Ok((key, value))
        })
        .collect()
}

fn unexpected(expected: &'static str, found: &Cbor) -> CodecError {
    CodecError::UnexpectedItem {
        expected,
        found: describe(found),
    }
}

fn describe(item: &Cbor) -> String {
    match item {
        Cbor::Integer(_) => "integer".to_owned(),
        Cbor::Bytes(_) => "byte string".to_owned(),
        Cbor::Float(_) => "float".to_owned(),
        Cbor::Text(_) => "text".to_owned(),
        Cbor::Bool(_) => "bool".to_owned(),
        Cbor::Null => "null".to_owned(),
        Cbor::Tag(tag, _) => format!("tag {tag}"),
        Cbor::Array(_) => "array".to_owned(),
        Cbor::Map(_) => "map".to_owned(),
        _ => "unknown item".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a query, nesting each token's operand tag under its role tag.
pub fn encode_query(query: &Query) -> Result<Vec<u8>, CodecError> {
    write(&Cbor::Array(query.iter().map(token_to_cbor).collect()))
}

/// Encode a single value.
pub fn encode_value(value: &TaggedValue) -> Result<Vec<u8>, CodecError> {
    write(&value_to_cbor(value))
}

/// Encode a parameter table. Keys are written in sorted order.
pub fn encode_parameters<'a, I>(entries: I) -> Result<Vec<u8>, CodecError>
where
    I: IntoIterator<Item = (&'a String, &'a TaggedValue)>,
{
    write(&parameters_to_cbor(entries))
}

/// Encode a data-element table. Keys are written in sorted order.
pub fn encode_data_elements(elements: &DataElementMap) -> Result<Vec<u8>, CodecError> {
    let mut namespaces: Vec<_> = elements.iter().collect();
    namespaces.sort_by_key(|(namespace, _)| *namespace);
    let map = namespaces
        .into_iter()
        .map(|(namespace, elements)| (Cbor::Text(namespace.clone()), parameters_to_cbor(elements)))
        .collect();
    write(&Cbor::Map(map))
}

/// Convert a query token back into its nested-tag CBOR form.
#[must_use]
pub fn token_to_cbor(token: &QueryToken) -> Cbor {
    wrap(
        token.role_tag,
        wrap(token.operand_tag.map(Tag::value), plain_to_cbor(&token.body)),
    )
}

/// Convert a tagged value into CBOR.
#[must_use]
pub fn value_to_cbor(value: &TaggedValue) -> Cbor {
    wrap(value.tag.map(Tag::value), plain_to_cbor(&value.value))
}

fn parameters_to_cbor<'a, I>(entries: I) -> Cbor
where
    I: IntoIterator<Item = (&'a String, &'a TaggedValue)>,
{
    let mut entries: Vec<_> = entries.into_iter().collect();
    entries.sort_by_key(|(name, _)| *name);
    Cbor::Map(
        entries
            .into_iter()
            .map(|(name, value)| (Cbor::Text(name.clone()), value_to_cbor(value)))
            .collect(),
    )
}

fn plain_to_cbor(value: &Value) -> Cbor {
    match value {
        Value::Integer(n) => integer_to_cbor(n),
        Value::Text(s) => Cbor::Text(s.clone()),
        Value::Boolean(b) => Cbor::Bool(*b),
        Value::Sequence(items) => Cbor::Array(items.iter().map(value_to_cbor).collect()),
    }
}

fn integer_to_cbor(n: &BigInt) -> Cbor {
    if let Some(small) = i128::try_from(n)
        .ok()
        .and_then(|v| Integer::try_from(v).ok())
    {
        return Cbor::Integer(small);
    }
    // Outside the native CBOR integer range: fall back to a bignum.
    if n.sign() == Sign::Minus {
        let magnitude = BigInt::from(-1) - n;
        Cbor::Tag(
            BIGNUM_NEGATIVE,
            Box::new(Cbor::Bytes(magnitude.to_bytes_be().1)),
        )
    } else {
        Cbor::Tag(BIGNUM_POSITIVE, Box::new(Cbor::Bytes(n.to_bytes_be().1)))
    }
}

fn wrap(tag: Option<u64>, item: Cbor) -> Cbor {
    match tag {
        Some(tag) => Cbor::Tag(tag, Box::new(item)),
        None => item,
    }
}

fn write(item: &Cbor) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(item, &mut buf).map_err(|e| CodecError::Encode(format!("{e:?}")))?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
