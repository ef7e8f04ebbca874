//! The Lexicon schema data model.
//!
//! Deserialisation doubles as meta-schema validation: the `type` tag selects
//! a variant, each variant carries only the attributes meaningful to it, and
//! anything else in the document is a parse error surfaced to the caller.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::skip_serializing_none;
use smol_str::SmolStr;
use std::collections::BTreeMap;

#[derive(Debug, Serialize_repr, Deserialize_repr, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Lexicon {
    Lexicon1 = 1,
}

/// A single Lexicon schema document.
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexiconDoc {
    pub lexicon: Lexicon,
    pub id: String,
    pub revision: Option<u32>,
    pub description: Option<String>,
    pub defs: BTreeMap<SmolStr, LexType>,
}

// primitives

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexBoolean {
    pub description: Option<String>,
    pub default: Option<bool>,
    pub r#const: Option<bool>,
}

/// The Lexicon type `integer`.
///
/// Lexicon integers are [specified] as signed and 64-bit, which means that
/// values will always fit in an `i64`.
///
/// [specified]: https://atproto.com/specs/data-model#data-types
#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexInteger {
    pub description: Option<String>,
    pub default: Option<i64>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub r#enum: Option<Vec<i64>>,
    pub r#const: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexNumber {
    pub description: Option<String>,
    pub default: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub r#enum: Option<Vec<f64>>,
    pub r#const: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum LexStringFormat {
    Datetime,
    Uri,
    AtUri,
    Did,
    Handle,
    AtIdentifier,
    Nsid,
    Cid,
    Language,
    Tid,
    RecordKey,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexString {
    pub description: Option<String>,
    pub format: Option<LexStringFormat>,
    pub default: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_graphemes: Option<usize>,
    pub max_graphemes: Option<usize>,
    pub r#enum: Option<Vec<String>>,
    pub r#const: Option<String>,
    pub known_values: Option<Vec<String>>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexUnknown {
    pub description: Option<String>,
}

// ipld types

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexBytes {
    pub description: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexCidLink {
    pub description: Option<String>,
}

// references

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexRef {
    pub description: Option<String>,
    pub r#ref: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexRefUnion {
    pub description: Option<String>,
    pub refs: Vec<String>,
    pub closed: Option<bool>,
}

// blobs

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexBlob {
    pub description: Option<String>,
    pub accept: Option<Vec<String>>,
    pub max_size: Option<usize>,
}

// complex types

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexArray {
    pub description: Option<String>,
    pub items: Box<LexType>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexObject {
    pub description: Option<String>,
    pub required: Option<Vec<SmolStr>>,
    pub nullable: Option<Vec<SmolStr>>,
    #[serde(default)]
    pub properties: BTreeMap<SmolStr, LexType>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexToken {
    pub description: Option<String>,
}

// xrpc

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexXrpcBody {
    pub description: Option<String>,
    pub encoding: String,
    pub schema: Option<Box<LexType>>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexXrpcError {
    pub description: Option<String>,
    pub name: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexXrpcQuery {
    pub description: Option<String>,
    pub parameters: Option<Box<LexType>>,
    pub output: Option<LexXrpcBody>,
    pub errors: Option<Vec<LexXrpcError>>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexXrpcProcedure {
    pub description: Option<String>,
    pub parameters: Option<Box<LexType>>,
    pub input: Option<LexXrpcBody>,
    pub output: Option<LexXrpcBody>,
    pub errors: Option<Vec<LexXrpcError>>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexXrpcSubscriptionMessage {
    pub description: Option<String>,
    pub schema: Box<LexType>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexXrpcSubscription {
    pub description: Option<String>,
    pub parameters: Box<LexType>,
    pub message: Option<LexXrpcSubscriptionMessage>,
    pub infos: Option<Vec<LexXrpcError>>,
    pub errors: Option<Vec<LexXrpcError>>,
}

// database

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LexRecord {
    pub description: Option<String>,
    pub key: Option<String>,
    pub record: Box<LexType>,
}

// media

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexImage {
    pub description: Option<String>,
    pub max_width: Option<usize>,
    pub max_height: Option<usize>,
    pub max_size: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexVideo {
    pub description: Option<String>,
    pub max_width: Option<usize>,
    pub max_height: Option<usize>,
    pub max_length: Option<usize>,
    pub max_size: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LexAudio {
    pub description: Option<String>,
    pub max_length: Option<usize>,
    pub max_size: Option<usize>,
}

// core

/// A Lexicon type node, dispatched on its `type` tag.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LexType {
    Ref(LexRef),
    Union(LexRefUnion),
    Object(LexObject),
    Params(LexObject),
    Array(LexArray),
    Boolean(LexBoolean),
    Integer(LexInteger),
    Number(LexNumber),
    String(LexString),
    Bytes(LexBytes),
    CidLink(LexCidLink),
    Blob(LexBlob),
    Unknown(LexUnknown),
    Token(LexToken),
    Record(LexRecord),
    Query(LexXrpcQuery),
    Procedure(LexXrpcProcedure),
    Subscription(LexXrpcSubscription),
    Image(LexImage),
    Video(LexVideo),
    Audio(LexAudio),
}

impl LexType {
    /// The node's `type` tag as it appears in source documents.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ref(_) => "ref",
            Self::Union(_) => "union",
            Self::Object(_) => "object",
            Self::Params(_) => "params",
            Self::Array(_) => "array",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::CidLink(_) => "cid-link",
            Self::Blob(_) => "blob",
            Self::Unknown(_) => "unknown",
            Self::Token(_) => "token",
            Self::Record(_) => "record",
            Self::Query(_) => "query",
            Self::Procedure(_) => "procedure",
            Self::Subscription(_) => "subscription",
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Audio(_) => "audio",
        }
    }

    pub fn description(&self) -> Option<&str> {
        let description = match self {
            Self::Ref(t) => &t.description,
            Self::Union(t) => &t.description,
            Self::Object(t) | Self::Params(t) => &t.description,
            Self::Array(t) => &t.description,
            Self::Boolean(t) => &t.description,
            Self::Integer(t) => &t.description,
            Self::Number(t) => &t.description,
            Self::String(t) => &t.description,
            Self::Bytes(t) => &t.description,
            Self::CidLink(t) => &t.description,
            Self::Blob(t) => &t.description,
            Self::Unknown(t) => &t.description,
            Self::Token(t) => &t.description,
            Self::Record(t) => &t.description,
            Self::Query(t) => &t.description,
            Self::Procedure(t) => &t.description,
            Self::Subscription(t) => &t.description,
            Self::Image(t) => &t.description,
            Self::Video(t) => &t.description,
            Self::Audio(t) => &t.description,
        };
        description.as_deref()
    }
}
