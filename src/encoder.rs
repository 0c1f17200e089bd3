//! Wire encoding: splices the record's serialized bytes together with the
//! metadata's serialized bytes into one JSON object, without re-parsing
//! the record.
//!
//! The record bytes are classified once (null / empty object / populated
//! object / non-object error) and the splice runs on raw bytes: drop the
//! record's trailing `}`, add a comma, drop the metadata's leading `{`.

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::envelope::{EmbeddedMap, EmbeddedValue, Envelope};
use crate::error::EncodeError;
use crate::link::LinkMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordShape {
    Null,
    EmptyObject,
    Object,
}

impl<C> Envelope<'_, C> {
    /// Encode the envelope to compact JSON bytes.
    ///
    /// CURIEs are resolved against the link map here, at encoding time.
    /// Fails with [`EncodeError::NonObjectRecord`] when the record does not
    /// serialize to a top-level JSON object; record serialization failures
    /// propagate verbatim.
    pub fn to_vec(&self) -> Result<Vec<u8>, EncodeError> {
        let data = self.record_bytes()?;
        let shape = classify(&data)?;
        let meta = self.meta_bytes()?;
        Ok(splice(&data, meta.as_deref(), shape))
    }

    /// Encode the envelope to a compact JSON string.
    pub fn to_json(&self) -> Result<String, EncodeError> {
        let bytes = self.to_vec()?;
        String::from_utf8(bytes).map_err(|err| EncodeError::Json(serde_json::Error::custom(err)))
    }

    fn record_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        match &self.record {
            Some(serialize) => {
                let bytes = serialize()?;
                Ok(bytes.trim_ascii().to_vec())
            }
            None => Ok(Vec::new()),
        }
    }

    fn meta_bytes(&self) -> Result<Option<Vec<u8>>, EncodeError> {
        if self.links.is_empty() && self.embedded.is_empty() {
            return Ok(None);
        }
        // Resolved CURIEs join the link map under the `curies` relation,
        // through the usual collision rule, so a caller-added `curies`
        // link is merged rather than duplicated.
        let curies = self.registry.resolve_curies(&self.links);
        let mut links = self.links.clone();
        if !curies.is_empty() {
            links.insert_all("curies".to_string(), curies);
        }
        let meta = Meta {
            links: &links,
            embedded: &self.embedded,
        };
        Ok(Some(serde_json::to_vec(&meta)?))
    }
}

/// Envelopes serialize as their spliced bytes, passed through untouched via
/// `RawValue`. That makes embedded envelopes and collection items fully
/// recursive. Only meaningful under a JSON serializer, which is the
/// external-encoder contract anyway.
impl<C> Serialize for Envelope<'_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes = self.to_vec().map_err(S::Error::custom)?;
        let text = String::from_utf8(bytes).map_err(S::Error::custom)?;
        let raw = RawValue::from_string(text).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}

fn classify(data: &[u8]) -> Result<RecordShape, EncodeError> {
    if data.is_empty() || data == b"null" {
        return Ok(RecordShape::Null);
    }
    if data[0] != b'{' {
        return Err(EncodeError::NonObjectRecord);
    }
    if data == b"{}" {
        return Ok(RecordShape::EmptyObject);
    }
    Ok(RecordShape::Object)
}

fn splice(data: &[u8], meta: Option<&[u8]>, shape: RecordShape) -> Vec<u8> {
    let Some(meta) = meta else {
        return match shape {
            RecordShape::Null => b"{}".to_vec(),
            _ => data.to_vec(),
        };
    };
    if shape != RecordShape::Object {
        return meta.to_vec();
    }
    let mut out = Vec::with_capacity(data.len() + meta.len());
    out.extend_from_slice(&data[..data.len() - 1]);
    out.push(b',');
    out.extend_from_slice(&meta[1..]);
    out
}

/// The `_links`/`_embedded` metadata object. Both fields appear only when
/// non-empty.
struct Meta<'e, 'a, C> {
    links: &'e LinkMap,
    embedded: &'e EmbeddedMap<'a, C>,
}

impl<C> Serialize for Meta<'_, '_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.links.is_empty() {
            map.serialize_entry("_links", self.links)?;
        }
        if !self.embedded.is_empty() {
            map.serialize_entry("_embedded", self.embedded)?;
        }
        map.end()
    }
}

impl<C> Serialize for EmbeddedMap<'_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (rel, value) in self.iter() {
            map.serialize_entry(rel, value)?;
        }
        map.end()
    }
}

impl<C> Serialize for EmbeddedValue<'_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EmbeddedValue::One(envelope) => envelope.serialize(serializer),
            EmbeddedValue::Many(list) => serializer.collect_seq(list),
        }
    }
}
