//! Hypermedia link types: a single relation entry and the ordered
//! relation → link(s) map used by envelopes and collection pages.
//!
//! HAL allows a relation to hold either one link object or an array of
//! link objects. `LinkMap` implements the collision rule: the first link
//! under a relation is stored as a single object, a second converts the
//! slot to an array preserving insertion order.

use serde::Serialize;
use serde::ser::SerializeMap;

/// A single HAL link.
///
/// `rel` is the map key and is never serialized as a field of the link
/// object itself. `templated` is omitted from the wire when false, and
/// the optional fields are omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Relation name, used as the key under `_links`.
    #[serde(skip)]
    pub rel: String,
    /// Target reference.
    pub href: String,
    /// Whether `href` contains URI template placeholders.
    #[serde(skip_serializing_if = "is_false")]
    pub templated: bool,
    /// Media type hint.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Secondary key, used to disambiguate links sharing a relation
    /// (and to carry the prefix on `curies` entries).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// HTTP method hint. Non-standard but common.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Link {
    /// Create a link for `rel` pointing at `href`, all optional fields unset.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Link {
            rel: rel.into(),
            href: href.into(),
            templated: false,
            media_type: None,
            title: None,
            name: None,
            method: None,
        }
    }

    /// Mark the target as a URI template.
    pub fn templated(mut self) -> Self {
        self.templated = true;
        self
    }

    /// Set the media type hint (serialized as `type`).
    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Set the human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the secondary `name` key.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the HTTP method hint.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// The value stored under one relation: a single link or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LinkValue {
    /// Exactly one link was added under this relation.
    One(Link),
    /// Two or more links share this relation, in insertion order.
    Many(Vec<Link>),
}

impl LinkValue {
    /// Append a link, converting `One` to `Many` on first collision.
    pub(crate) fn push(&mut self, link: Link) {
        let current = std::mem::replace(self, LinkValue::Many(Vec::new()));
        *self = match current {
            LinkValue::One(first) => LinkValue::Many(vec![first, link]),
            LinkValue::Many(mut list) => {
                list.push(link);
                LinkValue::Many(list)
            }
        };
    }
}

/// Insertion-ordered map from relation name to link(s).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    entries: Vec<(String, LinkValue)>,
}

impl LinkMap {
    /// Add a link under its own relation, applying the collision rule.
    pub fn add(&mut self, link: Link) {
        let rel = link.rel.clone();
        self.insert(rel, link);
    }

    /// Add a link under an explicit relation, applying the collision rule.
    pub(crate) fn insert(&mut self, rel: String, link: Link) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == rel) {
            Some((_, value)) => value.push(link),
            None => self.entries.push((rel, LinkValue::One(link))),
        }
    }

    /// Look up the value stored under a relation.
    pub fn get(&self, rel: &str) -> Option<&LinkValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == rel)
            .map(|(_, value)| value)
    }

    /// Add several links under one relation as a list, applying the
    /// collision rule: an existing value absorbs them one by one, an empty
    /// slot becomes a list even for a single link.
    pub(crate) fn insert_all(&mut self, rel: String, links: Vec<Link>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == rel) {
            Some((_, value)) => {
                for link in links {
                    value.push(link);
                }
            }
            None => self.entries.push((rel, LinkValue::Many(links))),
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkValue)> {
        self.entries.iter().map(|(rel, value)| (rel.as_str(), value))
    }

    /// Number of relations in the map (not the number of links).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any relation has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LinkMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (rel, value) in &self.entries {
            map.serialize_entry(rel, value)?;
        }
        map.end()
    }
}
