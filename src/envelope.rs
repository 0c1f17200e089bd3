//! The envelope: one borrowed record plus its accumulated hypermedia
//! metadata, waiting to be spliced into wire bytes by the encoder.

use serde::Serialize;

use crate::link::{Link, LinkMap};
use crate::registry::Registry;

/// Erased record serializer. Captures the caller's borrow so the record is
/// referenced, never copied.
pub(crate) type RecordFn<'a> = Box<dyn Fn() -> serde_json::Result<Vec<u8>> + 'a>;

/// A record wrapped with computed links and embedded sub-resources.
///
/// Built by [`Registry::wrap`] (links are computed at wrap time) or
/// [`Registry::empty_envelope`]. Not intended for concurrent mutation:
/// metadata is accumulated once, then the envelope is encoded read-only.
pub struct Envelope<'a, C = ()> {
    pub(crate) registry: &'a Registry<C>,
    pub(crate) record: Option<RecordFn<'a>>,
    pub(crate) links: LinkMap,
    pub(crate) embedded: EmbeddedMap<'a, C>,
}

impl<C> std::fmt::Debug for Envelope<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("record", &self.record.is_some())
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

impl<'a, C> Envelope<'a, C> {
    pub(crate) fn bare(registry: &'a Registry<C>) -> Self {
        Envelope {
            registry,
            record: None,
            links: LinkMap::default(),
            embedded: EmbeddedMap::default(),
        }
    }

    pub(crate) fn with_record<T: Serialize>(registry: &'a Registry<C>, record: &'a T) -> Self {
        Envelope {
            registry,
            record: Some(Box::new(move || serde_json::to_vec(record))),
            links: LinkMap::default(),
            embedded: EmbeddedMap::default(),
        }
    }

    /// Append a link under its relation. A second link for an already-used
    /// relation converts the slot to an ordered list; later links append.
    pub fn add_link(&mut self, link: Link) {
        self.links.add(link);
    }

    /// Embed a sub-resource under a relation, with the same one-or-many
    /// collision rule as links. The embedded envelope is spliced
    /// recursively at encoding time, `_links` and all.
    pub fn add_embedded(&mut self, rel: impl Into<String>, envelope: Envelope<'a, C>) {
        self.embedded.add(rel.into(), envelope);
    }

    /// The accumulated link map, before CURIE injection.
    pub fn links(&self) -> &LinkMap {
        &self.links
    }

    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }
}

/// The value embedded under one relation: a single envelope or an ordered
/// list of envelopes.
pub(crate) enum EmbeddedValue<'a, C> {
    One(Envelope<'a, C>),
    Many(Vec<Envelope<'a, C>>),
}

impl<'a, C> EmbeddedValue<'a, C> {
    fn push(&mut self, envelope: Envelope<'a, C>) {
        let current = std::mem::replace(self, EmbeddedValue::Many(Vec::new()));
        *self = match current {
            EmbeddedValue::One(first) => EmbeddedValue::Many(vec![first, envelope]),
            EmbeddedValue::Many(mut list) => {
                list.push(envelope);
                EmbeddedValue::Many(list)
            }
        };
    }
}

/// Insertion-ordered map from relation name to embedded envelope(s).
pub(crate) struct EmbeddedMap<'a, C> {
    entries: Vec<(String, EmbeddedValue<'a, C>)>,
}

impl<C> Default for EmbeddedMap<'_, C> {
    fn default() -> Self {
        EmbeddedMap {
            entries: Vec::new(),
        }
    }
}

impl<'a, C> EmbeddedMap<'a, C> {
    fn add(&mut self, rel: String, envelope: Envelope<'a, C>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == rel) {
            Some((_, value)) => value.push(envelope),
            None => self
                .entries
                .push((rel, EmbeddedValue::One(envelope))),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &EmbeddedValue<'a, C>)> {
        self.entries.iter().map(|(rel, value)| (rel.as_str(), value))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
