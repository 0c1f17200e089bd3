//! Paginated collection pages: a listing of independently wrapped items
//! under `_embedded.items`, plus navigation links and count/total.

use std::any::Any;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::envelope::Envelope;
use crate::error::WrapError;
use crate::link::{Link, LinkMap};
use crate::registry::Registry;

/// A HAL collection response: navigation links, embedded items, and
/// pagination metadata.
///
/// On the wire: `_links`, `_embedded.items` (input order), `count` (number
/// of items on this page), and `total` (caller-supplied, omitted when 0).
/// `total` may exceed `count` under pagination; it is caller-trusted and
/// deliberately unvalidated.
pub struct CollectionPage<'a, C = ()> {
    links: LinkMap,
    items: Vec<Envelope<'a, C>>,
    count: usize,
    total: u64,
}

impl<C> Registry<C> {
    /// Wrap a slice of items into a collection page.
    ///
    /// Every item goes through [`Registry::wrap`] independently, so each
    /// one carries its own `_links` when a generator is registered; strict
    /// mode failures on any item propagate. The self link is attached
    /// under the `self` relation regardless of its own `rel`.
    pub fn collection<'a, T>(
        &'a self,
        ctx: &C,
        items: &'a [T],
        total: u64,
        self_link: Link,
    ) -> Result<CollectionPage<'a, C>, WrapError>
    where
        T: Serialize + Any,
    {
        let mut wrapped = Vec::with_capacity(items.len());
        for item in items {
            wrapped.push(self.wrap(ctx, item)?);
        }
        let mut links = LinkMap::default();
        links.insert("self".to_string(), self_link);
        Ok(CollectionPage {
            links,
            count: items.len(),
            items: wrapped,
            total,
        })
    }
}

impl<C> std::fmt::Debug for CollectionPage<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionPage")
            .field("links", &self.links)
            .field("count", &self.count)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl<'a, C> CollectionPage<'a, C> {
    /// Add a navigation link (e.g. `next`, `prev`), with the usual
    /// one-or-many collision rule.
    pub fn add_link(&mut self, link: Link) {
        self.links.add(link);
    }

    pub fn links(&self) -> &LinkMap {
        &self.links
    }

    pub fn items(&self) -> &[Envelope<'a, C>] {
        &self.items
    }

    /// Number of items on this page.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Caller-supplied total across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Encode the page to compact JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, crate::EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Encode the page to a compact JSON string.
    pub fn to_json(&self) -> Result<String, crate::EncodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<C> Serialize for CollectionPage<'_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("_links", &self.links)?;
        map.serialize_entry("_embedded", &ItemsBody { items: &self.items })?;
        map.serialize_entry("count", &self.count)?;
        if self.total != 0 {
            map.serialize_entry("total", &self.total)?;
        }
        map.end()
    }
}

struct ItemsBody<'e, 'a, C> {
    items: &'e [Envelope<'a, C>],
}

impl<C> Serialize for ItemsBody<'_, '_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("items", self.items)?;
        map.end()
    }
}
