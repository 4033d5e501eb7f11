//! Lookup table over a payload's `included` side-table.

use std::collections::HashMap;

use crate::mbta::{Attributes, RawResource};

/// Maps `(type, id)` to the side-loaded resource.
///
/// Built once per payload and dropped with it. A miss is not an error:
/// [`ResourceIndex::attrs_of`] hands back an empty view so callers read
/// every field as absent.
#[derive(Debug, Default)]
pub struct ResourceIndex<'a> {
    by_kind: HashMap<&'a str, HashMap<&'a str, &'a RawResource>>,
}

impl<'a> ResourceIndex<'a> {
    /// Index `included`. A duplicate `(type, id)` keeps the last entry.
    pub fn build(included: &'a [RawResource]) -> Self {
        let mut by_kind: HashMap<&'a str, HashMap<&'a str, &'a RawResource>> = HashMap::new();
        for resource in included {
            by_kind
                .entry(resource.kind.as_str())
                .or_default()
                .insert(resource.id.as_str(), resource);
        }
        Self { by_kind }
    }

    pub fn get(&self, kind: &str, id: &str) -> Option<&'a RawResource> {
        self.by_kind.get(kind)?.get(id).copied()
    }

    /// Attributes of the resource, or an empty view when it is absent.
    pub fn attrs_of(&self, kind: &str, id: Option<&str>) -> Attributes<'a> {
        id.and_then(|id| self.get(kind, id))
            .map(RawResource::attrs)
            .unwrap_or_else(Attributes::empty)
    }

    /// Follow `resource`'s to-one relationship `name` to a resource of the
    /// same type name and return its attributes.
    pub fn related_attrs(&self, resource: &RawResource, name: &str) -> Attributes<'a> {
        self.attrs_of(name, resource.related_id(name))
    }
}
