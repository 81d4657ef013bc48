extern crate fnv;

use std::ops::Range;

use fnv::FnvHashMap;

use error::LookupError;

/// Mapping between arbitrary external identifiers and the dense, zero-based
/// internal indices used for matrix row addressing. Indices are assigned in
/// first-seen order and never reassigned.
pub struct IdMapping {
    indices: FnvHashMap<String, u32>,
    names: Vec<String>,
}

impl IdMapping {

    pub fn new() -> Self {
        IdMapping {
            indices: FnvHashMap::with_capacity_and_hasher(100, Default::default()),
            names: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Internal index for `external`, assigning the next free index if the
    /// identifier has not been seen before.
    pub fn to_internal_id(&mut self, external: &str) -> u32 {
        if let Some(&index) = self.indices.get(external) {
            return index;
        }

        let index = self.names.len() as u32;
        self.indices.insert(external.to_owned(), index);
        self.names.push(external.to_owned());
        index
    }

    /// Read-only lookup, `None` for identifiers never observed.
    pub fn internal_id(&self, external: &str) -> Option<u32> {
        self.indices.get(external).cloned()
    }

    /// Inverse of `to_internal_id`. Asking for an index that was never
    /// assigned is a programming error and fails accordingly.
    pub fn to_external_id(&self, internal: u32) -> Result<&str, LookupError> {
        self.names.get(internal as usize)
            .map(|name| name.as_str())
            .ok_or(LookupError { internal_id: internal })
    }

    /// All assigned internal indices, in assignment order. The returned
    /// range is lazy and can be restarted by calling this again.
    pub fn internal_ids(&self) -> Range<u32> {
        0..self.names.len() as u32
    }
}

/// One `IdMapping` per entity class plus basic statistics of the records
/// observed through it.
pub struct DataDictionary {
    user_ids: IdMapping,
    item_ids: IdMapping,
    num_interactions: u64,
}

impl DataDictionary {

    pub fn new() -> Self {
        DataDictionary {
            user_ids: IdMapping::new(),
            item_ids: IdMapping::new(),
            num_interactions: 0,
        }
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn num_interactions(&self) -> u64 {
        self.num_interactions
    }

    pub fn user_ids(&self) -> &IdMapping {
        &self.user_ids
    }

    pub fn item_ids(&self) -> &IdMapping {
        &self.item_ids
    }

    pub fn user_index(&self, name: &str) -> Option<u32> {
        self.user_ids.internal_id(name)
    }

    pub fn item_index(&self, name: &str) -> Option<u32> {
        self.item_ids.internal_id(name)
    }

    /// Resolve one observed record, assigning internal indices to unseen
    /// identifiers. Single-writer, meant to be called from one loading pass.
    pub fn observe(&mut self, user: &str, item: &str) -> (u32, u32) {
        let user_index = self.user_ids.to_internal_id(user);
        let item_index = self.item_ids.to_internal_id(item);
        self.num_interactions += 1;

        (user_index, item_index)
    }
}

#[cfg(test)]
mod tests {

    use super::{DataDictionary, IdMapping};

    #[test]
    fn distinct_externals_get_distinct_internals() {
        let mut mapping = IdMapping::new();

        let apple = mapping.to_internal_id("apple");
        let dog = mapping.to_internal_id("dog");
        let pony = mapping.to_internal_id("pony");

        assert_ne!(apple, dog);
        assert_ne!(apple, pony);
        assert_ne!(dog, pony);
    }

    #[test]
    fn assignment_is_idempotent_and_first_seen_ordered() {
        let mut mapping = IdMapping::new();

        assert_eq!(mapping.to_internal_id("apple"), 0);
        assert_eq!(mapping.to_internal_id("dog"), 1);
        assert_eq!(mapping.to_internal_id("apple"), 0);
        assert_eq!(mapping.to_internal_id("dog"), 1);
        assert_eq!(mapping.to_internal_id("pony"), 2);
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn round_trip_law() {
        let mut mapping = IdMapping::new();

        for name in &["apple", "dog", "pony"] {
            let internal = mapping.to_internal_id(name);
            assert_eq!(mapping.to_external_id(internal).unwrap(), *name);
        }
    }

    #[test]
    fn unassigned_internal_id_is_a_lookup_error() {
        let mut mapping = IdMapping::new();
        mapping.to_internal_id("apple");

        assert!(mapping.to_external_id(0).is_ok());
        assert!(mapping.to_external_id(1).is_err());
    }

    #[test]
    fn internal_ids_are_restartable() {
        let mut mapping = IdMapping::new();
        mapping.to_internal_id("apple");
        mapping.to_internal_id("dog");

        let first_pass: Vec<u32> = mapping.internal_ids().collect();
        let second_pass: Vec<u32> = mapping.internal_ids().collect();

        assert_eq!(first_pass, vec![0, 1]);
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn dictionary_tracks_both_entity_classes() {
        let mut data_dict = DataDictionary::new();

        let (alice, apple) = data_dict.observe("alice", "apple");
        let (bob, apple_again) = data_dict.observe("bob", "apple");

        assert_eq!(alice, 0);
        assert_eq!(bob, 1);
        assert_eq!(apple, 0);
        assert_eq!(apple, apple_again);

        assert_eq!(data_dict.num_users(), 2);
        assert_eq!(data_dict.num_items(), 1);
        assert_eq!(data_dict.num_interactions(), 2);

        assert_eq!(data_dict.user_index("alice"), Some(0));
        assert_eq!(data_dict.item_index("bike"), None);
    }
}
