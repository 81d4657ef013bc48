extern crate fnv;

use std::slice;

use fnv::FnvHashSet;

use stats::DataDictionary;
use types;
use types::SparseBinaryMatrix;

/// A single observed interaction. The weight defaults to 1.0 for implicit
/// feedback data and carries the rating for explicit feedback data.
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    pub user: u32,
    pub item: u32,
    pub weight: f64,
}

/// Raw record as produced by the input readers: external user identifier,
/// external item identifier and an interaction weight.
pub type RawInteraction = (String, String, f64);

/// Sparse collection of observed interactions. Keeps the insertion order for
/// iteration as well as a per-user item set for constant-time containment
/// checks during negative sampling and evaluation.
pub struct Interactions {
    interactions: Vec<Interaction>,
    user_items: SparseBinaryMatrix,
    max_item_id: u32,
}

impl Interactions {

    pub fn new() -> Self {
        Interactions {
            interactions: Vec::new(),
            user_items: types::new_sparse_binary_matrix(0),
            max_item_id: 0,
        }
    }

    /// Build the store in a single pass over a record source, resolving
    /// external identifiers through the dictionary as they are read.
    pub fn from_records<I>(records: I, data_dict: &mut DataDictionary) -> Self
        where I: IntoIterator<Item = RawInteraction> {

        let mut interactions = Interactions::new();

        for (user, item, weight) in records {
            let (user_index, item_index) = data_dict.observe(&user, &item);
            interactions.push(user_index, item_index, weight);
        }

        interactions
    }

    pub fn push(&mut self, user: u32, item: u32, weight: f64) {
        let user_idx = user as usize;

        if user_idx >= self.user_items.len() {
            self.user_items.resize(user_idx + 1, FnvHashSet::default());
        }
        self.user_items[user_idx].insert(item);

        if item > self.max_item_id {
            self.max_item_id = item;
        }

        self.interactions.push(Interaction { user: user, item: item, weight: weight });
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn get(&self, index: usize) -> &Interaction {
        &self.interactions[index]
    }

    /// Iteration in insertion order, restartable.
    pub fn iter(&self) -> slice::Iter<Interaction> {
        self.interactions.iter()
    }

    /// Highest internal user index observed, `None` for an empty store.
    pub fn max_user_id(&self) -> Option<u32> {
        if self.user_items.is_empty() {
            None
        } else {
            Some(self.user_items.len() as u32 - 1)
        }
    }

    /// Highest internal item index observed, `None` for an empty store.
    pub fn max_item_id(&self) -> Option<u32> {
        if self.interactions.is_empty() {
            None
        } else {
            Some(self.max_item_id)
        }
    }

    pub fn contains(&self, user: u32, item: u32) -> bool {
        self.user_items.get(user as usize)
            .map(|items| items.contains(&item))
            .unwrap_or(false)
    }

    /// All items the given user interacted with, `None` for unknown users.
    pub fn items_of(&self, user: u32) -> Option<&FnvHashSet<u32>> {
        self.user_items.get(user as usize).filter(|items| !items.is_empty())
    }

    /// Users with at least one interaction, in ascending index order.
    pub fn users<'a>(&'a self) -> impl Iterator<Item = u32> + 'a {
        self.user_items.iter()
            .enumerate()
            .filter(|&(_, items)| !items.is_empty())
            .map(|(user, _)| user as u32)
    }
}

#[cfg(test)]
mod tests {

    use super::Interactions;
    use stats::DataDictionary;

    fn example_store() -> Interactions {
        let mut interactions = Interactions::new();
        interactions.push(0, 0, 1.0);
        interactions.push(0, 1, 1.0);
        interactions.push(1, 1, 1.0);

        interactions
    }

    #[test]
    fn counts_and_bounds() {
        let interactions = example_store();

        assert_eq!(interactions.len(), 3);
        assert_eq!(interactions.max_user_id(), Some(1));
        assert_eq!(interactions.max_item_id(), Some(1));
    }

    #[test]
    fn empty_store_has_no_bounds() {
        let interactions = Interactions::new();

        assert!(interactions.is_empty());
        assert_eq!(interactions.max_user_id(), None);
        assert_eq!(interactions.max_item_id(), None);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let interactions = example_store();

        let pairs: Vec<(u32, u32)> = interactions.iter()
            .map(|interaction| (interaction.user, interaction.item))
            .collect();

        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 1)]);

        // restartable
        assert_eq!(interactions.iter().count(), 3);
    }

    #[test]
    fn containment() {
        let interactions = example_store();

        assert!(interactions.contains(0, 0));
        assert!(interactions.contains(0, 1));
        assert!(interactions.contains(1, 1));

        assert!(!interactions.contains(1, 0));
        assert!(!interactions.contains(2, 0));
        assert!(!interactions.contains(0, 7));
    }

    #[test]
    fn items_by_user() {
        let interactions = example_store();

        let items_of_first_user = interactions.items_of(0).unwrap();
        assert_eq!(items_of_first_user.len(), 2);
        assert!(items_of_first_user.contains(&0));
        assert!(items_of_first_user.contains(&1));

        assert!(interactions.items_of(5).is_none());
    }

    #[test]
    fn users_in_ascending_order() {
        let interactions = example_store();
        let users: Vec<u32> = interactions.users().collect();

        assert_eq!(users, vec![0, 1]);
    }

    #[test]
    fn built_from_records_through_a_dictionary() {
        let records = vec![
            ("alice".to_string(), "apple".to_string(), 1.0),
            ("alice".to_string(), "dog".to_string(), 1.0),
            ("bob".to_string(), "apple".to_string(), 2.5),
        ];

        let mut data_dict = DataDictionary::new();
        let interactions = Interactions::from_records(records, &mut data_dict);

        assert_eq!(interactions.len(), 3);
        assert_eq!(data_dict.num_users(), 2);
        assert_eq!(data_dict.num_items(), 2);

        let alice = data_dict.user_index("alice").unwrap();
        let bob = data_dict.user_index("bob").unwrap();
        let apple = data_dict.item_index("apple").unwrap();

        assert!(interactions.contains(alice, apple));
        assert!(interactions.contains(bob, apple));

        let weights: Vec<f64> = interactions.iter()
            .map(|interaction| interaction.weight)
            .collect();
        assert_eq!(weights, vec![1.0, 1.0, 2.5]);
    }
}
