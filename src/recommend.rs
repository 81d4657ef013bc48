use std::cmp::Ordering;
use std::collections::BinaryHeap;

use interactions::Interactions;
use mf::MatrixFactorization;

/// Result type used to find the top-n scored items per user via a binary
/// heap.
#[derive(PartialEq, Debug)]
pub struct ScoredItem {
    pub item: u32,
    pub score: f64,
}

/// Ordering for our max-heap. Note that we must use a special implementation
/// here as there is no total order on floating point numbers, and that we
/// reverse the score comparison so that the heap keeps the best entries.
/// Equal scores order by ascending item index, the lowest index wins.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.item.cmp(&scored_item_b.item),
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// The `how_many` best-scored candidate items for a user, best first. Items
/// from the user's training history and items the model cannot score are
/// left out.
pub fn recommend(
    recommender: &MatrixFactorization,
    user: u32,
    training_interactions: &Interactions,
    candidate_items: &[u32],
    how_many: usize,
) -> Vec<ScoredItem> {

    let mut heap = BinaryHeap::with_capacity(how_many);

    if how_many == 0 {
        return Vec::new();
    }

    for &item in candidate_items {

        if training_interactions.contains(user, item) {
            continue;
        }

        let score = match recommender.predict(user, item) {
            Some(score) => score,
            None => continue,
        };

        let scored_item = ScoredItem { item: item, score: score };

        if heap.len() < how_many {
            heap.push(scored_item);
        } else {
            let mut top = heap.peek_mut().unwrap();
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
}
