/**
 * LatentReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

extern crate fnv;
extern crate scoped_pool;

use std::cmp::Ordering;
use std::f64::NEG_INFINITY;
use std::sync::Mutex;

use fnv::FnvHashMap;
use scoped_pool::Pool;

use interactions::Interactions;
use mf::MatrixFactorization;

/// Cutoffs for the precision@k and recall@k metrics.
pub const PRECISION_KS: [usize; 2] = [5, 10];

/// Ranking quality of the model for one test user, over the candidate items
/// that remain after excluding the user's training items.
///
/// All metrics treat the user's held-out test items as the relevant set:
///
/// * `precision[i]` — relevant items among the top `PRECISION_KS[i]` ranked
///   candidates, divided by the cutoff.
/// * `recall[i]` — relevant items among the top `PRECISION_KS[i]` ranked
///   candidates, divided by the number of relevant items in the ranking.
/// * `auc` — fraction of (relevant, non-relevant) candidate pairs ordered
///   correctly; `None` when the user has no relevant or no non-relevant
///   candidates, in which case the pair set is empty.
/// * `ndcg` — binary-relevance discounted cumulative gain over the full
///   ranking, normalized by the ideal ordering of the relevant items that
///   appear among the candidates.
/// * `reciprocal_rank` — inverse rank of the first relevant item, zero if
///   none is ranked.
pub struct UserMetrics {
    pub user: u32,
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub auc: Option<f64>,
    pub ndcg: f64,
    pub reciprocal_rank: f64,
}

/// Aggregate metrics, unweighted means over all evaluated users. Users
/// without test interactions or without candidates after exclusion are
/// skipped entirely; users with an undefined AUC are excluded from the AUC
/// mean only. Produced fresh per evaluation call, never mutated afterwards.
pub struct Evaluation {
    pub metrics: FnvHashMap<String, f64>,
    pub num_users_evaluated: usize,
}

/// Score ranking metrics for every user present in the test interactions.
/// Reads the model and both interaction stores only; the per-user work is
/// spread over a worker pool and partial results are merged in ascending
/// user order afterwards, so aggregates are reproducible.
pub fn evaluate(
    recommender: &MatrixFactorization,
    test_interactions: &Interactions,
    training_interactions: &Interactions,
    candidate_items: &[u32],
    pool_size: usize,
) -> Evaluation {

    let pool = Pool::new(::std::cmp::max(pool_size, 1));

    let per_user_metrics: Mutex<Vec<UserMetrics>> = Mutex::new(Vec::new());

    pool.scoped(|scope| {
        for user in test_interactions.users() {

            let reference_to_metrics = &per_user_metrics;

            scope.execute(move || {
                let metrics = evaluate_user(
                    recommender,
                    user,
                    test_interactions,
                    training_interactions,
                    candidate_items,
                );

                if let Some(metrics) = metrics {
                    reference_to_metrics.lock().unwrap().push(metrics);
                }
            });
        }
    });

    let mut per_user_metrics = per_user_metrics.into_inner().unwrap();
    per_user_metrics.sort_by_key(|metrics| metrics.user);

    aggregate(&per_user_metrics)
}

/// Rank all candidate items the user has not interacted with during
/// training and compare against the held-out test items. `None` for users
/// without test interactions or without remaining candidates; such users
/// must not contribute to the aggregate.
pub fn evaluate_user(
    recommender: &MatrixFactorization,
    user: u32,
    test_interactions: &Interactions,
    training_interactions: &Interactions,
    candidate_items: &[u32],
) -> Option<UserMetrics> {

    let test_items = test_interactions.items_of(user)?;

    let mut ranking: Vec<(u32, f64)> = candidate_items.iter()
        .filter(|&&item| !training_interactions.contains(user, item))
        .map(|&item| {
            // entities unseen during training rank last via the sentinel
            let score = recommender.predict(user, item).unwrap_or(NEG_INFINITY);
            (item, score)
        })
        .collect();

    if ranking.is_empty() {
        return None;
    }

    // descending by score, ties resolved towards the lower item index
    ranking.sort_by(|&(item_a, score_a), &(item_b, score_b)| {
        score_b.partial_cmp(&score_a)
            .unwrap_or(Ordering::Equal)
            .then(item_a.cmp(&item_b))
    });

    let hit_positions: Vec<usize> = ranking.iter()
        .enumerate()
        .filter(|&(_, &(item, _))| test_items.contains(&item))
        .map(|(position, _)| position)
        .collect();

    let num_candidates = ranking.len();
    let num_relevant = hit_positions.len();

    let precision = PRECISION_KS.iter()
        .map(|&k| {
            let hits_in_top_k = hit_positions.iter().filter(|&&position| position < k).count();
            hits_in_top_k as f64 / k as f64
        })
        .collect();

    let recall = PRECISION_KS.iter()
        .map(|&k| {
            if num_relevant == 0 {
                return 0.0;
            }
            let hits_in_top_k = hit_positions.iter().filter(|&&position| position < k).count();
            hits_in_top_k as f64 / num_relevant as f64
        })
        .collect();

    let num_non_relevant = num_candidates - num_relevant;
    let auc = if num_relevant > 0 && num_non_relevant > 0 {
        let correctly_ordered_pairs: usize = hit_positions.iter()
            .enumerate()
            .map(|(index, &position)| num_non_relevant - (position - index))
            .sum();

        Some(correctly_ordered_pairs as f64 / (num_relevant * num_non_relevant) as f64)
    } else {
        None
    };

    let ndcg = if num_relevant == 0 {
        0.0
    } else {
        let dcg: f64 = hit_positions.iter()
            .map(|&position| 1.0 / (position as f64 + 2.0).log2())
            .sum();
        let idcg: f64 = (0..num_relevant)
            .map(|position| 1.0 / (position as f64 + 2.0).log2())
            .sum();

        dcg / idcg
    };

    let reciprocal_rank = match hit_positions.first() {
        Some(&position) => 1.0 / (position as f64 + 1.0),
        None => 0.0,
    };

    Some(UserMetrics {
        user: user,
        precision: precision,
        recall: recall,
        auc: auc,
        ndcg: ndcg,
        reciprocal_rank: reciprocal_rank,
    })
}

fn aggregate(per_user_metrics: &[UserMetrics]) -> Evaluation {

    let num_users = per_user_metrics.len();
    let mut metrics = FnvHashMap::default();

    let mean = |sum: f64, count: usize| {
        if count == 0 { 0.0 } else { sum / count as f64 }
    };

    for (index, &k) in PRECISION_KS.iter().enumerate() {
        let precision_sum: f64 = per_user_metrics.iter()
            .map(|user_metrics| user_metrics.precision[index])
            .sum();
        let recall_sum: f64 = per_user_metrics.iter()
            .map(|user_metrics| user_metrics.recall[index])
            .sum();

        metrics.insert(format!("prec@{}", k), mean(precision_sum, num_users));
        metrics.insert(format!("recall@{}", k), mean(recall_sum, num_users));
    }

    let num_users_with_auc = per_user_metrics.iter()
        .filter(|user_metrics| user_metrics.auc.is_some())
        .count();
    let auc_sum: f64 = per_user_metrics.iter()
        .filter_map(|user_metrics| user_metrics.auc)
        .sum();

    metrics.insert("AUC".to_string(), mean(auc_sum, num_users_with_auc));

    let ndcg_sum: f64 = per_user_metrics.iter()
        .map(|user_metrics| user_metrics.ndcg)
        .sum();
    metrics.insert("NDCG".to_string(), mean(ndcg_sum, num_users));

    let mrr_sum: f64 = per_user_metrics.iter()
        .map(|user_metrics| user_metrics.reciprocal_rank)
        .sum();
    metrics.insert("MRR".to_string(), mean(mrr_sum, num_users));

    Evaluation {
        metrics: metrics,
        num_users_evaluated: num_users,
    }
}
