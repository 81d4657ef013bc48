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

extern crate rand;

use rand::{Rng, XorShiftRng};

use interactions::Interactions;
use mf::{FactorModel, LearningStrategy, MfConfig};
use types::FactorMatrix;
use utils;

/// Attempts at drawing an item the user has not interacted with before we
/// fall back to one unconditional uniform draw. Bounded so users who have
/// seen (nearly) the whole catalog cannot stall an epoch.
pub const MAX_SAMPLING_ATTEMPTS: usize = 32;

/// Fixed generator seed for the sampled objective, so that repeated
/// objective computations on the same model agree.
const OBJECTIVE_SEED: u64 = 20_181_204;

/// Pairwise ranking updates: per sampled (user, positive item, negative
/// item) triple, the factor rows are moved to widen the score gap between
/// the observed and the unobserved item, using the gradient of a logistic
/// ranking loss.
pub struct BprLearning;

/// Draw an item index the user has no observed interaction with. After
/// `MAX_SAMPLING_ATTEMPTS` rejections the last resort is a uniform draw
/// that may hit an observed item, which the update rule tolerates.
pub fn sample_negative_item(
    interactions: &Interactions,
    user: u32,
    num_items: u32,
    rng: &mut XorShiftRng,
) -> u32 {

    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let candidate = rng.gen_range(0, num_items);
        if !interactions.contains(user, candidate) {
            return candidate;
        }
    }

    rng.gen_range(0, num_items)
}

fn update_from_triple(
    model: &mut FactorModel,
    user: u32,
    positive_item: u32,
    negative_item: u32,
    config: &MfConfig,
) {

    let user = user as usize;
    let positive_item = positive_item as usize;
    let negative_item = negative_item as usize;

    let score_gap =
        FactorMatrix::row_scalar_product(&model.user_factors, user, &model.item_factors, positive_item)
        - FactorMatrix::row_scalar_product(&model.user_factors, user, &model.item_factors, negative_item);

    // derivative of ln sigmoid(score_gap)
    let gradient = 1.0 / (1.0 + score_gap.exp());

    let learn_rate = config.learn_rate;
    let regularization = config.regularization;

    for factor in 0..config.num_factors {
        let user_factor = model.user_factors.row(user)[factor];
        let positive_factor = model.item_factors.row(positive_item)[factor];
        let negative_factor = model.item_factors.row(negative_item)[factor];

        model.user_factors.row_mut(user)[factor] +=
            learn_rate * (gradient * (positive_factor - negative_factor) - regularization * user_factor);
        model.item_factors.row_mut(positive_item)[factor] +=
            learn_rate * (gradient * user_factor - regularization * positive_factor);
        model.item_factors.row_mut(negative_item)[factor] +=
            learn_rate * (-gradient * user_factor - regularization * negative_factor);
    }
}

/// Numerically stable ln(1 + e^x)
fn ln_one_plus_exp(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

impl LearningStrategy for BprLearning {

    /// One epoch draws as many triples as there are observed interactions.
    fn iterate(
        &self,
        model: &mut FactorModel,
        interactions: &Interactions,
        config: &MfConfig,
        rng: &mut XorShiftRng,
    ) {

        let num_items = model.item_factors.num_rows() as u32;

        for _ in 0..interactions.len() {
            let positive = interactions.get(rng.gen_range(0, interactions.len()));
            let negative_item =
                sample_negative_item(interactions, positive.user, num_items, rng);

            update_from_triple(model, positive.user, positive.item, negative_item, config);
        }
    }

    /// The exact expected ranking loss is intractable without sampling, so
    /// we evaluate the logistic loss over `len()` triples drawn from a
    /// fixed-seed generator plus the L2 terms. Deterministic across calls
    /// on the same model, mutation free.
    fn compute_objective(
        &self,
        model: &FactorModel,
        interactions: &Interactions,
        config: &MfConfig,
    ) -> f64 {

        let mut rng = utils::rng_from_seed(OBJECTIVE_SEED);
        let num_items = model.item_factors.num_rows() as u32;

        let mut ranking_loss = 0.0;

        for _ in 0..interactions.len() {
            let positive = interactions.get(rng.gen_range(0, interactions.len()));
            let negative_item =
                sample_negative_item(interactions, positive.user, num_items, &mut rng);

            // pairs with entities outside the trained range carry no loss
            let positive_score = model.predict(positive.user, positive.item);
            let negative_score = model.predict(positive.user, negative_item);

            if let (Some(positive_score), Some(negative_score)) = (positive_score, negative_score) {
                ranking_loss += ln_one_plus_exp(-(positive_score - negative_score));
            }
        }

        let regularization_term = 0.5 * config.regularization
            * (model.user_factors.squared_frobenius_norm()
                + model.item_factors.squared_frobenius_norm());

        ranking_loss + regularization_term
    }

    fn name(&self) -> &'static str {
        "bpr"
    }
}
