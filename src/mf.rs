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
extern crate serde_json;

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::XorShiftRng;

use bpr::BprLearning;
use error::{ModelError, TrainingError};
use interactions::Interactions;
use sgd::SgdLearning;
use stats::IdMapping;
use types::FactorMatrix;
use utils;

/// Hyperparameters of a factorization model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MfConfig {
    pub num_factors: usize,
    pub num_iter: u32,
    pub learn_rate: f64,
    pub regularization: f64,
    pub init_mean: f64,
    pub init_stddev: f64,
    pub seed: u64,
}

impl Default for MfConfig {
    fn default() -> Self {
        MfConfig {
            num_factors: 10,
            num_iter: 30,
            learn_rate: 0.05,
            regularization: 0.01,
            init_mean: 0.0,
            init_stddev: 0.1,
            seed: 42,
        }
    }
}

impl MfConfig {

    pub fn with_num_factors(mut self, num_factors: usize) -> Self {
        self.num_factors = num_factors;
        self
    }

    pub fn with_num_iter(mut self, num_iter: u32) -> Self {
        self.num_iter = num_iter;
        self
    }

    pub fn with_learn_rate(mut self, learn_rate: f64) -> Self {
        self.learn_rate = learn_rate;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_init_mean(mut self, init_mean: f64) -> Self {
        self.init_mean = init_mean;
        self
    }

    pub fn with_init_stddev(mut self, init_stddev: f64) -> Self {
        self.init_stddev = init_stddev;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// User and item factor matrices of a model. Owned exclusively by the
/// trainer that allocated them, mutated in place during each epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorModel {
    pub user_factors: FactorMatrix,
    pub item_factors: FactorMatrix,
}

impl FactorModel {

    /// Predicted affinity as the dot product of the latent rows. `None` is
    /// the cannot-predict sentinel for indices outside the trained range.
    pub fn predict(&self, user: u32, item: u32) -> Option<f64> {
        if (user as usize) < self.user_factors.num_rows()
            && (item as usize) < self.item_factors.num_rows() {
            Some(FactorMatrix::row_scalar_product(
                &self.user_factors, user as usize,
                &self.item_factors, item as usize,
            ))
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        self.user_factors.is_finite() && self.item_factors.is_finite()
    }
}

/// Per-epoch update rule plugged into the trainer. Implementations must
/// perform one full pass of model updates over the training data (or an
/// equivalent number of sampled updates) per `iterate` call.
pub trait LearningStrategy: Send + Sync {

    fn iterate(
        &self,
        model: &mut FactorModel,
        interactions: &Interactions,
        config: &MfConfig,
        rng: &mut XorShiftRng,
    );

    /// Current value of the training loss, for diagnostics and convergence
    /// tracking. Must not mutate the model.
    fn compute_objective(
        &self,
        model: &FactorModel,
        interactions: &Interactions,
        config: &MfConfig,
    ) -> f64;

    /// Tag under which models of this strategy are persisted.
    fn name(&self) -> &'static str;
}

/// Iterative matrix factorization trainer. Starts out uninitialized,
/// `train` allocates and randomly seeds the factor matrices and runs the
/// configured number of epochs of the chosen learning strategy.
pub struct MatrixFactorization {
    config: MfConfig,
    strategy: Box<dyn LearningStrategy>,
    model: Option<FactorModel>,
    trained: bool,
    stop: Arc<AtomicBool>,
}

#[derive(Serialize)]
struct SavedModelRef<'a> {
    method: &'a str,
    config: &'a MfConfig,
    model: &'a FactorModel,
}

#[derive(Deserialize)]
struct SavedModel {
    method: String,
    config: MfConfig,
    model: FactorModel,
}

fn strategy_for(method: &str) -> Option<Box<dyn LearningStrategy>> {
    match method {
        "bpr" => Some(Box::new(BprLearning)),
        "sgd" => Some(Box::new(SgdLearning)),
        _ => None,
    }
}

impl MatrixFactorization {

    pub fn new(config: MfConfig, strategy: Box<dyn LearningStrategy>) -> Self {
        MatrixFactorization {
            config: config,
            strategy: strategy,
            model: None,
            trained: false,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Trainer with the pairwise ranking update rule.
    pub fn bpr(config: MfConfig) -> Self {
        MatrixFactorization::new(config, Box::new(BprLearning))
    }

    /// Trainer with the pointwise regression update rule.
    pub fn sgd(config: MfConfig) -> Self {
        MatrixFactorization::new(config, Box::new(SgdLearning))
    }

    pub fn config(&self) -> &MfConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn model(&self) -> Option<&FactorModel> {
        self.model.as_ref()
    }

    /// Handle for requesting a cooperative stop. The flag is checked at
    /// epoch boundaries only, a stopped model keeps its valid factors.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Allocate and randomly seed factor matrices sized by the data bounds,
    /// then run the configured number of epochs. Retraining starts from a
    /// fresh initialization with the configured seed.
    pub fn train(&mut self, interactions: &Interactions) -> Result<(), TrainingError> {

        if interactions.is_empty() {
            return Err(TrainingError::EmptyTrainingData);
        }

        let num_users = interactions.max_user_id().unwrap() as usize + 1;
        let num_items = interactions.max_item_id().unwrap() as usize + 1;

        self.trained = false;
        self.model = None;

        let mut rng = utils::rng_from_seed(self.config.seed);

        let mut user_factors = FactorMatrix::new(num_users, self.config.num_factors);
        let mut item_factors = FactorMatrix::new(num_items, self.config.num_factors);

        user_factors.init_normal(&mut rng, self.config.init_mean, self.config.init_stddev);
        item_factors.init_normal(&mut rng, self.config.init_mean, self.config.init_stddev);

        let mut model = FactorModel {
            user_factors: user_factors,
            item_factors: item_factors,
        };

        for epoch in 0..self.config.num_iter {

            if self.stop.load(Ordering::Relaxed) {
                println!("stop requested, ending training after {} of {} epochs",
                    epoch, self.config.num_iter);
                break;
            }

            let epoch_start = Instant::now();

            self.strategy.iterate(&mut model, interactions, &self.config, &mut rng);

            if !model.is_finite() {
                return Err(TrainingError::NumericalInstability { epoch: epoch });
            }

            let duration_for_epoch = utils::to_millis(epoch_start.elapsed());
            println!("epoch {}/{} finished, {}ms training time",
                epoch + 1, self.config.num_iter, duration_for_epoch);
        }

        self.model = Some(model);
        self.trained = true;

        Ok(())
    }

    /// Training loss of the current factors, `None` before initialization.
    pub fn compute_objective(&self, interactions: &Interactions) -> Option<f64> {
        self.model.as_ref()
            .map(|model| self.strategy.compute_objective(model, interactions, &self.config))
    }

    /// Predicted score for a user/item pair of internal indices. `None` is
    /// the cannot-predict sentinel, returned for entities unseen during
    /// training and for untrained models. Use `can_predict` to distinguish
    /// a sentinel from a legitimate low score.
    pub fn predict(&self, user: u32, item: u32) -> Option<f64> {
        if !self.trained {
            return None;
        }

        self.model.as_ref().and_then(|model| model.predict(user, item))
    }

    pub fn can_predict(&self, user: u32, item: u32) -> bool {
        self.trained && self.model.as_ref()
            .map(|model| {
                (user as usize) < model.user_factors.num_rows()
                    && (item as usize) < model.item_factors.num_rows()
            })
            .unwrap_or(false)
    }

    /// Prediction through external identifiers, resolved via the read-only
    /// side of the mappings. Unseen identifiers yield the sentinel.
    pub fn predict_by_name(
        &self,
        users: &IdMapping,
        items: &IdMapping,
        user: &str,
        item: &str,
    ) -> Option<f64> {

        let user_index = users.internal_id(user)?;
        let item_index = items.internal_id(item)?;

        self.predict(user_index, item_index)
    }

    /// Persist the trained model as a single JSON document. Numeric values
    /// round-trip exactly.
    pub fn save_model<W: Write>(&self, target: W) -> Result<(), ModelError> {

        let model = match self.model {
            Some(ref model) if self.trained => model,
            _ => return Err(ModelError::NotTrained),
        };

        let saved = SavedModelRef {
            method: self.strategy.name(),
            config: &self.config,
            model: model,
        };

        serde_json::to_writer(target, &saved)?;

        Ok(())
    }

    /// Reconstruct a trained recommender from a persisted model. The
    /// restored model produces predictions identical to the saved one.
    pub fn load_model<R: Read>(source: R) -> Result<MatrixFactorization, ModelError> {

        let saved: SavedModel = serde_json::from_reader(source)?;

        let strategy = strategy_for(&saved.method)
            .ok_or_else(|| ModelError::UnknownMethod(saved.method.clone()))?;

        Ok(MatrixFactorization {
            config: saved.config,
            strategy: strategy,
            model: Some(saved.model),
            trained: true,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }
}
