extern crate rand;

use rand::XorShiftRng;

use interactions::Interactions;
use mf::{FactorModel, LearningStrategy, MfConfig};
use types::FactorMatrix;

/// Pointwise updates: one gradient descent step against the squared error
/// between prediction and observed weight per interaction, with L2
/// regularization, in insertion order.
pub struct SgdLearning;

impl LearningStrategy for SgdLearning {

    fn iterate(
        &self,
        model: &mut FactorModel,
        interactions: &Interactions,
        config: &MfConfig,
        _rng: &mut XorShiftRng,
    ) {

        let learn_rate = config.learn_rate;
        let regularization = config.regularization;

        for interaction in interactions.iter() {
            let user = interaction.user as usize;
            let item = interaction.item as usize;

            let prediction = FactorMatrix::row_scalar_product(
                &model.user_factors, user, &model.item_factors, item);
            let error = interaction.weight - prediction;

            for factor in 0..config.num_factors {
                let user_factor = model.user_factors.row(user)[factor];
                let item_factor = model.item_factors.row(item)[factor];

                model.user_factors.row_mut(user)[factor] +=
                    learn_rate * (error * item_factor - regularization * user_factor);
                model.item_factors.row_mut(item)[factor] +=
                    learn_rate * (error * user_factor - regularization * item_factor);
            }
        }
    }

    /// Exact regularized sum of squared errors over all observed
    /// interactions.
    fn compute_objective(
        &self,
        model: &FactorModel,
        interactions: &Interactions,
        config: &MfConfig,
    ) -> f64 {

        // interactions with entities outside the trained range carry no loss
        let squared_error: f64 = interactions.iter()
            .filter_map(|interaction| {
                let prediction = model.predict(interaction.user, interaction.item)?;
                let error = interaction.weight - prediction;

                Some(error * error)
            })
            .sum();

        let regularization_term = 0.5 * config.regularization
            * (model.user_factors.squared_frobenius_norm()
                + model.item_factors.squared_frobenius_norm());

        squared_error + regularization_term
    }

    fn name(&self) -> &'static str {
        "sgd"
    }
}

#[cfg(test)]
mod tests {

    use interactions::Interactions;
    use mf::{MatrixFactorization, MfConfig};

    fn rating_data() -> Interactions {
        let mut interactions = Interactions::new();
        interactions.push(0, 0, 4.0);
        interactions.push(0, 1, 1.0);
        interactions.push(1, 0, 5.0);
        interactions.push(1, 2, 2.0);
        interactions.push(2, 1, 3.0);

        interactions
    }

    #[test]
    fn training_reduces_the_objective() {
        let interactions = rating_data();

        let config = MfConfig::default()
            .with_num_factors(4)
            .with_learn_rate(0.01);

        let mut untrained = MatrixFactorization::sgd(config.clone().with_num_iter(0));
        untrained.train(&interactions).unwrap();
        let objective_at_init = untrained.compute_objective(&interactions).unwrap();

        let mut trained = MatrixFactorization::sgd(config.with_num_iter(50));
        trained.train(&interactions).unwrap();
        let objective_after_training = trained.compute_objective(&interactions).unwrap();

        assert!(objective_after_training < objective_at_init);
    }

    #[test]
    fn fits_a_single_observation() {
        let mut interactions = Interactions::new();
        interactions.push(0, 0, 5.0);

        let config = MfConfig::default()
            .with_num_factors(4)
            .with_num_iter(200)
            .with_learn_rate(0.05)
            .with_regularization(0.0);

        let mut recommender = MatrixFactorization::sgd(config);
        recommender.train(&interactions).unwrap();

        let prediction = recommender.predict(0, 0).unwrap();
        assert!((prediction - 5.0).abs() < 0.1);
    }

    #[test]
    fn weights_drive_the_ranking() {
        let interactions = rating_data();

        let config = MfConfig::default()
            .with_num_factors(4)
            .with_num_iter(300)
            .with_learn_rate(0.02)
            .with_regularization(0.001);

        let mut recommender = MatrixFactorization::sgd(config);
        recommender.train(&interactions).unwrap();

        // user 0 rated item 0 with 4.0 and item 1 with 1.0
        let liked = recommender.predict(0, 0).unwrap();
        let disliked = recommender.predict(0, 1).unwrap();
        assert!(liked > disliked);
    }
}
