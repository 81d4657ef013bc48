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

#[cfg(test)]
mod tests {

    use eval;
    use interactions::Interactions;
    use mf::{MatrixFactorization, MfConfig};
    use recommend;
    use stats::DataDictionary;

    #[test]
    fn programmatic_usage() {

        /* Our input data comprises of observed interactions between users and items.
           The identifiers used can be strings of arbitrary length and structure, an
           optional weight carries ratings for explicit feedback data. */
        let interactions = vec![
            (String::from("alice"), String::from("apple"), 1.0),
            (String::from("alice"), String::from("dog"), 1.0),
            (String::from("alice"), String::from("pony"), 1.0),
            (String::from("bob"), String::from("apple"), 1.0),
            (String::from("bob"), String::from("pony"), 1.0),
            (String::from("charles"), String::from("pony"), 1.0),
            (String::from("charles"), String::from("bike"), 1.0),
        ];

        /* Internally, we use consecutive integer ids assigned in first-seen order.
           The data dictionary maps from string to integer identifiers (and back),
           while the interaction store keeps the resolved observations. */
        let mut data_dict = DataDictionary::new();
        let training = Interactions::from_records(interactions.into_iter(), &mut data_dict);

        println!(
            "Found {} interactions between {} users and {} items.",
            data_dict.num_interactions(),
            data_dict.num_users(),
            data_dict.num_items(),
        );

        /* Now we factorize the interactions into latent user and item vectors with
           a pairwise ranking objective. The seed makes repeated runs identical. */
        let config = MfConfig::default()
            .with_num_factors(4)
            .with_num_iter(20)
            .with_seed(42);

        let mut recommender = MatrixFactorization::bpr(config);
        recommender.train(&training).unwrap();

        /* A trained model scores arbitrary user-item combinations. Unseen
           identifiers yield no score instead of a bogus one. */
        let score = recommender.predict_by_name(
            data_dict.user_ids(), data_dict.item_ids(), "alice", "bike");
        assert!(score.unwrap().is_finite());

        let unseen = recommender.predict_by_name(
            data_dict.user_ids(), data_dict.item_ids(), "mallory", "bike");
        assert_eq!(unseen, None);

        /* We judge the model on held-out data: bob also liked the dog. The
           candidate set is every item we have seen, the items from bob's training
           history are excluded from his ranking. */
        let mut test = Interactions::new();
        let bob = data_dict.user_index("bob").unwrap();
        let dog = data_dict.item_index("dog").unwrap();
        test.push(bob, dog, 1.0);

        let candidate_items: Vec<u32> = data_dict.item_ids().internal_ids().collect();

        let evaluation = eval::evaluate(&recommender, &test, &training, &candidate_items, 2);

        assert_eq!(evaluation.num_users_evaluated, 1);
        for (name, value) in evaluation.metrics.iter() {
            println!("{}={}", name, value);
            assert!(!value.is_nan());
        }

        /* Finally we produce the two best items for each user that were not part
           of the user's history. */
        for user in training.users() {
            let top_items =
                recommend::recommend(&recommender, user, &training, &candidate_items, 2);

            let user_name = data_dict.user_ids().to_external_id(user).unwrap();
            println!("Recommendations for {}:", user_name);

            for scored_item in top_items {
                let item_name = data_dict.item_ids().to_external_id(scored_item.item).unwrap();
                println!("\t{} ({})", item_name, scored_item.score);

                assert!(!training.contains(user, scored_item.item));
            }
        }
    }
}
