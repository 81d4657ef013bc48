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

extern crate getopts;
extern crate latentreco;
extern crate num_cpus;

use std::env;
use std::error::Error;
use std::fs::File;

use getopts::Options;

use latentreco::eval;
use latentreco::interactions::Interactions;
use latentreco::io;
use latentreco::mf::{MatrixFactorization, MfConfig};
use latentreco::recommend;
use latentreco::stats::DataDictionary;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("t", "training-file", "Training file name (required). The input consists of \
        interactions between users and items. The input file must contain a user and item pair \
        per line, separated by a tab, with an optional third column holding an interaction \
        weight.", "PATH");
    opts.optopt("e", "test-file", "Test file name (required). Same format as the training \
        file, the held-out interactions are used to measure the ranking quality of the trained \
        model.", "PATH");
    opts.optopt("m", "method", "Learning method to use, 'bpr' for pairwise ranking or 'sgd' \
        for pointwise regression (optional, defaults to bpr).", "NAME");
    opts.optopt("f", "num-factors", "Number of latent factors per user and item (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("n", "num-iter", "Number of epochs over the training data (optional, defaults \
        to 30).", "NUMBER");
    opts.optopt("l", "learn-rate", "Learning rate (optional, defaults to 0.05).", "NUMBER");
    opts.optopt("r", "regularization", "Regularization strength (optional, defaults to \
        0.01).", "NUMBER");
    opts.optopt("s", "seed", "Seed for the random number generation (optional, defaults to \
        42).", "NUMBER");
    opts.optopt("o", "save-model", "File to persist the trained model to (optional).", "PATH");
    opts.optopt("R", "recommendations", "File to write the top-10 recommendations per user to \
        (optional).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    if !matches.opt_present("t") || !matches.opt_present("e") {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a training file via --training-file and a test file via \
                --test-file."),
        );
    }

    let training_path = matches.opt_str("t").unwrap();
    let test_path = matches.opt_str("e").unwrap();
    let model_path = matches.opt_str("o");
    let recommendations_path = matches.opt_str("R");

    let method = matches.opt_str("m").unwrap_or("bpr".to_string());
    if method != "bpr" && method != "sgd" {
        let hint = format!("Unknown method '{}', expected 'bpr' or 'sgd'.", method);
        return print_usage_and_exit(&program, opts, Some(&hint));
    }

    let mut config = MfConfig::default();

    config.num_factors = match matches.opt_get_default("f", config.num_factors) {
        Ok(num_factors) => num_factors,
        Err(failure) => {
            let hint = format!("Problem with option 'f': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };
    config.num_iter = match matches.opt_get_default("n", config.num_iter) {
        Ok(num_iter) => num_iter,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };
    config.learn_rate = match matches.opt_get_default("l", config.learn_rate) {
        Ok(learn_rate) => learn_rate,
        Err(failure) => {
            let hint = format!("Problem with option 'l': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };
    config.regularization = match matches.opt_get_default("r", config.regularization) {
        Ok(regularization) => regularization,
        Err(failure) => {
            let hint = format!("Problem with option 'r': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };
    config.seed = match matches.opt_get_default("s", config.seed) {
        Ok(seed) => seed,
        Err(failure) => {
            let hint = format!("Problem with option 's': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    predict_items(
        &training_path,
        &test_path,
        &method,
        config,
        model_path,
        recommendations_path,
    ).unwrap();
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
}

fn predict_items(
    training_path: &str,
    test_path: &str,
    method: &str,
    config: MfConfig,
    model_path: Option<String>,
    recommendations_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    println!("Reading {} as training data (pass 1/2)", training_path);

    let mut data_dict = DataDictionary::new();

    let mut training_reader = io::csv_reader(training_path)?;
    let training = Interactions::from_records(
        io::interactions_from_csv(&mut training_reader),
        &mut data_dict,
    );

    println!(
        "Found {} interactions between {} users and {} items.",
        training.len(),
        data_dict.num_users(),
        data_dict.num_items(),
    );

    println!("Reading {} as test data (pass 2/2)", test_path);

    let mut test_reader = io::csv_reader(test_path)?;
    let test = Interactions::from_records(
        io::interactions_from_csv(&mut test_reader),
        &mut data_dict,
    );

    println!("Training a {} model with {} factors for {} epochs",
        method, config.num_factors, config.num_iter);

    let mut recommender = match method {
        "sgd" => MatrixFactorization::sgd(config),
        _ => MatrixFactorization::bpr(config),
    };

    recommender.train(&training)?;

    if let Some(objective) = recommender.compute_objective(&training) {
        println!("objective={}", objective);
    }

    // every item we have seen is a ranking candidate
    let candidate_items: Vec<u32> = data_dict.item_ids().internal_ids().collect();

    let evaluation = eval::evaluate(
        &recommender,
        &test,
        &training,
        &candidate_items,
        num_cpus::get(),
    );

    println!("Evaluated on {} users", evaluation.num_users_evaluated);

    let mut metrics: Vec<(&String, &f64)> = evaluation.metrics.iter().collect();
    metrics.sort_by_key(|&(name, _)| name.clone());

    for (name, value) in metrics {
        println!("{}={}", name, value);
    }

    if let Some(path) = model_path {
        println!("Saving model to {}", path);
        let model_file = File::create(&path)?;
        recommender.save_model(model_file)?;
    }

    if let Some(path) = recommendations_path {
        println!("Writing recommendations to {}", path);

        let recommendations: Vec<_> = training.users()
            .map(|user| {
                let top_items =
                    recommend::recommend(&recommender, user, &training, &candidate_items, 10);
                (user, top_items)
            })
            .collect();

        io::write_recommendations(
            &recommendations,
            data_dict.user_ids(),
            data_dict.item_ids(),
            Some(path),
        )?;
    }

    Ok(())
}
