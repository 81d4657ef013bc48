//! Latent factor recommendations: learns numeric representations of users
//! and items from sparse observed interactions and uses them to rank or
//! score items for a user. Input identifiers are mapped to consecutive
//! integer ids, models are trained with epoch-based stochastic updates and
//! judged with ranking metrics on held-out data.

extern crate csv;
extern crate fnv;
extern crate rand;
extern crate scoped_pool;
extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

pub mod bpr;
pub mod error;
pub mod eval;
pub mod interactions;
pub mod io;
pub mod mf;
pub mod recommend;
pub mod sgd;
pub mod stats;
pub mod types;
pub mod utils;

#[cfg(test)]
mod usage_tests;
