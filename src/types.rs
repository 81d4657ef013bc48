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
extern crate rand;

use fnv::FnvHashSet;
use rand::Rng;
use rand::distributions::{IndependentSample, Normal};

pub type SparseBinaryMatrix = Vec<FnvHashSet<u32>>;

pub fn new_sparse_binary_matrix(num_rows: usize) -> SparseBinaryMatrix {
    vec![FnvHashSet::with_capacity_and_hasher(0, Default::default()); num_rows]
}

/// Dense row-major matrix of latent factors. Row `i` holds the latent vector
/// of the entity with internal index `i`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorMatrix {
    num_rows: usize,
    num_cols: usize,
    data: Vec<f64>,
}

impl FactorMatrix {

    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        FactorMatrix {
            num_rows: num_rows,
            num_cols: num_cols,
            data: vec![0.0; num_rows * num_cols],
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let offset = index * self.num_cols;
        &self.data[offset..offset + self.num_cols]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        let offset = index * self.num_cols;
        &mut self.data[offset..offset + self.num_cols]
    }

    /// Overwrite every entry with an independent draw from a normal
    /// distribution with the given mean and standard deviation.
    pub fn init_normal<R: Rng>(&mut self, rng: &mut R, mean: f64, std_dev: f64) {
        let normal = Normal::new(mean, std_dev);
        for value in self.data.iter_mut() {
            *value = normal.ind_sample(rng);
        }
    }

    /// Dot product between row `row_a` of `a` and row `row_b` of `b`.
    pub fn row_scalar_product(
        a: &FactorMatrix,
        row_a: usize,
        b: &FactorMatrix,
        row_b: usize,
    ) -> f64 {
        a.row(row_a).iter()
            .zip(b.row(row_b).iter())
            .map(|(x, y)| x * y)
            .sum()
    }

    pub fn squared_frobenius_norm(&self) -> f64 {
        self.data.iter().map(|value| value * value).sum()
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {

    use super::FactorMatrix;
    use utils;

    #[test]
    fn rows_are_distinct_slices() {
        let mut matrix = FactorMatrix::new(3, 2);
        matrix.row_mut(0).copy_from_slice(&[1.0, 2.0]);
        matrix.row_mut(2).copy_from_slice(&[5.0, 6.0]);

        assert_eq!(matrix.row(0), &[1.0, 2.0]);
        assert_eq!(matrix.row(1), &[0.0, 0.0]);
        assert_eq!(matrix.row(2), &[5.0, 6.0]);
    }

    #[test]
    fn row_scalar_product() {
        let mut a = FactorMatrix::new(2, 3);
        let mut b = FactorMatrix::new(2, 3);
        a.row_mut(1).copy_from_slice(&[1.0, 2.0, 3.0]);
        b.row_mut(0).copy_from_slice(&[4.0, 5.0, 6.0]);

        let product = FactorMatrix::row_scalar_product(&a, 1, &b, 0);
        assert!((product - 32.0).abs() < 1e-12);
    }

    #[test]
    fn normal_initialization_is_reproducible() {
        let mut first = FactorMatrix::new(4, 5);
        let mut second = FactorMatrix::new(4, 5);

        first.init_normal(&mut utils::rng_from_seed(42), 0.0, 0.1);
        second.init_normal(&mut utils::rng_from_seed(42), 0.0, 0.1);

        assert_eq!(first, second);
        assert!(first.is_finite());
    }

    #[test]
    fn detects_non_finite_entries() {
        let mut matrix = FactorMatrix::new(2, 2);
        assert!(matrix.is_finite());

        matrix.row_mut(1)[0] = ::std::f64::NAN;
        assert!(!matrix.is_finite());
    }
}
