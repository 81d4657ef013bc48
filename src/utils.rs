extern crate rand;

use std::time::Duration;

use rand::{SeedableRng, XorShiftRng};

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

/// Generator for factor initialization and sampling, constructed from an
/// explicit seed so that repeated runs are reproducible. The third word is
/// forced odd, the seed words must not all be zero.
pub fn rng_from_seed(seed: u64) -> XorShiftRng {
    let lo = seed as u32;
    let hi = (seed >> 32) as u32;

    XorShiftRng::from_seed([
        lo ^ 0x9E37_79B9,
        hi ^ 0x85EB_CA6B,
        lo.wrapping_mul(0x6C07_8965) | 1,
        hi ^ 0xC2B2_AE35,
    ])
}
