pub mod maths_utils;

pub use maths_utils::{RangeF64, get_min_max, percentile, z_score};
