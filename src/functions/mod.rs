//! Pure numeric primitives shared by the optimizer and the sweep.

pub mod cdf;
pub mod encoding;
pub mod fitness;

pub use cdf::{get_cdf_index, CumulativeDistribution};
pub use encoding::{bin_to_int, bin_to_real, int_to_bin, int_to_real, real_to_bin, real_to_int};
pub use fitness::{population_weights, selection_weight, weight_from_value, worst_value};
