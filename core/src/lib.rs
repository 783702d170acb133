pub mod error;
mod forecast;
mod reading;
mod stats;

pub use forecast::*;
pub use reading::*;
pub use stats::*;

pub static CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rounds to two decimal places, the precision of every reported metric
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
