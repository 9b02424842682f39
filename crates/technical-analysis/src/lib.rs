pub mod analyzer;
pub mod chart;
pub mod decision;
pub mod indicators;
pub mod options;
pub mod target;

#[cfg(test)]
mod indicators_tests;

pub use analyzer::*;
pub use chart::*;
pub use decision::*;
pub use indicators::*;
pub use options::*;
pub use target::*;
