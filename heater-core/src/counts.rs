pub mod assemble;
pub mod normalization;
pub mod reader;
pub mod reorder;
pub mod sample;
pub mod totals;
pub mod transform;

pub use self::{
    assemble::{CountMatrix, assemble},
    sample::{LengthKey, Sample},
    totals::SampleTotals,
};
