// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{BipolarNormal, FrequencyHz, Labels, Sample, SampleRate, Seconds};
}

pub use {
    labels::{LabelError, Labels},
    numbers::{FrequencyHz, Sample, SampleType},
    ranges::{BipolarNormal, RangedF64},
    time::{SampleRate, Seconds},
};

mod labels;
mod numbers;
mod ranges;
mod time;
