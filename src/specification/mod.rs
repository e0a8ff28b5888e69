// Copyright (c) 2024 Mike Tsao

//! The frozen descriptions of partials and the paxels they're made of.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{PartialSpecification, PaxelSpecification, PaxelSpecificationBuilder};
}

pub use {
    partial::PartialSpecification,
    paxel::{PaxelSpecification, PaxelSpecificationBuilder, PaxelSpecificationBuilderError},
};

mod partial;
mod paxel;
