// Copyright (c) 2024 Mike Tsao

//! Cuts continuous partial envelopes into a grid of paxels.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{EnvelopeMapper, MappingError};
}

pub use mapper::{EnvelopeMapper, MappingError};

mod arena;
mod mapper;
