// Copyright (c) 2024 Mike Tsao

//! Turns partial specifications into audio.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{render_partials_in_parallel, PartialGenerator};
}

pub use partial_generator::{render_partials_in_parallel, PartialGenerator};

mod partial_generator;
