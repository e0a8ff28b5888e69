// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::settings::GridSettings;
}

pub use settings::GridSettings;

mod settings;
