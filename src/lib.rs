// Copyright (c) 2024 Mike Tsao

#![warn(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Paxel renders the partials of additive synthesis: single sinusoids whose
//! frequency and amplitude change over time.
//!
//! A partial is cut into short segments called *paxels*. Each paxel ramps its
//! frequency and amplitude linearly, and hands its phase off to the next one
//! exactly, so the joins are inaudible.
//!
//! There are two ways in.
//!
//! * *From envelopes*: describe the partial continuously with anything that
//! implements [ShapesPartial](traits::ShapesPartial), such as
//! [PartialEnvelopes](elements::PartialEnvelopes), and let
//! [PartialGenerator::new_from_envelopes()] cut it onto a grid described by
//! [GridSettings](util::GridSettings).
//! * *From paxels*: build each
//! [PaxelSpecification](specification::PaxelSpecification) yourself, collect
//! them into a [PartialSpecification](specification::PartialSpecification),
//! and hand it to [PartialGenerator::new_with()].
//!
//! Either way, [PartialGenerator::render_audio()] produces the samples.

/// A collection of imports that are useful to users of this crate. `use
/// paxel::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        elements::prelude::*, mapping::prelude::*, orchestration::prelude::*,
        specification::prelude::*, traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    mapping::EnvelopeMapper,
    orchestration::{render_partials_in_parallel, PartialGenerator},
    specification::PartialSpecification,
};

pub mod elements;
pub mod mapping;
pub mod orchestration;
pub mod specification;
pub mod traits;
pub mod types;
pub mod util;
