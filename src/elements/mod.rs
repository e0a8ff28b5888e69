// Copyright (c) 2024 Mike Tsao

//! Building blocks for partials: the stock envelopes that describe them, the
//! stock oscillator that renders their paxels, and the phase math both share.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        BreakpointEnvelope, BreakpointEnvelopeBuilder, PartialEnvelopes, PartialEnvelopesBuilder,
        PaxelOscillator, PhaseTarget,
    };
}

pub use {
    envelopes::{
        BreakpointEnvelope, BreakpointEnvelopeBuilder, BreakpointEnvelopeBuilderError,
        EnvelopePoint, PartialEnvelopes, PartialEnvelopesBuilder, PartialEnvelopesBuilderError,
        PhaseTarget,
    },
    generators::PaxelOscillator,
};

mod envelopes;
mod generators;
pub mod phase;
