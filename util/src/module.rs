//! Cyclic module interface
//!
//! Every module run once per control cycle by `lane_exec` (lane control,
//! drive control) implements [`State`], so the executable can initialise and
//! step them uniformly.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// Internal state of a cyclic module.
pub trait State {
    /// Data needed to initialise the module, usually a parameter file name.
    type InitData;
    /// Error raised while initialising.
    type InitError;

    /// Data consumed by one processing cycle.
    type InputData;
    /// Data produced by one processing cycle.
    type OutputData;
    /// Diagnostics produced alongside the output.
    type StatusReport;
    /// Error raised while processing.
    type ProcError;

    /// Initialise the module, resetting any state carried between cycles.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one processing cycle.
    ///
    /// Returns the output data and a status report describing how it was
    /// obtained.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
