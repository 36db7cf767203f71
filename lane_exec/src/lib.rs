//! # Lane following library.
//!
//! This library allows the `lane_exec` executable, benchmarks and other crates
//! in the workspace to access items defined inside the lane following crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - the state shared between modules in the control loop
pub mod data_store;

/// Drive control module - converts steering decisions and speed settings into drive demands
pub mod drive_ctrl;

/// Frame sources - provide camera frames to the control loop
pub mod frame_source;

/// Lane control module - decides how to steer from a camera frame
pub mod lane_ctrl;

/// Single slot latest-wins hand-off between threads
pub mod latest_slot;

/// Mechanisms - drives the steering servo and motors
pub mod mech;

/// Annotated frame rendering
pub mod overlay;

/// Parameters of the executable
pub mod params;

/// Sign policy - reacts to traffic signs reported by an external detector
pub mod sign_policy;

/// Remote command processor - applies remote commands to the data store
pub mod tc_processor;

/// Image processing primitives used by lane control
pub mod vision;

#[cfg(test)]
pub(crate) mod test_utils;
