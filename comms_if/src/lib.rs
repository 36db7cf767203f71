//! # Communications interface crate.
//!
//! Provides the interface types shared between the lane following modules,
//! the actuation layer, and anything consuming telemetry or issuing remote
//! commands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Remote commands (drive mode, speed, manual steering, sign detections)
pub mod tc;

/// Telemetry published by the car
pub mod tm;

/// Demand and data definitions for equipment (camera, drive train)
pub mod eqpt;
