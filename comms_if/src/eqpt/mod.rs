//! # Equipment Interface
//!
//! This module defines the structures exchanged with the car's equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod drive;
