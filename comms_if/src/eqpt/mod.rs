//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the mechanism
//! controllers.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod mech;
