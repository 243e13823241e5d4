//! Foundation types for the HDMI2USB console.
//!
//! This crate contains the hardware-agnostic types shared by every other
//! crate in the workspace: the error type, the capability registry, video
//! source/sink identifiers, and the board configuration file format.

pub mod capability;
pub mod config;
pub mod error;
pub mod video;
