//! Video-routing control plane.
//!
//! All mutable state of the appliance (routing assignments, active mode,
//! encoder settings, status mode, debug flags) lives in one [`ControlPlane`]
//! constructed at startup. Hardware is reached only through the
//! `h2u-platform` service traits, and every operation consults the
//! capability registry before touching an optional block.

pub mod cas;
pub mod debug;
pub mod encoder;
pub mod hdp;
pub mod matrix;
pub mod mode;
mod plane;
pub mod status;

pub use plane::ControlPlane;
