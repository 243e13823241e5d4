//! Hardware collaborator abstractions.
//!
//! The control plane never touches registers directly. Every hardware block
//! is reached through one of the narrow service traits in [`services`], and
//! the [`Board`] aggregate bundles them for a concrete board. The
//! [`SimulatedBoard`] implementation backs the desktop binary and the tests.

mod console;
pub mod services;
mod simulated;

pub use console::{BufferedConsole, ConsoleIo};
pub use services::*;
pub use simulated::{BoardEvent, SimulatedBoard};
