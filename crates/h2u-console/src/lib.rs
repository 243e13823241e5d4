//! Command interpreter for the serial console.
//!
//! Bytes are edited into lines by the [`LineEditor`], split by [`Tokens`],
//! and dispatched through a [`CommandRegistry`] that maps each family's
//! name and single-letter alias to a `Command`. The [`Console`] ties these
//! together with the status timer into one service call per super-loop
//! iteration.

mod commands;
mod console;
mod debug_commands;
mod interpreter;
mod line_editor;
mod output_commands;
mod video_commands;

/// Register every command family the board supports.
pub use commands::register_builtins;
/// Console service loop and its result signal.
pub use console::{Console, Signal};
/// Command trait, output, registry, environment and token helpers.
pub use interpreter::{Command, CommandOutput, CommandRegistry, Environment, Tokens, parse_int};
/// Destructive-backspace line buffer.
pub use line_editor::{LINE_CAPACITY, LineEditor};
