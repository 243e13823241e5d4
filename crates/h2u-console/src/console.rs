//! The console service call run once per super-loop iteration.

use h2u_core::ControlPlane;
use h2u_platform::{Board, ConsoleIo};

use crate::commands::register_builtins;
use crate::interpreter::{CommandOutput, CommandRegistry, Environment};
use crate::line_editor::LineEditor;

/// What the super-loop should do after a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    /// Tear everything down and boot again.
    Reboot,
}

pub struct Console {
    registry: CommandRegistry,
    editor: LineEditor,
    prompt: String,
}

impl Console {
    pub fn new(registry: CommandRegistry, prompt: impl Into<String>) -> Self {
        Self {
            registry,
            editor: LineEditor::new(),
            prompt: prompt.into(),
        }
    }

    /// Console with every family the plane's board supports.
    pub fn for_plane(plane: &ControlPlane, prompt: impl Into<String>) -> Self {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry, plane.caps());
        Self::new(registry, prompt)
    }

    /// Print the first prompt.
    pub fn start(&self, io: &mut dyn ConsoleIo) {
        io.write_str(&self.prompt);
    }

    /// Run the status timer, then consume at most one input byte. A
    /// completed line is dispatched to completion and followed by exactly
    /// one prompt (except after a reboot request).
    pub fn service(
        &mut self,
        io: &mut dyn ConsoleIo,
        plane: &mut ControlPlane,
        board: &mut dyn Board,
    ) -> Signal {
        match plane.service_status(board) {
            Ok(Some(report)) => write_text(io, &format!("{report}\n")),
            Ok(None) => {},
            Err(e) => log::warn!("Status report failed: {e}"),
        }

        let Some(byte) = io.read_byte() else {
            return Signal::Continue;
        };
        let Some(line) = self.editor.feed(byte, io) else {
            return Signal::Continue;
        };

        let mut env = Environment { plane, board };
        match self.registry.execute(&line, &mut env) {
            Ok(Some(CommandOutput::Reboot)) => {
                log::info!("Reboot requested");
                return Signal::Reboot;
            },
            Ok(Some(CommandOutput::Text(text))) => write_text(io, &text),
            Ok(Some(CommandOutput::None)) => {},
            Ok(None) => {
                // Unknown line: silence status mode if it is running.
                if env.plane.status().is_enabled() {
                    env.plane.disable_status();
                    write_text(io, "Disabling status");
                }
            },
            Err(e) => {
                log::warn!("Command {line:?} failed: {e}");
                write_text(io, &format!("error: {e}"));
            },
        }
        io.write_str(&self.prompt);
        Signal::Continue
    }
}

/// Write `text` as CRLF-terminated lines.
fn write_text(io: &mut dyn ConsoleIo, text: &str) {
    for line in text.split('\n') {
        io.write_str(line);
        io.write_str("\r\n");
    }
}
