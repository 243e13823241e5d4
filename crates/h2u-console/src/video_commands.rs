//! `video_matrix` and `video_mode` command families.

use h2u_core::matrix::ConnectOutcome;
use h2u_types::error::Result;
use h2u_types::video::{Sink, Source};

use crate::interpreter::{Command, CommandOutput, Environment, Tokens, parse_int};

// ---------------------------------------------------------------------------
// video_matrix
// ---------------------------------------------------------------------------

pub(crate) struct VideoMatrixCmd;
impl Command for VideoMatrixCmd {
    fn name(&self) -> &str {
        "video_matrix"
    }
    fn alias(&self) -> Option<&str> {
        Some("x")
    }
    fn category(&self) -> &str {
        "video"
    }
    fn usage(&self) -> &str {
        "video_matrix commands (alias: 'x')\n\
         \x20 video_matrix list              - list available video sinks and sources\n\
         \x20 x l                            - list available video sinks and sources\n\
         \x20 video_matrix connect <source>  - connect video source to video sink\n\
         \x20                      <sink>\n\
         \x20 x c <source> <sink>            - connect video source to video sink"
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.next_token() {
            "list" | "l" => Ok(CommandOutput::Text(env.plane.matrix().list().to_string())),
            "connect" | "c" => self.connect(args, env),
            _ => Ok(CommandOutput::Text(self.usage().into())),
        }
    }
}

impl VideoMatrixCmd {
    fn connect(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut lines = Vec::new();

        let source_token = args.next_token();
        let source = Source::from_token(source_token);
        if source.is_none() {
            lines.push(format!("Unknown video source: '{source_token}'"));
        }
        let sink_token = args.next_token();
        let sink = Sink::from_token(sink_token);
        if sink.is_none() {
            lines.push(format!("Unknown video sink: '{sink_token}'"));
        }

        let (Some(source), Some(sink)) = (source, sink) else {
            lines.push(self.usage().to_string());
            return Ok(CommandOutput::lines(lines));
        };

        match env.plane.connect(source, sink, env.board)? {
            ConnectOutcome::Connected { source, sink } => {
                lines.push(format!("Connecting {source} to {sink}"));
            },
            ConnectOutcome::Missing(cap) => lines.push(format!("{cap} is missing.")),
        }
        Ok(CommandOutput::lines(lines))
    }
}

// ---------------------------------------------------------------------------
// video_mode
// ---------------------------------------------------------------------------

pub(crate) struct VideoModeCmd;
impl Command for VideoModeCmd {
    fn name(&self) -> &str {
        "video_mode"
    }
    fn alias(&self) -> Option<&str> {
        Some("m")
    }
    fn category(&self) -> &str {
        "video"
    }
    fn usage(&self) -> &str {
        "video_mode commands (alias: 'm')\n\
         \x20 video_mode list                - list available video modes\n\
         \x20 m l                            - list available video modes\n\
         \x20 video_mode <mode>              - select video mode"
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.next_token() {
            "list" | "l" => {
                let mut out = String::from("Available video modes:\n");
                for (i, desc) in env.plane.modes().list_modes() {
                    out.push_str(&format!("mode {i}: {desc}\n"));
                }
                Ok(CommandOutput::Text(out))
            },
            token => {
                let index = i64::from(parse_int(token));
                Ok(match env.plane.set_mode(index, env.board)? {
                    Some(desc) => CommandOutput::Text(format!("Setting video mode to {desc}")),
                    None => CommandOutput::None,
                })
            },
        }
    }
}
