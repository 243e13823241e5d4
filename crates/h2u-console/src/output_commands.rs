//! Display output and encoder command families. Registered only when the
//! block is present.

use h2u_types::error::Result;
use h2u_types::video::OutputChannel;

use crate::interpreter::{Command, CommandOutput, Environment, Tokens, parse_int};

// ---------------------------------------------------------------------------
// output0 / output1
// ---------------------------------------------------------------------------

pub(crate) struct OutputCmd {
    channel: OutputChannel,
    alias: String,
    usage: String,
}

impl OutputCmd {
    pub(crate) fn new(channel: OutputChannel) -> Self {
        let name = channel.name();
        let alias = channel.index().to_string();
        let usage = format!(
            "{name} commands (alias: '{alias}')\n  \
             {name} on                     - enable {name}\n  \
             {name} off                    - disable {name}"
        );
        Self {
            channel,
            alias,
            usage,
        }
    }
}

impl Command for OutputCmd {
    fn name(&self) -> &str {
        self.channel.name()
    }
    fn alias(&self) -> Option<&str> {
        Some(&self.alias)
    }
    fn category(&self) -> &str {
        "output"
    }
    fn usage(&self) -> &str {
        &self.usage
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let enabled = match args.next_token() {
            "on" => true,
            "off" => false,
            _ => return Ok(CommandOutput::Text(self.usage.clone())),
        };
        let verb = if enabled { "Enabling" } else { "Disabling" };
        env.plane.set_output_enabled(self.channel, enabled, env.board)?;
        Ok(CommandOutput::Text(format!("{verb} {}", self.channel.name())))
    }
}

// ---------------------------------------------------------------------------
// encoder
// ---------------------------------------------------------------------------

pub(crate) struct EncoderCmd;
impl Command for EncoderCmd {
    fn name(&self) -> &str {
        "encoder"
    }
    fn alias(&self) -> Option<&str> {
        Some("e")
    }
    fn category(&self) -> &str {
        "output"
    }
    fn usage(&self) -> &str {
        "encoder commands (alias: 'e')\n\
         \x20 encoder on                     - enable encoder\n\
         \x20 encoder off                    - disable encoder\n\
         \x20 encoder quality <quality>      - select quality\n\
         \x20 encoder fps <fps>              - configure target fps"
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let msg = match args.next_token() {
            "on" => {
                env.plane.enable_encoder(env.board)?;
                "Enabling encoder".to_string()
            },
            "off" => {
                env.plane.disable_encoder(env.board)?;
                "Disabling encoder".to_string()
            },
            "quality" => {
                let quality = parse_int(args.next_token());
                env.plane.set_encoder_quality(quality, env.board)?;
                format!("Setting encoder quality to {quality}")
            },
            "fps" => {
                let fps = parse_int(args.next_token());
                env.plane.set_encoder_fps(fps, env.board)?;
                format!("Setting encoder fps to {fps}")
            },
            _ => self.usage().to_string(),
        };
        Ok(CommandOutput::Text(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h2u_core::ControlPlane;
    use h2u_platform::{BoardEvent, SimulatedBoard};
    use h2u_types::config::BoardConfig;

    fn setup() -> (ControlPlane, SimulatedBoard) {
        let config = BoardConfig::default();
        let mut board = SimulatedBoard::with_manual_clock(&config);
        let plane = ControlPlane::new(&config, &mut board).unwrap();
        (plane, board)
    }

    fn run(cmd: &dyn Command, plane: &mut ControlPlane, board: &mut SimulatedBoard, line: &str) -> String {
        let mut env = Environment { plane, board };
        match cmd.execute(&mut Tokens::new(line), &mut env).unwrap() {
            CommandOutput::Text(t) => t,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn output_names_and_aliases() {
        let cmd = OutputCmd::new(OutputChannel::Out1);
        assert_eq!(cmd.name(), "output1");
        assert_eq!(cmd.alias(), Some("1"));
        assert!(cmd.usage().starts_with("output1 commands (alias: '1')\n  output1 on "));
        assert!(cmd.usage().ends_with("- disable output1"));
    }

    #[test]
    fn output_on_off() {
        let (mut plane, mut board) = setup();
        let cmd = OutputCmd::new(OutputChannel::Out0);
        assert_eq!(run(&cmd, &mut plane, &mut board, "off"), "Disabling output0");
        assert_eq!(
            board.events().last(),
            Some(&BoardEvent::OutputEnable {
                output: OutputChannel::Out0,
                enabled: false
            })
        );
        let report = plane.status_report(&mut board).unwrap();
        assert!(report.to_string().contains("output0: off"));
        assert_eq!(run(&cmd, &mut plane, &mut board, "on"), "Enabling output0");
        assert!(run(&cmd, &mut plane, &mut board, "").starts_with("output0 commands"));
    }

    #[test]
    fn encoder_lifecycle() {
        let (mut plane, mut board) = setup();
        assert_eq!(run(&EncoderCmd, &mut plane, &mut board, "on"), "Enabling encoder");
        assert!(board.encoder_enabled());
        assert_eq!(
            run(&EncoderCmd, &mut plane, &mut board, "quality 70"),
            "Setting encoder quality to 70"
        );
        assert_eq!(run(&EncoderCmd, &mut plane, &mut board, "fps 15"), "Setting encoder fps to 15");
        assert_eq!(board.encoder_quality(), 70);
        assert_eq!(board.encoder_fps(), 15);
        assert_eq!(plane.encoder().state().fps, 15);
        assert_eq!(run(&EncoderCmd, &mut plane, &mut board, "off"), "Disabling encoder");
        assert!(!board.encoder_enabled());
    }

    #[test]
    fn encoder_quality_is_lenient() {
        let (mut plane, mut board) = setup();
        assert_eq!(
            run(&EncoderCmd, &mut plane, &mut board, "quality high"),
            "Setting encoder quality to 0"
        );
        assert!(run(&EncoderCmd, &mut plane, &mut board, "bogus").starts_with("encoder commands"));
    }
}
