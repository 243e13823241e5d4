//! Top-level command families: version, reboot, status, heartbeat, hdp_toggle.

use h2u_core::hdp::HdpOutcome;
use h2u_types::capability::{Capability, CapabilitySet};
use h2u_types::error::Result;
use h2u_types::video::OutputChannel;

use crate::debug_commands::DebugCmd;
use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, Tokens, parse_int};
use crate::output_commands::{EncoderCmd, OutputCmd};
use crate::video_commands::{VideoMatrixCmd, VideoModeCmd};

/// Register every command family, skipping those whose hardware is absent.
///
/// Registration order is the order of the `help` listing.
pub fn register_builtins(reg: &mut CommandRegistry, caps: &CapabilitySet) {
    reg.register(Box::new(VersionCmd));
    reg.register(Box::new(RebootCmd));
    reg.register(Box::new(StatusCmd));
    reg.register(Box::new(VideoMatrixCmd));
    reg.register(Box::new(VideoModeCmd));
    reg.register(Box::new(HeartbeatCmd));
    reg.register(Box::new(HdpToggleCmd));
    for output in OutputChannel::ALL {
        if caps.contains(output.capability()) {
            reg.register(Box::new(OutputCmd::new(output)));
        }
    }
    if caps.contains(Capability::Encoder) {
        reg.register(Box::new(EncoderCmd));
    }
    reg.register(Box::new(DebugCmd::new(caps)));
}

// ---------------------------------------------------------------------------
// version
// ---------------------------------------------------------------------------

struct VersionCmd;
impl Command for VersionCmd {
    fn name(&self) -> &str {
        "version"
    }
    fn usage(&self) -> &str {
        "version                          - firmware/gateware version"
    }
    fn execute(&self, _args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.board.version_info()?))
    }
}

// ---------------------------------------------------------------------------
// reboot
// ---------------------------------------------------------------------------

struct RebootCmd;
impl Command for RebootCmd {
    fn name(&self) -> &str {
        "reboot"
    }
    fn usage(&self) -> &str {
        "reboot                           - reboot CPU"
    }
    fn execute(&self, _args: &mut Tokens<'_>, _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Reboot)
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

struct StatusCmd;
impl Command for StatusCmd {
    fn name(&self) -> &str {
        "status"
    }
    fn alias(&self) -> Option<&str> {
        Some("s")
    }
    fn category(&self) -> &str {
        "status"
    }
    fn help_topic(&self) -> bool {
        false
    }
    fn usage(&self) -> &str {
        "status commands (alias: 's')\n\
         \x20 status                         - print status message once\n\
         \x20 status <on/off>                - repeatedly print status message"
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.next_token() {
            "on" => {
                env.plane.enable_status(env.board)?;
                Ok(CommandOutput::Text("Enabling status".into()))
            },
            "off" => {
                env.plane.disable_status();
                Ok(CommandOutput::Text("Disabling status".into()))
            },
            _ => {
                let report = env.plane.status_report(env.board)?;
                Ok(CommandOutput::Text(report.to_string()))
            },
        }
    }
}

// ---------------------------------------------------------------------------
// heartbeat
// ---------------------------------------------------------------------------

struct HeartbeatCmd;
impl Command for HeartbeatCmd {
    fn name(&self) -> &str {
        "heartbeat"
    }
    fn alias(&self) -> Option<&str> {
        Some("h")
    }
    fn category(&self) -> &str {
        "system"
    }
    fn usage(&self) -> &str {
        "change heartbeat status (alias: 'h')\n\
         \x20 heartbeat <on/off>             - Turn on/off heartbeat feature"
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let enabled = match args.next_token() {
            "on" => true,
            "off" => false,
            _ => return Ok(CommandOutput::Text(self.usage().into())),
        };
        env.board.set_heartbeat(enabled)?;
        log::info!("Heartbeat {}", if enabled { "on" } else { "off" });
        let msg = if enabled { "Heartbeat enabled" } else { "Heartbeat disabled" };
        Ok(CommandOutput::Text(msg.into()))
    }
}

// ---------------------------------------------------------------------------
// hdp_toggle
// ---------------------------------------------------------------------------

struct HdpToggleCmd;
impl Command for HdpToggleCmd {
    fn name(&self) -> &str {
        "hdp_toggle"
    }
    fn category(&self) -> &str {
        "video"
    }
    fn usage(&self) -> &str {
        "hdp_toggle <source>              - toggle HDP on source for EDID rescan"
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let index = i64::from(parse_int(args.next_token()));
        Ok(match env.plane.hdp_toggle(index, env.board)? {
            HdpOutcome::Toggled(input) => {
                CommandOutput::Text(format!("Toggling HDP on input{}", input.index()))
            },
            HdpOutcome::Missing(cap) => CommandOutput::Text(format!("{cap} is missing.")),
            HdpOutcome::NotAnInput => CommandOutput::None,
        })
    }
}
