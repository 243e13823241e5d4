//! `debug` command family: diagnostics, input debug flags, EEPROMs, FX2 and
//! the control-and-status block.

use h2u_core::cas;
use h2u_core::debug::{ChannelMask, DebugRequest};
use h2u_platform::{Eeprom, Fx2Firmware};
use h2u_types::capability::{Capability, CapabilitySet};
use h2u_types::error::Result;
use h2u_types::video::{InputChannel, OutputChannel};

use crate::interpreter::{Command, CommandOutput, Environment, Tokens, parse_int};

pub(crate) struct DebugCmd {
    usage: String,
}

impl DebugCmd {
    /// The help block lists only the sub-commands the board supports.
    pub(crate) fn new(caps: &CapabilitySet) -> Self {
        let mut lines = vec![
            "debug commands (alias 'd')",
            "  debug pll                      - dump pll configuration",
            "  debug ddr                      - show DDR bandwidth",
            "  debug dna                      - show Board's DNA",
            "  debug edid                     - dump monitor EDID",
            "  debug freq                     - get input frequencies",
        ];
        if caps.contains_any(&[Capability::HdmiIn0, Capability::HdmiIn1]) {
            lines.push("  debug input <on/off/?>         - capture debug on all inputs");
        }
        if caps.contains(Capability::HdmiIn0) {
            lines.push("  debug input0 <on/off/?>        - capture debug on input0");
        }
        if caps.contains(Capability::HdmiIn1) {
            lines.push("  debug input1 <on/off/?>        - capture debug on input1");
        }
        if caps.contains(Capability::OpsisEeprom) {
            lines.push("  debug opsis_eeprom             - dump Opsis Info EEPROM");
        }
        if caps.contains(Capability::TofeEeprom) {
            lines.push("  debug tofe_eeprom              - dump TOFE Board Info EEPROM");
        }
        if caps.contains(Capability::Fx2) {
            lines.push("  debug fx2_reboot firmware      - reboot the FX2 USB IC into firmware");
        }
        if caps.contains(Capability::Cas) {
            lines.push("  debug cas leds <value>         - change the status LEDs");
            lines.push("  debug cas switches             - read the control switches status");
            lines.push("  debug cas buttons read         - read the control buttons status");
            lines.push("  debug cas buttons clear        - clear any asserted buttons status");
        }
        Self {
            usage: lines.join("\n"),
        }
    }

    fn help(&self) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(self.usage.clone()))
    }

    fn inputs(
        &self,
        mask: ChannelMask,
        request: DebugRequest,
        env: &mut Environment<'_>,
    ) -> Result<CommandOutput> {
        let flags = env.plane.debug_inputs(mask, request, env.board)?;
        Ok(CommandOutput::lines(flags.into_iter().map(|(ch, on)| {
            format!("HDMI Input {} debug {}", ch.index(), if on { "on" } else { "off" })
        })))
    }

    fn freq(&self, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let freqs = env.plane.input_frequencies(env.board)?;
        Ok(CommandOutput::lines(freqs.into_iter().map(|(ch, hz)| {
            format!("HDMI Input {} Frequency: {} MHz ({hz} Hz)", ch.index(), hz / 1_000_000)
        })))
    }

    fn edid(&self, token: &str, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let output = OutputChannel::ALL.into_iter().find(|o| o.name() == token);
        let dump = match output {
            Some(o) => env.plane.edid_dump(o, env.board)?,
            None => None,
        };
        Ok(CommandOutput::Text(
            dump.unwrap_or_else(|| format!("{token} port has no EDID capabilities")),
        ))
    }

    fn fx2_reboot(&self, token: &str, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let firmware = match token {
            "usbjtag" => Some(Fx2Firmware::UsbJtag),
            "hdmi2usb" if env.plane.has(Capability::Encoder) => Some(Fx2Firmware::Hdmi2Usb),
            _ => None,
        };
        let text = match firmware {
            Some(fw) => {
                log::info!("Rebooting FX2 into {fw:?}");
                env.board.fx2_reboot(fw)?
            },
            None => env.board.fx2_debug()?,
        };
        Ok(CommandOutput::Text(text))
    }

    fn cas(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.next_token() {
            "leds" => {
                let value = i64::from(parse_int(args.next_token()));
                env.plane.set_leds(value, env.board)?;
                Ok(CommandOutput::None)
            },
            "switches" => {
                let switches = cas::read_switches(&*env.board)?;
                Ok(CommandOutput::Text(format!("{switches:X}")))
            },
            "buttons" => {
                // The clear request follows the read on the same line.
                let events = cas::read_buttons(args.next_token() == "clear", env.board)?;
                Ok(CommandOutput::Text(format!("{:X} {:X}", events.status, events.pending)))
            },
            _ => Ok(CommandOutput::None),
        }
    }
}

impl Command for DebugCmd {
    fn name(&self) -> &str {
        "debug"
    }
    fn alias(&self) -> Option<&str> {
        Some("d")
    }
    fn category(&self) -> &str {
        "debug"
    }
    fn usage(&self) -> &str {
        &self.usage
    }
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let caps = *env.plane.caps();
        let has = |cap: Capability| caps.contains(cap);
        let any_input = caps.contains_any(&[Capability::HdmiIn0, Capability::HdmiIn1]);

        match args.next_token() {
            "pll" => Ok(CommandOutput::Text(env.board.pll_dump()?)),
            "input" if any_input => {
                let request = DebugRequest::from_token(args.next_token());
                self.inputs(ChannelMask::BOTH, request, env)
            },
            "on" if any_input => self.inputs(ChannelMask::BOTH, DebugRequest::On, env),
            "off" if any_input => self.inputs(ChannelMask::BOTH, DebugRequest::Off, env),
            "?" if any_input => self.inputs(ChannelMask::BOTH, DebugRequest::Query, env),
            "input0" | "0" if has(InputChannel::In0.capability()) => {
                let request = DebugRequest::from_token(args.next_token());
                self.inputs(ChannelMask::INPUT0, request, env)
            },
            "input1" | "1" if has(InputChannel::In1.capability()) => {
                let request = DebugRequest::from_token(args.next_token());
                self.inputs(ChannelMask::INPUT1, request, env)
            },
            "ddr" => {
                let bw = env.plane.ddr_bandwidth(env.board)?;
                Ok(CommandOutput::Text(bw.to_string()))
            },
            "dna" => Ok(CommandOutput::Text(env.board.board_dna()?)),
            "freq" => self.freq(env),
            "opsis_eeprom" if has(Capability::OpsisEeprom) => {
                Ok(CommandOutput::Text(env.board.eeprom_dump(Eeprom::Opsis)?))
            },
            "tofe_eeprom" if has(Capability::TofeEeprom) => {
                Ok(CommandOutput::Text(env.board.eeprom_dump(Eeprom::Tofe)?))
            },
            "fx2_reboot" if has(Capability::Fx2) => {
                let token = args.next_token();
                self.fx2_reboot(token, env)
            },
            "edid" => {
                let token = args.next_token();
                self.edid(token, env)
            },
            "cas" if has(Capability::Cas) => self.cas(args, env),
            _ => self.help(),
        }
    }
}
