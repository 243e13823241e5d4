//! Per-input capture debug flags.

use h2u_platform::CaptureService;
use h2u_types::capability::CapabilitySet;
use h2u_types::error::Result;
use h2u_types::video::InputChannel;

/// What a debug command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugRequest {
    On,
    Off,
    /// Report only.
    Query,
    /// Negate the current value.
    Toggle,
}

impl DebugRequest {
    /// `on`, `off` and `?` are literal; every other token (the empty one
    /// included) is a toggle.
    pub fn from_token(token: &str) -> Self {
        match token {
            "on" => Self::On,
            "off" => Self::Off,
            "?" => Self::Query,
            _ => Self::Toggle,
        }
    }
}

/// Set of targeted inputs. Bit 0 is input 0, bit 1 is input 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const INPUT0: Self = Self(0b01);
    pub const INPUT1: Self = Self(0b10);
    pub const BOTH: Self = Self(0b11);

    pub fn contains(self, channel: InputChannel) -> bool {
        self.0 & channel.mask_bit() != 0
    }
}

/// One debug flag per capture input.
#[derive(Debug, Clone)]
pub struct DebugChannels {
    flags: [bool; 2],
    caps: CapabilitySet,
}

impl DebugChannels {
    pub fn new(caps: CapabilitySet) -> Self {
        Self {
            flags: [false; 2],
            caps,
        }
    }

    pub fn get(&self, channel: InputChannel) -> bool {
        self.flags[channel.index()]
    }

    /// Apply `request` to every present input in `mask` and return the
    /// resulting flag of each, in channel order.
    ///
    /// A toggle on a multi-channel mask takes its new value from the first
    /// targeted present input and writes that value to all of them.
    pub fn apply<C: CaptureService + ?Sized>(
        &mut self,
        mask: ChannelMask,
        request: DebugRequest,
        capture: &mut C,
    ) -> Result<Vec<(InputChannel, bool)>> {
        let targets: Vec<InputChannel> = InputChannel::ALL
            .into_iter()
            .filter(|&ch| mask.contains(ch) && self.caps.contains(ch.capability()))
            .collect();

        let new_value = match request {
            DebugRequest::On => Some(true),
            DebugRequest::Off => Some(false),
            DebugRequest::Query => None,
            DebugRequest::Toggle => targets.first().map(|&ch| !self.get(ch)),
        };

        if let Some(value) = new_value {
            for &ch in &targets {
                if self.flags[ch.index()] != value {
                    capture.set_input_debug(ch, value)?;
                    log::debug!("Input {} debug {}", ch.index(), if value { "on" } else { "off" });
                }
                self.flags[ch.index()] = value;
            }
        }

        Ok(targets.into_iter().map(|ch| (ch, self.get(ch))).collect())
    }
}
