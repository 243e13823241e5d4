//! Video sources, sinks and physical port identifiers.

use std::fmt;

use serde::Deserialize;

use crate::capability::Capability;

/// A selectable video origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Input0,
    Input1,
    Pattern,
}

impl Source {
    /// All sources in matrix order.
    pub const ALL: [Source; 3] = [Source::Input0, Source::Input1, Source::Pattern];

    /// Parse a console token (`input0`/`0`, `input1`/`1`, `pattern`/`p`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "input0" | "0" => Some(Self::Input0),
            "input1" | "1" => Some(Self::Input1),
            "pattern" | "p" => Some(Self::Pattern),
            _ => None,
        }
    }

    /// Name shown in status and connect messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Input0 => "input0",
            Self::Input1 => "input1",
            Self::Pattern => "pattern",
        }
    }

    /// Single-character alias accepted by `video_matrix connect`.
    pub fn alias(self) -> &'static str {
        match self {
            Self::Input0 => "0",
            Self::Input1 => "1",
            Self::Pattern => "p",
        }
    }

    /// The capture input backing this source, if any.
    pub fn input(self) -> Option<InputChannel> {
        match self {
            Self::Input0 => Some(InputChannel::In0),
            Self::Input1 => Some(InputChannel::In1),
            Self::Pattern => None,
        }
    }

    /// Capability that must be present to select this source.
    ///
    /// The pattern generator is part of the base gateware and always present.
    pub fn capability(self) -> Option<Capability> {
        self.input().map(InputChannel::capability)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A selectable video destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sink {
    Output0,
    Output1,
    Encoder,
}

impl Sink {
    /// All sinks in matrix order.
    pub const ALL: [Sink; 3] = [Sink::Output0, Sink::Output1, Sink::Encoder];

    /// Parse a console token (`output0`/`0`, `output1`/`1`, `encoder`/`e`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "output0" | "0" => Some(Self::Output0),
            "output1" | "1" => Some(Self::Output1),
            "encoder" | "e" => Some(Self::Encoder),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Output0 => "output0",
            Self::Output1 => "output1",
            Self::Encoder => "encoder",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Self::Output0 => "0",
            Self::Output1 => "1",
            Self::Encoder => "e",
        }
    }

    /// The display output backing this sink, if any.
    pub fn output(self) -> Option<OutputChannel> {
        match self {
            Self::Output0 => Some(OutputChannel::Out0),
            Self::Output1 => Some(OutputChannel::Out1),
            Self::Encoder => None,
        }
    }

    /// Capability that must be present to route into this sink.
    pub fn capability(self) -> Capability {
        match self {
            Self::Output0 => Capability::HdmiOut0,
            Self::Output1 => Capability::HdmiOut1,
            Self::Encoder => Capability::Encoder,
        }
    }

    /// Zero-based slot in the routing matrix.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical HDMI capture input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputChannel {
    In0,
    In1,
}

impl InputChannel {
    pub const ALL: [InputChannel; 2] = [InputChannel::In0, InputChannel::In1];

    /// Zero-based port number.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a numeric port index back to a channel.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::In0),
            1 => Some(Self::In1),
            _ => None,
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Self::In0 => Capability::HdmiIn0,
            Self::In1 => Capability::HdmiIn1,
        }
    }

    /// Capability of this input's pixel-clock frequency counter.
    pub fn frequency_capability(self) -> Capability {
        match self {
            Self::In0 => Capability::HdmiIn0Frequency,
            Self::In1 => Capability::HdmiIn1Frequency,
        }
    }

    /// Bit of this input in a combined channel mask.
    pub fn mask_bit(self) -> u8 {
        1 << self.index()
    }
}

/// Physical HDMI display output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputChannel {
    Out0,
    Out1,
}

impl OutputChannel {
    pub const ALL: [OutputChannel; 2] = [OutputChannel::Out0, OutputChannel::Out1];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn capability(self) -> Capability {
        match self {
            Self::Out0 => Capability::HdmiOut0,
            Self::Out1 => Capability::HdmiOut1,
        }
    }

    /// Capability of this output's DDC/EDID channel.
    pub fn edid_capability(self) -> Capability {
        match self {
            Self::Out0 => Capability::HdmiOut0Edid,
            Self::Out1 => Capability::HdmiOut1Edid,
        }
    }

    pub fn sink(self) -> Sink {
        match self {
            Self::Out0 => Sink::Output0,
            Self::Out1 => Sink::Output1,
        }
    }

    /// Console name (`output0`, `output1`).
    pub fn name(self) -> &'static str {
        self.sink().name()
    }
}
