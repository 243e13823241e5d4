//! Board configuration loaded from a TOML file.
//!
//! Every field has a default describing a fully populated Opsis board, so an
//! empty document is valid. A minimal NeTV2-style board might look like:
//!
//! ```toml
//! prompt = "NETV2>"
//!
//! [capabilities]
//! hdmi_in1 = false
//! hdmi_out1 = false
//! encoder = false
//!
//! [[modes]]
//! h_active = 1280
//! v_active = 720
//! refresh_hz = 60
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::capability::{Capability, CapabilitySet};
use crate::error::{H2uError, Result};
use crate::video::{InputChannel, OutputChannel, Sink, Source};

/// Maximum length of a mode descriptor, including the terminator slot.
pub const MODE_DESCRIPTOR_LEN: usize = 32;

/// Top-level board description.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Console prompt printed after every command.
    pub prompt: String,
    /// System clock frequency in Hz (the identifier frequency register).
    pub clock_hz: u32,
    pub capabilities: CapabilityConfig,
    pub ports: PortLabels,
    /// Supported video timings, in menu order.
    pub modes: Vec<VideoTiming>,
    pub sdram: SdramGeometry,
    pub encoder: EncoderDefaults,
    pub routing: RoutingDefaults,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            prompt: "HDMI2USB>".to_string(),
            clock_hz: 100_000_000,
            capabilities: CapabilityConfig::default(),
            ports: PortLabels::default(),
            modes: default_modes(),
            sdram: SdramGeometry::default(),
            encoder: EncoderDefaults::default(),
            routing: RoutingDefaults::default(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a board description.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: BoardConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a board description from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.modes.is_empty() {
            return Err(H2uError::Config("at least one video mode is required".into()));
        }
        if let Some(bad) = self
            .modes
            .iter()
            .find(|m| m.h_active == 0 || m.v_active == 0)
        {
            return Err(H2uError::Config(format!(
                "video mode '{}' has a zero active area",
                bad.descriptor()
            )));
        }
        if self.sdram.nphases == 0 {
            return Err(H2uError::Config("sdram.nphases must be non-zero".into()));
        }
        if self.sdram.checked_burst_bits().is_none() {
            return Err(H2uError::Config(format!(
                "sdram burst of {} phases << {} overflows 32 bits",
                self.sdram.nphases, self.sdram.pix_data_size
            )));
        }
        if self.clock_hz == 0 {
            return Err(H2uError::Config("clock_hz must be non-zero".into()));
        }
        Ok(())
    }
}

fn yes() -> bool {
    true
}

/// One flag per optional hardware block.
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityConfig {
    #[serde(default = "yes")]
    pub hdmi_in0: bool,
    #[serde(default = "yes")]
    pub hdmi_in1: bool,
    #[serde(default = "yes")]
    pub hdmi_in0_freq: bool,
    #[serde(default = "yes")]
    pub hdmi_in1_freq: bool,
    #[serde(default = "yes")]
    pub hdmi_out0: bool,
    #[serde(default = "yes")]
    pub hdmi_out1: bool,
    #[serde(default = "yes")]
    pub hdmi_out0_edid: bool,
    #[serde(default = "yes")]
    pub hdmi_out1_edid: bool,
    #[serde(default = "yes")]
    pub encoder: bool,
    #[serde(default = "yes")]
    pub opsis_eeprom: bool,
    #[serde(default = "yes")]
    pub tofe_eeprom: bool,
    #[serde(default = "yes")]
    pub fx2: bool,
    #[serde(default)]
    pub cas: bool,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            hdmi_in0: true,
            hdmi_in1: true,
            hdmi_in0_freq: true,
            hdmi_in1_freq: true,
            hdmi_out0: true,
            hdmi_out1: true,
            hdmi_out0_edid: true,
            hdmi_out1_edid: true,
            encoder: true,
            opsis_eeprom: true,
            tofe_eeprom: true,
            fx2: true,
            cas: false,
        }
    }
}

impl CapabilityConfig {
    /// Resolve the flags into the immutable runtime registry.
    ///
    /// Sub-blocks (frequency counters, EDID channels) whose parent port is
    /// absent are dropped.
    pub fn to_set(&self) -> CapabilitySet {
        let flags = [
            (Capability::HdmiIn0, self.hdmi_in0),
            (Capability::HdmiIn1, self.hdmi_in1),
            (Capability::HdmiIn0Frequency, self.hdmi_in0_freq),
            (Capability::HdmiIn1Frequency, self.hdmi_in1_freq),
            (Capability::HdmiOut0, self.hdmi_out0),
            (Capability::HdmiOut1, self.hdmi_out1),
            (Capability::HdmiOut0Edid, self.hdmi_out0_edid),
            (Capability::HdmiOut1Edid, self.hdmi_out1_edid),
            (Capability::Encoder, self.encoder),
            (Capability::OpsisEeprom, self.opsis_eeprom),
            (Capability::TofeEeprom, self.tofe_eeprom),
            (Capability::Fx2, self.fx2),
            (Capability::Cas, self.cas),
        ];
        let declared: CapabilitySet = flags
            .iter()
            .filter(|(_, on)| *on)
            .map(|(cap, _)| *cap)
            .collect();

        declared
            .iter()
            .filter(|&cap| match parent_of(cap) {
                Some(parent) if !declared.contains(parent) => {
                    log::warn!("Ignoring {cap}: {parent} is not present");
                    false
                },
                _ => true,
            })
            .collect()
    }
}

fn parent_of(cap: Capability) -> Option<Capability> {
    match cap {
        Capability::HdmiIn0Frequency => Some(InputChannel::In0.capability()),
        Capability::HdmiIn1Frequency => Some(InputChannel::In1.capability()),
        Capability::HdmiOut0Edid => Some(OutputChannel::Out0.capability()),
        Capability::HdmiOut1Edid => Some(OutputChannel::Out1.capability()),
        _ => None,
    }
}

/// Connector mnemonic and free-form description for one physical port.
#[derive(Debug, Clone, Deserialize)]
pub struct PortLabel {
    pub mnemonic: String,
    #[serde(default)]
    pub description: String,
}

impl PortLabel {
    fn new(mnemonic: &str, description: &str) -> Self {
        Self {
            mnemonic: mnemonic.to_string(),
            description: description.to_string(),
        }
    }
}

/// Labels for every physical video port.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortLabels {
    pub input0: PortLabel,
    pub input1: PortLabel,
    pub output0: PortLabel,
    pub output1: PortLabel,
}

impl Default for PortLabels {
    fn default() -> Self {
        Self {
            input0: PortLabel::new("TX1", "  Type A (HDMI) connector, marked TX1.\n  Near the USB-UART connector."),
            input1: PortLabel::new("TX2", "  Type A (HDMI) connector, marked TX2.\n  Near the DisplayPort connector."),
            output0: PortLabel::new("RX1", "  Type A (HDMI) connector, marked RX1.\n  Near the audio jacks."),
            output1: PortLabel::new("RX2", "  Type A (HDMI) connector, marked RX2.\n  Near the power switch."),
        }
    }
}

impl PortLabels {
    pub fn input(&self, channel: InputChannel) -> &PortLabel {
        match channel {
            InputChannel::In0 => &self.input0,
            InputChannel::In1 => &self.input1,
        }
    }

    pub fn output(&self, channel: OutputChannel) -> &PortLabel {
        match channel {
            OutputChannel::Out0 => &self.output0,
            OutputChannel::Out1 => &self.output1,
        }
    }
}

/// A supported video timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoTiming {
    /// Optional human-readable label; generated from the geometry if absent.
    #[serde(default)]
    pub label: Option<String>,
    pub h_active: u32,
    pub v_active: u32,
    pub refresh_hz: u32,
}

impl VideoTiming {
    pub fn new(h_active: u32, v_active: u32, refresh_hz: u32) -> Self {
        Self {
            label: None,
            h_active,
            v_active,
            refresh_hz,
        }
    }

    /// Fixed-length descriptor shown by `video_mode list`.
    pub fn descriptor(&self) -> String {
        let mut desc = match &self.label {
            Some(label) => label.clone(),
            None => format!("{}x{} @{}Hz", self.h_active, self.v_active, self.refresh_hz),
        };
        if desc.len() >= MODE_DESCRIPTOR_LEN {
            let mut end = MODE_DESCRIPTOR_LEN - 1;
            while !desc.is_char_boundary(end) {
                end -= 1;
            }
            desc.truncate(end);
        }
        desc
    }
}

fn default_modes() -> Vec<VideoTiming> {
    vec![
        VideoTiming::new(640, 480, 75),
        VideoTiming::new(720, 480, 60),
        VideoTiming::new(800, 600, 60),
        VideoTiming::new(1024, 768, 60),
        VideoTiming::new(1280, 720, 50),
        VideoTiming::new(1280, 720, 60),
        VideoTiming::new(1920, 1080, 30),
        VideoTiming::new(1920, 1080, 60),
    ]
}

/// DDR PHY geometry used to scale the bandwidth counters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SdramGeometry {
    /// DFI phase count.
    pub nphases: u32,
    /// log2 of the pixel-data width multiplier.
    pub pix_data_size: u32,
}

impl Default for SdramGeometry {
    fn default() -> Self {
        Self {
            nphases: 4,
            pix_data_size: 4,
        }
    }
}

impl SdramGeometry {
    /// Bits moved per counted burst, `None` if that does not fit in a `u32`.
    pub fn checked_burst_bits(&self) -> Option<u32> {
        let per_phase = self.nphases.checked_mul(2)?;
        let bits = per_phase.checked_shl(self.pix_data_size)?;
        (bits >> self.pix_data_size == per_phase).then_some(bits)
    }

    /// Bits moved per counted burst. Saturates on geometries that
    /// [`BoardConfig`] validation would reject.
    pub fn burst_bits(&self) -> u32 {
        self.checked_burst_bits().unwrap_or(u32::MAX)
    }
}

/// Encoder parameters applied at startup.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EncoderDefaults {
    pub quality: i32,
    pub fps: i32,
}

impl Default for EncoderDefaults {
    fn default() -> Self {
        Self {
            quality: 85,
            fps: 30,
        }
    }
}

/// Source assigned to each sink at startup.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RoutingDefaults {
    pub output0: Source,
    pub output1: Source,
    pub encoder: Source,
}

impl Default for RoutingDefaults {
    fn default() -> Self {
        Self {
            output0: Source::Pattern,
            output1: Source::Pattern,
            encoder: Source::Pattern,
        }
    }
}

impl RoutingDefaults {
    pub fn source_for(&self, sink: Sink) -> Source {
        match sink {
            Sink::Output0 => self.output0,
            Sink::Output1 => self.output1,
            Sink::Encoder => self.encoder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_full_board() {
        let config = BoardConfig::from_toml_str("").unwrap();
        assert_eq!(config.prompt, "HDMI2USB>");
        assert_eq!(config.modes.len(), 8);
        let caps = config.capabilities.to_set();
        assert!(caps.contains(Capability::HdmiIn0));
        assert!(caps.contains(Capability::Encoder));
        assert!(!caps.contains(Capability::Cas));
    }

    #[test]
    fn capability_overrides() {
        let text = r#"
            [capabilities]
            hdmi_out1 = false
            encoder = false
            cas = true
        "#;
        let config = BoardConfig::from_toml_str(text).unwrap();
        let caps = config.capabilities.to_set();
        assert!(!caps.contains(Capability::HdmiOut1));
        assert!(!caps.contains(Capability::Encoder));
        assert!(caps.contains(Capability::Cas));
        assert!(caps.contains(Capability::HdmiOut0));
    }

    #[test]
    fn orphan_sub_blocks_are_dropped() {
        let text = r#"
            [capabilities]
            hdmi_in1 = false
            hdmi_out0 = false
        "#;
        let caps = BoardConfig::from_toml_str(text)
            .unwrap()
            .capabilities
            .to_set();
        assert!(!caps.contains(Capability::HdmiIn1Frequency));
        assert!(!caps.contains(Capability::HdmiOut0Edid));
        assert!(caps.contains(Capability::HdmiIn0Frequency));
    }

    #[test]
    fn custom_modes_and_routing() {
        let text = r#"
            [[modes]]
            h_active = 1280
            v_active = 720
            refresh_hz = 60

            [[modes]]
            label = "1080p30"
            h_active = 1920
            v_active = 1080
            refresh_hz = 30

            [routing]
            output0 = "input1"
        "#;
        let config = BoardConfig::from_toml_str(text).unwrap();
        assert_eq!(config.modes.len(), 2);
        assert_eq!(config.modes[0].descriptor(), "1280x720 @60Hz");
        assert_eq!(config.modes[1].descriptor(), "1080p30");
        assert_eq!(config.routing.source_for(Sink::Output0), Source::Input1);
        assert_eq!(config.routing.source_for(Sink::Encoder), Source::Pattern);
    }

    #[test]
    fn empty_mode_table_rejected() {
        let err = BoardConfig::from_toml_str("modes = []").unwrap_err();
        assert!(matches!(err, H2uError::Config(_)));
    }

    #[test]
    fn zero_phase_count_rejected() {
        let err = BoardConfig::from_toml_str("[sdram]\nnphases = 0").unwrap_err();
        assert!(matches!(err, H2uError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = BoardConfig::from_toml_str("prompt = ").unwrap_err();
        assert!(matches!(err, H2uError::TomlParse(_)));
    }

    #[test]
    fn long_descriptor_is_truncated() {
        let timing = VideoTiming {
            label: Some("x".repeat(40)),
            h_active: 1,
            v_active: 1,
            refresh_hz: 1,
        };
        assert_eq!(timing.descriptor().len(), MODE_DESCRIPTOR_LEN - 1);
    }

    #[test]
    fn burst_bits_from_geometry() {
        let geom = SdramGeometry {
            nphases: 4,
            pix_data_size: 4,
        };
        assert_eq!(geom.burst_bits(), 128);
    }

    #[test]
    fn port_label_lookup() {
        let labels = PortLabels::default();
        assert_eq!(labels.input(InputChannel::In1).mnemonic, "TX2");
        assert_eq!(labels.output(OutputChannel::Out0).mnemonic, "RX1");
    }

    #[test]
    fn oversized_sdram_burst_rejected() {
        for text in [
            "[sdram]\npix_data_size = 40",
            "[sdram]\npix_data_size = 31",
            "[sdram]\nnphases = 3000000000",
        ] {
            let err = BoardConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, H2uError::Config(_)), "{text}");
        }
        let geom = SdramGeometry {
            nphases: 4,
            pix_data_size: 40,
        };
        assert_eq!(geom.checked_burst_bits(), None);
        assert_eq!(geom.burst_bits(), u32::MAX);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn descriptor_fits_its_slot(label in "\\PC{0,60}") {
                let timing = VideoTiming {
                    label: Some(label.clone()),
                    h_active: 1,
                    v_active: 1,
                    refresh_hz: 1,
                };
                let desc = timing.descriptor();
                prop_assert!(desc.len() < MODE_DESCRIPTOR_LEN);
                prop_assert!(label.starts_with(&desc));
            }
        }
    }
}
