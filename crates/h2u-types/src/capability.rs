//! Runtime capability registry.
//!
//! Records which optional hardware blocks exist on the running board. The
//! set is resolved once at startup from the board configuration and is
//! read-only afterwards: there is no API to add or remove a capability from
//! an existing set.

use std::fmt;

/// An optional hardware block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// HDMI capture input 0.
    HdmiIn0,
    /// HDMI capture input 1.
    HdmiIn1,
    /// Pixel-clock frequency counter on input 0.
    HdmiIn0Frequency,
    /// Pixel-clock frequency counter on input 1.
    HdmiIn1Frequency,
    /// HDMI display output 0.
    HdmiOut0,
    /// HDMI display output 1.
    HdmiOut1,
    /// DDC/EDID channel on output 0.
    HdmiOut0Edid,
    /// DDC/EDID channel on output 1.
    HdmiOut1Edid,
    /// JPEG encoder (USB output path).
    Encoder,
    /// Opsis board info EEPROM.
    OpsisEeprom,
    /// TOFE expansion board EEPROM.
    TofeEeprom,
    /// Cypress FX2 USB controller reset line.
    Fx2,
    /// Control-and-status block (LEDs, switches, buttons).
    Cas,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Capability; 13] = [
        Capability::HdmiIn0,
        Capability::HdmiIn1,
        Capability::HdmiIn0Frequency,
        Capability::HdmiIn1Frequency,
        Capability::HdmiOut0,
        Capability::HdmiOut1,
        Capability::HdmiOut0Edid,
        Capability::HdmiOut1Edid,
        Capability::Encoder,
        Capability::OpsisEeprom,
        Capability::TofeEeprom,
        Capability::Fx2,
        Capability::Cas,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Hardware block name used in "is missing" diagnostics.
    pub fn block_name(self) -> &'static str {
        match self {
            Self::HdmiIn0 => "hdmi_in0",
            Self::HdmiIn1 => "hdmi_in1",
            Self::HdmiIn0Frequency => "hdmi_in0_freq",
            Self::HdmiIn1Frequency => "hdmi_in1_freq",
            Self::HdmiOut0 => "hdmi_out0",
            Self::HdmiOut1 => "hdmi_out1",
            Self::HdmiOut0Edid => "hdmi_out0_edid",
            Self::HdmiOut1Edid => "hdmi_out1_edid",
            Self::Encoder => "encoder",
            Self::OpsisEeprom => "opsis_eeprom",
            Self::TofeEeprom => "tofe_eeprom",
            Self::Fx2 => "fx2",
            Self::Cas => "cas",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.block_name())
    }
}

/// Immutable set of present hardware blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    bits: u16,
}

impl CapabilitySet {
    /// A board with no optional blocks at all.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// A board with every optional block.
    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// Whether `cap` is present.
    pub fn contains(&self, cap: Capability) -> bool {
        self.bits & cap.bit() != 0
    }

    /// Whether any of `caps` is present.
    pub fn contains_any(&self, caps: &[Capability]) -> bool {
        caps.iter().any(|&c| self.contains(c))
    }

    /// Number of present blocks.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Present blocks in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|&c| self.contains(c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let bits = iter.into_iter().fold(0u16, |acc, c| acc | c.bit());
        Self { bits }
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Capability::block_name).collect();
        if names.is_empty() {
            f.write_str("(none)")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contains_nothing() {
        let caps = CapabilitySet::empty();
        assert!(caps.is_empty());
        for cap in Capability::ALL {
            assert!(!caps.contains(cap));
        }
    }

    #[test]
    fn all_contains_everything() {
        let caps = CapabilitySet::all();
        assert_eq!(caps.len(), Capability::ALL.len());
        assert!(caps.contains(Capability::Cas));
    }

    #[test]
    fn collect_subset() {
        let caps: CapabilitySet = [Capability::HdmiIn0, Capability::Encoder]
            .into_iter()
            .collect();
        assert!(caps.contains(Capability::HdmiIn0));
        assert!(caps.contains(Capability::Encoder));
        assert!(!caps.contains(Capability::HdmiIn1));
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn contains_any_matches_one() {
        let caps: CapabilitySet = [Capability::HdmiIn1].into_iter().collect();
        assert!(caps.contains_any(&[Capability::HdmiIn0, Capability::HdmiIn1]));
        assert!(!caps.contains_any(&[Capability::HdmiOut0]));
    }

    #[test]
    fn iter_preserves_declaration_order() {
        let caps: CapabilitySet = [Capability::Cas, Capability::HdmiOut0]
            .into_iter()
            .collect();
        let v: Vec<Capability> = caps.iter().collect();
        assert_eq!(v, vec![Capability::HdmiOut0, Capability::Cas]);
    }

    #[test]
    fn display_lists_block_names() {
        let caps: CapabilitySet = [Capability::HdmiIn0, Capability::HdmiOut1]
            .into_iter()
            .collect();
        assert_eq!(caps.to_string(), "hdmi_in0, hdmi_out1");
        assert_eq!(CapabilitySet::empty().to_string(), "(none)");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn collected_set_holds_exactly_its_members(mask in 0u16..(1 << 13)) {
                let members: Vec<Capability> = Capability::ALL
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, c)| c)
                    .collect();
                let caps: CapabilitySet = members.iter().copied().collect();
                prop_assert_eq!(caps.len(), members.len());
                for cap in Capability::ALL {
                    prop_assert_eq!(caps.contains(cap), members.contains(&cap));
                }
                prop_assert_eq!(caps.iter().collect::<Vec<_>>(), members);
            }
        }
    }
}
