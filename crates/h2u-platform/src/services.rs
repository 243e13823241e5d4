//! Hardware service traits.
//!
//! Each trait models one register block of the gateware. Calls are
//! synchronous single-register accesses; none of them retries.

use std::fmt;
use std::time::Duration;

use h2u_types::config::VideoTiming;
use h2u_types::error::Result;
use h2u_types::video::{InputChannel, OutputChannel, Sink, Source};

// ---------------------------------------------------------------------------
// Capture inputs
// ---------------------------------------------------------------------------

/// Detected active area of a capture input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// HDMI capture input registers.
pub trait CaptureService {
    /// Resolution reported by the input's resolution detector.
    fn input_resolution(&self, input: InputChannel) -> Result<Resolution>;

    /// Pixel clock measured by the input's frequency counter, in Hz.
    fn input_frequency_hz(&self, input: InputChannel) -> Result<u32>;

    /// Drive the EDID hot-plug-detect enable line.
    fn set_hpd_enabled(&mut self, input: InputChannel, enabled: bool) -> Result<()>;

    /// Enable or disable the capture driver's debug tracing.
    fn set_input_debug(&mut self, input: InputChannel, enabled: bool) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Display outputs
// ---------------------------------------------------------------------------

/// HDMI display output registers.
pub trait DisplayService {
    /// State of the output's framebuffer-initiator enable line.
    fn output_enabled(&self, output: OutputChannel) -> Result<bool>;

    fn set_output_enabled(&mut self, output: OutputChannel, enabled: bool) -> Result<()>;

    /// Read the attached monitor's EDID and return a printable dump.
    fn edid_dump(&mut self, output: OutputChannel) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Video pipeline
// ---------------------------------------------------------------------------

/// Video processor: crossbar muxes and timing generator.
pub trait PipelineService {
    /// Program the crossbar mux feeding `sink`.
    fn set_sink_source(&mut self, sink: Sink, source: Source) -> Result<()>;

    /// Re-derive and apply active timing across all configured sinks.
    fn resync(&mut self) -> Result<()>;

    /// Switch the timing generator to `timing`.
    fn start(&mut self, timing: &VideoTiming) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// JPEG encoder registers.
pub trait EncoderService {
    fn set_encoder_enabled(&mut self, enabled: bool) -> Result<()>;

    fn set_encoder_quality(&mut self, quality: i32) -> Result<()>;

    fn set_encoder_fps(&mut self, fps: i32) -> Result<()>;

    /// Bytes produced since the counter was last cleared.
    fn encoder_bandwidth_bytes(&self) -> Result<u64>;

    fn clear_encoder_bandwidth(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SDRAM controller
// ---------------------------------------------------------------------------

/// Snapshot of the SDRAM controller's bandwidth counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandwidthCounts {
    pub reads: u64,
    pub writes: u64,
}

/// SDRAM controller bandwidth monitor.
pub trait SdramService {
    /// Latch the running counters into the readable registers.
    fn latch_bandwidth(&mut self) -> Result<()>;

    /// Read the latched counters.
    fn bandwidth_counts(&self) -> Result<BandwidthCounts>;
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// System clock: identifier frequency, tick counter and blocking delay.
pub trait ClockService {
    /// Ticks per second.
    fn clock_frequency(&self) -> u32;

    /// Monotonic tick counter.
    fn ticks(&self) -> u64;

    /// Stall the caller for `duration`. Not cancellable.
    fn block_for(&mut self, duration: Duration);
}

// ---------------------------------------------------------------------------
// Persisted configuration
// ---------------------------------------------------------------------------

/// Keys of persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Index of the active video mode.
    Resolution,
}

/// Non-volatile configuration storage.
pub trait ConfigStore {
    fn get(&self, key: ConfigKey) -> Result<Option<u32>>;

    fn set(&mut self, key: ConfigKey, value: u32) -> Result<()>;
}

// ---------------------------------------------------------------------------
// System / diagnostics
// ---------------------------------------------------------------------------

/// Board info EEPROMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eeprom {
    Opsis,
    Tofe,
}

/// Firmware images the FX2 USB controller can be rebooted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fx2Firmware {
    UsbJtag,
    Hdmi2Usb,
}

/// Board-level services and diagnostic dumps.
///
/// Dump methods return printable text; the console writes it verbatim.
pub trait SystemService {
    fn set_heartbeat(&mut self, enabled: bool) -> Result<()>;

    /// Firmware and gateware version banner.
    fn version_info(&self) -> Result<String>;

    /// FPGA device DNA.
    fn board_dna(&self) -> Result<String>;

    /// PLL configuration dump.
    fn pll_dump(&self) -> Result<String>;

    fn eeprom_dump(&mut self, eeprom: Eeprom) -> Result<String>;

    /// Reset the FX2 into `firmware`. Returns the controller's report.
    fn fx2_reboot(&mut self, firmware: Fx2Firmware) -> Result<String>;

    /// FX2 reset/boot state.
    fn fx2_debug(&self) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Control-and-status block
// ---------------------------------------------------------------------------

/// Button event registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEvents {
    /// Current level of each button.
    pub status: u32,
    /// Latched, not yet acknowledged events.
    pub pending: u32,
}

/// LEDs, switches and buttons.
pub trait CasService {
    fn write_leds(&mut self, value: u32) -> Result<()>;

    fn read_switches(&self) -> Result<u32>;

    fn button_events(&self) -> Result<ButtonEvents>;

    /// Acknowledge the pending events in `mask`.
    fn clear_button_events(&mut self, mask: u32) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Unified board trait
// ---------------------------------------------------------------------------

/// Aggregate trait providing access to every hardware service.
pub trait Board:
    CaptureService
    + DisplayService
    + PipelineService
    + EncoderService
    + SdramService
    + ClockService
    + ConfigStore
    + SystemService
    + CasService
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_display() {
        assert_eq!(Resolution::new(1920, 1080).to_string(), "1920x1080");
        assert_eq!(Resolution::default().to_string(), "0x0");
    }
}
