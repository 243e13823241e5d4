//! Status reporting and DDR bandwidth measurement.
//!
//! Periodic reporting is pure polling: [`StatusReporter::poll`] compares the
//! board's tick counter against the last firing point on every interpreter
//! iteration. There is no timer interrupt and no background task.

use std::fmt;

use h2u_platform::{ClockService, Resolution, SdramService};
use h2u_types::config::SdramGeometry;
use h2u_types::error::Result;
use h2u_types::video::{InputChannel, OutputChannel, Source};

/// Status-mode flag plus the polling timer state.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    enabled: bool,
    last_event: u64,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Advance the timer to `now`. Returns true when a full `period` has
    /// elapsed since the last firing and status mode is on.
    ///
    /// The timer re-arms on every elapsed period whether or not status mode
    /// is enabled.
    pub fn poll(&mut self, now: u64, period: u64) -> bool {
        if now.wrapping_sub(self.last_event) < period {
            return false;
        }
        self.last_event = now;
        self.enabled
    }
}

/// floor(log2(v)), with log2(0) defined as 0.
pub fn floor_log2(v: u32) -> u32 {
    v.checked_ilog2().unwrap_or(0)
}

/// Scale a burst counter to whole Mbit/s.
///
/// `count * frequency / 2^(24 - log2(burst_bits))`, truncated to megabits.
pub fn bandwidth_mbps(count: u64, frequency: u32, burst_bits: u32) -> u64 {
    let product = u128::from(count) * u128::from(frequency);
    let shift = 24i32 - floor_log2(burst_bits) as i32;
    let bits_per_sec = if shift >= 0 {
        product >> shift
    } else {
        product << -shift
    };
    (bits_per_sec / 1_000_000) as u64
}

/// DDR read/write bandwidth in Mbit/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DdrBandwidth {
    pub read_mbps: u64,
    pub write_mbps: u64,
}

impl DdrBandwidth {
    /// Latch the SDRAM counters and convert them.
    pub fn measure<B: SdramService + ClockService + ?Sized>(
        board: &mut B,
        geometry: &SdramGeometry,
    ) -> Result<Self> {
        board.latch_bandwidth()?;
        let counts = board.bandwidth_counts()?;
        let freq = board.clock_frequency();
        let burst = geometry.burst_bits();
        Ok(Self {
            read_mbps: bandwidth_mbps(counts.reads, freq, burst),
            write_mbps: bandwidth_mbps(counts.writes, freq, burst),
        })
    }

    pub fn total_mbps(&self) -> u64 {
        self.read_mbps + self.write_mbps
    }
}

impl fmt::Display for DdrBandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read:{:5}Mbps  write:{:5}Mbps  all:{:5}Mbps",
            self.read_mbps,
            self.write_mbps,
            self.total_mbps()
        )
    }
}

/// Detected signal on one capture input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputStatus {
    pub channel: InputChannel,
    pub resolution: Resolution,
    /// Pixel clock in Hz, when the input has a frequency counter.
    pub frequency_hz: Option<u32>,
}

/// Active video geometry shared by all sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveVideo {
    pub h_active: u32,
    pub v_active: u32,
    pub refresh_hz: u32,
    pub source: Source,
}

/// State of one display output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStatus {
    pub channel: OutputChannel,
    /// `None` when the output is switched off.
    pub video: Option<ActiveVideo>,
}

/// State of the encoder while enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderReport {
    pub h_active: u32,
    pub v_active: u32,
    pub fps: i32,
    pub mbps: u64,
    pub source: Source,
    pub quality: i32,
}

/// One full status snapshot. Blocks absent from the board are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub inputs: Vec<InputStatus>,
    pub outputs: Vec<OutputStatus>,
    /// Outer `None`: no encoder block. Inner `None`: encoder off.
    pub encoder: Option<Option<EncoderReport>>,
    pub ddr: DdrBandwidth,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "input{}:  {}", input.channel.index(), input.resolution)?;
            if let Some(hz) = input.frequency_hz {
                write!(f, " (@ {} kHz)", hz / 1000)?;
            }
            writeln!(f)?;
        }
        for output in &self.outputs {
            write!(f, "output{}: ", output.channel.index())?;
            match output.video {
                Some(v) => writeln!(
                    f,
                    "{}x{}@{}Hz from {}",
                    v.h_active, v.v_active, v.refresh_hz, v.source
                )?,
                None => writeln!(f, "off")?,
            }
        }
        if let Some(encoder) = &self.encoder {
            write!(f, "encoder: ")?;
            match encoder {
                Some(e) => writeln!(
                    f,
                    "{}x{} @ {}fps ({}Mbps) from {} (q: {})",
                    e.h_active, e.v_active, e.fps, e.mbps, e.source, e.quality
                )?,
                None => writeln!(f, "off")?,
            }
        }
        write!(f, "ddr: {}", self.ddr)
    }
}
