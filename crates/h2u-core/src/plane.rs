use h2u_platform::Board;
use h2u_types::capability::{Capability, CapabilitySet};
use h2u_types::config::{BoardConfig, SdramGeometry};
use h2u_types::error::Result;
use h2u_types::video::{InputChannel, OutputChannel, Sink, Source};

use crate::cas;
use crate::debug::{ChannelMask, DebugChannels, DebugRequest};
use crate::encoder::EncoderController;
use crate::hdp::{self, HdpOutcome};
use crate::matrix::{ConnectOutcome, RoutingMatrix};
use crate::mode::ModeController;
use crate::status::{
    ActiveVideo, DdrBandwidth, EncoderReport, InputStatus, OutputStatus, StatusReport,
    StatusReporter,
};

/// The console's entire mutable state.
///
/// Built once per boot. Every operation takes the board explicitly; the
/// plane holds no hardware handle of its own.
#[derive(Debug)]
pub struct ControlPlane {
    caps: CapabilitySet,
    matrix: RoutingMatrix,
    modes: ModeController,
    encoder: EncoderController,
    status: StatusReporter,
    debug: DebugChannels,
    sdram: SdramGeometry,
}

impl ControlPlane {
    /// Resolve capabilities, restore the persisted mode and program the
    /// default routing.
    pub fn new(config: &BoardConfig, board: &mut dyn Board) -> Result<Self> {
        let caps = config.capabilities.to_set();
        log::info!("Board capabilities: {caps}");

        let mut plane = Self {
            caps,
            matrix: RoutingMatrix::new(caps, config.ports.clone(), &config.routing),
            modes: ModeController::new(config.modes.clone()),
            encoder: EncoderController::new(&config.encoder),
            status: StatusReporter::new(),
            debug: DebugChannels::new(caps),
            sdram: config.sdram,
        };

        plane.modes.restore(board)?;
        plane.matrix.program(board)?;
        if caps.contains(Capability::Encoder) {
            plane.encoder.program(board)?;
        }
        Ok(plane)
    }

    pub fn caps(&self) -> &CapabilitySet {
        &self.caps
    }

    pub fn has(&self, cap: Capability) -> bool {
        self.caps.contains(cap)
    }

    pub fn matrix(&self) -> &RoutingMatrix {
        &self.matrix
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn encoder(&self) -> &EncoderController {
        &self.encoder
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    // -- Routing / modes --

    pub fn connect(&mut self, source: Source, sink: Sink, board: &mut dyn Board) -> Result<ConnectOutcome> {
        self.matrix.connect(source, sink, board)
    }

    pub fn set_mode(&mut self, index: i64, board: &mut dyn Board) -> Result<Option<String>> {
        self.modes.set_mode(index, board)
    }

    // -- Outputs --

    pub fn set_output_enabled(
        &mut self,
        output: OutputChannel,
        enabled: bool,
        board: &mut dyn Board,
    ) -> Result<()> {
        board.set_output_enabled(output, enabled)?;
        log::info!("{} {}", output.name(), if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    // -- Encoder --

    pub fn enable_encoder(&mut self, board: &mut dyn Board) -> Result<()> {
        self.encoder.enable(board)
    }

    pub fn disable_encoder(&mut self, board: &mut dyn Board) -> Result<()> {
        self.encoder.disable(board)
    }

    pub fn set_encoder_quality(&mut self, quality: i32, board: &mut dyn Board) -> Result<()> {
        self.encoder.set_quality(quality, board)
    }

    pub fn set_encoder_fps(&mut self, fps: i32, board: &mut dyn Board) -> Result<()> {
        self.encoder.set_fps(fps, board)
    }

    // -- Status --

    /// Turn status mode on and start a fresh encoder bandwidth window.
    pub fn enable_status(&mut self, board: &mut dyn Board) -> Result<()> {
        self.status.enable();
        if self.has(Capability::Encoder) {
            self.encoder.reset_bandwidth(board)?;
        }
        log::info!("Status reporting enabled");
        Ok(())
    }

    pub fn disable_status(&mut self) {
        self.status.disable();
        log::info!("Status reporting disabled");
    }

    /// Snapshot every present block. Reading the encoder clears its
    /// bandwidth counter.
    pub fn status_report(&mut self, board: &mut dyn Board) -> Result<StatusReport> {
        let mut inputs = Vec::new();
        for ch in InputChannel::ALL {
            if !self.has(ch.capability()) {
                continue;
            }
            let frequency_hz = if self.has(ch.frequency_capability()) {
                Some(board.input_frequency_hz(ch)?)
            } else {
                None
            };
            inputs.push(InputStatus {
                channel: ch,
                resolution: board.input_resolution(ch)?,
                frequency_hz,
            });
        }

        let timing = self.modes.active();
        let mut outputs = Vec::new();
        for ch in OutputChannel::ALL {
            if !self.has(ch.capability()) {
                continue;
            }
            let video = if board.output_enabled(ch)? {
                Some(ActiveVideo {
                    h_active: timing.h_active,
                    v_active: timing.v_active,
                    refresh_hz: timing.refresh_hz,
                    source: self.matrix.source_of(ch.sink()).unwrap_or(Source::Pattern),
                })
            } else {
                None
            };
            outputs.push(OutputStatus { channel: ch, video });
        }

        let encoder = if self.has(Capability::Encoder) {
            let state = *self.encoder.state();
            if state.enabled {
                Some(Some(EncoderReport {
                    h_active: timing.h_active,
                    v_active: timing.v_active,
                    fps: state.fps,
                    mbps: self.encoder.take_bandwidth_mbps(board)?,
                    source: self.matrix.source_of(Sink::Encoder).unwrap_or(Source::Pattern),
                    quality: state.quality,
                }))
            } else {
                Some(None)
            }
        } else {
            None
        };

        Ok(StatusReport {
            inputs,
            outputs,
            encoder,
            ddr: DdrBandwidth::measure(board, &self.sdram)?,
        })
    }

    /// Poll the status timer. Yields a report at most once per second of
    /// board ticks, and only while status mode is on.
    pub fn service_status(&mut self, board: &mut dyn Board) -> Result<Option<StatusReport>> {
        let now = board.ticks();
        let period = u64::from(board.clock_frequency());
        if self.status.poll(now, period) {
            self.status_report(board).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn ddr_bandwidth(&self, board: &mut dyn Board) -> Result<DdrBandwidth> {
        DdrBandwidth::measure(board, &self.sdram)
    }

    // -- Debug / diagnostics --

    pub fn debug_inputs(
        &mut self,
        mask: ChannelMask,
        request: DebugRequest,
        board: &mut dyn Board,
    ) -> Result<Vec<(InputChannel, bool)>> {
        self.debug.apply(mask, request, board)
    }

    pub fn hdp_toggle(&mut self, index: i64, board: &mut dyn Board) -> Result<HdpOutcome> {
        hdp::hdp_toggle(&self.caps, index, board)
    }

    /// Input pixel clocks, for inputs that have a frequency counter.
    pub fn input_frequencies(&self, board: &mut dyn Board) -> Result<Vec<(InputChannel, u32)>> {
        let mut out = Vec::new();
        for ch in InputChannel::ALL {
            if self.has(ch.capability()) && self.has(ch.frequency_capability()) {
                out.push((ch, board.input_frequency_hz(ch)?));
            }
        }
        Ok(out)
    }

    /// EDID dump of `output`, `None` if it has no EDID channel.
    pub fn edid_dump(&self, output: OutputChannel, board: &mut dyn Board) -> Result<Option<String>> {
        if !self.has(output.edid_capability()) {
            return Ok(None);
        }
        board.edid_dump(output).map(Some)
    }

    pub fn set_leds(&self, value: i64, board: &mut dyn Board) -> Result<()> {
        cas::set_leds(value, board)
    }
}
