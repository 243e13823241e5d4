//! Simulated board for the desktop binary and tests.
//!
//! Registers are plain fields. Side effects that matter to callers (HPD
//! pulses, crossbar changes, resyncs, delays) are appended to an event log
//! that tests can inspect.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use h2u_types::config::{BoardConfig, VideoTiming};
use h2u_types::error::{H2uError, Result};
use h2u_types::video::{InputChannel, OutputChannel, Sink, Source};

use crate::services::{
    BandwidthCounts, Board, ButtonEvents, CaptureService, CasService, ClockService, ConfigKey,
    ConfigStore, DisplayService, EncoderService, Eeprom, Fx2Firmware, PipelineService,
    Resolution, SdramService, SystemService,
};

/// Oldest half of the event log is dropped once it reaches this length.
pub const EVENT_LOG_CAP: usize = 1024;

/// A recorded hardware side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    Hpd { input: InputChannel, enabled: bool },
    Blocked(Duration),
    SinkSource { sink: Sink, source: Source },
    Resync,
    Started(VideoTiming),
    OutputEnable { output: OutputChannel, enabled: bool },
    Heartbeat(bool),
    Fx2Reboot(Fx2Firmware),
}

#[derive(Debug)]
enum SimClock {
    Wall(Instant),
    Manual(u64),
}

#[derive(Debug, Clone, Copy, Default)]
struct SimInput {
    resolution: Resolution,
    frequency_hz: u32,
    hpd_enabled: bool,
    debug: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SimEncoder {
    enabled: bool,
    quality: i32,
    fps: i32,
    bandwidth_bytes: u64,
}

/// In-memory stand-in for the FPGA register space.
#[derive(Debug)]
pub struct SimulatedBoard {
    clock: SimClock,
    clock_hz: u32,
    inputs: [SimInput; 2],
    outputs: [bool; 2],
    sources: BTreeMap<Sink, Source>,
    timing: Option<VideoTiming>,
    encoder: SimEncoder,
    sdram_running: BandwidthCounts,
    sdram_latched: BandwidthCounts,
    store: HashMap<ConfigKey, u32>,
    heartbeat: bool,
    leds: u32,
    switches: u32,
    buttons: ButtonEvents,
    tofe_fault: bool,
    events: Vec<BoardEvent>,
}

impl SimulatedBoard {
    /// Board driven by the host's wall clock.
    pub fn new(config: &BoardConfig) -> Self {
        Self::with_clock(config.clock_hz, SimClock::Wall(Instant::now()))
    }

    /// Board whose tick counter only moves via [`advance_ticks`](Self::advance_ticks)
    /// or [`block_for`](ClockService::block_for).
    pub fn with_manual_clock(config: &BoardConfig) -> Self {
        Self::with_clock(config.clock_hz, SimClock::Manual(0))
    }

    /// Power-cycle: every register back to reset, the config store and the
    /// tick counter carry over.
    pub fn rebooted(self) -> Self {
        let mut board = Self::with_clock(self.clock_hz, self.clock);
        board.store = self.store;
        board
    }

    fn with_clock(clock_hz: u32, clock: SimClock) -> Self {
        let mut inputs = [SimInput::default(); 2];
        inputs[0].resolution = Resolution::new(1920, 1080);
        inputs[0].frequency_hz = 148_500_000;
        for input in &mut inputs {
            input.hpd_enabled = true;
        }
        Self {
            clock,
            clock_hz,
            inputs,
            outputs: [true; 2],
            sources: BTreeMap::new(),
            timing: None,
            encoder: SimEncoder::default(),
            sdram_running: BandwidthCounts::default(),
            sdram_latched: BandwidthCounts::default(),
            store: HashMap::new(),
            heartbeat: false,
            leds: 0,
            switches: 0,
            buttons: ButtonEvents::default(),
            tofe_fault: false,
            events: Vec::new(),
        }
    }

    // -- Inspection / stimulus API --

    /// Recorded side effects, oldest first.
    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn advance_ticks(&mut self, ticks: u64) {
        if let SimClock::Manual(now) = &mut self.clock {
            *now += ticks;
        }
    }

    /// Make the TOFE EEPROM stop acknowledging reads.
    pub fn set_tofe_fault(&mut self, fault: bool) {
        self.tofe_fault = fault;
    }

    fn record(&mut self, event: BoardEvent) {
        if self.events.len() >= EVENT_LOG_CAP {
            self.events.drain(..EVENT_LOG_CAP / 2);
        }
        self.events.push(event);
    }

    pub fn set_input_signal(&mut self, input: InputChannel, resolution: Resolution, hz: u32) {
        let slot = &mut self.inputs[input.index()];
        slot.resolution = resolution;
        slot.frequency_hz = hz;
    }

    pub fn hpd_enabled(&self, input: InputChannel) -> bool {
        self.inputs[input.index()].hpd_enabled
    }

    pub fn input_debug(&self, input: InputChannel) -> bool {
        self.inputs[input.index()].debug
    }

    /// Source currently programmed into `sink`'s crossbar mux.
    pub fn sink_source(&self, sink: Sink) -> Option<Source> {
        self.sources.get(&sink).copied()
    }

    pub fn active_timing(&self) -> Option<&VideoTiming> {
        self.timing.as_ref()
    }

    pub fn encoder_enabled(&self) -> bool {
        self.encoder.enabled
    }

    pub fn encoder_quality(&self) -> i32 {
        self.encoder.quality
    }

    pub fn encoder_fps(&self) -> i32 {
        self.encoder.fps
    }

    /// Simulate the encoder emitting `bytes` onto USB.
    pub fn add_encoder_bytes(&mut self, bytes: u64) {
        self.encoder.bandwidth_bytes += bytes;
    }

    /// Simulate DDR traffic since the last latch.
    pub fn add_sdram_traffic(&mut self, reads: u64, writes: u64) {
        self.sdram_running.reads += reads;
        self.sdram_running.writes += writes;
    }

    pub fn heartbeat(&self) -> bool {
        self.heartbeat
    }

    pub fn leds(&self) -> u32 {
        self.leds
    }

    pub fn set_switches(&mut self, value: u32) {
        self.switches = value;
    }

    /// Simulate buttons being pressed (level and latched event).
    pub fn press_buttons(&mut self, mask: u32) {
        self.buttons.status |= mask;
        self.buttons.pending |= mask;
    }
}

impl CaptureService for SimulatedBoard {
    fn input_resolution(&self, input: InputChannel) -> Result<Resolution> {
        Ok(self.inputs[input.index()].resolution)
    }

    fn input_frequency_hz(&self, input: InputChannel) -> Result<u32> {
        Ok(self.inputs[input.index()].frequency_hz)
    }

    fn set_hpd_enabled(&mut self, input: InputChannel, enabled: bool) -> Result<()> {
        self.inputs[input.index()].hpd_enabled = enabled;
        self.record(BoardEvent::Hpd { input, enabled });
        Ok(())
    }

    fn set_input_debug(&mut self, input: InputChannel, enabled: bool) -> Result<()> {
        self.inputs[input.index()].debug = enabled;
        Ok(())
    }
}

impl DisplayService for SimulatedBoard {
    fn output_enabled(&self, output: OutputChannel) -> Result<bool> {
        Ok(self.outputs[output.index()])
    }

    fn set_output_enabled(&mut self, output: OutputChannel, enabled: bool) -> Result<()> {
        self.outputs[output.index()] = enabled;
        self.record(BoardEvent::OutputEnable { output, enabled });
        Ok(())
    }

    fn edid_dump(&mut self, output: OutputChannel) -> Result<String> {
        Ok(format!(
            "{} EDID:\n00 ff ff ff ff ff ff 00 1e 6d 01 00 01 01 01 01",
            output.name()
        ))
    }
}

impl PipelineService for SimulatedBoard {
    fn set_sink_source(&mut self, sink: Sink, source: Source) -> Result<()> {
        self.sources.insert(sink, source);
        self.record(BoardEvent::SinkSource { sink, source });
        Ok(())
    }

    fn resync(&mut self) -> Result<()> {
        self.record(BoardEvent::Resync);
        Ok(())
    }

    fn start(&mut self, timing: &VideoTiming) -> Result<()> {
        self.timing = Some(timing.clone());
        self.record(BoardEvent::Started(timing.clone()));
        Ok(())
    }
}

impl EncoderService for SimulatedBoard {
    fn set_encoder_enabled(&mut self, enabled: bool) -> Result<()> {
        self.encoder.enabled = enabled;
        Ok(())
    }

    fn set_encoder_quality(&mut self, quality: i32) -> Result<()> {
        self.encoder.quality = quality;
        Ok(())
    }

    fn set_encoder_fps(&mut self, fps: i32) -> Result<()> {
        self.encoder.fps = fps;
        Ok(())
    }

    fn encoder_bandwidth_bytes(&self) -> Result<u64> {
        Ok(self.encoder.bandwidth_bytes)
    }

    fn clear_encoder_bandwidth(&mut self) -> Result<()> {
        self.encoder.bandwidth_bytes = 0;
        Ok(())
    }
}

impl SdramService for SimulatedBoard {
    fn latch_bandwidth(&mut self) -> Result<()> {
        self.sdram_latched = std::mem::take(&mut self.sdram_running);
        Ok(())
    }

    fn bandwidth_counts(&self) -> Result<BandwidthCounts> {
        Ok(self.sdram_latched)
    }
}

impl ClockService for SimulatedBoard {
    fn clock_frequency(&self) -> u32 {
        self.clock_hz
    }

    fn ticks(&self) -> u64 {
        match self.clock {
            SimClock::Wall(start) => {
                let nanos = start.elapsed().as_nanos() * u128::from(self.clock_hz);
                (nanos / 1_000_000_000) as u64
            },
            SimClock::Manual(now) => now,
        }
    }

    fn block_for(&mut self, duration: Duration) {
        self.record(BoardEvent::Blocked(duration));
        match &mut self.clock {
            SimClock::Wall(_) => std::thread::sleep(duration),
            SimClock::Manual(now) => {
                let ticks = duration.as_nanos() * u128::from(self.clock_hz) / 1_000_000_000;
                *now += ticks as u64;
            },
        }
    }
}

impl ConfigStore for SimulatedBoard {
    fn get(&self, key: ConfigKey) -> Result<Option<u32>> {
        Ok(self.store.get(&key).copied())
    }

    fn set(&mut self, key: ConfigKey, value: u32) -> Result<()> {
        log::debug!("config store: {key:?} = {value}");
        self.store.insert(key, value);
        Ok(())
    }
}

impl SystemService for SimulatedBoard {
    fn set_heartbeat(&mut self, enabled: bool) -> Result<()> {
        self.heartbeat = enabled;
        self.record(BoardEvent::Heartbeat(enabled));
        Ok(())
    }

    fn version_info(&self) -> Result<String> {
        Ok(format!(
            "hdmi2usb firmware {} (simulated)\ngateware: simulated board @ {} Hz",
            env!("CARGO_PKG_VERSION"),
            self.clock_hz
        ))
    }

    fn board_dna(&self) -> Result<String> {
        Ok("Board's DNA: 0000000000000000".to_string())
    }

    fn pll_dump(&self) -> Result<String> {
        Ok("pll: simulated, no DRP registers".to_string())
    }

    fn eeprom_dump(&mut self, eeprom: Eeprom) -> Result<String> {
        match eeprom {
            Eeprom::Opsis => Ok("Opsis EEPROM: blank".to_string()),
            Eeprom::Tofe if self.tofe_fault => {
                Err(H2uError::Hardware("TOFE EEPROM did not ACK".into()))
            },
            Eeprom::Tofe => Ok("TOFE EEPROM: blank".to_string()),
        }
    }

    fn fx2_reboot(&mut self, firmware: Fx2Firmware) -> Result<String> {
        self.record(BoardEvent::Fx2Reboot(firmware));
        Ok(format!("FX2 rebooted into {firmware:?}"))
    }

    fn fx2_debug(&self) -> Result<String> {
        Ok("FX2: reset released, boot source EEPROM".to_string())
    }
}

impl CasService for SimulatedBoard {
    fn write_leds(&mut self, value: u32) -> Result<()> {
        self.leds = value;
        Ok(())
    }

    fn read_switches(&self) -> Result<u32> {
        Ok(self.switches)
    }

    fn button_events(&self) -> Result<ButtonEvents> {
        Ok(self.buttons)
    }

    fn clear_button_events(&mut self, mask: u32) -> Result<()> {
        self.buttons.pending &= !mask;
        Ok(())
    }
}

impl Board for SimulatedBoard {}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> SimulatedBoard {
        SimulatedBoard::with_manual_clock(&BoardConfig::default())
    }

    #[test]
    fn manual_clock_only_moves_when_told() {
        let mut b = board();
        assert_eq!(b.ticks(), 0);
        b.advance_ticks(42);
        assert_eq!(b.ticks(), 42);
    }

    #[test]
    fn reboot_keeps_only_the_config_store() {
        let mut b = board();
        b.set(ConfigKey::Resolution, 3).unwrap();
        b.set_heartbeat(true).unwrap();
        b.advance_ticks(7);
        let b = b.rebooted();
        assert_eq!(b.get(ConfigKey::Resolution).unwrap(), Some(3));
        assert!(!b.heartbeat());
        assert!(b.events().is_empty());
        assert_eq!(b.ticks(), 7);
    }

    #[test]
    fn block_for_advances_manual_clock() {
        let mut b = board();
        b.block_for(Duration::from_millis(10));
        assert_eq!(b.ticks(), 1_000_000);
        assert_eq!(b.events(), &[BoardEvent::Blocked(Duration::from_millis(10))]);
    }

    #[test]
    fn sdram_latch_resets_running_counts() {
        let mut b = board();
        b.add_sdram_traffic(10, 20);
        b.latch_bandwidth().unwrap();
        assert_eq!(
            b.bandwidth_counts().unwrap(),
            BandwidthCounts {
                reads: 10,
                writes: 20
            }
        );
        b.latch_bandwidth().unwrap();
        assert_eq!(b.bandwidth_counts().unwrap(), BandwidthCounts::default());
    }

    #[test]
    fn buttons_clear_only_masked_pending() {
        let mut b = board();
        b.press_buttons(0b101);
        b.clear_button_events(0b001).unwrap();
        let ev = b.button_events().unwrap();
        assert_eq!(ev.status, 0b101);
        assert_eq!(ev.pending, 0b100);
    }

    #[test]
    fn config_store_roundtrip() {
        let mut b = board();
        assert_eq!(b.get(ConfigKey::Resolution).unwrap(), None);
        b.set(ConfigKey::Resolution, 3).unwrap();
        assert_eq!(b.get(ConfigKey::Resolution).unwrap(), Some(3));
    }

    #[test]
    fn tofe_eeprom_fails_only_when_faulted() {
        let mut b = board();
        assert_eq!(b.eeprom_dump(Eeprom::Tofe).unwrap(), "TOFE EEPROM: blank");
        b.set_tofe_fault(true);
        assert!(b.eeprom_dump(Eeprom::Tofe).is_err());
        assert!(b.eeprom_dump(Eeprom::Opsis).is_ok());
    }

    #[test]
    fn event_log_is_bounded() {
        let mut b = board();
        for i in 0..EVENT_LOG_CAP * 3 {
            b.set_heartbeat(i % 2 == 0).unwrap();
        }
        assert!(b.events().len() <= EVENT_LOG_CAP);
        assert_eq!(b.events().last(), Some(&BoardEvent::Heartbeat(false)));
    }
}
