//! JPEG encoder control.

use h2u_platform::EncoderService;
use h2u_types::config::EncoderDefaults;
use h2u_types::error::Result;

/// Encoder settings as last written by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderState {
    pub enabled: bool,
    pub quality: i32,
    pub fps: i32,
}

/// Owns [`EncoderState`] and mirrors every change to the hardware.
///
/// Quality and frame rate are not range-checked here; the encoder block
/// clamps or rejects what it cannot do.
#[derive(Debug, Clone)]
pub struct EncoderController {
    state: EncoderState,
}

impl EncoderController {
    pub fn new(defaults: &EncoderDefaults) -> Self {
        Self {
            state: EncoderState {
                enabled: false,
                quality: defaults.quality,
                fps: defaults.fps,
            },
        }
    }

    pub fn state(&self) -> &EncoderState {
        &self.state
    }

    /// Write the full state to the hardware (startup).
    pub fn program<E: EncoderService + ?Sized>(&self, hw: &mut E) -> Result<()> {
        hw.set_encoder_quality(self.state.quality)?;
        hw.set_encoder_fps(self.state.fps)?;
        hw.set_encoder_enabled(self.state.enabled)
    }

    /// Enable the encoder and start a fresh bandwidth window.
    pub fn enable<E: EncoderService + ?Sized>(&mut self, hw: &mut E) -> Result<()> {
        hw.set_encoder_enabled(true)?;
        self.state.enabled = true;
        hw.clear_encoder_bandwidth()?;
        log::info!("Encoder enabled (q {}, {} fps)", self.state.quality, self.state.fps);
        Ok(())
    }

    pub fn disable<E: EncoderService + ?Sized>(&mut self, hw: &mut E) -> Result<()> {
        hw.set_encoder_enabled(false)?;
        self.state.enabled = false;
        log::info!("Encoder disabled");
        Ok(())
    }

    pub fn set_quality<E: EncoderService + ?Sized>(&mut self, quality: i32, hw: &mut E) -> Result<()> {
        hw.set_encoder_quality(quality)?;
        self.state.quality = quality;
        Ok(())
    }

    pub fn set_fps<E: EncoderService + ?Sized>(&mut self, fps: i32, hw: &mut E) -> Result<()> {
        hw.set_encoder_fps(fps)?;
        self.state.fps = fps;
        Ok(())
    }

    /// Zero the cumulative bandwidth counter.
    pub fn reset_bandwidth<E: EncoderService + ?Sized>(&self, hw: &mut E) -> Result<()> {
        hw.clear_encoder_bandwidth()
    }

    /// Read the bandwidth counter as whole Mbit, then clear it.
    pub fn take_bandwidth_mbps<E: EncoderService + ?Sized>(&self, hw: &mut E) -> Result<u64> {
        let bytes = hw.encoder_bandwidth_bytes()?;
        hw.clear_encoder_bandwidth()?;
        Ok(bytes * 8 / 1_000_000)
    }
}
