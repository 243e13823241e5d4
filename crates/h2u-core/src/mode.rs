//! Video mode selection.

use h2u_platform::{ConfigKey, ConfigStore, PipelineService};
use h2u_types::config::VideoTiming;
use h2u_types::error::Result;

/// Supported timings and the active one.
#[derive(Debug, Clone)]
pub struct ModeController {
    modes: Vec<VideoTiming>,
    active: usize,
}

impl ModeController {
    /// `modes` must not be empty (enforced by board config validation).
    pub fn new(modes: Vec<VideoTiming>) -> Self {
        Self { modes, active: 0 }
    }

    pub fn count(&self) -> usize {
        self.modes.len()
    }

    /// Descriptor strings tagged with their index. Can be called repeatedly.
    pub fn list_modes(&self) -> ModeList<'_> {
        ModeList {
            modes: &self.modes,
            next: 0,
        }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &VideoTiming {
        &self.modes[self.active]
    }

    /// Restore the persisted mode at startup, falling back to mode 0.
    pub fn restore<B: ConfigStore + PipelineService + ?Sized>(&mut self, board: &mut B) -> Result<()> {
        let index = match board.get(ConfigKey::Resolution)? {
            Some(stored) if (stored as usize) < self.count() => stored as usize,
            Some(stored) => {
                log::warn!("Persisted video mode {stored} out of range, using mode 0");
                0
            },
            None => 0,
        };
        self.activate(index, board)
    }

    /// Select mode `index`, persist it and activate it.
    ///
    /// Out-of-range indices (negative included) are ignored without any
    /// state change. Returns the new mode's descriptor on success.
    pub fn set_mode<B: ConfigStore + PipelineService + ?Sized>(
        &mut self,
        index: i64,
        board: &mut B,
    ) -> Result<Option<String>> {
        let Ok(index) = usize::try_from(index) else {
            return Ok(None);
        };
        if index >= self.count() {
            return Ok(None);
        }
        let descriptor = self.modes[index].descriptor();
        board.set(ConfigKey::Resolution, index as u32)?;
        self.activate(index, board)?;
        Ok(Some(descriptor))
    }

    fn activate<P: PipelineService + ?Sized>(&mut self, index: usize, pipeline: &mut P) -> Result<()> {
        pipeline.start(&self.modes[index])?;
        self.active = index;
        log::info!("Video mode {index}: {}", self.modes[index].descriptor());
        Ok(())
    }
}

/// Iterator over `(index, descriptor)` pairs.
#[derive(Debug, Clone)]
pub struct ModeList<'a> {
    modes: &'a [VideoTiming],
    next: usize,
}

impl Iterator for ModeList<'_> {
    type Item = (usize, String);

    fn next(&mut self) -> Option<Self::Item> {
        let timing = self.modes.get(self.next)?;
        let item = (self.next, timing.descriptor());
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.modes.len() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ModeList<'_> {}
