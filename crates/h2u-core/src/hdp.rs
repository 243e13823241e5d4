//! Hot-plug-detect pulse to make a source re-read our EDID.

use std::time::Duration;

use h2u_platform::{CaptureService, ClockService};
use h2u_types::capability::{Capability, CapabilitySet};
use h2u_types::error::Result;
use h2u_types::video::InputChannel;

/// How long HPD stays deasserted. The whole console is stalled meanwhile.
pub const HPD_DEASSERT_TIME: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdpOutcome {
    Toggled(InputChannel),
    Missing(Capability),
    /// The index names no capture input (the pattern generator, say).
    NotAnInput,
}

/// Pulse HPD low on capture input `index`.
pub fn hdp_toggle<B: CaptureService + ClockService + ?Sized>(
    caps: &CapabilitySet,
    index: i64,
    board: &mut B,
) -> Result<HdpOutcome> {
    let Some(input) = InputChannel::from_index(index) else {
        return Ok(HdpOutcome::NotAnInput);
    };
    if !caps.contains(input.capability()) {
        return Ok(HdpOutcome::Missing(input.capability()));
    }

    board.set_hpd_enabled(input, false)?;
    board.block_for(HPD_DEASSERT_TIME);
    board.set_hpd_enabled(input, true)?;
    log::info!("HPD pulsed on input{}", input.index());
    Ok(HdpOutcome::Toggled(input))
}
