//! Control-and-status block: LEDs, switches, buttons.

use h2u_platform::{ButtonEvents, CasService};
use h2u_types::error::Result;

/// Write the LED register. The value is truncated to the register width,
/// not range checked.
pub fn set_leds<C: CasService + ?Sized>(value: i64, cas: &mut C) -> Result<()> {
    cas.write_leds(value as u32)?;
    log::debug!("CAS leds = {:#x}", value as u32);
    Ok(())
}

pub fn read_switches<C: CasService + ?Sized>(cas: &C) -> Result<u32> {
    cas.read_switches()
}

/// Read button status and pending events. When `clear` is set, the pending
/// events just read are acknowledged; the returned snapshot is the state
/// before clearing.
pub fn read_buttons<C: CasService + ?Sized>(clear: bool, cas: &mut C) -> Result<ButtonEvents> {
    let events = cas.button_events()?;
    if clear {
        cas.clear_button_events(events.pending)?;
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use h2u_platform::SimulatedBoard;
    use h2u_types::config::BoardConfig;

    fn board() -> SimulatedBoard {
        SimulatedBoard::with_manual_clock(&BoardConfig::default())
    }

    #[test]
    fn leds_take_raw_value() {
        let mut b = board();
        set_leds(0x1f, &mut b).unwrap();
        assert_eq!(b.leds(), 0x1f);
        set_leds(-1, &mut b).unwrap();
        assert_eq!(b.leds(), u32::MAX);
    }

    #[test]
    fn switches_read_through() {
        let mut b = board();
        b.set_switches(0xA5);
        assert_eq!(read_switches(&b).unwrap(), 0xA5);
    }

    #[test]
    fn buttons_read_without_clear_keeps_pending() {
        let mut b = board();
        b.press_buttons(0b11);
        let first = read_buttons(false, &mut b).unwrap();
        let second = read_buttons(false, &mut b).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.pending, 0b11);
    }

    #[test]
    fn buttons_clear_acknowledges_what_was_read() {
        let mut b = board();
        b.press_buttons(0b10);
        let read = read_buttons(true, &mut b).unwrap();
        assert_eq!(read.pending, 0b10);
        let after = read_buttons(false, &mut b).unwrap();
        assert_eq!(after.pending, 0);
        assert_eq!(after.status, 0b10);
    }
}
