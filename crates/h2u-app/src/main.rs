//! HDMI2USB console desktop entry point.
//!
//! Runs the control plane against a simulated board, with the serial
//! console mapped onto stdin/stdout. Diagnostics go to stderr.

mod transport;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use h2u_console::{Console, Signal};
use h2u_core::ControlPlane;
use h2u_platform::{ConsoleIo, SimulatedBoard};
use h2u_types::config::BoardConfig;

use transport::StdioConsole;

const IDLE_SLEEP: Duration = Duration::from_millis(1);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Board description from CLI arg, H2U_BOARD env var, or built-in defaults.
    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("H2U_BOARD").ok())
    {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = BoardConfig::load(&path)
                .with_context(|| format!("loading board config {}", path.display()))?;
            log::info!("Loaded board config {}", path.display());
            config
        },
        None => BoardConfig::default(),
    };
    log::info!(
        "Starting HDMI2USB console ({} capabilities, {} video modes)",
        config.capabilities.to_set().len(),
        config.modes.len(),
    );

    let mut board = SimulatedBoard::new(&config);
    let mut io = StdioConsole::spawn();

    // Each pass is one boot: everything but the persisted settings is rebuilt.
    loop {
        let mut plane = ControlPlane::new(&config, &mut board)?;
        let mut console = Console::for_plane(&plane, config.prompt.clone());
        console.start(&mut io);

        loop {
            match console.service(&mut io, &mut plane, &mut board) {
                Signal::Reboot => break,
                Signal::Continue => {},
            }
            if io.is_closed() {
                io.write_str("\r\n");
                log::info!("Input closed, shutting down");
                return Ok(());
            }
            std::thread::sleep(IDLE_SLEEP);
        }

        log::info!("Rebooting");
        board = board.rebooted();
    }
}
