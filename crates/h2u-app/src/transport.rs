//! Byte transport between the host terminal and the console.
//!
//! A reader thread blocks on stdin and forwards bytes over a channel so the
//! super-loop can poll for input without blocking.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use h2u_platform::ConsoleIo;

pub struct StdioConsole {
    rx: Receiver<u8>,
    out: io::Stdout,
    closed: bool,
}

impl StdioConsole {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for byte in stdin.lock().bytes() {
                let Ok(byte) = byte else { break };
                if tx.send(byte).is_err() {
                    break;
                }
            }
            log::debug!("stdin reader finished");
        });
        Self {
            rx,
            out: io::stdout(),
            closed: false,
        }
    }

    /// True once stdin has reached end of file and every byte was consumed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ConsoleIo for StdioConsole {
    fn read_byte(&mut self) -> Option<u8> {
        match self.rx.try_recv() {
            Ok(byte) => Some(byte),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            },
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
            log::warn!("console write failed: {e}");
        }
    }
}
