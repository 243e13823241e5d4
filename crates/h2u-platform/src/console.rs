//! Raw character transport used by the console.

use std::borrow::Cow;
use std::collections::VecDeque;

/// Byte-oriented, non-blocking console transport (UART on hardware).
pub trait ConsoleIo {
    /// Next received byte, or `None` if nothing is waiting.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write raw bytes to the terminal as-is.
    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_str(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
    }
}

/// In-memory transport: scripted input, captured output.
#[derive(Debug, Default)]
pub struct BufferedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if typed by the user.
    pub fn push_input(&mut self, text: &str) {
        self.input.extend(text.bytes());
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.input.push_back(byte);
    }

    /// Number of queued, unread input bytes.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Everything written so far, invalid UTF-8 replaced.
    pub fn output(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Return and clear everything written so far.
    pub fn take_output(&mut self) -> String {
        let bytes = std::mem::take(&mut self.output);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl ConsoleIo for BufferedConsole {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_fifo() {
        let mut io = BufferedConsole::new();
        io.push_input("ab");
        io.push_byte(b'\r');
        assert_eq!(io.pending_input(), 3);
        assert_eq!(io.read_byte(), Some(b'a'));
        assert_eq!(io.read_byte(), Some(b'b'));
        assert_eq!(io.read_byte(), Some(b'\r'));
        assert_eq!(io.read_byte(), None);
    }

    #[test]
    fn take_output_clears() {
        let mut io = BufferedConsole::new();
        io.write_str("hello");
        assert_eq!(io.take_output(), "hello");
        assert!(io.output().is_empty());
    }

    #[test]
    fn raw_bytes_are_kept_verbatim() {
        let mut io = BufferedConsole::new();
        io.write_bytes(&[0xe9, b'a']);
        assert_eq!(io.output_bytes(), &[0xe9, b'a']);
        assert_eq!(io.take_output(), "\u{fffd}a");
    }
}
