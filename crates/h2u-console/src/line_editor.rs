//! Echoing line buffer with destructive backspace.

use h2u_platform::ConsoleIo;

/// Size of the line buffer, terminator included.
pub const LINE_CAPACITY: usize = 64;

const BELL: u8 = 0x07;
const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

/// Accumulates one line of input, one byte per call.
#[derive(Debug, Default)]
pub struct LineEditor {
    buf: Vec<u8>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently buffered.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Consume one byte, echoing to `io`. Returns the completed line on CR
    /// or LF, with invalid UTF-8 replaced.
    ///
    /// Bytes beyond `LINE_CAPACITY - 1` are dropped without echo.
    pub fn feed(&mut self, byte: u8, io: &mut dyn ConsoleIo) -> Option<String> {
        match byte {
            DELETE | BACKSPACE => {
                if self.buf.pop().is_some() {
                    io.write_str("\x08 \x08");
                }
                None
            },
            BELL => None,
            b'\r' | b'\n' => {
                io.write_str("\r\n");
                let line = std::mem::take(&mut self.buf);
                Some(String::from_utf8_lossy(&line).into_owned())
            },
            _ => {
                if self.buf.len() < LINE_CAPACITY - 1 {
                    self.buf.push(byte);
                    io.write_bytes(&[byte]);
                }
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h2u_platform::BufferedConsole;

    fn feed_all(ed: &mut LineEditor, io: &mut BufferedConsole, bytes: &[u8]) -> Vec<String> {
        bytes.iter().filter_map(|&b| ed.feed(b, io)).collect()
    }

    #[test]
    fn echoes_and_completes_on_cr() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        let lines = feed_all(&mut ed, &mut io, b"h on\r");
        assert_eq!(lines, vec!["h on".to_string()]);
        assert_eq!(io.take_output(), "h on\r\n");
        assert!(ed.pending().is_empty());
    }

    #[test]
    fn lf_also_terminates() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        assert_eq!(feed_all(&mut ed, &mut io, b"s\n"), vec!["s".to_string()]);
    }

    #[test]
    fn backspace_erases_visually() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        let lines = feed_all(&mut ed, &mut io, b"abx\x08c\x7f\x7fd\r");
        assert_eq!(lines, vec!["ad".to_string()]);
        assert_eq!(io.take_output(), "abx\x08 \x08c\x08 \x08\x08 \x08d\r\n");
    }

    #[test]
    fn backspace_on_empty_line_is_silent() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        feed_all(&mut ed, &mut io, b"\x08\x7f");
        assert_eq!(io.output(), "");
    }

    #[test]
    fn bell_is_ignored() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        let lines = feed_all(&mut ed, &mut io, b"a\x07b\r");
        assert_eq!(lines, vec!["ab".to_string()]);
        assert_eq!(io.take_output(), "ab\r\n");
    }

    #[test]
    fn overflow_is_dropped() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        let long = vec![b'x'; 100];
        feed_all(&mut ed, &mut io, &long);
        assert_eq!(ed.pending().len(), LINE_CAPACITY - 1);
        assert_eq!(io.output().len(), LINE_CAPACITY - 1);

        // Backspace frees a slot again.
        feed_all(&mut ed, &mut io, b"\x08yz");
        assert!(ed.pending().ends_with(b"y"));
        assert_eq!(ed.pending().len(), LINE_CAPACITY - 1);
    }

    #[test]
    fn high_bytes_take_one_slot_each() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        feed_all(&mut ed, &mut io, &[0xe9; 100]);
        assert_eq!(ed.pending().len(), LINE_CAPACITY - 1);
        assert_eq!(io.output_bytes(), &[0xe9; LINE_CAPACITY - 1][..]);

        let lines = feed_all(&mut ed, &mut io, b"\r");
        assert_eq!(lines[0].chars().count(), LINE_CAPACITY - 1);
    }

    #[test]
    fn empty_line_completes() {
        let mut ed = LineEditor::new();
        let mut io = BufferedConsole::new();
        assert_eq!(feed_all(&mut ed, &mut io, b"\r"), vec![String::new()]);
    }
}
