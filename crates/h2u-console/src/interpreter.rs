//! Command trait, registry, tokenizer and dispatch.

use std::collections::HashMap;

use h2u_core::ControlPlane;
use h2u_platform::Board;
use h2u_types::error::Result;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Text lines, `\n` separated, without the final line break.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to the super-loop to restart the firmware.
    Reboot,
}

impl CommandOutput {
    pub(crate) fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text: Vec<String> = lines.into_iter().map(|l| l.as_ref().to_string()).collect();
        if text.is_empty() {
            Self::None
        } else {
            Self::Text(text.join("\n"))
        }
    }
}

/// Mutable state handed to every command.
pub struct Environment<'a> {
    pub plane: &'a mut ControlPlane,
    pub board: &'a mut dyn Board,
}

/// A command family selected by the first token of a line.
pub trait Command {
    /// Primary name.
    fn name(&self) -> &str;

    /// Single-letter alias, if the family has one.
    fn alias(&self) -> Option<&str> {
        None
    }

    /// Help block shown by `help` and on unknown sub-commands.
    fn usage(&self) -> &str;

    /// `general` commands are listed as one-liners at the top of `help`;
    /// every other category gets its own block.
    fn category(&self) -> &str {
        "general"
    }

    /// Whether `help <name>` shows this block on its own.
    fn help_topic(&self) -> bool {
        self.category() != "general"
    }

    /// Run the command. `args` is positioned after the command token.
    fn execute(&self, args: &mut Tokens<'_>, env: &mut Environment<'_>) -> Result<CommandOutput>;
}

const HELP_USAGE: &str = "help                             - this command";

/// Ordered table of commands, addressable by name or alias.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    names: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Replaces any existing command with the same name
    /// and keeps its position in the help listing.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let slot = match self.names.get(cmd.name()) {
            Some(&i) => {
                self.names.retain(|_, idx| *idx != i);
                self.commands[i] = cmd;
                i
            },
            None => {
                self.commands.push(cmd);
                self.commands.len() - 1
            },
        };
        let cmd = &self.commands[slot];
        self.names.insert(cmd.name().to_string(), slot);
        if let Some(alias) = cmd.alias() {
            self.names.insert(alias.to_string(), slot);
        }
    }

    /// Resolve a name or alias.
    pub fn lookup(&self, token: &str) -> Option<&dyn Command> {
        self.names.get(token).map(|&i| self.commands[i].as_ref())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Dispatch one completed line.
    ///
    /// Returns `Ok(None)` when the first token matches no command; the
    /// caller decides what the default action is.
    pub fn execute(&self, line: &str, env: &mut Environment<'_>) -> Result<Option<CommandOutput>> {
        let mut tokens = Tokens::new(line);
        let name = tokens.next_token();

        // `help` needs the registry itself.
        if name == "help" {
            return Ok(Some(CommandOutput::Text(self.help_text(tokens.next_token()))));
        }

        match self.lookup(name) {
            Some(cmd) => {
                log::debug!("dispatch {} ({line:?})", cmd.name());
                cmd.execute(&mut tokens, env).map(Some)
            },
            None => Ok(None),
        }
    }

    /// `help [family]` text. Unknown topics get the full listing.
    pub fn help_text(&self, topic: &str) -> String {
        let mut out = String::from("Available commands:\n");
        let family = self
            .commands
            .iter()
            .find(|c| c.help_topic() && c.name() == topic);
        match family {
            Some(cmd) => out.push_str(cmd.usage()),
            None => {
                out.push_str(HELP_USAGE);
                for cmd in self.commands.iter().filter(|c| c.category() == "general") {
                    out.push('\n');
                    out.push_str(cmd.usage());
                }
                for cmd in self.commands.iter().filter(|c| c.category() != "general") {
                    out.push_str("\n\n");
                    out.push_str(cmd.usage());
                }
            },
        }
        out.push('\n');
        out
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Space-separated tokens of one line, consumed left to right.
///
/// Every single space is a separator, so two adjacent spaces yield an empty
/// token. Once the line is used up, `next_token` keeps returning `""`,
/// which commands treat as a missing argument.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    pub fn next_token(&mut self) -> &'a str {
        match self.rest.split_once(' ') {
            Some((token, rest)) => {
                self.rest = rest;
                token
            },
            None => std::mem::take(&mut self.rest),
        }
    }

    /// Unconsumed remainder of the line.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

/// Parse a leading decimal integer the lenient way: optional whitespace and
/// sign, then digits up to the first non-digit. No digits parses as 0;
/// overflow saturates.
pub fn parse_int(token: &str) -> i32 {
    let s = token.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use h2u_platform::SimulatedBoard;
    use h2u_types::config::BoardConfig;

    struct EchoCmd;
    impl Command for EchoCmd {
        fn name(&self) -> &str {
            "echo"
        }
        fn alias(&self) -> Option<&str> {
            Some("E")
        }
        fn usage(&self) -> &str {
            "echo commands (alias: 'E')\n  echo <text>"
        }
        fn category(&self) -> &str {
            "test"
        }
        fn execute(&self, args: &mut Tokens<'_>, _env: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Text(args.remainder().to_string()))
        }
    }

    struct NopCmd(&'static str);
    impl Command for NopCmd {
        fn name(&self) -> &str {
            self.0
        }
        fn usage(&self) -> &str {
            "nop"
        }
        fn execute(&self, _: &mut Tokens<'_>, _: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::None)
        }
    }

    fn with_env<R>(f: impl FnOnce(&mut Environment<'_>) -> R) -> R {
        let config = BoardConfig::default();
        let mut board = SimulatedBoard::with_manual_clock(&config);
        let mut plane = ControlPlane::new(&config, &mut board).unwrap();
        let mut env = Environment {
            plane: &mut plane,
            board: &mut board,
        };
        f(&mut env)
    }

    #[test]
    fn tokens_split_on_single_spaces() {
        let mut t = Tokens::new("x c input0 output0");
        assert_eq!(t.next_token(), "x");
        assert_eq!(t.next_token(), "c");
        assert_eq!(t.next_token(), "input0");
        assert_eq!(t.next_token(), "output0");
        assert_eq!(t.next_token(), "");
        assert_eq!(t.next_token(), "");
    }

    #[test]
    fn tokens_keep_empty_fields() {
        let mut t = Tokens::new("a  b ");
        assert_eq!(t.next_token(), "a");
        assert_eq!(t.next_token(), "");
        assert_eq!(t.next_token(), "b");
        assert_eq!(t.next_token(), "");
        assert_eq!(t.remainder(), "");
    }

    #[test]
    fn empty_line_has_empty_first_token() {
        assert_eq!(Tokens::new("").next_token(), "");
    }

    #[test]
    fn parse_int_is_lenient() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("-7"), -7);
        assert_eq!(parse_int("+3"), 3);
        assert_eq!(parse_int("  12abc"), 12);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("-"), 0);
        assert_eq!(parse_int("99999999999"), i32::MAX);
        assert_eq!(parse_int("-99999999999"), i32::MIN);
    }

    #[test]
    fn lookup_by_name_and_alias() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd));
        assert!(reg.lookup("echo").is_some());
        assert!(reg.lookup("E").is_some());
        assert!(reg.lookup("e").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn execute_passes_remaining_tokens() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd));
        with_env(|env| {
            let out = reg.execute("E hello world", env).unwrap();
            assert_eq!(out, Some(CommandOutput::Text("hello world".into())));
        });
    }

    #[test]
    fn unknown_command_is_not_an_error() {
        let reg = CommandRegistry::new();
        with_env(|env| {
            assert_eq!(reg.execute("bogus", env).unwrap(), None);
            assert_eq!(reg.execute("", env).unwrap(), None);
        });
    }

    #[test]
    fn register_replaces_existing_command() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd));
        reg.register(Box::new(NopCmd("version")));
        reg.register(Box::new(NopCmd("echo")));
        assert_eq!(reg.len(), 2);
        assert!(reg.lookup("E").is_none(), "stale alias removed");
        with_env(|env| {
            assert_eq!(reg.execute("echo hi", env).unwrap(), Some(CommandOutput::None));
        });
    }

    #[test]
    fn help_listing_layout() {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(NopCmd("version")));
        reg.register(Box::new(EchoCmd));
        let full = reg.help_text("");
        assert_eq!(
            full,
            "Available commands:\n\
             help                             - this command\n\
             nop\n\
             \n\
             echo commands (alias: 'E')\n  echo <text>\n"
        );
        assert_eq!(
            reg.help_text("echo"),
            "Available commands:\necho commands (alias: 'E')\n  echo <text>\n"
        );
        // Aliases and general commands are not help topics.
        assert_eq!(reg.help_text("E"), full);
        assert_eq!(reg.help_text("version"), full);
    }

    #[test]
    fn output_from_lines() {
        assert_eq!(CommandOutput::lines(Vec::<String>::new()), CommandOutput::None);
        assert_eq!(
            CommandOutput::lines(["a", "b"]),
            CommandOutput::Text("a\nb".into())
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tokens_roundtrip_joined_words(words in prop::collection::vec("[a-z0-9?]{0,8}", 1..6)) {
                let line = words.join(" ");
                let mut t = Tokens::new(&line);
                for w in &words {
                    prop_assert_eq!(t.next_token(), w.as_str());
                }
                prop_assert_eq!(t.next_token(), "");
            }

            #[test]
            fn parse_int_reads_any_i32(n in any::<i32>(), tail in "[a-z ]{0,4}") {
                prop_assert_eq!(parse_int(&format!("{n}{tail}")), n);
            }
        }
    }
}
