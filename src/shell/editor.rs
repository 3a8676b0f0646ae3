/// What a single input byte did to the line under construction. The session
/// driver owns all I/O and event emission; the editor only tracks the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Byte consumed with nothing to do (swallowed escape byte, backspace on
    /// an empty buffer, Ctrl-D mid-line).
    Pending,
    /// Byte appended to the buffer; echo it back verbatim.
    Echo(u8),
    /// Last byte dropped from the buffer; emit `\b \b`.
    Erase,
    /// Enter: the finished line, buffer cleared.
    Submit(String),
    /// Ctrl-C: the abandoned line with `^C` appended, buffer cleared.
    Interrupt(String),
    /// TAB: caller runs completion against the current line.
    Tab,
    /// Ctrl-L.
    ClearScreen,
    /// Ctrl-D on an empty buffer: log out.
    Eof,
}

/// Reassembles a command line from the raw byte stream of an SSH channel.
/// The stream is treated as bytes, not runes; multi-byte UTF-8 input simply
/// accumulates and echoes bytewise.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: Vec<u8>,
    /// Bytes left to swallow from an arrow-key escape sequence.
    esc_pending: u8,
}

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const TAB: u8 = 0x09;
const CTRL_L: u8 = 0x0c;
const ENTER: u8 = 0x0d;
const ESC: u8 = 0x1b;
const BACKSPACE: u8 = 0x7f;

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The line as typed so far, lossily decoded for completion and
    /// prompt repopulation.
    pub fn line(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append an accepted completion suffix, as if the attacker had typed it.
    pub fn append(&mut self, suffix: &str) {
        self.buffer.extend_from_slice(suffix.as_bytes());
    }

    fn take_line(&mut self) -> String {
        String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned()
    }

    pub fn feed(&mut self, byte: u8) -> InputEvent {
        if self.esc_pending > 0 {
            self.esc_pending -= 1;
            return InputEvent::Pending;
        }

        match byte {
            ESC => {
                // Arrow keys arrive as ESC [ A..D; no history support, so the
                // whole sequence is swallowed.
                self.esc_pending = 2;
                InputEvent::Pending
            }
            CTRL_D => {
                if self.buffer.is_empty() {
                    InputEvent::Eof
                } else {
                    InputEvent::Pending
                }
            }
            CTRL_L => InputEvent::ClearScreen,
            ENTER => InputEvent::Submit(self.take_line()),
            BACKSPACE => {
                if self.buffer.pop().is_some() {
                    InputEvent::Erase
                } else {
                    InputEvent::Pending
                }
            }
            TAB => InputEvent::Tab,
            CTRL_C => {
                self.buffer.extend_from_slice(b"^C");
                InputEvent::Interrupt(self.take_line())
            }
            other => {
                self.buffer.push(other);
                InputEvent::Echo(other)
            }
        }
    }
}
