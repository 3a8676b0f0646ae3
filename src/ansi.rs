//! ANSI escape sequences used for attacker-facing output. Colors are
//! emitted unconditionally, with no TTY detection.

pub const RESET: &str = "\x1b[0m";

/// Bold blue, the `ls` rendering for directories.
pub const BOLD_BLUE: &str = "\x1b[1;34m";

pub const BRIGHT_GREEN: &str = "\x1b[92m";
pub const BRIGHT_BLUE: &str = "\x1b[94m";
pub const WHITE: &str = "\x1b[37m";

/// Full terminal reset, what `clear` prints.
pub const CLEAR_SCREEN: &str = "\x1bc";
