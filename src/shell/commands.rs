use crate::fs::Fs;
use crate::session::SessionState;

/// Result of interpreting one submitted line. `Exit` is acted on by the
/// session driver (logout event, channel close); everything else is text
/// written back before the next prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Output(String),
    Exit,
}

/// Interpret a submitted line: everything up to the first space is the
/// command, the remainder (one leading space stripped) its arguments.
pub fn run(fs: &Fs, state: &mut SessionState, username: &str, line: &str) -> CommandOutcome {
    let (name, args) = match line.split_once(' ') {
        Some((name, rest)) => (name, rest),
        None => (line, ""),
    };

    if name.is_empty() || name.starts_with('#') {
        return CommandOutcome::Output(String::new());
    }

    let output = match name {
        "ls" => ls(fs, state, args),
        "cd" => cd(fs, state, args),
        "cat" => cat(fs, state, args),
        "pwd" => format!("{}\n", fs.path(state.cwd)),
        "whoami" => format!("{}\n", username),
        "clear" => crate::ansi::CLEAR_SCREEN.to_string(),
        "exit" => return CommandOutcome::Exit,
        _ => format!("command not found: {}\n", line),
    };
    CommandOutcome::Output(output)
}

// ls accumulates failures first, then listings, like the real tool run over
// several operands.
fn ls(fs: &Fs, state: &SessionState, args: &str) -> String {
    let trimmed = args.trim_matches(' ');
    if trimmed.is_empty() {
        return format!("{}\n", fs.describe(state.cwd));
    }

    let mut errors = String::new();
    let mut listings = String::new();
    for part in trimmed.split(' ').filter(|p| !p.is_empty()) {
        match fs.resolve(state.cwd, part) {
            Ok(node) => {
                listings.push_str(&fs.describe(node));
                listings.push('\n');
            }
            Err(err) => errors.push_str(&format!("ls: {}\n", err)),
        }
    }
    errors + &listings
}

fn cd(fs: &Fs, state: &mut SessionState, args: &str) -> String {
    let trimmed = args.trim_matches(' ');
    let path = if trimmed.is_empty() { "/" } else { trimmed };
    match fs.resolve(state.cwd, path).and_then(|node| fs.try_cd(node)) {
        Ok(dir) => {
            state.cwd = dir;
            String::new()
        }
        Err(err) => format!("Error: {}\n", err),
    }
}

fn cat(fs: &Fs, state: &SessionState, args: &str) -> String {
    let trimmed = args.trim_matches(' ');
    let mut errors = String::new();
    let mut contents = String::new();
    for part in trimmed.split(' ').filter(|p| !p.is_empty()) {
        match fs
            .resolve(state.cwd, part)
            .and_then(|node| fs.try_cat(node).map(str::to_owned))
        {
            Ok(content) => contents.push_str(&content),
            Err(err) => errors.push_str(&format!("cat: {}\n", err)),
        }
    }
    errors + &contents
}
