use crate::fs::{Fs, NodeId};

/// Built-ins offered to first-token completion.
pub const COMMANDS: [&str; 7] = ["cat", "cd", "clear", "exit", "ls", "pwd", "whoami"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No candidates; leave the line alone.
    None,
    /// Single candidate: the suffix to append after what was typed.
    Append(String),
    /// Multiple candidates: the listing to print before repopulating the
    /// prompt and the untouched line.
    List(String),
}

/// Complete the line under the cursor. A lone token completes against the
/// command list; anything after a space completes against filesystem entries
/// relative to `cwd` (or the root when the token starts with `/`).
pub fn complete(fs: &Fs, cwd: NodeId, line: &str) -> Completion {
    let tokens: Vec<&str> = line.split(' ').collect();
    match tokens.as_slice() {
        [only] => complete_command(only),
        [.., last] => complete_path(fs, cwd, last),
        [] => Completion::None,
    }
}

fn complete_command(partial: &str) -> Completion {
    let matches: Vec<&str> = COMMANDS
        .iter()
        .copied()
        .filter(|cmd| cmd.starts_with(partial))
        .collect();
    match matches.as_slice() {
        [] => Completion::None,
        [only] => Completion::Append(format!("{} ", &only[partial.len()..])),
        many => Completion::List(many.join("  ")),
    }
}

fn complete_path(fs: &Fs, cwd: NodeId, partial: &str) -> Completion {
    // Everything up to the last slash locates the directory to search in;
    // the remainder is the segment being completed.
    let (dir_part, segment) = match partial.rsplit_once('/') {
        Some(("", seg)) => ("/", seg),
        Some((dir, seg)) => (dir, seg),
        None => ("", partial),
    };

    let dir = match fs.resolve(cwd, dir_part) {
        Ok(node) if fs.is_dir(node) => node,
        _ => return Completion::None,
    };

    let mut matches: Vec<NodeId> = fs
        .children(dir)
        .iter()
        .copied()
        .filter(|&c| fs.tab_complete_name(c).starts_with(segment))
        .collect();
    matches.sort_by(|&a, &b| fs.plain_name(a).cmp(fs.plain_name(b)));

    match matches.as_slice() {
        [] => Completion::None,
        [only] => Completion::Append(fs.tab_complete_name(*only)[segment.len()..].to_string()),
        many => Completion::List(
            many.iter()
                .map(|&c| fs.describe_self(c))
                .collect::<Vec<_>>()
                .join("  "),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;
    use crate::fs::test_fixtures::sample_fs;

    #[test]
    fn test_single_command_candidate_appends_suffix() {
        let fs = sample_fs();
        assert_eq!(
            complete(&fs, fs.root(), "wh"),
            Completion::Append("oami ".to_string())
        );
    }

    #[test]
    fn test_ambiguous_commands_listed() {
        let fs = sample_fs();
        // "c" matches cat, cd, clear.
        assert_eq!(
            complete(&fs, fs.root(), "c"),
            Completion::List("cat  cd  clear".to_string())
        );
    }

    #[test]
    fn test_empty_line_lists_all_commands() {
        let fs = sample_fs();
        assert_eq!(
            complete(&fs, fs.root(), ""),
            Completion::List("cat  cd  clear  exit  ls  pwd  whoami".to_string())
        );
    }

    #[test]
    fn test_path_disambiguation_lists_describe_self() {
        let fs = sample_fs();
        // `cd h` at / matches home/ and hosts: directory rendered bold blue.
        let expected = format!("{}home{}  hosts", ansi::BOLD_BLUE, ansi::RESET);
        assert_eq!(complete(&fs, fs.root(), "cd h"), Completion::List(expected));
    }

    #[test]
    fn test_unique_directory_appends_slash_suffix() {
        let fs = sample_fs();
        assert_eq!(
            complete(&fs, fs.root(), "cd e"),
            Completion::Append("tc/".to_string())
        );
    }

    #[test]
    fn test_unique_file_appends_space_suffix() {
        let fs = sample_fs();
        assert_eq!(
            complete(&fs, fs.root(), "cat /etc/hos"),
            Completion::Append("tname ".to_string())
        );
    }

    #[test]
    fn test_absolute_prefix_starts_from_root() {
        let fs = sample_fs();
        let etc = fs.resolve(fs.root(), "/etc").unwrap();
        // cwd /etc, token /ho — candidates come from the root, not cwd.
        let expected = format!("{}home{}  hosts", ansi::BOLD_BLUE, ansi::RESET);
        assert_eq!(complete(&fs, etc, "ls /ho"), Completion::List(expected));
    }

    #[test]
    fn test_empty_segment_lists_whole_directory() {
        let fs = sample_fs();
        assert_eq!(
            complete(&fs, fs.root(), "cat /home/ubuntu/"),
            Completion::Append("notes.txt ".to_string())
        );
    }

    #[test]
    fn test_no_candidates() {
        let fs = sample_fs();
        assert_eq!(complete(&fs, fs.root(), "cat zzz"), Completion::None);
        assert_eq!(complete(&fs, fs.root(), "xyz"), Completion::None);
    }

    #[test]
    fn test_prefix_through_missing_directory() {
        let fs = sample_fs();
        assert_eq!(complete(&fs, fs.root(), "cat /nope/fi"), Completion::None);
    }
}
