use crate::ansi;

/// The `user@host:cwd$ ` prompt. Colors are always emitted.
pub fn render(user: &str, host: &str, cwd: &str) -> String {
    format!(
        "{green}{user}@{host}{reset}:{blue}{cwd}{reset}{white}$ {reset}",
        green = ansi::BRIGHT_GREEN,
        blue = ansi::BRIGHT_BLUE,
        white = ansi::WHITE,
        reset = ansi::RESET,
        user = user,
        host = host,
        cwd = cwd,
    )
}

/// Machine hostname, falling back to a plausible default when the lookup
/// fails. Also seeds the host-key derivation, so a given deployment keeps a
/// stable fingerprint.
pub fn hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "ubuntu".to_string())
}
