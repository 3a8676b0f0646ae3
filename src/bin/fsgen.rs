//! Offline generator: mirrors a real directory tree into the honeypot's
//! YAML filesystem config, printed to stdout.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use honeyshell::fs::{DirSpec, FileSpec, FilesystemConfig};

#[derive(Parser, Debug)]
#[command(name = "fsgen", about = "Mirror a directory into a honeypot filesystem config")]
struct Args {
    /// Directory to mirror
    #[arg(long)]
    source_path: std::path::PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let root = mirror_dir(&args.source_path)?;
    let config = FilesystemConfig { root };
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn mirror_dir(path: &Path) -> Result<DirSpec> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut spec = DirSpec {
        name,
        ..Default::default()
    };

    let mut entries: Vec<_> = fs::read_dir(path)
        .with_context(|| format!("Error reading directory {}", path.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let entry_path = entry.path();
        if entry_path.is_dir() {
            spec.subdirs.push(mirror_dir(&entry_path)?);
        } else {
            let content = fs::read(&entry_path)
                .with_context(|| format!("Error reading file {}", entry_path.display()))?;
            spec.files.push(FileSpec {
                name: entry.file_name().to_string_lossy().into_owned(),
                content: String::from_utf8_lossy(&content).into_owned(),
            });
        }
    }
    Ok(spec)
}
