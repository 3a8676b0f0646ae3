mod loader;
mod tree;

pub use loader::{DirSpec, FileSpec, FilesystemConfig};
pub use tree::{Fs, FsError, NodeId};
