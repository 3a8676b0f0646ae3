use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::tree::{Fs, Node, NodeId, NodeKind};

/// On-disk shape of the filesystem dump. Parent back-pointers are not
/// serialized; they fall out of arena construction at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    pub root: DirSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permissions: u32,
    #[serde(default)]
    pub subdirs: Vec<DirSpec>,
    #[serde(default)]
    pub files: Vec<FileSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSpec {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl FilesystemConfig {
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse filesystem config")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize filesystem config")
    }
}

impl Fs {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(Self::from_config(FilesystemConfig::parse(yaml)?))
    }

    pub fn from_config(config: FilesystemConfig) -> Self {
        let mut fs = Fs { nodes: Vec::new() };
        // Root first: its parent is its own id, the path-walk sentinel.
        fs.nodes.push(Node {
            name: config.root.name.clone(),
            parent: NodeId(0),
            kind: NodeKind::Dir {
                permissions: config.root.permissions,
                children: Vec::new(),
            },
        });
        fill_in(&mut fs, NodeId(0), &config.root);
        fs
    }
}

// Subdirectories are inserted before files, preserving config order within
// each; first-match lookups depend on that order.
fn fill_in(fs: &mut Fs, dir_id: NodeId, spec: &DirSpec) {
    let mut children = Vec::with_capacity(spec.subdirs.len() + spec.files.len());

    for sub in &spec.subdirs {
        let id = NodeId(fs.nodes.len());
        fs.nodes.push(Node {
            name: sub.name.clone(),
            parent: dir_id,
            kind: NodeKind::Dir {
                permissions: sub.permissions,
                children: Vec::new(),
            },
        });
        fill_in(fs, id, sub);
        children.push(id);
    }

    for file in &spec.files {
        let id = NodeId(fs.nodes.len());
        fs.nodes.push(Node {
            name: file.name.clone(),
            parent: dir_id,
            kind: NodeKind::File {
                content: file.content.clone(),
            },
        });
        children.push(id);
    }

    match &mut fs.nodes[dir_id.0].kind {
        NodeKind::Dir {
            children: slot, ..
        } => *slot = children,
        NodeKind::File { .. } => unreachable!("fill_in called on a file node"),
    }
}
