use crate::ansi;

/// Index of a node in the arena. The tree is immutable after load, so ids
/// stay valid for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("No subdir with name {0}")]
    NoSuchSubdir(String),
    #[error("cannot access '{0}': No such file or directory")]
    NotFound(String),
    #[error("bash: cd: {0}: Not a directory")]
    NotADirectory(String),
    #[error("{0}: Is a directory")]
    IsADirectory(String),
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Dir {
        permissions: u32,
        children: Vec<NodeId>,
    },
    File {
        content: String,
    },
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    /// The root's parent is the root itself; path construction terminates
    /// on `parent == self`.
    pub(crate) parent: NodeId,
    pub(crate) kind: NodeKind,
}

/// The fake filesystem: a rooted tree of directories and files, loaded once
/// from the config dump and shared read-only across all sessions.
#[derive(Debug)]
pub struct Fs {
    pub(crate) nodes: Vec<Node>,
}

impl Fs {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn is_dir(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Dir { .. })
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    pub fn plain_name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn permissions(&self, id: NodeId) -> u32 {
        match self.node(id).kind {
            NodeKind::Dir { permissions, .. } => permissions,
            NodeKind::File { .. } => 0,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Dir { children, .. } => children,
            NodeKind::File { .. } => &[],
        }
    }

    /// Child directory lookup by exact name, first match wins. `""` and `.`
    /// stay put, `..` moves to the parent (the root's parent is the root, so
    /// `/..` cannot escape).
    fn subdir(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match name {
            "" | "." => return Some(id),
            ".." => return Some(self.parent(id)),
            _ => {}
        }
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.is_dir(c) && self.node(c).name == name)
    }

    /// Child file lookup by exact name, first match wins.
    fn file(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| !self.is_dir(c) && self.node(c).name == name)
    }

    /// Resolve `path` starting from `cwd`. An empty path is the cwd itself;
    /// a leading slash restarts at the root; a trailing slash restricts the
    /// final segment to directories.
    pub fn resolve(&self, cwd: NodeId, path: &str) -> Result<NodeId, FsError> {
        if path.is_empty() {
            return Ok(cwd);
        }

        let parts: Vec<&str> = path.split('/').collect();
        let leading_slash = parts[0].is_empty();
        let trailing_slash = parts[parts.len() - 1].is_empty();

        let mut current = if leading_slash { self.root() } else { cwd };
        let last_index = parts.len() - 1;

        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let last_segment = i == last_index;

            if let Some(dir) = self.subdir(current, part) {
                current = dir;
                continue;
            }

            if !last_segment || trailing_slash {
                return Err(FsError::NoSuchSubdir(part.to_string()));
            }

            match self.file(current, part) {
                Some(file) => return Ok(file),
                None => return Err(FsError::NotFound(path.to_string())),
            }
        }

        Ok(current)
    }

    /// Absolute path of a node, built by walking parents up to the root.
    pub fn path(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.kind {
            NodeKind::Dir { .. } => self.dir_path(id, false),
            NodeKind::File { .. } => {
                format!("{}/{}", self.dir_path(node.parent, true), node.name)
            }
        }
    }

    // The below_root form omits the root's slash so joins never double it.
    fn dir_path(&self, id: NodeId, below_root: bool) -> String {
        let node = self.node(id);
        if node.parent == id {
            return if below_root { String::new() } else { "/".to_string() };
        }
        format!("{}/{}", self.dir_path(node.parent, true), node.name)
    }

    /// Human-facing rendering of the node itself: directories bold blue,
    /// files plain.
    pub fn describe_self(&self, id: NodeId) -> String {
        let node = self.node(id);
        if self.is_dir(id) {
            format!("{}{}{}", ansi::BOLD_BLUE, node.name, ansi::RESET)
        } else {
            node.name.clone()
        }
    }

    /// `ls`-style listing: a directory describes its children sorted by
    /// plain name and separated by two spaces; a file describes itself.
    pub fn describe(&self, id: NodeId) -> String {
        if !self.is_dir(id) {
            return self.describe_self(id);
        }
        let mut children: Vec<NodeId> = self.children(id).to_vec();
        children.sort_by(|&a, &b| self.plain_name(a).cmp(self.plain_name(b)));
        children
            .iter()
            .map(|&c| self.describe_self(c))
            .collect::<Vec<_>>()
            .join("  ")
    }

    /// Completion rendering: directories complete with a trailing `/`,
    /// files with a trailing space.
    pub fn tab_complete_name(&self, id: NodeId) -> String {
        let node = self.node(id);
        if self.is_dir(id) {
            format!("{}/", node.name)
        } else {
            format!("{} ", node.name)
        }
    }

    pub fn try_cd(&self, id: NodeId) -> Result<NodeId, FsError> {
        if self.is_dir(id) {
            Ok(id)
        } else {
            Err(FsError::NotADirectory(self.node(id).name.clone()))
        }
    }

    pub fn try_cat(&self, id: NodeId) -> Result<&str, FsError> {
        match &self.node(id).kind {
            NodeKind::File { content } => Ok(content),
            NodeKind::Dir { .. } => Err(FsError::IsADirectory(self.node(id).name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::test_fixtures::sample_fs;

    fn walk(fs: &Fs, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in fs.children(id) {
            walk(fs, child, out);
        }
    }

    #[test]
    fn test_root_identity() {
        let fs = sample_fs();
        assert_eq!(fs.parent(fs.root()), fs.root());
        assert_eq!(fs.path(fs.root()), "/");
    }

    #[test]
    fn test_path_roundtrip_every_node() {
        let fs = sample_fs();
        let mut nodes = Vec::new();
        walk(&fs, fs.root(), &mut nodes);
        assert!(nodes.len() > 5);
        for id in nodes {
            let path = fs.path(id);
            assert_eq!(fs.resolve(fs.root(), &path).unwrap(), id, "path {}", path);
        }
    }

    #[test]
    fn test_absolute_overrides_cwd() {
        let fs = sample_fs();
        let etc = fs.resolve(fs.root(), "/etc").unwrap();
        let home = fs.resolve(fs.root(), "/home").unwrap();
        assert_eq!(fs.resolve(etc, "/home").unwrap(), home);
        assert_eq!(
            fs.resolve(etc, "/home/ubuntu").unwrap(),
            fs.resolve(fs.root(), "/home/ubuntu").unwrap()
        );
    }

    #[test]
    fn test_dot_segments() {
        let fs = sample_fs();
        let home = fs.resolve(fs.root(), "/home").unwrap();
        let ubuntu = fs.resolve(fs.root(), "/home/ubuntu").unwrap();

        assert_eq!(fs.resolve(home, "./").unwrap(), home);
        assert_eq!(fs.resolve(fs.root(), "home/./ubuntu").unwrap(), ubuntu);
        assert_eq!(fs.resolve(fs.root(), "home/ubuntu/..").unwrap(), home);
        // No escaping above the root.
        assert_eq!(fs.resolve(fs.root(), "/..").unwrap(), fs.root());
        assert_eq!(fs.resolve(home, "../..").unwrap(), fs.root());
    }

    #[test]
    fn test_consecutive_slashes_skipped() {
        let fs = sample_fs();
        let ubuntu = fs.resolve(fs.root(), "/home/ubuntu").unwrap();
        assert_eq!(fs.resolve(fs.root(), "//home//ubuntu").unwrap(), ubuntu);
    }

    #[test]
    fn test_trailing_slash_is_directory_only() {
        let fs = sample_fs();
        assert!(fs.resolve(fs.root(), "/home/").is_ok());
        assert_eq!(
            fs.resolve(fs.root(), "/etc/hostname/"),
            Err(FsError::NoSuchSubdir("hostname".to_string()))
        );
    }

    #[test]
    fn test_resolve_file_on_last_segment() {
        let fs = sample_fs();
        let hostname = fs.resolve(fs.root(), "/etc/hostname").unwrap();
        assert!(!fs.is_dir(hostname));
        assert_eq!(fs.path(hostname), "/etc/hostname");
    }

    #[test]
    fn test_not_found_error_text() {
        let fs = sample_fs();
        let err = fs.resolve(fs.root(), "/nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot access '/nope': No such file or directory"
        );
    }

    #[test]
    fn test_midpath_failure_is_no_such_subdir() {
        let fs = sample_fs();
        let err = fs.resolve(fs.root(), "/nope/deeper").unwrap_err();
        assert_eq!(err, FsError::NoSuchSubdir("nope".to_string()));
    }

    #[test]
    fn test_try_cd_on_file() {
        let fs = sample_fs();
        let hostname = fs.resolve(fs.root(), "/etc/hostname").unwrap();
        let err = fs.try_cd(hostname).unwrap_err();
        assert_eq!(err.to_string(), "bash: cd: hostname: Not a directory");
    }

    #[test]
    fn test_try_cat_on_dir() {
        let fs = sample_fs();
        let etc = fs.resolve(fs.root(), "/etc").unwrap();
        let err = fs.try_cat(etc).unwrap_err();
        assert_eq!(err.to_string(), "etc: Is a directory");
    }

    #[test]
    fn test_describe_sorted_ascending() {
        let fs = sample_fs();
        // Root children: dirs etc, home plus file hosts; sorted by plain name
        // with directories rendered bold blue.
        let expected = format!(
            "{b}etc{r}  {b}home{r}  hosts",
            b = crate::ansi::BOLD_BLUE,
            r = crate::ansi::RESET
        );
        assert_eq!(fs.describe(fs.root()), expected);
    }

    #[test]
    fn test_describe_file_is_name() {
        let fs = sample_fs();
        let hosts = fs.resolve(fs.root(), "/hosts").unwrap();
        assert_eq!(fs.describe(hosts), "hosts");
    }

    #[test]
    fn test_tab_complete_names() {
        let fs = sample_fs();
        let home = fs.resolve(fs.root(), "/home").unwrap();
        let hosts = fs.resolve(fs.root(), "/hosts").unwrap();
        assert_eq!(fs.tab_complete_name(home), "home/");
        assert_eq!(fs.tab_complete_name(hosts), "hosts ");
    }
}
