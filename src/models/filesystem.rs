use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::models::ProjectRecord;

/// Node kind in the virtual filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FsNodeKind {
    Directory,
    File,
    Executable,
    Symlink,
}

impl fmt::Display for FsNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::Executable => "executable",
            Self::Symlink => "symlink",
        };
        write!(f, "{}", s)
    }
}

/// A node in the immutable virtual filesystem tree.
///
/// Non-symlink edges form a strict tree: every node except the root is
/// owned by exactly one parent directory. Symlinks never own a subtree;
/// they reference one by absolute path in `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct FsNode {
    pub name: String,
    pub kind: FsNodeKind,
    /// Children by name. Deterministic iteration order; the order itself
    /// carries no meaning.
    pub children: BTreeMap<String, FsNode>,
    /// Static text content for files.
    pub content: Option<String>,
    /// Absolute target path, symlinks only.
    pub target: Option<String>,
    /// Opaque icon tag for the presentation layer.
    pub icon: Option<String>,
    /// Project metadata for dynamically spliced files.
    pub project: Option<ProjectRecord>,
}

impl FsNode {
    pub fn directory(name: impl Into<String>) -> Self {
        Self::bare(name, FsNodeKind::Directory)
    }

    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut node = Self::bare(name, FsNodeKind::File);
        node.content = Some(content.into());
        node
    }

    pub fn executable(name: impl Into<String>) -> Self {
        Self::bare(name, FsNodeKind::Executable)
    }

    pub fn symlink(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut node = Self::bare(name, FsNodeKind::Symlink);
        node.target = Some(target.into());
        node
    }

    fn bare(name: impl Into<String>, kind: FsNodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: BTreeMap::new(),
            content: None,
            target: None,
            icon: None,
            project: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FsNodeKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FsNodeKind::Symlink
    }

    /// Hidden entries start with a dot and are skipped by `ls` and path
    /// completion unless explicitly requested.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// File content, or empty text for nodes without any.
    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Dynamic splice marker: which external records populate a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicKind {
    Projects,
}

/// Declarative description of one node in the filesystem seed.
///
/// Mirrors the JSON the presentation layer ships: nodes keyed by name
/// with a kind, optional icon tag, static content, symlink target,
/// children, and an optional dynamic marker.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeSeed {
    #[serde(rename = "type")]
    pub kind: FsNodeKind,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub children: BTreeMap<String, NodeSeed>,
    #[serde(default)]
    pub dynamic: Option<DynamicKind>,
}

/// Whole-tree seed: version tag plus the root's children by name.
#[derive(Clone, Debug, Deserialize)]
pub struct FilesystemSeed {
    pub version: String,
    pub root: BTreeMap<String, NodeSeed>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_constructors() {
        let dir = FsNode::directory("projects");
        assert_eq!(dir.kind, FsNodeKind::Directory);
        assert!(dir.is_directory());

        let file = FsNode::file("about.md", "# About");
        assert_eq!(file.content_text(), "# About");
        assert!(!file.is_directory());

        let link = FsNode::symlink("staff", "/home/staff");
        assert!(link.is_symlink());
        assert_eq!(link.target.as_deref(), Some("/home/staff"));
    }

    #[test]
    fn test_hidden_entries() {
        assert!(FsNode::file(".bashrc", "").is_hidden());
        assert!(!FsNode::file("readme.md", "").is_hidden());
    }

    #[test]
    fn test_seed_deserializes() {
        let json = r#"{
            "version": "1",
            "root": {
                "home": {
                    "type": "directory",
                    "children": {
                        "guest": { "type": "directory", "dynamic": "projects" }
                    }
                },
                "motd": { "type": "file", "content": "welcome" },
                "bin": { "type": "symlink", "target": "/usr/bin" }
            }
        }"#;
        let seed: FilesystemSeed = serde_json::from_str(json).expect("seed should parse");
        assert_eq!(seed.version, "1");
        assert_eq!(seed.root["motd"].kind, FsNodeKind::File);
        assert_eq!(seed.root["bin"].target.as_deref(), Some("/usr/bin"));
        let guest = &seed.root["home"].children["guest"];
        assert_eq!(guest.dynamic, Some(DynamicKind::Projects));
    }
}
