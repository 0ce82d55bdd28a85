use std::collections::BTreeMap;

use tracing::debug;

use crate::core::error::SeedError;
use crate::models::{DynamicKind, FilesystemSeed, FsNode, FsNodeKind, NodeSeed, ProjectRecord};

/// Symlink hops allowed while resolving one path. Exceeding the budget
/// makes the path unresolvable; there is no visited-set.
pub const MAX_SYMLINK_DEPTH: usize = 16;

/// Resolution result that also carries the canonical path after symlink
/// substitution, so cwd reflects the link target rather than the link name.
#[derive(Clone, Debug)]
pub struct ResolvedPath<'a> {
    pub node: &'a FsNode,
    pub actual_path: String,
}

/// Immutable virtual filesystem.
///
/// Built once from a declarative seed plus externally supplied project
/// records, then never mutated. Safe to share read-only across any number
/// of shell sessions (wrap in `Arc`).
///
/// # Path convention
///
/// All paths handled here are absolute and `/`-rooted: `/`, `/home/guest`,
/// `/home/guest/about.md`. Relative input is joined to a cwd by
/// [`Filesystem::normalize`] before resolution.
#[derive(Clone, Debug)]
pub struct Filesystem {
    root: FsNode,
    home: String,
}

impl Filesystem {
    /// Assemble the tree from a seed and dynamic records.
    ///
    /// A pure one-time transform: records become `<name>.md` file nodes
    /// under directories carrying the matching dynamic marker.
    pub fn build(seed: &FilesystemSeed, projects: &[ProjectRecord]) -> Result<Self, SeedError> {
        let mut root = FsNode::directory("/");
        for (name, node_seed) in &seed.root {
            let child = build_node(name, node_seed, &format!("/{}", name), projects)?;
            root.children.insert(name.clone(), child);
        }
        debug!(version = %seed.version, projects = projects.len(), "filesystem built");
        Ok(Self {
            root,
            home: crate::config::HOME.to_string(),
        })
    }

    /// Parse seed JSON and build in one step.
    pub fn from_json(json: &str, projects: &[ProjectRecord]) -> Result<Self, SeedError> {
        let seed: FilesystemSeed = serde_json::from_str(json)?;
        Self::build(&seed, projects)
    }

    pub fn root(&self) -> &FsNode {
        &self.root
    }

    /// Home directory that `~` expands to.
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Walk an absolute path from the root, transparently following any
    /// symlink met along the way. `None` if any segment is missing.
    pub fn resolve(&self, path: &str) -> Option<&FsNode> {
        self.resolve_depth(path, 0)
    }

    fn resolve_depth(&self, path: &str, depth: usize) -> Option<&FsNode> {
        if depth > MAX_SYMLINK_DEPTH {
            return None;
        }
        let mut current = &self.root;
        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.get(part)?;
            if current.is_symlink() {
                let target = current.target.as_deref()?;
                current = self.resolve_depth(target, depth + 1)?;
            }
        }
        Some(current)
    }

    /// As [`Filesystem::resolve`], but reconstructs the canonical path
    /// after each symlink substitution.
    pub fn resolve_with_symlinks(&self, path: &str) -> Option<ResolvedPath<'_>> {
        self.resolve_with_symlinks_depth(path, 0)
    }

    fn resolve_with_symlinks_depth(&self, path: &str, depth: usize) -> Option<ResolvedPath<'_>> {
        if depth > MAX_SYMLINK_DEPTH {
            return None;
        }
        let mut current = &self.root;
        let mut resolved_parts: Vec<String> = Vec::new();

        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.get(part)?;
            if current.is_symlink() {
                let target = current.target.as_deref()?;
                let substituted = self.resolve_with_symlinks_depth(target, depth + 1)?;
                current = substituted.node;
                // The walked prefix is replaced wholesale by the target's
                // canonical path.
                resolved_parts.clear();
                resolved_parts.extend(
                    substituted
                        .actual_path
                        .split('/')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            } else {
                resolved_parts.push(part.to_string());
            }
        }

        Some(ResolvedPath {
            node: current,
            actual_path: format!("/{}", resolved_parts.join("/")),
        })
    }

    /// Expand `~`, join relative input to `cwd`, and collapse `.`/`..`
    /// segments left-to-right. `..` at the root is a no-op. Always yields
    /// an absolute `/`-rooted path; existence is not checked.
    pub fn normalize(&self, raw: &str, cwd: &str) -> String {
        let joined = if raw == "~" {
            self.home.clone()
        } else if let Some(rest) = raw.strip_prefix("~/") {
            format!("{}/{}", self.home, rest)
        } else if raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("{}/{}", cwd, raw)
        };

        let mut parts: Vec<&str> = Vec::new();
        for part in joined.split('/').filter(|s| !s.is_empty()) {
            match part {
                ".." => {
                    parts.pop();
                }
                "." => {}
                _ => parts.push(part),
            }
        }
        format!("/{}", parts.join("/"))
    }

    /// Children of the directory at `path`, in name order. `None` if the
    /// path is missing or not a directory. A symlink to a directory lists
    /// its target.
    pub fn list(&self, path: &str) -> Option<Vec<&FsNode>> {
        let node = self.resolve(path)?;
        if !node.is_directory() {
            return None;
        }
        Some(node.children.values().collect())
    }
}

fn build_node(
    name: &str,
    seed: &NodeSeed,
    path: &str,
    projects: &[ProjectRecord],
) -> Result<FsNode, SeedError> {
    match seed.kind {
        FsNodeKind::Symlink => {
            if seed.target.is_none() {
                return Err(SeedError::MissingTarget {
                    path: path.to_string(),
                });
            }
        }
        FsNodeKind::File | FsNodeKind::Executable => {
            if !seed.children.is_empty() {
                return Err(SeedError::ChildrenOnLeaf {
                    path: path.to_string(),
                    kind: seed.kind.to_string(),
                });
            }
            if seed.dynamic.is_some() {
                return Err(SeedError::DynamicOnLeaf {
                    path: path.to_string(),
                });
            }
        }
        FsNodeKind::Directory => {}
    }

    let mut children = BTreeMap::new();
    for (child_name, child_seed) in &seed.children {
        let child_path = format!("{}/{}", path.trim_end_matches('/'), child_name);
        let child = build_node(child_name, child_seed, &child_path, projects)?;
        children.insert(child_name.clone(), child);
    }

    if seed.dynamic == Some(DynamicKind::Projects) {
        for record in projects {
            let file_name = record.file_name();
            if children.contains_key(&file_name) {
                return Err(SeedError::DynamicCollision {
                    path: path.to_string(),
                    name: file_name,
                });
            }
            let mut node = FsNode::file(&file_name, &record.readme);
            node.icon = Some("file-text".to_string());
            node.project = Some(record.clone());
            children.insert(file_name, node);
        }
    }

    Ok(FsNode {
        name: name.to_string(),
        kind: seed.kind,
        children,
        content: seed.content.clone(),
        target: seed.target.clone(),
        icon: seed.icon.clone(),
        project: None,
    })
}

/// Final path segment, or `/` for the root.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("/")
}

/// Everything before the final segment; the root is its own parent.
pub fn parent(path: &str) -> String {
    let mut parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    parts.pop();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_projects() -> Vec<ProjectRecord> {
        vec![
            ProjectRecord {
                name: "raycaster".to_string(),
                description: "Software renderer".to_string(),
                url: "https://example.com/raycaster".to_string(),
                language: Some("Rust".to_string()),
                stars: 42,
                updated_at: "2024-03-01".to_string(),
                readme: "# raycaster\n\nA tiny renderer.".to_string(),
            },
            ProjectRecord {
                name: "weather-cli".to_string(),
                description: "Forecasts in the terminal".to_string(),
                url: "https://example.com/weather-cli".to_string(),
                language: Some("Go".to_string()),
                stars: 7,
                updated_at: "2023-11-20".to_string(),
                readme: "# weather-cli".to_string(),
            },
        ]
    }

    fn create_test_fs() -> Filesystem {
        let seed = crate::config::default_seed().expect("seed parses");
        Filesystem::build(&seed, &sample_projects()).expect("tree builds")
    }

    #[test]
    fn test_build_creates_declared_nodes() {
        let fs = create_test_fs();
        assert!(fs.resolve("/home/guest").is_some());
        assert!(fs.resolve("/home/guest/.bashrc").is_some());
        assert!(fs.resolve("/etc/motd").is_some());
        assert!(fs.resolve("/usr/bin/ls").is_some());
        assert!(fs.resolve("/nonexistent").is_none());
    }

    #[test]
    fn test_build_splices_dynamic_records() {
        let fs = create_test_fs();
        let node = fs
            .resolve("/home/guest/projects/raycaster.md")
            .expect("spliced file exists");
        assert_eq!(node.kind, FsNodeKind::File);
        assert!(node.content_text().contains("tiny renderer"));
        assert_eq!(
            node.project.as_ref().map(|p| p.stars),
            Some(42)
        );
    }

    #[test]
    fn test_build_rejects_dynamic_collision() {
        let json = r#"{
            "version": "1",
            "root": {
                "projects": {
                    "type": "directory",
                    "dynamic": "projects",
                    "children": {
                        "raycaster.md": { "type": "file", "content": "static" }
                    }
                }
            }
        }"#;
        let err = Filesystem::from_json(json, &sample_projects()).unwrap_err();
        assert!(matches!(err, SeedError::DynamicCollision { .. }));
    }

    #[test]
    fn test_build_rejects_symlink_without_target() {
        let json = r#"{
            "version": "1",
            "root": { "bad": { "type": "symlink" } }
        }"#;
        let err = Filesystem::from_json(json, &[]).unwrap_err();
        assert!(matches!(err, SeedError::MissingTarget { .. }));
    }

    #[test]
    fn test_build_rejects_children_on_file() {
        let json = r#"{
            "version": "1",
            "root": {
                "odd.md": {
                    "type": "file",
                    "children": { "sub": { "type": "file" } }
                }
            }
        }"#;
        let err = Filesystem::from_json(json, &[]).unwrap_err();
        assert!(matches!(err, SeedError::ChildrenOnLeaf { .. }));
    }

    #[test]
    fn test_resolve_root() {
        let fs = create_test_fs();
        let root = fs.resolve("/").expect("root resolves");
        assert!(root.is_directory());
    }

    #[test]
    fn test_resolve_follows_symlinks_mid_walk() {
        let fs = create_test_fs();
        // /home/guest/staff -> /home/staff, then into its children.
        let node = fs
            .resolve("/home/guest/staff/notes.md")
            .expect("path through symlink resolves");
        assert_eq!(node.name, "notes.md");
    }

    #[test]
    fn test_resolve_with_symlinks_reports_actual_path() {
        let fs = create_test_fs();
        let resolved = fs
            .resolve_with_symlinks("/home/guest/staff")
            .expect("symlink resolves");
        assert_eq!(resolved.actual_path, "/home/staff");
        assert!(resolved.node.is_directory());

        // A path continuing past the link keeps the canonical prefix.
        let resolved = fs
            .resolve_with_symlinks("/home/guest/staff/notes.md")
            .expect("nested path resolves");
        assert_eq!(resolved.actual_path, "/home/staff/notes.md");
    }

    #[test]
    fn test_resolve_with_symlinks_plain_path_unchanged() {
        let fs = create_test_fs();
        let resolved = fs
            .resolve_with_symlinks("/home/guest/projects")
            .expect("plain path resolves");
        assert_eq!(resolved.actual_path, "/home/guest/projects");
    }

    #[test]
    fn test_symlink_loop_resolves_to_none() {
        let json = r#"{
            "version": "1",
            "root": {
                "a": { "type": "symlink", "target": "/b" },
                "b": { "type": "symlink", "target": "/a" }
            }
        }"#;
        let fs = Filesystem::from_json(json, &[]).expect("tree builds");
        assert!(fs.resolve("/a").is_none());
        assert!(fs.resolve_with_symlinks("/a").is_none());
    }

    #[test]
    fn test_normalize_home_expansion() {
        let fs = create_test_fs();
        assert_eq!(fs.normalize("~", "/etc"), "/home/guest");
        assert_eq!(fs.normalize("~/projects", "/etc"), "/home/guest/projects");
    }

    #[test]
    fn test_normalize_relative_and_dots() {
        let fs = create_test_fs();
        assert_eq!(fs.normalize("projects", "/home/guest"), "/home/guest/projects");
        assert_eq!(fs.normalize(".", "/home/guest"), "/home/guest");
        assert_eq!(fs.normalize("..", "/home/guest"), "/home");
        assert_eq!(fs.normalize("../..", "/home/guest"), "/");
        assert_eq!(fs.normalize("../../..", "/home/guest"), "/");
        assert_eq!(fs.normalize("./a/../b", "/home"), "/home/b");
        assert_eq!(fs.normalize("/etc//motd", "/home/guest"), "/etc/motd");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let fs = create_test_fs();
        for raw in ["~/projects/../.", "a/b/../c", "/x/./y/..", "..", "~"] {
            let once = fs.normalize(raw, "/home/guest");
            let twice = fs.normalize(&once, "/home/guest");
            assert_eq!(once, twice, "normalize({raw}) must be idempotent");
        }
    }

    #[test]
    fn test_list_orders_children_by_name() {
        let fs = create_test_fs();
        let names: Vec<&str> = fs
            .list("/home/guest")
            .expect("guest is a directory")
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec![".bashrc", "about.md", "projects", "staff"]);
    }

    #[test]
    fn test_list_on_file_is_none() {
        let fs = create_test_fs();
        assert!(fs.list("/etc/motd").is_none());
        assert!(fs.list("/no/such/dir").is_none());
    }

    #[test]
    fn test_list_through_symlink() {
        let fs = create_test_fs();
        let names: Vec<&str> = fs
            .list("/home/guest/staff")
            .expect("symlinked directory lists its target")
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["notes.md"]);
    }

    #[test]
    fn test_basename_and_parent() {
        assert_eq!(basename("/home/guest/about.md"), "about.md");
        assert_eq!(basename("/home"), "home");
        assert_eq!(basename("/"), "/");
        assert_eq!(parent("/home/guest"), "/home");
        assert_eq!(parent("/home"), "/");
        assert_eq!(parent("/"), "/");
    }
}
