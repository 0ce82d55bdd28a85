//! Crate-wide constants and the built-in filesystem seed.

use crate::core::SeedError;
use crate::models::FilesystemSeed;

/// Home directory of the session user.
pub const HOME: &str = "/home/guest";

/// Filesystem root.
pub const ROOT: &str = "/";

/// Directory that dynamic project records are spliced into.
pub const PROJECTS_DIR: &str = "/home/guest/projects";

/// Profile file shown by `whoami` and `cd ~ && vim about.md`.
pub const ABOUT_FILE: &str = "/home/guest/about.md";

/// Name reported by `whoami`.
pub const PROFILE_NAME: &str = "guest";

/// Footer appended to the `help` command table.
pub const HELP_TIPS: &str = "Tips:
  - Use Tab for autocomplete
  - Use Up/Down arrows for command history
  - Chain commands with && or ;";

/// Declarative description of the default tree.
///
/// The `projects` directory carries a dynamic marker: externally supplied
/// project records become `<name>.md` files under it at build time.
pub const DEFAULT_SEED: &str = r##"{
  "version": "1",
  "root": {
    "home": {
      "type": "directory",
      "icon": "folder",
      "children": {
        "guest": {
          "type": "directory",
          "icon": "folder",
          "children": {
            ".bashrc": {
              "type": "file",
              "icon": "file",
              "content": "# Guest user bashrc\nexport PS1=\"guest@vsh:~$ \""
            },
            "about.md": {
              "type": "file",
              "icon": "user",
              "content": "# guest\n\n**Visitor account**\n\nRead-only session on a virtual machine.\nLook around with ls, cd and cat; open files with vim.\n"
            },
            "projects": {
              "type": "directory",
              "icon": "folder",
              "dynamic": "projects"
            },
            "staff": {
              "type": "symlink",
              "icon": "folder",
              "target": "/home/staff"
            }
          }
        },
        "staff": {
          "type": "directory",
          "icon": "folder",
          "children": {
            "notes.md": {
              "type": "file",
              "icon": "file-text",
              "content": "# Staff notes\n\nNothing to see here.\n"
            }
          }
        }
      }
    },
    "usr": {
      "type": "directory",
      "icon": "folder",
      "children": {
        "bin": {
          "type": "directory",
          "icon": "folder",
          "children": {
            "cat": { "type": "executable" },
            "cd": { "type": "executable" },
            "clear": { "type": "executable" },
            "help": { "type": "executable", "icon": "help-circle" },
            "history": { "type": "executable" },
            "ls": { "type": "executable" },
            "open": { "type": "executable" },
            "vim": { "type": "executable" },
            "whoami": { "type": "executable" }
          }
        }
      }
    },
    "etc": {
      "type": "directory",
      "icon": "folder",
      "children": {
        "motd": {
          "type": "file",
          "icon": "file-text",
          "content": "\nWelcome to the vsh portfolio server\n===================================\n\nYou are logged in as: guest (read-only access)\nType 'help' for available commands.\n"
        },
        "hostname": {
          "type": "file",
          "icon": "file",
          "content": "vsh.local"
        }
      }
    }
  }
}"##;

/// Parse the built-in seed.
pub fn default_seed() -> Result<FilesystemSeed, SeedError> {
    Ok(serde_json::from_str(DEFAULT_SEED)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DynamicKind, FsNodeKind};

    #[test]
    fn test_default_seed_parses() {
        let seed = default_seed().expect("built-in seed must parse");
        assert_eq!(seed.version, "1");

        let guest = &seed.root["home"].children["guest"];
        assert_eq!(guest.kind, FsNodeKind::Directory);
        assert_eq!(
            guest.children["projects"].dynamic,
            Some(DynamicKind::Projects)
        );
        assert_eq!(
            guest.children["staff"].target.as_deref(),
            Some("/home/staff")
        );
    }

    #[test]
    fn test_default_seed_keeps_markdown_headings() {
        let seed = default_seed().expect("built-in seed must parse");
        let guest = &seed.root["home"].children["guest"];
        let bashrc = guest.children[".bashrc"].content.as_deref().unwrap();
        assert!(bashrc.starts_with("# Guest user bashrc"));
        let about = guest.children["about.md"].content.as_deref().unwrap();
        assert!(about.starts_with("# guest"));
    }
}
