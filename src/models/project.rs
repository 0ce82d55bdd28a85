use serde::Deserialize;

/// Externally supplied project summary.
///
/// Records are spliced into dynamic directories at filesystem build time
/// as `<name>.md` file nodes, and also drive `open` and its completion.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub readme: String,
}

impl ProjectRecord {
    /// Filename of the node a record becomes when spliced into the tree.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.name)
    }
}
