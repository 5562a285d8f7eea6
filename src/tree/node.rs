//! Snapshot nodes and the recursive tree builder.

use std::cmp::Ordering;
use std::path::Path;

use serde::Serialize;

use super::TreeError;

/// One filesystem entry in a snapshot.
///
/// Children are ordered directories first, then files, each group sorted by
/// name. `relative_path` uses `/` separators and is empty for the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub relative_path: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Look up a node by its root-relative path.
    ///
    /// The empty string (or `/`) resolves to `self`.
    pub fn find(&self, relative_path: &str) -> Option<&TreeNode> {
        let mut current = self;
        for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.iter().find(|c| c.name == segment)?;
        }
        Some(current)
    }

    /// Number of files in this subtree.
    pub fn file_count(&self) -> usize {
        if self.is_dir {
            self.children.iter().map(TreeNode::file_count).sum()
        } else {
            1
        }
    }

    /// Number of directories in this subtree, including `self` if it is one.
    pub fn dir_count(&self) -> usize {
        if self.is_dir {
            1 + self.children.iter().map(TreeNode::dir_count).sum::<usize>()
        } else {
            0
        }
    }

    fn display_order(a: &TreeNode, b: &TreeNode) -> Ordering {
        b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name))
    }
}

/// Build a snapshot of the filesystem rooted at `root`.
///
/// The first I/O error aborts the whole build; partial trees are never
/// returned.
pub fn build(root: &Path) -> Result<TreeNode, TreeError> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    build_node(root, name, String::new())
}

fn build_node(path: &Path, name: String, relative_path: String) -> Result<TreeNode, TreeError> {
    let metadata = std::fs::metadata(path).map_err(|e| TreeError::io(path, e))?;

    if !metadata.is_dir() {
        return Ok(TreeNode {
            name,
            relative_path,
            is_dir: false,
            children: Vec::new(),
        });
    }

    let mut children = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| TreeError::io(path, e))? {
        let entry = entry.map_err(|e| TreeError::io(path, e))?;
        let child_name = entry.file_name().to_string_lossy().into_owned();
        let child_relative = join_relative(&relative_path, &child_name);
        children.push(build_node(&entry.path(), child_name, child_relative)?);
    }
    children.sort_by(TreeNode::display_order);

    Ok(TreeNode {
        name,
        relative_path,
        is_dir: true,
        children,
    })
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn assert_invariants(node: &TreeNode) {
        let mut seen_file = false;
        for pair in node.children.windows(2) {
            if pair[0].is_dir == pair[1].is_dir {
                assert!(pair[0].name < pair[1].name, "{} >= {}", pair[0].name, pair[1].name);
            }
        }
        for child in &node.children {
            if !child.is_dir {
                seen_file = true;
            } else {
                assert!(!seen_file, "directory {} listed after a file", child.name);
            }
            assert_eq!(child.relative_path, join_relative(&node.relative_path, &child.name));
            assert!(!child.relative_path.starts_with('/'));
            assert_invariants(child);
        }
    }

    #[test]
    fn test_build_orders_directories_first() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("a")).unwrap();
        fs::write(temp_dir.path().join("b.txt"), "b").unwrap();

        let tree = build(temp_dir.path()).unwrap();

        assert!(tree.is_dir);
        assert_eq!(tree.relative_path, "");
        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b.txt"]);
        assert!(tree.children[0].is_dir);
        assert!(tree.children[0].children.is_empty());
        assert!(!tree.children[1].is_dir);
    }

    #[test]
    fn test_build_sorts_mixed_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for file in ["zeta.txt", "alpha.txt", "Mid.md"] {
            fs::write(root.join(file), "x").unwrap();
        }
        for dir in ["zdir", "adir/inner", "adir/deeper/leaf"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("adir/deeper/leaf/file.bin"), [0u8; 4]).unwrap();
        fs::write(root.join("adir/top.txt"), "t").unwrap();

        let tree = build(root).unwrap();
        assert_invariants(&tree);

        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["adir", "zdir", "Mid.md", "alpha.txt", "zeta.txt"]);

        let leaf = tree.find("adir/deeper/leaf/file.bin").unwrap();
        assert_eq!(leaf.relative_path, "adir/deeper/leaf/file.bin");
        assert!(!leaf.is_dir);
        assert_eq!(tree.file_count(), 5);
        assert_eq!(tree.dir_count(), 6);
    }

    #[test]
    fn test_build_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("only.txt");
        fs::write(&file, "x").unwrap();

        let node = build(&file).unwrap();
        assert_eq!(node.name, "only.txt");
        assert_eq!(node.relative_path, "");
        assert!(!node.is_dir);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_build_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        match build(&missing) {
            Err(TreeError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_find_root_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("a")).unwrap();
        let tree = build(temp_dir.path()).unwrap();

        assert_eq!(tree.find(""), Some(&tree));
        assert_eq!(tree.find("a").map(|n| n.is_dir), Some(true));
        assert!(tree.find("a/nope").is_none());
    }

    #[test]
    fn test_serialize_skips_empty_children() {
        let leaf = TreeNode {
            name: "f.txt".to_string(),
            relative_path: "f.txt".to_string(),
            is_dir: false,
            children: Vec::new(),
        };
        let json = serde_json::to_value(&leaf).unwrap();
        assert_eq!(json["relative_path"], "f.txt");
        assert!(json.get("children").is_none());
    }
}
