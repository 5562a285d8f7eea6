//! Tree command - print a single snapshot.

use std::path::PathBuf;

use crate::config::Settings;
use crate::tree::{self, TreeNode};

/// Arguments for the tree command.
pub struct TreeArgs {
    pub root: Option<PathBuf>,
    pub json: bool,
}

/// Run the tree command.
pub fn run(args: TreeArgs, config: &Settings) -> anyhow::Result<()> {
    let root = args.root.unwrap_or_else(|| config.root.clone());
    let snapshot = tree::build(&root)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", outline(&snapshot));
    }
    Ok(())
}

/// Indented outline, one entry per line, directories suffixed with `/`.
pub fn outline(node: &TreeNode) -> String {
    let mut out = String::new();
    out.push_str(&label(node));
    out.push('\n');
    write_children(node, "", &mut out);
    out
}

fn write_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let last_index = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        let last = i == last_index;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&label(child));
        out.push('\n');

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        write_children(child, &nested, out);
    }
}

fn label(node: &TreeNode) -> String {
    if node.is_dir {
        format!("{}/", node.name)
    } else {
        node.name.clone()
    }
}
