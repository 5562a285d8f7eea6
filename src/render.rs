//! HTML projection of a snapshot.
//!
//! Pure functions: the same tree always renders to the same markup.

use std::fmt::Write as _;

use crate::tree::TreeNode;

/// Route prefix for file downloads.
pub const DOWNLOAD_PREFIX: &str = "/download/";

/// Render a node and its subtree as an HTML fragment.
pub fn render_tree(node: &TreeNode) -> String {
    let mut html = String::new();
    write_node(&mut html, node);
    html
}

fn write_node(html: &mut String, node: &TreeNode) {
    let path = escape_html(&node.relative_path);
    let name = escape_html(&node.name);

    if node.is_dir {
        let _ = writeln!(html, "<div class=\"folder\" data-path=\"{path}\">");
        let _ = writeln!(html, "    📁 {name}");
        if !node.children.is_empty() {
            html.push_str("<ul>\n");
            for child in &node.children {
                html.push_str("<li>\n");
                write_node(html, child);
                html.push_str("</li>\n");
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</div>\n");
    } else {
        let href = escape_html(&download_href(&node.relative_path));
        let _ = writeln!(
            html,
            "<div class=\"file\" data-path=\"{path}\">📄 <a href=\"{href}\">{name}</a></div>"
        );
    }
}

/// Download link for a root-relative path, percent-encoded per segment.
pub fn download_href(relative_path: &str) -> String {
    let encoded: Vec<String> = relative_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(encode_segment)
        .collect();
    format!("{DOWNLOAD_PREFIX}{}", encoded.join("/"))
}

fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full index page: the rendered tree plus the live-update script.
pub fn render_page(tree: &TreeNode) -> String {
    let title = escape_html(&tree.name);
    let body = render_tree(tree);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 2rem; }}
        ul {{ list-style: none; padding-left: 1.5rem; margin: 0.25rem 0; }}
        .folder {{ font-weight: 600; }}
        .file {{ font-weight: normal; }}
        a {{ color: #3050c0; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <div id="tree">
{body}    </div>
    <script>
        const source = new EventSource("/updates");
        source.addEventListener("update", (event) => {{
            document.getElementById("tree").innerHTML = event.data;
        }});
    </script>
</body>
</html>
"#
    )
}
