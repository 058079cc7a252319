//! get_directory_tree - text rendering of a directory subtree

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ParameterSpec, Tool, ToolArgs, ToolContext, ToolOutput};
use crate::error::{Result, ToolbeltError};

/// Deepest level descended into unless configured otherwise
pub const DEFAULT_MAX_TREE_DEPTH: usize = 64;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Render the subtree under `path`, one entry per line
///
/// Entries are sorted by name at every level and hidden entries are included.
/// Symbolic links are listed but not followed.
pub async fn get_directory_tree(path: &Path, prefix: &str, max_depth: usize) -> Result<String> {
    let path = path.to_path_buf();
    let prefix = prefix.to_string();

    tokio::task::spawn_blocking(move || {
        let mut out = String::new();
        render_tree(&path, &prefix, max_depth, &mut out)?;
        Ok::<_, ToolbeltError>(out)
    })
    .await
    .map_err(|e| ToolbeltError::io("walk directory tree", PathBuf::new(), std::io::Error::other(e)))?
}

/// Synchronous walker behind get_directory_tree
pub fn render_tree(path: &Path, prefix: &str, max_depth: usize, out: &mut String) -> Result<()> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ToolbeltError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(ToolbeltError::io("read directory", path, e)),
    };

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ToolbeltError::io("read directory entry", path, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| ToolbeltError::io("stat", entry.path(), e))?;
        children.push((entry.file_name(), entry.path(), file_type.is_dir()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));

    let count = children.len();
    for (i, (name, child, is_dir)) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(&name.to_string_lossy());
        out.push('\n');

        if is_dir {
            if max_depth == 0 {
                log::debug!("Tree depth limit reached at {}", child.display());
                continue;
            }
            let child_prefix = format!("{}{}", prefix, if last { SPACE } else { PIPE });
            render_tree(&child, &child_prefix, max_depth - 1, out)?;
        }
    }

    Ok(())
}

pub struct GetDirectoryTreeTool;

#[async_trait]
impl Tool for GetDirectoryTreeTool {
    fn name(&self) -> &'static str {
        "get_directory_tree"
    }

    fn description(&self) -> &'static str {
        "Return the tree structure of a directory, including hidden files."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("path", "The directory path to get the tree structure for."),
            ParameterSpec::optional("prefix", "Prefix for formatting the tree structure.").with_default(""),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        let prefix = args.opt_str("prefix").unwrap_or_default();
        let tree = get_directory_tree(&path, prefix, ctx.max_tree_depth).await?;
        Ok(ToolOutput::Text(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolInvocation;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_tree_sorted_with_hidden() {
        let dir = tempdir().unwrap();
        for name in [".hidden", "b.txt", "a.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let tree = get_directory_tree(dir.path(), "", DEFAULT_MAX_TREE_DEPTH).await.unwrap();

        assert_eq!(tree, "├── .hidden\n├── a.txt\n└── b.txt\n");
    }

    #[tokio::test]
    async fn test_tree_nested_connectors() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/bin")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/bin/main.rs"), "").unwrap();
        std::fs::write(dir.path().join("z.md"), "").unwrap();

        let tree = get_directory_tree(dir.path(), "", DEFAULT_MAX_TREE_DEPTH).await.unwrap();

        let expected = "\
├── src
│   ├── bin
│   │   └── main.rs
│   └── lib.rs
└── z.md
";
        assert_eq!(tree, expected);
    }

    #[tokio::test]
    async fn test_tree_prefix_applied() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("only.txt"), "").unwrap();

        let tree = get_directory_tree(dir.path(), "> ", DEFAULT_MAX_TREE_DEPTH).await.unwrap();
        assert_eq!(tree, "> └── only.txt\n");
    }

    #[tokio::test]
    async fn test_tree_empty_directory() {
        let dir = tempdir().unwrap();
        let tree = get_directory_tree(dir.path(), "", DEFAULT_MAX_TREE_DEPTH).await.unwrap();
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_tree_depth_limit() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

        let tree = get_directory_tree(dir.path(), "", 1).await.unwrap();
        assert_eq!(tree, "└── a\n    └── b\n");
    }

    #[tokio::test]
    async fn test_tree_missing_root() {
        let dir = tempdir().unwrap();
        let err = get_directory_tree(&dir.path().join("ghost"), "", DEFAULT_MAX_TREE_DEPTH)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tree_file_root_is_io_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        let err = get_directory_tree(&file, "", DEFAULT_MAX_TREE_DEPTH).await.unwrap_err();
        assert!(matches!(err, ToolbeltError::Io { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tree_does_not_follow_symlink_cycle() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("real/loop")).unwrap();

        let tree = get_directory_tree(dir.path(), "", DEFAULT_MAX_TREE_DEPTH).await.unwrap();
        assert_eq!(tree, "└── real\n    └── loop\n");
    }

    #[tokio::test]
    async fn test_tool_uses_default_prefix() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        let ctx = ToolContext::new(dir.path());

        let args = ToolInvocation::named("get_directory_tree")
            .with_arg("path", "")
            .bind(&GetDirectoryTreeTool.spec())
            .unwrap();
        let output = GetDirectoryTreeTool.execute(&args, &ctx).await.unwrap();

        assert_eq!(output, ToolOutput::Text("└── a.txt\n".to_string()));
    }
}
