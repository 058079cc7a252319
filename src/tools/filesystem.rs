//! Filesystem tools - create, read, write, copy, move and delete paths
//!
//! Each operation is a plain async fn over an already-resolved path, plus a
//! Tool wrapper that binds arguments and resolves paths through ToolContext.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{ParameterSpec, Tool, ToolArgs, ToolContext, ToolOutput};
use crate::error::{Result, ToolbeltError};

/// Fail with NotFound unless `path` exists
pub(crate) async fn ensure_exists(path: &Path) -> Result<()> {
    match fs::try_exists(path).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ToolbeltError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(ToolbeltError::io("stat", path, e)),
    }
}

/// rename(2), falling back to copy + remove when src and dst are on different filesystems
pub(crate) async fn rename_path(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            log::debug!("Cross-device move {} -> {}, copying", src.display(), dst.display());
            fs::copy(src, dst)
                .await
                .map_err(|e| ToolbeltError::io("copy across devices", dst, e))?;
            fs::remove_file(src)
                .await
                .map_err(|e| ToolbeltError::io("remove moved source", src, e))?;
            Ok(())
        }
        Err(e) => Err(ToolbeltError::io("rename", src, e)),
    }
}

/// Create (or truncate) a file, creating missing parent directories
pub async fn create_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolbeltError::io("create parent directories", parent, e))?;
    }

    fs::File::create(path)
        .await
        .map_err(|e| ToolbeltError::io("create file", path, e))?;

    log::info!("File created at {}", path.display());
    Ok(())
}

/// Create a directory and its parents; succeeds if it already exists
pub async fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| ToolbeltError::io("create directory", path, e))?;

    log::info!("Directory created at {}", path.display());
    Ok(())
}

pub async fn delete_file(path: &Path) -> Result<()> {
    ensure_exists(path).await?;

    fs::remove_file(path)
        .await
        .map_err(|e| ToolbeltError::io("delete file", path, e))?;

    log::info!("File deleted at {}", path.display());
    Ok(())
}

pub async fn does_file_exist(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| ToolbeltError::io("stat", path, e))
}

/// Read a whole file as UTF-8 text
pub async fn read_file(path: &Path) -> Result<String> {
    ensure_exists(path).await?;

    fs::read_to_string(path)
        .await
        .map_err(|e| ToolbeltError::io("read file", path, e))
}

/// Replace the file's content; the parent directory must exist
pub async fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .await
        .map_err(|e| ToolbeltError::io("write file", path, e))?;

    log::info!("Content written to {}", path.display());
    Ok(())
}

pub async fn append_to_file(path: &Path, content: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| ToolbeltError::io("open for append", path, e))?;

    file.write_all(content.as_bytes())
        .await
        .map_err(|e| ToolbeltError::io("append to file", path, e))?;
    file.flush()
        .await
        .map_err(|e| ToolbeltError::io("append to file", path, e))?;

    log::info!("Content appended to {}", path.display());
    Ok(())
}

/// Whether both paths resolve to the same existing file
async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Byte-exact copy; overwrites `dst`. Copying a file onto itself is a no-op.
pub async fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    ensure_exists(src).await?;

    if is_same_file(src, dst).await {
        log::debug!("Copy source and destination are the same file: {}", src.display());
        return Ok(());
    }

    fs::copy(src, dst)
        .await
        .map_err(|e| ToolbeltError::io("copy file", dst, e))?;

    log::info!("File copied from {} to {}", src.display(), dst.display());
    Ok(())
}

/// Move `src` to `dst`; the destination's parent must already exist
pub async fn move_file(src: &Path, dst: &Path) -> Result<()> {
    ensure_exists(src).await?;
    rename_path(src, dst).await?;

    log::info!("File moved from {} to {}", src.display(), dst.display());
    Ok(())
}

fn path_param(description: &str) -> ParameterSpec {
    ParameterSpec::required("path", description)
}

fn src_dst_params() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::required("src", "The source file path."),
        ParameterSpec::required("dst", "The destination file path."),
    ]
}

pub struct CreateFileTool;

#[async_trait]
impl Tool for CreateFileTool {
    fn name(&self) -> &'static str {
        "create_file"
    }

    fn description(&self) -> &'static str {
        "Create a new file at the specified path."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![path_param("The path where the file should be created.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        create_file(&path).await?;
        Ok(ToolOutput::Message(format!("File created at {}", path.display())))
    }
}

pub struct CreateDirectoryTool;

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn name(&self) -> &'static str {
        "create_directory"
    }

    fn description(&self) -> &'static str {
        "Create a new directory at the specified path."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![path_param("The path where the directory should be created.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        create_directory(&path).await?;
        Ok(ToolOutput::Message(format!("Directory created at {}", path.display())))
    }
}

pub struct DeleteFileTool;

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &'static str {
        "delete_file"
    }

    fn description(&self) -> &'static str {
        "Delete a file at the specified path."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![path_param("The path of the file to delete.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        delete_file(&path).await?;
        Ok(ToolOutput::Message(format!("File deleted at {}", path.display())))
    }
}

pub struct DoesFileExistTool;

#[async_trait]
impl Tool for DoesFileExistTool {
    fn name(&self) -> &'static str {
        "does_file_exist"
    }

    fn description(&self) -> &'static str {
        "Check if a file exists at the specified path."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![path_param("The path of the file to check.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        Ok(ToolOutput::Bool(does_file_exist(&path).await?))
    }
}

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the content of a file."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![path_param("The path of the file to read.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        Ok(ToolOutput::Text(read_file(&path).await?))
    }
}

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write content to a file."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            path_param("The path of the file to write to."),
            ParameterSpec::required("content", "The content to write to the file."),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        let content = args.str("content")?;
        write_file(&path, content).await?;
        Ok(ToolOutput::Message(format!(
            "Wrote {} bytes to {}",
            content.len(),
            path.display()
        )))
    }
}

pub struct AppendToFileTool;

#[async_trait]
impl Tool for AppendToFileTool {
    fn name(&self) -> &'static str {
        "append_to_file"
    }

    fn description(&self) -> &'static str {
        "Append content to a file."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            path_param("The path of the file to append to."),
            ParameterSpec::required("content", "The content to append to the file."),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        let content = args.str("content")?;
        append_to_file(&path, content).await?;
        Ok(ToolOutput::Message(format!(
            "Appended {} bytes to {}",
            content.len(),
            path.display()
        )))
    }
}

pub struct CopyFileTool;

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &'static str {
        "copy_file"
    }

    fn description(&self) -> &'static str {
        "Copy a file from source to destination."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        src_dst_params()
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let src = ctx.resolve(args.str("src")?);
        let dst = ctx.resolve(args.str("dst")?);
        copy_file(&src, &dst).await?;
        Ok(ToolOutput::Message(format!(
            "File copied from {} to {}",
            src.display(),
            dst.display()
        )))
    }
}

pub struct MoveFileTool;

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &'static str {
        "move_file"
    }

    fn description(&self) -> &'static str {
        "Move a file from source to destination."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        src_dst_params()
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let src = ctx.resolve(args.str("src")?);
        let dst = ctx.resolve(args.str("dst")?);
        move_file(&src, &dst).await?;
        Ok(ToolOutput::Message(format!(
            "File moved from {} to {}",
            src.display(),
            dst.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolInvocation;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_file_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/new.txt");

        create_file(&path).await.unwrap();

        assert!(path.is_file());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_create_file_truncates_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "old content").unwrap();

        create_file(&path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_create_directory_twice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out");

        create_directory(&path).await.unwrap();
        create_directory(&path).await.unwrap();

        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_create_directory_over_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taken");
        std::fs::write(&path, "x").unwrap();

        let err = create_directory(&path).await.unwrap_err();
        assert!(matches!(err, ToolbeltError::Io { .. }));
    }

    #[tokio::test]
    async fn test_delete_file_missing() {
        let dir = tempdir().unwrap();
        let err = delete_file(&dir.path().join("ghost.txt")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_file_removes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "x").unwrap();

        delete_file(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();

        let err = delete_file(&sub).await.unwrap_err();
        assert!(matches!(err, ToolbeltError::Io { .. }));
        assert!(sub.is_dir());
    }

    #[tokio::test]
    async fn test_does_file_exist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");

        assert!(!does_file_exist(&path).await.unwrap());
        std::fs::write(&path, "x").unwrap();
        assert!(does_file_exist(&path).await.unwrap());
        assert!(does_file_exist(dir.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_file_missing() {
        let dir = tempdir().unwrap();
        let err = read_file(&dir.path().join("nope.txt")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_file_rejects_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.dat");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = read_file(&path).await.unwrap_err();
        assert!(matches!(err, ToolbeltError::Io { .. }));
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let content = "line one\nline two\n\tünïcødé\n";

        write_file(&path, content).await.unwrap();
        assert_eq!(read_file(&path).await.unwrap(), content);
    }

    #[tokio::test]
    async fn test_write_file_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");

        write_file(&path, "a much longer first version").await.unwrap();
        write_file(&path, "short").await.unwrap();

        assert_eq!(read_file(&path).await.unwrap(), "short");
    }

    #[tokio::test]
    async fn test_write_file_missing_parent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/a.txt");

        let err = write_file(&path, "x").await.unwrap_err();
        assert!(matches!(err, ToolbeltError::Io { .. }));
    }

    #[tokio::test]
    async fn test_append_concatenates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");

        append_to_file(&path, "first,").await.unwrap();
        append_to_file(&path, "second").await.unwrap();

        assert_eq!(read_file(&path).await.unwrap(), "first,second");
    }

    #[tokio::test]
    async fn test_copy_file_byte_exact() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        let bytes: Vec<u8> = (0..=255).collect();
        std::fs::write(&src, &bytes).unwrap();
        std::fs::write(&dst, "stale").unwrap();

        copy_file(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), bytes);
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_copy_file_onto_itself_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        copy_file(&path, &path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");

        let alias = dir.path().join(".").join("a.txt");
        copy_file(&path, &alias).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_copy_file_missing_source() {
        let dir = tempdir().unwrap();
        let err = copy_file(&dir.path().join("nope"), &dir.path().join("b"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_move_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        std::fs::write(&src, "moving").unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "moving");
    }

    #[tokio::test]
    async fn test_move_file_missing_source() {
        let dir = tempdir().unwrap();
        let err = move_file(&dir.path().join("nope"), &dir.path().join("b"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_move_file_missing_destination_parent_fails() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, "stay").unwrap();

        let err = move_file(&src, &dir.path().join("missing/b.txt")).await.unwrap_err();

        assert!(matches!(err, ToolbeltError::Io { .. }));
        assert!(src.exists());
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_tool_wrappers_resolve_relative_paths() {
        let dir = tempdir().unwrap();
        let ctx = ToolContext::new(dir.path());

        let write = ToolInvocation::named("write_file")
            .with_arg("path", "note.txt")
            .with_arg("content", "Hello, World!");
        let output = WriteFileTool
            .execute(&write.bind(&WriteFileTool.spec()).unwrap(), &ctx)
            .await
            .unwrap();
        assert!(output.as_text().unwrap().contains("13 bytes"));

        let read = ToolInvocation::named("read_file").with_arg("path", "note.txt");
        let output = ReadFileTool
            .execute(&read.bind(&ReadFileTool.spec()).unwrap(), &ctx)
            .await
            .unwrap();
        assert_eq!(output, ToolOutput::Text("Hello, World!".to_string()));

        let exists = ToolInvocation::named("does_file_exist").with_arg("path", "note.txt");
        let output = DoesFileExistTool
            .execute(&exists.bind(&DoesFileExistTool.spec()).unwrap(), &ctx)
            .await
            .unwrap();
        assert_eq!(output, ToolOutput::Bool(true));
    }
}
