//! Tool execution context - shared, read-only settings for every invocation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::tree::DEFAULT_MAX_TREE_DEPTH;
use crate::error::{Result, ToolbeltError};
use crate::genai::{DEFAULT_IMAGE_MODEL, GenAiError, GenerativeClient};

/// Execution context for tools
///
/// Relative paths resolve against `root`; absolute paths are used as given.
/// There is no sandbox: callers are trusted.
#[derive(Clone)]
pub struct ToolContext {
    /// Base directory for relative paths and the shell's working directory
    pub root: PathBuf,

    /// Model used by generate_image / modify_image
    pub image_model: String,

    /// Deepest directory level get_directory_tree descends into
    pub max_tree_depth: usize,

    genai: Option<Arc<dyn GenerativeClient>>,
}

impl ToolContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            genai: None,
        }
    }

    /// Context rooted at the process working directory
    pub fn current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| ToolbeltError::io("get current directory", ".", e))?;
        Ok(Self::new(cwd))
    }

    pub fn with_genai(mut self, client: Arc<dyn GenerativeClient>) -> Self {
        self.genai = Some(client);
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// Resolve a tool path argument; empty means the root itself
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.as_os_str().is_empty() {
            self.root.clone()
        } else if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// The configured generative-AI client
    pub fn genai(&self) -> Result<&dyn GenerativeClient> {
        self.genai
            .as_deref()
            .ok_or(ToolbeltError::GenAi(GenAiError::NotConfigured))
    }

    pub fn has_genai(&self) -> bool {
        self.genai.is_some()
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("root", &self.root)
            .field("image_model", &self.image_model)
            .field("max_tree_depth", &self.max_tree_depth)
            .field("genai", &self.genai.as_ref().map(|c| c.model().to_string()))
            .finish()
    }
}
