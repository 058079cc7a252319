//! Image tools - open, move, generate and modify images
//!
//! Generation goes through the GenerativeClient carried by ToolContext. The
//! first image part of a response is decoded and saved as `<dir>/<name>.png`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use tokio::fs;

use super::filesystem::{ensure_exists, rename_path};
use super::{ParameterSpec, Tool, ToolArgs, ToolContext, ToolOutput};
use crate::error::{Result, ToolbeltError};
use crate::genai::{Content, GenerateRequest, GenerateResponse, GenerationConfig, Part};

/// Where a generated image landed, plus any text the model sent with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub notes: Vec<String>,
}

impl SavedImage {
    fn summary(&self, name: &str) -> String {
        let mut msg = format!("Image {} saved to {}", name, self.path.display());
        for note in &self.notes {
            msg.push('\n');
            msg.push_str(note);
        }
        msg
    }
}

pub async fn open_an_image(path: &Path) -> Result<Vec<u8>> {
    ensure_exists(path).await?;

    fs::read(path)
        .await
        .map_err(|e| ToolbeltError::io("read image", path, e))
}

/// Move an image, creating the destination's parent directories first
pub async fn move_the_image(path_before: &Path, path_after: &Path) -> Result<()> {
    ensure_exists(path_before).await?;

    if let Some(parent) = path_after.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolbeltError::io("create parent directories", parent, e))?;
    }

    rename_path(path_before, path_after).await?;

    log::info!("Image moved from {} to {}", path_before.display(), path_after.display());
    Ok(())
}

/// Ask the model for a new image and save it as `<dir>/<name_of_image>.png`
pub async fn generate_image(
    ctx: &ToolContext,
    prompt: &str,
    dimensions: &str,
    dir: &str,
    name_of_image: &str,
) -> Result<SavedImage> {
    let client = ctx.genai()?;

    let request = GenerateRequest::new()
        .with_model(&ctx.image_model)
        .with_user_text(format!("{}{}", prompt, dimensions))
        .with_config(GenerationConfig::text_and_image());

    log::debug!("generate_image: model={} name={}", ctx.image_model, name_of_image);
    let response = client.generate_content(request).await?;

    save_first_image(&response, &ctx.resolve(dir), name_of_image, "generate_image").await
}

/// Send an existing image plus instructions to the model and save the result
pub async fn modify_image(
    ctx: &ToolContext,
    source: &Path,
    dir: &str,
    prompt: &str,
    name_of_image: &str,
    dimensional_preference: &str,
) -> Result<SavedImage> {
    let client = ctx.genai()?;
    let bytes = open_an_image(source).await?;

    let request = GenerateRequest::new()
        .with_model(&ctx.image_model)
        .with_content(Content::user(vec![
            Part::text(format!("{}{}", prompt, dimensional_preference)),
            Part::inline_data(mime_type_for(source), bytes),
        ]))
        .with_config(GenerationConfig::text_and_image());

    log::debug!(
        "modify_image: model={} source={} name={}",
        ctx.image_model,
        source.display(),
        name_of_image
    );
    let response = client.generate_content(request).await?;

    save_first_image(&response, &ctx.resolve(dir), name_of_image, "modify_image").await
}

/// MIME type guessed from the file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/png")
}

async fn save_first_image(
    response: &GenerateResponse,
    dir: &Path,
    name_of_image: &str,
    operation: &str,
) -> Result<SavedImage> {
    let notes: Vec<String> = response.texts().map(str::to_string).collect();
    for note in &notes {
        log::info!("{}: {}", operation, note);
    }

    let (_, data) = response.first_image().ok_or_else(|| ToolbeltError::EmptyAiResponse {
        operation: operation.to_string(),
    })?;

    fs::create_dir_all(dir)
        .await
        .map_err(|e| ToolbeltError::io("create image directory", dir, e))?;

    let path = dir.join(format!("{}.png", name_of_image));
    let data = data.to_vec();
    let target = path.clone();

    tokio::task::spawn_blocking(move || {
        let image = image::load_from_memory(&data)?;
        image.save_with_format(&target, ImageFormat::Png)?;
        Ok::<_, ToolbeltError>(())
    })
    .await
    .map_err(|e| ToolbeltError::io("save image", &path, std::io::Error::other(e)))??;

    log::info!("Image {} saved to {}", name_of_image, path.display());
    Ok(SavedImage { path, notes })
}

pub struct OpenAnImageTool;

#[async_trait]
impl Tool for OpenAnImageTool {
    fn name(&self) -> &'static str {
        "open_an_image"
    }

    fn description(&self) -> &'static str {
        "Open and read an image file, returning the binary data."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required("path", "The file path to the image.")]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let path = ctx.resolve(args.str("path")?);
        Ok(ToolOutput::Bytes(open_an_image(&path).await?))
    }
}

pub struct MoveTheImageTool;

#[async_trait]
impl Tool for MoveTheImageTool {
    fn name(&self) -> &'static str {
        "move_the_image"
    }

    fn description(&self) -> &'static str {
        "Move an image file from one location to another."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("path_before", "The current file path of the image."),
            ParameterSpec::required("path_after", "The new file path where the image should be moved."),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let before = ctx.resolve(args.str("path_before")?);
        let after = ctx.resolve(args.str("path_after")?);
        move_the_image(&before, &after).await?;
        Ok(ToolOutput::Message(format!(
            "Image moved from {} to {}",
            before.display(),
            after.display()
        )))
    }
}

pub struct GenerateImageTool;

#[async_trait]
impl Tool for GenerateImageTool {
    fn name(&self) -> &'static str {
        "generate_image"
    }

    fn description(&self) -> &'static str {
        "Generate an image from a text prompt using the Gemini API."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("prompt", "The text prompt to generate the image from."),
            ParameterSpec::required(
                "dimensions",
                "The desired dimensions for the generated image (e.g., '512x512').",
            ),
            ParameterSpec::required(
                "path",
                "The directory path to save the image. If None or empty, saves to the current working directory.",
            ),
            ParameterSpec::required(
                "name_of_image",
                "The name to use for the saved image file (without extension).",
            ),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let name = args.str("name_of_image")?;
        let saved = generate_image(
            ctx,
            args.str("prompt")?,
            args.str("dimensions")?,
            args.str("path")?,
            name,
        )
        .await?;
        Ok(ToolOutput::Message(saved.summary(name)))
    }
}

pub struct ModifyImageTool;

#[async_trait]
impl Tool for ModifyImageTool {
    fn name(&self) -> &'static str {
        "modify_image"
    }

    fn description(&self) -> &'static str {
        "Modify an existing image based on a text prompt using the Gemini API."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("path_of_the_image_to_modify", "Path to the image file to be modified."),
            ParameterSpec::required(
                "path_to_save_the_image",
                "Directory path to save the modified image. If None or empty, saves to the current working directory.",
            ),
            ParameterSpec::required("prompt", "The text prompt describing the modification to apply."),
            ParameterSpec::required(
                "name_of_image",
                "The name to use for the saved modified image file (without extension).",
            ),
            ParameterSpec::required(
                "dimensional_preference",
                "Additional dimensional preferences for the modification (e.g., '512x512').",
            ),
        ]
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolOutput> {
        let source = ctx.resolve(args.str("path_of_the_image_to_modify")?);
        let name = args.str("name_of_image")?;
        let saved = modify_image(
            ctx,
            &source,
            args.str("path_to_save_the_image")?,
            args.str("prompt")?,
            name,
            args.str("dimensional_preference")?,
        )
        .await?;
        Ok(ToolOutput::Message(saved.summary(name)))
    }
}
