//! Document export commands

use std::path::{Path, PathBuf};

use serde::Serialize;
use talkreport_domain::{Result, TalkReportError};
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// A document written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub byte_len: usize,
    /// Always 1 for PNG.
    pub page_count: usize,
}

/// Export the rendered report `element_id` as a paged PDF.
///
/// Writes to `output`, or to `<output_dir>/<element_id>.pdf`.
///
/// # Errors
/// Returns `NotFound` when no render exists for `element_id` and `Export`
/// when encoding or writing fails.
pub async fn export_pdf(
    ctx: &AppContext,
    element_id: &str,
    output: Option<&Path>,
) -> Result<ExportOutcome> {
    execute_logged("export::pdf", || async {
        let document = ctx.documents.export_pdf(element_id).await?;
        let path = target_path(ctx, element_id, output, "pdf");
        write_output(&path, &document.bytes).await?;
        info!(path = %path.display(), pages = document.page_count, "PDF written");
        Ok(ExportOutcome { path, byte_len: document.bytes.len(), page_count: document.page_count })
    })
    .await
}

/// Export the whole rendered report as a single PNG.
///
/// # Errors
/// See [`export_pdf`].
pub async fn export_png(
    ctx: &AppContext,
    element_id: &str,
    output: Option<&Path>,
) -> Result<ExportOutcome> {
    execute_logged("export::png", || async {
        let bytes = ctx.documents.export_png(element_id).await?;
        let path = target_path(ctx, element_id, output, "png");
        write_output(&path, &bytes).await?;
        info!(path = %path.display(), "PNG written");
        Ok(ExportOutcome { path, byte_len: bytes.len(), page_count: 1 })
    })
    .await
}

/// The PDF as standard base64, for attaching to a message.
///
/// # Errors
/// See [`export_pdf`].
pub async fn export_pdf_base64(ctx: &AppContext, element_id: &str) -> Result<String> {
    execute_logged("export::pdf_base64", || ctx.documents.export_pdf_base64(element_id)).await
}

fn target_path(ctx: &AppContext, element_id: &str, output: Option<&Path>, ext: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => ctx.output_dir().join(format!("{element_id}.{ext}")),
    }
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error =
        |err: std::io::Error| TalkReportError::Export(format!("cannot write {}: {err}", path.display()));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, bytes).await.map_err(io_error)
}
