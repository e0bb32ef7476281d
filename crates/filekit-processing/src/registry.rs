//! Tool dispatch.
//!
//! Lookup is two-level: the catalog gives a tool's category, and the
//! category's handler matches the exact id. Every handler error passes
//! through [`ToolRegistry::dispatch`], which logs it with the tool id.

use crate::document::PdfToolHandler;
use crate::error::{ProcessingError, ProcessingResult};
use crate::image::ImageToolHandler;
use crate::job::{ToolJob, ToolResult};
use crate::media::{AudioToolHandler, MediaRunner, VideoToolHandler};
use async_trait::async_trait;
use filekit_core::{find_tool, Category, Config, ToolDescriptor};
use filekit_storage::TempStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// One category's worth of tools.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn category(&self) -> Category;

    /// Ids this handler answers for.
    fn tool_ids(&self) -> &'static [&'static str];

    async fn run(&self, job: &ToolJob) -> ProcessingResult<ToolResult>;

    fn handles(&self, tool_id: &str) -> bool {
        self.tool_ids().contains(&tool_id)
    }
}

/// Locations of the external binaries some tools shell out to.
#[derive(Debug, Clone)]
pub struct ProcessingSettings {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub pdftoppm_path: String,
}

impl ProcessingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            pdftoppm_path: config.pdftoppm_path.clone(),
        }
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            pdftoppm_path: "pdftoppm".to_string(),
        }
    }
}

pub struct ToolRegistry {
    handlers: HashMap<Category, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new(store: TempStore, settings: ProcessingSettings) -> Self {
        let runner = MediaRunner::new(settings.ffmpeg_path, settings.ffprobe_path);

        let handlers: [Arc<dyn ToolHandler>; 4] = [
            Arc::new(PdfToolHandler::new(store.clone(), settings.pdftoppm_path)),
            Arc::new(ImageToolHandler::new(store.clone())),
            Arc::new(VideoToolHandler::new(store.clone(), runner.clone())),
            Arc::new(AudioToolHandler::new(store, runner)),
        ];

        Self {
            handlers: handlers
                .into_iter()
                .map(|handler| (handler.category(), handler))
                .collect(),
        }
    }

    /// Catalog entry and handler for `tool_id`.
    pub fn resolve(&self, tool_id: &str) -> ProcessingResult<(&'static ToolDescriptor, Arc<dyn ToolHandler>)> {
        let tool = find_tool(tool_id).ok_or_else(|| ProcessingError::UnknownTool(tool_id.to_string()))?;
        let handler = self
            .handlers
            .get(&tool.category)
            .filter(|h| h.handles(tool_id))
            .ok_or_else(|| ProcessingError::UnknownTool(tool_id.to_string()))?;
        Ok((tool, handler.clone()))
    }

    pub async fn dispatch(&self, job: &ToolJob) -> ProcessingResult<ToolResult> {
        let tool_id = job.tool_id();
        let (_, handler) = self.resolve(tool_id)?;
        let started = Instant::now();

        match handler.run(job).await {
            Ok(result) => {
                tracing::info!(
                    tool_id,
                    outputs = result.outputs.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tool completed"
                );
                Ok(result)
            }
            Err(e) => {
                match &e {
                    ProcessingError::InvalidInput(_)
                    | ProcessingError::Image(_)
                    | ProcessingError::Pdf(_) => {
                        tracing::warn!(tool_id, error = %e, "Tool rejected input")
                    }
                    ProcessingError::Join(join) if join.is_panic() => {
                        tracing::warn!(tool_id, error = %e, "Tool panicked on input")
                    }
                    _ => tracing::error!(tool_id, error = %e, "Tool failed"),
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filekit_core::TOOLS;

    async fn registry() -> (tempfile::TempDir, ToolRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new(dir.path()).await.unwrap();
        (dir, ToolRegistry::new(store, ProcessingSettings::default()))
    }

    #[tokio::test]
    async fn test_every_catalog_tool_has_exactly_one_handler() {
        let (_dir, registry) = registry().await;

        for tool in TOOLS {
            let claimed = registry
                .handlers
                .values()
                .filter(|h| h.handles(tool.id))
                .count();
            assert_eq!(claimed, 1, "{} is claimed by {} handlers", tool.id, claimed);

            let (descriptor, handler) = registry.resolve(tool.id).unwrap();
            assert_eq!(descriptor.id, tool.id);
            assert_eq!(handler.category(), tool.category);
        }
    }

    #[tokio::test]
    async fn test_handlers_only_claim_catalog_tools() {
        let (_dir, registry) = registry().await;
        for handler in registry.handlers.values() {
            for id in handler.tool_ids() {
                assert!(find_tool(id).is_some(), "{} is not in the catalog", id);
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_not_a_panic() {
        let (_dir, registry) = registry().await;
        assert!(matches!(
            registry.resolve("pdf-teleporter"),
            Err(ProcessingError::UnknownTool(_))
        ));
        assert!(matches!(registry.resolve(""), Err(ProcessingError::UnknownTool(_))));
    }
}
