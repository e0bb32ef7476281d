use filekit_core::ToolDescriptor;
use filekit_storage::{content_type_for, OutputSlot};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;

use crate::params::ToolParams;

/// A saved upload handed to a tool.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub original_name: String,
}

impl InputFile {
    /// Original name without its extension, for naming outputs.
    pub fn stem(&self) -> &str {
        match self.original_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.original_name,
        }
    }
}

/// Everything a handler needs to run one tool once.
///
/// Clones share the job's worker slot. Handlers move a clone into blocking
/// threads, so the slot is released only when the last copy is dropped,
/// even if the caller stopped waiting.
#[derive(Debug, Clone)]
pub struct ToolJob {
    pub tool: &'static ToolDescriptor,
    pub inputs: Vec<InputFile>,
    pub params: ToolParams,
    worker_slot: Option<Arc<OwnedSemaphorePermit>>,
}

impl ToolJob {
    pub fn new(tool: &'static ToolDescriptor, inputs: Vec<InputFile>, params: ToolParams) -> Self {
        Self {
            tool,
            inputs,
            params,
            worker_slot: None,
        }
    }

    /// Attach the worker-pool permit this job runs under.
    pub fn holding(mut self, permit: OwnedSemaphorePermit) -> Self {
        self.worker_slot = Some(Arc::new(permit));
        self
    }

    pub fn tool_id(&self) -> &'static str {
        self.tool.id
    }

    /// The first input. Intake guarantees at least one.
    pub fn primary(&self) -> &InputFile {
        &self.inputs[0]
    }
}

/// A file a handler wrote into the temp directory.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub stored_name: String,
    pub display_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub content_type: &'static str,
}

impl From<OutputSlot> for ToolOutput {
    fn from(slot: OutputSlot) -> Self {
        let content_type = content_type_for(&slot.display_name);
        Self {
            stored_name: slot.stored_name,
            display_name: slot.display_name,
            path: slot.path,
            content_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub outputs: Vec<ToolOutput>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
}

impl ToolResult {
    pub fn single(output: impl Into<ToolOutput>, message: impl Into<String>) -> Self {
        Self {
            outputs: vec![output.into()],
            message: message.into(),
            text_preview: None,
        }
    }

    pub fn many(outputs: Vec<ToolOutput>, message: impl Into<String>) -> Self {
        Self {
            outputs,
            message: message.into(),
            text_preview: None,
        }
    }

    pub fn with_preview(mut self, preview: String) -> Self {
        self.text_preview = Some(preview);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        let input = InputFile {
            path: PathBuf::from("/tmp/x"),
            original_name: "holiday.photo.jpg".to_string(),
        };
        assert_eq!(input.stem(), "holiday.photo");

        let bare = InputFile {
            path: PathBuf::from("/tmp/x"),
            original_name: "README".to_string(),
        };
        assert_eq!(bare.stem(), "README");
    }

    #[tokio::test]
    async fn test_worker_slot_outlives_the_original_job() {
        let pool = Arc::new(tokio::sync::Semaphore::new(1));
        let permit = pool.clone().acquire_owned().await.unwrap();
        let job = ToolJob::new(
            filekit_core::find_tool("pdf-to-text").unwrap(),
            Vec::new(),
            ToolParams::default(),
        )
        .holding(permit);

        let in_flight = job.clone();
        drop(job);
        assert_eq!(pool.available_permits(), 0);

        drop(in_flight);
        assert_eq!(pool.available_permits(), 1);
    }

    #[test]
    fn test_output_content_type_follows_display_name() {
        let slot = OutputSlot {
            path: PathBuf::from("/tmp/abc_out.pdf"),
            stored_name: "abc_out.pdf".to_string(),
            display_name: "out.pdf".to_string(),
        };
        let output: ToolOutput = slot.into();
        assert_eq!(output.content_type, "application/pdf");
    }
}
