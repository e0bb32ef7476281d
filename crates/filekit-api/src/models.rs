//! JSON bodies returned by the processing routes.

use filekit_processing::{ToolOutput, ToolResult};
use serde::Serialize;
use uuid::Uuid;

pub fn download_url(stored_name: &str) -> String {
    format!("/download/{}", stored_name)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutputLink {
    pub output_file: String,
    pub download_url: String,
    pub filename: String,
}

impl From<&ToolOutput> for OutputLink {
    fn from(output: &ToolOutput) -> Self {
        Self {
            output_file: output.stored_name.clone(),
            download_url: download_url(&output.stored_name),
            filename: output.display_name.clone(),
        }
    }
}

/// Success body for a finished tool run.
///
/// A single output is flattened into the top level; several outputs are
/// listed under `output_files`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ProcessResponse {
    Single {
        success: bool,
        #[serde(flatten)]
        output: OutputLink,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text_preview: Option<String>,
    },
    Multiple {
        success: bool,
        output_files: Vec<OutputLink>,
        message: String,
    },
}

impl From<ToolResult> for ProcessResponse {
    fn from(result: ToolResult) -> Self {
        match result.outputs.as_slice() {
            [only] => ProcessResponse::Single {
                success: true,
                output: only.into(),
                message: result.message,
                text_preview: result.text_preview,
            },
            outputs => ProcessResponse::Multiple {
                success: true,
                output_files: outputs.iter().map(OutputLink::from).collect(),
                message: result.message,
            },
        }
    }
}

/// Body of a 202 for `?mode=async`.
#[derive(Debug, Clone, Serialize)]
pub struct JobAccepted {
    pub success: bool,
    pub job_id: Uuid,
    pub status_url: String,
}

impl JobAccepted {
    pub fn new(job_id: Uuid) -> Self {
        Self {
            success: true,
            job_id,
            status_url: format!("/jobs/{}", job_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn output(name: &str) -> ToolOutput {
        ToolOutput {
            stored_name: format!("0b7e6a3c-1f0e-4a8e-9f0b-2f1d7c9e4b11_{}", name),
            display_name: name.to_string(),
            path: PathBuf::from("/tmp").join(name),
            content_type: "application/pdf",
        }
    }

    #[test]
    fn test_single_output_is_flattened() {
        let result = ToolResult::single(output("out.txt"), "Text extracted")
            .with_preview("hello".to_string());
        let json = serde_json::to_value(ProcessResponse::from(result)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["filename"], "out.txt");
        assert_eq!(
            json["download_url"],
            "/download/0b7e6a3c-1f0e-4a8e-9f0b-2f1d7c9e4b11_out.txt"
        );
        assert_eq!(json["text_preview"], "hello");
        assert!(json.get("output_files").is_none());
    }

    #[test]
    fn test_many_outputs_are_listed() {
        let result = ToolResult::many(vec![output("a.pdf"), output("b.pdf")], "Split into 2 files");
        let json = serde_json::to_value(ProcessResponse::from(result)).unwrap();

        assert_eq!(json["output_files"].as_array().unwrap().len(), 2);
        assert_eq!(json["output_files"][1]["filename"], "b.pdf");
        assert!(json.get("output_file").is_none());
    }
}
