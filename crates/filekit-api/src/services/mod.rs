pub mod intake;
pub mod runner;

pub use intake::{read_upload_form, save_inputs, ReceivedFile, UploadForm};
pub use runner::ToolRunner;
