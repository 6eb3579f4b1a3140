use crate::api::traits::ResponseItem;
use serde::{Deserialize, Serialize};

/// Upload session state: `<fileUpload uploadSessionId="..." fileSize="..."/>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUploadType {
    #[serde(rename = "@uploadSessionId")]
    pub upload_session_id: String,
    /// Cumulative size in bytes.
    #[serde(rename = "@fileSize")]
    pub file_size: u64,
}

impl ResponseItem for FileUploadType {
    const ELEMENT: &'static str = "fileUpload";
    const COLLECTION: &'static str = "fileUploads";
}
