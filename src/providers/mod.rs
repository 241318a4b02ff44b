pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpBackend;
pub use traits::ChatBackend;
pub use types::{
    BackendError, FileUpload, GenerateRequest, GenerateResponse, UploadReply, UploadResponse,
};
