// Library root
// ------------
// Uploads image files and image URLs to ptpimg.me and returns the hosted
// URLs. The binary (`main.rs`) is a thin wrapper around `ui::run`.
//
// Module responsibilities:
// - `api`: the `Uploader`, which builds and sends the multipart requests
//   and turns responses into URLs.
// - `item`: classification of command-line items and construction of the
//   file parts (MIME type and filename rules).
// - `retry`: fixed-backoff retry for transport failures.
// - `error`: the closed set of errors the library returns.
// - `config`: uploader configuration and the command-line arguments.
// - `clipboard`: optional clipboard access behind a trait.
// - `ui`: the terminal flow used by the binary.
pub mod api;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod item;
pub mod retry;
pub mod ui;

pub use api::{upload, UploadedImage, Uploader};
pub use config::UploaderConfig;
pub use error::{ErrorKind, UploadError, UploadFailure, UploadResult};
pub use item::{UploadItem, UploadRequest};
pub use retry::RetryPolicy;
