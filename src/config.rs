// Configuration for the uploader and the command-line arguments that feed
// it. The library only needs `UploaderConfig`; `Args` is what the binary
// parses and turns into one.

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::retry::RetryPolicy;

pub const DEFAULT_HOST: &str = "https://ptpimg.me";
pub const API_KEY_ENV: &str = "PTPIMG_API_KEY";

/// Everything an [`crate::api::Uploader`] needs besides the items.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub api_key: String,
    /// Base URL of the image host, without trailing slash. Point it at an
    /// API-compatible mirror to upload elsewhere.
    pub host: String,
    /// Applied to both the remote fetch and the upload. `None` waits forever.
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl UploaderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: DEFAULT_HOST.to_string(),
            timeout: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn upload_endpoint(&self) -> String {
        format!("{}/upload.php", self.host)
    }

    pub fn referer(&self) -> String {
        format!("{}/index.php", self.host)
    }

    pub fn image_url(&self, code: &str, ext: &str) -> String {
        format!("{}/{}.{}", self.host, code, ext)
    }
}

/// PTPImg uploader
#[derive(Parser, Debug, Clone)]
#[command(name = "ptpimg_uploader", version, about = "PTPImg uploader")]
pub struct Args {
    /// Image files or image URLs to upload
    #[arg(value_name = "filename|url", required_unless_present = "clip")]
    pub images: Vec<String>,

    /// PTPImg API key (or set the PTPIMG_API_KEY environment variable)
    #[arg(short = 'k', long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Do not copy the resulting URLs to the clipboard
    #[arg(short = 'n', long = "dont-copy")]
    pub dont_copy: bool,

    /// Copy image from clipboard. Image can either be a path to the image
    /// or a url to the image
    #[arg(long)]
    pub clip: bool,

    /// Output links in BBCode format (with [img] tags)
    #[arg(short = 'b', long)]
    pub bbcode: bool,

    /// Do not bell in a terminal on completion
    #[arg(long)]
    pub nobell: bool,

    /// Image host to upload to
    #[arg(long, env = "PTPIMG_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Request timeout in seconds
    #[arg(long, env = "PTPIMG_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Save the API key for later runs
    #[arg(long)]
    pub save_key: bool,

    /// More output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    /// Non-positive, non-finite or out-of-range timeouts mean "no timeout".
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn uploader_config(&self, api_key: impl Into<String>) -> UploaderConfig {
        UploaderConfig::new(api_key)
            .with_host(self.host.clone())
            .with_timeout(self.timeout())
    }
}
