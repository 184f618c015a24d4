//! R2 rules API client for r2ctl.

pub mod client;

pub use client::{ApiError, DEFAULT_BASE_URL, R2Client, normalize_base_url, save_request};
