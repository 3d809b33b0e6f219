//! HTTP plumbing shared by remote providers and the image preloader.

mod client;
mod preload;

pub use client::{extract_domain, HttpClient, RateLimitState};
pub use preload::{HttpPreloader, ImagePreloader, NoopPreloader};
