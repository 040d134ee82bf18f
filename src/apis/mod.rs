//! HTTP plumbing and the platform backend client

pub mod client;
pub mod platform;

pub use client::{HttpClient, RateLimiter};
pub use platform::{PlatformClient, PlatformLinkProbe};
