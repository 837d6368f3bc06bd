//! Client for the generative vision classification API.
//!
//! An isolated, best-effort feature: given a photographed brand it asks the
//! model whether the brand is Thai-owned and what the shopper should do.
//! The host application must stay fully functional when this crate errors —
//! every failure is a typed [`VisionError`], never a panic.

mod client;
mod error;
mod types;

pub use client::VisionClient;
pub use error::VisionError;
pub use types::{Recommendation, ScanVerdict};
