//! # ISAPI Common Library
//!
//! Framework-independent pieces of the ISAPI mock device:
//! - Digest challenge/credential handling (api)
//! - Configuration loading
//! - ISAPI timestamp parsing and formatting
//! - Tolerant XML field extraction
//! - Recording search synthesis and the fixed device descriptor

pub mod api;
pub mod config;
pub mod device;
pub mod error;
pub mod recording;
pub mod time;
pub mod xml;

pub use error::{Error, Result};
