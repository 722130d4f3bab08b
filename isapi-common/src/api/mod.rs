//! Shared authentication logic for the ISAPI mock
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The service crate wraps these with axum middleware.

pub mod digest;
pub mod nonce;

pub use digest::{
    authenticate, compute_response, AuthMode, AuthRejection, CredentialVerifier,
    DigestContext, DigestCredentials, FullDigest, QopParams, ShapeOnly,
};
pub use nonce::{challenge_header, generate_nonce, ChallengeToken};
