//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64url, constant-time compare)
//! - Password hashing (Argon2id)
//! - Cookie and bearer-token transport helpers

pub mod cookie;
pub mod crypto;
pub mod password;
