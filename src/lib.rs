// ABOUTME: Library root for gssh - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod credentials;
pub mod error;
pub mod session;
pub mod ssh;
