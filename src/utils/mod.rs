//! Utility modules for thumbtheme

pub mod filesystem;
pub mod hashing;
