//! # bifrost-cat
//!
//! A small interactive client for BAPS3 servers. Reads quoted command
//! lines from stdin, sends them correctly escaped, and prints each
//! decoded server line.
//!
//! - [`config`] — TOML configuration with defaults
//! - [`session`] — the stdin ⇄ server relay loop

pub mod config;
pub mod session;
