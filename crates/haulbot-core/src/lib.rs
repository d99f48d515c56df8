//! Command resolution and conversational state engine for the haulbot.
//!
//! This crate is framework-agnostic. Telegram and persistence live behind
//! ports (traits) implemented in adapter crates; everything here works with
//! plain payload strings, per-chat sessions and typed commands.

pub mod access;
pub mod command;
pub mod config;
pub mod domain;
pub mod drafts;
pub mod engine;
pub mod errors;
pub mod features;
pub mod lifecycle;
pub mod logging;
pub mod messaging;
pub mod navigation;
pub mod ports;
pub mod session;
pub mod steps;

pub use errors::{Error, Result};
