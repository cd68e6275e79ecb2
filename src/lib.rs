//! Multi-provider chat: conversations, provider adapters and the dispatch
//! engine tying them together, plus a terminal front end.

pub mod app;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod display;
pub mod input;
pub mod providers;

pub use crate::core::error::{ChatError, ProviderError};
