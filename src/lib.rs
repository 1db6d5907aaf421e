//! page-chat: chat with an agent about the content of a web page.

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod repl;
pub mod workflow;
