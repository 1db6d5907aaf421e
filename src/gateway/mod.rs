//! Gateway to the remote content/agent service.
//!
//! Every request goes through [`GatewayClient::call`], which forwards it to a
//! [`Transport`] and appends one [`GatewayCallRecord`] to the shared
//! [`CallLog`] whatever the outcome. The typed helpers in [`api`] sit on top
//! and are the only layer that interprets status codes and response fields.

pub mod api;
pub mod client;
pub mod http;
pub mod log;

pub use api::{ApplyPromptRequest, ChatRequest, CreateAgentRequest, IngestRequest, PromptInput};
pub use client::{GatewayClient, GatewayRequest, GatewayResponse, Method, Transport};
pub use http::HttpTransport;
pub use log::{CallLog, GatewayCallRecord};
