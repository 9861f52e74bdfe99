//! Structured-output stream reconciliation for tool-calling LLM providers.
//!
//! Providers without a native response-format feature simulate it by forcing
//! a hidden tool invocation. This crate re-emits such a provider stream in
//! the OpenAI-compatible shape: hidden-tool fragments become content, genuine
//! tool fragments stay tool calls, and the terminal finish reason is `stop`
//! unless a genuine tool was invoked.

mod error;
mod format;
mod reconcile;
mod registry;
mod stream;
mod types;

pub use error::{Result, ShimError};
pub use format::{DEFAULT_SYNTHETIC_TOOL_NAME, request_tools, synthetic_tool};
pub use reconcile::{Reconciler, StreamState};
pub use registry::{ToolKind, ToolRegistry, validate_tool_name};
pub use stream::{OutputStream, reconcile_stream};
pub use types::{FinishReason, Fragment, OutputFragment, ToolDefinition};
