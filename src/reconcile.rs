use crate::error::{Result, ShimError};
use crate::registry::{ToolKind, ToolRegistry};
use crate::types::{FinishReason, Fragment, OutputFragment};

/// Transient per-request state. Created at stream start, discarded when the
/// terminal fragment is emitted or the stream errors.
#[derive(Debug, Default)]
pub struct StreamState {
    genuine_invoked: bool,
    synthetic_invoked: bool,
    open_tool_call: Option<String>,
    completed: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the terminal completion fragment has been emitted.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn genuine_invoked(&self) -> bool {
        self.genuine_invoked
    }

    pub fn synthetic_invoked(&self) -> bool {
        self.synthetic_invoked
    }
}

/// Re-emits a provider fragment stream in the OpenAI-compatible shape:
/// synthetic structured-output tool fragments become content, genuine tool
/// fragments stay tool calls, and the terminal finish reason reflects
/// whether any genuine tool was invoked.
#[derive(Debug, Clone)]
pub struct Reconciler {
    registry: ToolRegistry,
}

impl Reconciler {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Process one incoming fragment, returning the fragments to emit
    /// downstream. Single pass: each fragment's re-kinding depends only on
    /// its own tool name; only the terminal completion depends on
    /// accumulated state.
    pub fn process(
        &self,
        fragment: Fragment,
        state: &mut StreamState,
    ) -> Result<Vec<OutputFragment>> {
        if state.completed {
            return Err(ShimError::Protocol(
                "fragment received after completion".to_string(),
            ));
        }

        match fragment {
            Fragment::Content { payload } => Ok(vec![OutputFragment::Content { payload }]),

            Fragment::ToolCallStart {
                tool_call_id,
                tool_name,
            } => match self.registry.classify(&tool_name)? {
                ToolKind::Synthetic => {
                    state.synthetic_invoked = true;
                    // Providers stream calls sequentially; a new start closes
                    // any still-open prior call.
                    state.open_tool_call = Some(tool_call_id);
                    Ok(Vec::new())
                }
                ToolKind::Genuine => {
                    state.genuine_invoked = true;
                    state.open_tool_call = Some(tool_call_id.clone());
                    Ok(vec![OutputFragment::ToolCall {
                        tool_call_id,
                        tool_name,
                        payload: String::new(),
                    }])
                }
            },

            Fragment::ToolCallDelta {
                tool_call_id,
                tool_name,
                payload,
            } => match self.registry.classify(&tool_name)? {
                ToolKind::Synthetic => {
                    state.synthetic_invoked = true;
                    // Payload is forwarded as raw text even when the partial
                    // JSON is malformed; never fatal.
                    Ok(vec![OutputFragment::Content { payload }])
                }
                ToolKind::Genuine => {
                    state.genuine_invoked = true;
                    // Genuine payloads are forwarded as-is; argument
                    // validation is the caller's responsibility.
                    Ok(vec![OutputFragment::ToolCall {
                        tool_call_id,
                        tool_name,
                        payload,
                    }])
                }
            },

            Fragment::ToolCallEnd {
                tool_call_id,
                tool_name,
            } => {
                match self.registry.classify(&tool_name)? {
                    ToolKind::Synthetic => state.synthetic_invoked = true,
                    ToolKind::Genuine => state.genuine_invoked = true,
                }
                if state.open_tool_call.as_deref() == Some(tool_call_id.as_str()) {
                    state.open_tool_call = None;
                }
                Ok(Vec::new())
            }

            Fragment::Completion { reason } => {
                tracing::debug!(provider_reason = %reason, "normalizing completion");
                // Normal end of stream closes any call the provider left open.
                state.open_tool_call = None;
                state.completed = true;
                let finish_reason = if state.genuine_invoked {
                    FinishReason::ToolCalls
                } else {
                    FinishReason::Stop
                };
                Ok(vec![OutputFragment::Completion { finish_reason }])
            }
        }
    }
}
