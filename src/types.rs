use serde::{Deserialize, Serialize};

/// One incremental unit from the upstream provider adapter.
///
/// Providers that simulate structured output do so by streaming a hidden
/// tool invocation; fragments carry the tool name so each one can be
/// classified without lookahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    Content {
        payload: String,
    },
    ToolCallStart {
        tool_call_id: String,
        tool_name: String,
    },
    ToolCallDelta {
        tool_call_id: String,
        tool_name: String,
        /// Partial JSON of the tool arguments.
        payload: String,
    },
    ToolCallEnd {
        tool_call_id: String,
        tool_name: String,
    },
    Completion {
        /// Provider-reported reason; replaced during reconciliation.
        reason: String,
    },
}

impl Fragment {
    /// Tool name carried by this fragment, if it is a tool-call kind.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Fragment::ToolCallStart { tool_name, .. }
            | Fragment::ToolCallDelta { tool_name, .. }
            | Fragment::ToolCallEnd { tool_name, .. } => Some(tool_name),
            _ => None,
        }
    }
}

/// One unit of the normalized, OpenAI-compatible output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputFragment {
    Content {
        payload: String,
    },
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        /// Arguments delta; empty on the announcement fragment.
        payload: String,
    },
    Completion {
        finish_reason: FinishReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::ToolCalls => "tool_calls",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a `ToolDefinition` after validating the name against provider constraints.
    pub fn validated(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> crate::error::Result<Self> {
        let name = name.into();
        crate::registry::validate_tool_name(&name)?;
        Ok(Self {
            name,
            description: description.into(),
            parameters,
        })
    }
}
