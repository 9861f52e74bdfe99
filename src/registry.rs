use crate::error::{Result, ShimError};
use crate::types::ToolDefinition;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// The reserved structured-output tool manufactured by the shim.
    Synthetic,
    /// A tool explicitly declared by the caller.
    Genuine,
}

/// Classifies tool names seen on the wire for one streamed request.
///
/// The reserved synthetic name and the genuine tool set are fixed at stream
/// start; concurrent streams each hold their own registry, there is no
/// process-wide tool state.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    synthetic: String,
    genuine: HashSet<String>,
}

impl ToolRegistry {
    pub fn new(
        synthetic: impl Into<String>,
        genuine: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let synthetic = synthetic.into();
        validate_tool_name(&synthetic)?;

        let mut names = HashSet::new();
        for name in genuine {
            validate_tool_name(&name)?;
            if name == synthetic {
                return Err(ShimError::InvalidInput(format!(
                    "tool name {name} is reserved for structured output"
                )));
            }
            names.insert(name);
        }

        Ok(Self {
            synthetic,
            genuine: names,
        })
    }

    pub fn from_tools(synthetic: impl Into<String>, tools: &[ToolDefinition]) -> Result<Self> {
        Self::new(synthetic, tools.iter().map(|t| t.name.clone()))
    }

    pub fn synthetic_name(&self) -> &str {
        &self.synthetic
    }

    pub fn classify(&self, name: &str) -> Result<ToolKind> {
        if name == self.synthetic {
            return Ok(ToolKind::Synthetic);
        }
        if self.genuine.contains(name) {
            return Ok(ToolKind::Genuine);
        }
        Err(ShimError::UnknownTool {
            name: name.to_string(),
        })
    }
}

pub fn validate_tool_name(name: &str) -> Result<()> {
    // OpenAI tool names must match: ^[a-zA-Z0-9_-]+$
    if name.is_empty() {
        return Err(ShimError::InvalidInput("tool name is empty".to_string()));
    }
    if let Some(ch) = name
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_' && *ch != '-')
    {
        return Err(ShimError::InvalidInput(format!(
            "tool name {name} contains invalid character {ch:?}"
        )));
    }
    Ok(())
}
