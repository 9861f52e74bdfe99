use crate::error::{Result, ShimError};
use crate::registry::validate_tool_name;
use crate::types::ToolDefinition;

/// Reserved name of the hidden tool used to simulate a response format. A
/// plain sentinel compared against tool names; callers may choose another
/// reserved name via `ToolRegistry::new`.
pub const DEFAULT_SYNTHETIC_TOOL_NAME: &str = "json_response";

/// Manufacture the hidden tool that carries the caller's response-format
/// schema. Forcing the provider into this tool simulates structured output
/// on providers without a native response-format feature.
pub fn synthetic_tool(schema: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: DEFAULT_SYNTHETIC_TOOL_NAME.to_string(),
        description: "Return the final answer as JSON matching the response schema.".to_string(),
        parameters: schema,
    }
}

/// Compose the request-side tool list: the caller's genuine tools plus the
/// synthetic structured-output tool appended last.
pub fn request_tools(
    genuine: &[ToolDefinition],
    schema: serde_json::Value,
) -> Result<Vec<ToolDefinition>> {
    for t in genuine {
        validate_tool_name(&t.name)?;
        if t.name == DEFAULT_SYNTHETIC_TOOL_NAME {
            return Err(ShimError::InvalidInput(format!(
                "tool name {} is reserved for structured output",
                t.name
            )));
        }
    }
    let mut out = genuine.to_vec();
    out.push(synthetic_tool(schema));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn synthetic_tool_carries_the_response_schema() {
        let schema = json!({
            "type": "object",
            "properties": { "answer": { "type": "string" } },
            "required": ["answer"]
        });
        let tool = synthetic_tool(schema.clone());
        assert_eq!(tool.name, DEFAULT_SYNTHETIC_TOOL_NAME);
        assert_eq!(tool.parameters, schema);
    }

    #[test]
    fn request_tools_appends_synthetic_last() {
        let genuine = vec![
            ToolDefinition::validated("get_weather", "get weather", json!({})).expect("valid"),
        ];
        let tools = request_tools(&genuine, json!({})).expect("compose");
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "get_weather");
        assert_eq!(tools[1].name, DEFAULT_SYNTHETIC_TOOL_NAME);
    }

    #[test]
    fn request_tools_rejects_reserved_name_collision() {
        let genuine = vec![ToolDefinition {
            name: DEFAULT_SYNTHETIC_TOOL_NAME.to_string(),
            description: "collides".to_string(),
            parameters: json!({}),
        }];
        let err = request_tools(&genuine, json!({})).unwrap_err();
        assert!(matches!(err, ShimError::InvalidInput(_)));
    }
}
