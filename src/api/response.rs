use crate::api::ModelResponse;
use crate::error::{QuickAskError, Result};
use crate::models::ToolCallRequest;
use serde_json::{json, Value};

fn first_message(response_json: &Value) -> Result<&Value> {
    if let Some(error) = response_json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let status = error.get("code").and_then(|c| c.as_u64()).unwrap_or(0) as u16;
        return Err(QuickAskError::ApiError { status, message });
    }

    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| QuickAskError::Other("No choices in response".to_string()))?;

    let first_choice = choices
        .first()
        .ok_or_else(|| QuickAskError::Other("Empty choices array".to_string()))?;

    first_choice
        .get("message")
        .ok_or_else(|| QuickAskError::Other("No message in response".to_string()))
}

/// Decode the JSON-encoded arguments of a function call. Empty input means
/// no arguments; anything unparsable is kept verbatim as a string so the
/// executor can report it back to the model.
pub fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Extract the tool calls of a non-streaming response.
pub fn parse_tool_calls(response_json: &Value) -> Result<Vec<ToolCallRequest>> {
    let message = first_message(response_json)?;

    let Some(raw_calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) else {
        return Ok(Vec::new());
    };

    let mut calls = Vec::with_capacity(raw_calls.len());
    for (index, raw) in raw_calls.iter().enumerate() {
        let function = raw.get("function");
        let name = function
            .and_then(|f| f.get("name"))
            .and_then(|n| n.as_str())
            .ok_or_else(|| {
                QuickAskError::Other(format!("Tool call {} is missing 'function.name'", index))
            })?;
        let id = raw
            .get("id")
            .and_then(|i| i.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("call_{}", index));
        let arguments = match function.and_then(|f| f.get("arguments")) {
            Some(Value::String(s)) => parse_arguments(s),
            Some(Value::Null) | None => json!({}),
            Some(other) => other.clone(),
        };
        calls.push(ToolCallRequest::new(id, name, arguments));
    }

    Ok(calls)
}

/// Extract the text content of a non-streaming response.
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;
    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string()))
}

pub fn parse_response(response_json: &Value) -> Result<ModelResponse> {
    Ok(ModelResponse {
        text: extract_content(response_json)?,
        tool_calls: parse_tool_calls(response_json)?,
        streamed: false,
    })
}
