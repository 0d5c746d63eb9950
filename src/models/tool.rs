use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Static descriptor of a tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema (draft 7) describing the argument object.
    pub parameters: Value,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    /// Spec for a tool that takes no arguments.
    pub fn without_parameters(name: &str, description: &str) -> Self {
        Self::new(
            name,
            description,
            json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        )
    }

    /// Function-tool entry in the chat completions format.
    pub fn to_function_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64, standard alphabet.
    pub data: String,
}

impl InlineImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Approximate decoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Data(Value),
    Image(InlineImage),
}

/// Outcome of one tool call, tagged with the call it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub tool: String,
    pub outcome: Result<ToolOutput, String>,
}

impl ToolResult {
    pub fn success(request: &ToolCallRequest, output: ToolOutput) -> Self {
        Self {
            call_id: request.id.clone(),
            tool: request.name.clone(),
            outcome: Ok(output),
        }
    }

    pub fn failure(request: &ToolCallRequest, message: impl Into<String>) -> Self {
        Self {
            call_id: request.id.clone(),
            tool: request.name.clone(),
            outcome: Err(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn image(&self) -> Option<&InlineImage> {
        match &self.outcome {
            Ok(ToolOutput::Image(image)) => Some(image),
            _ => None,
        }
    }

    /// `{tool, result}` envelope fed back to the model. Image payloads are
    /// never inlined here; they travel as user attachments.
    pub fn envelope(&self) -> Value {
        let result = match &self.outcome {
            Ok(ToolOutput::Data(value)) => value.clone(),
            Ok(ToolOutput::Image(_)) => json!("image attached"),
            Err(message) => json!({ "error": message }),
        };
        json!({ "tool": self.tool, "result": result })
    }
}
