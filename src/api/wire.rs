use crate::api::models::{FunctionCall, WireMessage, WireToolCall};
use crate::models::{Conversation, Role, Turn, TurnContent};
use serde_json::{json, Value};

fn tool_message(call_id: &str, content: &Value) -> WireMessage {
    WireMessage {
        role: "tool".to_string(),
        content: Some(Value::String(content.to_string())),
        tool_calls: None,
        tool_call_id: Some(call_id.to_string()),
    }
}

fn assistant_calls(text: &Option<String>, turn: &Turn) -> WireMessage {
    let tool_calls = turn
        .tool_calls()
        .iter()
        .map(|call| WireToolCall {
            id: call.id.clone(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        })
        .collect();

    WireMessage {
        role: "assistant".to_string(),
        content: text.clone().map(Value::String),
        tool_calls: Some(tool_calls),
        tool_call_id: None,
    }
}

/// Encode the conversation as chat completions messages.
///
/// The API requires every tool call of an assistant message to be answered
/// by `tool` messages placed directly after it, and only accepts images in
/// `user` messages. Result turns of one round are therefore emitted as
/// `tool` messages first (images acknowledged with a placeholder), followed
/// by one `user` message per image.
pub fn to_wire_messages(system: Option<&str>, conversation: &Conversation) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    if let Some(system) = system {
        messages.push(WireMessage::text("system", system));
    }

    let mut deferred_images: Vec<WireMessage> = Vec::new();

    for turn in conversation.turns() {
        let is_result = turn.answers_call().is_some();
        if !is_result {
            messages.append(&mut deferred_images);
        }

        match &turn.content {
            TurnContent::Text(text) => {
                let role = match turn.role {
                    Role::Model => "assistant",
                    _ => "user",
                };
                messages.push(WireMessage::text(role, text.clone()));
            }
            TurnContent::ToolCalls { text, .. } => {
                messages.push(assistant_calls(text, turn));
            }
            TurnContent::ToolResult(result) => {
                messages.push(tool_message(&result.call_id, &result.envelope()));
            }
            TurnContent::Image {
                call_id,
                tool,
                image,
            } => {
                messages.push(tool_message(
                    call_id,
                    &json!({ "tool": tool, "result": "image attached" }),
                ));
                deferred_images.push(WireMessage {
                    role: "user".to_string(),
                    content: Some(json!([
                        {
                            "type": "image_url",
                            "image_url": { "url": image.data_url() }
                        },
                        {
                            "type": "text",
                            "text": format!("Image returned by the {} tool.", tool)
                        }
                    ])),
                    tool_calls: None,
                    tool_call_id: None,
                });
            }
        }
    }

    messages.append(&mut deferred_images);
    messages
}
