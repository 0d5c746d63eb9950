use super::tool::{InlineImage, ToolCallRequest, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    ToolResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    Text(String),
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
    ToolResult(ToolResult),
    /// Image produced by a tool, replayed to the model as user content.
    Image {
        call_id: String,
        tool: String,
        image: InlineImage,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn model_calls(text: Option<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::ToolCalls { text, calls },
        }
    }

    /// Result turn for a tool call. Image outputs become user attachments.
    pub fn from_tool_result(result: ToolResult) -> Self {
        if let Some(image) = result.image() {
            return Self {
                role: Role::User,
                content: TurnContent::Image {
                    call_id: result.call_id.clone(),
                    tool: result.tool.clone(),
                    image: image.clone(),
                },
            };
        }
        Self {
            role: Role::ToolResult,
            content: TurnContent::ToolResult(result),
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match &self.content {
            TurnContent::ToolCalls { calls, .. } => calls,
            _ => &[],
        }
    }

    /// Call id this turn answers, if it is a result of any kind.
    pub fn answers_call(&self) -> Option<&str> {
        match &self.content {
            TurnContent::ToolResult(result) => Some(&result.call_id),
            TurnContent::Image { call_id, .. } => Some(call_id),
            _ => None,
        }
    }
}

/// Append-only log of turns for one interaction.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// Calls from model turns that have no result turn yet.
    pub fn pending_calls(&self) -> Vec<&ToolCallRequest> {
        let answered: Vec<&str> = self.turns.iter().filter_map(Turn::answers_call).collect();
        self.turns
            .iter()
            .flat_map(Turn::tool_calls)
            .filter(|call| !answered.contains(&call.id.as_str()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
