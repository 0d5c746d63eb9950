pub mod client;
pub mod models;
pub mod response;
pub mod streaming;
pub mod wire;

use crate::error::Result;
use crate::models::{Conversation, ToolCallRequest, ToolSpec};
use futures::future::BoxFuture;

pub use client::{make_api_request, ChatClient};
pub use models::RequestBody;
pub use streaming::process_streaming_response;

/// What the model answered in one round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    /// Text was already forwarded fragment by fragment.
    pub streamed: bool,
}

/// Boundary to the hosted model.
pub trait ModelClient: Send + Sync {
    /// Send the whole conversation with the declared tools. Streaming
    /// implementations pass content fragments to `on_fragment` in arrival
    /// order and set `streamed` on the response.
    fn submit<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolSpec],
        on_fragment: &'a mut (dyn FnMut(&str) + Send),
    ) -> BoxFuture<'a, Result<ModelResponse>>;
}
