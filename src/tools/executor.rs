use super::registry::ToolRegistry;
use crate::models::{ToolCallRequest, ToolOutput, ToolResult};
use colored::*;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Runs tool calls against the registry. Never fails: every problem is
/// folded into the returned [`ToolResult`] so the model sees it as data.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    call_timeout: Duration,
    verbose: bool,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, call_timeout: Duration) -> Self {
        Self {
            registry,
            call_timeout,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(&self, request: &ToolCallRequest) -> ToolResult {
        let Some(tool) = self.registry.lookup(&request.name) else {
            return ToolResult::failure(request, format!("Tool '{}' not found", request.name));
        };

        if let Value::String(raw) = &request.arguments {
            return ToolResult::failure(
                request,
                format!(
                    "failed to parse arguments for tool '{}': not a JSON object: {}",
                    request.name, raw
                ),
            );
        }

        if let Err(details) = tool.validate(&request.arguments) {
            return ToolResult::failure(request, format!("Invalid arguments: {}", details));
        }

        if self.verbose {
            let args_json = request.arguments.to_string();
            let args_preview = if args_json.chars().count() > 100 {
                format!("{}...", args_json.chars().take(100).collect::<String>())
            } else {
                args_json
            };
            eprintln!(
                "{}",
                format!("[tools] run: {} {}", request.name, args_preview).dimmed()
            );
        }

        let start_time = Instant::now();
        let invocation = AssertUnwindSafe(tool.invoke(request.arguments.clone())).catch_unwind();
        let outcome = match timeout(self.call_timeout, invocation).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(format!("Tool '{}' panicked during execution", request.name)),
            Err(_) => Err(format!(
                "Tool '{}' timed out after {} seconds",
                request.name,
                self.call_timeout.as_secs()
            )),
        };

        if self.verbose {
            let status = match &outcome {
                Ok(ToolOutput::Data(_)) => "ok".to_string(),
                Ok(ToolOutput::Image(image)) => format!("image, {} bytes", image.byte_len()),
                Err(e) => format!("error: {}", e),
            };
            eprintln!(
                "{}",
                format!(
                    "[tools] done: {} ({}, {:.2}s)",
                    request.name,
                    status,
                    start_time.elapsed().as_secs_f64()
                )
                .dimmed()
            );
        }

        match outcome {
            Ok(output) => ToolResult::success(request, output),
            Err(message) => ToolResult::failure(request, message),
        }
    }

    /// Run one round of calls concurrently; results come back in request order.
    pub async fn execute_all(&self, requests: &[ToolCallRequest]) -> Vec<ToolResult> {
        join_all(requests.iter().map(|request| self.execute(request))).await
    }
}
