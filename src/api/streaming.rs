use crate::api::models::StreamResponse;
use crate::api::response::parse_arguments;
use crate::api::ModelResponse;
use crate::error::{QuickAskError, Result};
use crate::models::ToolCallRequest;
use colored::*;
use futures::StreamExt;
use std::collections::BTreeMap;
use tokio::time::{timeout, Duration};

#[derive(Default)]
struct PartialCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Folds SSE lines of a chat completions stream into one response.
///
/// Content deltas are handed to `on_fragment` as they arrive; tool call
/// deltas are merged by their `index`.
#[derive(Default)]
pub struct StreamAccumulator {
    content: String,
    calls: BTreeMap<usize, PartialCall>,
    done: bool,
    verbose: bool,
}

impl StreamAccumulator {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn handle_line(&mut self, line: &str, on_fragment: &mut (dyn FnMut(&str) + Send)) -> Result<()> {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            return Ok(());
        }

        let Some(colon_pos) = line.find(':') else {
            return Ok(());
        };
        let field = line[..colon_pos].trim();
        let value = line[colon_pos + 1..].trim_start();

        match field {
            "data" => {
                if value == "[DONE]" {
                    self.done = true;
                    return Ok(());
                }
                match serde_json::from_str::<StreamResponse>(value) {
                    Ok(parsed) => self.apply(parsed, on_fragment)?,
                    Err(e) => {
                        if self.verbose {
                            eprintln!("{}", format!("[AI] JSON parse error: {}", e).dimmed());
                        }
                    }
                }
            }
            "event" | "id" | "retry" => {
                if self.verbose {
                    eprintln!("{}", format!("[AI] SSE {}: {}", field, value).dimmed());
                }
            }
            _ => {
                if self.verbose {
                    eprintln!("{}", format!("[AI] Unknown SSE field: {}", field).dimmed());
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, parsed: StreamResponse, on_fragment: &mut (dyn FnMut(&str) + Send)) -> Result<()> {
        if let Some(error) = parsed.error {
            let status = error.code.and_then(|c| c.as_u64()).unwrap_or(0) as u16;
            return Err(QuickAskError::ApiError {
                status,
                message: error.message,
            });
        }

        for choice in parsed.choices.unwrap_or_default() {
            let Some(delta) = choice.delta else { continue };

            if let Some(content) = delta.content {
                if !content.is_empty() {
                    self.content.push_str(&content);
                    on_fragment(&content);
                }
            }

            for call_delta in delta.tool_calls.unwrap_or_default() {
                let partial = self.calls.entry(call_delta.index).or_default();
                if let Some(id) = call_delta.id {
                    partial.id = Some(id);
                }
                if let Some(function) = call_delta.function {
                    // Some providers repeat the name on every chunk
                    if let Some(name) = function.name.filter(|n| !n.is_empty()) {
                        partial.name = name;
                    }
                    if let Some(arguments) = function.arguments {
                        partial.arguments.push_str(&arguments);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> ModelResponse {
        let tool_calls = self
            .calls
            .into_iter()
            .filter(|(_, partial)| !partial.name.is_empty())
            .map(|(index, partial)| {
                ToolCallRequest::new(
                    partial.id.unwrap_or_else(|| format!("call_{}", index)),
                    partial.name,
                    parse_arguments(&partial.arguments),
                )
            })
            .collect();

        ModelResponse {
            text: if self.content.is_empty() {
                None
            } else {
                Some(self.content)
            },
            tool_calls,
            streamed: true,
        }
    }
}

/// Read an SSE response to completion, forwarding content fragments in order.
pub async fn process_streaming_response(
    response: reqwest::Response,
    timeout_secs: u64,
    verbose: bool,
    on_fragment: &mut (dyn FnMut(&str) + Send),
) -> Result<ModelResponse> {
    let mut stream = response.bytes_stream();
    let mut accumulator = StreamAccumulator::new(verbose);
    // Raw bytes so multi-byte characters split across chunks survive
    let mut pending: Vec<u8> = Vec::new();
    let chunk_timeout = Duration::from_secs(timeout_secs);

    loop {
        match timeout(chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => {
                let chunk = chunk.map_err(QuickAskError::NetworkError)?;
                pending.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(_) => {
                return Err(QuickAskError::Timeout(format!(
                    "no data received for {} seconds",
                    timeout_secs
                )));
            }
        }

        // Only complete lines are parsed; the tail waits for the next chunk
        while let Some(line_end) = pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = pending.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw[..line_end]);
            accumulator.handle_line(&line, on_fragment)?;
            if accumulator.is_done() {
                return Ok(accumulator.finish());
            }
        }
    }

    if !pending.is_empty() {
        accumulator.handle_line(&String::from_utf8_lossy(&pending), on_fragment)?;
    }

    if verbose && !accumulator.is_done() {
        eprintln!("{}", "[AI] Stream ended without [DONE]".dimmed());
    }

    Ok(accumulator.finish())
}
