use crate::api::{ModelClient, ModelResponse};
use crate::delivery::{Artifact, Delivery};
use crate::error::Result;
use crate::models::{Conversation, ToolCallRequest, ToolSpec, Turn};
use crate::tools::ToolExecutor;
use colored::*;
use tokio_util::sync::CancellationToken;

/// States of one query's tool-calling loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCallRequest>),
    Done(String),
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Done { answer: String, rounds: usize },
    /// `message` is exactly what was delivered, `Error: ...`.
    Failed { message: String, rounds: usize },
    Cancelled { rounds: usize },
}

impl QueryOutcome {
    /// Number of model calls made.
    pub fn rounds(&self) -> usize {
        match self {
            QueryOutcome::Done { rounds, .. }
            | QueryOutcome::Failed { rounds, .. }
            | QueryOutcome::Cancelled { rounds } => *rounds,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, QueryOutcome::Done { .. })
    }
}

pub struct Orchestrator<'a> {
    model: &'a dyn ModelClient,
    executor: &'a ToolExecutor,
    max_rounds: usize,
    verbose: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(model: &'a dyn ModelClient, executor: &'a ToolExecutor, max_rounds: usize) -> Self {
        Self {
            model,
            executor,
            max_rounds: max_rounds.max(1),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    async fn call_model(
        &self,
        conversation: &Conversation,
        tools: &[ToolSpec],
        delivery: &mut Delivery<'_>,
        cancel: &CancellationToken,
    ) -> Option<Result<ModelResponse>> {
        let mut forward = |fragment: &str| delivery.text(fragment);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            response = self.model.submit(conversation, tools, &mut forward) => Some(response),
        }
    }

    /// Run one query to a terminal state. The user turn, every model turn
    /// and every tool result are appended to `conversation` in order.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        query: &str,
        delivery: &mut Delivery<'_>,
        cancel: &CancellationToken,
    ) -> QueryOutcome {
        conversation.push(Turn::user(query));

        let tools = self.executor.registry().specs();
        let mut rounds = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel if rounds >= self.max_rounds => LoopState::Failed(
                    format!("too many tool iterations ({})", self.max_rounds),
                ),
                LoopState::AwaitingModel => {
                    rounds += 1;
                    if self.verbose {
                        eprintln!(
                            "{}",
                            format!(
                                "[AI] Round {}: sending {} turns",
                                rounds,
                                conversation.len()
                            )
                            .dimmed()
                        );
                    }

                    match self.call_model(conversation, &tools, delivery, cancel).await {
                        None => LoopState::Cancelled,
                        Some(Err(e)) => LoopState::Failed(e.to_string()),
                        Some(Ok(response)) if response.tool_calls.is_empty() => {
                            let answer = response.text.unwrap_or_default();
                            if !response.streamed {
                                delivery.text(&answer);
                            }
                            conversation.push(Turn::model_text(answer.clone()));
                            LoopState::Done(answer)
                        }
                        Some(Ok(response)) => {
                            let calls = response.tool_calls;
                            conversation.push(Turn::model_calls(response.text, calls.clone()));
                            LoopState::ExecutingTools(calls)
                        }
                    }
                }
                LoopState::ExecutingTools(calls) => {
                    if self.verbose {
                        let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
                        eprintln!(
                            "{}",
                            format!("[tools] Executing: {}", names.join(", ")).dimmed()
                        );
                    }

                    let results = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        results = self.executor.execute_all(&calls) => Some(results),
                    };

                    match results {
                        None => LoopState::Cancelled,
                        Some(results) => {
                            for result in results {
                                delivery.artifact(&Artifact::from_tool_result(&result));
                                conversation.push(Turn::from_tool_result(result));
                            }
                            LoopState::AwaitingModel
                        }
                    }
                }
                LoopState::Done(answer) => return QueryOutcome::Done { answer, rounds },
                LoopState::Failed(reason) => {
                    let message = format!("Error: {}", reason);
                    delivery.end_line();
                    delivery.text(&message);
                    return QueryOutcome::Failed { message, rounds };
                }
                LoopState::Cancelled => {
                    if self.verbose {
                        eprintln!("{}", "[AI] Query cancelled".dimmed());
                    }
                    return QueryOutcome::Cancelled { rounds };
                }
            };
        }
    }
}
