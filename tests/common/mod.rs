#![allow(dead_code)]

use futures::future::BoxFuture;
use futures::FutureExt;
use quickask::api::{ModelClient, ModelResponse};
use quickask::delivery::{Artifact, Presenter};
use quickask::models::{Conversation, InlineImage, ToolCallRequest, ToolOutput, ToolSpec};
use quickask::tools::{ToolExecutor, ToolRegistry};
use quickask::{QuickAskError, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum Step {
    Text(&'static str),
    Calls(Vec<ToolCallRequest>),
    Stream(Vec<&'static str>),
    StreamThenTimeout(Vec<&'static str>, &'static str),
    Timeout(&'static str),
    Hang,
}

/// Model stand-in that replays a fixed script, one step per call.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    seen_turns: Mutex<Vec<usize>>,
    seen_tools: Mutex<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            seen_turns: Mutex::new(Vec::new()),
            seen_tools: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen_turns.lock().unwrap().len()
    }

    /// Conversation length observed by each call.
    pub fn seen_turns(&self) -> Vec<usize> {
        self.seen_turns.lock().unwrap().clone()
    }

    pub fn seen_tools(&self) -> Vec<Vec<String>> {
        self.seen_tools.lock().unwrap().clone()
    }
}

impl ModelClient for ScriptedModel {
    fn submit<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolSpec],
        on_fragment: &'a mut (dyn FnMut(&str) + Send),
    ) -> BoxFuture<'a, Result<ModelResponse>> {
        async move {
            self.seen_turns.lock().unwrap().push(conversation.len());
            self.seen_tools
                .lock()
                .unwrap()
                .push(tools.iter().map(|t| t.name.clone()).collect());
            let step = self.steps.lock().unwrap().pop_front();

            match step {
                Some(Step::Text(text)) => Ok(ModelResponse {
                    text: Some(text.to_string()),
                    tool_calls: Vec::new(),
                    streamed: false,
                }),
                Some(Step::Calls(calls)) => Ok(ModelResponse {
                    text: None,
                    tool_calls: calls,
                    streamed: false,
                }),
                Some(Step::Stream(fragments)) => {
                    for fragment in &fragments {
                        on_fragment(fragment);
                    }
                    Ok(ModelResponse {
                        text: Some(fragments.concat()),
                        tool_calls: Vec::new(),
                        streamed: true,
                    })
                }
                Some(Step::StreamThenTimeout(fragments, message)) => {
                    for fragment in &fragments {
                        on_fragment(fragment);
                    }
                    Err(QuickAskError::Timeout(message.to_string()))
                }
                Some(Step::Timeout(message)) => Err(QuickAskError::Timeout(message.to_string())),
                Some(Step::Hang) => std::future::pending::<Result<ModelResponse>>().await,
                None => Err(QuickAskError::Other("script exhausted".to_string())),
            }
        }
        .boxed()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Show,
    Hide,
    Text(String),
    Artifact(Artifact),
    Finish,
    Clear,
}

/// Presenter that records every call.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    pub events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingPresenter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn text(&self) -> String {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn show_input(&mut self) {
        self.record(Event::Show);
    }

    fn hide_input(&mut self) {
        self.record(Event::Hide);
    }

    fn deliver_text(&mut self, fragment: &str) {
        self.record(Event::Text(fragment.to_string()));
    }

    fn deliver_artifact(&mut self, artifact: &Artifact) {
        self.record(Event::Artifact(artifact.clone()));
    }

    fn finish(&mut self) {
        self.record(Event::Finish);
    }

    fn clear(&mut self) {
        self.record(Event::Clear);
    }
}

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest::new(id, name, arguments)
}

pub fn location_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "location": { "type": "string" } },
        "required": ["location"]
    })
}

/// Registry of in-process fake tools.
pub fn fake_registry() -> ToolRegistry {
    let mut builder = ToolRegistry::builder();
    builder
        .register(
            ToolSpec::new("getWeather", "Weather", location_schema()),
            |_args| async { Ok(ToolOutput::Data(json!({ "temp": 12, "condition": "cloudy" }))) },
        )
        .unwrap()
        .register(
            ToolSpec::without_parameters("getDateAndTime", "Date"),
            |_args| async { Ok(ToolOutput::Data(json!({ "date_and_time": "2024-05-01T10:00:00.000Z" }))) },
        )
        .unwrap()
        .register(
            ToolSpec::without_parameters("broken", "Always fails"),
            |_args| async { Err("upstream returned 500".to_string()) },
        )
        .unwrap()
        .register(
            ToolSpec::without_parameters("takeScreenshot", "Screen"),
            |_args| async {
                Ok(ToolOutput::Image(InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "iVBORw0KGgo=".to_string(),
                }))
            },
        )
        .unwrap()
        .register(
            ToolSpec::without_parameters("slow", "Never finishes in time"),
            |_args| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(ToolOutput::Data(json!("late")))
            },
        )
        .unwrap();
    builder.build()
}

pub fn fake_executor() -> ToolExecutor {
    ToolExecutor::new(Arc::new(fake_registry()), Duration::from_millis(200))
}
