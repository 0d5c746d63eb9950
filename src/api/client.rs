use crate::api::models::RequestBody;
use crate::api::response::parse_response;
use crate::api::streaming::process_streaming_response;
use crate::api::wire::to_wire_messages;
use crate::api::{ModelClient, ModelResponse};
use crate::config::Config;
use crate::error::{QuickAskError, Result};
use crate::models::{Conversation, ToolSpec};
use colored::*;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

pub async fn make_api_request(
    client: &reqwest::Client,
    api_endpoint: &str,
    request_body: &RequestBody,
) -> Result<reqwest::Response> {
    let response = client.post(api_endpoint).json(request_body).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(QuickAskError::ApiError { status, message });
    }

    Ok(response)
}

/// OpenAI-compatible chat completions client.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    system_message: String,
    stream: bool,
    stream_timeout: u64,
    request_timeout: u64,
    verbose: bool,
}

impl ChatClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|e| {
                QuickAskError::ConfigError(format!("Invalid authorization header: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.api_endpoint.clone(),
            model: config.model.clone(),
            system_message: config.system_message(),
            stream: config.stream,
            stream_timeout: config.stream_timeout,
            request_timeout: config.request_timeout,
            verbose: config.verbose,
        })
    }

    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolSpec],
        on_fragment: &mut (dyn FnMut(&str) + Send),
    ) -> Result<ModelResponse> {
        let tool_defs: Vec<Value> = tools.iter().map(ToolSpec::to_function_tool).collect();
        let request_body = RequestBody {
            model: self.model.clone(),
            messages: to_wire_messages(Some(&self.system_message), conversation),
            stream: self.stream,
            tools: if tool_defs.is_empty() {
                None
            } else {
                Some(tool_defs)
            },
        };

        if self.verbose {
            eprintln!(
                "{}",
                format!(
                    "[AI] Request: model={}, messages={}, tools={}, stream={}",
                    self.model,
                    request_body.messages.len(),
                    tools.len(),
                    self.stream
                )
                .dimmed()
            );
        }

        let wait = Duration::from_secs(self.request_timeout);
        let response = timeout(wait, make_api_request(&self.http, &self.endpoint, &request_body))
            .await
            .map_err(|_| {
                QuickAskError::Timeout(format!(
                    "no response from the model API within {} seconds",
                    self.request_timeout
                ))
            })??;

        if self.verbose {
            eprintln!(
                "{}",
                format!("[AI] Response status: {}", response.status()).dimmed()
            );
        }

        if self.stream {
            return process_streaming_response(response, self.stream_timeout, self.verbose, on_fragment)
                .await;
        }

        let response_text = timeout(wait, response.text())
            .await
            .map_err(|_| {
                QuickAskError::Timeout(format!(
                    "response body not received within {} seconds",
                    self.request_timeout
                ))
            })??;
        if self.verbose {
            eprintln!("{}", format!("[AI] Raw response: {}", response_text).dimmed());
        }

        let response_json: Value = serde_json::from_str(&response_text)?;
        parse_response(&response_json)
    }
}

impl ModelClient for ChatClient {
    fn submit<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a [ToolSpec],
        on_fragment: &'a mut (dyn FnMut(&str) + Send),
    ) -> BoxFuture<'a, Result<ModelResponse>> {
        self.send(conversation, tools, on_fragment).boxed()
    }
}
