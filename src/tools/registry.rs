use crate::models::{ToolOutput, ToolSpec};
use futures::future::BoxFuture;
use futures::FutureExt;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

pub type ToolHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<ToolOutput, String>> + Send + Sync>;

pub struct RegisteredTool {
    pub spec: ToolSpec,
    schema: JSONSchema,
    handler: ToolHandler,
}

impl RegisteredTool {
    /// Check an argument object against the declared parameter schema.
    pub fn validate(&self, arguments: &Value) -> Result<(), String> {
        if let Err(errors) = self.schema.validate(arguments) {
            let error_messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(error_messages.join("; "));
        }
        Ok(())
    }

    pub fn invoke(&self, arguments: Value) -> BoxFuture<'static, Result<ToolOutput, String>> {
        (self.handler)(arguments)
    }
}

/// Name → tool table. Built once at startup, read-only afterwards.
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Declared specs, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn validate_arguments(&self, tool_name: &str, arguments: &Value) -> Result<(), String> {
        self.lookup(tool_name)
            .ok_or_else(|| format!("Tool '{}' not found", tool_name))?
            .validate(arguments)
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, RegisteredTool>,
    order: Vec<String>,
}

impl ToolRegistryBuilder {
    pub fn register<F, Fut>(&mut self, spec: ToolSpec, handler: F) -> Result<&mut Self, String>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, String>> + Send + 'static,
    {
        if self.tools.contains_key(&spec.name) {
            return Err(format!("Tool '{}' is already registered", spec.name));
        }

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&spec.parameters)
            .map_err(|e| format!("Invalid schema for tool '{}': {}", spec.name, e))?;

        let handler: ToolHandler = Arc::new(move |args| handler(args).boxed());
        let name = spec.name.clone();
        self.tools.insert(
            name.clone(),
            RegisteredTool {
                spec,
                schema,
                handler,
            },
        );
        self.order.push(name);
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            order: self.order,
        }
    }
}
