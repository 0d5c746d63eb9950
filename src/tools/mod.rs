pub mod builtins;
mod executor;
pub mod http;
mod registry;
pub mod screenshot;

pub use builtins::ToolContext;
pub use executor::ToolExecutor;
pub use registry::{RegisteredTool, ToolHandler, ToolRegistry, ToolRegistryBuilder};

use crate::config::ToolsConfig;
use std::sync::Arc;

/// Build the process-wide registry from configuration.
pub fn build_registry(config: &ToolsConfig) -> Result<ToolRegistry, String> {
    if !config.enabled {
        return Ok(ToolRegistry::empty());
    }

    let context = Arc::new(ToolContext::from_config(config)?);
    let mut builder = ToolRegistry::builder();
    builtins::register_builtin_tools(&mut builder, context, config)?;
    Ok(builder.build())
}
