use super::http::{encode_param, get_json, get_text, join_url};
use super::registry::ToolRegistryBuilder;
use super::screenshot;
use crate::config::ToolsConfig;
use crate::models::{ToolOutput, ToolSpec};
use rand::seq::SliceRandom;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const MAX_IMAGE_RESULTS: usize = 7;

/// Shared state of the built-in tools.
pub struct ToolContext {
    pub http: reqwest::Client,
    pub search_base_url: String,
    pub weather_endpoint: String,
    pub weather_key: Option<String>,
    pub pictures_dir: Option<PathBuf>,
    pub screenshot_command: Vec<String>,
}

impl ToolContext {
    pub fn from_config(config: &ToolsConfig) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("quickask/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let pictures_dir = config
            .pictures_dir
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::picture_dir);

        Ok(Self {
            http,
            search_base_url: config.search_base_url.clone(),
            weather_endpoint: config.weather_endpoint.clone(),
            weather_key: config.weather_key.clone(),
            pictures_dir,
            screenshot_command: config.screenshot.command.clone(),
        })
    }
}

fn string_param(description: &str, name: &str, param_description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            name: {
                "type": "string",
                "description": param_description
            }
        },
        "required": [name]
    })
}

/// Specs of every built-in tool, in the order they are offered to the model.
pub fn builtin_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::without_parameters("getDateAndTime", "Get the current date and time"),
        ToolSpec::new(
            "getWeather",
            "Get the current weather for a precise location, in metric units",
            string_param(
                "Get the current weather for a precise location, in metric units",
                "location",
                "The precise location/city to get the weather for, in the simplest format possible (e.g. 'washington dc', 'paris').",
            ),
        ),
        ToolSpec::new(
            "searchInternet",
            "Search the internet for information",
            string_param(
                "Search the internet for information",
                "query",
                "The query to search the internet for",
            ),
        ),
        ToolSpec::new(
            "lookWebpage",
            "Look up a webpage; gets you the text content of the webpage",
            string_param(
                "Look up a webpage; gets you the text content of the webpage",
                "link",
                "The URL of the webpage to look up",
            ),
        ),
        ToolSpec::new(
            "searchImages",
            "Search the internet for images",
            string_param(
                "Search the internet for images",
                "query",
                "The query to search the internet for images",
            ),
        ),
        ToolSpec::new(
            "generateImage",
            "Generate and create an image with the given text",
            string_param(
                "Generate and create an image with the given text",
                "query",
                "The text to generate the image with",
            ),
        ),
        ToolSpec::new(
            "queryWolframAlpha",
            "Query Wolfram Alpha for information, math, statistics. To be used over the internet",
            string_param(
                "Query Wolfram Alpha for information, math, statistics",
                "query",
                "The query to send to Wolfram Alpha",
            ),
        ),
        ToolSpec::without_parameters(
            "takeScreenshot",
            "Take a screenshot of the user's screen. Use this to see the user's screen and get needed information",
        ),
        ToolSpec::without_parameters(
            "getRandomPicture",
            "Return a random local picture's path from my local pictures.",
        ),
    ]
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("Missing required argument: {}", key))
}

/// Register every built-in tool the configuration leaves enabled.
pub fn register_builtin_tools(
    builder: &mut ToolRegistryBuilder,
    context: Arc<ToolContext>,
    config: &ToolsConfig,
) -> Result<(), String> {
    for spec in builtin_specs() {
        if !config.is_enabled(&spec.name) {
            continue;
        }
        let ctx = context.clone();
        let name = spec.name.clone();
        match name.as_str() {
            "getDateAndTime" => {
                builder.register(spec, |args| async move { handle_date_and_time(&args) })?;
            }
            "getWeather" => {
                builder.register(spec, move |args| {
                    let ctx = ctx.clone();
                    async move { handle_weather(&ctx, &args).await }
                })?;
            }
            "searchInternet" => {
                builder.register(spec, move |args| {
                    let ctx = ctx.clone();
                    async move { handle_search_internet(&ctx, &args).await }
                })?;
            }
            "lookWebpage" => {
                builder.register(spec, move |args| {
                    let ctx = ctx.clone();
                    async move { handle_look_webpage(&ctx, &args).await }
                })?;
            }
            "searchImages" => {
                builder.register(spec, move |args| {
                    let ctx = ctx.clone();
                    async move { handle_search_images(&ctx, &args).await }
                })?;
            }
            "generateImage" => {
                builder.register(spec, move |args| {
                    let ctx = ctx.clone();
                    async move { handle_generate_image(&ctx, &args).await }
                })?;
            }
            "queryWolframAlpha" => {
                builder.register(spec, move |args| {
                    let ctx = ctx.clone();
                    async move { handle_wolfram_alpha(&ctx, &args).await }
                })?;
            }
            "takeScreenshot" => {
                builder.register(spec, move |_args| {
                    let ctx = ctx.clone();
                    async move {
                        screenshot::capture(&ctx.screenshot_command)
                            .await
                            .map(ToolOutput::Image)
                    }
                })?;
            }
            "getRandomPicture" => {
                builder.register(spec, move |_args| {
                    let ctx = ctx.clone();
                    async move { handle_random_picture(ctx.pictures_dir.as_deref()) }
                })?;
            }
            other => return Err(format!("No handler for built-in tool '{}'", other)),
        }
    }
    Ok(())
}

// Tool handlers

pub fn handle_date_and_time(_args: &Value) -> Result<ToolOutput, String> {
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    Ok(ToolOutput::Data(json!({ "date_and_time": now })))
}

pub async fn handle_weather(ctx: &ToolContext, args: &Value) -> Result<ToolOutput, String> {
    let location = required_str(args, "location")?;
    let key = ctx
        .weather_key
        .as_deref()
        .ok_or_else(|| "Weather API key not configured (set WEATHER_KEY)".to_string())?;

    let data = get_json(
        &ctx.http,
        &ctx.weather_endpoint,
        &[("q", location), ("appid", key), ("units", "metric")],
    )
    .await?;
    Ok(ToolOutput::Data(json!({ "weather": data })))
}

pub async fn handle_search_internet(ctx: &ToolContext, args: &Value) -> Result<ToolOutput, String> {
    let query = encode_param(required_str(args, "query")?);
    let url = join_url(&ctx.search_base_url, "search/search");
    get_json(&ctx.http, &url, &[("q", &query)])
        .await
        .map(ToolOutput::Data)
}

pub async fn handle_look_webpage(ctx: &ToolContext, args: &Value) -> Result<ToolOutput, String> {
    let link = encode_param(required_str(args, "link")?);
    let url = join_url(&ctx.search_base_url, "search/webpage");
    get_json(&ctx.http, &url, &[("url", &link)])
        .await
        .map(ToolOutput::Data)
}

pub async fn handle_search_images(ctx: &ToolContext, args: &Value) -> Result<ToolOutput, String> {
    let query = encode_param(required_str(args, "query")?);
    let url = join_url(&ctx.search_base_url, "search/images");
    let data = get_json(&ctx.http, &url, &[("q", &query)]).await?;
    Ok(ToolOutput::Data(json!({
        "images_to_display": truncate_images(data)?
    })))
}

/// Keep at most [`MAX_IMAGE_RESULTS`] entries of the `images` array.
pub fn truncate_images(mut data: Value) -> Result<Value, String> {
    let images = data
        .get_mut("images")
        .and_then(|i| i.as_array_mut())
        .ok_or_else(|| "Unexpected image search response: no 'images' array".to_string())?;
    images.truncate(MAX_IMAGE_RESULTS);
    Ok(data)
}

pub async fn handle_generate_image(ctx: &ToolContext, args: &Value) -> Result<ToolOutput, String> {
    let prompt = encode_param(required_str(args, "query")?);
    let url = join_url(&ctx.search_base_url, "generate-image");
    let data = get_json(&ctx.http, &url, &[("prompt", &prompt)]).await?;
    let image = data.get("result").cloned().unwrap_or(Value::Null);
    Ok(ToolOutput::Data(json!({ "image": image })))
}

pub async fn handle_wolfram_alpha(ctx: &ToolContext, args: &Value) -> Result<ToolOutput, String> {
    let query = encode_param(required_str(args, "query")?);
    let url = join_url(&ctx.search_base_url, "wolframalpha");
    let text = get_text(&ctx.http, &url, &[("query", &query)]).await?;
    Ok(ToolOutput::Data(json!({ "response": text })))
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn handle_random_picture(dir: Option<&Path>) -> Result<ToolOutput, String> {
    let dir = dir.ok_or_else(|| "No pictures directory configured".to_string())?;
    let entries =
        fs::read_dir(dir).map_err(|e| format!("Failed to read {}: {}", dir.display(), e))?;

    let images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();

    let chosen = images
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| "No images found in the specified directory.".to_string())?;

    let absolute = chosen.canonicalize().unwrap_or_else(|_| chosen.clone());
    let path = absolute.to_string_lossy().replace('\\', "/");
    Ok(ToolOutput::Data(json!({ "path": path })))
}
