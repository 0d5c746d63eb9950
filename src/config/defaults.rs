pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.totob12.com";
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

pub fn default_tools_enabled() -> bool {
    true
}

pub fn default_stream() -> bool {
    true
}

pub fn default_stream_timeout() -> u64 {
    30
}

pub fn default_request_timeout() -> u64 {
    60
}

pub fn default_max_rounds() -> usize {
    8
}

pub fn default_tool_timeout() -> u64 {
    20
}

pub fn default_search_base_url() -> String {
    DEFAULT_SEARCH_BASE_URL.to_string()
}

pub fn default_weather_endpoint() -> String {
    DEFAULT_WEATHER_ENDPOINT.to_string()
}

/// Capture command writing a PNG to stdout.
pub fn default_screenshot_command() -> Vec<String> {
    let argv: &[&str] = if cfg!(target_os = "macos") {
        &["screencapture", "-x", "-t", "png", "/dev/stdout"]
    } else if cfg!(target_os = "windows") {
        &[
            "powershell",
            "-NoProfile",
            "-Command",
            "Add-Type -AssemblyName System.Windows.Forms,System.Drawing; \
             $b=[System.Windows.Forms.Screen]::PrimaryScreen.Bounds; \
             $i=New-Object System.Drawing.Bitmap $b.Width,$b.Height; \
             [System.Drawing.Graphics]::FromImage($i).CopyFromScreen($b.Location,[System.Drawing.Point]::Empty,$b.Size); \
             $m=New-Object System.IO.MemoryStream; $i.Save($m,[System.Drawing.Imaging.ImageFormat]::Png); \
             [Console]::OpenStandardOutput().Write($m.ToArray(),0,$m.Length)",
        ]
    } else {
        &["import", "-window", "root", "png:-"]
    };
    argv.iter().map(|s| s.to_string()).collect()
}
