use crate::models::InlineImage;
use base64::Engine;
use std::process::Stdio;
use tokio::process::Command;

/// Run the capture command and read a PNG from its stdout.
pub async fn capture(argv: &[String]) -> Result<InlineImage, String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| "No screenshot command configured".to_string())?;

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("Failed to run screenshot command '{}': {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "Screenshot command exited with code {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ));
    }

    if output.stdout.is_empty() {
        return Err("Screenshot command produced no image data".to_string());
    }

    Ok(InlineImage {
        mime_type: "image/png".to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&output.stdout),
    })
}
