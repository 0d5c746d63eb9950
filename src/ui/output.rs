use super::markdown::{sanitize, MarkdownBuffer};
use crate::delivery::Artifact;
use crate::models::ToolSpec;
use colored::*;

/// Render `body` as a boxed block labelled `label`.
pub fn boxed(label: &str, body: &str) -> String {
    // Avoid double newline if body already ends with one
    let sep = if body.ends_with('\n') { "" } else { "\n" };
    let block = format!("```{}\n{}{}```\n", label, sanitize(body), sep);
    let mut buffer = MarkdownBuffer::new();
    let mut rendered = buffer.append(&block);
    rendered.push_str(&buffer.flush());
    rendered
}

pub fn display_tool_result(name: &str, result: &str) {
    eprint!("{}", boxed(&format!("TOOL: {}", name), result));
}

pub fn display_tool_error(name: &str, error: &str) {
    eprint!("{}", boxed(&format!("TOOL ERROR: {}", name), error));
}

/// One line standing in for an image the terminal cannot show.
pub fn image_placeholder(tool: &str, mime_type: &str, bytes: usize) -> String {
    format!(
        "{} {}",
        "[image]".magenta().bold(),
        format!("{} from {} ({} bytes)", mime_type, tool, bytes).dimmed()
    )
}

pub fn display_artifact(artifact: &Artifact, verbose: bool) {
    match artifact {
        Artifact::Image { tool, image } => {
            println!(
                "{}",
                image_placeholder(tool, &image.mime_type, image.byte_len())
            );
        }
        Artifact::ToolStatus { tool, ok, detail } if verbose => {
            if *ok {
                display_tool_result(tool, detail);
            } else {
                display_tool_error(tool, detail);
            }
        }
        Artifact::ToolStatus { .. } => {}
    }
}

pub fn display_tool_list(specs: &[ToolSpec]) {
    if specs.is_empty() {
        println!("{}", "No tools enabled.".yellow());
        return;
    }
    println!("{}", "Available tools:".bold());
    for spec in specs {
        println!("  {} - {}", spec.name.cyan(), spec.description);
    }
}
