use crate::models::{InlineImage, ToolResult};
use tokio_util::sync::CancellationToken;

/// Something produced along the way that the presentation layer may show.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Image { tool: String, image: InlineImage },
    ToolStatus { tool: String, ok: bool, detail: String },
}

impl Artifact {
    pub fn from_tool_result(result: &ToolResult) -> Self {
        if let Some(image) = result.image() {
            return Artifact::Image {
                tool: result.tool.clone(),
                image: image.clone(),
            };
        }
        match &result.outcome {
            Err(message) => Artifact::ToolStatus {
                tool: result.tool.clone(),
                ok: false,
                detail: message.clone(),
            },
            Ok(_) => Artifact::ToolStatus {
                tool: result.tool.clone(),
                ok: true,
                detail: serde_json::to_string_pretty(&result.envelope()["result"])
                    .unwrap_or_default(),
            },
        }
    }
}

/// Presentation boundary: the popup, or whatever stands in for it.
pub trait Presenter: Send {
    fn show_input(&mut self);
    fn hide_input(&mut self);
    /// Markdown/LaTeX source, possibly a fragment of a longer answer.
    fn deliver_text(&mut self, fragment: &str);
    fn deliver_artifact(&mut self, _artifact: &Artifact) {}
    /// The current answer is complete.
    fn finish(&mut self) {}
    fn clear(&mut self);
}

/// Forwards one query's output to the presenter, in order, until the
/// interaction is cancelled. No transformation is applied.
pub struct Delivery<'a> {
    presenter: &'a mut dyn Presenter,
    cancel: CancellationToken,
    mid_line: bool,
}

impl<'a> Delivery<'a> {
    pub fn new(presenter: &'a mut dyn Presenter, cancel: CancellationToken) -> Self {
        Self {
            presenter,
            cancel,
            mid_line: false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn text(&mut self, fragment: &str) {
        if !self.is_cancelled() && !fragment.is_empty() {
            self.presenter.deliver_text(fragment);
            self.mid_line = !fragment.ends_with('\n');
        }
    }

    /// Terminate a partially delivered line so the next text starts fresh.
    pub fn end_line(&mut self) {
        if self.mid_line {
            self.text("\n");
        }
    }

    pub fn artifact(&mut self, artifact: &Artifact) {
        if !self.is_cancelled() {
            self.presenter.deliver_artifact(artifact);
        }
    }

    pub fn finish(&mut self) {
        if !self.is_cancelled() {
            self.presenter.finish();
        }
    }
}
