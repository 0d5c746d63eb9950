use super::markdown::{sanitize, MarkdownBuffer};
use super::output::display_artifact;
use crate::delivery::{Artifact, Presenter};
use colored::*;
use std::io::{self, Write};

/// Presents the assistant in a terminal: prompt for the input box, the
/// rendered answer on stdout.
pub struct TerminalPresenter {
    markdown: MarkdownBuffer,
    verbose: bool,
    interactive: bool,
}

impl TerminalPresenter {
    pub fn new(verbose: bool, interactive: bool) -> Self {
        Self {
            markdown: MarkdownBuffer::new(),
            verbose,
            interactive,
        }
    }

    fn write(&self, text: &str) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{}", text);
        let _ = stdout.flush();
    }

    pub fn prompt(&self) {
        if self.interactive {
            self.write(&format!("{} ", "›".cyan().bold()));
        }
    }
}

impl Presenter for TerminalPresenter {
    fn show_input(&mut self) {
        if self.interactive {
            println!("{}", "Ask anything (/hide to dismiss, /quit to exit)".dimmed());
            self.prompt();
        }
    }

    fn hide_input(&mut self) {
        if self.interactive {
            println!("{}", "(hidden, press Enter twice to ask again)".dimmed());
        }
    }

    fn deliver_text(&mut self, fragment: &str) {
        let rendered = self.markdown.append(&sanitize(fragment));
        if !rendered.is_empty() {
            self.write(&rendered);
        }
    }

    fn deliver_artifact(&mut self, artifact: &Artifact) {
        // Keep any partial line ahead of the artifact.
        let pending = self.markdown.flush();
        if !pending.is_empty() {
            self.write(&pending);
        }
        display_artifact(artifact, self.verbose);
    }

    fn finish(&mut self) {
        let rest = self.markdown.flush();
        self.write(&rest);
        if !rest.ends_with('\n') {
            println!();
        }
        self.prompt();
    }

    fn clear(&mut self) {
        self.markdown.reset();
    }
}
