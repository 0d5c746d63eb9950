use colored::*;
use regex::Regex;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

const DEFAULT_RULE_WIDTH: usize = 60;
const MAX_RULE_WIDTH: usize = 100;

fn control_sequence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?|\x1b.?")
            .expect("control sequence regex is valid")
    })
}

fn inline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\*\*([^*]+)\*\*|`([^`]+)`|\$\$([^$]+)\$\$|\$([^$\s][^$]*)\$")
            .expect("inline markdown regex is valid")
    })
}

/// Strip terminal escape sequences and control characters from model
/// output. Newlines and tabs are kept.
pub fn sanitize(text: &str) -> String {
    control_sequence_regex()
        .replace_all(text, "")
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect()
}

/// Width for horizontal rules, from the terminal when there is one.
pub fn rule_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_RULE_WIDTH)
        .clamp(20, MAX_RULE_WIDTH)
}

/// Render inline markup of a single prose line: bold, inline code and
/// LaTeX spans, which are passed through dimmed.
pub fn render_inline(line: &str) -> String {
    inline_regex()
        .replace_all(line, |caps: &regex::Captures| {
            if let Some(bold) = caps.get(1) {
                bold.as_str().bold().to_string()
            } else if let Some(code) = caps.get(2) {
                code.as_str().yellow().to_string()
            } else {
                caps[0].dimmed().to_string()
            }
        })
        .into_owned()
}

/// Incremental Markdown renderer for streamed answers.
///
/// Text is rendered a line at a time; a partial trailing line waits in the
/// buffer until its newline arrives or [`MarkdownBuffer::flush`] is called.
pub struct MarkdownBuffer {
    pending: String,
    code_lang: Option<String>,
    in_code_block: bool,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    width: usize,
}

impl Default for MarkdownBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownBuffer {
    pub fn new() -> Self {
        Self::with_width(rule_width())
    }

    pub fn with_width(width: usize) -> Self {
        Self {
            pending: String::new(),
            code_lang: None,
            in_code_block: false,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            width,
        }
    }

    pub fn in_code_block(&self) -> bool {
        self.in_code_block
    }

    fn highlight_code_line(&self, line: &str) -> String {
        let Some(theme) = self.theme_set.themes.get("Solarized (dark)") else {
            return format!("{}\n", line);
        };
        let syntax = self
            .code_lang
            .as_deref()
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let source = format!("{}\n", line);
        match highlighter.highlight_line(&source, &self.syntax_set) {
            Ok(ranges) => {
                let ranges: Vec<(Style, &str)> = ranges;
                format!("{}\x1b[0m", as_24_bit_terminal_escaped(&ranges[..], false))
            }
            Err(_) => source,
        }
    }

    fn render_line(&mut self, line: &str) -> String {
        let trimmed = line.trim_start();

        if let Some(rest) = trimmed.strip_prefix("```") {
            if self.in_code_block {
                self.in_code_block = false;
                self.code_lang = None;
                let rule = format!("└{}", "─".repeat(self.width.saturating_sub(1)));
                return format!("{}\n", rule.dimmed());
            }
            let lang = rest.trim();
            self.code_lang = (!lang.is_empty()).then(|| lang.to_string());
            self.in_code_block = true;
            let label = self.code_lang.as_deref().unwrap_or("code");
            let used = label.chars().count() + 4;
            return format!(
                "{}[{}]{}\n",
                "┌─".dimmed(),
                label.cyan(),
                "─".repeat(self.width.saturating_sub(used)).dimmed()
            );
        }

        if self.in_code_block {
            return self.highlight_code_line(line);
        }

        if let Some(level) = heading_level(trimmed) {
            let text = trimmed[level..].trim();
            return format!("{}\n", text.bold().underline());
        }

        format!("{}\n", render_inline(line))
    }

    /// Add a fragment; returns whatever became renderable.
    pub fn append(&mut self, fragment: &str) -> String {
        self.pending.push_str(fragment);
        let mut output = String::new();
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            output.push_str(&self.render_line(line.trim_end_matches(['\n', '\r'])));
        }
        output
    }

    /// Render the trailing partial line and close an unterminated code block.
    pub fn flush(&mut self) -> String {
        let mut output = String::new();
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            output.push_str(&self.render_line(&line));
        }
        if self.in_code_block {
            output.push_str(&self.render_line("```"));
        }
        output
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.in_code_block = false;
        self.code_lang = None;
    }
}

fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6)
        .contains(&hashes)
        .then_some(hashes)
        .filter(|&n| line[n..].starts_with(' '))
}
