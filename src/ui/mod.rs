pub mod markdown;
pub mod output;
pub mod terminal;

pub use markdown::{render_inline, sanitize, MarkdownBuffer};
pub use terminal::TerminalPresenter;
