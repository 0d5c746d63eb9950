use crate::activation::DoubleTapDetector;
use crate::delivery::{Delivery, Presenter};
use crate::error::{QuickAskError, Result};
use crate::models::Conversation;
use crate::orchestrator::{Orchestrator, QueryOutcome};
use colored::*;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One visible interaction: from the input box appearing until it is
/// hidden. Owns the conversation and the activation detector.
///
/// `submit` takes `&mut self`, so queries within an interaction run one
/// after another.
pub struct Session {
    id: String,
    conversation: Conversation,
    detector: DoubleTapDetector,
    visible: bool,
    cancel: CancellationToken,
    verbose: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation: Conversation::new(),
            detector: DoubleTapDetector::default(),
            visible: false,
            cancel: CancellationToken::new(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Token the caller can trigger to abort whatever query is running.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Feed a trigger-key press. Shows the input box on a double tap and
    /// returns whether it did.
    pub fn key_down(&mut self, at: Instant, presenter: &mut dyn Presenter) -> bool {
        if self.detector.key_down(at) {
            self.show(presenter);
            true
        } else {
            false
        }
    }

    pub fn show(&mut self, presenter: &mut dyn Presenter) {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        if !self.visible {
            self.id = Uuid::new_v4().to_string();
            if self.verbose {
                eprintln!("{}", format!("[session] {} shown", self.id).dimmed());
            }
        }
        self.visible = true;
        presenter.show_input();
    }

    /// Hide the input box. Cancels any running query and discards the
    /// conversation and the rendered output.
    pub fn hide(&mut self, presenter: &mut dyn Presenter) {
        self.cancel.cancel();
        self.conversation.clear();
        self.detector.reset();
        self.visible = false;
        presenter.hide_input();
        presenter.clear();
        if self.verbose {
            eprintln!("{}", format!("[session] {} hidden", self.id).dimmed());
        }
    }

    /// Discard the conversation but keep the input box open.
    pub fn clear(&mut self, presenter: &mut dyn Presenter) {
        self.conversation.clear();
        presenter.clear();
    }

    /// Run one query through the tool loop, delivering output to `presenter`.
    pub async fn submit(
        &mut self,
        query: &str,
        orchestrator: &Orchestrator<'_>,
        presenter: &mut dyn Presenter,
    ) -> Result<QueryOutcome> {
        if !self.visible {
            return Err(QuickAskError::Other(
                "input is hidden; activate it before submitting".to_string(),
            ));
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(QuickAskError::Other("empty query".to_string()));
        }

        let cancel = self.cancel.clone();
        let mut delivery = Delivery::new(presenter, cancel.clone());
        let outcome = orchestrator
            .run(&mut self.conversation, query, &mut delivery, &cancel)
            .await;
        delivery.finish();

        if let QueryOutcome::Cancelled { .. } = outcome {
            self.conversation.clear();
        }
        if self.verbose {
            eprintln!(
                "{}",
                format!(
                    "[session] {} query finished after {} round(s), {} turns",
                    self.id,
                    outcome.rounds(),
                    self.conversation.len()
                )
                .dimmed()
            );
        }
        Ok(outcome)
    }
}
