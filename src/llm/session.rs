use log::debug;

use crate::config::AnalyzerConfig;
use crate::conversation::ConversationStore;
use crate::error::Result;
use crate::llm::assistant::{FinancialAssistant, TextGenerator};
use crate::schema::EnrichedTable;
use crate::StatementAnalysis;

/// One interactive session: the only writer of its conversation history.
pub struct ChatSession<G> {
    assistant: FinancialAssistant<G>,
    conversation: ConversationStore,
    table: Option<EnrichedTable>,
}

impl<G: TextGenerator> ChatSession<G> {
    pub fn new(assistant: FinancialAssistant<G>, greeting: impl Into<String>) -> Self {
        Self {
            assistant,
            conversation: ConversationStore::new(greeting),
            table: None,
        }
    }

    pub fn from_config(generator: G, config: &AnalyzerConfig) -> Self {
        Self::new(FinancialAssistant::new(generator, config), config.greeting.clone())
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn assistant(&self) -> &FinancialAssistant<G> {
        &self.assistant
    }

    pub fn table(&self) -> Option<&EnrichedTable> {
        self.table.as_ref()
    }

    /// Grounds later answers on this analysis. Replaces any previous table.
    pub fn attach_analysis(&mut self, analysis: &StatementAnalysis) {
        self.table = Some(analysis.table().clone());
    }

    pub fn clear_analysis(&mut self) {
        self.table = None;
    }

    /// Records the question, asks the assistant and records the answer.
    ///
    /// On failure the error is returned and no assistant turn is written; the
    /// user turn stays so the question is not lost. Use
    /// [`record_placeholder`](Self::record_placeholder) to show something in
    /// its place.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        self.conversation.push_user(question);

        let answer = self
            .assistant
            .answer(&self.conversation, self.table.as_ref())
            .await?;

        self.conversation.push_assistant(answer.clone());
        debug!(
            "Conversation now has {} turns after the greeting",
            self.conversation.exchanges().len()
        );
        Ok(answer)
    }

    /// Appends an assistant turn chosen by the caller, e.g. an error notice
    /// after a failed [`ask`](Self::ask).
    pub fn record_placeholder(&mut self, text: impl Into<String>) {
        self.conversation.push_assistant(text);
    }

    /// Starts over with only the greeting. The attached table is kept.
    pub fn reset(&mut self) {
        self.conversation.reset();
    }
}
