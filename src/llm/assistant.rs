use std::future::Future;

use log::{info, warn};

use crate::config::AnalyzerConfig;
use crate::context::ContextAssembler;
use crate::conversation::{ChatMessage, ConversationStore};
use crate::error::Result;
use crate::schema::EnrichedTable;
use crate::StatementAnalysis;

/// The text-generation collaborator: takes a model identifier and an ordered
/// message sequence and returns generated text, or fails with an
/// `UpstreamService` error carrying its classification.
pub trait TextGenerator {
    fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Narrative and question answering over an analysed statement. Holds no
/// conversation state; every call makes exactly one outbound request and
/// never retries.
pub struct FinancialAssistant<G> {
    generator: G,
    model: String,
    assembler: ContextAssembler,
}

impl<G: TextGenerator> FinancialAssistant<G> {
    pub fn new(generator: G, config: &AnalyzerConfig) -> Self {
        Self {
            generator,
            model: config.model.clone(),
            assembler: ContextAssembler::new(&config.labels),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    /// One-shot narrative summary (3-4 paragraphs) of the analysis.
    pub async fn generate_narrative(&self, analysis: &StatementAnalysis) -> Result<String> {
        let prompt = self
            .assembler
            .build_analysis_prompt(analysis.table(), analysis.ratios());
        let messages = [ChatMessage::user(prompt)];

        info!(
            "Requesting narrative for table {} from {}",
            analysis.fingerprint(),
            self.model
        );
        self.generator
            .generate(&self.model, &messages)
            .await
            .inspect_err(|e| warn!("Narrative generation failed: {}", e))
    }

    /// Answers the latest user turn of `conversation`, grounded on `table`
    /// when one is available.
    pub async fn answer(
        &self,
        conversation: &ConversationStore,
        table: Option<&EnrichedTable>,
    ) -> Result<String> {
        let messages = self.assembler.build_chat_context(conversation, table);

        info!(
            "Sending {} chat messages to {} (table attached: {})",
            messages.len(),
            self.model,
            table.is_some()
        );
        self.generator
            .generate(&self.model, &messages)
            .await
            .inspect_err(|e| warn!("Chat request failed: {}", e))
    }
}
