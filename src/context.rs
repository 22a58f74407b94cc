//! Turns an analysed statement (and optionally a conversation) into text a
//! language model can be grounded on.
//!
//! Everything here reads its inputs and returns fresh values; nothing is
//! mutated. No length budgeting is applied: the whole table and the whole
//! history are always included.

use crate::config::LabelAliases;
use crate::conversation::{ChatMessage, ConversationStore};
use crate::engine::MetricEngine;
use crate::llm::prompts::{
    ANALYSIS_DATA_HEADING, ANALYSIS_PREAMBLE, CHAT_DATA_HEADING, CHAT_SYSTEM_PROMPT,
};
use crate::schema::{EnrichedTable, RatioBundle};
use crate::utils::{format_ratio, format_ratio_percent};

pub const CURRENT_ASSETS_GROWTH: &str = "Current assets growth (%)";

#[derive(Default)]
pub struct ContextAssembler {
    engine: MetricEngine,
}

impl ContextAssembler {
    pub fn new(labels: &LabelAliases) -> Self {
        Self {
            engine: MetricEngine::new(labels),
        }
    }

    /// One-shot prompt for a narrative summary: instructions, the full
    /// enriched table, then the key indicators. Unavailable indicators are
    /// written as `N/A`.
    pub fn build_analysis_prompt(&self, table: &EnrichedTable, ratios: &RatioBundle) -> String {
        let mut prompt = String::new();
        prompt.push_str(ANALYSIS_PREAMBLE);
        prompt.push_str("\n\n");
        prompt.push_str(ANALYSIS_DATA_HEADING);
        prompt.push_str("\n\n### Analysis table\n\n");
        prompt.push_str(&table.to_markdown());
        prompt.push_str("\n### Key indicators\n\n");
        prompt.push_str("| Indicator | Value |\n|---|---:|\n");

        let growth = self.engine.current_assets_growth(table);
        prompt.push_str(&format!(
            "| {} | {} |\n",
            CURRENT_ASSETS_GROWTH,
            format_ratio_percent(&growth)
        ));
        for (name, value) in ratios.entries() {
            prompt.push_str(&format!("| {} | {} |\n", name, format_ratio(value)));
        }

        prompt
    }

    /// Message sequence for a chat turn: a leading system message (with the
    /// table when one is available), then every turn after the greeting in
    /// original order. The greeting is UI-only and never sent.
    pub fn build_chat_context(
        &self,
        conversation: &ConversationStore,
        table: Option<&EnrichedTable>,
    ) -> Vec<ChatMessage> {
        let mut system = String::from(CHAT_SYSTEM_PROMPT);
        if let Some(table) = table {
            system.push_str("\n\n");
            system.push_str(CHAT_DATA_HEADING);
            system.push('\n');
            system.push_str(&table.to_markdown());
        }

        let mut messages = Vec::with_capacity(conversation.exchanges().len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(conversation.exchanges().iter().map(|turn| turn.to_message()));
        messages
    }
}
