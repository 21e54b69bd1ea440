//! Fixed-layout prompt template.
//!
//! `TemplateCompiler` renders a state document into the prompt the model is
//! tuned against. The layout is, in order:
//!
//! 1. Preamble line
//! 2. `# RULES`: the rules description
//! 3. `# CURRENT SITUATION`: bot position, recent chat, visible blocks, memory
//! 4. `# YOUR TASK`: the numbered action list, the answer directive, the cue
//!
//! Missing sections render as placeholder text; the compiler never fails.

use tracing::debug;

use aiminer_contracts::{
    document::{ChatMessage, StateDocument, VisibleBlock},
    task::TaskType,
};
use aiminer_core::traits::PromptCompiler;

use crate::{config::PromptConfig, render};

const PREAMBLE: &str =
    "You are an AI controlling a Minecraft bot. Based on the current situation, decide what action to take next.";
const TASK_INTRO: &str = "Based on the above information, decide what to do next. You can respond with ONE of the following actions:";
const DIRECTIVE: &str =
    "Respond with ONLY the action command in the format shown above. Do not add explanations.";
const CUE: &str = "Your response:";

const NO_RULES: &str = "No rules defined";
const NO_CHAT: &str = "No recent chat messages";
const NO_BLOCKS: &str = "No visible blocks detected";
const NO_MEMORY: &str = "No memories stored";

/// A `PromptCompiler` that renders the fixed prompt layout.
#[derive(Debug, Clone, Default)]
pub struct TemplateCompiler {
    config: PromptConfig,
}

impl TemplateCompiler {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    fn chat_section(&self, document: &StateDocument) -> String {
        let chat = document.chat();
        let start = chat.len().saturating_sub(self.config.chat_window);
        let lines: Vec<String> = chat[start..].iter().map(chat_line).collect();
        or_placeholder(lines, NO_CHAT)
    }

    fn block_section(&self, document: &StateDocument) -> String {
        let lines: Vec<String> = document
            .visible_blocks()
            .iter()
            .take(self.config.block_window)
            .map(block_line)
            .collect();
        or_placeholder(lines, NO_BLOCKS)
    }
}

impl PromptCompiler for TemplateCompiler {
    fn compile(&self, document: &StateDocument) -> String {
        let rules = document.rules_description().unwrap_or(NO_RULES);
        let (position, view) = position_lines(document);
        let chat = self.chat_section(document);
        let blocks = self.block_section(document);
        let memory = memory_section(document);
        let actions = action_list();

        let prompt = format!(
            "{PREAMBLE}

# RULES (Your core programming)
{rules}

# CURRENT SITUATION

## Bot Position
{position}
{view}

## Recent Chat Messages
{chat}

## Visible Blocks (within your view)
{blocks}

## Memory (Important information you've learned)
{memory}

# YOUR TASK
{TASK_INTRO}

{actions}

{DIRECTIVE}

{CUE}"
        );

        debug!(
            chat_messages = document.chat().len(),
            visible_blocks = document.visible_blocks().len(),
            prompt_chars = prompt.len(),
            "prompt rendered"
        );

        prompt
    }
}

// ── Section renderers ────────────────────────────────────────────────────────

fn or_placeholder(lines: Vec<String>, placeholder: &str) -> String {
    if lines.is_empty() {
        placeholder.to_string()
    } else {
        lines.join("\n")
    }
}

fn text_or(value: Option<&serde_json::Value>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), render::text)
}

fn position_lines(document: &StateDocument) -> (String, String) {
    let bot = document.block_vision().and_then(|b| b.bot_position());
    let x = bot.and_then(|p| p.x());
    let y = bot.and_then(|p| p.y());
    let z = bot.and_then(|p| p.z());
    let yaw = bot.and_then(|p| p.yaw()).map_or(0.0, render::float);
    let pitch = bot.and_then(|p| p.pitch()).map_or(0.0, render::float);

    (
        format!(
            "X: {}, Y: {}, Z: {}",
            text_or(x, "0"),
            text_or(y, "0"),
            text_or(z, "0")
        ),
        format!("View Direction: Yaw {yaw:.1}, Pitch {pitch:.1}"),
    )
}

fn chat_line(message: &ChatMessage<'_>) -> String {
    format!(
        "[{}] {}: {}",
        text_or(message.timestamp(), "0"),
        text_or(message.player(), "Unknown"),
        text_or(message.message(), "")
    )
}

fn block_line(block: &VisibleBlock<'_>) -> String {
    let coord = |axis| block.coordinate(axis).map_or(0, render::truncated);
    let distance = block.distance().map_or(0.0, render::float);

    format!(
        "  - {} at ({}, {}, {}) distance: {distance:.1}",
        text_or(block.block_type(), "unknown"),
        coord("x"),
        coord("y"),
        coord("z"),
    )
}

fn memory_section(document: &StateDocument) -> String {
    let lines: Vec<String> = document
        .memory()
        .into_iter()
        .flatten()
        .map(|(key, value)| format!("  - {key}: {}", render::text(value)))
        .collect();
    or_placeholder(lines, NO_MEMORY)
}

fn action_list() -> String {
    TaskType::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {} - {}\n   Format: {}", i + 1, t, t.summary(), t.usage()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────
