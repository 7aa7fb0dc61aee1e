//! Slack message composition
//!
//! A payload carries both a plain-text fallback and Block Kit blocks so
//! that clients rendering only one of them still show the essentials.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::playwright::CaseStatus;
use crate::summary::RunSummary;
use crate::table::{class_title, TableBuilder};

/// Incoming-webhook request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub text: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<TextObject>,
    },
    Context {
        elements: Vec<TextObject>,
    },
    Divider,
}

impl Block {
    pub fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Some(TextObject::mrkdwn(text)),
            fields: Vec::new(),
        }
    }

    pub fn fields(fields: Vec<TextObject>) -> Self {
        Block::Section { text: None, fields }
    }

    /// Every piece of mrkdwn text inside the block
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Block::Section { text, fields } => text
                .iter()
                .chain(fields.iter())
                .map(|t| t.text.as_str())
                .collect(),
            Block::Context { elements } => elements.iter().map(|t| t.text.as_str()).collect(),
            Block::Divider => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Mrkdwn,
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: text.into(),
        }
    }
}

/// Outcome classes in the order their tables appear
const TABLE_ORDER: [CaseStatus; 3] = [CaseStatus::Failed, CaseStatus::Passed, CaseStatus::Skipped];

pub fn compose(summary: &RunSummary, settings: &Settings) -> Payload {
    let ci = &settings.ci;
    let totals = &summary.totals;
    let headline = format!("Playwright run: {}{}", summary.status, ci.run_number_suffix());
    let run_url = ci.run_url();

    let mut lines = vec![headline.clone()];
    if let Some(repo) = &ci.repository {
        lines.push(format!("Repo: {}", repo));
    }
    if let Some(branch) = &ci.ref_name {
        lines.push(format!("Branch: {}", branch));
    }
    lines.push(format!(
        "Total: {} | Passed: {} | Failed: {} | Skipped: {}",
        totals.total(),
        totals.passed,
        totals.failed,
        totals.skipped
    ));
    for status in TABLE_ORDER {
        let count = totals.count(status);
        if count > 0 {
            lines.push(String::new());
            lines.push(format!("{}: {}", class_title(status), count));
        }
    }
    if let Some(warning) = &summary.warning {
        lines.push(String::new());
        lines.push(warning.clone());
    }
    if let Some(url) = &run_url {
        lines.push(String::new());
        lines.push(format!("Run: {}", url));
    }

    let mut blocks = vec![
        Block::section(format!("{} *{}*", summary.status.emoji(), headline)),
        Block::fields(vec![
            TextObject::mrkdwn(format!("*Total*\n{}", totals.total())),
            TextObject::mrkdwn(format!("*Passed*\n{}", totals.passed)),
            TextObject::mrkdwn(format!("*Failed*\n{}", totals.failed)),
            TextObject::mrkdwn(format!("*Skipped*\n{}", totals.skipped)),
        ]),
    ];

    let context: Vec<TextObject> = [("Repo", &ci.repository), ("Branch", &ci.ref_name)]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_ref()
                .map(|v| TextObject::mrkdwn(format!("{}: `{}`", label, v)))
        })
        .collect();
    if !context.is_empty() {
        blocks.push(Block::Context { elements: context });
    }

    let builder = TableBuilder::new(settings.detail_limit, settings.max_chunk_chars);
    let chunks: Vec<String> = TABLE_ORDER
        .iter()
        .flat_map(|&status| builder.chunks(&summary.cases, status))
        .collect();
    if !chunks.is_empty() {
        blocks.push(Block::Divider);
    }
    blocks.extend(chunks.into_iter().map(Block::section));

    if let Some(warning) = &summary.warning {
        blocks.push(Block::section(format!("⚠️ {}", warning)));
    }
    if let Some(url) = &run_url {
        blocks.push(Block::section(format!("<{}|View workflow run>", url)));
    }

    Payload {
        text: lines.join("\n"),
        blocks,
    }
}
