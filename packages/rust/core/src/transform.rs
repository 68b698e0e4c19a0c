//! Transform stage: run each raw document through the model.
//!
//! Documents are processed in sorted filename order, optionally windowed
//! by a start offset and count so large backlogs can be worked through in
//! rate-limit-sized chunks. A missing prompt file or credential aborts the
//! stage up front; everything after that is per-item.

use std::time::Instant;

use tracing::{info, instrument, warn};

use tubedigest_inference::{
    ChatClient, ChatMessage, ChatRequest, PromptSet, TokenCount, count_tokens, load_prompts,
};
use tubedigest_shared::{AppConfig, Result, SortOrder};
use tubedigest_store::{DocumentDir, render_transformed};

use crate::progress::ProgressReporter;

/// Window and ordering for one transform run.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Offset into the sorted listing.
    pub start: usize,
    /// Maximum documents to process this run, unbounded when `None`.
    pub limit: Option<usize>,
    /// Listing order; descending puts date-prefixed newest first.
    pub order: SortOrder,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            start: 0,
            limit: None,
            order: SortOrder::Descending,
        }
    }
}

/// Counters for one transform run.
#[derive(Debug)]
pub struct TransformReport {
    /// Documents transformed and persisted.
    pub transformed: usize,
    /// Documents already transformed on a prior run.
    pub skipped: usize,
    /// Documents whose inference call or write failed.
    pub failed: usize,
    /// Input tokens across all transformed documents.
    pub input_tokens: TokenCount,
    /// Output tokens across all transformed documents.
    pub output_tokens: TokenCount,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

impl Default for TransformReport {
    fn default() -> Self {
        Self {
            transformed: 0,
            skipped: 0,
            failed: 0,
            input_tokens: TokenCount::zero(),
            output_tokens: TokenCount::zero(),
            elapsed: std::time::Duration::default(),
        }
    }
}

/// Transform every selected raw document that has no transformed
/// counterpart yet.
#[instrument(skip_all, fields(model = %config.inference.model))]
pub async fn transform_all(
    config: &AppConfig,
    options: &TransformOptions,
    client: &ChatClient,
    raw_docs: &DocumentDir,
    generated: &DocumentDir,
    progress: &dyn ProgressReporter,
) -> Result<TransformReport> {
    let start = Instant::now();
    progress.phase("transform");

    // Per-run preconditions, checked before the first item.
    let prompts = load_prompts(&config.storage.prompts_dir())?;
    let model_label = format!("{}:{}", config.inference.model, config.inference.provider);

    let names = raw_docs.list(options.order)?;
    let selected: Vec<&String> = names
        .iter()
        .skip(options.start)
        .take(options.limit.unwrap_or(usize::MAX))
        .collect();
    info!(
        total = names.len(),
        selected = selected.len(),
        "transform sweep starting"
    );

    let mut report = TransformReport::default();
    for (i, name) in selected.iter().enumerate() {
        progress.item_processed(name, i + 1, selected.len());

        if generated.contains(name) {
            info!(file = %name, "[SKIPPED] already transformed");
            report.skipped += 1;
            continue;
        }

        match transform_one(config, &model_label, &prompts, client, raw_docs, generated, name)
            .await
        {
            Ok((input, output)) => {
                report.transformed += 1;
                report.input_tokens = report.input_tokens.merge(input);
                report.output_tokens = report.output_tokens.merge(output);
            }
            Err(e) => {
                warn!(file = %name, error = %e, "[ERROR] transform failed");
                report.failed += 1;
            }
        }
    }

    report.elapsed = start.elapsed();
    info!(
        transformed = report.transformed,
        skipped = report.skipped,
        failed = report.failed,
        input_tokens = %report.input_tokens,
        output_tokens = %report.output_tokens,
        "transform finished"
    );
    Ok(report)
}

async fn transform_one(
    config: &AppConfig,
    model_label: &str,
    prompts: &PromptSet,
    client: &ChatClient,
    raw_docs: &DocumentDir,
    generated: &DocumentDir,
    name: &str,
) -> Result<(TokenCount, TokenCount)> {
    let content = raw_docs.read(name)?;

    let messages = vec![
        ChatMessage::system(prompts.system.clone()),
        ChatMessage::user(prompts.instructions.clone()),
        ChatMessage::user(content),
    ];
    let input_text: String = messages.iter().map(|m| m.content.as_str()).collect();
    let input_tokens = count_tokens(&config.inference.model, &input_text);

    let request = ChatRequest {
        model: model_label.to_string(),
        messages,
        max_tokens: config.inference.max_tokens,
        temperature: config.inference.temperature,
        top_p: config.inference.top_p,
    };
    let response = client.complete(&request).await?;
    let output_tokens = count_tokens(&config.inference.model, &response);

    let doc = render_transformed(
        name,
        &config.inference.model,
        &config.inference.provider,
        &input_tokens.to_string(),
        &output_tokens.to_string(),
        &response,
    );
    generated.write_new(name, &doc)?;

    info!(
        file = %name,
        input_tokens = %input_tokens,
        output_tokens = %output_tokens,
        "[OK] transformed"
    );
    Ok((input_tokens, output_tokens))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
