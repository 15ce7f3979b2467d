//! Round-trip evaluation engine.
//!
//! For every (system, script) pair, each non-blank corpus line is sent
//! forward to the target script and back again, then scored. Lines are
//! processed concurrently up to `parallelism` and re-ordered by corpus index
//! before aggregation. Provider failures are retried when transient and
//! otherwise score the line as a full loss; they never abort the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::align::matched_chars;
use crate::edit_distance::levenshtein;
use crate::error::ProviderError;
use crate::model::{LineResult, SystemRun, SystemSpec};
use crate::report::EvaluationReport;
use crate::script::{ScriptTable, UnicodeBlock, IAST};
use crate::statistics::SummaryAccumulator;
use crate::traits::{TransliterateRequest, TransliterationProvider};

/// Upper bound for the exponential retry delay.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the evaluation engine.
#[derive(Debug, Clone)]
pub struct EvalEngineConfig {
    /// Maximum lines in flight per run. 1 means strictly sequential.
    pub parallelism: usize,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Delay before the first retry, doubled after each attempt.
    pub retry_delay: Duration,
    /// Script the corpus is written in.
    pub source_script: String,
}

impl Default for EvalEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            source_script: IAST.to_string(),
        }
    }
}

/// Progress reporting trait.
///
/// Line events for a run arrive in corpus order once every line is scored.
pub trait ProgressReporter: Send + Sync {
    fn on_run_start(&self, spec: &SystemSpec, lines: usize);
    fn on_line_complete(&self, spec: &SystemSpec, result: &LineResult);
    fn on_line_failed(&self, spec: &SystemSpec, line: usize, error: &str);
    fn on_run_complete(&self, run: &SystemRun, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_run_start(&self, _: &SystemSpec, _: usize) {}
    fn on_line_complete(&self, _: &SystemSpec, _: &LineResult) {}
    fn on_line_failed(&self, _: &SystemSpec, _: usize, _: &str) {}
    fn on_run_complete(&self, _: &SystemRun, _: Duration) {}
}

/// Score one line from the texts the provider returned.
///
/// `failure` marks a line whose forward or reverse call failed. The caller
/// passes empty strings for the outputs that were never produced.
pub fn score_line(
    index: usize,
    original: &str,
    forward: &str,
    round_tripped: &str,
    block: UnicodeBlock,
    failure: Option<String>,
) -> LineResult {
    let denominator = original.chars().count().max(round_tripped.chars().count());
    LineResult {
        index,
        original: original.to_string(),
        forward: forward.to_string(),
        round_tripped: round_tripped.to_string(),
        exact_match: original == round_tripped,
        matched_chars: matched_chars(original, round_tripped),
        accuracy_denominator: denominator,
        edit_distance: levenshtein(original, round_tripped),
        valid_unicode: block.covers(forward),
        failure,
    }
}

/// Call the provider, retrying transient failures with exponential backoff.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(system = provider.name(), from = %request.source_script, to = %request.target_script)
)]
pub async fn transliterate_with_retry(
    provider: &dyn TransliterationProvider,
    request: &TransliterateRequest,
    max_retries: u32,
    retry_delay: Duration,
) -> Result<String> {
    let mut delay = retry_delay;
    let mut last_error = None;
    for attempt in 0..=max_retries {
        if attempt > 0 {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_RETRY_DELAY);
        }
        match provider.transliterate(request).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                let permanent = e
                    .downcast_ref::<ProviderError>()
                    .is_some_and(ProviderError::is_permanent);
                if permanent {
                    return Err(e);
                }
                tracing::debug!(attempt, "transient provider error: {e:#}");
                last_error = Some(e);
            }
        }
    }
    let e = last_error.unwrap_or_else(|| anyhow::anyhow!("no attempts made"));
    tracing::error!("giving up after {} retries: {e:#}", max_retries);
    Err(e)
}

/// The central evaluation engine.
pub struct EvalEngine {
    providers: HashMap<String, Arc<dyn TransliterationProvider>>,
    scripts: ScriptTable,
    config: EvalEngineConfig,
}

impl EvalEngine {
    pub fn new(
        providers: HashMap<String, Arc<dyn TransliterationProvider>>,
        scripts: ScriptTable,
        config: EvalEngineConfig,
    ) -> Self {
        Self {
            providers,
            scripts,
            config,
        }
    }

    pub fn config(&self) -> &EvalEngineConfig {
        &self.config
    }

    /// Resolve a pair to its provider, canonical script name and block.
    ///
    /// Fails for unknown systems, scripts missing from the block table and
    /// scripts the provider does not list.
    fn resolve(&self, spec: &SystemSpec) -> Result<(Arc<dyn TransliterationProvider>, SystemSpec, UnicodeBlock)> {
        let Some(provider) = self.providers.get(&spec.system) else {
            let mut known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
            known.sort_unstable();
            bail!("unknown system '{}' (configured: {})", spec.system, known.join(", "));
        };
        let block = self.scripts.require(&spec.script)?;
        let script = self
            .scripts
            .canonical_name(&spec.script)
            .unwrap_or(&spec.script)
            .to_string();
        if !provider
            .supported_scripts()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&script))
        {
            bail!("system '{}' does not support script '{}'", spec.system, script);
        }
        Ok((Arc::clone(provider), SystemSpec::new(spec.system.clone(), script), block))
    }

    /// Evaluate one (system, script) pair over the corpus.
    pub async fn evaluate(
        &self,
        spec: &SystemSpec,
        corpus: &[String],
        progress: &dyn ProgressReporter,
    ) -> Result<SystemRun> {
        let (provider, spec, block) = self.resolve(spec)?;
        Ok(self.evaluate_resolved(provider, &spec, block, corpus, progress).await)
    }

    async fn evaluate_resolved(
        &self,
        provider: Arc<dyn TransliterationProvider>,
        spec: &SystemSpec,
        block: UnicodeBlock,
        corpus: &[String],
        progress: &dyn ProgressReporter,
    ) -> SystemRun {
        let start = Instant::now();
        let lines: Vec<(usize, &String)> = corpus
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .collect();

        tracing::info!(system = %spec.system, script = %spec.script, lines = lines.len(), "starting run");
        progress.on_run_start(spec, lines.len());

        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut futures = FuturesUnordered::new();

        for (index, line) in lines {
            let provider = Arc::clone(&provider);
            let semaphore = Arc::clone(&semaphore);
            let request = TransliterateRequest::new(line.as_str(), &self.config.source_script, &spec.script);
            let config = &self.config;

            futures.push(async move {
                // the semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();

                let forward = transliterate_with_retry(
                    provider.as_ref(),
                    &request,
                    config.max_retries,
                    config.retry_delay,
                )
                .await;
                let (forward, round_tripped, failure) = match forward {
                    Err(e) => (String::new(), String::new(), Some(format!("forward: {e:#}"))),
                    Ok(forward) => {
                        let back = transliterate_with_retry(
                            provider.as_ref(),
                            &request.reversed(forward.as_str()),
                            config.max_retries,
                            config.retry_delay,
                        )
                        .await;
                        match back {
                            Ok(back) => (forward, back, None),
                            Err(e) => (forward, String::new(), Some(format!("reverse: {e:#}"))),
                        }
                    }
                };
                score_line(index, &request.text, &forward, &round_tripped, block, failure)
            });
        }

        let mut results = Vec::with_capacity(futures.len());
        while let Some(result) = futures.next().await {
            results.push(result);
        }
        results.sort_by_key(|r| r.index);

        let mut acc = SummaryAccumulator::new();
        for result in &results {
            match &result.failure {
                Some(message) => {
                    tracing::warn!(
                        line = result.index + 1,
                        system = %spec.system,
                        script = %spec.script,
                        "provider failure: {message}"
                    );
                    progress.on_line_failed(spec, result.index + 1, message);
                }
                None => {
                    tracing::debug!(line = result.index + 1, exact = result.exact_match, "line scored");
                    progress.on_line_complete(spec, result);
                }
            }
            acc.add(result);
        }
        let run = acc.finish(spec);

        let elapsed = start.elapsed();
        tracing::info!(
            system = %spec.system,
            script = %spec.script,
            exact = run.summary.exact_matches_percent,
            accuracy = run.summary.char_accuracy_percent,
            failures = run.failures.len(),
            "run complete"
        );
        progress.on_run_complete(&run, elapsed);
        run
    }

    /// Evaluate every pair in `specs`, in order.
    ///
    /// All pairs are validated before any provider is called.
    pub async fn run(
        &self,
        corpus: &[String],
        specs: &[SystemSpec],
        progress: &dyn ProgressReporter,
    ) -> Result<EvaluationReport> {
        let start = Instant::now();
        let resolved = specs
            .iter()
            .map(|spec| self.resolve(spec))
            .collect::<Result<Vec<_>>>()?;

        let mut runs = Vec::with_capacity(resolved.len());
        for (provider, spec, block) in resolved {
            runs.push(self.evaluate_resolved(provider, &spec, block, corpus, progress).await);
        }

        Ok(EvaluationReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            source_script: self.config.source_script.clone(),
            corpus_lines: corpus.iter().filter(|l| !l.trim().is_empty()).count(),
            runs,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
