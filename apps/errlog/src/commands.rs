use crate::args::GlobalArgs;
use anyhow::{Context as _, Result};
use serde_json::json;
use std::io::{self, Write};
use std::time::Duration;
use stride_domain::config::StrideConfig;
use stride_domain::{ErrorCategory, ErrorLogEntry, SessionContext};
use stride_enrollment::{ErrorReporter, Failure, classify as classify_failure};
use stride_journal::{ErrorJournal, JsonFileSink};
use stride_resilience::RetryPolicy;
use tracing::debug;

const CURRENT_DIR: &str = ".";
/// Retries listed individually by `schedule`; the rest are summarized.
const MAX_SCHEDULE_LINES: usize = 20;

/// Everything a command needs: the restored journal and the output mode.
#[derive(Debug)]
pub(crate) struct Context {
    journal: ErrorJournal,
    json: bool,
}

impl Context {
    /// Opens the journal file named by `--log-file`, or `<journal.dir>/<storage_key>.json`
    /// (working directory when `journal.dir` is unset), and restores its entries.
    pub(crate) fn open(cfg: &StrideConfig, args: &GlobalArgs) -> Result<Self> {
        let sink = match &args.log_file {
            Some(path) => JsonFileSink::at(path),
            None => {
                let dir = cfg.journal.dir.clone().unwrap_or_else(|| CURRENT_DIR.into());
                JsonFileSink::new(dir, &cfg.journal.storage_key)
            },
        };
        let path = sink.path().to_path_buf();

        let session = SessionContext::new(stride_kernel::session_id())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .url(format!("file://{}", path.display()));
        let journal = ErrorJournal::builder()
            .capacity(cfg.journal.capacity)
            .session(session)
            .sink(sink)
            .build();

        let restored = journal
            .restore()
            .with_context(|| format!("Failed to read journal {}", path.display()))?;
        debug!(path = %path.display(), restored, "Journal opened");

        Ok(Self { journal, json: args.json })
    }
}

pub(crate) fn list(
    ctx: &Context,
    limit: Option<usize>,
    category: Option<ErrorCategory>,
    step: Option<&str>,
) -> Result<()> {
    let entries: Vec<ErrorLogEntry> = ctx
        .journal
        .recent(usize::MAX)
        .into_iter()
        .filter(|e| category.is_none_or(|c| e.error.category == c))
        .filter(|e| step.is_none_or(|s| e.step == s))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    let mut out = io::stdout().lock();
    if ctx.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(out, "No entries.")?;
        return Ok(());
    }
    for entry in &entries {
        writeln!(
            out,
            "{}  {}  {:<10}  {:<26}  {}",
            entry.id,
            entry.error.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.step,
            entry.error.code,
            entry.error.message
        )?;
    }
    Ok(())
}

pub(crate) fn show(ctx: &Context, id: &str) -> Result<()> {
    let entry = ctx.journal.get(id)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&entry)?)?;
    Ok(())
}

pub(crate) fn stats(ctx: &Context) -> Result<()> {
    let stats = ctx.journal.stats();
    let mut out = io::stdout().lock();
    if ctx.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
        return Ok(());
    }

    writeln!(out, "total:     {} (capacity {})", stats.total, ctx.journal.capacity())?;
    writeln!(out, "retryable: {}", stats.retryable)?;
    for (category, count) in &stats.by_category {
        writeln!(out, "  {category:<11}{count}")?;
    }
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        writeln!(out, "range:     {oldest} .. {newest}")?;
    }
    Ok(())
}

pub(crate) fn clear(ctx: &Context) -> Result<()> {
    let dropped = ctx.journal.len();
    ctx.journal.clear()?;
    let mut out = io::stdout().lock();
    writeln!(out, "Cleared {dropped} entries.")?;
    Ok(())
}

pub(crate) fn classify(ctx: &Context, raw: &str, record: Option<&str>) -> Result<()> {
    let failure = Failure::from_json(raw)?;
    let (error, entry_id) = match record {
        Some(step) => {
            let reporter = ErrorReporter::new(ctx.journal.clone());
            let entry = reporter.record(classify_failure(&failure), step);
            (entry.error, Some(entry.id))
        },
        None => (classify_failure(&failure), None),
    };

    let mut out = io::stdout().lock();
    if ctx.json {
        let value = json!({ "failure": failure, "error": error, "entryId": entry_id });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    writeln!(out, "code:      {}", error.code)?;
    writeln!(out, "category:  {}", error.category)?;
    writeln!(out, "retryable: {}", error.retryable)?;
    writeln!(out, "message:   {}", error.user_message)?;
    if let Some(id) = entry_id {
        writeln!(out, "recorded:  {id}")?;
    }
    Ok(())
}

pub(crate) fn schedule(ctx: &Context, cfg: &StrideConfig) -> Result<()> {
    let policy = RetryPolicy::from(&cfg.retry);
    let delays: Vec<u64> = policy.schedule().take(MAX_SCHEDULE_LINES).map(millis).collect();
    let omitted = policy.max_retries as usize - delays.len();
    let worst = policy.worst_case_latency().map(millis);

    let mut out = io::stdout().lock();
    if ctx.json {
        let value = json!({
            "maxRetries": policy.max_retries,
            "delaysMs": delays,
            "omittedRetries": omitted,
            "totalBackoffMs": millis(policy.total_backoff()),
            "timeoutMs": policy.timeout.map(millis),
            "worstCaseMs": worst,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        return Ok(());
    }

    writeln!(out, "attempt 1: immediately")?;
    for (retry, delay) in delays.iter().enumerate() {
        writeln!(out, "attempt {}: after {delay} ms", retry + 2)?;
    }
    if omitted > 0 {
        let cap = millis(policy.delay_for(policy.max_retries));
        writeln!(out, "... {omitted} more attempts, up to {cap} ms apart")?;
    }
    match worst {
        Some(ms) => writeln!(out, "worst case: {ms} ms")?,
        None => writeln!(out, "worst case: unbounded (no per-attempt timeout)")?,
    }
    Ok(())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
