//! Provider that delegates to an external scraper process.
//!
//! The process receives the [`SearchRequest`] as JSON on stdin and must print
//! a JSON array of postings on stdout. Field names follow common scraper
//! output (`job_url`, `site_name`) as well as the native ones.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use jobscout_search::{JobSearchProvider, Posting, ProviderError, SearchRequest};

/// Default time allowed for one scraper invocation.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Runs a scraper command once per query.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProvider {
    /// Create a provider for `program` with the default timeout (2 minutes).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Split a whitespace-separated command line into program and args.
    ///
    /// Returns `None` for a blank line. No shell quoting is interpreted.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts.collect()))
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn execute(&self, input: &[u8]) -> Result<Vec<Posting>, ProviderError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input).await {
                Ok(()) => {}
                // Scraper exited without reading the request; its status decides
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e.into()),
            }
        }

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            warn!(program = %self.program, status = %output.status, stderr = %stderr.trim(), "scraper exited unsuccessfully");
            let detail = if stderr.trim().is_empty() {
                output.status.to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ProviderError::Command(detail));
        }

        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "scraper stderr (non-fatal)");
        }

        parse_postings(&output.stdout)
    }
}

#[async_trait]
impl JobSearchProvider for CommandProvider {
    #[tracing::instrument(skip(self, request), fields(program = %self.program, wanted = request.results_wanted))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Posting>, ProviderError> {
        let input = serde_json::to_vec(request)?;

        match tokio::time::timeout(self.timeout, self.execute(&input)).await {
            Ok(result) => {
                let postings = result?;
                debug!(returned = postings.len(), "scraper returned postings");
                Ok(postings)
            }
            Err(_) => Err(ProviderError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

/// Blank output means no results.
fn parse_postings(stdout: &[u8]) -> Result<Vec<Posting>, ProviderError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}
