//! Stage Orchestrator
//!
//! Turns a verb plus a list of kind tokens into provisioner calls, one kind at
//! a time. A failing kind is recorded in the [`RunReport`] and the run moves
//! on to the next token.

use crate::error::Result;
use crate::provision::{ProvisionContext, provisioner};
use crate::report::RunReport;
use crate::resource::{ResourceHandle, ResourceKind};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Shorthand for every kind in dependency order
pub const ALL_TOKEN: &str = "all";

/// Top-level operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Delete,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::Create => write!(f, "create"),
            Verb::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "create" => Ok(Verb::Create),
            "delete" => Ok(Verb::Delete),
            other => Err(other.to_string()),
        }
    }
}

/// A parsed kind token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Kind(ResourceKind),
    Unknown(String),
}

/// Parse kind tokens, expanding `all` in place.
pub fn parse_selectors<S: AsRef<str>>(tokens: &[S]) -> Vec<Selector> {
    let mut selectors = Vec::new();
    for token in tokens {
        let token = token.as_ref();
        if token == ALL_TOKEN {
            selectors.extend(ResourceKind::ALL.into_iter().map(Selector::Kind));
            continue;
        }
        match token.parse::<ResourceKind>() {
            Ok(kind) => selectors.push(Selector::Kind(kind)),
            Err(unknown) => selectors.push(Selector::Unknown(unknown)),
        }
    }
    selectors
}

pub struct StageOrchestrator {
    ctx: Arc<ProvisionContext>,
}

impl StageOrchestrator {
    pub fn new(ctx: ProvisionContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub fn context(&self) -> &ProvisionContext {
        &self.ctx
    }

    /// Run `verb` for every kind named by `tokens`, in the order given.
    pub async fn run<S: AsRef<str>>(&self, verb: Verb, tokens: &[S]) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::new();

        let selectors = parse_selectors(tokens);
        if selectors.is_empty() {
            warn!("No resource kinds given, nothing to {}", verb);
        }

        for selector in selectors {
            let kind = match selector {
                Selector::Kind(kind) => kind,
                Selector::Unknown(token) => {
                    warn!("Unknown resource kind '{}', skipping", token);
                    report.add_skipped(token);
                    continue;
                }
            };

            info!("==> {} {}", verb, kind);
            let provisioner = provisioner(kind, self.ctx.clone());
            let result = match verb {
                Verb::Create => provisioner.create().await,
                Verb::Delete => provisioner.delete().await,
            };

            match result {
                Ok(message) => report.add_success(kind, message),
                Err(e) => {
                    error!("{} {} failed: {}", verb, kind, e);
                    report.add_failure(kind, &e);
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Locate every resource the kinds named by `tokens` consist of.
    pub async fn status<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<ResourceHandle>> {
        let locator = self.ctx.locator();
        let mut handles = Vec::new();

        for selector in parse_selectors(tokens) {
            match selector {
                Selector::Kind(kind) => {
                    handles.extend(locator.locate(kind, &self.ctx.config).await?);
                }
                Selector::Unknown(token) => {
                    warn!("Unknown resource kind '{}', skipping", token);
                }
            }
        }
        Ok(handles)
    }
}
