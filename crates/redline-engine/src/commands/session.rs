//! Explicit application state for the analyze → apply flow.
//!
//! A front-end analyzes a source first (showing the extracted changes), then
//! applies them to a destination. `Session` carries everything between the
//! two steps; nothing lives in globals.

#![allow(clippy::result_large_err)]

use crate::commands::update::{
    annotate, apply_changes, chain_options, finish, load_changes, SourceKind, UpdateOutcome,
};
use redline_core::config::RedlineConfig;
use redline_core::errors::{ExError, ExErrorKind};
use redline_core::model::ChangeRecord;
use redline_core::{log_op_end, log_op_error, log_op_start};
use redline_core_types::RunContext;
use redline_store::chain::{LockedChain, RenameSwap, SwapStrategy};
use redline_store::errors::Result;
use std::path::{Path, PathBuf};

/// Changes extracted by the last successful analyze
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: PathBuf,
    pub kind: SourceKind,
    pub records: Vec<ChangeRecord>,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: RedlineConfig,
    ctx: RunContext,
    analysis: Option<Analysis>,
}

impl Session {
    pub fn new(config: RedlineConfig) -> Self {
        Self {
            config,
            ctx: RunContext::new(),
            analysis: None,
        }
    }

    /// Session whose first run uses `ctx` (e.g. to carry a trace id)
    pub fn with_context(config: RedlineConfig, ctx: RunContext) -> Self {
        Self {
            config,
            ctx,
            analysis: None,
        }
    }

    pub fn config(&self) -> &RedlineConfig {
        &self.config
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Records waiting to be applied (empty before analyze)
    pub fn pending(&self) -> &[ChangeRecord] {
        self.analysis
            .as_ref()
            .map(|a| a.records.as_slice())
            .unwrap_or(&[])
    }

    /// Extract changes from `source` and keep them for [`Session::apply`]
    ///
    /// A failed analyze clears any earlier analysis.
    ///
    /// # Errors
    ///
    /// `InputMissing` or extraction errors.
    pub fn analyze(&mut self, source: &Path, kind: SourceKind) -> Result<&[ChangeRecord]> {
        self.analysis = None;
        log_op_start!("session_analyze", run_id = self.ctx.run_id.as_str());
        let start = std::time::Instant::now();

        let records = load_changes(source, kind, &self.config).map_err(|e| {
            log_op_error!(
                "session_analyze",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            annotate(e, &self.ctx)
        })?;

        log_op_end!(
            "session_analyze",
            duration_ms = start.elapsed().as_millis() as u64,
            change_count = records.len()
        );
        let analysis = self.analysis.insert(Analysis {
            source: source.to_path_buf(),
            kind,
            records,
        });
        Ok(&analysis.records)
    }

    /// Apply the analyzed changes to `destination`
    ///
    /// An empty analysis still produces a new version. On success the
    /// analysis is consumed and the session starts a fresh run id.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if nothing was analyzed; otherwise as for
    /// [`run_update`](crate::commands::update::run_update).
    pub fn apply(&mut self, destination: &Path) -> Result<UpdateOutcome> {
        self.apply_with_swap(destination, Box::new(RenameSwap))
    }

    /// # Errors
    ///
    /// See [`Session::apply`].
    pub fn apply_with_swap(
        &mut self,
        destination: &Path,
        swap: Box<dyn SwapStrategy>,
    ) -> Result<UpdateOutcome> {
        let Some(analysis) = self.analysis.as_ref() else {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("session_apply")
                .with_run_id(self.ctx.run_id.clone())
                .with_message("no analyzed source; run analyze first"));
        };

        log_op_start!(
            "session_apply",
            run_id = self.ctx.run_id.as_str(),
            destination = %destination.display()
        );
        let start = std::time::Instant::now();

        let applied = LockedChain::open_with_swap(
            destination,
            &self.ctx.run_id,
            chain_options(&self.config),
            swap,
        )
        .and_then(|mut chain| apply_changes(&mut chain, &analysis.records, &self.config))
        .map_err(|e| {
            log_op_error!(
                "session_apply",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            annotate(e, &self.ctx)
        })?;

        let outcome = finish(applied, destination, &self.ctx);
        log_op_end!(
            "session_apply",
            duration_ms = start.elapsed().as_millis() as u64,
            version = outcome.status.version()
        );

        self.analysis = None;
        self.ctx = RunContext::new();
        Ok(outcome)
    }

    /// Drop any pending analysis
    pub fn reset(&mut self) {
        self.analysis = None;
    }
}
