//! SigLab Runner: run configuration and batch orchestration.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML run configuration with defaults and validation
//! - The per-instrument pipeline (fetch → indicators → signals → export)
//! - Batch runs with per-symbol failure isolation and optional parallelism

pub mod config;
pub mod pipeline;

pub use config::{ConfigError, ProviderKind, RunConfig, SourceConfig, DEFAULT_MAX_SYMBOLS};
pub use pipeline::{
    process_symbol, run_batch, BatchSummary, NoProgress, PipelineProgress, RunError,
    SignalCount, SymbolError, SymbolFailure, SymbolReport,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<SourceConfig>();
        assert_sync::<SourceConfig>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<SymbolReport>();
        assert_sync::<SymbolReport>();
        assert_send::<BatchSummary>();
        assert_sync::<BatchSummary>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<SymbolError>();
        assert_sync::<SymbolError>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
