//! Observability setup for ChatFlow: structured logging via `tracing` and an
//! optional OpenTelemetry bridge.

pub mod tracing_setup;
