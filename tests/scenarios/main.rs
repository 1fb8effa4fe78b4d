//! Scenario-based tests for pipeline-shell
//!
//! These run pipelines against a scripted command runner, so no real
//! programs are launched.

mod helpers;

mod failure_handling;
mod saved_pipelines;
mod success_chain;
