//! Consolidated test utilities for opavm
//!
//! Integration tests run the real `opavm` binary against a throwaway
//! `OPAVM_HOME`, with fake tool binaries standing in for OPA and Regal.

pub mod assertions;
pub mod fixtures;
pub mod sandbox;
