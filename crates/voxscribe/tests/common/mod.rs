//! Shared test utilities for voxscribe integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated queue runs with temp audio files
//! - Scriptable fakes for the provider and content-store collaborators

pub mod fakes;
pub mod harness;

pub use fakes::{FakeContentStore, FakeProvider, Step};
pub use harness::{wait_for_terminal, TestHarness};
