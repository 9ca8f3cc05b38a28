//! Common test utilities and helpers
//!
//! Shared by the integration test binaries: an in-memory [`fake_vcs::FakeVcs`]
//! for engine scenarios, and helpers that build project trees and real git
//! repositories.

#![allow(dead_code)]

pub mod fake_vcs;
pub mod test_helpers;
