// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lookout integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! without a live chat session or messaging gateway.
//!
//! # Components
//!
//! - [`MockTransport`] - scripted event batches, canned media, recorded presence
//! - [`MockSink`] - captured payloads with configurable failure
//! - [`MemorySessionStore`] - credentials kept in memory
//! - [`TestHarness`] - a `StatusRelay` wired to all of the above
//! - [`fixtures`] - event builders

pub mod fixtures;
pub mod harness;
pub mod memory_store;
pub mod mock_sink;
pub mod mock_transport;

pub use harness::TestHarness;
pub use memory_store::MemorySessionStore;
pub use mock_sink::MockSink;
pub use mock_transport::MockTransport;
