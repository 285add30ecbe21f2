//! Unit tests — fast, no network, no real board.
//!
//! Stages run against `FakeBoard`, an in-memory Raspberry Pi that interprets
//! the shell commands the pipeline issues. Infrastructure adapters are tested
//! with recording runners.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod helpers;

mod property_tests;
mod ssh_target;
