//! Shared test utilities for lifeadmin integration tests.
//!
//! - `TestHarness` wires a pipeline to recording collaborators and an
//!   in-memory log store, with uploads written to a temp directory
//! - `builders` creates parsed tasks for the common document types

pub mod builders;
pub mod fakes;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
