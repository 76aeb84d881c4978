//! Integration test suite for the topology engine
//!
//! End-to-end scenarios over the full pipeline: snapshot in, stable graph
//! out, filters re-applied on top. Each test asserts the structural
//! invariants hold on every produced graph.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: Build pipeline scenarios (base model, depicters,
//!   operator re-parenting, traffic overlay, idempotence)
//! - **filter**: Filter engine scenarios (kind exclusion, application
//!   selection, expand toggles, extension filterers)

mod filter;
mod pipeline;
