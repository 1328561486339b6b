//! Integration tests for odoo-ci
//!
//! These tests spawn the actual binary. None of them reach the pipeline,
//! so no Docker daemon, git or PostgreSQL is needed.

mod cli_tests;
