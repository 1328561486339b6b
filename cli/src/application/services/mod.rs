//! Application services: use-case orchestration.
//!
//! Each service module implements a single component by composing domain
//! logic with port trait calls. Services import only from `crate::domain`
//! and `crate::application::ports`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod container;
pub mod database;
pub mod filesystem;
pub mod image;
pub mod pipeline;
pub mod remote;
pub mod source;
