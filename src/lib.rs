//! `hvl-fit` library crate.
//!
//! The binary (`hvl`) is a thin wrapper around this library so that:
//!
//! - the statistic and search are testable without spawning processes
//! - one parameterized core serves every dataset
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod models;
pub mod report;
