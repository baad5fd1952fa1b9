//! robotrepo - A history of Robot Framework results
//!
//! Parses the XML reports a Robot Framework run leaves behind into a result
//! tree, stores one tree per build and answers questions across builds: since
//! when has a test been failing, and how did counts and durations develop.
//!
//! # Architecture
//!
//! - [`parser`]: report discovery by glob mask and XML parsing
//! - [`model`]: the run / suite / case tree, tallies and pass percentages
//! - [`history`]: builds, the [`history::BuildHistory`] seam and cross-build linkage
//! - [`regression`]: failure streaks of individual cases
//! - [`trend`]: outcome and duration series over recent builds
//! - [`repository`]: repository trait and file-based storage of builds
//! - [`commands`]: user-facing commands (init, load, last, failing, stats, show, trend, duration)
//! - [`config`]: .robotr.conf parsing
//! - [`ui`]: user interface abstraction for output
//! - [`error`]: error types and Result alias
//!
//! # Repository Format
//!
//! The `.robotr/` directory contains:
//!
//! - `format`: version file containing "1"
//! - `next-build`: number of the next stored build
//! - `builds/<n>.json`: the build and its result tree
//!
//! # Example
//!
//! ```no_run
//! use robotrepo::history::BuildHistory;
//! use robotrepo::parser::ReportParser;
//! use robotrepo::repository::{file::FileRepositoryFactory, RepositoryFactory};
//! use robotrepo::regression::RegressionTracker;
//! use std::path::Path;
//!
//! # fn main() -> robotrepo::Result<()> {
//! let mut repo = FileRepositoryFactory.initialise(Path::new("."))?;
//! let run = ReportParser::new("results", "**/output*.xml").parse()?;
//! let build = repo.insert_build(Some(run))?;
//!
//! let history = repo.load_history()?;
//! let tracker = RegressionTracker::new(&history);
//! if let Some(run) = history.result(build.number) {
//!     for case in run.failed_cases() {
//!         println!("{} failing for {} build(s)", case.full_name(), tracker.age(case));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod parser;
pub mod regression;
pub mod repository;
pub mod trend;
pub mod ui;

pub use error::{Error, Result};
