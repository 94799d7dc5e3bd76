//! Tooling around an answer-set-programming approach to the ITC2021 sports
//! timetabling competition.
//!
//! The central piece is [`facts`], which turns a competition instance (XML)
//! into ASP facts for the solver. The remaining modules post-process solver
//! runs: [`solution_xml`] writes competition solution files, [`bounds`] reads
//! the reference bounds, [`validator`] drives the external RobinX validator
//! and [`analysis`] compares the runs of several solver configurations.

pub mod analysis;
pub mod bounds;
pub mod csv;
pub mod error;
pub mod facts;
pub mod files;
pub mod instance;
pub mod lists;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod schema;
pub mod solution_xml;
pub mod solver_output;
pub mod validator;

pub use error::{Error, Result};
