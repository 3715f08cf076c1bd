//! # ballast-core
//!
//! Core vocabulary for the Ballast MVI (Model-View-Intent) runtime.
//!
//! This crate has minimal dependencies and carries no async runtime. It is
//! meant to be imported by interceptors, loggers and tools that only need to
//! understand what a running ViewModel reports, without depending on the
//! coordinator itself.
//!
//! # Contents
//!
//! ## Contracts ([`Message`])
//!
//! Inputs, Events and State are all plain values. They must be cheap to clone,
//! debuggable, and safe to move across tasks.
//!
//! ## Usage discipline ([`InputStrategyGuardian`])
//!
//! Every Input handler invocation is watched by a guardian that enforces the
//! single-primary-action rule: read state, update state, post an event, or
//! explicitly do nothing, optionally followed by side jobs.
//!
//! ## Observation ([`BallastNotification`])
//!
//! The closed set of lifecycle notifications emitted, in order, by the
//! coordinator to every interceptor.
//!
//! ## Logging ([`BallastLogger`])
//!
//! A pluggable sink with no-op, println and `tracing` built-ins.
//!
//! # Error Types
//!
//! - [`GuardianError`] - Handler usage violations (programmer errors)
//! - [`HandlerError`] - Failures reported for handler bodies and side jobs
//! - [`SendError`] - A producer could not enqueue a value

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod guardian;
mod logger;
mod message;
mod notification;
mod status;

// Re-exports
pub use error::{BoxError, GuardianError, HandlerError, SendError};
pub use guardian::{DefaultGuardian, InputStrategyGuardian, ParallelGuardian};
pub use logger::{BallastLogger, NoOpLogger, PrintlnLogger, TracingLogger};
pub use message::Message;
pub use notification::BallastNotification;
pub use status::{RestartState, Status};
