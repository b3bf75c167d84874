//! Core library for the sleep-apnea screening platform.
//!
//! The screening workflow is a four-step intake wizard whose drafts survive a
//! reload through an injected session store, a deterministic risk assessment
//! engine, and a submission pipeline that fans the finished assessment out to
//! every configured sink and tolerates partial failure.

pub mod config;
pub mod error;
pub mod screening;
pub mod telemetry;
