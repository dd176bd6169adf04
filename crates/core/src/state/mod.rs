//! Run state management.
//!
//! This module provides the run state machine: one function per transition,
//! each returning the events that describe it.

pub mod run;
