//! Core domain types: identifiers, the job record, and the executor seam.

pub mod executor;
pub mod job;
pub mod types;
