//! Quorum consensus domain
//!
//! A consensus round asks several independent models the same question and
//! aggregates their verdicts into a single gate decision.
//!
//! ```text
//!   responses ──parse_verdict──▶ ModelVerdict ─┐
//!                                              ├─▶ ConsensusReport (verdict + markdown)
//!   ApprovalThreshold ─────────────────────────┘
//! ```
//!
//! The same aggregation runs for both [`ConsensusMode`]s; only the verdict
//! vocabulary and report heading differ.

pub mod consensus;
pub mod parsing;
pub mod report;
pub mod rule;
pub mod vote;

pub use consensus::{ConsensusMode, ConsensusReport, ConsensusVerdict, Tally, aggregate};
pub use parsing::parse_verdict;
pub use rule::ApprovalThreshold;
pub use vote::{ModelVerdict, Verdict};
