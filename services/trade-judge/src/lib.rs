//! Trade Judge Library
//!
//! Recommends long, short or flat for a proposed trade by comparing it with
//! the trader's own closed trades.

pub mod error;
pub mod judge;


pub use error::{JudgeError, Result};
pub use judge::{judge, AbstainReason, JudgeConfig, JudgeEngine, JudgeResult, ProposedTrade};
