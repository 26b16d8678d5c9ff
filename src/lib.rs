//! eodtrader — end-of-day stock screening and strategy backtesting.
//!
//! Hexagonal layout: pure computation in [`domain`], seam traits in
//! [`ports`], concrete edges in [`adapters`], and the orchestration that
//! ties them together in [`pipeline`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod pipeline;
pub mod ports;
