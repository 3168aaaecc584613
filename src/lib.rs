//! aerowal - Region sequence stamping for write-ahead log entries
//!
//! Assigns each in-flight WAL edit a per-region, monotonically increasing
//! sequence id coordinated with MVCC, exactly once, and records which
//! column families the edit touches.

pub mod mvcc;
pub mod observability;
pub mod wal;
