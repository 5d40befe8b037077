//! # Scoreboard Server
//!
//! Per-level leaderboard keeping each player's best (lowest) completion time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SCOREBOARD SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  store/          - Best-time table and persistence           │
//! │  ├── record.rs   - Score record (level, playerName, time)    │
//! │  ├── table.rs    - In-memory table, best-time rule           │
//! │  └── file.rs     - Whole-table JSON file                     │
//! │                                                              │
//! │  network/        - HTTP surface                              │
//! │  ├── auth.rs     - Shared-secret API key                     │
//! │  ├── protocol.rs - Request/response bodies, error mapping    │
//! │  └── server.rs   - Config, router, CORS, serve loop          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Best-Time Rule
//!
//! At most one record exists per (level, player name). A submission is
//! accepted if it is the first for that pair or strictly faster than the
//! stored time; the whole table is then rewritten to disk before the
//! response is sent. Check, update and write happen under one lock.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod network;
pub mod store;

// Re-export commonly used types
pub use network::server::{AppState, ServerConfig};
pub use store::{
    Level, ScoreRecord, ScoreStore, ScoreTable, StoreError, SubmitError, SubmitOutcome,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
