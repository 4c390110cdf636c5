//! # Keyword Tiers
//!
//! Rank a keyword dataset by priority score and split it into a top tier
//! (precomputed analytics) and a long tail (computed on demand).
//!
//! Each keyword is scored from its search volume and sustained growth
//! score, the whole set is sorted descending, and the first `cutoff`
//! keywords form the top tier. Both tiers and a metadata document are
//! written together or not at all.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────┐   ┌────────────────────┐
//! │ CSV input │──▶│ score → rank → split │──▶│ top tier CSV       │
//! └───────────┘   └──────────────────────┘   │ long tail CSV      │
//!                                            │ metadata JSON      │
//!                                            └────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! kwt                               # partition with ./config/kwt.toml or defaults
//! kwt partition --cutoff 5000       # override the top-tier size
//! kwt stats                         # summarize the last run
//! kwt embeddings chunk              # split an embedding matrix into chunk files
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`table`] | CSV loading and writing |
//! | [`score`] | Priority score formula |
//! | [`partition`] | Ranking and tier split |
//! | [`output`] | All-or-nothing artifact writing |
//! | [`partition_cmd`] | The partition pipeline |
//! | [`stats`] | Metadata summary |
//! | [`embeddings`] | Embedding chunk export |
//! | [`progress`] | Progress reporting |
//! | [`error`] | Error types |

pub mod config;
pub mod embeddings;
pub mod error;
pub mod models;
pub mod output;
pub mod partition;
pub mod partition_cmd;
pub mod progress;
pub mod score;
pub mod stats;
pub mod table;
