//! # datachat
//!
//! Client engine for a line-based TCP chat protocol:
//! - Line framing with `\r` stripping over a buffered reader
//! - Response classification against a fixed token vocabulary
//! - Count-prefixed inbox batches split into private and public messages
//! - A three-state session lifecycle with per-operation guards
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Caller (menu / REPL / tests)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       ChatSession                           │
//! │         (state machine guard + transitions)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │   Encoder   │          │  LineReader  │
//!   │  (Command)  │          │  (framing)   │
//!   └──────┬──────┘          └──────┬───────┘
//!          │                        │
//!          │                ┌───────┴────────┐
//!          │                ▼                ▼
//!          │         ┌────────────┐   ┌────────────┐
//!          │         │ Classifier │   │   Inbox    │
//!          │         └────────────┘   └────────────┘
//!          ▼
//!   ┌─────────────────────────────────────────────┐
//!   │            Connection (TCP socket)          │
//!   └─────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod state;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChatError, Result};
pub use config::{Config, DisconnectPolicy};
pub use session::{ChatSession, Outcome, Request};
pub use state::{Operation, SessionState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of datachat
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
