//! LINE gateway - answers LINE chats with Gemini
//!
//! Text messages get a chat reply. Files are held until the user says what to
//! do with them, then downloaded, sent to Gemini with a matching prompt and
//! the result pushed back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   webhook    ┌────────────────────────────────────┐
//! │  LINE        │ ───────────▶ │ api        signature, 200 at once  │
//! │  Platform    │              └─────────────────┬──────────────────┘
//! │              │                                │ spawn
//! │              │              ┌─────────────────▼──────────────────┐
//! │              │ ◀── reply ── │ dispatch   dedup, text/file routes │
//! │              │ ◀── push ─── │            intent negotiation      │
//! └──────────────┘              └───┬──────────────┬─────────────┬───┘
//!                                   │              │             │
//!                             ┌─────▼─────┐  ┌─────▼─────┐ ┌─────▼─────┐
//!                             │ pending   │  │ media     │ │ ai        │
//!                             │ store     │  │ + reaper  │ │ (Gemini)  │
//!                             └───────────┘  └───────────┘ └───────────┘
//! ```

pub mod ai;
pub mod api;
pub mod channels;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod media;
pub mod pending;

pub use ai::{GeminiClient, Generator};
pub use channels::{Delivery, LineChannel, MediaKind, Messenger, OutgoingMessage, Profile};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use pending::{Lookup, PendingFile, PendingFileStore};
