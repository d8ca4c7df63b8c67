//! # Charlie Board
//!
//! Client-side state for a small bulletin board: an arithmetic bot check in
//! front of sign-in, a session persisted to local storage, and a
//! newest-first post feed persisted alongside it.
//!
//! ## Architecture
//! ```text
//! CaptchaGate ──passed──▶ SessionManager ──session──▶ FeedStore
//!                              │                          │
//!                              └──────▶ LocalStorage ◀────┘
//! ```

pub mod busy;
pub mod captcha;
pub mod config;
pub mod feed;
pub mod session;
pub mod state;
pub mod storage;

pub use captcha::CaptchaGate;
pub use config::AppConfig;
pub use feed::{FeedSnapshot, FeedStore, encode_image};
pub use session::SessionManager;
pub use state::AppState;
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
