//! KBBI crossword mini-game for Telegram.
//!
//! The game core (catalog, grid, cursor, session) is plain synchronous state
//! that the mini app drives; the bot side relays its events into chat replies
//! and persistent progress. Storage is a small async key-value trait with a
//! sled backing and an in-memory fallback.

pub mod achievements;
pub mod bot;
pub mod catalog;
pub mod commands;
pub mod cursor;
pub mod events;
pub mod grid;
pub mod platform;
pub mod progress;
pub mod session;
pub mod storage;
pub mod webhook;
