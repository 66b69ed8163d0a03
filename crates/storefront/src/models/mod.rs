//! Session-backed visitor state.

pub mod session;

pub use session::{Notice, NoticeKind, keys as session_keys};
