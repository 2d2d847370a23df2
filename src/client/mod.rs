//! Client-side state
//!
//! Reducers a connected client applies to real-time frames.

mod inbox;

pub use inbox::{InboxEntry, NotificationInbox, Received};
