//! Real-time delivery
//!
//! Handles:
//! - Connection registry (user id → live connection)
//! - Notification fan-out
//! - WebSocket endpoint
//! - Event wire format

pub mod events;
mod notifier;
mod registry;
mod socket;

pub use events::{
    CommentSummary, NotificationEvent, NotificationKind, PostSummary, ReplySummary, ServerEvent,
    UserSummary,
};
pub use notifier::Notifier;
pub use registry::{ConnectionId, ConnectionRegistry, ConnectionSender};
pub use socket::socket_handler;
