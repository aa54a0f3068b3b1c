//! Interview session operations.

mod abandon_session;
mod complete_session;
mod confirm_rating;
mod get_conversation;
mod send_message;
mod start_session;

pub use abandon_session::{AbandonSessionCommand, AbandonSessionHandler, AbandonSessionResult};
pub use complete_session::{
    CompleteSessionCommand, CompleteSessionHandler, CompleteSessionResult,
};
pub use confirm_rating::{ConfirmRatingCommand, ConfirmRatingHandler, ConfirmRatingResult};
pub use get_conversation::{
    GetConversationHandler, GetConversationQuery, GetConversationResult, SessionLookup,
};
pub use send_message::{
    PendingConfirmation, SendMessageCommand, SendMessageHandler, SendMessageResult,
};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
