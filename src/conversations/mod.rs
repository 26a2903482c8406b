//! The direct-message page between two members of a server.

mod page;
mod resolve;
mod view;

use axum::{routing::get, Router};

use crate::AppState;

pub use resolve::{
    find_conversation, get_or_create_conversation, resolve_direct_chat, Conversation,
    ConversationMembers, Denied, DirectChat,
};
pub use view::{ChatView, ConversationPage};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/servers/{server_id}/conversations/{member_id}", get(page::conversation))
}
