use askama::Template;

use crate::{direct_messages::{DirectMessage, MessageBatch}, render_markdown};

use super::DirectChat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatView {
    Media,
    Text,
}

impl ChatView {
    /// `?video`, `?video=true|1|yes|on` pick the media room; anything else is text chat.
    pub fn from_flag(flag: Option<&str>) -> ChatView {
        match flag.map(|flag| flag.trim().to_ascii_lowercase()) {
            Some(flag) if matches!(flag.as_str(), "" | "true" | "1" | "yes" | "on") => ChatView::Media,
            _ => ChatView::Text,
        }
    }

    /// Any truthy `video` pair in the query string wins, so a repeated flag still opens the room.
    pub fn from_query(pairs: &[(String, String)]) -> ChatView {
        let media = pairs
            .iter()
            .filter(|(key, _)| key == "video")
            .any(|(_, value)| ChatView::from_flag(Some(value)) == ChatView::Media);
        if media { ChatView::Media } else { ChatView::Text }
    }
}

pub struct ChatHeader {
    pub image_url: String,
    pub name: String,
    pub server_id: String,
    pub kind: &'static str,
    pub toggle_url: String,
    pub toggle_label: &'static str,
}

pub struct MediaRoom {
    pub chat_id: String,
    pub video: bool,
    pub audio: bool,
}

pub struct MessageView {
    pub id: String,
    pub author: String,
    pub image_url: String,
    pub content_html: String,
    pub created_at: String,
    pub deleted: bool,
    pub edited: bool,
}

impl From<&DirectMessage> for MessageView {
    fn from(message: &DirectMessage) -> Self {
        MessageView {
            id: message.id.clone(),
            author: message.author_name.clone(),
            image_url: message.author_image_url.clone(),
            content_html: render_markdown(&message.content),
            created_at: message.created_at.clone(),
            deleted: message.deleted,
            edited: message.edited(),
        }
    }
}

pub struct ChatMessages {
    pub member_id: String,
    pub name: String,
    pub chat_id: String,
    pub kind: &'static str,
    pub api_url: &'static str,
    pub param_key: &'static str,
    pub param_value: String,
    pub socket_url: &'static str,
    pub socket_query_value: String,
    pub messages: Vec<MessageView>,
    pub next_cursor: Option<String>,
}

pub struct ChatInput {
    pub name: String,
    pub kind: &'static str,
    pub api_url: &'static str,
    pub query_value: String,
}

#[derive(Template)]
#[template(path = "chat/conversation.html")]
pub struct ConversationPage {
    pub header: ChatHeader,
    pub media_room: Option<MediaRoom>,
    pub messages: Option<ChatMessages>,
    pub input: Option<ChatInput>,
}

impl ConversationPage {
    /// `first_batch` fills the message list in text view and is ignored for the media room.
    pub fn new(chat: &DirectChat, view: ChatView, first_batch: Option<MessageBatch>) -> ConversationPage {
        let other = chat.other_member();
        let chat_id = chat.conversation.id.clone();
        let page_url = format!("/servers/{}/conversations/{}", chat.server_id, other.id);

        let (toggle_url, toggle_label) = match view {
            ChatView::Media => (page_url, "End video call"),
            ChatView::Text => (format!("{page_url}?video=true"), "Start video call"),
        };
        let header = ChatHeader {
            image_url: other.image_url.clone(),
            name: other.name.clone(),
            server_id: chat.server_id.clone(),
            kind: "conversation",
            toggle_url,
            toggle_label,
        };

        match view {
            ChatView::Media => ConversationPage {
                header,
                media_room: Some(MediaRoom {
                    chat_id,
                    video: true,
                    audio: true,
                }),
                messages: None,
                input: None,
            },
            ChatView::Text => {
                let batch = first_batch.unwrap_or(MessageBatch { items: Vec::new(), next_cursor: None });
                ConversationPage {
                    header,
                    media_room: None,
                    messages: Some(ChatMessages {
                        member_id: chat.current_member.id.clone(),
                        name: other.name.clone(),
                        chat_id: chat_id.clone(),
                        kind: "conversation",
                        api_url: "/api/direct-messages",
                        param_key: "conversationId",
                        param_value: chat_id.clone(),
                        socket_url: "/api/socket/direct-messages",
                        socket_query_value: chat_id.clone(),
                        messages: batch.items.iter().map(MessageView::from).collect(),
                        next_cursor: batch.next_cursor,
                    }),
                    input: Some(ChatInput {
                        name: other.name.clone(),
                        kind: "conversation",
                        api_url: "/api/socket/direct-messages",
                        query_value: chat_id,
                    }),
                }
            }
        }
    }
}
