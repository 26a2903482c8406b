use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{db::{self, MemberProfile, Profile}, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Conversation {
    pub id: String,
    pub member_one_id: String,
    pub member_two_id: String,
}

/// A conversation with both of its members loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMembers {
    pub id: String,
    pub member_one: MemberProfile,
    pub member_two: MemberProfile,
}

impl ConversationMembers {
    /// The slot that isn't `profile_id`.
    pub fn other_member(&self, profile_id: &str) -> &MemberProfile {
        if self.member_one.profile_id == profile_id {
            &self.member_two
        } else {
            &self.member_one
        }
    }
}

/// Where a request that can't see the conversation is sent instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denied {
    /// No signed-in profile.
    SignIn,
    /// Not a member of the server.
    Home,
    /// The conversation couldn't be found or created.
    Server(String),
}

impl Denied {
    pub fn location(&self) -> String {
        match self {
            Denied::SignIn => "/sign-in".to_owned(),
            Denied::Home => "/".to_owned(),
            Denied::Server(server_id) => format!("/servers/{server_id}"),
        }
    }
}

/// Everything the direct-message page needs about who is talking to whom.
#[derive(Debug, Clone)]
pub struct DirectChat {
    pub server_id: String,
    pub profile: Profile,
    pub current_member: MemberProfile,
    pub conversation: ConversationMembers,
}

impl DirectChat {
    pub fn other_member(&self) -> &MemberProfile {
        self.conversation.other_member(&self.profile.id)
    }
}

/// Checks `profile` may talk to `member_id` in `server_id`, creating their conversation on first contact.
pub async fn resolve_direct_chat(
    db_pool: &SqlitePool,
    profile: Option<Profile>,
    server_id: &str,
    member_id: &str,
) -> AppResult<Result<DirectChat, Denied>> {
    let Some(profile) = profile else {
        return Ok(Err(Denied::SignIn));
    };

    let Some(current_member) = db::find_member(db_pool, server_id, &profile.id).await? else {
        return Ok(Err(Denied::Home));
    };

    let Some(conversation) = get_or_create_conversation(db_pool, &current_member.id, member_id).await? else {
        return Ok(Err(Denied::Server(server_id.to_owned())));
    };

    Ok(Ok(DirectChat {
        server_id: server_id.to_owned(),
        profile,
        current_member,
        conversation,
    }))
}

/// Either ordering of the pair finds the same conversation.
pub async fn find_conversation(
    db_pool: &SqlitePool,
    member_one_id: &str,
    member_two_id: &str,
) -> sqlx::Result<Option<Conversation>> {
    sqlx::query_as(
        "SELECT id,member_one_id,member_two_id FROM conversations
         WHERE (member_one_id=? AND member_two_id=?) OR (member_one_id=? AND member_two_id=?)",
    )
        .bind(member_one_id)
        .bind(member_two_id)
        .bind(member_two_id)
        .bind(member_one_id)
        .fetch_optional(db_pool)
        .await
}

/// `None` when the pair can't have a conversation: the same member twice,
/// a member that doesn't exist, or members of different servers.
pub async fn get_or_create_conversation(
    db_pool: &SqlitePool,
    member_one_id: &str,
    member_two_id: &str,
) -> AppResult<Option<ConversationMembers>> {
    if member_one_id == member_two_id {
        return Ok(None);
    }

    if let Some(conversation) = find_conversation(db_pool, member_one_id, member_two_id).await? {
        return Ok(with_members(db_pool, conversation).await?);
    }

    let (Some(member_one), Some(member_two)) = (
        db::find_member_by_id(db_pool, member_one_id).await?,
        db::find_member_by_id(db_pool, member_two_id).await?,
    ) else {
        return Ok(None);
    };
    if member_one.server_id != member_two.server_id {
        return Ok(None);
    }

    // a concurrent insert of the same pair loses to the pair index; either way the stored row is read back
    let inserted = sqlx::query(
        "INSERT INTO conversations (id,member_one_id,member_two_id) VALUES (?,?,?) ON CONFLICT DO NOTHING",
    )
        .bind(Uuid::now_v7().to_string())
        .bind(member_one_id)
        .bind(member_two_id)
        .execute(db_pool)
        .await;
    match inserted {
        Ok(result) if result.rows_affected() == 1 => {
            tracing::info!("conversation {member_one_id} <-> {member_two_id}");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!("couldn't create conversation {member_one_id} <-> {member_two_id}: {err}");
        }
    }

    let Some(conversation) = find_conversation(db_pool, member_one_id, member_two_id).await? else {
        return Ok(None);
    };

    Ok(with_members(db_pool, conversation).await?)
}

async fn with_members(db_pool: &SqlitePool, conversation: Conversation) -> sqlx::Result<Option<ConversationMembers>> {
    let (Some(member_one), Some(member_two)) = (
        db::find_member_by_id(db_pool, &conversation.member_one_id).await?,
        db::find_member_by_id(db_pool, &conversation.member_two_id).await?,
    ) else {
        return Ok(None);
    };

    Ok(Some(ConversationMembers {
        id: conversation.id,
        member_one,
        member_two,
    }))
}
