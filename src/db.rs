//! Rows and the shared profile/server/member queries.

use std::fmt;

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub invite_code: String,
    pub profile_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Moderator,
    Guest,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use MemberRole::*;
        f.write_str(match self {
            Admin => "admin",
            Moderator => "moderator",
            Guest => "guest",
        })
    }
}

impl MemberRole {
    /// Whether this role may remove other members' messages.
    pub fn moderates(self) -> bool {
        matches!(self, MemberRole::Admin | MemberRole::Moderator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Member {
    pub id: String,
    pub role: MemberRole,
    pub server_id: String,
    pub profile_id: String,
}

/// A member joined with the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: String,
    pub role: MemberRole,
    pub server_id: String,
    pub profile_id: String,
    pub name: String,
    pub image_url: String,
}

const MEMBER_PROFILE_COLUMNS: &str =
    "m.id, m.role, m.server_id, m.profile_id, p.name, p.image_url";

pub async fn find_profile_by_user_id(db_pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as("SELECT id,user_id,name,image_url FROM profiles WHERE user_id=?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await
}

/// Creates the profile for `user_id` on first sign-in, refreshes name and image afterwards.
pub async fn upsert_profile(
    db_pool: &SqlitePool,
    user_id: &str,
    name: &str,
    image_url: &str,
) -> sqlx::Result<Profile> {
    sqlx::query_as(
        "INSERT INTO profiles (id,user_id,name,image_url) VALUES (?,?,?,?)
         ON CONFLICT (user_id) DO UPDATE SET name=excluded.name, image_url=excluded.image_url
         RETURNING id,user_id,name,image_url",
    )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id)
        .bind(name)
        .bind(image_url)
        .fetch_one(db_pool)
        .await
}

pub async fn find_server(db_pool: &SqlitePool, server_id: &str) -> sqlx::Result<Option<Server>> {
    sqlx::query_as("SELECT id,name,image_url,invite_code,profile_id FROM servers WHERE id=?")
        .bind(server_id)
        .fetch_optional(db_pool)
        .await
}

pub async fn find_server_by_invite(db_pool: &SqlitePool, invite_code: &str) -> sqlx::Result<Option<Server>> {
    sqlx::query_as("SELECT id,name,image_url,invite_code,profile_id FROM servers WHERE invite_code=?")
        .bind(invite_code)
        .fetch_optional(db_pool)
        .await
}

pub async fn servers_of_profile(db_pool: &SqlitePool, profile_id: &str) -> sqlx::Result<Vec<Server>> {
    sqlx::query_as(
        "SELECT s.id,s.name,s.image_url,s.invite_code,s.profile_id FROM servers s
         JOIN members m ON m.server_id = s.id
         WHERE m.profile_id=? ORDER BY s.created_at, s.id",
    )
        .bind(profile_id)
        .fetch_all(db_pool)
        .await
}

/// Inserts a server and makes `owner` its admin.
pub async fn create_server(
    db_pool: &SqlitePool,
    owner: &Profile,
    name: &str,
    image_url: &str,
) -> sqlx::Result<Server> {
    let server = Server {
        id: Uuid::now_v7().to_string(),
        name: name.to_owned(),
        image_url: image_url.to_owned(),
        invite_code: Uuid::new_v4().simple().to_string(),
        profile_id: owner.id.clone(),
    };

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO servers (id,name,image_url,invite_code,profile_id) VALUES (?,?,?,?,?)")
        .bind(&server.id)
        .bind(&server.name)
        .bind(&server.image_url)
        .bind(&server.invite_code)
        .bind(&server.profile_id)
        .execute(&mut *tx)
        .await?;
    add_member(&mut *tx, &server.id, &owner.id, MemberRole::Admin).await?;
    tx.commit().await?;

    Ok(server)
}

pub async fn add_member(
    conn: &mut SqliteConnection,
    server_id: &str,
    profile_id: &str,
    role: MemberRole,
) -> sqlx::Result<Member> {
    sqlx::query_as(
        "INSERT INTO members (id,role,profile_id,server_id) VALUES (?,?,?,?)
         RETURNING id,role,server_id,profile_id",
    )
        .bind(Uuid::now_v7().to_string())
        .bind(role)
        .bind(profile_id)
        .bind(server_id)
        .fetch_one(conn)
        .await
}

/// Makes `profile_id` a guest of `server_id`. `false` when it already was a member.
pub async fn join_server(db_pool: &SqlitePool, server_id: &str, profile_id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "INSERT INTO members (id,role,profile_id,server_id) VALUES (?,?,?,?)
         ON CONFLICT (profile_id, server_id) DO NOTHING",
    )
        .bind(Uuid::now_v7().to_string())
        .bind(MemberRole::Guest)
        .bind(profile_id)
        .bind(server_id)
        .execute(db_pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// The membership of `profile_id` in `server_id`, if any.
pub async fn find_member(
    db_pool: &SqlitePool,
    server_id: &str,
    profile_id: &str,
) -> sqlx::Result<Option<MemberProfile>> {
    sqlx::query_as(&format!(
        "SELECT {MEMBER_PROFILE_COLUMNS} FROM members m JOIN profiles p ON p.id = m.profile_id
         WHERE m.server_id=? AND m.profile_id=?"
    ))
        .bind(server_id)
        .bind(profile_id)
        .fetch_optional(db_pool)
        .await
}

pub async fn find_member_by_id(db_pool: &SqlitePool, member_id: &str) -> sqlx::Result<Option<MemberProfile>> {
    sqlx::query_as(&format!(
        "SELECT {MEMBER_PROFILE_COLUMNS} FROM members m JOIN profiles p ON p.id = m.profile_id
         WHERE m.id=?"
    ))
        .bind(member_id)
        .fetch_optional(db_pool)
        .await
}

pub async fn members_of_server(db_pool: &SqlitePool, server_id: &str) -> sqlx::Result<Vec<MemberProfile>> {
    sqlx::query_as(&format!(
        "SELECT {MEMBER_PROFILE_COLUMNS} FROM members m JOIN profiles p ON p.id = m.profile_id
         WHERE m.server_id=? ORDER BY m.created_at, m.id"
    ))
        .bind(server_id)
        .fetch_all(db_pool)
        .await
}
