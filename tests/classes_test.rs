//! Class command integration tests
//! Run with: cargo test --test classes_test

use std::sync::Once;

use async_trait::async_trait;
use classroom_bot::application::errors::BotError;
use classroom_bot::application::messaging::MessageDispatcher;
use classroom_bot::domain::entities::{ChannelInfo, MemberPermissions, Message, RoleInfo, User};
use classroom_bot::domain::traits::Guild;
use classroom_bot::infrastructure::adapters::memory::{MemoryGuild, Mutation};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const MANAGE: &str = "manage-classes";

fn dispatcher() -> MessageDispatcher {
    MessageDispatcher::for_classes("!", MANAGE)
}

fn student(id: &str, name: &str) -> User {
    User::new(id).with_username(name)
}

fn admin() -> User {
    User::new("900").with_username("prof").with_permissions(MemberPermissions::all())
}

async fn send(guild: &MemoryGuild, user: &User, channel: &str, text: &str) -> Vec<String> {
    let message = dispatcher()
        .parser()
        .parse("10", text, Some(user.clone()))
        .with_channel_name(channel);
    let outcome = dispatcher().dispatch(message, guild).await;
    assert!(outcome.error.is_none(), "dispatch failed: {:?}", outcome.error);
    outcome.replies
}

async fn guild() -> MemoryGuild {
    let guild = MemoryGuild::new();
    guild.seed_channel(MANAGE).await;
    guild.seed_channel("general").await;
    guild
}

/// In-memory guild whose server refuses to create one role
struct RefusingGuild {
    inner: MemoryGuild,
    refused_role: String,
}

#[async_trait]
impl Guild for RefusingGuild {
    async fn roles(&self) -> Result<Vec<RoleInfo>, BotError> {
        self.inner.roles().await
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, BotError> {
        self.inner.channels().await
    }

    async fn member_roles(&self, user: &User) -> Result<Vec<RoleInfo>, BotError> {
        self.inner.member_roles(user).await
    }

    async fn create_role(&self, name: &str) -> Result<RoleInfo, BotError> {
        if name == self.refused_role {
            return Err(BotError::PermissionDenied("Missing Permissions".to_string()));
        }
        self.inner.create_role(name).await
    }

    async fn create_private_channel(&self, name: &str) -> Result<ChannelInfo, BotError> {
        self.inner.create_private_channel(name).await
    }

    async fn grant_channel_access(&self, channel: &ChannelInfo, role: &RoleInfo) -> Result<(), BotError> {
        self.inner.grant_channel_access(channel, role).await
    }

    async fn add_member_role(&self, user: &User, role: &RoleInfo, reason: &str) -> Result<(), BotError> {
        self.inner.add_member_role(user, role, reason).await
    }

    async fn remove_member_role(&self, user: &User, role: &RoleInfo, reason: &str) -> Result<(), BotError> {
        self.inner.remove_member_role(user, role, reason).await
    }

    async fn delete_role(&self, role: &RoleInfo) -> Result<(), BotError> {
        self.inner.delete_role(role).await
    }

    async fn delete_channel(&self, channel: &ChannelInfo) -> Result<(), BotError> {
        self.inner.delete_channel(channel).await
    }
}

/// Joining creates the role and a private channel the role can use
#[tokio::test]
async fn test_join_creates_role_and_channel() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    let replies = send(&guild, &ada, MANAGE, "!joinclass cs1010").await;
    assert_eq!(replies, vec!["ada has been added to cs1010"]);

    let role = guild.find_role("student-cs1010").await.unwrap().expect("role created");
    let channel = guild.find_channel("classroom-cs1010").await.unwrap().expect("channel created");
    assert_eq!(guild.member_roles(&ada).await.unwrap(), vec![role]);
    assert_eq!(guild.channel_access(&channel).await, vec!["student-cs1010".to_string()]);
}

/// A second join reuses the existing role and channel
#[tokio::test]
async fn test_join_twice_is_idempotent() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");
    let bob = student("2", "bob");

    send(&guild, &ada, MANAGE, "!joinclass cs1010").await;
    send(&guild, &ada, MANAGE, "!joinclass cs1010").await;
    send(&guild, &bob, MANAGE, "!joinclass CS1010").await;

    let roles: Vec<_> = guild.roles().await.unwrap().into_iter()
        .filter(|r| r.name == "student-cs1010")
        .collect();
    let channels: Vec<_> = guild.channels().await.unwrap().into_iter()
        .filter(|c| c.name == "classroom-cs1010")
        .collect();
    assert_eq!(roles.len(), 1);
    assert_eq!(channels.len(), 1);

    let created = guild.mutations().await.into_iter()
        .filter(|m| matches!(m, Mutation::CreateRole(_) | Mutation::CreateChannel(_)))
        .count();
    assert_eq!(created, 2);
}

/// Several courses in one command get one reply each, in order
#[tokio::test]
async fn test_join_many_courses() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    let replies = send(&guild, &ada, MANAGE, "!joinclass cs1010 bad-name math2200").await;
    assert_eq!(replies, vec![
        "ada has been added to cs1010",
        "error: invalid course name (bad-name)",
        "ada has been added to math2200",
    ]);

    let replies = send(&guild, &ada, MANAGE, "!enrolledclass").await;
    assert_eq!(replies, vec!["cs1010\nmath2200"]);
}

/// Invalid course names are rejected without touching the server
#[tokio::test]
async fn test_invalid_course_makes_no_changes() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    for name in ["ab123", "toolongname1234", "cs10"] {
        let replies = send(&guild, &ada, MANAGE, &format!("!joinclass {}", name)).await;
        assert_eq!(replies, vec![format!("error: invalid course name ({})", name)]);
    }
    assert!(guild.mutations().await.is_empty());
}

/// Dropping a joined course removes only the role from the user
#[tokio::test]
async fn test_drop_joined_course() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    send(&guild, &ada, MANAGE, "!joinclass cs1010").await;
    let replies = send(&guild, &ada, MANAGE, "!dropclass cs1010").await;
    assert_eq!(replies, vec!["ada has been removed from cs1010"]);

    assert!(guild.member_roles(&ada).await.unwrap().is_empty());
    assert!(guild.find_role("student-cs1010").await.unwrap().is_some());
    assert!(guild.find_channel("classroom-cs1010").await.unwrap().is_some());
}

/// Dropping a course never joined replies "not enrolled" and changes nothing
#[tokio::test]
async fn test_drop_not_enrolled() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");
    let bob = student("2", "bob");

    send(&guild, &bob, MANAGE, "!joinclass cs1010").await;
    let before = guild.mutations().await.len();

    let replies = send(&guild, &ada, MANAGE, "!dropclass cs1010").await;
    assert_eq!(replies, vec!["ada is not enrolled in cs1010"]);
    assert_eq!(guild.mutations().await.len(), before);
}

/// Purging deletes the role and channel
#[tokio::test]
async fn test_purge_existing_course() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    send(&guild, &ada, MANAGE, "!joinclass cs1010").await;
    let replies = send(&guild, &admin(), MANAGE, "!purgeclass cs1010").await;
    assert_eq!(replies, vec!["Removed cs1010"]);

    assert!(guild.find_role("student-cs1010").await.unwrap().is_none());
    assert!(guild.find_channel("classroom-cs1010").await.unwrap().is_none());
    assert!(guild.member_roles(&ada).await.unwrap().is_empty());
}

/// Purging a course that doesn't exist deletes nothing but still confirms
#[tokio::test]
async fn test_purge_missing_course() {
    ensure_init();
    let guild = guild().await;

    let replies = send(&guild, &admin(), MANAGE, "!purgeclass cs9999").await;
    assert_eq!(replies, vec!["Removed cs9999"]);
    assert!(guild.mutations().await.is_empty());
}

/// Purge works from any channel for members who can manage the server
#[tokio::test]
async fn test_purge_outside_manage_channel() {
    ensure_init();
    let guild = guild().await;
    send(&guild, &student("1", "ada"), MANAGE, "!joinclass cs1010").await;

    let replies = send(&guild, &admin(), "general", "!purgeclass cs1010").await;
    assert_eq!(replies, vec!["Removed cs1010"]);
    assert!(guild.find_role("student-cs1010").await.unwrap().is_none());
}

/// Purge without Manage Channels and Manage Roles is dropped silently
#[tokio::test]
async fn test_purge_requires_permissions() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");
    send(&guild, &ada, MANAGE, "!joinclass cs1010").await;
    let before = guild.mutations().await.len();

    let replies = send(&guild, &ada, MANAGE, "!purgeclass cs1010").await;
    assert!(replies.is_empty());

    let roles_only = User::new("3").with_username("ta").with_permissions(MemberPermissions {
        manage_channels: false,
        manage_roles: true,
    });
    let replies = send(&guild, &roles_only, MANAGE, "!purgeclass cs1010").await;
    assert!(replies.is_empty());

    assert_eq!(guild.mutations().await.len(), before);
    assert!(guild.find_role("student-cs1010").await.unwrap().is_some());
}

/// Outside the manage channel, class commands neither reply nor act
#[tokio::test]
async fn test_commands_outside_manage_channel_are_ignored() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    for text in ["!joinclass cs1010", "!dropclass cs1010", "!enrolledclass", "!listclass"] {
        let replies = send(&guild, &ada, "general", text).await;
        assert!(replies.is_empty(), "{} replied {:?}", text, replies);
    }
    assert!(guild.mutations().await.is_empty());
}

/// Listing reports the user's classes or that there are none
#[tokio::test]
async fn test_enrolled_listing() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");
    guild.seed_role("moderator").await;

    let replies = send(&guild, &ada, MANAGE, "!enrolledclass").await;
    assert_eq!(replies, vec!["ada is not enrolled in any classes"]);

    send(&guild, &ada, MANAGE, "!joinclass phys1100").await;
    let replies = send(&guild, &ada, MANAGE, "!enrolledclass").await;
    assert_eq!(replies, vec!["phys1100"]);
}

/// Listing every class on the server
#[tokio::test]
async fn test_available_listing() {
    ensure_init();
    let guild = guild().await;
    guild.seed_role("moderator").await;

    let replies = send(&guild, &student("1", "ada"), MANAGE, "!listclass").await;
    assert_eq!(replies, vec!["No classes are available!"]);

    send(&guild, &student("1", "ada"), MANAGE, "!joinclass math2200").await;
    send(&guild, &student("2", "bob"), MANAGE, "!joinclass cs1010").await;

    let replies = send(&guild, &student("3", "cy"), MANAGE, "!listclass").await;
    assert_eq!(replies, vec!["cs1010\nmath2200"]);
}

/// Course commands without arguments answer with their usage
#[tokio::test]
async fn test_missing_course_shows_usage() {
    ensure_init();
    let guild = guild().await;

    let replies = send(&guild, &student("1", "ada"), MANAGE, "!joinclass").await;
    assert_eq!(replies, vec!["Usage: !joinclass <course>..."]);
    assert!(guild.mutations().await.is_empty());
}

/// Text, unknown commands and messages without a sender are ignored
#[tokio::test]
async fn test_non_commands_are_ignored() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    assert!(send(&guild, &ada, MANAGE, "hello there").await.is_empty());
    assert!(send(&guild, &ada, MANAGE, "!frobnicate cs1010").await.is_empty());

    let anonymous = Message::from_command("10", "listclass", vec![]).with_channel_name(MANAGE);
    let outcome = dispatcher().dispatch(anonymous, &guild).await;
    assert!(outcome.replies.is_empty());
    assert!(outcome.error.is_none());
}

/// Help is available from any channel
#[tokio::test]
async fn test_help_anywhere() {
    ensure_init();
    let guild = guild().await;

    let replies = send(&guild, &student("1", "ada"), "general", "!help").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("!joinclass"));
    assert!(replies[0].contains("!listclass"));
}

/// A platform failure keeps the replies for courses already joined and
/// skips the rest
#[tokio::test]
async fn test_platform_failure_keeps_earlier_replies() {
    ensure_init();
    let guild = RefusingGuild {
        inner: guild().await,
        refused_role: "student-math2200".to_string(),
    };
    let ada = student("1", "ada");

    let message = dispatcher()
        .parser()
        .parse("10", "!joinclass cs1010 math2200 phys1100", Some(ada.clone()))
        .with_channel_name(MANAGE);
    let outcome = dispatcher().dispatch(message, &guild).await;

    assert_eq!(outcome.replies, vec!["ada has been added to cs1010"]);
    assert!(matches!(outcome.error, Some(BotError::PermissionDenied(_))));

    let held: Vec<_> = guild.member_roles(&ada).await.unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(held, vec!["student-cs1010"]);
    assert!(guild.find_role("student-phys1100").await.unwrap().is_none());
}

/// Replies name the course the way it was typed
#[tokio::test]
async fn test_replies_echo_course_as_typed() {
    ensure_init();
    let guild = guild().await;
    let ada = student("1", "ada");

    let replies = send(&guild, &ada, MANAGE, "!joinclass CS1010").await;
    assert_eq!(replies, vec!["ada has been added to CS1010"]);
    assert!(guild.find_role("student-cs1010").await.unwrap().is_some());

    let replies = send(&guild, &ada, MANAGE, "!dropclass Cs1010").await;
    assert_eq!(replies, vec!["ada has been removed from Cs1010"]);

    let replies = send(&guild, &admin(), MANAGE, "!purgeclass CS1010").await;
    assert_eq!(replies, vec!["Removed CS1010"]);
}

/// Command names are case-sensitive
#[tokio::test]
async fn test_command_names_are_case_sensitive() {
    ensure_init();
    let guild = guild().await;

    let replies = send(&guild, &student("1", "ada"), MANAGE, "!JOINCLASS cs1010").await;
    assert!(replies.is_empty());
    assert!(guild.mutations().await.is_empty());
}

/// Quoted course names are accepted without their quotes
#[tokio::test]
async fn test_quoted_course_names() {
    ensure_init();
    let guild = guild().await;

    let replies = send(&guild, &student("1", "ada"), MANAGE, r#"!joinclass "cs1010""#).await;
    assert_eq!(replies, vec!["ada has been added to cs1010"]);
}
