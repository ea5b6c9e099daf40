use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{course_from_role_name, ChannelInfo, Course, RoleInfo, User};
use crate::domain::traits::Guild;

/// Audit log reason for roles created on join
pub const CREATE_ROLE_REASON: &str = "Create a student role for class";

/// Service for joining, dropping and listing classes on one server
pub struct ClassService<'a, G: Guild + ?Sized> {
    guild: &'a G,
}

impl<'a, G: Guild + ?Sized> ClassService<'a, G> {
    pub fn new(guild: &'a G) -> Self {
        Self { guild }
    }

    /// Add the user to a class, creating its role and channel on first use.
    /// Replies name the course as the user typed it.
    pub async fn join(&self, user: &User, input: &str) -> Result<String, BotError> {
        let course = match Course::parse(input) {
            Ok(course) => course,
            Err(e) => return Ok(invalid_course_reply(&e)),
        };

        let channel = self.classroom(&course).await?;
        let role = self.student_role(&course).await?;
        self.guild.grant_channel_access(&channel, &role).await?;
        self.guild
            .add_member_role(user, &role, &format!("{} joined {}", user, course))
            .await?;

        tracing::info!("{} joined {}", user.id, course);
        Ok(format!("{} has been added to {}", user, input))
    }

    /// Remove the user's student role for a class, if they have it
    pub async fn drop(&self, user: &User, input: &str) -> Result<String, BotError> {
        let course = match Course::parse(input) {
            Ok(course) => course,
            Err(e) => return Ok(invalid_course_reply(&e)),
        };

        let role_name = course.role_name();
        let role = self
            .guild
            .member_roles(user)
            .await?
            .into_iter()
            .find(|r| r.name == role_name);

        let Some(role) = role else {
            return Ok(format!("{} is not enrolled in {}", user, input));
        };

        self.guild
            .remove_member_role(user, &role, &format!("{} asked to be removed from {}", user, course))
            .await?;

        tracing::info!("{} dropped {}", user.id, course);
        Ok(format!("{} has been removed from {}", user, input))
    }

    /// Delete a class's role and channel, whichever exist
    pub async fn purge(&self, input: &str) -> Result<String, BotError> {
        let course = match Course::parse(input) {
            Ok(course) => course,
            Err(e) => return Ok(invalid_course_reply(&e)),
        };

        if let Some(role) = self.guild.find_role(&course.role_name()).await? {
            self.guild.delete_role(&role).await?;
        }
        if let Some(channel) = self.guild.find_channel(&course.channel_name()).await? {
            self.guild.delete_channel(&channel).await?;
        }

        tracing::info!("Purged {}", course);
        Ok(format!("Removed {}", input))
    }

    /// Classes the user is enrolled in, one per line
    pub async fn enrolled(&self, user: &User) -> Result<String, BotError> {
        let roles = self.guild.member_roles(user).await?;
        let courses = course_names(&roles);

        if courses.is_empty() {
            return Ok(format!("{} is not enrolled in any classes", user));
        }
        Ok(courses.join("\n"))
    }

    /// Every class on the server, one per line
    pub async fn available(&self) -> Result<String, BotError> {
        let roles = self.guild.roles().await?;
        let courses = course_names(&roles);

        if courses.is_empty() {
            return Ok("No classes are available!".to_string());
        }
        Ok(courses.join("\n"))
    }

    async fn student_role(&self, course: &Course) -> Result<RoleInfo, BotError> {
        let name = course.role_name();
        if let Some(role) = self.guild.find_role(&name).await? {
            return Ok(role);
        }
        tracing::debug!("Creating role {}", name);
        self.guild.create_role(&name).await
    }

    async fn classroom(&self, course: &Course) -> Result<ChannelInfo, BotError> {
        let name = course.channel_name();
        if let Some(channel) = self.guild.find_channel(&name).await? {
            return Ok(channel);
        }
        tracing::debug!("Creating channel {}", name);
        self.guild.create_private_channel(&name).await
    }
}

fn invalid_course_reply(e: &CommandError) -> String {
    format!("error: {}", e)
}

/// Course names of student roles, sorted and deduplicated
fn course_names(roles: &[RoleInfo]) -> Vec<String> {
    let mut courses: Vec<String> = roles
        .iter()
        .filter_map(|r| course_from_role_name(&r.name))
        .map(|c| c.to_string())
        .collect();
    courses.sort();
    courses.dedup();
    courses
}
