use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::CommandError;

/// Prefix of the role that marks enrollment in a course
pub const STUDENT_PREFIX: &str = "student";

/// Prefix of the text channel where a course meets
pub const CLASSROOM_PREFIX: &str = "classroom";

/// Maximum length of a course name, in characters
pub const MAX_NAME_LEN: usize = 8;

/// Number of trailing digits in a course name
const NUMBER_LEN: usize = 4;

static STUDENT_ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{}-([^-]+)", regex_lite::escape(STUDENT_PREFIX)))
        .expect("student role pattern is valid")
});

/// A classroom, identified by a short code such as `cs1010`.
///
/// The course itself is never stored: its role and channel are found on the
/// server by name every time they are needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Course {
    name: String,
}

impl Course {
    /// Check a course name: alphanumeric, at most 8 characters, the last 4
    /// numeric and everything before them alphabetic.
    pub fn is_valid_name(name: &str) -> bool {
        let chars: Vec<char> = name.chars().collect();
        if chars.is_empty() || chars.len() > MAX_NAME_LEN {
            return false;
        }
        if !chars.iter().all(|c| c.is_alphanumeric()) {
            return false;
        }

        let split = chars.len().saturating_sub(NUMBER_LEN);
        let (letters, digits) = chars.split_at(split);

        // An empty prefix is not alphabetic, so bare numbers are rejected.
        !letters.is_empty()
            && letters.iter().all(|c| c.is_alphabetic())
            && digits.iter().all(|c| c.is_numeric())
    }

    /// Validate and normalise a course name.
    ///
    /// Discord lowercases channel names, so the course is kept lowercase to
    /// make role and channel lookups agree.
    pub fn parse(name: &str) -> Result<Self, CommandError> {
        if !Self::is_valid_name(name) {
            return Err(CommandError::InvalidCourse(name.to_string()));
        }
        Ok(Self {
            name: name.to_lowercase(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the role marking enrollment, e.g. `student-cs1010`
    pub fn role_name(&self) -> String {
        format!("{}-{}", STUDENT_PREFIX, self.name)
    }

    /// Name of the classroom channel, e.g. `classroom-cs1010`
    pub fn channel_name(&self) -> String {
        format!("{}-{}", CLASSROOM_PREFIX, self.name)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Extract the course embedded in a student role name.
///
/// Returns `None` for roles that don't follow the `student-<course>` naming.
pub fn course_from_role_name(role_name: &str) -> Option<&str> {
    STUDENT_ROLE
        .captures(role_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
