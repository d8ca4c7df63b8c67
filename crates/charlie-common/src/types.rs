//! Core types shared across Charlie components.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{CAPTCHA_OPERAND_MAX, CAPTCHA_OPERAND_MIN, UPLOADED_AT_FORMAT};
use crate::error::{CharlieError, Result};

/// Identity of the current client.
///
/// `is_authenticated` implies a non-blank username; the only way to build an
/// authenticated session is [`Session::authenticated`], which checks that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: String,
    is_authenticated: bool,
}

impl Session {
    /// Signed-out session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Signed-in session, or `None` if the username is blank
    pub fn authenticated(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return None;
        }
        Some(Self {
            username,
            is_authenticated: true,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Username of a signed-in session
    pub fn username(&self) -> Option<&str> {
        self.is_authenticated.then_some(self.username.as_str())
    }
}

/// Credentials submitted from the sign-in / sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Only consulted when `is_sign_up` is set
    pub confirm_password: Option<String>,
    pub is_sign_up: bool,
}

impl LoginRequest {
    pub fn sign_in(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: None,
            is_sign_up: false,
        }
    }

    pub fn sign_up(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: Some(confirm_password.into()),
            is_sign_up: true,
        }
    }

    /// Check the form before anything is submitted.
    ///
    /// Order matters: blank fields, then the bot check, then the password
    /// confirmation.
    pub fn validate(&self, captcha_passed: bool) -> Result<()> {
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            return Err(CharlieError::validation("Username and password are required"));
        }

        if !captcha_passed {
            return Err(CharlieError::validation(
                "Please complete the CAPTCHA verification",
            ));
        }

        if self.is_sign_up && self.confirm_password.as_deref() != Some(self.password.as_str()) {
            return Err(CharlieError::validation("Passwords do not match"));
        }

        Ok(())
    }
}

/// Arithmetic operator of a bot-check problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptchaOperator {
    Add,
    Subtract,
    Multiply,
}

impl CaptchaOperator {
    pub const ALL: [CaptchaOperator; 3] = [Self::Add, Self::Subtract, Self::Multiply];

    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
        }
    }

    pub fn apply(&self, a: i64, b: i64) -> i64 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
        }
    }
}

impl fmt::Display for CaptchaOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A live bot-check problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
    a: u8,
    b: u8,
    operator: CaptchaOperator,
    solved: bool,
}

impl CaptchaChallenge {
    /// Create an unsolved challenge, clamping operands to [1, 10]
    pub fn new(a: u8, b: u8, operator: CaptchaOperator) -> Self {
        Self {
            a: a.clamp(CAPTCHA_OPERAND_MIN, CAPTCHA_OPERAND_MAX),
            b: b.clamp(CAPTCHA_OPERAND_MIN, CAPTCHA_OPERAND_MAX),
            operator,
            solved: false,
        }
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    pub fn operator(&self) -> CaptchaOperator {
        self.operator
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn mark_solved(&mut self) {
        self.solved = true;
    }

    /// The answer this challenge accepts
    pub fn expected_answer(&self) -> i64 {
        self.operator.apply(i64::from(self.a), i64::from(self.b))
    }

    /// Text shown next to the answer field, e.g. "Solve 3 + 4"
    pub fn prompt(&self) -> String {
        format!("Solve {} {} {}", self.a, self.operator, self.b)
    }
}

/// A single feed entry.
///
/// Serialized with camelCase keys; this is the on-disk format of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Inline `data:` URL
    #[serde(default)]
    pub image: Option<String>,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

impl Post {
    /// Render a timestamp the way `uploaded_at` stores it
    pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        at.format(UPLOADED_AT_FORMAT).to_string()
    }
}

/// Form input for a new post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Already-encoded `data:` URL
    pub image_data: Option<String>,
}

impl PostSubmission {
    fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    fn has_image(&self) -> bool {
        self.image_data.as_deref().is_some_and(|i| !i.is_empty())
    }
}

/// Which submissions the feed accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingPolicy {
    /// Title or description required, image optional
    #[default]
    Forum,
    /// Title and image both required
    Gallery,
}

impl PostingPolicy {
    pub fn check(&self, submission: &PostSubmission) -> Result<()> {
        match self {
            Self::Forum => {
                if submission.has_title() || submission.has_description() {
                    Ok(())
                } else {
                    Err(CharlieError::validation("Please add a title or a description"))
                }
            }
            Self::Gallery => {
                if submission.has_title() && submission.has_image() {
                    Ok(())
                } else {
                    Err(CharlieError::validation("Please add a title and select an image"))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_username_is_never_authenticated() {
        assert!(Session::authenticated("   ").is_none());
        assert!(Session::authenticated("").is_none());

        let session = Session::authenticated("alice").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(Session::anonymous().username(), None);
    }

    #[test]
    fn test_login_request_check_order() {
        let blank = LoginRequest::sign_in(" ", "secret");
        assert_eq!(
            blank.validate(true),
            Err(CharlieError::validation("Username and password are required"))
        );

        let no_captcha = LoginRequest::sign_in("alice", "secret");
        assert_eq!(
            no_captcha.validate(false),
            Err(CharlieError::validation("Please complete the CAPTCHA verification"))
        );

        let mismatch = LoginRequest::sign_up("alice", "secret", "secreT");
        assert!(mismatch.validate(true).is_err());
        assert!(mismatch.validate(false).is_err());

        assert!(LoginRequest::sign_up("alice", "secret", "secret").validate(true).is_ok());
    }

    #[test]
    fn test_challenge_operands_are_clamped() {
        let challenge = CaptchaChallenge::new(0, 42, CaptchaOperator::Multiply);
        assert_eq!(challenge.a(), 1);
        assert_eq!(challenge.b(), 10);
        assert_eq!(challenge.expected_answer(), 10);
    }

    #[test]
    fn test_challenge_prompt_and_answers() {
        let challenge = CaptchaChallenge::new(3, 4, CaptchaOperator::Add);
        assert_eq!(challenge.prompt(), "Solve 3 + 4");
        assert_eq!(challenge.expected_answer(), 7);
        assert_eq!(CaptchaChallenge::new(2, 9, CaptchaOperator::Subtract).expected_answer(), -7);
    }

    #[test]
    fn test_post_wire_format() {
        let post = Post {
            id: 1_760_000_000_000,
            title: "hello".to_string(),
            description: String::new(),
            image: None,
            uploaded_by: "alice".to_string(),
            uploaded_at: "10/17/2026, 3:04:05 PM".to_string(),
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["uploadedBy"], "alice");
        assert_eq!(json["uploadedAt"], "10/17/2026, 3:04:05 PM");
        assert!(json["image"].is_null());
    }

    #[test]
    fn test_timestamp_format() {
        use chrono::{NaiveDate, Utc};

        let at = NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(15, 4, 5))
            .unwrap()
            .and_utc();
        assert_eq!(Post::format_timestamp::<Utc>(&at), "10/17/2026, 3:04:05 PM");
    }

    #[test]
    fn test_forum_policy() {
        let policy = PostingPolicy::Forum;
        assert!(policy.check(&PostSubmission::default()).is_err());
        assert!(policy
            .check(&PostSubmission {
                title: Some("  ".into()),
                description: Some("".into()),
                image_data: Some("data:image/png;base64,AAAA".into()),
            })
            .is_err());
        assert!(policy
            .check(&PostSubmission {
                description: Some("just text".into()),
                ..Default::default()
            })
            .is_ok());
    }

    #[test]
    fn test_gallery_policy_needs_title_and_image() {
        let policy = PostingPolicy::Gallery;
        let text_only = PostSubmission {
            title: Some("hello".into()),
            description: Some("world".into()),
            image_data: None,
        };
        assert_eq!(
            policy.check(&text_only),
            Err(CharlieError::validation("Please add a title and select an image"))
        );

        let with_image = PostSubmission {
            image_data: Some("data:image/png;base64,AAAA".into()),
            ..text_only
        };
        assert!(policy.check(&with_image).is_ok());
    }
}
