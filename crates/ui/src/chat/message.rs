use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Stable lowercase tag for logs and config.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection for role tags outside the closed `user`/`model` set.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("unknown chat role '{tag}'"))]
pub struct UnknownRole {
    pub tag: String,
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "model" => Ok(Self::Model),
            other => UnknownRoleSnafu { tag: other }.fail(),
        }
    }
}

/// One chat turn. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageModel {
    role: Role,
    message: String,
}

impl MessageModel {
    pub fn new(role: Role, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Role::User, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(Role::Model, message)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_model(&self) -> bool {
        self.role == Role::Model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_parse_back() {
        for role in [Role::User, Role::Model] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn role_set_is_closed() {
        assert_eq!(
            "assistant".parse::<Role>(),
            Err(UnknownRole {
                tag: "assistant".to_string()
            })
        );
        assert!("Model".parse::<Role>().is_err());
    }

    #[test]
    fn constructors_tag_roles() {
        let question = MessageModel::user("Hello");
        let answer = MessageModel::model("Hi!");

        assert_eq!(question.role(), Role::User);
        assert_eq!(question.message(), "Hello");
        assert!(!question.is_model());
        assert!(answer.is_model());
        assert_eq!(answer, MessageModel::new(Role::Model, "Hi!"));
    }
}
