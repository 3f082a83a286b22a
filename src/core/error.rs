use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocialError {
    #[error("Username already exists: {0}")]
    DuplicateUser(String),

    #[error("User not found: {0}")]
    UnknownUser(String),

    #[error("Cannot add yourself as a friend: {0}")]
    SelfFriend(String),

    #[error("{0} and {1} are already friends")]
    AlreadyFriends(String, String),

    #[error("Malformed record in {file} (line {line}): {reason}")]
    MalformedRecord {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SocialError>;
