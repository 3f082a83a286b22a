use std::collections::BTreeSet;

/// A single user record: identity, friend set and message history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Whitespace-free login token, unique within the store
    pub username: String,

    /// Display name, may contain spaces
    pub name: String,

    /// Usernames this profile is friends with
    pub friends: BTreeSet<String>,

    /// Rendered post history, oldest first
    pub messages: Vec<String>,
}

impl Profile {
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            friends: BTreeSet::new(),
            messages: Vec::new(),
        }
    }

    pub fn add_friend(&mut self, username: &str) -> bool {
        self.friends.insert(username.to_string())
    }

    pub fn is_friend(&self, username: &str) -> bool {
        self.friends.contains(username)
    }

    pub fn push_message(&mut self, message: String) {
        self.messages.push(message);
    }

    pub fn view(&self) -> ProfileView {
        ProfileView {
            name: self.name.clone(),
            username: self.username.clone(),
            friends: self.friends.iter().cloned().collect(),
            messages: self.messages.clone(),
        }
    }
}

/// Read-only snapshot returned by view-profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub name: String,
    pub username: String,
    pub friends: Vec<String>,
    pub messages: Vec<String>,
}

/// A directed message from `sender` to `receiver`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub sender: String,
    pub receiver: String,
    pub body: String,
}

impl Post {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            body: body.into(),
        }
    }

    /// Entry appended to the sender's history
    pub fn outgoing(&self) -> String {
        format!("To {}: {}", self.receiver, self.body)
    }

    /// Entry appended to the receiver's history
    pub fn incoming(&self) -> String {
        format!("From {}: {}", self.sender, self.body)
    }

    /// posts.txt line, without the trailing newline
    pub fn to_record(&self) -> String {
        format!("{} -> {}: {}", self.sender, self.receiver, self.body)
    }

    /// Parse a posts.txt line.
    ///
    /// Looks for the first `->`, then the first `:` after it. Returns `None`
    /// when either marker is missing or a username is not a single token.
    pub fn parse_record(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        let arrow = line.find("->")?;
        let rest = &line[arrow + 2..];
        let colon = rest.find(':')?;

        let sender = line[..arrow].trim();
        let receiver = rest[..colon].trim();
        if !is_token(sender) || !is_token(receiver) {
            return None;
        }

        let body = &rest[colon + 1..];
        let body = body.strip_prefix(' ').unwrap_or(body);

        Some(Self::new(sender, receiver, body))
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}
