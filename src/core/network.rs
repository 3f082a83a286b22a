use tracing::info;

use super::error::{Result, SocialError};
use super::persist::DataFiles;
use super::profile::{Post, Profile, ProfileView};
use super::store::Store;

/// The session state: the store plus the files that back it.
///
/// Every mutating operation validates first, then persists, then mutates,
/// so a failed call leaves both the store and the files unchanged.
#[derive(Debug)]
pub struct SocialNetwork {
    store: Store,
    files: DataFiles,
}

impl SocialNetwork {
    /// Load the graph from `files`
    pub fn open(files: DataFiles) -> Result<Self> {
        let store = files.load()?;
        Ok(Self { store, files })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn files(&self) -> &DataFiles {
        &self.files
    }

    pub fn contains(&self, username: &str) -> bool {
        self.store.contains(username)
    }

    pub fn create_profile(&mut self, username: &str, name: &str) -> Result<()> {
        validate_username(username)?;
        if self.store.contains(username) {
            return Err(SocialError::DuplicateUser(username.to_string()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(SocialError::InvalidInput("name must not be empty".to_string()));
        }
        validate_line("name", name)?;

        self.store.insert(Profile::new(username, name))?;
        if let Err(e) = self.files.rewrite_users(&self.store) {
            self.store.remove(username);
            return Err(e);
        }

        info!(username, "Created profile");
        Ok(())
    }

    pub fn add_friend(&mut self, u1: &str, u2: &str) -> Result<()> {
        if u1 == u2 {
            return Err(SocialError::SelfFriend(u1.to_string()));
        }
        let profile = self.store.get(u1)?;
        self.store.get(u2)?;
        if profile.is_friend(u2) {
            return Err(SocialError::AlreadyFriends(u1.to_string(), u2.to_string()));
        }

        self.files.append_friendship(u1, u2)?;
        self.store.link_friends(u1, u2)?;

        info!(u1, u2, "Added friendship");
        Ok(())
    }

    pub fn post_message(&mut self, sender: &str, receiver: &str, body: &str) -> Result<()> {
        self.store.get(sender)?;
        self.store.get(receiver)?;
        validate_line("message", body)?;

        let post = Post::new(sender, receiver, body);
        self.files.append_post(&post)?;
        self.store.record_post(&post)?;

        info!(sender, receiver, "Posted message");
        Ok(())
    }

    pub fn view_profile(&self, username: &str) -> Result<ProfileView> {
        Ok(self.store.get(username)?.view())
    }
}

/// Usernames are single tokens and must not collide with the posts.txt
/// separators.
fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(SocialError::InvalidInput("username must not be empty".to_string()));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(SocialError::InvalidInput(format!(
            "username '{}' must not contain whitespace",
            username
        )));
    }
    if username.contains(':') || username.contains("->") {
        return Err(SocialError::InvalidInput(format!(
            "username '{}' must not contain ':' or '->'",
            username
        )));
    }
    Ok(())
}

fn validate_line(field: &str, value: &str) -> Result<()> {
    if value.contains('\n') || value.contains('\r') {
        return Err(SocialError::InvalidInput(format!(
            "{} must be a single line",
            field
        )));
    }
    Ok(())
}
