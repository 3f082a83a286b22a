use std::collections::BTreeMap;

use super::error::{Result, SocialError};
use super::profile::{Post, Profile};

/// In-memory registry of profiles keyed by username
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    profiles: BTreeMap<String, Profile>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new profile
    pub fn insert(&mut self, profile: Profile) -> Result<()> {
        if self.profiles.contains_key(&profile.username) {
            return Err(SocialError::DuplicateUser(profile.username));
        }
        self.profiles.insert(profile.username.clone(), profile);
        Ok(())
    }

    /// Drop a profile. Only used to undo an insert whose rewrite failed.
    pub(crate) fn remove(&mut self, username: &str) -> Option<Profile> {
        self.profiles.remove(username)
    }

    pub fn get(&self, username: &str) -> Result<&Profile> {
        self.profiles
            .get(username)
            .ok_or_else(|| SocialError::UnknownUser(username.to_string()))
    }

    pub fn contains(&self, username: &str) -> bool {
        self.profiles.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profiles in username order
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    /// Make `a` and `b` friends of each other
    pub fn link_friends(&mut self, a: &str, b: &str) -> Result<()> {
        self.require(a)?;
        self.require(b)?;

        if let Some(profile) = self.profiles.get_mut(a) {
            profile.add_friend(b);
        }
        if let Some(profile) = self.profiles.get_mut(b) {
            profile.add_friend(a);
        }
        Ok(())
    }

    /// Append the rendered post to both participants' histories
    pub fn record_post(&mut self, post: &Post) -> Result<()> {
        self.require(&post.sender)?;
        self.require(&post.receiver)?;

        if let Some(profile) = self.profiles.get_mut(&post.sender) {
            profile.push_message(post.outgoing());
        }
        if let Some(profile) = self.profiles.get_mut(&post.receiver) {
            profile.push_message(post.incoming());
        }
        Ok(())
    }

    fn require(&self, username: &str) -> Result<()> {
        if self.contains(username) {
            Ok(())
        } else {
            Err(SocialError::UnknownUser(username.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> Store {
        let mut store = Store::new();
        store.insert(Profile::new("alice", "Alice Smith")).unwrap();
        store.insert(Profile::new("bob", "Bob Jones")).unwrap();
        store
    }

    #[test]
    fn test_insert_and_get() {
        let store = create_test_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("alice").unwrap().name, "Alice Smith");
        assert!(matches!(store.get("carol"), Err(SocialError::UnknownUser(_))));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut store = create_test_store();
        let result = store.insert(Profile::new("alice", "Alice 2"));
        assert!(matches!(result, Err(SocialError::DuplicateUser(u)) if u == "alice"));
        assert_eq!(store.get("alice").unwrap().name, "Alice Smith");
    }

    #[test]
    fn test_link_friends_is_symmetric() {
        let mut store = create_test_store();
        store.link_friends("alice", "bob").unwrap();

        assert!(store.get("alice").unwrap().is_friend("bob"));
        assert!(store.get("bob").unwrap().is_friend("alice"));
    }

    #[test]
    fn test_link_friends_unknown_user_leaves_store_untouched() {
        let mut store = create_test_store();
        let before = store.clone();

        assert!(store.link_friends("alice", "carol").is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_record_post() {
        let mut store = create_test_store();
        store.record_post(&Post::new("alice", "bob", "hi")).unwrap();
        store.record_post(&Post::new("bob", "alice", "hey")).unwrap();

        assert_eq!(
            store.get("alice").unwrap().messages,
            vec!["To bob: hi", "From bob: hey"]
        );
        assert_eq!(
            store.get("bob").unwrap().messages,
            vec!["From alice: hi", "To alice: hey"]
        );
    }

    #[test]
    fn test_self_post_counts_twice() {
        let mut store = create_test_store();
        store.record_post(&Post::new("alice", "alice", "note")).unwrap();

        assert_eq!(
            store.get("alice").unwrap().messages,
            vec!["To alice: note", "From alice: note"]
        );
    }

    #[test]
    fn test_profiles_iterate_in_username_order() {
        let mut store = Store::new();
        store.insert(Profile::new("zed", "Z")).unwrap();
        store.insert(Profile::new("amy", "A")).unwrap();

        let names: Vec<_> = store.profiles().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["amy", "zed"]);
    }
}
