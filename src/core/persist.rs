//! Plain-text persistence for the social graph.
//!
//! Three files back the store:
//!
//! - `users.txt`: a username line followed by a name line, per profile.
//!   Rewritten wholesale whenever a profile is added, through a sibling
//!   `.tmp` file that is renamed over the old one.
//! - `friends.txt`: `u1 u2` per friendship. Append-only.
//! - `posts.txt`: `sender -> receiver: body` per post. Append-only.
//!
//! Files are opened for the duration of a single call and flushed before it
//! returns.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::{Result, SocialError};
use super::profile::{Post, Profile};
use super::store::Store;

pub const USERS_FILE: &str = "users.txt";
pub const FRIENDS_FILE: &str = "friends.txt";
pub const POSTS_FILE: &str = "posts.txt";

/// Locations of the three data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub users: PathBuf,
    pub friends: PathBuf,
    pub posts: PathBuf,
}

impl DataFiles {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            users: dir.join(USERS_FILE),
            friends: dir.join(FRIENDS_FILE),
            posts: dir.join(POSTS_FILE),
        }
    }

    /// Rebuild a store from disk. Missing files count as empty.
    pub fn load(&self) -> Result<Store> {
        let mut store = Store::new();

        if let Some(text) = read_optional(&self.users)? {
            load_users(&mut store, &text, &self.users)?;
        }
        if let Some(text) = read_optional(&self.friends)? {
            load_friends(&mut store, &text, &self.friends)?;
        }
        let mut posts = 0;
        if let Some(bytes) = read_optional_bytes(&self.posts)? {
            posts = load_posts(&mut store, &bytes);
        }

        info!(profiles = store.len(), posts, "Loaded social graph");
        Ok(store)
    }

    /// Replace users.txt with every profile in the store. The old file stays
    /// intact unless the new one was written completely.
    pub fn rewrite_users(&self, store: &Store) -> Result<()> {
        let tmp_path = self.users_tmp();
        if let Err(e) = write_users(&tmp_path, store) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &self.users) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %self.users.display(), profiles = store.len(), "Rewrote users file");
        Ok(())
    }

    pub(crate) fn users_tmp(&self) -> PathBuf {
        let mut name = self
            .users
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| USERS_FILE.into());
        name.push(".tmp");
        self.users.with_file_name(name)
    }

    pub fn append_friendship(&self, a: &str, b: &str) -> Result<()> {
        append_line(&self.friends, &format!("{} {}", a, b))?;
        debug!(a, b, "Appended friendship");
        Ok(())
    }

    pub fn append_post(&self, post: &Post) -> Result<()> {
        append_line(&self.posts, &post.to_record())?;
        debug!(sender = %post.sender, receiver = %post.receiver, "Appended post");
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_optional_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_users(path: &Path, store: &Store) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for profile in store.profiles() {
        writeln!(writer, "{}", profile.username)?;
        writeln!(writer, "{}", profile.name)?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    Ok(())
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> SocialError {
    SocialError::MalformedRecord {
        file: path.display().to_string(),
        line,
        reason: reason.into(),
    }
}

/// Username token, then the rest of the following non-blank text up to the
/// end of its line as the name.
fn load_users(store: &mut Store, text: &str, path: &Path) -> Result<()> {
    let mut scanner = Scanner::new(text);

    while let Some((line, username)) = scanner.token() {
        scanner.skip_whitespace();
        let name = scanner.rest_of_line();
        if name.is_empty() {
            return Err(malformed(path, line, format!("missing name for '{}'", username)));
        }

        store
            .insert(Profile::new(username, name))
            .map_err(|_| malformed(path, line, format!("duplicate username '{}'", username)))?;
    }
    Ok(())
}

/// Whitespace-delimited username pairs; each pair is one friendship.
fn load_friends(store: &mut Store, text: &str, path: &Path) -> Result<()> {
    let mut scanner = Scanner::new(text);

    while let Some((line, a)) = scanner.token() {
        let (_, b) = scanner
            .token()
            .ok_or_else(|| malformed(path, line, format!("'{}' has no friend", a)))?;
        if a == b {
            return Err(malformed(path, line, format!("'{}' is friends with itself", a)));
        }
        store.link_friends(a, b)?;
    }
    Ok(())
}

/// Replays the post log. Lines that are not UTF-8, do not parse, or name
/// users who do not exist are skipped.
fn load_posts(store: &mut Store, bytes: &[u8]) -> usize {
    let mut applied = 0;

    for (idx, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let Ok(line) = std::str::from_utf8(raw) else {
            warn!(line = idx + 1, "Skipping post record that is not valid UTF-8");
            continue;
        };
        let Some(post) = Post::parse_record(line) else {
            if !line.trim().is_empty() {
                warn!(line = idx + 1, "Skipping unparseable post record");
            }
            continue;
        };

        match store.record_post(&post) {
            Ok(()) => applied += 1,
            Err(e) => warn!(line = idx + 1, error = %e, "Skipping post record"),
        }
    }
    applied
}

/// Cursor over file text with stream-extraction semantics
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0, line: 1 }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.line += rest[..skipped].matches('\n').count();
        self.pos += skipped;
    }

    /// Next whitespace-delimited token with the line it starts on
    fn token(&mut self) -> Option<(usize, &'a str)> {
        self.skip_whitespace();
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += len;
        Some((self.line, &rest[..len]))
    }

    /// Remainder of the current line, consuming the newline
    fn rest_of_line(&mut self) -> &'a str {
        let rest = &self.text[self.pos..];
        let (content, consumed) = match rest.find('\n') {
            Some(end) => {
                self.line += 1;
                (&rest[..end], end + 1)
            }
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        content.strip_suffix('\r').unwrap_or(content)
    }
}
