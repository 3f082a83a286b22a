use std::io::{BufRead, Write};
use anyhow::{Result, Context};
use colored::*;

use crate::core::{SocialError, SocialNetwork};

/// Whether the menu loop keeps going after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Numbered-menu driver over any line reader and writer
pub struct Shell<R, W> {
    network: SocialNetwork,
    input: R,
    output: W,
    /// Unconsumed rest of the last line read for a token
    pending: String,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(network: SocialNetwork, input: R, output: W) -> Self {
        Shell {
            network,
            input,
            output,
            pending: String::new(),
        }
    }

    pub fn into_network(self) -> SocialNetwork {
        self.network
    }

    /// Run until the user picks Exit or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.show_menu()?;

            let Some(choice) = self.read_token()? else {
                self.say("Goodbye.".cyan())?;
                return Ok(());
            };

            let flow = match choice.parse::<i32>() {
                Ok(1) => self.create_profile()?,
                Ok(2) => self.add_friend()?,
                Ok(3) => self.post_message()?,
                Ok(4) => self.view_profile()?,
                Ok(5) => Flow::Exit,
                _ => {
                    self.say("Invalid choice.".red())?;
                    Flow::Continue
                }
            };
            self.pending.clear();

            if flow == Flow::Exit {
                self.say("Goodbye.".cyan())?;
                return Ok(());
            }
        }
    }

    fn show_menu(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", "===== Simple Social Network =====".cyan().bold())?;
        writeln!(self.output, "1. Create Profile")?;
        writeln!(self.output, "2. Add Friend")?;
        writeln!(self.output, "3. Post Message")?;
        writeln!(self.output, "4. View Profile")?;
        writeln!(self.output, "5. Exit")?;
        self.prompt("Enter your choice: ")
    }

    fn create_profile(&mut self) -> Result<Flow> {
        self.prompt("Enter username: ")?;
        let Some(username) = self.read_token()? else {
            return Ok(Flow::Exit);
        };

        if self.network.contains(&username) {
            self.say("Username already exists.".red())?;
            return Ok(Flow::Continue);
        }

        self.prompt("Enter your full name: ")?;
        let Some(name) = self.read_rest()? else {
            return Ok(Flow::Exit);
        };

        match self.network.create_profile(&username, &name) {
            Ok(()) => self.say("Profile created successfully.".green())?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn add_friend(&mut self) -> Result<Flow> {
        self.prompt("Enter your username: ")?;
        let Some(u1) = self.read_token()? else {
            return Ok(Flow::Exit);
        };
        self.prompt("Enter friend's username: ")?;
        let Some(u2) = self.read_token()? else {
            return Ok(Flow::Exit);
        };

        match self.network.add_friend(&u1, &u2) {
            Ok(()) => self.say("Friend added successfully.".green())?,
            Err(SocialError::UnknownUser(_)) => {
                self.say("One or both usernames not found.".red())?
            }
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn post_message(&mut self) -> Result<Flow> {
        self.prompt("Enter your username (sender): ")?;
        let Some(sender) = self.read_token()? else {
            return Ok(Flow::Exit);
        };
        self.prompt("Enter receiver's username: ")?;
        let Some(receiver) = self.read_token()? else {
            return Ok(Flow::Exit);
        };

        if !self.network.contains(&sender) || !self.network.contains(&receiver) {
            self.say("One or both usernames not found.".red())?;
            return Ok(Flow::Continue);
        }

        self.prompt("Enter your message: ")?;
        let Some(body) = self.read_rest()? else {
            return Ok(Flow::Exit);
        };

        match self.network.post_message(&sender, &receiver, &body) {
            Ok(()) => self.say("Message sent successfully.".green())?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn view_profile(&mut self) -> Result<Flow> {
        self.prompt("Enter username to view: ")?;
        let Some(username) = self.read_token()? else {
            return Ok(Flow::Exit);
        };

        let view = match self.network.view_profile(&username) {
            Ok(view) => view,
            Err(SocialError::UnknownUser(_)) => {
                self.say("User not found.".red())?;
                return Ok(Flow::Continue);
            }
            Err(e) => {
                self.report(e)?;
                return Ok(Flow::Continue);
            }
        };

        writeln!(self.output, "\n{}", "--- Profile ---".yellow().bold())?;
        writeln!(self.output, "Name: {}", view.name)?;
        writeln!(self.output, "Username: {}", view.username)?;
        writeln!(self.output, "Friends: {}", view.friends.join(" "))?;
        writeln!(self.output, "Messages:")?;
        for message in &view.messages {
            writeln!(self.output, "- {}", message)?;
        }
        writeln!(self.output, "{}", "---------------".yellow())?;
        Ok(Flow::Continue)
    }

    /// Print a failed operation in the wording the menu has always used
    fn report(&mut self, error: SocialError) -> Result<()> {
        let message = match &error {
            SocialError::DuplicateUser(_) => "Username already exists.".to_string(),
            SocialError::UnknownUser(_) => "User not found.".to_string(),
            SocialError::SelfFriend(_) => "You cannot add yourself as a friend.".to_string(),
            SocialError::AlreadyFriends(_, friend) => {
                format!("You are already friends with {}.", friend)
            }
            other => {
                tracing::warn!(error = %other, "Operation failed");
                return self.say(format!("{}: {}", "Error".red().bold(), other).normal());
            }
        };
        self.say(message.red())
    }

    fn say(&mut self, text: ColoredString) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write to terminal")
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush().context("Failed to write to terminal")
    }

    /// One raw line without its terminator, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Next whitespace-delimited token, continuing on the current line
    /// before reading another one
    fn read_token(&mut self) -> Result<Option<String>> {
        loop {
            let rest = self.pending.trim_start();
            if !rest.is_empty() {
                let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let token = rest[..len].to_string();
                self.pending = rest[len..].to_string();
                return Ok(Some(token));
            }

            match self.read_line()? {
                Some(line) => self.pending = line,
                None => {
                    self.pending.clear();
                    return Ok(None);
                }
            }
        }
    }

    /// Text left on the current line after the last token, or the next
    /// line when nothing but whitespace is left
    fn read_rest(&mut self) -> Result<Option<String>> {
        let rest = std::mem::take(&mut self.pending);
        if rest.trim().is_empty() {
            return self.read_line();
        }
        let mut chars = rest.chars();
        chars.next();
        Ok(Some(chars.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataFiles;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_script(dir: &TempDir, script: &str) -> (String, SocialNetwork) {
        colored::control::set_override(false);

        let network = SocialNetwork::open(DataFiles::in_dir(dir.path())).unwrap();
        let mut output = Vec::new();
        let mut shell = Shell::new(network, Cursor::new(script.as_bytes()), &mut output);
        shell.run().unwrap();
        let network = shell.into_network();

        (String::from_utf8(output).unwrap(), network)
    }

    #[test]
    fn test_exit_choice() {
        let dir = tempfile::tempdir().unwrap();
        let (output, _) = run_script(&dir, "5\n");

        assert!(output.contains("===== Simple Social Network ====="));
        assert!(output.contains("Enter your choice: "));
        assert!(output.ends_with("Goodbye.\n"));
    }

    #[test]
    fn test_invalid_choices() {
        let dir = tempfile::tempdir().unwrap();
        let (output, _) = run_script(&dir, "9\nabc\n5\n");

        assert_eq!(output.matches("Invalid choice.").count(), 2);
    }

    #[test]
    fn test_end_of_input_exits() {
        let dir = tempfile::tempdir().unwrap();
        let (output, _) = run_script(&dir, "1\nalice\n");

        assert!(output.ends_with("Goodbye.\n"));
        assert!(!dir.path().join("users.txt").exists());
    }

    #[test]
    fn test_create_and_view_session() {
        let dir = tempfile::tempdir().unwrap();
        let (output, network) = run_script(
            &dir,
            "1\nalice\nAlice Smith\n1\nalice\n4\nalice\n5\n",
        );

        assert!(output.contains("Profile created successfully."));
        assert!(output.contains("Username already exists."));
        assert!(output.contains("--- Profile ---"));
        assert!(output.contains("Name: Alice Smith\nUsername: alice\nFriends: \nMessages:\n"));
        assert_eq!(network.store().len(), 1);
    }

    #[test]
    fn test_friend_and_post_session() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
1\nalice\nAlice Smith\n\
1\nbob\nBob Jones\n\
2\nalice\nalice\n\
2\nalice\ncarol\n\
2\nalice\nbob\n\
2\nbob\nalice\n\
3\nalice\ncarol\n\
3\nalice\nbob\nhi there\n\
4\nbob\n\
4\ncarol\n\
5\n";
        let (output, _) = run_script(&dir, script);

        assert!(output.contains("You cannot add yourself as a friend."));
        assert_eq!(output.matches("One or both usernames not found.").count(), 2);
        assert!(output.contains("Friend added successfully."));
        assert!(output.contains("You are already friends with alice."));
        assert!(output.contains("Message sent successfully."));
        assert!(output.contains("Friends: alice\nMessages:\n- From alice: hi there\n"));
        assert!(output.contains("User not found."));

        assert_eq!(
            std::fs::read_to_string(dir.path().join("posts.txt")).unwrap(),
            "alice -> bob: hi there\n"
        );
    }

    #[test]
    fn test_tokens_on_the_same_line() {
        let dir = tempfile::tempdir().unwrap();
        let (_, network) = run_script(&dir, "1 alice\nAlice Smith\n5\n");

        let profiles: Vec<_> = network
            .store()
            .profiles()
            .map(|p| (p.username.clone(), p.name.clone()))
            .collect();
        assert_eq!(profiles, vec![("alice".to_string(), "Alice Smith".to_string())]);
    }

    #[test]
    fn test_whole_commands_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = "1 alice Alice Smith\n1 bob Bob\n2 alice bob\n3 alice bob hi there\n4 bob\n5\n";
        let (output, network) = run_script(&dir, script);

        assert_eq!(network.view_profile("alice").unwrap().name, "Alice Smith");
        assert!(output.contains("Friend added successfully."));
        assert!(output.contains("Friends: alice\nMessages:\n- From alice: hi there\n"));
    }

    #[test]
    fn test_invalid_choice_discards_rest_of_line() {
        let dir = tempfile::tempdir().unwrap();
        let (output, network) = run_script(&dir, "x 1 alice\n5\n");

        assert_eq!(output.matches("Invalid choice.").count(), 1);
        assert!(network.store().is_empty());
    }

    #[test]
    fn test_invalid_name_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (output, network) = run_script(&dir, "1\nalice\n\n5\n");

        assert!(output.contains("Error: Invalid input: name must not be empty"));
        assert!(network.store().is_empty());
    }
}
