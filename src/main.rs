// main.rs
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use socialnet::config::Config;
use socialnet::core::SocialNetwork;
use socialnet::logging;
use socialnet::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "socialnet")]
#[command(about = "Tiny console social network backed by plain-text files")]
#[command(version)]
struct Args {
    /// Directory holding users.txt, friends.txt and posts.txt
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(args.debug)?;

    let config = Config::new(args.data_dir)?;
    let files = config.data_files();
    let network = SocialNetwork::open(files)
        .with_context(|| format!("Failed to load data from {}", config.data_dir.display()))?;

    let stdin = io::stdin();
    let mut shell = Shell::new(network, stdin.lock(), io::stdout());
    shell.run()
}
