use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "mentor-nusantara")]
#[command(
    about = "Terminal chat with Mentor Nusantara, a business and history mentor agent",
    long_about = "Terminal chat with Mentor Nusantara, a business and history mentor agent\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/mentor-nusantara/config.toml\n    2. ~/.config/mentor-nusantara/config.toml\n\nThe Replicate token is read from REPLICATE_API_TOKEN (a local .env file is honored)."
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
