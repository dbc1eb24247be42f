//! Command line administration of stored trees
//!
//! Usage:
//!   treeadmin trees                              # List trees
//!   treeadmin show 3                             # Print tree 3 as an outline
//!   treeadmin attach-node 3 10 42                # Put node 42 under node 10
//!   treeadmin attach-code 3 10 7                 # Mint a code from prefix 7 under node 10
//!   treeadmin attach-subtree 3 10 42             # Copy the structure rooted at 42 under node 10
//!
//! The backend url is read from `--base-url`, `TREEADMIN_BASE_URL` or a
//! `.env` file.

mod commands;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use remote::{HttpGateway, RemoteConfig};

#[derive(Parser, Debug)]
#[command(name = "treeadmin")]
#[command(about = "Inspect and edit stored tree structures")]
struct Args {
    /// Root of the backend API
    #[arg(long, env = "TREEADMIN_BASE_URL", default_value = RemoteConfig::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "TREEADMIN_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List all trees
    Trees,
    /// List all code prefixes
    Prefixes,
    /// Print a tree as an indented outline
    Show { tree: String },
    /// Attach an existing node under an anchor node
    AttachNode {
        tree: String,
        anchor: String,
        node: String,
    },
    /// Mint a node from a prefix and attach it under an anchor node
    AttachCode {
        tree: String,
        anchor: String,
        prefix: String,
    },
    /// Copy the structure rooted at a node under an anchor node
    AttachSubtree {
        tree: String,
        anchor: String,
        node: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config =
        RemoteConfig::new(args.base_url).with_timeout(Duration::from_secs(args.timeout_secs));
    let gateway = HttpGateway::new(&config).context("Failed to set up the backend client")?;

    commands::run(&gateway, args.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_attach_node() {
        let args = Args::try_parse_from([
            "treeadmin",
            "--base-url",
            "http://example.test/api/",
            "attach-node",
            "3",
            "10",
            "42",
        ])
        .unwrap();

        assert_eq!(args.base_url, "http://example.test/api/");
        assert_eq!(
            args.command,
            Command::AttachNode {
                tree: "3".into(),
                anchor: "10".into(),
                node: "42".into(),
            }
        );
    }

    #[test]
    fn test_attach_requires_anchor() {
        assert!(Args::try_parse_from(["treeadmin", "attach-code", "3"]).is_err());
    }
}
