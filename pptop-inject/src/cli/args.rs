//! CLI argument definitions

use crate::domain::InjectionRequest;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pptop_inject_common::ProtocolRevision;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pptop-inject",
    about = "Render and check pptop injection requests",
    after_help = "\
EXAMPLES:
    pptop-inject render -r 1 -L /opt/pp -p 4242 -l /tmp/pp.log       Command the v1 shim would run
    pptop-inject render -r 3 -L /opt/pp -p 4242 -P 2 -l /tmp/pp.log  Same request for the v3 shim
    pptop-inject check --request req.json                            Pre-flight a request file"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the exact command the shim would evaluate
    Render {
        #[command(flatten)]
        request: RequestArgs,

        /// Print a JSON report instead of the bare command
        #[arg(long)]
        json: bool,
    },
    /// Validate a request before injecting it
    Check {
        #[command(flatten)]
        request: RequestArgs,

        /// Suppress warnings
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Injection request, given field by field or as a JSON file
#[derive(clap::Args, Debug)]
pub struct RequestArgs {
    /// Read the whole request from a JSON file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["revision", "library_path", "pid", "protocol", "log"])]
    pub request: Option<PathBuf>,

    /// Protocol revision of the shim (1, 2 or 3)
    #[arg(short, long, value_parser = parse_revision)]
    pub revision: Option<ProtocolRevision>,

    /// Directory prepended to sys.path in the target
    #[arg(short = 'L', long)]
    pub library_path: Option<String>,

    /// Process id handed to the injection module
    #[arg(short, long)]
    pub pid: Option<u32>,

    /// Protocol version handed to the injection module (revisions 2 and 3)
    #[arg(short = 'P', long)]
    pub protocol: Option<u32>,

    /// Log file for the injection module
    #[arg(short, long)]
    pub log: Option<String>,
}

fn parse_revision(s: &str) -> Result<ProtocolRevision, String> {
    let value = s.trim_start_matches(['v', 'V']);
    value
        .parse::<u32>()
        .ok()
        .and_then(ProtocolRevision::from_u32)
        .ok_or_else(|| format!("unknown protocol revision '{s}' (expected 1, 2 or 3)"))
}

impl RequestArgs {
    /// Resolve into a request. Every field is mandatory; nothing is defaulted.
    pub fn to_request(&self) -> Result<InjectionRequest> {
        if let Some(ref file) = self.request {
            let data = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read request file: {}", file.display()))?;
            return serde_json::from_str(&data)
                .with_context(|| format!("Invalid request file: {}", file.display()));
        }

        let Some(revision) = self.revision else {
            bail!("Missing required argument: --revision");
        };
        let Some(ref library_path) = self.library_path else {
            bail!("Missing required argument: --library-path");
        };
        let Some(pid) = self.pid else {
            bail!("Missing required argument: --pid");
        };
        let Some(ref log) = self.log else {
            bail!("Missing required argument: --log");
        };
        let protocol = match (revision.carries_protocol(), self.protocol) {
            (true, Some(p)) => p,
            (true, None) => bail!(
                "Missing required argument: --protocol (revision {} passes it to start())",
                revision.as_u32()
            ),
            (false, Some(_)) => bail!("Revision 1 takes no --protocol"),
            (false, None) => 0,
        };

        Ok(InjectionRequest::new(revision, library_path.as_str(), pid, protocol, log.as_str()))
    }
}
