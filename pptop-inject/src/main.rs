//! # pptop-inject - Main Entry Point
//!
//! Injector-side companion of the shim:
//! - **render**: dry-run the entry point and print the command it would evaluate
//! - **check**: pre-flight a request before loading the shim into a target

use anyhow::Result;
use clap::Parser;
use log::info;
use pptop_inject::cli::{Args, Command};
use pptop_inject::preflight::run_preflight_checks;
use pptop_inject::render::{render, RenderReport};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("missing required argument") || msg.contains("takes no --protocol") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Render { request, json } => {
            let request = request.to_request()?;
            let command = render(&request)?;
            if json {
                let report = RenderReport::new(&command);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{command}");
            }
        }
        Command::Check { request, quiet } => {
            let request = request.to_request()?;
            let length = run_preflight_checks(&request, quiet)?;
            info!("request passed pre-flight checks");
            if !quiet {
                println!(
                    "ok: revision {} command is {} of {} bytes",
                    request.revision().as_u32(),
                    length,
                    request.revision().command_capacity()
                );
            }
        }
    }

    Ok(())
}
