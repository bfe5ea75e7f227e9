//! MCP server exposing PowerPoint editing tools over stdio.

mod config;
mod protocol;
mod server;
mod state;
mod tools;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, SLIDE_TEMPLATES_ENV};
use crate::server::McpServer;
use crate::state::ServerState;
use crate::transport::StdioTransport;

/// Create, edit and save .pptx presentations through MCP tools on stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "ppt-mcp-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory searched for template files given by name (repeatable)
    #[arg(short = 't', long = "template-dir")]
    template_dirs: Vec<PathBuf>,

    /// Slide template library JSON file (default: built-in library)
    #[arg(long, env = SLIDE_TEMPLATES_ENV)]
    slide_templates: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr.
    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::resolve(args.template_dirs, args.slide_templates);
    log::debug!("template search path: {}", config.search_list());
    let library = config
        .load_library()
        .context("Failed to load slide template library")?;
    log::debug!("{} slide templates available", library.templates.len());

    let mut server = McpServer::new(ServerState::new(config, library));
    let mut transport = StdioTransport::stdio();
    server
        .run(&mut transport)
        .context("stdio transport failed")?;
    Ok(())
}
