// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! schemagen CLI: reads a JSON-LD ontology and writes Rust structs.
//!
//! With no arguments it reads `schemaorg-current-https.jsonld` from the
//! working directory and writes `structschema.rs` next to it. Any decode or
//! resolution error aborts the run before anything is written.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use schemagen::config::{FsConfigStore, GenConfig, DEFAULT_CONFIG_KEY};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "schemagen",
    version,
    about = "Generate Rust structs from a JSON-LD ontology (schema.org)"
)]
struct Cli {
    /// Config file; must exist. Without it, `schemagen.json` in the working
    /// directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-LD input file, or `-` for stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Rust output file, or `-` for stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Module name advertised in the generated banner.
    #[arg(long)]
    module: Option<String>,

    /// Also write the resolved graph as pretty JSON (diagnostic only).
    #[arg(long, value_name = "PATH")]
    dump_graph: Option<PathBuf>,

    /// Ignore member relations of nodes carrying `schema:supersededBy`.
    #[arg(long)]
    skip_superseded: bool,

    /// Ignore member relations of nodes carrying `schema:inverseOf`.
    #[arg(long)]
    skip_inverse: bool,

    /// Fail when two nodes share an identifier.
    #[arg(long)]
    reject_duplicates: bool,

    /// Do not emit `CONTEXT_PREFIXES`.
    #[arg(long)]
    no_context: bool,
}

impl Cli {
    fn load_config(&self) -> Result<GenConfig> {
        match &self.config {
            Some(path) => {
                let (store, key) = FsConfigStore::for_file(path);
                GenConfig::load_required(store, &key)
                    .with_context(|| format!("failed to load config {}", path.display()))
            }
            None => GenConfig::load(FsConfigStore::new("."), DEFAULT_CONFIG_KEY)
                .context("failed to load schemagen.json"),
        }
    }

    fn apply(self, config: &mut GenConfig) {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(module) = self.module {
            config.module = module;
        }
        if self.dump_graph.is_some() {
            config.dump_graph = self.dump_graph;
        }
        config.skip_superseded |= self.skip_superseded;
        config.skip_inverse |= self.skip_inverse;
        config.reject_duplicates |= self.reject_duplicates;
        if self.no_context {
            config.emit_context = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = cli.load_config()?;
    cli.apply(&mut config);

    let summary = schemagen::run(&config)?;
    info!(
        nodes = summary.nodes,
        declarations = summary.declarations,
        dangling = summary.resolve.dangling,
        "done"
    );
    Ok(())
}
