// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! schemagen: JSON-LD ontology (schema.org) → Rust struct declarations.
//!
//! [`run`] drives the whole pipeline: read, decode and index, resolve
//! relations, optionally dump the resolved graph, render, write. Output is
//! rendered fully in memory first, so a failing run never leaves a partial
//! file behind.

pub mod codegen;
pub mod config;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use schemagen_ld::{resolve, Graph, GraphOptions, ResolveOptions, ResolveStats};
use tracing::info;

use crate::codegen::{generate_file, GenOptions};
use crate::config::{is_stdio, GenConfig};

/// What a run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Nodes decoded from the input (shadowed duplicates included).
    pub nodes: usize,
    /// Struct declarations written.
    pub declarations: usize,
    /// Resolution counters.
    pub resolve: ResolveStats,
}

/// Decode, index and resolve a JSON-LD document.
pub fn load_graph(bytes: &[u8], config: &GenConfig) -> Result<(Graph, ResolveStats)> {
    let mut graph = Graph::from_slice(
        bytes,
        GraphOptions {
            reject_duplicates: config.reject_duplicates,
        },
    )?;
    let stats = resolve(
        &mut graph,
        &ResolveOptions {
            skip_superseded: config.skip_superseded,
            skip_inverse: config.skip_inverse,
        },
    )?;
    Ok((graph, stats))
}

/// Run the full pipeline described by `config`.
pub fn run(config: &GenConfig) -> Result<Summary> {
    let source = config.input.display().to_string();
    let bytes = read_input(&config.input)?;
    let (graph, stats) =
        load_graph(&bytes, config).with_context(|| format!("failed to process {source}"))?;

    if let Some(dump) = &config.dump_graph {
        let json = graph.to_pretty_json()?;
        write_output(dump, json.as_bytes())?;
        info!(path = %dump.display(), "wrote resolved graph dump");
    }

    let generated = generate_file(
        &graph,
        &GenOptions {
            module: config.module.clone(),
            source,
            emit_context: config.emit_context,
        },
    )?;
    write_output(&config.output, generated.code.as_bytes())?;
    info!(
        output = %config.output.display(),
        declarations = generated.declarations,
        "wrote generated source"
    );

    Ok(Summary {
        nodes: graph.len(),
        declarations: generated.declarations,
        resolve: stats,
    })
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if is_stdio(path) {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
        return Ok(bytes);
    }
    fs::read(path).with_context(|| format!("failed to open {}", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes).context("failed to write stdout")?;
        return stdout.flush().context("failed to flush stdout");
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    const DOC: &str = r#"{
        "@context": {"schema": "https://schema.org/"},
        "@graph": [
            {"@id": "schema:Person", "@type": "rdfs:Class"},
            {"@id": "schema:name", "@type": "rdf:Property",
             "schema:domainIncludes": {"@id": "schema:Person"}},
            {"@id": "schema:Employee", "@type": "rdfs:Class",
             "rdfs:subClassOf": {"@id": "schema:Person"}}
        ]
    }"#;

    #[test]
    fn run_writes_output_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vocab.jsonld");
        fs::write(&input, DOC).unwrap();
        let config = GenConfig {
            input,
            output: dir.path().join("vocab.rs"),
            dump_graph: Some(dir.path().join("graph.json")),
            ..GenConfig::default()
        };

        let summary = run(&config).unwrap();
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.declarations, 3);
        assert_eq!(summary.resolve.attached, 1);
        assert_eq!(summary.resolve.inherited, 1);

        let code = fs::read_to_string(dir.path().join("vocab.rs")).unwrap();
        syn::parse_file(&code).unwrap();
        assert!(code.contains("pub struct Employee"));

        let dump: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("graph.json")).unwrap()).unwrap();
        assert_eq!(dump["@graph"][2]["childs"], serde_json::json!(["schema:name"]));
    }

    #[test]
    fn missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenConfig {
            input: dir.path().join("absent.jsonld"),
            output: dir.path().join("out.rs"),
            ..GenConfig::default()
        };
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("absent.jsonld"));
        assert!(!dir.path().join("out.rs").exists());
    }

    #[test]
    fn malformed_reference_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.jsonld");
        fs::write(
            &input,
            r#"{"@graph": [{"@id": "schema:name", "@type": "rdf:Property", "schema:domainIncludes": 7}]}"#,
        )
        .unwrap();
        let config = GenConfig {
            input,
            output: dir.path().join("out.rs"),
            ..GenConfig::default()
        };
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("invalid reference shape"));
        assert!(!dir.path().join("out.rs").exists());
    }
}
