// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Projection of resolved graph nodes into Rust struct declarations.
//!
//! Every node becomes one `pub struct` with two header fields (`@context`,
//! `@type`) followed by one field per resolved child. Child fields hold
//! `Vec<Box<Child>>` so self- and mutually-recursive types stay finite. All
//! paths are fully qualified; the generated unit needs no `use` items.

use std::collections::HashSet;

use anyhow::{Context, Result};
use heck::ToSnakeCase;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use schemagen_ld::{Graph, GraphNode, NodeId};
use syn::{Ident, ItemStruct};
use tracing::{info, warn};

/// Field names taken by the fixed header.
const HEADER_FIELDS: [&str; 2] = ["context", "type"];

/// Options for rendering a whole generated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenOptions {
    /// Module the unit is meant to be included as.
    pub module: String,
    /// Human-readable name of the source document, for the banner.
    pub source: String,
    /// Emit `CONTEXT_PREFIXES` from the document's `@context`.
    pub emit_context: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            module: crate::config::DEFAULT_MODULE.to_owned(),
            source: crate::config::DEFAULT_INPUT.to_owned(),
            emit_context: true,
        }
    }
}

/// A rendered unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Formatted Rust source.
    pub code: String,
    /// Number of struct declarations in `code`.
    pub declarations: usize,
}

/// Build the declaration for one resolved node.
pub fn generate_decl(node: &GraphNode) -> ItemStruct {
    let name = type_ident(&node.id);
    let docs = doc_lines(&node.comment.value);

    let mut taken: HashSet<String> = HEADER_FIELDS.iter().map(|f| (*f).to_owned()).collect();
    let fields: Vec<TokenStream> = node
        .childs
        .iter()
        .map(|child| {
            let field = field_ident(child, &mut taken);
            let ty = type_ident(child);
            let tag = child.as_str();
            quote! {
                #[serde(rename = #tag, default)]
                pub #field: ::std::vec::Vec<::std::boxed::Box<#ty>>
            }
        })
        .collect();

    syn::parse_quote! {
        #(#[doc = #docs])*
        #[derive(
            ::core::fmt::Debug,
            ::core::clone::Clone,
            ::core::default::Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        pub struct #name {
            #[serde(rename = "@context")]
            pub context: ::std::string::String,
            #[serde(rename = "@type")]
            pub r#type: ::std::string::String,
            #(#fields,)*
        }
    }
}

/// Render every visible node of a resolved graph into one source unit.
///
/// Declarations follow document order. When two identifiers normalize to the
/// same type name only the first is emitted; field types referring to the
/// name still resolve to it.
pub fn generate_file(graph: &Graph, options: &GenOptions) -> Result<Generated> {
    let mut names = HashSet::new();
    let mut decls = Vec::new();
    for node in graph.visible_nodes() {
        let decl = generate_decl(node);
        if !names.insert(decl.ident.to_string()) {
            warn!(id = %node.id, name = %decl.ident, "type name already declared, skipping");
            continue;
        }
        decls.push(decl);
    }

    let context = options.emit_context.then(|| context_prefixes(graph));
    let tokens = quote! {
        #![allow(non_camel_case_types, non_snake_case, clippy::all)]
        #context
        #(#decls)*
    };
    let file: syn::File =
        syn::parse2(tokens).context("generated tokens do not form a Rust source file")?;

    info!(declarations = decls.len(), module = %options.module, "generated declarations");
    let code = format!(
        "// @generated by schemagen from `{}`. Do not edit.\n// Include with `mod {};`.\n\n{}",
        options.source,
        options.module,
        prettyplease::unparse(&file)
    );
    Ok(Generated {
        code,
        declarations: decls.len(),
    })
}

fn context_prefixes(graph: &Graph) -> TokenStream {
    let entries = graph
        .context()
        .iter()
        .map(|(prefix, uri)| quote!((#prefix, #uri)));
    quote! {
        /// `@context` prefixes of the source vocabulary, sorted by prefix.
        pub const CONTEXT_PREFIXES: &[(&str, &str)] = &[#(#entries),*];
    }
}

/// One doc line per comment line, each with a leading space.
fn doc_lines(comment: &str) -> Vec<String> {
    if comment.trim().is_empty() {
        return Vec::new();
    }
    comment
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                String::new()
            } else {
                format!(" {line}")
            }
        })
        .collect()
}

fn type_ident(id: &NodeId) -> Ident {
    ident(&sanitize(&id.type_name(), "Unnamed"))
}

fn field_ident(child: &NodeId, taken: &mut HashSet<String>) -> Ident {
    let base = sanitize(&child.type_name().to_snake_case(), "field");
    let mut candidate = base.clone();
    let mut suffix = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    ident(&candidate)
}

/// Reduce `name` to `[A-Za-z0-9_]`, never starting with a digit and never a
/// word that cannot be a raw identifier.
fn sanitize(name: &str, fallback: &str) -> String {
    let mut text: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if text.is_empty() {
        text.push_str(fallback);
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        text.insert(0, '_');
    }
    if matches!(text.as_str(), "_" | "self" | "Self" | "super" | "crate") {
        text.push('_');
    }
    text
}

/// Plain identifier, or a raw one for keywords.
fn ident(text: &str) -> Ident {
    syn::parse_str::<Ident>(text).unwrap_or_else(|_| Ident::new_raw(text, Span::call_site()))
}
