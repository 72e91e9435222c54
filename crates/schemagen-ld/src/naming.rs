// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier → declaration name normalization.
//!
//! Schema vocabularies spell properties lowercase-initial (`schema:name`) and
//! classes uppercase-initial (`schema:Name`); properties get a `Prop` prefix so
//! both can coexist as type names. The `schema` namespace is the default
//! vocabulary and contributes no text, so `schema:Person` → `Person` and
//! `schema:name` → `PropName`.

use heck::ToUpperCamelCase;

use crate::graph::NodeId;

const DEFAULT_NAMESPACE: &str = "schema";
const PROPERTY_PREFIX: &str = "Prop";

/// Normalize an identifier into a type name.
///
/// Takes the last `/` segment, splits it on `:`, Pascal-cases each part (with
/// `Prop` in front of lowercase-initial parts) and concatenates the result.
/// The same identifier always yields the same name, wherever it is used.
pub fn type_name(id: &str) -> String {
    let trimmed = id.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    base.split(':').map(normalize_part).collect()
}

fn normalize_part(part: &str) -> String {
    let Some(first) = part.chars().next() else {
        return String::new();
    };
    if part == DEFAULT_NAMESPACE {
        return String::new();
    }
    let pascal = part.to_upper_camel_case();
    // digits and symbols have no case and count as lowercase
    if first.is_uppercase() {
        pascal
    } else {
        format!("{PROPERTY_PREFIX}{pascal}")
    }
}

impl NodeId {
    /// Declaration name for this identifier; see [`type_name`].
    pub fn type_name(&self) -> String {
        type_name(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn classes_keep_their_name() {
        assert_eq!(type_name("schema:Person"), "Person");
        assert_eq!(type_name("schema:CreativeWork"), "CreativeWork");
    }

    #[test]
    fn properties_get_prop_prefix() {
        assert_eq!(type_name("schema:name"), "PropName");
        assert_eq!(type_name("schema:additionalType"), "PropAdditionalType");
        assert_eq!(NodeId::from("schema:name").type_name(), "PropName");
    }

    #[test]
    fn other_namespaces_are_kept() {
        assert_eq!(type_name("rdfs:Class"), "PropRdfsClass");
        assert_eq!(type_name("rdfs:label"), "PropRdfsPropLabel");
        assert_eq!(type_name("Thing"), "Thing");
    }

    #[test]
    fn uses_last_path_segment() {
        assert_eq!(type_name("https://schema.org/Person"), "Person");
        assert_eq!(type_name("http://purl.org/dc/terms/schema:name"), "PropName");
        assert_eq!(type_name("https://schema.org/Person/"), "Person");
    }

    #[test]
    fn caseless_leading_characters_count_as_lowercase() {
        assert!(type_name("schema:3DModel").starts_with("Prop3"));
    }

    #[test]
    fn empty_parts_are_dropped() {
        assert_eq!(type_name(""), "");
        assert_eq!(type_name("schema:"), "");
        assert_eq!(type_name(":Person"), "Person");
    }
}
