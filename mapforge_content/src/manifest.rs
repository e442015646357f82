use mapforge_shared::serde_json::{self, Map, Value};
use serde::{Deserialize, Serialize};

use crate::terrain::{GenerationResult, TerrainVariant};

/// The three resolutions a map is built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Base,
    X4,
    X16,
}

impl VariantKind {
    pub const ALL: [VariantKind; 3] = [VariantKind::Base, VariantKind::X4, VariantKind::X16];

    /// Key of the summary in the manifest.
    pub fn key(self) -> &'static str {
        match self {
            VariantKind::Base => "map",
            VariantKind::X4 => "map4x",
            VariantKind::X16 => "map16x",
        }
    }

    /// Name of the binary artifact in the output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            VariantKind::Base => "map.bin",
            VariantKind::X4 => "map4x.bin",
            VariantKind::X16 => "map16x.bin",
        }
    }

    pub fn select(self, result: &GenerationResult) -> &TerrainVariant {
        match self {
            VariantKind::Base => &result.map,
            VariantKind::X4 => &result.map4x,
            VariantKind::X16 => &result.map16x,
        }
    }
}

/// Summary of a [`TerrainVariant`] as it is stored in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub width: u32,
    pub height: u32,
    pub num_land_tiles: u32,
}

impl From<&TerrainVariant> for VariantSummary {
    fn from(variant: &TerrainVariant) -> Self {
        Self {
            width: variant.width,
            height: variant.height,
            num_land_tiles: variant.num_land_tiles,
        }
    }
}

impl From<VariantSummary> for Value {
    fn from(summary: VariantSummary) -> Self {
        let mut object = Map::new();
        object.insert("width".to_owned(), summary.width.into());
        object.insert("height".to_owned(), summary.height.into());
        object.insert("num_land_tiles".to_owned(), summary.num_land_tiles.into());
        Value::Object(object)
    }
}

/// The metadata document of a map after the summaries of the generated terrain were added.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildManifest {
    document: Map<String, Value>,
}

impl BuildManifest {
    /// Adds the summaries of the three variants to the metadata document. The keys `map`, `map4x` and
    /// `map16x` are overwritten, all other keys are left untouched.
    pub fn merge(mut document: Map<String, Value>, result: &GenerationResult) -> Self {
        for kind in VariantKind::ALL {
            let summary = VariantSummary::from(kind.select(result));
            document.insert(kind.key().to_owned(), summary.into());
        }
        Self { document }
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Returns the summary stored for the given variant.
    pub fn summary(&self, kind: VariantKind) -> Option<VariantSummary> {
        let value = self.document.get(kind.key())?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Serializes the manifest with an indentation of two spaces.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use mapforge_shared::{indoc::indoc, serde_json::json};

    use super::*;

    fn variant(width: u32, height: u32, num_land_tiles: u32) -> TerrainVariant {
        TerrainVariant {
            width,
            height,
            num_land_tiles,
            data: vec![0; (width * height) as usize],
        }
    }

    fn result() -> GenerationResult {
        GenerationResult {
            map: variant(40, 20, 300),
            map4x: variant(20, 10, 70),
            map16x: variant(10, 5, 16),
            thumbnail: vec![1, 2, 3],
        }
    }

    fn parse(text: &str) -> Map<String, Value> {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn summaries_match_the_variants() {
        let manifest = BuildManifest::merge(Map::new(), &result());
        assert_eq!(
            manifest.summary(VariantKind::Base),
            Some(VariantSummary {
                width: 40,
                height: 20,
                num_land_tiles: 300
            })
        );
        assert_eq!(
            manifest.summary(VariantKind::X4),
            Some(VariantSummary {
                width: 20,
                height: 10,
                num_land_tiles: 70
            })
        );
        assert_eq!(
            manifest.summary(VariantKind::X16),
            Some(VariantSummary {
                width: 10,
                height: 5,
                num_land_tiles: 16
            })
        );
        assert_eq!(manifest.document()["map4x"], json!({ "width": 20, "height": 10, "num_land_tiles": 70 }));
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let document = parse(indoc! {r#"
            {
                "name": "Plains",
                "nations": [{ "name": "A", "coordinates": [1, 2], "flag": "" }],
                "nested": { "deep": { "value": 1.5, "null": null } }
            }
        "#});
        let manifest = BuildManifest::merge(document.clone(), &result());
        for (key, value) in &document {
            assert_eq!(manifest.document().get(key), Some(value), "key {key} changed");
        }
        assert_eq!(manifest.document().len(), document.len() + 3);
    }

    #[test]
    fn existing_summaries_are_overwritten() {
        let document = parse(indoc! {r#"
            {
                "name": "Plains",
                "map": { "width": 1, "height": 1, "num_land_tiles": 1, "stale": true }
            }
        "#});
        let manifest = BuildManifest::merge(document, &result());
        assert_eq!(manifest.document()["map"], json!({ "width": 40, "height": 20, "num_land_tiles": 300 }));
        assert_eq!(manifest.document()["name"], json!("Plains"));
    }

    #[test]
    fn pretty_json() {
        let document = parse(r#"{ "name": "Plains" }"#);
        let manifest = BuildManifest::merge(document, &result());
        let text = manifest.to_pretty_json().unwrap();
        assert!(text.starts_with("{\n  \""));
        assert!(text.contains("\n    \"num_land_tiles\": 300"));
        assert_eq!(parse(&text), *manifest.document());
    }

    #[test]
    fn merge_is_deterministic() {
        let document = parse(r#"{ "b": 1, "a": [true, false] }"#);
        let first = BuildManifest::merge(document.clone(), &result()).to_pretty_json().unwrap();
        let second = BuildManifest::merge(document, &result()).to_pretty_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn file_names_and_keys() {
        let keys = VariantKind::ALL.map(VariantKind::key);
        let file_names = VariantKind::ALL.map(VariantKind::file_name);
        assert_eq!(keys, ["map", "map4x", "map16x"]);
        assert_eq!(file_names, ["map.bin", "map4x.bin", "map16x.bin"]);
    }
}
