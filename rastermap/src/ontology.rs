//! Rule based classification of features into semantic layers.
//!
//! An [`Ontology`] is an ordered list of [`ClassificationRule`]s. Rules are evaluated top to
//! bottom and the first one with a matching property wins. Matching is case-insensitive and
//! substring based, so `"Primary Road"` satisfies a rule accepting `"primary"`. The matching is
//! deliberately permissive: real world tag data is messy.

use std::path::Path;

use rastermap_types::GeometryType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GisError;
use crate::feature::Properties;
use crate::style::{LayerKind, WaterKind};

const BUILTIN_ONTOLOGY: &str = include_str!("../data/ontology.json");

/// Semantic layer assigned to a feature by the classifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticLayer {
    /// Water bodies and waterways.
    Water,
    /// Roads of any class.
    Road,
    /// Railways.
    Rail,
    /// Parks and green areas.
    Park,
    /// Points of interest.
    Point,
}

/// Accepts a feature if the string value of `key` contains one of `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMatcher {
    /// Property name.
    pub key: String,
    /// Accepted substrings, lowercase.
    pub values: Vec<String>,
}

impl PropertyMatcher {
    /// Creates a matcher. Accepted values are lowercased.
    pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            key: key.into(),
            values: values
                .into_iter()
                .map(|v| v.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Checks the matcher against feature properties.
    pub fn matches(&self, properties: &Properties) -> bool {
        let Some(value) = property_text(properties, &self.key) else {
            return false;
        };

        self.values
            .iter()
            .any(|accepted| !accepted.is_empty() && value.contains(accepted.as_str()))
    }
}

/// Assigns `layer` to features accepted by any of the matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Layer assigned on match.
    pub layer: SemanticLayer,
    /// Property matchers, any of which accepts the feature.
    pub matchers: Vec<PropertyMatcher>,
}

impl ClassificationRule {
    /// Checks the rule against feature properties.
    pub fn matches(&self, properties: &Properties) -> bool {
        self.matchers.iter().any(|m| m.matches(properties))
    }
}

/// Ordered list of classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
    rules: Vec<ClassificationRule>,
}

impl Ontology {
    /// Creates an ontology from a list of rules.
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self {
            rules: rules.into_iter().map(normalize_rule).collect(),
        }
    }

    /// Rules bundled with the crate, covering OpenStreetMap tags and Argentine IGN `objeto`
    /// attributes.
    pub fn builtin() -> Result<Self, GisError> {
        let ontology = Self::from_json(BUILTIN_ONTOLOGY)?;
        if ontology.rules.is_empty() {
            return Err(GisError::InvalidStyle(
                "built-in ontology has no rules".to_string(),
            ));
        }

        Ok(ontology)
    }

    /// Parses an ontology from its JSON definition: `{"rules": [{"layer", "matchers"}]}`.
    pub fn from_json(json: &str) -> Result<Self, GisError> {
        let parsed: Ontology =
            serde_json::from_str(json).map_err(|err| GisError::InvalidStyle(err.to_string()))?;
        Ok(Self::new(parsed.rules))
    }

    /// Loads an ontology from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GisError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Layer of the first rule that matches the properties.
    ///
    /// Points no rule matches fall back to [`SemanticLayer::Point`]; other geometries stay
    /// unclassified.
    pub fn classify(
        &self,
        properties: &Properties,
        geometry_type: GeometryType,
    ) -> Option<SemanticLayer> {
        self.rules
            .iter()
            .find(|rule| rule.matches(properties))
            .map(|rule| rule.layer)
            .or_else(|| (geometry_type == GeometryType::Point).then_some(SemanticLayer::Point))
    }
}

fn normalize_rule(rule: ClassificationRule) -> ClassificationRule {
    ClassificationRule {
        layer: rule.layer,
        matchers: rule
            .matchers
            .into_iter()
            .map(|m| PropertyMatcher::new(m.key, m.values))
            .collect(),
    }
}

/// Lowercased, trimmed text of a property. `None` for missing and null values.
fn property_text(properties: &Properties, key: &str) -> Option<String> {
    let text = match properties.get(key)? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Some(text.trim().to_lowercase())
}

/// Road class of a feature classified as [`SemanticLayer::Road`], from its `highway` (or
/// `fclass`) tag.
pub fn road_class(properties: &Properties) -> LayerKind {
    let Some(highway) =
        property_text(properties, "highway").or_else(|| property_text(properties, "fclass"))
    else {
        return LayerKind::Street;
    };

    let class = highway.strip_suffix("_link").unwrap_or(&highway);
    match class {
        "motorway" | "trunk" => LayerKind::Motorway,
        "primary" => LayerKind::Primary,
        "secondary" => LayerKind::Secondary,
        "tertiary" | "residential" | "living_street" | "unclassified" => LayerKind::Street,
        "service" | "track" | "path" | "footway" | "cycleway" => LayerKind::Minor,
        _ => LayerKind::Street,
    }
}

/// Sub-kind of a water feature from its `objeto` or `waterway` property.
pub fn water_kind(properties: &Properties) -> WaterKind {
    let text = property_text(properties, "objeto")
        .or_else(|| property_text(properties, "waterway"))
        .unwrap_or_default();

    if ["river", "río", "canal"].iter().any(|k| text.contains(k)) {
        WaterKind::River
    } else if ["stream", "arroyo"].iter().any(|k| text.contains(k)) {
        WaterKind::Stream
    } else {
        WaterKind::Minor
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("properties must be an object"),
        }
    }

    #[test]
    fn builtin_loads() {
        let ontology = Ontology::builtin().unwrap();
        assert_eq!(ontology.rules().len(), 5);
        assert_eq!(ontology.rules()[0].layer, SemanticLayer::Water);
    }

    #[test]
    fn motorway_is_a_road() {
        let ontology = Ontology::builtin().unwrap();
        let properties = props(json!({"highway": "motorway"}));
        assert_eq!(
            ontology.classify(&properties, GeometryType::LineString),
            Some(SemanticLayer::Road)
        );
        assert_eq!(road_class(&properties), LayerKind::Motorway);
    }

    #[test]
    fn river_is_water() {
        let ontology = Ontology::builtin().unwrap();
        let properties = props(json!({"waterway": "river"}));
        assert_eq!(
            ontology.classify(&properties, GeometryType::LineString),
            Some(SemanticLayer::Water)
        );
        assert_eq!(water_kind(&properties), WaterKind::River);
    }

    #[test]
    fn unmatched_point_falls_back() {
        let ontology = Ontology::builtin().unwrap();
        let properties = props(json!({"name": "Somewhere"}));
        assert_eq!(
            ontology.classify(&properties, GeometryType::Point),
            Some(SemanticLayer::Point)
        );
        assert_eq!(ontology.classify(&properties, GeometryType::Polygon), None);
        assert_eq!(ontology.classify(&Properties::new(), GeometryType::LineString), None);
    }

    #[test]
    fn substring_and_case_insensitive() {
        let ontology = Ontology::new(vec![ClassificationRule {
            layer: SemanticLayer::Road,
            matchers: vec![PropertyMatcher::new("kind", ["Primary"])],
        }]);
        let properties = props(json!({"kind": "  PRIMARY Road "}));
        assert_eq!(
            ontology.classify(&properties, GeometryType::LineString),
            Some(SemanticLayer::Road)
        );
    }

    #[test]
    fn first_match_wins() {
        let ontology = Ontology::new(vec![
            ClassificationRule {
                layer: SemanticLayer::Park,
                matchers: vec![PropertyMatcher::new("name", ["park"])],
            },
            ClassificationRule {
                layer: SemanticLayer::Water,
                matchers: vec![PropertyMatcher::new("name", ["lake"])],
            },
        ]);
        let properties = props(json!({"name": "Lake Park"}));
        assert_eq!(
            ontology.classify(&properties, GeometryType::Polygon),
            Some(SemanticLayer::Park)
        );
    }

    #[test]
    fn road_classes() {
        let cases = [
            ("trunk_link", LayerKind::Motorway),
            ("primary_link", LayerKind::Primary),
            ("secondary", LayerKind::Secondary),
            ("living_street", LayerKind::Street),
            ("cycleway", LayerKind::Minor),
            ("bridleway", LayerKind::Street),
        ];
        for (highway, expected) in cases {
            assert_eq!(road_class(&props(json!({ "highway": highway }))), expected, "{highway}");
        }
        assert_eq!(road_class(&Properties::new()), LayerKind::Street);
    }

    #[test]
    fn water_kinds() {
        assert_eq!(water_kind(&props(json!({"objeto": "Río Paraná"}))), WaterKind::River);
        assert_eq!(water_kind(&props(json!({"objeto": "Arroyo Ludueña"}))), WaterKind::Stream);
        assert_eq!(water_kind(&props(json!({"waterway": "stream"}))), WaterKind::Stream);
        assert_eq!(water_kind(&props(json!({"natural": "water"}))), WaterKind::Minor);
    }

    #[test]
    fn invalid_ontology() {
        assert!(matches!(
            Ontology::from_json(r#"{"rules": [{"layer": "lava", "matchers": []}]}"#),
            Err(GisError::InvalidStyle(_))
        ));
    }
}
