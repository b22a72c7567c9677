//! Model entities: the node labels of an exported hierarchy.
//!
//! `ModelEntity` is a closed sum over the four entity kinds. Code that needs
//! kind-specific behavior matches exhaustively instead of testing types at runtime.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Properties shared by all entity kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityData {
    pub id: i64,
    pub guid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "metatype")]
    pub meta_type: String,
    pub stereotype: String,
    /// Raw keyword string, separated by `,` or `;`
    pub tags: String,
    pub tagged_values: BTreeMap<String, String>,
}

impl EntityData {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_meta_type(mut self, meta_type: impl Into<String>) -> Self {
        self.meta_type = meta_type.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_tagged_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tagged_values.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub data: EntityData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub data: EntityData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub data: EntityData,
    /// Extended style string, e.g. `MDGDgm=AD::ProblemSpace;...`
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    pub data: EntityData,
    /// GUID of the source element
    pub source: String,
    /// GUID of the target element
    pub target: String,
}

/// Technology and diagram type encoded in a diagram's style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramType {
    pub technology: String,
    pub name: String,
}

impl Diagram {
    pub fn diagram_type(&self) -> Option<DiagramType> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"MDGDgm=(?<technology>\w+)::(?<diagram_type>\w+)").expect("valid regex")
        });
        let caps = pattern.captures(&self.style)?;
        Some(DiagramType {
            technology: caps["technology"].to_string(),
            name: caps["diagram_type"].to_string(),
        })
    }
}

/// Entity kinds, in the order used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EntityKind {
    Package,
    Element,
    Diagram,
    Connector,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Package => "Package",
            EntityKind::Element => "Element",
            EntityKind::Diagram => "Diagram",
            EntityKind::Connector => "Connector",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum ModelEntity {
    Package(Package),
    Element(Element),
    Diagram(Diagram),
    Connector(Connector),
}

impl ModelEntity {
    pub fn data(&self) -> &EntityData {
        match self {
            ModelEntity::Package(p) => &p.data,
            ModelEntity::Element(e) => &e.data,
            ModelEntity::Diagram(d) => &d.data,
            ModelEntity::Connector(c) => &c.data,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            ModelEntity::Package(_) => EntityKind::Package,
            ModelEntity::Element(_) => EntityKind::Element,
            ModelEntity::Diagram(_) => EntityKind::Diagram,
            ModelEntity::Connector(_) => EntityKind::Connector,
        }
    }

    pub fn entity_type(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn guid(&self) -> &str {
        &self.data().guid
    }

    pub fn name(&self) -> &str {
        &self.data().name
    }

    pub fn type_name(&self) -> &str {
        &self.data().type_name
    }

    pub fn meta_type(&self) -> &str {
        &self.data().meta_type
    }

    pub fn stereotype(&self) -> &str {
        &self.data().stereotype
    }

    /// Value of a tagged value by name. Diagrams carry no tagged values.
    pub fn tagged_value(&self, name: &str) -> Option<&str> {
        match self {
            ModelEntity::Package(p) => p.tagged_value(name),
            ModelEntity::Element(e) => e.tagged_value(name),
            ModelEntity::Diagram(d) => d.tagged_value(name),
            ModelEntity::Connector(c) => c.tagged_value(name),
        }
    }

    /// Keywords of packages and elements: split on `,`/`;`, trimmed, lowercased.
    pub fn keywords(&self) -> BTreeSet<String> {
        match self {
            ModelEntity::Package(p) => p.keywords(),
            ModelEntity::Element(e) => e.keywords(),
            ModelEntity::Diagram(d) => d.keywords(),
            ModelEntity::Connector(c) => c.keywords(),
        }
    }

}

impl PartialEq for ModelEntity {
    fn eq(&self, other: &Self) -> bool {
        self.guid() == other.guid()
    }
}

impl Eq for ModelEntity {}

impl Hash for ModelEntity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid().hash(state);
    }
}

impl fmt::Display for ModelEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.meta_type().is_empty() {
            write!(f, "{}: {}", self.entity_type(), self.name())
        } else {
            write!(f, "{}: <<{}>> {}", self.entity_type(), self.meta_type(), self.name())
        }
    }
}

fn split_keywords(tags: &str) -> BTreeSet<String> {
    tags.split([',', ';']).map(|w| w.trim().to_lowercase()).collect()
}

/// A single variant of [`ModelEntity`], projectable from the sum type.
pub trait EntityVariant: Sized + Send + Sync + 'static {
    fn project(entity: &ModelEntity) -> Option<&Self>;

    fn data(&self) -> &EntityData;

    fn tagged_value(&self, name: &str) -> Option<&str> {
        self.data().tagged_values.get(name).map(String::as_str)
    }

    fn keywords(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

impl EntityVariant for Package {
    fn project(entity: &ModelEntity) -> Option<&Self> {
        match entity {
            ModelEntity::Package(p) => Some(p),
            _ => None,
        }
    }

    fn data(&self) -> &EntityData {
        &self.data
    }

    fn keywords(&self) -> BTreeSet<String> {
        split_keywords(&self.data.tags)
    }
}

impl EntityVariant for Element {
    fn project(entity: &ModelEntity) -> Option<&Self> {
        match entity {
            ModelEntity::Element(e) => Some(e),
            _ => None,
        }
    }

    fn data(&self) -> &EntityData {
        &self.data
    }

    fn keywords(&self) -> BTreeSet<String> {
        split_keywords(&self.data.tags)
    }
}

impl EntityVariant for Diagram {
    fn project(entity: &ModelEntity) -> Option<&Self> {
        match entity {
            ModelEntity::Diagram(d) => Some(d),
            _ => None,
        }
    }

    fn data(&self) -> &EntityData {
        &self.data
    }

    fn tagged_value(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl EntityVariant for Connector {
    fn project(entity: &ModelEntity) -> Option<&Self> {
        match entity {
            ModelEntity::Connector(c) => Some(c),
            _ => None,
        }
    }

    fn data(&self) -> &EntityData {
        &self.data
    }
}

impl From<Package> for ModelEntity {
    fn from(p: Package) -> Self {
        ModelEntity::Package(p)
    }
}

impl From<Element> for ModelEntity {
    fn from(e: Element) -> Self {
        ModelEntity::Element(e)
    }
}

impl From<Diagram> for ModelEntity {
    fn from(d: Diagram) -> Self {
        ModelEntity::Diagram(d)
    }
}

impl From<Connector> for ModelEntity {
    fn from(c: Connector) -> Self {
        ModelEntity::Connector(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tags: &str) -> ModelEntity {
        ModelEntity::Element(Element {
            data: EntityData::new("{E1}", "Choose DB")
                .with_meta_type("adProblem")
                .with_tags(tags),
        })
    }

    #[test]
    fn test_display_includes_meta_type() {
        assert_eq!(element("").to_string(), "Element: <<adProblem>> Choose DB");
        let pkg = ModelEntity::Package(Package {
            data: EntityData::new("{P}", "Root"),
        });
        assert_eq!(pkg.to_string(), "Package: Root");
    }

    #[test]
    fn test_keywords_split_trim_lowercase() {
        let keywords = element(" Storage; SQL ,db").keywords();
        assert_eq!(
            keywords.into_iter().collect::<Vec<_>>(),
            vec!["db", "sql", "storage"]
        );
    }

    #[test]
    fn test_diagram_has_no_tagged_values() {
        let diagram = ModelEntity::Diagram(Diagram {
            data: EntityData::new("{D}", "Overview").with_tagged_value("Stage", "Draft"),
            style: String::new(),
        });
        assert_eq!(diagram.tagged_value("Stage"), None);
    }

    #[test]
    fn test_diagram_type_parsed_from_style() {
        let diagram = Diagram {
            data: EntityData::new("{D}", "Overview").with_type("Package"),
            style: "ShowTags=1;MDGDgm=AD::ProblemSpace;Hidden=0".to_string(),
        };
        assert_eq!(
            diagram.diagram_type(),
            Some(DiagramType {
                technology: "AD".to_string(),
                name: "ProblemSpace".to_string()
            })
        );
        assert_eq!(
            Diagram {
                style: "ShowTags=1".to_string(),
                ..diagram
            }
            .diagram_type(),
            None
        );
    }

    #[test]
    fn test_projection_matches_variant_only() {
        let e = element("");
        assert!(Element::project(&e).is_some());
        assert!(Package::project(&e).is_none());
        assert!(Diagram::project(&e).is_none());
    }

    #[test]
    fn test_equality_by_guid() {
        let a = element("x");
        let b = element("y");
        assert_eq!(a, b);
    }
}
