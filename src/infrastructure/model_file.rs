//! JSON model documents
//!
//! A model document holds the tagged-value vocabulary and the package hierarchy:
//!
//! ```json
//! {
//!   "vocabulary": [{ "name": "Stage", "type": "Enum", "values": ["Draft", "Final"] }],
//!   "root": {
//!     "guid": "{P1}", "name": "Problem Space",
//!     "elements": [{ "guid": "{E1}", "name": "Choose DB", "connectors": [] }],
//!     "diagrams": [],
//!     "packages": []
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::application::Vocabulary;
use crate::domain::{
    Connector, Diagram, DomainError, DomainResult, Element, EntityData, EntitySource, Package,
    PackageContents,
};
use crate::infrastructure::error::IoResultExt;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub vocabulary: Vocabulary,
    pub root: PackageDoc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageDoc {
    #[serde(flatten)]
    pub data: EntityData,
    #[serde(default)]
    pub elements: Vec<ElementDoc>,
    #[serde(default)]
    pub diagrams: Vec<DiagramDoc>,
    #[serde(default)]
    pub packages: Vec<PackageDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementDoc {
    #[serde(flatten)]
    pub data: EntityData,
    #[serde(default)]
    pub connectors: Vec<ConnectorDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagramDoc {
    #[serde(flatten)]
    pub data: EntityData,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorDoc {
    #[serde(flatten)]
    pub data: EntityData,
    pub source: String,
    pub target: String,
}

impl PackageDoc {
    fn package(&self) -> Package {
        Package {
            data: self.data.clone(),
        }
    }

    fn contents(&self) -> PackageContents {
        PackageContents {
            elements: self
                .elements
                .iter()
                .map(|e| {
                    let connectors = e
                        .connectors
                        .iter()
                        .map(|c| Connector {
                            data: c.data.clone(),
                            source: c.source.clone(),
                            target: c.target.clone(),
                        })
                        .collect();
                    (
                        Element {
                            data: e.data.clone(),
                        },
                        connectors,
                    )
                })
                .collect(),
            diagrams: self
                .diagrams
                .iter()
                .map(|d| Diagram {
                    data: d.data.clone(),
                    style: d.style.clone(),
                })
                .collect(),
            packages: self.packages.iter().map(PackageDoc::package).collect(),
        }
    }
}

impl ModelDocument {
    /// Load and parse a model document.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> InfraResult<Self> {
        debug!("load: path={}", path.display());
        let content = fs
            .read_to_string(path)
            .with_path_context("read model", path)?;
        Self::parse(&content).map_err(|message| InfraError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    pub fn root_package(&self) -> Package {
        self.root.package()
    }

    /// Entity hierarchy source over this document.
    pub fn source(&self) -> ModelSource<'_> {
        ModelSource::new(self)
    }
}

/// [`EntitySource`] backed by a parsed [`ModelDocument`].
pub struct ModelSource<'a> {
    packages: HashMap<&'a str, &'a PackageDoc>,
    names: HashMap<&'a str, &'a str>,
}

impl<'a> ModelSource<'a> {
    fn new(doc: &'a ModelDocument) -> Self {
        let mut source = Self {
            packages: HashMap::new(),
            names: HashMap::new(),
        };
        source.index(&doc.root);
        debug!(
            "ModelSource: packages={}, entities={}",
            source.packages.len(),
            source.names.len()
        );
        source
    }

    fn index(&mut self, package: &'a PackageDoc) {
        self.packages.insert(&package.data.guid, package);
        self.names.insert(&package.data.guid, &package.data.name);
        for element in &package.elements {
            self.names.insert(&element.data.guid, &element.data.name);
            for connector in &element.connectors {
                self.names.insert(&connector.data.guid, &connector.data.name);
            }
        }
        for diagram in &package.diagrams {
            self.names.insert(&diagram.data.guid, &diagram.data.name);
        }
        for sub in &package.packages {
            self.index(sub);
        }
    }

    /// Name of the entity with the given GUID.
    pub fn resolve(&self, guid: &str) -> Option<&'a str> {
        self.names.get(guid).copied()
    }
}

impl EntitySource for ModelSource<'_> {
    fn contents(&self, package: &Package) -> DomainResult<PackageContents> {
        self.packages
            .get(package.data.guid.as_str())
            .map(|doc| doc.contents())
            .ok_or_else(|| DomainError::UnknownPackage(package.data.guid.clone()))
    }

    fn resolve_name(&self, guid: &str) -> Option<String> {
        self.resolve(guid).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "vocabulary": [{"name": "Stage", "type": "Enum", "values": ["Draft"]}],
        "root": {
            "guid": "{P1}", "name": "Root",
            "elements": [{
                "guid": "{E1}", "name": "Choose DB", "metatype": "adProblem",
                "tagged_values": {"Stage": "Draft"},
                "connectors": [{"guid": "{C1}", "source": "{E1}", "target": "{E2}"}]
            }],
            "packages": [{"guid": "{P2}", "name": "Sub"}]
        }
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = ModelDocument::parse(MODEL).unwrap();
        assert_eq!(doc.vocabulary.definitions().len(), 1);
        assert_eq!(doc.root.elements[0].data.meta_type, "adProblem");
        assert_eq!(doc.root.elements[0].data.tagged_values["Stage"], "Draft");
        assert_eq!(doc.root.elements[0].connectors[0].target, "{E2}");
    }

    #[test]
    fn test_source_contents_and_resolve() {
        let doc = ModelDocument::parse(MODEL).unwrap();
        let source = doc.source();

        let contents = source.contents(&doc.root_package()).unwrap();
        assert_eq!(contents.elements.len(), 1);
        assert_eq!(contents.elements[0].1.len(), 1);
        assert_eq!(contents.packages[0].data.name, "Sub");
        assert_eq!(source.resolve("{E1}"), Some("Choose DB"));
        assert_eq!(source.resolve("{nope}"), None);
    }

    #[test]
    fn test_unknown_package_is_an_error() {
        let doc = ModelDocument::parse(MODEL).unwrap();
        let stranger = Package {
            data: EntityData::new("{X}", "Stranger"),
        };
        assert!(matches!(
            doc.source().contents(&stranger),
            Err(DomainError::UnknownPackage(g)) if g == "{X}"
        ));
    }
}
