//! Hierarchy builder: turns an entity containment source into a labeled tree.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, instrument, trace};

use crate::domain::entity::{Connector, Diagram, Element, ModelEntity, Package};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tree::{Edge, LabeledTree};

/// Kind of containment an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Containment {
    Element,
    Diagram,
    Package,
    Connector,
}

impl fmt::Display for Containment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Containment::Element => "element",
            Containment::Diagram => "diagram",
            Containment::Package => "package",
            Containment::Connector => "connector",
        };
        f.write_str(s)
    }
}

/// The model hierarchy as consumed by the filtering pipeline.
pub type EntityTree = LabeledTree<ModelEntity, Containment>;

/// Direct contents of one package.
#[derive(Debug, Clone, Default)]
pub struct PackageContents {
    /// Elements with the connectors they own
    pub elements: Vec<(Element, Vec<Connector>)>,
    pub diagrams: Vec<Diagram>,
    pub packages: Vec<Package>,
}

/// Entity hierarchy source (the host model).
pub trait EntitySource {
    fn contents(&self, package: &Package) -> DomainResult<PackageContents>;

    /// Name of the entity with the given GUID, anywhere in the model.
    fn resolve_name(&self, _guid: &str) -> Option<String> {
        None
    }
}

/// Constructs entity trees from an [`EntitySource`].
pub struct HierarchyBuilder<'a, S: ?Sized> {
    source: &'a S,
    seen: HashSet<String>,
    path: Vec<String>,
}

impl<'a, S: EntitySource + ?Sized> HierarchyBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            seen: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Build the containment tree below `root`.
    ///
    /// Children are ordered elements (each with its connectors beneath it), then
    /// diagrams, then sub-packages.
    #[instrument(level = "debug", skip_all, fields(root = %root.data.guid))]
    pub fn build(&mut self, root: Package) -> DomainResult<EntityTree> {
        self.seen.clear();
        self.path.clear();
        let tree = self.build_package(root)?;
        debug!(nodes = tree.len(), depth = tree.depth(), "built hierarchy");
        Ok(tree)
    }

    fn build_package(&mut self, package: Package) -> DomainResult<EntityTree> {
        let guid = package.data.guid.clone();
        if self.path.contains(&guid) {
            return Err(DomainError::CycleDetected(guid));
        }
        self.register(&guid)?;
        self.path.push(guid);
        trace!(package = %package.data.name, "visiting package");

        let contents = self.source.contents(&package)?;
        let mut edges = Vec::new();

        for (element, connectors) in contents.elements {
            self.register(&element.data.guid)?;
            let mut connector_edges = Vec::with_capacity(connectors.len());
            for connector in connectors {
                self.register(&connector.data.guid)?;
                connector_edges.push(Edge::new(
                    Containment::Connector,
                    LabeledTree::leaf(ModelEntity::Connector(connector)),
                ));
            }
            edges.push(Edge::new(
                Containment::Element,
                LabeledTree::node(ModelEntity::Element(element), connector_edges),
            ));
        }

        for diagram in contents.diagrams {
            self.register(&diagram.data.guid)?;
            edges.push(Edge::new(
                Containment::Diagram,
                LabeledTree::leaf(ModelEntity::Diagram(diagram)),
            ));
        }

        for sub in contents.packages {
            let subtree = self.build_package(sub)?;
            edges.push(Edge::new(Containment::Package, subtree));
        }

        self.path.pop();
        Ok(LabeledTree::node(ModelEntity::Package(package), edges))
    }

    fn register(&mut self, guid: &str) -> DomainResult<()> {
        if guid.is_empty() {
            return Err(DomainError::InvalidEntity {
                guid: guid.to_string(),
                message: "missing GUID".to_string(),
            });
        }
        if !self.seen.insert(guid.to_string()) {
            return Err(DomainError::DuplicateEntity(guid.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityData;
    use std::collections::HashMap;

    /// Source backed by a map from package GUID to its contents.
    #[derive(Default)]
    struct MapSource {
        contents: HashMap<String, PackageContents>,
    }

    impl EntitySource for MapSource {
        fn contents(&self, package: &Package) -> DomainResult<PackageContents> {
            Ok(self
                .contents
                .get(&package.data.guid)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn package(guid: &str) -> Package {
        Package {
            data: EntityData::new(guid, guid),
        }
    }

    fn element(guid: &str) -> Element {
        Element {
            data: EntityData::new(guid, guid),
        }
    }

    #[test]
    fn test_children_ordered_elements_diagrams_packages() {
        let mut source = MapSource::default();
        source.contents.insert(
            "root".into(),
            PackageContents {
                elements: vec![(element("e1"), vec![])],
                diagrams: vec![Diagram {
                    data: EntityData::new("d1", "d1"),
                    style: String::new(),
                }],
                packages: vec![package("p1")],
            },
        );

        let tree = HierarchyBuilder::new(&source).build(package("root")).unwrap();
        let kinds: Vec<_> = tree.edges().map(|(c, _)| *c).collect();
        assert_eq!(
            kinds,
            vec![Containment::Element, Containment::Diagram, Containment::Package]
        );
    }

    #[test]
    fn test_connectors_hang_below_their_element() {
        let mut source = MapSource::default();
        source.contents.insert(
            "root".into(),
            PackageContents {
                elements: vec![(
                    element("e1"),
                    vec![Connector {
                        data: EntityData::new("c1", ""),
                        source: "e1".into(),
                        target: "e2".into(),
                    }],
                )],
                ..Default::default()
            },
        );

        let tree = HierarchyBuilder::new(&source).build(package("root")).unwrap();
        let (_, e1) = tree.edges().next().unwrap();
        let (label, c1) = e1.edges().next().unwrap();
        assert_eq!(*label, Containment::Connector);
        assert_eq!(c1.label().guid(), "c1");
    }

    #[test]
    fn test_self_containing_package_is_a_cycle() {
        let mut source = MapSource::default();
        source.contents.insert(
            "root".into(),
            PackageContents {
                packages: vec![package("child")],
                ..Default::default()
            },
        );
        source.contents.insert(
            "child".into(),
            PackageContents {
                packages: vec![package("root")],
                ..Default::default()
            },
        );

        let result = HierarchyBuilder::new(&source).build(package("root"));
        assert!(matches!(result, Err(DomainError::CycleDetected(g)) if g == "root"));
    }

    #[test]
    fn test_duplicate_element_is_rejected() {
        let mut source = MapSource::default();
        source.contents.insert(
            "root".into(),
            PackageContents {
                elements: vec![(element("e1"), vec![]), (element("e1"), vec![])],
                ..Default::default()
            },
        );

        let result = HierarchyBuilder::new(&source).build(package("root"));
        assert!(matches!(result, Err(DomainError::DuplicateEntity(g)) if g == "e1"));
    }
}
