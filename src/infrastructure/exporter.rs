//! JSON export of a tailored hierarchy

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::services::Exporter;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{EntityData, EntityKind, EntityTree, ModelEntity, Package};
use crate::infrastructure::traits::FileSystem;

/// One exported entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRecord<'a> {
    pub kind: EntityKind,
    #[serde(flatten)]
    pub data: &'a EntityData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'a str>,
}

impl<'a> From<&'a ModelEntity> for EntityRecord<'a> {
    fn from(entity: &'a ModelEntity) -> Self {
        let (style, source, target) = match entity {
            ModelEntity::Diagram(d) => (Some(d.style.as_str()), None, None),
            ModelEntity::Connector(c) => (None, Some(c.source.as_str()), Some(c.target.as_str())),
            ModelEntity::Package(_) | ModelEntity::Element(_) => (None, None, None),
        };
        Self {
            kind: entity.kind(),
            data: entity.data(),
            style,
            source,
            target,
        }
    }
}

/// Nested view of the exported hierarchy, referencing entities by GUID.
#[derive(Debug, Clone, Serialize)]
pub struct TreeRecord<'a> {
    pub guid: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeRecord<'a>>,
}

impl<'a> TreeRecord<'a> {
    fn build(tree: &'a EntityTree, containment: Option<String>) -> Self {
        Self {
            guid: tree.label().guid(),
            name: tree.label().name(),
            containment,
            children: tree
                .edges()
                .map(|(edge, child)| TreeRecord::build(child, Some(edge.to_string())))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument<'a> {
    pub exported_at: String,
    pub root: EntityRecord<'a>,
    /// Retained entities in pre-order
    pub entities: Vec<EntityRecord<'a>>,
    pub tree: TreeRecord<'a>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(tree: &'a EntityTree) -> Self {
        Self {
            exported_at: chrono::Local::now().to_rfc3339(),
            root: EntityRecord::from(tree.label()),
            entities: tree.iter().map(EntityRecord::from).collect(),
            tree: TreeRecord::build(tree, None),
        }
    }
}

/// Writes the retained hierarchy as a JSON document.
pub struct JsonExporter {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            fs,
            path: path.into(),
            pretty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `tree` without writing it.
    pub fn render(&self, tree: &EntityTree) -> ApplicationResult<String> {
        let document = ExportDocument::new(tree);
        let json = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        json.map_err(|e| ApplicationError::Export {
            message: format!("serialize export: {e}"),
        })
    }
}

impl Exporter for JsonExporter {
    fn export(&self, root: &Package, tree: &EntityTree) -> ApplicationResult<()> {
        debug!("export: root={}, path={}", root.data.name, self.path.display());
        let json = self.render(tree)?;

        let io_err = |action: &str, e: std::io::Error| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, self.path.display()),
            source: Box::new(e),
        };
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| io_err("create export directory", e))?;
        self.fs
            .write(&self.path, &json)
            .map_err(|e| io_err("write export", e))?;

        info!("exported {} entities to {}", tree.len(), self.path.display());
        Ok(())
    }
}
