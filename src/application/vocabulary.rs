//! Tagged-value vocabulary: which tagged values exist and how to read them as facets.

use serde::{Deserialize, Serialize};

use crate::domain::ModelEntity;

/// Type of a tagged value as declared by the modeling technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaggedValueType {
    String,
    Integer,
    Boolean,
    Enum {
        #[serde(default)]
        values: Vec<String>,
    },
    DateTime,
    Memo,
    Const {
        value: String,
    },
    #[serde(rename = "RefGUID")]
    RefGuid,
    #[serde(rename = "RefGUIDList")]
    RefGuidList,
}

impl TaggedValueType {
    pub fn type_name(&self) -> &'static str {
        match self {
            TaggedValueType::String => "String",
            TaggedValueType::Integer => "Integer",
            TaggedValueType::Boolean => "Boolean",
            TaggedValueType::Enum { .. } => "Enum",
            TaggedValueType::DateTime => "DateTime",
            TaggedValueType::Memo => "Memo",
            TaggedValueType::Const { .. } => "Const",
            TaggedValueType::RefGuid => "RefGUID",
            TaggedValueType::RefGuidList => "RefGUIDList",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedValueDefinition {
    pub name: String,
    #[serde(flatten)]
    pub value_type: TaggedValueType,
}

impl TaggedValueDefinition {
    pub fn new(name: impl Into<String>, value_type: TaggedValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// The tagged values declared for a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    definitions: Vec<TaggedValueDefinition>,
}

impl Vocabulary {
    pub fn new(definitions: Vec<TaggedValueDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[TaggedValueDefinition] {
        &self.definitions
    }

    /// Definitions whose type name is one of `facet_types`, in declaration order.
    pub fn facet_tags<S: AsRef<str>>(&self, facet_types: &[S]) -> Vec<&TaggedValueDefinition> {
        self.definitions
            .iter()
            .filter(|def| {
                facet_types
                    .iter()
                    .any(|t| t.as_ref() == def.value_type.type_name())
            })
            .collect()
    }
}

/// Values of tagged value `def` on `entity`.
///
/// References are resolved to the referenced entity's name; an unresolvable reference
/// keeps its raw GUID. A missing tagged value yields no values (the facet is absent),
/// which is distinct from a present but empty value.
pub fn collect_tagged_values<R>(
    entity: &ModelEntity,
    def: &TaggedValueDefinition,
    resolve: R,
) -> Vec<String>
where
    R: Fn(&str) -> Option<String>,
{
    let Some(raw) = entity.tagged_value(&def.name) else {
        return Vec::new();
    };
    let lookup = |guid: &str| resolve(guid).unwrap_or_else(|| guid.to_string());

    match def.value_type {
        TaggedValueType::RefGuid => vec![lookup(raw.trim())],
        TaggedValueType::RefGuidList => raw
            .split(',')
            .map(str::trim)
            .filter(|guid| !guid.is_empty())
            .map(lookup)
            .collect(),
        _ => vec![raw.to_string()],
    }
}
