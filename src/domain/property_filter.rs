//! Per-kind property filters evaluated directly on entity labels.
//!
//! Each filter is built for one entity variant and lifted to [`ModelEntity`], so entities
//! of other kinds are rejected instead of faulting.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::domain::entity::{Diagram, Element, EntityData, EntityVariant, ModelEntity, Package};
use crate::domain::facet_filter::DisplayLabels;
use crate::domain::filter::Filter;

/// `Or(name, ...)` over the distinct values of a property among entities of kind `V`.
///
/// Leaves are named and ordered by `describe(value)`.
pub fn property_filter<'e, V, P, S, D>(
    name: impl Into<String>,
    entities: impl IntoIterator<Item = &'e ModelEntity>,
    select: S,
    describe: D,
) -> Filter<ModelEntity>
where
    V: EntityVariant,
    P: Ord + Send + Sync + 'static,
    S: Fn(&V) -> P + Clone + Send + Sync + 'static,
    D: Fn(&P) -> String,
{
    let values: BTreeSet<P> = entities
        .into_iter()
        .filter_map(V::project)
        .map(&select)
        .collect();

    let leaves = values
        .into_iter()
        .map(|value| (describe(&value), value))
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(description, value)| {
            let select = select.clone();
            Filter::<V>::leaf(description, move |entity: &V| select(entity) == value)
                .lift(V::project)
        })
        .collect::<Vec<_>>();

    Filter::or(name, leaves)
}

/// Plain string property; `""` is shown as the empty label.
fn string_property<'e, V, S>(
    name: &str,
    entities: impl IntoIterator<Item = &'e ModelEntity>,
    select: S,
    labels: &DisplayLabels,
) -> Filter<ModelEntity>
where
    V: EntityVariant,
    S: Fn(&V) -> String + Clone + Send + Sync + 'static,
{
    property_filter::<V, _, _, _>(name, entities, select, |value: &String| {
        labels.display(value).to_string()
    })
}

/// `Or("Keyword", ...)` over the union of keywords of entities of kind `V`.
pub fn keyword_filter<'e, V: EntityVariant>(
    entities: impl IntoIterator<Item = &'e ModelEntity>,
    labels: &DisplayLabels,
) -> Filter<ModelEntity> {
    let keywords: BTreeSet<String> = entities
        .into_iter()
        .filter_map(V::project)
        .flat_map(V::keywords)
        .collect();

    let leaves = keywords
        .into_iter()
        .map(|keyword| {
            let name = labels.display(&keyword).to_string();
            Filter::<V>::leaf(name, move |entity: &V| entity.keywords().contains(&keyword))
                .lift(V::project)
        })
        .collect::<Vec<_>>();

    Filter::or("Keyword", leaves)
}

/// `Or(tag, ...)` over the values of one tagged value; missing tags get the none label.
pub fn tagged_value_filter<'e, V: EntityVariant>(
    tag: &str,
    entities: impl IntoIterator<Item = &'e ModelEntity>,
    labels: &DisplayLabels,
) -> Filter<ModelEntity> {
    let key = tag.to_string();
    property_filter::<V, _, _, _>(
        tag,
        entities,
        move |entity: &V| entity.tagged_value(&key).map(str::to_string),
        |value: &Option<String>| match value {
            None => labels.none.clone(),
            Some(v) => labels.display(v).to_string(),
        },
    )
}

/// `Metatype`, `Type` and `Stereotype` filters of elements and diagrams.
fn common_properties<'e, V, I>(entities: I, labels: &DisplayLabels) -> Vec<Filter<ModelEntity>>
where
    V: EntityVariant,
    I: IntoIterator<Item = &'e ModelEntity> + Clone,
{
    let properties: [(&str, fn(&EntityData) -> &str); 3] = [
        ("Metatype", |d| &d.meta_type),
        ("Type", |d| &d.type_name),
        ("Stereotype", |d| &d.stereotype),
    ];
    properties
        .into_iter()
        .map(|(name, field)| {
            let select = move |v: &V| field(v.data()).to_string();
            string_property::<V, _>(name, entities.clone(), select, labels)
        })
        .collect()
}

/// Filter grouping properties by entity kind.
///
/// `Or` over `Elements`, `Diagrams` and `Packages`, each an `And` over that kind's
/// property filters. Connectors are never accepted on their own.
pub fn kind_filter<'e, I>(
    entities: I,
    tags: &[String],
    labels: &DisplayLabels,
) -> Filter<ModelEntity>
where
    I: IntoIterator<Item = &'e ModelEntity> + Clone,
{
    let mut element_filters = common_properties::<Element, _>(entities.clone(), labels);
    element_filters.push(keyword_filter::<Element>(entities.clone(), labels));
    element_filters.extend(
        tags.iter()
            .map(|tag| tagged_value_filter::<Element>(tag, entities.clone(), labels)),
    );

    let diagram_filters = common_properties::<Diagram, _>(entities.clone(), labels);

    let package_filters = vec![keyword_filter::<Package>(entities, labels)];

    Filter::or(
        "",
        [
            Filter::and("Elements", element_filters),
            Filter::and("Diagrams", diagram_filters),
            Filter::and("Packages", package_filters),
        ],
    )
}
