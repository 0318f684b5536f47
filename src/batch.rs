//! Bulk operations over a root component list.
//!
//! Everything here is a pure function of its inputs: nothing touches a
//! store. Feed the result to [`DocumentStore::replace_all`] to make it an
//! undoable step.
//!
//! [`DocumentStore::replace_all`]: crate::store::DocumentStore::replace_all

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::*;
use crate::validation;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOperationResult {
    pub success: bool,
    pub affected: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchDelete {
    pub remaining: Document,
    pub deleted_count: usize,
}

impl BatchDelete {
    pub fn outcome(&self) -> BatchOperationResult {
        BatchOperationResult {
            success: true,
            affected: self.deleted_count,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Type,
    Id,
    /// Ids embed their creation time, so this orders by id.
    Created,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatistics {
    pub total: usize,
    pub by_type: BTreeMap<ComponentType, usize>,
    pub interactive: usize,
    /// Roots that fail validation.
    pub with_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub count: usize,
    /// 0 to 100.
    pub percentage: f64,
}

fn id_set(ids: &[ComponentId]) -> HashSet<&ComponentId> {
    ids.iter().collect()
}

fn selected(component: &Component, ids: &HashSet<&ComponentId>) -> bool {
    component.id().is_some_and(|id| ids.contains(id))
}

// ===========================================================================
// Operations
// ===========================================================================

pub fn batch_delete(components: &[Component], ids: &[ComponentId]) -> BatchDelete {
    let ids = id_set(ids);
    let remaining: Document = components
        .iter()
        .filter(|c| !selected(c, &ids))
        .cloned()
        .collect();
    BatchDelete {
        deleted_count: components.len() - remaining.len(),
        remaining,
    }
}

/// Overwrite one wire field on every matched node.
///
/// A node the new value can't apply to (wrong JSON type for the field, or an
/// attempt to change `id`/`type`) is left as it was.
pub fn batch_update(components: &[Component], ids: &[ComponentId], field: &str, value: Value) -> Document {
    let ids = id_set(ids);
    let mut patch = Map::new();
    patch.insert(field.to_string(), value);

    components
        .iter()
        .map(|component| {
            if !selected(component, &ids) {
                return component.clone();
            }
            component.merge_patch(&patch).unwrap_or_else(|e| {
                warn!(id = ?component.id(), field, error = %e, "batch update skipped component");
                component.clone()
            })
        })
        .collect()
}

/// Deep copies of the matched nodes, in document order. Only the copies are
/// returned; append them to keep the originals.
pub fn batch_duplicate(components: &[Component], ids: &[ComponentId]) -> Document {
    let ids = id_set(ids);
    components
        .iter()
        .filter(|c| selected(c, &ids))
        .map(Component::duplicate)
        .collect()
}

/// Pull the matched nodes out and splice them back in at `target_index` of
/// the remainder, keeping their relative order.
pub fn batch_move(components: &[Component], ids: &[ComponentId], target_index: usize) -> Document {
    let ids = id_set(ids);
    let (moved, mut remaining): (Document, Document) = components
        .iter()
        .cloned()
        .partition(|c| selected(c, &ids));

    let at = target_index.min(remaining.len());
    remaining.splice(at..at, moved);
    remaining
}

/// Stable sort. Nodes without an id sort as an empty id.
pub fn sort_components(components: &[Component], key: SortKey, order: SortOrder) -> Document {
    fn id_of(c: &Component) -> &str {
        c.id().map(ComponentId::as_str).unwrap_or("")
    }
    let mut sorted = components.to_vec();
    sorted.sort_by(|a, b| {
        let ordering: Ordering = match key {
            SortKey::Type => a.kind().tag().cmp(&b.kind().tag()),
            SortKey::Id | SortKey::Created => id_of(a).cmp(id_of(b)),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

// ===========================================================================
// Queries
// ===========================================================================

pub fn filter_by_type(components: &[Component], kinds: &[ComponentType]) -> Document {
    components
        .iter()
        .filter(|c| kinds.contains(&c.kind()))
        .cloned()
        .collect()
}

pub fn group_by_type(components: &[Component]) -> BTreeMap<ComponentType, Document> {
    let mut groups: BTreeMap<ComponentType, Document> = BTreeMap::new();
    for component in components {
        groups.entry(component.kind()).or_default().push(component.clone());
    }
    groups
}

/// Buttons and string selects at the root level.
pub fn filter_interactive(components: &[Component]) -> Document {
    components
        .iter()
        .filter(|c| c.is_interactive())
        .cloned()
        .collect()
}

/// Nodes whose id matches `pattern`. Unaddressable nodes never match.
pub fn filter_by_id_pattern(components: &[Component], pattern: &Regex) -> Document {
    components
        .iter()
        .filter(|c| c.id().is_some_and(|id| pattern.is_match(id.as_str())))
        .cloned()
        .collect()
}

pub fn statistics(components: &[Component]) -> ComponentStatistics {
    let mut stats = ComponentStatistics {
        total: components.len(),
        ..Default::default()
    };
    for component in components {
        *stats.by_type.entry(component.kind()).or_default() += 1;
        if component.is_interactive() {
            stats.interactive += 1;
        }
        if !validation::validate(component).valid {
            stats.with_errors += 1;
        }
    }
    stats
}

/// Share of each root type, ordered by type tag.
pub fn type_distribution(components: &[Component]) -> Vec<TypeShare> {
    let stats = statistics(components);
    stats
        .by_type
        .into_iter()
        .map(|(kind, count)| TypeShare {
            kind,
            count,
            percentage: if stats.total > 0 {
                count as f64 / stats.total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(list: &[&str]) -> Vec<ComponentId> {
        list.iter().map(|s| ComponentId::new(*s)).collect()
    }

    fn order(components: &[Component]) -> Vec<String> {
        components
            .iter()
            .map(|c| c.id().map(|id| id.to_string()).unwrap_or_default())
            .collect()
    }

    fn mixed() -> Document {
        vec![
            text_display("one").with_id("1"),
            button(ButtonStyle::Primary, "b", "b").with_id("2"),
            text_display("three").with_id("3"),
            separator(SeparatorSpacing::Small, true).with_id("4"),
        ]
    }

    #[test]
    fn delete_by_ids() {
        let nodes = vec![
            text_display("A").with_id("1"),
            text_display("B").with_id("2"),
            text_display("C").with_id("3"),
        ];
        let result = batch_delete(&nodes, &ids(&["1", "3"]));
        assert_eq!(order(&result.remaining), ["2"]);
        assert_eq!(result.deleted_count, 2);
        assert_eq!(result.outcome().affected, 2);
    }

    #[test]
    fn delete_of_missing_ids_is_silent() {
        let result = batch_delete(&mixed(), &ids(&["nope"]));
        assert_eq!(result.deleted_count, 0);
        assert_eq!(result.remaining.len(), 4);
    }

    #[test]
    fn update_touches_matched_nodes_only() {
        let nodes = vec![
            button(ButtonStyle::Primary, "a", "a").with_id("a"),
            button(ButtonStyle::Primary, "b", "b").with_id("b"),
        ];
        let updated = batch_update(&nodes, &ids(&["b"]), "disabled", json!(true));
        match (&updated[0], &updated[1]) {
            (Component::Button(a), Component::Button(b)) => {
                assert!(!a.disabled);
                assert!(b.disabled);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn update_with_bad_value_leaves_node() {
        let nodes = vec![button(ButtonStyle::Primary, "a", "a").with_id("a")];
        let updated = batch_update(&nodes, &ids(&["a"]), "label", json!(42));
        assert_eq!(updated, nodes);
        let updated = batch_update(&nodes, &ids(&["a"]), "id", json!("x"));
        assert_eq!(updated, nodes);
    }

    #[test]
    fn duplicate_returns_only_copies() {
        let copies = batch_duplicate(&mixed(), &ids(&["3", "1"]));
        assert_eq!(copies.len(), 2);
        let names = order(&copies);
        assert!(names[0].starts_with("1_copy_"));
        assert!(names[1].starts_with("3_copy_"));
    }

    #[test]
    fn duplicate_twice_never_collides() {
        let nodes = mixed();
        let first = batch_duplicate(&nodes, &ids(&["1"]));
        let second = batch_duplicate(&nodes, &ids(&["1"]));
        assert_ne!(first[0].id(), second[0].id());
    }

    #[test]
    fn move_keeps_relative_order() {
        let moved = batch_move(&mixed(), &ids(&["4", "1"]), 1);
        assert_eq!(order(&moved), ["2", "1", "4", "3"]);

        let to_end = batch_move(&mixed(), &ids(&["2"]), 99);
        assert_eq!(order(&to_end), ["1", "3", "4", "2"]);
    }

    #[test]
    fn sort_is_stable_both_ways() {
        let by_type = sort_components(&mixed(), SortKey::Type, SortOrder::Asc);
        assert_eq!(order(&by_type), ["2", "1", "3", "4"]);

        let desc = sort_components(&mixed(), SortKey::Type, SortOrder::Desc);
        assert_eq!(order(&desc), ["4", "1", "3", "2"]);

        let input = mixed();
        let by_id = sort_components(&input, SortKey::Id, SortOrder::Desc);
        assert_eq!(order(&by_id), ["4", "3", "2", "1"]);
        // Input untouched.
        assert_eq!(order(&input), ["1", "2", "3", "4"]);
    }

    #[test]
    fn queries() {
        let nodes = mixed();
        assert_eq!(order(&filter_by_type(&nodes, &[ComponentType::TextDisplay])), ["1", "3"]);
        assert_eq!(order(&filter_interactive(&nodes)), ["2"]);

        let groups = group_by_type(&nodes);
        assert_eq!(groups[&ComponentType::TextDisplay].len(), 2);
        assert_eq!(groups.len(), 3);

        let pattern = Regex::new("^[13]$").unwrap();
        assert_eq!(order(&filter_by_id_pattern(&nodes, &pattern)), ["1", "3"]);
    }

    #[test]
    fn statistics_count_errors() {
        let mut nodes = mixed();
        nodes.push(Component::Button(Button::default()));
        let stats = statistics(&nodes);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.interactive, 2);
        assert_eq!(stats.with_errors, 1);
        assert_eq!(stats.by_type[&ComponentType::Button], 2);
    }

    #[test]
    fn distribution_sums_to_hundred() {
        let shares = type_distribution(&mixed());
        let total: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(shares[0].kind, ComponentType::Button);
        assert!(type_distribution(&[]).is_empty());
    }
}
