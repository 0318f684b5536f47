//! Extension traits for component lists.
//!
//! A [`Document`](crate::types::Document) is a plain `Vec<Component>`, so
//! lookups that every layer needs (find by id, position, tree walk) live
//! here as methods on `[Component]`. The rest of the crate imports these
//! from `crate::types::*` so they're always in scope.

use crate::types::component::Component;
use crate::types::id::ComponentId;

// ===========================================================================
// DocumentExt
// ===========================================================================

/// Convenience methods on a slice of root components.
pub trait DocumentExt {
    /// The root-level node addressed by `id`.
    fn find_by_id(&self, id: &ComponentId) -> Option<&Component>;

    /// Index of the root-level node addressed by `id`.
    fn position_of(&self, id: &ComponentId) -> Option<usize>;

    /// Ids of the addressable root-level nodes, in order.
    fn ids(&self) -> Vec<ComponentId>;

    /// Depth-first pre-order walk over roots and their children.
    fn walk(&self) -> Vec<&Component>;

    /// Total node count including nested children.
    fn count_nodes(&self) -> usize {
        self.walk().len()
    }

    /// Search the whole tree (roots and children) for `id`.
    fn find_in_tree(&self, id: &ComponentId) -> Option<&Component> {
        self.walk().into_iter().find(|c| c.has_id(id))
    }
}

impl DocumentExt for [Component] {
    fn find_by_id(&self, id: &ComponentId) -> Option<&Component> {
        self.iter().find(|c| c.has_id(id))
    }

    fn position_of(&self, id: &ComponentId) -> Option<usize> {
        self.iter().position(|c| c.has_id(id))
    }

    fn ids(&self) -> Vec<ComponentId> {
        self.iter().filter_map(|c| c.id().cloned()).collect()
    }

    fn walk(&self) -> Vec<&Component> {
        fn visit<'a>(nodes: &'a [Component], out: &mut Vec<&'a Component>) {
            for node in nodes {
                out.push(node);
                if let Some(children) = node.children() {
                    visit(children, out);
                }
            }
        }

        let mut out = Vec::new();
        visit(self, &mut out);
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builders::{action_row, button, container, text_display};
    use crate::types::component::ButtonStyle;

    fn doc() -> Vec<Component> {
        vec![
            text_display("a").with_id("t1"),
            container(
                None,
                vec![action_row(vec![
                    button(ButtonStyle::Primary, "x", "x").with_id("b1")
                ])
                .with_id("r1")],
            )
            .with_id("c1"),
        ]
    }

    #[test]
    fn find_and_position() {
        let doc = doc();
        assert_eq!(doc.position_of(&"c1".into()), Some(1));
        assert!(doc.find_by_id(&"t1".into()).is_some());
        // Root lookups don't descend.
        assert!(doc.find_by_id(&"b1".into()).is_none());
        assert!(doc.find_in_tree(&"b1".into()).is_some());
    }

    #[test]
    fn walk_is_preorder() {
        let doc = doc();
        let ids: Vec<&str> = doc
            .walk()
            .into_iter()
            .filter_map(|c| c.id().map(ComponentId::as_str))
            .collect();
        assert_eq!(ids, ["t1", "c1", "r1", "b1"]);
        assert_eq!(doc.count_nodes(), 4);
    }

    #[test]
    fn ids_skip_unaddressable_nodes() {
        let mut doc = doc();
        doc.push(crate::types::Component::Separator(Default::default()));
        assert_eq!(doc.ids().len(), 2);
    }
}
