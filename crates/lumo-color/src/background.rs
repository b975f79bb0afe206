// SPDX-License-Identifier: MIT
//
// Effective background resolution.
//
// A foreground sits on a stack of containers. Each container may paint
// nothing, a translucent wash, or an opaque fill. The color the eye actually
// sees behind the foreground is found by walking toward the root:
//
//   element        rgba(255, 0, 0, 0.5)   ← translucent, remembered
//   parent         transparent            ← skipped
//   grandparent    rgb(255, 255, 255)     ← opaque, walk stops
//
// The remembered translucent layers are then composited back down over the
// opaque ancestor, outermost first, rounding after every layer:
//
//   rgba(255, 0, 0, 0.5) over rgb(255, 255, 255) = rgb(255, 128, 128)
//
// If the root is reached without an opaque layer, there is nothing to
// composite onto and the result is `None`.
//
// The walk is iterative. Every ancestor is visited at most once, so a chain
// of N ancestors costs at most N + 1 background reads.

use tracing::debug;

use crate::color::{ColorRgba, is_transparent_keyword, parse_color};

// ─── Surface ─────────────────────────────────────────────────────────────────

/// A node in a host's container hierarchy, as seen by the resolver.
///
/// Hosts hand out cheap handles: `parent` returns an owned handle to the
/// containing node, or `None` at the root.
pub trait Surface: Sized {
    /// The node's own computed background, exactly as the host reports it.
    fn background(&self) -> Option<String>;

    /// The containing node.
    fn parent(&self) -> Option<Self>;
}

/// What one layer contributes to the walk.
enum Layer {
    /// Nothing usable: absent, transparent, unparsable, or alpha 0.
    Skip,
    /// Alpha exactly 1. Carries the raw string for the no-blend case.
    Opaque(String, ColorRgba),
    /// Anything else; must be composited over what lies beneath.
    Translucent(ColorRgba),
}

fn classify(background: Option<String>) -> Layer {
    let Some(raw) = background else {
        return Layer::Skip;
    };
    if is_transparent_keyword(&raw) {
        return Layer::Skip;
    }
    match parse_color(&raw) {
        Ok(color) if color.is_transparent() => Layer::Skip,
        Ok(color) if color.is_opaque() => Layer::Opaque(raw, color),
        Ok(color) => Layer::Translucent(color),
        Err(error) => {
            debug!(background = %raw, %error, "skipping unparsable background");
            Layer::Skip
        }
    }
}

/// Resolve the opaque background color behind `surface`.
///
/// Returns the first opaque background unchanged when no translucent layer
/// sits above it, the composited `rgb(r, g, b)` string when some do, and
/// `None` when no ancestor paints an opaque background.
pub fn resolve_background<S: Surface>(surface: &S) -> Option<String> {
    let mut translucent = Vec::new();

    if let Some(found) = visit(surface, &mut translucent) {
        return Some(found);
    }

    let mut depth = 1usize;
    let mut current = surface.parent();
    while let Some(node) = current {
        if let Some(found) = visit(&node, &mut translucent) {
            return Some(found);
        }
        current = node.parent();
        depth += 1;
    }

    debug!(depth, "no opaque background up to the root");
    None
}

fn visit<S: Surface>(surface: &S, translucent: &mut Vec<ColorRgba>) -> Option<String> {
    match classify(surface.background()) {
        Layer::Skip => None,
        Layer::Translucent(color) => {
            translucent.push(color);
            None
        }
        Layer::Opaque(raw, base) => {
            if translucent.is_empty() {
                return Some(raw);
            }
            let composed = translucent
                .iter()
                .rev()
                .fold(base, |backdrop, layer| layer.composite_over(backdrop));
            Some(composed.to_string())
        }
    }
}

// ─── LayerTree ───────────────────────────────────────────────────────────────

/// Handle to a node in a [`LayerTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

#[derive(Debug, Clone)]
struct LayerNode {
    parent: Option<LayerId>,
    background: Option<String>,
}

/// A minimal in-memory container hierarchy.
///
/// Nodes are only ever appended, so a `LayerId` handed out by a tree stays
/// valid for that tree's lifetime.
#[derive(Debug, Clone, Default)]
pub struct LayerTree {
    nodes: Vec<LayerNode>,
}

impl LayerTree {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Build a single chain from layers listed innermost first.
    ///
    /// Returns the tree and the innermost node, or `None` for an empty list.
    #[must_use]
    pub fn chain<'a, I>(innermost_first: I) -> (Self, Option<LayerId>)
    where
        I: IntoIterator<Item = Option<&'a str>>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut tree = Self::new();
        let mut parent = None;
        for background in innermost_first.into_iter().rev() {
            parent = Some(tree.insert(parent, background));
        }
        (tree, parent)
    }

    /// Append a node under `parent` (or as a root).
    ///
    /// # Panics
    ///
    /// Panics if `parent` did not come from this tree.
    pub fn insert(&mut self, parent: Option<LayerId>, background: Option<&str>) -> LayerId {
        if let Some(LayerId(p)) = parent {
            assert!(p < self.nodes.len(), "parent layer {p} is not in this tree");
        }
        let id = LayerId(self.nodes.len());
        self.nodes.push(LayerNode {
            parent,
            background: background.map(str::to_string),
        });
        id
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A [`Surface`] view of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    #[must_use]
    pub fn surface(&self, id: LayerId) -> LayerRef<'_> {
        assert!(id.0 < self.nodes.len(), "layer {} is not in this tree", id.0);
        LayerRef { tree: self, id }
    }
}

/// Borrowed [`Surface`] handle into a [`LayerTree`].
#[derive(Debug, Clone, Copy)]
pub struct LayerRef<'a> {
    tree: &'a LayerTree,
    id: LayerId,
}

impl LayerRef<'_> {
    #[must_use]
    pub const fn id(&self) -> LayerId {
        self.id
    }
}

impl Surface for LayerRef<'_> {
    fn background(&self) -> Option<String> {
        self.tree.nodes[self.id.0].background.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.tree.nodes[self.id.0]
            .parent
            .map(|id| Self { tree: self.tree, id })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn resolve(innermost_first: &[Option<&str>]) -> Option<String> {
        let (tree, leaf) = LayerTree::chain(innermost_first.iter().copied());
        resolve_background(&tree.surface(leaf.expect("non-empty chain")))
    }

    /// A chain that counts how often backgrounds are read.
    struct Counting<'a> {
        layers: &'a [Option<&'a str>],
        depth: usize,
        reads: &'a Cell<usize>,
    }

    impl Surface for Counting<'_> {
        fn background(&self) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            self.layers[self.depth].map(str::to_string)
        }

        fn parent(&self) -> Option<Self> {
            (self.depth + 1 < self.layers.len()).then(|| Self {
                layers: self.layers,
                depth: self.depth + 1,
                reads: self.reads,
            })
        }
    }

    // ── Opaque ───────────────────────────────────────────────────────────

    #[test]
    fn opaque_element_returns_own_background_unchanged() {
        assert_eq!(resolve(&[Some("#FF0000")]), Some("#FF0000".to_string()));
        assert_eq!(
            resolve(&[Some("rgb(1, 2, 3)"), Some("#fff")]),
            Some("rgb(1, 2, 3)".to_string())
        );
    }

    #[test]
    fn explicit_full_alpha_counts_as_opaque() {
        assert_eq!(
            resolve(&[Some("rgba(9, 9, 9, 1)"), Some("#fff")]),
            Some("rgba(9, 9, 9, 1)".to_string())
        );
    }

    // ── Skipping ─────────────────────────────────────────────────────────

    #[test]
    fn transparent_layers_defer_to_grandparent() {
        assert_eq!(
            resolve(&[Some("transparent"), Some("rgba(0, 0, 0, 0)"), Some("#123456")]),
            Some("#123456".to_string())
        );
    }

    #[test]
    fn missing_and_unparsable_layers_are_skipped() {
        assert_eq!(
            resolve(&[None, Some("var(--surface)"), Some("rgba(5, 5, 5, 0)"), Some("#abc")]),
            Some("#abc".to_string())
        );
    }

    #[test]
    fn lone_transparent_root_is_none() {
        assert_eq!(resolve(&[Some("transparent")]), None);
        assert_eq!(resolve(&[None]), None);
    }

    // ── Compositing ──────────────────────────────────────────────────────

    #[test]
    fn half_red_over_white() {
        assert_eq!(
            resolve(&[Some("rgba(255,0,0,0.5)"), Some("rgb(255,255,255)")]),
            Some("rgb(255, 128, 128)".to_string())
        );
    }

    #[test]
    fn translucent_layer_skips_transparent_parent() {
        assert_eq!(
            resolve(&[Some("rgba(0, 0, 0, 0.5)"), Some("transparent"), Some("#ffffff")]),
            Some("rgb(128, 128, 128)".to_string())
        );
    }

    #[test]
    fn stacked_washes_composite_outermost_first() {
        // Outer: 50% black over white → 128. Inner: 50% white over 128 → 191.5 → 192.
        assert_eq!(
            resolve(&[
                Some("rgba(255, 255, 255, 0.5)"),
                Some("rgba(0, 0, 0, 0.5)"),
                Some("#fff"),
            ]),
            Some("rgb(192, 192, 192)".to_string())
        );
    }

    #[test]
    fn translucent_without_opaque_ancestor_is_none() {
        assert_eq!(
            resolve(&[Some("rgba(255, 0, 0, 0.5)"), Some("rgba(0, 0, 255, 0.5)")]),
            None
        );
    }

    // ── Termination ──────────────────────────────────────────────────────

    #[test]
    fn exhausted_chain_reads_every_layer_once() {
        for ancestors in 0..6 {
            let layers = vec![Some("transparent"); ancestors + 1];
            let reads = Cell::new(0);
            let leaf = Counting {
                layers: &layers,
                depth: 0,
                reads: &reads,
            };
            assert_eq!(resolve_background(&leaf), None);
            assert_eq!(reads.get(), ancestors + 1, "{ancestors} ancestors");
        }
    }

    #[test]
    fn walk_stops_at_first_opaque_layer() {
        let layers = [Some("transparent"), Some("#000"), Some("#fff"), None];
        let reads = Cell::new(0);
        let leaf = Counting {
            layers: &layers,
            depth: 0,
            reads: &reads,
        };
        assert_eq!(resolve_background(&leaf), Some("#000".to_string()));
        assert_eq!(reads.get(), 2);
    }

    // ── LayerTree ────────────────────────────────────────────────────────

    #[test]
    fn siblings_share_an_ancestor() {
        let mut tree = LayerTree::new();
        let root = tree.insert(None, Some("#222222"));
        let card = tree.insert(Some(root), Some("rgba(255, 255, 255, 0.5)"));
        let badge = tree.insert(Some(card), None);
        let tooltip = tree.insert(Some(root), Some("transparent"));

        assert_eq!(tree.len(), 4);
        assert_eq!(
            resolve_background(&tree.surface(badge)),
            Some("rgb(145, 145, 145)".to_string())
        );
        assert_eq!(
            resolve_background(&tree.surface(tooltip)),
            Some("#222222".to_string())
        );
        assert_eq!(tree.surface(card).parent().map(|p| p.id()), Some(root));
    }

    #[test]
    fn empty_chain_has_no_leaf() {
        let (tree, leaf) = LayerTree::chain(std::iter::empty::<Option<&str>>());
        assert!(tree.is_empty());
        assert!(leaf.is_none());
    }

    #[test]
    #[should_panic(expected = "not in this tree")]
    fn foreign_parent_panics() {
        let mut other = LayerTree::new();
        other.insert(None, None);
        let foreign = other.insert(None, None);
        LayerTree::new().insert(Some(foreign), None);
    }

    #[test]
    #[should_panic(expected = "not in this tree")]
    fn foreign_surface_panics() {
        let (big, innermost) = LayerTree::chain([Some("#fff"), None, None]);
        let (small, _) = LayerTree::chain([Some("#000")]);
        assert_eq!(big.len(), 3);
        let _ = small.surface(innermost.unwrap());
    }
}
