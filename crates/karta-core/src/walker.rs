//! Generic traversal of hierarchical models
//!
//! Language crates describe their abstract syntax trees as [`ModelNode`]s:
//! small `Copy` handles borrowing the model, usually an enum with one variant
//! per element kind. Every query here works on any such node type.
//!
//! Traversal is pre-order with siblings in declaration order. Each call starts
//! from fresh state, so the same root can be walked any number of times.
//! Cross references are plain identifiers; following one that does not
//! resolve contributes nothing.

use std::collections::{HashMap, HashSet};
use std::iter::{Filter, FilterMap};

/// A borrowed element of a model with lifetime `'m`
pub trait ModelNode<'m>: Copy {
    /// Identifier other elements may reference
    fn id(&self) -> Option<&'m str>;

    /// Direct children in declaration order
    fn children(&self) -> Vec<Self>;

    /// Identifiers this element refers to
    fn references(&self) -> Vec<&'m str> {
        Vec::new()
    }
}

/// Lazy pre-order iterator over a node and everything below it
#[derive(Debug, Clone)]
pub struct Descendants<N> {
    stack: Vec<N>,
}

impl<'m, N: ModelNode<'m>> Iterator for Descendants<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

/// Walk `root` and its descendants in pre-order
pub fn descendants<'m, N: ModelNode<'m>>(root: N) -> Descendants<N> {
    Descendants { stack: vec![root] }
}

/// Lazily keep what `select` maps to `Some`, in traversal order
pub fn collect<'m, N, T, F>(root: N, select: F) -> FilterMap<Descendants<N>, F>
where
    N: ModelNode<'m>,
    F: FnMut(N) -> Option<T>,
{
    descendants(root).filter_map(select)
}

/// Lazily yield the nodes satisfying `predicate`, in traversal order
pub fn filter<'m, N, P>(root: N, predicate: P) -> Filter<Descendants<N>, P>
where
    N: ModelNode<'m>,
    P: FnMut(&N) -> bool,
{
    descendants(root).filter(predicate)
}

/// The first node in traversal order with identifier `id`
pub fn resolve<'m, N: ModelNode<'m>>(root: N, id: &str) -> Option<N> {
    descendants(root).find(|node| node.id() == Some(id))
}

/// Targets of `node`'s references; dangling identifiers are skipped
pub fn follow<'m, N: ModelNode<'m>>(root: N, node: N) -> Vec<N> {
    ModelIndex::build(root).follow(node)
}

/// Everything transitively referenced from `start`
pub fn reachable<'m, N: ModelNode<'m>>(root: N, start: N) -> Vec<N> {
    ModelIndex::build(root).reachable(start)
}

/// Identifier lookup over one traversal of a model
///
/// Useful when several queries run against the same model, since `resolve`
/// and `follow` would otherwise walk the tree each time.
#[derive(Debug, Clone)]
pub struct ModelIndex<'m, N> {
    nodes: Vec<N>,
    by_id: HashMap<&'m str, usize>,
    duplicates: Vec<&'m str>,
}

impl<'m, N: ModelNode<'m>> ModelIndex<'m, N> {
    pub fn build(root: N) -> Self {
        let nodes: Vec<N> = descendants(root).collect();
        let mut by_id = HashMap::new();
        let mut duplicates = Vec::new();
        for (position, node) in nodes.iter().enumerate() {
            if let Some(id) = node.id() {
                if by_id.contains_key(id) {
                    duplicates.push(id);
                } else {
                    by_id.insert(id, position);
                }
            }
        }
        Self {
            nodes,
            by_id,
            duplicates,
        }
    }

    /// All nodes in traversal order
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node declaring `id`
    pub fn resolve(&self, id: &str) -> Option<N> {
        self.by_id.get(id).map(|&position| self.nodes[position])
    }

    pub fn follow(&self, node: N) -> Vec<N> {
        node.references()
            .into_iter()
            .filter_map(|id| self.resolve(id))
            .collect()
    }

    /// Transitive closure of `follow`, in discovery order
    ///
    /// Each identifier is visited once, so reference cycles terminate. The
    /// start node counts as visited and is never part of the result.
    pub fn reachable(&self, start: N) -> Vec<N> {
        let mut visited: HashSet<&'m str> = start.id().into_iter().collect();
        let mut found = Vec::new();
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            for target in node.references() {
                if !visited.insert(target) {
                    continue;
                }
                if let Some(resolved) = self.resolve(target) {
                    found.push(resolved);
                    pending.push(resolved);
                }
            }
        }
        found
    }

    /// `(node, identifier)` for every reference that resolves to nothing
    pub fn dangling(&self) -> Vec<(N, &'m str)> {
        self.nodes
            .iter()
            .flat_map(|&node| {
                node.references()
                    .into_iter()
                    .filter(move |id| !self.by_id.contains_key(id))
                    .map(move |id| (node, id))
            })
            .collect()
    }

    /// Identifiers declared more than once, one entry per extra declaration
    pub fn duplicates(&self) -> &[&'m str] {
        &self.duplicates
    }
}
