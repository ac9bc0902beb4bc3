//! Node storage for [`LocalDevice`](crate::LocalDevice).
//!
//! Nodes live in a flat map keyed by [`NodeId`]; parent and child links are
//! ids. Removed ids are never handed out again.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ossia_address::{format_address, parse_address, validate_address, validate_name, Pattern};
use ossia_core::{DeletionNotifier, ValueType};
use tracing::debug;

use crate::error::TreeError;
use crate::seed::TYPE_KEY;
use crate::types::{EndpointId, IdSource, NodeId, WatchToken};

#[derive(Debug)]
pub(crate) struct NodeEntry {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) endpoint: Option<(EndpointId, ValueType)>,
    watchers: BTreeMap<u64, DeletionNotifier>,
}

impl NodeEntry {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            endpoint: None,
            watchers: BTreeMap::new(),
        }
    }

    pub(crate) fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

#[derive(Debug)]
pub(crate) struct Arena {
    ids: IdSource,
    next_watch: u64,
    nodes: HashMap<NodeId, NodeEntry>,
}

impl Arena {
    /// An arena holding only an unnamed root.
    pub(crate) fn new() -> (Self, NodeId) {
        let mut ids = IdSource::default();
        let root = ids.node();
        let mut nodes = HashMap::new();
        nodes.insert(root, NodeEntry::new(String::new(), None));
        let arena = Self {
            ids,
            next_watch: 1,
            nodes,
        };
        (arena, root)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub(crate) fn get(&self, node: NodeId) -> Result<&NodeEntry, TreeError> {
        self.nodes.get(&node).ok_or(TreeError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut NodeEntry, TreeError> {
        self.nodes.get_mut(&node).ok_or(TreeError::UnknownNode(node))
    }

    pub(crate) fn child_named(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, TreeError> {
        let entry = self.get(parent)?;
        Ok(entry
            .children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|e| e.name == name)))
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        check_name(name)?;
        if self.child_named(parent, name)?.is_some() {
            return Err(TreeError::DuplicateName {
                parent,
                name: name.to_owned(),
            });
        }
        let child = self.ids.node();
        self.nodes
            .insert(child, NodeEntry::new(name.to_owned(), Some(parent)));
        self.get_mut(parent)?.children.push(child);
        debug!(parent = ?parent, child = ?child, name, "node added");
        Ok(child)
    }

    pub(crate) fn child_at(&self, parent: NodeId, index: usize) -> Result<Option<NodeId>, TreeError> {
        Ok(self.get(parent)?.children.get(index).copied())
    }

    /// Walk `path` down from `from`. `""` and `"/"` name `from` itself.
    pub(crate) fn resolve(&self, from: NodeId, path: &str) -> Result<NodeId, TreeError> {
        validate_address(path)?;
        self.get(from)?;
        let mut node = from;
        for name in parse_address(path) {
            node = self
                .child_named(node, &name)?
                .ok_or_else(|| TreeError::NotFound(path.to_owned()))?;
        }
        Ok(node)
    }

    /// Like [`resolve`](Self::resolve), creating missing nodes on the way.
    pub(crate) fn create_path(&mut self, from: NodeId, path: &str) -> Result<NodeId, TreeError> {
        validate_address(path)?;
        let names = parse_address(path);
        for name in &names {
            check_name(name)?;
        }
        let mut node = from;
        for name in &names {
            node = match self.child_named(node, name)? {
                Some(existing) => existing,
                None => self.add_child(node, name)?,
            };
        }
        Ok(node)
    }

    /// Every existing node under `from` matching `pattern`, in tree order.
    pub(crate) fn find_pattern(&self, from: NodeId, pattern: &str) -> Result<Vec<NodeId>, TreeError> {
        let pattern = Pattern::parse(pattern)?;
        self.get(from)?;
        let mut frontier = vec![from];
        for segment in pattern.segments() {
            let mut next = Vec::new();
            for node in frontier {
                for &child in &self.get(node)?.children {
                    if segment.matches(&self.get(child)?.name) {
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        Ok(frontier)
    }

    /// Expand `pattern`, creating the literal and alternation names that do
    /// not exist yet. Regex segments only match existing nodes.
    pub(crate) fn create_pattern(&mut self, from: NodeId, pattern: &str) -> Result<Vec<NodeId>, TreeError> {
        let pattern = Pattern::parse(pattern)?;
        self.get(from)?;
        for segment in pattern.segments() {
            for name in segment.creatable_names() {
                check_name(name)?;
            }
        }
        let mut frontier = vec![from];
        for segment in pattern.segments() {
            let mut next = Vec::new();
            let mut seen = BTreeSet::new();
            for node in frontier {
                let children = self.get(node)?.children.clone();
                for child in children {
                    if segment.matches(&self.get(child)?.name) && seen.insert(child) {
                        next.push(child);
                    }
                }
                for name in segment.creatable_names() {
                    if self.child_named(node, name)?.is_none() {
                        let child = self.add_child(node, name)?;
                        seen.insert(child);
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        Ok(frontier)
    }

    /// Unlink `child` from `parent` and drop its whole subtree.
    ///
    /// Returns the pending deletion notifiers, parents before children.
    pub(crate) fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<Vec<DeletionNotifier>, TreeError> {
        let siblings = &mut self.get_mut(parent)?.children;
        let Some(position) = siblings.iter().position(|&c| c == child) else {
            return Err(TreeError::NotAChild { parent, child });
        };
        siblings.remove(position);

        let mut notifiers = Vec::new();
        let mut stack = vec![child];
        let mut removed = 0usize;
        while let Some(node) = stack.pop() {
            let Some(entry) = self.nodes.remove(&node) else {
                continue;
            };
            removed += 1;
            notifiers.extend(entry.watchers.into_values());
            stack.extend(entry.children.into_iter().rev());
        }
        debug!(parent = ?parent, child = ?child, removed, "subtree removed");
        Ok(notifiers)
    }

    /// Remove `node` from wherever it sits.
    pub(crate) fn delete(&mut self, node: NodeId) -> Result<Vec<DeletionNotifier>, TreeError> {
        match self.get(node)?.parent {
            Some(parent) => self.detach(parent, node),
            None => Err(TreeError::RootNotRemovable),
        }
    }

    pub(crate) fn watch(&mut self, node: NodeId, notifier: DeletionNotifier) -> Result<WatchToken, TreeError> {
        let id = self.next_watch;
        self.get_mut(node)?.watchers.insert(id, notifier);
        self.next_watch = self.next_watch.saturating_add(1);
        Ok(WatchToken(id))
    }

    /// Drop a registration without firing it. `Ok(false)` if it was unknown.
    pub(crate) fn unwatch(&mut self, node: NodeId, token: WatchToken) -> Result<bool, TreeError> {
        Ok(self.get_mut(node)?.watchers.remove(&token.0).is_some())
    }

    pub(crate) fn create_endpoint(&mut self, node: NodeId, value_type: ValueType) -> Result<EndpointId, TreeError> {
        if let Some((existing, _)) = self.get(node)?.endpoint {
            return Ok(existing);
        }
        let endpoint = self.ids.endpoint();
        self.get_mut(node)?.endpoint = Some((endpoint, value_type));
        debug!(node = ?node, endpoint = ?endpoint, ?value_type, "endpoint created");
        Ok(endpoint)
    }

    pub(crate) fn remove_endpoint(&mut self, node: NodeId, endpoint: EndpointId) -> Result<(), TreeError> {
        let entry = self.get_mut(node)?;
        match entry.endpoint {
            Some((current, _)) if current == endpoint => {
                entry.endpoint = None;
                debug!(node = ?node, endpoint = ?endpoint, "endpoint removed");
                Ok(())
            }
            _ => Err(TreeError::NoSuchEndpoint(node)),
        }
    }

    /// Absolute address of `node`; the root is `"/"`.
    pub(crate) fn path_of(&self, node: NodeId) -> Result<String, TreeError> {
        let mut names = Vec::new();
        let mut current = self.get(node)?;
        while let Some(parent) = current.parent {
            names.push(current.name.clone());
            current = self.get(parent)?;
        }
        names.reverse();
        Ok(format_address(&names))
    }
}

fn check_name(name: &str) -> Result<(), TreeError> {
    validate_name(name)?;
    if name == TYPE_KEY {
        return Err(TreeError::ReservedName(name.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossia_address::{ValidationError, MAX_ADDRESS_LENGTH, MAX_DEPTH};

    fn names(arena: &Arena, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| arena.path_of(n).unwrap())
            .collect()
    }

    #[test]
    fn test_create_path_reuses_existing_nodes() {
        let (mut arena, root) = Arena::new();
        let ab = arena.create_path(root, "/a/b").unwrap();
        let again = arena.create_path(root, "a/b").unwrap();
        assert_eq!(ab, again);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.path_of(ab).unwrap(), "/a/b");
    }

    #[test]
    fn test_resolve_self_and_missing() {
        let (mut arena, root) = Arena::new();
        let a = arena.create_path(root, "/a").unwrap();
        assert_eq!(arena.resolve(root, "").unwrap(), root);
        assert_eq!(arena.resolve(root, "/").unwrap(), root);
        assert_eq!(arena.resolve(a, "").unwrap(), a);
        assert_eq!(
            arena.resolve(root, "/a/x"),
            Err(TreeError::NotFound("/a/x".into()))
        );
    }

    #[test]
    fn test_add_child_rejects_duplicates_and_reserved() {
        let (mut arena, root) = Arena::new();
        arena.add_child(root, "a").unwrap();
        assert!(matches!(
            arena.add_child(root, "a"),
            Err(TreeError::DuplicateName { .. })
        ));
        assert!(matches!(
            arena.add_child(root, "a b"),
            Err(TreeError::InvalidName(_))
        ));
        assert!(matches!(
            arena.create_path(root, "/x/y*"),
            Err(TreeError::InvalidName(_))
        ));
        // Nothing of the refused path was created.
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_find_pattern_regex_and_alternatives() {
        let (mut arena, root) = Arena::new();
        for path in ["/g/1", "/g/2", "/g/3", "/h/1"] {
            arena.create_path(root, path).unwrap();
        }
        let all = arena.find_pattern(root, "/g/.*").unwrap();
        assert_eq!(names(&arena, &all), ["/g/1", "/g/2", "/g/3"]);
        let some = arena.find_pattern(root, "/{g,h}/1").unwrap();
        assert_eq!(names(&arena, &some), ["/g/1", "/h/1"]);
        assert!(arena.find_pattern(root, "/z/*").unwrap().is_empty());
    }

    #[test]
    fn test_create_pattern_creates_only_creatable_names() {
        let (mut arena, root) = Arena::new();
        arena.create_path(root, "/g/1").unwrap();
        let created = arena.create_pattern(root, "/g/{1,2}").unwrap();
        assert_eq!(names(&arena, &created), ["/g/1", "/g/2"]);
        let matched = arena.create_pattern(root, "/g/*/leaf").unwrap();
        assert_eq!(names(&arena, &matched), ["/g/1/leaf", "/g/2/leaf"]);
        // A regex segment with nothing to match creates nothing.
        assert!(arena.create_pattern(root, "/q*/x").unwrap().is_empty());
    }

    #[test]
    fn test_refused_create_pattern_changes_nothing() {
        let (mut arena, root) = Arena::new();
        assert!(matches!(
            arena.create_pattern(root, "/new/bad name"),
            Err(TreeError::InvalidName(_))
        ));
        assert!(matches!(
            arena.create_pattern(root, "/alt/{ok,bad#x}"),
            Err(TreeError::InvalidName(_))
        ));
        assert!(matches!(
            arena.create_pattern(root, "/t/@type"),
            Err(TreeError::ReservedName(_))
        ));
        assert_eq!(arena.len(), 1);
        assert!(arena.resolve(root, "/new").is_err());
        assert!(arena.resolve(root, "/alt/ok").is_err());
    }

    #[test]
    fn test_type_key_is_not_a_name() {
        let (mut arena, root) = Arena::new();
        assert_eq!(
            arena.add_child(root, TYPE_KEY),
            Err(TreeError::ReservedName(TYPE_KEY.into()))
        );
        assert!(matches!(
            arena.create_path(root, "/a/@type"),
            Err(TreeError::ReservedName(_))
        ));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_address_limits_apply_to_paths() {
        let (mut arena, root) = Arena::new();
        let deep = "/a".repeat(MAX_DEPTH + 1);
        assert_eq!(
            arena.create_path(root, &deep),
            Err(TreeError::InvalidName(ValidationError::AddressTooDeep))
        );
        assert_eq!(
            arena.resolve(root, &deep),
            Err(TreeError::InvalidName(ValidationError::AddressTooDeep))
        );
        let long = format!("/{}", "b".repeat(MAX_ADDRESS_LENGTH));
        assert_eq!(
            arena.create_path(root, &long),
            Err(TreeError::InvalidName(ValidationError::AddressTooLong))
        );
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_detach_drops_whole_subtree() {
        let (mut arena, root) = Arena::new();
        let a = arena.create_path(root, "/a").unwrap();
        let c = arena.create_path(root, "/a/b/c").unwrap();
        let keep = arena.create_path(root, "/k").unwrap();
        assert!(arena.detach(root, a).unwrap().is_empty());
        assert_eq!(arena.len(), 2);
        assert!(!arena.contains(c));
        assert!(arena.contains(keep));
        assert_eq!(
            arena.detach(root, a).unwrap_err(),
            TreeError::NotAChild { parent: root, child: a }
        );
        // Removed ids are not reused.
        let again = arena.create_path(root, "/a").unwrap();
        assert_ne!(again, a);
    }

    #[test]
    fn test_root_is_not_removable() {
        let (mut arena, root) = Arena::new();
        assert_eq!(arena.delete(root).unwrap_err(), TreeError::RootNotRemovable);
    }

    #[test]
    fn test_endpoint_at_most_once() {
        let (mut arena, root) = Arena::new();
        let a = arena.create_path(root, "/a").unwrap();
        let first = arena.create_endpoint(a, ValueType::Float).unwrap();
        let second = arena.create_endpoint(a, ValueType::Int).unwrap();
        assert_eq!(first, second);
        assert_eq!(arena.get(a).unwrap().endpoint, Some((first, ValueType::Float)));
        arena.remove_endpoint(a, first).unwrap();
        assert_eq!(
            arena.remove_endpoint(a, first),
            Err(TreeError::NoSuchEndpoint(a))
        );
    }
}
