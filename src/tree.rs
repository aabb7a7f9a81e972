//! The settings tree.
//!
//! A [`Config`] owns every setting in an arena. Containers refer to their
//! children through [`SettingId`] handles and every node keeps a handle to its
//! parent for upward navigation; the parent handle never owns anything.
//! Removing a setting frees its whole subtree, and handles to freed settings
//! are rejected afterwards thanks to a per-slot generation counter. Every
//! tree carries its own tag, so a handle is only honoured by the tree that
//! issued it.

use crate::error::SettingError;
use crate::lexer::is_valid_name;
use crate::number::{float_to_i32, float_to_i64};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::path::{self, Path};
use crate::value::{IntegerBase, Kind, Value};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static NEXT_TREE: AtomicU32 = AtomicU32::new(0);

fn next_tree_tag() -> u32 {
    NEXT_TREE.fetch_add(1, Ordering::Relaxed)
}

/// A handle to a setting inside one [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingId {
    tree: u32,
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float(f64),
    String(String),
    Group(IndexMap<String, SettingId>),
    Array(Vec<SettingId>),
    List(Vec<SettingId>),
}

impl Payload {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Payload::Bool(_) => Kind::Bool,
            Payload::Int(_) => Kind::Int,
            Payload::Int64(_) => Kind::Int64,
            Payload::Float(_) => Kind::Float,
            Payload::String(_) => Kind::String,
            Payload::Group(_) => Kind::Group,
            Payload::Array(_) => Kind::Array,
            Payload::List(_) => Kind::List,
        }
    }

    fn children(&self) -> Vec<SettingId> {
        match self {
            Payload::Group(members) => members.values().copied().collect(),
            Payload::Array(elements) | Payload::List(elements) => elements.clone(),
            _ => Vec::new(),
        }
    }

    /// Scalar payloads only; containers are filled child by child.
    fn scalar(value: Value) -> Option<Payload> {
        match value {
            Value::Bool(v) => Some(Payload::Bool(v)),
            Value::Int(v) => Some(Payload::Int(v)),
            Value::Int64(v) => Some(Payload::Int64(v)),
            Value::Float(v) => Some(Payload::Float(v)),
            Value::String(v) => Some(Payload::String(v)),
            Value::Group(_) | Value::Array(_) | Value::List(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<SettingId>,
    pub(crate) payload: Payload,
    pub(crate) format: Option<IntegerBase>,
    pub(crate) line: Option<usize>,
    pub(crate) file: Option<Arc<str>>,
}

impl Node {
    fn new(name: Option<String>, parent: Option<SettingId>, payload: Payload) -> Self {
        Node {
            name,
            parent,
            payload,
            format: None,
            line: None,
            file: None,
        }
    }

    fn retag(&mut self, tree: u32) {
        if let Some(parent) = &mut self.parent {
            parent.tree = tree;
        }
        match &mut self.payload {
            Payload::Group(members) => members.values_mut().for_each(|id| id.tree = tree),
            Payload::Array(elements) | Payload::List(elements) => {
                elements.iter_mut().for_each(|id| id.tree = tree);
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A configuration document: the root group and everything below it.
#[derive(Debug)]
pub struct Config {
    tree: u32,
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: SettingId,
    auto_convert: bool,
    extra_name_char: Option<char>,
    max_depth: usize,
}

impl Clone for Config {
    /// A deep copy with its own tag: handles into `self` are not valid in the copy.
    fn clone(&self) -> Self {
        let tree = next_tree_tag();
        let mut slots = self.slots.clone();
        for node in slots.iter_mut().filter_map(|slot| slot.node.as_mut()) {
            node.retag(tree);
        }
        Config {
            tree,
            slots,
            free: self.free.clone(),
            root: SettingId { tree, ..self.root },
            auto_convert: self.auto_convert,
            extra_name_char: self.extra_name_char,
            max_depth: self.max_depth,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Config {
    /// Structural equality: names, kinds, values and order. Source positions
    /// and integer formats are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}

impl Config {
    /// Creates a configuration holding an empty root group.
    #[must_use]
    pub fn new() -> Self {
        let tree = next_tree_tag();
        let root_node = Node::new(None, None, Payload::Group(IndexMap::new()));
        Config {
            tree,
            slots: vec![Slot {
                generation: 0,
                node: Some(root_node),
            }],
            free: Vec::new(),
            root: SettingId {
                tree,
                index: 0,
                generation: 0,
            },
            auto_convert: false,
            extra_name_char: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub(crate) fn with_extra_name_char(mut self, extra: Option<char>) -> Self {
        self.extra_name_char = extra;
        self
    }

    pub(crate) fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builds a configuration from a group value.
    pub fn from_value(value: Value) -> Result<Config, SettingError> {
        let mut config = Config::new();
        if value.kind() != Kind::Group {
            return Err(SettingError::TypeMismatch {
                path: String::new(),
                expected: Kind::Group.to_string(),
                found: value.kind(),
            });
        }
        let root = config.root;
        config.replace(root, value)?;
        Ok(config)
    }

    #[must_use]
    pub fn root(&self) -> SettingId {
        self.root
    }

    #[must_use]
    pub fn root_setting(&self) -> Setting<'_> {
        // The root slot is never freed.
        Setting {
            config: self,
            id: self.root,
            node: self.slots[self.root.index as usize]
                .node
                .as_ref()
                .unwrap_or_else(|| unreachable!("root setting is never freed")),
        }
    }

    /// Whether typed reads and writes convert between `int`, `int64` and `float`.
    #[must_use]
    pub fn auto_convert(&self) -> bool {
        self.auto_convert
    }

    pub fn set_auto_convert(&mut self, enabled: bool) {
        self.auto_convert = enabled;
    }

    /// How deep containers may nest below the root. Inserts and replacements
    /// that would go deeper fail, so the written document can be read back
    /// with the same limit. Parsed trees inherit the parser's limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Changes the nesting limit for later inserts; existing settings stay.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// The number of live settings, the root included.
    #[must_use]
    pub fn setting_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    // === Access ===

    pub fn setting(&self, id: SettingId) -> Result<Setting<'_>, SettingError> {
        Ok(Setting {
            config: self,
            id,
            node: self.node(id)?,
        })
    }

    pub(crate) fn node(&self, id: SettingId) -> Result<&Node, SettingError> {
        if id.tree != self.tree {
            return Err(foreign_handle());
        }
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(stale_handle)
    }

    fn node_mut(&mut self, id: SettingId) -> Result<&mut Node, SettingError> {
        if id.tree != self.tree {
            return Err(foreign_handle());
        }
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(stale_handle)
    }

    /// Resolves `path` from the root.
    pub fn lookup(&self, path: &str) -> Result<SettingId, SettingError> {
        self.lookup_from(self.root, path)
    }

    /// Resolves `path` relative to `start`.
    pub fn lookup_from(&self, start: SettingId, path: &str) -> Result<SettingId, SettingError> {
        let compiled = Path::parse(path)?;
        path::resolve(self, start, &compiled)
    }

    /// Resolves an already compiled path from the root.
    pub fn lookup_path(&self, path: &Path) -> Result<SettingId, SettingError> {
        path::resolve(self, self.root, path)
    }

    /// Whether `path` names an existing setting.
    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_ok()
    }

    /// Reads a setting as `T`.
    pub fn get<'a, T: FromSetting<'a>>(&'a self, id: SettingId) -> Result<T, SettingError> {
        T::from_setting(self.setting(id)?)
    }

    /// Resolves `path` and reads the setting as `T`.
    pub fn lookup_value<'a, T: FromSetting<'a>>(&'a self, path: &str) -> Result<T, SettingError> {
        self.get(self.lookup(path)?)
    }

    /// Copies the whole tree into an owned group value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.root_setting().to_value()
    }

    // === Mutation ===

    /// Stores a scalar in an existing setting of the same kind. With
    /// [`auto_convert`](Config::auto_convert) on, numbers convert between
    /// numeric kinds; the setting keeps its kind either way.
    pub fn set(&mut self, id: SettingId, value: impl Into<Value>) -> Result<(), SettingError> {
        let value = value.into();
        let setting = self.setting(id)?;
        let payload = coerce_for_write(setting.kind(), value, self.auto_convert, &|| setting.path())?;
        self.node_mut(id)?.payload = payload;
        Ok(())
    }

    /// Sets the output base of an integer setting. `None` defers to the writer.
    pub fn set_format(&mut self, id: SettingId, base: Option<IntegerBase>) -> Result<(), SettingError> {
        let setting = self.setting(id)?;
        if !matches!(setting.kind(), Kind::Int | Kind::Int64) {
            return Err(SettingError::TypeMismatch {
                path: setting.path(),
                expected: "int or int64".to_string(),
                found: setting.kind(),
            });
        }
        self.node_mut(id)?.format = base;
        Ok(())
    }

    /// Replaces the value of a setting, changing its kind if needed. The old
    /// subtree is destroyed. Array elements must keep the array's kind unless
    /// they are its only element; the root must stay a group.
    pub fn replace(&mut self, id: SettingId, value: Value) -> Result<(), SettingError> {
        let setting = self.setting(id)?;
        let path = || setting.path();
        self.check_depth(&value, self.depth_of(id), &path)?;
        validate_value(&value, &path, self.extra_name_char)?;

        if setting.is_root() && value.kind() != Kind::Group {
            return Err(SettingError::TypeMismatch {
                path: path(),
                expected: Kind::Group.to_string(),
                found: value.kind(),
            });
        }
        if let Some(parent) = setting.parent() {
            if parent.kind() == Kind::Array {
                if !value.kind().is_scalar() {
                    return Err(SettingError::InvalidInsert {
                        path: path(),
                        reason: format!("arrays hold scalars, not a {}", value.kind()),
                    });
                }
                if parent.len() > 1 && value.kind() != setting.kind() {
                    return Err(SettingError::TypeMismatch {
                        path: path(),
                        expected: setting.kind().to_string(),
                        found: value.kind(),
                    });
                }
            }
        }

        let old_children = self.node(id)?.payload.children();
        for child in old_children {
            self.free_subtree(child);
        }
        let node = self.node_mut(id)?;
        node.format = None;
        self.fill(id, value);
        Ok(())
    }

    /// Adds a child of `kind` holding that kind's default value (`0`, `0.0`,
    /// `""`, `false` or an empty container). Group members need a unique
    /// `name`; array and list elements take none.
    pub fn add_child(
        &mut self,
        parent: SettingId,
        name: Option<&str>,
        kind: Kind,
    ) -> Result<SettingId, SettingError> {
        self.add_value(parent, name, Value::default_for(kind))
    }

    /// Adds a child holding `value`, which may be a whole subtree. Nothing is
    /// inserted unless the complete value is valid.
    pub fn add_value(
        &mut self,
        parent: SettingId,
        name: Option<&str>,
        value: Value,
    ) -> Result<SettingId, SettingError> {
        let parent_setting = self.setting(parent)?;
        let parent_path = || parent_setting.path();
        let child_path = || match name {
            Some(name) => path::join_name(&parent_path(), name),
            None => path::join_index(&parent_path(), parent_setting.len()),
        };
        self.check_depth(&value, self.depth_of(parent) + 1, &child_path)?;
        validate_value(&value, &child_path, self.extra_name_char)?;

        match parent_setting.kind() {
            Kind::Group => {
                let Some(name) = name else {
                    return Err(SettingError::InvalidInsert {
                        path: parent_path(),
                        reason: "group members need a name".to_string(),
                    });
                };
                if !is_valid_name(name, self.extra_name_char) {
                    return Err(SettingError::InvalidInsert {
                        path: parent_path(),
                        reason: format!("'{name}' is not a valid setting name"),
                    });
                }
                if parent_setting.member(name).is_some() {
                    return Err(SettingError::InvalidInsert {
                        path: parent_path(),
                        reason: format!("a setting named '{name}' already exists"),
                    });
                }
            }
            kind @ (Kind::Array | Kind::List) => {
                if let Some(name) = name {
                    return Err(SettingError::InvalidInsert {
                        path: parent_path(),
                        reason: format!("{kind} elements are unnamed, got '{name}'"),
                    });
                }
                if kind == Kind::Array {
                    if !value.kind().is_scalar() {
                        return Err(SettingError::InvalidInsert {
                            path: parent_path(),
                            reason: format!("arrays hold scalars, not a {}", value.kind()),
                        });
                    }
                    if let Some(element_kind) = parent_setting.element_kind() {
                        if element_kind != value.kind() {
                            return Err(SettingError::TypeMismatch {
                                path: child_path(),
                                expected: element_kind.to_string(),
                                found: value.kind(),
                            });
                        }
                    }
                }
            }
            scalar => {
                return Err(SettingError::InvalidInsert {
                    path: parent_path(),
                    reason: format!("a {scalar} setting cannot hold children"),
                });
            }
        }

        let id = self.attach(parent, name.map(str::to_string), Payload::Bool(false));
        self.fill(id, value);
        Ok(id)
    }

    /// Detaches a setting from its container and destroys its subtree.
    pub fn remove(&mut self, id: SettingId) -> Result<(), SettingError> {
        if id == self.root {
            return Err(SettingError::RootRemoval);
        }
        let node = self.node(id)?;
        let name = node.name.clone();
        let Some(parent) = node.parent else {
            return Err(SettingError::RootRemoval);
        };
        match &mut self.node_mut(parent)?.payload {
            Payload::Group(members) => {
                if let Some(name) = name {
                    members.shift_remove(&name);
                }
            }
            Payload::Array(elements) | Payload::List(elements) => {
                elements.retain(|child| *child != id);
            }
            _ => {}
        }
        self.free_subtree(id);
        Ok(())
    }

    /// Removes the member `name` of a group.
    pub fn remove_member(&mut self, parent: SettingId, name: &str) -> Result<(), SettingError> {
        let setting = self.setting(parent)?;
        if setting.kind() != Kind::Group {
            return Err(SettingError::TypeMismatch {
                path: setting.path(),
                expected: Kind::Group.to_string(),
                found: setting.kind(),
            });
        }
        let child = setting.member(name).ok_or_else(|| SettingError::NotFound {
            path: path::join_name(&setting.path(), name),
        })?;
        let child = child.id();
        self.remove(child)
    }

    /// Removes the child at position `index` of any container.
    pub fn remove_index(&mut self, parent: SettingId, index: usize) -> Result<(), SettingError> {
        let setting = self.setting(parent)?;
        if !setting.is_aggregate() {
            return Err(SettingError::TypeMismatch {
                path: setting.path(),
                expected: "group, array or list".to_string(),
                found: setting.kind(),
            });
        }
        let child = setting
            .children()
            .nth(index)
            .ok_or_else(|| SettingError::NotFound {
                path: path::join_index(&setting.path(), index),
            })?;
        let child = child.id();
        self.remove(child)
    }

    /// Number of ancestors of `id`; the root sits at 0.
    fn depth_of(&self, id: SettingId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).ok().and_then(|node| node.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).ok().and_then(|node| node.parent);
        }
        depth
    }

    /// Fails when `value`, stored in a setting at `depth`, would open a
    /// container nested deeper than `max_depth`. The root group itself does
    /// not count.
    fn check_depth(&self, value: &Value, depth: usize, path: &dyn Fn() -> String) -> Result<(), SettingError> {
        let budget = (self.max_depth + 1).saturating_sub(depth);
        if nests_deeper_than(value, budget) {
            return Err(SettingError::InvalidInsert {
                path: path(),
                reason: format!("containers would nest deeper than {} levels", self.max_depth),
            });
        }
        Ok(())
    }

    // === Internal construction, shared with the parser ===

    fn alloc(&mut self, node: Node) -> SettingId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            SettingId {
                tree: self.tree,
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len())
                .unwrap_or_else(|_| panic!("more than u32::MAX settings in one tree"));
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            SettingId {
                tree: self.tree,
                index,
                generation: 0,
            }
        }
    }

    /// Creates a child node and links it into `parent` without checks.
    /// A group member with an existing name takes over that name's position.
    pub(crate) fn attach(&mut self, parent: SettingId, name: Option<String>, payload: Payload) -> SettingId {
        let id = self.alloc(Node::new(name.clone(), Some(parent), payload));
        if let Ok(parent_node) = self.node_mut(parent) {
            match &mut parent_node.payload {
                Payload::Group(members) => {
                    if let Some(name) = name {
                        members.insert(name, id);
                    }
                }
                Payload::Array(elements) | Payload::List(elements) => elements.push(id),
                _ => {}
            }
        }
        id
    }

    pub(crate) fn set_payload(&mut self, id: SettingId, payload: Payload, format: Option<IntegerBase>) {
        if let Ok(node) = self.node_mut(id) {
            node.payload = payload;
            node.format = format;
        }
    }

    pub(crate) fn set_source(&mut self, id: SettingId, line: usize, file: Option<Arc<str>>) {
        if let Ok(node) = self.node_mut(id) {
            node.line = Some(line);
            node.file = file;
        }
    }

    /// Empties a setting in place, destroying its old subtree but keeping its
    /// position in the parent.
    pub(crate) fn clear(&mut self, id: SettingId) {
        let children = match self.node(id) {
            Ok(node) => node.payload.children(),
            Err(_) => return,
        };
        for child in children {
            self.free_subtree(child);
        }
        self.set_payload(id, Payload::Bool(false), None);
    }

    /// Stores an already validated value in `id`, creating children as needed.
    fn fill(&mut self, id: SettingId, value: Value) {
        match value {
            Value::Group(members) => {
                self.set_payload(id, Payload::Group(IndexMap::new()), None);
                for (name, member) in members {
                    let child = self.attach(id, Some(name), Payload::Bool(false));
                    self.fill(child, member);
                }
            }
            Value::Array(elements) => {
                self.set_payload(id, Payload::Array(Vec::new()), None);
                for element in elements {
                    let child = self.attach(id, None, Payload::Bool(false));
                    self.fill(child, element);
                }
            }
            Value::List(elements) => {
                self.set_payload(id, Payload::List(Vec::new()), None);
                for element in elements {
                    let child = self.attach(id, None, Payload::Bool(false));
                    self.fill(child, element);
                }
            }
            scalar => {
                if let Some(payload) = Payload::scalar(scalar) {
                    self.set_payload(id, payload, None);
                }
            }
        }
    }

    /// Frees `id` and every descendant. The caller unlinks `id` from its parent.
    fn free_subtree(&mut self, id: SettingId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                pending.extend(node.payload.children());
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
    }
}

fn stale_handle() -> SettingError {
    SettingError::NotFound {
        path: "<removed setting>".to_string(),
    }
}

fn foreign_handle() -> SettingError {
    SettingError::NotFound {
        path: "<setting of another config>".to_string(),
    }
}

/// Whether `value` opens more than `budget` levels of containers.
fn nests_deeper_than(value: &Value, budget: usize) -> bool {
    match value {
        Value::Group(members) => {
            budget == 0 || members.iter().any(|(_, member)| nests_deeper_than(member, budget - 1))
        }
        Value::Array(elements) | Value::List(elements) => {
            budget == 0 || elements.iter().any(|element| nests_deeper_than(element, budget - 1))
        }
        _ => false,
    }
}

/// Checks a value before it enters the tree: group names are legal and
/// unique, arrays hold scalars of one kind, floats are finite. `path` is only
/// rendered for the error.
fn validate_value(value: &Value, path: &dyn Fn() -> String, extra: Option<char>) -> Result<(), SettingError> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(SettingError::InvalidValue {
            path: path(),
            reason: format!("{f} cannot be written as a float literal"),
        }),
        Value::Group(members) => {
            for (i, (name, member)) in members.iter().enumerate() {
                if !is_valid_name(name, extra) {
                    return Err(SettingError::InvalidInsert {
                        path: path(),
                        reason: format!("'{name}' is not a valid setting name"),
                    });
                }
                if members[..i].iter().any(|(earlier, _)| earlier == name) {
                    return Err(SettingError::InvalidInsert {
                        path: path(),
                        reason: format!("a setting named '{name}' already exists"),
                    });
                }
                validate_value(member, &|| path::join_name(&path(), name), extra)?;
            }
            Ok(())
        }
        Value::Array(elements) => {
            let element_kind = elements.first().map(Value::kind);
            for (i, element) in elements.iter().enumerate() {
                let element_path = || path::join_index(&path(), i);
                if !element.kind().is_scalar() {
                    return Err(SettingError::InvalidInsert {
                        path: path(),
                        reason: format!("arrays hold scalars, not a {}", element.kind()),
                    });
                }
                if let Some(expected) = element_kind {
                    if element.kind() != expected {
                        return Err(SettingError::TypeMismatch {
                            path: element_path(),
                            expected: expected.to_string(),
                            found: element.kind(),
                        });
                    }
                }
                validate_value(element, &element_path, extra)?;
            }
            Ok(())
        }
        Value::List(elements) => {
            for (i, element) in elements.iter().enumerate() {
                validate_value(element, &|| path::join_index(&path(), i), extra)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn coerce_for_write(
    target: Kind,
    value: Value,
    auto_convert: bool,
    path: &dyn Fn() -> String,
) -> Result<Payload, SettingError> {
    let mismatch = |found: Kind| SettingError::TypeMismatch {
        path: path(),
        expected: target.to_string(),
        found,
    };
    let out_of_range = |value: &Value| SettingError::InvalidValue {
        path: path(),
        reason: format!("{value:?} does not fit in a {target} setting"),
    };

    if let Value::Float(f) = value {
        if !f.is_finite() {
            return Err(SettingError::InvalidValue {
                path: path(),
                reason: format!("{f} cannot be written as a float literal"),
            });
        }
    }

    match (target, value) {
        (Kind::Bool, Value::Bool(v)) => Ok(Payload::Bool(v)),
        (Kind::Int, Value::Int(v)) => Ok(Payload::Int(v)),
        (Kind::Int64, Value::Int64(v)) => Ok(Payload::Int64(v)),
        (Kind::Float, Value::Float(v)) => Ok(Payload::Float(v)),
        (Kind::String, Value::String(v)) => Ok(Payload::String(v)),
        (target, value) if auto_convert && target.is_number() && value.kind().is_number() => {
            match (target, &value) {
                (Kind::Int, Value::Int64(v)) => {
                    i32::try_from(*v).map(Payload::Int).map_err(|_| out_of_range(&value))
                }
                (Kind::Int, Value::Float(v)) => {
                    float_to_i32(*v).map(Payload::Int).ok_or_else(|| out_of_range(&value))
                }
                (Kind::Int64, Value::Int(v)) => Ok(Payload::Int64(i64::from(*v))),
                (Kind::Int64, Value::Float(v)) => {
                    float_to_i64(*v).map(Payload::Int64).ok_or_else(|| out_of_range(&value))
                }
                (Kind::Float, Value::Int(v)) => Ok(Payload::Float(f64::from(*v))),
                (Kind::Float, Value::Int64(v)) => Ok(Payload::Float(*v as f64)),
                _ => Err(mismatch(value.kind())),
            }
        }
        (_, value) => Err(mismatch(value.kind())),
    }
}

/// A read-only view of one setting.
#[derive(Debug, Clone, Copy)]
pub struct Setting<'a> {
    config: &'a Config,
    id: SettingId,
    node: &'a Node,
}

impl<'a> Setting<'a> {
    #[must_use]
    pub fn id(&self) -> SettingId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// The member name; `None` for the root and for array or list elements.
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        self.node.name.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.node.payload.kind()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Setting<'a>> {
        self.node
            .parent
            .and_then(|parent| self.config.setting(parent).ok())
    }

    /// Position within the parent container.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        let parent = self.parent()?;
        match &parent.node.payload {
            Payload::Group(members) => members.get_index_of(self.name()?),
            Payload::Array(elements) | Payload::List(elements) => {
                elements.iter().position(|child| *child == self.id)
            }
            _ => None,
        }
    }

    /// The canonical path from the root, e.g. `servers[1].ports[0]`. The root's path is empty.
    #[must_use]
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = *self;
        while let Some(parent) = current.parent() {
            segments.push(match current.name() {
                Some(name) => path::PathSegment::Name(name.to_string()),
                None => path::PathSegment::Index(current.index().unwrap_or(0)),
            });
            current = parent;
        }
        segments.reverse();
        Path::from_segments(segments).to_string()
    }

    /// Number of children of a container; 0 for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.node.payload {
            Payload::Group(members) => members.len(),
            Payload::Array(elements) | Payload::List(elements) => elements.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind() == Kind::Group
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.kind() == Kind::Array
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        self.kind() == Kind::List
    }

    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.kind().is_aggregate()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind().is_scalar()
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        self.kind().is_number()
    }

    /// The kind shared by an array's elements, once it has any.
    #[must_use]
    pub fn element_kind(&self) -> Option<Kind> {
        match &self.node.payload {
            Payload::Array(elements) => elements
                .first()
                .and_then(|first| self.config.setting(*first).ok())
                .map(|first| first.kind()),
            _ => None,
        }
    }

    /// The line the setting was read from; `None` for settings built in code.
    #[must_use]
    pub fn source_line(&self) -> Option<usize> {
        self.node.line
    }

    /// The included file the setting was read from, when it came from one.
    #[must_use]
    pub fn source_file(&self) -> Option<&'a str> {
        self.node.file.as_deref()
    }

    /// The output base of an integer setting; `None` defers to the writer.
    #[must_use]
    pub fn format(&self) -> Option<IntegerBase> {
        self.node.format
    }

    pub fn get<T: FromSetting<'a>>(&self) -> Result<T, SettingError> {
        T::from_setting(*self)
    }

    pub fn children(&self) -> impl Iterator<Item = Setting<'a>> + 'a {
        let config = self.config;
        self.node
            .payload
            .children()
            .into_iter()
            .filter_map(move |id| config.setting(id).ok())
    }

    /// A direct member of a group.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Setting<'a>> {
        match &self.node.payload {
            Payload::Group(members) => members
                .get(name)
                .and_then(|id| self.config.setting(*id).ok()),
            _ => None,
        }
    }

    /// A direct element of an array or list.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<Setting<'a>> {
        match &self.node.payload {
            Payload::Array(elements) | Payload::List(elements) => elements
                .get(index)
                .and_then(|id| self.config.setting(*id).ok()),
            _ => None,
        }
    }

    /// Resolves `path` relative to this setting.
    pub fn lookup(&self, path: &str) -> Result<Setting<'a>, SettingError> {
        let id = self.config.lookup_from(self.id, path)?;
        self.config.setting(id)
    }

    /// Copies this setting and its subtree into an owned value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match &self.node.payload {
            Payload::Bool(v) => Value::Bool(*v),
            Payload::Int(v) => Value::Int(*v),
            Payload::Int64(v) => Value::Int64(*v),
            Payload::Float(v) => Value::Float(*v),
            Payload::String(v) => Value::String(v.clone()),
            Payload::Group(_) => Value::Group(
                self.children()
                    .map(|child| (child.name().unwrap_or_default().to_string(), child.to_value()))
                    .collect(),
            ),
            Payload::Array(_) => Value::Array(self.children().map(|c| c.to_value()).collect()),
            Payload::List(_) => Value::List(self.children().map(|c| c.to_value()).collect()),
        }
    }

    pub(crate) fn payload(&self) -> &'a Payload {
        &self.node.payload
    }
}

/// Typed reads out of a setting.
pub trait FromSetting<'a>: Sized {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError>;
}

fn read_mismatch(setting: &Setting<'_>, expected: Kind) -> SettingError {
    SettingError::TypeMismatch {
        path: setting.path(),
        expected: expected.to_string(),
        found: setting.kind(),
    }
}

fn read_out_of_range(setting: &Setting<'_>, expected: Kind) -> SettingError {
    SettingError::InvalidValue {
        path: setting.path(),
        reason: format!("value does not fit in {expected}"),
    }
}

impl<'a> FromSetting<'a> for bool {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        match setting.payload() {
            Payload::Bool(v) => Ok(*v),
            _ => Err(read_mismatch(&setting, Kind::Bool)),
        }
    }
}

impl<'a> FromSetting<'a> for i32 {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        let auto = setting.config.auto_convert;
        match setting.payload() {
            Payload::Int(v) => Ok(*v),
            Payload::Int64(v) if auto => {
                i32::try_from(*v).map_err(|_| read_out_of_range(&setting, Kind::Int))
            }
            Payload::Float(v) if auto => {
                float_to_i32(*v).ok_or_else(|| read_out_of_range(&setting, Kind::Int))
            }
            _ => Err(read_mismatch(&setting, Kind::Int)),
        }
    }
}

impl<'a> FromSetting<'a> for i64 {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        let auto = setting.config.auto_convert;
        match setting.payload() {
            Payload::Int64(v) => Ok(*v),
            Payload::Int(v) if auto => Ok(i64::from(*v)),
            Payload::Float(v) if auto => {
                float_to_i64(*v).ok_or_else(|| read_out_of_range(&setting, Kind::Int64))
            }
            _ => Err(read_mismatch(&setting, Kind::Int64)),
        }
    }
}

impl<'a> FromSetting<'a> for f64 {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        let auto = setting.config.auto_convert;
        match setting.payload() {
            Payload::Float(v) => Ok(*v),
            Payload::Int(v) if auto => Ok(f64::from(*v)),
            Payload::Int64(v) if auto => Ok(*v as f64),
            _ => Err(read_mismatch(&setting, Kind::Float)),
        }
    }
}

impl<'a> FromSetting<'a> for &'a str {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        match setting.payload() {
            Payload::String(v) => Ok(v.as_str()),
            _ => Err(read_mismatch(&setting, Kind::String)),
        }
    }
}

impl<'a> FromSetting<'a> for String {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        <&str>::from_setting(setting).map(str::to_string)
    }
}

impl<'a> FromSetting<'a> for Value {
    fn from_setting(setting: Setting<'a>) -> Result<Self, SettingError> {
        Ok(setting.to_value())
    }
}
