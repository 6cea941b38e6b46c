//! The key manager: named key definitions plus the per-document index cache.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::debug;

use arbor_foundation::{
    AtomicValue, DocumentId, DocumentObserver, Error, NodeId, NodeList, PrimitiveType, QName,
    Result,
};

use super::definition::{KeyDefinition, KeyDefinitionSet};
use super::index::{KeyIndex, KeyValue, NodeSequence};
use crate::context::Context;

/// Cache slot for one `(key, sought type)` pair of one document.
#[derive(Debug)]
enum IndexSlot {
    /// A build for this slot is running on the thread holding the lock.
    UnderConstruction,
    Built(Arc<KeyIndex>),
}

/// What an index is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum IndexRole {
    /// Serves lookups whose sought value has the index's type.
    Direct,
    /// The untyped index of a general-comparison key; records found types.
    Untyped,
    /// A typed index searched for an untyped lookup. Values that cannot be
    /// converted to, or compared with, the index type are left out.
    Secondary,
}

type DocumentIndexes = HashMap<(usize, PrimitiveType, IndexRole), IndexSlot>;

/// Registry of key definitions and cache of the indexes built from them.
///
/// Definitions are added at compile time through `&mut self`. Lookups take
/// `&self` and may run from many threads at once: index construction is
/// serialized behind a single re-entrant lock, so a use-expression may look
/// up a different key while an index is being built.
pub struct KeyManager {
    sets: HashMap<QName, KeyDefinitionSet>,
    indexes: ReentrantMutex<RefCell<HashMap<DocumentId, DocumentIndexes>>>,
}

impl KeyManager {
    /// Creates a manager with no keys.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
            indexes: ReentrantMutex::new(RefCell::new(HashMap::new())),
        }
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Reserves a key name before its definitions are compiled, so that
    /// forward references resolve to the same key.
    pub fn pre_register_key(&mut self, name: QName) {
        let ordinal = self.sets.len();
        self.sets
            .entry(name.clone())
            .or_insert_with(|| KeyDefinitionSet::new(name, ordinal));
    }

    /// Adds a definition to the key called `name`, creating the key if needed.
    ///
    /// A definition identical to one already present is ignored.
    ///
    /// # Errors
    ///
    /// Returns `CollationConflict` if the definition's collation differs from
    /// that of the key's existing definitions.
    pub fn add_key_definition(&mut self, name: QName, definition: KeyDefinition) -> Result<()> {
        let ordinal = self.sets.len();
        let set = self
            .sets
            .entry(name.clone())
            .or_insert_with(|| KeyDefinitionSet::new(name, ordinal));
        let pattern = definition.matcher().to_string();
        if !set.add(definition)? {
            debug!(key = %set.name(), %pattern, "duplicate key definition merged");
        }
        Ok(())
    }

    /// Returns the definitions of a key.
    #[must_use]
    pub fn key_definition_set(&self, name: &QName) -> Option<&KeyDefinitionSet> {
        self.sets.get(name)
    }

    /// Iterates the names of every registered key.
    pub fn key_names(&self) -> impl Iterator<Item = &QName> {
        self.sets.keys()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Selects the nodes of `document` whose key `name` has `value`.
    ///
    /// The index for the sought value's type is built on first use. An
    /// absent value selects nothing.
    ///
    /// # Errors
    ///
    /// - `UnknownKey` if no definition has been added for `name`
    /// - `CircularKey` if building the index needs the index itself
    /// - conversion and comparison errors under general-comparison semantics
    /// - any error raised by a pattern or use-expression
    pub fn select_by_key(
        &self,
        name: &QName,
        document: DocumentId,
        value: Option<&AtomicValue>,
        ctx: &Context<'_>,
    ) -> Result<NodeSequence> {
        let set = self.defined_set(name)?;
        match value {
            Some(value) => Ok(NodeSequence::new(self.lookup(set, document, value, ctx)?)),
            None => Ok(NodeSequence::empty()),
        }
    }

    /// Selects the nodes of `document` whose key `name` has any of `values`.
    ///
    /// # Errors
    ///
    /// As for [`select_by_key`](Self::select_by_key).
    pub fn select_by_keys(
        &self,
        name: &QName,
        document: DocumentId,
        values: &[AtomicValue],
        ctx: &Context<'_>,
    ) -> Result<NodeSequence> {
        let set = self.defined_set(name)?;
        let mut result = NodeList::new();
        for value in values {
            let nodes = self.lookup(set, document, value, ctx)?;
            result = result.union(&nodes);
        }
        Ok(NodeSequence::new(result))
    }

    fn defined_set(&self, name: &QName) -> Result<&KeyDefinitionSet> {
        self.sets
            .get(name)
            .filter(|set| !set.is_empty())
            .ok_or_else(|| Error::unknown_key(name.clone()))
    }

    fn lookup(
        &self,
        set: &KeyDefinitionSet,
        document: DocumentId,
        value: &AtomicValue,
        ctx: &Context<'_>,
    ) -> Result<NodeList> {
        let sought = if set.is_backwards_compatible() {
            value.convert(PrimitiveType::String)?
        } else {
            match value {
                AtomicValue::Integer(_) | AtomicValue::Decimal(_) | AtomicValue::Float(_) => {
                    value.convert(PrimitiveType::Double)?
                }
                _ => value.clone(),
            }
        };
        let ty = sought.primitive_type();

        if set.is_general_comparison() && ty == PrimitiveType::UntypedAtomic {
            return self.lookup_all_found_types(set, document, &sought, ctx);
        }

        let index = self.index_for(set, document, ty, IndexRole::Direct, ctx)?;
        Ok(probe(&index, set, &sought))
    }

    /// Searches the untyped index and one index per type the use-expressions
    /// actually produced, converting the sought value to each type.
    fn lookup_all_found_types(
        &self,
        set: &KeyDefinitionSet,
        document: DocumentId,
        sought: &AtomicValue,
        ctx: &Context<'_>,
    ) -> Result<NodeList> {
        let untyped = self.index_for(set, document, PrimitiveType::UntypedAtomic, IndexRole::Untyped, ctx)?;
        let mut result = probe(&untyped, set, sought);
        let types: BTreeSet<PrimitiveType> = untyped
            .found_types()
            .filter(|t| !t.is_string_like())
            .map(|t| if t.is_numeric() { PrimitiveType::Double } else { t })
            .collect();
        for ty in types {
            let index = self.index_for(set, document, ty, IndexRole::Secondary, ctx)?;
            if index.is_empty() {
                continue;
            }
            let Ok(converted) = sought.convert(ty) else {
                continue;
            };
            result = result.union(&probe(&index, set, &converted));
        }
        Ok(result)
    }

    // =========================================================================
    // Index Cache
    // =========================================================================

    /// Returns the index of `set` over `document` for values of type `ty`,
    /// building it if needed.
    fn index_for(
        &self,
        set: &KeyDefinitionSet,
        document: DocumentId,
        ty: PrimitiveType,
        role: IndexRole,
        ctx: &Context<'_>,
    ) -> Result<Arc<KeyIndex>> {
        let slot = (set.ordinal(), ty, role);
        let guard = self.indexes.lock();
        {
            let cache = guard.borrow();
            match cache.get(&document).and_then(|slots| slots.get(&slot)) {
                Some(IndexSlot::Built(index)) => return Ok(Arc::clone(index)),
                Some(IndexSlot::UnderConstruction) => {
                    return Err(Error::circular_key(set.name().clone()));
                }
                None => {}
            }
        }
        guard
            .borrow_mut()
            .entry(document)
            .or_default()
            .insert(slot, IndexSlot::UnderConstruction);

        // The cache is not borrowed while building: use-expressions may
        // re-enter on this thread.
        let built = self.build_index(set, document, ty, role, ctx);

        let mut cache = guard.borrow_mut();
        match built {
            Ok(index) => {
                debug!(
                    key = %set.name(),
                    %document,
                    item_type = %ty,
                    distinct_values = index.len(),
                    "key index built"
                );
                let index = Arc::new(index);
                cache
                    .entry(document)
                    .or_default()
                    .insert(slot, IndexSlot::Built(Arc::clone(&index)));
                Ok(index)
            }
            Err(err) => {
                if let Some(slots) = cache.get_mut(&document) {
                    slots.remove(&slot);
                    if slots.is_empty() {
                        cache.remove(&document);
                    }
                }
                Err(err.with_frame(format!("building index for key {}", set.name())))
            }
        }
    }

    fn build_index(
        &self,
        set: &KeyDefinitionSet,
        document: DocumentId,
        ty: PrimitiveType,
        role: IndexRole,
        ctx: &Context<'_>,
    ) -> Result<KeyIndex> {
        let ctx = Context::new(ctx.tree()).with_keys(self);
        let mut index = KeyIndex::new();
        for (position, definition) in set.definitions().iter().enumerate() {
            let in_order = position == 0;
            for node in definition.matcher().select_nodes(document, &ctx) {
                let node = node?;
                index_node(&mut index, set, definition, node, ty, role, in_order, &ctx)?;
            }
        }
        Ok(index)
    }

    // =========================================================================
    // Document Lifecycle
    // =========================================================================

    /// Drops every index built over `document`.
    ///
    /// Returns true if the document had any.
    pub fn release_document(&self, document: DocumentId) -> bool {
        let guard = self.indexes.lock();
        let released = guard.borrow_mut().remove(&document);
        if let Some(slots) = &released {
            debug!(%document, indexes = slots.len(), "key indexes released");
        }
        released.is_some()
    }

    /// Number of documents currently holding indexes.
    #[must_use]
    pub fn indexed_documents(&self) -> usize {
        self.indexes.lock().borrow().len()
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("keys", &self.sets.len())
            .field("indexed_documents", &self.indexed_documents())
            .finish()
    }
}

impl DocumentObserver for KeyManager {
    fn document_discarded(&self, document: DocumentId) {
        self.release_document(document);
    }
}

// =============================================================================
// Index Construction
// =============================================================================

/// Evaluates one definition's use-expression on a matched node and files the
/// node under each resulting value.
#[allow(clippy::too_many_arguments)]
fn index_node(
    index: &mut KeyIndex,
    set: &KeyDefinitionSet,
    definition: &KeyDefinition,
    node: NodeId,
    sought: PrimitiveType,
    role: IndexRole,
    in_order: bool,
    ctx: &Context<'_>,
) -> Result<()> {
    let seated = ctx.seated_on(node);
    for item in definition.use_expression().evaluate(&seated)? {
        let item = item?;
        if role == IndexRole::Untyped {
            index.record_type(item.primitive_type());
        }
        let lenient = role == IndexRole::Secondary;
        if let Some(key) = key_for_use_value(set, definition, item, sought, lenient)? {
            index.insert(key, node, in_order);
        }
    }
    Ok(())
}

/// Maps a use-expression value to its index key for the sought type.
///
/// `Ok(None)` means the value is silently left out of the index. With
/// `lenient`, general-comparison conversion and comparison failures are
/// skipped rather than raised.
fn key_for_use_value(
    set: &KeyDefinitionSet,
    definition: &KeyDefinition,
    item: AtomicValue,
    sought: PrimitiveType,
    lenient: bool,
) -> Result<Option<KeyValue>> {
    let collation = set.collation();
    if set.is_backwards_compatible() {
        return Ok(Some(KeyValue::text(&item.string_value(), collation)));
    }

    let general = definition.is_general_comparison();
    let convert_untyped = general
        && item.primitive_type() == PrimitiveType::UntypedAtomic
        && !sought.is_string_like();
    let item = if convert_untyped {
        match item.convert(sought) {
            Ok(converted) => converted,
            Err(_) if lenient => return Ok(None),
            Err(err) => return Err(err),
        }
    } else {
        item
    };

    let actual = item.primitive_type();
    if !actual.is_comparable(sought) {
        // Under general comparison an untyped sought value is searched in
        // every found type's own index, so only typed searches fail here.
        if general && !lenient && sought != PrimitiveType::UntypedAtomic {
            return Err(Error::non_comparable(sought, actual));
        }
        return Ok(None);
    }

    if sought.is_string_like() {
        return Ok(Some(KeyValue::text(&item.string_value(), collation)));
    }
    if item.is_nan() {
        return Ok(None);
    }
    match item.convert(sought) {
        Ok(converted) => Ok(KeyValue::from_atomic(&converted, collation)),
        Err(_) => Ok(None),
    }
}

/// Looks a sought value up in a built index.
fn probe(index: &KeyIndex, set: &KeyDefinitionSet, sought: &AtomicValue) -> NodeList {
    KeyValue::from_atomic(sought, set.collation())
        .and_then(|key| index.get(&key).cloned())
        .unwrap_or_default()
}
