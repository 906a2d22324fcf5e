//! Typed state records threaded through workflow graphs
//!
//! Every graph instantiation declares a concrete state struct with a fixed,
//! known-in-advance field schema and a companion partial-update struct. Nodes
//! never mutate state directly; they return an update describing only the
//! fields they change, and the executor merges it in. This keeps the
//! missing-field and overwrite invariants checkable instead of burying them
//! in a string-keyed bag.

/// A partial update to a graph state.
///
/// Updates are what nodes return: a record of only the fields being written.
/// `fields()` names the state fields the update touches, which is how the
/// executor enforces disjoint writes across fan-out siblings.
pub trait StateUpdate: Clone + Send + Sync + 'static {
    /// An update that writes nothing.
    fn empty() -> Self;

    /// Whether this update writes nothing.
    fn is_empty(&self) -> bool;

    /// Names of the state fields this update writes.
    fn fields(&self) -> Vec<&'static str>;
}

/// State record for one graph instantiation.
///
/// Implementations are plain structs. `apply_update` is pure: it returns a
/// new state with the update merged in, last-writer-wins per field. A field,
/// once set, persists for the remainder of the invocation unless overwritten.
pub trait GraphState: Clone + Send + Sync + 'static {
    /// The partial-update type nodes produce for this state.
    type Update: StateUpdate;

    /// Merge a single update into this state, returning the new state.
    fn apply_update(&self, update: Self::Update) -> Self;

    /// Fold several updates into one. Later updates win per field; list
    /// fields accumulate. Used at the fan-in barrier, where the updates are
    /// guaranteed disjoint and the fold is therefore order-independent.
    fn merge_updates(updates: Vec<Self::Update>) -> Self::Update;

    /// Apply several updates in order.
    fn apply_updates(&self, updates: Vec<Self::Update>) -> Self {
        self.apply_update(Self::merge_updates(updates))
    }
}
