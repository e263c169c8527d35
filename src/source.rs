//! Interfaces of the backend a store listens to.
//!
//! Backend bindings implement [`DocumentClient`] and [`AuthClient`] on top of their SDK's
//! listener API.

use serde::Serialize;

use crate::Subscription;

/// Decoded fields of a record, as delivered by the backend.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Callback invoked by the backend for every pushed snapshot.
pub type SnapshotHandler<S> = Box<dyn FnMut(S)>;

/// State of a single record at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSnapshot<R> {
    id: String,
    reference: R,
    fields: Option<Fields>,
}
impl<R> RecordSnapshot<R> {
    /// `fields` is `None` if the record does not exist.
    pub fn new(id: impl Into<String>, reference: R, fields: Option<Fields>) -> Self {
        Self {
            id: id.into(),
            reference,
            fields,
        }
    }
    pub fn missing(id: impl Into<String>, reference: R) -> Self {
        Self::new(id, reference, None)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    /// Raw handle of the record in the backend.
    pub fn reference(&self) -> &R {
        &self.reference
    }
    pub fn fields(&self) -> Option<&Fields> {
        self.fields.as_ref()
    }
    pub fn exists(&self) -> bool {
        self.fields.is_some()
    }
}

/// Full result set of a query at one point in time, in the order the backend delivered it.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySnapshot<R> {
    records: Vec<RecordSnapshot<R>>,
}
impl<R> QuerySnapshot<R> {
    pub fn new(records: Vec<RecordSnapshot<R>>) -> Self {
        Self { records }
    }
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
    pub fn records(&self) -> &[RecordSnapshot<R>] {
        &self.records
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
impl<R> FromIterator<RecordSnapshot<R>> for QuerySnapshot<R> {
    fn from_iter<I: IntoIterator<Item = RecordSnapshot<R>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Identifies a single record, either by its path or by a reference the backend already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordLocator<R> {
    Path(String),
    Ref(R),
}
impl<R> RecordLocator<R> {
    pub(crate) fn describe(&self) -> String {
        match self {
            RecordLocator::Path(path) => format!("record `{path}`"),
            RecordLocator::Ref(_) => "record <ref>".to_string(),
        }
    }
}
impl<R> From<&str> for RecordLocator<R> {
    fn from(path: &str) -> Self {
        RecordLocator::Path(path.to_string())
    }
}
impl<R> From<String> for RecordLocator<R> {
    fn from(path: String) -> Self {
        RecordLocator::Path(path)
    }
}

/// Identifies a result set, either a whole collection by path or a backend query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryLocator<Q> {
    Collection(String),
    Query(Q),
}
impl<Q> QueryLocator<Q> {
    pub(crate) fn describe(&self) -> String {
        match self {
            QueryLocator::Collection(path) => format!("collection `{path}`"),
            QueryLocator::Query(_) => "collection <query>".to_string(),
        }
    }
}
impl<Q> From<&str> for QueryLocator<Q> {
    fn from(path: &str) -> Self {
        QueryLocator::Collection(path.to_string())
    }
}
impl<Q> From<String> for QueryLocator<Q> {
    fn from(path: String) -> Self {
        QueryLocator::Collection(path)
    }
}

/// Real-time listener API of a document database.
///
/// Errors reported by the backend itself (dropped connections, denied permissions)
/// stay on the backend's own error channel.
pub trait DocumentClient: 'static {
    /// Raw record reference. Serialized into the `ref` field of collection items.
    ///
    /// Collection items therefore carry a serialized copy of the reference, not the handle
    /// itself. A backend whose references are live handles should use a serializable key
    /// (such as the record path) here and resolve it back to a handle where needed.
    type Ref: Clone + Serialize + 'static;
    type Query: 'static;

    fn subscribe_record(
        &self,
        locator: &RecordLocator<Self::Ref>,
        on_snapshot: SnapshotHandler<RecordSnapshot<Self::Ref>>,
    ) -> Subscription;

    fn subscribe_query(
        &self,
        locator: &QueryLocator<Self::Query>,
        on_snapshot: SnapshotHandler<QuerySnapshot<Self::Ref>>,
    ) -> Subscription;
}

/// Session change API of an authentication provider.
pub trait AuthClient: 'static {
    type Principal: Clone + 'static;

    /// The signed-in principal, if any, at the time of the call.
    fn current_principal(&self) -> Option<Self::Principal>;

    /// `on_change` receives `None` when the session ends.
    fn subscribe_session(
        &self,
        on_change: SnapshotHandler<Option<Self::Principal>>,
    ) -> Subscription;
}
