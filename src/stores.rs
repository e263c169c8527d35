use std::{marker::PhantomData, ops::Deref, rc::Rc};

use derive_ex::derive_ex;
use serde::de::DeserializeOwned;

use crate::{
    decode_collection, decode_record, AdapterConfig, AuthClient, DocumentClient, PushAdapter,
    PushSink, PushSource, QueryLocator, RecordLocator, Subscription,
};


/// Live view of a single record. The value is `None` while the record does not exist.
#[derive_ex(Clone, bound())]
pub struct RecordStore<T: 'static>(PushAdapter<Option<T>>);

impl<T: DeserializeOwned + 'static> RecordStore<T> {
    pub fn new<C: DocumentClient>(
        client: Option<Rc<C>>,
        locator: impl Into<RecordLocator<C::Ref>>,
        initial: Option<T>,
        config: AdapterConfig,
    ) -> Self {
        let locator = locator.into();
        let label = locator.describe();
        let source = client.map(|client| RecordSource {
            client,
            locator,
            _value: PhantomData,
        });
        Self(PushAdapter::new(label, source, initial, config))
    }
}
impl<T> Deref for RecordStore<T> {
    type Target = PushAdapter<Option<T>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

struct RecordSource<C: DocumentClient, T> {
    client: Rc<C>,
    locator: RecordLocator<C::Ref>,
    _value: PhantomData<fn() -> T>,
}
impl<C: DocumentClient, T: DeserializeOwned + 'static> PushSource for RecordSource<C, T> {
    type Value = Option<T>;
    fn open(self, sink: PushSink<Option<T>>) -> Subscription {
        self.client.subscribe_record(
            &self.locator,
            Box::new(move |snapshot| sink.push(decode_record(&snapshot))),
        )
    }
}

/// Live view of a query result.
///
/// Each item is decoded from the record's fields together with its `id` and `ref`.
/// The value is an empty list while nothing matches.
#[derive_ex(Clone, bound())]
pub struct CollectionStore<T: 'static>(PushAdapter<Vec<T>>);

impl<T: DeserializeOwned + 'static> CollectionStore<T> {
    /// `initial` defaults to an empty list.
    pub fn new<C: DocumentClient>(
        client: Option<Rc<C>>,
        locator: impl Into<QueryLocator<C::Query>>,
        initial: Option<Vec<T>>,
        config: AdapterConfig,
    ) -> Self {
        let locator = locator.into();
        let label = locator.describe();
        let source = client.map(|client| QuerySource {
            client,
            locator,
            _value: PhantomData,
        });
        Self(PushAdapter::new(label, source, initial.unwrap_or_default(), config))
    }
}
impl<T> Deref for CollectionStore<T> {
    type Target = PushAdapter<Vec<T>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

struct QuerySource<C: DocumentClient, T> {
    client: Rc<C>,
    locator: QueryLocator<C::Query>,
    _value: PhantomData<fn() -> T>,
}
impl<C: DocumentClient, T: DeserializeOwned + 'static> PushSource for QuerySource<C, T> {
    type Value = Vec<T>;
    fn open(self, sink: PushSink<Vec<T>>) -> Subscription {
        self.client.subscribe_query(
            &self.locator,
            Box::new(move |snapshot| sink.push(decode_collection(&snapshot))),
        )
    }
}

/// Live view of the signed-in principal. The value is `None` while nobody is signed in.
#[derive_ex(Clone, bound())]
pub struct SessionStore<P: 'static>(PushAdapter<Option<P>>);

impl<P: Clone + 'static> SessionStore<P> {
    /// Seeded with the client's current principal.
    pub fn new<A>(client: Option<Rc<A>>, config: AdapterConfig) -> Self
    where
        A: AuthClient<Principal = P>,
    {
        let initial = client.as_ref().and_then(|client| client.current_principal());
        let source = client.map(|client| SessionSource { client });
        Self(PushAdapter::new("session", source, initial, config))
    }
}
impl<P> Deref for SessionStore<P> {
    type Target = PushAdapter<Option<P>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

struct SessionSource<A> {
    client: Rc<A>,
}
impl<A: AuthClient> PushSource for SessionSource<A> {
    type Value = Option<A::Principal>;
    fn open(self, sink: PushSink<Option<A::Principal>>) -> Subscription {
        self.client
            .subscribe_session(Box::new(move |principal| sink.push(Ok(principal))))
    }
}
