use std::rc::Rc;

use derive_ex::derive_ex;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::{
    AdapterConfig, AuthClient, CollectionStore, DocumentClient, LatestValue, QueryLocator,
    RecordLocator, RecordStore, SessionStore, Subscription,
};


/// Backend clients in use.
#[derive_ex(Clone, bound())]
pub struct Sdk<A, D> {
    pub auth: Rc<A>,
    pub documents: Rc<D>,
}

/// Holds the configured backend clients and builds stores from them.
///
/// Stores built while nothing is configured come up static.
/// Stores already built keep the clients they were built with.
pub struct SdkContext<A: 'static, D: 'static> {
    sdk: LatestValue<Option<Sdk<A, D>>>,
    config: AdapterConfig,
}

impl<A: AuthClient, D: DocumentClient> SdkContext<A, D> {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            sdk: LatestValue::new(None),
            config,
        }
    }

    pub fn configure(&self, auth: Rc<A>, documents: Rc<D>) {
        info!("backend clients configured");
        self.sdk.set(Some(Sdk { auth, documents }));
    }
    pub fn clear(&self) {
        info!("backend clients cleared");
        self.sdk.set(None);
    }

    pub fn current(&self) -> Option<Sdk<A, D>> {
        self.sdk.get()
    }
    pub fn is_configured(&self) -> bool {
        self.sdk.borrow().is_some()
    }
    pub fn config(&self) -> AdapterConfig {
        self.config
    }

    /// Observes configuration changes. `f` receives the current configuration first.
    pub fn subscribe(&self, mut f: impl FnMut(Option<&Sdk<A, D>>) + 'static) -> Subscription {
        self.sdk.subscribe(move |sdk| f(sdk.as_ref()))
    }

    pub fn record_store<T>(
        &self,
        locator: impl Into<RecordLocator<D::Ref>>,
        initial: Option<T>,
    ) -> RecordStore<T>
    where
        T: DeserializeOwned + 'static,
    {
        RecordStore::new(self.documents(), locator, initial, self.config)
    }

    pub fn collection_store<T>(
        &self,
        locator: impl Into<QueryLocator<D::Query>>,
        initial: Option<Vec<T>>,
    ) -> CollectionStore<T>
    where
        T: DeserializeOwned + 'static,
    {
        CollectionStore::new(self.documents(), locator, initial, self.config)
    }

    pub fn session_store(&self) -> SessionStore<A::Principal> {
        let auth = self.sdk.borrow().as_ref().map(|sdk| sdk.auth.clone());
        SessionStore::new(auth, self.config)
    }

    fn documents(&self) -> Option<Rc<D>> {
        self.sdk.borrow().as_ref().map(|sdk| sdk.documents.clone())
    }
}
impl<A: AuthClient, D: DocumentClient> Default for SdkContext<A, D> {
    fn default() -> Self {
        Self::new(AdapterConfig::default())
    }
}
