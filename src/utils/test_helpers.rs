use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use slabmap::SlabMap;

use crate::{
    AuthClient, DocumentClient, Fields, QueryLocator, QuerySnapshot, RecordLocator,
    RecordSnapshot, SnapshotHandler, Subscription,
};

type Shared<S> = Rc<RefCell<SnapshotHandler<S>>>;

enum Listener {
    Record(String, Shared<RecordSnapshot<String>>),
    Query(String, Shared<QuerySnapshot<String>>),
}

type Listeners = RefCell<SlabMap<Listener>>;

fn unsubscribe(listeners: &Rc<Listeners>, key: usize) -> Subscription {
    Subscription::from_weak_fn(Rc::downgrade(listeners), move |listeners: Rc<Listeners>| {
        listeners.borrow_mut().remove(key);
    })
}

/// In-memory document database. References are record paths, queries are collection paths.
pub struct MemoryDocuments {
    listeners: Rc<Listeners>,
}

impl MemoryDocuments {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            listeners: Rc::new(RefCell::new(SlabMap::new())),
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Pushes the state of the record at `path` to its listeners. `None` means deleted.
    pub fn push_record(&self, path: &str, fields: Option<Fields>) {
        let handlers: Vec<_> = self
            .listeners
            .borrow()
            .values()
            .filter_map(|l| match l {
                Listener::Record(p, h) if p == path => Some(h.clone()),
                _ => None,
            })
            .collect();
        let id = path.rsplit('/').next().unwrap_or(path);
        for h in handlers {
            let snapshot = RecordSnapshot::new(id, path.to_string(), fields.clone());
            (&mut *h.borrow_mut())(snapshot);
        }
    }

    /// Pushes the result set of the collection at `path` to its listeners.
    pub fn push_query(&self, path: &str, records: &[(&str, Fields)]) {
        let handlers: Vec<_> = self
            .listeners
            .borrow()
            .values()
            .filter_map(|l| match l {
                Listener::Query(p, h) if p == path => Some(h.clone()),
                _ => None,
            })
            .collect();
        for h in handlers {
            let snapshot: QuerySnapshot<String> = records
                .iter()
                .map(|(id, fields)| {
                    RecordSnapshot::new(*id, format!("{path}/{id}"), Some(fields.clone()))
                })
                .collect();
            (&mut *h.borrow_mut())(snapshot);
        }
    }
}

impl DocumentClient for MemoryDocuments {
    type Ref = String;
    type Query = String;

    fn subscribe_record(
        &self,
        locator: &RecordLocator<String>,
        on_snapshot: SnapshotHandler<RecordSnapshot<String>>,
    ) -> Subscription {
        let path = match locator {
            RecordLocator::Path(path) | RecordLocator::Ref(path) => path.clone(),
        };
        let key = self
            .listeners
            .borrow_mut()
            .insert(Listener::Record(path, Rc::new(RefCell::new(on_snapshot))));
        unsubscribe(&self.listeners, key)
    }

    fn subscribe_query(
        &self,
        locator: &QueryLocator<String>,
        on_snapshot: SnapshotHandler<QuerySnapshot<String>>,
    ) -> Subscription {
        let path = match locator {
            QueryLocator::Collection(path) | QueryLocator::Query(path) => path.clone(),
        };
        let key = self
            .listeners
            .borrow_mut()
            .insert(Listener::Query(path, Rc::new(RefCell::new(on_snapshot))));
        unsubscribe(&self.listeners, key)
    }
}

type AuthListeners = RefCell<SlabMap<Shared<Option<String>>>>;

/// In-memory authentication provider. Principals are user names.
pub struct MemoryAuth {
    current: RefCell<Option<String>>,
    listeners: Rc<AuthListeners>,
}

impl MemoryAuth {
    pub fn new() -> Rc<Self> {
        Self::with_current(None)
    }
    pub fn signed_in(user: &str) -> Rc<Self> {
        Self::with_current(Some(user.to_string()))
    }
    fn with_current(current: Option<String>) -> Rc<Self> {
        Rc::new(Self {
            current: RefCell::new(current),
            listeners: Rc::new(RefCell::new(SlabMap::new())),
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn sign_in(&self, user: &str) {
        self.change(Some(user.to_string()));
    }
    pub fn sign_out(&self) {
        self.change(None);
    }

    fn change(&self, principal: Option<String>) {
        *self.current.borrow_mut() = principal.clone();
        let handlers: Vec<_> = self.listeners.borrow().values().cloned().collect();
        for h in handlers {
            (&mut *h.borrow_mut())(principal.clone());
        }
    }
}

impl AuthClient for MemoryAuth {
    type Principal = String;

    fn current_principal(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    fn subscribe_session(&self, on_change: SnapshotHandler<Option<String>>) -> Subscription {
        let key = self
            .listeners
            .borrow_mut()
            .insert(Rc::new(RefCell::new(on_change)));
        let listeners: Weak<AuthListeners> = Rc::downgrade(&self.listeners);
        Subscription::from_weak_fn(listeners, move |listeners: Rc<AuthListeners>| {
            listeners.borrow_mut().remove(key);
        })
    }
}

pub fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}
