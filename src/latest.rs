use std::{
    cell::{Cell, Ref, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use derive_ex::derive_ex;
use serde::{Deserialize, Serialize};
use slabmap::SlabMap;

use crate::{LatestStream, Subscription};


type Observer<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Similar to `Rc<RefCell<T>>`, but every observer is told about the latest value.
///
/// A new observer receives the current value immediately, then every value set afterwards.
/// Cloning produces another handle to the same container.
#[derive_ex(Clone, bound())]
pub struct LatestValue<T: 'static>(Rc<LatestNode<T>>);

impl<T: 'static> LatestValue<T> {
    /// Create a new `LatestValue` holding `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(LatestNode {
            value: RefCell::new(value),
            observers: RefCell::new(SlabMap::new()),
            pending: RefCell::new(VecDeque::new()),
            is_notifying: Cell::new(false),
        }))
    }

    /// Obtains a reference to the current value.
    ///
    /// Calling [`set`](Self::set) while the reference is alive panics.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.value.borrow()
    }

    /// Gets the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.borrow().clone()
    }

    /// Replaces the value and notifies every observer.
    ///
    /// A value set from inside an observer is delivered after the current round of notifications.
    pub fn set(&self, value: T) {
        self.0.pending.borrow_mut().push_back(value);
        if self.0.is_notifying.replace(true) {
            return;
        }
        let _guard = NotifyingGuard(&self.0.is_notifying);
        self.0.flush();
    }

    /// Registers `f` as an observer.
    ///
    /// `f` is called with the current value before this method returns.
    /// Values set by `f` during that call are delivered after it returns.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        let observer: Observer<T> = Rc::new(RefCell::new(f));
        let key = self.0.observers.borrow_mut().insert(observer.clone());
        let guard =
            (!self.0.is_notifying.replace(true)).then(|| NotifyingGuard(&self.0.is_notifying));
        (&mut *observer.borrow_mut())(&self.0.value.borrow());
        if guard.is_some() {
            self.0.flush();
        }
        drop(guard);
        Subscription::from_weak_fn(Rc::downgrade(&self.0), move |node: Rc<LatestNode<T>>| {
            node.observers.borrow_mut().remove(key);
        })
    }

    /// Returns a stream that yields the current value, then the latest value after each change.
    pub fn to_stream(&self) -> LatestStream<T>
    where
        T: Clone,
    {
        LatestStream::new(self)
    }

    pub fn observer_count(&self) -> usize {
        self.0.observers.borrow().len()
    }
}
impl<T: Default + 'static> Default for LatestValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
impl<T: std::fmt::Debug> std::fmt::Debug for LatestValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.value.try_borrow() {
            Ok(value) => std::fmt::Debug::fmt(&*value, f),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}
impl<T> Serialize for LatestValue<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self.0.value.try_borrow() {
            Ok(value) => T::serialize(&*value, serializer),
            Err(_) => Err(serde::ser::Error::custom("borrowed")),
        }
    }
}
impl<'de, T> Deserialize<'de> for LatestValue<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<LatestValue<T>, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(LatestValue::new)
    }
}

struct LatestNode<T: 'static> {
    value: RefCell<T>,
    observers: RefCell<SlabMap<Observer<T>>>,
    pending: RefCell<VecDeque<T>>,
    is_notifying: Cell<bool>,
}
impl<T: 'static> LatestNode<T> {
    fn flush(&self) {
        loop {
            let Some(value) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            *self.value.borrow_mut() = value;
            self.notify();
        }
    }
    fn notify(&self) {
        let observers: Vec<(usize, Observer<T>)> = self
            .observers
            .borrow()
            .iter()
            .map(|(key, o)| (key, o.clone()))
            .collect();
        let value = self.value.borrow();
        for (key, observer) in observers {
            // skip observers removed earlier in this round
            if self.is_registered(key, &observer) {
                (&mut *observer.borrow_mut())(&value);
            }
        }
    }
    fn is_registered(&self, key: usize, observer: &Observer<T>) -> bool {
        self.observers
            .borrow()
            .get(key)
            .is_some_and(|o| Rc::ptr_eq(o, observer))
    }
}

struct NotifyingGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
