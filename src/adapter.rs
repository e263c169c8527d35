use std::{
    cell::{Ref, RefCell},
    rc::{Rc, Weak},
};

use derive_ex::derive_ex;
use parse_display::Display;
use tracing::{debug, error, warn};

use crate::{
    AdapterConfig, ConnectionPolicy, DecodeError, DecodePolicy, LatestStream, LatestValue,
    StartError, Subscription,
};


/// A push-based source of values, such as a backend listener.
pub trait PushSource: 'static {
    type Value: 'static;

    /// Opens the subscription. Every pushed snapshot must be passed to `sink`.
    ///
    /// The returned `Subscription` releases the backend listener when dropped.
    fn open(self, sink: PushSink<Self::Value>) -> Subscription;
}

/// Receiving end of a [`PushSource`], handed to the source by [`PushAdapter::start`].
///
/// Holds the adapter weakly. Pushes made after the adapter is dropped are ignored.
#[derive_ex(Clone, bound())]
pub struct PushSink<T: 'static> {
    node: Weak<AdapterNode<T>>,
}
impl<T: 'static> PushSink<T> {
    /// Delivers the outcome of decoding one snapshot.
    pub fn push(&self, value: Result<T, DecodeError>) {
        if let Some(node) = self.node.upgrade() {
            node.on_push(value);
        }
    }
}

/// Lifecycle state of a [`PushAdapter`].
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum AdapterStatus {
    /// Constructed, not started.
    #[display("idle")]
    Idle,
    /// No source will ever be opened.
    #[display("static")]
    Static,
    #[display("live")]
    Live,
    /// A snapshot failed to decode. The source has been released.
    #[display("failed: {0}")]
    Failed(DecodeError),
    #[display("closed")]
    Closed,
}

type Connector<T> = Box<dyn FnOnce(PushSink<T>) -> Subscription>;

/// Holds the latest value pushed by an external source.
///
/// Construction performs no I/O. [`start`](Self::start) opens the source, and the
/// returned `Subscription` closes it again.
/// Without a source, or with [`ConnectionPolicy::StaticFallback`], the adapter keeps its
/// initial value forever.
#[derive_ex(Clone, bound())]
pub struct PushAdapter<T: 'static>(Rc<AdapterNode<T>>);

impl<T: 'static> PushAdapter<T> {
    pub fn new<S>(
        label: impl Into<String>,
        source: Option<S>,
        initial: T,
        config: AdapterConfig,
    ) -> Self
    where
        S: PushSource<Value = T>,
    {
        let label = label.into();
        let (status, connector) = match (source, config.connection) {
            (Some(source), ConnectionPolicy::Live) => {
                let connector: Connector<T> = Box::new(move |sink| source.open(sink));
                (AdapterStatus::Idle, Some(connector))
            }
            (None, _) => {
                warn!(adapter = %label, "backend client is not initialized, value will not update");
                (AdapterStatus::Static, None)
            }
            (Some(_), ConnectionPolicy::StaticFallback) => {
                warn!(adapter = %label, "live connections are unavailable, value will not update");
                (AdapterStatus::Static, None)
            }
        };
        Self::from_parts(label, config, initial, status, connector)
    }

    /// An adapter that never updates.
    pub fn from_value(label: impl Into<String>, value: T) -> Self {
        Self::from_parts(
            label.into(),
            AdapterConfig::static_fallback(),
            value,
            AdapterStatus::Static,
            None,
        )
    }

    fn from_parts(
        label: String,
        config: AdapterConfig,
        initial: T,
        status: AdapterStatus,
        connector: Option<Connector<T>>,
    ) -> Self {
        Self(Rc::new(AdapterNode {
            label,
            config,
            value: LatestValue::new(initial),
            state: RefCell::new(AdapterState {
                status,
                connector,
                source: None,
            }),
        }))
    }

    /// Opens the source.
    ///
    /// Dropping or disposing the returned handle closes the source and the adapter.
    /// A static adapter returns an empty handle.
    pub fn start(&self) -> Result<Subscription, StartError> {
        let connector = {
            let mut s = self.0.state.borrow_mut();
            match s.status {
                AdapterStatus::Idle => {}
                AdapterStatus::Static => return Ok(Subscription::empty()),
                AdapterStatus::Live | AdapterStatus::Failed(_) => {
                    return Err(StartError::AlreadyStarted)
                }
                AdapterStatus::Closed => return Err(StartError::Closed),
            }
            let Some(connector) = s.connector.take() else {
                return Err(StartError::AlreadyStarted);
            };
            s.status = AdapterStatus::Live;
            connector
        };
        let source = connector(PushSink {
            node: Rc::downgrade(&self.0),
        });
        let mut s = self.0.state.borrow_mut();
        match s.status {
            AdapterStatus::Live => {
                s.source = Some(source);
                debug!(adapter = %self.0.label, "source opened");
            }
            AdapterStatus::Closed => {
                drop(s);
                drop(source);
                return Err(StartError::Closed);
            }
            // failed while opening
            _ => {
                drop(s);
                drop(source);
            }
        }
        Ok(Subscription::from_weak_fn(Rc::downgrade(&self.0), AdapterNode::close))
    }

    /// Closes the source. Later pushes are ignored.
    pub fn dispose(&self) {
        self.0.clone().close();
    }

    pub fn status(&self) -> AdapterStatus {
        self.0.state.borrow().status.clone()
    }
    pub fn label(&self) -> &str {
        &self.0.label
    }
    pub fn config(&self) -> AdapterConfig {
        self.0.config
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.value.borrow()
    }
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.get()
    }

    /// Registers an observer. It receives the current value first.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        self.0.value.subscribe(f)
    }
    pub fn to_stream(&self) -> LatestStream<T>
    where
        T: Clone,
    {
        self.0.value.to_stream()
    }

    /// The container this adapter writes to.
    pub fn value(&self) -> LatestValue<T> {
        self.0.value.clone()
    }
}
impl<T: std::fmt::Debug> std::fmt::Debug for PushAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushAdapter")
            .field("label", &self.0.label)
            .field("status", &self.status())
            .field("value", &self.0.value)
            .finish()
    }
}

struct AdapterNode<T: 'static> {
    label: String,
    config: AdapterConfig,
    value: LatestValue<T>,
    state: RefCell<AdapterState<T>>,
}

struct AdapterState<T: 'static> {
    status: AdapterStatus,
    connector: Option<Connector<T>>,
    source: Option<Subscription>,
}

impl<T: 'static> AdapterNode<T> {
    fn on_push(&self, value: Result<T, DecodeError>) {
        if self.state.borrow().status != AdapterStatus::Live {
            debug!(adapter = %self.label, "ignored push to inactive adapter");
            return;
        }
        match value {
            Ok(value) => self.value.set(value),
            Err(e) => match self.config.decode {
                DecodePolicy::FailFast => {
                    error!(
                        adapter = %self.label,
                        error = %e,
                        "undecodable snapshot, adapter stops updating"
                    );
                    let source = {
                        let mut s = self.state.borrow_mut();
                        s.status = AdapterStatus::Failed(e);
                        s.source.take()
                    };
                    drop(source);
                }
                DecodePolicy::Skip => {
                    warn!(adapter = %self.label, error = %e, "skipped undecodable snapshot");
                }
            },
        }
    }

    fn close(self: Rc<Self>) {
        let source = {
            let mut s = self.state.borrow_mut();
            if matches!(s.status, AdapterStatus::Static | AdapterStatus::Closed) {
                return;
            }
            s.status = AdapterStatus::Closed;
            s.connector = None;
            s.source.take()
        };
        // released outside the borrow, the backend may call back into the adapter
        drop(source);
        debug!(adapter = %self.label, "source closed");
    }
}
