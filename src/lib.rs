//! Replay-latest value stores fed by real-time backend listeners.
//!
//! A [`PushAdapter`] holds the latest value pushed by an external source and lets any
//! number of observers read it synchronously or subscribe to it.
//! [`RecordStore`], [`CollectionStore`] and [`SessionStore`] adapt the listener API of a
//! document database ([`DocumentClient`]) and of an authentication provider ([`AuthClient`]).
//!
//! ```ignore
//! let sdk = SdkContext::new(AdapterConfig::default());
//! sdk.configure(auth, documents);
//!
//! let todos = sdk.collection_store::<Todo>("todos", None);
//! let _source = todos.start()?;
//! let _view = todos.subscribe(|todos| render(todos));
//! ```
mod adapter;
mod config;
mod decode;
mod error;
mod latest;
mod sdk;
mod source;
mod stores;
mod stream;
mod subscription;

#[cfg(test)]
mod utils;

pub use adapter::*;
pub use config::*;
pub use decode::*;
pub use error::*;
pub use latest::*;
pub use sdk::*;
pub use source::*;
pub use stores::*;
pub use stream::*;
pub use subscription::*;
