use std::{
    any::Any,
    mem::take,
    rc::{Rc, Weak},
};


/// Handle to an open registration, such as an observer or a backend listener.
///
/// The registration is released when the handle is dropped.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    /// A handle that releases nothing.
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
    pub fn from_weak_fn<T: 'static>(
        this: Weak<T>,
        unsubscribe: impl Fn(Rc<T>) + Copy + 'static,
    ) -> Self {
        Subscription(RawSubscription::WeakFn {
            this,
            unsubscribe: Box::new(move |this| {
                if let Some(this) = this.upgrade() {
                    if let Ok(this) = this.downcast() {
                        unsubscribe(this)
                    }
                }
            }),
        })
    }

    /// Returns `true` if dropping this handle has no effect.
    pub fn is_empty(&self) -> bool {
        matches!(self.0, RawSubscription::Empty)
    }

    /// Releases the registration now.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        match take(&mut self.0) {
            RawSubscription::Empty => {}
            RawSubscription::Fn(f) => f(),
            RawSubscription::WeakFn { this, unsubscribe } => unsubscribe(this),
        }
    }
}
impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.0 {
            RawSubscription::Empty => "empty",
            RawSubscription::Fn(_) => "fn",
            RawSubscription::WeakFn { .. } => "weak_fn",
        };
        write!(f, "Subscription({kind})")
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
    WeakFn {
        this: Weak<dyn Any>,
        unsubscribe: Box<dyn Fn(Weak<dyn Any>)>,
    },
}
