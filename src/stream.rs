use futures::Stream;
use std::{
    cell::RefCell,
    mem::{replace, take},
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use crate::{LatestValue, Subscription};

#[derive(Default)]
enum ValueState<T> {
    #[default]
    None,
    Pending(Waker),
    Ready(T),
}

/// Stream of the values held by a [`LatestValue`].
///
/// Values set between two polls are coalesced; only the latest one is yielded.
/// The stream ends once the container is dropped.
pub struct LatestStream<T: 'static> {
    state: Rc<RefCell<ValueState<T>>>,
    _subscription: Subscription,
}

impl<T: Clone + 'static> LatestStream<T> {
    pub(crate) fn new(source: &LatestValue<T>) -> Self {
        let state = Rc::new(RefCell::new(ValueState::None));
        let sender = StreamSender(state.clone());
        let subscription = source.subscribe(move |value| sender.send(value.clone()));
        Self {
            state,
            _subscription: subscription,
        }
    }
}

impl<T: 'static> Stream for LatestStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let is_closed = Rc::strong_count(&self.state) == 1;
        let mut d = self.state.borrow_mut();
        match take(&mut *d) {
            ValueState::Ready(value) => Poll::Ready(Some(value)),
            ValueState::None | ValueState::Pending(_) if is_closed => Poll::Ready(None),
            ValueState::None | ValueState::Pending(_) => {
                *d = ValueState::Pending(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

struct StreamSender<T>(Rc<RefCell<ValueState<T>>>);

impl<T> StreamSender<T> {
    fn send(&self, value: T) {
        let old = replace(&mut *self.0.borrow_mut(), ValueState::Ready(value));
        if let ValueState::Pending(waker) = old {
            waker.wake();
        }
    }
}
impl<T> Drop for StreamSender<T> {
    fn drop(&mut self) {
        if let ValueState::Pending(waker) = &*self.0.borrow() {
            waker.wake_by_ref();
        }
    }
}
