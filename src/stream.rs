//! Bridge from a property to a `futures::Stream`.

use crate::error::PropertyError;
use crate::observer::Observer;
use crate::property::{ReactiveProperty, ReadOnlyProperty};
use crate::subject::Subscription;
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Forwards delivered values into an unbounded channel.
struct Forward<T> {
    tx: mpsc::UnboundedSender<Option<T>>,
}

impl<T: Clone> Observer<Option<T>> for Forward<T> {
    fn next(&self, value: &Option<T>) {
        // Ignore errors - if the receiver is dropped, nobody is listening
        let _ = self.tx.unbounded_send(value.clone());
    }

    fn error(&self, _err: &PropertyError) {
        self.tx.close_channel();
    }

    fn complete(&self) {
        self.tx.close_channel();
    }
}

/// Values of a property as an async stream.
///
/// The stream ends when the property is closed. Dropping it cancels the
/// underlying subscription.
pub struct PropertyStream<T> {
    rx: mpsc::UnboundedReceiver<Option<T>>,
    subscription: Subscription,
}

impl<T> Stream for PropertyStream<T> {
    type Item = Option<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_next_unpin(cx)
    }
}

impl<T> Drop for PropertyStream<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveProperty<T> {
    /// Subscribe a stream of values. With replay enabled the current value is
    /// the first item.
    pub fn stream(&self) -> PropertyStream<T> {
        let (tx, rx) = mpsc::unbounded();
        let subscription = self.subscribe(Forward { tx });
        PropertyStream { rx, subscription }
    }
}

impl<T: Clone + PartialEq + 'static> ReadOnlyProperty<T> {
    pub fn stream(&self) -> PropertyStream<T> {
        self.property().stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ReactivePropertyMode;
    use futures::executor::block_on;

    #[test]
    fn test_stream_yields_replay_then_changes() {
        let prop = ReactiveProperty::with_value(1);
        let stream = prop.stream();

        prop.set(1);
        prop.set(2);
        assert_eq!(prop.try_set(None), Ok(false));
        prop.unsubscribe();

        let values: Vec<_> = block_on(stream.collect());
        assert_eq!(values, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_stream_without_replay() {
        let prop = ReactiveProperty::new(
            Some("a".to_string()),
            ReactivePropertyMode::default().raise_latest_value_on_subscribe(false),
        );
        let mut stream = prop.read_only().stream();

        prop.set("b".to_string());

        assert_eq!(block_on(stream.next()), Some(Some("b".to_string())));
        prop.unsubscribe();
        assert_eq!(block_on(stream.next()), None);
    }

    #[test]
    fn test_dropping_stream_unsubscribes() {
        let prop = ReactiveProperty::with_value(0);
        let stream = prop.stream();
        assert_eq!(prop.observer_count(), 1);

        drop(stream);

        assert_eq!(prop.observer_count(), 0);
        prop.set(1);
    }

    #[test]
    fn test_stream_on_closed_property_is_empty() {
        let prop = ReactiveProperty::with_value(5);
        prop.unsubscribe();

        let values: Vec<Option<i32>> = block_on(prop.stream().collect());
        assert!(values.is_empty());
    }
}
