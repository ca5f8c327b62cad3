//! Observer capability and the adapter for loose callbacks.

use crate::error::PropertyError;
use std::fmt;

/// Something that can receive values, an error, and a completion signal.
///
/// Only `next` is required. Methods take `&self` so an observer can be
/// invoked again while a previous call is still on the stack (for instance
/// when a callback sets the property it is observing).
pub trait Observer<T> {
    /// Receive a value.
    fn next(&self, value: &T);

    /// Receive a terminal error.
    fn error(&self, _err: &PropertyError) {}

    /// Receive the terminal completion signal.
    fn complete(&self) {}
}

impl<T, F> Observer<T> for F
where
    F: Fn(&T),
{
    fn next(&self, value: &T) {
        self(value)
    }
}

/// The empty observer.
impl<T> Observer<T> for () {
    fn next(&self, _value: &T) {}
}

type NextFn<T> = Box<dyn Fn(&T)>;
type ErrorFn = Box<dyn Fn(&PropertyError)>;
type CompleteFn = Box<dyn Fn()>;

/// An observer assembled from separate next/error/complete callbacks.
///
/// ```rust,no_run
/// use reactive_property::prelude::*;
///
/// let prop = ReactiveProperty::with_value(1);
/// let _sub = prop.subscribe(
///     Callbacks::new(|v: &Option<i32>| println!("{v:?}")).on_complete(|| println!("done")),
/// );
/// ```
pub struct Callbacks<T> {
    next: Option<NextFn<T>>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
}

impl<T> Callbacks<T> {
    /// Start from a `next` callback.
    pub fn new(next: impl Fn(&T) + 'static) -> Self {
        Self {
            next: Some(Box::new(next)),
            error: None,
            complete: None,
        }
    }

    /// Callbacks that ignore everything.
    pub fn empty() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }

    /// Attach an error callback.
    pub fn on_error(mut self, error: impl Fn(&PropertyError) + 'static) -> Self {
        self.error = Some(Box::new(error));
        self
    }

    /// Attach a completion callback.
    pub fn on_complete(mut self, complete: impl Fn() + 'static) -> Self {
        self.complete = Some(Box::new(complete));
        self
    }
}

impl<T> Observer<T> for Callbacks<T> {
    fn next(&self, value: &T) {
        if let Some(next) = &self.next {
            next(value);
        }
    }

    fn error(&self, err: &PropertyError) {
        if let Some(error) = &self.error {
            error(err);
        }
    }

    fn complete(&self) {
        if let Some(complete) = &self.complete {
            complete();
        }
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("next", &self.next.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// Normalize loose, optional callbacks into a single observer.
pub fn to_observer<T>(
    next: Option<impl Fn(&T) + 'static>,
    error: Option<impl Fn(&PropertyError) + 'static>,
    complete: Option<impl Fn() + 'static>,
) -> Callbacks<T> {
    Callbacks {
        next: next.map(|f| Box::new(f) as NextFn<T>),
        error: error.map(|f| Box::new(f) as ErrorFn),
        complete: complete.map(|f| Box::new(f) as CompleteFn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closure_is_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let observer = move |v: &i32| seen_clone.lock().push(*v);

        Observer::next(&observer, &3);
        Observer::<i32>::complete(&observer);

        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn test_callbacks_route_each_signal() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let observer = Callbacks::new(move |v: &i32| a.lock().push(format!("next {v}")))
            .on_error(move |e| b.lock().push(format!("error {e}")))
            .on_complete(move || c.lock().push("complete".to_string()));

        observer.next(&1);
        observer.error(&PropertyError::Closed);
        observer.complete();

        assert_eq!(
            *log.lock(),
            vec!["next 1", "error reactive property is closed", "complete"]
        );
    }

    #[test]
    fn test_unit_observer_ignores_everything() {
        Observer::<i32>::next(&(), &1);
        Observer::<i32>::error(&(), &PropertyError::Closed);
        Observer::<i32>::complete(&());
    }

    #[test]
    fn test_to_observer_with_missing_callbacks() {
        let completed = Arc::new(Mutex::new(false));
        let completed_clone = completed.clone();
        let observer = to_observer(
            None::<fn(&i32)>,
            None::<fn(&PropertyError)>,
            Some(move || *completed_clone.lock() = true),
        );

        observer.next(&5);
        observer.error(&PropertyError::Closed);
        observer.complete();

        assert!(*completed.lock());
    }
}
