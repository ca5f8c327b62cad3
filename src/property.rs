//! Core ReactiveProperty type and operations.

use crate::error::PropertyError;
use crate::mode::ReactivePropertyMode;
use crate::observer::{to_observer, Observer};
use crate::subject::{Subject, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Values with a "falsy" member, for properties that treat falsy values as
/// unset. See [`ReactiveProperty::with_truthiness`].
pub trait Falsy {
    fn is_falsy(&self) -> bool;
}

macro_rules! impl_falsy_int {
    ($($ty:ty),*) => {
        $(impl Falsy for $ty {
            fn is_falsy(&self) -> bool {
                *self == 0
            }
        })*
    };
}

impl_falsy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Falsy for f32 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Falsy for f64 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Falsy for bool {
    fn is_falsy(&self) -> bool {
        !*self
    }
}

impl Falsy for String {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl Falsy for &str {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

struct PropertyState<T> {
    latest: Option<T>,
    closed: bool,
    mode: ReactivePropertyMode,
    /// Present only for properties built with `with_truthiness`.
    falsy: Option<fn(&T) -> bool>,
}

impl<T: PartialEq> PropertyState<T> {
    fn is_truthy(&self, value: &T) -> bool {
        self.falsy.map_or(true, |falsy| !falsy(value))
    }

    /// Whether assigning `value` should be dropped without a notification.
    fn suppresses(&self, value: &Option<T>) -> bool {
        if !self.mode.distinct_until_changed {
            return false;
        }
        match (&self.latest, value) {
            (Some(current), Some(next)) => current == next,
            (current, None) => current.as_ref().is_some_and(|c| self.is_truthy(c)),
            (None, Some(_)) => false,
        }
    }
}

/// A value cell that notifies observers when it changes.
///
/// The value may be unset (`None`). Observers receive `&Option<T>`, in
/// subscription order, synchronously from inside [`set`](Self::set).
/// Cloning a property yields another handle to the same cell.
///
/// # Examples
///
/// ```rust,no_run
/// use reactive_property::prelude::*;
///
/// let count = ReactiveProperty::with_value(1);
/// let sub = count.subscribe(|v: &Option<i32>| println!("count = {v:?}"));
/// count.set(1); // suppressed, same value
/// count.set(2); // prints "count = Some(2)"
/// sub.unsubscribe();
/// count.unsubscribe();
/// ```
pub struct ReactiveProperty<T> {
    state: Rc<RefCell<PropertyState<T>>>,
    source: Subject<Option<T>>,
}

impl<T> Clone for ReactiveProperty<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            source: self.source.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveProperty<T> {
    /// Create a property with an optional initial value. The initial value
    /// does not produce a notification.
    pub fn new(initial: Option<T>, mode: ReactivePropertyMode) -> Self {
        Self::build(initial, mode, None)
    }

    /// Create a property holding `value`, with the default mode.
    pub fn with_value(value: T) -> Self {
        Self::new(Some(value), ReactivePropertyMode::default())
    }

    /// Create an unset property with the default mode.
    pub fn empty() -> Self {
        Self::new(None, ReactivePropertyMode::default())
    }

    /// Create a property that treats falsy values (`0`, `""`, `false`, ...)
    /// as unset: a falsy initial value is dropped, and assigning `None` over
    /// a falsy current value is never suppressed.
    pub fn with_truthiness(initial: Option<T>, mode: ReactivePropertyMode) -> Self
    where
        T: Falsy,
    {
        let initial = initial.filter(|value| !value.is_falsy());
        Self::build(initial, mode, Some(T::is_falsy))
    }

    fn build(
        initial: Option<T>,
        mode: ReactivePropertyMode,
        falsy: Option<fn(&T) -> bool>,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(PropertyState {
                latest: initial,
                closed: false,
                mode,
                falsy,
            })),
            source: Subject::new(),
        }
    }

    /// Get a clone of the current value. Still valid after teardown.
    pub fn get(&self) -> Option<T> {
        self.state.borrow().latest.clone()
    }

    /// Read the current value with a closure.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.state.borrow().latest.as_ref())
    }

    /// Whether a value has been set.
    pub fn is_set(&self) -> bool {
        self.state.borrow().latest.is_some()
    }

    pub fn mode(&self) -> ReactivePropertyMode {
        self.state.borrow().mode
    }

    /// Assign a value and notify observers, unless the assignment is
    /// suppressed as a duplicate. Does nothing once the property is closed.
    pub fn set(&self, value: impl Into<Option<T>>) {
        let _ = self.try_set(value);
    }

    /// Like [`set`](Self::set), but reports the outcome: `Ok(true)` when the
    /// value was stored and broadcast, `Ok(false)` when it was suppressed.
    pub fn try_set(&self, value: impl Into<Option<T>>) -> Result<bool, PropertyError> {
        let value = value.into();
        {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return Err(PropertyError::Closed);
            }
            if state.suppresses(&value) {
                tracing::trace!("assignment suppressed, value unchanged");
                return Ok(false);
            }
            state.latest = value.clone();
        }
        self.source.next(&value);
        Ok(true)
    }

    /// Subscribe an observer.
    ///
    /// With `raise_latest_value_on_subscribe`, the observer first receives the
    /// current value (even when unset) before this call returns. On a closed
    /// property the observer only receives the completion signal.
    pub fn subscribe(&self, observer: impl Observer<Option<T>> + 'static) -> Subscription {
        let replay = {
            let state = self.state.borrow();
            if !state.closed && state.mode.raise_latest_value_on_subscribe {
                Some(state.latest.clone())
            } else {
                None
            }
        };
        if let Some(latest) = replay {
            observer.next(&latest);
        }
        self.source.subscribe(observer)
    }

    /// Subscribe an observer that ignores every signal.
    pub fn subscribe_empty(&self) -> Subscription {
        self.subscribe(())
    }

    /// Subscribe with separate value, error, and completion callbacks.
    pub fn subscribe_with(
        &self,
        next: impl Fn(&Option<T>) + 'static,
        error: impl Fn(&PropertyError) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        self.subscribe(to_observer(Some(next), Some(error), Some(complete)))
    }

    /// Rebroadcast the current value to every observer, even if unchanged.
    pub fn force_notify(&self) {
        let latest = {
            let state = self.state.borrow();
            if state.closed {
                return;
            }
            state.latest.clone()
        };
        self.source.next(&latest);
    }

    /// Close the property: observers receive the completion signal and are
    /// released. Later calls do nothing.
    pub fn unsubscribe(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        tracing::debug!(
            observers = self.source.observer_count(),
            "reactive property closed"
        );
        self.source.complete();
        self.source.unsubscribe();
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.source.observer_count()
    }

    /// Convert this property to a read-only view.
    pub fn read_only(&self) -> ReadOnlyProperty<T> {
        ReadOnlyProperty {
            inner: self.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Default for ReactiveProperty<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReactiveProperty")
            .field("value", &state.latest)
            .field("closed", &state.closed)
            .field("mode", &state.mode)
            .finish()
    }
}

/// A read-only view of a property.
///
/// This prevents assignments and teardown while still allowing reads and
/// subscriptions.
pub struct ReadOnlyProperty<T> {
    inner: ReactiveProperty<T>,
}

impl<T> Clone for ReadOnlyProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ReadOnlyProperty<T> {
    pub fn get(&self) -> Option<T> {
        self.inner.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        self.inner.with(f)
    }

    pub fn is_set(&self) -> bool {
        self.inner.is_set()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn subscribe(&self, observer: impl Observer<Option<T>> + 'static) -> Subscription {
        self.inner.subscribe(observer)
    }

    pub fn subscribe_empty(&self) -> Subscription {
        self.inner.subscribe_empty()
    }

    pub fn subscribe_with(
        &self,
        next: impl Fn(&Option<T>) + 'static,
        error: impl Fn(&PropertyError) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        self.inner.subscribe_with(next, error, complete)
    }

    pub(crate) fn property(&self) -> &ReactiveProperty<T> {
        &self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnlyProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyProperty")
            .field("value", &self.inner.state.borrow().latest)
            .finish()
    }
}
