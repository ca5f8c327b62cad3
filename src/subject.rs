//! Broadcast channel with cancelable membership.
//!
//! Observers live in a slot map keyed by generational ids, so a stale
//! [`Subscription`] can never remove an observer that reused its slot.
//! A separate list keeps registration order, which is the delivery order.

use crate::error::PropertyError;
use crate::observer::Observer;
use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Identifier for an observer registered with a subject.
    pub struct ObserverId;
}

/// A registered observer and the closed flag shared with its subscription.
struct ObserverEntry<T> {
    observer: Rc<dyn Observer<T>>,
    closed: Rc<Cell<bool>>,
}

impl<T> Clone for ObserverEntry<T> {
    fn clone(&self) -> Self {
        Self {
            observer: Rc::clone(&self.observer),
            closed: Rc::clone(&self.closed),
        }
    }
}

/// How a subject stopped, replayed to late subscribers.
#[derive(Debug, Clone)]
enum Terminal {
    Completed,
    Errored(PropertyError),
}

struct SubjectState<T> {
    observers: SlotMap<ObserverId, ObserverEntry<T>>,
    order: Vec<ObserverId>,
    terminal: Option<Terminal>,
    disposed: bool,
}

impl<T> SubjectState<T> {
    fn new() -> Self {
        Self {
            observers: SlotMap::with_key(),
            order: Vec::new(),
            terminal: None,
            disposed: false,
        }
    }

    fn is_halted(&self) -> bool {
        self.terminal.is_some() || self.disposed
    }

    /// Live observers in registration order.
    fn snapshot(&self) -> Vec<ObserverEntry<T>> {
        self.order
            .iter()
            .filter_map(|id| self.observers.get(*id))
            .cloned()
            .collect()
    }

    /// Detach every observer in registration order, marking their
    /// subscriptions closed. The caller drops the entries after releasing
    /// the borrow.
    fn drain(&mut self) -> Vec<ObserverEntry<T>> {
        let order = std::mem::take(&mut self.order);
        let drained: Vec<ObserverEntry<T>> = order
            .into_iter()
            .filter_map(|id| self.observers.remove(id))
            .collect();
        for entry in &drained {
            entry.closed.set(true);
        }
        drained
    }

    fn remove(&mut self, id: ObserverId) -> Option<ObserverEntry<T>> {
        let entry = self.observers.remove(id)?;
        entry.closed.set(true);
        self.order.retain(|other| *other != id);
        Some(entry)
    }
}

/// A one-to-many broadcast channel.
///
/// Values pushed with [`Subject::next`] are delivered synchronously to every
/// attached observer in the order they subscribed. [`Subject::complete`] and
/// [`Subject::error`] are terminal. Cloning a subject yields another handle to
/// the same channel.
pub struct Subject<T> {
    state: Rc<RefCell<SubjectState<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> Subject<T> {
    /// Create a subject with no observers.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SubjectState::new())),
        }
    }

    /// Attach an observer for future values.
    ///
    /// On a subject that has already stopped, the observer receives the
    /// terminal signal right away and the returned subscription is closed.
    pub fn subscribe(&self, observer: impl Observer<T> + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let terminal = if state.disposed {
            Some(Terminal::Completed)
        } else {
            state.terminal.clone()
        };

        match terminal {
            None => {
                let closed = Rc::new(Cell::new(false));
                let id = state.observers.insert(ObserverEntry {
                    observer: Rc::new(observer),
                    closed: closed.clone(),
                });
                state.order.push(id);
                Subscription::attached(closed, self.detach_fn(id))
            }
            Some(terminal) => {
                drop(state);
                match terminal {
                    Terminal::Errored(err) => observer.error(&err),
                    Terminal::Completed => observer.complete(),
                }
                Subscription::closed()
            }
        }
    }

    fn detach_fn(&self, id: ObserverId) -> Box<dyn FnOnce()> {
        let state: Weak<RefCell<SubjectState<T>>> = Rc::downgrade(&self.state);
        Box::new(move || {
            if let Some(state) = state.upgrade() {
                let removed = state.borrow_mut().remove(id);
                if removed.is_some() {
                    tracing::debug!(?id, "observer unsubscribed");
                }
            }
        })
    }

    /// Deliver a value to every attached observer.
    pub fn next(&self, value: &T) {
        let observers = {
            let state = self.state.borrow();
            if state.is_halted() {
                return;
            }
            state.snapshot()
        };
        tracing::trace!(observers = observers.len(), "broadcast");
        for entry in observers {
            // An earlier observer may have cancelled this one or stopped the subject.
            if self.state.borrow().is_halted() {
                break;
            }
            if entry.closed.get() {
                continue;
            }
            entry.observer.next(value);
        }
    }

    /// Deliver a terminal error and release every observer.
    pub fn error(&self, err: PropertyError) {
        let observers = match self.stop(Terminal::Errored(err.clone())) {
            Some(observers) => observers,
            None => return,
        };
        for entry in observers {
            entry.observer.error(&err);
        }
    }

    /// Deliver the completion signal and release every observer.
    pub fn complete(&self) {
        let observers = match self.stop(Terminal::Completed) {
            Some(observers) => observers,
            None => return,
        };
        for entry in observers {
            entry.observer.complete();
        }
    }

    fn stop(&self, terminal: Terminal) -> Option<Vec<ObserverEntry<T>>> {
        let mut state = self.state.borrow_mut();
        if state.is_halted() {
            return None;
        }
        state.terminal = Some(terminal);
        Some(state.drain())
    }

    /// Release every observer without signalling them and refuse further use.
    pub fn unsubscribe(&self) {
        let released = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.drain()
        };
        drop(released);
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.state.borrow().order.len()
    }

    /// Whether the subject has completed or errored.
    pub fn is_stopped(&self) -> bool {
        self.state.borrow().terminal.is_some()
    }

    /// Whether [`Subject::unsubscribe`] has been called.
    pub fn is_closed(&self) -> bool {
        self.state.borrow().disposed
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Subject")
            .field("observers", &state.order.len())
            .field("terminal", &state.terminal)
            .field("disposed", &state.disposed)
            .finish()
    }
}

/// Handle to one observer's membership in a subject.
///
/// [`Subscription::unsubscribe`] detaches only that observer. Dropping the
/// handle leaves the observer attached.
pub struct Subscription {
    closed: Rc<Cell<bool>>,
    teardown: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn attached(closed: Rc<Cell<bool>>, teardown: Box<dyn FnOnce()>) -> Self {
        Self {
            closed,
            teardown: RefCell::new(Some(teardown)),
        }
    }

    /// A subscription whose membership has already ended.
    pub(crate) fn closed() -> Self {
        Self {
            closed: Rc::new(Cell::new(true)),
            teardown: RefCell::new(None),
        }
    }

    /// Detach the observer. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown();
        }
        self.closed.set(true);
    }

    /// Whether the observer no longer receives values, either because it was
    /// unsubscribed or because the subject stopped.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.closed.get())
            .finish_non_exhaustive()
    }
}
