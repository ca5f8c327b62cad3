//! # Reactive Property
//!
//! A mutable value cell that notifies subscribers when its value changes.
//!
//! ## Features
//!
//! - **Duplicate suppression**: assigning the current value again is a no-op
//!   (configurable via [`ReactivePropertyMode`])
//! - **Subscribe-time replay**: new observers receive the current value
//!   immediately (configurable)
//! - **Two kinds of cancellation**: a [`Subscription`] stops one observer,
//!   [`ReactiveProperty::unsubscribe`] completes and closes the whole cell
//! - **Async bridge**: [`ReactiveProperty::stream`] exposes values as a
//!   `futures::Stream`
//!
//! Everything is single-threaded and synchronous: observers run inside the
//! call that triggered them, in the order they subscribed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use reactive_property::prelude::*;
//!
//! let temperature = ReactiveProperty::with_value(20);
//! let sub = temperature.subscribe(|t: &Option<i32>| println!("now {t:?}"));
//!
//! temperature.set(20); // same value, nothing printed
//! temperature.set(21); // prints "now Some(21)"
//! temperature.force_notify(); // prints "now Some(21)" again
//!
//! sub.unsubscribe();
//! temperature.unsubscribe();
//! ```

mod error;
mod mode;
mod observer;
mod property;
mod stream;
mod subject;

pub use error::PropertyError;
pub use mode::ReactivePropertyMode;
pub use observer::{to_observer, Callbacks, Observer};
pub use property::{Falsy, ReactiveProperty, ReadOnlyProperty};
pub use stream::PropertyStream;
pub use subject::{Subject, Subscription};

// Re-export the prelude
pub mod prelude {
    pub use crate::{
        Callbacks, Observer, PropertyError, ReactiveProperty, ReactivePropertyMode,
        ReadOnlyProperty, Subscription,
    };
}
