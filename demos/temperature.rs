//! Thermostat example demonstrating reactive_property.
//!
//! This example shows:
//! - Subscribing with a closure and with separate callbacks
//! - Duplicate suppression and force_notify
//! - Reading values back as an async stream
//! - Tearing the property down
//!
//! Run with `RUST_LOG=reactive_property=trace` to see suppression traces.

use futures::executor::block_on;
use futures::StreamExt;
use reactive_property::prelude::*;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let setpoint = ReactiveProperty::with_value(20);

    let display = setpoint.subscribe(|t: &Option<i32>| {
        info!(setpoint = ?t, "display refreshed");
    });

    let _heater = setpoint.read_only().subscribe_with(
        |t: &Option<i32>| {
            if let Some(t) = t {
                info!(heating = (*t > 21), "heater evaluated");
            }
        },
        |err| info!(%err, "setpoint failed"),
        || info!("setpoint closed"),
    );

    setpoint.set(20);
    setpoint.set(22);
    setpoint.force_notify();

    display.unsubscribe();
    setpoint.set(19);

    let history = setpoint.stream();
    setpoint.set(18);
    // Clearing a set value is dropped as a duplicate while suppression is on.
    setpoint.set(None);
    setpoint.set(17);
    setpoint.unsubscribe();

    let values: Vec<Option<i32>> = block_on(history.collect());
    info!(?values, "stream drained");

    if let Err(err) = setpoint.try_set(25) {
        info!(%err, "late assignment refused");
    }
}
