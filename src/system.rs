//! Device-wide wiring shared between interrupt and thread context.

use crate::clock::{SoftwareClock, TickPeriod};

/// Tick interval the board timer is programmed for, fixed at build time.
#[cfg(not(feature = "tick-2s"))]
pub const TICK_PERIOD: TickPeriod = TickPeriod::OneSecond;
#[cfg(feature = "tick-2s")]
pub const TICK_PERIOD: TickPeriod = TickPeriod::TwoSeconds;

/// Cadence at which the control loop calls [`SoftwareClock::persist`].
pub const CLOCK_PERSIST_INTERVAL_SECONDS: u32 = 60;

static CLOCK: SoftwareClock = SoftwareClock::new(TICK_PERIOD);

/// The clock instance shared by the tick interrupt and the control loop.
///
/// Exactly one exists per device. Host tooling that models several
/// devices at once constructs a [`SoftwareClock`] per simulated node
/// instead of going through this accessor.
pub fn clock() -> &'static SoftwareClock {
    &CLOCK
}
