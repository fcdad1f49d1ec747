//! Software real-time clock for the valve controller.
//!
//! Local time lives entirely in software: a periodic timer interrupt
//! calls [`SoftwareClock::tick`] and the control loop persists the
//! counters to EEPROM about once a minute. Persistence is lossy on
//! purpose, quarter-hour plus day granularity, so years of continuous
//! operation fit the EEPROM wear budget.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::eeprom::{self, layout, EepromOps, ERASED};

/// Tick interval the board timer is programmed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPeriod {
    OneSecond,
    TwoSeconds,
}

impl TickPeriod {
    pub const fn seconds(self) -> u8 {
        match self {
            TickPeriod::OneSecond => 1,
            TickPeriod::TwoSeconds => 2,
        }
    }
}

/// Consistent snapshot of the clock counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    /// Seconds of local time, 0..=59.
    pub seconds: u8,
    /// Minutes since local midnight, 0..=1439.
    pub minutes_since_midnight: u16,
    /// Days since the device epoch; wraps at the u16 boundary.
    pub days_since_epoch: u16,
}

impl ClockState {
    const POWER_UP: Self = Self {
        seconds: 0,
        minutes_since_midnight: 0,
        days_since_epoch: 0,
    };
}

/// Minutes added to the start of a restored quarter-hour window, so a
/// restart lands mid-window instead of at its edge.
pub const RESTORE_MIDPOINT_BIAS_MINUTES: u16 = 7;

/// Legal quarter-hour codes for the low three bits of the persisted byte,
/// indexed by quarter. Walking :00 -> :15 -> :30 -> :45 only ever clears
/// bits.
const QUARTER_CODES: [u8; 4] = [0b111, 0b110, 0b100, 0b000];

/// Tick-driven local clock with second resolution.
///
/// One instance per device; [`crate::system`] owns the real one and hands
/// it to the tick interrupt and the control loop. Host-side simulations
/// construct one per simulated node.
pub struct SoftwareClock {
    tick: TickPeriod,
    state: Mutex<CriticalSectionRawMutex, Cell<ClockState>>,
}

impl SoftwareClock {
    /// A clock starting at the power-up default of day 0, midnight.
    pub const fn new(tick: TickPeriod) -> Self {
        Self {
            tick,
            state: Mutex::new(Cell::new(ClockState::POWER_UP)),
        }
    }

    /// Advance local time by one tick interval.
    ///
    /// Interrupt context: one short critical section over plain integer
    /// fields. No storage access, nothing that can block, no re-entry.
    pub fn tick(&self) {
        self.state.lock(|cell| {
            let mut state = cell.get();
            state.seconds += self.tick.seconds();
            if state.seconds > 59 {
                state.seconds = 0;
                state.minutes_since_midnight += 1;
                if state.minutes_since_midnight > 1439 {
                    state.minutes_since_midnight = 0;
                    state.days_since_epoch = state.days_since_epoch.wrapping_add(1);
                }
            }
            cell.set(state);
        });
    }

    /// Set the time of day, leaving seconds and the day counter alone.
    ///
    /// Returns false, changing nothing, for an out-of-range hour or
    /// minute. An accepted value is persisted before returning. Not for
    /// interrupt context.
    pub fn set_hours_minutes<E: EepromOps>(&self, hours: u8, minutes: u8, eeprom: &mut E) -> bool {
        if hours > 23 || minutes > 59 {
            return false;
        }
        let total = u16::from(hours) * 60 + u16::from(minutes);
        self.state.lock(|cell| {
            let mut state = cell.get();
            state.minutes_since_midnight = total;
            cell.set(state);
        });
        self.persist(eeprom);
        true
    }

    /// Write the current time to EEPROM if it moved since the last write.
    ///
    /// Safe to call as often as the control loop likes: physical
    /// operations happen only when the persisted quarter-hour or day
    /// actually changed, and within one hour they are bit-clears. Never
    /// call from interrupt context; the EEPROM write stalls for
    /// milliseconds.
    pub fn persist<E: EepromOps>(&self, eeprom: &mut E) {
        let state = self.snapshot();
        eeprom::smart_update(
            eeprom,
            layout::HOUR_QUARTER,
            encode_hour_quarter(state.minutes_since_midnight),
        );
        let days = state.days_since_epoch.to_le_bytes();
        eeprom::smart_update(eeprom, layout::DAY_COUNT, days[0]);
        eeprom::smart_update(eeprom, layout::DAY_COUNT + 1, days[1]);
    }

    /// Reload time from EEPROM after a power cycle.
    ///
    /// The day counter is taken unless its cells are still erased. The
    /// time of day is rejected wholesale when the stored byte is not a
    /// legal hour:quarter encoding, leaving the power-up default in
    /// place. Seconds always restart at zero, which keeps a batch of
    /// nodes powering up together from waking in lockstep.
    pub fn restore<E: EepromOps>(&self, eeprom: &mut E) -> bool {
        let day_lo = eeprom.read(layout::DAY_COUNT);
        let day_hi = eeprom.read(layout::DAY_COUNT + 1);
        let days = u16::from_le_bytes([day_lo, day_hi]);
        if days != u16::from_le_bytes([ERASED, ERASED]) {
            self.state.lock(|cell| {
                let mut state = cell.get();
                state.days_since_epoch = days;
                cell.set(state);
            });
        }

        let stored = eeprom.read(layout::HOUR_QUARTER);
        let Some(minutes) = decode_hour_quarter(stored) else {
            log::warn!("discarding corrupt persisted time {stored:#04x}");
            return false;
        };
        self.state.lock(|cell| {
            let mut state = cell.get();
            state.minutes_since_midnight = minutes;
            state.seconds = 0;
            cell.set(state);
        });
        true
    }

    /// Seconds of local time.
    pub fn seconds(&self) -> u8 {
        self.snapshot().seconds
    }

    /// Minutes since local midnight.
    pub fn minutes_since_midnight(&self) -> u16 {
        self.snapshot().minutes_since_midnight
    }

    /// Days since the device epoch.
    pub fn days_since_epoch(&self) -> u16 {
        self.snapshot().days_since_epoch
    }

    /// Hour of local time, 0..=23.
    pub fn hours(&self) -> u8 {
        (self.snapshot().minutes_since_midnight / 60) as u8
    }

    /// Minute within the hour, 0..=59.
    pub fn minutes(&self) -> u8 {
        (self.snapshot().minutes_since_midnight % 60) as u8
    }

    /// All three counters, read in one critical section so a concurrent
    /// tick cannot tear the values apart.
    pub fn snapshot(&self) -> ClockState {
        self.state.lock(Cell::get)
    }
}

/// Pack minutes-since-midnight into the persisted byte: hour in the top
/// five bits, quarter code in the low three.
fn encode_hour_quarter(minutes_since_midnight: u16) -> u8 {
    let hour = (minutes_since_midnight / 60) as u8;
    let quarter = (minutes_since_midnight % 60) / 15;
    hour << 3 | QUARTER_CODES[quarter as usize]
}

/// Unpack the persisted byte back to minutes-since-midnight, biased into
/// the middle of the stored quarter-hour window. None for any pattern the
/// firmware would never have written.
fn decode_hour_quarter(stored: u8) -> Option<u16> {
    let hour = stored >> 3;
    if hour > 23 {
        return None;
    }
    let quarter = QUARTER_CODES.iter().position(|&code| code == stored & 0b111)?;
    Some(u16::from(hour) * 60 + quarter as u16 * 15 + RESTORE_MIDPOINT_BIAS_MINUTES)
}

#[cfg(test)]
mod clock_tests;
