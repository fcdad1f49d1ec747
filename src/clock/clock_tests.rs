use super::*;
use crate::eeprom::sim::SimEeprom;

fn fresh_clock() -> SoftwareClock {
    SoftwareClock::new(TickPeriod::OneSecond)
}

#[test]
fn every_valid_time_reads_back_exactly() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<true>::new();
    for hours in 0..24u8 {
        for minutes in 0..60u8 {
            assert!(clock.set_hours_minutes(hours, minutes, &mut eeprom));
            assert_eq!(clock.hours(), hours);
            assert_eq!(clock.minutes(), minutes);
            assert_eq!(
                clock.minutes_since_midnight(),
                u16::from(hours) * 60 + u16::from(minutes)
            );
        }
    }
}

#[test]
fn invalid_set_requests_change_nothing() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<true>::new();
    assert!(clock.set_hours_minutes(10, 30, &mut eeprom));
    let before = clock.snapshot();
    let ops = eeprom.total_ops();

    for (hours, minutes) in [(24, 0), (99, 0), (0, 60), (12, 255), (24, 60)] {
        assert!(!clock.set_hours_minutes(hours, minutes, &mut eeprom));
        assert_eq!(clock.snapshot(), before);
    }
    assert_eq!(eeprom.total_ops(), ops);
}

#[test]
fn setting_time_leaves_seconds_alone() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<true>::new();
    for _ in 0..5 {
        clock.tick();
    }
    assert!(clock.set_hours_minutes(6, 30, &mut eeprom));
    assert_eq!(clock.seconds(), 5);
}

#[test]
fn a_full_day_of_ticks_rolls_the_day_counter_once() {
    let clock = SoftwareClock::new(TickPeriod::OneSecond);
    for _ in 0..86_400 {
        clock.tick();
    }
    assert_eq!(
        clock.snapshot(),
        ClockState {
            seconds: 0,
            minutes_since_midnight: 0,
            days_since_epoch: 1,
        }
    );
}

#[test]
fn two_second_ticks_keep_the_same_day_length() {
    let clock = SoftwareClock::new(TickPeriod::TwoSeconds);
    for _ in 0..43_200 {
        clock.tick();
    }
    assert_eq!(
        clock.snapshot(),
        ClockState {
            seconds: 0,
            minutes_since_midnight: 0,
            days_since_epoch: 1,
        }
    );
}

#[test]
fn persist_then_restore_stays_in_the_quarter_window() {
    for minutes in 0..1440u16 {
        let clock = fresh_clock();
        let mut eeprom = SimEeprom::<true>::new();
        let hours = (minutes / 60) as u8;
        let within_hour = (minutes % 60) as u8;
        assert!(clock.set_hours_minutes(hours, within_hour, &mut eeprom));

        let restored_clock = fresh_clock();
        assert!(restored_clock.restore(&mut eeprom));
        let restored = restored_clock.minutes_since_midnight();
        assert_eq!(restored / 60, minutes / 60, "hour must survive");
        assert_eq!(
            (restored % 60) / 15,
            (minutes % 60) / 15,
            "quarter window must survive"
        );
        assert_eq!(restored_clock.seconds(), 0);
    }
}

#[test]
fn day_counter_round_trips_through_eeprom() {
    let mut eeprom = SimEeprom::<true>::new();
    eeprom.preload(layout::DAY_COUNT, 0x2A);
    eeprom.preload(layout::DAY_COUNT + 1, 0x01);
    eeprom.preload(layout::HOUR_QUARTER, encode_hour_quarter(23 * 60 + 59));

    let clock = fresh_clock();
    assert!(clock.restore(&mut eeprom));
    assert_eq!(clock.days_since_epoch(), 0x012A);

    // Tick across midnight and persist; the new day must land in EEPROM.
    assert!(clock.set_hours_minutes(23, 59, &mut eeprom));
    for _ in 0..120 {
        clock.tick();
    }
    clock.persist(&mut eeprom);

    let rebooted = fresh_clock();
    assert!(rebooted.restore(&mut eeprom));
    assert_eq!(rebooted.days_since_epoch(), 0x012B);
    assert_eq!(rebooted.hours(), 0);
}

#[test]
fn erased_day_cells_leave_the_default_day() {
    let mut eeprom = SimEeprom::<true>::new();
    eeprom.preload(layout::HOUR_QUARTER, encode_hour_quarter(9 * 60 + 30));

    let clock = fresh_clock();
    assert!(clock.restore(&mut eeprom));
    assert_eq!(clock.days_since_epoch(), 0);
    assert_eq!(clock.hours(), 9);
}

#[test]
fn corrupt_time_byte_is_rejected() {
    let illegal_quarter = 0b101;
    for bad in [
        0b0000_0101u8,
        0b0000_0001,
        10 << 3 | 0b011,
        24 << 3 | 0b111,
        31 << 3 | 0b110,
        0xFF,
        illegal_quarter | 12 << 3,
    ] {
        let mut eeprom = SimEeprom::<true>::new();
        eeprom.preload(layout::HOUR_QUARTER, bad);

        let clock = fresh_clock();
        assert!(!clock.restore(&mut eeprom), "{bad:#04x} must be rejected");
        assert_eq!(clock.snapshot().minutes_since_midnight, 0);
    }
}

#[test]
fn restore_never_yields_an_illegal_quarter_pattern() {
    for minutes in (0..1440u16).step_by(5) {
        let stored = encode_hour_quarter(minutes);
        assert!(QUARTER_CODES.contains(&(stored & 0b111)));
        assert!(decode_hour_quarter(stored).is_some());
    }
}

#[test]
fn same_hour_persists_only_clear_bits() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<true>::new();
    assert!(clock.set_hours_minutes(14, 0, &mut eeprom));
    let erases = eeprom.erase_ops;
    let writes = eeprom.write_ops;

    for minutes in [15, 30, 45] {
        assert!(clock.set_hours_minutes(14, minutes, &mut eeprom));
    }
    assert_eq!(eeprom.erase_ops, erases);
    assert_eq!(eeprom.write_ops, writes);
    assert!(eeprom.program_ops >= 3);
}

#[test]
fn hour_change_needs_a_full_update() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<true>::new();
    assert!(clock.set_hours_minutes(14, 45, &mut eeprom));
    let programs = eeprom.program_ops;

    assert!(clock.set_hours_minutes(15, 0, &mut eeprom));
    assert_eq!(eeprom.program_ops, programs);
    assert!(eeprom.erase_ops + eeprom.write_ops > 0);
}

#[test]
fn persist_is_idempotent() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<true>::new();
    assert!(clock.set_hours_minutes(8, 20, &mut eeprom));
    let ops = eeprom.total_ops();

    clock.persist(&mut eeprom);
    clock.persist(&mut eeprom);
    assert_eq!(eeprom.total_ops(), ops);
}

#[test]
fn persistence_works_without_split_erase_write() {
    let clock = fresh_clock();
    let mut eeprom = SimEeprom::<false>::new();
    assert!(clock.set_hours_minutes(22, 48, &mut eeprom));

    let rebooted = fresh_clock();
    assert!(rebooted.restore(&mut eeprom));
    assert_eq!(rebooted.hours(), 22);
    assert_eq!(rebooted.minutes() / 15, 3);
    assert_eq!(eeprom.erase_ops, 0);
    assert_eq!(eeprom.program_ops, 0);
}
