//! Wear-limited access to single bytes of non-volatile memory.
//!
//! The EEPROM on this class of part exposes erase (all bits to 1) and
//! program (bits to 0 only) as separately issued, separately wear-costed
//! operations. The smart mutators below pick the cheapest physical
//! operation that reaches the requested value; the quarter-hour clock
//! persistence in [`crate::clock`] relies on this to stay inside a
//! multi-year wear budget.

/// Bit pattern of an erased EEPROM byte.
pub const ERASED: u8 = 0xFF;

/// Fixed addresses of values persisted by this firmware.
///
/// The hour:quarter byte is rewritten up to four times an hour, so it sits
/// on its own wear page away from the day counter.
pub mod layout {
    /// Hour and quarter-hour of local time, encoded by [`crate::clock`].
    pub const HOUR_QUARTER: u16 = 0x0008;
    /// Days since the device epoch, two bytes little-endian.
    pub const DAY_COUNT: u16 = 0x0040;
}

/// Byte-granular EEPROM access as provided by the hardware layer.
///
/// `erase` and `program` are only issued on parts where
/// [`Self::SPLIT_ERASE_WRITE`] is true; everything else goes through
/// `write`. None of these operations are re-entrant: callers keep
/// interrupts away from an in-flight operation and serialize access
/// between subsystems.
pub trait EepromOps {
    /// Whether the part can erase and program a byte as separate
    /// operations.
    const SPLIT_ERASE_WRITE: bool;

    fn read(&mut self, address: u16) -> u8;

    /// Set every bit of the byte; it reads back as [`ERASED`].
    fn erase(&mut self, address: u16);

    /// Clear bits without erasing: the byte becomes `current AND value`.
    fn program(&mut self, address: u16, value: u8);

    /// Combined erase plus program, leaving exactly `value`.
    fn write(&mut self, address: u16, value: u8);
}

/// Bring the byte at `address` to `value` using the cheapest physical
/// operation that gets there. Returns whether one was issued at all.
pub fn smart_update<E: EepromOps>(eeprom: &mut E, address: u16, value: u8) -> bool {
    let current = eeprom.read(address);
    if current == value {
        return false;
    }
    if value == ERASED {
        return smart_erase(eeprom, address);
    }
    if value == current & value {
        return smart_clear_bits(eeprom, address, value);
    }
    eeprom.write(address, value);
    true
}

/// Erase the byte at `address` unless it already reads as erased.
pub fn smart_erase<E: EepromOps>(eeprom: &mut E, address: u16) -> bool {
    if eeprom.read(address) == ERASED {
        return false;
    }
    if E::SPLIT_ERASE_WRITE {
        eeprom.erase(address);
    } else {
        eeprom.write(address, ERASED);
    }
    true
}

/// AND `mask` into the byte at `address`, skipping the erase half of the
/// cycle on parts that support it. Returns whether a physical write was
/// issued.
pub fn smart_clear_bits<E: EepromOps>(eeprom: &mut E, address: u16, mask: u8) -> bool {
    let current = eeprom.read(address);
    let target = current & mask;
    if target == current {
        return false;
    }
    if E::SPLIT_ERASE_WRITE {
        eeprom.program(address, target);
    } else {
        eeprom.write(address, target);
    }
    true
}

#[cfg(any(test, feature = "sim"))]
pub mod sim;
