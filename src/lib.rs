//! Core firmware logic for a battery-powered radiator-valve controller.
//!
//! Three self-contained subsystems compose into the device control loop:
//! wear-limited EEPROM byte updates ([`eeprom`]), a tick-driven software
//! real-time clock with low-wear persistence ([`clock`]), and the
//! AES-128-GCM primitive securing the short-range radio protocol
//! ([`cipher`]). Sensor drivers, the radio transport, the CLI, and the
//! valve state machine live outside this crate and reach these subsystems
//! through the seams in [`system`].

#![cfg_attr(not(test), no_std)]

pub mod cipher;
pub mod clock;
pub mod eeprom;
pub mod system;
