#![no_std]
use packed_struct::prelude::*;

/// The semantic events a key can produce.
#[derive(PrimitiveEnum_u8, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEventKind {
    Press = 0,
    Release = 1,
    Click = 2,
    LongPress = 3,
    LongPressRelease = 4,
    Repeat = 5,
    DoubleClick = 6,
}

/// Where a key sits in its gesture cycle, for observing it with a debugger
/// or from a diagnostics shell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GestureState {
    /// Released, nothing pending
    Idle,
    /// Released once, waiting out the double click window
    ClickPending,
    /// Held, long press not reached yet
    Pressed,
    /// Held past the long press threshold
    LongPressed,
}

/// A packed representation of a key event that is sent over a serial link.
///
/// 24 bits: the key id, the event kind, and an overflow flag. The sender
/// raises the flag on the first event it forwards after events were dropped.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", endian = "msb", size_bytes = "3")]
pub struct WireEvent {
    #[packed_field(bits = "0..=15")]
    pub key_id: u16,
    #[packed_field(bits = "16..=18", ty = "enum")]
    pub kind: KeyEventKind,
    #[packed_field(bits = "23")]
    pub overflow: bool,
}
