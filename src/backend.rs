//! Ways of obtaining raw key levels.
//!
//! A [`Backend`] decides what a key's hardware location looks like, which
//! locations it can drive, and how to sample them. Three come with the crate:
//!
//! * [`GpioBackend`]: one input pin per key
//! * [`MatrixBackend`]: keys at the crossings of strobed rows and read columns
//! * [`CustomBackend`]: a function that fills in every key at once
//!
//! All levels handed back are logical: `true` means pressed, whatever the
//! wiring polarity.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::config::Level;
use crate::error::{Error, ScanError};

/// The hardware access strategy of a keyboard.
pub trait Backend {
    /// Where a key is wired. Two keys are the same key when their locations
    /// compare equal.
    type Location: Copy + PartialEq + Default + core::fmt::Debug;

    /// Can this backend sample anything at all? Checked when the keyboard is
    /// built.
    fn is_capable(&self) -> bool {
        true
    }

    /// Checks that `location` is one this backend drives.
    fn validate(&self, location: &Self::Location) -> Result<(), Error>;

    /// Samples every location in order, writing one logical level per
    /// location into `levels`. `levels` is exactly as long as the iterator.
    ///
    /// On error the contents of `levels` are unspecified.
    fn scan<'a, I>(&mut self, locations: I, levels: &mut [bool]) -> Result<(), ScanError>
    where
        I: Iterator<Item = &'a Self::Location>,
        Self::Location: 'a;
}

/// The index of a pin in a [`GpioBackend`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(pub u8);

/// A crossing in a [`MatrixBackend`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixPos {
    pub row: u8,
    pub col: u8,
}

/// An opaque code understood only by the function behind a [`CustomBackend`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwCode(pub u16);

/// One input pin per key.
pub struct GpioBackend<P, const PINS: usize> {
    pins: [P; PINS],
    active: Level,
}

impl<P: InputPin, const PINS: usize> GpioBackend<P, PINS> {
    /// Pins read high while their key is held.
    pub fn new(pins: [P; PINS]) -> Self {
        GpioBackend {
            pins,
            active: Level::High,
        }
    }

    /// Sets the level a pin reads while its key is held.
    pub fn active_level(mut self, active: Level) -> Self {
        self.active = active;
        self
    }

    pub fn free(self) -> [P; PINS] {
        self.pins
    }
}

impl<P: InputPin, const PINS: usize> Backend for GpioBackend<P, PINS> {
    type Location = Pin;

    fn is_capable(&self) -> bool {
        PINS > 0
    }

    fn validate(&self, location: &Pin) -> Result<(), Error> {
        if (location.0 as usize) < PINS {
            Ok(())
        } else {
            Err(Error::Range)
        }
    }

    fn scan<'a, I>(&mut self, locations: I, levels: &mut [bool]) -> Result<(), ScanError>
    where
        I: Iterator<Item = &'a Pin>,
    {
        for (pin, level) in locations.zip(levels.iter_mut()) {
            let pin = self
                .pins
                .get(pin.0 as usize)
                .ok_or(ScanError::Location)?;
            let high = pin.is_high().map_err(|_| ScanError::Pin)?;
            *level = high == self.active.is_high();
        }
        Ok(())
    }
}

/// Keys at the crossings of a row/column matrix.
///
/// Reading a key drives its row to the row active level, reads its column,
/// and drives the row back to idle before moving on, so only one row is
/// ever selected.
pub struct MatrixBackend<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    row_active: Level,
    col_active: Level,
    reverse_rows: bool,
    reverse_cols: bool,
}

impl<R, C, const ROWS: usize, const COLS: usize> MatrixBackend<R, C, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
{
    /// Rows are selected by driving them high, and a column reads high when
    /// the key at the crossing is held.
    pub fn new(rows: [R; ROWS], cols: [C; COLS]) -> Self {
        MatrixBackend {
            rows,
            cols,
            row_active: Level::High,
            col_active: Level::High,
            reverse_rows: false,
            reverse_cols: false,
        }
    }

    /// Sets the level a row is driven to while it is selected.
    pub fn row_active_level(mut self, level: Level) -> Self {
        self.row_active = level;
        self
    }

    /// Sets the level a column reads while its key is held.
    pub fn col_active_level(mut self, level: Level) -> Self {
        self.col_active = level;
        self
    }

    /// Mirrors logical rows onto physical rows, so row 0 is the last pin.
    pub fn reverse_rows(mut self) -> Self {
        self.reverse_rows = true;
        self
    }

    /// Mirrors logical columns onto physical columns.
    pub fn reverse_cols(mut self) -> Self {
        self.reverse_cols = true;
        self
    }

    /// Drives every row to idle. Worth calling once before the first poll so
    /// no row is left floating selected.
    pub fn unselect_all(&mut self) -> Result<(), ScanError> {
        let idle = self.row_active.inverse();
        for row in self.rows.iter_mut() {
            drive(row, idle)?;
        }
        Ok(())
    }

    pub fn free(self) -> ([R; ROWS], [C; COLS]) {
        (self.rows, self.cols)
    }

    fn physical(&self, pos: &MatrixPos) -> (usize, usize) {
        let row = pos.row as usize;
        let col = pos.col as usize;
        let row = if self.reverse_rows { ROWS - 1 - row } else { row };
        let col = if self.reverse_cols { COLS - 1 - col } else { col };
        (row, col)
    }

    fn read(&mut self, pos: &MatrixPos) -> Result<bool, ScanError> {
        if pos.row as usize >= ROWS || pos.col as usize >= COLS {
            return Err(ScanError::Location);
        }
        let (row, col) = self.physical(pos);
        let active = self.row_active;
        let col_active = self.col_active;
        let row_pin = &mut self.rows[row];
        drive(row_pin, active)?;
        let read = self.cols[col].is_high();
        // unselect even if the read failed, a stuck row would ghost every
        // other key on it
        drive(row_pin, active.inverse())?;
        let high = read.map_err(|_| ScanError::Pin)?;
        Ok(high == col_active.is_high())
    }
}

fn drive<R: OutputPin>(pin: &mut R, level: Level) -> Result<(), ScanError> {
    let result = match level {
        Level::High => pin.set_high(),
        Level::Low => pin.set_low(),
    };
    result.map_err(|_| ScanError::Pin)
}

impl<R, C, const ROWS: usize, const COLS: usize> Backend for MatrixBackend<R, C, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
{
    type Location = MatrixPos;

    fn is_capable(&self) -> bool {
        ROWS > 0 && COLS > 0
    }

    fn validate(&self, location: &MatrixPos) -> Result<(), Error> {
        if (location.row as usize) < ROWS && (location.col as usize) < COLS {
            Ok(())
        } else {
            Err(Error::Range)
        }
    }

    fn scan<'a, I>(&mut self, locations: I, levels: &mut [bool]) -> Result<(), ScanError>
    where
        I: Iterator<Item = &'a MatrixPos>,
    {
        for (pos, level) in locations.zip(levels.iter_mut()) {
            *level = self.read(pos)?;
        }
        Ok(())
    }
}

/// Levels come from a function that snapshots every key in one call.
///
/// The function receives one slot per registered key, in registration
/// order, and writes `true` for each held key. Returning an error aborts the
/// tick.
pub struct CustomBackend<F> {
    snapshot: F,
}

impl<F> CustomBackend<F>
where
    F: FnMut(&mut [bool]) -> Result<(), ScanError>,
{
    pub fn new(snapshot: F) -> Self {
        CustomBackend { snapshot }
    }
}

impl<F> Backend for CustomBackend<F>
where
    F: FnMut(&mut [bool]) -> Result<(), ScanError>,
{
    type Location = HwCode;

    fn validate(&self, _location: &HwCode) -> Result<(), Error> {
        Ok(())
    }

    fn scan<'a, I>(&mut self, _locations: I, levels: &mut [bool]) -> Result<(), ScanError>
    where
        I: Iterator<Item = &'a HwCode>,
    {
        levels.iter_mut().for_each(|l| *l = false);
        (self.snapshot)(levels)
    }
}
