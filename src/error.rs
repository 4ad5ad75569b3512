use core::fmt;

/// Why a keyboard could not be built or a key could not be registered.
///
/// A failed call leaves every piece of state exactly as it was before it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid argument, such as an empty key name or a zero capacity
    Param,
    /// The backend cannot sample any key
    Backend,
    /// The registration pool has no blocks
    PoolConfig,
    /// The hardware location is outside what the backend drives
    Range,
    /// The key id or the hardware location is already registered
    Duplicate,
    /// The keyboard already holds its maximum number of keys
    Full,
    /// The registration pool is exhausted
    NoMem,
}

impl Error {
    /// A stable negative code, for reporting over links that only carry an
    /// integer.
    pub fn code(self) -> i8 {
        match self {
            Error::Param => -1,
            Error::Backend => -2,
            Error::PoolConfig => -3,
            Error::Range => -4,
            Error::Duplicate => -5,
            Error::Full => -6,
            Error::NoMem => -7,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Param => "invalid parameter",
            Error::Backend => "backend cannot sample keys",
            Error::PoolConfig => "registration pool has no blocks",
            Error::Range => "hardware location out of range",
            Error::Duplicate => "duplicate key id or hardware location",
            Error::Full => "key table full",
            Error::NoMem => "registration pool exhausted",
        };
        f.write_str(msg)
    }
}

/// Why sampling the raw key levels failed. Any of these aborts the tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError {
    /// A pin read or a row strobe returned an error
    Pin,
    /// The custom snapshot function reported failure
    Snapshot,
    /// A registered location no longer maps onto the backend's pins
    Location,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ScanError::Pin => "pin access failed",
            ScanError::Snapshot => "snapshot failed",
            ScanError::Location => "location not driven by backend",
        };
        f.write_str(msg)
    }
}
