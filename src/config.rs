//! Timing parameters and electrical polarity.

/// Debounce time, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u32 = 20;
/// Hold time before a long press, in milliseconds.
pub const DEFAULT_LONGPRESS_MS: u32 = 800;
/// Hold time before repeats start, in milliseconds.
pub const DEFAULT_REPEAT_START_MS: u32 = 500;
/// Time between repeats, in milliseconds.
pub const DEFAULT_REPEAT_PERIOD_MS: u32 = 80;
/// Window for the second click of a double click, in milliseconds.
pub const DEFAULT_DOUBLE_CLICK_MS: u32 = 250;

/// Gesture timing shared by every key of a keyboard.
///
/// All values are milliseconds, and are compared against the sum of the
/// deltas handed to [`Keyboard::poll`](crate::Keyboard::poll).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub debounce_ms: u32,
    pub longpress_ms: u32,
    pub repeat_start_ms: u32,
    pub repeat_period_ms: u32,
    pub double_click_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            longpress_ms: DEFAULT_LONGPRESS_MS,
            repeat_start_ms: DEFAULT_REPEAT_START_MS,
            repeat_period_ms: DEFAULT_REPEAT_PERIOD_MS,
            double_click_ms: DEFAULT_DOUBLE_CLICK_MS,
        }
    }
}

impl Config {
    pub fn debounce(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn longpress(mut self, ms: u32) -> Self {
        self.longpress_ms = ms;
        self
    }

    /// Set when repeats start and how far apart they are.
    pub fn repeat(mut self, start_ms: u32, period_ms: u32) -> Self {
        self.repeat_start_ms = start_ms;
        self.repeat_period_ms = period_ms;
        self
    }

    pub fn double_click(mut self, ms: u32) -> Self {
        self.double_click_ms = ms;
        self
    }
}

/// An electrical level on a pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// The other level
    pub fn inverse(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::High
    }
}
