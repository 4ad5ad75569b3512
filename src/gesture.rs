//! The per-key debounce and gesture state machine.
//!
//! Every tick a key gets its raw level and the time elapsed since the last
//! tick. The raw level goes through a debouncer first: it has to hold for
//! the debounce time before the stable level follows it. Everything else
//! reacts only to flips of the stable level.
//!
//! ```text
//!  text on arrows is input
//!  [] surround output events
//!  {} surround states
//!  D - stable level flips to pressed
//!  U - stable level flips to released
//!  L - held for the long press time
//!  W - double click window ran out
//!
//!            ┌──────────────W[Click]─────────────┐
//!            v                                   │
//!        {Idle}──D[Press]──>{Pressed}──U[Release]─>{ClickPending}
//!            ^                 │                   │   ^
//!            │                 L[LongPress]        D[Press]
//!            │                 v                   v   │
//!            │             {LongPressed}      {Pressed, click pending}
//!            │                 │                   │
//!            └──U[Release, LongPressRelease]       U[Release, DoubleClick]──> {Idle}
//! ```
//!
//! While held, repeats are generated at a steady rate once the repeat start
//! time has passed, whether or not the long press fired yet.

use shared_types::{GestureState, KeyEventKind};

use crate::config::Config;

/// Timing and gesture state of one key.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyRuntime {
    raw_last: bool,
    stable: bool,
    long_sent: bool,
    click_count: u8,
    debounce_ms: u32,
    press_ms: u32,
    repeat_ms: u32,
    click_wait_ms: u32,
}

impl KeyRuntime {
    /// The debounced level
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    pub fn state(&self) -> GestureState {
        match (self.stable, self.long_sent, self.click_count) {
            (true, true, _) => GestureState::LongPressed,
            (true, false, _) => GestureState::Pressed,
            (false, _, 0) => GestureState::Idle,
            (false, _, _) => GestureState::ClickPending,
        }
    }

    /// Advances the key by `dt` milliseconds with `raw` as its current raw
    /// level, handing every event it produces to `emit` in order.
    pub fn step(&mut self, raw: bool, dt: u32, cfg: &Config, mut emit: impl FnMut(KeyEventKind)) {
        if raw != self.raw_last {
            self.raw_last = raw;
            self.debounce_ms = 0;
        } else if self.debounce_ms < cfg.debounce_ms {
            self.debounce_ms = self.debounce_ms.saturating_add(dt).min(cfg.debounce_ms);
        }

        if self.debounce_ms >= cfg.debounce_ms && self.stable != self.raw_last {
            self.stable = self.raw_last;
            if self.stable {
                trace!("stable press");
                self.clear_hold();
                emit(KeyEventKind::Press);
            } else {
                trace!("stable release");
                emit(KeyEventKind::Release);
                self.on_release(cfg, &mut emit);
                self.clear_hold();
            }
        }

        if self.stable {
            self.press_ms = self.press_ms.saturating_add(dt);
            if !self.long_sent && self.press_ms >= cfg.longpress_ms {
                self.long_sent = true;
                emit(KeyEventKind::LongPress);
            }
            if self.press_ms >= cfg.repeat_start_ms {
                self.repeat_ms = self.repeat_ms.saturating_add(dt);
                if self.repeat_ms >= cfg.repeat_period_ms {
                    self.repeat_ms = 0;
                    emit(KeyEventKind::Repeat);
                }
            }
        } else if self.click_count == 1 {
            self.click_wait_ms = self.click_wait_ms.saturating_add(dt);
            if self.click_wait_ms >= cfg.double_click_ms {
                self.clear_clicks();
                emit(KeyEventKind::Click);
            }
        }
    }

    fn on_release(&mut self, cfg: &Config, emit: &mut impl FnMut(KeyEventKind)) {
        if self.long_sent {
            // a long press never counts towards a click
            emit(KeyEventKind::LongPressRelease);
            self.clear_clicks();
        } else if self.click_count == 0 {
            self.click_count = 1;
            self.click_wait_ms = 0;
        } else if self.click_count == 1 && self.click_wait_ms <= cfg.double_click_ms {
            emit(KeyEventKind::DoubleClick);
            self.clear_clicks();
        } else {
            self.click_count = 1;
            self.click_wait_ms = 0;
        }
    }

    fn clear_hold(&mut self) {
        self.press_ms = 0;
        self.repeat_ms = 0;
        self.long_sent = false;
    }

    fn clear_clicks(&mut self) {
        self.click_count = 0;
        self.click_wait_ms = 0;
    }
}
