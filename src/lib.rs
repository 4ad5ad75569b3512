//! Debounce and gesture detection for polled keys.
//!
//! A [`Keyboard`] samples its keys through a [`Backend`] once per tick,
//! debounces every key, and turns stable level changes into presses,
//! releases, clicks, double clicks, long presses and repeats. Nothing here
//! allocates: keys live in a caller owned [`KeyPool`], and per tick events
//! go through a fixed size batch.
//!
//! ```ignore
//! let mut pool = KeyPool::<Pin, 8>::new();
//!
//! let mut kb = Keyboard::<_, _, _, 8, 8, 32>::new(
//!     &mut pool,
//!     GpioBackend::new(pins).active_level(Level::Low),
//!     |name, id, kind| send(id, kind),
//!     Config::default(),
//! )?;
//! kb.register_pin(0, "up", 1)?;
//! loop {
//!     kb.poll(10);
//! }
//! ```
#![no_std]

#[macro_use]
mod fmt;

pub mod backend;
pub mod config;
pub mod error;
pub mod gesture;
pub mod keyboard;
pub mod lock;
pub mod pool;
pub mod registry;

pub use backend::{Backend, CustomBackend, GpioBackend, HwCode, MatrixBackend, MatrixPos, Pin};
pub use config::{Config, Level};
pub use error::{Error, ScanError};
pub use keyboard::{EventHandler, KeyEvent, Keyboard};
pub use lock::{HookLock, NoLock, RegistrationLock};
pub use pool::{BlockHandle, BlockPool, MAX_BLOCKS};
pub use registry::{KeyDescriptor, KeyPool};
pub use shared_types::{GestureState, KeyEventKind, WireEvent};

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use lock::InterruptFree;
