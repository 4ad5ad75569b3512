//! The keyboard control block: registration, polling and event delivery.

use heapless::Vec;
use shared_types::{GestureState, KeyEventKind, WireEvent};

use crate::backend::{Backend, HwCode, MatrixPos, Pin};
use crate::config::Config;
use crate::error::Error;
use crate::gesture::KeyRuntime;
use crate::lock::{NoLock, RegistrationLock};
use crate::registry::{KeyDescriptor, KeyPool, KeyRegistry};

/// An event together with the key that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub name: &'static str,
    pub id: u16,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// The packed form sent over a serial link.
    ///
    /// The keyboard never sets `overflow` itself. A sender that wants to
    /// forward drops raises it after [`EventHandler::on_overflow`] fires.
    pub fn to_wire(&self, overflow: bool) -> WireEvent {
        WireEvent {
            key_id: self.id,
            kind: self.kind,
            overflow,
        }
    }
}

/// Receives the events of a keyboard.
///
/// Implemented for every `FnMut(&'static str, u16, KeyEventKind)`, whose
/// captures stand in for a user context.
pub trait EventHandler {
    fn on_event(&mut self, name: &'static str, id: u16, kind: KeyEventKind);

    /// Called once after a tick's events were delivered, if that tick
    /// produced more events than the batch holds. The excess is lost.
    fn on_overflow(&mut self, _dropped: usize) {}
}

impl<F> EventHandler for F
where
    F: FnMut(&'static str, u16, KeyEventKind),
{
    fn on_event(&mut self, name: &'static str, id: u16, kind: KeyEventKind) {
        self(name, id, kind)
    }
}

/// A keyboard of up to `N` keys, registered into a pool of `P` blocks, that
/// delivers at most `E` events per tick. `E = 4 * N` covers any tick that
/// does not stabilise more than one transition per key. A smaller `E` is
/// accepted, and a tick that outgrows it drops and counts the excess.
///
/// Keys are sampled, updated and reported in registration order. Events are
/// only delivered once every key has been updated, so a handler never sees a
/// tick half done.
pub struct Keyboard<'p, B: Backend, H, L, const N: usize, const P: usize, const E: usize> {
    backend: B,
    handler: H,
    lock: L,
    config: Config,
    registry: KeyRegistry<'p, B::Location, P>,
    runtime: [KeyRuntime; N],
    levels: [bool; N],
    batch: Vec<KeyEvent, E>,
    dropped: u32,
    last_tick: Option<u32>,
}

impl<'p, B, H, const N: usize, const P: usize, const E: usize> Keyboard<'p, B, H, NoLock, N, P, E>
where
    B: Backend,
    H: EventHandler,
{
    /// Builds a keyboard over `backend`, taking over `pool` for its
    /// registrations. Everything in the pool is freed.
    pub fn new(
        pool: &'p mut KeyPool<B::Location, P>,
        backend: B,
        handler: H,
        config: Config,
    ) -> Result<Self, Error> {
        if N == 0 || E == 0 {
            return Err(Error::Param);
        }
        if !backend.is_capable() {
            return Err(Error::Backend);
        }
        if P == 0 {
            return Err(Error::PoolConfig);
        }
        if E < N.saturating_mul(4) {
            debug!("event batch of {} is below 4 per key, ticks may drop", E);
        }
        debug!("keyboard up: {} keys, {} blocks, {} events", N, P, E);
        Ok(Keyboard {
            backend,
            handler,
            lock: NoLock,
            config,
            registry: KeyRegistry::new(pool),
            runtime: [KeyRuntime::default(); N],
            levels: [false; N],
            batch: Vec::new(),
            dropped: 0,
            last_tick: None,
        })
    }
}

impl<'p, B, H, L, const N: usize, const P: usize, const E: usize> Keyboard<'p, B, H, L, N, P, E>
where
    B: Backend,
    H: EventHandler,
    L: RegistrationLock,
{
    /// Replaces the registration lock.
    pub fn with_lock<L2: RegistrationLock>(self, lock: L2) -> Keyboard<'p, B, H, L2, N, P, E> {
        Keyboard {
            backend: self.backend,
            handler: self.handler,
            lock,
            config: self.config,
            registry: self.registry,
            runtime: self.runtime,
            levels: self.levels,
            batch: self.batch,
            dropped: self.dropped,
            last_tick: self.last_tick,
        }
    }

    /// Registers a key. It is appended after every key registered before it.
    ///
    /// Fails without changing anything if the name is empty, the location
    /// is out of the backend's range, the id or location is taken, the
    /// keyboard is full, or the pool is exhausted.
    pub fn register(&mut self, key: KeyDescriptor<B::Location>) -> Result<(), Error> {
        if key.name.is_empty() {
            return Err(Error::Param);
        }
        self.backend.validate(&key.location)?;
        let registry = &mut self.registry;
        let result = self.lock.lock(|| registry.push(key, N));
        match result {
            Ok(()) => debug!("registered {} as {}", key.name, key.id),
            Err(e) => warn!("registering {} failed: {}", key.name, e),
        }
        result
    }

    /// Advances every key by `dt_ms` milliseconds and delivers the events
    /// this produced. A zero delta does nothing.
    ///
    /// If sampling fails the tick is skipped entirely: no key changes and
    /// nothing is delivered.
    pub fn poll(&mut self, dt_ms: u32) {
        if dt_ms == 0 {
            return;
        }
        let count = self.registry.len().min(N);
        let levels = &mut self.levels[..count];
        let locations = self.registry.iter().map(|key| &key.location).take(count);
        if let Err(e) = self.backend.scan(locations, levels) {
            warn!("scan failed, tick skipped: {}", e);
            return;
        }

        self.batch.clear();
        let mut dropped = 0usize;
        let config = &self.config;
        let batch = &mut self.batch;
        let keys = self.registry.iter().zip(self.runtime.iter_mut());
        for ((key, rt), &raw) in keys.zip(self.levels.iter()) {
            rt.step(raw, dt_ms, config, |kind| {
                let event = KeyEvent {
                    name: key.name,
                    id: key.id,
                    kind,
                };
                if batch.push(event).is_err() {
                    dropped += 1;
                }
            });
        }

        for event in self.batch.iter() {
            self.handler.on_event(event.name, event.id, event.kind);
        }
        if dropped > 0 {
            warn!("{} events dropped this tick", dropped);
            self.dropped = self.dropped.saturating_add(dropped as u32);
            self.handler.on_overflow(dropped);
        }
    }

    /// Polls with a delta derived from a free running millisecond counter.
    ///
    /// The first call only records `now_ms`. The counter may wrap.
    pub fn poll_at(&mut self, now_ms: u32) {
        let dt = match self.last_tick.replace(now_ms) {
            Some(prev) => now_ms.wrapping_sub(prev),
            None => 0,
        };
        self.poll(dt);
    }

    /// Frees every registration back into the pool and hands back the
    /// backend and the handler.
    pub fn release(mut self) -> (B, H) {
        self.registry.clear();
        (self.backend, self.handler)
    }

    pub fn key_count(&self) -> usize {
        self.registry.len()
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &KeyDescriptor<B::Location>> + '_ {
        self.registry.iter()
    }

    /// Gesture state of the `index`th registered key
    pub fn key_state(&self, index: usize) -> Option<GestureState> {
        if index < self.registry.len() {
            self.runtime.get(index).map(KeyRuntime::state)
        } else {
            None
        }
    }

    /// Debounced level of the `index`th registered key
    pub fn is_pressed(&self, index: usize) -> Option<bool> {
        if index < self.registry.len() {
            self.runtime.get(index).map(KeyRuntime::is_pressed)
        } else {
            None
        }
    }

    /// `(used, free)` blocks of the registration pool
    pub fn pool_usage(&self) -> (usize, usize) {
        self.registry.pool_usage()
    }

    /// Events dropped since the keyboard was built
    pub fn dropped_events(&self) -> u32 {
        self.dropped
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}

impl<'p, B, H, L, const N: usize, const P: usize, const E: usize> Keyboard<'p, B, H, L, N, P, E>
where
    B: Backend<Location = Pin>,
    H: EventHandler,
    L: RegistrationLock,
{
    /// Registers the key read by pin `pin`.
    pub fn register_pin(&mut self, pin: u8, name: &'static str, id: u16) -> Result<(), Error> {
        self.register(KeyDescriptor {
            name,
            id,
            location: Pin(pin),
        })
    }
}

impl<'p, B, H, L, const N: usize, const P: usize, const E: usize> Keyboard<'p, B, H, L, N, P, E>
where
    B: Backend<Location = MatrixPos>,
    H: EventHandler,
    L: RegistrationLock,
{
    /// Registers the key at the crossing of `row` and `col`.
    pub fn register_matrix(
        &mut self,
        row: u8,
        col: u8,
        name: &'static str,
        id: u16,
    ) -> Result<(), Error> {
        self.register(KeyDescriptor {
            name,
            id,
            location: MatrixPos { row, col },
        })
    }
}

impl<'p, B, H, L, const N: usize, const P: usize, const E: usize> Keyboard<'p, B, H, L, N, P, E>
where
    B: Backend<Location = HwCode>,
    H: EventHandler,
    L: RegistrationLock,
{
    /// Registers the key the snapshot function knows as `code`.
    pub fn register_code(&mut self, code: u16, name: &'static str, id: u16) -> Result<(), Error> {
        self.register(KeyDescriptor {
            name,
            id,
            location: HwCode(code),
        })
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::*;
    use crate::backend::test::{matrix, FakeInput, Wiring};
    use crate::backend::{CustomBackend, GpioBackend};
    use crate::error::ScanError;
    use crate::lock::HookLock;
    use crate::pool::BlockPool;
    use core::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec::Vec;
    use KeyEventKind::*;

    type Log = Rc<RefCell<Vec<(&'static str, u16, KeyEventKind)>>>;

    fn recorder(log: &Log) -> impl FnMut(&'static str, u16, KeyEventKind) {
        let log = log.clone();
        move |name, id, kind| log.borrow_mut().push((name, id, kind))
    }

    #[track_caller]
    fn assert_events(expected: &[(&'static str, u16, KeyEventKind)], log: &Log) {
        assert_eq!(expected, &log.borrow()[..]);
        log.borrow_mut().clear();
    }

    /// Polls `ticks` times with 10 ms deltas.
    fn run<B, H, L, const N: usize, const P: usize, const E: usize>(
        kb: &mut Keyboard<'_, B, H, L, N, P, E>,
        ticks: usize,
    ) where
        B: Backend,
        H: EventHandler,
        L: RegistrationLock,
    {
        for _ in 0..ticks {
            kb.poll(10);
        }
    }

    #[test]
    fn gpio_press_and_click() {
        let pins: [FakeInput; 2] = Default::default();
        let log = Log::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 2, 2, 8>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            recorder(&log),
            Config::default(),
        )
        .unwrap();
        kb.register_pin(0, "up", 10).unwrap();
        kb.register_pin(1, "down", 11).unwrap();

        pins[1].set(true);
        run(&mut kb, 3);
        assert_events(&[("down", 11, Press)], &log);
        assert_eq!(Some(false), kb.is_pressed(0));
        assert_eq!(Some(true), kb.is_pressed(1));
        pins[1].set(false);
        run(&mut kb, 3);
        assert_events(&[("down", 11, Release)], &log);
        run(&mut kb, 24);
        assert_events(&[("down", 11, Click)], &log);
        assert_eq!(Some(GestureState::Idle), kb.key_state(1));
        assert_eq!(None, kb.key_state(2));
        assert_eq!(Some(false), kb.is_pressed(1));
        assert_eq!(None, kb.is_pressed(2));
    }

    #[test]
    fn events_follow_registration_order() {
        let pins: [FakeInput; 3] = Default::default();
        let log = Log::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 3, 3, 12>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            recorder(&log),
            Config::default(),
        )
        .unwrap();
        // registered out of pin order on purpose
        kb.register_pin(2, "c", 3).unwrap();
        kb.register_pin(0, "a", 1).unwrap();
        kb.register_pin(1, "b", 2).unwrap();

        for pin in pins.iter() {
            pin.set(true);
        }
        run(&mut kb, 3);
        assert_events(&[("c", 3, Press), ("a", 1, Press), ("b", 2, Press)], &log);
    }

    #[test]
    fn handler_runs_after_the_whole_pass() {
        let pins: [FakeInput; 2] = Default::default();
        let pressed_when_called = Rc::new(Cell::new(0));
        let seen = pressed_when_called.clone();
        let probe = pins.clone();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 2, 2, 8>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            move |_: &'static str, _: u16, kind: KeyEventKind| {
                if kind == Press {
                    // flipping pin 1 now must not leak into this tick
                    probe[1].set(false);
                    seen.set(seen.get() + 1);
                }
            },
            Config::default().debounce(0),
        )
        .unwrap();
        kb.register_pin(0, "a", 1).unwrap();
        kb.register_pin(1, "b", 2).unwrap();
        pins[0].set(true);
        pins[1].set(true);
        kb.poll(10);
        assert_eq!(2, pressed_when_called.get());
        assert_eq!(Some(GestureState::Pressed), kb.key_state(1));
    }

    #[test]
    fn duplicate_registration() {
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 4, 16>::new(
            &mut pool,
            matrix::<4, 4>(&Wiring::default()),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        kb.register_matrix(0, 0, "a", 1).unwrap();
        assert_eq!(Err(Error::Duplicate), kb.register_matrix(1, 1, "b", 1));
        assert_eq!(Err(Error::Duplicate), kb.register_matrix(0, 0, "c", 2));
        assert_eq!(1, kb.key_count());
        assert_eq!((1, 3), kb.pool_usage());
    }

    #[test]
    fn duplicate_pin() {
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 4, 16>::new(
            &mut pool,
            GpioBackend::new(<[FakeInput; 4]>::default()),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        kb.register_pin(2, "a", 1).unwrap();
        assert_eq!(Err(Error::Duplicate), kb.register_pin(2, "b", 2));
        assert_eq!(Err(Error::Duplicate), kb.register_pin(3, "c", 1));
        kb.register_pin(3, "d", 4).unwrap();
        assert_eq!(2, kb.key_count());
        assert_eq!((2, 2), kb.pool_usage());
    }

    #[test]
    fn duplicate_code() {
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 4, 16>::new(
            &mut pool,
            CustomBackend::new(|_: &mut [bool]| Ok(())),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        kb.register_code(0x0a01, "a", 1).unwrap();
        assert_eq!(Err(Error::Duplicate), kb.register_code(0x0a01, "b", 2));
        assert_eq!(Err(Error::Duplicate), kb.register_code(0x0a02, "c", 1));
        kb.register_code(0x0a02, "d", 4).unwrap();
        assert_eq!(2, kb.key_count());
        assert_eq!((2, 2), kb.pool_usage());
    }

    #[test]
    fn out_of_range_allocates_nothing() {
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 4, 16>::new(
            &mut pool,
            matrix::<2, 3>(&Wiring::default()),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        assert_eq!(Err(Error::Range), kb.register_matrix(2, 0, "a", 1));
        assert_eq!(Err(Error::Range), kb.register_matrix(0, 3, "a", 1));
        assert_eq!((0, 4), kb.pool_usage());
        assert_eq!(0, kb.key_count());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 1, 1, 4>::new(
            &mut pool,
            GpioBackend::new([FakeInput::default()]),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        assert_eq!(Err(Error::Param), kb.register_pin(0, "", 1));
        assert_eq!(0, kb.key_count());
    }

    #[test]
    fn full_and_pool_exhaustion() {
        let pins: [FakeInput; 4] = Default::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 2, 4, 8>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        kb.register_pin(0, "a", 1).unwrap();
        kb.register_pin(1, "b", 2).unwrap();
        assert_eq!(Err(Error::Full), kb.register_pin(2, "c", 3));
        drop(kb);

        let mut small = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 1, 8>::new(
            &mut small,
            GpioBackend::new(pins),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        kb.register_pin(0, "a", 1).unwrap();
        assert_eq!(Err(Error::NoMem), kb.register_pin(1, "b", 2));
        assert_eq!(1, kb.key_count());
    }

    #[test]
    fn construction_checks() {
        let mut pool = BlockPool::new();
        let err = Keyboard::<_, _, _, 2, 2, 8>::new(
            &mut pool,
            GpioBackend::new(<[FakeInput; 0]>::default()),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .err();
        assert_eq!(Some(Error::Backend), err);

        let mut empty = BlockPool::new();
        let err = Keyboard::<_, _, _, 2, 0, 8>::new(
            &mut empty,
            GpioBackend::new([FakeInput::default()]),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .err();
        assert_eq!(Some(Error::PoolConfig), err);

        let mut pool = BlockPool::new();
        let err = Keyboard::<_, _, _, 2, 2, 0>::new(
            &mut pool,
            GpioBackend::new([FakeInput::default()]),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .err();
        assert_eq!(Some(Error::Param), err);
    }

    #[test]
    fn lock_wraps_registration() {
        let trail = Rc::new(RefCell::new(Vec::new()));
        let (t1, t2) = (trail.clone(), trail.clone());
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 2, 2, 8>::new(
            &mut pool,
            matrix::<2, 2>(&Wiring::default()),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap()
        .with_lock(HookLock::new(
            move || t1.borrow_mut().push("lock"),
            move || t2.borrow_mut().push("unlock"),
        ));
        kb.register_matrix(0, 0, "a", 1).unwrap();
        assert_eq!(Err(Error::Duplicate), kb.register_matrix(0, 1, "b", 1));
        // a range error is caught before the lock is taken
        assert_eq!(Err(Error::Range), kb.register_matrix(5, 5, "c", 3));
        assert_eq!(&["lock", "unlock", "lock", "unlock"][..], &trail.borrow()[..]);
    }

    #[test]
    fn failed_snapshot_skips_tick() {
        let fail = Rc::new(Cell::new(false));
        let held = Rc::new(Cell::new(false));
        let (f, h) = (fail.clone(), held.clone());
        let log = Log::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 2, 2, 8>::new(
            &mut pool,
            CustomBackend::new(move |levels: &mut [bool]| {
                if f.get() {
                    return Err(ScanError::Snapshot);
                }
                levels[0] = h.get();
                Ok(())
            }),
            recorder(&log),
            Config::default(),
        )
        .unwrap();
        kb.register_code(0x0101, "fn", 7).unwrap();

        held.set(true);
        run(&mut kb, 2);
        // the snapshot fails for as long as it likes without advancing debounce
        fail.set(true);
        run(&mut kb, 10);
        assert_events(&[], &log);
        fail.set(false);
        run(&mut kb, 1);
        assert_events(&[("fn", 7, Press)], &log);
    }

    #[test]
    fn matrix_double_click() {
        let wiring = Wiring {
            row_active_high: true,
            ..Default::default()
        };
        let log = Log::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 4, 16>::new(
            &mut pool,
            matrix::<2, 2>(&wiring),
            recorder(&log),
            Config::default(),
        )
        .unwrap();
        kb.register_matrix(0, 0, "x", 1).unwrap();
        kb.register_matrix(1, 1, "y", 2).unwrap();

        for _ in 0..2 {
            wiring.held.borrow_mut().push((1, 1));
            run(&mut kb, 3);
            wiring.held.borrow_mut().clear();
            run(&mut kb, 5);
        }
        run(&mut kb, 50);
        assert_events(
            &[
                ("y", 2, Press),
                ("y", 2, Release),
                ("y", 2, Press),
                ("y", 2, Release),
                ("y", 2, DoubleClick),
            ],
            &log,
        );
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let pins: [FakeInput; 1] = Default::default();
        let log = Log::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 1, 1, 4>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            recorder(&log),
            Config::default().debounce(0),
        )
        .unwrap();
        kb.register_pin(0, "k", 1).unwrap();
        pins[0].set(true);
        kb.poll(0);
        assert_events(&[], &log);
        assert_eq!(Some(GestureState::Idle), kb.key_state(0));
    }

    #[test]
    fn poll_at_uses_wrapping_deltas() {
        let pins: [FakeInput; 1] = Default::default();
        let log = Log::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 1, 1, 4>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            recorder(&log),
            Config::default(),
        )
        .unwrap();
        kb.register_pin(0, "k", 1).unwrap();
        pins[0].set(true);
        let start = u32::MAX - 5;
        // baseline only
        kb.poll_at(start);
        // notices the new level
        kb.poll_at(start.wrapping_add(1));
        assert_events(&[], &log);
        // 20 ms across the wrap completes the debounce
        kb.poll_at(start.wrapping_add(21));
        assert_events(&[("k", 1, Press)], &log);
    }

    #[test]
    fn overflow_is_counted_and_reported() {
        #[derive(Default)]
        struct Counting {
            events: usize,
            overflows: Vec<usize>,
        }
        impl EventHandler for Counting {
            fn on_event(&mut self, _: &'static str, _: u16, _: KeyEventKind) {
                self.events += 1;
            }
            fn on_overflow(&mut self, dropped: usize) {
                self.overflows.push(dropped);
            }
        }

        let pins: [FakeInput; 4] = Default::default();
        let mut pool = BlockPool::new();
        // four keys but room for only two events per tick
        let mut kb = Keyboard::<_, _, _, 4, 4, 2>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            Counting::default(),
            Config::default().debounce(0),
        )
        .unwrap();
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            kb.register_pin(i as u8, *name, i as u16).unwrap();
        }
        for pin in pins.iter() {
            pin.set(true);
        }
        kb.poll(10);
        assert_eq!(2, kb.handler().events);
        assert_eq!(&[2][..], &kb.handler().overflows[..]);
        assert_eq!(2, kb.dropped_events());
        // dropped or not, every key still moved on
        for i in 0..4 {
            assert_eq!(Some(GestureState::Pressed), kb.key_state(i));
        }
        kb.poll(10);
        assert_eq!(&[2][..], &kb.handler().overflows[..]);
    }

    #[test]
    fn release_frees_the_pool() {
        let pins: [FakeInput; 2] = Default::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 2, 2, 8>::new(
            &mut pool,
            GpioBackend::new(pins),
            |_: &'static str, _: u16, _: KeyEventKind| {},
            Config::default(),
        )
        .unwrap();
        kb.register_pin(0, "a", 1).unwrap();
        kb.register_pin(1, "b", 2).unwrap();
        let names: Vec<_> = kb.keys().map(|k| k.name).collect();
        assert_eq!(&["a", "b"][..], &names[..]);
        let (backend, _) = kb.release();
        assert_eq!(0, pool.used());
        let _pins = backend.free();
    }

    #[test]
    fn wire_form() {
        let event = KeyEvent {
            name: "a",
            id: 42,
            kind: Repeat,
        };
        let wire = event.to_wire(false);
        assert_eq!(42, wire.key_id);
        assert_eq!(Repeat, wire.kind);
        assert!(!wire.overflow);
        assert!(event.to_wire(true).overflow);
    }

    #[test]
    fn sender_flags_the_event_after_a_drop() {
        #[derive(Default)]
        struct Sender {
            pending: bool,
            sent: Vec<WireEvent>,
        }
        impl EventHandler for Sender {
            fn on_event(&mut self, name: &'static str, id: u16, kind: KeyEventKind) {
                let event = KeyEvent { name, id, kind };
                self.sent.push(event.to_wire(self.pending));
                self.pending = false;
            }
            fn on_overflow(&mut self, _: usize) {
                self.pending = true;
            }
        }

        let pins: [FakeInput; 4] = Default::default();
        let mut pool = BlockPool::new();
        let mut kb = Keyboard::<_, _, _, 4, 4, 2>::new(
            &mut pool,
            GpioBackend::new(pins.clone()),
            Sender::default(),
            Config::default().debounce(0),
        )
        .unwrap();
        for i in 0..4u8 {
            kb.register_pin(i, "k", i as u16).unwrap();
        }
        for pin in pins.iter() {
            pin.set(true);
        }
        kb.poll(10);
        for pin in pins.iter() {
            pin.set(false);
        }
        kb.poll(10);
        let flags: Vec<_> = kb.handler().sent.iter().map(|w| w.overflow).collect();
        assert_eq!(&[false, false, true, false][..], &flags[..]);
        let kinds: Vec<_> = kb.handler().sent.iter().map(|w| w.kind).collect();
        assert_eq!(&[Press, Press, Release, Release][..], &kinds[..]);
    }
}
