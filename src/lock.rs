//! Hooks that serialise registration against a concurrent poll.
//!
//! Polling never takes the lock. Integrators who can register and poll from
//! different contexts must serialise their polls the same way, or finish
//! registering before the first poll.

/// Runs a closure with exclusive access to the keyboard's registry.
pub trait RegistrationLock {
    fn lock<R>(&mut self, f: impl FnOnce() -> R) -> R;
}

/// No locking at all. Fine when registration is done before polling starts.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoLock;

impl RegistrationLock for NoLock {
    fn lock<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// A lock built from a pair of hooks, such as an RTOS mutex take and give.
pub struct HookLock<A, U> {
    acquire: A,
    release: U,
}

impl<A: FnMut(), U: FnMut()> HookLock<A, U> {
    pub fn new(acquire: A, release: U) -> Self {
        HookLock { acquire, release }
    }
}

impl<A: FnMut(), U: FnMut()> RegistrationLock for HookLock<A, U> {
    fn lock<R>(&mut self, f: impl FnOnce() -> R) -> R {
        (self.acquire)();
        let r = f();
        (self.release)();
        r
    }
}

/// Masks interrupts for the duration of the registration.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[derive(Debug, Default, Copy, Clone)]
pub struct InterruptFree;

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl RegistrationLock for InterruptFree {
    fn lock<R>(&mut self, f: impl FnOnce() -> R) -> R {
        cortex_m::interrupt::free(|_| f())
    }
}
