//! Bindings to the external `motionwrapper` library.
//!
//! With the `native` feature the library is linked at build time and resolved
//! by the dynamic loader when the process starts; if it cannot be found the
//! process never reaches `main`. Set `MOTIONWRAPPER_LIB_DIR` at build time to
//! point the linker at it.
//!
//! # Safety
//!
//! All extern "C" functions are unsafe. The library is not assumed to be
//! reentrant: `NativeBackend` is only ever driven from the single motion
//! worker, never concurrently.

use std::os::raw::{c_double, c_int};

use crate::backend::MotionBackend;
use crate::motion::MotionError;

pub const LIBRARY_NAME: &str = "motionwrapper";

#[cfg(feature = "native")]
mod ffi {
    use std::os::raw::{c_double, c_int};

    #[link(name = "motionwrapper")]
    unsafe extern "C" {
        /// Open the drive network and initialize every axis. Returns 0 on success.
        pub fn motionwrapper_initialize() -> c_int;

        /// Home all axes and wait for completion. Returns 0 on success.
        pub fn motionwrapper_home_all() -> c_int;

        /// Move to `len` target positions read from `positions`. Returns 0 on success.
        pub fn motionwrapper_move_to(positions: *const c_double, len: usize) -> c_int;
    }
}

/// The three C entry points the backend calls through.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints {
    pub initialize: unsafe extern "C" fn() -> c_int,
    pub home_all: unsafe extern "C" fn() -> c_int,
    pub move_to: unsafe extern "C" fn(*const c_double, usize) -> c_int,
}

#[cfg(feature = "native")]
impl EntryPoints {
    /// Entry points resolved from the linked `motionwrapper` library.
    pub fn linked() -> Self {
        Self {
            initialize: ffi::motionwrapper_initialize,
            home_all: ffi::motionwrapper_home_all,
            move_to: ffi::motionwrapper_move_to,
        }
    }
}

fn check(code: c_int) -> Result<(), MotionError> {
    if code == 0 {
        Ok(())
    } else {
        Err(MotionError::Native(code))
    }
}

#[derive(Debug)]
pub struct NativeBackend {
    entry: EntryPoints,
}

impl NativeBackend {
    #[cfg(feature = "native")]
    pub fn new() -> Self {
        Self::with_entry_points(EntryPoints::linked())
    }

    /// Drive the given entry points instead of the linked library.
    ///
    /// Every function must follow the `motionwrapper` calling contract.
    pub fn with_entry_points(entry: EntryPoints) -> Self {
        Self { entry }
    }
}

impl MotionBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn initialize(&mut self) -> Result<(), MotionError> {
        // SAFETY: no arguments; the library owns its own state.
        check(unsafe { (self.entry.initialize)() })
    }

    fn home_all(&mut self) -> Result<(), MotionError> {
        // SAFETY: no arguments; the library owns its own state.
        check(unsafe { (self.entry.home_all)() })
    }

    fn move_to(&mut self, positions: &[f64]) -> Result<(), MotionError> {
        // SAFETY: the pointer and length describe a live slice for the whole call
        // and the library only reads from it.
        check(unsafe { (self.entry.move_to)(positions.as_ptr(), positions.len()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static INIT_CALLS: AtomicUsize = AtomicUsize::new(0);
    static HOME_CALLS: AtomicUsize = AtomicUsize::new(0);
    static MOVES: Mutex<Vec<Vec<f64>>> = Mutex::new(Vec::new());

    unsafe extern "C" fn stub_initialize() -> c_int {
        INIT_CALLS.fetch_add(1, Ordering::SeqCst);
        0
    }

    unsafe extern "C" fn stub_home_all() -> c_int {
        HOME_CALLS.fetch_add(1, Ordering::SeqCst);
        0
    }

    unsafe extern "C" fn stub_move_to(positions: *const c_double, len: usize) -> c_int {
        let received = if len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(positions, len) }.to_vec()
        };
        MOVES.lock().unwrap().push(received);
        0
    }

    unsafe extern "C" fn failing_call() -> c_int {
        -42
    }

    unsafe extern "C" fn failing_move(_positions: *const c_double, _len: usize) -> c_int {
        7
    }

    #[test]
    fn test_entry_points_receive_exact_arguments() {
        let mut backend = NativeBackend::with_entry_points(EntryPoints {
            initialize: stub_initialize,
            home_all: stub_home_all,
            move_to: stub_move_to,
        });
        backend.initialize().unwrap();
        backend.home_all().unwrap();
        let targets = vec![vec![], vec![1.5], vec![-3.25, 1e12, 0.0, 7.0]];
        for positions in &targets {
            backend.move_to(positions).unwrap();
        }
        assert_eq!(INIT_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(HOME_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(*MOVES.lock().unwrap(), targets);
    }

    #[test]
    fn test_nonzero_return_codes_become_errors() {
        let mut backend = NativeBackend::with_entry_points(EntryPoints {
            initialize: failing_call,
            home_all: failing_call,
            move_to: failing_move,
        });
        assert_eq!(backend.initialize(), Err(MotionError::Native(-42)));
        assert_eq!(backend.home_all(), Err(MotionError::Native(-42)));
        let err = backend.move_to(&[1.0]).unwrap_err();
        assert_eq!(err, MotionError::Native(7));
        assert_eq!(err.code(), 7);
        assert_eq!(backend.name(), "native");
    }
}
