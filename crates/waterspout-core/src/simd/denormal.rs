//! Scoped control of the hardware floating-point environment.
//!
//! [`DenormalGuard`] switches the current thread's vector unit to
//! flush-to-zero and restores the previous state when dropped, on every exit
//! path. Vector bodies of float multiply, divide and scale run under it; the
//! software bias in [`crate::element`] already makes their results identical
//! to the scalar engine, the guard keeps subnormal intermediates off the slow
//! microcode path.
//!
//! Only flush-to-zero is set, not denormals-are-zero: subnormal *inputs* are
//! still read exactly, as the scalar engine reads them. The caller's rounding
//! mode is never changed. Under a directed rounding mode the bias no longer
//! absorbs a flushed zero the way it absorbs a subnormal, so the guard then
//! leaves the control state untouched.

use std::marker::PhantomData;

/// Restores the saved floating-point control state on drop.
///
/// The guard is tied to the thread that created it (`!Send`), since the
/// control register is per hardware thread.
#[derive(Debug)]
#[must_use = "the previous floating-point state is restored when the guard drops"]
pub struct DenormalGuard {
    saved: arch::Control,
    _thread_bound: PhantomData<*const ()>,
}

impl DenormalGuard {
    /// Enables flush-to-zero until the guard drops.
    ///
    /// No-op while the thread rounds in any mode other than to-nearest.
    pub fn acquire() -> Self {
        let saved = arch::read();
        arch::write(arch::flushing(saved));
        Self {
            saved,
            _thread_bound: PhantomData,
        }
    }

    /// Whether the current thread flushes subnormal results to zero.
    ///
    /// Always false on targets without a controllable vector unit.
    #[must_use]
    pub fn is_flushing() -> bool {
        arch::is_flushing(arch::read())
    }
}

impl Drop for DenormalGuard {
    fn drop(&mut self) {
        arch::write(self.saved);
    }
}

/// Rounding modes of the vector unit's control register.
#[cfg(test)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rounding {
    Nearest,
    Down,
    Up,
    TowardZero,
}

#[cfg(test)]
impl Rounding {
    pub(crate) const ALL: [Self; 4] = [Self::Nearest, Self::Down, Self::Up, Self::TowardZero];
}

/// Switches the current thread's rounding mode until dropped.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct RoundingGuard {
    saved: arch::Control,
    _thread_bound: PhantomData<*const ()>,
}

#[cfg(test)]
impl RoundingGuard {
    pub(crate) fn set(mode: Rounding) -> Self {
        let saved = arch::read();
        arch::write(arch::rounding(saved, mode));
        Self {
            saved,
            _thread_bound: PhantomData,
        }
    }
}

#[cfg(test)]
impl Drop for RoundingGuard {
    fn drop(&mut self) {
        arch::write(self.saved);
    }
}

#[cfg(target_arch = "x86_64")]
mod arch {
    use std::arch::asm;

    pub(super) type Control = u32;

    const FLUSH_TO_ZERO: u32 = 1 << 15;
    const ROUNDING_CONTROL: u32 = 0b11 << 13;

    pub(super) fn read() -> Control {
        let mut csr: u32 = 0;
        // SAFETY: STMXCSR stores the 32-bit MXCSR to a valid, writable u32.
        // Reason: `_mm_getcsr` is deprecated in favour of inline assembly.
        unsafe {
            asm!(
                "stmxcsr [{}]",
                in(reg) std::ptr::addr_of_mut!(csr),
                options(nostack, preserves_flags)
            );
        }
        csr
    }

    pub(super) fn write(csr: Control) {
        // SAFETY: LDMXCSR loads a value previously read from MXCSR or derived
        // from one by setting the FTZ bit only.
        unsafe {
            asm!(
                "ldmxcsr [{}]",
                in(reg) std::ptr::addr_of!(csr),
                options(nostack, readonly, preserves_flags)
            );
        }
    }

    pub(super) fn flushing(csr: Control) -> Control {
        if csr & ROUNDING_CONTROL == 0 {
            csr | FLUSH_TO_ZERO
        } else {
            csr
        }
    }

    pub(super) fn is_flushing(csr: Control) -> bool {
        csr & FLUSH_TO_ZERO != 0
    }

    #[cfg(test)]
    pub(super) fn rounding(csr: Control, mode: super::Rounding) -> Control {
        use super::Rounding;
        let bits = match mode {
            Rounding::Nearest => 0b00,
            Rounding::Down => 0b01,
            Rounding::Up => 0b10,
            Rounding::TowardZero => 0b11,
        };
        (csr & !ROUNDING_CONTROL) | (bits << 13)
    }
}

#[cfg(target_arch = "aarch64")]
mod arch {
    use std::arch::asm;

    pub(super) type Control = u64;

    const FLUSH_TO_ZERO: u64 = 1 << 24;
    const ROUNDING_MODE: u64 = 0b11 << 22;

    pub(super) fn read() -> Control {
        let fpcr: u64;
        // SAFETY: FPCR is readable at EL0 on every aarch64 target.
        unsafe {
            asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
        }
        fpcr
    }

    pub(super) fn write(fpcr: Control) {
        // SAFETY: writes back a value read from FPCR, at most with FZ set.
        unsafe {
            asm!("msr fpcr, {}", in(reg) fpcr, options(nomem, nostack, preserves_flags));
        }
    }

    pub(super) fn flushing(fpcr: Control) -> Control {
        if fpcr & ROUNDING_MODE == 0 {
            fpcr | FLUSH_TO_ZERO
        } else {
            fpcr
        }
    }

    pub(super) fn is_flushing(fpcr: Control) -> bool {
        fpcr & FLUSH_TO_ZERO != 0
    }

    #[cfg(test)]
    pub(super) fn rounding(fpcr: Control, mode: super::Rounding) -> Control {
        use super::Rounding;
        let bits = match mode {
            Rounding::Nearest => 0b00,
            Rounding::Up => 0b01,
            Rounding::Down => 0b10,
            Rounding::TowardZero => 0b11,
        };
        (fpcr & !ROUNDING_MODE) | (bits << 22)
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod arch {
    pub(super) type Control = ();

    pub(super) fn read() -> Control {}

    pub(super) fn write(_: Control) {}

    pub(super) fn flushing(_: Control) -> Control {}

    pub(super) fn is_flushing(_: Control) -> bool {
        false
    }

    #[cfg(test)]
    pub(super) fn rounding(_: Control, _: super::Rounding) -> Control {}
}
