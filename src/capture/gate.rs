use std::sync::atomic::{AtomicBool, Ordering};

/// At most one capture in flight. Requests arriving while busy are dropped, not queued.
#[derive(Debug, Default)]
pub struct CaptureGate {
    busy: AtomicBool,
}

impl CaptureGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a capture is already running.
    pub fn try_acquire(&self) -> Option<CaptureTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CaptureTicket { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of a capture; releases the gate on drop, whatever the outcome.
#[derive(Debug)]
#[must_use = "dropping the ticket releases the gate immediately"]
pub struct CaptureTicket<'a> {
    gate: &'a CaptureGate,
}

impl Drop for CaptureTicket<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/gate.rs"]
mod tests;
