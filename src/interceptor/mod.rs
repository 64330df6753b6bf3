//! Forward-bus interceptor (spec §4.5). Suppresses a duplicate cruise
//! command from the factory ADAS unit for a grace window after an upstream
//! controller on the CAR bus issues its own. Grounded on
//! `hyundai_canfd_adas_drv_interceptor.h` (the populated variant; its
//! sibling `hyundai_canfd_adas_interceptor.h` is an empty stub and
//! contributes nothing here).

use crate::types::{elapsed, TimestampUs};

/// The three named buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    Car = 0,
    Aux = 1,
    Adas = 2,
}

/// Cruise-control command address of interest (`SCC_CONTROL`), grounded on
/// `HYUNDAI_CANFD_ADAS_DRV_SCC_MSGS`.
pub const CRUISE_COMMAND_ADDR: u32 = 0x1A0;
/// OR'd into the address to divert a blocked frame into an address the
/// vehicle ignores (`ESCC_MASK`).
pub const REWRITE_MASK: u32 = 0x800;
/// Grace window after a CAR-bus cruise command during which the ADAS unit's
/// duplicate is suppressed.
pub const GRACE_WINDOW_US: u32 = 150_000;

/// Verdict for the TX-observation hook: the frame is always transmitted,
/// possibly with a rewritten address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxVerdict {
    Unchanged,
    Rewrite { new_address: u32 },
}

/// Verdict for the cross-bus forward hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardVerdict {
    Forward { destination: Bus },
    Drop,
}

/// Owns the single shared `last_observed_us` timestamp. `block_foreign_source`
/// is deliberately not stored — spec §3 describes it as "a pure function of
/// the current time and `last_observed_us`", so every query recomputes it.
pub struct ForwardInterceptor {
    last_observed_us: TimestampUs,
    /// No CAR-bus cruise command has ever been observed: block must be
    /// false regardless of how `elapsed` would evaluate against a
    /// default-zero timestamp.
    ever_observed: bool,
}

impl Default for ForwardInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl ForwardInterceptor {
    pub fn new() -> Self {
        Self {
            last_observed_us: 0,
            ever_observed: false,
        }
    }

    fn block_foreign_source(&self, now: TimestampUs) -> bool {
        self.ever_observed && elapsed(now, self.last_observed_us) <= GRACE_WINDOW_US
    }

    /// Exposed for property tests asserting the hysteresis window directly.
    #[cfg(test)]
    fn block_foreign_source_at(&self, now: TimestampUs) -> bool {
        self.block_foreign_source(now)
    }

    /// TX-observation hook: called on every outbound frame. Always allows
    /// transmission; may request a rewritten address.
    pub fn observe_tx(&mut self, bus: Bus, address: u32, now: TimestampUs) -> TxVerdict {
        if address == CRUISE_COMMAND_ADDR && bus == Bus::Car {
            self.last_observed_us = now;
            self.ever_observed = true;
        }

        if self.block_foreign_source(now) && address == CRUISE_COMMAND_ADDR && bus == Bus::Adas {
            return TxVerdict::Rewrite {
                new_address: CRUISE_COMMAND_ADDR | REWRITE_MASK,
            };
        }

        TxVerdict::Unchanged
    }

    /// Forward hook: called for every frame the firmware would bridge
    /// between buses. Default destination is the opposite of source
    /// (CAR<->ADAS); recomputes `block_foreign_source` against `now` before
    /// deciding.
    pub fn forward_decision(&mut self, address: u32, source: Bus, now: TimestampUs) -> ForwardVerdict {
        if source == Bus::Car && address == CRUISE_COMMAND_ADDR {
            self.last_observed_us = now;
            self.ever_observed = true;
        }

        let destination = if source == Bus::Car { Bus::Adas } else { Bus::Car };
        let blocking = self.block_foreign_source(now);

        if blocking && address == CRUISE_COMMAND_ADDR && (source == Bus::Adas || destination == Bus::Adas) {
            ForwardVerdict::Drop
        } else {
            ForwardVerdict::Forward { destination }
        }
    }
}

#[cfg(test)]
mod tests;
