use super::*;
use proptest::prelude::*;

#[test]
fn no_activity_never_blocks() {
    let interceptor = ForwardInterceptor::new();
    assert!(!interceptor.block_foreign_source_at(0));
    assert!(!interceptor.block_foreign_source_at(u32::MAX));
}

#[test]
fn s6_scenario_hysteresis_and_rewrite() {
    let mut interceptor = ForwardInterceptor::new();

    // t=0: CAR-bus cruise command observed.
    let verdict = interceptor.observe_tx(Bus::Car, CRUISE_COMMAND_ADDR, 0);
    assert_eq!(verdict, TxVerdict::Unchanged);

    // t=100ms: ADAS-sourced forward of the same address must be dropped.
    let fwd = interceptor.forward_decision(CRUISE_COMMAND_ADDR, Bus::Adas, 100_000);
    assert_eq!(fwd, ForwardVerdict::Drop);

    // t=100ms: an outbound ADAS frame at the same address is rewritten, not dropped.
    let tx = interceptor.observe_tx(Bus::Adas, CRUISE_COMMAND_ADDR, 100_000);
    assert_eq!(
        tx,
        TxVerdict::Rewrite {
            new_address: 0x9A0
        }
    );

    // t=151ms: grace window has elapsed, forwarding resumes.
    let fwd_after = interceptor.forward_decision(CRUISE_COMMAND_ADDR, Bus::Adas, 151_000);
    assert_eq!(
        fwd_after,
        ForwardVerdict::Forward {
            destination: Bus::Car
        }
    );
}

#[test]
fn hysteresis_window_boundary_is_inclusive() {
    let mut interceptor = ForwardInterceptor::new();
    interceptor.observe_tx(Bus::Car, CRUISE_COMMAND_ADDR, 0);
    assert!(interceptor.block_foreign_source_at(GRACE_WINDOW_US));
    assert!(!interceptor.block_foreign_source_at(GRACE_WINDOW_US + 1));
}

#[test]
fn non_cruise_addresses_are_never_blocked() {
    let mut interceptor = ForwardInterceptor::new();
    interceptor.observe_tx(Bus::Car, CRUISE_COMMAND_ADDR, 0);
    let fwd = interceptor.forward_decision(0x200, Bus::Adas, 1_000);
    assert_eq!(
        fwd,
        ForwardVerdict::Forward {
            destination: Bus::Car
        }
    );
}

#[test]
fn forwarding_from_car_targets_adas_by_default() {
    let mut interceptor = ForwardInterceptor::new();
    let fwd = interceptor.forward_decision(0x321, Bus::Car, 0);
    assert_eq!(
        fwd,
        ForwardVerdict::Forward {
            destination: Bus::Adas
        }
    );
}

#[test]
fn tx_observation_handles_timestamp_wraparound() {
    let mut interceptor = ForwardInterceptor::new();
    let near_wrap = u32::MAX - 1_000;
    interceptor.observe_tx(Bus::Car, CRUISE_COMMAND_ADDR, near_wrap);

    let after_wrap = 500u32; // 1500us after near_wrap, well inside the grace window
    assert!(interceptor.block_foreign_source_at(after_wrap));
}

proptest! {
    /// Testable property 7: after a CAR-bus 0x1A0 frame at time `t`,
    /// `block_foreign_source` is true for every query in `[t, t+150_000)`
    /// and false from `t+150_000` onward.
    #[test]
    fn hysteresis_window_holds_for_arbitrary_offsets(offset in 0u32..400_000u32) {
        let mut interceptor = ForwardInterceptor::new();
        interceptor.observe_tx(Bus::Car, CRUISE_COMMAND_ADDR, 0);

        let blocked = interceptor.block_foreign_source_at(offset);
        prop_assert_eq!(blocked, offset <= GRACE_WINDOW_US);
    }
}
