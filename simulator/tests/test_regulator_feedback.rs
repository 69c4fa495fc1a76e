//! Halt/resume feedback scenarios, driven by scripted price and order
//! feeds so the trajectories are fully deterministic.

mod common;

use common::Script;
use market_simulator_core::{
    Component, CoupledModel, Endpoint, MatchingEngine, Message, MessageKind, Order, PortSpec,
    RegSignal, Regulator, RootCoordinator, Side, SimEvent,
};

const PRICE_FEED: [PortSpec; 1] = [PortSpec::new("price_out", MessageKind::Price)];
const ORDER_FEED: [PortSpec; 1] = [PortSpec::new("order_out", MessageKind::Order)];
const SIGNAL_FEED: [PortSpec; 1] = [PortSpec::new("signal_out", MessageKind::Signal)];

/// A regulator watching a scripted market feed: steady at 50, then a sharp
/// drop to 48 at t=2.
fn regulator_with_feed() -> RootCoordinator {
    let feed = Script::new(
        "feed",
        &PRICE_FEED,
        vec![
            (1.0, "price_out", Message::Price(50.0)),
            (2.0, "price_out", Message::Price(48.0)),
        ],
    );

    let mut top = CoupledModel::new("top");
    top.add_component(Component::atomic(feed)).unwrap();
    top.add_component(Component::atomic(Regulator::new("Regulator")))
        .unwrap();
    top.add_coupling(
        Endpoint::Child("feed", "price_out"),
        Endpoint::Child("Regulator", "market_update_in"),
    )
    .unwrap();

    RootCoordinator::new(top).unwrap()
}

#[test]
fn test_halt_emitted_on_following_cycle_resume_five_later() {
    let mut coordinator = regulator_with_feed();
    coordinator.start().unwrap();
    coordinator.simulate(20.0).unwrap();

    let signals: Vec<_> = coordinator
        .event_log()
        .outputs_on("Regulator", "reg_signal_out")
        .collect();

    // Drop observed at t=2, halt on the immediately following (same-time)
    // cycle, resume exactly 5.0 later, and nothing else.
    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0], (2.0, &Message::Signal(RegSignal::Halt)));
    assert_eq!(signals[1], (7.0, &Message::Signal(RegSignal::Resume)));

    // Back to monitoring once the halt period ends.
    let state = coordinator.model_state("Regulator").unwrap();
    assert_eq!(state["phase"], serde_json::json!("Monitoring"));
    assert_eq!(state["halt_active"], serde_json::json!(false));
    assert_eq!(state["halt_signal_sent"], serde_json::json!(false));
}

/// A matching engine halted at t=0.5, then fed orders at t=1 and t=2, with
/// a resume at t=2.5 and a final order at t=3.
fn halted_engine_tree() -> RootCoordinator {
    let orders = Script::new(
        "orders",
        &ORDER_FEED,
        vec![
            (1.0, "order_out", Message::Order(Order::new(Side::Buy, 100, 50.0))),
            (2.0, "order_out", Message::Order(Order::new(Side::Sell, 80, 50.0))),
            (3.0, "order_out", Message::Order(Order::new(Side::Buy, 60, 50.0))),
        ],
    );
    let signals = Script::new(
        "signals",
        &SIGNAL_FEED,
        vec![
            (0.5, "signal_out", Message::Signal(RegSignal::Halt)),
            (2.5, "signal_out", Message::Signal(RegSignal::Resume)),
        ],
    );

    let mut top = CoupledModel::new("top");
    top.add_component(Component::atomic(orders)).unwrap();
    top.add_component(Component::atomic(signals)).unwrap();
    top.add_component(Component::atomic(MatchingEngine::new("MatchingEngine", 4242)))
        .unwrap();
    top.add_coupling(
        Endpoint::Child("orders", "order_out"),
        Endpoint::Child("MatchingEngine", "order_in"),
    )
    .unwrap();
    top.add_coupling(
        Endpoint::Child("signals", "signal_out"),
        Endpoint::Child("MatchingEngine", "reg_signal_in"),
    )
    .unwrap();

    RootCoordinator::new(top).unwrap()
}

#[test]
fn test_halted_market_suppresses_executions_but_not_updates() {
    let mut coordinator = halted_engine_tree();
    coordinator.start().unwrap();
    coordinator.simulate(10.0).unwrap();

    let log = coordinator.event_log();

    // Orders at t=1 and t=2 arrive while halted: no execution reports.
    let executions: Vec<_> = log.outputs_on("MatchingEngine", "execution_out").collect();
    assert_eq!(executions.len(), 1, "only the post-resume order executes");
    assert_eq!(executions[0].0, 3.0);
    assert_eq!(executions[0].1.as_order().unwrap().quantity, 60);

    // Market updates keep flowing on every heartbeat regardless of phase.
    let update_times: Vec<f64> = log
        .outputs_on("MatchingEngine", "market_update_out")
        .map(|(t, _)| t)
        .collect();
    for t in [1.0, 2.0, 3.0] {
        assert!(update_times.contains(&t), "no market update at t={}", t);
    }

    // While halted the engine only ages: price and liquidity untouched
    // until the resumed order at t=3 lands.
    let pre_resume_states: Vec<_> = log
        .events()
        .iter()
        .filter_map(|event| match event {
            SimEvent::TransitionApplied {
                time, model, state, ..
            } if model == "MatchingEngine" && *time < 3.0 => Some(state.clone()),
            _ => None,
        })
        .collect();
    for state in &pre_resume_states {
        assert_eq!(state["last_trade_price"].as_f64().unwrap(), 50.0);
        assert_eq!(state["liquidity"].as_i64().unwrap(), 1000);
    }

    let final_state = coordinator.model_state("MatchingEngine").unwrap();
    assert_eq!(final_state["liquidity"].as_i64().unwrap(), 940);
    assert_eq!(final_state["phase"], serde_json::json!("Running"));
}
