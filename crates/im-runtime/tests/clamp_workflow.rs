// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Clamp runs over the full mechanism stack.
//!
//! These tests drive `ImModel` through `MechanismArray` and `ClampDriver`
//! and check the resulting traces against the channel's steady state.

use im_channel::{
    evaluate_gating, exp_clamped, HostEnvironment, ImChannel, ImModel, InstanceId, KineticsParams,
};
use im_config::ImConfig;
use im_runtime::{
    from_config, ClampDriver, ClampMode, ClampProtocol, ClampStep, Compartment, IonStore,
    MechanismArray, NodeMatrix,
};

fn steady_state(v: f64) -> f64 {
    evaluate_gating(v, 1000.0, exp_clamped).m_inf
}

#[test]
fn test_voltage_clamp_converges_to_steady_state() {
    let mut driver = ClampDriver::new(
        ImModel::default(),
        ImChannel::new(1e-4),
        Compartment::default(),
        HostEnvironment::new(36.0, 0.1),
        -77.0,
    );
    let protocol = ClampProtocol::new(
        ClampMode::Voltage,
        vec![
            ClampStep { duration_ms: 10.0, level: -70.0 },
            ClampStep { duration_ms: 3000.0, level: -20.0 },
        ],
    )
    .unwrap();

    let trace = driver.run(&protocol, -70.0).unwrap();
    let last = trace.last().unwrap();

    // Gate only opens and never overshoots while clamped at one level
    let m_inf = steady_state(-20.0);
    let gates: Vec<f64> = trace.iter().skip(101).map(|p| p.m).collect();
    assert!(gates.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    assert!(gates.iter().all(|&m| m <= m_inf + 1e-9));

    assert!((last.m - m_inf).abs() < 0.01 * m_inf);
    assert!((last.ik - 1e-4 * last.m * (-20.0 + 77.0)).abs() < 1e-15);
}

#[test]
fn test_deactivation_after_step_back() {
    let mut driver = ClampDriver::new(
        ImModel::default(),
        ImChannel::new(1e-4),
        Compartment::default(),
        HostEnvironment::new(36.0, 0.1),
        -77.0,
    );
    let protocol = ClampProtocol::new(
        ClampMode::Voltage,
        vec![
            ClampStep { duration_ms: 500.0, level: 0.0 },
            ClampStep { duration_ms: 500.0, level: -90.0 },
        ],
    )
    .unwrap();

    let trace = driver.run(&protocol, -70.0).unwrap();
    let peak = trace[5000].m;
    let end = trace.last().unwrap().m;
    assert!(peak > 0.5);
    assert!(end < peak);
    assert!(end > steady_state(-90.0));
}

#[test]
fn test_current_clamp_hyperpolarizes_with_open_channel() {
    let run = |gkbar: f64| {
        let mut driver = ClampDriver::new(
            ImModel::default(),
            ImChannel::new(gkbar),
            Compartment::default(),
            HostEnvironment::new(36.0, 0.025),
            -77.0,
        );
        let protocol = ClampProtocol::new(
            ClampMode::Current,
            vec![ClampStep { duration_ms: 200.0, level: 0.002 }],
        )
        .unwrap();
        driver.run(&protocol, -70.0).unwrap()
    };

    let passive = run(0.0);
    let with_channel = run(5e-4);

    let v_passive = passive.last().unwrap().v;
    let v_channel = with_channel.last().unwrap().v;
    assert!(v_passive > -70.0);
    assert!(v_channel < v_passive);
    assert!(with_channel.last().unwrap().ik > 0.0);
}

#[test]
fn test_trace_serializes_as_json() {
    let mut config = ImConfig::default();
    config.clamp.steps.truncate(1);
    config.clamp.steps[0].duration_ms = 0.05;

    let (mut driver, protocol) = from_config(&config).unwrap();
    let trace = driver.run(&protocol, config.environment.v_init).unwrap();
    assert_eq!(trace.len(), 3);

    let json = serde_json::to_value(trace[0]).unwrap();
    assert_eq!(json["t"], 0.0);
    assert_eq!(json["v"], -70.0);
    assert_eq!(json["m"], 0.0);
    assert!(json.get("ik").is_some());
}

#[test]
fn test_shared_nodes_in_multi_instance_array() {
    let mut array = MechanismArray::new(ImModel::new(KineticsParams::default()));
    let a = array.insert(0, ImChannel::new(1e-6));
    let b = array.insert(0, ImChannel::new(2e-6));
    let c = array.insert(1, ImChannel::new(1e-6));
    assert_eq!((a, b, c), (InstanceId(0), InstanceId(1), InstanceId(2)));

    let voltages = [-40.0, -60.0];
    array.init_all(&voltages, &HostEnvironment::default()).unwrap();
    array.state_all(&voltages, 0.025).unwrap();

    let mut ions = IonStore::new(2, -90.0);
    let mut matrix = NodeMatrix::new(2);
    array.current_all(&voltages, &mut ions, &mut matrix).unwrap();
    array.jacobian_all(&mut matrix).unwrap();

    let m = array.states();
    let expected_node0 = (1e-6 * m[0] + 2e-6 * m[1]) * (-40.0 + 90.0);
    assert!((ions.accumulators[0].ik - expected_node0).abs() < 1e-18);
    assert!((matrix.rhs[0] + expected_node0).abs() < 1e-18);
    assert!((matrix.d[1] - 1e-6 * m[2]).abs() < 1e-12);
}
