use rstest::rstest;
use serde_json::Value;

use gps_sim::{GpsError, GpsSimulation, Packet, RunConfig, SimulationResults, Trace};

const SINGLE_FLOW: &str = "
c single flow with default weight
f 1 eq
p 1 1 0 100
p 1 2 50 100
";

const WEIGHTED: &str = "
f 2 neq
w 1 2
c flow 2 has twice the weight of flow 1
p 2 1 0 100
p 2 2 0 100
p 2 3 0 100
p 1 4 0 100
p 2 5 0 100
p 1 6 0 100
p 2 7 0 100
p 2 8 0 100
p 1 9 0 100
";

fn run(trace: &str, drain: bool) -> SimulationResults {
    let trace: Trace = trace.parse().unwrap();
    let mut sim = GpsSimulation::new(trace, RunConfig::default().with_drain(drain)).unwrap();
    sim.run().unwrap()
}

#[rstest]
fn single_flow(#[values(false, true)] drain: bool) {
    let results = run(SINGLE_FLOW, drain);
    assert_eq!(results.flow_weights, vec![1.]);
    let vfts: Vec<f64> = results.packets.iter().map(|p| p.virtual_finish_time).collect();
    assert_eq!(vfts, vec![100., 200.]);

    let departure_times: Vec<Option<u64>> = results.packets.iter().map(|p| p.departure_time).collect();
    if drain {
        assert_eq!(departure_times, vec![Some(100), Some(200)]);
    } else {
        // the only busy period ends after the last arrival
        assert_eq!(departure_times, vec![None, None]);
        assert!(results.departures.is_empty());
    }
}

#[test]
fn weighted_interleaving() {
    let results = run(WEIGHTED, true);
    assert_eq!(results.departure_flow_order(), vec![2, 2, 1, 2, 2, 1, 2, 2, 1]);
    assert_eq!(results.departures.last().unwrap().departure_time, 900);
    for record in &results.packets {
        assert!(record.departure_time.is_some());
    }
}

#[rstest]
#[case(vec![1., 1.], 2)]
#[case(vec![1., 3.], 4)]
#[case(vec![0.5, 0.5, 1.], 6)]
fn departures_are_fifo_per_flow(#[case] weights: Vec<f64>, #[case] packets_per_flow: u64) {
    let flow_count = weights.len();
    let mut packets = Vec::new();
    let mut id = 0;
    for round in 0..packets_per_flow {
        for flow_id in 1..=flow_count {
            packets.push(Packet::new(flow_id, id, 10 * (flow_id as u64) + round, round * 7));
            id += 1;
        }
    }
    let mut sim = GpsSimulation::new(Trace::new(weights, packets), RunConfig::default().with_drain(true)).unwrap();
    let results = sim.run().unwrap();
    assert_eq!(results.departures.len(), flow_count * packets_per_flow as usize);
    assert!(sim.engine().is_idle());

    for flow_id in 1..=flow_count {
        let vfts: Vec<f64> = results
            .departures
            .iter()
            .filter(|d| d.packet.flow_id == flow_id)
            .map(|d| d.packet.virtual_finish_time)
            .collect();
        assert!(vfts.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn busy_periods_are_separated() {
    let results = run("f 2 eq\np 1 1 0 10\np 2 2 100 10\np 1 3 200 10", false);
    let departure_times: Vec<Option<u64>> = results.packets.iter().map(|p| p.departure_time).collect();
    assert_eq!(departure_times, vec![Some(10), Some(110), None]);
    assert_eq!(results.packets[1].virtual_finish_time, 10.);
    assert_eq!(results.packets[2].virtual_finish_time, 20.);
}

#[test]
fn invalid_weights() {
    let trace: Trace = "f 2 neq\nw 1 0\np 1 1 0 1".parse().unwrap();
    assert!(matches!(
        GpsSimulation::new(trace, RunConfig::default()),
        Err(GpsError::InvalidConfiguration(_))
    ));
}

#[test]
fn unknown_flow() {
    let trace: Trace = "f 1 eq\np 1 1 0 10\np 2 5 1 10".parse().unwrap();
    let mut sim = GpsSimulation::new(trace, RunConfig::default()).unwrap();
    assert_eq!(
        sim.run(),
        Err(GpsError::UnknownFlow {
            flow_id: 2,
            packet_id: 5,
            flow_count: 1
        })
    );
}

#[test]
fn second_run_is_rejected() {
    let trace: Trace = SINGLE_FLOW.parse().unwrap();
    let mut sim = GpsSimulation::new(trace, RunConfig::default().with_drain(true)).unwrap();
    let results = sim.run().unwrap();
    assert_eq!(results.departures.len(), 2);

    assert_eq!(sim.run(), Err(GpsError::AlreadyRun));
    let vfts: Vec<Option<f64>> = sim.packets().iter().map(|p| p.virtual_finish_time()).collect();
    assert_eq!(vfts, vec![Some(100.), Some(200.)]);
    assert!(sim.engine().is_idle());
}

#[test]
fn json_export() {
    let results = run(SINGLE_FLOW, true);
    let json: Value = serde_json::from_str(&results.to_json()).unwrap();
    assert_eq!(json["flow_weights"], serde_json::json!([1.0]));
    let packet = &json["packets"][1];
    assert_eq!(packet["flowId"], 1);
    assert_eq!(packet["packetId"], 2);
    assert_eq!(packet["arrivalTime"], 50);
    assert_eq!(packet["packetLength"], 100);
    assert_eq!(packet["virtualFinishTime"], 200.0);
    assert_eq!(packet["departureTime"], 200);
    assert_eq!(json["departures"][0]["packet"]["packetId"], 1);
    assert_eq!(json["departures"][0]["departureTime"], 100);

    let path = std::env::temp_dir().join("gps_sim_json_export_test.json");
    results.save_to_file(&path).unwrap();
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved, json);
    std::fs::remove_file(path).unwrap();
}
