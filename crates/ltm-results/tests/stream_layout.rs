//! Snapshot streams written alongside a simulation run.

use ltm_network::{Body, Exchange, ThermalNetwork};
use ltm_results::{BinaryReader, BinaryWriter, CsvWriter, SnapshotWriter};
use ltm_sim::{SimOptions, StepControl, Stepping, run_sim_with_observer};

fn demo_network() -> ThermalNetwork {
    let mut net = ThermalNetwork::new("demo");
    let a = net
        .register_body(Body::dynamic("Body A", 0.5, 400.0, 270.0).unwrap())
        .unwrap();
    let b = net
        .register_body(Body::dynamic("Body B", 0.5, 800.0, 600.0).unwrap())
        .unwrap();
    net.register_exchange(Exchange::conduction("a-b", a, b, 1.4).unwrap())
        .unwrap();
    net
}

/// Write the initial state plus one snapshot per step.
fn record<W: SnapshotWriter>(net: &mut ThermalNetwork, writer: &mut W, steps: usize) {
    writer.write_header(net).unwrap();
    writer.write_snapshot(net).unwrap();
    let opts = SimOptions {
        t_end: f64::MAX,
        max_steps: steps,
        stepping: Stepping::Fixed { dt: 0.001 },
        ..SimOptions::default()
    };
    run_sim_with_observer(net, &opts, |_, network| {
        writer.write_snapshot(network).unwrap();
        StepControl::Continue
    })
    .unwrap();
    writer.finish().unwrap();
}

#[test]
fn binary_stream_has_header_and_n_plus_one_records() {
    let mut net = demo_network();
    let mut writer = BinaryWriter::new(Vec::new());
    let steps = 25;
    record(&mut net, &mut writer, steps);
    let bytes = writer.into_inner().unwrap();

    let header_len = 4 + (4 + "Body A".len()) + (4 + "Body B".len());
    let record_len = 8 * 2 + 2;
    assert_eq!(bytes.len(), header_len + (steps + 1) * record_len);

    let mut reader = BinaryReader::new(bytes.as_slice()).unwrap();
    assert_eq!(reader.labels(), ["Body A", "Body B"]);
    assert_eq!(reader.record_len(), record_len);
    let records = reader.read_all().unwrap();
    assert_eq!(records.len(), steps + 1);
    assert_eq!(records[0], vec![270.0, 600.0]);
    let last = records.last().unwrap();
    assert_eq!(last[0], net.temperatures()[0]);
    assert_eq!(last[1], net.temperatures()[1]);
    // A warms, B cools
    assert!(last[0] > 270.0 && last[1] < 600.0);
}

#[test]
fn csv_stream_has_quoted_header_and_one_row_per_snapshot() {
    let mut net = demo_network();
    let mut writer = CsvWriter::new(Vec::new());
    record(&mut net, &mut writer, 3);
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + 4);
    assert_eq!(lines[0], "\"Body A\",\"Body B\"");
    assert_eq!(lines[1], "270,600");
    for line in &lines[1..] {
        let values: Vec<f64> = line.split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 2);
    }
    assert!(text.ends_with('\n'));
}

#[test]
fn snapshot_after_topology_change_is_rejected() {
    let mut net = demo_network();
    let mut writer = CsvWriter::new(Vec::new());
    writer.write_header(&net).unwrap();
    net.register_body(Body::constant("late", 0.0).unwrap())
        .unwrap();
    assert!(writer.write_snapshot(&net).is_err());
}
