use feedarb_core::{ArbitrationStats, Side};

#[test]
fn single_match_yields_full_summary() {
    let mut stats = ArbitrationStats::new();
    stats.process(Side::A, 1, 100);
    stats.process(Side::B, 1, 250);

    let summary = stats.build_summary();
    assert_eq!(summary.total_packets_a, 1);
    assert_eq!(summary.total_packets_b, 1);
    assert_eq!(summary.unmatched_a, 0);
    assert_eq!(summary.unmatched_b, 0);
    assert_eq!(summary.faster_count_a, 1);
    assert_eq!(summary.faster_count_b, 0);
    assert_eq!(summary.avg_advantage_a_ns, 150.0);
    assert_eq!(summary.avg_advantage_b_ns, 0.0);
    assert_eq!(summary.avg_fastest_advantage_ns, 150.0);
}

#[test]
fn classification_ignores_arrival_order() {
    let mut a_first = ArbitrationStats::new();
    a_first.process(Side::A, 9, 500);
    a_first.process(Side::B, 9, 800);

    let mut b_first = ArbitrationStats::new();
    b_first.process(Side::B, 9, 800);
    b_first.process(Side::A, 9, 500);

    assert_eq!(a_first.build_summary(), b_first.build_summary());
    assert_eq!(a_first.build_summary().faster_count_a, 1);
    assert_eq!(a_first.build_summary().avg_advantage_a_ns, 300.0);
}

#[test]
fn lone_sides_count_as_unmatched() {
    let mut stats = ArbitrationStats::new();
    stats.process(Side::A, 5, 1000);
    stats.process(Side::A, 6, 2000);
    stats.process(Side::B, 7, 3000);

    let summary = stats.build_summary();
    assert_eq!(summary.unmatched_a, 2);
    assert_eq!(summary.unmatched_b, 1);
    assert_eq!(summary.faster_count_a, 0);
    assert_eq!(summary.faster_count_b, 0);
    assert_eq!(summary.avg_advantage_a_ns, 0.0);
    assert_eq!(summary.avg_advantage_b_ns, 0.0);
    assert_eq!(summary.avg_fastest_advantage_ns, 0.0);
}

#[test]
fn duplicates_only_move_raw_totals() {
    let mut stats = ArbitrationStats::new();
    stats.process(Side::A, 10, 100);
    stats.process(Side::A, 10, 200); // repeat before the match
    stats.process(Side::B, 10, 50); // completes, B faster by 50
    stats.process(Side::A, 10, 300); // repeat after the match
    stats.process(Side::B, 10, 400); // repeat after the match

    let summary = stats.build_summary();
    assert_eq!(summary.total_packets_a, 3);
    assert_eq!(summary.total_packets_b, 2);
    assert_eq!(summary.faster_count_a, 0);
    assert_eq!(summary.faster_count_b, 1);
    assert_eq!(summary.avg_advantage_b_ns, 50.0);
    assert_eq!(summary.unmatched_a, 0);
    assert_eq!(summary.unmatched_b, 0);
}

#[test]
fn equal_timestamps_complete_without_a_winner() {
    let mut stats = ArbitrationStats::new();
    stats.process(Side::A, 2, 700);
    stats.process(Side::B, 2, 700);

    let summary = stats.build_summary();
    assert_eq!(summary.unmatched_a, 0);
    assert_eq!(summary.unmatched_b, 0);
    assert_eq!(summary.faster_count_a, 0);
    assert_eq!(summary.faster_count_b, 0);
    assert_eq!(summary.avg_fastest_advantage_ns, 0.0);

    // The tie is final: later arrivals for the sequence are repeats.
    stats.process(Side::A, 2, 1);
    let after = stats.build_summary();
    assert_eq!(after.total_packets_a, 2);
    assert_eq!(after.faster_count_a, 0);
}

#[test]
fn empty_aggregator_reports_zero_averages() {
    let summary = ArbitrationStats::new().build_summary();
    assert_eq!(summary.total_packets_a, 0);
    assert_eq!(summary.total_packets_b, 0);
    assert_eq!(summary.avg_advantage_a_ns, 0.0);
    assert_eq!(summary.avg_advantage_b_ns, 0.0);
    assert_eq!(summary.avg_fastest_advantage_ns, 0.0);
}

#[test]
fn overall_average_spans_both_sides() {
    let mut stats = ArbitrationStats::new();
    stats.process(Side::A, 1, 100);
    stats.process(Side::B, 1, 500); // A faster by 400
    stats.process(Side::B, 2, 100);
    stats.process(Side::A, 2, 300); // B faster by 200
    stats.process(Side::A, 3, 50);
    stats.process(Side::B, 3, 50); // tie, excluded from every average

    let summary = stats.build_summary();
    assert_eq!(summary.faster_count_a, 1);
    assert_eq!(summary.faster_count_b, 1);
    assert_eq!(summary.avg_advantage_a_ns, 400.0);
    assert_eq!(summary.avg_advantage_b_ns, 200.0);
    assert_eq!(summary.avg_fastest_advantage_ns, 300.0);
}
