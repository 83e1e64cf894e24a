// Console rendering for the headless grid runner

use syntropic_grid::{GridSummary, LogEntry, NodeMetrics};

// ─── Per-tick table ─────────────────────────────────────────────────────────

pub fn print_header() {
    println!("  {:<5} {:<6} {:<15} {:>9} {:>7} {:>6} {:>7} {:>6} {:<10} {:>2}",
        "Tick", "Node", "Name", "Lat(ms)", "Q-Dep", "Flows", "Φ", "Risk", "Status", "Op");
    println!("  {}", "-".repeat(84));
}

pub fn print_tick(tick: u64, nodes: &[NodeMetrics]) {
    for node in nodes {
        println!("  {:<5} {:<6} {:<15} {:>9.2} {:>7.1} {:>6} {:>7.2} {:>6.1} {:<10} {:>2}",
            tick,
            node.id,
            node.name,
            node.latency_ms,
            node.queue_depth,
            node.active_flows,
            node.syntropic_potential,
            node.adoption_risk,
            node.status,
            node.last_operator,
        );
    }
}

// ─── Summary ────────────────────────────────────────────────────────────────

pub fn print_summary(summary: &GridSummary, ticks: u64) {
    println!();
    println!("  Grid after {} tick(s): {} node(s)", ticks, summary.node_count);
    println!("    Potential (Φ)  {:.2}", summary.avg_potential);
    println!("    Active Flows   {}", summary.avg_flows);
    println!("    Adoption Risk  {:.1}", summary.avg_risk);
    println!("    Status         {} optimal / {} congested / {} critical",
        summary.optimal, summary.congested, summary.critical);
}

pub fn print_log(entries: &[LogEntry]) {
    println!();
    println!("  Operator log ({} entries)", entries.len());
    for e in entries {
        let origin = if e.automated { "AUTO" } else { "MANUAL" };
        println!("    [{}] {:<6} {:<7} {} {}",
            e.timestamp.format("%H:%M:%S"), origin, e.node_id, e.operator, e.message);
    }
}
