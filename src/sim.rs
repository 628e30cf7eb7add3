use crate::node::Node;
use crate::parse::{Header, ProcSpec};
use crate::process::Process;
use crate::registry::Registry;
use crate::summary::{self, SummaryRow};
use crate::trace::TraceSink;

/// Owns every node and the global rendezvous registry. `run()` is the
/// drive loop's only public verb (SPEC_FULL.md §4.7) — callers never poke
/// at individual nodes or processes directly.
pub struct Simulator {
    procs: Vec<Process>,
    nodes: Vec<Node>,
    registry: Registry,
    rounds: u64,
    stall_advances: u64,
}

impl Simulator {
    /// Build a simulator from a parsed header and process list, assign
    /// per-node local pids in input order, and emit the time-zero `new`
    /// then `ready` trace lines (SPEC_FULL.md §4.8).
    pub fn new(header: Header, specs: Vec<ProcSpec>, trace: &mut dyn TraceSink) -> Self {
        log::info!(
            "simulator constructed: {} processes, {} nodes, quantum {}",
            specs.len(),
            header.num_nodes,
            header.quantum
        );

        let mut nodes: Vec<Node> = (1..=header.num_nodes)
            .map(|id| Node::new(id, header.quantum))
            .collect();

        let mut procs = Vec::with_capacity(specs.len());
        let mut next_local_pid = vec![0u32; header.num_nodes as usize];
        for (i, spec) in specs.into_iter().enumerate() {
            let node_idx = (spec.node_id - 1) as usize;
            next_local_pid[node_idx] += 1;
            let local_pid = next_local_pid[node_idx];
            let global_pid = (i + 1) as u32;
            let proc_idx = procs.len();
            procs.push(Process::new(
                spec.name,
                spec.size,
                spec.priority,
                spec.node_id,
                global_pid,
                local_pid,
                spec.ops,
            ));
            nodes[node_idx].members.push(proc_idx);
        }

        for node in &nodes {
            for &idx in &node.members {
                trace.emit(node.node_id, 0, procs[idx].local_pid, "new");
            }
        }
        for node in &mut nodes {
            for &idx in &node.members.clone() {
                procs[idx].state = crate::process::State::Ready;
                trace.emit(node.node_id, 0, procs[idx].local_pid, "ready");
                node.ready.push_back(idx);
            }
        }

        Self { procs, nodes, registry: Registry::new(), rounds: 0, stall_advances: 0 }
    }

    fn is_quiet(&self) -> bool {
        self.nodes.iter().all(Node::is_quiet)
    }

    /// Drive the simulation to completion: repeat rounds of
    /// flush-pending/expire-block/run-timeslice across all nodes, falling
    /// back to a registry sweep and then a single-node clock jump when a
    /// round makes no progress, until every node is quiet or nothing more
    /// can fire (SPEC_FULL.md §4.5).
    pub fn run(&mut self, trace: &mut dyn TraceSink) {
        while !self.is_quiet() {
            self.rounds += 1;
            let mut progress = false;

            for node in &mut self.nodes {
                progress |= node.flush_pending(&mut self.procs, trace);
            }
            for node in &mut self.nodes {
                progress |= node.expire_block(&mut self.procs, trace);
            }
            for i in 0..self.nodes.len() {
                let node_id = self.nodes[i].node_id;
                let outcome = self.nodes[i].run_timeslice(&mut self.procs, trace);
                progress |= outcome.progress;
                if let Some(idx) = outcome.rendezvous_idx {
                    self.registry.register(idx);
                    self.registry.try_match_now(node_id, idx, &mut self.procs, &mut self.nodes);
                }
            }

            if !progress {
                progress |= self.registry.sweep(&mut self.procs, &mut self.nodes);
            }

            if !progress {
                if let Some((node_idx, t)) = self.earliest_stalled_event() {
                    self.nodes[node_idx].clock = t;
                    self.stall_advances += 1;
                } else {
                    break;
                }
            }

            log::trace!("round {} complete (progress = {})", self.rounds, progress);
        }

        log::info!(
            "simulation halted after {} rounds ({} stall advances)",
            self.rounds,
            self.stall_advances
        );
    }

    /// The node with the smallest strictly-future event time across its
    /// pending and timed-blocked processes, and that time. Only one node
    /// advances per stalled round, even if several are stalled at once
    /// (SPEC_FULL.md §9).
    fn earliest_stalled_event(&self) -> Option<(usize, u64)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.next_event_time(&self.procs).map(|t| (i, t)))
            .min_by_key(|&(_, t)| t)
    }

    pub fn summary(&self) -> Vec<SummaryRow> {
        summary::build(&self.procs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::trace::VecTrace;

    fn simulate(input: &str) -> (VecTrace, Vec<SummaryRow>) {
        let (header, specs) = parse(input).unwrap();
        let mut trace = VecTrace::default();
        let mut sim = Simulator::new(header, specs, &mut trace);
        sim.run(&mut trace);
        let summary = sim.summary();
        (trace, summary)
    }

    #[test]
    fn single_process_single_doop() {
        let (trace, summary) = simulate("1 1 5\nA 0 0 1 DOOP 3 HALT");
        assert_eq!(
            trace.lines,
            vec![
                "[01] 00000: process 1 new",
                "[01] 00000: process 1 ready",
                "[01] 00000: process 1 running",
                "[01] 00003: process 1 finished",
            ]
        );
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].format_line(), "| 00003 | Proc 01.01 | Run 3, Block 0, Wait 0, Sends 0, Recvs 0");
    }

    #[test]
    fn quantum_split_across_three_slices() {
        // Sole process, so no other process ever sits in `ready` to be
        // charged wait by DOOP consumption — but each of the first two
        // slices exhausts the quantum without reaching HALT, and a
        // process re-entering `ready` at end of quantum is charged a flat
        // `+quantum` itself (SPEC_FULL.md §4.2, node.rs:216). Two such
        // re-queues (after the 2-tick and the 4-tick marks) give wait 4.
        let (_, summary) = simulate("1 1 2\nA 0 0 1 DOOP 5 HALT");
        assert_eq!(summary[0].finish_time, 5);
        assert_eq!(summary[0].run_time, 5);
        assert_eq!(summary[0].wait_time, 4);
    }

    #[test]
    fn two_processes_round_robin_share_wait_time() {
        // A's fourth DOOP tick lands exactly on the quantum boundary, so
        // `run_timeslice`'s `while used < quantum` loop exits before
        // consuming HALT (node.rs:151) and A is re-queued for one more
        // slice rather than finishing mid-quantum. Tracing all five
        // slices: A finishes at clock 8 (wait 8), B at 8 (wait 6).
        let (_, summary) = simulate("2 1 2\nA 0 0 1 DOOP 4 HALT\nB 0 0 1 DOOP 4 HALT");
        let a = summary.iter().find(|r| r.local_pid == 1).unwrap();
        let b = summary.iter().find(|r| r.local_pid == 2).unwrap();
        assert_eq!((a.finish_time, a.run_time, a.wait_time), (8, 4, 8));
        assert_eq!((b.finish_time, b.run_time, b.wait_time), (8, 4, 6));
    }

    #[test]
    fn timed_block_then_immediate_halt() {
        let (_, summary) = simulate("1 1 10\nA 0 0 1 DOOP 1 BLOCK 3 HALT");
        assert_eq!(summary[0].finish_time, 4);
        assert_eq!(summary[0].run_time, 1);
        assert_eq!(summary[0].block_time, 3);
        assert_eq!(summary[0].wait_time, 0);
    }

    #[test]
    fn cross_node_rendezvous_matches_and_releases_one_tick_later() {
        let input = "2 2 5\nA 0 0 1 SEND 201 HALT\nB 0 0 2 RECV 101 HALT";
        let (_, summary) = simulate(input);
        let a = summary.iter().find(|r| r.node_id == 1).unwrap();
        let b = summary.iter().find(|r| r.node_id == 2).unwrap();
        assert_eq!(a.finish_time, 2);
        assert_eq!(b.finish_time, 2);
        assert_eq!(a.sends, 1);
        assert_eq!(a.recvs, 0);
        assert_eq!(b.recvs, 1);
        assert_eq!(b.sends, 0);
    }

    #[test]
    fn same_node_rendezvous_also_gets_one_tick_release_latency() {
        let input = "2 1 5\nA 0 0 1 SEND 102 HALT\nB 0 0 1 RECV 101 HALT";
        let (_, summary) = simulate(input);
        // both charge 1 tick to attempt (clock reaches 2 after A then B run),
        // match, release at clock + 1 on the triggering node.
        for row in &summary {
            assert!(row.finish_time >= 2);
        }
    }

    #[test]
    fn unmatched_rendezvous_hangs_and_is_excluded_from_summary() {
        let (_, summary) = simulate("1 1 5\nA 0 0 1 SEND 999 HALT");
        assert!(summary.is_empty());
    }

    #[test]
    fn loop_expansion_runs_expected_total_ticks() {
        let (_, summary) = simulate("1 1 100\nA 0 0 1 LOOP 3 DOOP 2 END HALT");
        assert_eq!(summary[0].run_time, 6);
        assert_eq!(summary[0].finish_time, 6);
    }

    #[test]
    fn doop_larger_than_quantum_splits_into_residual() {
        let (trace, summary) = simulate("1 1 3\nA 0 0 1 DOOP 7 HALT");
        assert_eq!(summary[0].run_time, 7);
        assert_eq!(summary[0].finish_time, 7);
        // three slices: 3, 3, then 1, each re-entering ready except the last
        let running_count = trace.lines.iter().filter(|l| l.ends_with("running")).count();
        assert_eq!(running_count, 3);
    }

    #[test]
    fn block_zero_expires_on_the_same_tick() {
        let (_, summary) = simulate("1 1 10\nA 0 0 1 BLOCK 0 HALT");
        assert_eq!(summary[0].block_time, 0);
        assert_eq!(summary[0].finish_time, 0);
    }

    #[test]
    fn new_lines_emitted_per_node_before_any_ready_line() {
        let input = "2 2 5\nA 0 0 1 HALT\nB 0 0 2 HALT";
        let (trace, _) = simulate(input);
        let new_positions: Vec<_> = trace.lines.iter().enumerate().filter(|(_, l)| l.ends_with("new")).map(|(i, _)| i).collect();
        let ready_positions: Vec<_> = trace.lines.iter().enumerate().filter(|(_, l)| l.ends_with("ready")).map(|(i, _)| i).collect();
        assert!(new_positions.iter().max() < ready_positions.iter().min());
    }
}
