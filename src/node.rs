use std::collections::VecDeque;

use crate::op::Operation;
use crate::process::{Process, State};
use crate::trace::TraceSink;

/// What a pending entry does when its `due_time` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Ready,
    Finish,
}

#[derive(Debug, Clone, Copy)]
pub struct PendingEntry {
    pub proc_idx: usize,
    pub due_time: u64,
    pub kind: PendingKind,
}

/// Outcome of [`Node::run_timeslice`]. `rendezvous_idx` is set only when the
/// time slice ended on a `Send`/`Recv`, so the caller can register the
/// process globally and attempt an immediate match — the node itself knows
/// nothing about the cross-node registry.
pub struct RunOutcome {
    pub progress: bool,
    pub rendezvous_idx: Option<usize>,
}

/// One compute node: its own logical clock, a FIFO ready queue, an
/// unordered blocked set, and a queue of future ready/finish releases.
/// Indices refer to the simulator's global `Vec<Process>`.
pub struct Node {
    pub node_id: u32,
    pub quantum: u64,
    pub clock: u64,
    pub ready: VecDeque<usize>,
    pub blocked: Vec<usize>,
    pub pending: Vec<PendingEntry>,
    /// All processes assigned to this node, in local_pid order. Fixed at
    /// construction; used for the time-zero trace and the final summary
    /// scan, not mutated by the phases above.
    pub members: Vec<usize>,
}

impl Node {
    pub fn new(node_id: u32, quantum: u64) -> Self {
        Self {
            node_id,
            quantum,
            clock: 0,
            ready: VecDeque::new(),
            blocked: Vec::new(),
            pending: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.ready.is_empty() && self.blocked.is_empty() && self.pending.is_empty()
    }

    fn enter_ready(&mut self, procs: &mut [Process], trace: &mut dyn TraceSink, idx: usize) {
        debug_assert!(!self.ready.contains(&idx), "process {idx} already in ready queue");
        debug_assert!(!self.blocked.contains(&idx), "process {idx} entering ready while still blocked");
        procs[idx].state = State::Ready;
        trace.emit(self.node_id, self.clock, procs[idx].local_pid, "ready");
        self.ready.push_back(idx);
    }

    fn enter_finished(&mut self, procs: &mut [Process], trace: &mut dyn TraceSink, idx: usize) {
        debug_assert!(!procs[idx].is_finished(), "process {idx} finished twice");
        procs[idx].state = State::Finished;
        procs[idx].finish_time = self.clock;
        trace.emit(self.node_id, self.clock, procs[idx].local_pid, "finished");
    }

    /// Release every pending entry due at the current clock.
    pub fn flush_pending(&mut self, procs: &mut [Process], trace: &mut dyn TraceSink) -> bool {
        let clock = self.clock;
        let (due, rest): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|e| e.due_time == clock);
        self.pending = rest;
        let progress = !due.is_empty();
        for entry in due {
            match entry.kind {
                PendingKind::Ready => self.enter_ready(procs, trace, entry.proc_idx),
                PendingKind::Finish => self.enter_finished(procs, trace, entry.proc_idx),
            }
        }
        progress
    }

    /// Wake any process whose timed `Block` has expired. Rendezvous-blocked
    /// processes carry `unblock_time == None` and are untouched here.
    pub fn expire_block(&mut self, procs: &mut [Process], trace: &mut dyn TraceSink) -> bool {
        let clock = self.clock;
        let mut progress = false;
        let mut still_blocked = Vec::with_capacity(self.blocked.len());
        for idx in self.blocked.drain(..) {
            let timed_out = matches!(procs[idx].unblock_time, Some(t) if clock >= t);
            if timed_out {
                progress = true;
                if procs[idx].next_is_halt() {
                    procs[idx].pc += 1;
                    self.enter_finished(procs, trace, idx);
                } else {
                    self.enter_ready(procs, trace, idx);
                }
            } else {
                still_blocked.push(idx);
            }
        }
        self.blocked = still_blocked;
        progress
    }

    /// Add `dt` ticks of wait time to every process currently in `ready`;
    /// the running process is never in this queue, so it is never
    /// double-counted (SPEC_FULL.md §4.2).
    fn charge_ready_wait(&self, procs: &mut [Process], dt: u64) {
        if dt == 0 {
            return;
        }
        for &idx in &self.ready {
            procs[idx].wait_time += dt;
        }
    }

    /// Run one time slice: pop the head of `ready` and execute operations
    /// until the quantum is exhausted or the process yields.
    pub fn run_timeslice(&mut self, procs: &mut [Process], trace: &mut dyn TraceSink) -> RunOutcome {
        let idx = match self.ready.pop_front() {
            Some(idx) => idx,
            None => return RunOutcome { progress: false, rendezvous_idx: None },
        };

        if procs[idx].is_finished() || procs[idx].pc >= procs[idx].ops.len() {
            return RunOutcome { progress: true, rendezvous_idx: None };
        }

        procs[idx].state = State::Running;
        trace.emit(self.node_id, self.clock, procs[idx].local_pid, "running");

        let mut used = 0u64;
        let mut rendezvous_idx = None;
        let mut yielded = false;

        while used < self.quantum && procs[idx].pc < procs[idx].ops.len() {
            let op = procs[idx].ops[procs[idx].pc];
            match op {
                Operation::Doop(remaining) => {
                    let run = remaining.min(self.quantum - used);
                    self.charge_ready_wait(procs, run);
                    procs[idx].run_time += run;
                    self.clock += run;
                    used += run;
                    let left = remaining - run;
                    if left == 0 {
                        procs[idx].pc += 1;
                    } else {
                        procs[idx].ops[procs[idx].pc] = Operation::Doop(left);
                    }
                }
                Operation::Block(ticks) => {
                    procs[idx].unblock_time = Some(self.clock + ticks);
                    procs[idx].block_time += ticks;
                    procs[idx].state = State::Blocked;
                    procs[idx].pc += 1;
                    trace.emit(self.node_id, self.clock, procs[idx].local_pid, "blocked");
                    self.blocked.push(idx);
                    yielded = true;
                }
                Operation::Send(addr) => {
                    self.charge_ready_wait(procs, 1);
                    procs[idx].run_time += 1;
                    self.clock += 1;
                    used += 1;
                    procs[idx].want_dst_addr = addr;
                    procs[idx].want_src_addr = 0;
                    procs[idx].unblock_time = None;
                    procs[idx].state = State::Blocked;
                    trace.emit(self.node_id, self.clock, procs[idx].local_pid, "blocked (send)");
                    self.blocked.push(idx);
                    rendezvous_idx = Some(idx);
                    yielded = true;
                }
                Operation::Recv(addr) => {
                    self.charge_ready_wait(procs, 1);
                    procs[idx].run_time += 1;
                    self.clock += 1;
                    used += 1;
                    procs[idx].want_src_addr = addr;
                    procs[idx].want_dst_addr = 0;
                    procs[idx].unblock_time = None;
                    procs[idx].state = State::Blocked;
                    trace.emit(self.node_id, self.clock, procs[idx].local_pid, "blocked (recv)");
                    self.blocked.push(idx);
                    rendezvous_idx = Some(idx);
                    yielded = true;
                }
                Operation::Halt => {
                    procs[idx].pc += 1;
                    self.enter_finished(procs, trace, idx);
                    yielded = true;
                }
            }
            if yielded {
                break;
            }
        }

        if !yielded && !procs[idx].is_finished() && procs[idx].pc < procs[idx].ops.len() {
            procs[idx].wait_time += self.quantum;
            self.enter_ready(procs, trace, idx);
        }

        RunOutcome { progress: true, rendezvous_idx }
    }

    /// Smallest strictly-future due time across this node's pending and
    /// timed-blocked processes, if any.
    pub fn next_event_time(&self, procs: &[Process]) -> Option<u64> {
        let pending_next = self
            .pending
            .iter()
            .filter(|e| e.due_time > self.clock)
            .map(|e| e.due_time)
            .min();
        let blocked_next = self
            .blocked
            .iter()
            .filter_map(|&idx| procs[idx].unblock_time.filter(|&t| t > self.clock))
            .min();
        match (pending_next, blocked_next) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}
