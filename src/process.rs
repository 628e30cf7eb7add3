use crate::op::Operation;

/// Lifecycle state of a process. `New` is only observed at construction;
/// `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    New,
    Ready,
    Running,
    Blocked,
    Finished,
}

/// Cluster-wide address of a process: `node_id * 100 + local_pid`.
/// Undefined once either component reaches 100 (see `SPEC_FULL.md` §9).
pub fn address(node_id: u32, local_pid: u32) -> u32 {
    node_id * 100 + local_pid
}

/// Control block for one simulated process.
///
/// `want_dst_addr` and `want_src_addr` are transient rendezvous intent: at
/// most one is non-zero at a time, and both are zero outside of a
/// `Send`/`Recv` block. They are what the global registry scans to find a
/// matching partner.
#[derive(Debug, Clone)]
pub struct Process {
    pub name: String,
    pub size: i64,
    pub priority: i64,
    pub node_id: u32,
    pub global_pid: u32,
    pub local_pid: u32,

    pub ops: Vec<Operation>,
    pub pc: usize,

    pub state: State,

    pub run_time: u64,
    pub block_time: u64,
    pub wait_time: u64,
    pub finish_time: u64,
    pub sends: u64,
    pub recvs: u64,

    /// Absolute node clock at which a timed `Block` expires. `None` while
    /// not blocked on a timer (including while blocked on `Send`/`Recv`).
    /// Modeled as `Option<u64>` rather than a `0` sentinel so that `BLOCK 0`
    /// issued at clock `0` — a real due time of `0` — is not confused with
    /// "not timed"; see DESIGN.md.
    pub unblock_time: Option<u64>,
    pub want_dst_addr: u32,
    pub want_src_addr: u32,
}

impl Process {
    pub fn new(
        name: String,
        size: i64,
        priority: i64,
        node_id: u32,
        global_pid: u32,
        local_pid: u32,
        ops: Vec<Operation>,
    ) -> Self {
        Self {
            name,
            size,
            priority,
            node_id,
            global_pid,
            local_pid,
            ops,
            pc: 0,
            state: State::New,
            run_time: 0,
            block_time: 0,
            wait_time: 0,
            finish_time: 0,
            sends: 0,
            recvs: 0,
            unblock_time: None,
            want_dst_addr: 0,
            want_src_addr: 0,
        }
    }

    pub fn address(&self) -> u32 {
        address(self.node_id, self.local_pid)
    }

    /// Operation the process will execute next, if its program counter is
    /// still in range.
    pub fn next_op(&self) -> Option<Operation> {
        self.ops.get(self.pc).copied()
    }

    pub fn next_is_halt(&self) -> bool {
        matches!(self.next_op(), Some(Operation::Halt))
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }
}
