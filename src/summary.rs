use crate::process::Process;

/// One row of the final accounting table, for a process that reached
/// `Finished`. Ordering is by the composite key from `SPEC_FULL.md` §6:
/// `finish_time * 10000 + node_id * 100 + local_pid`.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRow {
    pub finish_time: u64,
    pub node_id: u32,
    pub local_pid: u32,
    pub run_time: u64,
    pub block_time: u64,
    pub wait_time: u64,
    pub sends: u64,
    pub recvs: u64,
}

impl SummaryRow {
    fn sort_key(&self) -> u64 {
        self.finish_time * 10000 + self.node_id as u64 * 100 + self.local_pid as u64
    }

    pub fn format_line(&self) -> String {
        format!(
            "| {:05} | Proc {:02}.{:02} | Run {}, Block {}, Wait {}, Sends {}, Recvs {}",
            self.finish_time, self.node_id, self.local_pid, self.run_time, self.block_time,
            self.wait_time, self.sends, self.recvs
        )
    }
}

impl From<&Process> for SummaryRow {
    fn from(p: &Process) -> Self {
        Self {
            finish_time: p.finish_time,
            node_id: p.node_id,
            local_pid: p.local_pid,
            run_time: p.run_time,
            block_time: p.block_time,
            wait_time: p.wait_time,
            sends: p.sends,
            recvs: p.recvs,
        }
    }
}

/// Collect every finished process and sort into the mandated summary order.
pub fn build(procs: &[Process]) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = procs
        .iter()
        .filter(|p| p.is_finished())
        .map(SummaryRow::from)
        .collect();
    rows.sort_by_key(SummaryRow::sort_key);
    rows
}
