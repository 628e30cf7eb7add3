/// Sink for per-event trace lines in the `"[NN] TTTTT: process P STATE"`
/// format mandated by `SPEC_FULL.md` §6. Kept as a trait so tests can
/// capture trace output instead of going through stdout.
pub trait TraceSink {
    fn emit(&mut self, node_id: u32, clock: u64, local_pid: u32, state: &str);
}

/// Default sink: one line per event, written to stdout.
pub struct StdoutTrace;

impl TraceSink for StdoutTrace {
    fn emit(&mut self, node_id: u32, clock: u64, local_pid: u32, state: &str) {
        println!("[{node_id:02}] {clock:05}: process {local_pid} {state}");
    }
}

/// Silent sink used by `--quiet` and library callers that only want the
/// final summary.
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn emit(&mut self, _node_id: u32, _clock: u64, _local_pid: u32, _state: &str) {}
}

/// In-memory sink for tests: captures each formatted line in order.
#[derive(Default)]
pub struct VecTrace {
    pub lines: Vec<String>,
}

impl TraceSink for VecTrace {
    fn emit(&mut self, node_id: u32, clock: u64, local_pid: u32, state: &str) {
        self.lines
            .push(format!("[{node_id:02}] {clock:05}: process {local_pid} {state}"));
    }
}
