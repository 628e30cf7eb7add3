//! Discrete-event multi-node process simulator.
//!
//! Reads a workload of processes — each a small program of compute,
//! block, and inter-process rendezvous operations — distributes them
//! across compute nodes, and simulates round-robin time-sliced execution.
//! Emits a per-event trace and a final per-process accounting summary.
//!
//! The simulation kernel (`node`, `registry`, `sim`) is the focus of this
//! crate; `parse` and `summary` are the thin ambient layers the kernel's
//! inputs and outputs pass through.

pub mod error;
pub mod node;
pub mod op;
pub mod parse;
pub mod process;
pub mod registry;
pub mod sim;
pub mod summary;
pub mod trace;

pub use error::SimError;
pub use op::Operation;
pub use parse::{parse, Header, ProcSpec};
pub use process::{Process, State};
pub use sim::Simulator;
pub use summary::SummaryRow;
pub use trace::{NullTrace, StdoutTrace, TraceSink, VecTrace};
