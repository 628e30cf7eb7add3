/// One instruction in a process's program stream.
///
/// `Send`/`Recv` addresses are `node_id * 100 + local_pid` (see
/// [`crate::process::address`]); they are not validated against real
/// processes at parse time, so an address with no matching partner simply
/// never finds a rendezvous match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Consume `_0` compute ticks, split across quanta if necessary.
    Doop(u64),
    /// Self-block for `_0` ticks, timed unconditionally.
    Block(u64),
    /// Block until a `Recv` at `_0` names this process back.
    Send(u32),
    /// Block until a `Send` at `_0` names this process back.
    Recv(u32),
    /// Terminate the program.
    Halt,
}
