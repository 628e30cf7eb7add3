use crate::node::{Node, PendingEntry, PendingKind};
use crate::process::{Process, State};

/// Global index of processes currently blocked on `Send`/`Recv`, in
/// registration order. A process appears here iff its state is `Blocked`
/// and exactly one of `want_dst_addr`/`want_src_addr` is non-zero — timed
/// `Block`s never register.
#[derive(Default)]
pub struct Registry {
    blocked: Vec<usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, idx: usize) {
        self.blocked.push(idx);
    }

    fn unregister(&mut self, idx: usize) {
        if let Some(pos) = self.blocked.iter().position(|&i| i == idx) {
            self.blocked.remove(pos);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Attempt to pair `idx` (just registered, or swept) with a
    /// complementary `Send`/`Recv` partner already in the registry.
    /// `trigger_node_id` supplies the clock used for both sides' release
    /// time — see `SPEC_FULL.md` §4.4.
    pub fn try_match_now(
        &mut self,
        trigger_node_id: u32,
        idx: usize,
        procs: &mut [Process],
        nodes: &mut [Node],
    ) -> bool {
        if procs[idx].state != State::Blocked {
            return false;
        }

        let my_addr = procs[idx].address();
        let is_sender = procs[idx].want_dst_addr > 0;
        let wish = if is_sender {
            procs[idx].want_dst_addr
        } else {
            procs[idx].want_src_addr
        };
        if wish == 0 {
            return false;
        }

        let partner = self.blocked.iter().copied().find(|&cand| {
            if cand == idx || procs[cand].state != State::Blocked {
                return false;
            }
            if is_sender {
                procs[cand].want_src_addr > 0
                    && wish == procs[cand].address()
                    && procs[cand].want_src_addr == my_addr
            } else {
                procs[cand].want_dst_addr > 0
                    && wish == procs[cand].address()
                    && procs[cand].want_dst_addr == my_addr
            }
        });

        let Some(other) = partner else {
            return false;
        };

        let (sender_idx, receiver_idx) = if is_sender { (idx, other) } else { (other, idx) };
        log::debug!(
            "rendezvous match: sender addr {} <-> receiver addr {}",
            procs[sender_idx].address(),
            procs[receiver_idx].address()
        );

        procs[sender_idx].pc += 1;
        procs[sender_idx].sends += 1;
        procs[receiver_idx].pc += 1;
        procs[receiver_idx].recvs += 1;

        for &p in &[sender_idx, receiver_idx] {
            let node_idx = (procs[p].node_id - 1) as usize;
            nodes[node_idx].blocked.retain(|&b| b != p);
        }
        self.unregister(sender_idx);
        self.unregister(receiver_idx);

        let due = nodes[(trigger_node_id - 1) as usize].clock + 1;
        for &p in &[sender_idx, receiver_idx] {
            let kind = if procs[p].next_is_halt() {
                PendingKind::Finish
            } else {
                PendingKind::Ready
            };
            let node_idx = (procs[p].node_id - 1) as usize;
            nodes[node_idx].pending.push(PendingEntry { proc_idx: p, due_time: due, kind });
        }
        true
    }

    /// Try every registered process in insertion order until one match
    /// succeeds.
    pub fn sweep(&mut self, procs: &mut [Process], nodes: &mut [Node]) -> bool {
        let candidates: Vec<usize> = self.blocked.clone();
        for idx in candidates {
            if procs[idx].state != State::Blocked {
                continue;
            }
            let trigger_node_id = procs[idx].node_id;
            if self.try_match_now(trigger_node_id, idx, procs, nodes) {
                return true;
            }
        }
        false
    }
}
