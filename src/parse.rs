use std::iter::Peekable;
use std::str::SplitWhitespace;

use crate::error::SimError;
use crate::op::Operation;

/// `total_procs num_nodes quantum` from the head of the input stream.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub total_procs: usize,
    pub num_nodes: u32,
    pub quantum: u64,
}

/// One parsed process block: its static identity plus its fully expanded
/// operation stream (loops already unrolled).
#[derive(Debug, Clone)]
pub struct ProcSpec {
    pub name: String,
    pub size: i64,
    pub priority: i64,
    pub node_id: u32,
    pub ops: Vec<Operation>,
}

/// Tokenizer cursor over the whole input. Process parsing shares one
/// cursor, same as the original's single `scanf` stream — there is no
/// lookahead to notice a missing `HALT` before the next process's tokens
/// begin (SPEC_FULL.md §8, §9).
struct Tokens<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self { inner: input.split_whitespace().peekable() }
    }

    fn next_str(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn next_u64(&mut self) -> u64 {
        self.next_str().and_then(|t| t.parse().ok()).unwrap_or(0)
    }

    fn next_u32(&mut self) -> u32 {
        self.next_str().and_then(|t| t.parse().ok()).unwrap_or(0)
    }

    fn next_i64(&mut self) -> Option<i64> {
        self.next_str().and_then(|t| t.parse().ok())
    }
}

/// Parse the full input into a header and its process blocks. Returns
/// [`SimError`] on a truncated header or process line, matching the
/// original's silent-early-return contract one layer up (the CLI maps
/// both variants to exit code 0).
pub fn parse(input: &str) -> Result<(Header, Vec<ProcSpec>), SimError> {
    let mut toks = Tokens::new(input);

    let total_procs = toks.next_str().and_then(|t| t.parse::<usize>().ok());
    let num_nodes = toks.next_str().and_then(|t| t.parse::<u32>().ok());
    let quantum = toks.next_str().and_then(|t| t.parse::<u64>().ok());
    let (Some(total_procs), Some(num_nodes), Some(quantum)) = (total_procs, num_nodes, quantum)
    else {
        return Err(SimError::TruncatedHeader);
    };
    let header = Header { total_procs, num_nodes, quantum };

    let mut specs = Vec::with_capacity(total_procs);
    for index in 0..total_procs {
        let name = toks.next_str();
        let size = toks.next_i64();
        let priority = toks.next_i64();
        let node_id = toks.next_str().and_then(|t| t.parse::<u32>().ok());
        let (Some(name), Some(size), Some(priority), Some(node_id)) = (name, size, priority, node_id)
        else {
            return Err(SimError::TruncatedProcess { index });
        };

        let ops = parse_program(&mut toks, false);
        specs.push(ProcSpec { name: name.to_string(), size, priority, node_id, ops });
    }

    Ok((header, specs))
}

/// Parse one program (or, recursively, one `LOOP` body) from the shared
/// token cursor, expanding nested loops as they are consumed.
///
/// `stop_on_end` is set when parsing a `LOOP` body: an `END` there closes
/// the body instead of being skipped. Returns once `HALT` is appended, the
/// body-closing `END` is consumed, or the token stream runs dry.
fn parse_program(toks: &mut Tokens<'_>, stop_on_end: bool) -> Vec<Operation> {
    let mut ops = Vec::new();
    while let Some(tok) = toks.next_str() {
        match tok {
            "END" => {
                if stop_on_end {
                    return ops;
                }
                // END outside an active loop body is ignored.
            }
            "LOOP" => {
                let times = toks.next_i64().unwrap_or(0);
                let body = parse_program(toks, true);
                if times > 0 {
                    for _ in 0..times {
                        ops.extend_from_slice(&body);
                    }
                }
            }
            "DOOP" => ops.push(Operation::Doop(toks.next_u64())),
            "BLOCK" => ops.push(Operation::Block(toks.next_u64())),
            "SEND" => ops.push(Operation::Send(toks.next_u32())),
            "RECV" => ops.push(Operation::Recv(toks.next_u32())),
            "HALT" => {
                ops.push(Operation::Halt);
                return ops;
            }
            unknown => {
                log::warn!("skipping unrecognised token {unknown:?} in program stream");
            }
        }
    }
    ops
}
