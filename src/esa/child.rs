//! Child table construction
//!
//! The child table encodes the lcp-interval tree (the virtual suffix tree)
//! in one integer per rank. Slot `i` holds exactly one of three pointers,
//! with this priority:
//!
//! 1. `next(i)` — the next rank with the same lcp inside the enclosing
//!    interval (sibling chain),
//! 2. `up(i+1)` — the first ℓ-index of the interval ending at `i`, stored
//!    one slot early only when no `next` claims the slot,
//! 3. `down(i)` — the first ℓ-index of the interval starting at `i`, stored
//!    only when neither `next` nor `up` is present.
//!
//! Which pointer a slot carries is never read from the value alone: the
//! predicates on [`Tables`](super::backend::Tables) re-derive the kind from
//! neighboring lcp values. Built by the two-pass stack algorithm of
//! Abouelhoda, Kurtz and Ohlebusch (2004).

/// Value of a slot that carries no pointer. Only slot `n` stays vacant.
pub const VACANT: u32 = u32::MAX;

/// Build the single-slot child table from an lcp table of length `n+1`.
pub fn build_child_table(lcp: &[u32]) -> Vec<u32> {
    let len = lcp.len();
    let mut child = vec![VACANT; len];
    if len < 2 {
        return child;
    }

    // Pass 1: up/down. Pop while the current lcp is strictly smaller than
    // the stack top; each pop closes an interval whose first ℓ-index is the
    // popped rank. Record it as `down` on the new top when eligible, and as
    // a deferred `up` on the current rank otherwise.
    let mut stack: Vec<usize> = vec![0];
    let mut last: Option<usize> = None;
    for i in 1..len {
        while lcp[i] < lcp[*stack.last().expect("rank 0 is never popped")] {
            let popped = stack.pop().expect("stack underflow");
            last = Some(popped);
            let top = *stack.last().expect("rank 0 is never popped");
            if lcp[i] <= lcp[top] && lcp[top] != lcp[popped] {
                child[top] = popped as u32;
            }
        }
        if let Some(up) = last.take() {
            // up(i), stored at slot i-1
            child[i - 1] = up as u32;
        }
        stack.push(i);
    }

    // Pass 2: next. Ranks with equal lcp separated only by larger values
    // form sibling chains; link each to its successor. This overwrites
    // `down` pointers that the chain makes redundant, never a needed `up`.
    stack.clear();
    stack.push(0);
    for i in 1..len {
        while lcp[i] < lcp[*stack.last().expect("rank 0 is never popped")] {
            stack.pop();
        }
        if lcp[i] == lcp[*stack.last().expect("rank 0 is never popped")] {
            let prev = stack.pop().expect("stack underflow");
            child[prev] = i as u32;
        }
        stack.push(i);
    }

    child
}
