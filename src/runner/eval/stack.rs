//! Native stack headroom for the recursive evaluator.
//!
//! Script calls and nested statements recurse on the host stack. Before each level the evaluator
//! makes sure a red zone is left, growing onto a fresh segment when it is not, so the
//! `max_call_depth` limit is what stops runaway recursion rather than the thread's stack size.

/// Space that must remain before entering another evaluator level.
const RED_ZONE: usize = 256 * 1024;

/// Size of each additional stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
