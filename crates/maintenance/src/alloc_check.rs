//! Token-count check for unbalanced `malloc(` / `free(` calls in C files.
//!
//! Approximate only: no scopes, no control flow, no aliasing. A `free` in
//! a loop or behind a condition counts once per textual occurrence.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// File suffixes the check applies to.
pub const C_SUFFIXES: &[&str] = &[".c", ".h"];

static MALLOC_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bmalloc\(").unwrap());
static FREE_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfree\(").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocBalance {
    Balanced,
    MoreAllocations { mallocs: usize, frees: usize },
    MoreFrees { mallocs: usize, frees: usize },
}

pub fn is_c_source(path: &Path) -> bool {
    let name = path.to_string_lossy();
    C_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub fn count_calls(content: &str) -> (usize, usize) {
    (
        MALLOC_CALL.find_iter(content).count(),
        FREE_CALL.find_iter(content).count(),
    )
}

pub fn check_balance(content: &str) -> AllocBalance {
    let (mallocs, frees) = count_calls(content);
    if mallocs > frees {
        AllocBalance::MoreAllocations { mallocs, frees }
    } else if frees > mallocs {
        AllocBalance::MoreFrees { mallocs, frees }
    } else {
        AllocBalance::Balanced
    }
}
