//! Filesystem layout derivation.
//!
//! A bench's canonical path is a pure function of the workshops root and
//! the workshop and bench names. Nothing stores this path as truth; it is
//! recomputed on every plan, which is what makes renames unable to desync
//! the record from the directory. Arbitrary custom bench paths are
//! deliberately unsupported.

use std::path::{Path, PathBuf};

/// Sanitizes a human name into a path/session-safe component.
///
/// Lowercases, maps whitespace and separators to `-`, drops everything
/// else outside `[a-z0-9._-]`, and collapses runs of `-`.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.trim().chars() {
        let mapped = match c {
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            '.' | '_' => Some(c),
            ' ' | '\t' | '-' | '/' | '\\' => Some('-'),
            _ => None,
        };
        match mapped {
            Some('-') if last_dash => {}
            Some('-') => {
                out.push('-');
                last_dash = true;
            }
            Some(c) => {
                out.push(c);
                last_dash = false;
            }
            None => {}
        }
    }
    out.trim_matches('-').to_string()
}

/// Returns the root directory of a workshop under the workspaces base.
pub fn workshop_root(base: &Path, workshop_name: &str) -> PathBuf {
    base.join(sanitize_name(workshop_name))
}

/// Returns the derived path of a bench inside its workshop.
pub fn bench_path(base: &Path, workshop_name: &str, bench_name: &str) -> PathBuf {
    workshop_root(base, workshop_name).join(sanitize_name(bench_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain() {
        assert_eq!(sanitize_name("alpha"), "alpha");
    }

    #[test]
    fn test_sanitize_mixed_case_and_spaces() {
        assert_eq!(sanitize_name("Paint Shop"), "paint-shop");
    }

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize_name("a -- b"), "a-b");
    }

    #[test]
    fn test_sanitize_drops_odd_chars() {
        assert_eq!(sanitize_name("fix: thing (v2)"), "fix-thing-v2");
    }

    #[test]
    fn test_sanitize_slashes_become_dashes() {
        assert_eq!(sanitize_name("work/alpha"), "work-alpha");
    }

    #[test]
    fn test_bench_path_is_deterministic() {
        let base = Path::new("/ws");
        let a = bench_path(base, "Paint Shop", "Bench One");
        let b = bench_path(base, "Paint Shop", "Bench One");
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/ws/paint-shop/bench-one"));
    }
}
