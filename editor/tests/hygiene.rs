//! Hygiene checks over the editor's production sources.
//!
//! The editor runs inside a browser tab: a panic traps the wasm module and
//! takes the whole editing session with it, and stdout goes nowhere. These
//! tests scan `src/` (minus `*_test.rs` and the test-only `testkit.rs`) and
//! hold each pattern to a budget. Budgets only go down.
//!
//! A second group keeps the browser boundary narrow: only `engine.rs` and
//! `render.rs` may name `wasm_bindgen`, `web_sys` or `js_sys`, so every other
//! module stays testable with a plain native `cargo test`.

use std::fs;
use std::path::Path;

/// Modules allowed to touch browser APIs.
const BROWSER_MODULES: &[&str] = &["engine.rs", "render.rs"];

/// Compiled only under `#[cfg(test)]`.
const TEST_ONLY_MODULES: &[&str] = &["testkit.rs"];

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const PRODUCTION_BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, why: "panics trap the wasm module" },
    Budget { pattern: ".expect(", max: 0, why: "panics trap the wasm module" },
    Budget { pattern: "panic!(", max: 0, why: "panics trap the wasm module" },
    Budget { pattern: "unreachable!(", max: 0, why: "panics trap the wasm module" },
    Budget { pattern: "todo!(", max: 0, why: "unfinished code path" },
    Budget { pattern: "unimplemented!(", max: 0, why: "unfinished code path" },
    Budget { pattern: "let _ =", max: 0, why: "discards a result unseen" },
    Budget { pattern: ".ok()", max: 0, why: "discards an error unseen" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "dead code should be deleted" },
    Budget { pattern: "println!(", max: 0, why: "use the log facade" },
    Budget { pattern: "eprintln!(", max: 0, why: "use the log facade" },
    Budget { pattern: "dbg!(", max: 0, why: "debug leftovers" },
];

/// Canvas calls that only the overlay renderer makes.
const DRAWING_CALLS: &[&str] = &[".fill_rect(", ".stroke_rect(", ".fill_text(", ".set_line_dash(", ".clear_rect("];

const BROWSER_PATTERNS: &[&str] = &["wasm_bindgen", "web_sys", "js_sys", "CanvasRenderingContext2d"];

struct SourceFile {
    name: String,
    content: String,
}

fn production_sources() -> Vec<SourceFile> {
    let Ok(entries) = fs::read_dir(Path::new("src")) else {
        return Vec::new();
    };
    let mut files: Vec<SourceFile> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "rs"))
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            if name.ends_with("_test.rs") || TEST_ONLY_MODULES.contains(&name.as_str()) {
                return None;
            }
            let content = fs::read_to_string(&path).ok()?;
            Some(SourceFile { name, content })
        })
        .collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

/// Matching lines per file, skipping `//` comment lines.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.name.clone(), count))
        })
        .collect()
}

fn describe(hits: &[(String, usize)]) -> String {
    hits.iter().map(|(name, count)| format!("  src/{name}: {count}")).collect::<Vec<_>>().join("\n")
}

#[test]
fn sources_are_found() {
    let names: Vec<String> = production_sources().into_iter().map(|f| f.name).collect();
    assert!(names.iter().any(|n| n == "editor.rs"), "run from the editor crate root; found {names:?}");
    assert!(!names.iter().any(|n| n == "testkit.rs" || n.ends_with("_test.rs")));
}

#[test]
fn production_budgets_hold() {
    let files = production_sources();
    let mut failures = Vec::new();
    for budget in PRODUCTION_BUDGETS {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            failures.push(format!(
                "`{}` found {count}, max {} ({}):\n{}",
                budget.pattern,
                budget.max,
                budget.why,
                describe(&found)
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn browser_apis_stay_in_boundary_modules() {
    let files = production_sources();
    let outside: Vec<SourceFile> = files.into_iter().filter(|f| !BROWSER_MODULES.contains(&f.name.as_str())).collect();
    for pattern in BROWSER_PATTERNS {
        let found = hits(&outside, pattern);
        assert!(found.is_empty(), "`{pattern}` outside {BROWSER_MODULES:?}:\n{}", describe(&found));
    }
}

#[test]
fn overlay_drawing_is_render_only() {
    let files = production_sources();
    for call in DRAWING_CALLS {
        let found: Vec<(String, usize)> = hits(&files, call).into_iter().filter(|(name, _)| name != "render.rs").collect();
        assert!(found.is_empty(), "`{call}` outside render.rs:\n{}", describe(&found));
    }
}
