use std::fs;

use dakota::run_source;
use walkdir::WalkDir;

/// Every script in `tests/scripts/` must run to completion.
///
/// The scripts validate themselves: each one ends by printing `ok`, and any
/// wrong intermediate result steers the script into a runtime error.
#[test]
fn script_corpus_runs() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| {
                                         e.path().extension().is_some_and(|ext| ext == "dak")
                                     })
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = run_source(&source) {
            panic!("Script {path:?} failed: {e}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}
