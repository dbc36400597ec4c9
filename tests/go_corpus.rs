use goimpl::parser::parse_source;
use walkdir::WalkDir;

/// Parses every `.go` file under `GOIMPL_GO_CORPUS` (typically `$GOROOT/src`).
#[test]
fn parses_go_corpus_if_configured() {
    let Some(root) = std::env::var_os("GOIMPL_GO_CORPUS") else {
        eprintln!("GOIMPL_GO_CORPUS not set; skipping corpus test");
        return;
    };

    let mut total = 0usize;
    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        // testdata holds deliberately broken sources
        if path.components().any(|c| c.as_os_str() == "testdata") {
            continue;
        }
        let Ok(src) = std::fs::read_to_string(path) else {
            continue;
        };

        total += 1;
        if let Err(f) = parse_source(&src) {
            for d in f.diags.iter().take(8) {
                let (line, col) = d.span.line_col(&src);
                eprintln!("  {}:{line}:{col}: {}", path.display(), d.message);
            }
            panic!("corpus parse failed after {total} files");
        }
    }

    eprintln!("parsed {total} Go files");
}
