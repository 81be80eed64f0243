use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use gmdsl::{ErrorKind, GmdslError};
use gmdsl_cli::{Args, Command, run_with_output};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Collects all .gm files from a directory
fn collect_gm_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("gm"))
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(command: Command, config: Option<&Path>) -> Args {
    Args {
        command,
        config: config.map(|path| path.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

fn validate(input: &Path) -> Args {
    args(
        Command::Validate {
            input: input.to_path_buf(),
            include: vec![fixtures().join("lib")],
        },
        None,
    )
}

fn run_captured(args: &Args) -> Result<String, GmdslError> {
    let mut out = Vec::new();
    run_with_output(args, &mut out)?;
    Ok(String::from_utf8(out).expect("CLI output is UTF-8"))
}

#[test]
fn e2e_smoke_test_valid_examples() {
    let valid_examples = collect_gm_files(fixtures().join("valid"));
    assert!(
        !valid_examples.is_empty(),
        "No valid examples found in tests/fixtures/valid/"
    );

    let mut failed_examples = Vec::new();
    for example_path in &valid_examples {
        if let Err(e) = run_captured(&validate(example_path)) {
            failed_examples.push((example_path.clone(), e));
        }
    }

    if !failed_examples.is_empty() {
        eprintln!("\nValid examples that failed:");
        for (path, err) in &failed_examples {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!(
            "{} valid example(s) failed unexpectedly",
            failed_examples.len()
        );
    }
}

#[test]
fn e2e_smoke_test_error_examples() {
    let error_examples = collect_gm_files(fixtures().join("errors"));
    assert!(
        !error_examples.is_empty(),
        "No error examples found in tests/fixtures/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();
    for example_path in &error_examples {
        if run_captured(&validate(example_path)).is_ok() {
            unexpectedly_succeeded.push(example_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError examples that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error example(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_error_kinds() {
    let cases = [
        ("syntax.gm", ErrorKind::SyntaxError),
        ("unterminated.gm", ErrorKind::SyntaxError),
        ("unresolved.gm", ErrorKind::UnresolvedReference),
        ("duplicate.gm", ErrorKind::DuplicateDeclaration),
        ("missing_import.gm", ErrorKind::NamespaceNotFound),
        ("cycle.gm", ErrorKind::ImportCycle),
        ("arity.gm", ErrorKind::ArgumentArityError),
        ("edge_to_type.gm", ErrorKind::UnresolvedReference),
    ];

    for (file, kind) in cases {
        let err = run_captured(&validate(&fixtures().join("errors").join(file))).unwrap_err();
        let GmdslError::Diagnostics { err, .. } = err else {
            panic!("{file}: expected diagnostics, got {err}");
        };
        assert!(err.has_kind(kind), "{file}: expected {kind}, got {err}");
    }
}

#[test]
fn e2e_validate_reports_summary() {
    let output = run_captured(&validate(&fixtures().join("valid").join("social.gm"))).unwrap();

    assert!(output.contains("social.gm: ok (3 namespaces"), "{output}");
}

#[test]
fn e2e_generate_debug_dump() {
    let out_dir = tempdir().expect("Failed to create temp directory");

    let generate = args(
        Command::Generate {
            input: fixtures().join("valid").join("social.gm"),
            generator: "debug".to_string(),
            output: out_dir.path().to_path_buf(),
            include: vec![fixtures().join("lib")],
        },
        None,
    );
    run_captured(&generate).expect("generate failed");

    let dump = fs::read_to_string(out_dir.path().join("debug.txt")).unwrap();
    assert!(dump.contains("  gm.social.Person @Label(\"A person\")"), "{dump}");
    assert!(dump.contains("  gm.geo.Point"), "{dump}");
    assert!(dump.contains("  gm.core.String (primitive)"), "{dump}");
}

#[test]
fn e2e_generate_uses_configured_options() {
    let work = tempdir().expect("Failed to create temp directory");
    let config = work.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[imports]\nsearch_paths = [{:?}]\n\n[generators.debug]\noutput = \"dump/model.txt\"\nshow_properties = false\n",
            fixtures().join("lib").display().to_string()
        ),
    )
    .unwrap();

    let out_dir = work.path().join("out");
    let generate = args(
        Command::Generate {
            input: fixtures().join("valid").join("social.gm"),
            generator: "debug".to_string(),
            output: out_dir.clone(),
            include: Vec::new(),
        },
        Some(&config),
    );
    run_captured(&generate).expect("generate failed");

    let dump = fs::read_to_string(out_dir.join("dump").join("model.txt")).unwrap();
    assert!(!dump.contains("since: Int"), "{dump}");
}

#[test]
fn e2e_generate_unknown_generator() {
    let out_dir = tempdir().expect("Failed to create temp directory");

    let generate = args(
        Command::Generate {
            input: fixtures().join("valid").join("standalone.gm"),
            generator: "typescript".to_string(),
            output: out_dir.path().to_path_buf(),
            include: Vec::new(),
        },
        None,
    );

    let err = run_captured(&generate).unwrap_err();
    assert!(matches!(err, GmdslError::Generate(_)));
}

#[test]
fn e2e_fmt_write_is_stable() {
    let work = tempdir().expect("Failed to create temp directory");
    let input = work.path().join("social.gm");
    fs::copy(fixtures().join("valid").join("social.gm"), &input).unwrap();

    let fmt = |write| {
        args(
            Command::Fmt {
                input: input.clone(),
                write,
            },
            None,
        )
    };

    run_captured(&fmt(true)).expect("fmt --write failed");
    let formatted = fs::read_to_string(&input).unwrap();
    assert!(formatted.starts_with("namespace gm.social\n\nimport gm.core\nimport gm.geo\n"));

    let printed = run_captured(&fmt(false)).expect("fmt failed");
    assert_eq!(printed, formatted);
}

#[test]
fn e2e_fmt_write_refuses_to_drop_comments() {
    let work = tempdir().expect("Failed to create temp directory");
    let input = work.path().join("commented.gm");
    let source = "// Owner: data team. Do not rename.\ntype Text\n\nnode A {\n    name: Text // primary\n}\n";
    fs::write(&input, source).unwrap();

    let fmt = |write| {
        args(
            Command::Fmt {
                input: input.clone(),
                write,
            },
            None,
        )
    };

    let err = run_captured(&fmt(true)).unwrap_err();
    let GmdslError::Diagnostics { err, sources } = err else {
        panic!("Expected diagnostics, got {err}");
    };
    let diagnostic = &err.diagnostics()[0];
    assert!(diagnostic.severity().is_error());
    assert!(diagnostic.message().contains("2 line comments"), "{diagnostic}");
    assert_eq!(diagnostic.labels().len(), 2);
    assert_eq!(sources.get(diagnostic.origin()), Some(source));
    assert_eq!(fs::read_to_string(&input).unwrap(), source);

    let printed = run_captured(&fmt(false)).expect("fmt to stdout failed");
    assert!(printed.contains("node A {"), "{printed}");
    assert!(!printed.contains("//"), "{printed}");
}

#[test]
fn e2e_imports_resolve_next_to_the_importing_file() {
    let work = tempdir().expect("Failed to create temp directory");
    let schemas = work.path().join("schemas");
    fs::create_dir_all(schemas.join("gm")).unwrap();
    fs::write(
        schemas.join("gm").join("geo.gm"),
        "namespace gm.geo\nimport units\n\ntype Point {\n    lat: units.Degrees\n}\n",
    )
    .unwrap();
    fs::write(schemas.join("gm").join("units.gm"), "namespace units\n\ntype Degrees\n").unwrap();

    let main = work.path().join("main.gm");
    fs::write(&main, "import gm.geo\n\nnode Site {\n    at: gm.geo.Point\n}\n").unwrap();

    let output = run_captured(&args(
        Command::Validate {
            input: main,
            include: vec![schemas],
        },
        None,
    ))
    .expect("sibling import should resolve");
    assert!(output.contains("main.gm: ok (3 namespaces"), "{output}");
}

#[test]
fn e2e_errors_in_imported_files_keep_their_source() {
    let work = tempdir().expect("Failed to create temp directory");
    let main = work.path().join("main.gm");
    fs::write(&main, "import broken\n\ntype A\n").unwrap();
    fs::write(work.path().join("broken.gm"), "namespace broken\nnode {\n").unwrap();

    let err = run_captured(&args(
        Command::Validate {
            input: main,
            include: Vec::new(),
        },
        None,
    ))
    .unwrap_err();

    let GmdslError::Diagnostics { err, sources } = err else {
        panic!("Expected diagnostics");
    };
    let origin = err.diagnostics()[0].origin().expect("origin is recorded");
    assert!(origin.ends_with("broken.gm"), "{origin}");
    assert_eq!(sources.get(Some(origin)), Some("namespace broken\nnode {\n"));
}

#[test]
fn e2e_list_generators() {
    let output = run_captured(&args(Command::Generators, None)).unwrap();

    assert!(output.starts_with("debug "), "{output}");
    assert!(output.contains("Plain-text dump"), "{output}");
}
