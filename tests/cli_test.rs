use clap::Parser;
use odb_devtools::cli::{render_report, view_request, Args, Commands, OutputFormat};
use odb_devtools::includes::{FileRewrite, IncludeRewrite, RewriteReport};
use odb_devtools::viewer::ViewTarget;
use std::path::PathBuf;

fn sample_report(dry_run: bool) -> RewriteReport {
    RewriteReport {
        files_scanned: 3,
        dry_run,
        files: vec![FileRewrite {
            path: PathBuf::from("bison/src/main.c"),
            changes: vec![IncludeRewrite {
                line: 24,
                before: "#include \"bitset.h\"".to_string(),
                after: "#include \"bison-util/bitset.h\"".to_string(),
            }],
        }],
    }
}

#[test]
fn test_parse_view_positional_arguments() {
    let args = Args::try_parse_from([
        "odb-devtools",
        "view",
        "tests/test_db_parser_constant.cpp",
        "42",
        "ast",
    ])
    .unwrap();
    assert!(!args.verbose);
    match args.command {
        Commands::View {
            filename,
            line_number,
            ast_type,
            print,
        } => {
            assert_eq!(filename, PathBuf::from("tests/test_db_parser_constant.cpp"));
            assert_eq!(line_number, 42);
            assert_eq!(ast_type, "ast");
            assert!(!print);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_view_rejects_non_numeric_line() {
    let result = Args::try_parse_from(["odb-devtools", "view", "a.cpp", "ten", "source"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_fix_includes_defaults() {
    let args = Args::try_parse_from(["odb-devtools", "-v", "fix-includes"]).unwrap();
    assert!(args.verbose);
    match args.command {
        Commands::FixIncludes {
            root,
            dry_run,
            format,
        } => {
            assert_eq!(root, PathBuf::from("."));
            assert!(!dry_run);
            assert_eq!(format, OutputFormat::Text);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_global_config_after_subcommand() {
    let args = Args::try_parse_from([
        "odb-devtools",
        "fix-includes",
        "--dry-run",
        "--format",
        "json",
        "--config",
        "tools.toml",
    ])
    .unwrap();
    assert_eq!(args.config, Some(PathBuf::from("tools.toml")));
    assert!(matches!(
        args.command,
        Commands::FixIncludes {
            dry_run: true,
            format: OutputFormat::Json,
            ..
        }
    ));
}

#[test]
fn test_view_request_maps_ast_type() {
    let request = view_request(PathBuf::from("t.cpp"), 7, "source").unwrap();
    assert_eq!(request.target, ViewTarget::Source);
    assert_eq!(request.line, 7);
    assert!(view_request(PathBuf::from("t.cpp"), 7, "").is_err());
}

#[test]
fn test_render_text_report() {
    colored::control::set_override(false);
    let text = render_report(&sample_report(false), OutputFormat::Text).unwrap();
    assert!(text.contains("bison/src/main.c"));
    assert!(text.contains("#include \"bison-util/bitset.h\""));
    assert!(text.ends_with("rewrote 1 include(s) in 1 of 3 file(s)\n"));

    let dry = render_report(&sample_report(true), OutputFormat::Text).unwrap();
    assert!(dry.ends_with("would rewrite 1 include(s) in 1 of 3 file(s)\n"));
}

#[test]
fn test_render_json_report() {
    let json = render_report(&sample_report(true), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["files_scanned"], 3);
    assert_eq!(value["dry_run"], true);
    assert_eq!(value["files"][0]["changes"][0]["line"], 24);
}

#[cfg(unix)]
#[test]
fn test_render_json_report_propagates_serialization_error() {
    use odb_devtools::errors::DevtoolsError;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let mut report = sample_report(false);
    report.files[0].path = PathBuf::from(OsStr::from_bytes(b"bison/\xffmain.c"));
    let result = render_report(&report, OutputFormat::Json);
    assert!(matches!(result, Err(DevtoolsError::SerializationError(_))));
}
