use std::fs;

use tempfile::tempdir;

use bringlist_cli::{run, Args, Format};

fn args_for(template: Option<String>) -> Args {
    Args {
        template,
        nights: 5,
        tags: vec!["kamperen".to_string()],
        format: Format::Text,
        check_only: false,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_template() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("trip.blt");
    fs::write(
        &path,
        "# Kampeerspullen [ kamperen ]\n\
         tent [ kamperen ]\n\
         sokken [ *1 ]\n",
    )
    .expect("Failed to write template");

    let args = args_for(Some(path.to_string_lossy().to_string()));
    run(&args).expect("valid template should render");
}

#[test]
fn e2e_smoke_test_json_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("trip.blt");
    fs::write(&path, "# Kleding\njas\n").expect("Failed to write template");

    let mut args = args_for(Some(path.to_string_lossy().to_string()));
    args.format = Format::Json;
    run(&args).expect("valid template should serialize");
}

#[test]
fn e2e_smoke_test_builtin_template() {
    let args = args_for(None);
    run(&args).expect("built-in template should render");
}

#[test]
fn e2e_smoke_test_check_only() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("dup.blt");
    fs::write(
        &path,
        "# Kleding\n\
         topje [ <=10 ]\n\
         topje [ >5 ]\n",
    )
    .expect("Failed to write template");

    let mut args = args_for(Some(path.to_string_lossy().to_string()));
    args.check_only = true;
    run(&args).expect("check-only run should succeed despite warnings");
}

#[test]
fn e2e_smoke_test_malformed_template_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("broken.blt");
    fs::write(&path, "# Kleding\nfoo [\n").expect("Failed to write template");

    let args = args_for(Some(path.to_string_lossy().to_string()));
    let err = run(&args).expect_err("malformed template should fail");
    assert!(err.to_string().contains("line 2"), "got: {err}");
}

#[test]
fn e2e_smoke_test_missing_file_fails() {
    let args = args_for(Some("does-not-exist.blt".to_string()));
    assert!(run(&args).is_err());
}
