//! Integration tests for the built-in fixtures

use benchgen_core::fixtures::{builtin_config, builtin_manifest, call_func_args, new_and_init};
use benchgen_core::{generate, render, BenchgenError, GenerationConfig};
use benchgen_testkit::{count_lines, temp_dir_in_workspace};
use std::fs;

fn lines_matching(text: &str, pred: impl Fn(&str) -> bool) -> usize {
    text.lines().filter(|l| pred(l)).count()
}

#[test]
fn test_call_func_args_renders_thirty_blocks_and_sum() {
    let temp = temp_dir_in_workspace();
    let config = builtin_config(&call_func_args(), temp.path()).unwrap();

    generate(&config).unwrap();
    let output = fs::read_to_string(temp.path().join("call_func_args_bench.rs")).unwrap();

    for i in 1..=30 {
        assert_eq!(count_lines(&output, &format!("    a{}: i64,", i)), 1, "arg {}", i);
        assert_eq!(count_lines(&output, &format!("        + a{}", i)), 1, "addend {}", i);
        assert_eq!(
            count_lines(&output, &format!("        black_box({}),", i)),
            1,
            "call site {}",
            i
        );
    }
    assert_eq!(
        lines_matching(&output, |l| l.starts_with("    a") && l.ends_with(": i64,")),
        30
    );
    assert_eq!(lines_matching(&output, |l| l.starts_with("        + a")), 30);

    assert_eq!(count_lines(&output, "const EXPECTED: i64 = 465;"), 1);
    assert_eq!(output.matches("465").count(), 1);
    assert!(output.contains("let values: [i64; 30] = ["));
    assert!(!output.contains("{{"), "unrendered directive left in output");
}

#[test]
fn test_new_and_init_renders_sixty_blocks_without_sum() {
    let temp = temp_dir_in_workspace();
    let config = builtin_config(&new_and_init(), temp.path()).unwrap();

    generate(&config).unwrap();
    let output = fs::read_to_string(temp.path().join("new_and_init_bench.rs")).unwrap();

    for i in 1..=60 {
        assert_eq!(count_lines(&output, &format!("    pub field{}: u64,", i)), 1);
        assert_eq!(
            count_lines(&output, &format!("        self.field{} = black_box({});", i, i)),
            1
        );
    }
    assert_eq!(
        lines_matching(&output, |l| l.starts_with("    pub field")),
        60
    );
    assert_eq!(
        lines_matching(&output, |l| l.trim_start().starts_with("self.field")),
        60
    );
    assert!(!output.contains("1830"));
    assert!(!output.contains("EXPECTED"));
    assert!(!output.contains("{{"));
}

#[test]
fn test_fixtures_carry_criterion_entry_points() {
    let temp = temp_dir_in_workspace();

    for (fixture, group, function) in [
        (call_func_args(), "call_func_args_30", "fn bench_call_func_args(c: &mut Criterion) {"),
        (new_and_init(), "new_and_init_60", "fn bench_new_and_init(c: &mut Criterion) {"),
    ] {
        let config = builtin_config(&fixture, temp.path()).unwrap();
        let output = render(&config).unwrap();

        assert_eq!(count_lines(&output, function), 1, "{}", fixture.name);
        assert!(output.contains(&format!("c.benchmark_group(\"{}\")", group)));
        assert_eq!(count_lines(&output, "criterion_main!(benches);"), 1);
    }
}

#[test]
fn test_call_func_args_bench_passes_every_argument() {
    let temp = temp_dir_in_workspace();
    let config = builtin_config(&call_func_args(), temp.path()).unwrap();

    let output = render(&config).unwrap();

    for i in 1..=30 {
        assert_eq!(count_lines(&output, &format!("                black_box({}),", i)), 1);
    }
}

#[test]
fn test_block_tags_leave_no_blank_lines_in_struct() {
    let temp = temp_dir_in_workspace();
    let config = builtin_config(&new_and_init(), temp.path()).unwrap();

    let output = render(&config).unwrap();

    assert!(output.contains("pub struct Wide {\n    pub field1: u64,\n"));
    assert!(output.contains("    pub field60: u64,\n}\n"));
}

#[test]
fn test_generation_is_idempotent() {
    let temp = temp_dir_in_workspace();
    let manifest = builtin_manifest().unwrap();

    for fixture in &manifest.fixtures {
        let config = manifest.config_for(fixture, temp.path()).unwrap();

        generate(&config).unwrap();
        let first = fs::read(&config.output_path).unwrap();
        generate(&config).unwrap();
        let second = fs::read(&config.output_path).unwrap();

        assert_eq!(first, second, "{} is not deterministic", fixture.name);
        assert_eq!(render(&config).unwrap().into_bytes(), first);
    }
}

#[test]
fn test_zero_length_emits_no_blocks() {
    let temp = temp_dir_in_workspace();
    let base = builtin_config(&call_func_args(), temp.path()).unwrap();
    let config = GenerationConfig { length: 0, ..base };

    let output = render(&config).unwrap();

    assert_eq!(
        lines_matching(&output, |l| l.starts_with("    a") && l.ends_with(": i64,")),
        0
    );
    assert!(output.contains("pub fn sum_args(\n) -> i64 {\n    0\n}\n"));
    assert_eq!(count_lines(&output, "const EXPECTED: i64 = 0;"), 1);
}

#[test]
fn test_missing_template_fails_without_touching_output() {
    let temp = temp_dir_in_workspace();
    let fresh = temp.path().join("fresh.rs");
    let existing = temp.path().join("existing.rs");
    fs::write(&existing, "previous run").unwrap();

    for output in [&fresh, &existing] {
        let config = GenerationConfig::new(output, temp.path().join("gen/missing.tmpl"), 30);
        let err = generate(&config).unwrap_err();
        assert!(
            matches!(err, BenchgenError::TemplateNotFound { .. }),
            "unexpected error: {}",
            err
        );
    }

    assert!(!fresh.exists());
    assert_eq!(fs::read_to_string(&existing).unwrap(), "previous run");
}
