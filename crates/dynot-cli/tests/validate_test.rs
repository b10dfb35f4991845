use assert_cmd::Command;
use dynot_testing::TestWorld;
use dynot_testing::fixtures::{dynamic_ot_yaml, dynamic_ot_yaml_named};
use predicates::prelude::*;

fn write_config(world: &TestWorld, yaml: &str) -> String {
    world
        .write_file("tracing.yaml", yaml)
        .unwrap()
        .display()
        .to_string()
}

#[allow(deprecated)]
fn dynot(world: &TestWorld) -> Command {
    let mut cmd = Command::cargo_bin("dynot").unwrap();
    world.configure_command(&mut cmd);
    cmd
}

#[test]
fn test_validate_does_not_load_library() {
    let world = TestWorld::new();
    let output = world.path("spans.json");
    let config = write_config(&world, &dynamic_ot_yaml("/nonexistent/libtracer.so", &output));

    dynot(&world)
        .args(["validate", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Valid"))
        .stdout(predicate::str::contains("Factory:    envoy.tracers.dynamic_ot"))
        .stdout(predicate::str::contains(
            "Config:     envoy.config.trace.v3.DynamicOtConfig",
        ));
}

#[test]
fn test_validate_json() {
    let world = TestWorld::new();
    let output = world.path("spans.json");
    let config = write_config(&world, &dynamic_ot_yaml("libtracer.so", &output));

    let result = world
        .run(&["validate", &config, "--format", "json"])
        .unwrap();
    assert!(result.success(), "validate failed: {}", result.stderr);

    let json = result.json().unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["http"]["factory"], "envoy.tracers.dynamic_ot");
    assert_eq!(json["http"]["validation"], "strict");
}

#[test]
fn test_validate_without_http_block() {
    let world = TestWorld::new();
    let config = write_config(&world, "{}\n");

    dynot(&world)
        .args(["validate", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("No HTTP tracer configured"));
}

#[test]
fn test_unknown_field_needs_permissive_mode() {
    let world = TestWorld::new();
    let output = world.path("spans.json");
    let yaml = dynamic_ot_yaml("libtracer.so", &output)
        .replace("    library:", "    sampling_rate: 0.5\n    library:");
    let config = write_config(&world, &yaml);

    dynot(&world)
        .args(["validate", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sampling_rate"));

    dynot(&world)
        .args(["validate", &config, "--permissive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation: permissive"));
}

#[test]
fn test_permissive_mode_from_settings() {
    let world = TestWorld::new().with_settings("validation = \"permissive\"\n");
    let output = world.path("spans.json");
    let yaml = dynamic_ot_yaml("libtracer.so", &output)
        .replace("    library:", "    sampling_rate: 0.5\n    library:");
    let config = write_config(&world, &yaml);

    dynot(&world).args(["validate", &config]).assert().success();
}

#[test]
fn test_deprecated_name_rejected_unless_enabled() {
    let world = TestWorld::new();
    let output = world.path("spans.json");
    let config = write_config(
        &world,
        &dynamic_ot_yaml_named("envoy.dynamic.ot", "libtracer.so", &output),
    );

    dynot(&world)
        .args(["validate", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Didn't find a registered tracer factory for 'envoy.dynamic.ot'",
        ));

    let world = world.with_settings("[runtime]\nallow_deprecated_extension_names = true\n");
    dynot(&world)
        .args(["validate", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("Factory:    envoy.tracers.dynamic_ot"));
}

#[test]
fn test_empty_library_fails_validation() {
    let world = TestWorld::new();
    let output = world.path("spans.json");
    let config = write_config(&world, &dynamic_ot_yaml("", &output));

    dynot(&world)
        .args(["validate", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("library"));
}

#[test]
fn test_missing_file_reports_path() {
    let world = TestWorld::new();

    dynot(&world)
        .args(["validate", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));
}
