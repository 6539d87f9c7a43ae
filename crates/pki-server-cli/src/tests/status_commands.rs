//! `status` rendering for whole instances.

use rstest::{fixture, rstest};

use super::support::TestWorld;

#[fixture]
fn world() -> TestWorld {
    TestWorld::new().expect("test world")
}

const INSTANCE_HEADER: &str = concat!(
    "  Instance ID: pki-tomcat\n",
    "  Active: false\n",
    "  Watchdog Enabled: false\n",
    "  Unsecure Port: 8080\n",
    "  Secure Port: 8443\n",
    "  Service Port: 8005\n",
);

#[rstest]
fn status_of_missing_instance_prints_no_report(world: TestWorld) {
    let outcome = world.run(&["status"]);
    assert!(!outcome.succeeded());
    assert!(outcome.stdout.is_empty());
    assert_eq!(outcome.stderr, "ERROR: Invalid instance: pki-tomcat\n");
}

#[rstest]
fn status_without_subsystems_prints_instance_facts(world: TestWorld) {
    world.create_instance("pki-tomcat").expect("create");
    let outcome = world.run(&["status"]);
    assert!(outcome.succeeded(), "stderr: {}", outcome.stderr);
    assert_eq!(outcome.stdout, INSTANCE_HEADER);
}

#[rstest]
fn disabled_subsystem_omits_endpoint_urls(world: TestWorld) {
    let paths = world.create_instance("pki-tomcat").expect("create");
    world
        .install_subsystem(
            &paths,
            "kra",
            &[
                ("securitydomain.name", "EXAMPLE"),
                ("securitydomain.host", "sd.example.com"),
                ("securitydomain.httpsadminport", "8443"),
            ],
        )
        .expect("kra");

    let outcome = world.run(&["status"]);

    assert!(outcome.succeeded(), "stderr: {}", outcome.stderr);
    let expected = format!(
        "{INSTANCE_HEADER}
  KRA Subsystem:
    Type:                KRA
    SD Name:             EXAMPLE
    SD Registration URL: https://sd.example.com:8443
    Enabled:             false
"
    );
    assert_eq!(outcome.stdout, expected);
}

#[rstest]
fn clone_wins_over_hierarchy_for_ca(world: TestWorld) {
    let paths = world.create_instance("pki-tomcat").expect("create");
    world
        .install_subsystem(
            &paths,
            "ca",
            &[("subsystem.select", "Clone"), ("hierarchy.select", "Root")],
        )
        .expect("ca");
    world.enable_subsystem(&paths, "ca").expect("enable");

    let outcome = world.run(&["status"]);

    assert!(outcome.succeeded(), "stderr: {}", outcome.stderr);
    assert!(outcome.stdout.contains("    Type:                CA Clone\n"));
    assert!(outcome.stdout.contains("    Enabled:             true\n"));
    assert!(
        outcome.stdout.contains("    Secure Agent URL:    https://"),
        "{}",
        outcome.stdout
    );
    for suffix in [
        ":8080/ca/ee/ca",
        ":8443/ca/agent/ca",
        ":8443/ca/services",
    ] {
        assert!(
            outcome.stdout.contains(suffix),
            "missing {suffix} in {}",
            outcome.stdout
        );
    }
}

#[rstest]
fn subsystems_follow_fixed_kind_order(world: TestWorld) {
    let paths = world.create_instance("pki-tomcat").expect("create");
    for kind in ["tps", "ca", "ocsp"] {
        world.install_subsystem(&paths, kind, &[]).expect("install");
    }
    let outcome = world.run(&["status"]);
    let ca = outcome.stdout.find("  CA Subsystem:").expect("ca block");
    let ocsp = outcome.stdout.find("  OCSP Subsystem:").expect("ocsp block");
    let tps = outcome.stdout.find("  TPS Subsystem:").expect("tps block");
    assert!(ca < ocsp && ocsp < tps);
}

#[rstest]
fn json_report_reflects_activity(world: TestWorld) {
    let paths = world.create_instance("pki-tomcat").expect("create");
    world
        .install_subsystem(&paths, "est", &[])
        .expect("est");
    world.enable_subsystem(&paths, "est").expect("enable");
    world.activity.set_active(true);

    let outcome = world.run(&["status", "--output", "json"]);

    assert!(outcome.succeeded(), "stderr: {}", outcome.stderr);
    let report: serde_json::Value = serde_json::from_str(&outcome.stdout).expect("json");
    assert_eq!(report["instance_id"], "pki-tomcat");
    assert_eq!(report["active"], true);
    assert_eq!(report["secure_port"], 8443);
    assert_eq!(report["subsystems"][0]["kind"], "EST");
    assert_eq!(report["subsystems"][0]["enabled"], true);
    let url = report["subsystems"][0]["endpoints"][0]["url"]
        .as_str()
        .expect("url");
    assert!(url.ends_with(":8443/.well-known/est"), "url: {url}");
}

#[rstest]
fn auto_output_renders_json_when_redirected(world: TestWorld) {
    world.create_instance("pki-tomcat").expect("create");
    let outcome = world.run(&["status", "--output", "auto"]);
    assert!(outcome.succeeded(), "stderr: {}", outcome.stderr);
    assert!(serde_json::from_str::<serde_json::Value>(&outcome.stdout).is_ok());
}
