//! Tests for binding `INFRACOST_*` environment variables onto configuration.

use rstest::rstest;

use crate::config::tests::helpers::{empty_env, mock_env};
use crate::config::{Config, Project, env_var_names};
use crate::error::ConfigError;

#[rstest]
fn empty_environment_leaves_defaults_untouched() {
    let mut config = Config::default();
    config
        .bind_env(&empty_env())
        .expect("binding an empty environment should succeed");

    assert!(config.log_level.is_empty());
    assert!(!config.no_color);
    assert!(config.api_key.is_none());
    assert_eq!(config.projects, vec![Project::default()]);
}

#[rstest]
fn string_variables_bind_onto_config() {
    let env = mock_env(&[
        ("INFRACOST_LOG_LEVEL", "info"),
        ("INFRACOST_API_KEY", "ico-abc"),
        ("INFRACOST_PRICING_API_ENDPOINT", "https://pricing.internal"),
        ("INFRACOST_DASHBOARD_API_ENDPOINT", "https://dashboard.internal"),
        ("INFRACOST_CONFIG_DIR", "/tmp/infracost"),
    ]);
    let mut config = Config::default();
    config.bind_env(&env).expect("binding should succeed");

    assert_eq!(config.log_level, "info");
    assert_eq!(config.api_key.as_deref(), Some("ico-abc"));
    assert_eq!(config.pricing_api_endpoint, "https://pricing.internal");
    assert_eq!(config.dashboard_api_endpoint, "https://dashboard.internal");
    assert_eq!(
        config.config_dir.as_ref().map(|dir| dir.as_str()),
        Some("/tmp/infracost")
    );
    assert!(!config.is_default_pricing_api_endpoint());
}

#[rstest]
#[case("1", true)]
#[case("t", true)]
#[case("TRUE", true)]
#[case("True", true)]
#[case("0", false)]
#[case("F", false)]
#[case("false", false)]
fn boolean_variables_accept_common_spellings(#[case] raw: &str, #[case] expected: bool) {
    let env = mock_env(&[
        ("INFRACOST_NO_COLOR", raw),
        ("INFRACOST_SKIP_UPDATE_CHECK", raw),
    ]);
    let mut config = Config {
        no_color: !expected,
        skip_update_check: !expected,
        ..Config::default()
    };
    config.bind_env(&env).expect("binding should succeed");

    assert_eq!(config.no_color, expected);
    assert_eq!(config.skip_update_check, expected);
}

#[rstest]
#[case("yes")]
#[case("")]
#[case("on")]
fn invalid_boolean_names_the_variable(#[case] raw: &str) {
    let env = mock_env(&[("INFRACOST_NO_COLOR", raw)]);
    let mut config = Config::default();

    let error = config.bind_env(&env).expect_err("invalid bool should fail");

    assert!(
        matches!(&error, ConfigError::InvalidEnvValue { var, .. } if var == "INFRACOST_NO_COLOR"),
        "unexpected error: {error:?}"
    );
}

#[rstest]
fn project_variables_bind_onto_every_project() {
    let env = mock_env(&[
        ("INFRACOST_TERRAFORM_BINARY", "/usr/local/bin/tofu"),
        ("INFRACOST_TERRAFORM_WORKSPACE", "staging"),
        ("INFRACOST_TERRAFORM_CLOUD_HOST", "tfe.example.com"),
        ("INFRACOST_TERRAFORM_CLOUD_TOKEN", "secret"),
    ]);
    let mut config = Config {
        projects: vec![
            Project {
                path: "a".into(),
                ..Project::default()
            },
            Project {
                path: "b".into(),
                terraform_workspace: Some(String::from("from-file")),
                ..Project::default()
            },
        ],
        ..Config::default()
    };

    config.bind_env(&env).expect("binding should succeed");

    for project in &config.projects {
        assert_eq!(project.terraform_binary.as_deref(), Some("/usr/local/bin/tofu"));
        assert_eq!(project.terraform_workspace.as_deref(), Some("staging"));
        assert_eq!(project.terraform_cloud_host.as_deref(), Some("tfe.example.com"));
        assert_eq!(project.terraform_cloud_token.as_deref(), Some("secret"));
    }
    assert_eq!(config.projects[0].path.as_str(), "a");
    assert_eq!(config.projects[1].path.as_str(), "b");
}

#[rstest]
fn project_binding_is_independent_per_entity() {
    let env = mock_env(&[("INFRACOST_TERRAFORM_BINARY", "terraform-1.5")]);
    let mut project = Project::default();

    project.bind_env(&env).expect("binding should succeed");

    assert_eq!(project.terraform_binary.as_deref(), Some("terraform-1.5"));
    assert!(project.terraform_workspace.is_none());
}

#[rstest]
fn unrecognised_prefixed_variables_are_ignored() {
    let env = mock_env(&[("INFRACOST_SOMETHING_NEW", "not-a-bool")]);
    let mut config = Config::default();

    config
        .bind_env(&env)
        .expect("unknown variables should be ignored");
}

#[rstest]
fn env_var_names_cover_config_and_project_tables() {
    let names = env_var_names();
    assert!(names.contains(&"INFRACOST_LOG_LEVEL"));
    assert!(names.contains(&"INFRACOST_CONFIG_DIR"));
    assert!(names.contains(&"INFRACOST_TERRAFORM_CLOUD_TOKEN"));
    assert!(names.contains(&"INFRACOST_TERRAFORM_DIR"));
    assert_eq!(names.len(), 13);
}
