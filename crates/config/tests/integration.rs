//! Integration tests for layered configuration

#[cfg(test)]
mod tests {
    use driveline_config::*;
    use driveline_errors::ConfigError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_files_resolve_against_base_path() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("appsettings.toml"),
            "[Logging]\nFormat = \"json\"\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("appsettings.Staging.json"),
            r#"{"Logging":{"Format":"pretty"},"name":"demo"}"#,
        )
        .unwrap();

        let mut builder = ConfigurationBuilder::new();
        builder.set_base_path(temp.path());
        builder
            .add_file("appsettings.toml", true, true)
            .unwrap()
            .add_file("appsettings.Staging.json", true, true)
            .unwrap();
        let config = builder.build().unwrap();

        assert_eq!(config.get("logging:format"), Some("pretty"));
        assert_eq!(config.get("name"), Some("demo"));
    }

    #[test]
    fn test_missing_optional_file_contributes_nothing() {
        let temp = tempdir().unwrap();
        let mut builder = ConfigurationBuilder::new();
        builder.set_base_path(temp.path());
        builder.add_file("absent.json", true, false).unwrap();
        assert!(builder.build().unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_file_fails_build() {
        let temp = tempdir().unwrap();
        let mut builder = ConfigurationBuilder::new();
        builder.add_file(temp.path().join("absent.toml"), false, false).unwrap();
        assert!(matches!(
            builder.build(),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let mut builder = ConfigurationBuilder::new();
        builder.add_file(&path, true, false).unwrap();
        assert!(matches!(
            builder.build(),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_command_line_overrides_environment_and_files() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("appsettings.json");
        fs::write(&path, r#"{"environment":"Production","port":"80"}"#).unwrap();

        let mut builder = ConfigurationBuilder::new();
        builder
            .add_file(&path, false, false)
            .unwrap()
            .add_source(EnvironmentVariablesSource::from_vars(
                Some("APP_"),
                [("APP_PORT", "8080"), ("APP_ENVIRONMENT", "Staging")],
            ))
            .add_command_line(["--environment=Development"]);
        let config = builder.build().unwrap();

        assert_eq!(config.get("environment"), Some("Development"));
        assert_eq!(config.get_parsed::<u16>("port").unwrap(), Some(8080));
    }

    #[test]
    fn test_sources_are_read_at_build_time() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("late.toml");
        let mut builder = ConfigurationBuilder::new();
        builder.add_file(&path, false, false).unwrap();
        fs::write(&path, "ready = true\n").unwrap();
        assert!(builder.build().unwrap().get_bool("ready", false).unwrap());
    }

    #[test]
    fn test_builder_debug_lists_sources() {
        let mut builder = ConfigurationBuilder::new();
        builder.add_in_memory([("a", "1")]).add_env_vars(Some("DRIVELINE_"));
        let rendered = format!("{builder:?}");
        assert!(rendered.contains("memory (1 keys)"));
        assert!(rendered.contains("DRIVELINE_*"));
        assert_eq!(builder.sources().len(), 2);
    }
}
