//! Integration tests for types

#[cfg(test)]
mod tests {
    use driveline_types::*;
    use proptest::prelude::*;

    #[test]
    fn test_well_known_environment_names() {
        assert!(EnvironmentName::is_well_known("production"));
        assert!(EnvironmentName::is_well_known("STAGING"));
        assert!(!EnvironmentName::is_well_known("QA"));
    }

    #[test]
    fn test_arguments_serialize_as_array() {
        let args = CommandLineArguments::new(["--k=v", "x"]);
        let json = serde_json::to_string(&args).unwrap();
        assert_eq!(json, r#"["--k=v","x"]"#);
        let back: CommandLineArguments = serde_json::from_str(&json).unwrap();
        assert_eq!(back, args);
    }

    proptest! {
        #[test]
        fn prop_eq_ignore_case_ignores_ascii_case(s in "[a-zA-Z0-9:_]{0,24}") {
            prop_assert!(eq_ignore_case(&s, &s.to_ascii_uppercase()));
            prop_assert!(eq_ignore_case(&s.to_ascii_lowercase(), &s));
        }

        #[test]
        fn prop_eq_ignore_case_is_symmetric(a in "\\PC{0,8}", b in "\\PC{0,8}") {
            prop_assert_eq!(eq_ignore_case(&a, &b), eq_ignore_case(&b, &a));
        }
    }
}
