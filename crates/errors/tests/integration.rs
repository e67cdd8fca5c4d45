//! Integration tests for error types

#[cfg(test)]
mod tests {
    use driveline_errors::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = BuildError::AlreadyBuilt.into();
        assert!(matches!(err, Error::Build(BuildError::AlreadyBuilt)));
    }

    #[test]
    fn test_error_display() {
        let err = BuildError::ContainerTypeMismatch {
            expected: "Foo".into(),
            actual: "Bar".into(),
        };
        assert_eq!(
            err.to_string(),
            "container builder type mismatch: configure action expects Foo, factory builds Bar"
        );
        assert_eq!(
            BuildError::FactoryResolverReturnedNone.to_string(),
            "factory resolution returned no factory"
        );
    }

    #[test]
    fn test_user_codes_are_forwarded() {
        let err = Error::from(ContainerError::Disposed);
        assert_eq!(err.user_code(), Some("container.disposed"));
        assert!(err.user_hint().is_some());

        let err = Error::invalid_argument("environment", "must not be empty");
        assert_eq!(err.user_code(), Some("error.invalid_argument"));
        assert_eq!(
            err.to_string(),
            "invalid argument environment: must not be empty"
        );
    }

    #[test]
    fn test_driver_error_clone() {
        let err = DriverError::failed("ImportDriver", "boom");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert_eq!(err.to_string(), "driver ImportDriver failed: boom");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                path: None,
                ..
            }
        ));
        assert!(err.is_retryable());
    }
}
