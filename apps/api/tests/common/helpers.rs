//! Test helper functions for API integration tests
//!
//! Provides utility functions for setting up test environments.

use std::collections::HashMap;

/// Temporarily set environment variables for the duration of a test
///
/// Returns a guard that will restore the original values when dropped.
pub struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    /// Create a new environment guard that sets the given variables
    pub fn new(vars: &[(String, String)]) -> Self {
        let mut original = HashMap::new();

        for (key, value) in vars {
            // Save the original value (or None if not set)
            original.insert(key.clone(), std::env::var(key).ok());
            // Set the new value
            std::env::set_var(key, value);
        }

        Self { original }
    }

}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.original {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_guard_sets_and_restores() {
        let key = "TEST_ENV_GUARD_VAR";
        std::env::remove_var(key);

        {
            let _guard = EnvGuard::new(&[(key.to_string(), "test_value".to_string())]);
            assert_eq!(std::env::var(key).unwrap(), "test_value");
        }

        // After guard is dropped, var should be removed
        assert!(std::env::var(key).is_err());
    }

    #[test]
    fn test_env_guard_restores_original() {
        let key = "TEST_ENV_GUARD_RESTORE_VAR";
        std::env::set_var(key, "original");

        {
            let _guard = EnvGuard::new(&[(key.to_string(), "modified".to_string())]);
            assert_eq!(std::env::var(key).unwrap(), "modified");
        }

        // After guard is dropped, original value should be restored
        assert_eq!(std::env::var(key).unwrap(), "original");

        // Cleanup
        std::env::remove_var(key);
    }
}
