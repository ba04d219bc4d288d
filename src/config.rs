//! Runtime configuration and authorization policy.
//!
//! The catalog never reaches for ambient global state: the execution
//! environment and the admin set are injected explicitly. [`AccessPolicy`]
//! is the seam the catalog consults when an existing record is
//! re-registered by someone other than its creator.

use std::collections::HashSet;

use crate::record::UserId;

/// Execution environment of the embedding application.
///
/// Sandboxed instances skip side effects that only make sense in
/// production, such as uploading media bytes to the durable blob store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Production deployment; all side effects enabled.
    Production,
    /// Local or test instance; durable uploads are skipped.
    #[default]
    Sandbox,
}

impl Environment {
    /// Returns true for production deployments.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Authorization policy consulted by mutating catalog operations.
pub trait AccessPolicy: Send + Sync {
    /// Returns true if the user may update records they do not own.
    fn is_admin(&self, user: UserId) -> bool;
}

/// Static configuration: environment plus the admin set.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Execution environment.
    pub environment: Environment,
    admins: HashSet<UserId>,
}

impl Config {
    /// Creates a config for the given environment with no admins.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            admins: HashSet::new(),
        }
    }

    /// Grants admin rights to a user.
    #[must_use]
    pub fn with_admin(mut self, user: UserId) -> Self {
        self.admins.insert(user);
        self
    }
}

impl AccessPolicy for Config {
    fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_default_is_sandbox() {
        assert!(!Environment::default().is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_admin_membership() {
        let config = Config::new(Environment::Sandbox).with_admin(UserId(42));
        assert!(config.is_admin(UserId(42)));
        assert!(!config.is_admin(UserId(43)));
    }
}
