use serde::Deserialize;

use crate::domain::DomainError;

/// Connection parameters for the court decisions database, as entered in the
/// sidebar form. All fields are text; the port is parsed on validation.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Read `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
    ///
    /// Missing variables become empty strings so that [`Self::validate`]
    /// reports them the same way as an empty form field.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            host: var("DB_HOST"),
            port: std::env::var("DB_PORT").unwrap_or_else(|_| "3306".to_string()),
            user: var("DB_USER"),
            password: var("DB_PASSWORD"),
            database: var("DB_NAME"),
        }
    }

    /// Every field is required and the port must be numeric.
    pub fn validate(&self) -> Result<u16, DomainError> {
        let fields = [
            ("Host", &self.host),
            ("Port", &self.port),
            ("User", &self.user),
            ("Password", &self.password),
            ("Database", &self.database),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::connection(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        self.port
            .trim()
            .parse::<u16>()
            .map_err(|_| DomainError::connection(format!("invalid port '{}'", self.port.trim())))
    }

    /// Connection string with the password masked, for logs and display.
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:***@{}:{}/{}",
            self.user.trim(),
            self.host.trim(),
            self.port.trim(),
            self.database.trim()
        )
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
