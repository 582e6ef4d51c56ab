//! Datastore selection parsed from the environment.
//!
//! The server and the seeding binary resolve their database the same way:
//! an embedded PostgreSQL instance for local development, or a networked
//! server addressed by `DATABASE_URL`. `DRIZZLE_USE_PGLITE` and
//! `PGLITE_DATA_PATH` are read as fallbacks for `DATABASE_EMBEDDED` and
//! `EMBEDDED_DATA_PATH`.

use std::path::PathBuf;

use mockable::Env;
use tracing::debug;

const EMBEDDED_ENV: &str = "DATABASE_EMBEDDED";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const EMBEDDED_DATA_PATH_ENV: &str = "EMBEDDED_DATA_PATH";
const MAX_CONNECTIONS_ENV: &str = "PG_MAX_CONNECTIONS";
const SSL_ENV: &str = "PG_SSL";
const EMBEDDED_ALIAS_ENV: &str = "DRIZZLE_USE_PGLITE";
const EMBEDDED_DATA_PATH_ALIAS_ENV: &str = "PGLITE_DATA_PATH";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const POSITIVE_INTEGER_EXPECTED: &str = "a positive integer";

/// Default embedded data directory, relative to the working directory.
pub const DEFAULT_EMBEDDED_DATA_PATH: &str = ".local/postgres.dev";
/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Build mode used to pick the datastore when nothing is configured.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to the embedded datastore.
    Debug,
    /// Release builds require an explicit networked database.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hello_assistant::outbound::persistence::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Where the greetings table lives.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DatabaseTarget {
    /// A PostgreSQL instance started in-process from `data_path`.
    Embedded { data_path: PathBuf },
    /// An external PostgreSQL server.
    Networked { url: String },
}

/// Resolved datastore settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatabaseSettings {
    /// Embedded or networked datastore.
    pub target: DatabaseTarget,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Whether connections negotiate TLS.
    pub ssl: bool,
}

/// Errors raised while reading datastore configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfigError {
    /// A networked datastore was selected without a URL.
    #[error("DATABASE_URL must be set when the embedded database is not used")]
    MissingDatabaseUrl,
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Build datastore settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use hello_assistant::outbound::persistence::{
///     database_settings_from_env, BuildMode, DatabaseTarget,
/// };
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "DATABASE_URL" => Some("postgres://localhost/hello".to_string()),
///     _ => None,
/// });
///
/// let settings = database_settings_from_env(&env, BuildMode::Release).expect("settings");
/// assert_eq!(
///     settings.target,
///     DatabaseTarget::Networked { url: "postgres://localhost/hello".to_string() }
/// );
/// assert_eq!(settings.max_connections, 10);
/// ```
pub fn database_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<DatabaseSettings, DatabaseConfigError> {
    let embedded = bool_from_env(env, &[EMBEDDED_ENV, EMBEDDED_ALIAS_ENV])?;
    let url = env.string(DATABASE_URL_ENV).filter(|url| !url.trim().is_empty());
    let max_connections = max_connections_from_env(env)?;
    let ssl = bool_from_env(env, &[SSL_ENV])?.unwrap_or(false);

    let use_embedded = match embedded {
        Some(flag) => flag,
        None => url.is_none() && mode.is_debug(),
    };
    let target = if use_embedded {
        let data_path = first_set(env, &[EMBEDDED_DATA_PATH_ENV, EMBEDDED_DATA_PATH_ALIAS_ENV])
            .map(|(_, path)| path)
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDED_DATA_PATH.to_owned());
        DatabaseTarget::Embedded {
            data_path: PathBuf::from(data_path),
        }
    } else {
        let url = url.ok_or(DatabaseConfigError::MissingDatabaseUrl)?;
        DatabaseTarget::Networked {
            url: if ssl { require_ssl(&url) } else { url },
        }
    };
    debug!(?target, max_connections, ssl, "datastore selected");

    Ok(DatabaseSettings {
        target,
        max_connections,
        ssl,
    })
}

/// First variable among `names` that is set; earlier names win.
fn first_set<E: Env>(env: &E, names: &[&'static str]) -> Option<(&'static str, String)> {
    names
        .iter()
        .find_map(|&name| env.string(name).map(|value| (name, value)))
}

fn bool_from_env<E: Env>(
    env: &E,
    names: &[&'static str],
) -> Result<Option<bool>, DatabaseConfigError> {
    first_set(env, names)
        .map(|(name, value)| {
            parse_bool(&value).ok_or(DatabaseConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            })
        })
        .transpose()
}

fn max_connections_from_env<E: Env>(env: &E) -> Result<u32, DatabaseConfigError> {
    match env.string(MAX_CONNECTIONS_ENV) {
        None => Ok(DEFAULT_MAX_CONNECTIONS),
        Some(value) => match value.trim().parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(DatabaseConfigError::InvalidEnv {
                name: MAX_CONNECTIONS_ENV,
                value,
                expected: POSITIVE_INTEGER_EXPECTED,
            }),
        },
    }
}

/// Append `sslmode=require` unless the URL already names an SSL mode.
fn require_ssl(url: &str) -> String {
    if url.contains("sslmode=") {
        return url.to_owned();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}sslmode=require")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::collections::HashMap;

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn embedded(path: &str) -> DatabaseTarget {
        DatabaseTarget::Embedded {
            data_path: PathBuf::from(path),
        }
    }

    #[rstest]
    fn debug_without_url_defaults_to_embedded() {
        let settings =
            database_settings_from_env(&mock_env(&[]), BuildMode::Debug).expect("settings");

        assert_eq!(settings.target, embedded(DEFAULT_EMBEDDED_DATA_PATH));
        assert_eq!(settings.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!settings.ssl);
    }

    #[rstest]
    fn release_without_url_is_rejected() {
        let err = database_settings_from_env(&mock_env(&[]), BuildMode::Release)
            .expect_err("missing url");
        assert_eq!(err, DatabaseConfigError::MissingDatabaseUrl);
    }

    #[rstest]
    fn url_wins_over_the_debug_default() {
        let env = mock_env(&[(DATABASE_URL_ENV, "postgres://db/hello")]);

        let settings = database_settings_from_env(&env, BuildMode::Debug).expect("settings");

        assert_eq!(
            settings.target,
            DatabaseTarget::Networked {
                url: "postgres://db/hello".to_owned()
            }
        );
    }

    #[rstest]
    #[case("1")]
    #[case("yes")]
    #[case("TRUE")]
    fn explicit_embedded_overrides_url(#[case] flag: &str) {
        let env = mock_env(&[
            (EMBEDDED_ENV, flag),
            (DATABASE_URL_ENV, "postgres://db/hello"),
            (EMBEDDED_DATA_PATH_ENV, "/tmp/pg"),
        ]);

        let settings = database_settings_from_env(&env, BuildMode::Release).expect("settings");

        assert_eq!(settings.target, embedded("/tmp/pg"));
    }

    #[rstest]
    fn legacy_names_select_the_embedded_datastore() {
        let env = mock_env(&[
            (EMBEDDED_ALIAS_ENV, "true"),
            (EMBEDDED_DATA_PATH_ALIAS_ENV, "/tmp/legacy"),
            (DATABASE_URL_ENV, "postgres://db/hello"),
        ]);

        let settings = database_settings_from_env(&env, BuildMode::Release).expect("settings");

        assert_eq!(settings.target, embedded("/tmp/legacy"));
    }

    #[rstest]
    fn primary_names_win_over_legacy_names() {
        let env = mock_env(&[
            (EMBEDDED_ENV, "yes"),
            (EMBEDDED_ALIAS_ENV, "no"),
            (EMBEDDED_DATA_PATH_ENV, "/tmp/primary"),
            (EMBEDDED_DATA_PATH_ALIAS_ENV, "/tmp/legacy"),
        ]);

        let settings = database_settings_from_env(&env, BuildMode::Release).expect("settings");

        assert_eq!(settings.target, embedded("/tmp/primary"));
    }

    #[rstest]
    fn invalid_legacy_flag_names_the_legacy_variable() {
        let env = mock_env(&[(EMBEDDED_ALIAS_ENV, "maybe")]);

        let err = database_settings_from_env(&env, BuildMode::Debug).expect_err("invalid value");

        assert!(matches!(
            err,
            DatabaseConfigError::InvalidEnv { name, .. } if name == EMBEDDED_ALIAS_ENV
        ));
    }

    #[rstest]
    fn explicit_networked_without_url_is_rejected() {
        let env = mock_env(&[(EMBEDDED_ENV, "0")]);
        let err = database_settings_from_env(&env, BuildMode::Debug).expect_err("missing url");
        assert_eq!(err, DatabaseConfigError::MissingDatabaseUrl);
    }

    #[rstest]
    #[case(EMBEDDED_ENV, "maybe")]
    #[case(SSL_ENV, "sometimes")]
    #[case(MAX_CONNECTIONS_ENV, "0")]
    #[case(MAX_CONNECTIONS_ENV, "ten")]
    fn invalid_values_are_rejected(#[case] name: &'static str, #[case] value: &str) {
        let env = mock_env(&[(name, value), (DATABASE_URL_ENV, "postgres://db/hello")]);

        let err = database_settings_from_env(&env, BuildMode::Debug).expect_err("invalid value");

        assert!(matches!(
            err,
            DatabaseConfigError::InvalidEnv { name: got, .. } if got == name
        ));
    }

    #[rstest]
    #[case("postgres://db/hello", "postgres://db/hello?sslmode=require")]
    #[case("postgres://db/hello?application_name=x", "postgres://db/hello?application_name=x&sslmode=require")]
    #[case("postgres://db/hello?sslmode=verify-full", "postgres://db/hello?sslmode=verify-full")]
    fn ssl_marks_the_url(#[case] url: &str, #[case] expected: &str) {
        let env = mock_env(&[
            (DATABASE_URL_ENV, url),
            (SSL_ENV, "true"),
            (MAX_CONNECTIONS_ENV, "4"),
        ]);

        let settings = database_settings_from_env(&env, BuildMode::Release).expect("settings");

        assert!(settings.ssl);
        assert_eq!(settings.max_connections, 4);
        assert_eq!(
            settings.target,
            DatabaseTarget::Networked {
                url: expected.to_owned()
            }
        );
    }
}
