use std::fmt;
use std::str::FromStr;

use crate::error::BackendError;

/// A Redis node address: `[redis://][:password@]host[:port][/db][/namespace]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisAddress {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
    /// Prefix applied to every key as `namespace:key`.
    pub namespace: Option<String>,
    /// `rediss://` scheme.
    pub tls: bool,
}

impl Default for RedisAddress {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            db: 0,
            password: None,
            namespace: None,
            tls: false,
        }
    }
}

impl RedisAddress {
    pub const DEFAULT_HOST: &'static str = "localhost";
    pub const DEFAULT_PORT: u16 = 6379;

    /// Parses an address specification. Missing parts take their defaults.
    ///
    /// # Examples
    /// ```
    /// use i18n_redis_backend::store::RedisAddress;
    ///
    /// let address = RedisAddress::parse("example.com:23682/1/theplaylist").unwrap();
    /// assert_eq!(address.host, "example.com");
    /// assert_eq!(address.port, 23682);
    /// assert_eq!(address.db, 1);
    /// assert_eq!(address.namespace.as_deref(), Some("theplaylist"));
    /// ```
    pub fn parse(address: &str) -> Result<Self, BackendError> {
        let invalid = |message: &str| BackendError::InvalidAddress {
            address: address.to_string(),
            message: message.to_string(),
        };

        let mut result = Self::default();
        let mut rest = address.trim();

        if let Some(stripped) = rest.strip_prefix("rediss://") {
            result.tls = true;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("redis://") {
            rest = stripped;
        } else if rest.contains("://") {
            return Err(invalid("unsupported scheme"));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));

        let host_port = match authority.rsplit_once('@') {
            Some((userinfo, host_port)) => {
                let password = userinfo.split_once(':').map_or(userinfo, |(_, p)| p);
                if !password.is_empty() {
                    result.password = Some(password.to_string());
                }
                host_port
            }
            None => authority,
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid("port must be a number"))?;
                (host, Some(port))
            }
            None => (host_port, None),
        };
        if !host.is_empty() {
            result.host = host.to_string();
        }
        if let Some(port) = port {
            result.port = port;
        }

        let (db, namespace) = path.split_once('/').unwrap_or((path, ""));
        if !db.is_empty() {
            result.db = db
                .parse::<i64>()
                .ok()
                .filter(|db| *db >= 0)
                .ok_or_else(|| invalid("db must be a non-negative number"))?;
        }
        let namespace = namespace.trim_end_matches('/');
        if !namespace.is_empty() {
            result.namespace = Some(namespace.to_string());
        }

        Ok(result)
    }

    /// Connection URL understood by the `redis` client (namespace excluded).
    #[must_use]
    pub fn connection_url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let auth = self.password.as_ref().map_or_else(String::new, |p| format!(":{p}@"));
        format!("{scheme}://{auth}{}:{}/{}", self.host, self.port, self.db)
    }
}

impl FromStr for RedisAddress {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RedisAddress {
    /// Prints the address without its password.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.db)?;
        if let Some(namespace) = &self.namespace {
            write!(f, "/{namespace}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", "localhost", 6379, 0, None)]
    #[case("example.com", "example.com", 6379, 0, None)]
    #[case("example.com:23682", "example.com", 23682, 0, None)]
    #[case("example.com:23682/1", "example.com", 23682, 1, None)]
    #[case("example.com:23682/1/theplaylist", "example.com", 23682, 1, Some("theplaylist"))]
    #[case("redis://localhost:6380/2", "localhost", 6380, 2, None)]
    #[case(":6380", "localhost", 6380, 0, None)]
    fn test_parse(
        #[case] input: &str,
        #[case] host: &str,
        #[case] port: u16,
        #[case] db: i64,
        #[case] namespace: Option<&str>,
    ) {
        let address = RedisAddress::parse(input).unwrap();

        assert_eq!(address.host, host);
        assert_eq!(address.port, port);
        assert_eq!(address.db, db);
        assert_eq!(address.namespace.as_deref(), namespace);
    }

    #[rstest]
    #[case("example.com:port")]
    #[case("example.com:6379/one")]
    #[case("example.com:6379/-1")]
    #[case("http://example.com")]
    fn test_parse_invalid(#[case] input: &str) {
        let result = RedisAddress::parse(input);

        assert!(matches!(result, Err(BackendError::InvalidAddress { .. })), "{result:?}");
    }

    #[googletest::test]
    fn test_password_is_kept_out_of_display() {
        let address = RedisAddress::parse("redis://:secret@cache:6379/3/app").unwrap();

        expect_that!(address.password.as_deref(), some(eq("secret")));
        expect_that!(address.connection_url(), eq("redis://:secret@cache:6379/3"));
        expect_that!(address.to_string(), eq("cache:6379/3/app"));
    }

    #[googletest::test]
    fn test_tls_scheme() {
        let address: RedisAddress = "rediss://secure.example.com".parse().unwrap();

        expect_that!(address.tls, eq(true));
        expect_that!(address.connection_url(), eq("rediss://secure.example.com:6379/0"));
    }
}
