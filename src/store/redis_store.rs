use redis::cluster::ClusterClient;
use redis::{
    Client,
    Cmd,
    FromRedisValue,
};

use super::{
    KeyValueStore,
    RedisAddress,
};
use crate::error::{
    BackendError,
    StoreError,
};

/// Node topology the store talks to.
enum Topology {
    /// One Redis server
    Single(Client),
    /// Several nodes forming a Redis cluster
    Cluster(ClusterClient),
}

/// Blocking Redis store.
///
/// A connection is opened per request; timeouts are whatever the client
/// defaults to.
pub struct RedisStore {
    /// Client for the configured topology
    topology: Topology,
    /// Key prefix taken from the address (`namespace:`)
    namespace: Option<String>,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topology = match self.topology {
            Topology::Single(_) => "single",
            Topology::Cluster(_) => "cluster",
        };
        f.debug_struct("RedisStore")
            .field("topology", &topology)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl RedisStore {
    /// Creates a store from address specifications.
    ///
    /// No address means `localhost:6379/0`; more than one address configures a
    /// cluster. The namespace of the first address applies to every key.
    pub fn open<S: AsRef<str>>(addresses: &[S]) -> Result<Self, BackendError> {
        let mut parsed = addresses
            .iter()
            .map(|address| RedisAddress::parse(address.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            parsed.push(RedisAddress::default());
        }
        Self::from_addresses(&parsed)
    }

    /// Creates a store from already parsed addresses.
    pub fn from_addresses(addresses: &[RedisAddress]) -> Result<Self, BackendError> {
        let namespace = addresses.first().and_then(|a| a.namespace.clone());

        let topology = match addresses {
            [] => Topology::Single(Client::open(RedisAddress::default().connection_url())?),
            [single] => {
                tracing::debug!("Opening Redis store at {single}");
                Topology::Single(Client::open(single.connection_url())?)
            }
            nodes => {
                tracing::debug!("Opening Redis cluster with {} nodes", nodes.len());
                if nodes.iter().any(|node| node.db != 0) {
                    tracing::warn!("Redis cluster only supports db 0, ignoring configured db");
                }
                let urls: Vec<String> = nodes
                    .iter()
                    .map(|node| RedisAddress { db: 0, ..node.clone() }.connection_url())
                    .collect();
                Topology::Cluster(ClusterClient::new(urls)?)
            }
        };

        Ok(Self { topology, namespace })
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Runs one command on a fresh connection.
    fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, StoreError> {
        let value = match &self.topology {
            Topology::Single(client) => {
                let mut conn = client.get_connection()?;
                cmd.query(&mut conn)?
            }
            Topology::Cluster(client) => {
                let mut conn = client.get_connection()?;
                cmd.query(&mut conn)?
            }
        };
        Ok(value)
    }

    /// Applies the namespace to a key.
    fn namespaced_key(&self, key: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}:{key}"),
            None => key.to_string(),
        }
    }

    /// Removes the namespace from a key returned by the server.
    fn strip_namespace(&self, key: String) -> String {
        match &self.namespace {
            Some(namespace) => key
                .strip_prefix(namespace.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map_or_else(|| key.clone(), ToString::to_string),
            None => key,
        }
    }

    /// `KEYS` for a literal prefix.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{}*", escape_glob(&self.namespaced_key(prefix)));
        tracing::debug!("KEYS {pattern}");

        let keys: Vec<String> = self.query(redis::cmd("KEYS").arg(&pattern))?;
        Ok(keys.into_iter().map(|key| self.strip_namespace(key)).collect())
    }
}

/// Escapes glob metacharacters so the pattern matches the text literally.
fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = self.namespaced_key(key);
        tracing::debug!("GET {key}");

        self.query(redis::cmd("GET").arg(&key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = self.namespaced_key(key);
        tracing::debug!("SET {key} = {value}");

        self.query::<()>(redis::cmd("SET").arg(&key).arg(value))
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.keys_with_prefix(prefix)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.keys_with_prefix("")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("en.messages.", "en.messages.")]
    #[case("en.a*b", "en.a\\*b")]
    #[case("en.[x]?", "en.\\[x\\]\\?")]
    #[case("back\\slash", "back\\\\slash")]
    fn test_escape_glob(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_glob(input), expected);
    }

    // Opening a client does not connect, so these run without a server.
    #[googletest::test]
    fn test_namespace_from_first_address() {
        let store = RedisStore::open(&["localhost:6379/0/app"]).unwrap();

        expect_that!(store.namespace(), some(eq("app")));
        expect_that!(store.namespaced_key("en.a"), eq("app:en.a"));
        expect_that!(store.strip_namespace("app:en.a".to_string()), eq("en.a"));
    }

    #[googletest::test]
    fn test_without_namespace_keys_are_unchanged() {
        let store = RedisStore::open::<&str>(&[]).unwrap();

        expect_that!(store.namespace(), none());
        expect_that!(store.namespaced_key("en.a"), eq("en.a"));
        expect_that!(store.strip_namespace("en.a".to_string()), eq("en.a"));
    }

    #[googletest::test]
    fn test_multiple_addresses_build_cluster() {
        let store = RedisStore::open(&["localhost:7000", "localhost:7001"]).unwrap();

        expect_that!(format!("{store:?}"), contains_substring("cluster"));
    }

    /// Runs against the server in `I18N_REDIS_TEST_ADDRESS` (`host:port/db`,
    /// for example `localhost:6379/15`) and returns early when it is unset.
    #[googletest::test]
    fn test_live_server_commands_use_namespace() {
        let Ok(address) = std::env::var("I18N_REDIS_TEST_ADDRESS") else {
            return;
        };
        let namespace = format!("i18n-redis-test-{}", std::process::id());
        let store = RedisStore::open(&[format!("{address}/{namespace}")]).unwrap();
        let bare = RedisStore::open(&[address.as_str()]).unwrap();

        store.set("en.a*b.c", "\"x\"").unwrap();
        store.set("en.ab.c", "\"y\"").unwrap();
        store.set("fr.a", "1").unwrap();

        expect_that!(store.get("en.a*b.c").unwrap(), some(eq("\"x\"")));
        expect_that!(store.get("en.missing").unwrap(), none());
        expect_that!(
            bare.get(&format!("{namespace}:en.a*b.c")).unwrap(),
            some(eq("\"x\""))
        );
        expect_that!(store.scan_prefix("en.a*b.").unwrap(), elements_are![eq("en.a*b.c")]);
        let mut keys = store.keys().unwrap();
        keys.sort();
        expect_that!(keys, elements_are![eq("en.a*b.c"), eq("en.ab.c"), eq("fr.a")]);

        let namespaced: Vec<String> =
            bare.query(redis::cmd("KEYS").arg(format!("{namespace}:*"))).unwrap();
        if !namespaced.is_empty() {
            bare.query::<()>(redis::cmd("DEL").arg(&namespaced)).unwrap();
        }
    }

    #[googletest::test]
    fn test_invalid_address_is_rejected() {
        let result = RedisStore::open(&["localhost:notaport"]);

        expect_that!(matches!(result, Err(BackendError::InvalidAddress { .. })), eq(true));
    }
}
