//! Redis key-value backend.
//!
//! Wraps a `redis::aio::ConnectionManager`, which multiplexes commands over a
//! single connection and reconnects transparently. The manager is cheap to
//! clone, so every call works on its own handle and the store itself needs no
//! locking.
//!
//! Command mapping:
//!
//! | Operation  | Redis command                         |
//! |------------|---------------------------------------|
//! | `get`      | `GET key`                             |
//! | `get_many` | `MGET k1 k2 ...`                      |
//! | `set`      | `SET key value [PX ms]`               |
//! | `set_many` | pipelined `SET` (MSET has no expiry)  |
//!
//! Pipeline replies are read one by one, so a rejected `SET` fails only its
//! own entry in a batch.

use std::time::Duration;

use redis::aio::{ConnectionLike, ConnectionManager};
use redis::{Client, RedisError, Value};

use crate::cache::traits::{BoxFuture, KeyValueStore, StoreError, WriteOutcomes};

/// Redis key-value backend.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at the given URL (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(map_redis_error)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { manager })
    }

    fn set_cmd(key: &str, value: &[u8], ttl: Option<Duration>) -> redis::Cmd {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(px_millis(ttl));
        }
        cmd
    }
}

/// Expiry in milliseconds for `PX`: at least 1 (Redis rejects 0) and at most
/// `i64::MAX` (Redis rejects larger values).
fn px_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_millis().clamp(1, i64::MAX as u128);
    millis as u64
}

/// One outcome per pipelined `SET`. Error replies fail their own entry;
/// replies missing from a short response fail the remaining entries.
fn write_outcomes(replies: Vec<Value>, expected: usize) -> WriteOutcomes {
    let mut outcomes: WriteOutcomes = replies
        .into_iter()
        .take(expected)
        .map(|reply| reply.extract_error().map(|_| ()).map_err(map_redis_error))
        .collect();
    while outcomes.len() < expected {
        outcomes.push(Err(StoreError::Command(
            "no reply for pipelined SET".to_string(),
        )));
    }
    outcomes
}

/// Split transport failures from rejected commands.
fn map_redis_error(err: RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Command(err.to_string())
    }
}

impl KeyValueStore for RedisStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, StoreError>> {
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let value: Option<Vec<u8>> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
            Ok(value)
        })
    }

    fn get_many<'a>(
        &'a self,
        keys: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Option<Vec<u8>>>, StoreError>> {
        Box::pin(async move {
            if keys.is_empty() {
                return Ok(Vec::new());
            }
            let mut conn = self.manager.clone();
            let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
                .arg(keys)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
            Ok(values)
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let _: () = Self::set_cmd(key, &value, ttl)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
            Ok(())
        })
    }

    fn set_many(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Option<Duration>,
    ) -> BoxFuture<'_, Result<WriteOutcomes, StoreError>> {
        Box::pin(async move {
            if entries.is_empty() {
                return Ok(Vec::new());
            }
            let mut pipe = redis::pipe();
            for (key, value) in &entries {
                pipe.add_command(Self::set_cmd(key, value, ttl));
            }

            let mut conn = self.manager.clone();
            let count = entries.len();
            match conn.req_packed_commands(&pipe, 0, count).await {
                Ok(replies) => Ok(write_outcomes(replies, count)),
                Err(err) => match map_redis_error(err) {
                    StoreError::Connection(msg) => Err(StoreError::Connection(msg)),
                    // No per-command replies came back, so the failure cannot
                    // be attributed to a single entry.
                    rejected => Ok(entries.iter().map(|_| Err(rejected.clone())).collect()),
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::{ErrorKind, ServerError};
    use std::io;

    fn packed(ttl: Option<Duration>) -> String {
        let cmd = RedisStore::set_cmd("user:1", b"{}", ttl);
        String::from_utf8(cmd.get_packed_command()).unwrap()
    }

    #[test]
    fn test_set_without_ttl_has_no_px() {
        assert_eq!(
            packed(None),
            "*3\r\n$3\r\nSET\r\n$6\r\nuser:1\r\n$2\r\n{}\r\n"
        );
    }

    #[test]
    fn test_set_with_ttl_uses_px_millis() {
        assert_eq!(
            packed(Some(Duration::from_secs(90))),
            "*5\r\n$3\r\nSET\r\n$6\r\nuser:1\r\n$2\r\n{}\r\n$2\r\nPX\r\n$5\r\n90000\r\n"
        );
    }

    #[test]
    fn test_sub_millisecond_ttl_rounds_up() {
        assert!(packed(Some(Duration::from_micros(500))).ends_with("$2\r\nPX\r\n$1\r\n1\r\n"));
    }

    #[test]
    fn test_px_millis_is_clamped() {
        assert_eq!(px_millis(Duration::ZERO), 1);
        assert_eq!(px_millis(Duration::from_millis(250)), 250);
        assert_eq!(px_millis(Duration::MAX), i64::MAX as u64);
        assert_eq!(px_millis(Duration::from_secs(u64::MAX / 2)), i64::MAX as u64);
    }

    #[test]
    fn test_io_failures_are_connection_errors() {
        let err = RedisError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(matches!(map_redis_error(err), StoreError::Connection(_)));
    }

    #[test]
    fn test_rejected_commands_are_command_errors() {
        let err = RedisError::from((ErrorKind::ResponseError, "WRONGTYPE"));
        assert!(matches!(map_redis_error(err), StoreError::Command(_)));
    }

    #[test]
    fn test_write_outcomes_fail_only_rejected_entries() {
        let replies = vec![
            Value::Okay,
            Value::ServerError(ServerError::ExtensionError {
                code: "OOM".to_string(),
                detail: Some("command not allowed when used memory > 'maxmemory'".to_string()),
            }),
            Value::Okay,
        ];

        let outcomes = write_outcomes(replies, 3);

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1], Err(StoreError::Command(_))));
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn test_write_outcomes_short_reply_fails_the_rest() {
        let outcomes = write_outcomes(vec![Value::Okay], 3);

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_err());
    }
}
