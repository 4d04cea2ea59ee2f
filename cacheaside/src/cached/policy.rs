//! Write-back failure policy.

use std::fmt;

use tracing::warn;

use crate::error::CacheResult;

/// What to do when caching a freshly fetched entity fails.
///
/// The repository read already succeeded by the time the write-back runs, so
/// the choice is between surfacing the cache failure and handing the caller
/// the data anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteBackPolicy {
    /// Fail the whole call; the fetched entities are discarded.
    #[default]
    FailClosed,

    /// Return the fetched entities and log the cache error at `warn`.
    FailOpen,
}

impl WriteBackPolicy {
    /// Parse a policy name (`fail_closed` / `fail_open`, `-` also accepted).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_closed" => Some(WriteBackPolicy::FailClosed),
            "fail_open" => Some(WriteBackPolicy::FailOpen),
            _ => None,
        }
    }

    /// Config-file name of the policy.
    pub fn name(&self) -> &'static str {
        match self {
            WriteBackPolicy::FailClosed => "fail_closed",
            WriteBackPolicy::FailOpen => "fail_open",
        }
    }

    /// Settle the result of a write-back under this policy.
    pub(crate) fn settle(&self, written: CacheResult<()>) -> CacheResult<()> {
        match written {
            Ok(()) => Ok(()),
            Err(err) => match self {
                WriteBackPolicy::FailClosed => Err(err),
                WriteBackPolicy::FailOpen => {
                    warn!(error = %err, "Cache write-back failed, returning repository data");
                    Ok(())
                }
            },
        }
    }
}

impl fmt::Display for WriteBackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StoreError;
    use crate::error::CacheError;

    fn failed_write() -> CacheResult<()> {
        Err(CacheError::Store(StoreError::Connection("refused".to_string())))
    }

    #[test]
    fn test_default_is_fail_closed() {
        assert_eq!(WriteBackPolicy::default(), WriteBackPolicy::FailClosed);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            WriteBackPolicy::parse("fail_open"),
            Some(WriteBackPolicy::FailOpen)
        );
        assert_eq!(
            WriteBackPolicy::parse(" Fail-Closed "),
            Some(WriteBackPolicy::FailClosed)
        );
        assert_eq!(WriteBackPolicy::parse("retry"), None);
    }

    #[test]
    fn test_name_round_trips() {
        for policy in [WriteBackPolicy::FailClosed, WriteBackPolicy::FailOpen] {
            assert_eq!(WriteBackPolicy::parse(policy.name()), Some(policy));
        }
    }

    #[test]
    fn test_fail_closed_keeps_error() {
        assert!(WriteBackPolicy::FailClosed.settle(failed_write()).is_err());
    }

    #[test]
    fn test_fail_open_swallows_error() {
        assert!(WriteBackPolicy::FailOpen.settle(failed_write()).is_ok());
    }
}
