//! Backing repository capability.
//!
//! The cache-aside layer only needs two queries from the authoritative source:
//! fetch one entity by id and fetch several by id. Anything that can answer
//! those implements [`Repository`]; query functions without a repository
//! object can be adapted with [`FnRepository`].

use std::future::Future;
use std::sync::Arc;

/// Find-by-id capability of an authoritative data source.
///
/// # Contract
///
/// - `find_one` returning `Ok(None)` means "not found", not a failure.
/// - `find_many` may return fewer entities than ids requested; the remainder
///   are absent. Results need not line up positionally with `ids`.
pub trait Repository<T>: Send + Sync {
    /// Error type of the underlying source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one entity by id.
    fn find_one(&self, id: i64) -> impl Future<Output = Result<Option<T>, Self::Error>> + Send;

    /// Fetch the entities that exist among `ids`.
    fn find_many(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send;
}

impl<T, R> Repository<T> for Arc<R>
where
    R: Repository<T>,
{
    type Error = R::Error;

    fn find_one(&self, id: i64) -> impl Future<Output = Result<Option<T>, Self::Error>> + Send {
        (**self).find_one(id)
    }

    fn find_many(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send {
        (**self).find_many(ids)
    }
}

/// Repository built from two async functions.
///
/// # Example
///
/// ```ignore
/// let repo = FnRepository::new(
///     move |id| { let db = db.clone(); async move { db.user(id).await } },
///     move |ids| { let db = db2.clone(); async move { db.users(&ids).await } },
/// );
/// ```
pub struct FnRepository<F1, F2> {
    find_one: F1,
    find_many: F2,
}

impl<F1, F2> FnRepository<F1, F2> {
    /// Wrap the single and batch query functions.
    pub fn new(find_one: F1, find_many: F2) -> Self {
        Self {
            find_one,
            find_many,
        }
    }
}

impl<T, E, F1, Fut1, F2, Fut2> Repository<T> for FnRepository<F1, F2>
where
    F1: Fn(i64) -> Fut1 + Send + Sync,
    Fut1: Future<Output = Result<Option<T>, E>> + Send,
    F2: Fn(Vec<i64>) -> Fut2 + Send + Sync,
    Fut2: Future<Output = Result<Vec<T>, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn find_one(&self, id: i64) -> impl Future<Output = Result<Option<T>, E>> + Send {
        (self.find_one)(id)
    }

    fn find_many(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<T>, E>> + Send {
        (self.find_many)(ids.to_vec())
    }
}
