//! Remote collaborator contract.
//!
//! The network client lives outside this crate. Store facades only need a
//! way to fetch a page, fetch one entity, and push a mutation, each returning
//! already-deserialized entities or a [`RemoteError`].

use crate::action::FetchFilter;
use crate::error::RemoteError;
use async_trait::async_trait;
use mirrorkit_model::MirrorEntity;
use mirrorkit_types::ScopeId;

/// One page of a remote listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePage<E> {
    pub items: Vec<E>,
    /// The remote has more entities past this page.
    pub can_load_more: bool,
}

impl<E> RemotePage<E> {
    pub fn new(items: Vec<E>, can_load_more: bool) -> Self {
        Self { items, can_load_more }
    }

    /// A page that is the whole listing.
    pub fn complete(items: Vec<E>) -> Self {
        Self::new(items, false)
    }

    /// A full page suggests there is more to load.
    pub fn sized(items: Vec<E>, page_size: u32) -> Self {
        let can_load_more = page_size > 0 && items.len() >= page_size as usize;
        Self::new(items, can_load_more)
    }
}

/// Remote API for one entity kind.
#[async_trait]
pub trait RemoteCollection<E: MirrorEntity>: Send + Sync {
    /// Fetches one page. `filter.page_size` is always set by the caller.
    async fn fetch_collection(&self, scope: ScopeId, filter: &FetchFilter) -> Result<RemotePage<E>, RemoteError>;

    /// Fetches one entity. `Ok(None)` means the remote has no such entity.
    async fn fetch_one(&self, scope: ScopeId, remote_id: i64) -> Result<Option<E>, RemoteError>;

    /// Sends a changed or new entity; returns the remote's confirmed copy.
    async fn mutate(&self, scope: ScopeId, entity: E) -> Result<E, RemoteError>;
}

/// Scripted remote for tests.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use std::time::Duration;

    struct Script<E> {
        pages: VecDeque<Result<RemotePage<E>, RemoteError>>,
        singles: VecDeque<Result<Option<E>, RemoteError>>,
        mutations: VecDeque<Result<E, RemoteError>>,
        echo_mutations: bool,
        panic_on_fetch: bool,
        delay: Option<Duration>,
        fetch_calls: Vec<(ScopeId, FetchFilter)>,
        fetch_one_calls: Vec<(ScopeId, i64)>,
        mutate_calls: Vec<(ScopeId, E)>,
    }

    /// A remote that answers from queues of scripted responses.
    ///
    /// Each call pops the next response of its kind. An empty queue answers
    /// with a generic remote error, except that mutations are echoed back
    /// when [`MockRemote::echo_mutations`] is set. Clones share the script.
    pub struct MockRemote<E> {
        script: Arc<Mutex<Script<E>>>,
    }

    impl<E> Clone for MockRemote<E> {
        fn clone(&self) -> Self {
            Self {
                script: Arc::clone(&self.script),
            }
        }
    }

    impl<E: MirrorEntity> Default for MockRemote<E> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E: MirrorEntity> MockRemote<E> {
        pub fn new() -> Self {
            Self {
                script: Arc::new(Mutex::new(Script {
                    pages: VecDeque::new(),
                    singles: VecDeque::new(),
                    mutations: VecDeque::new(),
                    echo_mutations: false,
                    panic_on_fetch: false,
                    delay: None,
                    fetch_calls: Vec::new(),
                    fetch_one_calls: Vec::new(),
                    mutate_calls: Vec::new(),
                })),
            }
        }

        fn script(&self) -> MutexGuard<'_, Script<E>> {
            self.script.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Queues a successful page.
        pub fn push_page(&self, items: Vec<E>, can_load_more: bool) -> &Self {
            self.script().pages.push_back(Ok(RemotePage::new(items, can_load_more)));
            self
        }

        /// Queues a failed page fetch.
        pub fn push_fetch_error(&self, error: RemoteError) -> &Self {
            self.script().pages.push_back(Err(error));
            self
        }

        /// Queues a single-entity answer.
        pub fn push_single(&self, result: Result<Option<E>, RemoteError>) -> &Self {
            self.script().singles.push_back(result);
            self
        }

        /// Queues a mutation answer.
        pub fn push_mutation(&self, result: Result<E, RemoteError>) -> &Self {
            self.script().mutations.push_back(result);
            self
        }

        /// Confirm unscripted mutations by returning the entity unchanged.
        pub fn echo_mutations(&self) -> &Self {
            self.script().echo_mutations = true;
            self
        }

        /// Panic inside the next page fetch.
        pub fn panic_on_next_fetch(&self) -> &Self {
            self.script().panic_on_fetch = true;
            self
        }

        /// Delay every call, to keep requests in flight.
        pub fn with_delay(&self, delay: Duration) -> &Self {
            self.script().delay = Some(delay);
            self
        }

        pub fn fetch_calls(&self) -> Vec<(ScopeId, FetchFilter)> {
            self.script().fetch_calls.clone()
        }

        pub fn fetch_one_calls(&self) -> Vec<(ScopeId, i64)> {
            self.script().fetch_one_calls.clone()
        }

        pub fn mutate_calls(&self) -> Vec<(ScopeId, E)> {
            self.script().mutate_calls.clone()
        }

        async fn pause(&self) {
            let delay = self.script().delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn unscripted(call: &str) -> RemoteError {
        RemoteError::generic(format!("no scripted response for {call}"))
    }

    #[async_trait]
    impl<E: MirrorEntity> RemoteCollection<E> for MockRemote<E> {
        async fn fetch_collection(&self, scope: ScopeId, filter: &FetchFilter) -> Result<RemotePage<E>, RemoteError> {
            self.pause().await;
            let mut script = self.script();
            script.fetch_calls.push((scope, filter.clone()));
            if std::mem::take(&mut script.panic_on_fetch) {
                drop(script);
                panic!("scripted remote panic");
            }
            script.pages.pop_front().unwrap_or_else(|| Err(unscripted("fetch_collection")))
        }

        async fn fetch_one(&self, scope: ScopeId, remote_id: i64) -> Result<Option<E>, RemoteError> {
            self.pause().await;
            let mut script = self.script();
            script.fetch_one_calls.push((scope, remote_id));
            script.singles.pop_front().unwrap_or_else(|| Err(unscripted("fetch_one")))
        }

        async fn mutate(&self, scope: ScopeId, entity: E) -> Result<E, RemoteError> {
            self.pause().await;
            let mut script = self.script();
            script.mutate_calls.push((scope, entity.clone()));
            match script.mutations.pop_front() {
                Some(result) => result,
                None if script.echo_mutations => Ok(entity),
                None => Err(unscripted("mutate")),
            }
        }
    }
}
