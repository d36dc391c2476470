//! Store facades: one per entity kind.
//!
//! A facade owns the request kinds of its entity. On a request it calls the
//! remote collaborator off the dispatch thread, hands confirmed data to the
//! [`Reconciler`] on the blocking pool, and dispatches the result action once
//! the store reflects it. A remote failure never reaches the store.
//!
//! Facades also expose synchronous reads over the local mirror.

mod category;
mod plugin;
mod product;
mod review;
mod shipping_class;
mod variation;

pub use category::ProductCategoryStore;
pub use plugin::SitePluginStore;
pub use product::ProductStore;
pub use review::ProductReviewStore;
pub use shipping_class::ProductShippingClassStore;
pub use variation::ProductVariationStore;

use crate::action::{
    Action, ActionKind, FetchOneOutcome, FetchOneRequest, FetchRequest, ListOutcome, MutateOutcome,
    MutateRequest, Outcome, SearchOutcome, SearchRequest,
};
use crate::config::MirrorConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{DispatchFault, ErrorDescriptor};
use crate::reconciler::{ReconcileStrategy, Reconciler};
use crate::remote::RemoteCollection;
use futures::FutureExt;
use mirrorkit_model::{EntityKind, MirrorEntity};
use mirrorkit_storage::{LocalStore, StorageResult};
use mirrorkit_types::ScopeId;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, error, warn};

/// A component answering the request actions of one entity kind.
pub trait StoreFacade: Send + Sync {
    fn name(&self) -> &'static str;

    /// Request kinds this facade owns.
    fn handled_kinds(&self) -> &'static [ActionKind];

    /// Starts handling a request. Must not block: remote and store work is
    /// spawned, and the result action is dispatched when it completes.
    fn on_action(&self, action: &Action) -> Result<(), DispatchFault>;
}

#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

/// An accepted request that has not been answered yet.
///
/// If it is dropped unanswered, because its task was cancelled or never ran
/// on a runtime that is gone, it dispatches the request's error result
/// itself. Either way the request leaves the in-flight count only after its
/// result was dispatched.
struct PendingRequest {
    in_flight: Arc<InFlight>,
    dispatcher: Arc<Dispatcher>,
    request: Option<Action>,
}

impl PendingRequest {
    fn enter(in_flight: &Arc<InFlight>, dispatcher: &Arc<Dispatcher>, request: &Action) -> Self {
        in_flight.count.fetch_add(1, Ordering::AcqRel);
        Self {
            in_flight: Arc::clone(in_flight),
            dispatcher: Arc::clone(dispatcher),
            request: Some(request.clone()),
        }
    }

    fn answer(mut self, result: Action) {
        let request_id = result.request_id();
        debug!(
            kind = %result.kind(),
            %request_id,
            elapsed_ms = ?request_id.age().map(|age| age.as_millis()),
            "request answered"
        );
        self.dispatcher.dispatch(result);
        self.request = None;
    }

    fn fail(mut self, fault: DispatchFault) {
        self.dispatch_fault(fault);
    }

    fn dispatch_fault(&mut self, fault: DispatchFault) {
        if let Some(result) = self.request.take().and_then(|r| r.fault_result(fault.into())) {
            self.dispatcher.dispatch(result);
        }
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if let Some(request) = &self.request {
            warn!(
                kind = %request.kind(),
                request_id = %request.request_id(),
                "request task cancelled before answering"
            );
            self.dispatch_fault(DispatchFault::new("request task cancelled"));
        }
        if self.in_flight.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}

/// State shared by every facade of a hub.
pub struct FacadeContext<S> {
    dispatcher: Arc<Dispatcher>,
    reconciler: Reconciler<S>,
    runtime: Handle,
    config: Arc<MirrorConfig>,
    in_flight: Arc<InFlight>,
    closed: Arc<AtomicBool>,
}

impl<S> Clone for FacadeContext<S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            reconciler: self.reconciler.clone(),
            runtime: self.runtime.clone(),
            config: Arc::clone(&self.config),
            in_flight: Arc::clone(&self.in_flight),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<S: LocalStore> FacadeContext<S> {
    pub fn new(dispatcher: Arc<Dispatcher>, store: Arc<S>, runtime: Handle, config: Arc<MirrorConfig>) -> Self {
        Self {
            dispatcher,
            reconciler: Reconciler::new(store),
            runtime,
            config,
            in_flight: Arc::new(InFlight::default()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn store(&self) -> &Arc<S> {
        self.reconciler.store()
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Stops accepting requests. Running requests still complete.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Requests started but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Resolves once no request is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    fn ensure_open(&self, store: &str) -> Result<(), DispatchFault> {
        if self.is_closed() {
            Err(DispatchFault::new(format!("{store} store is shut down")))
        } else {
            Ok(())
        }
    }

    /// Runs `work` on the runtime and dispatches the action it produces. A
    /// panic inside `work`, or the task being dropped before it finishes,
    /// is turned into the request's error result.
    fn spawn_request<F>(&self, request: &Action, work: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let pending = PendingRequest::enter(&self.in_flight, &self.dispatcher, request);
        let kind = request.kind();
        let request_id = request.request_id();
        self.runtime.spawn(async move {
            match AssertUnwindSafe(work).catch_unwind().await {
                Ok(result) => pending.answer(result),
                Err(payload) => {
                    let fault = DispatchFault::from_panic(payload);
                    error!(%kind, %request_id, error = %fault, "request task panicked");
                    pending.fail(fault);
                }
            }
        });
    }

    /// Runs store work on the blocking pool.
    async fn reconcile_blocking<T, F>(&self, kind: EntityKind, scope: ScopeId, work: F) -> Result<T, ErrorDescriptor>
    where
        T: Send + 'static,
        F: FnOnce(&Reconciler<S>) -> StorageResult<T> + Send + 'static,
    {
        let reconciler = self.reconciler.clone();
        let descriptor = match self.runtime.spawn_blocking(move || work(&reconciler)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => ErrorDescriptor::from(&e),
            Err(e) => ErrorDescriptor::persistence(format!("store task failed: {e}")),
        };
        error!(%kind, %scope, error = %descriptor, "local mirror not updated");
        Err(descriptor)
    }

    async fn fetch_listing<E: MirrorEntity>(
        &self,
        remote: &dyn RemoteCollection<E>,
        request: FetchRequest,
        default_page_size: u32,
    ) -> ListOutcome<E> {
        let scope = request.scope;
        let mut filter = request.filter.clone();
        filter.page_size.get_or_insert(default_page_size);

        let page = match remote.fetch_collection(scope, &filter).await {
            Ok(page) => page,
            Err(e) => {
                warn!(kind = %E::KIND, %scope, request_id = %request.id, error = %e, "remote fetch failed");
                return Outcome::failure(request, e.into());
            }
        };

        let strategy = ReconcileStrategy::for_listing(&filter);
        let items: Vec<E> = page.items.into_iter().map(|e| e.in_scope(scope)).collect();
        let batch = items.clone();
        let reconciled = self
            .reconcile_blocking(E::KIND, scope, move |r| r.reconcile(scope, strategy, &batch))
            .await;
        finish(request, Some(items), page.can_load_more, reconciled)
    }

    /// Fetches the matches of a search. They are returned as they are and
    /// never reconciled, so `rows_affected` is always 0.
    async fn search<E: MirrorEntity>(
        &self,
        remote: &dyn RemoteCollection<E>,
        request: SearchRequest,
        default_page_size: u32,
    ) -> SearchOutcome<E> {
        let scope = request.scope;
        let mut filter = request.filter.clone().with_param("search", request.query.clone());
        filter.page_size.get_or_insert(default_page_size);

        match remote.fetch_collection(scope, &filter).await {
            Ok(page) => {
                let matches: Vec<E> = page.items.into_iter().map(|e| e.in_scope(scope)).collect();
                finish(request, Some(matches), page.can_load_more, Ok(0))
            }
            Err(e) => {
                warn!(kind = %E::KIND, %scope, request_id = %request.id, error = %e, "remote search failed");
                Outcome::failure(request, e.into())
            }
        }
    }

    async fn fetch_single<E: MirrorEntity>(
        &self,
        remote: &dyn RemoteCollection<E>,
        request: FetchOneRequest,
    ) -> FetchOneOutcome<E> {
        let scope = request.scope;
        let found = match remote.fetch_one(scope, request.remote_id).await {
            Ok(found) => found.map(|e| e.in_scope(scope)),
            Err(e) => {
                warn!(kind = %E::KIND, %scope, remote_id = request.remote_id, error = %e, "remote fetch failed");
                return Outcome::failure(request, e.into());
            }
        };
        let entity = found.clone();
        let reconciled = self
            .reconcile_blocking(E::KIND, scope, move |r| r.upsert_single(scope, entity.as_ref()))
            .await;
        finish(request, found, false, reconciled)
    }

    /// Pushes a mutation and, once the remote confirms it, applies the
    /// confirmed entity with `apply`. Nothing is written before confirmation.
    async fn mutate<E, F>(&self, remote: &dyn RemoteCollection<E>, request: MutateRequest<E>, apply: F) -> MutateOutcome<E>
    where
        E: MirrorEntity,
        F: FnOnce(&Reconciler<S>, ScopeId, &E) -> StorageResult<usize> + Send + 'static,
    {
        let scope = request.scope;
        let confirmed = match remote.mutate(scope, request.entity.clone()).await {
            Ok(confirmed) => confirmed.in_scope(scope),
            Err(e) => {
                warn!(kind = %E::KIND, %scope, request_id = %request.id, error = %e, "remote mutation failed");
                return Outcome::failure(request, e.into());
            }
        };
        let entity = confirmed.clone();
        let reconciled = self
            .reconcile_blocking(E::KIND, scope, move |r| apply(r, scope, &entity))
            .await;
        finish(request, Some(confirmed), false, reconciled)
    }
}

fn finish<Q, T>(
    request: Q,
    data: Option<T>,
    can_load_more: bool,
    reconciled: Result<usize, ErrorDescriptor>,
) -> Outcome<Q, T> {
    let (rows_affected, error) = match reconciled {
        Ok(rows) => (rows, None),
        Err(e) => (0, Some(e)),
    };
    Outcome {
        request,
        data,
        rows_affected,
        can_load_more,
        error,
    }
}
