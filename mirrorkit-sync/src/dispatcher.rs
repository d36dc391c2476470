//! Ordered, in-process action bus.
//!
//! Actions are delivered one at a time, in the order they were dispatched.
//! A dispatch issued while a delivery is running (from a handler, or from a
//! remote call finishing on another thread) is queued and delivered by the
//! thread already draining the queue, after the current delivery completes.
//!
//! Each request kind has at most one *owner*, the store facade that answers
//! it. Observers may subscribe to any kind. The dispatcher guarantees every
//! request a terminal result: if no owner is registered, or the owner fails
//! while handling the request, it queues an error result itself.

use crate::action::{Action, ActionKind};
use crate::error::{DispatchFault, ErrorDescriptor, SyncError, SyncResult};
use mirrorkit_types::RequestId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// A subscriber callback. Returning `Err` (or panicking) marks a fault.
pub type Handler = Arc<dyn Fn(&Action) -> Result<(), DispatchFault> + Send + Sync>;

/// Returned by the subscribe calls; pass to [`Dispatcher::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Owner,
    Observer,
}

struct Subscription {
    id: SubscriptionId,
    role: Role,
    kinds: HashSet<ActionKind>,
    handler: Handler,
}

/// The action dispatcher. Construct one at startup and share it by `Arc`.
pub struct Dispatcher {
    subscriptions: RwLock<Vec<Subscription>>,
    queue: Mutex<VecDeque<Action>>,
    delivering: AtomicBool,
    next_id: AtomicU64,
    waiters: Mutex<HashMap<RequestId, oneshot::Sender<Action>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            queue: Mutex::new(VecDeque::new()),
            delivering: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            waiters: Mutex::new(HashMap::new()),
        }
    }

    /// Observes one action kind.
    pub fn subscribe<F>(&self, kind: ActionKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Action) -> Result<(), DispatchFault> + Send + Sync + 'static,
    {
        self.subscribe_many(&[kind], handler)
    }

    /// Observes several action kinds with one handler. Pass
    /// [`ActionKind::ALL`] to see everything.
    pub fn subscribe_many<F>(&self, kinds: &[ActionKind], handler: F) -> SubscriptionId
    where
        F: Fn(&Action) -> Result<(), DispatchFault> + Send + Sync + 'static,
    {
        self.insert(Role::Observer, kinds, Arc::new(handler))
    }

    /// Registers the handler that answers the given request kinds.
    ///
    /// Fails if one of the kinds already has an owner, or is a result kind.
    pub fn register_owner(&self, kinds: &[ActionKind], handler: Handler) -> SyncResult<SubscriptionId> {
        if let Some(kind) = kinds.iter().find(|k| !k.is_request()) {
            return Err(DispatchFault::new(format!("{kind} is not a request kind")).into());
        }
        let mut subscriptions = self.write_subscriptions();
        let taken = subscriptions
            .iter()
            .filter(|s| s.role == Role::Owner)
            .flat_map(|s| s.kinds.iter())
            .find(|k| kinds.contains(k));
        if let Some(kind) = taken {
            return Err(SyncError::Dispatch(DispatchFault::new(format!(
                "{kind} already has an owner"
            ))));
        }
        let id = self.next_subscription_id();
        subscriptions.push(Subscription {
            id,
            role: Role::Owner,
            kinds: kinds.iter().copied().collect(),
            handler,
        });
        Ok(id)
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.write_subscriptions();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        before != subscriptions.len()
    }

    /// Number of live subscriptions of either role.
    pub fn subscription_count(&self) -> usize {
        self.read_subscriptions().len()
    }

    /// Whether some owner answers `kind`.
    pub fn has_owner(&self, kind: ActionKind) -> bool {
        self.read_subscriptions()
            .iter()
            .any(|s| s.role == Role::Owner && s.kinds.contains(&kind))
    }

    /// Delivers `action` to every subscriber of its kind.
    ///
    /// If no delivery is running, this delivers on the calling thread and
    /// returns once the queue is empty. Otherwise the action is queued behind
    /// the running delivery.
    pub fn dispatch(&self, action: Action) {
        self.lock_queue().push_back(action);
        self.drain();
    }

    /// Dispatches a request and waits for the result answering it.
    pub async fn dispatch_and_wait(&self, action: Action) -> SyncResult<Action> {
        if !action.is_request() {
            return Err(DispatchFault::new(format!("{} is not a request", action.kind())).into());
        }
        let (tx, rx) = oneshot::channel();
        self.lock_waiters().insert(action.request_id(), tx);
        self.dispatch(action);
        rx.await.map_err(|_| SyncError::ChannelClosed)
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert(&self, role: Role, kinds: &[ActionKind], handler: Handler) -> SubscriptionId {
        let id = self.next_subscription_id();
        self.write_subscriptions().push(Subscription {
            id,
            role,
            kinds: kinds.iter().copied().collect(),
            handler,
        });
        id
    }

    fn drain(&self) {
        loop {
            if self
                .delivering
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                return;
            }
            loop {
                let next = self.lock_queue().pop_front();
                match next {
                    Some(action) => self.deliver(action),
                    None => break,
                }
            }
            self.delivering.store(false, Ordering::Release);
            // Another thread may have queued between the last pop and the store.
            if self.lock_queue().is_empty() {
                return;
            }
        }
    }

    fn deliver(&self, action: Action) {
        let kind = action.kind();
        let targets: Vec<(Role, Handler)> = self
            .read_subscriptions()
            .iter()
            .filter(|s| s.kinds.contains(&kind))
            .map(|s| (s.role, Arc::clone(&s.handler)))
            .collect();

        debug!(
            kind = %kind,
            request_id = %action.request_id(),
            scope = %action.scope(),
            subscribers = targets.len(),
            "delivering action"
        );

        let mut owned = false;
        let mut owner_fault: Option<DispatchFault> = None;
        for (role, handler) in &targets {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&action)))
                .unwrap_or_else(|payload| Err(DispatchFault::from_panic(payload)));
            if *role == Role::Owner {
                owned = true;
            }
            if let Err(fault) = outcome {
                error!(kind = %kind, request_id = %action.request_id(), error = %fault, "subscriber fault");
                if *role == Role::Owner && owner_fault.is_none() {
                    owner_fault = Some(fault);
                }
            }
        }

        if action.is_request() {
            let fault = match owner_fault {
                Some(fault) => Some(fault),
                None if !owned => {
                    warn!(kind = %kind, request_id = %action.request_id(), "request has no owner");
                    Some(DispatchFault::new(format!("no store handles {kind}")))
                }
                None => None,
            };
            if let Some(result) = fault.and_then(|f| action.fault_result(ErrorDescriptor::from(f))) {
                self.lock_queue().push_back(result);
            }
        } else if let Some(waiter) = self.lock_waiters().remove(&action.request_id()) {
            // The waiter may have given up; nothing to do then.
            let _ = waiter.send(action);
        }
    }

    // Handlers run outside these locks, so poisoning only means a panic
    // elsewhere; the protected data is still consistent.

    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<Action>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_waiters(&self) -> MutexGuard<'_, HashMap<RequestId, oneshot::Sender<Action>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_subscriptions(&self) -> std::sync::RwLockReadGuard<'_, Vec<Subscription>> {
        self.subscriptions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_subscriptions(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Subscription>> {
        self.subscriptions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
