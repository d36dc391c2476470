//! Reconciliation and action dispatch for mirrorkit.
//!
//! Keeps a local mirror of remote collections (site plugins, products and
//! their variations, reviews, categories, shipping classes) consistent with the remote API, and reports every
//! fetch or mutation through a typed request/result protocol.
//!
//! # Architecture
//!
//! - **Action**: the request and result vocabulary, one result per request
//! - **Dispatcher**: delivers actions in issue order and guarantees every
//!   request a terminal result
//! - **Reconciler**: applies remote data to the local store by upsert-merge
//!   or replace-all
//! - **Remote**: the contract of the remote collaborator
//! - **Facades**: one store per entity kind, binding requests to remote
//!   calls and reconciliation
//! - **Hub**: builds the above at startup and tears it down at shutdown
//!
//! ## Request flow
//!
//! 1. A caller dispatches a request action (`FETCH_PRODUCTS`)
//! 2. The owning facade calls the remote collaborator off the dispatch thread
//! 3. On success the reconciler updates the local store
//! 4. The facade dispatches the result (`FETCHED_PRODUCTS`) to all subscribers
//!
//! # Example
//!
//! ```
//! use mirrorkit_sync::{FetchFilter, ReconcileStrategy};
//!
//! let first_page = FetchFilter::first_page();
//! assert_eq!(ReconcileStrategy::for_listing(&first_page), ReconcileStrategy::ReplaceAll);
//!
//! let second_page = FetchFilter::page(25);
//! assert_eq!(ReconcileStrategy::for_listing(&second_page), ReconcileStrategy::UpsertMerge);
//! ```

pub mod action;
mod config;
pub mod dispatcher;
mod error;
pub mod facade;
mod hub;
pub mod reconciler;
pub mod remote;

pub use action::{
    Action, ActionKind, FetchFilter, FetchOneOutcome, FetchOneRequest, FetchRequest, ListOutcome,
    MutateOutcome, MutateRequest, Outcome, SearchOutcome, SearchRequest,
};
pub use config::MirrorConfig;
pub use dispatcher::{Dispatcher, Handler, SubscriptionId};
pub use error::{
    DispatchFault, ErrorDescriptor, ErrorKind, RemoteError, RemoteErrorCode, SyncError, SyncResult,
};
pub use facade::{
    FacadeContext, ProductCategoryStore, ProductReviewStore, ProductShippingClassStore, ProductStore,
    ProductVariationStore, SitePluginStore, StoreFacade,
};
pub use hub::{MirrorHub, MirrorHubBuilder};
pub use reconciler::{ReconcileStrategy, Reconciler};
pub use remote::{RemoteCollection, RemotePage};
