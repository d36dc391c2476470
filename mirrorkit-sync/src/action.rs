//! The action vocabulary: typed requests and the results that answer them.
//!
//! Every request kind has exactly one result kind. A result echoes the
//! request it answers, so callers correlate by [`RequestId`].

use crate::error::ErrorDescriptor;
use mirrorkit_model::{
    EntityKind, Product, ProductCategory, ProductReview, ProductShippingClass, ProductSorting,
    ProductVariation, SitePlugin,
};
use mirrorkit_types::{RequestId, ScopeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which slice of a remote collection to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchFilter {
    pub offset: u32,
    /// `None` uses the configured page size for the kind.
    pub page_size: Option<u32>,
    /// Restrict the fetch to these remote ids.
    pub remote_ids: Option<Vec<i64>>,
    /// Narrowing parameters passed through to the remote (`status`, `product`, ...).
    pub params: BTreeMap<String, String>,
    /// Remote ordering as `field:direction`, e.g. `title:asc`.
    pub sort: Option<String>,
}

impl FetchFilter {
    /// First page of the full listing.
    pub fn first_page() -> Self {
        Self::default()
    }

    /// Page starting at `offset` of the full listing.
    pub fn page(offset: u32) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_remote_ids(mut self, ids: Vec<i64>) -> Self {
        self.remote_ids = Some(ids);
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, sorting: ProductSorting) -> Self {
        let (field, direction) = sorting.remote_params();
        self.sort = Some(format!("{field}:{direction}"));
        self
    }

    /// A fresh listing is the authoritative first page of the whole
    /// collection: offset 0, no id subset and no narrowing parameters.
    /// Ordering does not narrow.
    pub fn is_fresh_listing(&self) -> bool {
        self.offset == 0 && self.remote_ids.is_none() && self.params.is_empty()
    }
}

/// Fetch a page of a scope's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub id: RequestId,
    pub scope: ScopeId,
    pub filter: FetchFilter,
}

impl FetchRequest {
    pub fn new(scope: ScopeId) -> Self {
        Self::with_filter(scope, FetchFilter::first_page())
    }

    pub fn with_filter(scope: ScopeId, filter: FetchFilter) -> Self {
        Self {
            id: RequestId::new(),
            scope,
            filter,
        }
    }
}

/// Fetch one entity by its remote id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOneRequest {
    pub id: RequestId,
    pub scope: ScopeId,
    pub remote_id: i64,
}

impl FetchOneRequest {
    pub fn new(scope: ScopeId, remote_id: i64) -> Self {
        Self {
            id: RequestId::new(),
            scope,
            remote_id,
        }
    }
}

/// Search a site's products on the remote. Matches are handed back in the
/// result only; the local mirror is never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub id: RequestId,
    pub scope: ScopeId,
    pub query: String,
    pub filter: FetchFilter,
}

impl SearchRequest {
    pub fn new(scope: ScopeId, query: impl Into<String>) -> Self {
        Self::with_filter(scope, query, FetchFilter::first_page())
    }

    pub fn with_filter(scope: ScopeId, query: impl Into<String>, filter: FetchFilter) -> Self {
        Self {
            id: RequestId::new(),
            scope,
            query: query.into(),
            filter,
        }
    }
}

/// Send a changed or new entity to the remote. The local mirror is only
/// written with what the remote confirms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutateRequest<E> {
    pub id: RequestId,
    pub scope: ScopeId,
    pub entity: E,
}

impl<E> MutateRequest<E> {
    pub fn new(scope: ScopeId, entity: E) -> Self {
        Self {
            id: RequestId::new(),
            scope,
            entity,
        }
    }
}

/// Payload of every result action.
///
/// On success `error` is `None`. On a remote failure `data` is `None` and the
/// local store was not touched. On a persistence failure `data` still holds
/// what the remote returned, so reconciliation can be retried without
/// fetching again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<Q, T> {
    pub request: Q,
    pub data: Option<T>,
    pub rows_affected: usize,
    pub can_load_more: bool,
    pub error: Option<ErrorDescriptor>,
}

impl<Q, T> Outcome<Q, T> {
    pub fn success(request: Q, data: Option<T>, rows_affected: usize) -> Self {
        Self {
            request,
            data,
            rows_affected,
            can_load_more: false,
            error: None,
        }
    }

    pub fn failure(request: Q, error: ErrorDescriptor) -> Self {
        Self {
            request,
            data: None,
            rows_affected: 0,
            can_load_more: false,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub type ListOutcome<E> = Outcome<FetchRequest, Vec<E>>;
pub type FetchOneOutcome<E> = Outcome<FetchOneRequest, E>;
pub type MutateOutcome<E> = Outcome<MutateRequest<E>, E>;
pub type SearchOutcome<E> = Outcome<SearchRequest, Vec<E>>;

macro_rules! action_vocabulary {
    ($(
        $entity:ident {
            $request:ident($request_ty:ty) = $request_name:literal,
            $result:ident($result_ty:ty) = $result_name:literal $(,)?
        }
    )*) => {
        /// A request or result travelling through the dispatcher.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "payload")]
        pub enum Action {
            $(
                #[serde(rename = $request_name)]
                $request($request_ty),
                #[serde(rename = $result_name)]
                $result($result_ty),
            )*
        }

        /// The tag of an [`Action`], used for subscriptions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ActionKind {
            $(
                #[serde(rename = $request_name)]
                $request,
                #[serde(rename = $result_name)]
                $result,
            )*
        }

        impl ActionKind {
            /// Every kind, requests immediately followed by their result.
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$request, ActionKind::$result,)*];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(
                        ActionKind::$request => $request_name,
                        ActionKind::$result => $result_name,
                    )*
                }
            }

            pub const fn is_request(self) -> bool {
                match self {
                    $(
                        ActionKind::$request => true,
                        ActionKind::$result => false,
                    )*
                }
            }

            /// The result kind answering this request kind.
            pub const fn result_kind(self) -> Option<ActionKind> {
                match self {
                    $(
                        ActionKind::$request => Some(ActionKind::$result),
                        ActionKind::$result => None,
                    )*
                }
            }

            pub const fn entity_kind(self) -> EntityKind {
                match self {
                    $(ActionKind::$request | ActionKind::$result => EntityKind::$entity,)*
                }
            }
        }

        impl Action {
            pub fn kind(&self) -> ActionKind {
                match self {
                    $(
                        Action::$request(_) => ActionKind::$request,
                        Action::$result(_) => ActionKind::$result,
                    )*
                }
            }

            /// The id of the request, echoed by results.
            pub fn request_id(&self) -> RequestId {
                match self {
                    $(
                        Action::$request(r) => r.id,
                        Action::$result(o) => o.request.id,
                    )*
                }
            }

            pub fn scope(&self) -> ScopeId {
                match self {
                    $(
                        Action::$request(r) => r.scope,
                        Action::$result(o) => o.request.scope,
                    )*
                }
            }

            /// Builds the error result answering this request. `None` for results.
            pub fn fault_result(&self, error: ErrorDescriptor) -> Option<Action> {
                match self {
                    $(
                        Action::$request(r) => Some(Action::$result(Outcome::failure(r.clone(), error))),
                        Action::$result(_) => None,
                    )*
                }
            }

            /// The error carried by a result. `None` for requests and successes.
            pub fn error(&self) -> Option<&ErrorDescriptor> {
                match self {
                    $(
                        Action::$request(_) => None,
                        Action::$result(o) => o.error.as_ref(),
                    )*
                }
            }

            /// Rows the answered request changed in the local store.
            pub fn rows_affected(&self) -> Option<usize> {
                match self {
                    $(
                        Action::$request(_) => None,
                        Action::$result(o) => Some(o.rows_affected),
                    )*
                }
            }
        }
    };
}

action_vocabulary! {
    SitePlugin {
        FetchSitePlugins(FetchRequest) = "FETCH_SITE_PLUGINS",
        FetchedSitePlugins(ListOutcome<SitePlugin>) = "FETCHED_SITE_PLUGINS",
    }
    SitePlugin {
        UpdateSitePlugin(MutateRequest<SitePlugin>) = "UPDATE_SITE_PLUGIN",
        UpdatedSitePlugin(MutateOutcome<SitePlugin>) = "UPDATED_SITE_PLUGIN",
    }
    Product {
        FetchProducts(FetchRequest) = "FETCH_PRODUCTS",
        FetchedProducts(ListOutcome<Product>) = "FETCHED_PRODUCTS",
    }
    Product {
        FetchSingleProduct(FetchOneRequest) = "FETCH_SINGLE_PRODUCT",
        FetchedSingleProduct(FetchOneOutcome<Product>) = "FETCHED_SINGLE_PRODUCT",
    }
    Product {
        UpdateProduct(MutateRequest<Product>) = "UPDATE_PRODUCT",
        UpdatedProduct(MutateOutcome<Product>) = "UPDATED_PRODUCT",
    }
    Product {
        SearchProducts(SearchRequest) = "SEARCH_PRODUCTS",
        SearchedProducts(SearchOutcome<Product>) = "SEARCHED_PRODUCTS",
    }
    ProductVariation {
        FetchProductVariations(FetchRequest) = "FETCH_PRODUCT_VARIATIONS",
        FetchedProductVariations(ListOutcome<ProductVariation>) = "FETCHED_PRODUCT_VARIATIONS",
    }
    ProductShippingClass {
        FetchProductShippingClassList(FetchRequest) = "FETCH_PRODUCT_SHIPPING_CLASS_LIST",
        FetchedProductShippingClassList(ListOutcome<ProductShippingClass>) = "FETCHED_PRODUCT_SHIPPING_CLASS_LIST",
    }
    ProductShippingClass {
        FetchSingleProductShippingClass(FetchOneRequest) = "FETCH_SINGLE_PRODUCT_SHIPPING_CLASS",
        FetchedSingleProductShippingClass(FetchOneOutcome<ProductShippingClass>) = "FETCHED_SINGLE_PRODUCT_SHIPPING_CLASS",
    }
    ProductReview {
        FetchProductReviews(FetchRequest) = "FETCH_PRODUCT_REVIEWS",
        FetchedProductReviews(ListOutcome<ProductReview>) = "FETCHED_PRODUCT_REVIEWS",
    }
    ProductReview {
        FetchSingleProductReview(FetchOneRequest) = "FETCH_SINGLE_PRODUCT_REVIEW",
        FetchedSingleProductReview(FetchOneOutcome<ProductReview>) = "FETCHED_SINGLE_PRODUCT_REVIEW",
    }
    ProductReview {
        UpdateProductReviewStatus(MutateRequest<ProductReview>) = "UPDATE_PRODUCT_REVIEW_STATUS",
        UpdatedProductReviewStatus(MutateOutcome<ProductReview>) = "UPDATED_PRODUCT_REVIEW_STATUS",
    }
    ProductCategory {
        FetchProductCategories(FetchRequest) = "FETCH_PRODUCT_CATEGORIES",
        FetchedProductCategories(ListOutcome<ProductCategory>) = "FETCHED_PRODUCT_CATEGORIES",
    }
    ProductCategory {
        AddProductCategory(MutateRequest<ProductCategory>) = "ADD_PRODUCT_CATEGORY",
        AddedProductCategory(MutateOutcome<ProductCategory>) = "ADDED_PRODUCT_CATEGORY",
    }
}

impl Action {
    pub fn is_request(&self) -> bool {
        self.kind().is_request()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
