use mirrorkit_model::{EntityKind, Product, ProductSorting};
use mirrorkit_sync::{
    Action, ActionKind, DispatchFault, ErrorDescriptor, ErrorKind, FetchFilter, FetchOneRequest, FetchRequest,
    MutateRequest, RemoteError, RemoteErrorCode, SearchRequest,
};
use mirrorkit_types::ScopeId;
use pretty_assertions::assert_eq;

const SITE: ScopeId = ScopeId::new(7);

// ── Vocabulary ───────────────────────────────────────────────────

#[test]
fn every_request_has_one_result_kind() {
    let requests: Vec<ActionKind> = ActionKind::ALL.iter().copied().filter(|k| k.is_request()).collect();
    assert_eq!(requests.len(), 14);
    for request in requests {
        let result = request.result_kind().unwrap();
        assert!(!result.is_request());
        assert_eq!(result.result_kind(), None);
        assert_eq!(result.entity_kind(), request.entity_kind());
    }
}

#[test]
fn kind_names_match_the_wire_names() {
    assert_eq!(ActionKind::FetchProducts.as_str(), "FETCH_PRODUCTS");
    assert_eq!(ActionKind::UpdatedProductReviewStatus.to_string(), "UPDATED_PRODUCT_REVIEW_STATUS");
    assert_eq!(ActionKind::AddProductCategory.entity_kind(), EntityKind::ProductCategory);
    assert_eq!(ActionKind::SearchProducts.result_kind(), Some(ActionKind::SearchedProducts));
    assert_eq!(ActionKind::FetchProductVariations.entity_kind(), EntityKind::ProductVariation);
    assert_eq!(
        ActionKind::FetchedSingleProductShippingClass.as_str(),
        "FETCHED_SINGLE_PRODUCT_SHIPPING_CLASS"
    );
}

#[test]
fn search_request_carries_its_query() {
    let action = Action::SearchProducts(SearchRequest::new(SITE, "mug"));
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], "SEARCH_PRODUCTS");
    assert_eq!(json["payload"]["query"], "mug");
    assert!(action.is_request());
    assert_eq!(action.scope(), SITE);
}

#[test]
fn action_serializes_with_type_tag() {
    let request = FetchRequest::new(SITE);
    let action = Action::FetchProducts(request.clone());
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], "FETCH_PRODUCTS");
    assert_eq!(json["payload"]["scope"], 7);

    let back: Action = serde_json::from_value(json).unwrap();
    assert_eq!(back, action);
}

// ── Fault results ────────────────────────────────────────────────

#[test]
fn fault_result_echoes_the_request() {
    let request = FetchOneRequest::new(SITE, 42);
    let action = Action::FetchSingleProduct(request.clone());
    let result = action
        .fault_result(ErrorDescriptor::from(DispatchFault::new("no store")))
        .unwrap();

    assert_eq!(result.kind(), ActionKind::FetchedSingleProduct);
    assert_eq!(result.request_id(), request.id);
    assert_eq!(result.scope(), SITE);
    assert_eq!(result.rows_affected(), Some(0));
    let Action::FetchedSingleProduct(outcome) = result else {
        panic!("wrong result kind");
    };
    assert!(outcome.data.is_none());
    assert_eq!(outcome.request, request);
    assert_eq!(outcome.error.unwrap().kind, ErrorKind::DispatchFault);
}

#[test]
fn results_have_no_fault_result() {
    let request = MutateRequest::new(SITE, Product::new(1, "Hoodie"));
    let result = Action::UpdateProduct(request)
        .fault_result(ErrorDescriptor::persistence("disk full"))
        .unwrap();
    assert!(result.fault_result(ErrorDescriptor::persistence("again")).is_none());
    assert!(result.error().unwrap().is_persistence());
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn remote_codes_parse_leniently() {
    assert_eq!("duplicate_sku".parse::<RemoteErrorCode>().unwrap(), RemoteErrorCode::DuplicateSku);
    assert_eq!(" INVALID_REVIEW_ID ".parse::<RemoteErrorCode>().unwrap(), RemoteErrorCode::InvalidReviewId);
    assert_eq!("woocommerce_rest_oops".parse::<RemoteErrorCode>().unwrap(), RemoteErrorCode::Generic);
}

#[test]
fn remote_error_keeps_its_code() {
    let descriptor = ErrorDescriptor::from(RemoteError::new(RemoteErrorCode::Unauthorized, "token expired"));
    assert_eq!(descriptor.remote_code(), Some(RemoteErrorCode::Unauthorized));
    assert!(!descriptor.is_persistence());
    assert_eq!(descriptor.to_string(), "remote (UNAUTHORIZED): token expired");
}

// ── Filters ──────────────────────────────────────────────────────

#[test]
fn only_unnarrowed_first_page_is_fresh() {
    assert!(FetchFilter::first_page().is_fresh_listing());
    assert!(FetchFilter::first_page().with_page_size(50).is_fresh_listing());
    assert!(FetchFilter::first_page().sorted_by(ProductSorting::DateDesc).is_fresh_listing());

    assert!(!FetchFilter::page(25).is_fresh_listing());
    assert!(!FetchFilter::first_page().with_remote_ids(vec![1, 2]).is_fresh_listing());
    assert!(!FetchFilter::first_page().with_param("status", "hold").is_fresh_listing());
}

#[test]
fn sorting_maps_to_remote_order() {
    let filter = FetchFilter::first_page().sorted_by(ProductSorting::TitleDesc);
    assert_eq!(filter.sort.as_deref(), Some("title:desc"));
}
