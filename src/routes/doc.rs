use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{AddressList, CreateAddressRequest, UpdateAddressRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddCartItemRequest, CartDetail, CartItemDetail, UpdateCartItemRequest},
        checkout::{
            CheckoutSessionRequest, CheckoutSessionResponse, GuestOrderRequest,
            GuestOrderResponse, OrderActionRequest, PaymentResult, ReconciliationEntry,
            ReconciliationList, ReconciliationReport,
        },
        collections::{CollectionList, CreateCollectionRequest, UpdateCollectionRequest},
        customers::{CustomerList, CustomerProfile, UpdateCustomerRequest},
        orders::{
            CancelledOrder, CreateOrderRequest, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
        reviews::{CreateReviewRequest, ReviewList},
    },
    models::{
        Address, CartItem, Collection, Customer, Order, OrderItem, PaymentStatus, Product,
        Promotion, Review, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        addresses, admin, auth, carts, checkout, collections, customers, health, orders, params,
        products, promotions, webhook,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_reviews,
        products::create_review,
        products::delete_review,
        collections::list_collections,
        collections::get_collection,
        collections::create_collection,
        collections::update_collection,
        collections::delete_collection,
        promotions::list_promotions,
        promotions::create_promotion,
        promotions::update_promotion,
        promotions::delete_promotion,
        carts::create_cart,
        carts::get_cart,
        carts::delete_cart,
        carts::add_item,
        carts::update_item,
        carts::remove_item,
        customers::list_customers,
        customers::me,
        customers::update_me,
        customers::get_customer,
        addresses::list_addresses,
        addresses::get_address,
        addresses::create_address,
        addresses::update_address,
        addresses::delete_address,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        checkout::create_checkout_session,
        checkout::payment_success,
        checkout::complete_order,
        checkout::cancel_order,
        checkout::guest_order,
        checkout::guest_checkout_session,
        checkout::guest_payment_success,
        webhook::stripe_webhook,
        admin::list_orders,
        admin::get_order,
        admin::update_order_status,
        admin::delete_order,
        admin::list_reconciliations,
        admin::run_reconciliations
    ),
    components(
        schemas(
            User,
            Customer,
            Product,
            Collection,
            Promotion,
            Review,
            CartItem,
            Order,
            OrderItem,
            Address,
            PaymentStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCollectionRequest,
            UpdateCollectionRequest,
            CollectionList,
            CreatePromotionRequest,
            UpdatePromotionRequest,
            PromotionList,
            CreateReviewRequest,
            ReviewList,
            AddCartItemRequest,
            UpdateCartItemRequest,
            CartItemDetail,
            CartDetail,
            UpdateCustomerRequest,
            CustomerProfile,
            CustomerList,
            CreateAddressRequest,
            UpdateAddressRequest,
            AddressList,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            CancelledOrder,
            CheckoutSessionRequest,
            CheckoutSessionResponse,
            OrderActionRequest,
            PaymentResult,
            GuestOrderRequest,
            GuestOrderResponse,
            ReconciliationEntry,
            ReconciliationList,
            ReconciliationReport,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::ProductSortBy,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartDetail>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PaymentResult>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "products", description = "Product catalog"),
        (name = "collections", description = "Product collections"),
        (name = "promotions", description = "Promotions"),
        (name = "reviews", description = "Product reviews"),
        (name = "carts", description = "Shopping carts"),
        (name = "customers", description = "Customer profiles"),
        (name = "addresses", description = "Shipping addresses"),
        (name = "orders", description = "Orders"),
        (name = "checkout", description = "Checkout and payment"),
        (name = "webhooks", description = "Payment processor webhooks"),
        (name = "admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds_with_all_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/webhook", "/api/guest-orders", "/api/admin/reconciliations/run"] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }
}
