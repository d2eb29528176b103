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
        auth::{AdminLoginRequest, LoginRequest, LoginResponse, RegisterRequest, RotatePasswordRequest, UserResponse},
        feedback::{
            CreateInquiryRequest, CreateSuggestionRequest, DirectMessageRequest, InquiryList,
            ReplyInquiryRequest, SuggestionList,
        },
        orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{Inquiry, Order, Product, Suggestion},
    response::{ApiResponse, Meta},
    routes::{admin, auth, feedback, health, orders, params, products},
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
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        products::list_products,
        products::get_product,
        feedback::create_inquiry,
        feedback::create_suggestion,
        admin::admin_login,
        admin::admin_logout,
        admin::rotate_password,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::list_inquiries,
        admin::delete_inquiry,
        admin::reply_inquiry,
        admin::list_suggestions,
        admin::delete_suggestion,
        admin::send_message
    ),
    components(
        schemas(
            Order,
            Product,
            Inquiry,
            Suggestion,
            UserResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AdminLoginRequest,
            RotatePasswordRequest,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateInquiryRequest,
            CreateSuggestionRequest,
            ReplyInquiryRequest,
            DirectMessageRequest,
            InquiryList,
            SuggestionList,
            params::Pagination,
            params::OrderListQuery,
            params::ProductQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Inquiry>,
            ApiResponse<InquiryList>,
            ApiResponse<Suggestion>,
            ApiResponse<SuggestionList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and token login"),
        (name = "Orders", description = "Order submission and lifecycle"),
        (name = "Products", description = "Storefront catalog"),
        (name = "Feedback", description = "Inquiries and suggestions"),
        (name = "Admin", description = "Administration endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
