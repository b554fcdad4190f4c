pub mod pizza;
pub mod restaurant;
pub mod restaurant_pizza;

use axum::{
    response::{Html, Json},
    routing::get,
    Router,
};
use utoipa::OpenApi;

use crate::catalog::Catalog;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api-docs/openapi.json", get(openapi))
        .merge(restaurant::router())
        .merge(pizza::router())
        .merge(restaurant_pizza::router())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html("<h1>Pizza Restaurants API</h1>")
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        restaurant::list_restaurants,
        restaurant::delete_all_restaurants,
        restaurant::get_restaurant,
        restaurant::delete_restaurant,
        pizza::list_pizzas,
        restaurant_pizza::create_restaurant_pizza,
    ),
    components(
        schemas(
            crate::serializer::Restaurant,
            crate::serializer::Pizza,
            crate::serializer::RestaurantOffering,
            crate::serializer::RestaurantDetails,
            crate::serializer::CreatedOffering,
            crate::serializer::CreateRestaurantPizzaRequest,
            crate::serializer::MessageResponse,
            crate::serializer::ApiErrorResponse,
            crate::serializer::ValidationErrorResponse
        )
    ),
    tags(
        (name = "restaurants", description = "Restaurant endpoints"),
        (name = "pizzas", description = "Pizza endpoints"),
        (name = "restaurant_pizzas", description = "Restaurant menu offerings")
    ),
    info(
        title = "Pizza Restaurants API",
        description = "Restaurants, pizzas and the prices restaurants offer them at",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
