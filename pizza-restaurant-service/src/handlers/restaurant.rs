use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::serializer::{
    serialize_restaurant, serialize_restaurant_details, ApiErrorResponse, MessageResponse,
    Restaurant, RestaurantDetails,
};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants",
            get(list_restaurants).delete(delete_all_restaurants),
        )
        .route(
            "/restaurants/{id}",
            get(get_restaurant).delete(delete_restaurant),
        )
}

// Ids that are not integers cannot name a stored restaurant.
fn parse_restaurant_id(id: &str) -> Result<i32, ApiError> {
    id.parse().map_err(|_| ApiError::RestaurantNotFound)
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "List of restaurants", body = [Restaurant]),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let restaurants = state.catalog.list_restaurants().await?;

    Ok(Json(restaurants.iter().map(serialize_restaurant).collect()))
}

#[utoipa::path(
    delete,
    path = "/restaurants",
    responses(
        (status = 200, description = "All restaurants and their offerings deleted", body = MessageResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_all_restaurants(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.catalog.delete_all_restaurants().await?;
    info!(removed, "Deleted all restaurants");

    Ok(Json(MessageResponse {
        message: "All restaurants deleted".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    responses(
        (status = 200, description = "Restaurant with its offerings", body = RestaurantDetails),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantDetails>, ApiError> {
    let restaurant_id = parse_restaurant_id(&id)?;
    let (restaurant, offerings) = state.catalog.get_restaurant(restaurant_id).await?;

    Ok(Json(serialize_restaurant_details(&restaurant, &offerings)))
}

#[utoipa::path(
    delete,
    path = "/restaurants/{id}",
    responses(
        (status = 204, description = "Restaurant and its offerings deleted"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = i32, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let restaurant_id = parse_restaurant_id(&id)?;
    let offerings = state.catalog.delete_restaurant(restaurant_id).await?;
    info!(restaurant_id, offerings, "Deleted restaurant");

    Ok(StatusCode::NO_CONTENT)
}
