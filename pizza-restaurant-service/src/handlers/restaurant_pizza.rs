use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::serializer::{
    serialize_created_offering, CreateRestaurantPizzaRequest, CreatedOffering,
    ValidationErrorResponse,
};
use crate::validation::{OfferingRequest, ValidationError};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/restaurant_pizzas", post(create_restaurant_pizza))
}

#[utoipa::path(
    post,
    path = "/restaurant_pizzas",
    request_body = CreateRestaurantPizzaRequest,
    responses(
        (status = 201, description = "Offering created", body = CreatedOffering),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
    ),
    tag = "restaurant_pizzas"
)]
#[instrument(skip(state, payload))]
pub async fn create_restaurant_pizza(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedOffering>), ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(%rejection, "Unreadable offering payload");
        ValidationError::MalformedBody
    })?;
    let request = OfferingRequest::from_json(body)?;

    let (offering, pizza, restaurant) = state.catalog.create_offering(request).await?;
    info!(
        offering_id = offering.id,
        restaurant_id = restaurant.id,
        pizza_id = pizza.id,
        "Created offering"
    );

    Ok((
        StatusCode::CREATED,
        Json(serialize_created_offering(&offering, &pizza, &restaurant)),
    ))
}
