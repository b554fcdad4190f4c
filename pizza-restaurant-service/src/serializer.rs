use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::models;

#[derive(Debug, Serialize, ToSchema)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Pizza {
    pub id: i32,
    pub ingredients: String,
    pub name: String,
}

/// Menu entry as listed under a restaurant: the pizza is expanded, the
/// restaurant is referenced only by id.
#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantOffering {
    pub id: i32,
    pub pizza: Pizza,
    pub pizza_id: i32,
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
    pub restaurant_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantDetails {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub offerings: Vec<RestaurantOffering>,
}

/// Newly created menu entry: both the pizza and the restaurant are expanded.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedOffering {
    pub id: i32,
    pub pizza: Pizza,
    pub pizza_id: i32,
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
    pub restaurant: Restaurant,
    pub restaurant_id: i32,
}

/// Expected create-offering payload. Bodies are read as raw JSON so that
/// malformed input is reported as a validation failure.
#[derive(Debug, ToSchema)]
pub struct CreateRestaurantPizzaRequest {
    /// Between 1 and 30 inclusive
    pub price: f64,
    pub pizza_id: i32,
    pub restaurant_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    /// One entry per failed check
    pub errors: Vec<String>,
}

// Whole prices go out as JSON integers.
fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if price.fract() == 0.0 && price.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*price as i64)
    } else {
        serializer.serialize_f64(*price)
    }
}

pub fn serialize_restaurant(restaurant: &models::Restaurant) -> Restaurant {
    Restaurant {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
    }
}

pub fn serialize_pizza(pizza: &models::Pizza) -> Pizza {
    Pizza {
        id: pizza.id,
        ingredients: pizza.ingredients.clone(),
        name: pizza.name.clone(),
    }
}

pub fn serialize_restaurant_details(
    restaurant: &models::Restaurant,
    offerings: &[(models::Offering, models::Pizza)],
) -> RestaurantDetails {
    RestaurantDetails {
        id: restaurant.id,
        name: restaurant.name.clone(),
        address: restaurant.address.clone(),
        offerings: offerings
            .iter()
            .map(|(offering, pizza)| RestaurantOffering {
                id: offering.id,
                pizza: serialize_pizza(pizza),
                pizza_id: offering.pizza_id,
                price: offering.price,
                restaurant_id: offering.restaurant_id,
            })
            .collect(),
    }
}

pub fn serialize_created_offering(
    offering: &models::Offering,
    pizza: &models::Pizza,
    restaurant: &models::Restaurant,
) -> CreatedOffering {
    CreatedOffering {
        id: offering.id,
        pizza: serialize_pizza(pizza),
        pizza_id: offering.pizza_id,
        price: offering.price,
        restaurant: serialize_restaurant(restaurant),
        restaurant_id: offering.restaurant_id,
    }
}
