use diesel::prelude::*;
use diesel::insert_into;

use crate::catalog::{insert_pizza, insert_restaurant, Catalog, CatalogError};
use crate::models::NewOffering;
use crate::schema::{pizzas, restaurant_pizzas, restaurants};

const RESTAURANTS: [(&str, &str); 3] = [
    ("Karen's Pizza Shack", "address1"),
    ("Sanjay's Pizza", "address2"),
    ("Kiki's Pizza", "address3"),
];

const PIZZAS: [(&str, &str); 3] = [
    ("Emma", "Dough, Tomato Sauce, Cheese"),
    ("Geri", "Dough, Tomato Sauce, Cheese, Pepperoni"),
    ("Melanie", "Dough, Sauce, Ricotta, Red peppers, Mustard"),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub restaurants: usize,
    pub pizzas: usize,
    pub offerings: usize,
}

/// Replaces the whole catalog with the sample restaurants and pizzas; the
/// n-th restaurant offers the n-th pizza.
pub async fn seed(catalog: &Catalog) -> Result<SeedSummary, CatalogError> {
    catalog
        .interact(|conn| {
            conn.immediate_transaction::<_, CatalogError, _>(|conn| {
                diesel::delete(restaurant_pizzas::table).execute(conn)?;
                diesel::delete(restaurants::table).execute(conn)?;
                diesel::delete(pizzas::table).execute(conn)?;

                let restaurants = RESTAURANTS
                    .iter()
                    .map(|(name, address)| insert_restaurant(conn, name, address))
                    .collect::<Result<Vec<_>, _>>()?;
                let pizzas = PIZZAS
                    .iter()
                    .map(|(name, ingredients)| insert_pizza(conn, name, ingredients))
                    .collect::<Result<Vec<_>, _>>()?;

                let offerings = restaurants
                    .iter()
                    .zip(&pizzas)
                    .map(|(restaurant, pizza)| NewOffering {
                        price: 1.0,
                        restaurant_id: restaurant.id,
                        pizza_id: pizza.id,
                    })
                    .collect::<Vec<_>>();
                let offerings = insert_into(restaurant_pizzas::table)
                    .values(&offerings)
                    .execute(conn)?;

                Ok(SeedSummary {
                    restaurants: restaurants.len(),
                    pizzas: pizzas.len(),
                    offerings,
                })
            })
        })
        .await
}
