use diesel::prelude::*;
use diesel::r2d2::PoolError;
use diesel::{insert_into, SqliteConnection};
use diesel_migrations::MigrationHarness;
use tracing::{debug, info};

use crate::models::{NewOffering, NewPizza, NewRestaurant, Offering, Pizza, Restaurant};
use crate::schema::{pizzas, restaurant_pizzas, restaurants};
use crate::validation::{check_price, reference_id, OfferingRequest, ValidationError};
use crate::{establish_pool, DbPool, MIGRATIONS};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Restaurant {0} not found")]
    RestaurantNotFound(i32),
    #[error("Invalid offering: {0:?}")]
    Validation(Vec<ValidationError>),
}

/// Storage backend for restaurants, pizzas and their offerings.
///
/// Cloning is cheap; clones share the same connection pool. Writes run in
/// `BEGIN IMMEDIATE` transactions.
#[derive(Clone)]
pub struct Catalog {
    pool: DbPool,
}

impl Catalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, CatalogError> {
        Ok(Self::new(establish_pool(database_url, pool_size)?))
    }

    pub fn run_migrations(&self) -> Result<(), CatalogError> {
        let mut pooled = self.pool.get()?;
        let conn: &mut SqliteConnection = &mut pooled;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| CatalogError::Migration(e.to_string()))?;
        for version in applied {
            info!(%version, "Applied migration");
        }
        Ok(())
    }

    /// Runs `f` with a pooled connection on the blocking thread pool.
    pub(crate) async fn interact<F, T>(&self, f: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, CatalogError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }

    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, CatalogError> {
        self.interact(|conn| {
            Ok(restaurants::table
                .select(Restaurant::as_select())
                .load(conn)?)
        })
        .await
    }

    /// Removes every restaurant together with all offerings. Returns the
    /// number of restaurants removed.
    pub async fn delete_all_restaurants(&self) -> Result<usize, CatalogError> {
        self.interact(|conn| {
            conn.immediate_transaction::<_, CatalogError, _>(|conn| {
                let offerings = diesel::delete(restaurant_pizzas::table).execute(conn)?;
                let removed = diesel::delete(restaurants::table).execute(conn)?;
                debug!(restaurants = removed, offerings, "Deleted all restaurants");
                Ok(removed)
            })
        })
        .await
    }

    pub async fn get_restaurant(
        &self,
        restaurant_id: i32,
    ) -> Result<(Restaurant, Vec<(Offering, Pizza)>), CatalogError> {
        self.interact(move |conn| {
            conn.transaction::<_, CatalogError, _>(|conn| {
                let restaurant = find_restaurant(conn, restaurant_id)?
                    .ok_or(CatalogError::RestaurantNotFound(restaurant_id))?;

                let offerings = Offering::belonging_to(&restaurant)
                    .inner_join(pizzas::table)
                    .select((Offering::as_select(), Pizza::as_select()))
                    .order(restaurant_pizzas::id)
                    .load::<(Offering, Pizza)>(conn)?;

                Ok((restaurant, offerings))
            })
        })
        .await
    }

    /// Removes one restaurant and its offerings as a single transaction.
    /// Returns the number of offerings removed with it.
    pub async fn delete_restaurant(&self, restaurant_id: i32) -> Result<usize, CatalogError> {
        self.interact(move |conn| {
            conn.immediate_transaction::<_, CatalogError, _>(|conn| {
                let restaurant = find_restaurant(conn, restaurant_id)?
                    .ok_or(CatalogError::RestaurantNotFound(restaurant_id))?;

                let offerings = diesel::delete(
                    restaurant_pizzas::table
                        .filter(restaurant_pizzas::restaurant_id.eq(restaurant.id)),
                )
                .execute(conn)?;
                diesel::delete(restaurants::table.find(restaurant.id)).execute(conn)?;

                debug!(restaurant_id, offerings, "Deleted restaurant");
                Ok(offerings)
            })
        })
        .await
    }

    pub async fn list_pizzas(&self) -> Result<Vec<Pizza>, CatalogError> {
        self.interact(|conn| Ok(pizzas::table.select(Pizza::as_select()).load(conn)?))
            .await
    }

    /// Validates `request` against the stored pizzas and restaurants and
    /// inserts the offering, all inside one transaction.
    ///
    /// Every failing check is reported, in the order price, pizza, restaurant.
    pub async fn create_offering(
        &self,
        request: OfferingRequest,
    ) -> Result<(Offering, Pizza, Restaurant), CatalogError> {
        self.interact(move |conn| {
            conn.immediate_transaction::<_, CatalogError, _>(|conn| {
                let mut errors = Vec::new();

                let price = check_price(&request.price)
                    .map_err(|e| errors.push(e))
                    .ok();

                let pizza = match reference_id(&request.pizza_id) {
                    Some(id) => find_pizza(conn, id)?,
                    None => None,
                };
                if pizza.is_none() {
                    errors.push(ValidationError::UnknownPizza);
                }

                let restaurant = match reference_id(&request.restaurant_id) {
                    Some(id) => find_restaurant(conn, id)?,
                    None => None,
                };
                if restaurant.is_none() {
                    errors.push(ValidationError::UnknownRestaurant);
                }

                let (Some(price), Some(pizza), Some(restaurant)) = (price, pizza, restaurant)
                else {
                    return Err(CatalogError::Validation(errors));
                };

                let offering = insert_into(restaurant_pizzas::table)
                    .values(&NewOffering {
                        price,
                        restaurant_id: restaurant.id,
                        pizza_id: pizza.id,
                    })
                    .returning(Offering::as_returning())
                    .get_result(conn)?;

                Ok((offering, pizza, restaurant))
            })
        })
        .await
    }

    pub async fn insert_restaurant(
        &self,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Restaurant, CatalogError> {
        let (name, address) = (name.into(), address.into());
        self.interact(move |conn| insert_restaurant(conn, &name, &address))
            .await
    }

    pub async fn insert_pizza(
        &self,
        name: impl Into<String>,
        ingredients: impl Into<String>,
    ) -> Result<Pizza, CatalogError> {
        let (name, ingredients) = (name.into(), ingredients.into());
        self.interact(move |conn| insert_pizza(conn, &name, &ingredients))
            .await
    }
}

fn find_restaurant(
    conn: &mut SqliteConnection,
    restaurant_id: i32,
) -> Result<Option<Restaurant>, CatalogError> {
    Ok(restaurants::table
        .find(restaurant_id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?)
}

fn find_pizza(conn: &mut SqliteConnection, pizza_id: i32) -> Result<Option<Pizza>, CatalogError> {
    Ok(pizzas::table
        .find(pizza_id)
        .select(Pizza::as_select())
        .first(conn)
        .optional()?)
}

pub(crate) fn insert_restaurant(
    conn: &mut SqliteConnection,
    name: &str,
    address: &str,
) -> Result<Restaurant, CatalogError> {
    Ok(insert_into(restaurants::table)
        .values(&NewRestaurant { name, address })
        .returning(Restaurant::as_returning())
        .get_result(conn)?)
}

pub(crate) fn insert_pizza(
    conn: &mut SqliteConnection,
    name: &str,
    ingredients: &str,
) -> Result<Pizza, CatalogError> {
    Ok(insert_into(pizzas::table)
        .values(&NewPizza { name, ingredients })
        .returning(Pizza::as_returning())
        .get_result(conn)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::IN_MEMORY_DATABASE;
    use serde_json::json;

    pub(crate) fn setup_catalog() -> Catalog {
        let catalog = Catalog::connect(IN_MEMORY_DATABASE, 1).unwrap();
        catalog.run_migrations().unwrap();
        catalog
    }

    fn offering_request(
        price: serde_json::Value,
        pizza_id: i32,
        restaurant_id: i32,
    ) -> OfferingRequest {
        OfferingRequest {
            price,
            pizza_id: json!(pizza_id),
            restaurant_id: json!(restaurant_id),
        }
    }

    async fn count_offerings(catalog: &Catalog) -> i64 {
        catalog
            .interact(|conn| Ok(restaurant_pizzas::table.count().get_result(conn)?))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_restaurants() {
        let catalog = setup_catalog();
        catalog.insert_restaurant("Karen's Pizza Shack", "address1").await.unwrap();
        catalog.insert_restaurant("Sanjay's Pizza", "address2").await.unwrap();

        let restaurants = catalog.list_restaurants().await.unwrap();

        assert_eq!(restaurants.len(), 2);
        assert_eq!(restaurants[0].name, "Karen's Pizza Shack");
        assert_eq!(restaurants[1].address, "address2");
        assert_ne!(restaurants[0].id, restaurants[1].id);
    }

    #[tokio::test]
    async fn test_create_offering() {
        let catalog = setup_catalog();
        let restaurant = catalog.insert_restaurant("Kiki's Pizza", "address3").await.unwrap();
        let pizza = catalog.insert_pizza("Emma", "Dough, Tomato Sauce, Cheese").await.unwrap();

        let (offering, created_pizza, created_restaurant) = catalog
            .create_offering(offering_request(json!(15), pizza.id, restaurant.id))
            .await
            .unwrap();

        assert_eq!(offering.price, 15.0);
        assert_eq!(offering.pizza_id, pizza.id);
        assert_eq!(offering.restaurant_id, restaurant.id);
        assert_eq!(created_pizza, pizza);
        assert_eq!(created_restaurant, restaurant);
        assert_eq!(count_offerings(&catalog).await, 1);
    }

    #[tokio::test]
    async fn test_create_offering_out_of_range_price() {
        let catalog = setup_catalog();
        let restaurant = catalog.insert_restaurant("Kiki's Pizza", "address3").await.unwrap();
        let pizza = catalog.insert_pizza("Emma", "Dough").await.unwrap();

        for price in [json!(31), json!(0), json!(0.5), json!("10")] {
            let result = catalog
                .create_offering(offering_request(price, pizza.id, restaurant.id))
                .await;
            assert!(matches!(result, Err(CatalogError::Validation(errors)) if errors.len() == 1));
        }

        assert_eq!(count_offerings(&catalog).await, 0);
    }

    #[tokio::test]
    async fn test_create_offering_unknown_references() {
        let catalog = setup_catalog();
        let restaurant = catalog.insert_restaurant("Kiki's Pizza", "address3").await.unwrap();
        let pizza = catalog.insert_pizza("Emma", "Dough").await.unwrap();

        let result = catalog
            .create_offering(offering_request(json!(10), pizza.id + 100, restaurant.id))
            .await;
        match result {
            Err(CatalogError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::UnknownPizza])
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let result = catalog
            .create_offering(offering_request(json!(10), pizza.id, restaurant.id + 100))
            .await;
        match result {
            Err(CatalogError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::UnknownRestaurant])
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(count_offerings(&catalog).await, 0);
    }

    #[tokio::test]
    async fn test_create_offering_reports_every_failure() {
        let catalog = setup_catalog();

        let result = catalog
            .create_offering(OfferingRequest {
                price: json!(99),
                pizza_id: json!("one"),
                restaurant_id: json!(42),
            })
            .await;

        match result {
            Err(CatalogError::Validation(errors)) => assert_eq!(
                errors,
                vec![
                    ValidationError::PriceOutOfRange,
                    ValidationError::UnknownPizza,
                    ValidationError::UnknownRestaurant,
                ]
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_restaurant() {
        let catalog = setup_catalog();
        let restaurant = catalog.insert_restaurant("Sanjay's Pizza", "address2").await.unwrap();
        let emma = catalog.insert_pizza("Emma", "Dough, Tomato Sauce, Cheese").await.unwrap();
        let geri = catalog.insert_pizza("Geri", "Dough, Pepperoni").await.unwrap();
        catalog
            .create_offering(offering_request(json!(5), emma.id, restaurant.id))
            .await
            .unwrap();
        catalog
            .create_offering(offering_request(json!(7.5), geri.id, restaurant.id))
            .await
            .unwrap();

        let (found, offerings) = catalog.get_restaurant(restaurant.id).await.unwrap();

        assert_eq!(found, restaurant);
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].1, emma);
        assert_eq!(offerings[1].0.price, 7.5);
        assert_eq!(offerings[1].1, geri);
    }

    #[tokio::test]
    async fn test_get_restaurant_not_found() {
        let catalog = setup_catalog();

        let result = catalog.get_restaurant(404).await;

        assert!(matches!(result, Err(CatalogError::RestaurantNotFound(404))));
    }

    #[tokio::test]
    async fn test_delete_restaurant_cascades_to_its_offerings_only() {
        let catalog = setup_catalog();
        let doomed = catalog.insert_restaurant("Karen's Pizza Shack", "address1").await.unwrap();
        let kept = catalog.insert_restaurant("Kiki's Pizza", "address3").await.unwrap();
        let pizza = catalog.insert_pizza("Melanie", "Dough, Sauce, Ricotta").await.unwrap();
        for price in [json!(3), json!(4), json!(5)] {
            catalog
                .create_offering(offering_request(price, pizza.id, doomed.id))
                .await
                .unwrap();
        }
        catalog
            .create_offering(offering_request(json!(9), pizza.id, kept.id))
            .await
            .unwrap();

        let removed = catalog.delete_restaurant(doomed.id).await.unwrap();

        assert_eq!(removed, 3);
        assert_eq!(count_offerings(&catalog).await, 1);
        assert!(matches!(
            catalog.get_restaurant(doomed.id).await,
            Err(CatalogError::RestaurantNotFound(_))
        ));
        assert_eq!(catalog.list_pizzas().await.unwrap(), vec![pizza]);
    }

    #[tokio::test]
    async fn test_delete_restaurant_not_found() {
        let catalog = setup_catalog();

        let result = catalog.delete_restaurant(1).await;

        assert!(matches!(result, Err(CatalogError::RestaurantNotFound(1))));
    }

    #[tokio::test]
    async fn test_delete_all_restaurants_is_idempotent() {
        let catalog = setup_catalog();
        let restaurant = catalog.insert_restaurant("Kiki's Pizza", "address3").await.unwrap();
        let pizza = catalog.insert_pizza("Geri", "Dough").await.unwrap();
        catalog
            .create_offering(offering_request(json!(20), pizza.id, restaurant.id))
            .await
            .unwrap();

        assert_eq!(catalog.delete_all_restaurants().await.unwrap(), 1);
        assert_eq!(catalog.delete_all_restaurants().await.unwrap(), 0);
        assert!(catalog.list_restaurants().await.unwrap().is_empty());
        assert_eq!(count_offerings(&catalog).await, 0);
        assert_eq!(catalog.list_pizzas().await.unwrap().len(), 1);
    }
}
