#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use recettes_telegram_rs::data_backend::{sqlite_store::SqliteStore, Store};
use recettes_telegram_rs::data_types::records::{
    Guest, Meal, NewGuest, NewMeal, NewRecipe, Recipe, RecipeOrder,
};
use recettes_telegram_rs::errors::StoreError;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Store without transactions: every call is recorded, chosen calls fail.
/// Meal writes go through the default link-then-compensate path.
pub struct FlakyStore {
    inner: SqliteStore,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
    dangling: Mutex<bool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        FlakyStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            dangling: Mutex::new(false),
        }
    }

    /// Every meal then also reports a guest link and a recipe link whose row
    /// is gone.
    pub fn add_dangling_links(&self) {
        *self.dangling.lock().unwrap() = true;
    }

    fn with_dangling<T>(&self, mut rows: Vec<Option<T>>) -> Vec<Option<T>> {
        if *self.dangling.lock().unwrap() {
            rows.push(None);
        }
        rows
    }

    pub fn fail(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn enter(&self, call: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(call) {
            return Err(StoreError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: format!("{} unavailable", call),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, StoreError> {
        self.enter("insert_recipe")?;
        self.inner.insert_recipe(recipe).await
    }

    async fn recipes(&self, order: RecipeOrder) -> Result<Vec<Recipe>, StoreError> {
        self.enter("recipes")?;
        self.inner.recipes(order).await
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError> {
        self.enter("insert_guest")?;
        self.inner.insert_guest(guest).await
    }

    async fn guests(&self) -> Result<Vec<Guest>, StoreError> {
        self.enter("guests")?;
        self.inner.guests().await
    }

    async fn insert_meal(&self, meal: &NewMeal) -> Result<Meal, StoreError> {
        self.enter("insert_meal")?;
        self.inner.insert_meal(meal).await
    }

    async fn delete_meal(&self, meal_id: Uuid) -> Result<(), StoreError> {
        self.enter("delete_meal")?;
        self.inner.delete_meal(meal_id).await
    }

    async fn link_guests(&self, meal_id: Uuid, guest_ids: &[Uuid]) -> Result<(), StoreError> {
        self.enter("link_guests")?;
        self.inner.link_guests(meal_id, guest_ids).await
    }

    async fn link_recipes(&self, meal_id: Uuid, recipe_ids: &[Uuid]) -> Result<(), StoreError> {
        self.enter("link_recipes")?;
        self.inner.link_recipes(meal_id, recipe_ids).await
    }

    async fn meal_ids_for_guest(&self, guest_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.enter("meal_ids_for_guest")?;
        self.inner.meal_ids_for_guest(guest_id).await
    }

    async fn meals_by_ids(&self, meal_ids: &[Uuid]) -> Result<Vec<Meal>, StoreError> {
        self.enter("meals_by_ids")?;
        self.inner.meals_by_ids(meal_ids).await
    }

    async fn meal_guests(&self, meal_id: Uuid) -> Result<Vec<Option<Guest>>, StoreError> {
        self.enter("meal_guests")?;
        Ok(self.with_dangling(self.inner.meal_guests(meal_id).await?))
    }

    async fn meal_recipes(&self, meal_id: Uuid) -> Result<Vec<Option<Recipe>>, StoreError> {
        self.enter("meal_recipes")?;
        Ok(self.with_dangling(self.inner.meal_recipes(meal_id).await?))
    }
}
