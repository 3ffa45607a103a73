//! Access to the tables holding recipes, guests and meals.
//!
//! [`Store`] is the capability surface the operations in this crate rely on.
//! [`postgrest_store::PostgrestStore`] talks to a hosted Supabase project,
//! [`sqlite_store::SqliteStore`] keeps everything in a local SQLite file.

pub mod postgrest_store;
pub mod sqlite_store;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::data_types::records::{
    Guest, Meal, NewGuest, NewMeal, NewRecipe, Recipe, RecipeOrder,
};
use crate::errors::StoreError;

pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, StoreError>;
    async fn recipes(&self, order: RecipeOrder) -> Result<Vec<Recipe>, StoreError>;

    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError>;
    /// All guests, ordered by name.
    async fn guests(&self) -> Result<Vec<Guest>, StoreError>;

    async fn insert_meal(&self, meal: &NewMeal) -> Result<Meal, StoreError>;
    async fn delete_meal(&self, meal_id: Uuid) -> Result<(), StoreError>;
    async fn link_guests(&self, meal_id: Uuid, guest_ids: &[Uuid]) -> Result<(), StoreError>;
    async fn link_recipes(&self, meal_id: Uuid, recipe_ids: &[Uuid]) -> Result<(), StoreError>;

    async fn meal_ids_for_guest(&self, guest_id: Uuid) -> Result<Vec<Uuid>, StoreError>;
    /// Meals with the given ids, newest date first.
    async fn meals_by_ids(&self, meal_ids: &[Uuid]) -> Result<Vec<Meal>, StoreError>;
    /// Guests linked to a meal. `None` marks a link whose guest is gone.
    async fn meal_guests(&self, meal_id: Uuid) -> Result<Vec<Option<Guest>>, StoreError>;
    /// Recipes linked to a meal. `None` marks a link whose recipe is gone.
    async fn meal_recipes(&self, meal_id: Uuid) -> Result<Vec<Option<Recipe>>, StoreError>;

    /// Inserts a meal and its guest and recipe links.
    ///
    /// Without a transaction to lean on, a failed link insert is undone by
    /// deleting the meal row again, so a meal never stays behind without its
    /// links. Stores that have transactions override this.
    async fn create_meal_with_links(
        &self,
        meal: &NewMeal,
        guest_ids: &[Uuid],
        recipe_ids: &[Uuid],
    ) -> Result<Meal, StoreError> {
        let created = self.insert_meal(meal).await?;

        let linked = match self.link_guests(created.id, guest_ids).await {
            Ok(()) => self.link_recipes(created.id, recipe_ids).await,
            Err(e) => Err(e),
        };

        if let Err(e) = linked {
            log::warn!("Linking meal {} failed, rolling back: {}", created.id, e);
            if let Err(del_err) = self.delete_meal(created.id).await {
                log::error!(
                    "Rollback of meal {} failed, it is left without links: {}",
                    created.id,
                    del_err
                );
            }
            return Err(e);
        }

        Ok(created)
    }
}
