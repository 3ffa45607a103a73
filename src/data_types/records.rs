use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: Option<String>,
    pub creation_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `recipes` table. A missing category is sent as
/// `null`, never as an empty string.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: Option<String>,
    pub creation_date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewGuest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Meal {
    pub id: Uuid,
    pub date: NaiveDate,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub date: NaiveDate,
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MealGuestLink {
    pub meal_id: Uuid,
    pub guest_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MealRecipeLink {
    pub meal_id: Uuid,
    pub recipe_id: Uuid,
}

/// A meal together with everyone who attended and everything served.
/// Assembled on read, never stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MealWithDetails {
    pub meal: Meal,
    pub guests: Vec<Guest>,
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeOrder {
    /// `creation_date` descending, used by the search view
    NewestFirst,
    /// `title` ascending, used by the meal form checklist
    ByTitle,
}
