use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    GUESTS_TABLE, MEALS_TABLE, MEAL_GUESTS_TABLE, MEAL_RECIPES_TABLE, RECIPES_TABLE,
    SUPABASE_REST_PATH,
};
use crate::data_backend::Store;
use crate::data_types::records::{
    Guest, Meal, MealGuestLink, MealRecipeLink, NewGuest, NewMeal, NewRecipe, Recipe,
    RecipeOrder,
};
use crate::errors::StoreError;

/// Store backed by the PostgREST interface of a Supabase project.
pub struct PostgrestStore {
    client: Client,
    rest_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct MealIdRow {
    meal_id: Uuid,
}

#[derive(Deserialize)]
struct NestedGuestRow {
    guests: Option<Guest>,
}

#[derive(Deserialize)]
struct NestedRecipeRow {
    recipes: Option<Recipe>,
}

type Query = Vec<(&'static str, String)>;

const RETURN_ROWS: &str = "return=representation";
const RETURN_NOTHING: &str = "return=minimal";

fn order_param(column: &str, ascending: bool) -> String {
    format!("{}.{}", column, if ascending { "asc" } else { "desc" })
}

fn eq_filter(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

fn in_filter(ids: &[Uuid]) -> String {
    let joined = ids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<String>>()
        .join(",");
    format!("in.({})", joined)
}

fn recipes_query(order: RecipeOrder) -> Query {
    let order = match order {
        RecipeOrder::NewestFirst => order_param("creation_date", false),
        RecipeOrder::ByTitle => order_param("title", true),
    };
    vec![("select", "*".to_string()), ("order", order)]
}

impl PostgrestStore {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(PostgrestStore {
            client,
            rest_url: format!("{}/{}", endpoint.trim_end_matches('/'), SUPABASE_REST_PATH),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn insert_request(&self, table: &str, prefer: &'static str) -> RequestBuilder {
        self.request(Method::POST, table).header("Prefer", prefer)
    }

    fn check_status(status: StatusCode, body: String) -> Result<String, StoreError> {
        if !status.is_success() {
            return Err(StoreError::Status { status, body });
        }
        Ok(body)
    }

    async fn read_body(resp: Response) -> Result<String, StoreError> {
        let status = resp.status();
        let body = resp.text().await?;
        Self::check_status(status, body)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        let now = Instant::now();
        let resp = self.request(Method::GET, table).query(query).send().await?;
        let body = Self::read_body(resp).await?;
        log::debug!("GET {}: {:.2?}", table, now.elapsed());

        Ok(serde_json::from_str(&body)?)
    }

    /// Inserts one row and returns it as stored by the backend.
    async fn insert_returning<B, T>(&self, table: &'static str, row: &B) -> Result<T, StoreError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let now = Instant::now();
        let resp = self
            .insert_request(table, RETURN_ROWS)
            .json(&[row])
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        log::debug!("POST {}: {:.2?}", table, now.elapsed());

        let rows: Vec<T> = serde_json::from_str(&body)?;
        rows.into_iter()
            .next()
            .ok_or(StoreError::EmptyInsert { table })
    }

    async fn insert_many<B: Serialize + Sync>(
        &self,
        table: &'static str,
        rows: &[B],
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let resp = self
            .insert_request(table, RETURN_NOTHING)
            .json(rows)
            .send()
            .await?;
        Self::read_body(resp).await?;
        Ok(())
    }

    async fn delete_where(
        &self,
        table: &'static str,
        column: &'static str,
        id: Uuid,
    ) -> Result<(), StoreError> {
        let resp = self
            .request(Method::DELETE, table)
            .query(&[(column, eq_filter(id))])
            .send()
            .await?;
        Self::read_body(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgrestStore {
    async fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, StoreError> {
        self.insert_returning(RECIPES_TABLE, recipe).await
    }

    async fn recipes(&self, order: RecipeOrder) -> Result<Vec<Recipe>, StoreError> {
        self.select(RECIPES_TABLE, &recipes_query(order)).await
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError> {
        self.insert_returning(GUESTS_TABLE, guest).await
    }

    async fn guests(&self) -> Result<Vec<Guest>, StoreError> {
        let query = vec![("select", "*".to_string()), ("order", order_param("name", true))];
        self.select(GUESTS_TABLE, &query).await
    }

    async fn insert_meal(&self, meal: &NewMeal) -> Result<Meal, StoreError> {
        self.insert_returning(MEALS_TABLE, meal).await
    }

    async fn delete_meal(&self, meal_id: Uuid) -> Result<(), StoreError> {
        // links first, the join tables reference the meal
        self.delete_where(MEAL_GUESTS_TABLE, "meal_id", meal_id)
            .await?;
        self.delete_where(MEAL_RECIPES_TABLE, "meal_id", meal_id)
            .await?;
        self.delete_where(MEALS_TABLE, "id", meal_id).await
    }

    async fn link_guests(&self, meal_id: Uuid, guest_ids: &[Uuid]) -> Result<(), StoreError> {
        let rows: Vec<MealGuestLink> = guest_ids
            .iter()
            .map(|&guest_id| MealGuestLink { meal_id, guest_id })
            .collect();
        self.insert_many(MEAL_GUESTS_TABLE, &rows).await
    }

    async fn link_recipes(&self, meal_id: Uuid, recipe_ids: &[Uuid]) -> Result<(), StoreError> {
        let rows: Vec<MealRecipeLink> = recipe_ids
            .iter()
            .map(|&recipe_id| MealRecipeLink { meal_id, recipe_id })
            .collect();
        self.insert_many(MEAL_RECIPES_TABLE, &rows).await
    }

    async fn meal_ids_for_guest(&self, guest_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let query = vec![
            ("select", "meal_id".to_string()),
            ("guest_id", eq_filter(guest_id)),
        ];
        let rows: Vec<MealIdRow> = self.select(MEAL_GUESTS_TABLE, &query).await?;
        Ok(rows.into_iter().map(|row| row.meal_id).collect())
    }

    async fn meals_by_ids(&self, meal_ids: &[Uuid]) -> Result<Vec<Meal>, StoreError> {
        if meal_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = vec![
            ("select", "*".to_string()),
            ("id", in_filter(meal_ids)),
            ("order", order_param("date", false)),
        ];
        self.select(MEALS_TABLE, &query).await
    }

    async fn meal_guests(&self, meal_id: Uuid) -> Result<Vec<Option<Guest>>, StoreError> {
        let query = vec![
            ("select", "guests(id,name,created_at)".to_string()),
            ("meal_id", eq_filter(meal_id)),
        ];
        let rows: Vec<NestedGuestRow> = self.select(MEAL_GUESTS_TABLE, &query).await?;
        Ok(rows.into_iter().map(|row| row.guests).collect())
    }

    async fn meal_recipes(&self, meal_id: Uuid) -> Result<Vec<Option<Recipe>>, StoreError> {
        let query = vec![
            (
                "select",
                "recipes(id,title,ingredients,instructions,category,creation_date,created_at)"
                    .to_string(),
            ),
            ("meal_id", eq_filter(meal_id)),
        ];
        let rows: Vec<NestedRecipeRow> = self.select(MEAL_RECIPES_TABLE, &query).await?;
        Ok(rows.into_iter().map(|row| row.recipes).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_url_ignores_trailing_slash() {
        let store = PostgrestStore::new(
            "https://abc.supabase.co/",
            "anon",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            store.table_url(RECIPES_TABLE),
            "https://abc.supabase.co/rest/v1/recipes"
        );
    }

    #[test]
    fn inserts_carry_key_and_return_preference() {
        let store =
            PostgrestStore::new("https://abc.supabase.co", "anon", Duration::from_secs(1)).unwrap();
        let request = store
            .insert_request(GUESTS_TABLE, RETURN_ROWS)
            .json(&[NewGuest {
                name: "Alice".into(),
            }])
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://abc.supabase.co/rest/v1/guests"
        );
        let headers = request.headers();
        assert_eq!(headers["apikey"], "anon");
        assert_eq!(headers["authorization"], "Bearer anon");
        assert_eq!(headers["prefer"], "return=representation");
    }

    #[test]
    fn failed_status_keeps_the_backend_message() {
        let body = r#"{"code":"23503","message":"violates foreign key constraint"}"#;
        match PostgrestStore::check_status(StatusCode::CONFLICT, body.to_string()) {
            Err(StoreError::Status { status, body: kept }) => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(kept, body);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(
            PostgrestStore::check_status(StatusCode::CREATED, "[]".into()).unwrap(),
            "[]"
        );
    }

    #[test]
    fn recipe_orderings() {
        assert_eq!(
            recipes_query(RecipeOrder::NewestFirst)[1].1,
            "creation_date.desc"
        );
        assert_eq!(recipes_query(RecipeOrder::ByTitle)[1].1, "title.asc");
    }

    #[test]
    fn membership_filter_lists_every_id() {
        let a = Uuid::nil();
        let b: Uuid = "7a0c5a43-7a1d-4c38-8a61-5d3c1d0f2b11".parse().unwrap();
        assert_eq!(in_filter(&[a, b]), format!("in.({},{})", a, b));
        assert_eq!(eq_filter(a), format!("eq.{}", a));
    }

    #[test]
    fn nested_rows_keep_dangling_links() {
        let body = r#"[
            {"guests": {"id": "7a0c5a43-7a1d-4c38-8a61-5d3c1d0f2b11", "name": "Alice", "created_at": "2024-05-01T18:30:00.123456+00:00"}},
            {"guests": null}
        ]"#;
        let rows: Vec<NestedGuestRow> = serde_json::from_str(body).unwrap();
        let guests: Vec<Option<Guest>> = rows.into_iter().map(|r| r.guests).collect();
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].as_ref().unwrap().name, "Alice");
        assert!(guests[1].is_none());
    }

    #[test]
    fn recipe_row_with_null_category() {
        let body = r#"{
            "id": "0b9c3f0e-2d43-4a36-9f0e-41b1f2a0c001",
            "title": "Salade",
            "ingredients": "laitue, tomates",
            "instructions": "Mélanger.",
            "category": null,
            "creation_date": "2024-03-01",
            "created_at": "2024-03-01T09:00:00+00:00"
        }"#;
        let recipe: Recipe = serde_json::from_str(body).unwrap();
        assert_eq!(recipe.category, None);
        assert_eq!(
            recipe.creation_date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn absent_category_is_sent_as_null() {
        let payload = NewRecipe {
            title: "Salade".into(),
            ingredients: "laitue".into(),
            instructions: "Mélanger.".into(),
            category: None,
            creation_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["category"].is_null());
        assert_eq!(json["creation_date"], "2024-03-01");
    }
}
