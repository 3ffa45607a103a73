use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

use crate::data_backend::Store;
use crate::data_types::records::{
    Guest, Meal, NewGuest, NewMeal, NewRecipe, Recipe, RecipeOrder,
};
use crate::errors::StoreError;

const SCHEMA: &str = "
    pragma foreign_keys = on;

    create table if not exists recipes (
        id blob not null primary key,
        title text not null,
        ingredients text not null,
        instructions text not null,
        category text,
        creation_date text not null,
        created_at text not null
    );

    create table if not exists guests (
        id blob not null primary key,
        name text not null,
        created_at text not null
    );

    create table if not exists meals (
        id blob not null primary key,
        date text not null,
        comment text,
        created_at text not null
    );

    create table if not exists meal_guests (
        meal_id blob not null references meals(id) on delete cascade,
        guest_id blob not null references guests(id),
        primary key (meal_id, guest_id)
    );

    create table if not exists meal_recipes (
        meal_id blob not null references meals(id) on delete cascade,
        recipe_id blob not null references recipes(id),
        primary key (meal_id, recipe_id)
    );
";

const RECIPE_COLUMNS: &str =
    "id, title, ingredients, instructions, category, creation_date, created_at";

/// Store keeping all tables in a single SQLite database.
///
/// Unlike the REST backend it can write a meal and its links in one
/// transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn recipe_from_row(row: &Row) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        title: row.get(1)?,
        ingredients: row.get(2)?,
        instructions: row.get(3)?,
        category: row.get(4)?,
        creation_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn guest_from_row(row: &Row) -> rusqlite::Result<Guest> {
    Ok(Guest {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn meal_from_row(row: &Row) -> rusqlite::Result<Meal> {
    Ok(Meal {
        id: row.get(0)?,
        date: row.get(1)?,
        comment: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn insert_meal_row(conn: &Connection, meal: &NewMeal) -> rusqlite::Result<Meal> {
    let created = Meal {
        id: Uuid::new_v4(),
        date: meal.date,
        comment: meal.comment.clone(),
        created_at: Utc::now(),
    };
    conn.prepare_cached(
        "insert into meals (id, date, comment, created_at)
            values (?1, ?2, ?3, ?4)",
    )?
    .execute(params![
        created.id,
        created.date,
        created.comment,
        created.created_at
    ])?;
    Ok(created)
}

fn insert_links(
    conn: &Connection,
    table: &str,
    column: &str,
    meal_id: Uuid,
    ids: &[Uuid],
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "insert into {} (meal_id, {}) values (?1, ?2)",
        table, column
    ))?;
    for id in ids {
        stmt.execute(params![meal_id, id])?;
    }
    Ok(())
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, StoreError> {
        let created = Recipe {
            id: Uuid::new_v4(),
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            category: recipe.category.clone(),
            creation_date: recipe.creation_date,
            created_at: Utc::now(),
        };

        let conn = self.lock()?;
        conn.prepare_cached(&format!(
            "insert into recipes ({}) values (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            RECIPE_COLUMNS
        ))?
        .execute(params![
            created.id,
            created.title,
            created.ingredients,
            created.instructions,
            created.category,
            created.creation_date,
            created.created_at
        ])?;

        Ok(created)
    }

    async fn recipes(&self, order: RecipeOrder) -> Result<Vec<Recipe>, StoreError> {
        let order_by = match order {
            RecipeOrder::NewestFirst => "creation_date desc, rowid",
            RecipeOrder::ByTitle => "title asc, rowid",
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "select {} from recipes order by {}",
            RECIPE_COLUMNS, order_by
        ))?;
        let recipes = stmt
            .query_map([], recipe_from_row)?
            .collect::<rusqlite::Result<Vec<Recipe>>>()?;

        Ok(recipes)
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError> {
        let created = Guest {
            id: Uuid::new_v4(),
            name: guest.name.clone(),
            created_at: Utc::now(),
        };

        let conn = self.lock()?;
        conn.prepare_cached(
            "insert into guests (id, name, created_at)
                values (?1, ?2, ?3)",
        )?
        .execute(params![created.id, created.name, created.created_at])?;

        Ok(created)
    }

    async fn guests(&self) -> Result<Vec<Guest>, StoreError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached("select id, name, created_at from guests order by name, rowid")?;
        let guests = stmt
            .query_map([], guest_from_row)?
            .collect::<rusqlite::Result<Vec<Guest>>>()?;

        Ok(guests)
    }

    async fn insert_meal(&self, meal: &NewMeal) -> Result<Meal, StoreError> {
        let conn = self.lock()?;
        Ok(insert_meal_row(&conn, meal)?)
    }

    async fn delete_meal(&self, meal_id: Uuid) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.prepare_cached("delete from meals where id = ?1")?
            .execute(params![meal_id])?;
        Ok(())
    }

    async fn link_guests(&self, meal_id: Uuid, guest_ids: &[Uuid]) -> Result<(), StoreError> {
        let conn = self.lock()?;
        Ok(insert_links(&conn, "meal_guests", "guest_id", meal_id, guest_ids)?)
    }

    async fn link_recipes(&self, meal_id: Uuid, recipe_ids: &[Uuid]) -> Result<(), StoreError> {
        let conn = self.lock()?;
        Ok(insert_links(&conn, "meal_recipes", "recipe_id", meal_id, recipe_ids)?)
    }

    async fn meal_ids_for_guest(&self, guest_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("select meal_id from meal_guests where guest_id = ?1")?;
        let ids = stmt
            .query_map(params![guest_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<Uuid>>>()?;

        Ok(ids)
    }

    async fn meals_by_ids(&self, meal_ids: &[Uuid]) -> Result<Vec<Meal>, StoreError> {
        if meal_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=meal_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<String>>()
            .join(", ");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "select id, date, comment, created_at from meals
                where id in ({})
                order by date desc, rowid",
            placeholders
        ))?;
        let meals = stmt
            .query_map(params_from_iter(meal_ids.iter()), meal_from_row)?
            .collect::<rusqlite::Result<Vec<Meal>>>()?;

        Ok(meals)
    }

    async fn meal_guests(&self, meal_id: Uuid) -> Result<Vec<Option<Guest>>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "select g.id, g.name, g.created_at from meal_guests mg
                left join guests g on g.id = mg.guest_id
                where mg.meal_id = ?1
                order by g.name",
        )?;
        let guests = stmt
            .query_map(params![meal_id], |row| {
                match row.get::<_, Option<Uuid>>(0)? {
                    Some(_) => guest_from_row(row).map(Some),
                    None => Ok(None),
                }
            })?
            .collect::<rusqlite::Result<Vec<Option<Guest>>>>()?;

        Ok(guests)
    }

    async fn meal_recipes(&self, meal_id: Uuid) -> Result<Vec<Option<Recipe>>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "select r.id, r.title, r.ingredients, r.instructions, r.category,
                    r.creation_date, r.created_at
                from meal_recipes mr
                left join recipes r on r.id = mr.recipe_id
                where mr.meal_id = ?1
                order by r.title",
        )?;
        let recipes = stmt
            .query_map(params![meal_id], |row| {
                match row.get::<_, Option<Uuid>>(0)? {
                    Some(_) => recipe_from_row(row).map(Some),
                    None => Ok(None),
                }
            })?
            .collect::<rusqlite::Result<Vec<Option<Recipe>>>>()?;

        Ok(recipes)
    }

    async fn create_meal_with_links(
        &self,
        meal: &NewMeal,
        guest_ids: &[Uuid],
        recipe_ids: &[Uuid],
    ) -> Result<Meal, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let created = insert_meal_row(&tx, meal)?;
        insert_links(&tx, "meal_guests", "guest_id", created.id, guest_ids)?;
        insert_links(&tx, "meal_recipes", "recipe_id", created.id, recipe_ids)?;

        tx.commit()?;
        Ok(created)
    }
}
