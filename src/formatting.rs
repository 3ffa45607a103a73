use chrono::{Datelike, NaiveDate};
use rand::Rng;
use teloxide::utils::markdown;

use crate::constants::{NO_MATCH_MSG, NO_MEALS_MSG, NO_RECIPES_MSG, SKIP_FIELD};
use crate::data_types::records::{Guest, MealWithDetails};
use crate::errors::ValidationError;
use crate::recipe_catalog::{RecipeSearch, RecipeStep};

const EMOJIS: [&str; 7] = ["🍲", "🥗", "🍰", "🧀", "🥖", "🍷", "🥘"];

const WEEK_DAYS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];
const MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

/// `mercredi 1 mai 2024`
pub fn french_date_fmt(date: NaiveDate) -> String {
    format!(
        "{} {} {} {}",
        WEEK_DAYS[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Accepts `AAAA-MM-JJ`, or `-` / nothing for today.
pub fn parse_user_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    if input.is_empty() || input == SKIP_FIELD {
        return Ok(today);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

pub fn recipe_prompt(step: RecipeStep) -> &'static str {
    match step {
        RecipeStep::Title => "Titre de la recette ? (ex: Coq au vin)",
        RecipeStep::Ingredients => "Ingrédients ?",
        RecipeStep::Instructions => "Instructions ?",
        RecipeStep::Category => "Catégorie ? (ex: Plat principal, Dessert, Entrée; - pour aucune)",
        RecipeStep::CreationDate => "Date de création ? (AAAA-MM-JJ, - pour aujourd'hui)",
    }
}

/// Telegram rejects message texts longer than this, in UTF-16 code units.
pub const TELEGRAM_MSG_LIMIT: usize = 4096;

fn header(title: &str) -> String {
    let rand_emoji = EMOJIS[rand::thread_rng().gen_range(0..EMOJIS.len())];
    format!(
        "{} {} {}\n",
        rand_emoji,
        markdown::bold(&markdown::escape(title)),
        rand_emoji
    )
}

fn msg_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Shortens user text so a single line can never fill a message on its own.
fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars - 1).collect();
    clipped.push('…');
    clipped
}

/// Formatted text has to stay on one line, see [`pack_blocks`].
fn one_line(text: &str, max_chars: usize) -> String {
    clip(&text.replace(|c: char| c == '\r' || c == '\n', " "), max_chars)
}

/// Packs message blocks into as few texts as possible, each within `limit`.
/// Blocks stay whole when they fit, oversized ones are cut between lines.
/// Every formatting entity lives on a single line, so no cut lands inside one.
fn pack_blocks(blocks: Vec<String>, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for block in blocks {
        let pieces = if msg_len(&block) <= limit {
            vec![block]
        } else {
            block.split_inclusive('\n').map(str::to_string).collect()
        };

        for piece in pieces {
            if !current.is_empty() && msg_len(&current) + msg_len(&piece) > limit {
                chunks.push(std::mem::take(&mut current));
            }
            current += &piece;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Search results, split into as many messages as needed.
pub fn recipe_search_msgs(search: &RecipeSearch) -> Vec<String> {
    if search.catalog_is_empty() {
        return vec![markdown::escape(NO_RECIPES_MSG)];
    }
    if search.matches.is_empty() {
        return vec![markdown::escape(NO_MATCH_MSG)];
    }

    let mut blocks = vec![if search.term.trim().is_empty() {
        header(&format!("{} recettes", search.matches.len()))
    } else {
        header(&format!(
            "{} recettes pour « {} »",
            search.matches.len(),
            one_line(search.term.trim(), 64)
        ))
    }];

    for recipe in &search.matches {
        let mut block = format!(
            "\n{}",
            markdown::bold(&markdown::escape(&one_line(&recipe.title, 256)))
        );
        if let Some(category) = &recipe.category {
            block += &format!(
                " \\({}\\)",
                markdown::italic(&markdown::escape(&one_line(category, 64)))
            );
        }
        block += &format!(
            "\n{}\n",
            markdown::escape(&recipe.creation_date.format("%d/%m/%Y").to_string())
        );
        block += &format!(
            "Ingrédients: {}\n",
            markdown::escape(&clip(&recipe.ingredients, 1000))
        );
        block += &format!("{}\n", markdown::escape(&clip(&recipe.instructions, 1000)));
        blocks.push(block);
    }

    pack_blocks(blocks, TELEGRAM_MSG_LIMIT)
}

pub fn guest_list_msgs(guests: &[Guest]) -> Vec<String> {
    let mut blocks = vec![header("Invités")];
    for guest in guests {
        blocks.push(format!(" • {}\n", markdown::escape(&one_line(&guest.name, 256))));
    }
    pack_blocks(blocks, TELEGRAM_MSG_LIMIT)
}

/// Meal history of one guest, split into as many messages as needed.
pub fn meal_history_msgs(guest_name: &str, history: &[MealWithDetails]) -> Vec<String> {
    if history.is_empty() {
        return vec![markdown::escape(NO_MEALS_MSG)];
    }

    let mut blocks = vec![header(&format!("Repas avec {}", one_line(guest_name, 64)))];

    for entry in history {
        let mut block = format!(
            "\n{}\n",
            markdown::underline(&markdown::escape(&french_date_fmt(entry.meal.date)))
        );
        if let Some(comment) = &entry.meal.comment {
            block += &format!(
                "{}\n",
                markdown::italic(&markdown::escape(&one_line(comment, 1000)))
            );
        }

        let names = entry
            .guests
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ");
        block += &format!("Invités: {}\n", markdown::escape(&clip(&names, 1000)));

        for recipe in &entry.recipes {
            block += &format!(" • {}", markdown::escape(&one_line(&recipe.title, 256)));
            if let Some(category) = &recipe.category {
                block += &format!(" \\({}\\)", markdown::escape(&one_line(category, 64)));
            }
            block += "\n";
        }
        blocks.push(block);
    }

    pack_blocks(blocks, TELEGRAM_MSG_LIMIT)
}
