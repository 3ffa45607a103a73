pub mod records;

use teloxide::{
    dispatching::dialogue::InMemStorage, prelude::Dialogue, utils::command::BotCommands,
};

use crate::{meal_recording::MealDraft, recipe_catalog::RecipeDraft};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Commandes disponibles :")]
pub enum Command {
    #[command(description = "off")]
    Start,
    #[command(description = "ajouter une recette")]
    Recette,
    #[command(description = "rechercher par ingrédient, titre ou catégorie")]
    Recherche(String),
    #[command(description = "ajouter un invité\n")]
    Invite(String),
    #[command(description = "lister les invités")]
    Invites,
    #[command(description = "enregistrer un repas [AAAA-MM-JJ] [commentaire]")]
    Repas(String),
    #[command(description = "historique des repas d'un invité\n")]
    Historique,
    #[command(description = "annuler la saisie en cours")]
    Annuler,
}

#[derive(Clone, Debug, Default)]
pub enum DialogueState {
    #[default]
    Default,
    RecipeForm(RecipeDraft),
    MealForm(MealDraft),
}

/// Runtime knobs handed to the handlers.
#[derive(Debug, Clone, Copy)]
pub struct BotSettings {
    pub history_concurrency: usize,
}

pub type DialogueType = Dialogue<DialogueState, InMemStorage<DialogueState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Payload of an inline keyboard button, `<prefix>:<uuid>` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ToggleGuest(uuid::Uuid),
    ToggleRecipe(uuid::Uuid),
    SaveMeal,
    ShowHistory(uuid::Uuid),
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::ToggleGuest(id) => format!("g:{}", id),
            CallbackAction::ToggleRecipe(id) => format!("r:{}", id),
            CallbackAction::SaveMeal => "save:".to_string(),
            CallbackAction::ShowHistory(id) => format!("h:{}", id),
        }
    }

    pub fn decode(data: &str) -> Option<Self> {
        let (cmd, arg) = data.split_once(':')?;
        match cmd {
            "save" => Some(CallbackAction::SaveMeal),
            "g" => arg.parse().ok().map(CallbackAction::ToggleGuest),
            "r" => arg.parse().ok().map(CallbackAction::ToggleRecipe),
            "h" => arg.parse().ok().map(CallbackAction::ShowHistory),
            _ => None,
        }
    }
}
