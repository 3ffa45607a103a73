pub const OPERATION_FAILED_MSG: &str = "L'opération a échoué. Réessayez plus tard.";
pub const NO_GUESTS_MSG: &str = "Aucun invité enregistré. Ajoutez-en un avec /invite [nom].";
pub const NO_RECIPES_MSG: &str = "Aucune recette enregistrée. Ajoutez-en une avec /recette.";
pub const NO_MATCH_MSG: &str = "Aucune recette ne correspond à votre recherche.";
pub const NO_MEALS_MSG: &str = "Cet invité n'a participé à aucun repas enregistré.";
pub const NO_FORM_MSG: &str = "Ce formulaire n'est plus actif. Recommencez avec /repas.";
pub const SUBMIT_IN_FLIGHT_MSG: &str = "Enregistrement en cours...";
pub const SKIP_FIELD: &str = "-";

pub const SUPABASE_REST_PATH: &str = "rest/v1";
pub const DEFAULT_DB_PATH: &str = "recettes.sqlite";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HISTORY_CONCURRENCY: usize = 4;

pub const RECIPES_TABLE: &str = "recipes";
pub const GUESTS_TABLE: &str = "guests";
pub const MEALS_TABLE: &str = "meals";
pub const MEAL_GUESTS_TABLE: &str = "meal_guests";
pub const MEAL_RECIPES_TABLE: &str = "meal_recipes";
