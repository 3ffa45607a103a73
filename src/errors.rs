use thiserror::Error;

/// Rejected input, detected before anything is sent to the backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Le titre est obligatoire")]
    EmptyTitle,
    #[error("Les ingrédients sont obligatoires")]
    EmptyIngredients,
    #[error("Les instructions sont obligatoires")]
    EmptyInstructions,
    #[error("Le nom de l'invité est obligatoire")]
    EmptyGuestName,
    #[error("Veuillez sélectionner au moins un invité")]
    NoGuestSelected,
    #[error("Veuillez sélectionner au moins une recette")]
    NoRecipeSelected,
    #[error("Date invalide: {0} (format AAAA-MM-JJ)")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("insert into {table} returned no row")]
    EmptyInsert { table: &'static str },
    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum RecipeBookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RecipeBookError {
    /// Text shown to the user. Backend internals stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            RecipeBookError::Validation(e) => e.to_string(),
            RecipeBookError::Store(_) => crate::constants::OPERATION_FAILED_MSG.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("SUPABASE_URL is not set")]
    MissingEndpoint,
    #[error("SUPABASE_ANON_KEY is not set")]
    MissingCredential,
    #[error("invalid endpoint url {0}")]
    InvalidEndpoint(String),
}
