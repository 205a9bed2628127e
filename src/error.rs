#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("form error: {reason}")]
    Form { reason: String },

    #[error("submit error: {reason}")]
    Submit { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
