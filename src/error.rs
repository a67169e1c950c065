use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unknown league '{league}'; available leagues: {}", .valid.join(", "))]
    UnknownLeague { league: String, valid: Vec<String> },

    #[error("page '{page}' not available; available pages: {}", .valid.join(", "))]
    UnknownPage { page: String, valid: Vec<String> },

    #[error("request to {url} failed: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("{url} rejected the request: {message}")]
    Provider { url: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed record{}: '{field}' {detail}", match_suffix(.match_id))]
    MalformedRecord {
        field: String,
        detail: String,
        match_id: Option<i64>,
    },

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl FetchError {
    pub fn missing(field: &str, match_id: Option<i64>) -> Self {
        FetchError::MalformedRecord {
            field: field.to_string(),
            detail: "is missing".to_string(),
            match_id,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}

fn match_suffix(match_id: &Option<i64>) -> String {
    match match_id {
        Some(id) => format!(" (match {id})"),
        None => String::new(),
    }
}
