use thiserror::Error;

/// Reasons a menu is refused. A refused menu never replaces the active one.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu item at position {0} has an empty name")]
    EmptyName(usize),

    #[error("menu item {name:?} has an invalid price {price}")]
    InvalidPrice { name: String, price: f64 },

    /// Two distinct names that normalize to the same match pattern.
    #[error("menu items {first:?} and {second:?} normalize to the same name")]
    Collision { first: String, second: String },

    #[error("could not build a match pattern for {name:?}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Input that does not describe a menu at all.
    #[error("malformed menu data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for MenuError {
    fn from(e: serde_json::Error) -> Self {
        MenuError::Malformed(e.to_string())
    }
}
