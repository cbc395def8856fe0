use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl ToString for Author {
    fn to_string(&self) -> String {
        match self {
            Author::User => return Config::get(ConfigKey::Username),
            Author::Assistant => return String::from("Crewforge"),
        }
    }
}

impl Author {
    /// Prefix used when minting message ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Author::User => return "user",
            Author::Assistant => return "ai",
        }
    }
}
