//! Keyword classification of free-form project descriptions

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::ProjectType;

const GAME_KEYWORDS: &[&str] = &["game", "gaming", "multiplayer", "matchmaking", "게임"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub project_type: ProjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

/// Map a description to a project type. Descriptions without a game
/// keyword are web services.
pub fn classify(description: &str) -> Classification {
    let lowered = description.to_lowercase();

    match GAME_KEYWORDS.iter().find(|kw| lowered.contains(*kw)) {
        Some(keyword) => Classification {
            project_type: ProjectType::Game,
            matched_keyword: Some(keyword.to_string()),
        },
        None => Classification {
            project_type: ProjectType::WebService,
            matched_keyword: None,
        },
    }
}
