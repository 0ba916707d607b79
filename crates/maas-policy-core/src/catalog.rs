//! Static reference sets of teams and models.

use serde::{Deserialize, Serialize};

use crate::model::{Model, Team};

/// Color used for teams the catalog does not know.
pub const DEFAULT_TEAM_COLOR: &str = "#1976d2";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub teams: Vec<Team>,
    pub models: Vec<Model>,
}

impl Catalog {
    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Display name, falling back to the id.
    pub fn team_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.team(id).map(|t| t.name.as_str()).unwrap_or(id)
    }

    /// Display name, falling back to the id.
    pub fn model_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.model(id).map(|m| m.name.as_str()).unwrap_or(id)
    }

    pub fn team_color(&self, id: &str) -> &str {
        self.team(id).map(|t| t.color.as_str()).unwrap_or(DEFAULT_TEAM_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog {
            teams: vec![Team { id: "cto".into(), name: "CTO".into(), color: "#7b1fa2".into() }],
            models: vec![Model {
                id: "phi-4".into(),
                name: "Phi-4".into(),
                provider: "Microsoft".into(),
                description: None,
            }],
        }
    }

    #[test]
    fn lookups_fall_back_for_unknown_ids() {
        let c = catalog();
        assert_eq!(c.team_name("cto"), "CTO");
        assert_eq!(c.team_name("legal"), "legal");
        assert_eq!(c.model_name("phi-4"), "Phi-4");
        assert_eq!(c.model_name("gpt-4"), "gpt-4");
        assert_eq!(c.team_color("cto"), "#7b1fa2");
        assert_eq!(c.team_color("legal"), DEFAULT_TEAM_COLOR);
    }
}
