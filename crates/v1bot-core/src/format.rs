//! One-line human-readable rendering of assets, with a deep link into the
//! tracker's web UI.

use crate::config::TrackerConfig;
use crate::types::{Asset, AssetType};

const TRACKER_LABEL: &str = "V1";

/// Types whose summaries carry an Assignee clause.
const ASSIGNABLE: [AssetType; 2] = [AssetType::Defect, AssetType::Story];

#[derive(Debug, Clone)]
pub struct Formatter {
    domain: String,
    key: String,
}

impl Formatter {
    pub fn new(domain: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            key: key.into(),
        }
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        Self::new(cfg.domain.clone(), cfg.key.clone())
    }

    /// `"V1 <TypeName> <Number>: <Name>"`, an optional bracketed
    /// status/assignee segment, then the deep link. The Status clause
    /// appears only when the asset has a status; the Assignee clause only
    /// for defects and stories (first owner, `unassigned` when there is
    /// none). No status and no assignee means no bracket at all.
    pub fn format_asset(&self, asset: &Asset) -> String {
        let mut out = format!(
            "{TRACKER_LABEL} {} {}: {}",
            asset.asset_type.type_name(),
            asset.number,
            asset.name
        );

        let mut clauses = Vec::new();
        if let Some(status) = &asset.status {
            clauses.push(format!("Status: {status}"));
        }
        if ASSIGNABLE.contains(&asset.asset_type) {
            let owner = asset.owners.first().map_or("unassigned", String::as_str);
            clauses.push(format!("Assignee: {owner}"));
        }
        if !clauses.is_empty() {
            out.push_str(&format!(" [{}]", clauses.join(", ")));
        }

        out.push_str(&format!(" {}", self.deep_link(asset)));
        out
    }

    /// Web-UI address of one asset.
    pub fn deep_link(&self, asset: &Asset) -> String {
        format!(
            "https://{}/{}/{}.mvc/Summary?oidToken={}",
            self.domain,
            self.key,
            asset.asset_type.type_name(),
            asset.oid
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn asset(ty: AssetType, oid: &str, number: &str, name: &str) -> Asset {
        Asset {
            asset_type: ty,
            oid: oid.to_string(),
            number: number.to_string(),
            name: name.to_string(),
            status: None,
            owners: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    fn formatter() -> Formatter {
        Formatter::new("www1.v1host.com", "AcmeCo")
    }

    #[test]
    fn goal_without_status_has_no_bracket() {
        let mut goal = asset(AssetType::Goal, "Goal:5", "G-5", "Ship it");
        goal.owners = vec!["alice".to_string()];
        assert_eq!(
            formatter().format_asset(&goal),
            "V1 Goal G-5: Ship it \
             https://www1.v1host.com/AcmeCo/Goal.mvc/Summary?oidToken=Goal:5"
        );
    }

    #[test]
    fn defect_shows_status_and_assignee() {
        let mut defect = asset(AssetType::Defect, "Defect:1234", "D-01234", "Broken login");
        defect.status = Some("In Progress".to_string());
        defect.owners = vec!["alice".to_string(), "bob".to_string()];
        assert_eq!(
            formatter().format_asset(&defect),
            "V1 Defect D-01234: Broken login [Status: In Progress, Assignee: alice] \
             https://www1.v1host.com/AcmeCo/Defect.mvc/Summary?oidToken=Defect:1234"
        );
    }

    #[test]
    fn story_without_owners_is_unassigned() {
        let story = asset(AssetType::Story, "Story:7", "B-7", "As a user");
        assert_eq!(
            formatter().format_asset(&story),
            "V1 Story B-7: As a user [Assignee: unassigned] \
             https://www1.v1host.com/AcmeCo/Story.mvc/Summary?oidToken=Story:7"
        );
    }

    #[test]
    fn epic_with_status_shows_status_only() {
        let mut epic = asset(AssetType::Epic, "Epic:3", "E-3", "Big rock");
        epic.status = Some("Active".to_string());
        epic.owners = vec!["carol".to_string()];
        assert_eq!(
            formatter().format_asset(&epic),
            "V1 Epic E-3: Big rock [Status: Active] \
             https://www1.v1host.com/AcmeCo/Epic.mvc/Summary?oidToken=Epic:3"
        );
    }
}
