//! Tracker-specific operations composed from the client, the identifier
//! resolver and the mapping store.
//!
//! Every operation is one or more best-effort round trips with no retries;
//! any sub-step failure surfaces verbatim and a partial mutation is never
//! reported as success.

use crate::client::AssetClient;
use crate::error::{Result, TrackerError};
use crate::mapping::{MappingDomain, MappingStore};
use crate::query::Query;
use crate::resolver::IdentifierResolver;
use crate::types::{Asset, AssetType, Link, OwnerOp, StateTransition};
use crate::xml;
use std::sync::Arc;
use tracing::debug;

/// Mapping domain for project-name → project-id.
pub const PROJECT_DOMAIN: &str = "projname";
/// Mapping domain for chat-nick → tracker username.
pub const NICK_DOMAIN: &str = "v1ircnick";

/// Fields selected for every typed asset read. Queries add caller extras
/// after these, deduplicated.
const CORE_FIELDS: [&str; 4] = ["Name", "Number", "Status.Name", "Owners.Name"];

pub struct AssetRepository {
    client: Arc<AssetClient>,
    resolver: IdentifierResolver,
    projects: MappingDomain,
    nicks: MappingDomain,
}

impl AssetRepository {
    /// All collaborators are constructed once by the caller and injected;
    /// the repository never builds its own client or store.
    pub fn new(
        client: Arc<AssetClient>,
        resolver: IdentifierResolver,
        store: &MappingStore,
    ) -> Result<Self> {
        Ok(Self {
            projects: store.open(PROJECT_DOMAIN)?,
            nicks: store.open(NICK_DOMAIN)?,
            client,
            resolver,
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn find_by_display_number(&self, ty: AssetType, number: &str) -> Result<Asset> {
        let query = Query::new(ty).select(CORE_FIELDS).filter("Number", number);
        let raw = self
            .client
            .query_first(&query)?
            .ok_or_else(|| TrackerError::NotFound(format!("{} {}", ty.type_name(), number)))?;
        Asset::from_raw(ty, raw)
    }

    /// Fetch selected attributes of one asset. Values come back in the exact
    /// order of `fields`; a field absent on the asset yields `None` at that
    /// position, not an error.
    pub fn get_attributes(
        &self,
        ty: AssetType,
        number: &str,
        fields: &[&str],
    ) -> Result<(String, Vec<Option<String>>)> {
        let query = Query::new(ty)
            .select(fields.iter().copied())
            .filter("Number", number);
        let raw = self
            .client
            .query_first(&query)?
            .ok_or_else(|| TrackerError::NotFound(format!("{} {}", ty.type_name(), number)))?;
        let values = fields
            .iter()
            .map(|f| raw.attr(f).map(|v| v.as_text()))
            .collect();
        Ok((raw.oid, values))
    }

    /// General filtered search. Where clauses render in caller order; the
    /// core schema fields are always selected first, caller extras after.
    pub fn find_filtered(
        &self,
        ty: AssetType,
        filters: &[(&str, &str)],
        select: &[&str],
    ) -> Result<Vec<Asset>> {
        let mut query = Query::new(ty).select(selection(select));
        for (field, value) in filters {
            query = query.filter(*field, *value);
        }
        self.client
            .query_all(&query)?
            .into_iter()
            .map(|raw| Asset::from_raw(ty, raw))
            .collect()
    }

    /// Filtered search inside one project. Fixed clause order: the Scope
    /// clause first, then the caller's filters in the order given.
    pub fn find_in_project(
        &self,
        ty: AssetType,
        project: &str,
        filters: &[(&str, &str)],
        select: &[&str],
    ) -> Result<Vec<Asset>> {
        let project_id = self.resolve_project(project)?;
        let mut query = Query::new(ty).select(selection(select)).scope(&project_id);
        for (field, value) in filters {
            query = query.filter(*field, *value);
        }
        self.client
            .query_all(&query)?
            .into_iter()
            .map(|raw| Asset::from_raw(ty, raw))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an asset and return the full typed record.
    ///
    /// The create endpoint answers with only an internal reference, so the
    /// display number has to be read back: create, fetch the new asset by
    /// internal id for its Number, then find by that number. Three round
    /// trips by construction, not an optimization choice.
    pub fn create(
        &self,
        ty: AssetType,
        project: &str,
        title: &str,
        description: &str,
    ) -> Result<Asset> {
        let project_id = self.resolve_project(project)?;
        let body = xml::create_document(title, &project_id, description);
        let doc = self.client.post_asset(ty, None, &body)?;
        let created = xml::parse_first_asset(&doc)?
            .ok_or_else(|| TrackerError::malformed("Asset"))?;
        let internal_id = oid_number(&created.oid)?.to_string();
        let number = self.display_number(ty, &internal_id)?;
        self.find_by_display_number(ty, &number)
    }

    /// One-shot link creation; no verification read.
    pub fn create_link(&self, name: &str, url: &str, target_ref: &str) -> Result<Link> {
        let body = xml::link_document(name, url, true, target_ref);
        self.client.post_asset(AssetType::Link, None, &body)?;
        Ok(Link {
            name: name.to_string(),
            url: url.to_string(),
            target: target_ref.to_string(),
            on_menu: true,
        })
    }

    /// Idempotent overwrite of one scalar attribute.
    pub fn update_field(
        &self,
        ty: AssetType,
        oid: &str,
        field: &str,
        value: &str,
    ) -> Result<()> {
        let id = oid_number(oid)?;
        let body = xml::update_document(field, value);
        self.client.post_asset(ty, Some(id), &body)?;
        Ok(())
    }

    /// Read a scalar field, append `suffix` to it and write it back.
    /// Two round trips, no transaction.
    pub fn append_to_field(
        &self,
        ty: AssetType,
        number: &str,
        field: &str,
        suffix: &str,
    ) -> Result<()> {
        let (oid, values) = self.get_attributes(ty, number, &[field])?;
        let current = values.into_iter().next().flatten().unwrap_or_default();
        let combined = if current.is_empty() {
            suffix.to_string()
        } else {
            format!("{current} {suffix}")
        };
        self.update_field(ty, &oid, field, &combined)
    }

    /// Post a lifecycle transition against the asset behind a display id.
    pub fn set_state(&self, display_id: &str, transition: StateTransition) -> Result<()> {
        let (ty, _) = self.resolver.parse_display_id(display_id)?;
        let oid = self.resolver.resolve_oid(display_id)?;
        self.client
            .post_operation(ty, oid_number(&oid)?, transition.as_str())?;
        Ok(())
    }

    /// Two round trips: look up the named status's internal id, then apply
    /// it as a `set` relation diff on `Status`.
    pub fn set_status(&self, display_id: &str, status_name: &str) -> Result<()> {
        let (ty, _) = self.resolver.parse_display_id(display_id)?;
        let status_query = Query::new(AssetType::StoryStatus)
            .select(["Name"])
            .filter("Name", status_name);
        let status = self
            .client
            .query_first(&status_query)?
            .ok_or_else(|| TrackerError::NotFound(format!("status {status_name}")))?;
        let oid = self.resolver.resolve_oid(display_id)?;
        let body = xml::relation_document("Status", &status.oid, "set");
        self.client.post_asset(ty, Some(oid_number(&oid)?), &body)?;
        Ok(())
    }

    /// Add or remove an owner. `member_ref` is first treated as a chat nick
    /// via the nick mapping; a missing mapping falls back to the literal
    /// string as the tracker username. The username is then resolved to a
    /// Member reference via a lookup query before posting the relation diff.
    pub fn assign(&self, display_id: &str, member_ref: &str, op: OwnerOp) -> Result<()> {
        let username = match self.nicks.get(member_ref) {
            Ok(username) => username,
            Err(TrackerError::MappingKeyAbsent { .. }) => {
                debug!(nick = member_ref, "no nick mapping, using literal username");
                member_ref.to_string()
            }
            Err(e) => return Err(e),
        };
        let member_query = Query::new(AssetType::Member)
            .select(["Username"])
            .filter("Username", &username);
        let member = self
            .client
            .query_first(&member_query)?
            .ok_or_else(|| TrackerError::NotFound(format!("member {username}")))?;

        let (ty, _) = self.resolver.parse_display_id(display_id)?;
        let oid = self.resolver.resolve_oid(display_id)?;
        let body = xml::relation_document("Owners", &member.oid, op.as_act());
        self.client.post_asset(ty, Some(oid_number(&oid)?), &body)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Project name → id through the mapping domain, falling back to the
    /// raw string when no mapping exists (documented contract).
    fn resolve_project(&self, project: &str) -> Result<String> {
        match self.projects.get(project) {
            Ok(id) => Ok(id),
            Err(TrackerError::MappingKeyAbsent { .. }) => {
                debug!(project, "no project mapping, using raw value");
                Ok(project.to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// Read an asset's display number by its internal id.
    fn display_number(&self, ty: AssetType, internal_id: &str) -> Result<String> {
        let raw = self
            .client
            .get_asset(ty, internal_id)?
            .ok_or_else(|| TrackerError::NotFound(format!("{} {}", ty.type_name(), internal_id)))?;
        raw.attr("Number")
            .map(|v| v.as_text())
            .ok_or_else(|| TrackerError::malformed("Number"))
    }
}

/// Numeric part of an oid like `Defect:1234` (or `Defect:1234:105` from the
/// create endpoint's moment reference).
fn oid_number(oid: &str) -> Result<&str> {
    oid.split(':')
        .nth(1)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| TrackerError::malformed(format!("oid {oid}")))
}

/// Core schema fields first, caller extras after, deduplicated.
fn selection(extra: &[&str]) -> Vec<String> {
    let mut fields: Vec<String> = CORE_FIELDS.iter().map(|f| f.to_string()).collect();
    for field in extra {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
