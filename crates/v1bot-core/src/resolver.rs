use crate::client::AssetClient;
use crate::error::{Result, TrackerError};
use crate::query::Query;
use crate::types::AssetType;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

// ---------------------------------------------------------------------------
// TypeCodeTable
// ---------------------------------------------------------------------------

/// Immutable alias table mapping display-id codes ("D", "B", "TK", ...) to
/// asset types. Fixed configuration injected at construction, not a process
/// global and not runtime-extensible.
#[derive(Debug, Clone)]
pub struct TypeCodeTable {
    entries: Vec<(String, AssetType)>,
}

impl TypeCodeTable {
    pub fn from_pairs(pairs: &[(&str, AssetType)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(code, ty)| (code.to_string(), *ty))
                .collect(),
        }
    }

    /// Case-insensitive lookup; the original command hooks accepted
    /// `d-1234` and `D-1234` alike.
    pub fn type_for(&self, code: &str) -> Result<AssetType> {
        self.entries
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, ty)| *ty)
            .ok_or_else(|| TrackerError::UnknownTypeCode(code.to_string()))
    }
}

impl Default for TypeCodeTable {
    fn default() -> Self {
        Self::from_pairs(&[
            ("D", AssetType::Defect),
            ("B", AssetType::Story),
            ("E", AssetType::Epic),
            ("TK", AssetType::Task),
            ("G", AssetType::Goal),
            ("R", AssetType::Request),
            ("I", AssetType::Issue),
        ])
    }
}

// ---------------------------------------------------------------------------
// IdentifierResolver
// ---------------------------------------------------------------------------

static DISPLAY_ID_RE: OnceLock<Regex> = OnceLock::new();

fn display_id_re() -> &'static Regex {
    DISPLAY_ID_RE.get_or_init(|| Regex::new(r"^([A-Za-z]+)-([0-9]+)$").unwrap())
}

/// Translates human-facing display identifiers ("D-1234") into asset types
/// and internal references.
pub struct IdentifierResolver {
    client: Arc<AssetClient>,
    table: TypeCodeTable,
}

impl IdentifierResolver {
    pub fn new(client: Arc<AssetClient>, table: TypeCodeTable) -> Self {
        Self { client, table }
    }

    pub fn code_to_type(&self, code: &str) -> Result<AssetType> {
        self.table.type_for(code)
    }

    /// Split a display id at its first hyphen into `(type, numeric suffix)`.
    ///
    /// `MalformedId` when there is no `<letters>-<digits>` shape at all;
    /// `UnknownTypeCode` when the shape is fine but the code is not in the
    /// table. Callers can tell the two apart.
    pub fn parse_display_id(&self, id: &str) -> Result<(AssetType, String)> {
        let caps = display_id_re()
            .captures(id)
            .ok_or_else(|| TrackerError::MalformedId(id.to_string()))?;
        let ty = self.code_to_type(&caps[1])?;
        Ok((ty, caps[2].to_string()))
    }

    /// Resolve a display id to the tracker's opaque internal reference.
    /// One client round trip.
    pub fn resolve_oid(&self, display_id: &str) -> Result<String> {
        let (ty, _) = self.parse_display_id(display_id)?;
        let query = Query::new(ty)
            .select(["Number"])
            .filter("Number", display_id);
        let raw = self
            .client
            .query_first(&query)?
            .ok_or_else(|| TrackerError::NotFound(display_id.to_string()))?;
        debug!(display_id, oid = %raw.oid, "resolved display id");
        Ok(raw.oid)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
