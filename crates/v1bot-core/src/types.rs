use crate::error::{Result, TrackerError};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// AssetType
// ---------------------------------------------------------------------------

/// Work-item kinds known to the tracker.
///
/// `Member`, `StoryStatus` and `Link` are lookup/system types and carry no
/// display-id code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Defect,
    Story,
    Epic,
    Task,
    Goal,
    Request,
    Issue,
    Member,
    StoryStatus,
    Link,
}

impl AssetType {
    pub fn all() -> &'static [AssetType] {
        &[
            AssetType::Defect,
            AssetType::Story,
            AssetType::Epic,
            AssetType::Task,
            AssetType::Goal,
            AssetType::Request,
            AssetType::Issue,
            AssetType::Member,
            AssetType::StoryStatus,
            AssetType::Link,
        ]
    }

    /// Name used in tracker URLs (`/Data/{Type}`) and user-facing summaries.
    pub fn type_name(self) -> &'static str {
        match self {
            AssetType::Defect => "Defect",
            AssetType::Story => "Story",
            AssetType::Epic => "Epic",
            AssetType::Task => "Task",
            AssetType::Goal => "Goal",
            AssetType::Request => "Request",
            AssetType::Issue => "Issue",
            AssetType::Member => "Member",
            AssetType::StoryStatus => "StoryStatus",
            AssetType::Link => "Link",
        }
    }

    /// Short alias used in display identifiers ("D-1234"), where one exists.
    pub fn code(self) -> Option<&'static str> {
        match self {
            AssetType::Defect => Some("D"),
            AssetType::Story => Some("B"),
            AssetType::Epic => Some("E"),
            AssetType::Task => Some("TK"),
            AssetType::Goal => Some("G"),
            AssetType::Request => Some("R"),
            AssetType::Issue => Some("I"),
            AssetType::Member | AssetType::StoryStatus | AssetType::Link => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl std::str::FromStr for AssetType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        AssetType::all()
            .iter()
            .copied()
            .find(|t| t.type_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TrackerError::UnknownTypeCode(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AttrValue / RawAsset
// ---------------------------------------------------------------------------

/// A scalar or multi-valued attribute as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttrValue {
    /// Flatten to a single string; list values are joined with `", "`.
    pub fn as_text(&self) -> String {
        match self {
            AttrValue::Scalar(s) => s.clone(),
            AttrValue::List(v) => v.join(", "),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            AttrValue::Scalar(s) if s.is_empty() => Vec::new(),
            AttrValue::Scalar(s) => vec![s],
            AttrValue::List(v) => v,
        }
    }
}

/// The schema-free product of parsing one `<Asset>` element: the internal
/// reference plus attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    pub oid: String,
    pub href: Option<String>,
    pub attrs: Vec<(String, AttrValue)>,
}

impl RawAsset {
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A typed work-item record. Constructed from one XML payload per request
/// and discarded after use; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub asset_type: AssetType,
    /// Opaque internal reference ("Defect:1234"), required for mutations.
    pub oid: String,
    /// Human-facing display number ("D-1234").
    pub number: String,
    pub name: String,
    pub status: Option<String>,
    pub owners: Vec<String>,
    pub extra: BTreeMap<String, AttrValue>,
}

impl Asset {
    /// Check a raw element against the per-type field schema.
    ///
    /// `Name` and `Number` are required; a present element missing either
    /// fails with `MalformedResponse` rather than yielding a partially
    /// populated record. An empty `Status.Name` means "no status".
    pub fn from_raw(asset_type: AssetType, raw: RawAsset) -> Result<Self> {
        let mut name = None;
        let mut number = None;
        let mut status = None;
        let mut owners = Vec::new();
        let mut extra = BTreeMap::new();

        for (field, value) in raw.attrs {
            match field.as_str() {
                "Name" => name = Some(value.as_text()),
                "Number" => number = Some(value.as_text()),
                "Status.Name" => {
                    let s = value.as_text();
                    if !s.is_empty() {
                        status = Some(s);
                    }
                }
                "Owners.Name" => owners = value.into_list(),
                _ => {
                    extra.insert(field, value);
                }
            }
        }

        Ok(Asset {
            asset_type,
            oid: raw.oid,
            number: number.ok_or_else(|| TrackerError::malformed("Number"))?,
            name: name.ok_or_else(|| TrackerError::malformed("Name"))?,
            status,
            owners,
            extra,
        })
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A tracker link asset. Created only, never read back in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub url: String,
    pub target: String,
    pub on_menu: bool,
}

// ---------------------------------------------------------------------------
// StateTransition / OwnerOp
// ---------------------------------------------------------------------------

/// Lifecycle operations posted as `?op=` against an asset endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    Activate,
    Inactivate,
    Reactivate,
}

impl StateTransition {
    pub fn as_str(self) -> &'static str {
        match self {
            StateTransition::Activate => "Activate",
            StateTransition::Inactivate => "Inactivate",
            StateTransition::Reactivate => "Reactivate",
        }
    }
}

impl fmt::Display for StateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an `Owners` relation diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerOp {
    Add,
    Remove,
}

impl OwnerOp {
    /// Value of the `act` attribute on the relation diff.
    pub fn as_act(self) -> &'static str {
        match self {
            OwnerOp::Add => "add",
            OwnerOp::Remove => "remove",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
