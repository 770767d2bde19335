use crate::types::AssetType;

/// A filtered query against the tracker's `/Data/{Type}` endpoint.
///
/// Where clauses are AND-joined with `;` and render in insertion order;
/// that order is part of the contract, not an accident of iteration.
/// The tracker's grammar has no escape for the `'` delimiter, so values
/// containing it cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    asset_type: AssetType,
    wheres: Vec<(String, String)>,
    sel: Vec<String>,
}

impl Query {
    pub fn new(asset_type: AssetType) -> Self {
        Self {
            asset_type,
            wheres: Vec::new(),
            sel: Vec::new(),
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.wheres.push((field.into(), value.into()));
        self
    }

    /// Project-scope clause, rendered `Scope='Scope:<id>'`.
    pub fn scope(self, project_id: &str) -> Self {
        self.filter("Scope", format!("Scope:{project_id}"))
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sel.extend(fields.into_iter().map(Into::into));
        self
    }

    /// `{base}/Data/{Type}?sel=f1,f2&where=f1='v1';f2='v2'`.
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}/Data/{}", base, self.asset_type.type_name());
        let mut sep = '?';
        if !self.sel.is_empty() {
            url.push(sep);
            sep = '&';
            url.push_str("sel=");
            url.push_str(&self.sel.join(","));
        }
        if !self.wheres.is_empty() {
            url.push(sep);
            url.push_str("where=");
            let clauses: Vec<String> = self
                .wheres
                .iter()
                .map(|(f, v)| format!("{f}='{v}'"))
                .collect();
            url.push_str(&clauses.join(";"));
        }
        url
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
