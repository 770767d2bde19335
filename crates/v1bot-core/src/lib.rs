//! Core library for a VersionOne-style issue-tracker integration.
//!
//! Everything network-facing goes through the [`Transport`] seam, so the
//! whole crate is testable against scripted responses. The typical wiring:
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use v1bot_core::{
//!     paths, AssetClient, AssetRepository, Formatter, HttpTransport, IdentifierResolver,
//!     MappingStore, TrackerConfig, TypeCodeTable,
//! };
//!
//! # fn main() -> v1bot_core::Result<()> {
//! let cfg = TrackerConfig::load(paths::config_path(Path::new(".")))?;
//! let transport = Arc::new(HttpTransport::from_config(&cfg));
//! let client = Arc::new(AssetClient::new(cfg.base_url(), transport));
//! let resolver = IdentifierResolver::new(client.clone(), TypeCodeTable::default());
//! let store = MappingStore::new(&cfg.data_dir);
//! let repo = AssetRepository::new(client, resolver, &store)?;
//! let formatter = Formatter::from_config(&cfg);
//!
//! let defect = repo.find_by_display_number(v1bot_core::AssetType::Defect, "D-01234")?;
//! println!("{}", formatter.format_asset(&defect));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod mapping;
pub mod paths;
pub mod query;
pub mod repository;
pub mod resolver;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::AssetClient;
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use format::Formatter;
pub use mapping::{MappingDomain, MappingStore};
pub use query::Query;
pub use repository::{AssetRepository, NICK_DOMAIN, PROJECT_DOMAIN};
pub use resolver::{IdentifierResolver, TypeCodeTable};
pub use transport::{HttpTransport, Transport};
pub use types::{Asset, AssetType, AttrValue, Link, OwnerOp, RawAsset, StateTransition};
