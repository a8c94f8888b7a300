pub mod archive;
pub mod config;
pub mod discovery;
pub mod inspect;
pub mod listing;
pub mod pipeline;
pub mod release;
pub mod store;
pub mod testing;
pub mod update_catalog;

pub use archive::{extract, ArchiveError, ArchiveFetcher};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DeliveryConfig,
    InspectConfig, NightlyConfig, PipelineConfig, SelectionConfig, StoreConfig,
    UpdateCatalogConfig, WalkPolicy,
};
pub use discovery::{ReleaseWalker, Selection, SelectionError, WalkError};
pub use inspect::{addon_manifest, parse_build_metadata, BuildMetadata, InspectError};
pub use listing::{FileEntry, HttpListingSource, ListingError, ListingNode, ListingSource};
pub use pipeline::{Inspector, Pipeline, PipelineError, PipelineReport, Shutdown};
pub use release::{Release, ReleaseInfo, SystemAddon};
pub use store::{record_id, KintoStore, PublishOutcome, StoreError, VersionStore};
pub use update_catalog::{
    build_update_url, parse_update_manifest, CatalogError, HttpUpdateCatalog, UpdateCatalog,
};

/// User-Agent sent on every outbound request.
pub(crate) const USER_AGENT: &str = concat!("addonwatch/", env!("CARGO_PKG_VERSION"));
