//! Update catalog integration.
//!
//! The update service answers one XML document per release describing the
//! extension versions it currently offers for that build. The request URL
//! is assembled from a template by substituting release attributes.

mod http;

pub use http::HttpUpdateCatalog;

use async_trait::async_trait;
use thiserror::Error;

use crate::release::{Release, SystemAddon};

/// Errors from querying the update catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("update catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("update catalog returned HTTP {0}")]
    Unavailable(u16),

    #[error("update catalog response is not valid XML: {0}")]
    Decode(String),
}

/// Trait for update catalog clients.
#[async_trait]
pub trait UpdateCatalog: Send + Sync {
    /// Fetch the extension versions offered for `release`.
    ///
    /// `builtins` does not influence the query; it is passed through for
    /// logging and future request shaping.
    async fn fetch_updates(
        &self,
        release: &Release,
        builtins: &[SystemAddon],
    ) -> Result<Vec<SystemAddon>, CatalogError>;
}

/// Substitute the release attributes into a catalog URL template.
///
/// Eight placeholders, each replaced once: `{VERSION}`, `{BUILD_ID}`,
/// `{BUILD_TARGET}`, `{LOCALE}`, `{CHANNEL}` and the three fixed
/// `"default"` values (`{OS_VERSION}`, `{DISTRIBUTION}`,
/// `{DISTRIBUTION_VERSION}`).
pub fn build_update_url(template: &str, release: &Release) -> String {
    template
        .replacen("{VERSION}", &release.version, 1)
        .replacen("{BUILD_ID}", &release.build_id, 1)
        .replacen("{BUILD_TARGET}", &release.target, 1)
        .replacen("{LOCALE}", &release.locale, 1)
        .replacen("{CHANNEL}", &release.channel, 1)
        .replacen("{OS_VERSION}", "default", 1)
        .replacen("{DISTRIBUTION}", "default", 1)
        .replacen("{DISTRIBUTION_VERSION}", "default", 1)
}

/// Parse the catalog's `<updates><addons><addon …/></addons></updates>`
/// document. Addon elements missing either attribute are ignored.
pub fn parse_update_manifest(xml: &str) -> Result<Vec<SystemAddon>, CatalogError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| CatalogError::Decode(e.to_string()))?;

    Ok(doc
        .descendants()
        .filter(|n| n.tag_name().name() == "addon")
        .filter_map(|n| {
            Some(SystemAddon {
                id: n.attribute("id")?.to_string(),
                version: n.attribute("version")?.to_string(),
            })
        })
        .collect())
}
