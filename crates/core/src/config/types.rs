use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
///
/// Every field has a default reproducing the system's stock deployment, so
/// an empty TOML file (or env overrides alone) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub inspect: InspectConfig,
    #[serde(default)]
    pub update_catalog: UpdateCatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Release delivery tree configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Root of the directory-listing tree (must end with `/`).
    #[serde(default = "default_root_url")]
    pub root_url: String,
    /// Product name, used as the filename prefix of nightly builds.
    #[serde(default = "default_product")]
    pub product: String,
    /// Where downloaded archives are cached, as `target/locale/filename`.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// What to do when a listing fetch fails below the `releases/` root.
    #[serde(default)]
    pub walk_policy: WalkPolicy,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub nightly: NightlyConfig,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            product: default_product(),
            download_dir: default_download_dir(),
            walk_policy: WalkPolicy::default(),
            selection: SelectionConfig::default(),
            nightly: NightlyConfig::default(),
        }
    }
}

fn default_root_url() -> String {
    "https://archive.mozilla.org/pub/firefox/".to_string()
}

fn default_product() -> String {
    "firefox".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("archives")
}

/// Failure policy for listing fetches below the dated-release root.
///
/// The `releases/` root fetch itself is always fatal; secondary nightly
/// channels are always tolerated.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WalkPolicy {
    /// Abort the whole discovery run on any listing failure.
    #[default]
    Abort,
    /// Log the failure and skip that one branch of the tree.
    SkipBranch,
}

/// Selection predicates, applied at the four levels of the release tree.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Matched against the bare version string (prefix minus trailing `/`).
    #[serde(default = "default_version_pattern")]
    pub version: String,
    /// Matched against the target prefix as listed.
    #[serde(default = "default_target_pattern")]
    pub target: String,
    /// Matched against the locale prefix as listed.
    #[serde(default = "default_locale_pattern")]
    pub locale: String,
    /// Matched against leaf file names.
    #[serde(default = "default_filename_pattern")]
    pub filename: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            version: default_version_pattern(),
            target: default_target_pattern(),
            locale: default_locale_pattern(),
            filename: default_filename_pattern(),
        }
    }
}

fn default_version_pattern() -> String {
    "^[5-9][0-9]".to_string()
}

fn default_target_pattern() -> String {
    "linux-.+".to_string()
}

fn default_locale_pattern() -> String {
    "en-US".to_string()
}

fn default_filename_pattern() -> String {
    r"\.tar\.(gz|bz2)$".to_string()
}

/// Nightly channel discovery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NightlyConfig {
    /// Channels scanned in order, one release emitted per channel.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    /// Channel whose discovery failure aborts the run. Failures of the
    /// other channels are logged and skipped.
    #[serde(default = "default_primary_channel")]
    pub primary: String,
    /// Path of a channel's listing under the root; `{CHANNEL}` is
    /// substituted.
    #[serde(default = "default_channel_path")]
    pub path_template: String,
}

impl Default for NightlyConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            primary: default_primary_channel(),
            path_template: default_channel_path(),
        }
    }
}

fn default_channels() -> Vec<String> {
    vec!["central".to_string(), "aurora".to_string()]
}

fn default_primary_channel() -> String {
    "central".to_string()
}

fn default_channel_path() -> String {
    "nightly/latest-mozilla-{CHANNEL}/".to_string()
}

/// Archive inspection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InspectConfig {
    /// Entries extracted from a release archive: the build metadata file
    /// and the bundled extension manifests.
    #[serde(default = "default_include_pattern")]
    pub include_pattern: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            include_pattern: default_include_pattern(),
        }
    }
}

fn default_include_pattern() -> String {
    r"(application\.ini|browser/features/.+\.xpi)$".to_string()
}

/// Update catalog service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateCatalogConfig {
    /// URL template with `{VERSION}`, `{BUILD_ID}`, `{BUILD_TARGET}`,
    /// `{LOCALE}`, `{CHANNEL}`, `{OS_VERSION}`, `{DISTRIBUTION}` and
    /// `{DISTRIBUTION_VERSION}` placeholders.
    #[serde(default = "default_catalog_template")]
    pub url_template: String,
}

impl Default for UpdateCatalogConfig {
    fn default() -> Self {
        Self {
            url_template: default_catalog_template(),
        }
    }
}

fn default_catalog_template() -> String {
    "https://aus5.mozilla.org/update/3/SystemAddons/{VERSION}/{BUILD_ID}/{BUILD_TARGET}/{LOCALE}/{CHANNEL}/{OS_VERSION}/{DISTRIBUTION}/{DISTRIBUTION_VERSION}/update.xml"
        .to_string()
}

/// Remote record store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Store API root, e.g. `https://kinto.example.net/v1`.
    #[serde(default = "default_store_url")]
    pub base_url: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Full `Authorization` header value, if the store requires one.
    #[serde(default)]
    pub auth: Option<String>,
    /// Restrict the low-water-mark query to one release channel.
    #[serde(default)]
    pub channel_filter: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            bucket: default_bucket(),
            collection: default_collection(),
            auth: None,
            channel_filter: None,
        }
    }
}

fn default_store_url() -> String {
    "https://kinto-ota.dev.mozaws.net/v1".to_string()
}

fn default_bucket() -> String {
    "systemaddons".to_string()
}

fn default_collection() -> String {
    "versions".to_string()
}

/// Pipeline concurrency configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Fixed inspector pool size.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Timeout applied to every HTTP client, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_workers() -> usize {
    10
}

fn default_http_timeout() -> u64 {
    30
}
