//! Pipeline lifecycle integration tests.
//!
//! These run the whole pipeline (walker, inspector pool, publisher)
//! against mock listing/catalog/store implementations and a real archive
//! fixture built with the same crates production uses. The fixture is
//! pre-placed under the download cache so the inspection's existence check
//! skips the network fetch.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use addonwatch_core::{
    testing::{MockListingSource, MockUpdateCatalog, MockVersionStore},
    ArchiveFetcher, Config, Inspector, Pipeline, PipelineError, ReleaseWalker, StoreError,
    SystemAddon,
};

const ROOT: &str = "https://example.test/pub/firefox/";

const APPLICATION_INI: &str = "\
[App]
Vendor=Mozilla
Name=Firefox
Version=52.0
BuildID=20170302120751
SourceRepository=https://hg.mozilla.org/releases/mozilla-release
";

fn install_rdf(id: &str, version: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description about="urn:mozilla:install-manifest">
    <em:id>{id}</em:id>
    <em:version>{version}</em:version>
  </Description>
</RDF>
"#
    )
}

fn xpi_bytes(id: &str, version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("install.rdf", options).unwrap();
    writer
        .write_all(install_rdf(id, version).as_bytes())
        .unwrap();
    writer.finish().unwrap().into_inner()
}

/// A release archive with one metadata file and two bundled extensions.
fn write_release_archive(path: &Path) {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let entries: Vec<(&str, Vec<u8>)> = vec![
        (
            "firefox/application.ini",
            APPLICATION_INI.as_bytes().to_vec(),
        ),
        (
            "firefox/browser/features/aushelper@mozilla.org.xpi",
            xpi_bytes("aushelper@mozilla.org", "2.0"),
        ),
        (
            "firefox/browser/features/flyweb@mozilla.org.xpi",
            xpi_bytes("flyweb@mozilla.org", "1.0"),
        ),
        ("firefox/libxul.so", b"not extracted".to_vec()),
    ];

    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_slice())
            .unwrap();
    }

    let bytes = builder.into_inner().unwrap().finish().unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

struct TestHarness {
    listing: Arc<MockListingSource>,
    catalog: Arc<MockUpdateCatalog>,
    store: Arc<MockVersionStore>,
    config: Config,
    _download_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let download_dir = TempDir::new().expect("Failed to create download dir");

        let mut config = Config::default();
        config.delivery.root_url = ROOT.to_string();
        config.delivery.nightly.channels = vec![];
        config.delivery.download_dir = download_dir.path().to_path_buf();
        config.pipeline.workers = 4;

        Self {
            listing: Arc::new(MockListingSource::new()),
            catalog: Arc::new(MockUpdateCatalog::new()),
            store: Arc::new(MockVersionStore::new()),
            config,
            _download_dir: download_dir,
        }
    }

    /// Seed the listing tree with one matching release and pre-place its
    /// archive in the download cache.
    async fn seed_release(&self, version: &str, filename: &str) {
        self.listing
            .set_prefixes(
                &format!("{ROOT}releases/"),
                &[&format!("{version}/")],
            )
            .await;
        self.listing
            .set_prefixes(
                &format!("{ROOT}releases/{version}/"),
                &["linux-x86_64/"],
            )
            .await;
        self.listing
            .set_prefixes(
                &format!("{ROOT}releases/{version}/linux-x86_64/"),
                &["en-US/"],
            )
            .await;
        self.listing
            .set_files(
                &format!("{ROOT}releases/{version}/linux-x86_64/en-US/"),
                &[filename],
            )
            .await;

        write_release_archive(
            &self
                .config
                .delivery
                .download_dir
                .join("linux-x86_64")
                .join("en-US")
                .join(filename),
        );
    }

    fn pipeline(&self) -> Pipeline {
        let walker = ReleaseWalker::new(self.listing.clone(), &self.config.delivery)
            .expect("Failed to build walker");
        let inspector = Inspector::new(
            ArchiveFetcher::new(Duration::from_secs(5)),
            self.catalog.clone(),
            self.config.delivery.download_dir.clone(),
            &self.config.inspect.include_pattern,
        )
        .expect("Failed to build inspector");

        Pipeline::new(walker, inspector, self.store.clone(), &self.config.pipeline)
    }
}

#[tokio::test]
async fn test_pipeline_publishes_inspected_release() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;
    harness
        .catalog
        .set_updates(vec![SystemAddon {
            id: "aushelper@mozilla.org".to_string(),
            version: "2.1".to_string(),
        }])
        .await;

    let report = harness.pipeline().run().await.unwrap();
    assert_eq!(report.published, 1);
    assert_eq!(report.already_known, 0);

    let records = harness.store.records().await;
    assert_eq!(records.len(), 1);
    let info = records.values().next().unwrap();

    // Metadata overwrote the walker's placeholders before the catalog ran.
    assert_eq!(info.release.build_id, "20170302120751");
    assert_eq!(info.release.channel, "release");
    assert_eq!(info.release.version, "52.0");

    // Both bundled extensions, in extraction order.
    assert_eq!(
        info.builtins,
        vec![
            SystemAddon {
                id: "aushelper@mozilla.org".to_string(),
                version: "2.0".to_string(),
            },
            SystemAddon {
                id: "flyweb@mozilla.org".to_string(),
                version: "1.0".to_string(),
            },
        ]
    );
    assert_eq!(info.updates.len(), 1);
    assert_eq!(info.updates[0].version, "2.1");

    // The catalog saw the fully-populated release.
    let queries = harness.catalog.recorded_queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].build_id, "20170302120751");
    assert_eq!(queries[0].channel, "release");
}

#[tokio::test]
async fn test_pipeline_second_run_is_idempotent() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;

    let first = harness.pipeline().run().await.unwrap();
    assert_eq!(first.published, 1);

    let second = harness.pipeline().run().await.unwrap();
    assert_eq!(second.published, 0);
    assert_eq!(second.already_known, 1);
    assert_eq!(harness.store.record_count().await, 1);
}

#[tokio::test]
async fn test_pipeline_low_water_mark_skips_known_versions() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;
    harness.store.set_last_published("52.0").await;

    let report = harness.pipeline().run().await.unwrap();
    assert_eq!(report.published, 0);
    assert_eq!(report.already_known, 0);
    assert_eq!(harness.store.record_count().await, 0);
}

#[tokio::test]
async fn test_pipeline_surfaces_inspection_failure() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;

    // Corrupt the cached archive.
    let archive = harness
        .config
        .delivery
        .download_dir
        .join("linux-x86_64")
        .join("en-US")
        .join("firefox-52.0.tar.gz");
    std::fs::write(&archive, b"not a gzip stream").unwrap();

    let err = harness.pipeline().run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Archive(_)));
    assert_eq!(harness.store.record_count().await, 0);
}

#[tokio::test]
async fn test_pipeline_publish_failure_cancels_run() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;
    harness
        .store
        .set_publish_error(StoreError::Rejected(403))
        .await;

    let err = harness.pipeline().run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Store(StoreError::Rejected(403))));
    assert_eq!(harness.store.record_count().await, 0);
}

#[tokio::test]
async fn test_pipeline_resolver_failure_aborts_before_discovery() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;
    harness.store.set_read_error(StoreError::Status(503)).await;

    let err = harness.pipeline().run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Store(StoreError::Status(503))));
    // Discovery never started.
    assert!(harness.listing.recorded_fetches().await.is_empty());
}

#[tokio::test]
async fn test_pipeline_catalog_failure_surfaces() {
    let harness = TestHarness::new().await;
    harness.seed_release("52.0", "firefox-52.0.tar.gz").await;
    harness
        .catalog
        .set_next_error(addonwatch_core::CatalogError::Unavailable(503))
        .await;

    let err = harness.pipeline().run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Catalog(_)));
    assert_eq!(harness.store.record_count().await, 0);
}
