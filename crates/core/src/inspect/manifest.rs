//! Bundled extension manifest parsing.

use std::io::Read;
use std::path::Path;

use zip::result::ZipError;

use super::InspectError;
use crate::release::SystemAddon;

/// Read the `{id, version}` pair of a bundled extension.
///
/// The extension ships as a zip whose `install.rdf` entry holds a single
/// RDF `Description` of the install manifest.
pub async fn addon_manifest(path: &Path) -> Result<SystemAddon, InspectError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let mut entry = match archive.by_name("install.rdf") {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(InspectError::ManifestMissing(path)),
            Err(e) => return Err(e.into()),
        };

        let mut xml = String::new();
        entry.read_to_string(&mut xml)?;
        parse_install_manifest(&xml)
    })
    .await
    .map_err(|e| InspectError::Io(std::io::Error::other(e)))?
}

/// Parse an install manifest document into a [`SystemAddon`].
pub fn parse_install_manifest(xml: &str) -> Result<SystemAddon, InspectError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| InspectError::ManifestInvalid(e.to_string()))?;

    let description = doc
        .descendants()
        .find(|n| n.tag_name().name() == "Description")
        .ok_or_else(|| InspectError::ManifestInvalid("no Description element".to_string()))?;

    let child_text = |name: &str| {
        description
            .children()
            .find(|n| n.tag_name().name() == name)
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
    };

    let id = child_text("id")
        .ok_or_else(|| InspectError::ManifestInvalid("Description has no id".to_string()))?;
    let version = child_text("version")
        .ok_or_else(|| InspectError::ManifestInvalid("Description has no version".to_string()))?;

    Ok(SystemAddon { id, version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const INSTALL_RDF: &str = r#"<?xml version="1.0"?>
<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description about="urn:mozilla:install-manifest">
    <em:id>aushelper@mozilla.org</em:id>
    <em:version>2.0</em:version>
    <em:type>2</em:type>
  </Description>
</RDF>
"#;

    fn write_xpi(dir: &Path, name: &str, install_rdf: Option<&str>) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        writer.start_file("manifest.json", options).unwrap();
        writer.write_all(b"{}").unwrap();
        if let Some(rdf) = install_rdf {
            writer.start_file("install.rdf", options).unwrap();
            writer.write_all(rdf.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_parse_install_manifest() {
        let addon = parse_install_manifest(INSTALL_RDF).unwrap();
        assert_eq!(addon.id, "aushelper@mozilla.org");
        assert_eq!(addon.version, "2.0");
    }

    #[test]
    fn test_parse_install_manifest_missing_version() {
        let xml = r#"<RDF xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description><em:id>x@mozilla.org</em:id></Description>
</RDF>"#;
        let err = parse_install_manifest(xml).unwrap_err();
        assert!(matches!(err, InspectError::ManifestInvalid(_)));
    }

    #[test]
    fn test_parse_install_manifest_not_xml() {
        let err = parse_install_manifest("{\"not\": \"xml\"}").unwrap_err();
        assert!(matches!(err, InspectError::ManifestInvalid(_)));
    }

    #[tokio::test]
    async fn test_addon_manifest_from_xpi() {
        let dir = TempDir::new().unwrap();
        let path = write_xpi(dir.path(), "aushelper.xpi", Some(INSTALL_RDF));

        let addon = addon_manifest(&path).await.unwrap();
        assert_eq!(addon.id, "aushelper@mozilla.org");
        assert_eq!(addon.version, "2.0");
    }

    #[tokio::test]
    async fn test_addon_manifest_missing_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_xpi(dir.path(), "bare.xpi", None);

        let err = addon_manifest(&path).await.unwrap_err();
        assert!(matches!(err, InspectError::ManifestMissing(_)));
    }
}
