//! Source-tree scan, per-document transform and output writing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use same_file::is_same_file;
use walkdir::WalkDir;

use crate::config::BundleConfig;
use crate::document::HtmlDocument;
use crate::error::BundleError;
use crate::models::{EntryPointRegistry, ResourceKind, SourceKind};
use crate::resources::{extract_references, group_adjacent};
use crate::synthesize::synthesize_group;

/// Run the whole pipeline: scan the source tree, bundle and rewrite every
/// document, copy passthrough assets, and return the entry-point registry
/// for the downstream compiler.
///
/// The caller guarantees an empty destination and staging tree beforehand.
/// Any read or write failure aborts the run; partial output is acceptable
/// because the external cleanup step re-runs before every invocation.
pub fn run(config: &BundleConfig) -> Result<EntryPointRegistry, BundleError> {
    if !config.source_root.is_dir() {
        return Err(BundleError::MissingSourceRoot {
            path: config.source_root.clone(),
        });
    }

    let (documents, passthrough) = scan_source_tree(config)?;

    let mut registry = EntryPointRegistry::default();
    for path in &documents {
        registry = transform_document(path, config, registry)?;
    }

    for path in &passthrough {
        copy_passthrough(path, config)?;
    }

    Ok(registry)
}

/// Collect document and passthrough paths under the source root. Bundlable
/// sources are neither returned nor copied: they reach the output only
/// through the bundles that import them.
fn scan_source_tree(config: &BundleConfig) -> Result<(Vec<PathBuf>, Vec<PathBuf>), BundleError> {
    let mut documents = Vec::new();
    let mut passthrough = Vec::new();

    for entry in WalkDir::new(&config.source_root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.source_root.clone());
            BundleError::Read {
                path,
                source: err.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        match SourceKind::classify(entry.path()) {
            SourceKind::Document => documents.push(entry.into_path()),
            SourceKind::Passthrough => passthrough.push(entry.into_path()),
            SourceKind::Bundlable => {}
        }
    }

    Ok((documents, passthrough))
}

/// Bundle one document and write its rewritten form to the destination
/// tree, threading the registry through as an explicit accumulator.
///
/// Both kinds are discovered and grouped before any rewriting: in
/// development mode a style group is rewritten to a `<script>` element, and
/// extracting scripts from the mutated tree would re-ingest that injected
/// reference as a bundlable source. Styles are synthesized before scripts,
/// and strictly in document order within each kind; grouping and bundle
/// content order depend on it.
fn transform_document(
    path: &Path,
    config: &BundleConfig,
    mut registry: EntryPointRegistry,
) -> Result<EntryPointRegistry, BundleError> {
    let doc = HtmlDocument::load(path, &config.source_root)?;

    let grouped = [ResourceKind::Style, ResourceKind::Script]
        .map(|kind| (kind, group_adjacent(extract_references(&doc, kind, config), kind)));

    for (kind, groups) in grouped {
        for (index, group) in groups.iter().enumerate() {
            let bundle = synthesize_group(&doc, group, kind, index, config)?;
            registry.insert(bundle.entry_key, bundle.staging_path);
        }
    }

    let destination = destination_path(path, config);
    let rendered = doc
        .serialize()
        .map_err(|source| BundleError::write(&destination, source))?;
    write_output(&destination, rendered.as_bytes())?;
    Ok(registry)
}

/// Destination location for a source file, preserving its relative layout.
fn destination_path(path: &Path, config: &BundleConfig) -> PathBuf {
    let relative = path.strip_prefix(&config.source_root).unwrap_or(path);
    config.dest_root.join(relative)
}

fn write_output(path: &Path, contents: &[u8]) -> Result<(), BundleError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BundleError::write(parent, source))?;
    }
    fs::write(path, contents).map_err(|source| BundleError::write(path, source))
}

/// Copy a passthrough asset to its destination byte-for-byte.
fn copy_passthrough(path: &Path, config: &BundleConfig) -> Result<(), BundleError> {
    let destination = destination_path(path, config);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| BundleError::write(parent, source))?;
    }
    install_asset(path, &destination).map_err(|source| BundleError::write(&destination, source))
}

/// Install an asset at its destination, preferring a hard link and falling
/// back to a plain copy on filesystems that refuse one.
fn install_asset(source: &Path, destination: &Path) -> std::io::Result<()> {
    if destination.exists() {
        if is_same_file(source, destination)? {
            return Ok(());
        }
        fs::remove_file(destination)?;
    }

    match fs::hard_link(source, destination) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(_) => fs::copy(source, destination).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Site {
        _root: tempfile::TempDir,
        config: BundleConfig,
    }

    impl Site {
        fn new(dev_mode: bool) -> Self {
            let root = tempdir().unwrap();
            let config = BundleConfig {
                source_root: root.path().join("src"),
                dest_root: root.path().join("dest"),
                staging_root: root.path().join("tmp"),
                dev_mode,
            };
            fs::create_dir_all(&config.source_root).unwrap();
            Self {
                _root: root,
                config,
            }
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.config.source_root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn dest(&self, relative: &str) -> String {
            fs::read_to_string(self.config.dest_root.join(relative)).unwrap()
        }

        fn staging(&self, relative: &str) -> String {
            fs::read_to_string(self.config.staging_root.join(relative)).unwrap()
        }
    }

    const SCENARIO: &str = concat!(
        "<html><head></head><body>",
        r#"<link rel="stylesheet" href="a.css">"#,
        r#"<link rel="stylesheet" href="b.css">"#,
        "<p>x</p>",
        r#"<script src="c.js"></script>"#,
        r#"<script src="d.js"></script>"#,
        "</body></html>",
    );

    #[test]
    fn missing_source_root_aborts_before_any_output() {
        let site = Site::new(false);
        let config = BundleConfig {
            source_root: site.config.source_root.join("nope"),
            ..site.config.clone()
        };
        let err = run(&config).unwrap_err();
        assert!(matches!(err, BundleError::MissingSourceRoot { .. }));
        assert!(!config.dest_root.exists());
    }

    #[test]
    fn bundles_the_two_group_scenario() {
        let site = Site::new(false);
        site.write("app/index.html", SCENARIO);
        site.write("app/a.css", "a{}");
        site.write("app/b.css", "b{}");
        site.write("app/c.js", "c()");
        site.write("app/d.js", "d()");

        let registry = run(&site.config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("app/index-styles").unwrap(),
            [site.config.staging_root.join("app/index-styles.js")]
        );
        assert_eq!(
            registry.get("app/index-scripts").unwrap(),
            [site.config.staging_root.join("app/index-scripts.js")]
        );

        assert_eq!(
            site.staging("app/index-styles.js"),
            "import '../../src/app/a.css';\nimport '../../src/app/b.css';"
        );
        assert_eq!(
            site.staging("app/index-scripts.js"),
            "import '../../src/app/c.js';\nimport '../../src/app/d.js';"
        );

        let html = site.dest("app/index.html");
        assert!(html.contains(r#"href="/app/index-styles.css""#));
        assert!(html.contains(r#"rel="stylesheet""#));
        assert!(html.contains(r#"<script src="/app/index-scripts.js">"#));
        assert!(html.contains("<p>x</p>"));
        // Each bundled reference appears exactly once.
        assert_eq!(html.matches("index-styles").count(), 1);
        assert_eq!(html.matches("index-scripts").count(), 1);
        assert!(!html.contains("a.css"));
        assert!(!html.contains("d.js"));
        // The paragraph sits between the style and script references.
        let style_at = html.find("index-styles").unwrap();
        let p_at = html.find("<p>x</p>").unwrap();
        let script_at = html.find("index-scripts").unwrap();
        assert!(style_at < p_at && p_at < script_at);
    }

    #[test]
    fn development_mode_rewrites_styles_as_scripts() {
        let site = Site::new(true);
        site.write("index.html", SCENARIO);

        let registry = run(&site.config).unwrap();
        let html = site.dest("index.html");
        assert!(html.contains(r#"<script src="/index-styles.js">"#));
        assert!(!html.contains("stylesheet"));
        // Script groups are rewritten identically in both modes.
        assert!(html.contains(r#"<script src="/index-scripts.js">"#));
        // Exactly one entry per group; the injected style-bundle script must
        // not spawn extra script bundles.
        assert_eq!(registry.len(), 2);
        assert!(registry.get("index-styles").is_some());
        assert!(registry.get("index-scripts").is_some());
    }

    #[test]
    fn injected_style_bundle_references_are_not_rebundled_as_scripts() {
        let site = Site::new(true);
        site.write(
            "index.html",
            concat!(
                r#"<link rel="stylesheet" href="a.css">"#,
                "<body><p>x</p>",
                r#"<script src="c.js"></script>"#,
                "</body>",
            ),
        );

        let registry = run(&site.config).unwrap();
        let keys: Vec<&String> = registry.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["index-scripts", "index-styles"]);

        let html = site.dest("index.html");
        assert!(html.contains(r#"<script src="/index-styles.js">"#));
        assert!(html.contains(r#"<script src="/index-scripts.js">"#));

        // The script bundle imports only authored sources, never the script
        // element injected for the style group.
        let scripts = site.staging("index-scripts.js");
        assert!(scripts.contains("c.js"));
        assert!(!scripts.contains("index-styles"));
        assert!(!site.config.staging_root.join("index-scripts-1.js").exists());
    }

    #[test]
    fn external_and_inline_references_survive_untouched() {
        let site = Site::new(false);
        site.write(
            "index.html",
            concat!(
                "<body>",
                r#"<script src="a.js"></script>"#,
                r#"<script src="https://cdn.example.com/lib.js"></script>"#,
                "<script>window.boot()</script>",
                r#"<script src="b.js"></script>"#,
                "</body>",
            ),
        );

        let registry = run(&site.config).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("index-scripts").is_some());
        assert!(registry.get("index-scripts-1").is_some());

        let html = site.dest("index.html");
        assert!(html.contains(r#"<script src="https://cdn.example.com/lib.js">"#));
        assert!(html.contains("<script>window.boot()</script>"));
    }

    #[test]
    fn output_write_failures_name_the_destination_path() {
        let site = Site::new(false);
        site.write("index.html", "<p>x</p>");
        // Occupy the destination root with a regular file so writing the
        // rewritten document fails.
        fs::write(&site.config.dest_root, "not a directory").unwrap();

        let err = run(&site.config).unwrap_err();
        match err {
            BundleError::Write { path, .. } => {
                assert!(path.starts_with(&site.config.dest_root));
            }
            other => panic!("expected a write error, got {other}"),
        }
    }

    #[test]
    fn copies_passthrough_assets_and_skips_bundlable_sources() {
        let site = Site::new(false);
        site.write("index.html", r#"<script src="app.js"></script>"#);
        site.write("app.js", "boot()");
        site.write("img/logo.svg", "<svg/>");
        site.write("notes.txt", "hello");

        run(&site.config).unwrap();
        assert_eq!(site.dest("img/logo.svg"), "<svg/>");
        assert_eq!(site.dest("notes.txt"), "hello");
        // Bundlable sources reach the output only through the compiler.
        assert!(!site.config.dest_root.join("app.js").exists());
    }

    #[test]
    fn reruns_are_deterministic() {
        let site = Site::new(false);
        site.write("app/index.html", SCENARIO);
        site.write("index.html", r#"<link rel="stylesheet" href="root.css">"#);

        let first = run(&site.config).unwrap();
        let first_html = site.dest("app/index.html");
        let first_styles = site.staging("app/index-styles.js");

        fs::remove_dir_all(&site.config.dest_root).unwrap();
        fs::remove_dir_all(&site.config.staging_root).unwrap();

        let second = run(&site.config).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.to_json_pretty().unwrap(),
            second.to_json_pretty().unwrap()
        );
        assert_eq!(site.dest("app/index.html"), first_html);
        assert_eq!(site.staging("app/index-styles.js"), first_styles);
    }
}
