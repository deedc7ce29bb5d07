//! droidc: Android UI resource cross-compiler
//!
//! Translates the layouts of an Android `res/` directory into Interface
//! Builder documents with Swift bindings, or into HTML fragments with a CSS
//! stylesheet and TypeScript bindings.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use droidc::{translate_project, Result, TranslatorOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let stats = translate_project(Path::new("app/src/main/res"), Some(Path::new("out")), &TranslatorOptions::default())?;
//!     println!("{} layouts translated", stats.layout_count);
//!     Ok(())
//! }
//! ```
//!
//! # Translation Pipeline
//!
//! 1. **Rules**: built-in rule documents for the target, then user rules
//! 2. **Resources**: the `res/` directory is read and every value resolved
//! 3. **Translation**: each layout variant is rewritten into a destination
//!    tree, with Auto Layout constraints synthesized for iOS
//! 4. **Variants**: variants of one layout are merged into one outlet set
//! 5. **Code Generation**: documents, bindings and the used-resources list

pub mod cli;
pub mod codegen;
pub mod dest;
pub mod error;
pub mod layout;
pub mod res;
pub mod resources;
pub mod rules;
pub mod source;
pub mod style;
pub mod template;
pub mod translator;
pub mod value;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use error::{Result, TranslateError};
pub use resources::{RawResources, ResourceTable};
pub use rules::RuleRegistry;
pub use source::{parse_layout, SourceElement};
pub use translator::{Outlet, Translation, Translator};
pub use value::Value;

/// Translator version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Element kind wrappers and synthetic views are created from.
pub const DEFAULT_BASE_KIND: &str = "View";
pub const USED_RESOURCES_FILE: &str = "used-resources.json";
pub const STYLESHEET_FILE: &str = "styles.css";

/// Output platform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Interface Builder documents with Auto Layout and Swift bindings
    #[default]
    Ios,
    /// HTML fragments, a CSS stylesheet and TypeScript bindings
    Web,
}

impl Target {
    /// Whether layout is expressed as synthesized constraints.
    pub fn uses_constraints(self) -> bool {
        matches!(self, Target::Ios)
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Ios => "ios",
            Target::Web => "web",
        }
    }
}

/// Translation options and settings
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    pub target: Target,

    /// Element kind used for wrappers and spacers
    pub base_kind: String,

    /// Template paths with fixed values, winning over any lookup
    pub overrides: BTreeMap<String, String>,

    /// Theme used for `?attr/` references (defaults to `AppTheme`)
    pub theme: Option<String>,

    /// Extra rule documents or directories, loaded after the built-in rules
    pub rule_paths: Vec<PathBuf>,

    /// Abort the project on the first failed layout file
    pub fail_fast: bool,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            target: Target::default(),
            base_kind: DEFAULT_BASE_KIND.to_string(),
            overrides: BTreeMap::new(),
            theme: None,
            rule_paths: Vec::new(),
            fail_fast: false,
        }
    }
}

/// Translation statistics and metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationStats {
    /// Number of layouts with output
    pub layout_count: usize,

    /// Number of layout files translated, all variants included
    pub variant_count: usize,

    /// Number of source elements translated
    pub element_count: usize,

    /// Number of wrapper views created for forcing attributes
    pub wrapper_count: usize,

    /// Number of spacer and wrapper views created by layout
    pub synthetic_count: usize,

    /// Number of constraints synthesized
    pub constraint_count: usize,

    /// Number of outlets across all bindings
    pub outlet_count: usize,

    /// Number of distinct resources the output uses
    pub resource_count: usize,

    /// Number of files written
    pub file_count: usize,

    /// Number of layout files that failed
    pub failure_count: usize,

    /// One message per failed layout file
    pub failures: Vec<String>,

    /// Translation time in milliseconds
    pub translate_time_ms: u64,
}

/// Built-in rules for the target followed by every configured rule path.
pub fn load_rules(options: &TranslatorOptions) -> Result<RuleRegistry> {
    let mut registry = RuleRegistry::builtin(options.target)?;
    for path in &options.rule_paths {
        let count = if path.is_dir() {
            registry.load_dir(path)?
        } else {
            registry.load_file(path)?
        };
        log::info!("Loaded {} rules from {}", count, path.display());
    }
    log::debug!(
        "Rule registry: {} element rules, {} attribute rules",
        registry.element_count(),
        registry.attribute_count()
    );
    Ok(registry)
}

/// Resolve raw resources under the configured theme.
pub fn resolve_resources(mut raw: RawResources, options: &TranslatorOptions) -> Result<ResourceTable> {
    if options.theme.is_some() {
        raw.theme = options.theme.clone();
    }
    raw.resolve()
}

/// Translate one layout document.
pub fn translate_layout_source(
    xml: &str,
    file: &str,
    registry: &RuleRegistry,
    resources: &ResourceTable,
    options: &TranslatorOptions,
) -> Result<Translation> {
    let root = parse_layout(xml, file)?;
    Translator::new(registry, resources, options).translate(&root, file)
}

/// Combine the variants of one layout. The primary variant's tree is kept;
/// outlets missing from any variant become optional, and outlets only other
/// variants declare are added without a node.
pub fn merge_variants(mut primary: Translation, others: &[Translation]) -> Translation {
    if others.is_empty() {
        return primary;
    }
    let declared_by_all = |name: &str| others.iter().all(|variant| variant.outlet(name).is_some());
    for outlet in &mut primary.outlets {
        if !declared_by_all(&outlet.name) {
            outlet.optional = true;
        }
    }

    let mut known: BTreeSet<String> = primary.outlets.iter().map(|o| o.name.clone()).collect();
    for variant in others {
        for outlet in &variant.outlets {
            if known.insert(outlet.name.clone()) {
                primary.outlets.push(Outlet {
                    name: outlet.name.clone(),
                    type_name: outlet.type_name.clone(),
                    node: None,
                    optional: true,
                });
            }
        }
        primary.used_resources.extend(variant.used_resources.iter().cloned());
    }
    primary
}

/// `res/layout-land/main.xml` → `layout-land/main.xml`.
fn layout_label(path: &Path) -> String {
    let file = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    match path.parent().and_then(Path::file_name) {
        Some(folder) => format!("{}/{}", folder.to_string_lossy(), file),
        None => file.into_owned(),
    }
}

fn translate_file(
    path: &Path,
    label: &str,
    registry: &RuleRegistry,
    resources: &ResourceTable,
    options: &TranslatorOptions,
) -> Result<Translation> {
    let xml = fs::read_to_string(path)?;
    translate_layout_source(&xml, label, registry, resources, options)
}

/// Translate every layout of a `res/` directory, writing the outputs to
/// `output_dir` when one is given.
pub fn translate_project(
    res_dir: &Path,
    output_dir: Option<&Path>,
    options: &TranslatorOptions,
) -> Result<TranslationStats> {
    let start_time = Instant::now();
    log::info!("{} v{}: translating {} for {}", NAME, VERSION, res_dir.display(), options.target.name());

    let registry = load_rules(options)?;
    let directory = res::read_res_dir(res_dir)?;
    log::debug!("Found {} layout files", directory.layout_count());
    let resources = resolve_resources(directory.raw, options)?;

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut stats = TranslationStats::default();
    let mut used = BTreeSet::new();

    for (name, files) in &directory.layouts {
        let mut variants = Vec::new();
        for path in files {
            let label = layout_label(path);
            match translate_file(path, &label, &registry, &resources, options) {
                Ok(translation) => variants.push(translation),
                Err(e) if e.is_file_local() && !options.fail_fast => {
                    log::error!("{}: {}", label, e);
                    stats.failures.push(format!("{label}: {e}"));
                }
                Err(e) => return Err(e),
            }
        }
        stats.variant_count += variants.len();
        for variant in &variants {
            stats.element_count += variant.element_count;
            stats.wrapper_count += variant.wrapper_count;
            stats.synthetic_count += variant.synthetic_count;
            stats.constraint_count += variant.constraint_count();
        }

        let mut variants = variants.into_iter();
        let Some(primary) = variants.next() else {
            log::warn!("Layout '{}' has no translatable variant", name);
            continue;
        };
        let others: Vec<Translation> = variants.collect();
        let translation = merge_variants(primary, &others);

        stats.layout_count += 1;
        stats.outlet_count += translation.outlets.len();
        used.extend(translation.used_resources.iter().cloned());

        let generated = codegen::generate(options.target, &translation, &resources)?;
        if let Some(dir) = output_dir {
            for file in &generated {
                fs::write(dir.join(&file.path), &file.contents)?;
                stats.file_count += 1;
            }
        }
    }

    if let Some(dir) = output_dir {
        if options.target == Target::Web {
            let css = codegen::css::write(&registry, &resources, &options.overrides);
            fs::write(dir.join(STYLESHEET_FILE), css)?;
            stats.file_count += 1;
        }
        let json = serde_json::to_string_pretty(&used).map_err(|e| TranslateError::codegen(e.to_string()))?;
        fs::write(dir.join(USED_RESOURCES_FILE), json)?;
        stats.file_count += 1;
    }

    stats.resource_count = used.len();
    stats.failure_count = stats.failures.len();
    stats.translate_time_ms = start_time.elapsed().as_millis() as u64;
    log::info!(
        "Translated {} layouts ({} failed) in {}ms",
        stats.layout_count,
        stats.failure_count,
        stats.translate_time_ms
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    const COLORS: &str = r##"<resources>
    <color name="accent">#FF5722</color>
    <color name="ink">#212121</color>
</resources>"##;

    const STYLES: &str = r#"<resources>
    <style name="Caption">
        <item name="android:textColor">@color/ink</item>
    </style>
</resources>"#;

    const MAIN: &str = r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"
    android:layout_width="match_parent"
    android:layout_height="match_parent"
    android:orientation="vertical"
    android:background="@color/accent">
    <TextView
        android:id="@+id/title"
        style="@style/Caption"
        android:layout_width="wrap_content"
        android:layout_height="wrap_content"
        android:text="Hello" />
    <Button
        android:id="@+id/submit"
        android:layout_width="match_parent"
        android:layout_height="wrap_content"
        android:text="Go" />
</LinearLayout>"#;

    const MAIN_LAND: &str = r#"<LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"
    android:layout_width="match_parent"
    android:layout_height="match_parent"
    android:orientation="horizontal">
    <TextView
        android:id="@+id/title"
        android:layout_width="wrap_content"
        android:layout_height="wrap_content"
        android:text="Hello" />
    <TextView
        android:id="@+id/subtitle"
        android:layout_width="wrap_content"
        android:layout_height="wrap_content"
        android:text="World" />
</LinearLayout>"#;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let res = dir.path().join("res");
        write(&res, "values/colors.xml", COLORS);
        write(&res, "values/styles.xml", STYLES);
        write(&res, "layout/main.xml", MAIN);
        write(&res, "layout-land/main.xml", MAIN_LAND);
        dir
    }

    #[test]
    fn test_ios_project() {
        let dir = project();
        let out = dir.path().join("out");
        let stats = translate_project(&dir.path().join("res"), Some(&out), &TranslatorOptions::default()).unwrap();

        assert_eq!(stats.layout_count, 1);
        assert_eq!(stats.variant_count, 2);
        assert_eq!(stats.failure_count, 0);
        assert!(stats.constraint_count > 0);

        let xib = fs::read_to_string(out.join("Main.xib")).unwrap();
        assert!(xib.contains(r#"customClass="MainBinding""#));
        assert!(xib.contains(r#"<namedColor name="accent">"#));

        let swift = fs::read_to_string(out.join("MainBinding.swift")).unwrap();
        assert!(swift.contains("@IBOutlet var title: UILabel!"));
        // Missing from the landscape variant.
        assert!(swift.contains("@IBOutlet var submit: UIButton?"));
        // Only declared by the landscape variant.
        assert!(swift.contains("@IBOutlet var subtitle: UILabel?"));

        let used: Vec<String> = serde_json::from_str(&fs::read_to_string(out.join(USED_RESOURCES_FILE)).unwrap()).unwrap();
        assert!(used.contains(&"color/accent".to_string()));
        assert!(used.contains(&"color/ink".to_string()));
    }

    #[test]
    fn test_web_project() {
        let dir = project();
        let out = dir.path().join("out");
        let options = TranslatorOptions {
            target: Target::Web,
            ..TranslatorOptions::default()
        };
        let stats = translate_project(&dir.path().join("res"), Some(&out), &options).unwrap();

        assert_eq!(stats.layout_count, 1);
        assert_eq!(stats.constraint_count, 0);

        let html = fs::read_to_string(out.join("main.html")).unwrap();
        assert!(html.contains(r#"data-outlet="title""#));
        assert!(html.contains("Hello"));

        let ts = fs::read_to_string(out.join("MainBinding.ts")).unwrap();
        assert!(ts.contains("export interface MainBinding {"));
        assert!(ts.contains("submit?: "));

        let css = fs::read_to_string(out.join(STYLESHEET_FILE)).unwrap();
        assert!(css.contains(".style-Caption {"));
    }

    #[test]
    fn test_failed_layout_is_counted() {
        let dir = project();
        let res = dir.path().join("res");
        write(&res, "layout/broken.xml", r#"<NoSuchWidget android:layout_width="wrap_content" />"#);

        let stats = translate_project(&res, None, &TranslatorOptions::default()).unwrap();
        assert_eq!(stats.layout_count, 1);
        assert_eq!(stats.failure_count, 1);
        assert!(stats.failures[0].starts_with("layout/broken.xml"));

        let options = TranslatorOptions {
            fail_fast: true,
            ..TranslatorOptions::default()
        };
        let err = translate_project(&res, None, &options).unwrap_err();
        assert!(matches!(err, TranslateError::NoElementRule { .. }));
    }

    #[test]
    fn test_merge_variants_marks_optional() {
        let registry = RuleRegistry::builtin(Target::Ios).unwrap();
        let resources = RawResources::new()
            .with_color("accent", "#FF5722")
            .with_color("ink", "#212121")
            .with_style(style::StyleDef::new("Caption", None).with_item("android:textColor", "@color/ink"))
            .resolve()
            .unwrap();
        let options = TranslatorOptions::default();

        let main = translate_layout_source(MAIN, "layout/main.xml", &registry, &resources, &options).unwrap();
        let land = translate_layout_source(MAIN_LAND, "layout-land/main.xml", &registry, &resources, &options).unwrap();
        let merged = merge_variants(main, &[land]);

        let title = merged.outlet("title").unwrap();
        assert!(!title.optional);
        assert!(title.node.is_some());
        let subtitle = merged.outlet("subtitle").unwrap();
        assert!(subtitle.optional);
        assert_eq!(subtitle.node, None);
        assert!(merged.outlet("submit").unwrap().optional);
    }

    #[test]
    fn test_layout_label() {
        assert_eq!(layout_label(Path::new("/tmp/res/layout-land/main.xml")), "layout-land/main.xml");
    }
}
