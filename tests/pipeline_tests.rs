//! Pipeline integration tests
//!
//! End-to-end tests of the build pipeline over a realistic package
//! fixture, with in-process stand-ins for the compiler and bundler
//! subprocesses. Covers:
//!
//! - All four emissions landing in their trees
//! - Placeholder substitution and patch idempotence
//! - Legacy require rewriting against real sibling files
//! - Declarations in both build modes
//! - Failure propagation and patch suppression
//! - Docs assembly

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use distshape::build::{BuildContext, BuildMode, BuildPipeline};
use distshape::bundle::{BundleError, Bundler, BundlerConfig};
use distshape::compiler::{CompileRequest, CompilerError, SourceCompiler};
use distshape::config::default_config;
use distshape::manifest::PackageManifest;
use distshape::patch::patch_tree;

// ============================================================================
// Test Utilities
// ============================================================================

/// Create a package fixture with sources that exercise every rewrite rule.
fn create_project(temp: &TempDir) -> PathBuf {
    let root = temp.path().to_path_buf();

    create_file(
        &root.join("package.json"),
        r#"{
  "name": "@scoped/widget",
  "version": "2.3.1",
  "dependencies": { "left-pad": "^1.3.0" }
}"#,
    );

    create_file(
        &root.join("src/index.ts"),
        "// entry point\nexport const VERSION = \"##VERSION##\";\n\nconst helper = require(\"./helper\");\nconst sub = require(\"./sub\");\n",
    );
    create_file(&root.join("src/helper.ts"), "export function helper() {\n  return 1;\n}\n");
    create_file(&root.join("src/sub/index.ts"), "export {};\n");

    root
}

fn create_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

/// Collect every file under a root, recursively.
fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files
}

/// Compiler stand-in behaving like tsc: a .js, a .d.ts, and a .d.ts.map
/// per source file, with the .js carrying the staged source content.
struct FakeTsc;

impl SourceCompiler for FakeTsc {
    fn compile(&self, request: &CompileRequest) -> Result<(), CompilerError> {
        let pattern = format!("{}/**/*.ts", request.source_dir.display());
        for entry in glob::glob(&pattern).unwrap() {
            let source = entry.unwrap();
            let rel = source.strip_prefix(&request.source_dir).unwrap();
            let content = fs::read_to_string(&source).unwrap();

            let js = request.out_dir.join(rel).with_extension("js");
            fs::create_dir_all(js.parent().unwrap()).unwrap();
            fs::write(&js, &content).unwrap();

            let stem = rel.with_extension("");
            let decl = request.out_dir.join(format!("{}.d.ts", stem.display()));
            fs::write(&decl, "export {};\n").unwrap();
            let map = request.out_dir.join(format!("{}.d.ts.map", stem.display()));
            fs::write(&map, "{\"version\":3}").unwrap();
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "fake tsc".to_string()
    }
}

struct FailingTsc;

impl SourceCompiler for FailingTsc {
    fn compile(&self, _request: &CompileRequest) -> Result<(), CompilerError> {
        Err(CompilerError::EmptyCommand)
    }

    fn describe(&self) -> String {
        "failing tsc".to_string()
    }
}

/// Bundler stand-in that writes a single artifact carrying the version
/// placeholder, as a real bundle of the fixture entry would.
struct FakeWebpack;

impl Bundler for FakeWebpack {
    fn bundle(&self, config: &BundlerConfig) -> Result<(), BundleError> {
        fs::create_dir_all(&config.output_dir).unwrap();
        let content = format!("console.log(\"##VERSION##\",\"{}\");\n", config.mode);
        fs::write(config.output_dir.join(&config.output_filename), content).unwrap();
        Ok(())
    }

    fn describe(&self) -> String {
        "fake webpack".to_string()
    }
}

fn build_pipeline(root: &Path) -> BuildPipeline {
    let manifest = PackageManifest::load(&root.join("package.json")).unwrap();
    let context = BuildContext::new(default_config(), root.to_path_buf(), &manifest);
    BuildPipeline::new(context)
        .with_compiler(Box::new(FakeTsc))
        .with_bundler(Box::new(FakeWebpack))
}

// ============================================================================
// Emission Layout Tests
// ============================================================================

#[test]
fn test_production_build_produces_all_four_emissions() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Production);
    assert!(report.is_success(), "{}", report.summary());

    // Linked library tree
    assert!(root.join("lib/esm/index.js").is_file());
    assert!(root.join("lib/esm/helper.js").is_file());
    assert!(root.join("lib/esm/sub/index.js").is_file());

    // Legacy library tree, renamed
    assert!(root.join("lib/index.cjs").is_file());
    assert!(root.join("lib/helper.cjs").is_file());
    assert!(root.join("lib/sub/index.cjs").is_file());
    assert!(!root.join("lib/index.js").exists());

    // Bundles
    assert!(root.join("dist/esm/bundle.min.esm.js").is_file());
    assert!(root.join("dist/bundle.min.js").is_file());
}

#[test]
fn test_development_build_uses_unminified_filenames() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Development);
    assert!(report.is_success(), "{}", report.summary());

    assert!(root.join("dist/esm/bundle.esm.js").is_file());
    assert!(root.join("dist/bundle.js").is_file());
    assert!(!root.join("dist/bundle.min.js").exists());
}

#[test]
fn test_declarations_present_in_both_modes() {
    for mode in [BuildMode::Development, BuildMode::Production] {
        let temp = TempDir::new().unwrap();
        let root = create_project(&temp);

        let report = build_pipeline(&root).run(mode);
        assert!(report.is_success(), "{}", report.summary());

        for tree in ["lib/esm", "lib"] {
            assert!(root.join(tree).join("index.d.ts").is_file(), "{}: {}", mode, tree);
            assert!(root.join(tree).join("index.d.ts.map").is_file(), "{}: {}", mode, tree);
            assert!(root.join(tree).join("sub/index.d.ts").is_file(), "{}: {}", mode, tree);
        }

        // Declaration names never pick up the legacy extension
        assert!(!root.join("lib/index.d.cjs").exists());
    }
}

// ============================================================================
// Placeholder Tests
// ============================================================================

#[test]
fn test_no_placeholder_survives_a_build() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Production);
    assert!(report.is_success(), "{}", report.summary());

    for tree in ["lib", "dist"] {
        for file in files_under(&root.join(tree)) {
            let content = read(&file);
            assert!(
                !content.contains("##VERSION##"),
                "placeholder survived in {}",
                file.display()
            );
        }
    }

    assert!(read(&root.join("lib/esm/index.js")).contains("\"2.3.1\""));
    assert!(read(&root.join("dist/bundle.min.js")).contains("\"2.3.1\""));
}

#[test]
fn test_patching_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Production);
    assert!(report.is_success(), "{}", report.summary());

    // A second pass over already-patched trees changes nothing
    for tree in ["lib", "dist"] {
        let summary = patch_tree(&root.join(tree), "##VERSION##", "2.3.1").unwrap();
        assert_eq!(summary.patched, 0, "second patch pass touched files under {}", tree);
    }
}

// ============================================================================
// Require Rewrite Tests
// ============================================================================

#[test]
fn test_legacy_requires_point_at_existing_files() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Production);
    assert!(report.is_success(), "{}", report.summary());

    let entry = read(&root.join("lib/index.cjs"));
    assert!(entry.contains("require(\"./helper.cjs\");"), "entry was: {}", entry);
    assert!(entry.contains("require(\"./sub/index.cjs\");"), "entry was: {}", entry);

    // Every rewritten specifier resolves against the emitted tree
    assert!(root.join("lib/helper.cjs").is_file());
    assert!(root.join("lib/sub/index.cjs").is_file());
}

#[test]
fn test_linked_tree_keeps_specifiers_untouched() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Production);
    assert!(report.is_success(), "{}", report.summary());

    let entry = read(&root.join("lib/esm/index.js"));
    assert!(entry.contains("require(\"./helper\");"));
    assert!(!entry.contains(".cjs"));
}

// ============================================================================
// Mode Behavior Tests
// ============================================================================

#[test]
fn test_production_minifies_and_development_does_not() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Production);
    assert!(report.is_success(), "{}", report.summary());
    let prod_entry = read(&root.join("lib/esm/index.js"));
    assert!(!prod_entry.contains("// entry point"));
    assert!(prod_entry.contains("export const VERSION = \"2.3.1\";"));

    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let report = build_pipeline(&root).run(BuildMode::Development);
    assert!(report.is_success(), "{}", report.summary());
    let dev_entry = read(&root.join("lib/esm/index.js"));
    assert!(dev_entry.contains("// entry point"));
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn test_compile_failure_fails_build_and_skips_patch() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);

    let manifest = PackageManifest::load(&root.join("package.json")).unwrap();
    let context = BuildContext::new(default_config(), root.clone(), &manifest);
    let pipeline = BuildPipeline::new(context)
        .with_compiler(Box::new(FailingTsc))
        .with_bundler(Box::new(FakeWebpack));

    let report = pipeline.run(BuildMode::Production);
    assert!(!report.is_success());
    assert_eq!(report.failures()[0].stage_id, "emit:esm");

    // Bundles finished but the patch stage never ran over them
    let bundle = read(&root.join("dist/bundle.min.js"));
    assert!(bundle.contains("##VERSION##"));
    assert!(report.summary().contains("Build failed"));
}

// ============================================================================
// Docs Assembly Tests
// ============================================================================

#[test]
fn test_docs_assembly_copies_assets() {
    let temp = TempDir::new().unwrap();
    let root = create_project(&temp);
    create_file(&root.join("workdocs/assets/logo.png"), "png");
    create_file(&root.join("LICENSE.md"), "MIT");

    let mut config = default_config();
    config.docs.readme_command = vec!["true".to_string()];
    config.docs.docs_command = vec![];

    let manifest = PackageManifest::load(&root.join("package.json")).unwrap();
    let context = BuildContext::new(config, root.clone(), &manifest);

    let summary = distshape::docs::build_docs(&context).unwrap();
    assert_eq!(summary.commands_run, 1);
    assert!(root.join("docs/workdocs/assets/logo.png").is_file());
    assert_eq!(read(&root.join("docs/LICENSE.md")), "MIT");
}
