//! End-to-end rewriting over fixture trees, driven by JSON options.

use resolvext_core::{transform_source, Error, RawOptions, ResolutionContext, ResolveOptions};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn options(json: &str) -> ResolveOptions {
    let raw: RawOptions = serde_json::from_str(json).unwrap();
    ResolveOptions::from_raw(&raw).unwrap()
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn transform(dir: &TempDir, source: &str, options: &ResolveOptions) -> Result<String, Error> {
    let file = dir.path().join("src").join("entry.mjs");
    let ctx = ResolutionContext::new(file, options).with_global_dirs(Vec::new());
    transform_source(source, &ctx).map(|out| out.code)
}

#[test]
fn test_first_rule_wins() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/bar.mjs", "");
    write(dir.path(), "src/bar.js", "");

    let opts = options(r#"{"extensions": [".mjs", ".js"]}"#);
    assert_eq!(
        transform(&dir, "import bar from './bar';", &opts).unwrap(),
        "import bar from './bar.mjs';"
    );

    let opts = options(r#"{"extensions": [".js", ".mjs"]}"#);
    assert_eq!(
        transform(&dir, "import bar from './bar';", &opts).unwrap(),
        "import bar from './bar.js';"
    );
}

#[test]
fn test_rename_rule() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/bar.mjs", "");

    let opts = options(r#"{"extensions": [[".mjs", ".js"]]}"#);
    assert_eq!(
        transform(&dir, "export * from \"./bar\";", &opts).unwrap(),
        "export * from \"./bar.js\";"
    );
}

#[test]
fn test_directory_index() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/lib/index.js", "");

    let opts = options(r#"{"extensions": [".js"]}"#);
    assert_eq!(
        transform(&dir, "import lib from './lib';", &opts).unwrap(),
        "import lib from './lib/index.js';"
    );
    assert_eq!(
        transform(&dir, "import lib from './lib/';", &opts).unwrap(),
        "import lib from './lib/index.js';"
    );
}

#[test]
fn test_qualified_specifiers_are_idempotent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/bar.mjs", "");

    let opts = options(r#"{"extensions": [".mjs"]}"#);
    let once = transform(&dir, "import bar from './bar';", &opts).unwrap();
    let twice = transform(&dir, &once, &opts).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_unresolved_policy() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/.keep", "");

    let opts = options(r#"{"extensions": [".js"]}"#);
    let err = transform(&dir, "import m from './missing';", &opts).unwrap_err();
    assert!(matches!(err, Error::UnresolvedPath { .. }));

    let opts = options(r#"{"extensions": [".js"], "ignoreUnresolved": true}"#);
    assert_eq!(
        transform(&dir, "import m from './missing';", &opts).unwrap(),
        "import m from './missing';"
    );
}

#[test]
fn test_urls_and_builtins_untouched() {
    let dir = tempdir().unwrap();
    let opts = options(r#"{"extensions": [".js"]}"#);
    let source = "import x from 'https://example.com/x.js';\nimport fs from 'fs';\nimport p from 'node:path';\n";
    assert_eq!(transform(&dir, source, &opts).unwrap(), source);
}

#[test]
fn test_package_main_entry() {
    let dir = tempdir().unwrap();
    write(dir.path(), "node_modules/my-pkg/package.json", r#"{"main": "lib/index"}"#);
    write(dir.path(), "node_modules/my-pkg/lib/index.js", "");

    let opts = options(
        r#"{"module": {"entry": [{"kind": "manifestField", "field": "main", "extensions": [".js"]}]}}"#,
    );
    assert_eq!(
        transform(&dir, "import pkg from 'my-pkg';", &opts).unwrap(),
        "import pkg from 'my-pkg/lib/index.js';"
    );
}

#[test]
fn test_entry_descriptors_in_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "node_modules/my-pkg/package.json", r#"{"main": "main"}"#);
    write(dir.path(), "node_modules/my-pkg/index.mjs", "");

    // `main` has no matching file, so the literal path is used.
    let opts = options(
        r#"{"module": {"entry": [
            {"kind": "manifestField", "field": "module", "extensions": [".mjs"]},
            {"kind": "manifestField", "field": "main", "extensions": [".js"]},
            {"kind": "literalPath", "path": "./index", "extensions": [".mjs"]}
        ]}}"#,
    );
    assert_eq!(
        transform(&dir, "import pkg from 'my-pkg';", &opts).unwrap(),
        "import pkg from 'my-pkg/index.mjs';"
    );
}

#[test]
fn test_ignore_exports_wins_over_literal_path() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "node_modules/my-pkg/package.json",
        r#"{"exports": {".": "./index.js"}}"#,
    );
    write(dir.path(), "node_modules/my-pkg/index.js", "");
    write(dir.path(), "node_modules/my-pkg/sub.js", "");

    let opts = options(
        r#"{"extensions": [".js"], "ignoreExports": true,
            "module": {"entry": [{"kind": "literalPath", "path": "index", "extensions": [".js"]}]}}"#,
    );
    let source = "import a from 'my-pkg';\nimport b from 'my-pkg/sub';\n";
    assert_eq!(transform(&dir, source, &opts).unwrap(), source);
}

#[test]
fn test_scoped_submodule() {
    let dir = tempdir().unwrap();
    write(dir.path(), "node_modules/@scope/name/sub.cjs", "");

    let opts = options(r#"{"extensions": [".js"], "submodule": {"extensions": [".cjs"]}}"#);
    assert_eq!(
        transform(&dir, "const m = await import('@scope/name/sub');", &opts).unwrap(),
        "const m = await import('@scope/name/sub.cjs');"
    );
}

#[test]
fn test_missing_package_always_errors() {
    let dir = tempdir().unwrap();
    let opts = options(r#"{"extensions": [".js"], "ignoreUnresolved": true}"#);
    let err = transform(&dir, "import x from 'absent/sub';", &opts).unwrap_err();
    assert!(matches!(err, Error::PackageNotFound { .. }));
}

#[test]
#[serial]
fn test_submodule_resolution_ignores_cwd() {
    let project = tempdir().unwrap();
    write(project.path(), "node_modules/dep/fp.js", "");
    let elsewhere = tempdir().unwrap();
    write(elsewhere.path(), "node_modules/dep/fp.mjs", "");

    let opts = options(r#"{"extensions": [".mjs", ".js"]}"#);
    let original = std::env::current_dir().unwrap();

    std::env::set_current_dir(elsewhere.path()).unwrap();
    let result = transform(&project, "import fp from 'dep/fp';", &opts);
    std::env::set_current_dir(original).unwrap();

    assert_eq!(result.unwrap(), "import fp from 'dep/fp.js';");
}
