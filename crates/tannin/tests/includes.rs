//! Includes: nested renders, parameters, diagnostics, and loaders.

use std::io;

use serde_json::json;
use tannin::{ContentCache, Engine, FsCache, RenderError, Settings, TemplateLoader};
use tempfile::TempDir;

fn engine_with_templates(files: &[(&str, &str)]) -> (Engine, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).expect("write template");
    }
    let engine = Engine::with_settings(Settings {
        root: dir.path().to_path_buf(),
        ..Settings::default()
    });
    (engine, dir)
}

#[test]
fn include_substitutes_rendered_child() {
    let (engine, _dir) =
        engine_with_templates(&[("partial.html", "<aside>{$tip}</aside>")]);
    let mut tpl = engine.from_string("before {include partial.html} after");
    tpl.assign("tip", "drink water");
    assert_eq!(
        tpl.render().unwrap(),
        "before <aside>drink water</aside> after"
    );
}

#[test]
fn include_sees_parent_bindings_and_params() {
    let (engine, _dir) = engine_with_templates(&[(
        "card.html",
        "{$title}/{$subtitle}",
    )]);
    let mut tpl = engine.from_string("{include card.html, subtitle=small}");
    tpl.assign("title", "big");
    assert_eq!(tpl.render().unwrap(), "big/small");
}

#[test]
fn include_bare_param_binds_true() {
    let (engine, _dir) = engine_with_templates(&[(
        "flag.html",
        "{if $draft}DRAFT{endif}",
    )]);
    let tpl = engine.from_string("{include flag.html, draft}");
    assert_eq!(tpl.render().unwrap(), "DRAFT");
}

#[test]
fn include_inside_loop_renders_per_iteration() {
    let (engine, _dir) = engine_with_templates(&[("row.html", "<tr>{$row}</tr>")]);
    let mut tpl = engine.from_string("{loop $row in $rows}{include row.html}{endloop}");
    tpl.assign("rows", json!(["a", "b"]));
    assert_eq!(tpl.render().unwrap(), "<tr>a</tr><tr>b</tr>");
}

#[test]
fn missing_include_degrades_to_inline_diagnostic() {
    let engine = Engine::new();
    let tpl = engine.from_string("x{include gone.html}y");
    let out = tpl.render().unwrap();
    assert!(out.starts_with('x'));
    assert!(out.ends_with('y'));
    assert!(out.contains("unable to load file 'gone.html'"), "got: {out}");
    assert!(out.contains("<span"), "diagnostic must be the styled fragment");
}

#[test]
fn broken_include_degrades_to_inline_diagnostic() {
    let (engine, _dir) =
        engine_with_templates(&[("broken.html", "{if $a}never closed")]);
    let tpl = engine.from_string("x{include broken.html}y");
    let out = tpl.render().unwrap();
    assert!(out.starts_with('x') && out.ends_with('y'));
    assert!(out.contains("<span"), "got: {out}");
}

#[test]
fn cyclic_include_hits_the_depth_limit() {
    let (engine, _dir) =
        engine_with_templates(&[("self.html", "{include self.html}")]);
    let tpl = engine.load("self.html").unwrap();
    assert!(matches!(
        tpl.render().unwrap_err(),
        RenderError::DepthExceeded(_)
    ));
}

struct StubRemote;

impl TemplateLoader for StubRemote {
    fn load(&self, _path: &str) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no files here"))
    }

    fn fetch_remote(&self, url: &str) -> io::Result<Vec<u8>> {
        Ok(format!("[remote {url}]").into_bytes())
    }
}

#[test]
fn http_include_goes_through_the_remote_hook() {
    let mut engine = Engine::new();
    engine.set_loader(Box::new(StubRemote));
    let tpl = engine.from_string("{include http://example.com/banner}");
    assert_eq!(tpl.render().unwrap(), "[remote http://example.com/banner]");
}

#[test]
fn http_include_without_remote_support_degrades_inline() {
    let engine = Engine::new();
    let tpl = engine.from_string("{include http://example.com/x}");
    let out = tpl.render().unwrap();
    assert!(out.contains("remote includes are not enabled"), "got: {out}");
}

#[test]
fn render_cache_round_trip() {
    let (mut engine, dir) = engine_with_templates(&[("page.html", "count: {$n}")]);
    let cache_dir = dir.path().join("cache");
    engine.set_cache(Box::new(FsCache::new(
        &cache_dir,
        engine.settings().cache_lifetime,
    )));

    let mut tpl = engine.load("page.html").unwrap();
    tpl.assign("n", 1);
    assert_eq!(tpl.render().unwrap(), "count: 1");

    // The second render is served from the cache even with new bindings.
    let mut tpl = engine.load("page.html").unwrap();
    tpl.assign("n", 2);
    assert_eq!(tpl.render().unwrap(), "count: 1");

    // Invalidation brings back a live render.
    engine
        .cache()
        .expect("cache is set")
        .invalidate(&tannin::cache_key("page.html"));
    let mut tpl = engine.load("page.html").unwrap();
    tpl.assign("n", 3);
    assert_eq!(tpl.render().unwrap(), "count: 3");
}

#[test]
fn string_templates_are_never_cached() {
    let (mut engine, dir) = engine_with_templates(&[]);
    engine.set_cache(Box::new(FsCache::new(
        dir.path().join("cache"),
        engine.settings().cache_lifetime,
    )));
    let mut tpl = engine.from_string("{$n}");
    tpl.assign("n", 1);
    assert_eq!(tpl.render().unwrap(), "1");
    let mut tpl = engine.from_string("{$n}");
    tpl.assign("n", 2);
    assert_eq!(tpl.render().unwrap(), "2");
}
