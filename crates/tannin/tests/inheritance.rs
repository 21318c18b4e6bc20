//! Template inheritance: blocks, overrides, and extends chains.

use serde_json::json;
use tannin::{Engine, RenderError, Settings};
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
fn block_without_inheritance_renders_its_own_content() {
    let engine = Engine::new();
    let tpl = engine.from_string("A{block x}inner{endblock}B");
    assert_eq!(tpl.render().unwrap(), "AinnerB");
}

#[test]
fn child_block_overrides_base_block() {
    let (engine, _dir) = engine_with_templates(&[(
        "base.html",
        "<header>{block \"x\"}base{endblock}</header>",
    )]);
    let tpl = engine
        .from_string("{extends \"base.html\"}{block \"x\"}child{endblock}");
    assert_eq!(tpl.render().unwrap(), "<header>child</header>");
}

#[test]
fn base_block_is_the_fallback() {
    let (engine, _dir) = engine_with_templates(&[(
        "base.html",
        "{block title}base title{endblock}|{block body}base body{endblock}",
    )]);
    let tpl = engine.from_string("{extends \"base.html\"}{block body}child body{endblock}");
    assert_eq!(tpl.render().unwrap(), "base title|child body");
}

#[test]
fn child_output_outside_blocks_is_discarded() {
    let (engine, _dir) =
        engine_with_templates(&[("base.html", "[{block x}b{endblock}]")]);
    let tpl = engine.from_string("{extends \"base.html\"}IGNORED{block x}o{endblock}IGNORED");
    assert_eq!(tpl.render().unwrap(), "[o]");
}

#[test]
fn bindings_flow_into_the_base_render() {
    let (engine, _dir) =
        engine_with_templates(&[("base.html", "<title>{$site}: {block t}{endblock}</title>")]);
    let mut tpl = engine.from_string("{extends \"base.html\"}{block t}Home{endblock}");
    tpl.assign("site", "tannin");
    assert_eq!(tpl.render().unwrap(), "<title>tannin: Home</title>");
}

#[test]
fn block_content_is_rendered_before_capture() {
    let (engine, _dir) =
        engine_with_templates(&[("base.html", "{block x}fallback{endblock}")]);
    let mut tpl =
        engine.from_string("{extends \"base.html\"}{block x}Hello {$name.upper()}{endblock}");
    tpl.assign("name", "ada");
    assert_eq!(tpl.render().unwrap(), "Hello ADA");
}

#[test]
fn three_level_chain_prefers_the_deepest_override() {
    let (engine, _dir) = engine_with_templates(&[
        ("grandparent.html", "<{block x}gp{endblock}>"),
        ("parent.html", "{extends \"grandparent.html\"}{block x}p{endblock}"),
    ]);
    let tpl = engine.from_string("{extends \"parent.html\"}{block x}c{endblock}");
    assert_eq!(tpl.render().unwrap(), "<c>");
}

#[test]
fn middle_level_override_survives_when_child_is_silent() {
    let (engine, _dir) = engine_with_templates(&[
        ("grandparent.html", "<{block x}gp{endblock}>"),
        ("parent.html", "{extends \"grandparent.html\"}{block x}p{endblock}"),
    ]);
    let tpl = engine.from_string("{extends \"parent.html\"}");
    assert_eq!(tpl.render().unwrap(), "<p>");
}

#[test]
fn tn_block_macro_participates_in_inheritance() {
    let (engine, _dir) = engine_with_templates(&[(
        "base.html",
        "<main>{block hero}default hero{endblock}</main>",
    )]);
    let tpl = engine
        .from_string("{extends \"base.html\"}<div tn-block=\"hero\">big hero</div>");
    assert_eq!(tpl.render().unwrap(), "<main><div>big hero</div></main>");
}

#[test]
fn double_extends_is_fatal() {
    let (engine, _dir) = engine_with_templates(&[("base.html", "x")]);
    let tpl = engine.from_string("{extends \"base.html\"}{extends \"base.html\"}");
    assert!(matches!(
        tpl.render().unwrap_err(),
        RenderError::MultipleExtends
    ));
}

#[test]
fn missing_base_is_fatal() {
    let engine = Engine::new();
    let tpl = engine.from_string("{extends \"nowhere.html\"}");
    assert!(matches!(
        tpl.render().unwrap_err(),
        RenderError::BaseNotFound(path) if path == "nowhere.html"
    ));
}

#[test]
fn cyclic_extends_hits_the_depth_limit() {
    let (engine, _dir) = engine_with_templates(&[(
        "a.html",
        "{extends \"a.html\"}{block x}loop{endblock}",
    )]);
    let tpl = engine.load("a.html").unwrap();
    assert!(matches!(
        tpl.render().unwrap_err(),
        RenderError::DepthExceeded(_)
    ));
}

#[test]
fn override_applies_per_block_name() {
    let (engine, _dir) = engine_with_templates(&[(
        "base.html",
        "{block a}A{endblock}{block b}B{endblock}{block c}C{endblock}",
    )]);
    let mut tpl = engine.from_string(
        "{extends \"base.html\"}{block a}1{endblock}{block c}{$n}{endblock}",
    );
    tpl.assign("n", json!(3));
    assert_eq!(tpl.render().unwrap(), "1B3");
}
