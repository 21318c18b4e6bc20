//! End-to-end rendering: interpolation, modifiers, control flow, and the
//! context-aware escaping contract.

use serde_json::json;
use tannin::{Engine, Settings};

fn render(source: &str, bindings: serde_json::Value) -> String {
    let engine = Engine::new();
    let mut tpl = engine.from_string(source);
    if let serde_json::Value::Object(map) = bindings {
        tpl.set_context(map);
    }
    tpl.render().expect("render succeeds")
}

#[test]
fn plain_interpolation() {
    assert_eq!(
        render("<p>{$name}</p>", json!({"name": "Ricardo"})),
        "<p>Ricardo</p>"
    );
}

#[test]
fn modifier_chain() {
    assert_eq!(
        render("<p>{$name.upper()}</p>", json!({"name": "Ricardo"})),
        "<p>RICARDO</p>"
    );
    assert_eq!(
        render("<p>{$name.truncate(3).upper()}</p>", json!({"name": "Ricardo"})),
        "<p>RIC...</p>"
    );
}

#[test]
fn nested_path_access() {
    assert_eq!(
        render(
            "{$user.profile.name}",
            json!({"user": {"profile": {"name": "Ada"}}})
        ),
        "Ada"
    );
}

#[test]
fn undefined_variable_is_silent() {
    assert_eq!(render("a{$ghost}b", json!({})), "ab");
    assert_eq!(render("a{$user.missing.deep}b", json!({"user": {}})), "ab");
}

#[test]
fn undefined_variable_still_feeds_modifiers() {
    assert_eq!(
        render("{$ghost.default(\"fallback\")}", json!({})),
        "fallback"
    );
}

#[test]
fn if_word_and_symbol_operators_are_equivalent() {
    let bindings = json!({"name": "Ricardo"});
    let word = render(
        "{if $name eq \"Ricardo\"}YES{else}NO{endif}",
        bindings.clone(),
    );
    let symbol = render("{if $name == \"Ricardo\"}YES{else}NO{endif}", bindings);
    assert_eq!(word, "YES");
    assert_eq!(word, symbol);
}

#[test]
fn elseif_chain() {
    let source = "{if $n gt 10}big{elseif $n gt 5}mid{else}small{endif}";
    assert_eq!(render(source, json!({"n": 20})), "big");
    assert_eq!(render(source, json!({"n": 7})), "mid");
    assert_eq!(render(source, json!({"n": 1})), "small");
}

#[test]
fn loop_binds_position_and_value_in_order() {
    let users = json!({"users": [
        {"name": "ana"}, {"name": "bo"}, {"name": "cy"},
    ]});
    assert_eq!(
        render("{loop $i,$u in $users}{$i}:{$u.name}<br>{endloop}", users),
        "0:ana<br>1:bo<br>2:cy<br>"
    );
}

#[test]
fn loop_over_empty_collection_emits_nothing() {
    assert_eq!(
        render("x{loop $u in $users}{$u}{endloop}y", json!({"users": []})),
        "xy"
    );
    assert_eq!(render("x{loop $u in $users}{$u}{endloop}y", json!({})), "xy");
}

#[test]
fn loop_over_object_binds_property_names() {
    assert_eq!(
        render(
            "{loop $k,$v in $scores}{$k}={$v};{endloop}",
            json!({"scores": {"ana": 1, "bo": 2}})
        ),
        "ana=1;bo=2;"
    );
}

#[test]
fn loop_variable_is_scoped() {
    assert_eq!(
        render(
            "{loop $u in $users}{$u}{endloop}[{$u}]",
            json!({"users": ["x"], "u": "outer"})
        ),
        "x[outer]"
    );
}

#[test]
fn for_and_endfor_are_aliases() {
    assert_eq!(
        render("{for $x in $xs}{$x},{endfor}", json!({"xs": [1, 2]})),
        "1,2,"
    );
}

#[test]
fn switch_renders_first_matching_case() {
    let source = "{switch $kind}{case a}A{endcase}{case b}B{endcase}{default}?{endswitch}";
    assert_eq!(render(source, json!({"kind": "a"})), "A");
    assert_eq!(render(source, json!({"kind": "b"})), "B");
    assert_eq!(render(source, json!({"kind": "z"})), "?");
}

#[test]
fn attribute_value_is_percent_encoded() {
    assert_eq!(
        render(
            "<a href=\"{$js}\">x</a>",
            json!({"js": "javascript: alert('x');"})
        ),
        "<a href=\"javascript%3A+alert%28%27x%27%29%3B\">x</a>"
    );
}

#[test]
fn context_escaping_depends_on_position_not_value() {
    let value = json!({"v": "it's"});
    // Plain text: HTML entities.
    assert_eq!(render("<p>{$v}</p>", value.clone()), "<p>it&#x27;s</p>");
    // Quoted attribute: percent-encoding.
    assert_eq!(
        render("<i data-x=\"{$v}\">.</i>", value.clone()),
        "<i data-x=\"it%27s\">.</i>"
    );
    // Script block: JS string literal.
    assert_eq!(
        render("<script>var v = {$v};</script>", value),
        "<script>var v = \"it\\'s\";</script>"
    );
}

#[test]
fn ignore_context_round_trip() {
    let bindings = json!({"x": "<b>&</b>"});
    assert_eq!(
        render("{$x}", bindings.clone()),
        "&lt;b&gt;&amp;&lt;/b&gt;"
    );
    assert_eq!(render("{$x.ignoreContext()}", bindings), "<b>&</b>");
}

#[test]
fn script_context_serializes_structures_as_json() {
    assert_eq!(
        render(
            "<script>var data = {$data.ignoreContext().jsonEncode()};</script>",
            json!({"data": {"a": 1}})
        ),
        "<script>var data = {\"a\":1};</script>"
    );
    assert_eq!(
        render("<script>var xs = {$xs};</script>", json!({"xs": [1, 2]})),
        "<script>var xs = [1,2];</script>"
    );
}

#[test]
fn unknown_modifier_degrades_inline() {
    // The marker is produced before the automatic context escape, so its
    // quotes arrive entity-encoded in text position.
    let out = render("a {$x.nope()} b", json!({"x": 1}));
    assert!(out.contains("[invalid modifier"), "got: {out}");
    assert!(out.contains("nope"), "got: {out}");
    assert!(out.starts_with("a "));
    assert!(out.ends_with(" b"));

    let raw = render("{$x.nope().ignoreContext()}", json!({"x": 1}));
    assert_eq!(raw, "[invalid modifier 'nope']");
}

#[test]
fn failing_modifier_degrades_inline() {
    let out = render("x{$s.truncate()}y", json!({"s": "abc"}));
    assert!(out.contains("<b>truncate</b>"), "got: {out}");
    assert!(out.starts_with('x'));
    assert!(out.ends_with('y'));
}

#[test]
fn tn_if_macro() {
    let source = "<div tn-if=\"$show\">shown</div>";
    assert_eq!(render(source, json!({"show": true})), "<div>shown</div>");
    assert_eq!(render(source, json!({"show": false})), "");
}

#[test]
fn tn_loop_macro() {
    assert_eq!(
        render(
            "<li tn-loop=\"$u in $users\">{$u.name}</li>",
            json!({"users": [{"name": "a"}, {"name": "b"}, {"name": "c"}]})
        ),
        "<li>a</li><li>b</li><li>c</li>"
    );
}

#[test]
fn tn_macro_respects_nested_same_tag() {
    assert_eq!(
        render(
            "<div tn-if=\"$show\">a<div>b</div>c</div>",
            json!({"show": 1})
        ),
        "<div>a<div>b</div>c</div>"
    );
}

#[test]
fn literal_braces_pass_through() {
    assert_eq!(
        render("<style>p { color: red }</style>", json!({})),
        "<style>p { color: red }</style>"
    );
    assert_eq!(render("x {notadirective} y", json!({})), "x {notadirective} y");
}

#[test]
fn indirect_key_lookup() {
    assert_eq!(
        render(
            "{$items.$which}",
            json!({"items": {"a": "first", "b": "second"}, "which": "b"})
        ),
        "second"
    );
}

#[test]
fn context_awareness_can_be_disabled() {
    let engine = Engine::with_settings(Settings {
        context_aware: false,
        ..Settings::default()
    });
    let mut tpl = engine.from_string("<p>{$x}</p>");
    tpl.assign("x", "<raw>");
    assert_eq!(tpl.render().unwrap(), "<p><raw></p>");
}

#[test]
fn unclosed_directive_aborts_with_eval_error() {
    let engine = Engine::new();
    let tpl = engine.from_string("{if $a}never closed");
    let err = tpl.render().unwrap_err();
    assert!(matches!(err, tannin::RenderError::Eval { .. }));
}
