use indexmap::IndexMap;
use otter::runtime::RuntimeContext;
use otter::variables::substitute;

fn ctx_with(pairs: &[(&str, &str)]) -> RuntimeContext {
    let env = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    RuntimeContext::new("linux", "x86_64", "/tmp", env)
}

fn vars(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_no_placeholders_is_a_fixed_point() {
    let ctx = ctx_with(&[("NAME", "env-value")]);
    let text = "plain text with $DOLLAR but no placeholder";
    assert_eq!(substitute(text, &vars(&[("NAME", "x")]), &ctx), text);
}

#[test]
fn test_plan_variables_win_over_environment() {
    let ctx = ctx_with(&[("OTTER_NAME", "scoped"), ("NAME", "plain")]);
    let result = substitute("${NAME}", &vars(&[("NAME", "config")]), &ctx);
    assert_eq!(result, "config");
}

#[test]
fn test_scoped_environment_beats_plain_environment() {
    let ctx = ctx_with(&[("OTTER_NAME", "scoped"), ("NAME", "plain")]);
    assert_eq!(substitute("${NAME}", &vars(&[]), &ctx), "scoped");
}

#[test]
fn test_scoped_lookup_uppercases_the_name() {
    let ctx = ctx_with(&[("OTTER_PROJECT", "demo")]);
    assert_eq!(substitute("${project}", &vars(&[]), &ctx), "demo");
}

#[test]
fn test_plain_environment_fallback() {
    let ctx = ctx_with(&[("HOME", "/home/me")]);
    assert_eq!(substitute("root=${HOME}", &vars(&[]), &ctx), "root=/home/me");
}

#[test]
fn test_empty_environment_value_falls_through() {
    let ctx = ctx_with(&[("OTTER_NAME", ""), ("NAME", "plain")]);
    assert_eq!(substitute("${NAME}", &vars(&[]), &ctx), "plain");
}

#[test]
fn test_unresolved_placeholder_left_verbatim() {
    let ctx = ctx_with(&[]);
    assert_eq!(substitute("v=${MISSING}", &vars(&[]), &ctx), "v=${MISSING}");
}

#[test]
fn test_malformed_placeholder_left_untouched() {
    let ctx = ctx_with(&[]);
    let vars = vars(&[("NAME", "x")]);
    assert_eq!(substitute("${NAME", &vars, &ctx), "${NAME");
}

#[test]
fn test_multiple_placeholders_in_one_string() {
    let ctx = ctx_with(&[]);
    let vars = vars(&[("A", "1"), ("B", "2")]);
    assert_eq!(substitute("${A}/${B}/${C}", &vars, &ctx), "1/2/${C}");
}
