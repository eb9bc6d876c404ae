//! `{{name}}` variable interpolation (spec §4.B "template grammar").
//!
//! Substitution is a single non-recursive pass: unknown names are left as
//! literal `{{name}}` text.

use std::collections::BTreeMap;

use serde_json::Value;

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Replace every `{{NAME}}` occurrence in `content` with the stringified
/// value of the matching entry in `variables`. Names not present in
/// `variables` are left untouched.
#[must_use]
pub fn interpolate(content: &str, variables: &BTreeMap<String, Value>) -> String {
    let mut out = String::with_capacity(content.len());
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if content[i..].starts_with("{{") {
            if let Some(end) = content[i + 2..].find("}}") {
                let name = content[i + 2..i + 2 + end].trim();
                if let Some(value) = variables.get(name) {
                    out.push_str(&stringify(value));
                    i += 2 + end + 2;
                    continue;
                }
            }
        }
        // Not a recognized token; copy one char forward.
        let ch = content[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn substitutes_known_variable() {
        let vars = vars(&[("name", json!("world"))]);
        assert_eq!(interpolate("hi {{name}}", &vars), "hi world");
    }

    #[test]
    fn unknown_name_left_as_is() {
        let vars = vars(&[]);
        assert_eq!(interpolate("cmd:{{cmd}}", &vars), "cmd:{{cmd}}");
    }

    #[test]
    fn non_string_values_stringify() {
        let vars = vars(&[("count", json!(5)), ("flag", json!(true))]);
        assert_eq!(interpolate("n={{count}} f={{flag}}", &vars), "n=5 f=true");
    }

    #[test]
    fn substitution_is_non_recursive() {
        // If a variable's own value looks like a token, it is not
        // re-expanded.
        let vars = vars(&[("a", json!("{{b}}")), ("b", json!("real"))]);
        assert_eq!(interpolate("{{a}}", &vars), "{{b}}");
    }

    #[test]
    fn multiple_occurrences_all_substituted() {
        let vars = vars(&[("x", json!(1))]);
        assert_eq!(interpolate("{{x}}-{{x}}", &vars), "1-1");
    }
}
