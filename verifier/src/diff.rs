//! Structural JSON diff with dotted paths.

use serde_json::Value;

use crate::report::Mismatch;

/// Diff two JSON documents key-by-key.
///
/// Objects are walked recursively; arrays and scalars are leaves (an array
/// that differs in any element is reported as one mismatch at its path).
/// Paths are dotted: `records.www.A`.
pub fn diff_documents(expected: &Value, actual: &Value) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    diff_value("", expected, actual, &mut mismatches);
    mismatches
}

fn diff_value(path: &str, expected: &Value, actual: &Value, out: &mut Vec<Mismatch>) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, exp_child) in exp {
                let child_path = join(path, key);
                match act.get(key) {
                    Some(act_child) => diff_value(&child_path, exp_child, act_child, out),
                    None => out.push(Mismatch {
                        path: child_path,
                        expected: exp_child.clone(),
                        actual: Value::Null,
                    }),
                }
            }
            for (key, act_child) in act {
                if !exp.contains_key(key) {
                    out.push(Mismatch {
                        path: join(path, key),
                        expected: Value::Null,
                        actual: act_child.clone(),
                    });
                }
            }
        }
        _ => {
            if expected != actual {
                out.push(Mismatch {
                    path: path.to_string(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_documents_have_no_mismatches() {
        let doc = json!({"records": {"www": {"A": "203.0.113.7"}}});
        assert!(diff_documents(&doc, &doc.clone()).is_empty());
    }

    #[test]
    fn single_changed_leaf_yields_one_mismatch() {
        let expected = json!({"records": {"www": {"A": "203.0.113.7"}, "mail": {"MX": "10 mx."}}});
        let actual = json!({"records": {"www": {"A": "198.51.100.9"}, "mail": {"MX": "10 mx."}}});

        let mismatches = diff_documents(&expected, &actual);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "records.www.A");
        assert_eq!(mismatches[0].expected, json!("203.0.113.7"));
        assert_eq!(mismatches[0].actual, json!("198.51.100.9"));
    }

    #[test]
    fn missing_key_reports_null_actual() {
        let expected = json!({"records": {"www": {"A": "203.0.113.7"}}});
        let actual = json!({"records": {}});

        let mismatches = diff_documents(&expected, &actual);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "records.www");
        assert_eq!(mismatches[0].actual, Value::Null);
    }

    #[test]
    fn extra_key_reports_null_expected() {
        let expected = json!({"records": {}});
        let actual = json!({"records": {"rogue": {"TXT": "v=spf1 -all"}}});

        let mismatches = diff_documents(&expected, &actual);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "records.rogue");
        assert_eq!(mismatches[0].expected, Value::Null);
    }

    #[test]
    fn arrays_are_leaves() {
        let expected = json!({"ns": ["ns1.example.org.", "ns2.example.org."]});
        let actual = json!({"ns": ["ns1.example.org."]});

        let mismatches = diff_documents(&expected, &actual);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "ns");
    }

    #[test]
    fn type_change_is_a_single_mismatch() {
        let expected = json!({"ttl": 300});
        let actual = json!({"ttl": "300"});

        let mismatches = diff_documents(&expected, &actual);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "ttl");
    }

    #[test]
    fn multiple_mismatches_all_reported() {
        let expected = json!({"a": 1, "b": {"c": 2, "d": 3}});
        let actual = json!({"a": 9, "b": {"c": 2, "d": 8}, "e": 5});

        let mut paths: Vec<String> = diff_documents(&expected, &actual)
            .into_iter()
            .map(|m| m.path)
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["a", "b.d", "e"]);
    }
}
