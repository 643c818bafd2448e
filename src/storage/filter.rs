use serde_json::Value;
use uuid::Uuid;

/// Query predicate over the JSON form of a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Top-level field equals the value.
    Eq { field: &'static str, value: Value },
    /// Top-level array field contains the value.
    Contains { field: &'static str, value: Value },
    /// Document identity is one of the ids.
    IdIn(Vec<Uuid>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl ToString) -> Self {
        Filter::Eq {
            field,
            value: Value::String(value.to_string()),
        }
    }

    pub fn contains(field: &'static str, value: impl ToString) -> Self {
        Filter::Contains {
            field,
            value: Value::String(value.to_string()),
        }
    }

    pub fn matches(&self, id: Uuid, document: &Value) -> bool {
        match self {
            Filter::Eq { field, value } => document.get(*field) == Some(value),
            Filter::Contains { field, value } => document
                .get(*field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            Filter::IdIn(ids) => ids.contains(&id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_compares_top_level_field() {
        let doc = json!({ "email": "a@x.com" });
        let id = Uuid::new_v4();
        assert!(Filter::eq("email", "a@x.com").matches(id, &doc));
        assert!(!Filter::eq("email", "b@x.com").matches(id, &doc));
        assert!(!Filter::eq("missing", "a@x.com").matches(id, &doc));
    }

    #[test]
    fn contains_checks_array_membership() {
        let liker = Uuid::new_v4();
        let doc = json!({ "likes": [liker.to_string()] });
        let id = Uuid::new_v4();
        assert!(Filter::contains("likes", liker).matches(id, &doc));
        assert!(!Filter::contains("likes", Uuid::new_v4()).matches(id, &doc));
        assert!(!Filter::contains("content", liker).matches(id, &json!({ "content": "x" })));
    }

    #[test]
    fn id_in_ignores_document_body() {
        let id = Uuid::new_v4();
        assert!(Filter::IdIn(vec![id]).matches(id, &Value::Null));
        assert!(!Filter::IdIn(vec![]).matches(id, &Value::Null));
    }
}
