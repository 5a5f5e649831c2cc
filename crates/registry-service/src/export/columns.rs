//! Column selection and cell rendering shared by both export formats.

use serde_json::Value;

use registry_core::traits::Record;

/// Keys the Word table leaves out.
pub const WORD_EXCLUDED_FIELDS: &[&str] = &["id", "associated_file_name", "arquivo_nome", "usuario"];

/// Union of keys across `records`, in first-seen order.
pub fn union_columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Text shown for a value: strings verbatim, null and missing as empty,
/// everything else as compact JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_union_keeps_first_seen_order() {
        let rows = records(vec![
            json!({"Arquivo": "a", "Data": "1900"}),
            json!({"Local": "Rio", "Arquivo": "b"}),
            json!({"Data": "1901", "Caixa": 2}),
        ]);
        assert_eq!(union_columns(&rows), vec!["Arquivo", "Data", "Local", "Caixa"]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("texto"))), "texto");
        assert_eq!(cell_text(Some(&json!(12.5))), "12.5");
        assert_eq!(cell_text(Some(&json!(true))), "true");
        assert_eq!(cell_text(Some(&json!(["a", 1]))), "[\"a\",1]");
    }
}
