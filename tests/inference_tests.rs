//! Type inference tests

use schema_forge::inference::{FileDescriptor, Format, InferenceConfig, TypeInferrer};
use schema_forge::models::DataType;
use schema_forge::validation::FindingCode;

fn descriptor(headers: &[&str], rows: &[&[Option<&str>]]) -> FileDescriptor {
    rows.iter().fold(
        FileDescriptor::new(
            "customers.csv",
            headers.iter().map(|h| h.to_string()).collect(),
        ),
        |d, row| d.with_row(*row),
    )
}

mod column_inference_tests {
    use super::*;

    #[test]
    fn test_small_integers_and_emails() {
        let file = descriptor(
            &["id", "email"],
            &[
                &[Some("1"), Some("a@b.com")],
                &[Some("2"), Some("c@d.com")],
                &[Some("3"), None],
            ],
        );
        let inference = TypeInferrer::new().infer_file(&file).unwrap();

        let id = inference.column("id").unwrap();
        assert_eq!(id.data_type, DataType::SmallInt);
        assert!(!id.nullable);

        let email = inference.column("email").unwrap();
        assert_eq!(email.data_type, DataType::Varchar);
        assert_eq!(email.format, Some(Format::Email));
        assert!(email.nullable);
        assert_eq!(email.stats.null_count, 1);
    }

    #[test]
    fn test_zero_padded_codes_stay_text() {
        let file = descriptor(&["zip"], &[&[Some("01234")], &[Some("00042")]]);
        let inference = TypeInferrer::new().infer_file(&file).unwrap();
        assert!(!inference.columns[0].data_type.is_integer());
    }

    #[test]
    fn test_draft_table_keeps_file_order() {
        let file = descriptor(
            &["Full Name", "signup date"],
            &[&[Some("Ada"), Some("2024-01-02")]],
        );
        let table = TypeInferrer::new().infer_file(&file).unwrap().to_table();
        assert_eq!(table.name, "customers");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["full_name", "signup_date"]);
        assert_eq!(table.columns[0].source_column.as_deref(), Some("Full Name"));
        assert_eq!(table.columns[1].data_type, DataType::Date);
    }
}

mod structure_tests {
    use super::*;

    #[test]
    fn test_header_problems_are_findings_not_errors() {
        let file = descriptor(
            &["id", "", "id", "select"],
            &[&[Some("1"), Some("x"), Some("2"), Some("y")]],
        );
        let inference = TypeInferrer::new().infer_file(&file).unwrap();
        let codes: Vec<FindingCode> = inference.findings.iter().map(|f| f.code).collect();
        assert!(codes.contains(&FindingCode::EmptyHeader));
        assert!(codes.contains(&FindingCode::DuplicateHeader));
        assert!(codes.contains(&FindingCode::ReservedHeader));

        let names: Vec<&str> = inference
            .header_mapping
            .iter()
            .map(|m| m.normalized.as_str())
            .collect();
        assert_eq!(names, vec!["id", "column_2", "id_2", "select_col"]);
    }

    #[test]
    fn test_missing_headers_is_an_error() {
        let file = FileDescriptor::new("empty.csv", Vec::new());
        assert!(TypeInferrer::new().infer_file(&file).is_err());
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "fileName": "orders.csv",
            "headers": ["order_id", "total"],
            "rows": [["1", "9.99"], ["2", null]],
            "totalRows": 2
        }"#;
        let file = FileDescriptor::from_json_str(json).unwrap();
        let inference = TypeInferrer::with_config(InferenceConfig::default())
            .infer_file(&file)
            .unwrap();
        assert_eq!(inference.table_name, "orders");
        assert!(inference.column("total").unwrap().nullable);
    }
}
