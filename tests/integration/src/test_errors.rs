//! Failure reporting for malformed inputs and ill-typed queries.

#[cfg(test)]
mod tests {
    use ciborium::Value as Cbor;
    use credquery_core::{QueryConfig, QueryError};
    use credquery_model::{CodecError, OperatorCode, Tag, ValueKind};

    use crate::{
        DATE, MDL, element, empty, evaluate, evaluate_with, kind, map, op, operator, param, tag,
        tagged_operator, tagged_param, text, uint,
    };

    fn query_error(result: anyhow::Result<bool>) -> QueryError {
        result
            .unwrap_err()
            .downcast::<QueryError>()
            .expect("expected a query error")
    }

    fn codec_error(result: anyhow::Result<bool>) -> CodecError {
        result
            .unwrap_err()
            .downcast::<CodecError>()
            .expect("expected a codec error")
    }

    fn booleans() -> Cbor {
        map(&[("a", Cbor::Bool(true)), ("b", Cbor::Bool(false))])
    }

    #[test]
    fn test_should_reject_empty_query() {
        let err = query_error(evaluate(&[], &empty(), &empty()));
        assert_eq!(err, QueryError::StackSize { remaining: 0 });
        assert!(err.to_string().contains("invalid query"));
    }

    #[test]
    fn test_should_report_missing_and_invalid_role_tags() {
        let untagged = Cbor::Array(vec![text("a"), uint(kind::BOOLEAN)]);
        let err = query_error(evaluate(&[untagged], &booleans(), &empty()));
        assert_eq!(err, QueryError::MissingRoleTag { index: 0 });
        assert!(err.to_string().contains("missing its role tag"));

        let query = [
            param("a", kind::BOOLEAN),
            tag(1000, Cbor::Array(vec![text("b"), uint(kind::BOOLEAN)])),
        ];
        let err = query_error(evaluate(&query, &booleans(), &empty()));
        assert_eq!(err, QueryError::InvalidRoleTag { index: 1, tag: 1000 });
        assert!(err.to_string().contains("invalid role tag"));
    }

    #[test]
    fn test_should_reject_invalid_string_operators() {
        let params = map(&[("a", text("hello")), ("b", text("bob"))]);
        for code in [op::AND, op::OR, op::GE, op::GT, op::LE, op::LT] {
            let query = [
                param("a", kind::STRING),
                param("b", kind::STRING),
                operator(code),
            ];
            let err = query_error(evaluate(&query, &params, &empty()));
            assert!(
                matches!(err, QueryError::UnsupportedOperator { kind: ValueKind::Text, .. }),
                "operator {code}: {err}"
            );
            assert!(err.to_string().contains("invalid query"));
        }
    }

    #[test]
    fn test_should_report_unknown_parameter() {
        let err = query_error(evaluate(&[param("missing", kind::BOOLEAN)], &empty(), &empty()));
        assert_eq!(
            err,
            QueryError::UnknownParameter {
                name: "missing".to_owned()
            }
        );
    }

    #[test]
    fn test_should_report_invalid_type_specifier() {
        let err = query_error(evaluate(&[param("a", 7)], &booleans(), &empty()));
        assert!(matches!(err, QueryError::InvalidTypeSpecifier { .. }));
    }

    #[test]
    fn test_should_report_parameter_kind_mismatch() {
        let err = query_error(evaluate(&[param("a", kind::INTEGER)], &booleans(), &empty()));
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_should_report_parameter_tag_mismatch() {
        let params = map(&[("d", text("1998-12-10"))]);
        let query = [tagged_param("d", kind::STRING, DATE)];
        let err = query_error(evaluate(&query, &params, &empty()));
        assert_eq!(
            err,
            QueryError::TagMismatch {
                context: "declaration and value of parameter \"d\"".to_owned(),
                left: Some(Tag::FULL_DATE),
                right: None,
            }
        );
    }

    #[test]
    fn test_should_require_operator_tag_for_tagged_operands() {
        let params = map(&[
            ("a", tag(DATE, text("1998-12-10"))),
            ("b", tag(DATE, text("2019-12-10"))),
        ]);
        let query = [
            tagged_param("a", kind::STRING, DATE),
            tagged_param("b", kind::STRING, DATE),
            operator(op::LT),
        ];
        let err = query_error(evaluate(&query, &params, &empty()));
        assert_eq!(
            err,
            QueryError::OperatorOperandTagMismatch {
                operator: OperatorCode::LessThan,
                operator_tag: None,
                operand_tag: Tag::FULL_DATE,
            }
        );

        let wrong_tag = [
            tagged_param("a", kind::STRING, DATE),
            tagged_param("b", kind::STRING, DATE),
            tagged_operator(op::LT, 1),
        ];
        let err = query_error(evaluate(&wrong_tag, &params, &empty()));
        assert!(matches!(err, QueryError::OperatorOperandTagMismatch { .. }));
    }

    #[test]
    fn test_should_report_unknown_data_element() {
        let data = Cbor::Map(vec![(text(MDL), map(&[("age_over_18", Cbor::Bool(true))]))]);
        let err = query_error(evaluate(&[element(MDL, "age_over_65")], &empty(), &data));
        assert_eq!(
            err,
            QueryError::UnknownDataElement {
                namespace: MDL.to_owned(),
                name: "age_over_65".to_owned(),
            }
        );
    }

    #[test]
    fn test_should_report_stack_underflow() {
        let query = [param("a", kind::BOOLEAN), operator(op::OR)];
        let err = query_error(evaluate(&query, &booleans(), &empty()));
        assert_eq!(
            err,
            QueryError::StackUnderflow {
                operator: OperatorCode::Or,
                needed: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn test_should_report_unknown_operator() {
        let query = [param("a", kind::BOOLEAN), param("b", kind::BOOLEAN), operator(9)];
        let err = query_error(evaluate(&query, &booleans(), &empty()));
        assert!(matches!(err, QueryError::UnknownOperator { .. }));
    }

    #[test]
    fn test_should_enforce_configured_limits() {
        let config = QueryConfig {
            max_tokens: 3,
            max_stack_depth: 2,
        };
        let too_long = [
            param("a", kind::BOOLEAN),
            param("b", kind::BOOLEAN),
            operator(op::AND),
            operator(op::NOT),
            operator(op::NOT),
        ];
        let err = query_error(evaluate_with(config.clone(), &too_long, &booleans(), &empty()));
        assert_eq!(err, QueryError::QueryTooLong { len: 5, max: 3 });

        let too_deep = [
            param("a", kind::BOOLEAN),
            param("b", kind::BOOLEAN),
            param("a", kind::BOOLEAN),
        ];
        let err = query_error(evaluate_with(config, &too_deep, &booleans(), &empty()));
        assert_eq!(err, QueryError::StackOverflow { max: 2 });
    }

    #[test]
    fn test_should_reject_unsupported_wire_items() {
        let query = [tag(301, Cbor::Float(1.5))];
        let err = codec_error(evaluate(&query, &empty(), &empty()));
        assert!(matches!(err, CodecError::Unsupported { .. }));

        let params = map(&[("a", tag(DATE, tag(DATE, text("1998-12-10"))))]);
        let err = codec_error(evaluate(&[param("a", kind::STRING)], &params, &empty()));
        assert!(matches!(err, CodecError::NestedTag { tag: 1004 }));
    }

    #[test]
    fn test_should_reject_duplicate_parameters() {
        let params = map(&[("a", Cbor::Bool(true)), ("a", Cbor::Bool(false))]);
        let err = codec_error(evaluate(&[param("a", kind::BOOLEAN)], &params, &empty()));
        assert!(matches!(err, CodecError::DuplicateKey { key } if key == "a"));
    }
}
