//! Operator semantics over CBOR-encoded queries.

#[cfg(test)]
mod tests {
    use ciborium::Value as Cbor;

    use crate::{
        DATE, empty, evaluate, kind, map, op, operator, param, tag, tagged_operator, tagged_param,
        text,
    };

    fn booleans(a: bool, b: bool) -> Cbor {
        map(&[("a", Cbor::Bool(a)), ("b", Cbor::Bool(b))])
    }

    fn integers(a: i64, b: i64) -> Cbor {
        map(&[("a", Cbor::Integer(a.into())), ("b", Cbor::Integer(b.into()))])
    }

    fn texts(a: &str, b: &str) -> Cbor {
        map(&[("a", text(a)), ("b", text(b))])
    }

    fn dates(a: &str, b: &str) -> Cbor {
        map(&[("a", tag(DATE, text(a))), ("b", tag(DATE, text(b)))])
    }

    fn binary(type_code: u64, code: u64) -> Vec<Cbor> {
        vec![param("a", type_code), param("b", type_code), operator(code)]
    }

    fn date_binary(code: u64) -> Vec<Cbor> {
        vec![
            tagged_param("a", kind::STRING, DATE),
            tagged_param("b", kind::STRING, DATE),
            tagged_operator(code, DATE),
        ]
    }

    fn truth_table(code: u64) -> [bool; 4] {
        let query = binary(kind::BOOLEAN, code);
        [(true, true), (true, false), (false, true), (false, false)]
            .map(|(a, b)| evaluate(&query, &booleans(a, b), &empty()).unwrap())
    }

    #[test]
    fn test_should_return_boolean_parameter() {
        let query = [param("a", kind::BOOLEAN)];
        assert!(evaluate(&query, &map(&[("a", Cbor::Bool(true))]), &empty()).unwrap());
        assert!(!evaluate(&query, &map(&[("a", Cbor::Bool(false))]), &empty()).unwrap());
    }

    #[test]
    fn test_should_negate() {
        let query = [param("a", kind::BOOLEAN), operator(op::NOT)];
        assert!(!evaluate(&query, &map(&[("a", Cbor::Bool(true))]), &empty()).unwrap());
        assert!(evaluate(&query, &map(&[("a", Cbor::Bool(false))]), &empty()).unwrap());
    }

    #[test]
    fn test_should_apply_logical_operators() {
        assert_eq!(truth_table(op::AND), [true, false, false, false]);
        assert_eq!(truth_table(op::OR), [true, true, true, false]);
    }

    #[test]
    fn test_should_compare_booleans_for_equality() {
        assert_eq!(truth_table(op::EQ), [true, false, false, true]);
        assert_eq!(truth_table(op::NE), [false, true, true, false]);
    }

    #[test]
    fn test_should_compare_strings() {
        let equal = texts("hello", "hello");
        let unequal = texts("hello", "bob");
        let eq = binary(kind::STRING, op::EQ);
        let ne = binary(kind::STRING, op::NE);

        assert!(evaluate(&eq, &equal, &empty()).unwrap());
        assert!(!evaluate(&ne, &equal, &empty()).unwrap());
        assert!(!evaluate(&eq, &unequal, &empty()).unwrap());
        assert!(evaluate(&ne, &unequal, &empty()).unwrap());
    }

    #[test]
    fn test_should_compare_numbers() {
        let equal = integers(1, 1);
        let less = integers(-1, 1);
        let expectations = [
            (op::EQ, true, false),
            (op::NE, false, true),
            (op::LT, false, true),
            (op::LE, true, true),
            (op::GT, false, false),
            (op::GE, true, false),
        ];
        for (code, on_equal, on_less) in expectations {
            let query = binary(kind::INTEGER, code);
            let result = evaluate(&query, &equal, &empty()).unwrap();
            assert_eq!(result, on_equal, "operator {code}, 1 vs 1");
            let result = evaluate(&query, &less, &empty()).unwrap();
            assert_eq!(result, on_less, "operator {code}, -1 vs 1");
        }
    }

    #[test]
    fn test_should_compare_bignum_encoded_integers() {
        let mut magnitude = vec![0x01];
        magnitude.extend([0; 16]);
        let big = tag(2, Cbor::Bytes(magnitude));
        let params = map(&[("a", Cbor::Integer(u64::MAX.into())), ("b", big)]);
        assert!(evaluate(&binary(kind::INTEGER, op::LT), &params, &empty()).unwrap());
    }

    #[test]
    fn test_should_compare_dates() {
        let equal = dates("2019-12-10", "2019-12-10");
        let less = dates("1998-12-10", "2019-12-10");
        let greater = dates("2019-12-10", "1998-12-10");

        let eq = date_binary(op::EQ);
        assert!(evaluate(&eq, &equal, &empty()).unwrap());
        assert!(!evaluate(&eq, &less, &empty()).unwrap());
        assert!(!evaluate(&eq, &greater, &empty()).unwrap());

        let lt = date_binary(op::LT);
        assert!(!evaluate(&lt, &equal, &empty()).unwrap());
        assert!(evaluate(&lt, &less, &empty()).unwrap());
        assert!(!evaluate(&lt, &greater, &empty()).unwrap());

        let gt = date_binary(op::GT);
        assert!(!evaluate(&gt, &equal, &empty()).unwrap());
        assert!(!evaluate(&gt, &less, &empty()).unwrap());
        assert!(evaluate(&gt, &greater, &empty()).unwrap());
    }

    #[test]
    fn test_should_evaluate_nested_expression() {
        // (a AND NOT b) OR c
        let query = [
            param("a", kind::BOOLEAN),
            param("b", kind::BOOLEAN),
            operator(op::NOT),
            operator(op::AND),
            param("c", kind::BOOLEAN),
            operator(op::OR),
        ];
        let params = |a: bool, b: bool, c: bool| {
            map(&[("a", Cbor::Bool(a)), ("b", Cbor::Bool(b)), ("c", Cbor::Bool(c))])
        };
        assert!(evaluate(&query, &params(true, false, false), &empty()).unwrap());
        assert!(!evaluate(&query, &params(true, true, false), &empty()).unwrap());
        assert!(evaluate(&query, &params(false, true, true), &empty()).unwrap());
    }
}
