use proptest::prelude::*;
use flooph::{
    parse_assignment_list, parse_boolean_expression, parse_template, parse_value_expression,
    Engine, Limits, Value, VarStore,
};

proptest! {
    /// No root rule panics on arbitrary input; each returns Ok or Err.
    #[test]
    fn parsers_do_not_panic(s in "\\PC*") {
        let limits = Limits::default();
        let _ = parse_template(&s, &limits);
        let _ = parse_boolean_expression(&s, &limits);
        let _ = parse_value_expression(&s, &limits);
        let _ = parse_assignment_list(&s, &limits);
    }
}

proptest! {
    /// Directive-shaped noise: braces and operators in random order.
    #[test]
    fn directive_soup_does_not_panic(s in "[{}?|.=!&()<>a-c0-9 \"\n-]{0,64}") {
        let mut engine = Engine::new();
        let _ = engine.transform(&s, None);
        let _ = engine.conditional(&s, None);
        let _ = engine.calculate(&s, None);
        let _ = engine.update_variables(&s, None);
    }
}

proptest! {
    /// Rendered output never contains three consecutive newlines.
    #[test]
    fn output_has_no_blank_runs(s in "[ab\n]{0,40}", n in 0i64..3) {
        let mut engine = Engine::new();
        let vars: VarStore = [("a", n)].into_iter().collect();
        let template = format!("{s}{{?a=1}}\n\n\n{{|}}{s}{{.}}{s}");
        let out = engine.transform(&template, Some(vars)).unwrap();
        prop_assert!(!out.contains("\n\n\n"));
    }
}

proptest! {
    /// Text without directives renders to itself once normalised.
    #[test]
    fn plain_text_is_verbatim(s in "[a-zA-Z0-9 ,.!]{0,60}") {
        let mut engine = Engine::new();
        let out = engine.transform(&s, None).unwrap();
        prop_assert_eq!(out, flooph::normalize(&s));
    }
}

proptest! {
    /// Integral numbers print without a decimal point.
    #[test]
    fn integers_print_plainly(n in -1_000_000i64..1_000_000) {
        let mut engine = Engine::new();
        let vars: VarStore = [("n", n)].into_iter().collect();
        let out = engine.transform("{=n}", Some(vars)).unwrap();
        prop_assert_eq!(out, n.to_string());
        prop_assert_eq!(Value::from(n as f64).to_string(), n.to_string());
    }
}

proptest! {
    /// `a + b - b` is `a` for integer operands.
    #[test]
    fn add_then_subtract(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let mut engine = Engine::new();
        let vars: VarStore = [("a", a), ("b", b)].into_iter().collect();
        engine.update_variables("s: a + b\nd: s - b", Some(vars)).unwrap();
        prop_assert_eq!(engine.calculate("d", None).unwrap(), Value::Int(a));
    }
}
