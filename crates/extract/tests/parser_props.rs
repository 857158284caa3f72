use extract::{Triple, TripleParser};
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]([A-Za-z0-9 %#./-]{0,18}[A-Za-z0-9])?"
}

fn noisy_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (field(), field(), field()).prop_map(|(s, p, o)| format!("({s}, {p}, {o})")),
        (field(), field(), field()).prop_map(|(s, p, o)| format!("({s}, {p}, {o})<|> note")),
        (field(), field(), field())
            .prop_map(|(s, p, o)| format!("Subject: {s}, Predicate: {p}, Object: {o}")),
        (field(), field(), field(), field())
            .prop_map(|(s, p, o, x)| format!("* ({s}, {p}, {o}, {x})")),
        "[A-Za-z ,:()]{0,30}",
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn prop_well_formed_lines_round_trip(s in field(), p in field(), o in field()) {
        let parsed = TripleParser::default().parse(&format!("({s}, {p}, {o})"));
        prop_assert_eq!(parsed, vec![Triple::new(&s, &p, &o).unwrap()]);
    }

    #[test]
    fn prop_two_fields_yield_nothing(a in field(), b in field()) {
        let parsed = TripleParser::default().parse(&format!("({a}, {b})"));
        prop_assert!(parsed.is_empty());
    }

    #[test]
    fn prop_reparsing_serialized_triples_is_stable(lines in prop::collection::vec(noisy_line(), 0..20)) {
        let parser = TripleParser::default();
        let first = parser.parse(&lines.join("\n"));
        let reserialized: Vec<String> = first.iter().map(Triple::to_line).collect();
        let second = parser.parse(&reserialized.join("\n"));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_no_empty_fields(lines in prop::collection::vec(noisy_line(), 0..20)) {
        for triple in TripleParser::default().parse(&lines.join("\n")) {
            prop_assert!(!triple.subject.is_empty());
            prop_assert!(!triple.predicate.is_empty());
            prop_assert!(!triple.object.is_empty());
        }
    }
}
