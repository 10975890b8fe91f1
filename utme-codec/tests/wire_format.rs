//! Wire format cases for the utme codec
use utme_codec::{CustomVariable, Event, Utme, UtmeError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn names_of(utme: &Utme) -> String {
    // 8(NAMES)9(...) -> NAMES
    let wire = utme.serialize();
    let start = wire.find("8(").unwrap() + 2;
    let end = wire[start..].find(')').unwrap() + start;
    wire[start..end].to_string()
}

fn codec_with(slots: &[(usize, &str, Option<&str>)]) -> Utme {
    let mut utme = Utme::new();
    for (slot, name, scope) in slots {
        let mut var = CustomVariable::new(*name, format!("v{}", slot));
        var.scope = scope.map(str::to_string);
        utme.set_custom_variable(*slot, var).unwrap();
    }
    utme
}

#[test]
fn test_no_gaps_no_markers() {
    let utme = codec_with(&[(1, "foo", None), (2, "bar", None)]);
    assert_eq!(names_of(&utme), "foo*bar");
}

#[test]
fn test_gap_before_slot_four() {
    let utme = codec_with(&[(1, "foo", None), (2, "bar", None), (4, "baz", None)]);
    assert_eq!(names_of(&utme), "foo*bar*4!baz");
}

#[test]
fn test_lone_slot_four() {
    let utme = codec_with(&[(4, "foo", None)]);
    assert_eq!(names_of(&utme), "4!foo");
}

#[test]
fn test_scopes_are_independent_of_names() {
    let utme = codec_with(&[(1, "a", Some("1")), (2, "b", None), (3, "c", Some("3"))]);
    assert_eq!(utme.serialize(), "8(a*b*c)9(v1*v2*v3)11(1*3!3)");

    let back = Utme::parse(utme.serialize()).unwrap();
    assert_eq!(back, utme);
    assert_eq!(back.custom_variables().get(2).unwrap().scope, None);
}

#[test]
fn test_event_and_variables_concatenate() {
    let mut utme = codec_with(&[(2, "n", None)]);
    utme.set_event(Event::new("c", "a").with_label("l").with_value("9"));
    assert_eq!(utme.serialize(), "5(c*a*l)(9)8(2!n)9(2!v2)");
}

#[test]
fn test_mismatched_counts() {
    assert_eq!(
        Utme::parse("8(a*b)9(x)"),
        Err(UtmeError::MismatchedCounts { names: 2, values: 1 })
    );
}

#[test]
fn test_dangling_scope_is_dropped() {
    init_logging();
    let utme = Utme::parse("8(a)9(x)11(2!y)").unwrap();
    let vars = utme.custom_variables();
    assert_eq!(vars.len(), 1);
    assert_eq!(vars.get(1), Some(&CustomVariable::new("a", "x")));
    assert_eq!(vars.get(2), None);
}

#[test]
fn test_slot_range_enforced() {
    let mut utme = Utme::new();
    for slot in [0, 6] {
        assert_eq!(
            utme.set_custom_variable(slot, CustomVariable::new("a", "b")).err(),
            Some(UtmeError::InvalidSlot(slot))
        );
        assert_eq!(
            utme.unset_custom_variable(slot).err(),
            Some(UtmeError::InvalidSlot(slot))
        );
    }
    for slot in 1..=5 {
        utme.set_custom_variable(slot, CustomVariable::new("a", "b")).unwrap();
        utme.unset_custom_variable(slot).unwrap();
    }
    assert!(utme.is_empty());
}

#[test]
fn test_explicit_slot_out_of_range_in_input() {
    assert_eq!(Utme::parse("8(7!a)9(7!x)"), Err(UtmeError::InvalidSlot(7)));
}

#[test]
fn test_variables_before_event() {
    let utme = Utme::parse("8(a)9(x)5(c*a)").unwrap();
    assert_eq!(utme.event(), Some(&Event::new("c", "a")));
    assert_eq!(utme.custom_variables().len(), 1);
    assert_eq!(utme.serialize(), "5(c*a)8(a)9(x)");
}

#[test]
fn test_surrounding_noise_is_ignored() {
    init_logging();
    let utme = Utme::parse("junk5(c*a)(3)more8(a*b)9(x*y)end").unwrap();
    assert_eq!(utme.event().unwrap().value.as_deref(), Some("3"));
    assert_eq!(utme.custom_variables().get(2).unwrap().value, "y");
}

#[test]
fn test_text_without_fragments_is_empty() {
    assert!(Utme::parse("nothing to see").unwrap().is_empty());
}

#[test]
fn test_from_str_matches_parse() {
    let wire = "5(c*a)8(a)9(x)11(1)";
    let parsed: Utme = wire.parse().unwrap();
    assert_eq!(parsed, Utme::parse(wire).unwrap());
    assert_eq!(parsed.to_string(), wire);
}

#[test]
fn test_rehydrate_then_mutate() {
    let mut utme = Utme::parse("5(c*a)8(a*b)9(x*y)").unwrap();
    utme.unset_custom_variable(1)
        .unwrap()
        .set_custom_variable(5, CustomVariable::new("e", "z").with_scope("3"))
        .unwrap();
    assert_eq!(utme.serialize(), "5(c*a)8(2!b*5!e)9(2!y*5!z)11(5!3)");
}

#[test]
fn test_gap_then_contiguous_slots() {
    let utme = codec_with(&[(2, "a", None), (3, "b", None)]);
    assert_eq!(utme.serialize(), "8(2!a*b)9(2!v2*v3)");

    let back = Utme::parse(utme.serialize()).unwrap();
    assert_eq!(back, utme);
    assert_eq!(back.custom_variables().get(3).unwrap().name, "b");
}

#[test]
fn test_run_after_gap_keeps_slots() {
    let utme = codec_with(&[(1, "a", None), (3, "b", None), (4, "c", None)]);
    assert_eq!(utme.serialize(), "8(a*3!b*c)9(v1*3!v3*v4)");
    assert_eq!(Utme::parse(utme.serialize()).unwrap(), utme);
}

#[test]
fn test_scoped_run_after_gap() {
    let utme = codec_with(&[(2, "a", Some("s")), (3, "b", Some("t"))]);
    assert_eq!(utme.serialize(), "8(2!a*b)9(2!v2*v3)11(2!s*t)");

    let back = Utme::parse(utme.serialize()).unwrap();
    assert_eq!(back.custom_variables().get(2).unwrap().scope.as_deref(), Some("s"));
    assert_eq!(back.custom_variables().get(3).unwrap().scope.as_deref(), Some("t"));
    assert_eq!(back, utme);
}
