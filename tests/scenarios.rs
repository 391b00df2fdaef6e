//! Tagging scenarios for the coq-info dialect

use rstest::rstest;

use regiontag::syntax::{coq_info_rules, flatten, tag, BaseStyle, CoqInfoOptions, RuleSet, Span};

fn rules(nested_comments: bool) -> RuleSet {
    coq_info_rules(CoqInfoOptions { nested_comments }).unwrap()
}

/// (rule name, covered text) for each span
fn describe<'a>(rules: &RuleSet, text: &'a str, spans: &[Span]) -> Vec<(String, &'a str)> {
    spans
        .iter()
        .map(|s| (rules.rule(s.rule).name.clone(), &text[s.range()]))
        .collect()
}

#[test]
fn theorem_with_proof() {
    let rules = rules(true);
    let text = "Lemma foo : True. Proof. exact I. Qed.";
    let spans = tag(text, &rules, 0..text.len());
    assert_eq!(describe(&rules, text, &spans), vec![("coqThm".to_string(), text)]);

    let thm = &spans[0];
    assert_eq!(
        describe(&rules, text, &thm.children),
        vec![
            ("coqThm".to_string(), "Lemma"),
            ("coqThmSig".to_string(), "foo : True. Proof. exact I. "),
            ("coqThm".to_string(), "Qed."),
        ]
    );
    assert_eq!(rules.style_of(thm.children[0].category), Some(BaseStyle::Keyword));
    assert_eq!(rules.style_of(thm.children[2].category), Some(BaseStyle::Keyword));

    let sig = &thm.children[1];
    assert_eq!(
        describe(&rules, text, &sig.children),
        vec![
            ("coqThmSig".to_string(), "foo"),
            ("coqThmBody".to_string(), ": True. Proof. exact I. "),
        ]
    );
    assert_eq!(rules.style_of(sig.children[0].category), Some(BaseStyle::Identifier));
    assert_eq!(rules.style_of(sig.children[1].category), Some(BaseStyle::Type));

    let body = &sig.children[1];
    assert_eq!(
        describe(&rules, text, &body.children),
        vec![
            ("coqThmBody".to_string(), ":"),
            ("coqProof".to_string(), "Proof. exact I. "),
        ]
    );

    let proof = &body.children[1];
    assert_eq!(
        describe(&rules, text, &proof.children),
        vec![
            ("coqProof".to_string(), "Proof."),
            ("coqTactic".to_string(), "exact"),
        ]
    );
}

#[test]
fn unterminated_comment_runs_to_end() {
    let rules = rules(true);
    let text = "(* never closed";
    let spans = tag(text, &rules, 0..text.len());
    assert_eq!(describe(&rules, text, &spans), vec![("coqComment".to_string(), text)]);
}

#[rstest]
#[case::flat(false, "(* a (* b *)", " c *)")]
#[case::nested(true, "(* a (* b *) c *)", "")]
fn comment_nesting(#[case] nested: bool, #[case] comment: &str, #[case] rest: &str) {
    let rules = rules(nested);
    let text = "(* a (* b *) c *)";
    let spans = tag(text, &rules, 0..text.len());

    assert_eq!(describe(&rules, text, &spans), vec![("coqComment".to_string(), comment)]);

    let segments = flatten(&spans, 0..text.len());
    let untagged: String = segments
        .iter()
        .filter(|s| s.category.is_none())
        .map(|s| &text[s.range()])
        .collect();
    assert_eq!(untagged, rest);
}

#[rstest]
#[case::error("Error: no such lemma", "coqError", BaseStyle::Error)]
#[case::anomaly("Anomaly: uncaught exception", "coqError", BaseStyle::Error)]
#[case::warning("Warning: notation overridden", "coqWarning", BaseStyle::Todo)]
#[case::status("plus_comm is defined", "coqInfoStatus", BaseStyle::Special)]
#[case::string("\"say \"\"hi\"\"\"", "coqString", BaseStyle::String)]
#[case::definition("Definition one := 1.", "coqDef", BaseStyle::Normal)]
fn first_span_style(#[case] text: &str, #[case] rule: &str, #[case] style: BaseStyle) {
    let rules = rules(true);
    let spans = tag(text, &rules, 0..text.len());
    assert!(!spans.is_empty(), "no spans for {:?}", text);
    assert_eq!(rules.rule(spans[0].rule).name, rule);
    assert_eq!(rules.style_of(spans[0].category), Some(style));
}

#[test]
fn string_is_one_span_with_doubled_quotes() {
    let rules = rules(true);
    let text = "\"a \"\"(*\"\" b\" x";
    let spans = tag(text, &rules, 0..text.len());
    assert_eq!(describe(&rules, text, &spans), vec![("coqString".to_string(), "\"a \"\"(*\"\" b\"")]);
}

#[test]
fn error_only_at_line_start() {
    let rules = rules(true);
    let text = "see Error: here\nError: there";
    let spans = tag(text, &rules, 0..text.len());
    assert_eq!(describe(&rules, text, &spans), vec![("coqError".to_string(), "Error:")]);
    assert_eq!(spans[0].start, 16);
}

#[test]
fn comment_before_visible_range_is_honoured() {
    let rules = rules(true);
    let text = "(* long\ncomment\nstill *) Lemma";
    let visible = 8..15;
    let spans = tag(text, &rules, visible.clone());
    assert_eq!(spans.len(), 1);
    assert_eq!(rules.rule(spans[0].rule).name, "coqComment");

    let segments = flatten(&spans, visible);
    assert_eq!(segments.len(), 1);
    assert_eq!(rules.style_of(segments[0].category.unwrap()), Some(BaseStyle::Comment));
}

#[test]
fn deeply_nested_comments_stay_bounded() {
    let rules = rules(true);
    let text = "(*".repeat(200_000);
    let spans = tag(&text, &rules, 0..text.len());
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].end, text.len());

    let copy = spans.clone();
    assert_eq!(copy, spans);
    drop(copy);
    drop(spans);
}
