//! Coq info-panel dialect
//!
//! Covers what Coq prints in its message panel: `Print`/`About` output for
//! theorems and definitions, error and warning messages, status lines,
//! plus comments and strings.

use crate::error::Result;
use crate::syntax::category::BaseStyle;
use crate::syntax::rules::RuleDef;
use crate::syntax::ruleset::RuleSet;

/// Dialect name used for registration and lookup
pub const NAME: &str = "coq-info";

/// Build-time options for the dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoqInfoOptions {
    /// Whether `(* ... *)` comments nest
    pub nested_comments: bool,
}

impl Default for CoqInfoOptions {
    fn default() -> Self {
        Self { nested_comments: true }
    }
}

const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_']*(?:\.[A-Za-z_][A-Za-z0-9_']*)*";
const PROOF_END: &str = r"\b(?:Qed|Defined|Admitted|Abort)\.";
const SENTENCE_END: &str = r"\.\.\.|\.(?:\s|\z)";
const DOUBLE_DOT: &str = r"\.\.(?:\s|\z)";

/// Create the coq-info rule set
pub fn coq_info_rules(options: CoqInfoOptions) -> Result<RuleSet> {
    let comment_contains: &[&str] = if options.nested_comments {
        &["coqComment", "coqTodo"]
    } else {
        &["coqTodo"]
    };

    // Comments and strings are checked before anything else
    let builder = RuleSet::builder(NAME)
        .rule(
            RuleDef::region("coqComment", r"\(\*", r"\*\)", "coqComment")
                .contains(comment_contains)
                .always_active()
                .extend(),
        )
        .rule(
            RuleDef::region("coqString", "\"", "\"", "coqString")
                .skip("\"\"")
                .always_active()
                .extend(),
        )
        .rule(RuleDef::matching("coqTodo", r"\b(?:TODO|FIXME|XXX|NOTE)\b", "coqTodo").contained_only());

    // Messages
    let builder = builder
        .rule(RuleDef::matching("coqError", r"(?m)^(?:Error|Anomaly):", "coqError"))
        .rule(RuleDef::matching("coqWarning", r"(?m)^Warning:", "coqWarning"))
        .rule(RuleDef::matching(
            "coqInfoStatus",
            r"\bis (?:defined|declared|assumed|recursively defined)\b|\bNo more (?:sub)?goals\.",
            "coqInfoStatus",
        ));

    // Theorems: keyword, then a signature opened by the name holding the
    // binders and the statement, up to Qed.
    let builder = builder
        .rule(
            RuleDef::region(
                "coqThm",
                r"\b(?:Theorem|Lemma|Fact|Remark|Corollary|Proposition|Property|Example)\b",
                PROOF_END,
                "coqThm",
            )
            .contains(&["coqThmSig"])
            .delimiter("coqVernacCmd")
            .keep_end()
            .close_nested(),
        )
        .rule(
            RuleDef::region("coqThmSig", IDENT, PROOF_END, "coqThmSig")
                .contains(&["coqBinder", "coqThmBody"])
                .delimiter("coqThmName")
                .contained_only(),
        )
        .rule(
            RuleDef::region("coqBinder", r"[({]", r"[)}]", "coqBinder")
                .contains(&["coqBinder", "coqKeyword"])
                .contained_only(),
        )
        .rule(
            RuleDef::region("coqThmBody", ":", PROOF_END, "coqThmBody")
                .contains(&["coqProof", "coqKeyword"])
                .delimiter("coqVernacCmd")
                .contained_only(),
        )
        .rule(
            RuleDef::region("coqProof", r"\bProof\.", PROOF_END, "coqProof")
                .contains(&["coqTactic", "coqKeyword"])
                .delimiter("coqVernacCmd")
                .contained_only(),
        )
        .rule(
            RuleDef::matching(
                "coqTactic",
                r"\b(?:exact|apply|eapply|intros?|induction|destruct|simpl|reflexivity|rewrite|split|auto|eauto|trivial|assumption|unfold|left|right|constructor|inversion|lia|congruence|discriminate|specialize|assert|now)\b",
                "coqTactic",
            )
            .contained_only(),
        );

    // Definitions run to the end of the sentence; `..` does not end one
    let builder = builder
        .rule(
            RuleDef::region(
                "coqDef",
                r"\b(?:Definition|Fixpoint|CoFixpoint|Inductive|CoInductive|Record|Structure|Class|Instance|Axiom|Parameter|Variable|Hypothesis|Notation)\b",
                SENTENCE_END,
                "coqDef",
            )
            .contains(&["coqDefSig"])
            .skip(DOUBLE_DOT)
            .delimiter("coqVernacCmd")
            .close_nested(),
        )
        .rule(
            RuleDef::region("coqDefSig", IDENT, SENTENCE_END, "coqDefSig")
                .contains(&["coqDefBody"])
                .skip(DOUBLE_DOT)
                .delimiter("coqDefName")
                .contained_only(),
        )
        .rule(
            RuleDef::region("coqDefBody", r":=?|[(\[{]", SENTENCE_END, "coqDefBody")
                .contains(&["coqKeyword"])
                .skip(DOUBLE_DOT)
                .contained_only(),
        )
        .rule(RuleDef::matching(
            "coqKeyword",
            r"\b(?:forall|exists|fun|match|with|end|let|in|if|then|else|return|as|fix|cofix|Prop|Set|Type)\b",
            "coqKeyword",
        ));

    builder
        .link("coqComment", BaseStyle::Comment)
        .link("coqTodo", BaseStyle::Todo)
        .link("coqString", BaseStyle::String)
        .link("coqError", BaseStyle::Error)
        .link("coqWarning", BaseStyle::Todo)
        .link("coqInfoStatus", BaseStyle::Special)
        .link("coqVernacCmd", BaseStyle::Keyword)
        .link("coqThm", BaseStyle::Normal)
        .link("coqDef", BaseStyle::Normal)
        .link("coqThmSig", BaseStyle::Normal)
        .link("coqDefSig", BaseStyle::Normal)
        .link("coqBinder", BaseStyle::Normal)
        .link("coqThmName", BaseStyle::Identifier)
        .link("coqDefName", BaseStyle::Identifier)
        .link("coqThmBody", BaseStyle::Type)
        .link("coqDefBody", BaseStyle::Normal)
        .link("coqProof", BaseStyle::Normal)
        .link("coqTactic", BaseStyle::Keyword)
        .link("coqKeyword", BaseStyle::Keyword)
        .build()
}
