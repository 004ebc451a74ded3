//! Compiler from Natex terms to regex source
//!
//! A post-order reduction: every node compiles its children first, then
//! applies exactly one rule to their values. The context is threaded through
//! by `&mut` so that an assignment seen earlier in the walk turns every later
//! reference to the same symbol into a backreference.

use crate::ast::{NodePath, Term};
use crate::context::CompilationContext;
use crate::macros;
use crate::value::{self, Value};

/// One reduction step, recorded only when diagnostics are requested
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Path of the reduced node from the root
    pub path: NodePath,
    /// The kind of node that was reduced
    pub rule: &'static str,
    /// The fragment the node reduced to
    pub fragment: String,
}

/// Output of one compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// Regex source for the whole expression
    pub fragment: String,
    /// Reduction steps in the order they happened; empty unless recorded
    pub reductions: Vec<Reduction>,
}

/// Compile `term` against `ctx`. When `record` is set, every non-literal
/// reduction is kept for diagnostics; the fragment is the same either way.
pub fn compile(term: &Term, ctx: &mut CompilationContext<'_>, record: bool) -> Compilation {
    let mut reducer = Reducer {
        ctx,
        path: Vec::new(),
        reductions: record.then(Vec::new),
    };
    let value = reducer.reduce(term);
    Compilation {
        fragment: value.to_fragment(),
        reductions: reducer.reductions.unwrap_or_default(),
    }
}

struct Reducer<'c, 'a> {
    ctx: &'c mut CompilationContext<'a>,
    path: NodePath,
    reductions: Option<Vec<Reduction>>,
}

impl Reducer<'_, '_> {
    fn reduce(&mut self, term: &Term) -> Value {
        let mut operands = Vec::with_capacity(term.children().len());
        for (index, child) in term.children().iter().enumerate() {
            self.path.push(index);
            operands.push(self.reduce(child));
            self.path.pop();
        }

        let value = self.apply(term, operands);

        if !matches!(term, Term::Literal(_)) {
            let fragment = value.to_fragment();
            tracing::trace!(rule = term.kind(), fragment = %fragment, "reduced");
            if let Some(reductions) = self.reductions.as_mut() {
                reductions.push(Reduction {
                    path: self.path.clone(),
                    rule: term.kind(),
                    fragment,
                });
            }
        }
        value
    }

    fn apply(&mut self, term: &Term, operands: Vec<Value>) -> Value {
        match term {
            Term::FlexibleSequence(_) => {
                Value::Text(format!(".*?{}.*?", fragments(&operands).join(".*?")))
            }
            Term::RigidSequence(_) => Value::Text(fragments(&operands).join(r"\W+")),
            Term::Conjunction(_) => {
                let mut pattern: String = fragments(&operands)
                    .iter()
                    .map(|f| format!(".*?(?=.*?{})", f))
                    .collect();
                pattern.push_str(".*");
                Value::Text(pattern)
            }
            Term::Disjunction(_) => Value::Text(format!("(?:{})", fragments(&operands).join("|"))),
            Term::Negation(_) => {
                let inner = fragments(&operands).concat();
                Value::Text(format!("(?:(?:(?!.*{}.*$).)+)", inner))
            }
            Term::Regex(pattern) => Value::Text(pattern.clone()),
            Term::Reference(symbol) => self.reference(symbol),
            Term::Assignment { symbol, .. } => {
                if let Some(group) = self.ctx.group_for(symbol) {
                    tracing::warn!(
                        symbol = %symbol,
                        "symbol already bound, reassignment is a backreference"
                    );
                    return Value::Text(backreference(group));
                }
                let group = self.ctx.bind(symbol);
                Value::Text(format!("(?P<{}>{})", group, fragments(&operands).concat()))
            }
            Term::MacroCall { name, .. } => {
                let value = macros::invoke(
                    self.ctx.macros(),
                    name,
                    self.ctx.ngrams(),
                    self.ctx.vars(),
                    &operands,
                );
                if self.is_well_formed(&value) {
                    value
                } else {
                    tracing::warn!(
                        macro_name = %name,
                        fragment = %value.to_fragment(),
                        "macro returned malformed regex"
                    );
                    Value::Text(value::failed_macro(name))
                }
            }
            Term::Literal(text) => Value::Text(text.clone()),
            Term::Concatenation(_) => Value::Text(fragments(&operands).join(" ")),
        }
    }

    fn reference(&self, symbol: &str) -> Value {
        if let Some(group) = self.ctx.group_for(symbol) {
            Value::Text(backreference(group))
        } else if let Some(bound) = self.ctx.vars().get(symbol) {
            let value = Value::Text(bound.clone());
            if self.is_well_formed(&value) {
                value
            } else {
                tracing::warn!(symbol = %symbol, value = %bound, "variable is malformed regex");
                Value::Text(value::invalid_reference(symbol))
            }
        } else {
            tracing::warn!(symbol = %symbol, "unresolved reference");
            Value::Text(value::unresolved_reference(symbol))
        }
    }

    /// Whether `value` compiles as regex, given the groups bound so far
    fn is_well_formed(&self, value: &Value) -> bool {
        if matches!(value, Value::Bool(_) | Value::Absent) {
            return true;
        }
        let mut candidate: String = self
            .ctx
            .groups()
            .iter()
            .map(|(group, _)| format!("(?P<{}>)", group))
            .collect();
        candidate.push_str(&value.to_fragment());
        fancy_regex::Regex::new(&candidate).is_ok()
    }
}

fn fragments(values: &[Value]) -> Vec<String> {
    values.iter().map(Value::to_fragment).collect()
}

fn backreference(group: &str) -> String {
    format!(r"\k<{}>", group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{MacroError, MacroRegistry, from_fn};
    use crate::ngrams::Ngrams;
    use crate::parser::parse;
    use crate::Vars;

    fn compile_with(expression: &str, vars: &Vars, macros: &MacroRegistry) -> String {
        let term = parse(expression).unwrap();
        let ngrams = Ngrams::default();
        let mut ctx = CompilationContext::new(vars, macros, &ngrams);
        compile(&term, &mut ctx, false).fragment
    }

    fn compile_str(expression: &str) -> String {
        compile_with(expression, &Vars::new(), &MacroRegistry::new())
    }

    #[test]
    fn test_literal() {
        assert_eq!(compile_str("how are you"), "how are you");
    }

    #[test]
    fn test_flexible_sequence() {
        assert_eq!(compile_str("[hello, there]"), ".*?hello.*?there.*?");
        assert_eq!(compile_str("[hello]"), ".*?hello.*?");
    }

    #[test]
    fn test_rigid_sequence() {
        assert_eq!(compile_str("[!hello, there]"), r"hello\W+there");
    }

    #[test]
    fn test_conjunction() {
        assert_eq!(compile_str("<a, b>"), ".*?(?=.*?a).*?(?=.*?b).*");
    }

    #[test]
    fn test_disjunction() {
        assert_eq!(compile_str("{a, b, c}"), "(?:a|b|c)");
    }

    #[test]
    fn test_negation() {
        assert_eq!(compile_str("-bad"), "(?:(?:(?!.*bad.*$).)+)");
    }

    #[test]
    fn test_regex_passthrough() {
        assert_eq!(compile_str("/\\d+ (?:cats|dogs)/"), r"\d+ (?:cats|dogs)");
    }

    #[test]
    fn test_nested() {
        assert_eq!(
            compile_str("[{hi, hello}, -bye]"),
            ".*?(?:hi|hello).*?(?:(?:(?!.*bye.*$).)+).*?"
        );
    }

    #[test]
    fn test_reference_from_vars() {
        let vars = Vars::from([("name".to_string(), "sarah".to_string())]);
        assert_eq!(
            compile_with("[hi, $name]", &vars, &MacroRegistry::new()),
            ".*?hi.*?sarah.*?"
        );
    }

    #[test]
    fn test_unresolved_reference() {
        assert_eq!(compile_str("$name"), "_name_NOT_FOUND_");
    }

    #[test]
    fn test_assignment_then_backreference() {
        assert_eq!(
            compile_str("$x=/red|blue/ ball is $x"),
            r"(?P<x>red|blue) ball is \k<x>"
        );
    }

    #[test]
    fn test_bound_symbol_shadows_vars() {
        let vars = Vars::from([("x".to_string(), "green".to_string())]);
        assert_eq!(
            compile_with("$x $x=a $x", &vars, &MacroRegistry::new()),
            r"green (?P<x>a) \k<x>"
        );
    }

    #[test]
    fn test_reassignment_is_backreference() {
        assert_eq!(compile_str("$x=a $x=b"), r"(?P<x>a) \k<x>");
    }

    #[test]
    fn test_assignment_of_dotted_symbol() {
        assert_eq!(
            compile_str("$user.name=/\\w+/ $user.name"),
            r"(?P<_natex0>\w+) \k<_natex0>"
        );
    }

    #[test]
    fn test_macro_value_kinds() {
        let macros = MacroRegistry::new()
            .with("T", from_fn(|_, _, _| Ok(Value::Bool(true))))
            .with("F", from_fn(|_, _, _| Ok(Value::Bool(false))))
            .with("S", from_fn(|_, _, _| Ok(Value::alternatives(["dog", "cat"]))))
            .with("N", from_fn(|_, _, _| Ok(Value::Absent)));
        let vars = Vars::new();
        assert_eq!(compile_with("#T", &vars, &macros), ".*");
        assert_eq!(compile_with("#F", &vars, &macros), "_FALSE_");
        assert_eq!(compile_with("#S", &vars, &macros), "(?:cat|dog)");
        assert_eq!(compile_with("[a, #N]", &vars, &macros), ".*?a.*?.*?");
    }

    #[test]
    fn test_macro_arguments_keep_their_kind() {
        let macros = MacroRegistry::new()
            .with("S", from_fn(|_, _, _| Ok(Value::alternatives(["x", "y"]))))
            .with(
                "Count",
                from_fn(|_, _, args| match args {
                    [Value::Alternatives(items), Value::Text(t)] => {
                        Ok(Value::text(format!("{}{}", items.len(), t)))
                    }
                    _ => Err(MacroError::failed("unexpected arguments")),
                }),
            );
        assert_eq!(compile_with("#Count(#S, z)", &Vars::new(), &macros), "2z");
    }

    #[test]
    fn test_macro_arguments_are_compiled_first() {
        let macros = MacroRegistry::new().with(
            "First",
            from_fn(|_, _, args| args.first().cloned().ok_or(MacroError::MissingArgument(0))),
        );
        assert_eq!(
            compile_with("#First({a, b})", &Vars::new(), &macros),
            "(?:a|b)"
        );
    }

    #[test]
    fn test_macro_failure_does_not_abort() {
        let macros = MacroRegistry::new().with(
            "Bad",
            from_fn(|_, _, _| Err(MacroError::failed("boom"))),
        );
        assert_eq!(
            compile_with("[hello, #Bad]", &Vars::new(), &macros),
            ".*?hello.*?_Bad_MACRO_FAILED_.*?"
        );
    }

    #[test]
    fn test_malformed_macro_output_fails_locally() {
        let macros = MacroRegistry::new()
            .with("Bad", from_fn(|_, _, _| Ok(Value::text("(oops"))))
            .with("BadSet", from_fn(|_, _, _| Ok(Value::alternatives(["ok", "[x"]))));
        assert_eq!(
            compile_with("{hello, #Bad, #BadSet}", &Vars::new(), &macros),
            "(?:hello|_Bad_MACRO_FAILED_|_BadSet_MACRO_FAILED_)"
        );
    }

    #[test]
    fn test_macro_output_may_reference_bound_groups() {
        let macros = MacroRegistry::new().with(
            "First",
            from_fn(|_, _, args| args.first().cloned().ok_or(MacroError::MissingArgument(0))),
        );
        assert_eq!(
            compile_with("$x=a #First($x)", &Vars::new(), &macros),
            r"(?P<x>a) \k<x>"
        );
    }

    #[test]
    fn test_malformed_variable_fails_locally() {
        let vars = Vars::from([("mood".to_string(), " great (mostly".to_string())]);
        assert_eq!(
            compile_with("{no, [!so, $mood]}", &vars, &MacroRegistry::new()),
            r"(?:no|so\W+_mood_INVALID_)"
        );
    }

    #[test]
    fn test_reassignment_in_disjunction_drops_second_term() {
        assert_eq!(
            compile_str("{$x=/yes/, $x=/yeah/}"),
            r"(?:(?P<x>yes)|\k<x>)"
        );
    }

    #[test]
    fn test_unknown_macro() {
        assert_eq!(compile_str("[#Missing(a)]"), ".*?_Missing_MACRO_NOT_FOUND_.*?");
    }

    #[test]
    fn test_reductions_recorded_in_post_order() {
        let term = parse("[a, {b, c}]").unwrap();
        let vars = Vars::new();
        let macros = MacroRegistry::new();
        let ngrams = Ngrams::default();
        let mut ctx = CompilationContext::new(&vars, &macros, &ngrams);
        let compilation = compile(&term, &mut ctx, true);

        let steps: Vec<_> = compilation
            .reductions
            .iter()
            .map(|r| (r.path.clone(), r.rule, r.fragment.as_str()))
            .collect();
        assert_eq!(
            steps,
            vec![
                (vec![1], "disjunction", "(?:b|c)"),
                (vec![], "flexible sequence", ".*?a.*?(?:b|c).*?"),
            ]
        );
    }

    #[test]
    fn test_recording_does_not_change_output() {
        let term = parse("<$x=/a|b/, #Missing, -c>").unwrap();
        let vars = Vars::new();
        let macros = MacroRegistry::new();
        let ngrams = Ngrams::default();

        let mut plain = CompilationContext::new(&vars, &macros, &ngrams);
        let mut traced = CompilationContext::new(&vars, &macros, &ngrams);
        assert_eq!(
            compile(&term, &mut plain, false).fragment,
            compile(&term, &mut traced, true).fragment
        );
    }
}
