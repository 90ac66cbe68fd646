//! Ordered first-match rule chains.
//!
//! Every classifier in this crate is a list of `(predicate, outcome)` pairs
//! evaluated top to bottom. The first predicate that holds decides the
//! outcome; the chain's fallback applies when none do. Rule ids are logged so
//! a classification can be traced back to the row that produced it.

use std::fmt::Debug;

/// A single row: if `when` holds for the input, the chain yields `then`.
pub struct Rule<I, O> {
    pub id: &'static str,
    pub when: fn(&I) -> bool,
    pub then: O,
}

/// The outcome of evaluating a chain, plus which rule produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict<O> {
    pub outcome: O,
    /// `None` when the fallback was used.
    pub rule_id: Option<&'static str>,
}

pub struct RuleChain<I, O> {
    name: &'static str,
    rules: Vec<Rule<I, O>>,
    fallback: O,
}

impl<I, O: Copy + Debug> RuleChain<I, O> {
    pub fn new(name: &'static str, fallback: O) -> Self {
        Self {
            name,
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule. Order of calls is evaluation order.
    pub fn rule(mut self, id: &'static str, when: fn(&I) -> bool, then: O) -> Self {
        self.rules.push(Rule { id, when, then });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fallback(&self) -> O {
        self.fallback
    }

    pub fn rules(&self) -> &[Rule<I, O>] {
        &self.rules
    }

    /// Evaluate rules in order. First match wins.
    pub fn evaluate(&self, input: &I) -> Verdict<O> {
        for rule in &self.rules {
            if (rule.when)(input) {
                tracing::debug!(
                    chain = self.name,
                    rule_id = rule.id,
                    outcome = ?rule.then,
                    "Rule matched"
                );
                return Verdict {
                    outcome: rule.then,
                    rule_id: Some(rule.id),
                };
            }
        }

        tracing::debug!(
            chain = self.name,
            outcome = ?self.fallback,
            "No rule matched, using fallback"
        );
        Verdict {
            outcome: self.fallback,
            rule_id: None,
        }
    }
}
