//! # Matchers
//!
//! Matchers gate fuzzing (as precondition filters) and decide whether a
//! response is a finding (as template operators). Both are combined with
//! the same AND/OR [`Condition`].

use std::fmt;
use std::str::FromStr;

use crate::variables::VariableSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Condition {
    And,
    #[default]
    Or,
}

impl Condition {
    /// Folds a list of outcomes. An empty list never matches.
    pub fn eval(self, results: &[bool]) -> bool {
        if results.is_empty() {
            return false;
        }
        match self {
            Condition::And => results.iter().all(|matched| *matched),
            Condition::Or => results.iter().any(|matched| *matched),
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Condition::And),
            "or" => Ok(Condition::Or),
            other => Err(format!("invalid condition: {other} (expected `and` or `or`)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherKind {
    Word(Vec<String>),
    Status(Vec<u16>),
}

impl MatcherKind {
    fn type_name(&self) -> &'static str {
        match self {
            MatcherKind::Word(_) => "word",
            MatcherKind::Status(_) => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub name: Option<String>,
    /// Variable the matcher reads, e.g. `body`, `header`, `path`.
    pub part: String,
    pub kind: MatcherKind,
    /// How multiple words of one matcher combine.
    pub condition: Condition,
    pub negative: bool,
    pub case_insensitive: bool,
}

impl Matcher {
    pub fn words<I, S>(part: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(part, MatcherKind::Word(words.into_iter().map(Into::into).collect()))
    }

    pub fn status(codes: impl IntoIterator<Item = u16>) -> Self {
        Self::new("status_code", MatcherKind::Status(codes.into_iter().collect()))
    }

    fn new(part: &str, kind: MatcherKind) -> Self {
        Self {
            name: None,
            part: part.to_string(),
            kind,
            condition: Condition::Or,
            negative: false,
            case_insensitive: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negative = true;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// The configured name, or `<type>-<index>` for anonymous matchers.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{}-{}", self.kind.type_name(), index + 1),
        }
    }

    /// Evaluates the matcher against `data`. A missing part never matches,
    /// negated or not.
    pub fn matches(&self, data: &VariableSnapshot) -> bool {
        let Some(value) = data.get(&self.part) else {
            return false;
        };

        let matched = match &self.kind {
            MatcherKind::Word(words) => {
                let results: Vec<bool> = words
                    .iter()
                    .map(|word| self.contains_word(value, word))
                    .collect();
                self.condition.eval(&results)
            }
            MatcherKind::Status(codes) => value
                .trim()
                .parse::<u16>()
                .is_ok_and(|status| codes.contains(&status)),
        };

        matched != self.negative
    }

    fn contains_word(&self, haystack: &str, word: &str) -> bool {
        if self.case_insensitive {
            haystack.to_lowercase().contains(&word.to_lowercase())
        } else {
            haystack.contains(word)
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.type_name(), self.part)
    }
}

/// Template operators deciding whether a response is a finding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operators {
    pub matchers: Vec<Matcher>,
    pub condition: Condition,
}

impl Operators {
    pub fn new(matchers: Vec<Matcher>, condition: Condition) -> Self {
        Self { matchers, condition }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True when a matcher needs out-of-band interaction data to decide.
    pub fn has_interaction_matchers(&self) -> bool {
        self.matchers
            .iter()
            .any(|m| m.part.to_ascii_lowercase().starts_with("interactsh"))
    }
}
