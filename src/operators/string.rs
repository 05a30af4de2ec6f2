//! String operators

use crate::expression::{doc, Expression, Repr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringCase {
    Upper,
    Lower,
}

/// `{"$toUpper": x}` / `{"$toLower": x}`
#[derive(Debug, Clone)]
pub struct CaseConversion {
    case: StringCase,
    input: Repr,
}

impl CaseConversion {
    pub fn new(case: StringCase, input: impl Into<Repr>) -> Self {
        Self {
            case,
            input: input.into(),
        }
    }
}

impl Expression for CaseConversion {
    fn to_representation(&self) -> Repr {
        let key = match self.case {
            StringCase::Upper => "$toUpper",
            StringCase::Lower => "$toLower",
        };
        Repr::keyed(key, self.input.clone())
    }
}

pub fn to_upper(input: impl Into<Repr>) -> CaseConversion {
    CaseConversion::new(StringCase::Upper, input)
}

pub fn to_lower(input: impl Into<Repr>) -> CaseConversion {
    CaseConversion::new(StringCase::Lower, input)
}

/// String concatenation over one or more parts
#[derive(Debug, Clone)]
pub struct Concat {
    parts: Vec<Repr>,
}

impl Concat {
    pub fn new(first: impl Into<Repr>) -> Self {
        Self {
            parts: vec![first.into()],
        }
    }

    /// Appends another part
    pub fn and(mut self, part: impl Into<Repr>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }
}

impl Expression for Concat {
    fn to_representation(&self) -> Repr {
        Repr::keyed("$concat", Repr::Array(self.parts.clone()))
    }

    fn is_empty(&self) -> bool {
        false
    }
}

/// Code-point substring: `{"$substrCP": [input, start, length]}`
#[derive(Debug, Clone)]
pub struct Substr {
    input: Repr,
    start: i64,
    length: i64,
}

impl Substr {
    pub fn new(input: impl Into<Repr>, start: i64, length: i64) -> Self {
        Self {
            input: input.into(),
            start,
            length,
        }
    }
}

impl Expression for Substr {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$substrCP",
            Repr::Array(vec![
                self.input.clone(),
                Repr::from(self.start),
                Repr::from(self.length),
            ]),
        )
    }
}

/// Splits a string on a literal delimiter: `{"$split": [input, delimiter]}`
#[derive(Debug, Clone)]
pub struct Split {
    input: Repr,
    delimiter: String,
}

impl Split {
    pub fn new(input: impl Into<Repr>, delimiter: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            delimiter: delimiter.into(),
        }
    }
}

impl Expression for Split {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$split",
            Repr::Array(vec![
                self.input.clone(),
                Repr::literal(self.delimiter.as_str()),
            ]),
        )
    }
}

/// Trims whitespace (or the given characters) from both ends
#[derive(Debug, Clone)]
pub struct Trim {
    input: Repr,
    chars: Option<String>,
}

impl Trim {
    pub fn new(input: impl Into<Repr>) -> Self {
        Self {
            input: input.into(),
            chars: None,
        }
    }

    pub fn chars(mut self, chars: impl Into<String>) -> Self {
        self.chars = Some(chars.into());
        self
    }
}

impl Expression for Trim {
    fn to_representation(&self) -> Repr {
        let mut entries = vec![("input", self.input.clone())];
        if let Some(chars) = &self.chars {
            entries.push(("chars", Repr::literal(chars.as_str())));
        }
        Repr::keyed("$trim", doc(entries))
    }
}

impl_into_repr!(CaseConversion, Concat, Substr, Split, Trim);
