//! Parsing levels and the single-step transitions between them
//!
//! Levels form a total order: `Encoded < Serialized < Concrete < Abstract`.
//! Lifting moves towards `Abstract` through `decode`, `deserialize` and
//! `parse`; lowering mirrors it through `externalize`, `serialize` and
//! `encode`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four stages an artifact moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsingLevel {
    /// Raw bytes, possibly with a transport encoding applied
    Encoded,
    /// Text in a known character set
    Serialized,
    /// A parse tree / document
    Concrete,
    /// A typed abstract syntax tree
    Abstract,
}

impl ParsingLevel {
    /// All levels from `Encoded` to `Abstract`
    pub const ALL: [ParsingLevel; 4] = [
        ParsingLevel::Encoded,
        ParsingLevel::Serialized,
        ParsingLevel::Concrete,
        ParsingLevel::Abstract,
    ];

    /// The next level towards `Abstract`
    pub fn next_up(self) -> Option<ParsingLevel> {
        match self {
            ParsingLevel::Encoded => Some(ParsingLevel::Serialized),
            ParsingLevel::Serialized => Some(ParsingLevel::Concrete),
            ParsingLevel::Concrete => Some(ParsingLevel::Abstract),
            ParsingLevel::Abstract => None,
        }
    }

    /// The next level towards `Encoded`
    pub fn next_down(self) -> Option<ParsingLevel> {
        match self {
            ParsingLevel::Encoded => None,
            ParsingLevel::Serialized => Some(ParsingLevel::Encoded),
            ParsingLevel::Concrete => Some(ParsingLevel::Serialized),
            ParsingLevel::Abstract => Some(ParsingLevel::Concrete),
        }
    }

    /// The next level on the way to `target`, if any
    pub fn next_towards(self, target: ParsingLevel) -> Option<ParsingLevel> {
        match self.cmp(&target) {
            std::cmp::Ordering::Less => self.next_up(),
            std::cmp::Ordering::Greater => self.next_down(),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Number of single steps between two levels
    pub fn distance(self, other: ParsingLevel) -> usize {
        (self as usize).abs_diff(other as usize)
    }

    /// The levels visited on the way to `target`, excluding `self`
    pub fn steps_to(self, target: ParsingLevel) -> Vec<ParsingLevel> {
        let mut steps = Vec::with_capacity(self.distance(target));
        let mut current = self;
        while let Some(next) = current.next_towards(target) {
            steps.push(next);
            current = next;
        }
        steps
    }
}

impl fmt::Display for ParsingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingLevel::Encoded => write!(f, "encoded"),
            ParsingLevel::Serialized => write!(f, "serialized"),
            ParsingLevel::Concrete => write!(f, "concrete"),
            ParsingLevel::Abstract => write!(f, "abstract"),
        }
    }
}

impl FromStr for ParsingLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "encoded" => Ok(ParsingLevel::Encoded),
            "serialized" => Ok(ParsingLevel::Serialized),
            "concrete" => Ok(ParsingLevel::Concrete),
            "abstract" => Ok(ParsingLevel::Abstract),
            other => Err(crate::Error::configuration(
                format!("Unknown parsing level '{}'", other),
                Some("level"),
            )),
        }
    }
}

/// A single step between adjacent levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Encoded -> Serialized
    Decode,
    /// Serialized -> Concrete
    Deserialize,
    /// Concrete -> Abstract
    Parse,
    /// Abstract -> Concrete
    Externalize,
    /// Concrete -> Serialized
    Serialize,
    /// Serialized -> Encoded
    Encode,
}

impl Transition {
    /// The transition between two adjacent levels
    pub fn between(from: ParsingLevel, to: ParsingLevel) -> Option<Transition> {
        use ParsingLevel::*;
        match (from, to) {
            (Encoded, Serialized) => Some(Transition::Decode),
            (Serialized, Concrete) => Some(Transition::Deserialize),
            (Concrete, Abstract) => Some(Transition::Parse),
            (Abstract, Concrete) => Some(Transition::Externalize),
            (Concrete, Serialized) => Some(Transition::Serialize),
            (Serialized, Encoded) => Some(Transition::Encode),
            _ => None,
        }
    }

    /// Level the transition consumes
    pub fn source(self) -> ParsingLevel {
        match self {
            Transition::Decode => ParsingLevel::Encoded,
            Transition::Deserialize | Transition::Encode => ParsingLevel::Serialized,
            Transition::Parse | Transition::Serialize => ParsingLevel::Concrete,
            Transition::Externalize => ParsingLevel::Abstract,
        }
    }

    /// Level the transition produces
    pub fn target(self) -> ParsingLevel {
        match self {
            Transition::Decode | Transition::Serialize => ParsingLevel::Serialized,
            Transition::Deserialize | Transition::Externalize => ParsingLevel::Concrete,
            Transition::Parse => ParsingLevel::Abstract,
            Transition::Encode => ParsingLevel::Encoded,
        }
    }

    /// Whether the transition moves towards `Abstract`
    pub fn is_lift(self) -> bool {
        self.target() > self.source()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Decode => "decode",
            Transition::Deserialize => "deserialize",
            Transition::Parse => "parse",
            Transition::Externalize => "externalize",
            Transition::Serialize => "serialize",
            Transition::Encode => "encode",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(ParsingLevel::Encoded < ParsingLevel::Serialized);
        assert!(ParsingLevel::Serialized < ParsingLevel::Concrete);
        assert!(ParsingLevel::Concrete < ParsingLevel::Abstract);
    }

    #[test]
    fn test_next_towards() {
        assert_eq!(
            ParsingLevel::Encoded.next_towards(ParsingLevel::Abstract),
            Some(ParsingLevel::Serialized)
        );
        assert_eq!(
            ParsingLevel::Abstract.next_towards(ParsingLevel::Encoded),
            Some(ParsingLevel::Concrete)
        );
        assert_eq!(ParsingLevel::Concrete.next_towards(ParsingLevel::Concrete), None);
        assert_eq!(ParsingLevel::Encoded.distance(ParsingLevel::Abstract), 3);
    }

    #[test]
    fn test_steps_to() {
        assert_eq!(
            ParsingLevel::Serialized.steps_to(ParsingLevel::Abstract),
            vec![ParsingLevel::Concrete, ParsingLevel::Abstract]
        );
        assert_eq!(
            ParsingLevel::Concrete.steps_to(ParsingLevel::Encoded),
            vec![ParsingLevel::Serialized, ParsingLevel::Encoded]
        );
        assert!(ParsingLevel::Abstract.steps_to(ParsingLevel::Abstract).is_empty());
    }

    #[test]
    fn test_transitions_round_trip_levels() {
        for window in ParsingLevel::ALL.windows(2) {
            let up = Transition::between(window[0], window[1]).unwrap();
            let down = Transition::between(window[1], window[0]).unwrap();
            assert!(up.is_lift());
            assert!(!down.is_lift());
            assert_eq!(up.source(), down.target());
            assert_eq!(up.target(), down.source());
        }
        assert_eq!(Transition::between(ParsingLevel::Encoded, ParsingLevel::Abstract), None);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("Abstract".parse::<ParsingLevel>().unwrap(), ParsingLevel::Abstract);
        assert!("binary".parse::<ParsingLevel>().is_err());
    }
}
