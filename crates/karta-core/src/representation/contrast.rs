//! Comparison of representation descriptors
//!
//! `contrast(requested, candidate)` tells how a candidate descriptor relates
//! to a requested one. A field present only on the candidate makes it more
//! specific there (narrower); a field present only on the request makes it
//! less specific (broader); two different values on the same field cannot be
//! reconciled.

use super::Representation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relation of a candidate descriptor to a requested one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Contrast {
    /// Same fields, same values
    Equal,
    /// The candidate adds detail and never contradicts the request
    Narrower,
    /// The candidate omits detail the request has
    Broader,
    /// Conflicting values, or narrower on some fields and broader on others
    Incomparable,
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contrast::Equal => write!(f, "EQUAL"),
            Contrast::Narrower => write!(f, "NARROWER"),
            Contrast::Broader => write!(f, "BROADER"),
            Contrast::Incomparable => write!(f, "INCOMPARABLE"),
        }
    }
}

#[derive(Default)]
struct Tally {
    narrower: bool,
    broader: bool,
    conflict: bool,
}

impl Tally {
    fn field<T: PartialEq>(&mut self, requested: Option<&T>, candidate: Option<&T>) {
        match (requested, candidate) {
            (None, None) => {}
            (None, Some(_)) => self.narrower = true,
            (Some(_), None) => self.broader = true,
            (Some(r), Some(c)) => {
                if r != c {
                    self.conflict = true;
                }
            }
        }
    }

    fn verdict(&self) -> Contrast {
        match (self.conflict, self.narrower, self.broader) {
            (true, _, _) | (false, true, true) => Contrast::Incomparable,
            (false, true, false) => Contrast::Narrower,
            (false, false, true) => Contrast::Broader,
            (false, false, false) => Contrast::Equal,
        }
    }
}

/// Compare `candidate` against `requested`
pub fn contrast(requested: &Representation, candidate: &Representation) -> Contrast {
    let mut tally = Tally::default();
    tally.field(requested.language.as_ref(), candidate.language.as_ref());
    tally.field(requested.profile.as_ref(), candidate.profile.as_ref());
    tally.field(requested.serialization.as_ref(), candidate.serialization.as_ref());
    tally.field(requested.format.as_ref(), candidate.format.as_ref());
    tally.field(requested.charset.as_ref(), candidate.charset.as_ref());
    tally.field(requested.encoding.as_ref(), candidate.encoding.as_ref());

    let (wanted, offered) = (&requested.lexicons, &candidate.lexicons);
    if wanted != offered {
        if offered.is_superset(wanted) {
            tally.narrower = true;
        } else if offered.is_subset(wanted) {
            tally.broader = true;
        } else {
            tally.conflict = true;
        }
    }

    tally.verdict()
}

/// `a` is at least as specific as `b`
pub fn is_narrower_or_equal(a: &Representation, b: &Representation) -> bool {
    matches!(contrast(b, a), Contrast::Equal | Contrast::Narrower)
}

/// `a` covers `b`: everything `a` states, `b` states too
pub fn is_broader_or_equal(a: &Representation, b: &Representation) -> bool {
    matches!(contrast(b, a), Contrast::Equal | Contrast::Broader)
}
