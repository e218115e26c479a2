use std::fmt;
use std::str::FromStr;

use crate::errors::LanczosError;

/// One-site operators understood by the bases.
/// # Definition
/// | kind | action on a slot $(i, \sigma, a)$ |
/// |------|-----------------------------------|
/// | `C` | $c_{ia\sigma}$ |
/// | `CDagger` | $c^\dagger_{ia\sigma}$ |
/// | `N` | $n_{ia\sigma}$ |
/// | `SPlus` | $S^+_{ia}=c^\dagger_{ia\uparrow}c_{ia\downarrow}$ |
/// | `SMinus` | $S^-_{ia}=c^\dagger_{ia\downarrow}c_{ia\uparrow}$ |
/// | `Sz` | $S^z_{ia}=\frac12(n_{ia\uparrow}-n_{ia\downarrow})$ |
///
/// `Nil` is the absence of an operator and is never applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Nil,
    C,
    CDagger,
    N,
    SPlus,
    SMinus,
    Sz,
}

impl OperatorKind {
    /// Hermitian conjugate of the operator.
    pub fn dagger(self) -> Self {
        match self {
            OperatorKind::C => OperatorKind::CDagger,
            OperatorKind::CDagger => OperatorKind::C,
            OperatorKind::SPlus => OperatorKind::SMinus,
            OperatorKind::SMinus => OperatorKind::SPlus,
            other => other,
        }
    }

    /// Change of the (up, down) particle counts when the operator acts on
    /// spin `up`. `None` for operators with no defined change.
    pub fn particle_change(self, up: bool) -> Option<(i64, i64)> {
        match self {
            OperatorKind::C => Some(if up { (-1, 0) } else { (0, -1) }),
            OperatorKind::CDagger => Some(if up { (1, 0) } else { (0, 1) }),
            OperatorKind::SPlus => Some((1, -1)),
            OperatorKind::SMinus => Some((-1, 1)),
            OperatorKind::N | OperatorKind::Sz => Some((0, 0)),
            OperatorKind::Nil => None,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OperatorKind::Nil => "nil",
            OperatorKind::C => "c",
            OperatorKind::CDagger => "cdagger",
            OperatorKind::N => "n",
            OperatorKind::SPlus => "splus",
            OperatorKind::SMinus => "sminus",
            OperatorKind::Sz => "sz",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OperatorKind {
    type Err = LanczosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" => Ok(OperatorKind::C),
            "cdagger" | "c+" => Ok(OperatorKind::CDagger),
            "n" => Ok(OperatorKind::N),
            "splus" | "s+" => Ok(OperatorKind::SPlus),
            "sminus" | "s-" => Ok(OperatorKind::SMinus),
            "sz" => Ok(OperatorKind::Sz),
            _ => Err(LanczosError::unsupported(
                OperatorKind::Nil,
                format!("operator name '{}'", s),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_print_names() {
        for what in [
            OperatorKind::C,
            OperatorKind::CDagger,
            OperatorKind::N,
            OperatorKind::SPlus,
            OperatorKind::SMinus,
            OperatorKind::Sz,
        ] {
            let parsed: OperatorKind = what.to_string().parse().unwrap();
            assert_eq!(parsed, what);
        }
        assert!("x".parse::<OperatorKind>().is_err());
    }

    #[test]
    fn dagger_is_an_involution() {
        assert_eq!(OperatorKind::C.dagger(), OperatorKind::CDagger);
        assert_eq!(OperatorKind::SPlus.dagger().dagger(), OperatorKind::SPlus);
        assert_eq!(OperatorKind::N.dagger(), OperatorKind::N);
    }
}
