use std::fmt;

/// Which slice of the accumulated tallies a metric is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Every load combined. Count-like metrics are summed across loads and
    /// ratio metrics are recomputed from those sums.
    Aggregate,
    /// A single load, averaged across folds.
    Load(usize),
}

impl Scope {
    /// The aggregate scope followed by every load scope, in report order.
    pub fn all(loads: usize) -> impl Iterator<Item = Scope> {
        std::iter::once(Scope::Aggregate).chain((0..loads).map(Scope::Load))
    }

    pub fn load(&self) -> Option<usize> {
        match self {
            Scope::Aggregate => None,
            Scope::Load(load) => Some(*load),
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Scope::Aggregate)
    }
}

impl From<usize> for Scope {
    fn from(load: usize) -> Self {
        Scope::Load(load)
    }
}

impl From<Option<usize>> for Scope {
    fn from(load: Option<usize>) -> Self {
        load.map_or(Scope::Aggregate, Scope::Load)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Aggregate => write!(f, "*TL"),
            Scope::Load(load) => write!(f, "{}", load),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_starts_with_aggregate() {
        let scopes: Vec<Scope> = Scope::all(3).collect();
        assert_eq!(
            scopes,
            vec![
                Scope::Aggregate,
                Scope::Load(0),
                Scope::Load(1),
                Scope::Load(2)
            ]
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Scope::from(None), Scope::Aggregate);
        assert_eq!(Scope::from(Some(4)), Scope::Load(4));
        assert_eq!(Scope::Load(4).load(), Some(4));
        assert!(Scope::Aggregate.is_aggregate());
    }

    #[test]
    fn test_display() {
        assert_eq!(Scope::Aggregate.to_string(), "*TL");
        assert_eq!(Scope::Load(7).to_string(), "7");
    }
}
