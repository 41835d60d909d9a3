use serde::{Deserialize, Serialize};

/// Cities offered by the city selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum City {
    #[default]
    Mumbai,
    Delhi,
    Bangalore,
    Chennai,
    Kolkata,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Mumbai,
        City::Delhi,
        City::Bangalore,
        City::Chennai,
        City::Kolkata,
    ];

    /// Lowercase key compared against `BankRecord::city`.
    pub fn key(&self) -> &'static str {
        match self {
            City::Mumbai => "mumbai",
            City::Delhi => "delhi",
            City::Bangalore => "bangalore",
            City::Chennai => "chennai",
            City::Kolkata => "kolkata",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            City::Mumbai => "Mumbai",
            City::Delhi => "Delhi",
            City::Bangalore => "Bangalore",
            City::Chennai => "Chennai",
            City::Kolkata => "Kolkata",
        }
    }

    /// Parse a city key or label, ignoring case.
    pub fn from_key(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.key() == lower)
    }

    /// Get the next city (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            City::Mumbai => City::Delhi,
            City::Delhi => City::Bangalore,
            City::Bangalore => City::Chennai,
            City::Chennai => City::Kolkata,
            City::Kolkata => City::Mumbai,
        }
    }

    /// Get the previous city (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            City::Mumbai => City::Kolkata,
            City::Delhi => City::Mumbai,
            City::Bangalore => City::Delhi,
            City::Chennai => City::Bangalore,
            City::Kolkata => City::Chennai,
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
