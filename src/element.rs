//! Elements and their recovery dimensions.
//!
//! An element fails and recovers independently along up to two dimensions,
//! [`Dimension::Hardware`] and [`Dimension::Software`]. Which dimensions an
//! element declares is captured by the variant of [`Dimensions`], so an element
//! without any dimension cannot be represented once bound.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Dimension {
    Hardware,
    Software,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::Hardware, Dimension::Software];

    pub const fn short_name(self) -> &'static str {
        match self {
            Dimension::Hardware => "hw",
            Dimension::Software => "sw",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Hardware => write!(f, "hardware"),
            Dimension::Software => write!(f, "software"),
        }
    }
}

impl FromStr for Dimension {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hw" | "hardware" => Ok(Dimension::Hardware),
            "sw" | "software" => Ok(Dimension::Software),
            _ => Err(ConfigError::UnknownDimension(s.to_string())),
        }
    }
}

/// Maximum number of recoveries along one dimension.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Budget {
    Finite(u32),
    Unbounded,
}

impl Budget {
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Budget::Unbounded)
    }

    /// Whether `count` recoveries still leave room for another one.
    pub const fn allows(self, count: u32) -> bool {
        match self {
            Budget::Finite(limit) => count < limit,
            Budget::Unbounded => true,
        }
    }

    /// Number of distinct states one dimension with this budget can be in.
    ///
    /// A finite budget `b` gives counts `0..=b`, each active or inactive. An
    /// unbounded dimension never counts recoveries, so it only toggles.
    pub const fn num_states(self) -> u64 {
        match self {
            Budget::Finite(limit) => 2 * (limit as u64 + 1),
            Budget::Unbounded => 2,
        }
    }
}

impl Display for Budget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Budget::Finite(limit) => write!(f, "{}", limit),
            Budget::Unbounded => write!(f, "inf"),
        }
    }
}

impl FromStr for Budget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inf" | "unbounded" | "infinite" | "∞" => Ok(Budget::Unbounded),
            other => other
                .parse::<u32>()
                .map(Budget::Finite)
                .map_err(|_| ConfigError::InvalidBudget(s.to_string())),
        }
    }
}

impl From<u32> for Budget {
    fn from(limit: u32) -> Self {
        Budget::Finite(limit)
    }
}

/// State of a single recovery dimension.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RecoveryState {
    /// Recoveries consumed so far.
    pub count: u32,
    pub is_active: bool,
}

impl RecoveryState {
    pub const INITIAL: RecoveryState = RecoveryState { count: 0, is_active: true };

    pub const fn failed(self) -> Self {
        RecoveryState {
            count: self.count,
            is_active: false,
        }
    }

    pub const fn recovered(self) -> Self {
        RecoveryState {
            count: self.count + 1,
            is_active: true,
        }
    }
}

impl Display for RecoveryState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.is_active { "+" } else { "-" }, self.count)
    }
}

/// One value per declared dimension.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Dimensions<T> {
    Hardware(T),
    Software(T),
    Both { hardware: T, software: T },
}

impl<T> Dimensions<T> {
    pub fn get(&self, dimension: Dimension) -> Option<&T> {
        match (self, dimension) {
            (Dimensions::Hardware(value), Dimension::Hardware) => Some(value),
            (Dimensions::Software(value), Dimension::Software) => Some(value),
            (Dimensions::Both { hardware, .. }, Dimension::Hardware) => Some(hardware),
            (Dimensions::Both { software, .. }, Dimension::Software) => Some(software),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> Option<&mut T> {
        match (self, dimension) {
            (Dimensions::Hardware(value), Dimension::Hardware) => Some(value),
            (Dimensions::Software(value), Dimension::Software) => Some(value),
            (Dimensions::Both { hardware, .. }, Dimension::Hardware) => Some(hardware),
            (Dimensions::Both { software, .. }, Dimension::Software) => Some(software),
            _ => None,
        }
    }

    pub fn has(&self, dimension: Dimension) -> bool {
        self.get(dimension).is_some()
    }

    /// Declared dimensions, hardware first.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &T)> {
        Dimension::ALL.into_iter().filter_map(|d| self.get(d).map(|v| (d, v)))
    }

    pub fn map<U, F>(&self, mut f: F) -> Dimensions<U>
    where
        F: FnMut(Dimension, &T) -> U,
    {
        match self {
            Dimensions::Hardware(value) => Dimensions::Hardware(f(Dimension::Hardware, value)),
            Dimensions::Software(value) => Dimensions::Software(f(Dimension::Software, value)),
            Dimensions::Both { hardware, software } => Dimensions::Both {
                hardware: f(Dimension::Hardware, hardware),
                software: f(Dimension::Software, software),
            },
        }
    }

    /// Returns a copy with `dimension` replaced, if declared.
    pub fn with(&self, dimension: Dimension, value: T) -> Option<Self>
    where
        T: Clone,
    {
        let mut result = self.clone();
        *result.get_mut(dimension)? = value;
        Some(result)
    }
}

/// State of one element: a [`RecoveryState`] per declared dimension.
pub type ElementState = Dimensions<RecoveryState>;

impl ElementState {
    pub fn is_active(&self) -> bool {
        self.iter().all(|(_, state)| state.is_active)
    }
}

impl Display for ElementState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, (dimension, state)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}{}", dimension.short_name(), state)?;
        }
        Ok(())
    }
}

/// Recovery budgets of an element, as supplied by the caller.
///
/// Either dimension may be left out, but not both; that is checked when the
/// element is bound, see [`ElementConfig::dimensions`].
///
/// ```
/// use relnet::element::{Budget, ElementConfig};
///
/// let config: ElementConfig = "hw:2, sw:inf".parse().unwrap();
/// assert_eq!(config, ElementConfig::both(2, Budget::Unbounded));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ElementConfig {
    pub hardware: Option<Budget>,
    pub software: Option<Budget>,
}

impl ElementConfig {
    pub fn hardware(budget: impl Into<Budget>) -> Self {
        Self {
            hardware: Some(budget.into()),
            software: None,
        }
    }

    pub fn software(budget: impl Into<Budget>) -> Self {
        Self {
            hardware: None,
            software: Some(budget.into()),
        }
    }

    pub fn both(hardware: impl Into<Budget>, software: impl Into<Budget>) -> Self {
        Self {
            hardware: Some(hardware.into()),
            software: Some(software.into()),
        }
    }

    pub fn budget(&self, dimension: Dimension) -> Option<Budget> {
        match dimension {
            Dimension::Hardware => self.hardware,
            Dimension::Software => self.software,
        }
    }

    pub fn dimensions(&self) -> Result<Dimensions<Budget>, ConfigError> {
        match (self.hardware, self.software) {
            (Some(hardware), Some(software)) => Ok(Dimensions::Both { hardware, software }),
            (Some(hardware), None) => Ok(Dimensions::Hardware(hardware)),
            (None, Some(software)) => Ok(Dimensions::Software(software)),
            (None, None) => Err(ConfigError::NoDimensions),
        }
    }
}

impl Display for ElementConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for dimension in Dimension::ALL {
            if let Some(budget) = self.budget(dimension) {
                if !first {
                    write!(f, ",")?;
                }
                write!(f, "{}:{}", dimension.short_name(), budget)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for ElementConfig {
    type Err = ConfigError;

    /// Parses a comma-separated list of `<dimension>:<budget>` (or `=`)
    /// entries, e.g. `hw:1`, `sw:inf`, `hardware=2, software=unbounded`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = ElementConfig::default();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (dimension, budget) = entry
                .split_once([':', '='])
                .ok_or_else(|| ConfigError::MalformedEntry(entry.to_string()))?;
            let dimension: Dimension = dimension.trim().parse()?;
            let budget: Budget = budget.trim().parse()?;
            let slot = match dimension {
                Dimension::Hardware => &mut config.hardware,
                Dimension::Software => &mut config.software,
            };
            if slot.replace(budget).is_some() {
                return Err(ConfigError::DuplicateDimension(dimension.to_string()));
            }
        }

        config.dimensions()?;
        Ok(config)
    }
}
