//! Message priority.

/// Tri-state message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// Level -1.
    NonUrgent,
    /// Level 0.
    #[default]
    Normal,
    /// Level 1.
    Urgent,
}

impl Priority {
    /// Maps any integer onto a priority, clamping values outside -1..=1.
    #[must_use]
    pub const fn from_level(level: i32) -> Self {
        if level <= -1 {
            Self::NonUrgent
        } else if level >= 1 {
            Self::Urgent
        } else {
            Self::Normal
        }
    }

    /// Numeric level: -1, 0 or 1.
    #[must_use]
    pub const fn level(self) -> i32 {
        match self {
            Self::NonUrgent => -1,
            Self::Normal => 0,
            Self::Urgent => 1,
        }
    }

    /// Value of the `Priority` header.
    #[must_use]
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::NonUrgent => "non-urgent",
            Self::Normal => "normal",
            Self::Urgent => "urgent",
        }
    }

    /// Value of the `Importance` header.
    #[must_use]
    pub const fn importance(self) -> &'static str {
        match self {
            Self::NonUrgent => "low",
            Self::Normal => "normal",
            Self::Urgent => "High",
        }
    }
}

impl From<i32> for Priority {
    fn from(level: i32) -> Self {
        Self::from_level(level)
    }
}
