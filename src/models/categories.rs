use serde::Serialize;
use std::fmt;

use crate::utils::constants::{LOW_INVOLVEMENT_MAX, MEDIUM_INVOLVEMENT_MAX};

/// Period of the day an accident happened in, in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TimeOfDay {
    Dawn,
    Morning,
    Afternoon,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Dawn,
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Night,
    ];

    /// Bucket an hour of day; hours outside 0..=23 have no bucket
    pub fn from_hour(hour: i64) -> Option<Self> {
        match hour {
            0..=5 => Some(TimeOfDay::Dawn),
            6..=11 => Some(TimeOfDay::Morning),
            12..=17 => Some(TimeOfDay::Afternoon),
            18..=23 => Some(TimeOfDay::Night),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Dawn => "Madrugada",
            TimeOfDay::Morning => "Manhã",
            TimeOfDay::Afternoon => "Tarde",
            TimeOfDay::Night => "Noite",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How many people an accident involved, in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum InvolvementTier {
    Low,
    Medium,
    High,
}

impl InvolvementTier {
    pub const ALL: [InvolvementTier; 3] = [
        InvolvementTier::Low,
        InvolvementTier::Medium,
        InvolvementTier::High,
    ];

    pub fn from_people(people: f64) -> Self {
        if people <= LOW_INVOLVEMENT_MAX {
            InvolvementTier::Low
        } else if people <= MEDIUM_INVOLVEMENT_MAX {
            InvolvementTier::Medium
        } else {
            InvolvementTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvolvementTier::Low => "Baixo envolvimento",
            InvolvementTier::Medium => "Médio envolvimento",
            InvolvementTier::High => "Alto envolvimento",
        }
    }
}

impl fmt::Display for InvolvementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
