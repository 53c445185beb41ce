use std::fmt::{Display, Formatter};

use crate::core::subsystem::Subsystem;

/// Per-cycle instantaneous fields of a subsystem point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InstantField {
    Voltage,
    Current,
    Power,
    Energy,
    Cost,
}

impl InstantField {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Voltage => "Voltage",
            Self::Current => "Current",
            Self::Power => "Power",
            Self::Energy => "Energy",
            Self::Cost => "Cost",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TallyField {
    Energy,
    Cost,
}

impl TallyField {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Energy => "Energy",
            Self::Cost => "Cost",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SummaryField {
    TotalEnergy,
    TotalCost,
    EnergyPrice,
}

/// Scope of a daily-total point: one subsystem or the aggregate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DailyScope {
    Subsystem(Subsystem),
    Total,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WeeklySeries {
    Energies,
    Costs,
}

/// A tag in the store's flat namespace.
///
/// The rendered names are the compatibility contract with the original
/// store layout: flat scalar keys plus the two 7-element weekday series.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TagKey {
    /// `Lighting.Voltage`, `HVAC.Power`, …
    Instant(Subsystem, InstantField),
    /// `EnergySummary.TotalEnergy`, ….
    Summary(SummaryField),
    /// `DailyEnergyLighting.Energy`, `DailyEnergyTotal.Cost`, ….
    Daily(DailyScope, TallyField),
    /// `WeeklyEnergyTotal.Energy`, `WeeklyEnergyTotal.Cost`.
    WeeklyTotal(TallyField),
    /// `WeeklyEnergy.Day1`…`Day7` / `WeeklyCosts.Day1`…`Day7`,
    /// carrying a 0-based weekday index (Monday = 0).
    WeeklyDay(WeeklySeries, usize),
    /// `ResetTimes.LastResetDate`.
    LastResetDate,
    /// `ResetTimes.LastResetWeek`.
    LastResetWeek,
    /// `Comparison.Lighting_HVAC`, ….
    Comparison(Subsystem, Subsystem),
}

impl Display for TagKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instant(subsystem, field) => {
                write!(formatter, "{subsystem}.{}", field.as_str())
            }
            Self::Summary(field) => {
                let field = match field {
                    SummaryField::TotalEnergy => "TotalEnergy",
                    SummaryField::TotalCost => "TotalCost",
                    SummaryField::EnergyPrice => "EnergyPrice",
                };
                write!(formatter, "EnergySummary.{field}")
            }
            Self::Daily(scope, field) => {
                match scope {
                    DailyScope::Subsystem(subsystem) => {
                        write!(formatter, "DailyEnergy{subsystem}")?;
                    }
                    DailyScope::Total => formatter.write_str("DailyEnergyTotal")?,
                }
                write!(formatter, ".{}", field.as_str())
            }
            Self::WeeklyTotal(field) => write!(formatter, "WeeklyEnergyTotal.{}", field.as_str()),
            Self::WeeklyDay(series, index) => {
                let point = match series {
                    WeeklySeries::Energies => "WeeklyEnergy",
                    WeeklySeries::Costs => "WeeklyCosts",
                };
                write!(formatter, "{point}.Day{}", index + 1)
            }
            Self::LastResetDate => formatter.write_str("ResetTimes.LastResetDate"),
            Self::LastResetWeek => formatter.write_str("ResetTimes.LastResetWeek"),
            Self::Comparison(lhs, rhs) => write!(formatter, "Comparison.{lhs}_{rhs}"),
        }
    }
}
