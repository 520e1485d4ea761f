//! RRIF minimum withdrawal schedule
//!
//! The published schedule gives a percentage of the start-of-year balance by
//! attained age. Ages beyond the table use the open-top rate (20% from 95).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One row of the minimum-withdrawal schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RrifFactor {
    pub age: u32,
    pub factor: f64,
}

/// RRIF minimum withdrawal factors by attained age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrifMinimumTable {
    factors: Vec<RrifFactor>,
    /// Factor for every age past the end of the table
    open_top: f64,
}

impl Default for RrifMinimumTable {
    fn default() -> Self {
        // Prescribed factors (Income Tax Regulations s. 7308), ages 71-94
        let factors = [
            (71, 0.0528),
            (72, 0.0540),
            (73, 0.0553),
            (74, 0.0567),
            (75, 0.0582),
            (76, 0.0598),
            (77, 0.0617),
            (78, 0.0636),
            (79, 0.0658),
            (80, 0.0682),
            (81, 0.0708),
            (82, 0.0738),
            (83, 0.0771),
            (84, 0.0808),
            (85, 0.0851),
            (86, 0.0899),
            (87, 0.0955),
            (88, 0.1021),
            (89, 0.1099),
            (90, 0.1192),
            (91, 0.1306),
            (92, 0.1449),
            (93, 0.1634),
            (94, 0.1879),
        ];
        Self {
            factors: factors
                .iter()
                .map(|&(age, factor)| RrifFactor { age, factor })
                .collect(),
            open_top: 0.20,
        }
    }
}

impl RrifMinimumTable {
    /// Create from loaded CSV rows; the last row's factor becomes the open top
    pub fn from_loaded(rows: &[(u32, f64)]) -> Self {
        let mut factors: Vec<RrifFactor> = rows
            .iter()
            .map(|&(age, factor)| RrifFactor { age, factor })
            .collect();
        factors.sort_by_key(|f| f.age);
        let open_top = factors.last().map(|f| f.factor).unwrap_or(0.20);
        Self { factors, open_top }
    }

    /// First age with a mandatory minimum
    pub fn first_age(&self) -> Option<u32> {
        self.factors.first().map(|f| f.age)
    }

    /// Minimum factor for an attained age; 0 below the first table age
    pub fn factor(&self, age: u32) -> f64 {
        match self.first_age() {
            Some(first) if age >= first => self
                .factors
                .iter()
                .find(|f| f.age == age)
                .map(|f| f.factor)
                .unwrap_or(self.open_top),
            _ => 0.0,
        }
    }

    /// Mandatory withdrawal on a start-of-year balance
    pub fn minimum_withdrawal(&self, age: u32, start_balance: f64) -> f64 {
        self.factor(age) * start_balance.max(0.0)
    }

    /// Ages must run without gaps or repeats so every age below the open top
    /// has its own factor
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for pair in self.factors.windows(2) {
            if pair[1].age != pair[0].age + 1 {
                return Err(ConfigError::RrifScheduleGap {
                    previous: pair[0].age,
                    next: pair[1].age,
                });
            }
        }
        for f in &self.factors {
            super::params::check_rate(&format!("rrif factor at age {}", f.age), f.factor)?;
        }
        super::params::check_rate("rrif open-top factor", self.open_top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rrif_factors() {
        let table = RrifMinimumTable::default();

        assert_eq!(table.factor(65), 0.0);
        assert_eq!(table.factor(70), 0.0);
        assert_eq!(table.factor(71), 0.0528);
        assert_eq!(table.factor(80), 0.0682);
        assert_eq!(table.factor(94), 0.1879);
        assert_eq!(table.factor(95), 0.20);
        assert_eq!(table.factor(104), 0.20);
    }

    #[test]
    fn test_minimum_at_71() {
        let table = RrifMinimumTable::default();
        assert_abs_diff_eq!(
            table.minimum_withdrawal(71, 500_000.0),
            26_400.0,
            epsilon = 1e-6
        );
        assert_eq!(table.minimum_withdrawal(71, -10.0), 0.0);
    }

    #[test]
    fn test_from_loaded_sorts_and_sets_open_top() {
        let table = RrifMinimumTable::from_loaded(&[(72, 0.06), (71, 0.05), (73, 0.25)]);
        assert_eq!(table.first_age(), Some(71));
        assert_eq!(table.factor(72), 0.06);
        assert_eq!(table.factor(90), 0.25);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_age() {
        let rows: Vec<(u32, f64)> = RrifMinimumTable::default()
            .factors
            .iter()
            .filter(|f| f.age != 80)
            .map(|f| (f.age, f.factor))
            .collect();
        let table = RrifMinimumTable::from_loaded(&rows);
        assert!(matches!(
            table.validate(),
            Err(ConfigError::RrifScheduleGap { previous: 79, next: 81 })
        ));

        let repeated = RrifMinimumTable::from_loaded(&[(71, 0.05), (71, 0.06)]);
        assert!(repeated.validate().is_err());
        assert!(RrifMinimumTable::default().validate().is_ok());
    }
}
