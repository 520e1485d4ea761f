//! Built-in 2025 federal + Ontario parameters

use super::params::{
    Bracket, DividendGrossUp, GisParams, GisSchedule, JurisdictionParams, OasParams, TaxParams,
    TfsaParams,
};
use super::rrif::RrifMinimumTable;

/// Federal 2025 rates and credit amounts
pub fn federal_2025() -> TaxParams {
    TaxParams {
        brackets: vec![
            Bracket::new(57_375.0, 0.15),
            Bracket::new(114_750.0, 0.205),
            Bracket::new(177_882.0, 0.26),
            Bracket::new(253_414.0, 0.29),
            Bracket::top(0.33),
        ],
        basic_personal_amount: 16_129.0,
        basic_personal_rate: 0.15,
        age_amount: 9_028.0,
        age_amount_rate: 0.15,
        age_amount_threshold: 45_522.0,
        age_amount_taper: 0.15,
        pension_credit_cap: 2_000.0,
        pension_credit_rate: 0.15,
        eligible_dividend_credit_rate: 0.150198,
        non_eligible_dividend_credit_rate: 0.090301,
    }
}

/// Ontario 2025 rates and credit amounts
pub fn ontario_2025() -> TaxParams {
    TaxParams {
        brackets: vec![
            Bracket::new(52_886.0, 0.0505),
            Bracket::new(105_775.0, 0.0915),
            Bracket::new(150_000.0, 0.1116),
            Bracket::new(220_000.0, 0.1216),
            Bracket::top(0.1316),
        ],
        basic_personal_amount: 12_747.0,
        basic_personal_rate: 0.0505,
        age_amount: 6_223.0,
        age_amount_rate: 0.0505,
        age_amount_threshold: 46_330.0,
        age_amount_taper: 0.15,
        pension_credit_cap: 1_762.0,
        pension_credit_rate: 0.0505,
        eligible_dividend_credit_rate: 0.10,
        non_eligible_dividend_credit_rate: 0.029863,
    }
}

/// Complete 2025 parameter set for Ontario residents
pub fn ontario_params_2025() -> JurisdictionParams {
    JurisdictionParams {
        jurisdiction: "ON".to_string(),
        year: 2025,
        federal: federal_2025(),
        provincial: ontario_2025(),
        dividend_gross_up: DividendGrossUp {
            eligible: 0.38,
            non_eligible: 0.15,
        },
        oas: OasParams {
            clawback_threshold: 93_454.0,
            clawback_rate: 0.15,
            age_75_increase: 0.10,
        },
        gis: GisParams {
            single: GisSchedule {
                max_benefit: 13_042.56,
                income_threshold: 22_056.0,
            },
            couple: GisSchedule {
                max_benefit: 7_850.76,
                income_threshold: 29_136.0,
            },
            taper: 0.5,
            employment_exemption: 5_000.0,
            partial_exemption_band: 10_000.0,
            partial_exemption_rate: 0.5,
        },
        capital_gains_inclusion: 0.5,
        tfsa: TfsaParams {
            annual_room: 7_000.0,
            restore_withdrawals: true,
        },
        rrif_conversion_age: 71,
        rrif_minimums: RrifMinimumTable::default(),
    }
}
