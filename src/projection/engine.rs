//! Year driver and multi-year simulation loop

use super::estate::terminal_estate;
use super::evolution::{
    corporate_interest_paid_out, evolve_corporate, evolve_non_registered, evolve_registered, evolve_tfsa,
    opening_distributions, total_distributions,
};
use super::invariants;
use super::records::{Balances, PersonYear, SimulationResult, YearRecord};
use super::state::CarryState;
use crate::assumptions::{JurisdictionParams, TaxTables};
use crate::benefits::{self, GisIncome};
use crate::error::SimulationError;
use crate::household::{validate_household, ClawbackBasis, Distributions, Household};
use crate::income::{self, RecurringIncome};
use crate::tax::TaxInput;
use crate::withdrawal::{self, MandatoryDraw, PersonContext, ResolverInput, MAX_ITERATIONS};

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Resolver iteration cap per year
    pub max_iterations: u32,

    /// Check every year record against the invariants (debug-asserted)
    pub check_invariants: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            check_invariants: true,
        }
    }
}

/// Main simulation engine
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    tables: TaxTables,
    config: SimulationConfig,
}

/// Opening position of one person, before the resolver runs
struct Opening {
    recurring: RecurringIncome,
    mandatory: MandatoryDraw,
    non_registered: [Distributions; 3],
    corporate: [Distributions; 3],
}

/// Everything a year produces
struct YearOutcome {
    state: CarryState,
    record: YearRecord,
    tax_inputs: Vec<TaxInput>,
}

impl SimulationEngine {
    pub fn new(tables: TaxTables, config: SimulationConfig) -> Self {
        Self { tables, config }
    }

    /// Built-in 2025 tables with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(TaxTables::default_2025(), SimulationConfig::default())
    }

    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Simulate from the start year to the year the older person reaches
    /// `end_age`. Configuration and input errors surface before any year runs.
    pub fn run(&self, household: &Household) -> Result<SimulationResult, SimulationError> {
        validate_household(household)?;

        let years = household.years_to_simulate();
        let year_params = (0..years as i32)
            .map(|i| self.tables.params_for(&household.jurisdiction, household.start_year + i))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "simulating {} years from {} in {} with strategy {}",
            years,
            household.start_year,
            household.jurisdiction,
            household.strategy
        );

        let mut state = CarryState::from_household(household);
        let mut result = SimulationResult::new(household.strategy);
        let mut terminal: Option<(&JurisdictionParams, Vec<TaxInput>)> = None;

        for params in year_params {
            let outcome = self.simulate_year(household, params, state);
            state = outcome.state;

            if self.config.check_invariants {
                let violations = invariants::check_year(
                    &outcome.record,
                    result.records.last(),
                    params,
                    household.gap_tolerance,
                );
                for violation in &violations {
                    log::error!("invariant violated: {violation}");
                }
                debug_assert!(violations.is_empty(), "invariant violations: {violations:?}");
            }

            let failed = !outcome.record.funded;
            let year = outcome.record.year;
            result.add_record(outcome.record);
            terminal = Some((params, outcome.tax_inputs));

            if failed && household.stop_on_fail {
                log::warn!("stopping after unfunded year {year}");
                break;
            }
        }

        if let (Some((params, tax_inputs)), Some(last)) = (terminal, result.records.last_mut()) {
            last.estate = Some(terminal_estate(&state, &tax_inputs, params));
        }
        result.finalize();

        log::info!(
            "{} of {} years funded, lifetime tax {:.2}, after-tax estate {:.2}",
            result.summary.years_funded,
            result.summary.years_simulated,
            result.summary.total_tax,
            result.summary.final_after_tax_estate
        );
        Ok(result)
    }

    /// Simulate one year: benefits, income, resolver, evolution, record.
    /// Returns the state for the following year.
    pub fn step_year(
        &self,
        household: &Household,
        params: &JurisdictionParams,
        state: CarryState,
    ) -> (CarryState, YearRecord) {
        let outcome = self.simulate_year(household, params, state);
        (outcome.state, outcome.record)
    }

    fn opening(&self, household: &Household, params: &JurisdictionParams, state: &CarryState) -> Vec<Opening> {
        let inflation = household.general_inflation;
        let elapsed = state.years_elapsed;

        let mut openings: Vec<Opening> = household
            .persons()
            .into_iter()
            .zip(&state.people)
            .map(|(person, current)| {
                let age = current.age;
                let cpp = benefits::cpp_amount(&person.cpp, current.age_at_start, elapsed, inflation);
                let oas = benefits::oas_amount(&person.oas, &params.oas, current.age_at_start, elapsed, inflation);
                let (pension, employment, other) = income::stream_income(person, age, elapsed, inflation);

                let mandatory = withdrawal::mandatory_draw(
                    params,
                    &household.strategy,
                    age,
                    person.oas.start_age,
                    current.rrif.balance,
                    person.early_rrif,
                );
                let non_registered = opening_distributions(&current.non_registered);
                let corporate = opening_distributions(&current.corporate.buckets);

                Opening {
                    recurring: RecurringIncome {
                        age,
                        cpp,
                        oas_gross: oas,
                        gis: 0.0,
                        pension_income: pension,
                        employment_income: employment,
                        other_income: other,
                        rrif_mandatory: mandatory.planned,
                        distributions: total_distributions(&non_registered),
                        distributions_paid_out: !household.reinvest_distributions,
                        corporate_interest: corporate_interest_paid_out(&current.corporate, &corporate),
                    },
                    mandatory,
                    non_registered,
                    corporate,
                }
            })
            .collect();

        // GIS is tested on last year's household income; the first year uses
        // this year's recurring income
        let gis_basis = state.prior_gis_income.unwrap_or_else(|| {
            let mut basis = GisIncome::default();
            for opening in &openings {
                let r = &opening.recurring;
                basis.employment += r.employment_income;
                basis.other += r.categories().taxable_income(params) - r.oas_gross - r.employment_income;
            }
            basis
        });
        let couple = household.is_couple();
        for opening in &mut openings {
            let r = &mut opening.recurring;
            if r.age >= benefits::GIS_MIN_AGE && r.oas_gross > 0.0 {
                r.gis = benefits::gis_amount(&params.gis, couple, &gis_basis);
            }
        }
        openings
    }

    fn simulate_year(&self, household: &Household, params: &JurisdictionParams, mut state: CarryState) -> YearOutcome {
        let year = state.year;
        let target = household.spending_target(year);
        let openings = self.opening(household, params, &state);

        let contexts: Vec<PersonContext> = openings
            .iter()
            .zip(&state.people)
            .map(|(opening, current)| PersonContext {
                age: current.age,
                base_income: opening.recurring.categories(),
                oas_gross: opening.recurring.oas_gross,
                clawback_income: match household.clawback_basis {
                    ClawbackBasis::CurrentYear => None,
                    ClawbackBasis::PriorYear => current.prior_taxable,
                },
                rrif_mandatory: opening.mandatory.planned,
                tfsa_balance: current.tfsa.balance,
                tfsa_room: current.tfsa.room,
                rrif_available: (current.rrif.balance - opening.mandatory.planned).max(0.0),
                non_registered: current.non_registered,
                corporate: current.corporate.clone(),
            })
            .collect();
        let cash_in: f64 = openings.iter().map(|o| o.recurring.cash()).sum();

        let resolution = withdrawal::resolve(&ResolverInput {
            params,
            people: contexts,
            cash_in,
            target,
            tolerance: household.gap_tolerance,
            strategy: household.strategy,
            split_fraction: household.income_split_fraction,
            max_iterations: self.config.max_iterations,
        });

        if !resolution.funded {
            log::warn!(
                "{year}: underfunded by {:.2} (target {target:.2}, after-tax cash {:.2})",
                resolution.underfunded,
                resolution.after_tax_cash
            );
        }

        let sale_order = household.strategy.sale_order();
        let mut people = Vec::with_capacity(state.people.len());
        let mut gis_income = GisIncome::default();

        for (((current, opening), resolved), person) in state
            .people
            .iter_mut()
            .zip(&openings)
            .zip(&resolution.people)
            .zip(household.persons())
        {
            let draws = resolved.draws;
            let sale = evolve_non_registered(
                &mut current.non_registered,
                &opening.non_registered,
                draws.non_registered,
                sale_order,
                household.reinvest_distributions,
                resolved.contribution.non_registered,
            );
            let corporate = evolve_corporate(
                &mut current.corporate,
                &opening.corporate,
                draws.corporate,
                params.capital_gains_inclusion,
            );
            let rrif_withdrawal = opening.mandatory.planned + draws.rrif;
            evolve_registered(&mut current.rrif, rrif_withdrawal);
            evolve_tfsa(&mut current.tfsa, draws.tfsa, resolved.contribution.tfsa, &params.tfsa);

            let assessment = &resolved.assessment;
            current.prior_taxable = Some(assessment.taxable_income);

            let r = &opening.recurring;
            gis_income.employment += r.employment_income;
            gis_income.other += assessment.taxable_income - r.oas_gross - r.employment_income;

            let routed_gain = if current.corporate.route_capital_gains_to_shareholder {
                corporate.realized_gain
            } else {
                0.0
            };

            people.push(PersonYear {
                name: person.name.clone(),
                age: current.age,
                cpp: r.cpp,
                oas_gross: r.oas_gross,
                oas_clawback: assessment.oas_clawback,
                gis: r.gis,
                pension_income: r.pension_income,
                employment_income: r.employment_income,
                other_income: r.other_income,
                distributions: r.distributions.total(),
                income: resolved.income,
                rrif_minimum: opening.mandatory.minimum,
                rrif_withdrawal,
                tfsa_withdrawal: draws.tfsa,
                non_registered_withdrawal: draws.non_registered,
                corporate_withdrawal: draws.corporate,
                tfsa_contribution: resolved.contribution.tfsa,
                non_registered_contribution: resolved.contribution.non_registered,
                realized_gain: sale.realized_gain + r.distributions.capital_gain + routed_gain,
                taxable_income: assessment.taxable_income,
                federal_tax: assessment.federal.net_tax,
                provincial_tax: assessment.provincial.net_tax,
                net_tax: assessment.net_tax,
                marginal_rate: assessment.marginal_rate,
                split_transferred: resolved.split_transferred,
                split_received: resolved.split_received,
                corporate,
                end_balances: Balances {
                    tfsa: current.tfsa.balance,
                    tfsa_room: current.tfsa.room,
                    rrif: current.rrif.balance,
                    non_registered: current.non_registered.total(),
                    non_registered_acb: current.non_registered.total_acb(),
                    corporate: current.corporate.total(),
                    rdtoh: current.corporate.rdtoh,
                    cda: current.corporate.cda,
                },
            });
        }

        let tax = resolution.total_tax();
        let mandatory: f64 = openings.iter().map(|o| o.mandatory.planned).sum();
        state.cumulative_tax += tax;
        state.cumulative_spending += resolution.spending_met;
        state.prior_gis_income = Some(gis_income);

        let record = YearRecord {
            year,
            people,
            spending_target: target,
            inflows: cash_in - mandatory,
            withdrawals: mandatory + resolution.total_withdrawals(),
            after_tax_cash: resolution.after_tax_cash,
            spending_met: resolution.spending_met,
            underfunded: resolution.underfunded,
            funded: resolution.funded,
            surplus: resolution.surplus,
            iterations: resolution.iterations,
            convergence: resolution.convergence,
            tax,
            oas_clawback: resolution.total_clawback(),
            cumulative_tax: state.cumulative_tax,
            cumulative_spending: state.cumulative_spending,
            net_worth: state.net_worth(),
            estate: None,
        };
        let tax_inputs = resolution.people.iter().map(|p| p.tax_input).collect();

        state.advance();
        YearOutcome {
            state,
            record,
            tax_inputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::{
        BenefitElection, Bucket, IncomeKind, OtherIncome, Person, SpendingProfile, YieldMix,
    };
    use crate::error::InputValidationError;
    use crate::projection::invariants::check_run;
    use crate::withdrawal::{Strategy, StrategyKind};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn engine() -> SimulationEngine {
        SimulationEngine::with_defaults()
    }

    #[test]
    fn test_tfsa_only_zero_tax() {
        let mut person = Person::new("A", 65);
        person.tfsa.balance = 100_000.0;
        person.tfsa.yield_rate = 0.05;
        let household = Household::single(person, 2025, 68);

        let result = engine().run(&household).unwrap();
        assert_eq!(result.records.len(), 4);

        let balances: Vec<f64> = result.records.iter().map(|r| r.people[0].end_balances.tfsa).collect();
        assert_abs_diff_eq!(balances[0], 105_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(balances[1], 110_250.0, epsilon = 1e-6);
        assert_abs_diff_eq!(balances[2], 115_762.50, epsilon = 1e-6);
        assert!(result.records.iter().all(|r| r.tax == 0.0 && r.funded));
        assert_eq!(result.summary.success_rate, 1.0);
    }

    #[test]
    fn test_rrif_minimum_at_71() {
        let mut person = Person::new("A", 71);
        person.rrif.balance = 500_000.0;
        let household = Household::single(person, 2025, 80);

        let result = engine().run(&household).unwrap();
        let first = &result.records[0].people[0];

        assert_abs_diff_eq!(first.rrif_minimum, 26_400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(first.rrif_withdrawal, 26_400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(first.end_balances.rrif, 473_600.0, epsilon = 1e-6);
        assert_abs_diff_eq!(first.income.pension_eligible, 26_400.0, epsilon = 1e-6);
        // Minimum is taxed and reinvested
        assert!(first.non_registered_contribution > 0.0);
    }

    #[test]
    fn test_stop_on_fail() {
        let mut person = Person::new("A", 70);
        person.tfsa.balance = 10_000.0;
        let mut household = Household::single(person, 2025, 90);
        household.spending = SpendingProfile::flat(50_000.0);
        household.stop_on_fail = true;

        let result = engine().run(&household).unwrap();
        assert_eq!(result.records.len(), 1);
        assert!(!result.records[0].funded);
        assert_eq!(result.summary.first_failure_year, Some(2025));
        assert!(result.records[0].estate.is_some());
    }

    #[test]
    fn test_unknown_jurisdiction_fails_before_running() {
        let mut household = Household::single(Person::new("A", 70), 2025, 90);
        household.jurisdiction = "ZZ".to_string();
        assert!(matches!(engine().run(&household), Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_invalid_household_rejected() {
        let household = Household::single(Person::new("A", 70), 2025, 70);
        assert!(matches!(engine().run(&household), Err(SimulationError::Input(_))));
    }

    #[test]
    fn test_acb_above_market_value_rejected_before_running() {
        let mut person = Person::new("A", 70);
        person.other_income.push(OtherIncome {
            kind: IncomeKind::Rental,
            amount: 60_000.0,
            start_age: 0,
            end_age: Some(90),
            indexed: false,
        });
        person.non_registered.invested = Bucket::new(100_000.0, 200_000.0, YieldMix::default());
        let mut household = Household::single(person, 2025, 90);
        household.spending = SpendingProfile::flat(100_000.0);
        household.strategy = Strategy::new(StrategyKind::Balanced);

        assert!(matches!(
            engine().run(&household),
            Err(SimulationError::Input(InputValidationError::AcbExceedsMarketValue { .. }))
        ));
    }

    #[test]
    fn test_step_year_does_not_touch_params() {
        let engine = engine();
        let params = engine.tables().params_for("ON", 2025).unwrap().clone();
        let mut person = Person::new("A", 72);
        person.rrif.balance = 300_000.0;
        person.rrif.yield_rate = 0.04;
        let household = Household::single(person, 2025, 95);

        let state = CarryState::from_household(&household);
        let (next, record) = engine.step_year(&household, &params, state);

        assert_eq!(next.year, 2026);
        assert_eq!(next.people[0].age, 73);
        assert_eq!(record.year, 2025);
        assert_eq!(&params, engine.tables().params_for("ON", 2025).unwrap());
    }

    fn low_income_person(name: &str) -> Person {
        let mut person = Person::new(name, 66);
        person.cpp = BenefitElection {
            amount_at_65: 4_000.0,
            start_age: 65,
        };
        person.oas = BenefitElection {
            amount_at_65: 8_000.0,
            start_age: 65,
        };
        person
    }

    #[test]
    fn test_gis_uses_prior_year_income() {
        let mut person = low_income_person("A");
        person.other_income.push(OtherIncome {
            kind: IncomeKind::Rental,
            amount: 6_000.0,
            start_age: 0,
            end_age: Some(66),
            indexed: false,
        });
        let household = Household::single(person, 2025, 70);
        let result = engine().run(&household).unwrap();
        let gis: Vec<f64> = result.records.iter().map(|r| r.people[0].gis).collect();

        // Year 1 tests this year's income: CPP 4,000 + rental 6,000
        assert_abs_diff_eq!(gis[0], 13_042.56 - 0.5 * 10_000.0, epsilon = 1e-6);
        // Year 2 still sees last year's rental
        assert_eq!(result.records[1].people[0].other_income, 0.0);
        assert_abs_diff_eq!(gis[1], 13_042.56 - 0.5 * 10_000.0, epsilon = 1e-6);
        // Year 3 sees CPP only
        assert_abs_diff_eq!(gis[2], 13_042.56 - 0.5 * 4_000.0, epsilon = 1e-6);
        assert_eq!(result.records[0].people[0].income.tax_free, gis[0]);
    }

    #[test]
    fn test_no_gis_without_oas() {
        let mut person = low_income_person("A");
        person.oas.start_age = 70;
        let household = Household::single(person, 2025, 72);
        let result = engine().run(&household).unwrap();

        assert!(result.records[..4].iter().all(|r| r.people[0].gis == 0.0));
        assert!(result.records[4].people[0].gis > 0.0);
    }

    #[test]
    fn test_couple_gis_schedule() {
        let household = Household::couple(low_income_person("A"), low_income_person("B"), 2025, 70);
        let result = engine().run(&household).unwrap();

        // Household income tested: CPP 4,000 each
        let expected = 7_850.76 - 0.5 * 8_000.0;
        for person in &result.records[0].people {
            assert_abs_diff_eq!(person.gis, expected, epsilon = 1e-6);
        }
    }

    fn retired_couple() -> Household {
        let mut p1 = Person::new("A", 67);
        p1.cpp = BenefitElection {
            amount_at_65: 12_000.0,
            start_age: 65,
        };
        p1.oas = BenefitElection {
            amount_at_65: 8_500.0,
            start_age: 65,
        };
        p1.rrif.balance = 600_000.0;
        p1.rrif.yield_rate = 0.05;
        p1.tfsa.balance = 80_000.0;
        p1.tfsa.yield_rate = 0.05;
        p1.non_registered.invested = Bucket::new(
            200_000.0,
            120_000.0,
            YieldMix {
                eligible_dividend: 0.02,
                growth: 0.04,
                ..Default::default()
            },
        );

        let mut p2 = Person::new("B", 65);
        p2.oas = BenefitElection {
            amount_at_65: 8_500.0,
            start_age: 65,
        };
        p2.tfsa.balance = 60_000.0;
        p2.tfsa.yield_rate = 0.05;

        let mut household = Household::couple(p1, p2, 2025, 95);
        household.spending = SpendingProfile {
            go_go: 80_000.0,
            go_go_end_age: 75,
            slow_go: 65_000.0,
            slow_go_end_age: 85,
            no_go: 55_000.0,
        };
        household.spending_inflation = 0.02;
        household.general_inflation = 0.02;
        household.income_split_fraction = 0.5;
        household.gap_tolerance = 100.0;
        household
    }

    #[test]
    fn test_couple_run_keeps_invariants() {
        let engine = engine();
        let household = retired_couple();
        let result = engine.run(&household).unwrap();
        let params = engine.tables().params_for("ON", 2025).unwrap();

        assert_eq!(result.records.len(), 95 - 67 + 1);
        assert!(check_run(&result.records, params, household.gap_tolerance).is_empty());
        assert!(result.records.last().unwrap().estate.is_some());
        assert!(result.summary.total_tax > 0.0);
        // RRIF income was split at least once
        assert!(result.records.iter().any(|r| r.people[1].split_received > 0.0));
    }

    #[test]
    fn test_strategies_differ() {
        let engine = engine();
        let mut household = retired_couple();
        household.strategy = Strategy::new(StrategyKind::TfsaFirst);
        let tfsa_first = engine.run(&household).unwrap();
        household.strategy = Strategy::new(StrategyKind::Balanced);
        let balanced = engine.run(&household).unwrap();

        let tfsa_drawn = |result: &SimulationResult| -> f64 {
            result.records[0].people.iter().map(|p| p.tfsa_withdrawal).sum()
        };
        assert!(tfsa_drawn(&tfsa_first) > 0.0);
        assert_eq!(tfsa_drawn(&balanced), 0.0);
    }

    #[test]
    fn test_more_spending_never_improves_both_tax_and_estate() {
        let engine = engine();
        let mut household = retired_couple();
        household.income_split_fraction = 0.0;

        let mut previous: Option<(f64, f64)> = None;
        for spending in [40_000.0, 60_000.0, 80_000.0, 100_000.0] {
            household.spending = SpendingProfile::flat(spending);
            let summary = engine.run(&household).unwrap().summary;
            if let Some((tax, estate)) = previous {
                let better_tax = summary.total_tax < tax - 1e-6;
                let better_estate = summary.final_after_tax_estate > estate + 1e-6;
                assert!(!(better_tax && better_estate), "spending {spending}");
            }
            previous = Some((summary.total_tax, summary.final_after_tax_estate));
        }
    }

    fn strategy_from(index: usize) -> Strategy {
        match index {
            0 => Strategy::new(StrategyKind::MinimizeIncome),
            1 => Strategy::new(StrategyKind::Balanced),
            2 => Strategy::new(StrategyKind::TfsaFirst),
            3 => Strategy::rrif_frontload(),
            4 => Strategy::new(StrategyKind::CapitalGainsOptimized),
            5 => Strategy::new(StrategyKind::CorporateOptimized),
            _ => Strategy::guarded(StrategyKind::TfsaFirst, crate::withdrawal::IncomeThreshold::NextBracket),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_invariants_hold(
            age in 60u32..85,
            tfsa in 0.0f64..300_000.0,
            rrif in 0.0f64..1_000_000.0,
            non_registered in 0.0f64..500_000.0,
            gain_share in 0.0f64..1.0,
            corporate in 0.0f64..400_000.0,
            spending in 0.0f64..120_000.0,
            strategy in 0usize..7,
        ) {
            let mut person = Person::new("P", age);
            person.cpp = BenefitElection { amount_at_65: 10_000.0, start_age: 65 };
            person.oas = BenefitElection { amount_at_65: 8_500.0, start_age: 65 };
            person.tfsa.balance = tfsa;
            person.tfsa.yield_rate = 0.04;
            person.rrif.balance = rrif;
            person.rrif.yield_rate = 0.05;
            person.non_registered.invested = Bucket::new(
                non_registered,
                non_registered * (1.0 - gain_share),
                YieldMix { interest: 0.01, growth: 0.04, ..Default::default() },
            );
            person.corporate.buckets.cash = Bucket::new(corporate * 0.2, corporate * 0.2, YieldMix::interest_only(0.03));
            person.corporate.buckets.invested = Bucket::new(
                corporate * 0.8,
                corporate * 0.8 * (1.0 - gain_share),
                YieldMix { eligible_dividend: 0.02, capital_gain: 0.01, growth: 0.03, ..Default::default() },
            );
            person.corporate.cda = corporate * 0.05;

            let mut household = Household::single(person, 2025, 95);
            household.spending = SpendingProfile::flat(spending);
            household.gap_tolerance = 50.0;
            household.strategy = strategy_from(strategy);

            let engine = SimulationEngine::with_defaults();
            let result = engine.run(&household).unwrap();
            let params = engine.tables().params_for("ON", 2025).unwrap();

            prop_assert!(check_run(&result.records, params, household.gap_tolerance).is_empty());
            for pair in result.records.windows(2) {
                prop_assert!(pair[1].cumulative_tax >= pair[0].cumulative_tax);
                prop_assert!(pair[1].cumulative_spending >= pair[0].cumulative_spending);
            }
        }
    }
}
