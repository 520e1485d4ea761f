//! Fixed-point withdrawal resolver
//!
//! Chooses per-person, per-account draws so that after-tax cash meets the
//! spending target. Taxes depend on the draws and the draws depend on the
//! taxes, so the resolver iterates: start from the pre-tax shortfall, assess,
//! then grow or shrink the draws by the remaining gap scaled by the observed
//! marginal rate.

use serde::{Deserialize, Serialize};

use super::split::{trial_split, SplitOutcome};
use super::strategy::{AccountClass, DrawStep, IncomeThreshold, Strategy};
use super::surplus::{allocate_surplus, Contribution};
use crate::assumptions::JurisdictionParams;
use crate::error::ConvergenceWarning;
use crate::household::{BucketedAccount, CorporateAccount, CorporateDividend, EarlyRrif, Sale};
use crate::income::{self, IncomeCategories};
use crate::tax::{assess, TaxAssessment, TaxInput};

/// Hard cap on resolver iterations per year
pub const MAX_ITERATIONS: u32 = 10;

/// Bisection steps when fitting a capped draw under its threshold
const BISECTION_STEPS: u32 = 60;

/// Upper bound on the secant marginal rate
const MAX_MARGINAL: f64 = 0.95;

/// Smallest draw change treated as progress
const MIN_STEP: f64 = 1e-9;

/// Registered draws required before any discretionary withdrawal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MandatoryDraw {
    /// Statutory RRIF minimum
    pub minimum: f64,
    /// Amount actually withdrawn: the minimum, early-RRIF or frontload amount
    pub planned: f64,
}

/// Mandatory and planned registered draw for one person
pub fn mandatory_draw(
    params: &JurisdictionParams,
    strategy: &Strategy,
    age: u32,
    oas_start_age: u32,
    start_balance: f64,
    early: Option<EarlyRrif>,
) -> MandatoryDraw {
    let balance = start_balance.max(0.0);
    let converted = age >= params.rrif_conversion_age;

    let minimum = if converted {
        params.rrif_minimums.minimum_withdrawal(age, balance).min(balance)
    } else {
        0.0
    };
    let early = match early {
        Some(mode) if !converted => mode.amount(balance),
        _ => 0.0,
    };
    let frontload = strategy.frontload_target(age, oas_start_age, balance);

    MandatoryDraw {
        minimum,
        planned: minimum.max(early).max(frontload).min(balance),
    }
}

/// One person's position at the start of the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct PersonContext {
    pub age: u32,
    /// Recurring income including mandatory registered draws
    pub base_income: IncomeCategories,
    pub oas_gross: f64,
    /// Prior-year income for the clawback, when configured
    pub clawback_income: Option<f64>,
    /// Mandatory registered draw already in `base_income`
    pub rrif_mandatory: f64,
    pub tfsa_balance: f64,
    pub tfsa_room: f64,
    /// Registered balance left after the mandatory draw
    pub rrif_available: f64,
    pub non_registered: BucketedAccount,
    pub corporate: CorporateAccount,
}

impl PersonContext {
    fn available(&self, class: AccountClass) -> f64 {
        let balance = match class {
            AccountClass::Tfsa => self.tfsa_balance,
            AccountClass::Rrif => self.rrif_available,
            AccountClass::NonRegistered => self.non_registered.total(),
            AccountClass::Corporate => self.corporate.total(),
        };
        balance.max(0.0)
    }
}

pub struct ResolverInput<'a> {
    pub params: &'a JurisdictionParams,
    pub people: Vec<PersonContext>,
    /// Gross recurring cash before tax
    pub cash_in: f64,
    pub target: f64,
    pub tolerance: f64,
    pub strategy: Strategy,
    pub split_fraction: f64,
    pub max_iterations: u32,
}

/// Discretionary draws by account class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Draws {
    pub tfsa: f64,
    pub rrif: f64,
    pub non_registered: f64,
    pub corporate: f64,
}

impl Draws {
    pub fn total(&self) -> f64 {
        self.tfsa + self.rrif + self.non_registered + self.corporate
    }

    pub fn get(&self, class: AccountClass) -> f64 {
        match class {
            AccountClass::Tfsa => self.tfsa,
            AccountClass::Rrif => self.rrif,
            AccountClass::NonRegistered => self.non_registered,
            AccountClass::Corporate => self.corporate,
        }
    }

    fn get_mut(&mut self, class: AccountClass) -> &mut f64 {
        match class {
            AccountClass::Tfsa => &mut self.tfsa,
            AccountClass::Rrif => &mut self.rrif,
            AccountClass::NonRegistered => &mut self.non_registered,
            AccountClass::Corporate => &mut self.corporate,
        }
    }
}

/// Resolved position for one person
#[derive(Debug, Clone, PartialEq)]
pub struct PersonResolution {
    pub draws: Draws,
    pub sale: Sale,
    pub dividend: CorporateDividend,
    /// Final income after any pension split
    pub income: IncomeCategories,
    pub tax_input: TaxInput,
    pub assessment: TaxAssessment,
    pub split_transferred: f64,
    pub split_received: f64,
    pub contribution: Contribution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub people: Vec<PersonResolution>,
    pub after_tax_cash: f64,
    pub target: f64,
    /// Target minus after-tax cash; negative when there is a surplus
    pub gap: f64,
    pub funded: bool,
    pub underfunded: f64,
    pub surplus: f64,
    pub spending_met: f64,
    pub iterations: u32,
    /// Every account the strategy may use was drained
    pub exhausted: bool,
    pub split: Option<SplitOutcome>,
    pub convergence: Option<ConvergenceWarning>,
}

impl Resolution {
    pub fn total_withdrawals(&self) -> f64 {
        self.people.iter().map(|p| p.draws.total()).sum()
    }

    pub fn total_tax(&self) -> f64 {
        self.people.iter().map(|p| p.assessment.net_tax).sum()
    }

    pub fn total_clawback(&self) -> f64 {
        self.people.iter().map(|p| p.assessment.oas_clawback).sum()
    }
}

/// Taxes and cash for one candidate set of draws
struct Evaluation {
    draws: Vec<Draws>,
    sales: Vec<Sale>,
    dividends: Vec<CorporateDividend>,
    inputs: Vec<TaxInput>,
    assessments: Vec<TaxAssessment>,
    cash: f64,
}

struct Resolver<'a> {
    input: &'a ResolverInput<'a>,
    steps: Vec<DrawStep>,
    /// Taxable-income ceiling per step, fixed from base income
    ceilings: Vec<Option<f64>>,
}

impl<'a> Resolver<'a> {
    fn new(input: &'a ResolverInput<'a>) -> Self {
        let params = input.params;
        let base_taxable: Vec<f64> = input
            .people
            .iter()
            .map(|p| p.base_income.taxable_income(params))
            .collect();

        let mut order: Vec<usize> = (0..input.people.len()).collect();
        order.sort_by(|&a, &b| base_taxable[a].total_cmp(&base_taxable[b]));

        let steps = input.strategy.expand(&order);
        let ceilings = steps
            .iter()
            .map(|step| match step.capped {
                Some(IncomeThreshold::NextBracket) => {
                    params.next_bracket_threshold(base_taxable[step.person])
                }
                Some(IncomeThreshold::OasClawback) => Some(params.oas.clawback_threshold),
                None => None,
            })
            .collect();

        Self {
            input,
            steps,
            ceilings,
        }
    }

    fn draws(&self, amounts: &[f64]) -> Vec<Draws> {
        let mut draws = vec![Draws::default(); self.input.people.len()];
        for (step, amount) in self.steps.iter().zip(amounts) {
            *draws[step.person].get_mut(step.class) += amount;
        }
        draws
    }

    fn person_income(&self, person: usize, draws: &Draws) -> (IncomeCategories, Sale, CorporateDividend) {
        let ctx = &self.input.people[person];
        let sale = ctx
            .non_registered
            .preview_sale(draws.non_registered, self.input.strategy.sale_order());
        let dividend = ctx.corporate.preview_dividend(draws.corporate);

        let mut income = ctx.base_income;
        income += income::tfsa_withdrawal(draws.tfsa);
        income += income::registered_withdrawal(draws.rrif, ctx.age);
        income += income::non_registered_sale(&sale);
        income += income::corporate_dividend(&dividend, ctx.corporate.route_capital_gains_to_shareholder);
        (income, sale, dividend)
    }

    fn tax_input(&self, person: usize, income: IncomeCategories) -> TaxInput {
        let ctx = &self.input.people[person];
        TaxInput {
            age: ctx.age,
            income,
            oas_gross: ctx.oas_gross,
            clawback_income: ctx.clawback_income,
        }
    }

    fn evaluate(&self, amounts: &[f64]) -> Evaluation {
        let draws = self.draws(amounts);
        let people = self.input.people.len();
        let mut evaluation = Evaluation {
            draws: draws.clone(),
            sales: Vec::with_capacity(people),
            dividends: Vec::with_capacity(people),
            inputs: Vec::with_capacity(people),
            assessments: Vec::with_capacity(people),
            cash: self.input.cash_in,
        };

        for (person, draw) in draws.iter().enumerate() {
            let (income, sale, dividend) = self.person_income(person, draw);
            let tax_input = self.tax_input(person, income);
            let assessment = assess(&tax_input, self.input.params);
            evaluation.cash += draw.total() - assessment.total_cost();
            evaluation.sales.push(sale);
            evaluation.dividends.push(dividend);
            evaluation.inputs.push(tax_input);
            evaluation.assessments.push(assessment);
        }
        evaluation
    }

    /// Balance still drawable by `step`, net of every step sharing its account
    fn capacity(&self, amounts: &[f64], step: usize) -> f64 {
        let DrawStep { person, class, .. } = self.steps[step];
        let used: f64 = self
            .steps
            .iter()
            .zip(amounts)
            .filter(|(s, _)| s.person == person && s.class == class)
            .map(|(_, amount)| amount)
            .sum();
        (self.input.people[person].available(class) - used).max(0.0)
    }

    fn person_taxable(&self, amounts: &[f64], person: usize) -> f64 {
        let draws = self.draws(amounts);
        let (income, _, _) = self.person_income(person, &draws[person]);
        income.taxable_income(self.input.params)
    }

    /// Largest extra draw on `step` that keeps taxable income at or below `ceiling`
    fn headroom(&self, amounts: &[f64], step: usize, ceiling: f64, capacity: f64) -> f64 {
        let person = self.steps[step].person;
        let mut trial = amounts.to_vec();
        let mut taxable_with = |extra: f64| {
            trial[step] = amounts[step] + extra;
            self.person_taxable(&trial, person)
        };

        if taxable_with(0.0) >= ceiling {
            return 0.0;
        }
        if taxable_with(capacity) <= ceiling {
            return capacity;
        }

        let (mut lo, mut hi) = (0.0, capacity);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if taxable_with(mid) <= ceiling {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Add up to `need` along the draw order; returns the amount added
    fn grow(&self, amounts: &mut [f64], need: f64) -> f64 {
        let mut remaining = need;
        for step in 0..self.steps.len() {
            if remaining <= MIN_STEP {
                break;
            }
            let mut room = self.capacity(amounts, step);
            if let Some(ceiling) = self.ceilings[step] {
                room = self.headroom(amounts, step, ceiling, room.min(remaining));
            }
            let take = remaining.min(room);
            if take > 0.0 {
                amounts[step] += take;
                remaining -= take;
            }
        }
        need - remaining
    }

    /// Remove up to `excess` in reverse draw order; returns the amount removed
    fn shrink(&self, amounts: &mut [f64], excess: f64) -> f64 {
        let mut remaining = excess;
        for amount in amounts.iter_mut().rev() {
            if remaining <= MIN_STEP {
                break;
            }
            let take = remaining.min(*amount);
            *amount -= take;
            remaining -= take;
        }
        excess - remaining
    }
}

/// Resolve one year's draws, pension split and surplus
pub fn resolve(input: &ResolverInput) -> Resolution {
    let resolver = Resolver::new(input);
    let mut amounts = vec![0.0; resolver.steps.len()];

    resolver.grow(&mut amounts, (input.target - input.cash_in).max(0.0));

    let max_iterations = input.max_iterations.max(1);
    let mut iterations = 0;
    let mut exhausted = false;
    let mut marginal = 0.0;
    let mut previous: Option<(f64, f64)> = None;

    let mut evaluation = loop {
        iterations += 1;
        let evaluation = resolver.evaluate(&amounts);
        let withdrawn: f64 = amounts.iter().sum();

        if let Some((previous_withdrawn, previous_cash)) = previous {
            let delta = withdrawn - previous_withdrawn;
            if delta.abs() > MIN_STEP {
                marginal = (1.0 - (evaluation.cash - previous_cash) / delta).clamp(0.0, MAX_MARGINAL);
            }
        }
        previous = Some((withdrawn, evaluation.cash));

        let shortfall = input.target - evaluation.cash;
        log::debug!(
            "resolver iteration {iterations}: withdrawn {withdrawn:.2}, cash {:.2}, gap {shortfall:.2}, marginal {marginal:.3}",
            evaluation.cash
        );

        if shortfall.abs() <= input.tolerance || iterations >= max_iterations {
            break evaluation;
        }
        if shortfall > 0.0 {
            if resolver.grow(&mut amounts, shortfall / (1.0 - marginal)) <= MIN_STEP {
                exhausted = true;
                break evaluation;
            }
        } else if resolver.shrink(&mut amounts, -shortfall / (1.0 - marginal)) <= MIN_STEP {
            break evaluation;
        }
    };

    let residual = input.target - evaluation.cash;
    let convergence = if iterations >= max_iterations && !exhausted && residual > input.tolerance {
        log::warn!("resolver hit {max_iterations} iterations with residual gap {residual:.2}");
        Some(ConvergenceWarning {
            iterations,
            residual_gap: residual,
        })
    } else {
        None
    };

    let split = split_pension(input, &mut evaluation);
    finish(input, evaluation, iterations, exhausted, split, convergence)
}

fn split_pension(input: &ResolverInput, evaluation: &mut Evaluation) -> Option<SplitOutcome> {
    if input.people.len() != 2 || input.split_fraction <= 0.0 {
        return None;
    }

    let rrif_pension = |person: usize| {
        let ctx = &input.people[person];
        if ctx.age >= income::PENSION_CREDIT_AGE {
            ctx.rrif_mandatory + evaluation.draws[person].rrif
        } else {
            0.0
        }
    };

    let outcome = trial_split(
        input.params,
        [evaluation.inputs[0], evaluation.inputs[1]],
        [evaluation.assessments[0], evaluation.assessments[1]],
        [rrif_pension(0), rrif_pension(1)],
        input.split_fraction,
    )?;

    evaluation.inputs = outcome.inputs.to_vec();
    evaluation.assessments = outcome.assessments.to_vec();
    evaluation.cash += outcome.saving;
    Some(outcome)
}

fn finish(
    input: &ResolverInput,
    evaluation: Evaluation,
    iterations: u32,
    exhausted: bool,
    split: Option<SplitOutcome>,
    convergence: Option<ConvergenceWarning>,
) -> Resolution {
    let cash = evaluation.cash;
    let gap = input.target - cash;
    let funded = gap <= input.tolerance;
    let surplus = (cash - input.target).max(0.0);

    let room: Vec<f64> = input.people.iter().map(|p| p.tfsa_room).collect();
    let contributions = allocate_surplus(surplus, &room);

    let people = (0..input.people.len())
        .map(|person| {
            let (transferred, received) = match split {
                Some(s) if s.from == person => (s.amount, 0.0),
                Some(s) if s.to == person => (0.0, s.amount),
                _ => (0.0, 0.0),
            };
            PersonResolution {
                draws: evaluation.draws[person],
                sale: evaluation.sales[person],
                dividend: evaluation.dividends[person],
                income: evaluation.inputs[person].income,
                tax_input: evaluation.inputs[person],
                assessment: evaluation.assessments[person],
                split_transferred: transferred,
                split_received: received,
                contribution: contributions[person],
            }
        })
        .collect();

    Resolution {
        people,
        after_tax_cash: cash,
        target: input.target,
        gap,
        funded,
        underfunded: if funded { 0.0 } else { gap },
        surplus,
        spending_met: cash.min(input.target).max(0.0),
        iterations,
        exhausted,
        split,
        convergence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{ontario_params_2025, Bracket};
    use crate::household::{Bucket, DividendClass, YieldMix};
    use crate::withdrawal::StrategyKind;
    use approx::assert_abs_diff_eq;

    fn context(age: u32, base: IncomeCategories, oas: f64) -> PersonContext {
        PersonContext {
            age,
            base_income: base,
            oas_gross: oas,
            clawback_income: None,
            rrif_mandatory: 0.0,
            tfsa_balance: 0.0,
            tfsa_room: 0.0,
            rrif_available: 0.0,
            non_registered: BucketedAccount::default(),
            corporate: CorporateAccount::default(),
        }
    }

    fn input<'a>(params: &'a JurisdictionParams, people: Vec<PersonContext>, cash_in: f64, target: f64) -> ResolverInput<'a> {
        ResolverInput {
            params,
            people,
            cash_in,
            target,
            tolerance: 1_000.0,
            strategy: Strategy::default(),
            split_fraction: 0.0,
            max_iterations: MAX_ITERATIONS,
        }
    }

    #[test]
    fn test_mandatory_rrif_minimum_at_71() {
        let params = ontario_params_2025();
        let draw = mandatory_draw(&params, &Strategy::default(), 71, 65, 500_000.0, None);
        assert_abs_diff_eq!(draw.minimum, 26_400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(draw.planned, 26_400.0, epsilon = 1e-6);

        let early = mandatory_draw(&params, &Strategy::default(), 65, 65, 100_000.0, Some(EarlyRrif::Percent(0.04)));
        assert_eq!(early.minimum, 0.0);
        assert_abs_diff_eq!(early.planned, 4_000.0, epsilon = 1e-9);

        let frontload = mandatory_draw(&params, &Strategy::rrif_frontload(), 63, 65, 200_000.0, None);
        assert_abs_diff_eq!(frontload.planned, 20_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tfsa_covers_gap_in_one_iteration() {
        let params = ontario_params_2025();
        let base = IncomeCategories {
            ordinary: 12_000.0 + 8_000.0,
            pension_eligible: 3_500.0,
            ..Default::default()
        };
        let mut person = context(70, base, 8_000.0);
        person.tfsa_balance = 200_000.0;

        let input = input(&params, vec![person], 23_500.0, 50_000.0);
        let result = resolve(&input);

        assert_eq!(result.iterations, 1);
        assert!(result.funded);
        assert_abs_diff_eq!(result.people[0].draws.tfsa, 26_500.0, epsilon = 1e-9);
        assert_eq!(result.people[0].draws.rrif, 0.0);
        assert!(result.total_tax() < 1_000.0);
        assert!(result.convergence.is_none());
    }

    #[test]
    fn test_guarded_strategy_fills_bracket_then_tfsa() {
        let mut params = ontario_params_2025();
        params.federal.brackets = vec![Bracket::new(53_359.0, 0.15), Bracket::top(0.205)];
        params.provincial.brackets = vec![Bracket::new(100_000.0, 0.05), Bracket::top(0.1)];
        params.federal.basic_personal_amount = 60_000.0;
        params.provincial.basic_personal_amount = 60_000.0;
        params.oas.clawback_threshold = 1.0e9;

        let base = IncomeCategories {
            ordinary: 52_000.0,
            ..Default::default()
        };
        let mut person = context(72, base, 0.0);
        person.tfsa_balance = 100_000.0;
        person.rrif_available = 300_000.0;

        let mut input = input(&params, vec![person], 52_000.0, 62_000.0);
        input.strategy = Strategy::guarded(StrategyKind::TfsaFirst, IncomeThreshold::NextBracket);
        let result = resolve(&input);

        let draws = result.people[0].draws;
        assert_abs_diff_eq!(draws.rrif, 1_359.0, epsilon = 1e-3);
        assert_abs_diff_eq!(draws.tfsa, 8_641.0, epsilon = 1e-3);
        assert_eq!(result.total_tax(), 0.0);
        assert!(result.funded);
    }

    #[test]
    fn test_taxable_draws_converge_within_tolerance() {
        let params = ontario_params_2025();
        let base = IncomeCategories {
            ordinary: 20_000.0,
            ..Default::default()
        };
        let mut person = context(72, base, 8_000.0);
        person.rrif_available = 1_000_000.0;

        let mut input = input(&params, vec![person], 20_000.0, 90_000.0);
        input.tolerance = 10.0;
        input.strategy = Strategy::new(StrategyKind::Balanced);
        let result = resolve(&input);

        assert!(result.funded);
        assert!(result.gap.abs() <= 10.0 || result.surplus > 0.0);
        assert!(result.people[0].draws.rrif > 70_000.0);
        assert!(result.iterations > 1 && result.iterations <= MAX_ITERATIONS);
    }

    #[test]
    fn test_exhausted_accounts_are_underfunded() {
        let params = ontario_params_2025();
        let mut person = context(70, IncomeCategories::default(), 0.0);
        person.tfsa_balance = 5_000.0;

        let result = resolve(&input(&params, vec![person], 0.0, 40_000.0));
        assert!(result.exhausted);
        assert!(!result.funded);
        assert_abs_diff_eq!(result.underfunded, 35_000.0, epsilon = 1e-6);
        assert!(result.convergence.is_none());
    }

    #[test]
    fn test_surplus_goes_to_tfsa_then_non_registered() {
        let params = ontario_params_2025();
        let base = IncomeCategories {
            tax_free: 60_000.0,
            ..Default::default()
        };
        let mut person = context(70, base, 0.0);
        person.tfsa_room = 7_000.0;

        let result = resolve(&input(&params, vec![person], 60_000.0, 50_000.0));
        assert_abs_diff_eq!(result.surplus, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.people[0].contribution.tfsa, 7_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.people[0].contribution.non_registered, 3_000.0, epsilon = 1e-9);
        assert_eq!(result.spending_met, 50_000.0);
    }

    #[test]
    fn test_non_registered_sale_realises_gain() {
        let params = ontario_params_2025();
        let mut person = context(70, IncomeCategories::default(), 0.0);
        person.non_registered.invested = Bucket::new(100_000.0, 50_000.0, YieldMix::default());

        let mut input = input(&params, vec![person], 0.0, 20_000.0);
        input.strategy = Strategy::new(StrategyKind::Balanced);
        let result = resolve(&input);

        let p = &result.people[0];
        assert_abs_diff_eq!(p.sale.realized_gain, p.draws.non_registered * 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(p.income.capital_gains, p.sale.realized_gain, epsilon = 1e-9);
    }

    #[test]
    fn test_corporate_draw_pays_capital_dividend_first() {
        let params = ontario_params_2025();
        let mut person = context(70, IncomeCategories::default(), 0.0);
        person.corporate = CorporateAccount {
            buckets: BucketedAccount {
                cash: Bucket::new(200_000.0, 200_000.0, YieldMix::default()),
                ..Default::default()
            },
            rdtoh: 10_000.0,
            cda: 5_000.0,
            ..Default::default()
        };

        let mut input = input(&params, vec![person], 0.0, 30_000.0);
        input.tolerance = 10.0;
        input.strategy = Strategy::new(StrategyKind::CorporateOptimized);
        let result = resolve(&input);

        assert!(result.funded);
        assert!(result.gap.abs() <= 10.0);

        let p = &result.people[0];
        assert!(p.draws.corporate > 5_000.0);
        assert_eq!(p.draws.tfsa + p.draws.rrif + p.draws.non_registered, 0.0);

        // CDA first, the rest is an eligible dividend
        let dividend = p.dividend;
        assert_abs_diff_eq!(dividend.capital_dividend, 5_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dividend.taxable_dividend, p.draws.corporate - 5_000.0, epsilon = 1e-9);
        assert_eq!(dividend.class, DividendClass::Eligible);
        assert_abs_diff_eq!(p.income.tax_free, 5_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.income.eligible_dividends, dividend.taxable_dividend, epsilon = 1e-9);
        assert_eq!(p.income.non_eligible_dividends, 0.0);
        assert_eq!(p.income.capital_gains, 0.0);

        let refund = (0.3833 * dividend.taxable_dividend).min(10_000.0);
        assert_abs_diff_eq!(dividend.rdtoh_refund, refund, epsilon = 1e-6);

        assert_abs_diff_eq!(
            result.after_tax_cash,
            p.draws.corporate - result.total_tax() - result.total_clawback(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_non_eligible_corporate_dividend_is_taxed() {
        let params = ontario_params_2025();
        let mut person = context(70, IncomeCategories::default(), 0.0);
        person.corporate = CorporateAccount {
            buckets: BucketedAccount {
                cash: Bucket::new(500_000.0, 500_000.0, YieldMix::default()),
                ..Default::default()
            },
            rdtoh: 1_000.0,
            dividend_class: DividendClass::NonEligible,
            ..Default::default()
        };

        let mut input = input(&params, vec![person], 0.0, 90_000.0);
        input.tolerance = 10.0;
        input.strategy = Strategy::new(StrategyKind::CorporateOptimized);
        let result = resolve(&input);

        let p = &result.people[0];
        assert!(result.funded);
        assert_eq!(p.dividend.capital_dividend, 0.0);
        assert_abs_diff_eq!(p.income.non_eligible_dividends, p.draws.corporate, epsilon = 1e-9);
        // Refund is capped by the RDTOH balance
        assert_abs_diff_eq!(p.dividend.rdtoh_refund, 1_000.0, epsilon = 1e-9);
        assert!(result.total_tax() > 0.0);
        assert!(p.draws.corporate > 90_000.0);
    }

    #[test]
    fn test_couple_split_reduces_tax() {
        let params = ontario_params_2025();
        let high = IncomeCategories {
            pension_eligible: 110_000.0,
            ..Default::default()
        };
        let mut p1 = context(72, high, 0.0);
        p1.rrif_mandatory = 110_000.0;
        let p2 = context(72, IncomeCategories::default(), 0.0);

        let mut input = input(&params, vec![p1, p2], 110_000.0, 60_000.0);
        input.split_fraction = 0.5;
        let result = resolve(&input);

        let split = result.split.expect("split accepted");
        assert_eq!((split.from, split.to), (0, 1));
        assert_abs_diff_eq!(result.people[0].split_transferred, 55_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.people[1].split_received, 55_000.0, epsilon = 1e-9);
        assert!(result.surplus > 0.0);
    }
}
