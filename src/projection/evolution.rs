//! End-of-year account evolution
//!
//! Distributions are earned on opening market values. Draws come out first,
//! the remainder grows at the bucket's unrealised growth rate, and
//! reinvested distributions are added back at cost.

use serde::{Deserialize, Serialize};

use crate::assumptions::TfsaParams;
use crate::household::{
    Bucket, BucketedAccount, CorporateAccount, Distributions, RegisteredAccount, Sale, SaleOrder,
    TfsaAccount,
};

/// Distributions per sub-bucket (cash, GIC, invested) on opening balances
pub fn opening_distributions(account: &BucketedAccount) -> [Distributions; 3] {
    let [cash, gic, invested] = account.buckets();
    [cash.distributions(), gic.distributions(), invested.distributions()]
}

pub fn total_distributions(per_bucket: &[Distributions; 3]) -> Distributions {
    Distributions {
        interest: per_bucket.iter().map(|d| d.interest).sum(),
        eligible_dividend: per_bucket.iter().map(|d| d.eligible_dividend).sum(),
        non_eligible_dividend: per_bucket.iter().map(|d| d.non_eligible_dividend).sum(),
        capital_gain: per_bucket.iter().map(|d| d.capital_gain).sum(),
        return_of_capital: per_bucket.iter().map(|d| d.return_of_capital).sum(),
    }
}

fn grow_bucket(bucket: &mut Bucket, distributions: &Distributions, reinvest: bool) {
    bucket.market_value *= 1.0 + bucket.yields.growth;
    if reinvest {
        bucket.market_value += distributions.total();
        bucket.acb += distributions.taxable();
    } else {
        bucket.acb -= distributions.return_of_capital;
    }
    bucket.clamp_acb();
}

/// Sell `draw`, grow the remainder, reinvest or pay out distributions and
/// add any surplus contribution to the invested bucket
pub fn evolve_non_registered(
    account: &mut BucketedAccount,
    opening: &[Distributions; 3],
    draw: f64,
    order: SaleOrder,
    reinvest: bool,
    contribution: f64,
) -> Sale {
    let sale = account.sell(draw, order);
    for (bucket, distributions) in account.buckets_mut().into_iter().zip(opening) {
        grow_bucket(bucket, distributions, reinvest);
    }
    account.invested.contribute(contribution);
    sale
}

/// Corporate activity for the year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateYear {
    pub capital_dividend: f64,
    pub taxable_dividend: f64,
    /// Gain realised by the corporation on sales funding the payout
    pub realized_gain: f64,
    /// Cash/GIC interest paid to the shareholder
    pub interest_paid_out: f64,
    /// Passive income taxed inside the corporation
    pub passive_income: f64,
    pub passive_tax: f64,
    pub rdtoh_added: f64,
    pub rdtoh_refund: f64,
    pub cda_added: f64,
}

/// Interest on corporate cash and GIC paid to the shareholder this year
pub fn corporate_interest_paid_out(corporate: &CorporateAccount, opening: &[Distributions; 3]) -> f64 {
    if corporate.pay_out_interest {
        opening[0].interest + opening[1].interest
    } else {
        0.0
    }
}

/// Pay the dividend, grow holdings, then settle passive tax against RDTOH
pub fn evolve_corporate(
    corporate: &mut CorporateAccount,
    opening: &[Distributions; 3],
    draw: f64,
    inclusion: f64,
) -> CorporateYear {
    let dividend = corporate.preview_dividend(draw);
    let sale = corporate.buckets.sell(draw, SaleOrder::Proportional);
    let interest_paid_out = corporate_interest_paid_out(corporate, opening);

    let pay_out_interest = corporate.pay_out_interest;
    for (i, (bucket, distributions)) in corporate.buckets.buckets_mut().into_iter().zip(opening).enumerate() {
        let mut retained = *distributions;
        // cash and GIC
        if pay_out_interest && i < 2 {
            retained.interest = 0.0;
        }
        grow_bucket(bucket, &retained, true);
    }

    let totals = total_distributions(opening);
    let unrouted_gain = if corporate.route_capital_gains_to_shareholder {
        0.0
    } else {
        sale.realized_gain
    };
    let gains = (totals.capital_gain + unrouted_gain).max(0.0);
    let passive_income = (totals.interest - interest_paid_out).max(0.0) + inclusion * gains;

    let passive_tax = corporate.passive_tax_rate * passive_income;
    let rdtoh_added = corporate.rdtoh_rate * passive_income;
    let cda_added = (1.0 - inclusion) * gains;

    corporate.cda = (corporate.cda - dividend.capital_dividend).max(0.0) + cda_added;
    corporate.rdtoh = (corporate.rdtoh - dividend.rdtoh_refund).max(0.0) + rdtoh_added;

    let net_tax = passive_tax - dividend.rdtoh_refund;
    if net_tax > 0.0 {
        corporate.buckets.debit(net_tax);
    } else {
        corporate.buckets.cash.contribute(-net_tax);
    }
    for bucket in corporate.buckets.buckets_mut() {
        bucket.clamp_acb();
    }

    CorporateYear {
        capital_dividend: dividend.capital_dividend,
        taxable_dividend: dividend.taxable_dividend,
        realized_gain: sale.realized_gain,
        interest_paid_out,
        passive_income,
        passive_tax,
        rdtoh_added,
        rdtoh_refund: dividend.rdtoh_refund,
        cda_added,
    }
}

/// Registered balance after the year's draws, grown at its own yield
pub fn evolve_registered(account: &mut RegisteredAccount, withdrawn: f64) {
    account.balance = (account.balance - withdrawn).max(0.0) * (1.0 + account.yield_rate);
}

/// TFSA balance and contribution room for next year
pub fn evolve_tfsa(account: &mut TfsaAccount, withdrawn: f64, contribution: f64, params: &TfsaParams) {
    account.balance = (account.balance - withdrawn).max(0.0) * (1.0 + account.yield_rate) + contribution;

    let restored = if params.restore_withdrawals { withdrawn } else { 0.0 };
    account.room = (account.room - contribution).max(0.0) + params.annual_room + restored;
}
