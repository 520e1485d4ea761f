//! Account value types: three-bucket composites, TFSA and RRIF balances

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Allocation tolerance when sub-buckets are given as percentages
pub const ALLOCATION_TOLERANCE: f64 = 0.0001;

/// Annual yield decomposition of a bucket
///
/// Every component except `growth` is distributed in-year; `growth` is the
/// unrealised price change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldMix {
    pub interest: f64,
    pub eligible_dividend: f64,
    pub non_eligible_dividend: f64,
    /// Capital-gain distributions (realised inside the fund)
    pub capital_gain: f64,
    pub return_of_capital: f64,
    pub growth: f64,
}

impl YieldMix {
    pub fn interest_only(rate: f64) -> Self {
        Self {
            interest: rate,
            ..Default::default()
        }
    }

    pub fn distribution_rate(&self) -> f64 {
        self.interest
            + self.eligible_dividend
            + self.non_eligible_dividend
            + self.capital_gain
            + self.return_of_capital
    }

    pub fn total(&self) -> f64 {
        self.distribution_rate() + self.growth
    }

    pub(crate) fn components(&self) -> [(&'static str, f64); 6] {
        [
            ("interest", self.interest),
            ("eligible_dividend", self.eligible_dividend),
            ("non_eligible_dividend", self.non_eligible_dividend),
            ("capital_gain", self.capital_gain),
            ("return_of_capital", self.return_of_capital),
            ("growth", self.growth),
        ]
    }
}

/// In-year distributions of one or more buckets, in dollars
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    pub interest: f64,
    pub eligible_dividend: f64,
    pub non_eligible_dividend: f64,
    pub capital_gain: f64,
    pub return_of_capital: f64,
}

impl Distributions {
    pub fn total(&self) -> f64 {
        self.interest
            + self.eligible_dividend
            + self.non_eligible_dividend
            + self.capital_gain
            + self.return_of_capital
    }

    /// Distributions that add to ACB when reinvested
    pub fn taxable(&self) -> f64 {
        self.total() - self.return_of_capital
    }

    fn add(&mut self, other: &Distributions) {
        self.interest += other.interest;
        self.eligible_dividend += other.eligible_dividend;
        self.non_eligible_dividend += other.non_eligible_dividend;
        self.capital_gain += other.capital_gain;
        self.return_of_capital += other.return_of_capital;
    }
}

/// One sub-bucket: market value, adjusted cost base and yields
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub market_value: f64,
    pub acb: f64,
    #[serde(default)]
    pub yields: YieldMix,
}

impl Bucket {
    pub fn new(market_value: f64, acb: f64, yields: YieldMix) -> Self {
        Self {
            market_value,
            acb,
            yields,
        }
    }

    pub fn unrealized_gain(&self) -> f64 {
        self.market_value - self.acb
    }

    /// Share of a sale that is gain: (V - A) / V, never negative
    pub fn gain_ratio(&self) -> f64 {
        if self.market_value <= 0.0 {
            0.0
        } else {
            ((self.market_value - self.acb) / self.market_value).max(0.0)
        }
    }

    /// Distributions earned on the current market value
    pub fn distributions(&self) -> Distributions {
        let mv = self.market_value.max(0.0);
        Distributions {
            interest: mv * self.yields.interest,
            eligible_dividend: mv * self.yields.eligible_dividend,
            non_eligible_dividend: mv * self.yields.non_eligible_dividend,
            capital_gain: mv * self.yields.capital_gain,
            return_of_capital: mv * self.yields.return_of_capital,
        }
    }

    /// Sell `amount` (clamped to the balance); returns the realised gain
    pub fn sell(&mut self, amount: f64) -> f64 {
        let amount = amount.clamp(0.0, self.market_value.max(0.0));
        if amount <= 0.0 {
            return 0.0;
        }
        let gain = amount * self.gain_ratio();
        self.acb *= 1.0 - amount / self.market_value;
        self.market_value -= amount;
        if self.market_value <= 1e-9 {
            self.market_value = 0.0;
            self.acb = 0.0;
        }
        gain
    }

    /// Add new money at cost
    pub fn contribute(&mut self, amount: f64) {
        if amount > 0.0 {
            self.market_value += amount;
            self.acb += amount;
        }
    }

    /// Keep ACB inside [0, market value]
    pub fn clamp_acb(&mut self) {
        self.market_value = self.market_value.max(0.0);
        self.acb = self.acb.clamp(0.0, self.market_value);
    }
}

/// Sale ordering across sub-buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaleOrder {
    /// Pro rata to market value
    #[default]
    Proportional,
    /// Highest gain ratio first
    HighestGainFirst,
}

/// Amounts sold from each bucket, in cash / GIC / invested order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sale {
    pub sold: [f64; 3],
    pub realized_gain: f64,
}

impl Sale {
    pub fn proceeds(&self) -> f64 {
        self.sold.iter().sum()
    }
}

/// Target split of a total balance across the three sub-buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub cash: f64,
    pub gic: f64,
    pub invested: f64,
}

/// Cash / GIC / invested composite used by non-registered and corporate accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketedAccount {
    pub cash: Bucket,
    pub gic: Bucket,
    pub invested: Bucket,
}

impl BucketedAccount {
    /// Split a total across buckets; allocations must sum to 1 within tolerance.
    /// Cash and GIC carry ACB at market value, the invested bucket carries the rest.
    pub fn from_allocation(
        account: &str,
        total: f64,
        acb: Option<f64>,
        allocation: Allocation,
        yields: [YieldMix; 3],
    ) -> Result<Self, ConfigError> {
        let sum = allocation.cash + allocation.gic + allocation.invested;
        if (sum - 1.0).abs() > ALLOCATION_TOLERANCE {
            return Err(ConfigError::AllocationMismatch {
                account: account.to_string(),
                total: sum,
            });
        }

        let cash = total * allocation.cash;
        let gic = total * allocation.gic;
        let invested = total * allocation.invested;
        let invested_acb = match acb {
            Some(acb) => (acb - cash - gic).clamp(0.0, invested),
            None => invested,
        };

        let [cash_yield, gic_yield, invested_yield] = yields;
        Ok(Self {
            cash: Bucket::new(cash, cash, cash_yield),
            gic: Bucket::new(gic, gic, gic_yield),
            invested: Bucket::new(invested, invested_acb, invested_yield),
        })
    }

    pub fn buckets(&self) -> [&Bucket; 3] {
        [&self.cash, &self.gic, &self.invested]
    }

    pub fn buckets_mut(&mut self) -> [&mut Bucket; 3] {
        [&mut self.cash, &mut self.gic, &mut self.invested]
    }

    pub fn total(&self) -> f64 {
        self.buckets().iter().map(|b| b.market_value).sum()
    }

    pub fn total_acb(&self) -> f64 {
        self.buckets().iter().map(|b| b.acb).sum()
    }

    pub fn unrealized_gain(&self) -> f64 {
        self.buckets()
            .iter()
            .map(|b| b.unrealized_gain().max(0.0))
            .sum()
    }

    pub fn distributions(&self) -> Distributions {
        let mut total = Distributions::default();
        for bucket in self.buckets() {
            total.add(&bucket.distributions());
        }
        total
    }

    /// Compute a sale of `amount` without changing balances
    pub fn preview_sale(&self, amount: f64, order: SaleOrder) -> Sale {
        let total = self.total();
        let amount = amount.clamp(0.0, total.max(0.0));
        let mut sale = Sale::default();
        if amount <= 0.0 || total <= 0.0 {
            return sale;
        }

        let buckets = self.buckets();
        match order {
            SaleOrder::Proportional => {
                for (i, bucket) in buckets.iter().enumerate() {
                    sale.sold[i] = amount * bucket.market_value / total;
                }
            }
            SaleOrder::HighestGainFirst => {
                let mut order = [0usize, 1, 2];
                order.sort_by(|&a, &b| buckets[b].gain_ratio().total_cmp(&buckets[a].gain_ratio()));
                let mut remaining = amount;
                for i in order {
                    let take = remaining.min(buckets[i].market_value);
                    sale.sold[i] = take;
                    remaining -= take;
                    if remaining <= 0.0 {
                        break;
                    }
                }
            }
        }

        sale.realized_gain = sale
            .sold
            .iter()
            .zip(buckets.iter())
            .map(|(sold, bucket)| sold * bucket.gain_ratio())
            .sum();
        sale
    }

    /// Execute a sale; returns the realised gain
    pub fn sell(&mut self, amount: f64, order: SaleOrder) -> Sale {
        let sale = self.preview_sale(amount, order);
        for (bucket, sold) in self.buckets_mut().into_iter().zip(sale.sold) {
            bucket.sell(sold);
        }
        sale
    }

    /// Remove money without realising gains (corporate tax settlements):
    /// cash first, then GIC, then invested, ACB reduced pro rata
    pub fn debit(&mut self, amount: f64) -> f64 {
        let mut remaining = amount.max(0.0);
        for bucket in self.buckets_mut() {
            if remaining <= 0.0 {
                break;
            }
            let take = remaining.min(bucket.market_value.max(0.0));
            if take > 0.0 {
                bucket.acb *= 1.0 - take / bucket.market_value;
                bucket.market_value -= take;
                remaining -= take;
            }
        }
        amount.max(0.0) - remaining
    }
}

/// Dividend class a corporation declares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DividendClass {
    #[default]
    Eligible,
    NonEligible,
}

fn default_rdtoh_rate() -> f64 {
    0.3067
}

fn default_refund_rate() -> f64 {
    0.3833
}

fn default_passive_tax_rate() -> f64 {
    0.5017
}

/// Privately held corporation's investment holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateAccount {
    #[serde(default)]
    pub buckets: BucketedAccount,
    /// Refundable dividend tax on hand
    #[serde(default)]
    pub rdtoh: f64,
    /// Capital dividend account, paid out tax-free before taxable dividends
    #[serde(default)]
    pub cda: f64,
    #[serde(default)]
    pub dividend_class: DividendClass,
    /// RDTOH added per dollar of taxable passive income
    #[serde(default = "default_rdtoh_rate")]
    pub rdtoh_rate: f64,
    /// Refund per dollar of taxable dividend paid
    #[serde(default = "default_refund_rate")]
    pub rdtoh_refund_rate: f64,
    /// Tax on taxable passive income inside the corporation
    #[serde(default = "default_passive_tax_rate")]
    pub passive_tax_rate: f64,
    /// Realised corporate gains are taxed in the shareholder's hands
    #[serde(default)]
    pub route_capital_gains_to_shareholder: bool,
    /// Cash/GIC interest is paid out each year as an interest-type dividend
    #[serde(default)]
    pub pay_out_interest: bool,
}

impl Default for CorporateAccount {
    fn default() -> Self {
        Self {
            buckets: BucketedAccount::default(),
            rdtoh: 0.0,
            cda: 0.0,
            dividend_class: DividendClass::default(),
            rdtoh_rate: default_rdtoh_rate(),
            rdtoh_refund_rate: default_refund_rate(),
            passive_tax_rate: default_passive_tax_rate(),
            route_capital_gains_to_shareholder: false,
            pay_out_interest: false,
        }
    }
}

/// Split of a corporate payout into its tax classes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorporateDividend {
    /// Tax-free capital dividend drawn from the CDA
    pub capital_dividend: f64,
    pub taxable_dividend: f64,
    pub class: DividendClass,
    /// Gain realised by the corporation on the sale funding the payout
    pub realized_gain: f64,
    /// RDTOH recovered by the corporation
    pub rdtoh_refund: f64,
}

impl CorporateAccount {
    pub fn total(&self) -> f64 {
        self.buckets.total()
    }

    /// Classify a payout of `amount` (clamped to the balance), CDA first
    pub fn preview_dividend(&self, amount: f64) -> CorporateDividend {
        let amount = amount.clamp(0.0, self.total().max(0.0));
        let capital_dividend = amount.min(self.cda.max(0.0));
        let taxable_dividend = amount - capital_dividend;
        CorporateDividend {
            capital_dividend,
            taxable_dividend,
            class: self.dividend_class,
            realized_gain: self
                .buckets
                .preview_sale(amount, SaleOrder::Proportional)
                .realized_gain,
            rdtoh_refund: self.rdtoh.min(self.rdtoh_refund_rate * taxable_dividend),
        }
    }
}

/// Tax-free savings account
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfsaAccount {
    pub balance: f64,
    /// Unused contribution room
    pub room: f64,
    pub yield_rate: f64,
}

/// RRSP/RRIF: one registered balance, converted at the configured age
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisteredAccount {
    pub balance: f64,
    pub yield_rate: f64,
}

/// Withdrawals from the registered account before the conversion age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "kebab-case")]
pub enum EarlyRrif {
    FixedAmount(f64),
    /// Fraction of the start-of-year balance
    Percent(f64),
}

impl EarlyRrif {
    pub fn amount(&self, start_balance: f64) -> f64 {
        let balance = start_balance.max(0.0);
        match *self {
            EarlyRrif::FixedAmount(amount) => amount.clamp(0.0, balance),
            EarlyRrif::Percent(rate) => rate.clamp(0.0, 1.0) * balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sale_gain_and_acb() {
        let mut bucket = Bucket::new(100_000.0, 60_000.0, YieldMix::default());
        let gain = bucket.sell(25_000.0);

        // gain = s (V - A) / V, ACB scaled by (1 - s/V)
        assert_abs_diff_eq!(gain, 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bucket.acb, 45_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bucket.market_value, 75_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sale_clamped_to_balance() {
        let mut bucket = Bucket::new(1_000.0, 400.0, YieldMix::default());
        let gain = bucket.sell(5_000.0);
        assert_abs_diff_eq!(gain, 600.0, epsilon = 1e-9);
        assert_eq!(bucket.market_value, 0.0);
        assert_eq!(bucket.acb, 0.0);
    }

    #[test]
    fn test_sale_above_cost_realises_no_loss() {
        let mut account = BucketedAccount {
            invested: Bucket::new(100_000.0, 200_000.0, YieldMix::default()),
            ..Default::default()
        };
        let preview = account.preview_sale(40_000.0, SaleOrder::Proportional);
        assert_eq!(preview.realized_gain, 0.0);

        let sale = account.sell(40_000.0, SaleOrder::Proportional);
        assert_eq!(sale.realized_gain, 0.0);
        assert_abs_diff_eq!(account.invested.market_value, 60_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_acb_round_trip_after_partial_sale() {
        let mut account = BucketedAccount {
            invested: Bucket::new(200_000.0, 120_000.0, YieldMix::default()),
            ..Default::default()
        };
        let f = 0.3;
        account.sell(200_000.0 * f, SaleOrder::Proportional);
        account.sell(0.0, SaleOrder::Proportional);
        assert_abs_diff_eq!(account.invested.acb, 120_000.0 * (1.0 - f), epsilon = 1e-6);
    }

    #[test]
    fn test_proportional_sale_spreads_by_value() {
        let account = BucketedAccount {
            cash: Bucket::new(10_000.0, 10_000.0, YieldMix::default()),
            gic: Bucket::new(30_000.0, 30_000.0, YieldMix::default()),
            invested: Bucket::new(60_000.0, 30_000.0, YieldMix::default()),
        };
        let sale = account.preview_sale(10_000.0, SaleOrder::Proportional);
        assert_abs_diff_eq!(sale.sold[0], 1_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sale.sold[1], 3_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sale.sold[2], 6_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sale.realized_gain, 3_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_highest_gain_first() {
        let account = BucketedAccount {
            cash: Bucket::new(10_000.0, 10_000.0, YieldMix::default()),
            gic: Bucket::new(30_000.0, 30_000.0, YieldMix::default()),
            invested: Bucket::new(60_000.0, 30_000.0, YieldMix::default()),
        };
        let sale = account.preview_sale(70_000.0, SaleOrder::HighestGainFirst);
        assert_abs_diff_eq!(sale.sold[2], 60_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sale.proceeds(), 70_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sale.realized_gain, 30_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_from_allocation() {
        let yields = [YieldMix::interest_only(0.02), YieldMix::interest_only(0.04), YieldMix::default()];
        let account = BucketedAccount::from_allocation(
            "non-registered",
            100_000.0,
            Some(80_000.0),
            Allocation { cash: 0.1, gic: 0.2, invested: 0.7 },
            yields,
        )
        .unwrap();
        assert_abs_diff_eq!(account.total(), 100_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(account.invested.acb, 50_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(account.total_acb(), 80_000.0, epsilon = 1e-9);

        let err = BucketedAccount::from_allocation(
            "non-registered",
            100_000.0,
            None,
            Allocation { cash: 0.1, gic: 0.2, invested: 0.6 },
            yields,
        );
        assert!(matches!(err, Err(ConfigError::AllocationMismatch { .. })));
    }

    #[test]
    fn test_corporate_dividend_uses_cda_first() {
        let corp = CorporateAccount {
            buckets: BucketedAccount {
                cash: Bucket::new(100_000.0, 100_000.0, YieldMix::default()),
                ..Default::default()
            },
            cda: 4_000.0,
            rdtoh: 1_000.0,
            ..Default::default()
        };
        let dividend = corp.preview_dividend(10_000.0);
        assert_abs_diff_eq!(dividend.capital_dividend, 4_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dividend.taxable_dividend, 6_000.0, epsilon = 1e-9);
        // min(RDTOH, 38.33% x 6,000)
        assert_abs_diff_eq!(dividend.rdtoh_refund, 1_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_early_rrif_amount() {
        assert_eq!(EarlyRrif::FixedAmount(20_000.0).amount(15_000.0), 15_000.0);
        assert_abs_diff_eq!(EarlyRrif::Percent(0.04).amount(100_000.0), 4_000.0, epsilon = 1e-9);
    }
}
