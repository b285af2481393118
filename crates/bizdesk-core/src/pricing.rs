use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Amounts derived from one order line. Nothing is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
}

impl LineAmounts {
    pub fn compute(
        quantity: Decimal,
        unit_price: Decimal,
        discount_percent: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        let subtotal = quantity * unit_price;
        let discount_amount = subtotal * discount_percent / HUNDRED;
        let taxable_amount = subtotal - discount_amount;
        let tax_amount = taxable_amount * tax_rate / HUNDRED;

        Self {
            subtotal,
            discount_amount,
            taxable_amount,
            tax_amount,
            line_total: taxable_amount + tax_amount,
        }
    }
}

/// Anything priced like an order line.
pub trait PricedLine {
    fn quantity(&self) -> Decimal;
    fn unit_price(&self) -> Decimal;
    fn discount_percent(&self) -> Decimal;
    fn tax_rate(&self) -> Decimal;

    fn amounts(&self) -> LineAmounts {
        LineAmounts::compute(
            self.quantity(),
            self.unit_price(),
            self.discount_percent(),
            self.tax_rate(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

impl OrderTotals {
    pub fn from_lines<'a, L, I>(lines: I) -> Self
    where
        L: PricedLine + 'a,
        I: IntoIterator<Item = &'a L>,
    {
        lines
            .into_iter()
            .map(PricedLine::amounts)
            .fold(Self::default(), |totals, line| Self {
                subtotal: totals.subtotal + line.subtotal,
                discount_amount: totals.discount_amount + line.discount_amount,
                tax_amount: totals.tax_amount + line.tax_amount,
                total_amount: totals.total_amount + line.line_total,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Line {
        quantity: Decimal,
        unit_price: Decimal,
        discount_percent: Decimal,
        tax_rate: Decimal,
    }

    impl PricedLine for Line {
        fn quantity(&self) -> Decimal {
            self.quantity
        }
        fn unit_price(&self) -> Decimal {
            self.unit_price
        }
        fn discount_percent(&self) -> Decimal {
            self.discount_percent
        }
        fn tax_rate(&self) -> Decimal {
            self.tax_rate
        }
    }

    fn line(quantity: i64, unit_price: Decimal, discount: i64, tax: i64) -> Line {
        Line {
            quantity: Decimal::from(quantity),
            unit_price,
            discount_percent: Decimal::from(discount),
            tax_rate: Decimal::from(tax),
        }
    }

    #[test]
    fn laptop_line_example() {
        let amounts = line(3, Decimal::from(650), 5, 21).amounts();
        assert_eq!(amounts.subtotal, Decimal::from(1950));
        assert_eq!(amounts.taxable_amount, Decimal::new(18525, 1));
        assert_eq!(amounts.tax_amount, Decimal::new(389025, 3));
        assert_eq!(amounts.line_total, Decimal::new(2241525, 3));
    }

    #[test]
    fn order_totals_sum_line_contributions() {
        let lines = vec![
            line(3, Decimal::from(650), 5, 21),
            line(1, Decimal::from(180), 0, 21),
        ];
        let totals = OrderTotals::from_lines(&lines);
        assert_eq!(totals.subtotal, Decimal::from(2130));
        assert_eq!(totals.discount_amount, Decimal::new(975, 1));
        assert_eq!(totals.tax_amount, Decimal::new(426825, 3));
        assert_eq!(totals.total_amount, Decimal::new(2459325, 3));
    }

    #[test]
    fn empty_order_is_zero() {
        let lines: Vec<Line> = Vec::new();
        assert_eq!(OrderTotals::from_lines(&lines), OrderTotals::default());
    }

    proptest! {
        #[test]
        fn line_total_matches_closed_form(
            quantity in 0u32..10_000,
            price_cents in 0u64..10_000_000,
            discount in 0u32..=100,
            tax in 0u32..=100,
        ) {
            let quantity = Decimal::from(quantity);
            let unit_price = Decimal::new(price_cents as i64, 2);
            let discount = Decimal::from(discount);
            let tax = Decimal::from(tax);

            let amounts = LineAmounts::compute(quantity, unit_price, discount, tax);
            let expected = quantity
                * unit_price
                * (Decimal::ONE - discount / HUNDRED)
                * (Decimal::ONE + tax / HUNDRED);

            prop_assert!(amounts.line_total >= Decimal::ZERO);
            prop_assert!((amounts.line_total - expected).abs() <= Decimal::new(1, 12));
        }
    }
}
