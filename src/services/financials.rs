// src/services/financials.rs

use crate::models::{Event, EventService, Payment};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

/// Derived financial snapshot of an event. Never persisted; recomputed from
/// the event record, its line items and its payments wherever it is shown.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventFinancials {
    /// Pre-VAT base (after the discount when it applies before VAT)
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_with_vat: Decimal,
    pub discount_total: Decimal,
    pub final_total: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
}

fn to_pre_vat(amount: Decimal, includes_vat: bool, vat_rate: Decimal) -> Decimal {
    if includes_vat {
        amount / (dec!(1) + vat_rate)
    } else {
        amount
    }
}

/// A line item counts toward the base unless it is a package child: the
/// bundle price lives on the package main item.
fn is_billable(item: &EventService) -> bool {
    item.parent_item_id.is_none() || item.is_package_main_item
}

/// Calculate the financial breakdown for one event.
///
/// `vat_rate` is a fraction (0.18 for 18%). Discount policy: with
/// `discount_before_vat` the discount reduces the pre-VAT base before VAT is
/// applied, otherwise it is subtracted from the VAT-inclusive total. A
/// `total_override` is the agreed VAT-inclusive final figure and replaces the
/// computed breakdown entirely; the discount is treated as folded into it.
/// Amounts are rounded to 2 decimal places once, at the end.
pub fn calculate_event_financials(
    event: &Event,
    line_items: &[EventService],
    payments: &[Payment],
    vat_rate: Decimal,
) -> EventFinancials {
    let zero = dec!(0);
    let discount = event.discount_amount.unwrap_or(zero);

    let raw_base = if event.all_inclusive {
        to_pre_vat(
            event.all_inclusive_price.unwrap_or(zero),
            event.all_inclusive_includes_vat,
            vat_rate,
        )
    } else {
        line_items
            .iter()
            .filter(|item| is_billable(item))
            .map(|item| {
                let line_total = item.custom_price * Decimal::from(item.quantity);
                to_pre_vat(line_total, item.includes_vat, vat_rate)
            })
            .sum()
    };

    let base = if event.discount_before_vat {
        (raw_base - discount).max(zero)
    } else {
        raw_base
    };

    let vat_amount = base * vat_rate;
    let total_with_vat = base + vat_amount;
    let computed_final = if event.discount_before_vat {
        total_with_vat
    } else {
        (total_with_vat - discount).max(zero)
    };

    let (subtotal, vat_amount, total_with_vat, discount_total, final_total) =
        match event.total_override {
            Some(override_total) => {
                let sub = to_pre_vat(override_total, true, vat_rate);
                (sub, override_total - sub, override_total, zero, override_total)
            }
            None => (base, vat_amount, total_with_vat, discount, computed_final),
        };

    let total_paid: Decimal = payments.iter().map(|p| p.amount).sum();
    let balance = final_total - total_paid;

    EventFinancials {
        subtotal: subtotal.round_dp(2),
        vat_amount: vat_amount.round_dp(2),
        total_with_vat: total_with_vat.round_dp(2),
        discount_total: discount_total.round_dp(2),
        final_total: final_total.round_dp(2),
        total_paid: total_paid.round_dp(2),
        balance: balance.round_dp(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventStatus, PaymentMethod};
    use chrono::{NaiveDate, Utc};
    use sqlx::types::Json;
    use std::collections::HashMap;
    use uuid::Uuid;

    const RATE: Decimal = dec!(0.18);

    fn event() -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Garden wedding".to_string(),
            client_user_id: None,
            client_name: "Cohen family".to_string(),
            client_phone: None,
            event_date: NaiveDate::from_ymd_opt(2026, 6, 20).unwrap(),
            event_time: None,
            location: None,
            guest_count: None,
            status: EventStatus::Confirmed,
            all_inclusive: false,
            all_inclusive_price: None,
            all_inclusive_includes_vat: true,
            discount_amount: None,
            discount_before_vat: false,
            total_override: None,
            notes: None,
            google_event_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(price: Decimal, quantity: i32, includes_vat: bool) -> EventService {
        EventService {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            service_id: None,
            name: "Catering".to_string(),
            custom_price: price,
            quantity,
            includes_vat,
            position: 0,
            package_id: None,
            parent_item_id: None,
            is_package_main_item: false,
            supplier_ids: vec![],
            supplier_statuses: Json(HashMap::new()),
            supplier_notes: Json(HashMap::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(amount: Decimal) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            amount,
            payment_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            payment_method: PaymentMethod::BankTransfer,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn plain_line_items_without_discount() {
        let items = vec![item(dec!(100), 2, false)];
        let fin = calculate_event_financials(&event(), &items, &[], RATE);

        assert_eq!(fin.subtotal, dec!(200));
        assert_eq!(fin.vat_amount, dec!(36));
        assert_eq!(fin.total_with_vat, dec!(236));
        assert_eq!(fin.final_total, dec!(236));
        assert_eq!(fin.balance, dec!(236));
    }

    #[test]
    fn discount_after_vat_is_flat_subtraction() {
        let mut ev = event();
        ev.discount_amount = Some(dec!(20));
        ev.discount_before_vat = false;

        let items = vec![item(dec!(100), 2, false)];
        let fin = calculate_event_financials(&ev, &items, &[], RATE);

        assert_eq!(fin.total_with_vat, dec!(236));
        assert_eq!(fin.final_total, dec!(216));
    }

    #[test]
    fn discount_before_vat_reduces_the_base() {
        let mut ev = event();
        ev.discount_amount = Some(dec!(20));
        ev.discount_before_vat = true;

        let items = vec![item(dec!(100), 2, false)];
        let fin = calculate_event_financials(&ev, &items, &[], RATE);

        assert_eq!(fin.subtotal, dec!(180));
        assert_eq!(fin.vat_amount, dec!(32.40));
        assert_eq!(fin.final_total, dec!(212.40));
    }

    #[test]
    fn vat_inclusive_line_items_are_normalized_individually() {
        let items = vec![item(dec!(118), 1, true), item(dec!(100), 1, false)];
        let fin = calculate_event_financials(&event(), &items, &[], RATE);

        assert_eq!(fin.subtotal, dec!(200));
        assert_eq!(fin.total_with_vat, dec!(236));
    }

    #[test]
    fn all_inclusive_price_with_vat_included() {
        let mut ev = event();
        ev.all_inclusive = true;
        ev.all_inclusive_price = Some(dec!(1180));
        ev.all_inclusive_includes_vat = true;

        // Line items must be ignored entirely on the all-inclusive path
        let items = vec![item(dec!(9999), 3, false)];
        let fin = calculate_event_financials(&ev, &items, &[], RATE);

        assert_eq!(fin.subtotal, dec!(1000));
        assert_eq!(fin.vat_amount, dec!(180));
        assert_eq!(fin.total_with_vat, dec!(1180));
    }

    #[test]
    fn all_inclusive_price_excluding_vat() {
        let mut ev = event();
        ev.all_inclusive = true;
        ev.all_inclusive_price = Some(dec!(1000));
        ev.all_inclusive_includes_vat = false;

        let fin = calculate_event_financials(&ev, &[], &[], RATE);

        assert_eq!(fin.subtotal, dec!(1000));
        assert_eq!(fin.final_total, dec!(1180));
    }

    #[test]
    fn package_children_are_excluded_from_the_base() {
        let mut main = item(dec!(1000), 1, false);
        main.is_package_main_item = true;

        let mut child_a = item(dec!(400), 1, false);
        child_a.parent_item_id = Some(main.id);
        let mut child_b = item(dec!(700), 2, false);
        child_b.parent_item_id = Some(main.id);

        let fin =
            calculate_event_financials(&event(), &[main, child_a, child_b], &[], RATE);

        assert_eq!(fin.subtotal, dec!(1000));
        assert_eq!(fin.total_with_vat, dec!(1180));
    }

    #[test]
    fn total_override_wins_regardless_of_line_items() {
        let mut ev = event();
        ev.discount_amount = Some(dec!(50));
        ev.total_override = Some(dec!(5900));

        let items = vec![item(dec!(123), 7, false)];
        let fin = calculate_event_financials(&ev, &items, &[], RATE);

        assert_eq!(fin.final_total, dec!(5900));
        assert_eq!(fin.subtotal, dec!(5000));
        assert_eq!(fin.vat_amount, dec!(900));
        // Override is the negotiated figure; the discount is not re-applied
        assert_eq!(fin.discount_total, dec!(0));
    }

    #[test]
    fn balance_equals_final_minus_payment_sum_in_any_order() {
        let items = vec![item(dec!(100), 2, false)];
        let pays = vec![payment(dec!(100)), payment(dec!(36)), payment(dec!(50))];

        let fin = calculate_event_financials(&event(), &items, &pays, RATE);
        assert_eq!(fin.total_paid, dec!(186));
        assert_eq!(fin.balance, dec!(50));

        let mut reversed = pays;
        reversed.reverse();
        let fin2 = calculate_event_financials(&event(), &items, &reversed, RATE);
        assert_eq!(fin.balance, fin2.balance);
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut ev = event();
        ev.discount_amount = Some(dec!(17.50));

        let items = vec![item(dec!(99.99), 3, true), item(dec!(250), 1, false)];
        let pays = vec![payment(dec!(120.55))];

        let first = calculate_event_financials(&ev, &items, &pays, RATE);
        let second = calculate_event_financials(&ev, &items, &pays, RATE);
        assert_eq!(first, second);
    }

    #[test]
    fn discount_cannot_push_totals_negative() {
        let mut ev = event();
        ev.discount_amount = Some(dec!(1000));

        let items = vec![item(dec!(100), 1, false)];
        let fin = calculate_event_financials(&ev, &items, &[], RATE);
        assert_eq!(fin.final_total, dec!(0));

        ev.discount_before_vat = true;
        let fin = calculate_event_financials(&ev, &items, &[], RATE);
        assert_eq!(fin.subtotal, dec!(0));
        assert_eq!(fin.final_total, dec!(0));
    }
}
