// src/services/quote.rs

use crate::{
    models::{AppSettings, Event, EventService, QuoteTemplate},
    services::{financials::EventFinancials, templates::escape_html},
};
use rust_decimal::Decimal;

fn money(settings: &AppSettings, amount: Decimal) -> String {
    format!("{}{:.2}", settings.currency_symbol, amount)
}

fn line_item_rows(settings: &AppSettings, event: &Event, items: &[EventService]) -> String {
    if event.all_inclusive {
        let price = event.all_inclusive_price.unwrap_or_default();
        return format!(
            r#"      <tr><td>All-inclusive celebration package</td><td>1</td><td>{}</td></tr>
"#,
            money(settings, price)
        );
    }

    let mut sorted: Vec<&EventService> = items.iter().collect();
    sorted.sort_by_key(|i| i.position);

    let mut rows = String::new();
    for item in &sorted {
        let is_child = item.parent_item_id.is_some() && !item.is_package_main_item;
        if is_child {
            rows.push_str(&format!(
                r#"      <tr class="included"><td>&nbsp;&nbsp;— {}</td><td></td><td>included</td></tr>
"#,
                escape_html(&item.name)
            ));
        } else {
            let line_total = item.custom_price * Decimal::from(item.quantity);
            rows.push_str(&format!(
                r#"      <tr><td>{}</td><td>{}</td><td>{}</td></tr>
"#,
                escape_html(&item.name),
                item.quantity,
                money(settings, line_total)
            ));
        }
    }
    rows
}

/// Render a complete HTML quote document for an event. The template supplies
/// title, intro and terms; the line-item table and financial breakdown come
/// from the event itself.
pub fn render_quote_html(
    settings: &AppSettings,
    template: Option<&QuoteTemplate>,
    event: &Event,
    items: &[EventService],
    financials: &EventFinancials,
) -> String {
    let title = template.map(|t| t.title.as_str()).unwrap_or("Price Quote");
    let intro = template.map(|t| t.intro_html.as_str()).unwrap_or("");
    let terms = template.map(|t| t.terms_html.as_str()).unwrap_or("");

    let discount_row = if financials.discount_total > Decimal::ZERO {
        format!(
            r#"      <tr class="discount"><td>Discount</td><td>- {}</td></tr>
"#,
            money(settings, financials.discount_total)
        )
    } else {
        String::new()
    };

    let footer = settings
        .quote_footer
        .as_deref()
        .map(escape_html)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>{title} — {client}</title>
  <style>
    body {{ font-family: Arial, sans-serif; background: #f4f4f4; color: #333; }}
    .container {{ max-width: 700px; margin: 30px auto; background: #fff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
    .header {{ background: #7c3aed; color: #fff; padding: 24px 32px; }}
    .header h1 {{ margin: 0; font-size: 22px; }}
    .header p {{ margin: 4px 0 0; opacity: 0.85; }}
    .body {{ padding: 24px 32px; }}
    h2 {{ color: #7c3aed; border-bottom: 2px solid #e5e7eb; padding-bottom: 6px; }}
    table {{ width: 100%; border-collapse: collapse; margin-bottom: 16px; }}
    td {{ padding: 8px 4px; border-bottom: 1px solid #f1f1f1; }}
    td:last-child {{ text-align: right; font-weight: 600; }}
    .included td {{ color: #6b7280; font-weight: 400; }}
    .discount td {{ color: #dc2626; }}
    .total-row td {{ font-size: 16px; color: #7c3aed; border-top: 2px solid #7c3aed; border-bottom: none; }}
    .footer {{ background: #f9fafb; padding: 16px 32px; font-size: 12px; color: #6b7280; text-align: center; }}
  </style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>{business}</h1>
    <p>{title} · {event_title}</p>
  </div>
  <div class="body">
    <p>Prepared for <strong>{client}</strong> · {date}{location}</p>
    {intro}

    <h2>Services</h2>
    <table>
      <tr><td><strong>Item</strong></td><td><strong>Qty</strong></td><td><strong>Price</strong></td></tr>
{item_rows}    </table>

    <h2>Summary</h2>
    <table>
      <tr><td>Subtotal (before VAT)</td><td>{subtotal}</td></tr>
      <tr><td>VAT ({vat_rate}%)</td><td>{vat_amount}</td></tr>
{discount_row}      <tr class="total-row"><td>Total</td><td>{final_total}</td></tr>
      <tr><td>Paid to date</td><td>{total_paid}</td></tr>
      <tr class="total-row"><td>Balance due</td><td>{balance}</td></tr>
    </table>

    {terms}
  </div>
  <div class="footer">
    <p>{footer}</p>
  </div>
</div>
</body>
</html>"#,
        title = escape_html(title),
        business = escape_html(&settings.business_name),
        event_title = escape_html(&event.title),
        client = escape_html(&event.client_name),
        date = event.event_date,
        location = event
            .location
            .as_deref()
            .map(|l| format!(" · {}", escape_html(l)))
            .unwrap_or_default(),
        intro = intro,
        item_rows = line_item_rows(settings, event, items),
        subtotal = money(settings, financials.subtotal),
        vat_rate = settings.vat_rate,
        vat_amount = money(settings, financials.vat_amount),
        discount_row = discount_row,
        final_total = money(settings, financials.final_total),
        total_paid = money(settings, financials.total_paid),
        balance = money(settings, financials.balance),
        terms = terms,
        footer = footer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventStatus;
    use crate::services::financials::calculate_event_financials;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn settings() -> AppSettings {
        AppSettings::fallback()
    }

    fn event() -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Levi <bar mitzvah>".to_string(),
            client_user_id: None,
            client_name: "Levi family".to_string(),
            client_phone: None,
            event_date: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            event_time: Some("19:00".to_string()),
            location: Some("Lakeside hall".to_string()),
            guest_count: Some(120),
            status: EventStatus::Quote,
            all_inclusive: false,
            all_inclusive_price: None,
            all_inclusive_includes_vat: true,
            discount_amount: Some(dec!(50)),
            discount_before_vat: false,
            total_override: None,
            notes: None,
            google_event_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(name: &str, price: Decimal) -> EventService {
        EventService {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            service_id: None,
            name: name.to_string(),
            custom_price: price,
            quantity: 1,
            includes_vat: false,
            position: 0,
            package_id: None,
            parent_item_id: None,
            is_package_main_item: false,
            supplier_ids: vec![],
            supplier_statuses: sqlx::types::Json(Default::default()),
            supplier_notes: sqlx::types::Json(Default::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn quote_shows_breakdown_and_escapes_user_text() {
        let ev = event();
        let items = vec![item("DJ & lights", dec!(1000))];
        let fin = calculate_event_financials(&ev, &items, &[], dec!(0.18));
        let html = render_quote_html(&settings(), None, &ev, &items, &fin);

        assert!(html.contains("DJ &amp; lights"));
        assert!(html.contains("Levi &lt;bar mitzvah&gt;"));
        assert!(html.contains("$1000.00"));
        assert!(html.contains("$1130.00")); // 1180 - 50 discount
        assert!(html.contains("- $50.00"));
    }

    #[test]
    fn package_children_render_as_included_rows() {
        let ev = event();
        let mut main = item("Gold package", dec!(5000));
        main.is_package_main_item = true;
        let mut child = item("Photographer", dec!(800));
        child.parent_item_id = Some(main.id);
        child.position = 1;

        let fin = calculate_event_financials(&ev, &[main.clone(), child.clone()], &[], dec!(0.18));
        let html = render_quote_html(&settings(), None, &ev, &[main, child], &fin);

        assert!(html.contains("— Photographer"));
        assert!(html.contains("included"));
        assert!(!html.contains("$800.00"));
    }

    #[test]
    fn all_inclusive_quote_has_single_row() {
        let mut ev = event();
        ev.all_inclusive = true;
        ev.all_inclusive_price = Some(dec!(11800));
        ev.discount_amount = None;

        let items = vec![item("Catering", dec!(123))];
        let fin = calculate_event_financials(&ev, &items, &[], dec!(0.18));
        let html = render_quote_html(&settings(), None, &ev, &items, &fin);

        assert!(html.contains("All-inclusive celebration package"));
        assert!(!html.contains("Catering"));
    }
}
