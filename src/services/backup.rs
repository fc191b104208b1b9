// src/services/backup.rs

use crate::{
    errors::AppResult,
    models::{
        AppSettings, BackupCounts, Event, EventService, NotificationTemplate, Package, Payment,
        QuoteTemplate, Service, Supplier,
    },
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One self-contained snapshot of every business table. User accounts and
/// credentials are deliberately absent: a restore must never clobber logins.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub suppliers: Vec<Supplier>,
    pub services: Vec<Service>,
    pub packages: Vec<Package>,
    pub events: Vec<Event>,
    pub event_services: Vec<EventService>,
    pub payments: Vec<Payment>,
    pub quote_templates: Vec<QuoteTemplate>,
    pub notification_templates: Vec<NotificationTemplate>,
    pub settings: Option<AppSettings>,
}

impl BackupSnapshot {
    pub fn counts(&self) -> BackupCounts {
        BackupCounts {
            suppliers: self.suppliers.len(),
            services: self.services.len(),
            packages: self.packages.len(),
            events: self.events.len(),
            event_services: self.event_services.len(),
            payments: self.payments.len(),
            quote_templates: self.quote_templates.len(),
            notification_templates: self.notification_templates.len(),
        }
    }
}

pub async fn capture_snapshot(db: &PgPool) -> AppResult<BackupSnapshot> {
    let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY created_at")
        .fetch_all(db)
        .await?;
    let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY position")
        .fetch_all(db)
        .await?;
    let packages = sqlx::query_as::<_, Package>("SELECT * FROM packages ORDER BY position")
        .fetch_all(db)
        .await?;
    let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY created_at")
        .fetch_all(db)
        .await?;
    let event_services =
        sqlx::query_as::<_, EventService>("SELECT * FROM event_services ORDER BY created_at")
            .fetch_all(db)
            .await?;
    let payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY created_at")
        .fetch_all(db)
        .await?;
    let quote_templates =
        sqlx::query_as::<_, QuoteTemplate>("SELECT * FROM quote_templates ORDER BY created_at")
            .fetch_all(db)
            .await?;
    let notification_templates = sqlx::query_as::<_, NotificationTemplate>(
        "SELECT * FROM notification_templates ORDER BY created_at",
    )
    .fetch_all(db)
    .await?;
    let settings = sqlx::query_as::<_, AppSettings>("SELECT * FROM app_settings WHERE id = 1")
        .fetch_optional(db)
        .await?;

    Ok(BackupSnapshot {
        suppliers,
        services,
        packages,
        events,
        event_services,
        payments,
        quote_templates,
        notification_templates,
        settings,
    })
}

/// Wipe the business tables and reload them from the snapshot, all inside one
/// transaction: a failed restore leaves the database exactly as it was.
pub async fn restore_snapshot(db: &PgPool, snapshot: &BackupSnapshot) -> AppResult<()> {
    let mut tx = db.begin().await?;

    // Supplier links on user accounts are nulled by the cascade below; remember
    // them so supplier logins survive the restore.
    let user_links: Vec<(Uuid, Uuid)> = sqlx::query_as(
        "SELECT id, supplier_id FROM users WHERE supplier_id IS NOT NULL",
    )
    .fetch_all(&mut *tx)
    .await?;

    for table in [
        "payments",
        "event_services",
        "events",
        "packages",
        "services",
        "suppliers",
        "quote_templates",
        "notification_templates",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }

    for supplier in &snapshot.suppliers {
        insert_supplier(&mut tx, supplier).await?;
    }
    for service in &snapshot.services {
        insert_service(&mut tx, service).await?;
    }
    for package in &snapshot.packages {
        insert_package(&mut tx, package).await?;
    }
    for event in &snapshot.events {
        insert_event(&mut tx, event).await?;
    }
    // Package main items before their children: children carry a
    // self-referential foreign key to the main item.
    for item in snapshot
        .event_services
        .iter()
        .filter(|i| i.parent_item_id.is_none())
    {
        insert_event_service(&mut tx, item).await?;
    }
    for item in snapshot
        .event_services
        .iter()
        .filter(|i| i.parent_item_id.is_some())
    {
        insert_event_service(&mut tx, item).await?;
    }
    for payment in &snapshot.payments {
        insert_payment(&mut tx, payment).await?;
    }
    for template in &snapshot.quote_templates {
        insert_quote_template(&mut tx, template).await?;
    }
    for template in &snapshot.notification_templates {
        insert_notification_template(&mut tx, template).await?;
    }

    if let Some(settings) = &snapshot.settings {
        // The Google refresh token never enters a snapshot; leave the stored
        // one untouched.
        sqlx::query(
            "UPDATE app_settings
             SET business_name = $1, vat_rate = $2, currency_symbol = $3,
                 quote_footer = $4, google_calendar_id = $5, updated_at = NOW()
             WHERE id = 1",
        )
        .bind(&settings.business_name)
        .bind(settings.vat_rate)
        .bind(&settings.currency_symbol)
        .bind(&settings.quote_footer)
        .bind(&settings.google_calendar_id)
        .execute(&mut *tx)
        .await?;
    }

    let restored_supplier_ids: Vec<Uuid> = snapshot.suppliers.iter().map(|s| s.id).collect();
    for (user_id, supplier_id) in user_links {
        if restored_supplier_ids.contains(&supplier_id) {
            sqlx::query("UPDATE users SET supplier_id = $1 WHERE id = $2")
                .bind(supplier_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_supplier(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &Supplier,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO suppliers (id, name, contact_name, email, phone, category, notes, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.contact_name)
    .bind(&row.email)
    .bind(&row.phone)
    .bind(&row.category)
    .bind(&row.notes)
    .bind(row.is_active)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_service(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &Service,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO services (id, name, description, category, default_price, includes_vat, position, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.description)
    .bind(&row.category)
    .bind(row.default_price)
    .bind(row.includes_vat)
    .bind(row.position)
    .bind(row.is_active)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_package(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &Package,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO packages (id, name, description, price, includes_vat, service_ids, position, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.description)
    .bind(row.price)
    .bind(row.includes_vat)
    .bind(&row.service_ids)
    .bind(row.position)
    .bind(row.is_active)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_event(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &Event,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO events (id, title, client_user_id, client_name, client_phone, event_date,
            event_time, location, guest_count, status, all_inclusive, all_inclusive_price,
            all_inclusive_includes_vat, discount_amount, discount_before_vat, total_override,
            notes, google_event_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
    )
    .bind(row.id)
    .bind(&row.title)
    .bind(row.client_user_id)
    .bind(&row.client_name)
    .bind(&row.client_phone)
    .bind(row.event_date)
    .bind(&row.event_time)
    .bind(&row.location)
    .bind(row.guest_count)
    .bind(row.status)
    .bind(row.all_inclusive)
    .bind(row.all_inclusive_price)
    .bind(row.all_inclusive_includes_vat)
    .bind(row.discount_amount)
    .bind(row.discount_before_vat)
    .bind(row.total_override)
    .bind(&row.notes)
    .bind(&row.google_event_id)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_event_service(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &EventService,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO event_services (id, event_id, service_id, name, custom_price, quantity,
            includes_vat, position, package_id, parent_item_id, is_package_main_item,
            supplier_ids, supplier_statuses, supplier_notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(row.id)
    .bind(row.event_id)
    .bind(row.service_id)
    .bind(&row.name)
    .bind(row.custom_price)
    .bind(row.quantity)
    .bind(row.includes_vat)
    .bind(row.position)
    .bind(row.package_id)
    .bind(row.parent_item_id)
    .bind(row.is_package_main_item)
    .bind(&row.supplier_ids)
    .bind(&row.supplier_statuses)
    .bind(&row.supplier_notes)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_payment(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &Payment,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO payments (id, event_id, amount, payment_date, payment_method, note, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(row.id)
    .bind(row.event_id)
    .bind(row.amount)
    .bind(row.payment_date)
    .bind(row.payment_method)
    .bind(&row.note)
    .bind(row.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_quote_template(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &QuoteTemplate,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO quote_templates (id, name, title, intro_html, terms_html, is_default, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.title)
    .bind(&row.intro_html)
    .bind(&row.terms_html)
    .bind(row.is_default)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_notification_template(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: &NotificationTemplate,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO notification_templates (id, key, name, subject, body, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(row.id)
    .bind(&row.key)
    .bind(&row.name)
    .bind(&row.subject)
    .bind(&row.body)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventStatus, PaymentMethod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn snapshot_with_one_event() -> BackupSnapshot {
        let event = Event {
            id: Uuid::new_v4(),
            title: "Anniversary".to_string(),
            client_user_id: None,
            client_name: "Mizrahi family".to_string(),
            client_phone: None,
            event_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            event_time: None,
            location: None,
            guest_count: None,
            status: EventStatus::Confirmed,
            all_inclusive: false,
            all_inclusive_price: None,
            all_inclusive_includes_vat: true,
            discount_amount: Some(dec!(100)),
            discount_before_vat: false,
            total_override: None,
            notes: None,
            google_event_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let payment = Payment {
            id: Uuid::new_v4(),
            event_id: event.id,
            amount: dec!(500),
            payment_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            payment_method: PaymentMethod::Cash,
            note: None,
            created_at: Utc::now(),
        };

        BackupSnapshot {
            suppliers: vec![],
            services: vec![],
            packages: vec![],
            events: vec![event],
            event_services: vec![],
            payments: vec![payment],
            quote_templates: vec![],
            notification_templates: vec![],
            settings: None,
        }
    }

    #[test]
    fn counts_reflect_snapshot_contents() {
        let counts = snapshot_with_one_event().counts();
        assert_eq!(counts.events, 1);
        assert_eq!(counts.payments, 1);
        assert_eq!(counts.suppliers, 0);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = snapshot_with_one_event();
        let json = serde_json::to_value(&snapshot).unwrap();
        let back: BackupSnapshot = serde_json::from_value(json).unwrap();

        assert_eq!(back.events.len(), 1);
        assert_eq!(back.events[0].discount_amount, Some(dec!(100)));
        assert_eq!(back.payments[0].amount, dec!(500));
    }
}
