// src/routes/mod.rs

use crate::{
    handlers::{
        backups::{create_backup, list_backups, restore_backup},
        calendar::{check_connection, connect_calendar, get_oauth_url, sync_event},
        catalog::{
            create_package, create_service, delete_package, delete_service, list_packages,
            list_services, reorder_packages, reorder_services, update_package, update_service,
        },
        event_services::{
            assign_suppliers, create_event_service, delete_event_service, list_event_services,
            my_assignments, reorder_event_services, update_event_service, update_supplier_status,
        },
        events::{
            check_event_status, create_event, delete_event, export_events_csv, get_event,
            get_event_financials, list_events, update_event, update_expired_events,
        },
        notifications::{
            create_notification_template, delete_notification_template,
            list_notification_templates, send_notification, update_notification_template,
        },
        payments::{create_payment, delete_payment, list_payments},
        quotes::{
            create_quote_template, delete_quote_template, generate_quote, list_quote_templates,
            update_quote_template,
        },
        settings::{get_settings, update_settings},
        suppliers::{
            create_supplier, deactivate_supplier, get_supplier, list_suppliers, update_supplier,
        },
        users::{list_users, login, me, register, set_role},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth & Users ─────────────────────────────────────
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/users", get(list_users))
        .route("/users/{user_id}/role", patch(set_role))
        // ─── Suppliers ────────────────────────────────────────
        .route("/suppliers", post(create_supplier).get(list_suppliers))
        .route(
            "/suppliers/{supplier_id}",
            get(get_supplier)
                .put(update_supplier)
                .delete(deactivate_supplier),
        )
        .route("/suppliers/me/assignments", get(my_assignments))
        // ─── Catalog ──────────────────────────────────────────
        .route("/services", post(create_service).get(list_services))
        .route("/services/reorder", post(reorder_services))
        .route(
            "/services/{service_id}",
            put(update_service).delete(delete_service),
        )
        .route("/packages", post(create_package).get(list_packages))
        .route("/packages/reorder", post(reorder_packages))
        .route(
            "/packages/{package_id}",
            put(update_package).delete(delete_package),
        )
        // ─── Events ───────────────────────────────────────────
        .route("/events", post(create_event).get(list_events))
        .route("/events/export", get(export_events_csv))
        .route("/events/update-expired", post(update_expired_events))
        .route(
            "/events/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{event_id}/financials", get(get_event_financials))
        .route("/events/{event_id}/status", get(check_event_status))
        .route("/events/{event_id}/quote", get(generate_quote))
        .route("/events/{event_id}/calendar-sync", post(sync_event))
        // ─── Line items ───────────────────────────────────────
        .route(
            "/events/{event_id}/services",
            post(create_event_service).get(list_event_services),
        )
        .route(
            "/events/{event_id}/services/reorder",
            post(reorder_event_services),
        )
        .route(
            "/event-services/{item_id}",
            put(update_event_service).delete(delete_event_service),
        )
        .route("/event-services/{item_id}/suppliers", put(assign_suppliers))
        .route(
            "/event-services/{item_id}/suppliers/{supplier_id}/status",
            patch(update_supplier_status),
        )
        // ─── Payments ─────────────────────────────────────────
        .route(
            "/events/{event_id}/payments",
            post(create_payment).get(list_payments),
        )
        .route("/payments/{payment_id}", axum::routing::delete(delete_payment))
        // ─── Settings ─────────────────────────────────────────
        .route("/settings", get(get_settings).put(update_settings))
        // ─── Quote templates ──────────────────────────────────
        .route(
            "/quote-templates",
            post(create_quote_template).get(list_quote_templates),
        )
        .route(
            "/quote-templates/{template_id}",
            put(update_quote_template).delete(delete_quote_template),
        )
        // ─── Notifications ────────────────────────────────────
        .route(
            "/notification-templates",
            post(create_notification_template).get(list_notification_templates),
        )
        .route(
            "/notification-templates/{template_id}",
            put(update_notification_template).delete(delete_notification_template),
        )
        .route("/notifications/send", post(send_notification))
        // ─── Backups ──────────────────────────────────────────
        .route("/backups", post(create_backup).get(list_backups))
        .route("/backups/{backup_id}/restore", post(restore_backup))
        // ─── Calendar ─────────────────────────────────────────
        .route("/calendar/oauth-url", get(get_oauth_url))
        .route("/calendar/connect", post(connect_calendar))
        .route("/calendar/connection", get(check_connection))
}
