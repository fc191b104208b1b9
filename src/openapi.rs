// src/openapi.rs

use crate::models::{
    AppSettings, AssignSuppliersRequest, AssignmentStatus, AuthResponse, BackupCounts,
    BackupCreatedResponse, BackupInfo, CreateBackupRequest, CreateEventRequest,
    CreateEventServiceRequest, CreateNotificationTemplateRequest, CreatePackageRequest,
    CreatePaymentRequest, CreateQuoteTemplateRequest, CreateServiceRequest,
    CreateSupplierRequest, Event, EventService, EventStatus, EventStatusResponse, LoginRequest,
    NotificationTemplate, Package, Payment, PaymentMethod, QuoteTemplate, RegisterRequest,
    ReorderItem, ReorderRequest, RestoreResponse, Role, SendNotificationRequest, Service,
    SetRoleRequest, Supplier, SupplierAssignment, UpdateEventRequest, UpdateEventServiceRequest,
    UpdateExpiredResponse, UpdateNotificationTemplateRequest, UpdatePackageRequest,
    UpdateServiceRequest, UpdateSettingsRequest, UpdateSupplierRequest,
    UpdateSupplierStatusRequest, UserPublic,
};
use crate::services::financials::EventFinancials;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Planner API",
        version = "1.0.0",
        description = "Back end for an event-planning business: events, line-item services, \
            packages, suppliers, payments, quotes, notifications and backups, with a derived \
            financial snapshot (VAT normalization, discounts, balance) per event.",
        license(name = "MIT")
    ),
    paths(
        // Auth & users
        crate::handlers::users::register,
        crate::handlers::users::login,
        crate::handlers::users::me,
        crate::handlers::users::list_users,
        crate::handlers::users::set_role,
        // Suppliers
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::deactivate_supplier,
        // Catalog
        crate::handlers::catalog::create_service,
        crate::handlers::catalog::list_services,
        crate::handlers::catalog::update_service,
        crate::handlers::catalog::delete_service,
        crate::handlers::catalog::reorder_services,
        crate::handlers::catalog::create_package,
        crate::handlers::catalog::list_packages,
        crate::handlers::catalog::update_package,
        crate::handlers::catalog::delete_package,
        crate::handlers::catalog::reorder_packages,
        // Events
        crate::handlers::events::create_event,
        crate::handlers::events::list_events,
        crate::handlers::events::get_event,
        crate::handlers::events::update_event,
        crate::handlers::events::delete_event,
        crate::handlers::events::get_event_financials,
        crate::handlers::events::check_event_status,
        crate::handlers::events::update_expired_events,
        crate::handlers::events::export_events_csv,
        // Line items
        crate::handlers::event_services::list_event_services,
        crate::handlers::event_services::create_event_service,
        crate::handlers::event_services::update_event_service,
        crate::handlers::event_services::delete_event_service,
        crate::handlers::event_services::reorder_event_services,
        crate::handlers::event_services::assign_suppliers,
        crate::handlers::event_services::update_supplier_status,
        crate::handlers::event_services::my_assignments,
        // Payments
        crate::handlers::payments::list_payments,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::delete_payment,
        // Settings
        crate::handlers::settings::get_settings,
        crate::handlers::settings::update_settings,
        // Quotes
        crate::handlers::quotes::create_quote_template,
        crate::handlers::quotes::list_quote_templates,
        crate::handlers::quotes::update_quote_template,
        crate::handlers::quotes::delete_quote_template,
        crate::handlers::quotes::generate_quote,
        // Notifications
        crate::handlers::notifications::create_notification_template,
        crate::handlers::notifications::list_notification_templates,
        crate::handlers::notifications::update_notification_template,
        crate::handlers::notifications::delete_notification_template,
        crate::handlers::notifications::send_notification,
        // Backups
        crate::handlers::backups::create_backup,
        crate::handlers::backups::list_backups,
        crate::handlers::backups::restore_backup,
        // Calendar
        crate::handlers::calendar::get_oauth_url,
        crate::handlers::calendar::connect_calendar,
        crate::handlers::calendar::check_connection,
        crate::handlers::calendar::sync_event,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, UserPublic, Role, SetRoleRequest,
            Supplier, CreateSupplierRequest, UpdateSupplierRequest,
            Service, CreateServiceRequest, UpdateServiceRequest,
            Package, CreatePackageRequest, UpdatePackageRequest,
            ReorderItem, ReorderRequest,
            Event, EventStatus, CreateEventRequest, UpdateEventRequest,
            EventStatusResponse, UpdateExpiredResponse, EventFinancials,
            EventService, CreateEventServiceRequest, UpdateEventServiceRequest,
            AssignmentStatus, AssignSuppliersRequest, UpdateSupplierStatusRequest,
            SupplierAssignment,
            Payment, PaymentMethod, CreatePaymentRequest,
            AppSettings, UpdateSettingsRequest,
            QuoteTemplate, CreateQuoteTemplateRequest,
            NotificationTemplate, CreateNotificationTemplateRequest,
            UpdateNotificationTemplateRequest, SendNotificationRequest,
            BackupInfo, CreateBackupRequest, BackupCounts, BackupCreatedResponse,
            RestoreResponse,
            crate::handlers::calendar::ConnectCalendarRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Register, login, and inspect the current account"),
        (name = "Users", description = "Account administration and role assignment"),
        (name = "Suppliers", description = "Supplier directory"),
        (name = "Catalog", description = "Services and packages offered to clients"),
        (name = "Events", description = "Events, their status lifecycle and financial snapshot"),
        (name = "Line items", description = "Services attached to events, packages and supplier assignment"),
        (name = "Payments", description = "Payments recorded against events"),
        (name = "Settings", description = "Business identity and VAT configuration"),
        (name = "Quotes", description = "Quote templates and rendered quote documents"),
        (name = "Notifications", description = "Email templates and dispatch"),
        (name = "Backups", description = "Snapshot and restore of the business data"),
        (name = "Calendar", description = "Google Calendar connection and sync"),
    )
)]
pub struct ApiDoc;
