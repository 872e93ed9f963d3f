//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::BookingCore;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    bookings, health, profiles, reservations, revenue, trips, vehicles,
};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        bookings::find_available,
        reservations::list_reservations,
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::update_reservation,
        reservations::cancel_reservation,
        reservations::record_payment,
        trips::open_trip,
        trips::list_trips,
        trips::list_active_trips,
        trips::get_trip,
        trips::start_trip,
        trips::complete_trip,
        trips::cancel_trip,
        trips::report_issue,
        vehicles::list_vehicles,
        vehicles::register_vehicle,
        vehicles::get_vehicle,
        vehicles::set_vehicle_status,
        vehicles::update_vehicle_rate,
        revenue::revenue_summary,
        profiles::list_hosts,
        profiles::create_host,
        profiles::get_host,
        profiles::update_host,
        profiles::list_drivers,
        profiles::create_driver,
        profiles::get_driver,
        profiles::update_driver,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            health::ComponentHealth,
            bookings::VehicleListingDto,
            reservations::CreateReservationRequest,
            reservations::UpdateReservationRequest,
            reservations::RecordPaymentRequest,
            reservations::ReservationDto,
            reservations::StatusChangeDto,
            trips::OpenTripRequest,
            trips::StartTripRequest,
            trips::CompleteTripRequest,
            trips::ReportIssueRequest,
            trips::TripDto,
            trips::TripIssueDto,
            vehicles::RegisterVehicleRequest,
            vehicles::SetVehicleStatusRequest,
            vehicles::UpdateRateRequest,
            vehicles::VehicleDto,
            revenue::RevenueSummaryDto,
            revenue::StatusCountsDto,
            revenue::VehicleRevenueDto,
            profiles::CreateHostRequest,
            profiles::CreateDriverRequest,
            profiles::HostDto,
            profiles::DriverDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Bookings", description = "Public availability search"),
        (name = "Reservations", description = "Reservation lifecycle: create, edit, status moves, payment"),
        (name = "Trips", description = "Trip lifecycle: pickup, return, issues"),
        (name = "Vehicles", description = "Host vehicle registry and maintenance status"),
        (name = "Revenue", description = "Per-host revenue rollup"),
        (name = "Profiles", description = "Host and driver profiles"),
    ),
    info(
        title = "Fleet Booking API",
        version = "1.0.0",
        description = "Vehicle availability, reservations and trips",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the HTTP layer needs from the running service
#[derive(Clone)]
pub struct ApiContext {
    pub core: BookingCore,
    pub jwt_config: JwtConfig,
    /// `None` on the in-memory backend
    pub db: Option<DatabaseConnection>,
    /// `None` disables `/metrics`
    pub prometheus: Option<PrometheusHandle>,
}

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };
    let core = ctx.core;

    // Availability routes (public)
    let booking_routes = Router::new()
        .route("/available", get(bookings::find_available))
        .with_state(bookings::BookingAppState {
            availability: core.availability.clone(),
        });

    // Reservation routes (protected)
    let reservation_routes = Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/{id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::cancel_reservation),
        )
        .route("/{id}/payment", post(reservations::record_payment))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(reservations::ReservationAppState {
            reservations: core.reservations.clone(),
        });

    // Trip routes (protected)
    let trip_routes = Router::new()
        .route("/", get(trips::list_trips).post(trips::open_trip))
        .route("/active", get(trips::list_active_trips))
        .route("/{id}", get(trips::get_trip))
        .route("/{id}/start", post(trips::start_trip))
        .route("/{id}/complete", post(trips::complete_trip))
        .route("/{id}/cancel", post(trips::cancel_trip))
        .route("/{id}/issues", post(trips::report_issue))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(trips::TripAppState {
            trips: core.trips.clone(),
        });

    // Vehicle routes (protected)
    let vehicle_routes = Router::new()
        .route(
            "/",
            get(vehicles::list_vehicles).post(vehicles::register_vehicle),
        )
        .route("/{id}", get(vehicles::get_vehicle))
        .route("/{id}/status", put(vehicles::set_vehicle_status))
        .route("/{id}/rate", put(vehicles::update_vehicle_rate))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(vehicles::VehicleAppState {
            vehicles: core.vehicles.clone(),
        });

    // Revenue routes (protected)
    let revenue_routes = Router::new()
        .route("/summary", get(revenue::revenue_summary))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(revenue::RevenueAppState {
            revenue: core.revenue.clone(),
        });

    // Profile routes (protected)
    let profile_state = profiles::ProfileAppState {
        profiles: core.profiles.clone(),
    };
    let host_routes = Router::new()
        .route("/", get(profiles::list_hosts).post(profiles::create_host))
        .route("/{id}", get(profiles::get_host).put(profiles::update_host))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(profile_state.clone());
    let driver_routes = Router::new()
        .route("/", get(profiles::list_drivers).post(profiles::create_driver))
        .route(
            "/{id}",
            get(profiles::get_driver).put(profiles::update_driver),
        )
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(profile_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db,
            event_bus: core.events.clone(),
            started_at: Arc::new(Instant::now()),
        });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/trips", trip_routes)
        .nest("/api/v1/vehicles", vehicle_routes)
        .nest("/api/v1/revenue", revenue_routes)
        .nest("/api/v1/hosts", host_routes)
        .nest("/api/v1/drivers", driver_routes);

    if let Some(handle) = ctx.prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BookingOptions;
    use crate::domain::principal::Principal;
    use crate::domain::repositories::RepositoryProvider;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        create_api_router(ApiContext {
            core: BookingCore::new(repos, &BookingOptions::default()),
            jwt_config: JwtConfig::default(),
            db: None,
            prometheus: None,
        })
    }

    fn bearer(principal: &Principal) -> String {
        format!(
            "Bearer {}",
            create_token(principal, &JwtConfig::default()).unwrap()
        )
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        principal: Option<&Principal>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(p) = principal {
            builder = builder.header(header::AUTHORIZATION, bearer(p));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn host() -> Principal {
        Principal::host("usr_host", "hst_1")
    }

    fn driver() -> Principal {
        Principal::driver("usr_driver", "drv_1")
    }

    async fn register_vehicle(app: &Router) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/v1/vehicles",
            Some(&host()),
            Some(json!({
                "make": "Toyota",
                "model": "Corolla",
                "year": 2022,
                "vin": "JT2BG22K1X0123456",
                "dailyRate": "50.00",
                "location": "Austin, TX"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    fn booking(vehicle_id: &str, start: &str, end: &str) -> Value {
        json!({
            "vehicleId": vehicle_id,
            "pickupDate": start,
            "returnDate": end,
            "driverName": "Dana",
            "driverEmail": "dana@example.com"
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app();
        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"]["backend"], "memory");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = app();
        let (status, body) = call(&app, "GET", "/api/v1/reservations", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
    }

    #[tokio::test]
    async fn booking_flow_over_http() {
        let app = app();
        let vehicle_id = register_vehicle(&app).await;

        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/bookings/available?startDate=2025-03-01&endDate=2025-03-04&location=austin",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert!(body["data"][0].get("vin").is_none());

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&driver()),
            Some(booking(&vehicle_id, "2025-03-01", "2025-03-04")),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["numberOfDays"], 3);
        assert_eq!(body["data"]["totalAmount"], "150.00");

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&driver()),
            Some(booking(&vehicle_id, "2025-03-03", "2025-03-05")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "vehicle_unavailable");

        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/bookings/available?startDate=2025-03-02&endDate=2025-03-03",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inverted_range_is_400() {
        let app = app();
        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/bookings/available?startDate=2025-03-05&endDate=2025-03-01",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_range");
    }

    #[tokio::test]
    async fn hosts_cannot_book_and_strangers_cannot_read() {
        let app = app();
        let vehicle_id = register_vehicle(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&host()),
            Some(booking(&vehicle_id, "2025-03-01", "2025-03-02")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "access_denied");

        let (_, body) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&driver()),
            Some(booking(&vehicle_id, "2025-03-01", "2025-03-02")),
        )
        .await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let stranger = Principal::driver("usr_other", "drv_other");
        let (status, _) = call(
            &app,
            "GET",
            &format!("/api/v1/reservations/{}", id),
            Some(&stranger),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_payload_is_422() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&driver()),
            Some(json!({
                "vehicleId": "veh_1",
                "pickupDate": "2025-03-01",
                "returnDate": "2025-03-02",
                "driverName": "",
                "driverEmail": "nope"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "validation_failed");
    }

    #[tokio::test]
    async fn unknown_status_in_update_is_422() {
        let app = app();
        let vehicle_id = register_vehicle(&app).await;
        let (_, body) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&driver()),
            Some(booking(&vehicle_id, "2025-03-01", "2025-03-02")),
        )
        .await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/api/v1/reservations/{}", id),
            Some(&driver()),
            Some(json!({ "status": "teleported" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "validation_failed");

        let (status, body) = call(
            &app,
            "DELETE",
            &format!("/api/v1/reservations/{}", id),
            Some(&driver()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "cancelled");
    }

    #[tokio::test]
    async fn rejected_status_move_keeps_details_unchanged() {
        let app = app();
        let vehicle_id = register_vehicle(&app).await;
        let (_, created) = call(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&driver()),
            Some(booking(&vehicle_id, "2025-03-01", "2025-03-02")),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/reservations/{}", id);

        let (status, body) = call(
            &app,
            "PUT",
            &uri,
            Some(&driver()),
            Some(json!({ "notes": "x", "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "invalid_transition");

        let (status, body) = call(&app, "GET", &uri, Some(&driver()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["notes"].is_null());
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["updatedAt"], created["data"]["updatedAt"]);
    }

    #[tokio::test]
    async fn missing_trip_is_404() {
        let app = app();
        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/trips/trp_missing",
            Some(&host()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let app = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[test]
    fn openapi_lists_booking_paths() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/bookings/available"));
        assert!(paths.contains_key("/api/v1/reservations/{id}"));
        assert!(paths.contains_key("/api/v1/trips/{id}/complete"));
        assert!(paths.contains_key("/api/v1/revenue/summary"));
    }
}
