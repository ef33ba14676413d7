pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::admin;
use crate::documents;
use crate::gating;
use crate::interview;
use crate::leads;
use crate::settings;
use crate::simulation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public lead-capture forms
        .route(
            "/api/v1/consulting-inquiry",
            post(leads::handlers::handle_consulting_inquiry),
        )
        .route(
            "/api/v1/recruitment",
            post(leads::handlers::handle_recruitment_application),
        )
        .route(
            "/api/v1/mandate-request",
            post(leads::handlers::handle_mandate_request),
        )
        // Diagnosis interview flow
        .route("/api/v1/interview/cv", post(interview::handlers::handle_analyze_cv))
        .route("/api/v1/interview/start", post(interview::handlers::handle_start))
        .route("/api/v1/interview/answer", post(interview::handlers::handle_answer))
        .route("/api/v1/interview/skip", post(interview::handlers::handle_skip))
        .route(
            "/api/v1/interview/:id",
            get(interview::handlers::handle_get_diagnosis),
        )
        // Role simulation flow
        .route(
            "/api/v1/simulation/start",
            post(simulation::handlers::handle_start_simulation),
        )
        .route(
            "/api/v1/simulation/respond",
            post(simulation::handlers::handle_respond),
        )
        .route(
            "/api/v1/simulation/:id",
            get(simulation::handlers::handle_get_simulation),
        )
        // User dashboard
        .route(
            "/api/v1/user/readiness",
            get(gating::handlers::handle_readiness),
        )
        .route(
            "/api/v1/user/academy",
            get(documents::handlers::handle_academy),
        )
        .route(
            "/api/v1/user/mentor",
            post(documents::handlers::handle_mentor),
        )
        .route(
            "/api/v1/user/performance-profile",
            get(documents::handlers::handle_get_performance_profile)
                .post(documents::handlers::handle_generate_performance_profile),
        )
        .route(
            "/api/v1/user/recommendation",
            get(documents::handlers::handle_get_recommendation)
                .post(documents::handlers::handle_generate_recommendation),
        )
        .route(
            "/api/v1/documents/:reference_id",
            get(documents::handlers::handle_verify_document),
        )
        // Admin back office
        .route(
            "/api/v1/admin/users",
            get(admin::users::handle_list_users).post(admin::users::handle_register_user),
        )
        .route(
            "/api/v1/admin/users/:id",
            patch(admin::users::handle_update_user).delete(admin::users::handle_delete_user),
        )
        .route("/api/v1/admin/leads", get(admin::leads::handle_list_leads))
        .route(
            "/api/v1/admin/leads/:id",
            patch(admin::leads::handle_update_lead).delete(admin::leads::handle_delete_lead),
        )
        .route(
            "/api/v1/admin/sessions",
            get(admin::sessions::handle_list_sessions).post(admin::sessions::handle_create_session),
        )
        .route(
            "/api/v1/admin/sessions/:id",
            delete(admin::sessions::handle_delete_session),
        )
        .route(
            "/api/v1/admin/tools",
            get(admin::tools::handle_list_tools).post(admin::tools::handle_create_tool),
        )
        .route(
            "/api/v1/admin/tools/:id",
            patch(admin::tools::handle_update_tool).delete(admin::tools::handle_delete_tool),
        )
        .route(
            "/api/v1/admin/config",
            get(settings::handlers::handle_list_config)
                .put(settings::handlers::handle_upsert_config),
        )
        .with_state(state)
}
