pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::applications::handlers as applications;
use crate::candidates::handlers as candidates;
use crate::employers::handlers as employers;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

/// Headroom for multipart framing on top of the resume size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_resume_bytes + MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health::health_handler))
        // Job board
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_public).post(jobs::handle_create),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get).put(jobs::handle_update),
        )
        .route("/api/v1/jobs/:id/submit", post(jobs::handle_submit))
        .route("/api/v1/jobs/:id/close", post(jobs::handle_close))
        .route("/api/v1/jobs/:id/relist", post(jobs::handle_relist))
        .route("/api/v1/jobs/:id/matches", get(jobs::handle_job_matches))
        .route("/api/v1/jobs/:id/apply", post(applications::handle_apply))
        .route(
            "/api/v1/jobs/:id/applications",
            get(applications::handle_list_for_job),
        )
        // Employer account
        .route(
            "/api/v1/employers/me",
            get(employers::handle_get_me).put(employers::handle_put_me),
        )
        .route("/api/v1/employers/me/jobs", get(employers::handle_my_jobs))
        // Candidate account
        .route(
            "/api/v1/candidates/me",
            get(candidates::handle_get_me).put(candidates::handle_put_me),
        )
        .route(
            "/api/v1/candidates/me/resume",
            get(candidates::handle_resume_link)
                .post(candidates::handle_upload_resume)
                .layer(upload_limit),
        )
        .route(
            "/api/v1/candidates/me/matches",
            get(candidates::handle_my_matches),
        )
        .route(
            "/api/v1/candidates/me/applications",
            get(candidates::handle_my_applications),
        )
        // Applications
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/v1/applications/:id/withdraw",
            post(applications::handle_withdraw),
        )
        .route(
            "/api/v1/applications/:id/resume",
            get(applications::handle_resume_link),
        )
        // Admin
        .route("/api/v1/admin/employers", get(admin::handle_list_employers))
        .route(
            "/api/v1/admin/employers/:id/review",
            post(admin::handle_review_employer),
        )
        .route("/api/v1/admin/jobs", get(admin::handle_list_jobs))
        .route(
            "/api/v1/admin/jobs/:id/approve",
            post(admin::handle_approve_job),
        )
        .route(
            "/api/v1/admin/jobs/:id/reject",
            post(admin::handle_reject_job),
        )
        .route(
            "/api/v1/admin/jobs/:id/confirm-payment",
            post(admin::handle_confirm_payment),
        )
        .route("/api/v1/admin/audit-logs", get(admin::handle_audit_logs))
        .route("/api/v1/admin/analytics", get(admin::handle_analytics))
        .with_state(state)
}
