// routes.rs
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use http::{header::CACHE_CONTROL, HeaderValue};
use tower_http::{
    compression::Compression, services::ServeDir, set_header::SetResponseHeader,
    trace::TraceLayer,
};

use crate::{admin, handlers, AppState};

const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn create_routes(state: AppState) -> Router {
    // Ship a committed `<asset>.gz` when present, otherwise gzip on the fly.
    let statics = SetResponseHeader::if_not_present(
        Compression::new(ServeDir::new(&state.settings.static_root).precompressed_gzip()),
        CACHE_CONTROL,
        HeaderValue::from_static(STATIC_CACHE_CONTROL),
    );

    let mut app = Router::new()
        .route("/", get(handlers::root))
        .route("/polls/", get(handlers::index))
        .route("/polls/{id}/", get(handlers::detail))
        .route("/polls/{id}/results/", get(handlers::results))
        .route("/polls/{id}/votes/", post(handlers::vote))
        .nest_service("/static", statics);

    if state.settings.admin_token.is_some() {
        let admin_routes = Router::new()
            .route(
                "/questions",
                get(admin::list_questions).post(admin::create_question),
            )
            .route("/questions/{id}", delete(admin::delete_question))
            .route("/questions/{id}/choices", post(admin::create_choice))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                admin::require_token,
            ));
        app = app.nest("/admin", admin_routes);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
