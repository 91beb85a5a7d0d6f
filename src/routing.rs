//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in, post_sign_up},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    ledger::{
        create_transaction_endpoint, delete_transaction_endpoint, export_check_endpoint,
        export_download_endpoint, get_category_select, get_expenses_page,
    },
    not_found::get_404_not_found,
    savings::{
        accept_invite_endpoint, add_saving_endpoint, delete_saving_endpoint, get_marriage_page,
        remove_connection_endpoint, send_invite_endpoint, update_goal_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::SIGN_UP_API, post(post_sign_up))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::MARRIAGE_VIEW, get(get_marriage_page))
        .route(endpoints::EXPORT_DOWNLOAD, get(export_download_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // Requests made by HTMX need the HX-REDIRECT header for auth redirects to work properly.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION_CATEGORIES,
                get(get_category_select),
            )
            .route(endpoints::EXPORT_API, get(export_check_endpoint))
            .route(
                endpoints::TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::CONNECTIONS_API, post(send_invite_endpoint))
            .route(
                endpoints::ACCEPT_CONNECTION,
                post(accept_invite_endpoint),
            )
            .route(
                endpoints::CONNECTION,
                delete(remove_connection_endpoint),
            )
            .route(endpoints::CONNECTION_GOAL, put(update_goal_endpoint))
            .route(endpoints::SAVINGS_API, post(add_saving_endpoint))
            .route(endpoints::SAVING, delete(delete_saving_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the expenses page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::EXPENSES_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_expenses() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::EXPENSES_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{
        AppState, endpoints,
        routing::build_router,
        test_utils::{FakeAuth, MemoryStore},
    };

    fn test_server() -> TestServer {
        let state = AppState::new(
            "nafstenoas",
            "Etc/UTC",
            Arc::new(FakeAuth::default()),
            Arc::new(MemoryStore::default()),
        );

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn log_in_page_is_public() {
        let response = test_server().get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_session() {
        let server = test_server();

        for page in [
            endpoints::EXPENSES_VIEW,
            endpoints::MARRIAGE_VIEW,
            endpoints::EXPORT_DOWNLOAD,
        ] {
            let response = server.get(page).await;

            response.assert_status(StatusCode::SEE_OTHER);
            let location = response.header("location");
            let location = location.to_str().unwrap();
            assert!(
                location.starts_with(endpoints::LOG_IN_VIEW),
                "want redirect to log in for {page}, got {location}"
            );
        }
    }

    #[tokio::test]
    async fn htmx_endpoints_redirect_with_header_without_session() {
        let response = test_server()
            .post(endpoints::SAVINGS_API)
            .form(&[("amount", "100"), ("note", "")])
            .await;

        let location = response.header("hx-redirect");
        assert!(location.to_str().unwrap().starts_with(endpoints::LOG_IN_VIEW));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = test_server().get("/does-not-exist").await;

        response.assert_status_not_found();
    }
}
