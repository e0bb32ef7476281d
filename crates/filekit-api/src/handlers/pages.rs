use crate::pages;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use filekit_core::catalog::{find_tool, Category};
use filekit_core::OptionalIdentity;
use std::convert::Infallible;
use std::sync::Arc;

/// The identity placed in request extensions by an auth layer, or
/// anonymous when there is none.
pub struct Viewer(pub OptionalIdentity);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(
            parts
                .extensions
                .get::<OptionalIdentity>()
                .cloned()
                .unwrap_or_default(),
        ))
    }
}

pub async fn home(Viewer(identity): Viewer) -> Html<String> {
    Html(pages::home_page(&identity))
}

pub async fn all_tools(Viewer(identity): Viewer) -> Html<String> {
    Html(pages::tools_page(&identity))
}

/// Unknown categories go back to the homepage.
pub async fn category(Path(category): Path<String>, Viewer(identity): Viewer) -> Response {
    match category.parse::<Category>() {
        Ok(category) => Html(pages::category_page(category, &identity)).into_response(),
        Err(()) => Redirect::to("/").into_response(),
    }
}

pub async fn tool(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<String>,
    Viewer(identity): Viewer,
) -> Response {
    match find_tool(&tool_id) {
        Some(tool) => {
            Html(pages::tool_page(tool, &identity, state.config.max_upload_size_mb)).into_response()
        }
        None => Redirect::to("/").into_response(),
    }
}
