use crate::service::redirect::RedirectService;
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    redirect_to: Option<String>,
}

/// Return leg of external flows; the target is client-controlled and gets
/// the full validation treatment before anyone is sent there
#[instrument(skip_all)]
pub async fn get(
    State(redirect_service): State<RedirectService>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    let target = redirect_service.safe_redirect_or_fallback(query.redirect_to.as_deref());

    Redirect::to(&target)
}
