use crate::service::{auth::AuthService, redirect::RedirectService, session::Sessions};
use axum::{extract::State, response::Redirect, Form};
use doppel::CsrfHandle;
use imobibase_error::{bail, ErrorType, Result};
use serde::Deserialize;
use smol_str::SmolStr;

const WRONG_USERNAME_OR_PASSWORD: &str = "Entered wrong username or password";

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    #[serde(default)]
    redirect_to: Option<String>,
}

#[instrument(skip_all)]
pub async fn post(
    State(auth_service): State<AuthService>,
    State(redirect_service): State<RedirectService>,
    State(sessions): State<Sessions>,
    csrf_handle: CsrfHandle,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let is_valid = auth_service
        .verify_credentials(&form.username, &form.password)
        .await?;

    if !is_valid {
        bail!(
            type = ErrorType::Unauthorized(Some(WRONG_USERNAME_OR_PASSWORD.into())),
            WRONG_USERNAME_OR_PASSWORD
        );
    }

    sessions.authenticate(csrf_handle.session_id(), SmolStr::from(form.username.as_str()));
    // The principal changed, retire the token the anonymous session used
    csrf_handle.rotate();

    let target = redirect_service.safe_redirect_or_fallback(form.redirect_to.as_deref());

    Ok(Redirect::to(&target))
}
