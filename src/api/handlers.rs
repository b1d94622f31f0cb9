//! Route handlers translating broker-protocol requests into workflow calls.
//!
//! Form bodies are optional: a missing or undecodable form reads as an empty one, so the workflow
//! reports the missing field instead of the extractor rejecting the request.

// crates.io
use axum::{
	Form, Json,
	extract::{Path, State, rejection::FormRejection},
	http::{StatusCode, header::CONTENT_TYPE},
	response::IntoResponse,
};
// self
use crate::{_prelude::*, api::AppState, workflow::BindingInfo};

/// Plan listing; this broker offers a single implicit plan.
pub const PLANS_BODY: &str = "[]";
/// Instance name that collides with the static plan listing path.
pub const PLANS_INSTANCE: &str = "plans";

/// Form accepted by `POST /resources`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InstanceForm {
	/// Instance name, used verbatim as the vhost name.
	pub name: Option<String>,
}

/// Form accepted by the `bind-app` routes.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppHostForm {
	/// Host of the application being bound.
	#[serde(rename = "app-host")]
	pub app_host: Option<String>,
}

/// `POST /resources`
pub async fn create_instance(
	State(state): State<AppState>,
	form: Result<Form<InstanceForm>, FormRejection>,
) -> Result<StatusCode> {
	let form = form_or_default(form);

	state.broker.create_instance(form.name.as_deref().unwrap_or_default()).await?;

	Ok(StatusCode::CREATED)
}

/// `DELETE /resources/{name}`
pub async fn delete_instance(
	State(state): State<AppState>,
	Path(name): Path<String>,
) -> Result<StatusCode> {
	state.broker.delete_instance(&name).await?;

	Ok(StatusCode::OK)
}

/// `DELETE /resources/plans`, i.e. `DELETE /resources/{name}` for the instance named `plans`.
pub async fn delete_plans_instance(State(state): State<AppState>) -> Result<StatusCode> {
	state.broker.delete_instance(PLANS_INSTANCE).await?;

	Ok(StatusCode::OK)
}

/// `POST /resources/{name}/bind-app`
pub async fn bind_app(
	State(state): State<AppState>,
	Path(name): Path<String>,
	form: Result<Form<AppHostForm>, FormRejection>,
) -> Result<(StatusCode, Json<BindingInfo>)> {
	let form = form_or_default(form);
	let info = state.broker.create_binding(&name, form.app_host.as_deref().unwrap_or_default()).await?;

	Ok((StatusCode::CREATED, Json(info)))
}

/// `DELETE /resources/{name}/bind-app`
pub async fn unbind_app(
	State(state): State<AppState>,
	Path(name): Path<String>,
	form: Result<Form<AppHostForm>, FormRejection>,
) -> Result<StatusCode> {
	let form = form_or_default(form);

	state.broker.delete_binding(&name, form.app_host.as_deref().unwrap_or_default()).await?;

	Ok(StatusCode::OK)
}

/// `GET /resources/{name}/status`
pub async fn status(State(state): State<AppState>, Path(name): Path<String>) -> Result<StatusCode> {
	state.broker.check_health(&name).await?;

	Ok(StatusCode::NO_CONTENT)
}

/// `POST /resources/{name}/bind`; unit binding has no side effects.
pub async fn bind_unit(Path(name): Path<String>) -> StatusCode {
	tracing::debug!(instance = %name, "unit bound");

	StatusCode::CREATED
}

/// `DELETE /resources/{name}/bind`; unit unbinding has no side effects.
pub async fn unbind_unit(Path(name): Path<String>) -> StatusCode {
	tracing::debug!(instance = %name, "unit unbound");

	StatusCode::OK
}

/// `GET /resources/plans`
pub async fn plans() -> impl IntoResponse {
	([(CONTENT_TYPE, "application/json")], PLANS_BODY)
}

fn form_or_default<T>(form: Result<Form<T>, FormRejection>) -> T
where
	T: Default,
{
	match form {
		Ok(Form(value)) => value,
		Err(e) => {
			tracing::debug!(error = %e, "treating request body as an empty form");

			T::default()
		},
	}
}
