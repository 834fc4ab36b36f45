use axum::{response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/about", get(about))
		.route("/contact", get(contact))
}

#[derive(Debug, Serialize)]
pub struct StaticPage {
	pub title: &'static str,
	pub heading: &'static str,
	pub body: &'static str,
}

async fn about() -> impl IntoResponse {
	Json(StaticPage {
		title: "About",
		heading: "About Me",
		body: "This is what I do.",
	})
}

async fn contact() -> impl IntoResponse {
	Json(StaticPage {
		title: "Contact",
		heading: "Contact Me",
		body: "Have questions? I have answers.",
	})
}
