pub mod auth;
pub mod comments;
pub mod pages;
pub mod posts;

use axum::Router;

use crate::AppState;

pub fn routes() -> Router<AppState> {
	Router::new()
		.merge(auth::routes())
		.merge(posts::routes())
		.merge(comments::routes())
		.merge(pages::routes())
}
