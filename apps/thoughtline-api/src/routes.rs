use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use thoughtline_service::{
	BookRecord, ChatRequest, ChatResponse, CombinedHit, CreateBookRequest, CreateNoteRequest,
	CreateThoughtRequest, DeleteBookResponse, DeleteNoteResponse, DeleteThoughtResponse,
	NoteRecord, RenameBookRequest, SearchHit, ThoughtRecord, UpdateNoteRequest,
	UpdateThoughtRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/books", post(create_book).get(list_books))
		.route("/books/{id}", get(get_book).put(rename_book).delete(delete_book))
		.route("/books/{id}/notes", post(create_note).get(list_book_notes))
		.route("/books/{id}/notes/search", get(search_book_notes))
		.route("/notes/{id}", get(get_note).put(update_note).delete(delete_note))
		.route("/thoughts", post(create_thought).get(list_thoughts))
		.route("/thoughts/search", get(search_thoughts))
		.route("/thoughts/{id}", get(get_thought).put(update_thought).delete(delete_thought))
		.route("/search", get(search_all))
		.route("/chat", post(chat))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
	#[serde(default)]
	q: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_book(
	State(state): State<AppState>,
	Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookRecord>), ApiError> {
	let book = state.service.create_book(payload).await?;

	Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookRecord>>, ApiError> {
	let books = state.service.list_books().await?;

	Ok(Json(books))
}

async fn get_book(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<BookRecord>, ApiError> {
	let book = state.service.get_book(id).await?;

	Ok(Json(book))
}

async fn rename_book(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<RenameBookRequest>,
) -> Result<Json<BookRecord>, ApiError> {
	let book = state.service.rename_book(id, payload).await?;

	Ok(Json(book))
}

async fn delete_book(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteBookResponse>, ApiError> {
	let response = state.service.delete_book(id).await?;

	Ok(Json(response))
}

async fn create_note(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteRecord>), ApiError> {
	let note = state.service.create_note(id, payload).await?;

	Ok((StatusCode::CREATED, Json(note)))
}

async fn list_book_notes(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<Vec<NoteRecord>>, ApiError> {
	let (_, notes) = state.service.book_with_notes(id).await?;

	Ok(Json(notes))
}

async fn search_book_notes(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
	let hits = state.service.search_book_notes(id, &params.q).await?;

	Ok(Json(hits))
}

async fn get_note(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<NoteRecord>, ApiError> {
	let note = state.service.get_note(id).await?;

	Ok(Json(note))
}

async fn update_note(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateNoteRequest>,
) -> Result<Json<NoteRecord>, ApiError> {
	let note = state.service.update_note(id, payload).await?;

	Ok(Json(note))
}

async fn delete_note(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteNoteResponse>, ApiError> {
	let response = state.service.delete_note(id).await?;

	Ok(Json(response))
}

async fn create_thought(
	State(state): State<AppState>,
	Json(payload): Json<CreateThoughtRequest>,
) -> Result<(StatusCode, Json<ThoughtRecord>), ApiError> {
	let thought = state.service.create_thought(payload).await?;

	Ok((StatusCode::CREATED, Json(thought)))
}

async fn list_thoughts(
	State(state): State<AppState>,
) -> Result<Json<Vec<ThoughtRecord>>, ApiError> {
	let thoughts = state.service.list_thoughts().await?;

	Ok(Json(thoughts))
}

async fn search_thoughts(
	State(state): State<AppState>,
	Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
	let hits = state.service.search_thoughts(&params.q).await?;

	Ok(Json(hits))
}

async fn get_thought(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<ThoughtRecord>, ApiError> {
	let thought = state.service.get_thought(id).await?;

	Ok(Json(thought))
}

async fn update_thought(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateThoughtRequest>,
) -> Result<Json<ThoughtRecord>, ApiError> {
	let thought = state.service.update_thought(id, payload).await?;

	Ok(Json(thought))
}

async fn delete_thought(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteThoughtResponse>, ApiError> {
	let response = state.service.delete_thought(id).await?;

	Ok(Json(response))
}

async fn search_all(
	State(state): State<AppState>,
	Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CombinedHit>>, ApiError> {
	let hits = state.service.search_all(&params.q).await?;

	Ok(Json(hits))
}

async fn chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let response = state.service.answer(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}
}

impl From<thoughtline_service::Error> for ApiError {
	fn from(err: thoughtline_service::Error) -> Self {
		use thoughtline_service::Error;

		match err {
			Error::InvalidRequest { message } => Self::new(StatusCode::BAD_REQUEST, message),
			Error::NotFound { message } => Self::new(StatusCode::NOT_FOUND, message),
			// Downstream detail stays in the server log; clients get a generic
			// body.
			err @ (Error::Provider { .. } | Error::Storage { .. }) => {
				tracing::error!(error = %err, "Request failed on a downstream service.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(ErrorBody { error: self.message })).into_response()
	}
}
