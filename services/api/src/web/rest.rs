//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::middleware::UserId;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use pinboard_core::domain::{Comment, LogAction, LogEntry, Pin, PinDraft, UserProgress};
use pinboard_core::engagement::ToggleOutcome;
use pinboard_core::levels::{level_title, next_level_threshold};
use pinboard_core::pins::PinFilter;
use pinboard_core::profile::UserProfile;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        publish_pin_handler,
        list_pins_handler,
        get_pin_handler,
        delete_pin_handler,
        toggle_like_handler,
        toggle_save_handler,
        add_comment_handler,
        delete_comment_handler,
        user_stats_handler,
        user_profile_handler,
        update_avatar_handler,
        recent_logs_handler,
    ),
    components(
        schemas(
            PublishPinRequest,
            AddCommentRequest,
            UpdateAvatarRequest,
            PinResponse,
            CommentResponse,
            ToggleResponse,
            StatsResponse,
            ProfileResponse,
            LogEntryResponse,
        )
    ),
    tags(
        (name = "Pinboard API", description = "API endpoints for the visual pin board and its gamification layer.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Payload Structs
//=========================================================================================

/// The payload for publishing a new pin.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishPinRequest {
    pub url: String,
    pub description: String,
    /// Display name of the publishing user.
    pub author: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub ai_description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// The payload for commenting on a pin.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    /// Display name of the commenting user.
    pub user_name: String,
    pub text: String,
}

/// The payload for updating a user's avatar.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    pub photo_url: String,
}

/// Optional filter for the board listing.
#[derive(Deserialize)]
pub struct ListPinsQuery {
    /// Restrict the listing to one user's pins.
    pub user: Option<String>,
}

/// A pin as returned by the API: engagement sets flattened to id lists,
/// comments ordered by creation time.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PinResponse {
    pub id: String,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: String,
    pub author: String,
    pub user_id: String,
    pub created_at: i64,
    pub tags: Vec<String>,
    pub sector: Option<String>,
    pub ai_description: Option<String>,
    pub link: Option<String>,
    pub likes: Vec<String>,
    pub like_count: u64,
    pub saves: Vec<String>,
    pub save_count: u64,
    pub comments: Vec<CommentResponse>,
}

impl From<Pin> for PinResponse {
    fn from(pin: Pin) -> Self {
        let mut comments: Vec<CommentResponse> =
            pin.comments.into_values().map(CommentResponse::from).collect();
        comments.sort_by_key(|c| c.created_at);
        Self {
            id: pin.id,
            url: pin.url,
            width: pin.width,
            height: pin.height,
            description: pin.description,
            author: pin.author,
            user_id: pin.user_id,
            created_at: pin.created_at,
            tags: pin.tags,
            sector: pin.sector,
            ai_description: pin.ai_description,
            link: pin.link,
            likes: pin.likes.into_keys().collect(),
            like_count: pin.like_count,
            saves: pin.saves.into_keys().collect(),
            save_count: pin.save_count,
            comments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub created_at: i64,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            user_name: comment.user_name,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

/// The result of a like/save toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    /// Whether the user is now a member of the set (liked/saved).
    pub active: bool,
    pub count: u64,
}

impl From<ToggleOutcome> for ToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            active: outcome.is_now_member,
            count: outcome.new_count,
        }
    }
}

/// A user's gamification record, enriched with the derived level title and
/// the XP threshold of the next level.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub entropy: u64,
    pub level: u32,
    pub level_title: String,
    pub next_level_threshold: u64,
    pub pins_created: u64,
    pub likes_given: u64,
    pub pins_saved: u64,
    pub comments_made: u64,
    pub badges: Vec<String>,
}

impl From<UserProgress> for StatsResponse {
    fn from(progress: UserProgress) -> Self {
        Self {
            entropy: progress.entropy,
            level: progress.level,
            level_title: level_title(progress.level).to_string(),
            next_level_threshold: next_level_threshold(progress.level),
            pins_created: progress.pins_created,
            likes_given: progress.likes_given,
            pins_saved: progress.pins_saved,
            comments_made: progress.comments_made,
            badges: progress.badges,
        }
    }
}

/// A user's display profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub photo_url: Option<String>,
    pub display_name: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            photo_url: profile.photo_url,
            display_name: profile.display_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryResponse {
    pub id: String,
    pub action: String,
    pub user: String,
    pub detail: String,
    pub timestamp: i64,
}

pub(crate) fn action_label(action: LogAction) -> &'static str {
    match action {
        LogAction::Upload => "UPLOAD",
        LogAction::Like => "LIKE",
        LogAction::Save => "SAVE",
        LogAction::Comment => "COMMENT",
        LogAction::System => "SYSTEM",
    }
}

impl From<LogEntry> for LogEntryResponse {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            action: action_label(entry.action).to_string(),
            user: entry.user,
            detail: entry.detail,
            timestamp: entry.timestamp,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Publish a new pin.
#[utoipa::path(
    post,
    path = "/pins",
    request_body = PublishPinRequest,
    responses(
        (status = 201, description = "Pin published", body = PinResponse),
        (status = 400, description = "Invalid pin data"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(
        ("x-user-id" = String, Header, description = "Opaque id of the acting user.")
    )
)]
pub async fn publish_pin_handler(
    State(app_state): State<AppState>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(payload): Json<PublishPinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.url.trim().is_empty() {
        return Err(ApiError::Validation("Pin url must not be empty".to_string()));
    }
    let draft = PinDraft {
        url: payload.url,
        width: payload.width,
        height: payload.height,
        description: payload.description,
        author: payload.author,
        user_id,
        tags: payload.tags,
        sector: payload.sector,
        ai_description: payload.ai_description,
        link: payload.link,
    };
    let pin = app_state.gamification.publish_pin(draft).await?;
    Ok((StatusCode::CREATED, Json(PinResponse::from(pin))))
}

/// List the board, newest first. Without a `user` filter the listing is
/// capped to the most recent 100 pins.
#[utoipa::path(
    get,
    path = "/pins",
    responses(
        (status = 200, description = "Current board state", body = [PinResponse])
    ),
    params(
        ("user" = Option<String>, Query, description = "Restrict to one user's pins.")
    )
)]
pub async fn list_pins_handler(
    State(app_state): State<AppState>,
    Query(query): Query<ListPinsQuery>,
) -> Result<Json<Vec<PinResponse>>, ApiError> {
    let filter = match query.user {
        Some(user_id) => PinFilter::ByUser(user_id),
        None => PinFilter::All,
    };
    let pins = app_state.gamification.pins().list(&filter).await?;
    Ok(Json(pins.into_iter().map(PinResponse::from).collect()))
}

/// Fetch one pin.
#[utoipa::path(
    get,
    path = "/pins/{id}",
    responses(
        (status = 200, description = "The pin", body = PinResponse),
        (status = 404, description = "No such pin")
    ),
    params(("id" = String, Path, description = "Pin id."))
)]
pub async fn get_pin_handler(
    State(app_state): State<AppState>,
    Path(pin_id): Path<String>,
) -> Result<Json<PinResponse>, ApiError> {
    let pin = app_state.gamification.pins().get(&pin_id).await?;
    Ok(Json(PinResponse::from(pin)))
}

/// Delete a pin. XP already granted for it is not revoked.
#[utoipa::path(
    delete,
    path = "/pins/{id}",
    responses(
        (status = 204, description = "Pin deleted"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(("id" = String, Path, description = "Pin id."))
)]
pub async fn delete_pin_handler(
    State(app_state): State<AppState>,
    Path(pin_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.gamification.delete_pin(&pin_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the acting user's like on a pin.
#[utoipa::path(
    post,
    path = "/pins/{id}/like",
    responses(
        (status = 200, description = "Toggle applied", body = ToggleResponse),
        (status = 404, description = "No such pin"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(
        ("id" = String, Path, description = "Pin id."),
        ("x-user-id" = String, Header, description = "Opaque id of the acting user.")
    )
)]
pub async fn toggle_like_handler(
    State(app_state): State<AppState>,
    Path(pin_id): Path<String>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let outcome = app_state.gamification.toggle_like(&pin_id, &user_id).await?;
    Ok(Json(ToggleResponse::from(outcome)))
}

/// Toggle the acting user's save on a pin.
#[utoipa::path(
    post,
    path = "/pins/{id}/save",
    responses(
        (status = 200, description = "Toggle applied", body = ToggleResponse),
        (status = 404, description = "No such pin"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(
        ("id" = String, Path, description = "Pin id."),
        ("x-user-id" = String, Header, description = "Opaque id of the acting user.")
    )
)]
pub async fn toggle_save_handler(
    State(app_state): State<AppState>,
    Path(pin_id): Path<String>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let outcome = app_state.gamification.toggle_save(&pin_id, &user_id).await?;
    Ok(Json(ToggleResponse::from(outcome)))
}

/// Comment on a pin.
#[utoipa::path(
    post,
    path = "/pins/{id}/comments",
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Empty comment"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(
        ("id" = String, Path, description = "Pin id."),
        ("x-user-id" = String, Header, description = "Opaque id of the acting user.")
    )
)]
pub async fn add_comment_handler(
    State(app_state): State<AppState>,
    Path(pin_id): Path<String>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::Validation("Comment text must not be empty".to_string()));
    }
    let comment = app_state
        .gamification
        .add_comment(&pin_id, &user_id, &payload.user_name, &payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Delete a comment. No XP reversal.
#[utoipa::path(
    delete,
    path = "/pins/{id}/comments/{comment_id}",
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(
        ("id" = String, Path, description = "Pin id."),
        ("comment_id" = String, Path, description = "Comment id.")
    )
)]
pub async fn delete_comment_handler(
    State(app_state): State<AppState>,
    Path((pin_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .gamification
        .delete_comment(&pin_id, &comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a user's gamification record. Unknown users read as the
/// zero-state, not as an error.
#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    responses(
        (status = 200, description = "The user's progress", body = StatsResponse)
    ),
    params(("id" = String, Path, description = "User id."))
)]
pub async fn user_stats_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let progress = app_state.gamification.progress().get(&user_id).await?;
    Ok(Json(StatsResponse::from(progress)))
}

/// Fetch a user's display profile. A user who never set one reads as
/// `null`.
#[utoipa::path(
    get,
    path = "/users/{id}/profile",
    responses(
        (status = 200, description = "The user's profile, or null when never set", body = ProfileResponse)
    ),
    params(("id" = String, Path, description = "User id."))
)]
pub async fn user_profile_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Option<ProfileResponse>>, ApiError> {
    let profile = app_state.profiles.get(&user_id).await?;
    Ok(Json(profile.map(ProfileResponse::from)))
}

/// Set a user's avatar. Merges into the profile record, so other profile
/// fields are untouched.
#[utoipa::path(
    put,
    path = "/users/{id}/avatar",
    request_body = UpdateAvatarRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Empty avatar URL"),
        (status = 401, description = "Missing x-user-id header")
    ),
    params(
        ("id" = String, Path, description = "User id."),
        ("x-user-id" = String, Header, description = "Opaque id of the acting user.")
    )
)]
pub async fn update_avatar_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateAvatarRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if payload.photo_url.trim().is_empty() {
        return Err(ApiError::Validation("Avatar URL must not be empty".to_string()));
    }
    let profile = app_state
        .profiles
        .set_avatar(&user_id, &payload.photo_url)
        .await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// The 20 most recent activity entries, newest first.
#[utoipa::path(
    get,
    path = "/logs",
    responses(
        (status = 200, description = "Current activity window", body = [LogEntryResponse])
    )
)]
pub async fn recent_logs_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<LogEntryResponse>>, ApiError> {
    let window = app_state.gamification.activity().recent().await?;
    Ok(Json(window.into_iter().map(LogEntryResponse::from).collect()))
}
