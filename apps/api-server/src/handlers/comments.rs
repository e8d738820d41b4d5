//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Comment;
use quill_core::error::DomainError;
use quill_core::ports::{BaseRepository, CommentRepository};
use quill_shared::dto::{CommentRequest, CommentResponse};

use crate::handlers::posts::find_post;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn find_comment(state: &AppState, id: Uuid) -> Result<Comment, AppError> {
    state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("comment", id).into())
}

/// GET /posts/{id}/comments
///
/// Returns every comment on the post, approved or not; filtering on
/// `approved_comment` is left to the caller.
pub async fn list_for_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let comments = state.comments.list_for_post(post.id).await?;
    let body: Vec<CommentResponse> = comments.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// POST /posts/{id}/comments
///
/// Commenting is open to unauthenticated visitors; the author is a free
/// string, not a user reference.
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = find_post(&state, path.into_inner()).await?;
    let comment = Comment::new(post.id, req.author, req.text)?;
    let saved = state.comments.insert(comment).await?;

    tracing::debug!(comment_id = %saved.id, post_id = %post.id, "Comment created");

    Ok(HttpResponse::Created().json(CommentResponse::from(saved)))
}

/// POST /comments/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut comment = find_comment(&state, path.into_inner()).await?;
    comment.edit(req.author, req.text)?;
    let saved = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(CommentResponse::from(saved)))
}

/// POST /comments/{id}/approve - Protected route
pub async fn approve(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut comment = find_comment(&state, path.into_inner()).await?;
    comment.approve();
    let saved = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(CommentResponse::from(saved)))
}

/// DELETE /comments/{id} - Protected route
pub async fn remove(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = find_comment(&state, path.into_inner()).await?;
    state.comments.delete(comment.id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use chrono::{TimeDelta, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use quill_core::domain::{Comment, Post};
    use quill_core::ports::{BaseRepository, CommentRepository};
    use quill_shared::dto::CommentResponse;
    use quill_shared::response::ErrorResponse;

    use crate::handlers::test_app;
    use crate::state::AppState;

    async fn state_with_post() -> (AppState, Post) {
        let state = AppState::in_memory();
        let mut post = Post::new(Uuid::new_v4(), "post".to_string(), "text".to_string()).unwrap();
        post.published_date = Some(Utc::now() - TimeDelta::hours(1));
        let post = state.posts.insert(post).await.unwrap();
        (state, post)
    }

    #[actix_web::test]
    async fn creating_a_comment_returns_it_with_an_id() {
        let (state, post) = state_with_post().await;
        let app = test_app::init(state).await;

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comments", post.id))
            .set_json(json!({"author": "a", "text": "t"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: CommentResponse = test::read_body_json(res).await;
        assert!(!body.id.is_nil());
        assert_eq!(body.post, post.id);
        assert_eq!(body.author, "a");
        assert_eq!(body.text, "t");
        assert!(!body.approved_comment);
    }

    #[actix_web::test]
    async fn creating_a_comment_with_empty_body_is_400() {
        let (state, post) = state_with_post().await;
        let app = test_app::init(state).await;

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comments", post.id))
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(res).await;
        assert!(!body.message.is_empty());
    }

    #[actix_web::test]
    async fn commenting_on_a_missing_post_is_404() {
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comments", Uuid::new_v4()))
            .set_json(json!({"author": "a", "text": "t"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn listing_includes_unapproved_comments() {
        let (state, post) = state_with_post().await;
        let mut approved =
            Comment::new(post.id, "ann".to_string(), "approved".to_string()).unwrap();
        approved.approve();
        state.comments.insert(approved).await.unwrap();
        state
            .comments
            .insert(Comment::new(post.id, "bob".to_string(), "pending".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}/comments", post.id))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<CommentResponse> = test::read_body_json(res).await;
        assert_eq!(body.len(), 2);
    }

    #[actix_web::test]
    async fn editing_a_comment_overwrites_author_and_text() {
        let (state, post) = state_with_post().await;
        let comment = state
            .comments
            .insert(Comment::new(post.id, "ann".to_string(), "before".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let req = test::TestRequest::post()
            .uri(&format!("/comments/{}", comment.id))
            .set_json(json!({"author": "bob", "text": "after"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: CommentResponse = test::read_body_json(res).await;
        assert_eq!(body.author, "bob");
        assert_eq!(body.text, "after");
    }

    #[actix_web::test]
    async fn editing_with_missing_fields_is_400() {
        let (state, post) = state_with_post().await;
        let comment = state
            .comments
            .insert(Comment::new(post.id, "ann".to_string(), "before".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let req = test::TestRequest::post()
            .uri(&format!("/comments/{}", comment.id))
            .set_json(json!({"author": "bob"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn approving_requires_authentication_and_is_idempotent() {
        let (state, post) = state_with_post().await;
        let comment = state
            .comments
            .insert(Comment::new(post.id, "ann".to_string(), "nice".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let approve_uri = format!("/comments/{}/approve", comment.id);

        let req = test::TestRequest::post().uri(&approve_uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri(&approve_uri)
                .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: CommentResponse = test::read_body_json(res).await;
            assert!(body.approved_comment);
        }
    }

    #[actix_web::test]
    async fn approving_a_missing_comment_is_404() {
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri(&format!("/comments/{}/approve", Uuid::new_v4()))
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn deleting_a_comment_requires_authentication() {
        let (state, post) = state_with_post().await;
        let comment = state
            .comments
            .insert(Comment::new(post.id, "ann".to_string(), "gone".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state.clone()).await;
        let delete_uri = format!("/comments/{}", comment.id);

        let req = test::TestRequest::delete().uri(&delete_uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri(&delete_uri)
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        assert!(state.comments.list_for_post(post.id).await.unwrap().is_empty());
    }
}
