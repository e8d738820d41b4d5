//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::error::DomainError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository};
use quill_shared::dto::{PostDetailResponse, PostRequest, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(super) async fn find_post(state: &AppState, id: Uuid) -> Result<Post, AppError> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", id).into())
}

/// GET /posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_published(Utc::now()).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/drafts - Protected route
pub async fn drafts(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.list_drafts().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/{id}
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = find_post(&state, id).await?;
    let comments = state.comments.list_for_post(id).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post.into(),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// POST /posts - Protected route
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = Post::new(identity.user_id, req.title, req.text)?;
    let saved = state.posts.insert(post).await?;

    tracing::debug!(post_id = %saved.id, "Post created");

    Ok(HttpResponse::Created().json(PostResponse::from(saved)))
}

/// POST /posts/{id} - Protected route
///
/// Editing reassigns the post to the caller; there is no ownership check.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut post = find_post(&state, path.into_inner()).await?;
    post.edit(identity.user_id, req.title, req.text)?;
    let saved = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(PostResponse::from(saved)))
}

/// POST /posts/{id}/publish - Protected route
pub async fn publish(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, path.into_inner()).await?;
    post.publish();
    let saved = state.posts.update(post).await?;

    tracing::debug!(post_id = %saved.id, "Post published");

    Ok(HttpResponse::Ok().json(PostResponse::from(saved)))
}

/// DELETE /posts/{id}
pub async fn remove(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    find_post(&state, id).await?;
    state.posts.delete(id).await?;

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
    use quill_shared::dto::{PostDetailResponse, PostResponse};
    use quill_shared::response::ErrorResponse;

    use crate::handlers::test_app;
    use crate::state::AppState;

    fn draft(author: Uuid, title: &str) -> Post {
        Post::new(author, title.to_string(), "text".to_string()).unwrap()
    }

    fn published(author: Uuid, title: &str, hours_ago: i64) -> Post {
        let mut post = draft(author, title);
        post.published_date = Some(Utc::now() - TimeDelta::hours(hours_ago));
        post
    }

    #[actix_web::test]
    async fn published_posts_are_listed_in_publication_order() {
        let state = AppState::in_memory();
        let author = Uuid::new_v4();
        for (title, hours_ago) in [("second", 2), ("first", 3), ("third", 1)] {
            state
                .posts
                .insert(published(author, title, hours_ago))
                .await
                .unwrap();
        }
        state.posts.insert(draft(author, "draft")).await.unwrap();

        let app = test_app::init(state.clone()).await;
        let req = test::TestRequest::get().uri("/posts").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<PostResponse> = test::read_body_json(res).await;
        let titles: Vec<&str> = body.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert!(body.iter().all(|p| p.author == author));
        assert!(body.iter().all(|p| p.text == "text"));
    }

    #[actix_web::test]
    async fn missing_post_is_404_for_detail_and_comments() {
        let app = test_app::init(AppState::in_memory()).await;

        for uri in [
            format!("/posts/{}", Uuid::new_v4()),
            format!("/posts/{}/comments", Uuid::new_v4()),
            // Not a UUID at all, still an absent resource
            "/posts/1234".to_string(),
        ] {
            let req = test::TestRequest::get().uri(&uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_web::test]
    async fn detail_includes_comments() {
        let state = AppState::in_memory();
        let post = state
            .posts
            .insert(published(Uuid::new_v4(), "with comments", 1))
            .await
            .unwrap();
        state
            .comments
            .insert(Comment::new(post.id, "ann".to_string(), "hello".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", post.id))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: PostDetailResponse = test::read_body_json(res).await;
        assert_eq!(body.post.id, post.id);
        assert_eq!(body.comments.len(), 1);
        assert_eq!(body.comments[0].author, "ann");
    }

    #[actix_web::test]
    async fn creating_a_post_requires_authentication() {
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({"title": "t", "text": "x"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn creating_a_post_with_empty_body_is_400() {
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri("/posts")
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(res).await;
        assert!(!body.message.is_empty());
    }

    #[actix_web::test]
    async fn created_post_belongs_to_the_caller() {
        let author = Uuid::new_v4();
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri("/posts")
            .insert_header(("Authorization", test_app::bearer(author)))
            .set_json(json!({"title": "hello", "text": "world"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: PostResponse = test::read_body_json(res).await;
        assert_eq!(body.author, author);
        assert_eq!(body.title, "hello");
        assert_eq!(body.text, "world");
        assert!(body.published_date.is_none());
    }

    #[actix_web::test]
    async fn editing_reassigns_the_author_to_the_caller() {
        let state = AppState::in_memory();
        let post = state
            .posts
            .insert(draft(Uuid::new_v4(), "original"))
            .await
            .unwrap();
        let editor = Uuid::new_v4();

        let app = test_app::init(state).await;
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(("Authorization", test_app::bearer(editor)))
            .set_json(json!({"title": "edited", "text": "edited text"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: PostResponse = test::read_body_json(res).await;
        assert_eq!(body.author, editor);
        assert_eq!(body.title, "edited");
    }

    #[actix_web::test]
    async fn editing_with_missing_fields_is_400() {
        let state = AppState::in_memory();
        let post = state
            .posts
            .insert(draft(Uuid::new_v4(), "original"))
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .set_json(json!({"title": "only a title"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn publish_stamps_and_republish_advances() {
        let state = AppState::in_memory();
        let post = state
            .posts
            .insert(draft(Uuid::new_v4(), "draft"))
            .await
            .unwrap();

        let app = test_app::init(state).await;
        let publish_uri = format!("/posts/{}/publish", post.id);

        let req = test::TestRequest::post()
            .uri(&publish_uri)
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let first: PostResponse = test::read_body_json(res).await;
        let first_stamp = first.published_date.expect("publish sets the stamp");

        let req = test::TestRequest::post()
            .uri(&publish_uri)
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let second: PostResponse = test::read_body_json(res).await;
        let second_stamp = second.published_date.expect("still published");

        assert!(second_stamp >= first_stamp);
    }

    #[actix_web::test]
    async fn publishing_a_missing_post_is_404() {
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/publish", Uuid::new_v4()))
            .insert_header(("Authorization", test_app::bearer(Uuid::new_v4())))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn deleting_a_post_removes_it_and_its_comments() {
        let state = AppState::in_memory();
        let post = state
            .posts
            .insert(published(Uuid::new_v4(), "doomed", 1))
            .await
            .unwrap();
        state
            .comments
            .insert(Comment::new(post.id, "ann".to_string(), "bye".to_string()).unwrap())
            .await
            .unwrap();

        let app = test_app::init(state.clone()).await;
        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", post.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        assert!(state.comments.list_for_post(post.id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn deleting_a_missing_post_is_404() {
        let app = test_app::init(AppState::in_memory()).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", Uuid::new_v4()))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn draft_listing_requires_authentication() {
        let state = AppState::in_memory();
        let author = Uuid::new_v4();
        state.posts.insert(draft(author, "wip")).await.unwrap();
        state
            .posts
            .insert(published(author, "live", 1))
            .await
            .unwrap();

        let app = test_app::init(state).await;

        let req = test::TestRequest::get().uri("/posts/drafts").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/posts/drafts")
            .insert_header(("Authorization", test_app::bearer(author)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<PostResponse> = test::read_body_json(res).await;
        let titles: Vec<&str> = body.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["wip"]);
    }
}
