//! Handler-level tests running the real routing, extraction and error
//! mapping over in-memory fakes.

use std::sync::{Arc, Mutex};

use actix_web::{App, http::StatusCode, http::header, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use lumen_core::domain::{
    Comment, Follow, Like, MAX_CAPTION_CHARS, Post, PostStats, User, UserStats,
};
use lumen_core::error::RepoError;
use lumen_core::feed::PostAggregator;
use lumen_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, IdentityError, IdentityGateway,
    LikeRepository, PostRepository, SubjectClaims, UserRepository,
};
use lumen_infra::InMemoryObjectStore;

use crate::handlers::configure_routes;
use crate::state::AppState;

#[derive(Default)]
struct Store {
    users: Mutex<Vec<User>>,
    posts: Mutex<Vec<Post>>,
    likes: Mutex<Vec<Like>>,
    comments: Mutex<Vec<Comment>>,
    follows: Mutex<Vec<Follow>>,
}

#[derive(Clone)]
struct Fake(Arc<Store>);

#[async_trait]
impl BaseRepository<User, Uuid> for Fake {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.0.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        self.0.users.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for Fake {
    async fn find_by_subject(&self, subject_id: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.subject_id == subject_id)
            .cloned())
    }

    async fn search_by_name(&self, query: &str, limit: u64) -> Result<Vec<User>, RepoError> {
        let needle = query.to_lowercase();
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn stats(&self, user_id: Uuid) -> Result<Option<UserStats>, RepoError> {
        if BaseRepository::<User, Uuid>::find_by_id(self, user_id)
            .await?
            .is_none()
        {
            return Ok(None);
        }
        let posts_count = self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .count() as i64;
        let follows = self.0.follows.lock().unwrap();
        Ok(Some(UserStats {
            user_id,
            posts_count,
            followers_count: follows.iter().filter(|f| f.following_id == user_id).count() as i64,
            following_count: follows.iter().filter(|f| f.follower_id == user_id).count() as i64,
        }))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        profile_image_url: Option<String>,
    ) -> Result<User, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(url) = profile_image_url {
            user.profile_image_url = Some(url);
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for Fake {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.0.posts.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.0.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for Fake {
    async fn page(
        &self,
        limit: u64,
        offset: u64,
        author: Option<Uuid>,
    ) -> Result<Vec<(Post, Option<User>)>, RepoError> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| author.is_none_or(|a| p.user_id == a))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let users = self.0.users.lock().unwrap();
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| {
                let author = users.iter().find(|u| u.id == p.user_id).cloned();
                (p, author)
            })
            .collect())
    }

    async fn count(&self, author: Option<Uuid>) -> Result<u64, RepoError> {
        Ok(self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| author.is_none_or(|a| p.user_id == a))
            .count() as u64)
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<(Post, Option<User>)>, RepoError> {
        let post = match BaseRepository::<Post, Uuid>::find_by_id(self, id).await? {
            Some(post) => post,
            None => return Ok(None),
        };
        let author = self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == post.user_id)
            .cloned();
        Ok(Some((post, author)))
    }

    async fn search_by_caption(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<(Post, Option<User>)>, RepoError> {
        let needle = query.to_lowercase();
        let users = self.0.users.lock().unwrap();
        Ok(self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.caption
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .take(limit as usize)
            .map(|p| {
                let author = users.iter().find(|u| u.id == p.user_id).cloned();
                (p.clone(), author)
            })
            .collect())
    }

    async fn stats_for(&self, post_ids: &[Uuid]) -> Result<Vec<PostStats>, RepoError> {
        let likes = self.0.likes.lock().unwrap();
        let comments = self.0.comments.lock().unwrap();
        Ok(post_ids
            .iter()
            .map(|&post_id| PostStats {
                post_id,
                likes_count: likes.iter().filter(|l| l.post_id == post_id).count() as i64,
                comments_count: comments.iter().filter(|c| c.post_id == post_id).count() as i64,
            })
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Like, Uuid> for Fake {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Like>, RepoError> {
        Ok(self.0.likes.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn insert(&self, entity: Like) -> Result<Like, RepoError> {
        let mut likes = self.0.likes.lock().unwrap();
        if likes
            .iter()
            .any(|l| l.post_id == entity.post_id && l.user_id == entity.user_id)
        {
            return Err(RepoError::Constraint("duplicate key value".to_string()));
        }
        likes.push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut likes = self.0.likes.lock().unwrap();
        let before = likes.len();
        likes.retain(|l| l.id != id);
        if likes.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl LikeRepository for Fake {
    async fn find_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        Ok(self
            .0
            .likes
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
            .cloned())
    }

    async fn delete_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<u64, RepoError> {
        let mut likes = self.0.likes.lock().unwrap();
        let before = likes.len();
        likes.retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok((before - likes.len()) as u64)
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .0
            .likes
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id && post_ids.contains(&l.post_id))
            .map(|l| l.post_id)
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for Fake {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.0.comments.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut comments = self.0.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        if comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for Fake {
    async fn list_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<(Comment, Option<User>)>, RepoError> {
        self.list_for_posts(&[post_id]).await
    }

    async fn list_for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<(Comment, Option<User>)>, RepoError> {
        let mut comments: Vec<Comment> = self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let users = self.0.users.lock().unwrap();
        Ok(comments
            .into_iter()
            .map(|c| {
                let author = users.iter().find(|u| u.id == c.user_id).cloned();
                (c, author)
            })
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Follow, Uuid> for Fake {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Follow>, RepoError> {
        Ok(self
            .0
            .follows
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn insert(&self, entity: Follow) -> Result<Follow, RepoError> {
        let mut follows = self.0.follows.lock().unwrap();
        if follows
            .iter()
            .any(|f| f.follower_id == entity.follower_id && f.following_id == entity.following_id)
        {
            return Err(RepoError::Constraint("duplicate key value".to_string()));
        }
        follows.push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut follows = self.0.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|f| f.id != id);
        if follows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for Fake {
    async fn find_pair(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Follow>, RepoError> {
        Ok(self
            .0
            .follows
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .cloned())
    }

    async fn delete_pair(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64, RepoError> {
        let mut follows = self.0.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|f| !(f.follower_id == follower_id && f.following_id == following_id));
        Ok((before - follows.len()) as u64)
    }
}

/// Accepts tokens of the form `valid-<subject>`.
struct FakeGateway;

impl IdentityGateway for FakeGateway {
    fn verify(&self, token: &str) -> Result<SubjectClaims, IdentityError> {
        match token.strip_prefix("valid-") {
            Some(subject) => Ok(SubjectClaims {
                subject: subject.to_string(),
                exp: i64::MAX,
            }),
            None => Err(IdentityError::InvalidToken("unknown token".to_string())),
        }
    }
}

fn fake_state() -> (Arc<Store>, AppState) {
    let store = Arc::new(Store::default());
    let fake = Fake(store.clone());

    let users: Arc<dyn UserRepository> = Arc::new(fake.clone());
    let posts: Arc<dyn PostRepository> = Arc::new(fake.clone());
    let likes: Arc<dyn LikeRepository> = Arc::new(fake.clone());
    let comments: Arc<dyn CommentRepository> = Arc::new(fake.clone());
    let follows: Arc<dyn FollowRepository> = Arc::new(fake);

    let aggregator = PostAggregator::new(posts.clone(), likes.clone(), comments.clone());

    let state = AppState {
        users,
        posts,
        likes,
        comments,
        follows,
        storage: Arc::new(InMemoryObjectStore::new()),
        aggregator,
    };
    (store, state)
}

async fn spawn_app(
    state: AppState,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    let gateway: Arc<dyn IdentityGateway> = Arc::new(FakeGateway);
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(gateway))
            .configure(configure_routes),
    )
    .await
}

fn add_user(store: &Store, subject: &str, name: &str) -> User {
    let user = User::new(subject.to_string(), name.to_string());
    store.users.lock().unwrap().push(user.clone());
    user
}

fn add_post(store: &Store, author: &User, caption: Option<&str>) -> Post {
    let post = Post::new(
        author.id,
        "memory://objects/posts/seed.jpg".to_string(),
        caption.map(str::to_string),
    );
    store.posts.lock().unwrap().push(post.clone());
    post
}

fn bearer(subject: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer valid-{subject}"))
}

fn multipart_body(
    image: Option<(&str, &[u8])>,
    text: &[(&str, &str)],
) -> (String, Vec<u8>) {
    let boundary = "test-form-boundary";
    let mut body = Vec::new();
    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in text {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[actix_web::test]
async fn protected_routes_require_a_bearer_token() {
    let (_store, state) = fake_state();
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/likes")
        .set_json(json!({ "postId": Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn short_search_query_is_rejected() {
    let (_store, state) = fake_state();
    let app = spawn_app(state).await;

    let req = test::TestRequest::get().uri("/api/search?q=a").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/search?q=ab").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn search_limit_outside_bounds_is_rejected() {
    let (_store, state) = fake_state();
    let app = spawn_app(state).await;

    for uri in ["/api/search?q=sunset&limit=0", "/api/search?q=sunset&limit=101"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn search_finds_users_and_captions() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Annika");
    add_post(&store, &ann, Some("sunset over the bay"));
    let app = spawn_app(state).await;

    let req = test::TestRequest::get().uri("/api/search?q=sunset").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert!(body["users"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri("/api/search?q=anni&type=users")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["users"][0]["name"], "Annika");
    assert!(body["posts"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn liking_twice_is_a_client_error() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/likes")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "postId": post.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/likes")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "postId": post.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.likes.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn like_state_is_viewer_specific() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    add_user(&store, "sub_bob", "Bob");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/likes")
        .insert_header(bearer("sub_bob"))
        .set_json(json!({ "postId": post.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The liker sees is_liked, the author and anonymous viewers do not;
    // the count is the same for everyone.
    let req = test::TestRequest::get()
        .uri("/api/posts")
        .insert_header(bearer("sub_bob"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"][0]["likes_count"], 1);
    assert_eq!(body["posts"][0]["is_liked"], true);

    let req = test::TestRequest::get()
        .uri("/api/posts")
        .insert_header(bearer("sub_ann"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"][0]["is_liked"], false);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"][0]["likes_count"], 1);
    assert_eq!(body["posts"][0]["is_liked"], false);
}

#[actix_web::test]
async fn unlike_is_idempotent() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::delete()
        .uri("/api/likes")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "postId": post.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn deleting_anothers_post_is_forbidden() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    add_user(&store, "sub_bob", "Bob");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer("sub_bob"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.posts.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn owner_can_delete_their_post() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header(bearer("sub_ann"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.posts.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn empty_comment_is_rejected() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "postId": post.id, "content": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn comment_thread_is_returned_with_the_post() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let post = add_post(&store, &ann, None);
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "postId": post.id, "content": "first!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["content"], "first!");
    assert_eq!(body["comments"][0]["user"]["name"], "Ann");
    assert_eq!(body["post"]["comments_count"], 1);
}

#[actix_web::test]
async fn self_follow_is_rejected() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/follows")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "followingId": ann.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.follows.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn duplicate_follow_conflicts() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let bob = add_user(&store, "sub_bob", "Bob");
    let app = spawn_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/follows")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "followingId": bob.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/follows")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "followingId": bob.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(store.follows.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn unfollow_is_idempotent() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let bob = add_user(&store, "sub_bob", "Bob");
    let app = spawn_app(state).await;

    let req = test::TestRequest::delete()
        .uri("/api/follows")
        .insert_header(bearer("sub_ann"))
        .set_json(json!({ "followingId": bob.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn pagination_reports_has_more_and_total() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    for _ in 0..3 {
        add_post(&store, &ann, None);
    }
    let app = spawn_app(state).await;

    let req = test::TestRequest::get().uri("/api/posts?limit=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["total"], 3);

    let req = test::TestRequest::get()
        .uri("/api/posts?limit=2&offset=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert_eq!(body["hasMore"], false);
}

#[actix_web::test]
async fn empty_page_omits_total() {
    let (_store, state) = fake_state();
    let app = spawn_app(state).await;

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["posts"].as_array().unwrap().is_empty());
    assert_eq!(body["hasMore"], false);
    assert!(body.get("total").is_none());
}

#[actix_web::test]
async fn extreme_paging_values_are_clamped() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    for _ in 0..2 {
        add_post(&store, &ann, None);
    }
    let app = spawn_app(state).await;

    let req = test::TestRequest::get()
        .uri("/api/posts?limit=18446744073709551615&offset=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert_eq!(body["hasMore"], false);
}

#[actix_web::test]
async fn create_post_via_multipart() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let (content_type, body) =
        multipart_body(Some(("image/jpeg", &[0xFF; 1024])), &[("caption", "hello")]);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["post"]["caption"], "hello");
    assert_eq!(body["post"]["likes_count"], 0);
    assert_eq!(store.posts.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn overlong_caption_is_rejected() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let caption = "x".repeat(MAX_CAPTION_CHARS + 1);
    let (content_type, body) =
        multipart_body(Some(("image/jpeg", &[0xFF; 64])), &[("caption", &caption)]);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.posts.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn oversized_image_is_rejected() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let oversized = vec![0u8; super::upload::MAX_IMAGE_BYTES + 1];
    let (content_type, body) = multipart_body(Some(("image/jpeg", &oversized)), &[]);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.posts.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn unsupported_image_type_is_rejected() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let (content_type, body) = multipart_body(Some(("image/gif", &[0u8; 64])), &[]);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(store.posts.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn post_without_image_is_rejected() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let (content_type, body) = multipart_body(None, &[("caption", "no picture")]);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.posts.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn profile_reports_counters_and_follow_state() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let bob = add_user(&store, "sub_bob", "Bob");
    add_post(&store, &ann, None);
    store
        .follows
        .lock()
        .unwrap()
        .push(Follow::new(bob.id, ann.id));
    let app = spawn_app(state).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", ann.id))
        .insert_header(bearer("sub_bob"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["posts_count"], 1);
    assert_eq!(body["user"]["followers_count"], 1);
    assert_eq!(body["user"]["is_following"], true);
    assert_eq!(body["user"]["is_own_profile"], false);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", ann.id))
        .insert_header(bearer("sub_ann"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["is_own_profile"], true);
    assert_eq!(body["user"]["is_following"], false);
}

#[actix_web::test]
async fn updating_anothers_profile_is_forbidden() {
    let (store, state) = fake_state();
    add_user(&store, "sub_ann", "Ann");
    let bob = add_user(&store, "sub_bob", "Bob");
    let app = spawn_app(state).await;

    let (content_type, body) = multipart_body(None, &[("name", "Hijacked")]);
    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}", bob.id))
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.users.lock().unwrap()[1].name, "Bob");
}

#[actix_web::test]
async fn profile_name_update_is_validated() {
    let (store, state) = fake_state();
    let ann = add_user(&store, "sub_ann", "Ann");
    let app = spawn_app(state).await;

    let too_long = "x".repeat(31);
    let (content_type, body) = multipart_body(None, &[("name", &too_long)]);
    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}", ann.id))
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart_body(None, &[("name", "Annika")]);
    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}", ann.id))
        .insert_header(bearer("sub_ann"))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.users.lock().unwrap()[0].name, "Annika");
}
