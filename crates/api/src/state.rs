use std::sync::Arc;

use jasiri_core::admin::LocalPostApi;
use jasiri_core::auth::AdminSecret;
use jasiri_core::contact::RateLimiter;
use jasiri_core::events::EventBus;
use jasiri_core::post::PostService;
use jasiri_core::store::{ContactStore, PostStore};

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    posts: PostService,
    admin: LocalPostApi,
    contacts: Arc<dyn ContactStore>,
    secret: AdminSecret,
    contact_limiter: RateLimiter,
    order_limiter: RateLimiter,
    config: AppConfig,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostStore>,
        contacts: Arc<dyn ContactStore>,
        config: AppConfig,
        event_bus: EventBus,
    ) -> Self {
        let secret = AdminSecret::new(config.admin_token.clone());
        let service = PostService::new(posts, event_bus);
        Self {
            inner: Arc::new(InnerState {
                admin: LocalPostApi::new(service.clone(), secret.clone()),
                posts: service,
                contacts,
                secret,
                contact_limiter: RateLimiter::default(),
                order_limiter: RateLimiter::default(),
                config,
            }),
        }
    }

    pub fn posts(&self) -> &PostService {
        &self.inner.posts
    }

    /// Token-checked post operations for the admin routes.
    pub fn admin(&self) -> &LocalPostApi {
        &self.inner.admin
    }

    pub fn contacts(&self) -> &dyn ContactStore {
        self.inner.contacts.as_ref()
    }

    pub fn secret(&self) -> &AdminSecret {
        &self.inner.secret
    }

    pub fn contact_limiter(&self) -> &RateLimiter {
        &self.inner.contact_limiter
    }

    pub fn order_limiter(&self) -> &RateLimiter {
        &self.inner.order_limiter
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        self.inner.posts.events()
    }
}
