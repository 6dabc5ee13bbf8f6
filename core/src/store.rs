//! Application state for the admin console: the current user and their
//! blog list, both as `Loadable` values.
//!
//! # Design
//! State changes only through two synchronous mutations, `set_user` and
//! `set_blogs`. Everything asynchronous is an action: it commits `Loading`,
//! awaits the API, then commits a terminal state. Consumers observe commits
//! through a `watch` channel.
//!
//! Actions on the same slice run one at a time (one flight lock for the
//! user, one for the blogs). Whenever `set_user` invalidates the blog list
//! it bumps an identity epoch; blog actions drop their final commit if the
//! epoch moved while they were waiting on the server, so one user's list
//! never lands in another user's session.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::Collator;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::Api;
use crate::error::{ApiError, StoreError};
use crate::guard::{self, Navigation, Route};
use crate::loadable::{LoadState, Loadable};
use crate::transport::Transport;
use crate::types::{Blog, User, UserWithPassword};

pub const INVALID_CREDENTIALS: &str = "Invalid username and/or password";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub user: Loadable<User>,
    pub blogs: Loadable<Vec<Blog>>,
}

/// How a login attempt or session check ended. The same outcome is also
/// committed to `State::user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(User),
    /// No session; the user state was reset to `Uninitialized`.
    NotLoggedIn,
    InvalidCredentials,
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account exists; the login that followed may still have failed.
    Registered(LoginOutcome),
    Failed(ApiError),
}

/// Order blogs by display name (slug when unnamed) with root-locale
/// collation at secondary strength: accents count, case does not.
pub fn sort_blogs(mut blogs: Vec<Blog>) -> Vec<Blog> {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(Default::default(), options) {
        Ok(collator) => blogs.sort_by(|a, b| collator.compare(a.name(), b.name())),
        Err(err) => {
            warn!(error = %err, "collation data unavailable, sorting by lowercase name");
            blogs.sort_by_cached_key(|b| b.name().to_lowercase());
        }
    }
    blogs
}

pub struct Store<T> {
    api: Api<T>,
    state: watch::Sender<State>,
    epoch: AtomicU64,
    user_flight: Mutex<()>,
    blogs_flight: Mutex<()>,
}

impl<T: Transport> Store<T> {
    pub fn new(api: Api<T>) -> Self {
        let (state, _) = watch::channel(State::default());
        Self {
            api,
            state,
            epoch: AtomicU64::new(0),
            user_flight: Mutex::new(()),
            blogs_flight: Mutex::new(()),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    /// Receiver notified after every commit.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Decide whether navigation to `to` may proceed with the current user.
    pub fn guard(&self, to: &Route) -> Navigation {
        guard::guard(&self.state.borrow(), to)
    }

    // -- mutations ---------------------------------------------------------

    /// Replace the user state. Any state other than `Loaded`, or a `Loaded`
    /// user with a different username than the current one, also resets the
    /// blog list.
    pub fn set_user(&self, user: Loadable<User>) {
        self.state.send_modify(|state| {
            let identity_changed = match (&user, &state.user) {
                (Loadable::Loaded(next), Loadable::Loaded(current)) => next.username != current.username,
                (Loadable::Loaded(_), _) => false,
                _ => true,
            };
            if identity_changed {
                state.blogs = Loadable::Uninitialized;
                self.epoch.fetch_add(1, Ordering::SeqCst);
            }
            debug!(user = ?user.state(), reset_blogs = identity_changed, "setUser");
            state.user = user;
        });
    }

    pub fn set_blogs(&self, blogs: Loadable<Vec<Blog>>) {
        debug!(blogs = ?blogs.state(), "setBlogs");
        self.state.send_modify(|state| state.blogs = blogs);
    }

    /// `set_blogs`, unless the identity changed since `epoch` was read.
    fn set_blogs_in_epoch(&self, epoch: u64, blogs: Loadable<Vec<Blog>>) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!(blogs = ?blogs.state(), "dropping blog commit after identity change");
                return false;
            }
            debug!(blogs = ?blogs.state(), "setBlogs");
            state.blogs = blogs;
            true
        })
    }

    // -- session actions ---------------------------------------------------

    /// Create the account, then log in with the same credentials.
    pub async fn register(&self, user: UserWithPassword) -> RegisterOutcome {
        let _flight = self.user_flight.lock().await;
        self.set_user(Loadable::Loading);

        match self.api.register(&user).await {
            Ok(()) => {
                info!(username = %user.username, "registered");
                RegisterOutcome::Registered(self.login_in_flight(&user.username, &user.password).await)
            }
            Err(err) => {
                warn!(username = %user.username, error = %err, "registration failed");
                self.set_user(Loadable::error(err.to_string()));
                RegisterOutcome::Failed(err)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        let _flight = self.user_flight.lock().await;
        self.login_in_flight(username, password).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let _flight = self.user_flight.lock().await;
        self.set_user(Loadable::Loading);

        match self.api.logout().await {
            Ok(()) => {
                self.set_user(Loadable::Uninitialized);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "logout failed");
                self.set_user(Loadable::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Ask the server who the session belongs to. A missing session is not
    /// an error: the user state becomes `Uninitialized`.
    pub async fn check_login(&self) -> LoginOutcome {
        let _flight = self.user_flight.lock().await;
        self.check_login_in_flight().await
    }

    async fn login_in_flight(&self, username: &str, password: &str) -> LoginOutcome {
        self.set_user(Loadable::Loading);

        match self.api.login(username, password).await {
            Ok(true) => self.check_login_in_flight().await,
            Ok(false) => {
                info!(%username, "credentials rejected");
                self.set_user(Loadable::error(INVALID_CREDENTIALS));
                LoginOutcome::InvalidCredentials
            }
            Err(err) => {
                warn!(%username, error = %err, "login failed");
                self.set_user(Loadable::error(err.to_string()));
                LoginOutcome::Failed(err)
            }
        }
    }

    async fn check_login_in_flight(&self) -> LoginOutcome {
        self.set_user(Loadable::Loading);

        match self.api.whoami().await {
            Ok(user) => {
                self.set_user(Loadable::loaded(user.clone()));
                LoginOutcome::LoggedIn(user)
            }
            Err(err) if err.is_authentication_required() => {
                self.set_user(Loadable::Uninitialized);
                LoginOutcome::NotLoggedIn
            }
            Err(err) => {
                warn!(error = %err, "session check failed");
                self.set_user(Loadable::error(err.to_string()));
                LoginOutcome::Failed(err)
            }
        }
    }

    // -- blog actions ------------------------------------------------------

    pub async fn load_blogs(&self) -> Result<(), ApiError> {
        let _flight = self.blogs_flight.lock().await;
        let mut epoch = 0;
        self.state.send_modify(|state| {
            epoch = self.epoch.load(Ordering::SeqCst);
            debug!(blogs = ?LoadState::Loading, "setBlogs");
            state.blogs = Loadable::Loading;
        });

        match self.api.list_blogs().await {
            Ok(blogs) => {
                self.set_blogs_in_epoch(epoch, Loadable::loaded(blogs.unwrap_or_default()));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "loading blogs failed");
                self.set_blogs_in_epoch(epoch, Loadable::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn create_blog(&self, blog: Blog) -> Result<(), StoreError> {
        let remote = self.api.create_blog(&blog);
        self.edit_blogs(
            |mut blogs| {
                blogs.push(blog.clone());
                blogs
            },
            remote,
        )
        .await
    }

    /// Replace the blog with the same slug, or add it if absent.
    pub async fn edit_blog(&self, blog: Blog) -> Result<(), StoreError> {
        let remote = self.api.update_blog(&blog);
        self.edit_blogs(
            |mut blogs| {
                blogs.retain(|b| b.slug != blog.slug);
                blogs.push(blog.clone());
                blogs
            },
            remote,
        )
        .await
    }

    pub async fn delete_blog(&self, slug: &str) -> Result<(), StoreError> {
        let remote = self.api.delete_blog(slug);
        self.edit_blogs(
            |mut blogs| {
                blogs.retain(|b| b.slug != slug);
                blogs
            },
            remote,
        )
        .await
    }

    /// Optimistic list edit: requires a loaded list, shows `Loading` while
    /// `remote` runs, then commits `local` applied to the pre-call list on
    /// success or restores the pre-call list on failure.
    ///
    /// `remote` is lazy and is only polled once the base state checks out.
    async fn edit_blogs<F>(
        &self,
        local: impl FnOnce(Vec<Blog>) -> Vec<Blog>,
        remote: F,
    ) -> Result<(), StoreError>
    where
        F: Future<Output = Result<(), ApiError>>,
    {
        let _flight = self.blogs_flight.lock().await;
        let mut begun = None;
        self.state.send_if_modified(|state| {
            if !state.blogs.is_loaded() {
                warn!(blogs = ?state.blogs.state(), "blog edit without a loaded list");
                return false;
            }
            debug!(blogs = ?LoadState::Loading, "setBlogs");
            if let Loadable::Loaded(blogs) = std::mem::replace(&mut state.blogs, Loadable::Loading) {
                begun = Some((blogs, self.epoch.load(Ordering::SeqCst)));
            }
            true
        });
        let Some((snapshot, epoch)) = begun else {
            return Err(StoreError::InvalidBaseState);
        };

        match remote.await {
            Ok(()) => {
                let next = sort_blogs(local(snapshot));
                self.set_blogs_in_epoch(epoch, Loadable::loaded(next));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "blog edit failed, restoring list");
                self.set_blogs_in_epoch(epoch, Loadable::loaded(snapshot));
                Err(err.into())
            }
        }
    }
}
