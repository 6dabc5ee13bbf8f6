use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const AUTH_COOKIE: &str = "auth";

const ERR_REQUIRE_AUTHENTICATION: &str = "This method requires authentication";
const ERR_INVALID_PARAMETER: &str = "Invalid parameters";
const ERR_USER_EXISTS: &str = "User already exists";
const ERR_USER_MISSING: &str = "User does not exist";
const ERR_USERNAME_EMPTY: &str = "Username cannot be empty";
const ERR_PASSWORD_EMPTY: &str = "Password cannot be empty";
const ERR_BLOG_EXISTS: &str = "A blog with this slug already exists";
const ERR_BLOG_MISSING: &str = "Blog does not exist";
const ERR_SLUG_EMPTY: &str = "Blog slug cannot be empty";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Blog {
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SlugArgs {
    #[serde(default)]
    slug: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RpcCall {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcReply {
    pub id: Value,
    pub result: Value,
    pub error: Value,
}

struct Account {
    password: String,
    display_name: Option<String>,
    blogs: BTreeMap<String, Blog>,
}

/// Accounts keyed by username, sessions keyed by session id.
#[derive(Default)]
pub struct Backend {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Backend::default()));
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/", post(rpc))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Value of the `auth` cookie, if the request carries one.
fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.to_string())
}

async fn login(State(db): State<Db>, Form(form): Form<LoginForm>) -> Response {
    let mut backend = db.write().await;
    let authenticated = backend
        .accounts
        .get(&form.username)
        .is_some_and(|a| a.password == form.password);
    if !authenticated {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let sid = Uuid::new_v4().to_string();
    backend.sessions.insert(sid.clone(), form.username.clone());
    info!(username = %form.username, session = %sid, "created session");

    let cookie = format!("{AUTH_COOKIE}={sid}; Path=/; HttpOnly");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => (StatusCode::OK, [(header::SET_COOKIE, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(sid) = session_id(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let Some(username) = db.write().await.sessions.remove(&sid) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    info!(%username, session = %sid, "destroyed session");

    let reset = HeaderValue::from_static("auth=; Path=/; HttpOnly; Max-Age=0");
    (StatusCode::OK, [(header::SET_COOKIE, reset)]).into_response()
}

async fn rpc(State(db): State<Db>, headers: HeaderMap, Json(call): Json<RpcCall>) -> Json<RpcReply> {
    let mut backend = db.write().await;
    let username = session_id(&headers).and_then(|sid| backend.sessions.get(&sid).cloned());
    let param = call.params.into_iter().next().unwrap_or(Value::Null);

    let reply = match backend.dispatch(username.as_deref(), &call.method, param) {
        Ok(result) => RpcReply {
            id: call.id,
            result,
            error: Value::Null,
        },
        Err(message) => RpcReply {
            id: call.id,
            result: Value::Null,
            error: Value::String(message),
        },
    };
    Json(reply)
}

fn decode<T: serde::de::DeserializeOwned>(param: Value) -> Result<T, String> {
    if param.is_null() {
        return Err(ERR_INVALID_PARAMETER.to_string());
    }
    serde_json::from_value(param).map_err(|_| ERR_INVALID_PARAMETER.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

impl Backend {
    pub fn dispatch(&mut self, session: Option<&str>, method: &str, param: Value) -> Result<Value, String> {
        match method {
            "Users.Create" => self.create_user(decode(param)?).map(|()| serde_json::json!({})),
            "Users.Whoami" => {
                let user = self.whoami(session)?;
                encode(&user)
            }
            "Blogs.List" => {
                let blogs = self.list_blogs(session)?;
                // An account without blogs lists as null.
                if blogs.is_empty() {
                    Ok(Value::Null)
                } else {
                    encode(&blogs)
                }
            }
            "Blogs.Create" => self.create_blog(session, decode(param)?).map(|()| serde_json::json!({})),
            "Blogs.Update" => self.update_blog(session, decode(param)?).map(|()| serde_json::json!({})),
            "Blogs.Delete" => {
                let args: SlugArgs = decode(param)?;
                self.delete_blog(session, &args.slug).map(|()| serde_json::json!({}))
            }
            other => Err(format!("rpc: can't find method \"{other}\"")),
        }
    }

    fn create_user(&mut self, user: NewUser) -> Result<(), String> {
        if user.username.is_empty() {
            return Err(ERR_USERNAME_EMPTY.to_string());
        }
        if user.password.is_empty() {
            return Err(ERR_PASSWORD_EMPTY.to_string());
        }
        if self.accounts.contains_key(&user.username) {
            return Err(ERR_USER_EXISTS.to_string());
        }
        info!(username = %user.username, "created user");
        self.accounts.insert(
            user.username,
            Account {
                password: user.password,
                display_name: user.display_name,
                blogs: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn whoami(&self, session: Option<&str>) -> Result<User, String> {
        let username = session.ok_or(ERR_REQUIRE_AUTHENTICATION)?;
        let account = self.accounts.get(username).ok_or(ERR_USER_MISSING)?;
        Ok(User {
            username: username.to_string(),
            display_name: account.display_name.clone(),
        })
    }

    fn account_mut<'s>(&mut self, session: Option<&'s str>) -> Result<(&'s str, &mut Account), String> {
        let username = session.ok_or(ERR_REQUIRE_AUTHENTICATION)?;
        let account = self.accounts.get_mut(username).ok_or(ERR_USER_MISSING)?;
        Ok((username, account))
    }

    fn list_blogs(&mut self, session: Option<&str>) -> Result<Vec<Blog>, String> {
        let (_, account) = self.account_mut(session)?;
        Ok(account.blogs.values().cloned().collect())
    }

    fn create_blog(&mut self, session: Option<&str>, blog: Blog) -> Result<(), String> {
        if blog.slug.is_empty() {
            return Err(ERR_SLUG_EMPTY.to_string());
        }
        let (username, account) = self.account_mut(session)?;
        if account.blogs.contains_key(&blog.slug) {
            return Err(ERR_BLOG_EXISTS.to_string());
        }
        info!(%username, slug = %blog.slug, "added blog");
        account.blogs.insert(blog.slug.clone(), blog);
        Ok(())
    }

    /// Upsert keyed by slug.
    fn update_blog(&mut self, session: Option<&str>, blog: Blog) -> Result<(), String> {
        if blog.slug.is_empty() {
            return Err(ERR_SLUG_EMPTY.to_string());
        }
        let (username, account) = self.account_mut(session)?;
        info!(%username, slug = %blog.slug, "updated blog");
        account.blogs.insert(blog.slug.clone(), blog);
        Ok(())
    }

    fn delete_blog(&mut self, session: Option<&str>, slug: &str) -> Result<(), String> {
        let (username, account) = self.account_mut(session)?;
        if account.blogs.remove(slug).is_none() {
            return Err(ERR_BLOG_MISSING.to_string());
        }
        info!(%username, %slug, "deleted blog");
        Ok(())
    }
}
