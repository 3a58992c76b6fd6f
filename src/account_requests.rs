//! JSON endpoints over [`CredentialStore`].
//!
//! Store calls are synchronous, so every handler runs its call on the
//! blocking thread pool.

use actix_web::http::StatusCode;
use actix_web::web::{self, block, Data, Json};
use actix_web::{post, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialStore;
use crate::error::StoreError;

#[derive(Serialize, Deserialize)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct ExistsParams {
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
struct Created {
    status: &'static str,
}

#[derive(Serialize)]
struct LoginOutcome {
    authenticated: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::DuplicateUsername | StoreError::DuplicateEmail => StatusCode::CONFLICT,
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::IncompatibleSchema { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs.
        let message = match self {
            StoreError::DuplicateUsername | StoreError::DuplicateEmail => self.to_string(),
            _ => "credential storage is unavailable".to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message,
            },
        })
    }
}

async fn run<T, F>(store: Data<CredentialStore>, op: F) -> Result<T, StoreError>
where
    F: FnOnce(&CredentialStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    block(move || op(store.get_ref()))
        .await
        .map_err(StoreError::unavailable)?
}

#[post("/acc_create")]
pub async fn create_account(
    store: Data<CredentialStore>,
    params: Json<RegisterParams>,
) -> Result<HttpResponse, StoreError> {
    let params = params.into_inner();
    run(store, move |store| {
        store.register(&params.username, &params.email, &params.password)
    })
    .await?;
    Ok(HttpResponse::Created().json(Created { status: "created" }))
}

#[post("/login_request")]
pub async fn login_request(
    store: Data<CredentialStore>,
    params: Json<LoginParams>,
) -> Result<HttpResponse, StoreError> {
    let params = params.into_inner();
    let authenticated = run(store, move |store| {
        store.authenticate(&params.username, &params.password)
    })
    .await?;

    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    Ok(HttpResponse::build(status).json(LoginOutcome { authenticated }))
}

#[post("/acc_exists")]
pub async fn account_exists(
    store: Data<CredentialStore>,
    params: Json<ExistsParams>,
) -> Result<HttpResponse, StoreError> {
    let params = params.into_inner();
    let availability = run(store, move |store| store.exists(&params.username, &params.email)).await?;
    Ok(HttpResponse::Ok().json(availability))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_account)
        .service(login_request)
        .service(account_exists);
}
