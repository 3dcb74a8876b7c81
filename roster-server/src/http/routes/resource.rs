//! Generic CRUD endpoints, mounted once per [`Resource`]
//!
//! | Method | Path                | Success                  |
//! |--------|---------------------|--------------------------|
//! | POST   | /{collection}       | 201 + record             |
//! | GET    | /{collection}       | 200 + `{meta, data}`     |
//! | GET    | /{collection}/{id}  | 200 + record with Course |
//! | PUT    | /{collection}/{id}  | 200 + updated record     |
//! | DELETE | /{collection}/{id}  | 200 + `{message}`        |

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::Repository;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, QueryPairs, ValidId};
use crate::models::{Envelope, ListParams, ListQuery, PageMeta, Resource, WithCourses};

type Repo<E> = Arc<dyn Repository<E>>;

/// Delete confirmation body
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// POST /{collection}
async fn create<E: Resource>(
    State(repo): State<Repo<E>>,
    JsonBody(input): JsonBody<E::Create>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    E::validate_create(&input)?;
    let record = repo.create(input).await?;

    tracing::info!(entity = E::NAME, id = record.id(), "created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /{collection}?page&limit&sortBy&order&populate
async fn list<E: Resource>(
    State(repo): State<Repo<E>>,
    QueryPairs(pairs): QueryPairs,
) -> Result<Json<Envelope<WithCourses<E>>>, ApiError> {
    let query = ListQuery::try_from(ListParams::from_pairs(pairs))?;
    tracing::debug!(entity = E::NAME, ?query, "list");

    let total = repo.count().await?;
    let data = repo.find_all(&query).await?;

    Ok(Json(Envelope {
        meta: PageMeta::new(&query, total),
        data,
    }))
}

/// GET /{collection}/{id} - Course is always joined
async fn get_one<E: Resource>(
    State(repo): State<Repo<E>>,
    ValidId(id): ValidId,
) -> Result<Json<WithCourses<E>>, ApiError> {
    let record = repo
        .find_by_pk(id, true)
        .await?
        .ok_or(ApiError::NotFound {
            resource: E::NAME,
            id,
        })?;

    Ok(Json(record))
}

/// PUT /{collection}/{id} - partial update
async fn update<E: Resource>(
    State(repo): State<Repo<E>>,
    ValidId(id): ValidId,
    JsonBody(patch): JsonBody<E::Patch>,
) -> Result<Json<E>, ApiError> {
    let not_found = || ApiError::NotFound {
        resource: E::NAME,
        id,
    };

    if repo.find_by_pk(id, false).await?.is_none() {
        return Err(not_found());
    }
    E::validate_patch(&patch)?;

    // Row can vanish between lookup and write
    let record = repo.update(id, patch).await?.ok_or_else(not_found)?;

    tracing::info!(entity = E::NAME, id, "updated");
    Ok(Json(record))
}

/// DELETE /{collection}/{id}
async fn remove<E: Resource>(
    State(repo): State<Repo<E>>,
    ValidId(id): ValidId,
) -> Result<Json<DeletedResponse>, ApiError> {
    let not_found = || ApiError::NotFound {
        resource: E::NAME,
        id,
    };

    if repo.find_by_pk(id, false).await?.is_none() {
        return Err(not_found());
    }
    if !repo.destroy(id).await? {
        return Err(not_found());
    }

    tracing::info!(entity = E::NAME, id, "deleted");
    Ok(Json(DeletedResponse {
        message: format!("{} deleted successfully", E::NAME),
    }))
}

/// Routes for one resource, with its repository as state
pub fn router<E: Resource>(repo: Repo<E>) -> Router {
    let collection = format!("/{}", E::COLLECTION);
    let member = format!("/{}/{{id}}", E::COLLECTION);

    Router::new()
        .route(&collection, get(list::<E>).post(create::<E>))
        .route(
            &member,
            get(get_one::<E>).put(update::<E>).delete(remove::<E>),
        )
        .with_state(repo)
}
