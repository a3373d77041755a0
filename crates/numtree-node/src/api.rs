//! HTTP API for numtree.
//!
//! Thin transport over the ledger: shape and range checks on the way in, a
//! `{ success, message, data }` envelope on the way out. Writes are attributed
//! to the author named in the `x-author-id` header, which the identity
//! gateway in front of this daemon sets after authenticating the caller.

use crate::node::NodeState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use numtree_ledger::views::{MAX_REPLIES_LIMIT, MAX_ROOTS_LIMIT, MAX_TREE_LIMIT};
use numtree_ledger::{AuthorId, NewReply, NewRoot, NodeId, NodeView, RepliesPage, RootPage, TreePage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

type AppState = Arc<NodeState>;

/// Header carrying the authenticated author id.
pub const AUTHOR_HEADER: &str = "x-author-id";

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Writes
        .route("/api/v1/tree/add-node", post(add_node))
        .route("/api/v1/tree/reply-to-node", post(reply_to_node))
        // Views
        .route("/api/v1/tree/get-roots", get(get_roots))
        .route("/api/v1/tree/get-full-tree/:root_id", get(get_full_tree))
        .route("/api/v1/tree/get-replies/:parent_id", get(get_replies))
        .route("/api/v1/tree/nodes/:id", get(get_node))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// --- Envelope ---

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

/// A failed request, rendered as an envelope with `success: false`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<numtree_ledger::Error> for ApiError {
    fn from(e: numtree_ledger::Error) -> Self {
        use numtree_ledger::Error as E;

        let status = match &e {
            E::InvalidInput(_) | E::InvalidId(_) | E::DivisionByZero | E::UnsupportedOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            E::ParentNotFound(_) => StatusCode::NOT_FOUND,
            E::Storage(_) | E::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if e.is_store_failure() {
            tracing::error!("Ledger store failure: {}", e);
            Self::new(status, "Internal storage error")
        } else {
            tracing::debug!("Rejected request: {}", e);
            Self::new(status, e.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            message: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Resolve the authenticated author from request headers.
fn author_from(headers: &HeaderMap) -> Result<AuthorId, ApiError> {
    headers
        .get(AUTHOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| AuthorId::new(v.trim()).ok())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

fn page_limit(requested: Option<usize>, default: usize, max: usize) -> Result<usize, ApiError> {
    match requested {
        None => Ok(default.clamp(1, max)),
        Some(limit) if (1..=max).contains(&limit) => Ok(limit),
        Some(_) => Err(ApiError::bad_request(format!(
            "limit must be an integer between 1 and {}",
            max
        ))),
    }
}

fn id_cursor(cursor: Option<&str>) -> Result<Option<NodeId>, ApiError> {
    cursor
        .map(|c| c.parse().map_err(|_| ApiError::bad_request("cursor must be a valid node id")))
        .transpose()
}

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

async fn ready() -> &'static str {
    "OK"
}

// --- Write endpoints ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddNodeRequest {
    parent_id: Option<String>,
    operation: Option<String>,
    right_value: Option<f64>,
    initial_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest {
    parent_id: String,
    operation: String,
    right_value: f64,
}

/// Create a root, or a reply when `parentId` is present.
async fn add_node(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AddNodeRequest>, JsonRejection>,
) -> Created<NodeView> {
    let author_id = author_from(&headers)?;
    let Json(req) = payload?;

    let node = match req.parent_id {
        Some(parent_id) => state.ledger.create_reply(NewReply {
            author_id,
            parent_id,
            operation: req.operation,
            right_value: req.right_value,
        })?,
        None => {
            let initial_value = req.initial_value.ok_or_else(|| {
                ApiError::bad_request("initialValue is required when creating a root node")
            })?;
            state.ledger.create_root(NewRoot {
                author_id,
                initial_value,
            })?
        }
    };

    tracing::info!(id = %node.id, root_id = %node.root_id, "Created node");
    let view = state.ledger.view(node)?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Node created successfully", view)))
}

async fn reply_to_node(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> Created<NodeView> {
    let author_id = author_from(&headers)?;
    let Json(req) = payload?;

    let node = state.ledger.create_reply(NewReply {
        author_id,
        parent_id: req.parent_id,
        operation: Some(req.operation),
        right_value: Some(req.right_value),
    })?;

    tracing::info!(id = %node.id, root_id = %node.root_id, "Created reply");
    let view = state.ledger.view(node)?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Reply created successfully", view)))
}

// --- View endpoints ---

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    cursor: Option<String>,
    limit: Option<usize>,
}

async fn get_roots(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<RootPage> {
    let Query(query) = query?;
    let limit = page_limit(query.limit, state.config.page_defaults.roots, MAX_ROOTS_LIMIT)?;
    let cursor = query
        .cursor
        .as_deref()
        .map(|c| {
            DateTime::parse_from_rfc3339(c)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|_| ApiError::bad_request("cursor must be a valid ISO 8601 date"))
        })
        .transpose()?;

    let page = state.ledger.list_roots(cursor, limit)?;
    Ok(ApiResponse::ok("Root nodes fetched successfully", page))
}

async fn get_full_tree(
    State(state): State<AppState>,
    Path(root_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<TreePage> {
    let Query(query) = query?;
    let limit = page_limit(query.limit, state.config.page_defaults.tree, MAX_TREE_LIMIT)?;
    let cursor = id_cursor(query.cursor.as_deref())?;

    let page = state.ledger.list_tree(&root_id, cursor, limit)?;
    let message = if page.root_node.is_none() && page.nodes.is_empty() {
        "No more nodes"
    } else {
        "Nodes fetched successfully"
    };
    Ok(ApiResponse::ok(message, page))
}

async fn get_replies(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<RepliesPage> {
    let Query(query) = query?;
    let limit = page_limit(query.limit, state.config.page_defaults.replies, MAX_REPLIES_LIMIT)?;
    let cursor = id_cursor(query.cursor.as_deref())?;

    let page = state.ledger.list_replies(&parent_id, cursor, limit)?;
    let message = if page.replies.is_empty() {
        "No more replies"
    } else {
        "Replies fetched successfully"
    };
    Ok(ApiResponse::ok(message, page))
}

async fn get_node(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<NodeView> {
    match state.ledger.node(&id)? {
        Some(node) => Ok(ApiResponse::ok("Node fetched successfully", node)),
        None => Err(ApiError::new(StatusCode::NOT_FOUND, format!("Node not found: {}", id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use axum::http::HeaderValue;
    use numtree_ledger::{Author, Ledger, LedgerStore, MemoryStore};

    fn state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        store
            .put_author(&Author::new(AuthorId::new("u1").unwrap(), "User One"))
            .unwrap();
        Arc::new(NodeState {
            ledger: Ledger::new(store),
            config: NodeConfig::default(),
        })
    }

    fn as_author(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHOR_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    fn body(
        parent_id: Option<&str>,
        operation: Option<&str>,
        right_value: Option<f64>,
        initial_value: Option<f64>,
    ) -> Result<Json<AddNodeRequest>, JsonRejection> {
        Ok(Json(AddNodeRequest {
            parent_id: parent_id.map(String::from),
            operation: operation.map(String::from),
            right_value,
            initial_value,
        }))
    }

    fn page(cursor: Option<String>, limit: Option<usize>) -> Result<Query<PageQuery>, QueryRejection> {
        Ok(Query(PageQuery { cursor, limit }))
    }

    async fn create_root(state: &AppState, value: f64) -> NodeView {
        let (status, Json(resp)) = add_node(State(state.clone()), as_author("u1"), body(None, None, None, Some(value)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        resp.data.unwrap()
    }

    #[tokio::test]
    async fn root_then_reply() {
        let state = state();
        let root = create_root(&state, 10.0).await;
        assert_eq!(root.author.name.as_deref(), Some("User One"));
        let root_id = root.id.to_string();

        let (_, Json(resp)) = add_node(
            State(state.clone()),
            as_author("u2"),
            body(Some(root_id.as_str()), Some("+"), Some(5.0), None),
        )
        .await
        .unwrap();
        let child = resp.data.unwrap();
        assert_eq!(child.left_value, Some(10.0));
        assert_eq!(child.result, 15.0);
        assert_eq!(child.author.id.as_str(), "u2");
        assert_eq!(child.author.name, None);

        let (_, Json(resp)) = reply_to_node(
            State(state.clone()),
            as_author("u2"),
            Ok(Json(ReplyRequest {
                parent_id: root_id,
                operation: "*".into(),
                right_value: 2.0,
            })),
        )
        .await
        .unwrap();
        assert_eq!(resp.data.unwrap().result, 20.0);
    }

    #[tokio::test]
    async fn writes_require_identity() {
        let state = state();
        let err = add_node(State(state), HeaderMap::new(), body(None, None, None, Some(1.0)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn domain_errors_map_to_status_codes() {
        let state = state();
        let root = create_root(&state, 1.0).await;
        let root_id = root.id.to_string();

        let cases = [
            (body(Some(root_id.as_str()), Some("/"), Some(0.0), None), StatusCode::BAD_REQUEST),
            (body(Some(root_id.as_str()), Some("^"), Some(1.0), None), StatusCode::BAD_REQUEST),
            (body(Some(root_id.as_str()), None, Some(1.0), None), StatusCode::BAD_REQUEST),
            (body(Some("bogus"), Some("+"), Some(1.0), None), StatusCode::BAD_REQUEST),
            (body(Some("00000000000003e7"), Some("+"), Some(1.0), None), StatusCode::NOT_FOUND),
            (body(None, None, None, None), StatusCode::BAD_REQUEST),
        ];
        for (req, expected) in cases {
            let err = add_node(State(state.clone()), as_author("u1"), req).await.unwrap_err();
            assert_eq!(err.status(), expected);
        }
    }

    #[tokio::test]
    async fn roots_page_joins_author_name() {
        let state = state();
        create_root(&state, 1.0).await;
        create_root(&state, 2.0).await;

        let Json(resp) = get_roots(State(state.clone()), page(None, Some(1))).await.unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.roots.len(), 1);
        assert_eq!(data.roots[0].node.author.name.as_deref(), Some("User One"));
        assert!(data.pagination.has_next_page);

        let cursor = data.pagination.next_cursor.unwrap().to_rfc3339();
        let Json(resp) = get_roots(State(state), page(Some(cursor), Some(1))).await.unwrap();
        assert!(!resp.data.unwrap().pagination.has_next_page);
    }

    #[tokio::test]
    async fn query_validation() {
        let state = state();
        let err = get_roots(State(state.clone()), page(Some("yesterday".into()), None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = get_roots(State(state.clone()), page(None, Some(101))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let root = create_root(&state, 1.0).await;
        let err = get_full_tree(State(state.clone()), Path(root.id.to_string()), page(None, Some(2001)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = get_replies(State(state), Path(root.id.to_string()), page(Some("x".into()), None))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tree_and_replies() {
        let state = state();
        let root = create_root(&state, 3.0).await;
        let root_id = root.id.to_string();
        for op in ["+", "-"] {
            add_node(
                State(state.clone()),
                as_author("u1"),
                body(Some(root_id.as_str()), Some(op), Some(1.0), None),
            )
            .await
            .unwrap();
        }

        let Json(resp) = get_full_tree(State(state.clone()), Path(root_id.clone()), page(None, None))
            .await
            .unwrap();
        let tree = resp.data.unwrap();
        assert_eq!(tree.root_node.unwrap().result, 3.0);
        assert_eq!(tree.count, 2);

        let Json(resp) = get_replies(State(state.clone()), Path(root_id.clone()), page(None, None))
            .await
            .unwrap();
        let replies = resp.data.unwrap();
        assert_eq!(replies.total_replies, 2);
        assert_eq!(replies.replies[0].result, 4.0);
        assert_eq!(replies.replies[1].result, 2.0);

        let leaf = replies.replies[0].id.to_string();
        let Json(resp) = get_replies(State(state.clone()), Path(leaf.clone()), page(None, None))
            .await
            .unwrap();
        assert_eq!(resp.message, "No more replies");
        assert!(!resp.data.unwrap().has_more);

        let Json(resp) = get_node(State(state.clone()), Path(leaf)).await.unwrap();
        assert_eq!(resp.data.unwrap().parent_id, Some(root.id));

        let err = get_node(State(state), Path("00000000000003e7".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_envelope_shape() {
        let response = ApiError::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
