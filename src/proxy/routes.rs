//! Proxy route table.
//!
//! Each backend route is a static [`ProxyRoute`] plus a thin handler that
//! collects path parameters and the body and hands off to
//! [`ProxyRequest::send`].

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::Method,
    response::Response,
};

use crate::http::server::AppState;
use crate::proxy::forward::ProxyRequest;
use crate::proxy::route::{BodyForward, BodyRule, ProxyRoute, QueryPolicy, RouteMessages};

pub static AUTH_REFRESH: ProxyRoute = ProxyRoute {
    name: "auth.refresh",
    method: Method::POST,
    upstream_path: "/auth/refresh_token",
    query: QueryPolicy::Drop,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions to refresh the session.",
        bad_request: "Cannot refresh token.",
        context: "refreshing token",
    },
};

pub static CALENDAR_EVENTS_LIST: ProxyRoute = ProxyRoute {
    name: "calendar.events.list",
    method: Method::GET,
    upstream_path: "/calendar/events_week",
    query: QueryPolicy::Verbatim,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Calendar on the backend.",
        bad_request: "Invalid calendar request.",
        context: "fetching calendar events",
    },
};

pub static CALENDAR_EVENTS_CREATE: ProxyRoute = ProxyRoute {
    name: "calendar.events.create",
    method: Method::POST,
    upstream_path: "/calendar/events",
    query: QueryPolicy::Drop,
    body: BodyRule::Json {
        required: &["summary", "start", "end"],
        forward: BodyForward::Whole,
    },
    messages: RouteMessages {
        forbidden: "Insufficient permissions to create event. You may need to re-grant access.",
        bad_request: "Invalid event data provided.",
        context: "creating event",
    },
};

pub static DRIVE_LIST: ProxyRoute = ProxyRoute {
    name: "drive.list",
    method: Method::GET,
    upstream_path: "/drive",
    query: QueryPolicy::Verbatim,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Drive on the backend.",
        bad_request: "Invalid Drive request.",
        context: "fetching Drive files",
    },
};

pub static DRIVE_CREATE_DOC: ProxyRoute = ProxyRoute {
    name: "drive.create_doc",
    method: Method::POST,
    upstream_path: "/drive/create_doc",
    query: QueryPolicy::Drop,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions to create Google Doc. You may need to re-grant access.",
        bad_request: "Cannot create document.",
        context: "creating document",
    },
};

pub static MAIL_LABELS: ProxyRoute = ProxyRoute {
    name: "mail.labels",
    method: Method::GET,
    upstream_path: "/gmail/labels",
    query: QueryPolicy::Drop,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Gmail labels on the backend.",
        bad_request: "Invalid labels request.",
        context: "fetching Gmail labels",
    },
};

pub static MAIL_MESSAGES: ProxyRoute = ProxyRoute {
    name: "mail.messages.list",
    method: Method::GET,
    upstream_path: "/gmail/messages",
    query: QueryPolicy::Allow(&["label_ids", "max_results"]),
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Gmail on the backend.",
        bad_request: "Invalid messages request.",
        context: "fetching Gmail messages",
    },
};

pub static MAIL_MESSAGE: ProxyRoute = ProxyRoute {
    name: "mail.messages.get",
    method: Method::GET,
    upstream_path: "/gmail/messages",
    query: QueryPolicy::Drop,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Gmail on the backend.",
        bad_request: "Invalid message request.",
        context: "fetching Gmail message",
    },
};

pub static MAIL_THREADS: ProxyRoute = ProxyRoute {
    name: "mail.threads.list",
    method: Method::GET,
    upstream_path: "/gmail/threads",
    query: QueryPolicy::Verbatim,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Gmail on the backend.",
        bad_request: "Invalid threads request.",
        context: "fetching Gmail threads",
    },
};

pub static MAIL_THREAD: ProxyRoute = ProxyRoute {
    name: "mail.threads.get",
    method: Method::GET,
    upstream_path: "/gmail/threads",
    query: QueryPolicy::Drop,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for Gmail on the backend.",
        bad_request: "Invalid thread request.",
        context: "fetching Gmail thread",
    },
};

pub static MAIL_DRAFTS: ProxyRoute = ProxyRoute {
    name: "mail.drafts.create",
    method: Method::POST,
    upstream_path: "/gmail/drafts",
    query: QueryPolicy::Drop,
    body: BodyRule::Json {
        required: &["to", "subject", "body"],
        forward: BodyForward::Whole,
    },
    messages: RouteMessages {
        forbidden: "Insufficient permissions to create draft. You may need to re-grant access.",
        bad_request: "Invalid draft data.",
        context: "creating draft",
    },
};

pub static MAIL_DRAFT_REPLY: ProxyRoute = ProxyRoute {
    name: "mail.drafts.reply",
    method: Method::POST,
    upstream_path: "/gmail/drafts/reply",
    query: QueryPolicy::Drop,
    body: BodyRule::Json {
        required: &["original_message_id"],
        forward: BodyForward::RequiredOnly,
    },
    messages: RouteMessages {
        forbidden: "Insufficient permissions to create draft. You may need to re-grant access.",
        bad_request: "Invalid reply draft data.",
        context: "creating reply draft",
    },
};

pub static MAIL_DRAFT_BLANK: ProxyRoute = ProxyRoute {
    name: "mail.drafts.create_blank",
    method: Method::POST,
    upstream_path: "/gmail/drafts/create_blank",
    query: QueryPolicy::Drop,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions to create draft. You may need to re-grant access.",
        bad_request: "Cannot create blank draft.",
        context: "creating blank draft",
    },
};

pub static TODOS_LIST: ProxyRoute = ProxyRoute {
    name: "todos.list",
    method: Method::GET,
    upstream_path: "/todos",
    query: QueryPolicy::Verbatim,
    body: BodyRule::None,
    messages: RouteMessages {
        forbidden: "Insufficient permissions for todos on the backend.",
        bad_request: "Invalid todos request.",
        context: "fetching todos",
    },
};

pub static TODOS_CREATE: ProxyRoute = ProxyRoute {
    name: "todos.create",
    method: Method::POST,
    upstream_path: "/todos",
    query: QueryPolicy::Drop,
    body: BodyRule::Json {
        required: &[],
        forward: BodyForward::Whole,
    },
    messages: RouteMessages {
        forbidden: "Insufficient permissions to create todo.",
        bad_request: "Invalid todo data.",
        context: "creating todo",
    },
};

/// Every proxied route, for diagnostics and tests.
pub static ALL_ROUTES: [&ProxyRoute; 15] = [
    &AUTH_REFRESH,
    &CALENDAR_EVENTS_LIST,
    &CALENDAR_EVENTS_CREATE,
    &DRIVE_LIST,
    &DRIVE_CREATE_DOC,
    &MAIL_LABELS,
    &MAIL_MESSAGES,
    &MAIL_MESSAGE,
    &MAIL_THREADS,
    &MAIL_THREAD,
    &MAIL_DRAFTS,
    &MAIL_DRAFT_REPLY,
    &MAIL_DRAFT_BLANK,
    &TODOS_LIST,
    &TODOS_CREATE,
];

pub async fn refresh_token(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &AUTH_REFRESH).await
}

pub async fn list_calendar_events(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &CALENDAR_EVENTS_LIST).await
}

pub async fn create_calendar_event(
    State(state): State<AppState>,
    request: ProxyRequest,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    request.body(body).send(&state, &CALENDAR_EVENTS_CREATE).await
}

pub async fn list_drive(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &DRIVE_LIST).await
}

pub async fn create_drive_doc(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &DRIVE_CREATE_DOC).await
}

pub async fn list_labels(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &MAIL_LABELS).await
}

pub async fn list_messages(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &MAIL_MESSAGES).await
}

pub async fn get_message(
    State(state): State<AppState>,
    request: ProxyRequest,
    Path(message_id): Path<String>,
) -> Response {
    request.segment(message_id).send(&state, &MAIL_MESSAGE).await
}

pub async fn list_threads(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &MAIL_THREADS).await
}

pub async fn get_thread(
    State(state): State<AppState>,
    request: ProxyRequest,
    Path(thread_id): Path<String>,
) -> Response {
    request.segment(thread_id).send(&state, &MAIL_THREAD).await
}

pub async fn create_draft(
    State(state): State<AppState>,
    request: ProxyRequest,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    request.body(body).send(&state, &MAIL_DRAFTS).await
}

pub async fn create_reply_draft(
    State(state): State<AppState>,
    request: ProxyRequest,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    request.body(body).send(&state, &MAIL_DRAFT_REPLY).await
}

pub async fn create_blank_draft(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &MAIL_DRAFT_BLANK).await
}

pub async fn list_todos(State(state): State<AppState>, request: ProxyRequest) -> Response {
    request.send(&state, &TODOS_LIST).await
}

pub async fn create_todo(
    State(state): State<AppState>,
    request: ProxyRequest,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    request.body(body).send(&state, &TODOS_CREATE).await
}
