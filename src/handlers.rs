use crate::date_key::{is_supported, parse_date, resolve_key, resolve_label, MIN_SUPPORTED_DATE};
use crate::errors::AppError;
use crate::lookup::fetch_event;
use crate::models::{DayResponse, ViewCounter};
use crate::state::AppState;
use crate::store::{CounterStore, VIEW_COUNTER_PATH};
use crate::ui::render_index;
use crate::view::{ViewError, ViewState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html,
    },
    Json,
};
use chrono::{Local, NaiveDate};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub date: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let today = today();
    let date = match query.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => today.max(MIN_SUPPORTED_DATE),
    };

    let mut view = ViewState::new(today);
    let ticket = view.select_date(date)?;
    let result = fetch_event(state.store.as_ref(), &ticket.key).await;
    view.lookup_completed(ticket.seq, result);

    match state.store.counter(VIEW_COUNTER_PATH).await {
        Ok(counter) => view.counter_updated(counter.count),
        Err(err) => warn!("failed to read view counter: {err}"),
    }

    Ok(Html(render_index(&view)))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayResponse>, AppError> {
    let date = parse_date(&date)?;
    if !is_supported(date) {
        return Err(ViewError::BeforeMinimum {
            date,
            minimum: MIN_SUPPORTED_DATE,
        }
        .into());
    }

    let key = resolve_key(date);
    info!(%date, %key, "fetching events");
    let event = fetch_event(state.store.as_ref(), &key).await.into_event();

    Ok(Json(DayResponse {
        date: date.to_string(),
        key,
        label: resolve_label(date),
        event,
    }))
}

pub async fn record_view(State(state): State<AppState>) -> StatusCode {
    if let Err(err) = state.store.increment(VIEW_COUNTER_PATH).await {
        warn!("failed to record page view: {err}");
    }
    StatusCode::ACCEPTED
}

pub async fn get_views(State(state): State<AppState>) -> Result<Json<ViewCounter>, AppError> {
    Ok(Json(state.store.counter(VIEW_COUNTER_PATH).await?))
}

pub async fn views_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut receiver = state.store.subscribe(VIEW_COUNTER_PATH).await?;

    let stream = async_stream::stream! {
        loop {
            let counter = *receiver.borrow_and_update();
            let event = Event::default()
                .event("count")
                .data(serde_json::to_string(&counter).unwrap_or_default());
            yield Ok(event);

            if receiver.changed().await.is_err() {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
