use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::info;
use players_core::{NewPlayer, PlayerPatch, PlayerQuery};

use crate::helpers;
use crate::service;
use crate::types::AppState;

/// Lists one page of players matching the optional filters.
///
/// # Returns
/// * `200` with a JSON array of players, sorted by `order` (default `ID`).
/// * `400` when the query string or the paging values are invalid.
/// * `500` on storage failures.
pub(crate) async fn list_players(
    State(state): State<AppState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(err) => return helpers::malformed_request("List players", err),
    };

    match service::list_players(state.repository.as_ref(), &query).await {
        Ok(players) => (StatusCode::OK, Json(players)).into_response(),
        Err(err) => helpers::error_response("List players", err),
    }
}

/// Counts players matching the same filters as [`list_players`], ignoring paging.
pub(crate) async fn count_players(
    State(state): State<AppState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(err) => return helpers::malformed_request("Count players", err),
    };

    match service::count_players(state.repository.as_ref(), &query).await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(err) => helpers::error_response("Count players", err),
    }
}

/// Creates a player from a complete record.
///
/// # Returns
/// * `200` with the stored player, including its new id and derived level.
/// * `400` when a required field is missing or out of range.
/// * `500` on storage failures.
pub(crate) async fn create_player(
    State(state): State<AppState>,
    payload: Result<Json<NewPlayer>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return helpers::malformed_request("Create player", err),
    };

    match service::create_player(state.repository.as_ref(), payload).await {
        Ok(player) => {
            info!(
                "Player created: id={:?}, name={}, race={}, profession={}, level={}",
                player.id, player.name, player.race, player.profession, player.level
            );
            (StatusCode::OK, Json(player)).into_response()
        }
        Err(err) => helpers::error_response("Create player", err),
    }
}

/// Fetches a single player.
///
/// # Returns
/// * `200` with the stored player.
/// * `400` when the id is not a positive integer.
/// * `404` when no player has this id.
/// * `500` on storage failures.
pub(crate) async fn get_player(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match service::get_player(state.repository.as_ref(), &id).await {
        Ok(player) => (StatusCode::OK, Json(player)).into_response(),
        Err(err) => helpers::error_response("Get player", err),
    }
}

/// Updates the fields present in the body.
///
/// # Returns
/// * `200` with the updated player, or the stored one when the body has no fields.
/// * `400` when the id is not a positive integer or a present field is out of range.
/// * `404` when no player has this id.
/// * `500` on storage failures.
pub(crate) async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlayerPatch>, JsonRejection>,
) -> Response {
    let Json(patch) = match payload {
        Ok(patch) => patch,
        Err(err) => return helpers::malformed_request("Update player", err),
    };

    match service::update_player(state.repository.as_ref(), &id, patch).await {
        Ok(player) => {
            info!(
                "Player {} updated: level={}, banned={}",
                id, player.level, player.banned
            );
            (StatusCode::OK, Json(player)).into_response()
        }
        Err(err) => helpers::error_response("Update player", err),
    }
}

/// Removes a player.
///
/// # Returns
/// * `200` with an empty body once the record is gone.
/// * `400` when the id is not a positive integer.
/// * `404` when no player has this id.
/// * `500` on storage failures.
pub(crate) async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match service::delete_player(state.repository.as_ref(), &id).await {
        Ok(()) => {
            info!("Player {} deleted", id);
            StatusCode::OK.into_response()
        }
        Err(err) => helpers::error_response("Delete player", err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app;
    use crate::repository::InMemoryPlayerRepository;
    use crate::types::AppState;

    fn test_app() -> Router {
        app(AppState::new(Arc::new(InMemoryPlayerRepository::new())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn new_player(name: &str, race: &str, experience: i64) -> Value {
        json!({
            "name": name,
            "title": "Wayfarer",
            "race": race,
            "profession": "WARRIOR",
            "birthday": 1_244_505_600_000i64,
            "experience": experience,
        })
    }

    #[tokio::test]
    async fn create_returns_record_with_derived_fields() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/rest/players",
            Some(new_player("Kestrel", "HUMAN", 100)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["level"], 1);
        assert_eq!(body["untilNextLevel"], 200);
        assert_eq!(body["banned"], false);
    }

    #[tokio::test]
    async fn create_rejects_long_name_and_missing_profession() {
        let app = test_app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/rest/players",
            Some(new_player("ThirteenChars", "HUMAN", 0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut body = new_player("Kestrel", "HUMAN", 0);
        body.as_object_mut().unwrap().remove("profession");
        let (status, _) = send(&app, Method::POST, "/rest/players", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_unknown_race_and_bad_json() {
        let app = test_app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/rest/players",
            Some(new_player("Kestrel", "CENTAUR", 0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/rest/players",
            Some(json!({"name": "Kestrel", "experience": "lots"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_reports_bad_and_unknown_ids() {
        let app = test_app();
        send(&app, Method::POST, "/rest/players", Some(new_player("Kestrel", "HUMAN", 0))).await;

        let (status, body) = send(&app, Method::GET, "/rest/players/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Kestrel");

        let (status, _) = send(&app, Method::GET, "/rest/players/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/rest/players/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/rest/players/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_update_returns_record_unchanged() {
        let app = test_app();
        let mut body = new_player("Kestrel", "HUMAN", 100);
        body["banned"] = json!(true);
        let (_, created) = send(&app, Method::POST, "/rest/players", Some(body)).await;

        let (status, updated) = send(&app, Method::POST, "/rest/players/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated, created);
    }

    #[tokio::test]
    async fn update_without_banned_resets_it() {
        let app = test_app();
        let mut body = new_player("Kestrel", "HUMAN", 100);
        body["banned"] = json!(true);
        send(&app, Method::POST, "/rest/players", Some(body)).await;

        let (status, updated) = send(
            &app,
            Method::POST,
            "/rest/players/1",
            Some(json!({"title": "Reformed", "experience": 300})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["banned"], false);
        assert_eq!(updated["title"], "Reformed");
        assert_eq!(updated["level"], 2);
        assert_eq!(updated["untilNextLevel"], 300);
    }

    #[tokio::test]
    async fn update_status_codes() {
        let app = test_app();
        send(&app, Method::POST, "/rest/players", Some(new_player("Kestrel", "HUMAN", 0))).await;

        let (status, _) = send(&app, Method::POST, "/rest/players/x1", Some(json!({"name": "A"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::POST, "/rest/players/5", Some(json!({"name": "A"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            "/rest/players/1",
            Some(json!({"birthday": 946_684_799_999i64})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_status_codes() {
        let app = test_app();
        send(&app, Method::POST, "/rest/players", Some(new_player("Kestrel", "HUMAN", 0))).await;

        let (status, _) = send(&app, Method::DELETE, "/rest/players/999999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/rest/players/-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::DELETE, "/rest/players/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::DELETE, "/rest/players/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, "/rest/players/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_and_count_apply_filters() {
        let app = test_app();
        for (name, race, experience) in [
            ("Aelin", "ELF", 1_500),
            ("Borin", "DWARF", 2_000),
            ("Caelum", "ELF", 5_500),
            ("Daeris", "ELF", 6_600),
            ("Eluned", "ELF", 100),
        ] {
            send(&app, Method::POST, "/rest/players", Some(new_player(name, race, experience))).await;
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/rest/players?race=ELF&minLevel=5&maxLevel=10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Aelin", "Caelum"]);

        let (status, count) = send(
            &app,
            Method::GET,
            "/rest/players/count?race=ELF&minLevel=5&maxLevel=10&pageSize=1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn list_defaults_to_three_per_page_ordered_by_id() {
        let app = test_app();
        for name in ["Aelin", "Borin", "Caelum", "Daeris"] {
            send(&app, Method::POST, "/rest/players", Some(new_player(name, "ELF", 0))).await;
        }

        let (_, first) = send(&app, Method::GET, "/rest/players", None).await;
        let ids: Vec<_> = first.as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);

        let (_, second) = send(&app, Method::GET, "/rest/players?pageNumber=1", None).await;
        assert_eq!(second.as_array().unwrap().len(), 1);

        let (_, by_name) = send(
            &app,
            Method::GET,
            "/rest/players?order=NAME&pageSize=10&name=ae",
            None,
        )
        .await;
        let names: Vec<_> = by_name
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Caelum", "Daeris"]);
    }

    #[tokio::test]
    async fn malformed_query_is_bad_request() {
        let app = test_app();
        let (status, _) = send(&app, Method::GET, "/rest/players?minLevel=high", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/rest/players/count?banned=maybe", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/rest/players?pageSize=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_query_values_are_ignored() {
        let app = test_app();
        for (name, race) in [("Aric", "HUMAN"), ("Bryn", "ELF"), ("Cole", "ORC"), ("Dara", "DWARF")] {
            let (status, _) = send(&app, Method::POST, "/rest/players", Some(new_player(name, race, 100))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            Method::GET,
            "/rest/players?race=&minLevel=&pageNumber=&order=",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body.as_array().unwrap().iter().map(|p| p["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let (status, body) = send(&app, Method::GET, "/rest/players/count?banned=&profession=", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(4));
    }
}
