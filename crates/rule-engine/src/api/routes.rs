//! 路由配置模块

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::{handlers, state::AppState};

/// 构建规则相关的路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/create_rule", post(handlers::create_rule))
        .route("/combine_rules", post(handlers::combine_rules))
        .route("/evaluate_rule", post(handlers::evaluate_rule))
        .route("/rules", get(handlers::list_rules))
        .route(
            "/rules/{id}",
            get(handlers::get_rule).delete(handlers::delete_rule),
        )
        .route("/rules/{id}/evaluate", post(handlers::evaluate_stored_rule))
        .route("/health", get(handlers::health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::store::MockRuleRepository;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        api_routes().with_state(AppState::in_memory())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_rule() {
        let app = create_test_app();

        let response = app
            .oneshot(post_json(
                "/create_rule",
                json!({"rule_string": "age > 30 AND department = 'Sales'"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Rule created");
        assert_eq!(body["ast"]["type"], "operator");
        assert_eq!(body["ast"]["value"], "AND");
        assert_eq!(body["ast"]["left"]["value"]["condition"], "age");
        assert_eq!(body["ast"]["left"]["value"]["value"], 30);
        assert_eq!(body["ast"]["right"]["value"]["value"], "Sales");
    }

    #[tokio::test]
    async fn test_create_rule_malformed() {
        let app = create_test_app();

        let response = app
            .oneshot(post_json("/create_rule", json!({"rule_string": "age >"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MALFORMED_RULE");
    }

    #[tokio::test]
    async fn test_create_rule_empty_string() {
        let app = create_test_app();

        let response = app
            .oneshot(post_json("/create_rule", json!({"rule_string": ""})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_then_fetch_and_evaluate() {
        let state = AppState::in_memory();

        let response = api_routes()
            .with_state(state.clone())
            .oneshot(post_json("/create_rule", json!({"rule_string": "age > 30"})))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = api_routes()
            .with_state(state.clone())
            .oneshot(get(&format!("/rules/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["rule_string"], "age > 30");

        let response = api_routes()
            .with_state(state.clone())
            .oneshot(post_json(
                &format!("/rules/{}/evaluate", id),
                json!({"data": {"age": 35}, "trace": true}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["matched"], true);
        assert_eq!(body["rule_id"], id.as_str());
        assert_eq!(body["evaluation_trace"].as_array().unwrap().len(), 1);

        let response = api_routes()
            .with_state(state.clone())
            .oneshot(get("/rules"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["total"], 1);

        let response = api_routes()
            .with_state(state.clone())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/rules/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = api_routes()
            .with_state(state)
            .oneshot(get(&format!("/rules/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_combine_rules() {
        let app = create_test_app();

        let response = app
            .oneshot(post_json(
                "/combine_rules",
                json!({"rules": ["age > 30", "salary > 50000", "experience > 5"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Combined rules");
        assert_eq!(body["ast"]["value"], "AND");
        assert_eq!(body["ast"]["left"]["value"]["condition"], "age");
        assert_eq!(body["ast"]["right"]["value"]["condition"], "experience");
    }

    #[tokio::test]
    async fn test_combine_no_rules_returns_null() {
        let app = create_test_app();

        let response = app
            .oneshot(post_json("/combine_rules", json!({"rules": ["", ""]})))
            .await
            .unwrap();

        assert_eq!(body_json(response).await["ast"], Value::Null);
    }

    #[tokio::test]
    async fn test_evaluate_rule() {
        let ast = crate::parse_rule_to_ast("(age > 30 OR age < 10) AND gender = 'Male'")
            .unwrap()
            .to_document()
            .unwrap();

        let response = create_test_app()
            .oneshot(post_json(
                "/evaluate_rule",
                json!({"ast": ast, "data": {"age": 5, "gender": "Male"}}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["result"], true);

        let response = create_test_app()
            .oneshot(post_json(
                "/evaluate_rule",
                json!({"ast": ast, "data": {"age": 20, "gender": "Male"}}),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["result"], false);
    }

    #[tokio::test]
    async fn test_evaluate_null_and_unknown_ast() {
        let response = create_test_app()
            .oneshot(post_json("/evaluate_rule", json!({"ast": null, "data": {}})))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["result"], true);

        let response = create_test_app()
            .oneshot(post_json(
                "/evaluate_rule",
                json!({"ast": {"type": "mystery"}, "data": {"age": 1}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], false);
    }

    async fn evaluate(ast: Value, data: Value) -> Response {
        create_test_app()
            .oneshot(post_json("/evaluate_rule", json!({"ast": ast, "data": data})))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_partially_unknown_ast() {
        let age = crate::parse_rule_to_ast("age > 30")
            .unwrap()
            .to_document()
            .unwrap();

        let ast = json!({"type": "operator", "value": "OR", "left": age, "right": {"type": "mystery"}});
        let response = evaluate(ast, json!({"age": 35})).await;
        assert_eq!(body_json(response).await["result"], true);

        let ast = json!({"type": "operator", "value": "AND", "left": age, "right": null});
        let response = evaluate(ast.clone(), json!({"age": 35})).await;
        assert_eq!(body_json(response).await["result"], true);
        let response = evaluate(ast, json!({"age": 20})).await;
        assert_eq!(body_json(response).await["result"], false);
    }

    #[tokio::test]
    async fn test_evaluate_with_bool_and_null_data() {
        let ast = crate::parse_rule_to_ast("active = 1 AND manager != 'x'")
            .unwrap()
            .to_document()
            .unwrap();

        let response = evaluate(ast, json!({"active": true, "manager": null})).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], true);
    }

    #[tokio::test]
    async fn test_evaluate_rejects_nested_data_values() {
        let ast = crate::parse_rule_to_ast("age > 30")
            .unwrap()
            .to_document()
            .unwrap();

        // 记录字段只接受 JSON 标量
        let response = evaluate(ast, json!({"age": [35]})).await;
        assert!(response.status().is_client_error());
    }

    fn chain(n: usize) -> String {
        (0..n)
            .map(|i| format!("f{} >= {}", i, i))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    #[tokio::test]
    async fn test_created_ast_can_be_evaluated_at_depth_limit() {
        let response = create_test_app()
            .oneshot(post_json(
                "/create_rule",
                json!({"rule_string": chain(crate::MAX_RULE_DEPTH)}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let ast = body_json(response).await["ast"].clone();

        let data: serde_json::Map<String, Value> = (0..crate::MAX_RULE_DEPTH)
            .map(|i| (format!("f{}", i), json!(i)))
            .collect();
        let response = evaluate(ast, Value::Object(data)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], true);
    }

    #[tokio::test]
    async fn test_create_rule_too_deep() {
        for n in [130, 20_000] {
            let response = create_test_app()
                .oneshot(post_json("/create_rule", json!({"rule_string": chain(n)})))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["code"], "MALFORMED_RULE");
        }
    }

    #[tokio::test]
    async fn test_repository_failure_is_internal_error() {
        let mut repository = MockRuleRepository::new();
        repository
            .expect_save()
            .returning(|_| Err(RuleError::InvalidDocument("disk full".to_string())));

        let app = api_routes().with_state(AppState::new(Arc::new(repository)));

        let response = app
            .oneshot(post_json("/create_rule", json!({"rule_string": "age > 30"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
