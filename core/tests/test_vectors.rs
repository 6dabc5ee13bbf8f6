//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use blogadmin_core::{AdminClient, ApiError, Blog, HttpRequest, HttpResponse, RpcErrorKind, UserWithPassword};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000/api";

fn client() -> AdminClient {
    AdminClient::new(BASE_URL)
}

fn simulated(sim: &Value) -> HttpResponse {
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap_or_default().to_string(),
    }
}

fn expected_headers(req: &Value) -> Vec<(String, String)> {
    req["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let raw = include_str!("../../test-vectors/login.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_login(
            input["username"].as_str().unwrap(),
            input["password"].as_str().unwrap(),
        );
        assert_eq!(req.path, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: path");
        assert_eq!(req.headers, expected_headers(expected_req), "{name}: headers");
        assert_eq!(req.body.as_deref(), expected_req["body"].as_str(), "{name}: body");

        // Verify parse
        let result = c.parse_login(simulated(&case["simulated_response"]));
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert!(matches!(err, ApiError::LoginFailed { .. }), "{name}: expected LoginFailed");
            assert_eq!(err.to_string(), expected_error.as_str().unwrap(), "{name}: message");
        } else {
            assert_eq!(result.unwrap(), case["expected_result"].as_bool().unwrap(), "{name}: result");
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC
// ---------------------------------------------------------------------------

fn build(c: &AdminClient, operation: &str, input: &Value) -> HttpRequest {
    match operation {
        "whoami" => c.build_whoami(),
        "register" => {
            let user: UserWithPassword = serde_json::from_value(input.clone()).unwrap();
            c.build_register(&user)
        }
        "list_blogs" => c.build_list_blogs(),
        "create_blog" => {
            let blog: Blog = serde_json::from_value(input.clone()).unwrap();
            c.build_create_blog(&blog)
        }
        "update_blog" => {
            let blog: Blog = serde_json::from_value(input.clone()).unwrap();
            c.build_update_blog(&blog)
        }
        "delete_blog" => c.build_delete_blog(input.as_str().unwrap()),
        other => panic!("unknown operation: {other}"),
    }
    .unwrap()
}

/// Parse with the operation's typed parser and render the result as JSON.
fn parse(c: &AdminClient, operation: &str, response: HttpResponse) -> Result<Value, ApiError> {
    match operation {
        "whoami" => c.parse_whoami(response).map(|u| serde_json::to_value(u).unwrap()),
        "register" => c.parse_register(response).map(|()| Value::Null),
        "list_blogs" => c.parse_list_blogs(response).map(|b| serde_json::to_value(b).unwrap()),
        "create_blog" => c.parse_create_blog(response).map(|()| Value::Null),
        "update_blog" => c.parse_update_blog(response).map(|()| Value::Null),
        "delete_blog" => c.parse_delete_blog(response).map(|()| Value::Null),
        other => panic!("unknown operation: {other}"),
    }
}

#[test]
fn rpc_test_vectors() {
    let raw = include_str!("../../test-vectors/rpc.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = build(&c, operation, &case["input"]);
        assert_eq!(req.path, format!("{BASE_URL}/"), "{name}: path");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())],
            "{name}: headers"
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body["id"].is_string(), "{name}: id is a string");
        assert_eq!(body["method"], expected_req["method"], "{name}: method");
        assert_eq!(body["params"], expected_req["params"], "{name}: params");

        // Verify parse
        let result = parse(&c, operation, simulated(&case["simulated_response"]));
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error["kind"].as_str().unwrap() {
                "AuthenticationRequired" => assert!(err.is_authentication_required(), "{name}: kind"),
                "Other" => assert!(
                    matches!(err, ApiError::Rpc { kind: RpcErrorKind::Other, .. }),
                    "{name}: kind"
                ),
                "InvalidStatus" => assert!(matches!(err, ApiError::InvalidStatus { .. }), "{name}: kind"),
                other => panic!("{name}: unknown expected_error kind: {other}"),
            }
            assert_eq!(err.to_string(), expected_error["message"].as_str().unwrap(), "{name}: message");
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
