//! Facade operations against a mock server.

mod common;

use std::io::Write;

use abs2_client::{Abs2Error, QuboEntry, QuboMatrix, SymbolicQubo, User};
use axum::http::Method;
use common::MockServer;
use serde_json::json;

fn symbolic(terms: &[(&str, &str, f64)]) -> SymbolicQubo {
    terms
        .iter()
        .map(|(a, b, w)| (((*a).to_string(), (*b).to_string()), *w))
        .collect()
}

fn upload_body(file: &str) -> serde_json::Value {
    json!({
        "message": "Uploaded, verification started",
        "file": file,
        "uri_problem": format!("https://solver/v1/problems/{file}"),
    })
}

#[tokio::test]
async fn test_get_status() {
    let server = MockServer::json(
        200,
        json!({
            "message": "QUBO solver is working",
            "active": true,
            "jobs_in_queue": 2,
            "total_time_limit": 120,
            "uri_root": "r", "uri_signup": "s", "uri_account": "a", "uri_token": "t",
            "uri_problems": "p", "uri_jobs": "j", "uri_solutions": "sol"
        }),
    )
    .await;

    let status = server.api().get_status().await.unwrap();
    assert!(status.active);
    assert_eq!(status.jobs_in_queue, 2);
    assert_eq!(server.only_request().path, "/v1/");
}

#[tokio::test]
async fn test_status_unavailable() {
    let server = MockServer::json(503, json!({"message": "QUBO solver is not working"})).await;
    let err = server.api().get_status().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_register_user_sends_all_fields() {
    let server = MockServer::json(201, json!({"message": "account created"})).await;
    let user = User::new("alice", "alice@example.org", "Alice", "Liddell", "Wonderland U");

    let response = server.api().register_user(&user).await.unwrap();
    assert_eq!(response.status_code, 201);
    assert_eq!(response.message, "Created");

    let request = server.only_request();
    assert_eq!(request.path, "/v1/signup");
    assert_eq!(
        request.body.unwrap(),
        json!({
            "username": "alice", "email": "alice@example.org", "firstname": "Alice",
            "lastname": "Liddell", "affiliation": "Wonderland U"
        })
    );
}

#[tokio::test]
async fn test_register_conflict() {
    let server = MockServer::json(409, json!({"message": "username already registered"})).await;
    let user = User::new("alice", "a@b.c", "A", "L", "W");
    let err = server.api().register_user(&user).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn test_retrieve_access_token() {
    let server = MockServer::json(
        200,
        json!({"message": "token issued", "access_token": "eyJ.abc"}),
    )
    .await;

    let token = server
        .api()
        .retrieve_access_token("alice", "pw")
        .await
        .unwrap();
    assert_eq!(token.access_token, "eyJ.abc");

    let request = server.only_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/v1/token");
    assert_eq!(
        request.body.unwrap(),
        json!({"username": "alice", "password": "pw"})
    );
    assert!(request.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_token_response_missing_field() {
    let server = MockServer::json(200, json!({"message": "token issued"})).await;
    let err = server
        .api()
        .retrieve_access_token("alice", "pw")
        .await
        .unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("access_token"));
}

#[tokio::test]
async fn test_account_requests() {
    let server = MockServer::json(
        200,
        json!({
            "username": "alice", "email": "a@b.c", "firstname": "A",
            "lastname": "L", "affiliation": "W", "jobs": 4
        }),
    )
    .await;
    let api = server.api();

    let info = api.retrieve_user_information("alice", "pw").await.unwrap();
    assert_eq!(info.jobs, 4);
    api.retrieve_new_password("alice", "a@b.c").await.unwrap();
    api.retrieve_new_username("a@b.c").await.unwrap();
    api.change_password("alice", "pw", "pw2").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[1].body, Some(json!({"username": "alice", "email": "a@b.c"})));
    assert_eq!(requests[2].body, Some(json!({"email": "a@b.c"})));
    assert_eq!(requests[3].method, Method::PUT);
    assert_eq!(
        requests[3].body,
        Some(json!({"username": "alice", "password": "pw", "newpassword": "pw2"}))
    );
    assert!(requests.iter().all(|r| r.path == "/v1/account"));
}

#[tokio::test]
async fn test_delete_account_unauthorized() {
    let server = MockServer::json(401, json!({"message": "wrong access token"})).await;
    let err = server
        .api()
        .delete_user_account("expired")
        .await
        .unwrap_err();

    assert!(matches!(err, Abs2Error::Api { status: 401, .. }));
    let request = server.only_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/v1/account");
    assert_eq!(request.headers["authorization"], "Bearer expired");
}

#[tokio::test]
async fn test_post_job() {
    let server = MockServer::json(
        202,
        json!({
            "message": "job accepted",
            "job": "x_0001.json",
            "uri_problem": "https://solver/v1/problems/x.json",
            "uri_job": "https://solver/v1/jobs/x_0001.json",
            "uri_solution": "https://solver/v1/solutions/x_0001.json"
        }),
    )
    .await;

    let job = server.api().post_job("tok", "x.json", 30).await.unwrap();
    assert!(!job.job.is_empty());

    let request = server.only_request();
    assert_eq!(request.path, "/v1/jobs");
    assert_eq!(request.headers["authorization"], "Bearer tok");
    assert_eq!(
        request.body.unwrap(),
        json!({"problem": "x.json", "time_limit": 30})
    );
}

#[tokio::test]
async fn test_post_job_while_verifying() {
    let server = MockServer::json(404, json!({"message": "verification failed"})).await;
    let err = server.api().post_job("tok", "x.json", 30).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_post_qubo_matrix() {
    let server = MockServer::json(202, upload_body("m.json")).await;
    let matrix = QuboMatrix {
        file: "m.json".into(),
        nbit: 32,
        base: 0,
        qubo: vec![QuboEntry(1, 0, 1), QuboEntry(0, 1, -1)],
    };

    let upload = server.api().post_qubo_matrix("tok", &matrix).await.unwrap();
    assert_eq!(upload.file, "m.json");
    assert_eq!(
        server.only_request().body.unwrap(),
        json!({"file": "m.json", "nbit": 32, "base": 0, "qubo": [[1, 0, 1], [0, 1, -1]]})
    );
}

#[tokio::test]
async fn test_post_qubo_matrix_file() {
    let server = MockServer::json(202, upload_body("testQUBO2.json")).await;
    let contents = json!({"file": "testQUBO2.json", "nbit": 32, "base": 0, "qubo": [[1, 0, 1]]});
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.to_string().as_bytes()).unwrap();

    let upload = server
        .api()
        .post_qubo_matrix_file("tok", file.path())
        .await
        .unwrap();
    assert_eq!(upload.file, "testQUBO2.json");
    assert_eq!(server.only_request().body, Some(contents));
}

#[tokio::test]
async fn test_post_qubo_matrix_file_missing() {
    let server = MockServer::json(202, upload_body("x.json")).await;
    let dir = tempfile::tempdir().unwrap();
    let err = server
        .api()
        .post_qubo_matrix_file("tok", dir.path().join("absent.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, Abs2Error::Io { .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_post_qubo_matrix_file_not_json() {
    let server = MockServer::json(202, upload_body("x.json")).await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"file,nbit\nx,32\n").unwrap();

    let err = server
        .api()
        .post_qubo_matrix_file("tok", file.path())
        .await
        .unwrap_err();
    assert!(matches!(err, Abs2Error::Encode { .. }), "{err}");
    assert!(err.to_string().starts_with("Invalid request body"));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_post_symbolic_qubo_and_decode() {
    let server = MockServer::json(202, upload_body("example.json")).await;
    let qubo = symbolic(&[("s1", "s1", -160.0), ("s1", "s2", 64.0), ("s2", "s2", -96.0)]);

    let upload = server
        .api()
        .post_symbolic_qubo("tok", &qubo, Some("example.json"))
        .await
        .unwrap();
    assert_eq!(upload.status_code, 202);
    assert_eq!(upload.qubo, qubo);
    assert_eq!(upload.key_mapping.len(), 2);

    let body = server.only_request().body.unwrap();
    assert_eq!(body["file"], "example.json");
    assert_eq!(body["nbit"], 32);
    assert_eq!(body["base"], 0);
    assert_eq!(body["qubo"], json!([[0, 0, -160], [0, 1, 64], [1, 1, -96]]));

    let mut solution = vec![1, 0];
    solution.resize(32, 0);
    let decoded = upload.decode_solution(&solution);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded["s1"], 1);
    assert_eq!(decoded["s2"], 0);
}

#[tokio::test]
async fn test_post_symbolic_qubo_generates_file_name() {
    let server = MockServer::json(202, upload_body("generated.json")).await;
    let qubo = symbolic(&[("a", "b", 1.5)]);

    server.api().post_symbolic_qubo("tok", &qubo, None).await.unwrap();

    let body = server.only_request().body.unwrap();
    let file = body["file"].as_str().unwrap();
    assert!(file.ends_with(".json"));
    assert_eq!(file.len(), 15);
    assert_eq!(body["qubo"], json!([[0, 1, 1]]));
}

#[tokio::test]
async fn test_post_symbolic_qubo_rejects_nan_before_sending() {
    let server = MockServer::json(202, upload_body("x.json")).await;
    let qubo = symbolic(&[("a", "b", f64::NAN)]);

    let err = server
        .api()
        .post_symbolic_qubo("tok", &qubo, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Abs2Error::InvalidWeight { .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_matrix_information() {
    let server = MockServer::json(
        200,
        json!({
            "file": "m.json", "bytes": 64, "time": "2024-03-01 10:00:00",
            "uri_problem": "u", "verify": false, "message": "malformed matrix"
        }),
    )
    .await;

    let info = server
        .api()
        .get_qubo_matrix_information("tok", "m.json")
        .await
        .unwrap();
    assert_eq!(info.verify, Some(false));
    assert_eq!(info.message.as_deref(), Some("malformed matrix"));
    assert_eq!(server.only_request().path, "/v1/problems/m.json");
}

#[tokio::test]
async fn test_job_information() {
    let server = MockServer::json(
        200,
        json!({
            "job": "x_0001.json", "problem": "x.json", "nbit": 32,
            "minval": -160, "maxval": 64,
            "parameters": {"problem": "x.json", "time_limit": 30}
        }),
    )
    .await;

    let job = server
        .api()
        .get_job_information("tok", "x_0001.json")
        .await
        .unwrap();
    assert_eq!(job.parameters.time_limit, "30");
    assert_eq!(server.only_request().path, "/v1/jobs/x_0001.json");
}

#[tokio::test]
async fn test_get_solution() {
    let server = MockServer::json(
        200,
        json!({
            "terminated": false, "problem": "x.json", "job": "x_0001.json",
            "energy": -160, "tts": 0.012, "solution": [1, 0, 0, 0],
            "parameters": {
                "time_limit": 30, "target_energy": -200, "bfactor": 1.0,
                "factor": 0.5, "nsolpool": 8, "ngpu": 1, "nisland_per_gpu": 4,
                "nisland": 4, "value_bits": 16, "arithmetic_bits": 32
            },
            "kernel_time": 1.5
        }),
    )
    .await;

    let solution = server.api().get_solution("tok", "x_0001.json").await.unwrap();
    assert!(!solution.terminated);
    assert_eq!(solution.energy, -160);
    assert_eq!(solution.kernel_time, Some(1.5));
    assert!(solution.success.is_none());
    assert_eq!(server.only_request().path, "/v1/solutions/x_0001.json");
}

#[tokio::test]
async fn test_list_and_delete_endpoints() {
    let server = MockServer::json(200, json!({"files": []})).await;
    let api = server.api();

    api.get_all_problems("tok").await.unwrap();
    api.delete_qubo_matrix("tok", "m.json").await.unwrap();
    api.delete_all_qubo_matrices("tok").await.unwrap();
    api.get_all_jobs("tok").await.unwrap();
    api.delete_job("tok", "m_0001.json").await.unwrap();
    api.delete_all_unexecuted_jobs("tok").await.unwrap();
    api.get_all_solutions("tok").await.unwrap();
    api.delete_solution("tok", "m_0001.json").await.unwrap();
    api.delete_all_solutions("tok").await.unwrap();

    let seen: Vec<(Method, String)> = server
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected = [
        (Method::GET, "/v1/problems"),
        (Method::DELETE, "/v1/problems/m.json"),
        (Method::DELETE, "/v1/problems"),
        (Method::GET, "/v1/jobs"),
        (Method::DELETE, "/v1/jobs/m_0001.json"),
        (Method::DELETE, "/v1/jobs"),
        (Method::GET, "/v1/solutions"),
        (Method::DELETE, "/v1/solutions/m_0001.json"),
        (Method::DELETE, "/v1/solutions"),
    ];
    assert_eq!(seen.len(), expected.len());
    for ((method, path), (want_method, want_path)) in seen.iter().zip(expected) {
        assert_eq!(*method, want_method);
        assert_eq!(path, want_path);
    }
    assert!(server
        .requests()
        .iter()
        .all(|r| r.headers["authorization"] == "Bearer tok"));
}

#[tokio::test]
async fn test_resource_names_stay_inside_their_collection() {
    let server = MockServer::json(200, json!({})).await;
    let api = server.api();

    api.delete_qubo_matrix("tok", "../account").await.unwrap();
    api.delete_solution("tok", "run?1.json").await.unwrap();
    api.delete_job("tok", "a#b.json").await.unwrap();
    api.get_qubo_matrix_information("tok", "dir/x.json")
        .await
        .unwrap_err();

    let seen: Vec<(String, Option<String>)> = server
        .requests()
        .into_iter()
        .map(|r| (r.path, r.query))
        .collect();
    assert_eq!(
        seen,
        [
            ("/v1/problems/..%2Faccount".to_string(), None),
            ("/v1/solutions/run%3F1.json".to_string(), None),
            ("/v1/jobs/a%23b.json".to_string(), None),
            ("/v1/problems/dir%2Fx.json".to_string(), None),
        ]
    );
}

#[tokio::test]
async fn test_dot_segment_names_rejected_before_sending() {
    let server = MockServer::json(200, json!({})).await;
    let api = server.api();

    for name in ["", ".", ".."] {
        let err = api.delete_qubo_matrix("tok", name).await.unwrap_err();
        assert!(matches!(err, Abs2Error::InvalidName(_)), "{name:?}: {err}");
        assert!(api.get_solution("tok", name).await.is_err());
        assert!(api.delete_job("tok", name).await.is_err());
    }
    assert!(server.requests().is_empty());
}
