use reqwest::{Client, StatusCode};
use serde_json::Value;
use tableau_sim::prelude::*;

const JSON: &str = "application/json";

async fn seeded_server() -> SimulatedServer {
    let server = SimulatedServer::start(SimulatorConfig::default()).await;
    seed_demo(server.data());
    server
}

async fn sign_in(client: &Client, server: &SimulatedServer) -> String {
    let response = client
        .post(format!("{}/api/3.19/auth/signin", server.uri()))
        .header("Accept", JSON)
        .header("Content-Type", "application/xml")
        .body(r#"<tsRequest><credentials name="admin" password="secret"><site contentUrl=""/></credentials></tsRequest>"#)
        .send()
        .await
        .expect("sign in");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json");
    body["credentials"]["token"]
        .as_str()
        .expect("token")
        .to_string()
}

#[tokio::test]
async fn test_sign_in_then_list_projects_by_page() {
    let server = seeded_server().await;
    let client = Client::new();
    let token = sign_in(&client, &server).await;

    let response = client
        .get(format!("{}/projects?pageSize=2&pageNumber=2", server.site_uri()))
        .header("X-Tableau-Auth", &token)
        .header("Accept", JSON)
        .send()
        .await
        .expect("projects");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("json");
    assert_eq!(body["pagination"]["totalAvailable"], 3);
    assert_eq!(body["pagination"]["pageNumber"], 2);
    let projects = body["projects"]["project"].as_array().expect("projects");
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let server = seeded_server().await;
    let response = Client::new()
        .get(format!("{}/users", server.site_uri()))
        .send()
        .await
        .expect("users");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.text().await.expect("body");
    assert!(body.contains("code=\"401"));
}

#[tokio::test]
async fn test_publish_workbook_over_http() {
    let server = seeded_server().await;
    let client = Client::new();
    let token = sign_in(&client, &server).await;

    let project = server
        .data()
        .read()
        .projects
        .iter()
        .find(|project| project.name == "Finance")
        .map(|project| project.id)
        .expect("Finance project");

    let payload = format!(
        r#"<tsRequest><workbook name="Forecast"><project id="{}"/></workbook></tsRequest>"#,
        project
    );
    let (content_type, body) = MultipartBuilder::new()
        .text_part("request_payload", "text/xml", &payload)
        .file_part(
            "tableau_workbook",
            "Forecast.twb",
            "application/octet-stream",
            b"<workbook><worksheets><worksheet name='Trend'/></worksheets></workbook>".to_vec(),
        )
        .build();

    let response = client
        .post(format!("{}/workbooks", server.site_uri()))
        .header("X-Tableau-Auth", &token)
        .header("Accept", JSON)
        .header("Content-Type", content_type)
        .body(body)
        .send()
        .await
        .expect("publish");
    assert_eq!(response.status(), StatusCode::CREATED);
    let published: Value = response.json().await.expect("json");
    assert_eq!(published["workbook"]["name"], "Forecast");
    let workbook_id = published["workbook"]["id"]
        .as_str()
        .expect("id")
        .to_string();

    let views: Value = client
        .get(format!("{}/workbooks/{}/views", server.site_uri(), workbook_id))
        .header("X-Tableau-Auth", &token)
        .header("Accept", JSON)
        .send()
        .await
        .expect("views")
        .json()
        .await
        .expect("json");
    let names: Vec<&str> = views["views"]["view"]
        .as_array()
        .expect("views")
        .iter()
        .filter_map(|view| view["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Trend"]);
}

#[tokio::test]
async fn test_armed_error_until_disarmed() {
    let server = seeded_server().await;
    let client = Client::new();
    let token = sign_in(&client, &server).await;
    server.arm_error(
        RouteId::QueryProjects,
        RestError::new(500, 0, "Internal Server Error", "Simulated outage"),
    );

    let url = format!("{}/projects", server.site_uri());
    for _ in 0..2 {
        let response = client
            .get(&url)
            .header("X-Tableau-Auth", &token)
            .send()
            .await
            .expect("projects");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().await.expect("body").contains("Simulated outage"));
    }

    server.disarm_error(RouteId::QueryProjects);
    let response = client
        .get(&url)
        .header("X-Tableau-Auth", &token)
        .send()
        .await
        .expect("projects");
    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received_requests().await;
    assert_eq!(received.len(), 4);
    assert_eq!(received[1].auth_token(), Some(token.as_str()));
}
