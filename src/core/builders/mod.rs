//! Operation handlers.
//!
//! Each handler reads the [`RequestContext`](crate::core::simulator::RequestContext),
//! mutates the locked [`ServerState`](crate::core::store::ServerState) and
//! returns a [`Built`](crate::core::simulator::Built) response. Generic
//! stages live in [`entity`]; error payloads in [`errors`].

pub mod auth;
pub mod commit;
pub mod content;
pub mod entity;
pub mod errors;
pub mod favorites;
pub mod groups;
pub mod payload;
pub mod permissions;
pub mod projects;
pub mod subscriptions;
pub mod tasks;
pub mod uploads;
pub mod users;

use super::routes::RouteId;
use super::simulator::Handler;

pub fn handler_for(route: RouteId) -> Handler {
    use RouteId::*;

    match route {
        SignIn => auth::sign_in,
        SignOut => auth::sign_out,
        ServerInfo => auth::server_info,
        GetSite => auth::get_site,
        QueryUsers => users::query_users,
        GetUser => users::get_user,
        AddUser => users::add_user,
        UpdateUser => users::update_user,
        RemoveUser => users::remove_user,
        QueryGroupsForUser => users::query_groups_for_user,
        QueryGroups => groups::query_groups,
        CreateGroup => groups::create_group,
        DeleteGroup => groups::delete_group,
        QueryUsersInGroup => groups::query_users_in_group,
        AddUserToGroup => groups::add_user_to_group,
        RemoveUserFromGroup => groups::remove_user_from_group,
        QueryGroupSets => groups::query_group_sets,
        CreateGroupSet => groups::create_group_set,
        DeleteGroupSet => groups::delete_group_set,
        QueryProjects => projects::query_projects,
        CreateProject => projects::create_project,
        UpdateProject => projects::update_project,
        DeleteProject => projects::delete_project,
        QueryWorkbooks => content::query_workbooks,
        GetWorkbook => content::get_workbook,
        UpdateWorkbook => content::update_workbook,
        DeleteWorkbook => content::delete_workbook,
        DownloadWorkbook => content::download_workbook,
        QueryWorkbookViews => content::query_workbook_views,
        PublishWorkbook => commit::publish_workbook,
        QueryDataSources => content::query_data_sources,
        GetDataSource => content::get_data_source,
        DeleteDataSource => content::delete_data_source,
        DownloadDataSource => content::download_data_source,
        PublishDataSource => commit::publish_data_source,
        QueryViews => content::query_views,
        GetView => content::get_view,
        QueryCustomViews => content::query_custom_views,
        GetCustomView => content::get_custom_view,
        DeleteCustomView => content::delete_custom_view,
        QueryFavorites => favorites::query_favorites,
        AddFavorite => favorites::add_favorite,
        DeleteFavorite => favorites::delete_favorite,
        QuerySubscriptions => subscriptions::query_subscriptions,
        GetSubscription => subscriptions::get_subscription,
        CreateSubscription => subscriptions::create_subscription,
        DeleteSubscription => subscriptions::delete_subscription,
        QuerySchedules => tasks::query_schedules,
        GetSchedule => tasks::get_schedule,
        QueryExtractRefreshTasks => tasks::query_extract_refresh_tasks,
        CreateExtractRefreshTask => tasks::create_extract_refresh_task,
        DeleteExtractRefreshTask => tasks::delete_extract_refresh_task,
        QueryProjectPermissions => permissions::query_project_permissions,
        AddProjectPermissions => permissions::add_project_permissions,
        DeleteProjectPermission => permissions::delete_project_permission,
        QueryWorkbookPermissions => permissions::query_workbook_permissions,
        AddWorkbookPermissions => permissions::add_workbook_permissions,
        DeleteWorkbookPermission => permissions::delete_workbook_permission,
        QueryDataSourcePermissions => permissions::query_data_source_permissions,
        AddDataSourcePermissions => permissions::add_data_source_permissions,
        DeleteDataSourcePermission => permissions::delete_data_source_permission,
        QueryDefaultPermissions => permissions::query_default_permissions,
        AddDefaultPermissions => permissions::add_default_permissions,
        DeleteDefaultPermission => permissions::delete_default_permission,
        InitiateFileUpload => uploads::initiate_file_upload,
        AppendToFileUpload => uploads::append_to_file_upload,
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::{
        DataSourceType, ProjectType, ScheduleType, UserType, ViewType, WorkbookType,
    };
    use crate::api::serialization::MediaType;
    use crate::core::request::{SimulatedRequest, SimulatedResponse};
    use crate::core::simulator::Simulator;
    use crate::storage::config::SimulatorConfig;
    use crate::utils::form::MultipartBuilder;
    use http::{Method, StatusCode};
    use serde_json::Value;

    /// Simulator with a signed-in site administrator.
    struct Harness {
        simulator: Simulator,
        token: String,
        admin: UserType,
        site: String,
    }

    impl Harness {
        fn new() -> Self {
            let simulator = Simulator::new(SimulatorConfig::default());
            let admin = simulator
                .data()
                .add_user(UserType::new("admin", "SiteAdministratorCreator"));
            let token = simulator.data().sign_in(admin.id).token;
            let site = simulator.site_path();
            Self {
                simulator,
                token,
                admin,
                site,
            }
        }

        fn request(&self, method: Method, path: &str) -> SimulatedRequest {
            SimulatedRequest::parse(method, &format!("http://localhost{}/{}", self.site, path))
                .expect("url")
                .with_auth(&self.token)
                .with_accept(MediaType::Json)
        }

        async fn send(&self, request: SimulatedRequest) -> SimulatedResponse {
            self.simulator.dispatch(request).await.expect("dispatch")
        }

        async fn get(&self, path: &str) -> SimulatedResponse {
            self.send(self.request(Method::GET, path)).await
        }

        async fn delete(&self, path: &str) -> SimulatedResponse {
            self.send(self.request(Method::DELETE, path)).await
        }

        async fn xml(&self, method: Method, path: &str, body: &str) -> SimulatedResponse {
            let request = self
                .request(method, path)
                .with_body("application/xml", body.to_string());
            self.send(request).await
        }
    }

    fn json(response: &SimulatedResponse) -> Value {
        serde_json::from_slice(&response.body).expect("json body")
    }

    fn error_code(response: &SimulatedResponse) -> String {
        json(response)["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_users_page_two_of_25() {
        let harness = Harness::new();
        for index in 0..24 {
            harness
                .simulator
                .data()
                .add_user(UserType::new(format!("user{:02}", index), "Viewer"));
        }

        let response = harness.get("users?pageNumber=2&pageSize=10").await;
        assert_eq!(response.status, StatusCode::OK);
        let body = json(&response);
        assert_eq!(body["pagination"]["pageNumber"], 2);
        assert_eq!(body["pagination"]["totalAvailable"], 25);
        let users = body["users"]["user"].as_array().expect("users");
        assert_eq!(users.len(), 10);
        assert_eq!(users[0]["name"], "user09");
    }

    #[tokio::test]
    async fn test_page_size_above_one_thousand_is_honored() {
        let harness = Harness::new();
        for index in 0..1499 {
            harness
                .simulator
                .data()
                .add_user(UserType::new(format!("user{:04}", index), "Viewer"));
        }

        let response = harness.get("users?pageNumber=1&pageSize=1500").await;
        assert_eq!(response.status, StatusCode::OK);
        let body = json(&response);
        assert_eq!(body["pagination"]["pageSize"], 1500);
        assert_eq!(body["pagination"]["totalAvailable"], 1500);
        assert_eq!(body["users"]["user"].as_array().expect("users").len(), 1500);
    }

    #[tokio::test]
    async fn test_filter_by_name() {
        let harness = Harness::new();
        harness
            .simulator
            .data()
            .add_user(UserType::new("carol", "Viewer"));

        let response = harness.get("users?filter=name:eq:carol").await;
        let body = json(&response);
        assert_eq!(body["pagination"]["totalAvailable"], 1);

        let response = harness.get("users?filter=contentUrl:eq:carol").await;
        assert_eq!(error_code(&response), "400000");
    }

    #[tokio::test]
    async fn test_create_user_twice_conflicts() {
        let harness = Harness::new();
        let body = r#"<tsRequest><user name="dave" siteRole="Explorer"/></tsRequest>"#;

        let first = harness.xml(Method::POST, "users", body).await;
        assert_eq!(first.status, StatusCode::CREATED);
        assert_eq!(json(&first)["user"]["siteRole"], "Explorer");

        let second = harness.xml(Method::POST, "users", body).await;
        assert_eq!(second.status, StatusCode::CONFLICT);
        assert_eq!(error_code(&second), "409017");

        let missing = harness
            .xml(Method::POST, "users", r#"<tsRequest><user name="erin"/></tsRequest>"#)
            .await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing_entity_is_404_and_harmless() {
        let harness = Harness::new();
        let response = harness
            .delete(&format!("users/{}", uuid::Uuid::new_v4()))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&response), "404002");
        assert!(!json(&response)["error"]["summary"]
            .as_str()
            .unwrap_or_default()
            .is_empty());
        assert_eq!(harness.simulator.data().read().users.len(), 1);
    }

    #[tokio::test]
    async fn test_group_membership_flow() {
        let harness = Harness::new();
        let created = harness
            .xml(Method::POST, "groups", r#"<tsRequest><group name="Analysts"/></tsRequest>"#)
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let group_id = json(&created)["group"]["id"]
            .as_str()
            .expect("group id")
            .to_string();

        let duplicate = harness
            .xml(Method::POST, "groups", r#"<tsRequest><group name="analysts"/></tsRequest>"#)
            .await;
        assert_eq!(error_code(&duplicate), "409009");

        let body = format!(r#"<tsRequest><user id="{}"/></tsRequest>"#, harness.admin.id);
        let path = format!("groups/{}/users", group_id);
        assert_eq!(harness.xml(Method::POST, &path, &body).await.status, StatusCode::OK);
        assert_eq!(
            error_code(&harness.xml(Method::POST, &path, &body).await),
            "409011"
        );

        let members = json(&harness.get(&path).await);
        assert_eq!(members["pagination"]["totalAvailable"], 1);

        let groups = json(&harness.get(&format!("users/{}/groups", harness.admin.id)).await);
        assert_eq!(groups["groups"]["group"][0]["name"], "Analysts");

        let removed = harness
            .delete(&format!("groups/{}/users/{}", group_id, harness.admin.id))
            .await;
        assert_eq!(removed.status, StatusCode::NO_CONTENT);
        assert!(removed.body.is_empty());
    }

    #[tokio::test]
    async fn test_group_set_conflict() {
        let harness = Harness::new();
        let body = r#"<tsRequest><groupSet name="Regions"/></tsRequest>"#;
        assert_eq!(
            harness.xml(Method::POST, "groupsets", body).await.status,
            StatusCode::CREATED
        );
        assert_eq!(
            error_code(&harness.xml(Method::POST, "groupsets", body).await),
            "409010"
        );
    }

    #[tokio::test]
    async fn test_project_create_update_and_conflicts() {
        let harness = Harness::new();
        let created = harness
            .xml(Method::POST, "projects", r#"<tsRequest><project name="Finance"/></tsRequest>"#)
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let project = json(&created);
        assert_eq!(project["project"]["owner"]["id"], harness.admin.id.to_string());

        let duplicate = harness
            .xml(Method::POST, "projects", r#"<tsRequest><project name="FINANCE"/></tsRequest>"#)
            .await;
        assert_eq!(error_code(&duplicate), "409006");

        let orphan = harness
            .xml(
                Method::POST,
                "projects",
                &format!(
                    r#"<tsRequest><project name="Child" parentProjectId="{}"/></tsRequest>"#,
                    uuid::Uuid::new_v4()
                ),
            )
            .await;
        assert_eq!(error_code(&orphan), "404005");

        let id = project["project"]["id"].as_str().expect("id").to_string();
        let renamed = harness
            .xml(
                Method::PUT,
                &format!("projects/{}", id),
                r#"<tsRequest><project name="Finance 2" description="moved"/></tsRequest>"#,
            )
            .await;
        assert_eq!(renamed.status, StatusCode::OK);
        assert_eq!(json(&renamed)["project"]["name"], "Finance 2");
    }

    #[tokio::test]
    async fn test_delete_project_removes_content() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let parent = data.add_project(ProjectType::new("Parent"));
        let child = data.add_project(ProjectType::new("Child").with_parent(parent.id));
        data.add_workbook(WorkbookType::new("Nested", child.id));
        data.add_data_source(DataSourceType::new("Orders", parent.id));

        let response = harness.delete(&format!("projects/{}", parent.id)).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        let state = data.read();
        assert!(state.projects.is_empty());
        assert!(state.workbooks.is_empty());
        assert!(state.data_sources.is_empty());
    }

    #[tokio::test]
    async fn test_workbook_by_content_url_and_views() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let project = data.add_project(ProjectType::new("Default"));
        let workbook = data.add_workbook(WorkbookType::new("Superstore", project.id));
        data.add_view(ViewType::for_sheet(&workbook, "Overview", "worksheet"));
        data.add_view(ViewType::for_sheet(&workbook, "Details", "worksheet"));

        let response = harness.get("workbooks/superstore?key=contentUrl").await;
        assert_eq!(json(&response)["workbook"]["id"], workbook.id.to_string());

        let response = harness.get("workbooks/Superstore?key=contentUrl").await;
        assert_eq!(error_code(&response), "404006");

        let views = json(&harness.get(&format!("workbooks/{}/views", workbook.id)).await);
        assert_eq!(views["views"]["view"].as_array().map(Vec::len), Some(2));
        assert!(views.get("pagination").is_none());
    }

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let harness = Harness::new();
        let response = harness.get("workbooks/not-a-uuid").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    const WORKBOOK_FILE: &str = "<workbook><worksheets><worksheet name='Sheet 1'/><worksheet name='Sheet 2'/></worksheets><windows><window class='worksheet' name='Sheet 1'/><window class='worksheet' name='Sheet 2'/></windows></workbook>";

    async fn publish(harness: &Harness, project: uuid::Uuid, overwrite: bool) -> SimulatedResponse {
        let payload = format!(
            r#"<tsRequest><workbook name="Sales"><project id="{}"/><views><view name="Sheet 2" hidden="true"/></views></workbook></tsRequest>"#,
            project
        );
        let (content_type, body) = MultipartBuilder::new()
            .text_part("request_payload", "text/xml", &payload)
            .file_part(
                "tableau_workbook",
                "Sales.twb",
                "application/octet-stream",
                WORKBOOK_FILE.as_bytes().to_vec(),
            )
            .build();
        let request = harness
            .request(Method::POST, &format!("workbooks?overwrite={}", overwrite))
            .with_body(&content_type, body);
        harness.send(request).await
    }

    #[tokio::test]
    async fn test_publish_without_overwrite_twice() {
        let harness = Harness::new();
        let project = harness
            .simulator
            .data()
            .add_project(ProjectType::new("Default"));

        let first = publish(&harness, project.id, false).await;
        assert_eq!(first.status, StatusCode::CREATED);
        let second = publish(&harness, project.id, false).await;
        assert_eq!(second.status, StatusCode::FORBIDDEN);

        let state = harness.simulator.data().read();
        assert_eq!(state.workbooks.len(), 1);
        let names: Vec<&str> = state.views.iter().map(|view| view.name.as_str()).collect();
        assert_eq!(names, vec!["Sheet 1"]);
    }

    #[tokio::test]
    async fn test_workbook_names_are_unique_across_projects() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let finance = data.add_project(ProjectType::new("Finance"));
        let sales = data.add_project(ProjectType::new("Sales"));

        let first = publish(&harness, finance.id, false).await;
        assert_eq!(first.status, StatusCode::CREATED);
        let second = publish(&harness, sales.id, false).await;
        assert_eq!(second.status, StatusCode::FORBIDDEN);

        let state = data.read();
        let named: Vec<_> = state
            .workbooks
            .iter()
            .filter(|workbook| workbook.name == "Sales")
            .collect();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].project.as_ref().map(|project| project.id), Some(finance.id));
    }

    #[tokio::test]
    async fn test_data_source_names_are_unique_per_project() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let finance = data.add_project(ProjectType::new("Finance"));
        let sales = data.add_project(ProjectType::new("Sales"));
        data.add_data_source(DataSourceType::new("Orders", finance.id));

        let payload = format!(
            r#"<tsRequest><datasource name="Orders"><project id="{}"/></datasource></tsRequest>"#,
            sales.id
        );
        let (content_type, body) = MultipartBuilder::new()
            .text_part("request_payload", "text/xml", &payload)
            .file_part(
                "tableau_datasource",
                "Orders.tds",
                "application/octet-stream",
                b"<datasource><connection class='postgres'/></datasource>".to_vec(),
            )
            .build();
        let request = harness
            .request(Method::POST, "datasources")
            .with_body(&content_type, body);
        assert_eq!(harness.send(request).await.status, StatusCode::CREATED);
        assert_eq!(data.read().data_sources.len(), 2);
    }

    #[tokio::test]
    async fn test_workbook_rename_onto_taken_name_conflicts() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let finance = data.add_project(ProjectType::new("Finance"));
        let sales = data.add_project(ProjectType::new("Sales"));
        data.add_workbook(WorkbookType::new("Budget", finance.id));
        let forecast = data.add_workbook(WorkbookType::new("Forecast", sales.id));

        let path = format!("workbooks/{}", forecast.id);
        let renamed = harness
            .xml(
                Method::PUT,
                &path,
                &format!(
                    r#"<tsRequest><workbook name="Budget"><project id="{}"/></workbook></tsRequest>"#,
                    finance.id
                ),
            )
            .await;
        assert_eq!(renamed.status, StatusCode::CONFLICT);
        assert_eq!(error_code(&renamed), "409005");
        assert_eq!(
            data.read().workbook(forecast.id).map(|workbook| workbook.name.clone()),
            Some("Forecast".to_string())
        );

        let kept = harness
            .xml(Method::PUT, &path, r#"<tsRequest><workbook name="Forecast"/></tsRequest>"#)
            .await;
        assert_eq!(kept.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_publish_with_overwrite_replaces() {
        let harness = Harness::new();
        let project = harness
            .simulator
            .data()
            .add_project(ProjectType::new("Default"));

        let first = json(&publish(&harness, project.id, false).await);
        let second = publish(&harness, project.id, true).await;
        assert_eq!(second.status, StatusCode::CREATED);
        assert_ne!(json(&second)["workbook"]["id"], first["workbook"]["id"]);

        let state = harness.simulator.data().read();
        assert_eq!(state.workbooks.len(), 1);
        assert_eq!(state.views.len(), 1);
        assert_eq!(state.files.len(), 1);
    }

    #[tokio::test]
    async fn test_chunked_upload_then_publish_data_source() {
        let harness = Harness::new();
        let project = harness
            .simulator
            .data()
            .add_project(ProjectType::new("Default"));

        let initiated = json(&harness.send(harness.request(Method::POST, "fileUploads")).await);
        let session = initiated["fileUpload"]["uploadSessionId"]
            .as_str()
            .expect("session")
            .to_string();
        assert_eq!(initiated["fileUpload"]["fileSize"], 0);

        let source = b"<datasource><connection class='sqlserver' username='x'/></datasource>";
        let mut size = 0;
        for chunk in source.chunks(20) {
            let (content_type, body) = MultipartBuilder::new()
                .text_part("request_payload", "text/xml", "")
                .file_part("tableau_file", "file", "application/octet-stream", chunk.to_vec())
                .build();
            let request = harness
                .request(Method::PUT, &format!("fileUploads/{}", session))
                .with_body(&content_type, body);
            let appended = json(&harness.send(request).await);
            size = appended["fileUpload"]["fileSize"].as_u64().expect("size");
        }
        assert_eq!(size, source.len() as u64);

        let payload = format!(
            r#"<tsRequest><datasource name="Orders"><connectionCredentials name="svc" password="pw" embed="true"/><project id="{}"/></datasource></tsRequest>"#,
            project.id
        );
        let (content_type, body) = MultipartBuilder::new()
            .text_part("request_payload", "text/xml", &payload)
            .build();
        let request = harness
            .request(
                Method::POST,
                &format!("datasources?uploadSessionId={}&datasourceType=tds", session),
            )
            .with_body(&content_type, body);
        let published = harness.send(request).await;
        assert_eq!(published.status, StatusCode::CREATED);
        let id = json(&published)["datasource"]["id"]
            .as_str()
            .expect("id")
            .to_string();

        assert!(!harness.simulator.data().uploads().contains(&session));
        let download = harness.get(&format!("datasources/{}/content", id)).await;
        assert!(String::from_utf8_lossy(&download.body).contains(r#"username="svc""#));
    }

    #[tokio::test]
    async fn test_append_to_unknown_session() {
        let harness = Harness::new();
        let (content_type, body) = MultipartBuilder::new()
            .file_part("tableau_file", "file", "application/octet-stream", vec![1])
            .build();
        let request = harness
            .request(Method::PUT, "fileUploads/missing")
            .with_body(&content_type, body);
        assert_eq!(error_code(&harness.send(request).await), "404014");
    }

    #[tokio::test]
    async fn test_malformed_workbook_is_bad_request() {
        let harness = Harness::new();
        let project = harness
            .simulator
            .data()
            .add_project(ProjectType::new("Default"));
        let payload = format!(
            r#"<tsRequest><workbook name="Broken"><project id="{}"/></workbook></tsRequest>"#,
            project.id
        );
        let (content_type, body) = MultipartBuilder::new()
            .text_part("request_payload", "text/xml", &payload)
            .file_part(
                "tableau_workbook",
                "Broken.twb",
                "application/octet-stream",
                b"<workbook><a></b></workbook>".to_vec(),
            )
            .build();
        let request = harness
            .request(Method::POST, "workbooks")
            .with_body(&content_type, body);
        let response = harness.send(request).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(harness.simulator.data().read().workbooks.is_empty());
    }

    #[tokio::test]
    async fn test_favorites() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let project = data.add_project(ProjectType::new("Default"));
        let path = format!("favorites/{}", harness.admin.id);

        let missing = harness
            .xml(
                Method::PUT,
                &path,
                &format!(
                    r#"<tsRequest><favorite label="Orders"><datasource id="{}"/></favorite></tsRequest>"#,
                    uuid::Uuid::new_v4()
                ),
            )
            .await;
        assert_eq!(error_code(&missing), "404011");
        assert!(data.read().favorites_of(harness.admin.id).is_empty());

        let body = format!(
            r#"<tsRequest><favorite label="Home"><project id="{}"/></favorite></tsRequest>"#,
            project.id
        );
        let added = harness.xml(Method::PUT, &path, &body).await;
        assert_eq!(added.status, StatusCode::OK);
        assert_eq!(json(&added)["favorites"]["favorite"][0]["label"], "Home");
        assert_eq!(
            error_code(&harness.xml(Method::PUT, &path, &body).await),
            "409026"
        );

        let listed = json(&harness.get(&path).await);
        assert_eq!(listed["pagination"]["totalAvailable"], 1);

        let deleted = harness
            .delete(&format!("{}/projects/{}", path, project.id))
            .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
        let again = harness
            .delete(&format!("{}/projects/{}", path, project.id))
            .await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_subscription_requires_schedule() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let project = data.add_project(ProjectType::new("Default"));
        let workbook = data.add_workbook(WorkbookType::new("Sales", project.id));
        let schedule = data.add_schedule(ScheduleType::new("Weekday", "Subscription", "Daily"));

        let body = |schedule: uuid::Uuid| {
            format!(
                r#"<tsRequest><subscription subject="Daily sales"><content id="{}" type="Workbook"/><schedule id="{}"/><user id="{}"/></subscription></tsRequest>"#,
                workbook.id, schedule, harness.admin.id
            )
        };

        let missing = harness
            .xml(Method::POST, "subscriptions", &body(uuid::Uuid::new_v4()))
            .await;
        assert_eq!(error_code(&missing), "404013");

        let created = harness
            .xml(Method::POST, "subscriptions", &body(schedule.id))
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let duplicate = harness
            .xml(Method::POST, "subscriptions", &body(schedule.id))
            .await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
        assert_eq!(error_code(&duplicate), "409025");
        assert_eq!(data.read().subscriptions.len(), 1);
        let created = json(&created);
        assert_eq!(created["subscription"]["schedule"]["name"], "Weekday");

        let id = created["subscription"]["id"].as_str().expect("id");
        assert_eq!(
            harness.delete(&format!("subscriptions/{}", id)).await.status,
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            error_code(&harness.get(&format!("subscriptions/{}", id)).await),
            "404025"
        );
    }

    #[tokio::test]
    async fn test_extract_refresh_tasks() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let project = data.add_project(ProjectType::new("Default"));
        let source = data.add_data_source(DataSourceType::new("Orders", project.id));

        let body = format!(
            r#"<tsRequest><extractRefresh type="FullRefresh"><datasource id="{}"/></extractRefresh><schedule frequency="Hourly"><frequencyDetails start="00:00:00" end="23:00:00"><intervals><interval hours="1"/></intervals></frequencyDetails></schedule></tsRequest>"#,
            source.id
        );
        let created = harness
            .xml(Method::POST, "tasks/extractRefreshes", &body)
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let duplicate = harness
            .xml(Method::POST, "tasks/extractRefreshes", &body)
            .await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
        assert_eq!(error_code(&duplicate), "409027");

        let incremental = body.replace("FullRefresh", "IncrementalRefresh");
        let other_type = harness
            .xml(Method::POST, "tasks/extractRefreshes", &incremental)
            .await;
        assert_eq!(other_type.status, StatusCode::CREATED);
        assert_eq!(data.read().extract_refresh_tasks.len(), 2);
        let task_id = json(&created)["task"]["extractRefresh"]["id"]
            .as_str()
            .expect("task id")
            .to_string();

        let listed = json(&harness.get("tasks/extractRefreshes").await);
        assert_eq!(listed["tasks"]["task"].as_array().map(Vec::len), Some(2));

        let path = format!("tasks/extractRefreshes/{}", task_id);
        assert_eq!(harness.delete(&path).await.status, StatusCode::NO_CONTENT);
        assert_eq!(error_code(&harness.delete(&path).await), "404026");
    }

    #[tokio::test]
    async fn test_permissions_add_replace_and_delete() {
        let harness = Harness::new();
        let data = harness.simulator.data();
        let project = data.add_project(ProjectType::new("Default"));
        let path = format!("projects/{}/permissions", project.id);
        let grant = |mode: &str| {
            format!(
                r#"<tsRequest><permissions><granteeCapabilities><user id="{}"/><capabilities><capability name="Read" mode="{}"/></capabilities></granteeCapabilities></permissions></tsRequest>"#,
                harness.admin.id, mode
            )
        };

        assert_eq!(
            harness.xml(Method::PUT, &path, &grant("Allow")).await.status,
            StatusCode::OK
        );
        let replaced = json(&harness.xml(Method::PUT, &path, &grant("Deny")).await);
        let capabilities = &replaced["permissions"]["granteeCapabilities"][0]["capabilities"]["capability"];
        assert_eq!(capabilities.as_array().map(Vec::len), Some(1));
        assert_eq!(capabilities[0]["mode"], "Deny");

        let invalid = harness.xml(Method::PUT, &path, &grant("Maybe")).await;
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let deleted = harness
            .delete(&format!("{}/users/{}/Read/Deny", path, harness.admin.id))
            .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
        let current = json(&harness.get(&path).await);
        assert_eq!(current["permissions"]["project"]["id"], project.id.to_string());
        assert!(current["permissions"]["granteeCapabilities"]
            .as_array()
            .is_none_or(Vec::is_empty));
    }

    #[tokio::test]
    async fn test_default_permissions_unknown_group() {
        let harness = Harness::new();
        let project = harness
            .simulator
            .data()
            .add_project(ProjectType::new("Default"));
        let body = format!(
            r#"<tsRequest><permissions><granteeCapabilities><group id="{}"/><capabilities><capability name="Read" mode="Allow"/></capabilities></granteeCapabilities></permissions></tsRequest>"#,
            uuid::Uuid::new_v4()
        );
        let response = harness
            .xml(
                Method::PUT,
                &format!("projects/{}/default-permissions/workbooks", project.id),
                &body,
            )
            .await;
        assert_eq!(error_code(&response), "404012");
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let harness = Harness::new();
        let request = SimulatedRequest::parse(
            Method::POST,
            &format!(
                "http://localhost{}/auth/signin",
                harness.simulator.api_path()
            ),
        )
        .expect("url")
        .with_accept(MediaType::Json)
        .with_body(
            "application/json",
            r#"{"credentials":{"name":"admin","password":"x","site":{"contentUrl":""}}}"#,
        );
        let response = harness.send(request).await;
        assert_eq!(response.status, StatusCode::OK);
        let token = json(&response)["credentials"]["token"]
            .as_str()
            .expect("token")
            .to_string();
        assert_ne!(token, harness.token);

        let stale = harness.get("users").await;
        assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

        let sign_out = SimulatedRequest::parse(
            Method::POST,
            &format!(
                "http://localhost{}/auth/signout",
                harness.simulator.api_path()
            ),
        )
        .expect("url")
        .with_auth(&token);
        assert_eq!(harness.send(sign_out).await.status, StatusCode::NO_CONTENT);
        assert!(harness.simulator.data().session().is_none());
    }
}
