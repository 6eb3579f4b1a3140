//! Route table of the simulated REST API.
//!
//! Patterns are relative to `/api/{version}/`; `{name}` segments capture a
//! path parameter. The table is plain data so the CLI can print it.

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Names one operation of the simulated API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteId {
    SignIn,
    SignOut,
    ServerInfo,
    GetSite,
    QueryUsers,
    GetUser,
    AddUser,
    UpdateUser,
    RemoveUser,
    QueryGroupsForUser,
    QueryGroups,
    CreateGroup,
    DeleteGroup,
    QueryUsersInGroup,
    AddUserToGroup,
    RemoveUserFromGroup,
    QueryGroupSets,
    CreateGroupSet,
    DeleteGroupSet,
    QueryProjects,
    CreateProject,
    UpdateProject,
    DeleteProject,
    QueryWorkbooks,
    GetWorkbook,
    UpdateWorkbook,
    DeleteWorkbook,
    DownloadWorkbook,
    QueryWorkbookViews,
    PublishWorkbook,
    QueryDataSources,
    GetDataSource,
    DeleteDataSource,
    DownloadDataSource,
    PublishDataSource,
    QueryViews,
    GetView,
    QueryCustomViews,
    GetCustomView,
    DeleteCustomView,
    QueryFavorites,
    AddFavorite,
    DeleteFavorite,
    QuerySubscriptions,
    GetSubscription,
    CreateSubscription,
    DeleteSubscription,
    QuerySchedules,
    GetSchedule,
    QueryExtractRefreshTasks,
    CreateExtractRefreshTask,
    DeleteExtractRefreshTask,
    QueryProjectPermissions,
    AddProjectPermissions,
    DeleteProjectPermission,
    QueryWorkbookPermissions,
    AddWorkbookPermissions,
    DeleteWorkbookPermission,
    QueryDataSourcePermissions,
    AddDataSourcePermissions,
    DeleteDataSourcePermission,
    QueryDefaultPermissions,
    AddDefaultPermissions,
    DeleteDefaultPermission,
    InitiateFileUpload,
    AppendToFileUpload,
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::str::FromStr for RouteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        routes()
            .iter()
            .map(|route| route.id)
            .find(|id| id.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown operation '{}'", s))
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    pub method: Method,
    pub pattern: &'static str,
    pub requires_auth: bool,
}

impl Route {
    fn new(id: RouteId, method: Method, pattern: &'static str) -> Self {
        Self {
            id,
            method,
            pattern,
            requires_auth: true,
        }
    }

    fn anonymous(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Captured parameters when `segments` fits this route's pattern.
    pub fn capture(&self, segments: &[&str]) -> Option<PathParams> {
        let pattern: Vec<&str> = self.pattern.split('/').collect();
        if pattern.len() != segments.len() {
            return None;
        }
        let mut params = PathParams::default();
        for (expected, actual) in pattern.iter().zip(segments) {
            match expected
                .strip_prefix('{')
                .and_then(|name| name.strip_suffix('}'))
            {
                Some(name) => {
                    params.0.insert(name, (*actual).to_string());
                }
                None if expected.eq_ignore_ascii_case(actual) => {}
                None => return None,
            }
        }
        Some(params)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<&'static str, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

#[derive(Debug)]
pub enum Resolution {
    Matched {
        route: &'static Route,
        params: PathParams,
    },
    /// The path is known but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// Matches `/api/{version}/...` against the route table.
pub fn resolve(method: &Method, segments: &[&str]) -> Resolution {
    let relative = match segments {
        [api, _version, rest @ ..] if api.eq_ignore_ascii_case("api") && !rest.is_empty() => rest,
        _ => return Resolution::NotFound,
    };

    let mut path_known = false;
    for route in routes() {
        if let Some(params) = route.capture(relative) {
            if route.method == *method {
                return Resolution::Matched { route, params };
            }
            path_known = true;
        }
    }

    if path_known {
        Resolution::MethodNotAllowed
    } else {
        Resolution::NotFound
    }
}

pub fn routes() -> &'static [Route] {
    &ROUTES
}

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    use RouteId::*;

    macro_rules! site {
        ($suffix:literal) => {
            concat!("sites/{site-id}/", $suffix)
        };
    }

    vec![
        Route::new(SignIn, Method::POST, "auth/signin").anonymous(),
        Route::new(SignOut, Method::POST, "auth/signout"),
        Route::new(ServerInfo, Method::GET, "serverinfo").anonymous(),
        Route::new(GetSite, Method::GET, "sites/{site-id}"),
        Route::new(QueryUsers, Method::GET, site!("users")),
        Route::new(AddUser, Method::POST, site!("users")),
        Route::new(GetUser, Method::GET, site!("users/{user-id}")),
        Route::new(UpdateUser, Method::PUT, site!("users/{user-id}")),
        Route::new(RemoveUser, Method::DELETE, site!("users/{user-id}")),
        Route::new(QueryGroupsForUser, Method::GET, site!("users/{user-id}/groups")),
        Route::new(QueryGroups, Method::GET, site!("groups")),
        Route::new(CreateGroup, Method::POST, site!("groups")),
        Route::new(DeleteGroup, Method::DELETE, site!("groups/{group-id}")),
        Route::new(QueryUsersInGroup, Method::GET, site!("groups/{group-id}/users")),
        Route::new(AddUserToGroup, Method::POST, site!("groups/{group-id}/users")),
        Route::new(
            RemoveUserFromGroup,
            Method::DELETE,
            site!("groups/{group-id}/users/{user-id}"),
        ),
        Route::new(QueryGroupSets, Method::GET, site!("groupsets")),
        Route::new(CreateGroupSet, Method::POST, site!("groupsets")),
        Route::new(DeleteGroupSet, Method::DELETE, site!("groupsets/{groupset-id}")),
        Route::new(QueryProjects, Method::GET, site!("projects")),
        Route::new(CreateProject, Method::POST, site!("projects")),
        Route::new(UpdateProject, Method::PUT, site!("projects/{project-id}")),
        Route::new(DeleteProject, Method::DELETE, site!("projects/{project-id}")),
        Route::new(QueryWorkbooks, Method::GET, site!("workbooks")),
        Route::new(PublishWorkbook, Method::POST, site!("workbooks")),
        Route::new(GetWorkbook, Method::GET, site!("workbooks/{workbook-id}")),
        Route::new(UpdateWorkbook, Method::PUT, site!("workbooks/{workbook-id}")),
        Route::new(DeleteWorkbook, Method::DELETE, site!("workbooks/{workbook-id}")),
        Route::new(DownloadWorkbook, Method::GET, site!("workbooks/{workbook-id}/content")),
        Route::new(QueryWorkbookViews, Method::GET, site!("workbooks/{workbook-id}/views")),
        Route::new(QueryDataSources, Method::GET, site!("datasources")),
        Route::new(PublishDataSource, Method::POST, site!("datasources")),
        Route::new(GetDataSource, Method::GET, site!("datasources/{datasource-id}")),
        Route::new(DeleteDataSource, Method::DELETE, site!("datasources/{datasource-id}")),
        Route::new(
            DownloadDataSource,
            Method::GET,
            site!("datasources/{datasource-id}/content"),
        ),
        Route::new(QueryViews, Method::GET, site!("views")),
        Route::new(GetView, Method::GET, site!("views/{view-id}")),
        Route::new(QueryCustomViews, Method::GET, site!("customviews")),
        Route::new(GetCustomView, Method::GET, site!("customviews/{customview-id}")),
        Route::new(DeleteCustomView, Method::DELETE, site!("customviews/{customview-id}")),
        Route::new(QueryFavorites, Method::GET, site!("favorites/{user-id}")),
        Route::new(AddFavorite, Method::PUT, site!("favorites/{user-id}")),
        Route::new(
            DeleteFavorite,
            Method::DELETE,
            site!("favorites/{user-id}/{content-type}/{content-id}"),
        ),
        Route::new(QuerySubscriptions, Method::GET, site!("subscriptions")),
        Route::new(CreateSubscription, Method::POST, site!("subscriptions")),
        Route::new(GetSubscription, Method::GET, site!("subscriptions/{subscription-id}")),
        Route::new(
            DeleteSubscription,
            Method::DELETE,
            site!("subscriptions/{subscription-id}"),
        ),
        Route::new(QuerySchedules, Method::GET, "schedules"),
        Route::new(GetSchedule, Method::GET, "schedules/{schedule-id}"),
        Route::new(QueryExtractRefreshTasks, Method::GET, site!("tasks/extractRefreshes")),
        Route::new(CreateExtractRefreshTask, Method::POST, site!("tasks/extractRefreshes")),
        Route::new(
            DeleteExtractRefreshTask,
            Method::DELETE,
            site!("tasks/extractRefreshes/{task-id}"),
        ),
        Route::new(
            QueryProjectPermissions,
            Method::GET,
            site!("projects/{content-id}/permissions"),
        ),
        Route::new(
            AddProjectPermissions,
            Method::PUT,
            site!("projects/{content-id}/permissions"),
        ),
        Route::new(
            DeleteProjectPermission,
            Method::DELETE,
            site!("projects/{content-id}/permissions/{grantee-type}/{grantee-id}/{capability}/{mode}"),
        ),
        Route::new(
            QueryWorkbookPermissions,
            Method::GET,
            site!("workbooks/{content-id}/permissions"),
        ),
        Route::new(
            AddWorkbookPermissions,
            Method::PUT,
            site!("workbooks/{content-id}/permissions"),
        ),
        Route::new(
            DeleteWorkbookPermission,
            Method::DELETE,
            site!("workbooks/{content-id}/permissions/{grantee-type}/{grantee-id}/{capability}/{mode}"),
        ),
        Route::new(
            QueryDataSourcePermissions,
            Method::GET,
            site!("datasources/{content-id}/permissions"),
        ),
        Route::new(
            AddDataSourcePermissions,
            Method::PUT,
            site!("datasources/{content-id}/permissions"),
        ),
        Route::new(
            DeleteDataSourcePermission,
            Method::DELETE,
            site!("datasources/{content-id}/permissions/{grantee-type}/{grantee-id}/{capability}/{mode}"),
        ),
        Route::new(
            QueryDefaultPermissions,
            Method::GET,
            site!("projects/{content-id}/default-permissions/{content-type}"),
        ),
        Route::new(
            AddDefaultPermissions,
            Method::PUT,
            site!("projects/{content-id}/default-permissions/{content-type}"),
        ),
        Route::new(
            DeleteDefaultPermission,
            Method::DELETE,
            site!("projects/{content-id}/default-permissions/{content-type}/{grantee-type}/{grantee-id}/{capability}/{mode}"),
        ),
        Route::new(InitiateFileUpload, Method::POST, site!("fileUploads")),
        Route::new(
            AppendToFileUpload,
            Method::PUT,
            site!("fileUploads/{upload-session-id}"),
        ),
    ]
});
