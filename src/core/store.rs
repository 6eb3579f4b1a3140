//! In-memory server state of one simulated site.
//!
//! Entity collections live in [`ServerState`] behind a single `RwLock`; the
//! dispatcher runs each handler under the write lock. Upload session bytes
//! live in [`FileUploads`], outside that lock.

use super::uploads::FileUploads;
use crate::api::models::{
    CustomViewType, DataSourceType, FavoriteKey, FavoriteType, GroupSetType, GroupType,
    PermissionsType, ProjectType, ReferenceType, ScheduleType, SiteType, SubscriptionType,
    TaskType, UserType, ViewType, WorkbookType,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// The signed-in session. At most one exists per simulated server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub site_id: Uuid,
    pub site_content_url: String,
}

/// Content item that carries explicit permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionTarget {
    Project(Uuid),
    Workbook(Uuid),
    DataSource(Uuid),
}

impl PermissionTarget {
    pub fn id(&self) -> Uuid {
        match self {
            PermissionTarget::Project(id)
            | PermissionTarget::Workbook(id)
            | PermissionTarget::DataSource(id) => *id,
        }
    }

    /// Empty permissions document pointing back at the target.
    pub fn empty_permissions(&self) -> PermissionsType {
        let reference = Some(ReferenceType::new(self.id()));
        let mut permissions = PermissionsType::default();
        match self {
            PermissionTarget::Project(_) => permissions.project = reference,
            PermissionTarget::Workbook(_) => permissions.workbook = reference,
            PermissionTarget::DataSource(_) => permissions.datasource = reference,
        }
        permissions
    }
}

/// Published file bytes of a workbook or data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ServerState {
    pub site: SiteType,
    pub users: Vec<UserType>,
    pub groups: Vec<GroupType>,
    /// Group id to member user ids, in insertion order.
    pub group_members: HashMap<Uuid, Vec<Uuid>>,
    pub group_sets: Vec<GroupSetType>,
    pub projects: Vec<ProjectType>,
    pub workbooks: Vec<WorkbookType>,
    pub views: Vec<ViewType>,
    pub custom_views: Vec<CustomViewType>,
    pub data_sources: Vec<DataSourceType>,
    /// Per-user favorites keyed by (content type, content id).
    pub favorites: HashMap<Uuid, IndexMap<FavoriteKey, FavoriteType>>,
    pub subscriptions: Vec<SubscriptionType>,
    pub schedules: Vec<ScheduleType>,
    pub extract_refresh_tasks: Vec<TaskType>,
    pub permissions: HashMap<PermissionTarget, PermissionsType>,
    /// Default permissions per (project id, content type).
    pub default_permissions: HashMap<(Uuid, String), PermissionsType>,
    pub files: HashMap<Uuid, StoredFile>,
    pub session: Option<Session>,
}

impl ServerState {
    pub fn new(site: SiteType) -> Self {
        Self {
            site,
            users: Vec::new(),
            groups: Vec::new(),
            group_members: HashMap::new(),
            group_sets: Vec::new(),
            projects: Vec::new(),
            workbooks: Vec::new(),
            views: Vec::new(),
            custom_views: Vec::new(),
            data_sources: Vec::new(),
            favorites: HashMap::new(),
            subscriptions: Vec::new(),
            schedules: Vec::new(),
            extract_refresh_tasks: Vec::new(),
            permissions: HashMap::new(),
            default_permissions: HashMap::new(),
            files: HashMap::new(),
            session: None,
        }
    }

    pub fn user(&self, id: Uuid) -> Option<&UserType> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn group(&self, id: Uuid) -> Option<&GroupType> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn project(&self, id: Uuid) -> Option<&ProjectType> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn workbook(&self, id: Uuid) -> Option<&WorkbookType> {
        self.workbooks.iter().find(|workbook| workbook.id == id)
    }

    pub fn view(&self, id: Uuid) -> Option<&ViewType> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn data_source(&self, id: Uuid) -> Option<&DataSourceType> {
        self.data_sources.iter().find(|source| source.id == id)
    }

    pub fn schedule(&self, id: Uuid) -> Option<&ScheduleType> {
        self.schedules.iter().find(|schedule| schedule.id == id)
    }

    pub fn members_of(&self, group: Uuid) -> &[Uuid] {
        self.group_members
            .get(&group)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Groups that list `user` as a member, in group order.
    pub fn groups_of(&self, user: Uuid) -> Vec<GroupType> {
        self.groups
            .iter()
            .filter(|group| self.members_of(group.id).contains(&user))
            .cloned()
            .collect()
    }

    /// Adds `user` to `group`; returns false when already a member.
    pub fn add_member(&mut self, group: Uuid, user: Uuid) -> bool {
        let members = self.group_members.entry(group).or_default();
        if members.contains(&user) {
            return false;
        }
        members.push(user);
        true
    }

    pub fn remove_member(&mut self, group: Uuid, user: Uuid) -> bool {
        match self.group_members.get_mut(&group) {
            Some(members) => {
                let before = members.len();
                members.retain(|member| *member != user);
                members.len() != before
            }
            None => false,
        }
    }

    /// Drops every trace of a user: memberships, favorites and subscriptions.
    pub fn remove_user_references(&mut self, user: Uuid) {
        for members in self.group_members.values_mut() {
            members.retain(|member| *member != user);
        }
        self.favorites.remove(&user);
        self.subscriptions
            .retain(|subscription| subscription.user.id != user);
    }

    pub fn remove_group_references(&mut self, group: Uuid) {
        self.group_members.remove(&group);
        for set in &mut self.group_sets {
            set.groups.retain(|reference| reference.id != group);
            set.group_count = set.groups.len();
        }
    }

    /// Drops favorites and subscriptions pointing at any of `ids`.
    pub fn forget_content(&mut self, ids: &[Uuid]) {
        for favorites in self.favorites.values_mut() {
            favorites.retain(|(_, content), _| !ids.contains(content));
        }
        self.subscriptions
            .retain(|subscription| !ids.contains(&subscription.content.id));
    }

    /// Removes a workbook together with its views, custom views, file bytes,
    /// explicit permissions, and any favorites or subscriptions on them.
    pub fn evict_workbook(&mut self, id: Uuid) -> Option<WorkbookType> {
        let index = self.workbooks.iter().position(|workbook| workbook.id == id)?;
        let workbook = self.workbooks.remove(index);
        let mut gone: Vec<Uuid> = self
            .views
            .iter()
            .filter(|view| view.workbook_id() == Some(id))
            .map(|view| view.id)
            .collect();
        gone.push(id);
        self.forget_content(&gone);
        self.views.retain(|view| view.workbook_id() != Some(id));
        self.custom_views.retain(|custom| {
            custom
                .workbook
                .as_ref()
                .is_none_or(|reference| reference.id != id)
        });
        self.files.remove(&id);
        self.permissions.remove(&PermissionTarget::Workbook(id));
        self.extract_refresh_tasks
            .retain(|task| task.extract_refresh.target_id() != Some(id));
        Some(workbook)
    }

    pub fn evict_data_source(&mut self, id: Uuid) -> Option<DataSourceType> {
        let index = self.data_sources.iter().position(|source| source.id == id)?;
        let source = self.data_sources.remove(index);
        self.forget_content(&[id]);
        self.files.remove(&id);
        self.permissions.remove(&PermissionTarget::DataSource(id));
        self.extract_refresh_tasks
            .retain(|task| task.extract_refresh.target_id() != Some(id));
        Some(source)
    }

    /// New session for `user`; any previous session ends.
    pub fn start_session(&mut self, user: Uuid) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user,
            site_id: self.site.id,
            site_content_url: self.site.content_url.clone(),
        };
        self.session = Some(session.clone());
        session
    }

    pub fn favorites_of(&self, user: Uuid) -> Vec<FavoriteType> {
        self.favorites
            .get(&user)
            .map(|favorites| favorites.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// The store shared by every request of one simulated server.
#[derive(Debug)]
pub struct TableauData {
    state: RwLock<ServerState>,
    uploads: FileUploads,
}

impl TableauData {
    pub fn new(site: SiteType) -> Self {
        Self {
            state: RwLock::new(ServerState::new(site)),
            uploads: FileUploads::new(),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ServerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ServerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn uploads(&self) -> &FileUploads {
        &self.uploads
    }

    pub fn site(&self) -> SiteType {
        self.read().site.clone()
    }

    pub fn add_user(&self, user: UserType) -> UserType {
        self.write().users.push(user.clone());
        user
    }

    pub fn add_group(&self, group: GroupType) -> GroupType {
        self.write().groups.push(group.clone());
        group
    }

    pub fn add_group_set(&self, group_set: GroupSetType) -> GroupSetType {
        self.write().group_sets.push(group_set.clone());
        group_set
    }

    pub fn add_user_to_group(&self, user: Uuid, group: Uuid) -> bool {
        self.write().add_member(group, user)
    }

    pub fn add_project(&self, project: ProjectType) -> ProjectType {
        self.write().projects.push(project.clone());
        project
    }

    pub fn add_workbook(&self, workbook: WorkbookType) -> WorkbookType {
        self.write().workbooks.push(workbook.clone());
        workbook
    }

    pub fn add_view(&self, view: ViewType) -> ViewType {
        self.write().views.push(view.clone());
        view
    }

    pub fn add_custom_view(&self, custom_view: CustomViewType) -> CustomViewType {
        self.write().custom_views.push(custom_view.clone());
        custom_view
    }

    pub fn add_data_source(&self, data_source: DataSourceType) -> DataSourceType {
        self.write().data_sources.push(data_source.clone());
        data_source
    }

    pub fn add_schedule(&self, schedule: ScheduleType) -> ScheduleType {
        self.write().schedules.push(schedule.clone());
        schedule
    }

    pub fn add_subscription(&self, subscription: SubscriptionType) -> SubscriptionType {
        self.write().subscriptions.push(subscription.clone());
        subscription
    }

    pub fn add_extract_refresh_task(&self, task: TaskType) -> TaskType {
        self.write().extract_refresh_tasks.push(task.clone());
        task
    }

    /// Returns false when the user already has a favorite for the same content.
    pub fn add_favorite(&self, user: Uuid, favorite: FavoriteType) -> bool {
        let Some(key) = favorite.key() else {
            return false;
        };
        let mut state = self.write();
        let favorites = state.favorites.entry(user).or_default();
        if favorites.contains_key(&key) {
            return false;
        }
        favorites.insert(key, favorite);
        true
    }

    /// Stores (or replaces) the published file of a workbook or data source.
    pub fn update_file(&self, content_id: Uuid, file_name: impl Into<String>, bytes: Vec<u8>) {
        self.write().files.insert(
            content_id,
            StoredFile {
                file_name: file_name.into(),
                bytes,
            },
        );
    }

    pub fn file(&self, content_id: Uuid) -> Option<StoredFile> {
        self.read().files.get(&content_id).cloned()
    }

    pub fn add_content_type_permissions(
        &self,
        target: PermissionTarget,
        permissions: PermissionsType,
    ) {
        self.write().permissions.insert(target, permissions);
    }

    pub fn add_default_project_permissions(
        &self,
        project: Uuid,
        content_type: impl Into<String>,
        permissions: PermissionsType,
    ) {
        self.write()
            .default_permissions
            .insert((project, content_type.into()), permissions);
    }

    /// Signs `user` in, replacing any previous session.
    pub fn sign_in(&self, user: Uuid) -> Session {
        self.write().start_session(user)
    }

    pub fn sign_out(&self) -> Option<Session> {
        self.write().session.take()
    }

    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{
        FavoriteContentType, SubscriptionContentType, TaskScheduleType, ViewType,
    };

    fn data() -> TableauData {
        TableauData::new(SiteType::new("Default", ""))
    }

    #[test]
    fn test_group_membership() {
        let data = data();
        let user = data.add_user(UserType::new("alice", "Viewer"));
        let group = data.add_group(GroupType::new("Analysts"));

        assert!(data.add_user_to_group(user.id, group.id));
        assert!(!data.add_user_to_group(user.id, group.id));

        let state = data.read();
        assert_eq!(state.members_of(group.id), &[user.id]);
        assert_eq!(state.groups_of(user.id).len(), 1);
    }

    #[test]
    fn test_favorites_are_unique_per_content() {
        let data = data();
        let user = data.add_user(UserType::new("bob", "Viewer"));
        let project = data.add_project(ProjectType::new("Sales"));
        let favorite = FavoriteType::new(
            "Sales",
            FavoriteContentType::Project,
            ReferenceType::new(project.id),
        );

        assert!(data.add_favorite(user.id, favorite.clone()));
        assert!(!data.add_favorite(user.id, favorite));
        assert_eq!(data.read().favorites_of(user.id).len(), 1);
    }

    #[test]
    fn test_evict_workbook_removes_dependents() {
        let data = data();
        let project = data.add_project(ProjectType::new("Default"));
        let workbook = data.add_workbook(WorkbookType::new("Superstore", project.id));
        let view = data.add_view(ViewType::for_sheet(&workbook, "Overview", "worksheet"));
        let owner = data.add_user(UserType::new("carol", "Creator"));
        data.add_custom_view(CustomViewType::new("Mine", &view, owner.id));
        data.update_file(workbook.id, "Superstore.twb", b"<workbook/>".to_vec());

        let removed = data.write().evict_workbook(workbook.id);
        assert_eq!(removed.map(|w| w.id), Some(workbook.id));

        let state = data.read();
        assert!(state.workbooks.is_empty());
        assert!(state.views.is_empty());
        assert!(state.custom_views.is_empty());
        assert!(state.files.is_empty());
    }

    fn subscription(user: Uuid, content: Uuid, content_type: &str) -> SubscriptionType {
        SubscriptionType {
            id: Uuid::new_v4(),
            subject: "Weekly".to_string(),
            message: None,
            attach_image: true,
            attach_pdf: false,
            suspended: false,
            content: SubscriptionContentType {
                id: content,
                content_type: content_type.to_string(),
                send_if_view_empty: false,
            },
            schedule: TaskScheduleType::default(),
            user: ReferenceType::new(user),
        }
    }

    #[test]
    fn test_evict_forgets_favorites_and_subscriptions() {
        let data = data();
        let project = data.add_project(ProjectType::new("Default"));
        let workbook = data.add_workbook(WorkbookType::new("Superstore", project.id));
        let view = data.add_view(ViewType::for_sheet(&workbook, "Overview", "worksheet"));
        let source = data.add_data_source(DataSourceType::new("Orders", project.id));
        let user = data.add_user(UserType::new("dave", "Viewer"));

        for (label, kind, id) in [
            ("Superstore", FavoriteContentType::Workbook, workbook.id),
            ("Overview", FavoriteContentType::View, view.id),
            ("Orders", FavoriteContentType::DataSource, source.id),
            ("Default", FavoriteContentType::Project, project.id),
        ] {
            assert!(data.add_favorite(user.id, FavoriteType::new(label, kind, ReferenceType::new(id))));
        }
        data.add_subscription(subscription(user.id, workbook.id, "Workbook"));
        data.add_subscription(subscription(user.id, view.id, "View"));

        data.write().evict_workbook(workbook.id);
        {
            let state = data.read();
            let labels: Vec<String> = state
                .favorites_of(user.id)
                .into_iter()
                .map(|favorite| favorite.label)
                .collect();
            assert_eq!(labels, vec!["Orders".to_string(), "Default".to_string()]);
            assert!(state.subscriptions.is_empty());
        }

        data.write().evict_data_source(source.id);
        let labels: Vec<String> = data
            .read()
            .favorites_of(user.id)
            .into_iter()
            .map(|favorite| favorite.label)
            .collect();
        assert_eq!(labels, vec!["Default".to_string()]);
    }

    #[test]
    fn test_sign_in_replaces_session() {
        let data = data();
        let first = data.sign_in(Uuid::new_v4());
        let second = data.sign_in(Uuid::new_v4());
        assert_ne!(first.token, second.token);
        assert_eq!(data.session(), Some(second));
        assert!(data.sign_out().is_some());
        assert!(data.session().is_none());
    }

    #[test]
    fn test_remove_user_references() {
        let data = data();
        let user = data.add_user(UserType::new("dave", "Viewer"));
        let group = data.add_group(GroupType::new("Ops"));
        data.add_user_to_group(user.id, group.id);

        data.write().remove_user_references(user.id);
        assert!(data.read().members_of(group.id).is_empty());
    }
}
