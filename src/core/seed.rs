//! Demo content loaded by `tableau-sim serve` unless `--empty` is given.

use super::store::TableauData;
use crate::api::models::{
    CapabilityMode, CapabilityType, DataSourceType, FrequencyDetailsType, GranteeCapabilitiesType,
    GranteeKind, GroupSetType, GroupType, IntervalType, IntervalsType, PermissionsType,
    ProjectType, ReferenceType, ScheduleType, UserType, ViewType, WorkbookType,
};
use log::debug;

/// User the demo data is owned by; sign in with this name.
pub const DEMO_ADMIN: &str = "admin";

/// Counts of what [`seed_demo`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub groups: usize,
    pub projects: usize,
    pub workbooks: usize,
    pub views: usize,
    pub data_sources: usize,
    pub schedules: usize,
}

pub fn seed_demo(data: &TableauData) -> SeedSummary {
    let admin = data.add_user(UserType::new(DEMO_ADMIN, "SiteAdministratorCreator"));
    let analyst = data.add_user(UserType::new("analyst", "Explorer"));
    let viewer = data.add_user(UserType::new("viewer", "Viewer"));

    let analysts = data.add_group(GroupType::new("Analysts"));
    let everyone = data.add_group(GroupType::new("All Users"));
    for user in [admin.id, analyst.id, viewer.id] {
        data.add_user_to_group(user, everyone.id);
    }
    data.add_user_to_group(analyst.id, analysts.id);

    let mut regions = GroupSetType::new("Regions");
    regions.add_group(&analysts);
    data.add_group_set(regions);

    let default = data.add_project(ProjectType::new("Default").with_owner(admin.id));
    let finance = data.add_project(ProjectType::new("Finance").with_owner(admin.id));
    let reports = data.add_project(
        ProjectType::new("Quarterly Reports")
            .with_parent(finance.id)
            .with_owner(analyst.id),
    );

    let superstore = data.add_workbook(WorkbookType::new("Superstore", default.id).with_owner(admin.id));
    let mut views = 0;
    for sheet in ["Overview", "Product", "Customers"] {
        data.add_view(ViewType::for_sheet(&superstore, sheet, "worksheet"));
        views += 1;
    }
    data.update_file(
        superstore.id,
        "Superstore.twb",
        b"<workbook><worksheets><worksheet name='Overview'/><worksheet name='Product'/><worksheet name='Customers'/></worksheets></workbook>".to_vec(),
    );

    let budget = data.add_workbook(WorkbookType::new("Budget", reports.id).with_owner(analyst.id));
    data.add_view(ViewType::for_sheet(&budget, "Summary", "dashboard"));
    views += 1;

    let orders = data.add_data_source(DataSourceType::new("Orders", default.id).with_owner(admin.id));
    data.update_file(
        orders.id,
        "Orders.tds",
        b"<datasource><connection class='postgres' server='db.example' username='reader'/></datasource>".to_vec(),
    );
    data.add_data_source(DataSourceType::new("Ledger", finance.id).with_owner(analyst.id));

    data.add_schedule(ScheduleType::new("Weekday Mornings", "Subscription", "Daily"));
    data.add_schedule(
        ScheduleType::new("Hourly Refresh", "Extract", "Hourly").with_details(FrequencyDetailsType {
            start: Some("00:00:00".to_string()),
            end: Some("23:00:00".to_string()),
            intervals: Some(IntervalsType {
                intervals: vec![IntervalType {
                    hours: Some("1".to_string()),
                    ..IntervalType::default()
                }],
            }),
        }),
    );

    let mut grantee = GranteeCapabilitiesType::new(GranteeKind::Group, analysts.id);
    grantee.set_capability(CapabilityType::new("Read", CapabilityMode::Allow));
    grantee.set_capability(CapabilityType::new("Write", CapabilityMode::Allow));
    data.add_default_project_permissions(
        finance.id,
        "workbooks",
        PermissionsType {
            project: Some(ReferenceType::new(finance.id)),
            grantee_capabilities: vec![grantee],
            ..PermissionsType::default()
        },
    );

    let summary = SeedSummary {
        users: 3,
        groups: 2,
        projects: 3,
        workbooks: 2,
        views,
        data_sources: 2,
        schedules: 2,
    };
    debug!("Seeded demo content: {:?}", summary);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::SiteType;

    #[test]
    fn test_seed_matches_summary() {
        let data = TableauData::new(SiteType::new("Default", ""));
        let summary = seed_demo(&data);

        let state = data.read();
        assert_eq!(state.users.len(), summary.users);
        assert_eq!(state.groups.len(), summary.groups);
        assert_eq!(state.projects.len(), summary.projects);
        assert_eq!(state.workbooks.len(), summary.workbooks);
        assert_eq!(state.views.len(), summary.views);
        assert_eq!(state.data_sources.len(), summary.data_sources);
        assert_eq!(state.schedules.len(), summary.schedules);
        assert_eq!(state.files.len(), 2);
        assert!(state.users.iter().any(|user| user.name == DEMO_ADMIN));
    }
}
