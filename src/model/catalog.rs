use crate::model::IncludeSpec;

/// Configuration for one mirrored resource type: the API collection path,
/// the include negotiation spec, an optional sort key, and whether entities
/// of this type carry a custom-field map worth resolving.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub name: &'static str,
    pub path: &'static str,
    pub includes: IncludeSpec,
    pub sort: Option<&'static str>,
    pub custom_fields: bool,
}

impl ResourceConfig {
    fn new(name: &'static str, path: &'static str, includes: &[&str]) -> Self {
        Self {
            name,
            path,
            includes: if includes.is_empty() {
                IncludeSpec::none()
            } else {
                IncludeSpec::new(includes.iter().copied())
            },
            sort: None,
            custom_fields: false,
        }
    }

    fn sorted(mut self, key: &'static str) -> Self {
        self.sort = Some(key);
        self
    }

    fn with_custom_fields(mut self) -> Self {
        self.custom_fields = true;
        self
    }
}

/// The full dependency-ordered table of mirrored resource types. Types that
/// others reference (subsidiaries, companies, field catalogs, statuses) come
/// before the types that reference them; the orchestrator syncs them in this
/// order.
pub fn catalog() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig::new("subsidiaries", "subsidiaries", &[]),
        ResourceConfig::new("tax_rates", "tax_rates", &["subsidiary"]),
        ResourceConfig::new("document_types", "document_types", &["subsidiary"]),
        ResourceConfig::new("custom_fields", "custom_fields", &[]),
        ResourceConfig::new("custom_field_options", "custom_field_options", &["custom_field"]),
        ResourceConfig::new("workflows", "workflows", &["workflow_statuses"]),
        ResourceConfig::new("workflow_statuses", "workflow_statuses", &["workflow"]),
        ResourceConfig::new("companies", "companies", &["subsidiary"]).sorted("name"),
        ResourceConfig::new("people", "people", &["company", "subsidiary", "manager"]),
        ResourceConfig::new("teams", "teams", &[]),
        ResourceConfig::new("memberships", "memberships", &["person", "team"]),
        ResourceConfig::new("deal_statuses", "deal_statuses", &[]),
        ResourceConfig::new("lost_reasons", "lost_reasons", &[]),
        ResourceConfig::new("pipelines", "pipelines", &[]),
        ResourceConfig::new("deals", "deals", &["company", "responsible", "deal_status"])
            .with_custom_fields(),
        ResourceConfig::new("projects", "projects", &["company", "project_manager", "workflow"])
            .with_custom_fields(),
        ResourceConfig::new("boards", "boards", &["project"]),
        ResourceConfig::new("task_lists", "task_lists", &["board", "project"]),
        ResourceConfig::new(
            "tasks",
            "tasks",
            &["project", "task_list", "assignee", "creator", "workflow_status"],
        ),
        ResourceConfig::new("comments", "comments", &["creator", "task", "deal"]),
        ResourceConfig::new("attachments", "attachments", &["creator"]),
        ResourceConfig::new("budgets", "budgets", &["project", "company"]),
        ResourceConfig::new("service_types", "service_types", &[]),
        ResourceConfig::new("services", "services", &["service_type", "deal"]),
        ResourceConfig::new("events", "events", &[]),
        ResourceConfig::new("bookings", "bookings", &["person", "service", "event"])
            .sorted("started_on"),
        ResourceConfig::new("time_entries", "time_entries", &["person", "service", "task"])
            .sorted("date"),
        ResourceConfig::new("timers", "timers", &["person", "task"]),
        ResourceConfig::new("expenses", "expenses", &["project", "service", "person"]),
        ResourceConfig::new("invoices", "invoices", &["company", "subsidiary", "document_type"])
            .sorted("issued_on"),
        ResourceConfig::new("invoice_attributions", "invoice_attributions", &["invoice"]),
        ResourceConfig::new("payments", "payments", &["invoice", "company"]),
        ResourceConfig::new("activities", "activities", &["creator"]),
        ResourceConfig::new("tags", "tags", &[]),
        ResourceConfig::new("holiday_calendars", "holiday_calendars", &[]),
        ResourceConfig::new("holidays", "holidays", &["holiday_calendar"]),
    ]
}

/// Look up a single resource configuration by catalog name.
pub fn find(name: &str) -> Option<ResourceConfig> {
    catalog().into_iter().find(|config| config.name == name)
}
