use uuid::Uuid;

pub type Id = String;

/// Generate a correlation id for one sync run.
pub fn generate_run_id() -> Id {
    Uuid::new_v4().to_string()
}
