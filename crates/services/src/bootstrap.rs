//! Provisioning of the static department roster.

use domains::{AdminRepository, AdminRole, Department, NewAdmin, PasswordHasher, Result};
use tracing::info;

/// Creates one admin per department (`<department contact email>`) unless
/// an account with that email already exists. Returns how many were
/// created. Safe to run repeatedly.
pub async fn seed_department_admins(
    admins: &dyn AdminRepository,
    hasher: &dyn PasswordHasher,
    password: &str,
) -> Result<usize> {
    let mut created = 0;
    for department in Department::ALL {
        if admins.find_by_email(department.email()).await?.is_some() {
            continue;
        }
        let role = match department {
            Department::GeneralAdministration => AdminRole::SuperAdmin,
            _ => AdminRole::Admin,
        };
        admins
            .create(NewAdmin {
                name: format!("{} Admin", department.name()),
                email: department.email().to_string(),
                password_hash: hasher.hash(password)?,
                department,
                role,
            })
            .await?;
        created += 1;
    }
    info!(created, "department admins provisioned");
    Ok(created)
}
