//! Read-only view of the department table and its staff.

use std::sync::Arc;

use domains::{Admin, AdminRepository, Department, DepartmentInfo, DomainError, Result};

pub struct DirectoryService {
    admins: Arc<dyn AdminRepository>,
}

impl DirectoryService {
    pub fn new(admins: Arc<dyn AdminRepository>) -> Self {
        Self { admins }
    }

    pub fn departments(&self) -> Vec<DepartmentInfo> {
        Department::ALL.into_iter().map(Department::info).collect()
    }

    /// Looks a department up by slug or display name.
    pub fn department(&self, id: &str) -> Result<DepartmentInfo> {
        resolve(id).map(Department::info)
    }

    pub async fn admins_of(&self, id: &str) -> Result<Vec<Admin>> {
        let department = resolve(id)?;
        self.admins.list_by_department(department).await
    }
}

fn resolve(id: &str) -> Result<Department> {
    id.parse::<Department>()
        .map_err(|_| DomainError::not_found("department", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockAdminRepository;
    use mockall::predicate::eq;

    #[test]
    fn lists_all_six_departments() {
        let svc = DirectoryService::new(Arc::new(MockAdminRepository::new()));
        let names: Vec<_> = svc.departments().into_iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 6);
        assert_eq!(names[5], "General Administration");
    }

    #[test]
    fn unknown_department_is_not_found() {
        let svc = DirectoryService::new(Arc::new(MockAdminRepository::new()));
        assert!(matches!(
            svc.department("parks"),
            Err(DomainError::NotFound { .. })
        ));
        assert_eq!(svc.department("roads").unwrap().email, "admin@roads.gov");
    }

    #[tokio::test]
    async fn admins_are_looked_up_by_resolved_department() {
        let mut admins = MockAdminRepository::new();
        admins
            .expect_list_by_department()
            .with(eq(Department::Sanitation))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let svc = DirectoryService::new(Arc::new(admins));
        assert!(svc.admins_of("sanitation").await.unwrap().is_empty());
    }
}
