use domains::{Caller, ComplaintFilter, ComplaintPatch, ComplaintStatus, Department, DomainError};
use integration_tests::{draft, TestApp};

#[tokio::test]
async fn citizens_only_see_their_own_complaints() {
    let app = TestApp::new().await;
    let alice = app.citizen("Alice Adams", "alice@example.com").await;
    let bob = app.citizen("Bob Brown", "bob@example.com").await;

    let complaint = app
        .complaints
        .submit(
            &alice.caller,
            draft(Department::WaterManagement, "Water quality is poor in block C"),
        )
        .await
        .unwrap();
    app.complaints
        .submit(
            &bob.caller,
            draft(Department::WaterManagement, "Leaking water main on Pine Road"),
        )
        .await
        .unwrap();

    assert!(matches!(
        app.complaints.get(&bob.caller, complaint.id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        app.complaints.delete(&bob.caller, complaint.id).await,
        Err(DomainError::Forbidden(_))
    ));

    // an explicit department filter does not widen a citizen's scope
    let listed = app
        .complaints
        .list(
            &alice.caller,
            ComplaintFilter {
                department: Some(Department::WaterManagement),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, complaint.id);
}

#[tokio::test]
async fn admins_are_confined_to_their_department() {
    let app = TestApp::new().await;
    let citizen = app.citizen("John Doe", "john@example.com").await;
    let roads = app.admin_of(Department::RoadSafety).await;
    let water = app.admin_of(Department::WaterManagement).await;

    let pothole = app
        .complaints
        .submit(
            &citizen.caller,
            draft(Department::RoadSafety, "Pothole outside the primary school"),
        )
        .await
        .unwrap();

    assert!(app.complaints.get(&roads.caller, pothole.id).await.is_ok());
    assert!(matches!(
        app.complaints.get(&water.caller, pothole.id).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        app.complaints
            .update(
                &water.caller,
                pothole.id,
                ComplaintPatch {
                    status: Some(ComplaintStatus::Resolved),
                    ..Default::default()
                },
            )
            .await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(app
        .complaints
        .list_department(&water.caller, ComplaintFilter::default())
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        app.complaints
            .list(
                &water.caller,
                ComplaintFilter {
                    department: Some(Department::RoadSafety),
                    ..Default::default()
                },
            )
            .await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn citizens_cannot_update_even_their_own() {
    let app = TestApp::new().await;
    let citizen = app.citizen("John Doe", "john@example.com").await;
    let complaint = app
        .complaints
        .submit(
            &citizen.caller,
            draft(Department::GeneralAdministration, "Office hours are never respected"),
        )
        .await
        .unwrap();
    assert!(matches!(
        app.complaints
            .update(
                &citizen.caller,
                complaint.id,
                ComplaintPatch {
                    status: Some(ComplaintStatus::Resolved),
                    ..Default::default()
                },
            )
            .await,
        Err(DomainError::Forbidden(_))
    ));
}

#[tokio::test]
async fn anonymous_callers_are_unauthorized() {
    let app = TestApp::new().await;
    let anonymous = Caller::default();
    assert!(matches!(
        app.complaints
            .list(&anonymous, ComplaintFilter::default())
            .await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        app.complaints
            .submit(
                &anonymous,
                draft(Department::Sanitation, "Street cleaning skipped again"),
            )
            .await,
        Err(DomainError::Unauthorized(_))
    ));
    assert!(matches!(
        app.complaints.stats(&anonymous, None).await,
        Err(DomainError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn missing_ids_are_not_found_rather_than_forbidden() {
    let app = TestApp::new().await;
    let admin = app.admin_of(Department::PublicHealth).await;
    assert!(matches!(
        app.complaints.get(&admin.caller, uuid::Uuid::now_v7()).await,
        Err(DomainError::NotFound { .. })
    ));
}
