use accessible_places::{
    error::AppError,
    lifecycle,
    moderation::{self, ApprovalState, Page, PageRequest, Transition, total_pages},
    models::{PlaceCategory, PlaceRequest},
};
use uuid::Uuid;

#[test]
fn test_approve_is_one_way_and_idempotent() {
    let request = PlaceRequest {
        name: "Cinema".to_string(),
        category: PlaceCategory::Cinema,
        ..Default::default()
    };
    let mut place = lifecycle::new_place(request, Uuid::new_v4());
    assert_eq!(ApprovalState::of(&place), ApprovalState::Unapproved);

    assert_eq!(moderation::approve(&mut place), Transition::Approved);
    assert!(place.approved);
    assert_eq!(moderation::approve(&mut place), Transition::Unchanged);
    assert_eq!(ApprovalState::of(&place), ApprovalState::Approved);
}

#[test]
fn test_page_request_defaults_and_bounds() {
    assert_eq!(PageRequest::default(), PageRequest { page: 0, size: 10 });
    assert!(matches!(PageRequest::new(0, 0), Err(AppError::Validation(_))));

    let request = PageRequest::new(3, 5).unwrap();
    assert_eq!(request.offset(), 15);
    assert_eq!(request.limit(), 5);
}

#[test]
fn test_total_pages_rounds_up() {
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(1, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(25, 10), 3);
}

#[test]
fn test_page_beyond_last_keeps_totals() {
    let page: Page<u8> = Page::new(vec![], PageRequest::new(5, 10).unwrap(), 25);
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 5);
}
