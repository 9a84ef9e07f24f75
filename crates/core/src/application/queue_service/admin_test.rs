//! Unit tests for create-queue validation

use super::admin::{validate_request, CreateQueueRequest};

#[test]
fn test_validate_name_empty() {
    let req = CreateQueueRequest {
        name: "   ".to_string(),
        max_capacity: None,
    };

    let result = validate_request(&req);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("empty"));
}

#[test]
fn test_validate_name_too_long() {
    let req = CreateQueueRequest {
        name: "a".repeat(101),
        max_capacity: None,
    };

    let result = validate_request(&req);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("too long"));
}

#[test]
fn test_validate_name_invalid_chars() {
    let req = CreateQueueRequest {
        name: "support@desk!".to_string(),
        max_capacity: None,
    };

    let result = validate_request(&req);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("alphanumeric"));
}

#[test]
fn test_validate_capacity_out_of_range() {
    let req = CreateQueueRequest {
        name: "Support".to_string(),
        max_capacity: Some(0),
    };

    let result = validate_request(&req);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("out of range"));
}

#[test]
fn test_validate_valid_request() {
    let req = CreateQueueRequest {
        name: "Support Desk-1".to_string(),
        max_capacity: Some(50),
    };

    assert!(validate_request(&req).is_ok());
}

#[test]
fn test_validate_unbounded_queue() {
    let req = CreateQueueRequest {
        name: "walk-ins".to_string(),
        max_capacity: None,
    };

    assert!(validate_request(&req).is_ok());
}
