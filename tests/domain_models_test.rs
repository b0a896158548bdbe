use expense_tracker_server::category::Category;
use expense_tracker_server::models::*;
use rust_decimal::Decimal;
use time::macros::datetime;

fn sample_expense() -> Expense {
    Expense {
        id: 7,
        user_id: 3,
        title: "Groceries".to_string(),
        amount_cents: 5000,
        date: datetime!(2024-01-15 10:30:00.5 UTC),
        category: Category::Food,
    }
}

#[test]
fn serde_create_user_payload() {
    let json = r#"{"username":"testuser","email":"test@example.com"}"#;
    let payload: CreateUserPayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.username.as_deref(), Some("testuser"));
    assert_eq!(payload.email.as_deref(), Some("test@example.com"));
}

#[test]
fn serde_create_expense_payload_accepts_string_and_number_amounts() {
    let json = r#"{"user":1,"title":"Groceries","amount":"50.00","category":1}"#;
    let payload: CreateExpensePayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.user, Some(1));
    assert_eq!(payload.amount, Some(Decimal::new(5000, 2)));
    assert_eq!(payload.category, Some(Category::Food));

    let json = r#"{"user":1,"title":"Bus","amount":2.5}"#;
    let payload: CreateExpensePayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.amount, Some(Decimal::new(25, 1)));
    assert_eq!(payload.category, None);
}

#[test]
fn serde_create_expense_payload_rejects_unknown_category() {
    let json = r#"{"user":1,"title":"Groceries","amount":"50.00","category":9}"#;
    let result: Result<CreateExpensePayload, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn serde_update_expense_payload_partial() {
    let json = r#"{"title":"Updated Groceries","amount":"75.00"}"#;
    let payload: UpdateExpensePayload = serde_json::from_str(json).unwrap();
    assert_eq!(payload.title.as_deref(), Some("Updated Groceries"));
    assert_eq!(payload.amount, Some(Decimal::new(7500, 2)));
    assert_eq!(payload.user, None);
    assert_eq!(payload.category, None);
}

#[test]
fn expense_view_has_all_fields() {
    let value = serde_json::to_value(sample_expense().view(ExpenseFields::All)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "id": 7,
            "user": 3,
            "title": "Groceries",
            "amount": "50.00",
            "date": "2024-01-15T10:30:00.5Z",
            "category": 1,
            "readable_category": "Food"
        })
    );
}

#[test]
fn expense_view_without_user_drops_only_the_user() {
    let value = serde_json::to_value(sample_expense().view(ExpenseFields::WithoutUser)).unwrap();
    let object = value.as_object().unwrap();
    assert!(!object.contains_key("user"));
    assert_eq!(object.len(), 6);
    assert_eq!(object["title"], "Groceries");
}

#[test]
fn serde_category_summary() {
    let summary = CategorySummary {
        category: Category::Travel.label().to_string(),
        total: Decimal::new(2000, 2),
    };
    let json = serde_json::to_string(&summary).unwrap();
    assert_eq!(json, r#"{"category":"Travel","total":"20.00"}"#);
}

#[test]
fn serde_user_roundtrip() {
    let user = User {
        id: 1,
        username: "testuser".to_string(),
        email: "test@example.com".to_string(),
    };
    let json = serde_json::to_string(&user).unwrap();
    let deserialized: User = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, user);
}
