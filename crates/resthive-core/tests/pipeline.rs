//! End-to-end pipeline tests: route a URL, dispatch through
//! `resthive_core::handlers`, and check the outcome against the
//! concrete scenarios.

use resthive_core::error::Error;
use resthive_core::handlers::{self, RequestHeaders};
use resthive_core::item::{Item, ItemId};
use resthive_core::resource::Resource;
use resthive_core::router::route;
use resthive_core::schema::{Field, Schema, Validator};
use resthive_core::Index;
use resthive_mem::MemStorer;
use serde_json::json;
use std::sync::Arc;

fn foo_schema() -> Schema {
    Schema::new()
        .field(Field::new("id", Validator::string()).read_only())
        .field(Field::new("foo", Validator::string()))
        .field(Field::new("bar", Validator::string()))
        .field(Field::new("aar", Validator::array(Field::new("item", Validator::string()))))
}

fn index_with_foo(items: Vec<Item>) -> Index {
    let foo = Resource::new("foo", foo_schema(), Arc::new(MemStorer::with_items(items)));
    Index::new().with_resource(foo)
}

fn sub_schema() -> Schema {
    Schema::new()
        .field(Field::new("id", Validator::string()).read_only())
        .field(Field::new("foo", Validator::reference("foo")).required())
}

fn index_with_foo_and_sub(foo_items: Vec<Item>, sub_items: Vec<Item>) -> Index {
    let sub = Resource::new("sub", sub_schema(), Arc::new(MemStorer::with_items(sub_items))).as_child_of("foo");
    let foo = Resource::new("foo", foo_schema(), Arc::new(MemStorer::with_items(foo_items))).with_child(sub);
    Index::new().with_resource(foo)
}

fn item(id: &str, payload: serde_json::Value) -> Item {
    Item::new(ItemId::String(id.to_string()), payload)
}

#[tokio::test]
async fn scenario_1_merge_patch_keeps_omitted_fields() {
    let index = index_with_foo(vec![item("2", json!({"id": "2", "foo": "even", "bar": "baz"}))]);
    let path = route(&index, &["foo", "2"]).unwrap();
    let headers = RequestHeaders::default();

    let outcome = handlers::update(&index, &path, &headers, br#"{"foo":"baz"}"#).await.unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body.unwrap(), json!({"id": "2", "foo": "baz", "bar": "baz"}));
    assert_eq!(
        outcome.headers.get("etag").unwrap().to_str().unwrap(),
        "W/\"53c7f8b8a84dd407e1491f5339fca757\""
    );
}

#[tokio::test]
async fn scenario_2_malformed_body_is_bad_request() {
    let index = index_with_foo(vec![item("2", json!({"id": "2", "foo": "even", "bar": "baz"}))]);
    let path = route(&index, &["foo", "2"]).unwrap();
    let headers = RequestHeaders::default();

    let err = handlers::update(&index, &path, &headers, b"invalid").await.unwrap_err();
    match err {
        Error::BadRequest(message) => {
            assert_eq!(message, "Malformed body: invalid character 'i' looking for beginning of value")
        }
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_3_json_patch_adding_unknown_field_is_unprocessable() {
    let index = index_with_foo(vec![item("2", json!({"id": "2", "foo": "even", "bar": "baz"}))]);
    let path = route(&index, &["foo", "2"]).unwrap();
    let headers = RequestHeaders {
        content_type: Some("application/json-patch+json".to_string()),
        ..Default::default()
    };

    let err = handlers::update(&index, &path, &headers, br#"[{"op":"add","path":"/invalid","value":true}]"#)
        .await
        .unwrap_err();

    match err {
        Error::UnprocessableEntity { message, issues } => {
            assert_eq!(message, "Document contains error(s)");
            assert_eq!(issues.get("invalid"), Some(&vec!["invalid field".to_string()]));
        }
        other => panic!("expected UnprocessableEntity, got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_4_if_unmodified_since_yesterday_is_precondition_failed() {
    let index = index_with_foo(vec![item("1", json!({"id": "1", "foo": "a"}))]);
    let path = route(&index, &["foo", "1"]).unwrap();
    let yesterday = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc2822();
    let headers = RequestHeaders {
        if_unmodified_since: Some(yesterday),
        ..Default::default()
    };

    let err = handlers::update(&index, &path, &headers, br#"{"foo":"b"}"#).await.unwrap_err();
    assert!(matches!(err, Error::PreconditionFailed));
}

#[tokio::test]
async fn scenario_5_explicit_parent_link_is_honored_over_the_url() {
    let foo_items = vec![
        item("3", json!({"id": "3", "foo": "p3"})),
        item("2", json!({"id": "2", "foo": "p2"})),
    ];
    let sub_items = vec![item("1", json!({"id": "1", "foo": "3"}))];
    let index = index_with_foo_and_sub(foo_items, sub_items);

    let path = route(&index, &["foo", "3", "sub", "1"]).unwrap();
    let headers = RequestHeaders::default();

    let outcome = handlers::update(&index, &path, &headers, br#"{"foo":"2"}"#).await.unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body.unwrap(), json!({"id": "1", "foo": "2"}));
}

#[tokio::test]
async fn scenario_6_json_patch_add_into_array() {
    let index = index_with_foo(vec![item("6", json!({"id": "6", "foo": "odd", "aar": ["value-1"]}))]);
    let path = route(&index, &["foo", "6"]).unwrap();
    let headers = RequestHeaders {
        content_type: Some("application/json-patch+json".to_string()),
        ..Default::default()
    };

    let outcome = handlers::update(&index, &path, &headers, br#"[{"op":"add","path":"/aar/0","value":"baz"}]"#)
        .await
        .unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body.unwrap(), json!({"id": "6", "foo": "odd", "aar": ["baz", "value-1"]}));
    assert_eq!(
        outcome.headers.get("etag").unwrap().to_str().unwrap(),
        "W/\"ad278e57a1abd1794df1ce05519639b2\""
    );
}

#[tokio::test]
async fn immutable_id_mismatch_is_rejected_without_calling_the_storer() {
    let index = index_with_foo(vec![item("2", json!({"id": "2", "foo": "a"}))]);
    let path = route(&index, &["foo", "2"]).unwrap();
    let headers = RequestHeaders::default();

    let err = handlers::update(&index, &path, &headers, br#"{"id":"3"}"#).await.unwrap_err();
    assert!(matches!(err, Error::UnprocessableEntity { .. }));

    let refetched = handlers::read(&index, &path, &Default::default()).await.unwrap();
    assert_eq!(refetched.body.unwrap()["foo"], json!("a"));
}

#[tokio::test]
async fn if_match_mismatch_on_delete_is_precondition_failed() {
    let index = index_with_foo(vec![item("9", json!({"id": "9", "foo": "a"}))]);
    let path = route(&index, &["foo", "9"]).unwrap();
    let headers = RequestHeaders { if_match: Some("W/\"stale\"".to_string()), ..Default::default() };

    let err = handlers::delete(&path, &headers).await.unwrap_err();
    assert!(matches!(err, Error::PreconditionFailed));
}

#[tokio::test]
async fn sub_resource_list_is_constrained_to_its_parent_even_without_an_explicit_filter() {
    let foo_items = vec![item("3", json!({"id": "3", "foo": "p3"})), item("4", json!({"id": "4", "foo": "p4"}))];
    let sub_items = vec![
        item("1", json!({"id": "1", "foo": "3"})),
        item("2", json!({"id": "2", "foo": "4"})),
    ];
    let index = index_with_foo_and_sub(foo_items, sub_items);

    let path = route(&index, &["foo", "3", "sub"]).unwrap();
    let outcome = handlers::list(&index, &path, &Default::default()).await.unwrap();

    let body = outcome.body.unwrap();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], json!("1"));
}

#[tokio::test]
async fn resource_with_no_storer_yields_not_implemented() {
    let foo = Resource::without_storer("foo", foo_schema());
    let index = Index::new().with_resource(foo);
    let path = route(&index, &["foo", "1"]).unwrap();

    let err = handlers::read(&index, &path, &Default::default()).await.unwrap_err();
    assert!(matches!(err, Error::NotImplemented));
}
