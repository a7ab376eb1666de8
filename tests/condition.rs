use serde::Serialize;
use serde_json::{json, Value};
use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, QueryTrait};
use sqlkit::{is_empty_value, new_where_condition, ConnectConfig, Error, Filter, Service, Where};

mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub age: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Serialize, Default)]
struct TestStruct {
    #[serde(rename = "name")]
    name: String,
    #[serde(rename = "age")]
    age: i32,
    #[serde(rename = "email")]
    email: String,
    #[serde(rename = "phone")]
    phone: String,
}

fn john(email: &str, phone: &str) -> TestStruct {
    TestStruct {
        name: "John Doe".to_string(),
        age: 30,
        email: email.to_string(),
        phone: phone.to_string(),
    }
}

fn conditions(pairs: &[(&str, Value)]) -> Where {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

#[test]
fn test_include_all_fields() {
    let result = new_where_condition(&john("johndoe@example.com", "+123456789"), true).unwrap();
    assert_eq!(
        result,
        conditions(&[
            ("name", json!("John Doe")),
            ("age", json!(30)),
            ("email", json!("johndoe@example.com")),
            ("phone", json!("+123456789")),
        ])
    );
}

#[test]
fn test_exclude_empty_fields() {
    let result = Where::from_record(&john("", ""), false).unwrap();
    assert_eq!(result, conditions(&[("name", json!("John Doe")), ("age", json!(30))]));
}

#[test]
fn test_empty_struct_include_empty() {
    let result = Where::from_record(&TestStruct::default(), true).unwrap();
    assert_eq!(
        result,
        conditions(&[
            ("name", json!("")),
            ("age", json!(0)),
            ("email", json!("")),
            ("phone", json!("")),
        ])
    );
}

#[test]
fn test_empty_struct_exclude_empty() {
    let result = Where::from_record(&TestStruct::default(), false).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_non_struct_input() {
    let err = Where::from_record("not a struct", true).unwrap_err();
    assert!(matches!(err, Error::NotAStruct("string")));

    assert!(Where::from_record(&42, true).is_err());
    assert!(Where::from_record(&vec![1, 2], true).is_err());
    assert!(Where::from_record(&Option::<TestStruct>::None, true).is_err());
}

#[test]
fn test_map_input_is_rejected() {
    let mut map = std::collections::HashMap::new();
    map.insert("name", "John");
    assert!(matches!(Where::from_record(&map, true), Err(Error::NotAStruct("map"))));
}

#[test]
fn test_untagged_fields_are_skipped() {
    #[derive(Serialize)]
    struct Query {
        #[serde(rename = "status")]
        status: &'static str,
        #[serde(skip)]
        #[allow(dead_code)]
        internal: u32,
    }

    let result = Where::from_record(&Query { status: "active", internal: 7 }, true).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.get("status"), Some(&json!("active")));
    assert!(result.get("internal").is_none());
}

#[test]
fn test_keys_keep_tag_case() {
    #[derive(Serialize)]
    struct Query {
        #[serde(rename = "UserName")]
        user_name: &'static str,
    }

    let result = Where::from_record(&Query { user_name: "jd" }, false).unwrap();
    assert_eq!(result.get("UserName"), Some(&json!("jd")));
}

#[test]
fn test_duplicate_tags_last_wins() {
    #[derive(Serialize)]
    struct Query {
        #[serde(rename = "id")]
        first: u32,
        #[serde(rename = "id")]
        second: u32,
    }

    let result = Where::from_record(&Query { first: 1, second: 2 }, true).unwrap();
    assert_eq!(result.get("id"), Some(&json!(2)));
}

#[test]
fn test_option_and_collection_fields() {
    #[derive(Serialize)]
    struct Query {
        owner: Option<u32>,
        tags: Vec<&'static str>,
        archived: bool,
        score: f64,
    }

    let empty = Query {
        owner: None,
        tags: vec![],
        archived: false,
        score: 0.0,
    };
    assert!(Where::from_record(&empty, false).unwrap().is_empty());
    assert_eq!(Where::from_record(&empty, true).unwrap().len(), 4);

    let full = Query {
        owner: Some(3),
        tags: vec!["a"],
        archived: true,
        score: 0.5,
    };
    assert_eq!(Where::from_record(&full, false).unwrap().len(), 4);
}

#[test]
fn test_present_option_is_not_empty() {
    #[derive(Serialize)]
    struct Query {
        archived: Option<bool>,
        owner: Option<u32>,
        parent: Option<u32>,
    }

    let query = Query {
        archived: Some(false),
        owner: Some(0),
        parent: None,
    };
    let result = Where::from_record(&query, false).unwrap();
    assert_eq!(result, conditions(&[("archived", json!(false)), ("owner", json!(0))]));
}

#[test]
fn test_boxed_and_newtype_records() {
    #[derive(Serialize)]
    struct Wrapper(TestStruct);

    let boxed = Box::new(john("", ""));
    assert_eq!(Where::from_record(&boxed, false).unwrap().len(), 2);
    assert_eq!(Where::from_record(&Wrapper(john("", "")), false).unwrap().len(), 2);
    assert_eq!(Where::from_record(&Some(john("", "")), false).unwrap().len(), 2);
}

#[test]
fn test_unit_and_tuple_structs_have_no_keys() {
    #[derive(Serialize)]
    struct Unit;
    #[derive(Serialize)]
    struct Pair(u32, u32);

    assert!(Where::from_record(&Unit, true).unwrap().is_empty());
    assert!(Where::from_record(&Pair(1, 2), true).unwrap().is_empty());
}

#[test]
fn test_non_finite_floats_are_rejected() {
    #[derive(Serialize)]
    struct Query {
        score: f64,
    }

    let err = Where::from_record(&Query { score: f64::NAN }, false).unwrap_err();
    assert!(matches!(err, Error::Serialize(_)), "{:?}", err);

    let err = Where::from_record(&Query { score: f64::INFINITY }, true).unwrap_err();
    assert!(matches!(err, Error::Serialize(_)), "{:?}", err);

    #[derive(Serialize)]
    struct Optional {
        ratio: Option<f32>,
    }

    assert!(Where::from_record(&Optional { ratio: Some(f32::NEG_INFINITY) }, true).is_err());
    assert_eq!(
        Where::from_record(&Optional { ratio: Some(0.5) }, false).unwrap(),
        conditions(&[("ratio", json!(0.5))])
    );
}

#[test]
fn test_flattened_fields_are_mapped() {
    #[derive(Serialize)]
    struct Paging {
        page: u32,
        size: u32,
    }

    #[derive(Serialize)]
    struct Query {
        #[serde(rename = "name")]
        name: &'static str,
        #[serde(flatten)]
        paging: Paging,
    }

    let query = Query {
        name: "John",
        paging: Paging { page: 2, size: 0 },
    };

    let result = Where::from_record(&query, false).unwrap();
    assert_eq!(result, conditions(&[("name", json!("John")), ("page", json!(2))]));

    let result = Where::from_record(&query, true).unwrap();
    assert_eq!(result.get("size"), Some(&json!(0)));
}

#[test]
fn test_nested_struct_emptiness_follows_serialized_form() {
    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    struct NoFields {}

    #[derive(Serialize)]
    struct Query {
        marker: Marker,
        nested: NoFields,
        id: u32,
    }

    let query = Query {
        marker: Marker,
        nested: NoFields {},
        id: 7,
    };

    assert_eq!(Where::from_record(&query, false).unwrap(), conditions(&[("id", json!(7))]));

    let all = Where::from_record(&query, true).unwrap();
    assert_eq!(all.get("marker"), Some(&json!(null)));
    assert_eq!(all.get("nested"), Some(&json!({})));
}

#[test]
fn test_is_empty_value() {
    let cases = [
        ("Empty string", json!(""), true),
        ("Non-empty string", json!("hello"), false),
        ("Zero int", json!(0), true),
        ("Non-zero int", json!(42), false),
        ("Zero float", json!(0.0), true),
        ("Non-zero float", json!(2.5), false),
        ("Nil pointer", json!(null), true),
        ("Empty slice", json!([]), true),
        ("Non-empty slice", json!([1]), false),
        ("False", json!(false), true),
        ("True", json!(true), false),
        ("Empty object", json!({}), true),
    ];

    for (name, value, expected) in cases {
        assert_eq!(is_empty_value(&value), expected, "{}", name);
    }
}

#[test]
fn test_where_display() {
    let cases = [
        (Where::new(), ""),
        (conditions(&[("key", json!(""))]), "key="),
        (conditions(&[("", json!("value"))]), "=value"),
        (conditions(&[("key", json!("value"))]), "key=value"),
        (conditions(&[("key2", json!("value2")), ("key", json!("value"))]), "key=value key2=value2"),
        (conditions(&[("age", json!(30))]), "age=30"),
    ];

    for (input, expected) in cases {
        assert_eq!(input.to_string(), expected);
    }
}

#[test]
fn test_apply_builds_predicates() {
    let filter = conditions(&[
        ("name", json!("John")),
        ("age", json!(30)),
        ("deleted_at", json!(null)),
        ("id", json!([1, 2, 3])),
    ]);

    let sql = filter
        .apply(user::Entity::find())
        .build(DbBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""name" = 'John'"#), "{}", sql);
    assert!(sql.contains(r#""age" = 30"#), "{}", sql);
    assert!(sql.contains(r#""deleted_at" IS NULL"#), "{}", sql);
    assert!(sql.contains(r#""id" IN (1, 2, 3)"#), "{}", sql);
}

#[test]
fn test_apply_empty_leaves_query_unchanged() {
    let plain = user::Entity::find().build(DbBackend::Postgres).to_string();
    let applied = Where::new()
        .apply(user::Entity::find())
        .build(DbBackend::Postgres)
        .to_string();
    assert_eq!(plain, applied);
    assert!(!applied.contains("WHERE"));
}

#[tokio::test]
async fn test_conditions_and_filter_against_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");
    let mut service = Service::new(ConnectConfig::new("sqlite", "", 0, path.to_string_lossy(), "", ""), None);
    service.init().await.unwrap();

    let db = service.database().unwrap().orm();
    db.execute_unprepared("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL)")
        .await
        .unwrap();
    db.execute_unprepared("INSERT INTO users (id, name, age) VALUES (1, 'Ann', 30), (2, 'Bob', 30), (3, 'Cid', 41)")
        .await
        .unwrap();

    #[derive(Serialize)]
    struct AgeQuery {
        age: i32,
        name: Option<String>,
    }

    let conditions = Where::from_record(&AgeQuery { age: 30, name: None }, false).unwrap();
    let filter = Filter::default().with_defaults(None);

    let users = filter
        .apply(conditions.apply(user::Entity::find()))
        .all(db)
        .await
        .unwrap();

    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Bob", "Ann"]);

    service.disconnect().await.unwrap();
}
